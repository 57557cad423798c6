use image::RgbImage;
use image::imageops::FilterType;

use crate::foundation::core::CanvasSize;
use crate::foundation::error::{HimawariError, HimawariResult};

/// Where the resized composite lands on the canvas.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct CanvasLayout {
    /// Edge length of the square the composite is resized to.
    pub target_size: u32,
    /// Left edge of the composite on the canvas.
    pub offset_x: u32,
    /// Top edge of the composite on the canvas.
    pub offset_y: u32,
}

impl CanvasLayout {
    /// `target = floor(min(w, h) * cover_ratio)`, centered with floor division.
    pub fn compute(canvas: CanvasSize, cover_ratio: f64) -> HimawariResult<Self> {
        if !cover_ratio.is_finite() || cover_ratio <= 0.0 || cover_ratio > 1.0 {
            return Err(HimawariError::composition(format!(
                "cover_ratio must be within (0, 1], got {cover_ratio}"
            )));
        }
        if canvas.width == 0 || canvas.height == 0 {
            return Err(HimawariError::composition(format!(
                "canvas must be non-empty, got {}x{}",
                canvas.width, canvas.height
            )));
        }

        let target_size = (f64::from(canvas.short_edge()) * cover_ratio).floor() as u32;
        if target_size == 0 {
            return Err(HimawariError::composition(format!(
                "cover_ratio {cover_ratio} leaves nothing visible on a {}x{} canvas",
                canvas.width, canvas.height
            )));
        }

        Ok(Self {
            target_size,
            offset_x: (canvas.width - target_size) / 2,
            offset_y: (canvas.height - target_size) / 2,
        })
    }
}

/// Resize `composite` to the layout's square and center it on a black canvas.
#[tracing::instrument(skip(composite), fields(src_w = composite.width(), src_h = composite.height()))]
pub fn compose_canvas(
    composite: &RgbImage,
    canvas: CanvasSize,
    cover_ratio: f64,
    filter: FilterType,
) -> HimawariResult<RgbImage> {
    let layout = CanvasLayout::compute(canvas, cover_ratio)?;
    if composite.width() == 0 || composite.height() == 0 {
        return Err(HimawariError::composition("composite image is empty"));
    }

    let resized = if composite.dimensions() == (layout.target_size, layout.target_size) {
        composite.clone()
    } else {
        image::imageops::resize(composite, layout.target_size, layout.target_size, filter)
    };

    let mut out = RgbImage::new(canvas.width, canvas.height);
    image::imageops::replace(
        &mut out,
        &resized,
        i64::from(layout.offset_x),
        i64::from(layout.offset_y),
    );
    tracing::debug!(?layout, "composited onto canvas");
    Ok(out)
}

#[cfg(test)]
#[path = "../../tests/unit/canvas/compose.rs"]
mod tests;
