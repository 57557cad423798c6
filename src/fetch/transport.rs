use std::time::Duration;

use crate::foundation::error::{HimawariError, HimawariResult};

/// Failure of a single attempt against one mirror.
#[derive(thiserror::Error, Debug)]
pub enum FetchError {
    /// Connection, timeout or body read failure.
    #[error("request failed: {0}")]
    Http(#[from] reqwest::Error),

    /// The mirror answered with a non-success status.
    #[error("'{url}' returned HTTP {status}")]
    Status {
        /// Requested URL.
        url: String,
        /// Status code received.
        status: u16,
    },

    /// The body was not a decodable image.
    #[error("decode tile: {0}")]
    Decode(#[from] image::ImageError),

    /// Writing the tile debug artifact failed.
    #[error("write tile artifact: {0}")]
    Io(#[from] std::io::Error),

    /// No mirrors were configured.
    #[error("no mirrors configured")]
    NoMirrors,
}

/// Byte source for tile URLs.
///
/// Implementations must be shareable across the fetch worker pool.
pub trait TileTransport: Send + Sync {
    /// GET `url` and return the response body. Non-2xx responses are errors.
    fn get(&self, url: &str) -> Result<Vec<u8>, FetchError>;
}

/// Blocking HTTP transport with a per-request timeout.
#[derive(Clone, Debug)]
pub struct HttpTransport {
    client: reqwest::blocking::Client,
}

impl HttpTransport {
    /// Client whose requests give up after `timeout`.
    pub fn new(timeout: Duration) -> HimawariResult<Self> {
        let client = reqwest::blocking::Client::builder()
            .timeout(timeout)
            .user_agent(concat!("himawari/", env!("CARGO_PKG_VERSION")))
            .build()
            .map_err(client_setup_error)?;
        Ok(Self { client })
    }
}

fn client_setup_error(e: impl std::error::Error + Send + Sync + 'static) -> HimawariError {
    HimawariError::Other(anyhow::Error::new(e).context("build HTTP client"))
}

impl TileTransport for HttpTransport {
    fn get(&self, url: &str) -> Result<Vec<u8>, FetchError> {
        let resp = self.client.get(url).send()?;
        let status = resp.status();
        if !status.is_success() {
            return Err(FetchError::Status {
                url: url.to_string(),
                status: status.as_u16(),
            });
        }
        Ok(resp.bytes()?.to_vec())
    }
}

#[cfg(test)]
#[path = "../../tests/unit/fetch/transport.rs"]
mod tests;
