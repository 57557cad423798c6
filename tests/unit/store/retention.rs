use chrono::{TimeDelta, TimeZone as _};

use super::*;

fn temp_dir(name: &str) -> PathBuf {
    std::env::temp_dir().join(format!(
        "himawari_{name}_{}_{}",
        std::process::id(),
        std::time::SystemTime::now()
            .duration_since(std::time::UNIX_EPOCH)
            .unwrap()
            .as_nanos()
    ))
}

fn snapshot(minutes: i64) -> SnapshotTime {
    let base = chrono::Utc.with_ymd_and_hms(2025, 1, 1, 0, 0, 0).unwrap();
    SnapshotTime::from_aligned(base + TimeDelta::minutes(minutes))
}

fn grid() -> GridSpec {
    GridSpec::new(4, 550).unwrap()
}

fn names(paths: &[PathBuf]) -> Vec<String> {
    paths
        .iter()
        .map(|p| p.file_name().unwrap().to_string_lossy().into_owned())
        .collect()
}

#[test]
fn artifact_name_encodes_grid_and_snapshot() {
    let name = artifact_file_name(grid(), snapshot(24 * 60 + 70));
    assert_eq!(name, "4d_550_2025__01__02__011000.png");
    assert_eq!(artifact_snapshot(&name), Some(snapshot(24 * 60 + 70)));
}

#[test]
fn malformed_names_have_no_snapshot() {
    for name in [
        "tile_0_1.png",
        "wallpaper.png",
        "4d_550.png",
        "xd_550_2025__01__02__011000.png",
        "4d_abc_2025__01__02__011000.png",
        "4d_550_2025__01__02__011000.jpg",
        "4d_550_not-a-time.png",
    ] {
        assert_eq!(artifact_snapshot(name), None, "{name}");
    }
}

#[test]
fn save_writes_png_and_leaves_no_partial_file() {
    let dir = temp_dir("retention_save");
    let store = RetentionStore::open(&dir).unwrap();
    let img = RgbImage::from_pixel(6, 4, image::Rgb([1, 2, 3]));

    let path = store.save(&img, grid(), snapshot(10)).unwrap();
    assert_eq!(path, dir.join("4d_550_2025__01__01__001000.png"));

    let back = image::open(&path).unwrap().to_rgb8();
    assert_eq!(back, img);
    let leftovers: Vec<_> = std::fs::read_dir(&dir)
        .unwrap()
        .map(|e| e.unwrap().file_name().to_string_lossy().into_owned())
        .collect();
    assert_eq!(leftovers, vec!["4d_550_2025__01__01__001000.png".to_string()]);

    std::fs::remove_dir_all(&dir).ok();
}

#[test]
fn prune_keeps_newest_by_embedded_timestamp() {
    let dir = temp_dir("retention_prune");
    let store = RetentionStore::open(&dir).unwrap();

    // Written newest-first so mtime order disagrees with timestamp order.
    for minutes in [50, 40, 30, 20, 10] {
        std::fs::write(dir.join(artifact_file_name(grid(), snapshot(minutes))), b"x").unwrap();
    }
    std::fs::write(dir.join("tile_0_0.png"), b"tile").unwrap();
    std::fs::write(dir.join("notes.txt"), b"keep").unwrap();

    let deleted = store.prune(3).unwrap();
    assert_eq!(
        names(&deleted),
        vec![
            "4d_550_2025__01__01__001000.png".to_string(),
            "4d_550_2025__01__01__002000.png".to_string(),
        ]
    );
    assert_eq!(
        names(&store.artifacts().unwrap()),
        vec![
            "4d_550_2025__01__01__003000.png".to_string(),
            "4d_550_2025__01__01__004000.png".to_string(),
            "4d_550_2025__01__01__005000.png".to_string(),
        ]
    );
    assert!(dir.join("tile_0_0.png").exists());
    assert!(dir.join("notes.txt").exists());

    std::fs::remove_dir_all(&dir).ok();
}

#[test]
fn prune_at_or_below_cap_is_noop() {
    let dir = temp_dir("retention_noop");
    let store = RetentionStore::open(&dir).unwrap();
    for minutes in [10, 20] {
        std::fs::write(dir.join(artifact_file_name(grid(), snapshot(minutes))), b"x").unwrap();
    }

    assert!(store.prune(2).unwrap().is_empty());
    assert!(store.prune(5).unwrap().is_empty());
    assert_eq!(store.artifacts().unwrap().len(), 2);

    std::fs::remove_dir_all(&dir).ok();
}

#[test]
fn unparseable_names_are_pruned_first() {
    let dir = temp_dir("retention_malformed");
    let store = RetentionStore::open(&dir).unwrap();
    std::fs::write(dir.join(artifact_file_name(grid(), snapshot(10))), b"x").unwrap();
    std::fs::write(dir.join("zzz-manual-copy.png"), b"x").unwrap();
    std::fs::write(dir.join(artifact_file_name(grid(), snapshot(20))), b"x").unwrap();

    let deleted = store.prune(1).unwrap();
    assert_eq!(
        names(&deleted),
        vec![
            "zzz-manual-copy.png".to_string(),
            "4d_550_2025__01__01__001000.png".to_string(),
        ]
    );

    std::fs::remove_dir_all(&dir).ok();
}

#[test]
fn open_creates_missing_directory() {
    let dir = temp_dir("retention_open").join("nested");
    let store = RetentionStore::open(&dir).unwrap();
    assert!(store.dir().is_dir());
    std::fs::remove_dir_all(dir.parent().unwrap()).ok();
}

#[cfg(target_os = "linux")]
#[test]
fn non_utf8_png_names_are_pruned_first() {
    use std::os::unix::ffi::OsStrExt as _;

    let dir = temp_dir("retention_non_utf8");
    let store = RetentionStore::open(&dir).unwrap();
    for minutes in [10, 20] {
        std::fs::write(dir.join(artifact_file_name(grid(), snapshot(minutes))), b"x").unwrap();
    }
    let odd = dir.join(std::ffi::OsStr::from_bytes(b"bad\xff.png"));
    std::fs::write(&odd, b"x").unwrap();

    assert_eq!(store.artifacts().unwrap().first(), Some(&odd));
    let deleted = store.prune(2).unwrap();
    assert_eq!(deleted, vec![odd.clone()]);
    assert!(!odd.exists());
    assert_eq!(store.artifacts().unwrap().len(), 2);

    std::fs::remove_dir_all(&dir).ok();
}

#[test]
fn prune_removes_interrupted_saves() {
    let dir = temp_dir("retention_partial");
    let store = RetentionStore::open(&dir).unwrap();
    let kept = dir.join(artifact_file_name(grid(), snapshot(10)));
    std::fs::write(&kept, b"x").unwrap();
    let partial = dir.join(format!(
        ".{}.partial",
        artifact_file_name(grid(), snapshot(20))
    ));
    std::fs::write(&partial, b"half").unwrap();
    std::fs::write(dir.join(".hidden"), b"keep").unwrap();

    let deleted = store.prune(5).unwrap();
    assert!(deleted.is_empty());
    assert!(!partial.exists());
    assert!(kept.exists());
    assert!(dir.join(".hidden").exists());

    std::fs::remove_dir_all(&dir).ok();
}
