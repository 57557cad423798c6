use chrono::TimeZone as _;

use super::*;

#[test]
fn grid_cells_are_row_major() {
    let grid = GridSpec::new(2, 550).unwrap();
    let cells: Vec<_> = grid.cells().collect();
    assert_eq!(
        cells,
        vec![
            GridCoord::new(0, 0),
            GridCoord::new(0, 1),
            GridCoord::new(1, 0),
            GridCoord::new(1, 1),
        ]
    );
    assert_eq!(grid.cell_count(), 4);
}

#[test]
fn grid_spec_rejects_zero_values() {
    assert!(GridSpec::new(0, 550).is_err());
    assert!(GridSpec::new(4, 0).is_err());
}

#[test]
fn canvas_size_serializes_as_pair() {
    let c: CanvasSize = serde_json::from_str("[1920, 1080]").unwrap();
    assert_eq!(c, CanvasSize::new(1920, 1080));
    assert_eq!(c.short_edge(), 1080);
    assert_eq!(serde_json::to_string(&c).unwrap(), "[1920,1080]");
}

#[test]
fn snapshot_formats_for_urls_and_files() {
    let at = chrono::Utc.with_ymd_and_hms(2025, 3, 7, 4, 20, 0).unwrap();
    let snap = SnapshotTime::from_aligned(at);
    assert_eq!(snap.url_path(), "2025/03/07/042000");
    assert_eq!(snap.file_token(), "2025__03__07__042000");
    assert_eq!(snap.to_string(), "2025-03-07T04:20:00Z");
}

#[test]
fn file_token_parses_back() {
    let at = chrono::Utc.with_ymd_and_hms(2024, 12, 31, 23, 50, 0).unwrap();
    let snap = SnapshotTime::from_aligned(at);
    assert_eq!(SnapshotTime::parse_file_token(&snap.file_token()), Some(snap));
}

#[test]
fn malformed_file_tokens_do_not_parse() {
    assert_eq!(SnapshotTime::parse_file_token(""), None);
    assert_eq!(SnapshotTime::parse_file_token("0_1"), None);
    assert_eq!(SnapshotTime::parse_file_token("2024__13__01__000000"), None);
    assert_eq!(SnapshotTime::parse_file_token("2024/01/01/000000"), None);
}
