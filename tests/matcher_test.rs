//! 台帳照合の統合テスト（ワークブック作成 → 照合 → Excel出力）

use aircraft_id_tools::matcher::{self, reference, report, MatchOptions};
use calamine::{open_workbook_auto, Reader};
use rust_xlsxwriter::Workbook;
use std::path::Path;
use tempfile::tempdir;

fn write_metadata_workbook(path: &Path) {
    let mut workbook = Workbook::new();

    let sheet = workbook.add_worksheet();
    sheet.set_name("Single-Engine").unwrap();
    sheet.write_string(0, 2, "Date").unwrap();
    sheet.write_string(0, 3, "Description").unwrap();
    sheet.write_string(1, 2, "1984.19.47.a-c").unwrap();
    sheet.write_string(1, 3, "Avro Lancaster nose section").unwrap();
    sheet.write_string(2, 2, "1984.26.8").unwrap();
    sheet.write_string(2, 3, "Harvard trainer").unwrap();
    sheet.write_string(3, 2, "1984.30.1.z-a").unwrap();
    sheet.write_string(3, 3, "broken range").unwrap();

    let other = workbook.add_worksheet();
    other.set_name("Jets").unwrap();
    other.write_string(1, 2, "1990.1.1").unwrap();
    other.write_string(1, 3, "Canadair Sabre").unwrap();

    workbook.save(path).unwrap();
}

fn touch(folder: &Path, names: &[&str]) {
    std::fs::create_dir_all(folder).unwrap();
    for name in names {
        std::fs::write(folder.join(name), b"jpg").unwrap();
    }
}

#[test]
fn test_process_workbook_end_to_end() {
    let dir = tempdir().expect("Failed to create temp dir");
    let workbook_path = dir.path().join("metadata.xlsx");
    write_metadata_workbook(&workbook_path);

    let photos = dir.path().join("photos");
    touch(
        &photos.join("Single Engine"),
        &["1984-19-47a.jpg", "1984.19.47C.JPG", "1984.26.81.jpg", "misc.png"],
    );

    let reports = matcher::process_workbook(&workbook_path, &photos, &[], MatchOptions::default())
        .expect("matching failed");
    assert_eq!(reports.len(), 2);

    let single = &reports[0];
    assert_eq!(single.sheet_name, "Single-Engine");
    assert_eq!(single.rejected_keys.len(), 1);
    assert_eq!(single.matched_count(), 3);
    assert_eq!(single.matches[0].description, "Avro Lancaster nose section");
    assert_eq!(single.matches[2].file_name, "1984.26.81.jpg");
    assert_eq!(single.matches[3].file_name, "misc.png");
    assert!(!single.matches[3].is_matched());

    // 写真フォルダのないシートは空
    assert!(reports[1].matches.is_empty());
}

#[test]
fn test_strict_matching_and_report() {
    let dir = tempdir().expect("Failed to create temp dir");
    let workbook_path = dir.path().join("metadata.xlsx");
    write_metadata_workbook(&workbook_path);

    let photos = dir.path().join("photos");
    touch(&photos.join("Single Engine"), &["1984.26.81.jpg", "1984.26.8.jpg"]);

    let reports = matcher::process_workbook(
        &workbook_path,
        &photos,
        &["Single-Engine".to_string()],
        MatchOptions { strict_boundary: true },
    )
    .expect("matching failed");
    let matched: Vec<&str> = reports[0]
        .matches
        .iter()
        .filter(|m| m.is_matched())
        .map(|m| m.file_name.as_str())
        .collect();
    assert_eq!(matched, vec!["1984.26.8.jpg"]);

    let output = dir.path().join("matches.xlsx");
    report::write_xlsx(&reports, &output).expect("report failed");

    let mut workbook = open_workbook_auto(&output).unwrap();
    let range = workbook.worksheet_range("Single-Engine").unwrap();
    assert_eq!(
        range.get_value((1, 0)).map(|c| c.to_string()),
        Some("1984.26.8.jpg".to_string())
    );
    assert_eq!(
        range.get_value((1, 1)).map(|c| c.to_string()),
        Some("Harvard trainer".to_string())
    );
}

#[test]
fn test_identify_workbook_mentions() {
    let dir = tempdir().expect("Failed to create temp dir");

    let reference_path = dir.path().join("aircraft.xlsx");
    let mut workbook = Workbook::new();
    let sheet = workbook.add_worksheet();
    sheet.write_string(0, 0, "Model").unwrap();
    sheet.write_string(0, 1, "Designator").unwrap();
    sheet.write_string(1, 0, "Avro Lancaster").unwrap();
    sheet.write_string(1, 1, "B.I B.III").unwrap();
    sheet.write_string(2, 0, "Canadair Sabre").unwrap();
    sheet.write_string(2, 1, "F-86E CL-13").unwrap();
    workbook.save(&reference_path).unwrap();

    let metadata_path = dir.path().join("metadata.xlsx");
    let mut workbook = Workbook::new();
    let museum = workbook.add_worksheet();
    museum.set_name("Museum").unwrap();
    museum.write_string(0, 3, "Description").unwrap();
    museum.write_string(1, 3, "Avro Lancaster nose section").unwrap();
    museum.write_string(2, 3, "Sabre F-86E cockpit").unwrap();
    museum.write_string(3, 3, "Harvard trainer").unwrap();
    let store = workbook.add_worksheet();
    store.set_name("Store").unwrap();
    store.write_string(0, 3, "Description").unwrap();
    workbook.save(&metadata_path).unwrap();

    let aircraft = reference::AircraftReference::from_workbook(&reference_path).expect("reference failed");
    assert_eq!(aircraft.models(), &["avro lancaster", "canadair sabre"]);
    assert_eq!(aircraft.designators().len(), 4);

    let sheets = reference::identify_workbook(&metadata_path, &aircraft).expect("identify failed");
    assert_eq!(sheets.len(), 2);
    assert_eq!(sheets[0].sheet_name, "Museum");

    let descriptions = &sheets[0].descriptions;
    assert_eq!(descriptions.len(), 2);
    assert_eq!(descriptions[0].0, "Avro Lancaster nose section");
    assert_eq!(descriptions[0].1.models, vec!["avro lancaster"]);
    assert!(descriptions[0].1.designators.is_empty());
    assert_eq!(descriptions[1].0, "Sabre F-86E cockpit");
    assert_eq!(descriptions[1].1.designators, vec!["f-86e"]);
    assert_eq!(descriptions[1].1.names, vec!["Canadair Sabre"]);

    assert_eq!(sheets[1].sheet_name, "Store");
    assert!(sheets[1].descriptions.is_empty());
}
