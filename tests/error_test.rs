//! エラーケーステスト
//!
//! 各種エラー条件でのエラーハンドリングを検証

use aircraft_id_tools::error::AircraftIdError;
use aircraft_id_tools::{analysis, labels, matcher, openimages, scanner};
use std::path::Path;
use tempfile::tempdir;

/// 存在しないフォルダをスキャンした場合
#[test]
fn test_scan_nonexistent_folder() {
    let result = scanner::scan_folder(Path::new("/nonexistent/path/12345"), scanner::IMAGE_EXTENSIONS);
    assert!(result.is_err());

    let err = result.unwrap_err();
    assert!(matches!(err, AircraftIdError::FolderNotFound(_)));
}

/// 空のフォルダをスキャンした場合
#[test]
fn test_scan_empty_folder() {
    let dir = tempdir().expect("Failed to create temp dir");
    let result = scanner::scan_folder(dir.path(), scanner::IMAGE_EXTENSIONS);

    // 空フォルダはエラーではなく空のVecを返す
    assert!(result.is_ok());
    assert!(result.unwrap().is_empty());
}

/// 存在しない台帳ワークブック
#[test]
fn test_missing_workbook() {
    let dir = tempdir().expect("Failed to create temp dir");
    let result = matcher::process_workbook(
        &dir.path().join("missing.xlsx"),
        dir.path(),
        &[],
        matcher::MatchOptions::default(),
    );
    assert!(matches!(result, Err(AircraftIdError::FileNotFound(_))));
}

/// 壊れた検出結果JSON
#[test]
fn test_invalid_results_json() {
    let dir = tempdir().expect("Failed to create temp dir");
    let path = dir.path().join("results.json");
    std::fs::write(&path, "{ not json").unwrap();

    let result = analysis::analyze_results(&path, &dir.path().join("out"));
    assert!(matches!(result, Err(AircraftIdError::Common(_))));
}

/// 不正な画像リスト
#[test]
fn test_invalid_image_list_message() {
    let err = openimages::parse_image_list("train/00ff\nnot-an-id\n").unwrap_err();
    let display = format!("{}", err);
    assert!(display.contains("2行目"));
    assert!(display.contains("not-an-id"));
}

/// ラベル書き換え対象フォルダがない場合
#[test]
fn test_relabel_missing_folder() {
    let result = labels::relabel_index(Path::new("/nonexistent/labels"), 1);
    assert!(matches!(result, Err(AircraftIdError::FolderNotFound(_))));
}

/// AircraftIdErrorのDisplay実装確認
#[test]
fn test_error_display() {
    let errors = vec![
        AircraftIdError::Config("テスト設定エラー".to_string()),
        AircraftIdError::FileNotFound("test.jpg".to_string()),
        AircraftIdError::FolderNotFound("/path/to/folder".to_string()),
        AircraftIdError::ImageLoad("読み込み失敗".to_string()),
        AircraftIdError::Workbook("シートなし".to_string()),
        AircraftIdError::ReportGeneration("Excel生成エラー".to_string()),
        AircraftIdError::Download("404".to_string()),
        AircraftIdError::UnknownClass("Zeppelin".to_string()),
        AircraftIdError::Prompt("not a terminal".to_string()),
    ];

    for err in errors {
        let display = format!("{}", err);
        assert!(!display.is_empty(), "エラーメッセージが空: {:?}", err);
    }
}

/// 共通クレートのエラーはそのまま表示される
#[test]
fn test_common_error_is_transparent() {
    let err: AircraftIdError = aircraft_id_common::Error::Parse("bad range".to_string()).into();
    assert_eq!(format!("{}", err), "Parse error: bad range");
}

/// io::Errorからの変換
#[test]
fn test_io_error_conversion() {
    let io_err = std::io::Error::new(std::io::ErrorKind::NotFound, "file not found");
    let err: AircraftIdError = io_err.into();
    assert!(matches!(err, AircraftIdError::Io(_)));
}
