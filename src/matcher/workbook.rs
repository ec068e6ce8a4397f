//! 台帳ワークブックの読み込み（calamine）

use super::MetadataEntry;
use crate::error::{AircraftIdError, Result};
use calamine::{open_workbook_auto, Data, Range, Reader};
use std::path::Path;

/// 日付キーの列（C列）
pub const KEY_COLUMN: u32 = 2;
/// 説明の列（D列）
pub const DESCRIPTION_COLUMN: u32 = 3;

pub fn sheet_names(path: &Path) -> Result<Vec<String>> {
    ensure_exists(path)?;
    let workbook = open_workbook_auto(path)?;
    Ok(workbook.sheet_names())
}

/// シートを読み込み（1行目はヘッダー）
pub fn load_sheet(path: &Path, sheet_name: &str) -> Result<Range<Data>> {
    ensure_exists(path)?;
    let mut workbook = open_workbook_auto(path)?;
    workbook
        .worksheet_range(sheet_name)
        .map_err(|e| AircraftIdError::Workbook(format!("シート '{}': {}", sheet_name, e)))
}

/// 日付キーと説明を読み込み（キーが空の行は除外）
pub fn load_metadata(path: &Path, sheet_name: &str) -> Result<Vec<MetadataEntry>> {
    let range = load_sheet(path, sheet_name)?;
    Ok(metadata_from_range(&range))
}

pub fn metadata_from_range(range: &Range<Data>) -> Vec<MetadataEntry> {
    column_pairs(range, KEY_COLUMN, DESCRIPTION_COLUMN)
        .into_iter()
        .filter(|(key, _)| !key.is_empty())
        .map(|(key, description)| MetadataEntry { key, description })
        .collect()
}

/// 2行目以降の指定列を (左, 右) の組で取得
pub fn column_pairs(range: &Range<Data>, left: u32, right: u32) -> Vec<(String, String)> {
    let Some((end_row, end_col)) = range.end() else {
        return Vec::new();
    };
    if end_col < left.min(right) {
        return Vec::new();
    }

    (1..=end_row)
        .map(|row| (cell_text(range, row, left), cell_text(range, row, right)))
        .collect()
}

/// 2行目以降の指定列を取得（空セルは除外）
pub fn column_values(range: &Range<Data>, column: u32) -> Vec<String> {
    let Some((end_row, _)) = range.end() else {
        return Vec::new();
    };
    (1..=end_row)
        .map(|row| cell_text(range, row, column))
        .filter(|value| !value.is_empty())
        .collect()
}

fn cell_text(range: &Range<Data>, row: u32, column: u32) -> String {
    range
        .get_value((row, column))
        .map(|cell| cell.to_string().trim().to_string())
        .unwrap_or_default()
}

fn ensure_exists(path: &Path) -> Result<()> {
    if path.exists() {
        Ok(())
    } else {
        Err(AircraftIdError::FileNotFound(path.display().to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample_range() -> Range<Data> {
        let mut range = Range::new((0, 0), (3, 3));
        range.set_value((0, 2), Data::String("Date".into()));
        range.set_value((0, 3), Data::String("Description".into()));
        range.set_value((1, 2), Data::String("1984.19.47.a-s".into()));
        range.set_value((1, 3), Data::String("Avro Lancaster".into()));
        range.set_value((2, 3), Data::String("orphan description".into()));
        range.set_value((3, 2), Data::String(" 1984.26.8 ".into()));
        range
    }

    #[test]
    fn test_metadata_from_range_skips_empty_keys() {
        let entries = metadata_from_range(&sample_range());
        assert_eq!(entries.len(), 2);
        assert_eq!(entries[0], MetadataEntry::new("1984.19.47.a-s", "Avro Lancaster"));
        assert_eq!(entries[1], MetadataEntry::new("1984.26.8", ""));
    }

    #[test]
    fn test_column_values() {
        let values = column_values(&sample_range(), 3);
        assert_eq!(values, vec!["Avro Lancaster", "orphan description"]);
    }

    #[test]
    fn test_missing_workbook() {
        let result = sheet_names(Path::new("/nonexistent/metadata.xlsx"));
        assert!(matches!(result, Err(AircraftIdError::FileNotFound(_))));
    }
}
