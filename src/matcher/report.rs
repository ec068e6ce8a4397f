//! 照合結果の出力（Excel / JSON）

use super::SheetReport;
use crate::error::Result;
use rust_xlsxwriter::{Format, Workbook};
use std::collections::HashSet;
use std::path::Path;

/// Excelのシート名の上限
const MAX_SHEET_NAME_LEN: usize = 31;
const SUMMARY_SHEET: &str = "Summary";

/// 照合結果をExcelに出力
///
/// 先頭に集計シート、続いて元シートごとに File / Description の2列を出力する。
pub fn write_xlsx(reports: &[SheetReport], path: &Path) -> Result<()> {
    let mut workbook = Workbook::new();
    let header = Format::new().set_bold();

    let summary = workbook.add_worksheet();
    summary.set_name(SUMMARY_SHEET)?;
    let headers = ["Sheet", "Image folder", "Files", "Matched", "Rejected keys"];
    for (col, title) in headers.iter().enumerate() {
        summary.write_string_with_format(0, col as u16, *title, &header)?;
    }
    for (i, report) in reports.iter().enumerate() {
        let row = i as u32 + 1;
        summary.write_string(row, 0, &report.sheet_name)?;
        summary.write_string(row, 1, &report.image_folder)?;
        summary.write_number(row, 2, report.matches.len() as f64)?;
        summary.write_number(row, 3, report.matched_count() as f64)?;
        summary.write_number(row, 4, report.rejected_keys.len() as f64)?;
    }
    let generated = chrono::Local::now().format("%Y-%m-%d %H:%M:%S").to_string();
    summary.write_string(reports.len() as u32 + 2, 0, format!("Generated: {}", generated))?;
    summary.set_column_width(1, 40)?;

    let mut used: HashSet<String> = HashSet::from([SUMMARY_SHEET.to_lowercase()]);
    for report in reports {
        let name = unique_sheet_name(&report.sheet_name, &mut used);
        let worksheet = workbook.add_worksheet();
        worksheet.set_name(&name)?;
        worksheet.write_string_with_format(0, 0, "File", &header)?;
        worksheet.write_string_with_format(0, 1, "Description", &header)?;
        for (i, photo) in report.matches.iter().enumerate() {
            let row = i as u32 + 1;
            worksheet.write_string(row, 0, &photo.file_name)?;
            worksheet.write_string(row, 1, &photo.description)?;
        }
        worksheet.set_column_width(0, 32)?;
        worksheet.set_column_width(1, 80)?;
    }

    workbook.save(path)?;
    Ok(())
}

/// 照合結果をJSONに出力
pub fn write_json(reports: &[SheetReport], path: &Path) -> Result<()> {
    let json = serde_json::to_string_pretty(reports)?;
    std::fs::write(path, json)?;
    Ok(())
}

/// Excelで使えない文字を除き、31文字以内で重複しない名前にする
fn unique_sheet_name(name: &str, used: &mut HashSet<String>) -> String {
    let cleaned: String = name
        .chars()
        .map(|c| if "[]:*?/\\".contains(c) { '_' } else { c })
        .collect();
    let cleaned = cleaned.trim_matches('\'').trim();
    let base: String = if cleaned.is_empty() {
        "Sheet".to_string()
    } else {
        cleaned.chars().take(MAX_SHEET_NAME_LEN).collect()
    };

    let mut candidate = base.clone();
    let mut counter = 2;
    while !used.insert(candidate.to_lowercase()) {
        let suffix = format!(" ({})", counter);
        let keep = MAX_SHEET_NAME_LEN - suffix.chars().count();
        candidate = format!("{}{}", base.chars().take(keep).collect::<String>(), suffix);
        counter += 1;
    }
    candidate
}
