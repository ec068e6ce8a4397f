//! 検出結果JSONの集計レポート

use crate::error::{AircraftIdError, Result};
use aircraft_id_common::detection::HISTOGRAM_BINS;
use aircraft_id_common::{load_results, DetectionSummary};
use std::fmt::Write as _;
use std::path::{Path, PathBuf};

pub const SUMMARY_FILE: &str = "summary.txt";
pub const AVERAGE_CONFIDENCE_FILE: &str = "average_confidence.txt";
pub const HISTOGRAM_FILE: &str = "confidence_histograms.txt";
pub const NO_DETECTIONS_FILE: &str = "images_without_detections.txt";
pub const SUMMARY_JSON_FILE: &str = "summary.json";

/// 検出結果JSONを読み込んで集計し、出力フォルダにレポートを書き出す
pub fn analyze_results(results_path: &Path, output_dir: &Path) -> Result<(DetectionSummary, Vec<PathBuf>)> {
    if !results_path.is_file() {
        return Err(AircraftIdError::FileNotFound(results_path.display().to_string()));
    }
    let json = std::fs::read_to_string(results_path)?;
    let summary = DetectionSummary::from_results(&load_results(&json)?);
    let written = write_reports(&summary, output_dir)?;
    Ok((summary, written))
}

pub fn write_reports(summary: &DetectionSummary, output_dir: &Path) -> Result<Vec<PathBuf>> {
    std::fs::create_dir_all(output_dir)?;

    let reports = [
        (SUMMARY_FILE, format_summary(summary)),
        (AVERAGE_CONFIDENCE_FILE, format_average_confidence(summary)),
        (HISTOGRAM_FILE, format_histograms(summary)),
        (NO_DETECTIONS_FILE, format_images_without_detections(summary)),
        (SUMMARY_JSON_FILE, serde_json::to_string_pretty(summary)?),
    ];

    let mut written = Vec::with_capacity(reports.len());
    for (file_name, content) in reports {
        let path = output_dir.join(file_name);
        std::fs::write(&path, content)?;
        written.push(path);
    }
    Ok(written)
}

pub fn format_summary(summary: &DetectionSummary) -> String {
    let mut out = String::new();
    let _ = writeln!(out, "Total images processed: {}", summary.total_images);
    let _ = writeln!(out, "Images with detections: {}", summary.images_with_detections);
    let _ = writeln!(out, "Images without detections: {}", summary.images_without_detections);
    let _ = writeln!(out, "Total detections: {}", summary.total_detections);
    let _ = writeln!(out, "Detections per class:");
    for class in &summary.classes {
        let _ = writeln!(out, "  {}: {}", class.class_name, class.count);
    }
    out
}

pub fn format_average_confidence(summary: &DetectionSummary) -> String {
    let mut out = String::from("Average confidence per class:\n");
    for class in &summary.classes {
        let _ = writeln!(out, "  {}: {:.2}", class.class_name, class.average_confidence());
    }
    out
}

/// 10区間（0.0-0.1 … 0.9-1.0）の度数
pub fn format_histograms(summary: &DetectionSummary) -> String {
    let mut out = String::new();
    for class in &summary.classes {
        let _ = writeln!(out, "Confidence scores for class: {}", class.class_name);
        for (bin, count) in class.histogram.iter().enumerate() {
            let low = bin as f64 / HISTOGRAM_BINS as f64;
            let high = (bin + 1) as f64 / HISTOGRAM_BINS as f64;
            let _ = writeln!(out, "  {:.1}-{:.1}: {}", low, high, count);
        }
    }
    out
}

pub fn format_images_without_detections(summary: &DetectionSummary) -> String {
    let mut out = String::from("Images without detections:\n");
    for name in &summary.images_no_detections {
        out.push_str(name);
        out.push('\n');
    }
    out
}
