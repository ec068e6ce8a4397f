//! 一括グレースケール変換
//!
//! 対象形式の画像ごとに `<元の名前>_grayscale.jpg` を出力する。
//! 同じ名前で拡張子だけ違う画像は `<元の名前>_<拡張子>_grayscale.jpg` にする。
//! 対象外の形式や、既に変換済みのファイルには触れない。

use crate::batch::{create_progress_bar, BatchReport};
use crate::error::Result;
use crate::scanner::{scan_folder, ImageInfo, GRAYSCALE_EXTENSIONS};
use log::debug;
use rayon::prelude::*;
use std::collections::{HashMap, HashSet};
use std::path::{Path, PathBuf};

pub const GRAYSCALE_SUFFIX: &str = "_grayscale";

/// フォルダ内の画像を変換（出力先省略時は同じフォルダ）
pub fn grayscale_folder(folder: &Path, output: Option<&Path>) -> Result<BatchReport> {
    let images = scan_folder(folder, GRAYSCALE_EXTENSIONS)?;
    let output_dir = output.unwrap_or(folder);
    std::fs::create_dir_all(output_dir)?;

    let mut report = BatchReport::default();
    let (converted, inputs): (Vec<ImageInfo>, Vec<ImageInfo>) = images
        .into_iter()
        .partition(|img| img.stem().ends_with(GRAYSCALE_SUFFIX));
    for img in converted {
        report.record_skipped(img.file_name);
    }

    let mut planned = Vec::with_capacity(inputs.len());
    for (img, output_name) in inputs.iter().zip(output_names(&inputs)) {
        match output_name {
            Some(name) => planned.push((img, output_dir.join(name))),
            None => report.record_failure(img.file_name.clone(), "出力ファイル名が他の画像と重複"),
        }
    }

    let pb = create_progress_bar(planned.len() as u64, "Grayscale");
    let outcomes: Vec<(String, Result<PathBuf>)> = planned
        .par_iter()
        .map(|(img, output_path)| {
            let outcome = grayscale_to(&img.path, output_path);
            pb.inc(1);
            (img.file_name.clone(), outcome)
        })
        .collect();
    pb.finish_and_clear();

    for (file_name, outcome) in outcomes {
        match outcome {
            Ok(path) => {
                debug!("グレースケール変換: {} -> {}", file_name, path.display());
                report.record_written(path);
            }
            Err(e) => report.record_failure(file_name, e),
        }
    }

    Ok(report)
}

/// 1枚を変換して出力パスを返す
pub fn grayscale_image(input: &Path, output_dir: &Path) -> Result<PathBuf> {
    let stem = input
        .file_stem()
        .map(|s| s.to_string_lossy().to_string())
        .unwrap_or_default();
    grayscale_to(input, &output_dir.join(format!("{}{}.jpg", stem, GRAYSCALE_SUFFIX)))
}

fn grayscale_to(input: &Path, output_path: &Path) -> Result<PathBuf> {
    let img = image::open(input)?;
    img.to_luma8().save(output_path)?;
    Ok(output_path.to_path_buf())
}

/// 入力ごとの出力ファイル名（解決できない重複は `None`）
///
/// 名前は小文字で比較する。
fn output_names(inputs: &[ImageInfo]) -> Vec<Option<String>> {
    let mut stem_counts: HashMap<String, usize> = HashMap::new();
    for img in inputs {
        *stem_counts.entry(img.stem().to_lowercase()).or_default() += 1;
    }

    let mut used = HashSet::new();
    inputs
        .iter()
        .map(|img| {
            let stem = img.stem();
            let name = if stem_counts[&stem.to_lowercase()] > 1 {
                let ext = img
                    .path
                    .extension()
                    .map(|e| e.to_string_lossy().to_lowercase())
                    .unwrap_or_default();
                format!("{}_{}{}.jpg", stem, ext, GRAYSCALE_SUFFIX)
            } else {
                format!("{}{}.jpg", stem, GRAYSCALE_SUFFIX)
            };
            used.insert(name.to_lowercase()).then_some(name)
        })
        .collect()
}
