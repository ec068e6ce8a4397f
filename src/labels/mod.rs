//! YOLOラベルファイルの生成と書き換え

mod csv;
mod relabel;

pub use self::csv::{csv_to_labels, parse_csv_line};
pub use relabel::{relabel_index, replace_class_names};

use crate::batch::{create_progress_bar, BatchReport};
use crate::error::{AircraftIdError, Result};
use crate::scanner::{has_extension, LABEL_IMAGE_EXTENSIONS};
use aircraft_id_common::{format_labels, ClassMap, ImageDetections, YoloLabel};
use log::debug;
use std::path::{Path, PathBuf};

pub const LABELS_DIR: &str = "labels";

/// 検出結果からのラベル生成条件
#[derive(Debug, Clone)]
pub struct StoreOptions {
    /// 残すクラスインデックス
    pub classes: Vec<usize>,
    /// この値を超える信頼度の検出のみ残す
    pub threshold: f64,
}

impl Default for StoreOptions {
    fn default() -> Self {
        Self {
            classes: vec![0],
            threshold: 0.25,
        }
    }
}

impl StoreOptions {
    /// クラス指定（インデックスまたはクラス名）をインデックスに解決
    ///
    /// クラス名はクラス名マップがある場合のみ使える。
    pub fn resolve_classes(tokens: &[String], class_map: Option<&ClassMap>) -> Result<Vec<usize>> {
        tokens
            .iter()
            .map(|token| {
                let token = token.trim();
                if let Ok(index) = token.parse::<usize>() {
                    return Ok(index);
                }
                class_map
                    .and_then(|map| map.index_of(token))
                    .ok_or_else(|| AircraftIdError::UnknownClass(token.to_string()))
            })
            .collect()
    }

    fn keeps(&self, class_index: usize, confidence: f64) -> bool {
        self.classes.contains(&class_index) && confidence > self.threshold
    }
}

/// 検出結果をラベルファイルに保存し、元画像を出力フォルダにコピー
///
/// ラベルは `<output>/labels/<stem>.txt`。残る検出がなくても空ファイルを出力する。
pub fn store_boxes(
    results: &[ImageDetections],
    images_dir: &Path,
    output_dir: &Path,
    options: &StoreOptions,
) -> Result<BatchReport> {
    if !images_dir.is_dir() {
        return Err(AircraftIdError::FolderNotFound(images_dir.display().to_string()));
    }
    let labels_dir = output_dir.join(LABELS_DIR);
    std::fs::create_dir_all(&labels_dir)?;

    let mut report = BatchReport::default();
    let pb = create_progress_bar(results.len() as u64, "Labels");

    for result in results {
        pb.inc(1);
        let image_path = images_dir.join(&result.image_name);
        if !has_extension(&image_path, LABEL_IMAGE_EXTENSIONS) {
            report.record_skipped(result.image_name.clone());
            continue;
        }
        if !image_path.is_file() {
            report.record_failure(result.image_name.clone(), "画像が見つかりません");
            continue;
        }

        match store_image_labels(result, &image_path, &labels_dir, output_dir, options) {
            Ok(label_path) => report.record_written(label_path),
            Err(e) => report.record_failure(result.image_name.clone(), e),
        }
    }

    pb.finish_and_clear();
    Ok(report)
}

fn store_image_labels(
    result: &ImageDetections,
    image_path: &Path,
    labels_dir: &Path,
    output_dir: &Path,
    options: &StoreOptions,
) -> Result<PathBuf> {
    let (width, height) = image::image_dimensions(image_path)?;

    let labels = result
        .detections
        .iter()
        .filter(|d| options.keeps(d.class_index, d.confidence))
        .map(|d| {
            let [x1, y1, x2, y2] = d.bbox;
            YoloLabel::from_xyxy(d.class_index, (x1, y1, x2, y2), width, height)
        })
        .collect::<std::result::Result<Vec<_>, _>>()?;

    let stem = image_path
        .file_stem()
        .map(|s| s.to_string_lossy().to_string())
        .unwrap_or_default();
    let label_path = labels_dir.join(format!("{}.txt", stem));
    std::fs::write(&label_path, format_labels(&labels))?;
    debug!("{}: {}件のボックスを保存", result.image_name, labels.len());

    if let Some(file_name) = image_path.file_name() {
        std::fs::copy(image_path, output_dir.join(file_name))?;
    }

    Ok(label_path)
}
