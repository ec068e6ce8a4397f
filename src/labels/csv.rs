//! バウンディングボックスCSVからのラベル生成
//!
//! 形式: `image_path,x1,y1,x2,y2,class_name`（ピクセル座標、ヘッダー行は任意）

use crate::batch::BatchReport;
use crate::error::{AircraftIdError, Result};
use aircraft_id_common::{format_labels, ClassMap, YoloLabel};
use log::debug;
use std::collections::{BTreeMap, HashMap};
use std::path::{Path, PathBuf};

const FIELD_COUNT: usize = 6;

/// CSVの1行をパース（ダブルクォート内のカンマは区切りとみなさない）
pub fn parse_csv_line(line: &str) -> Vec<&str> {
    let mut fields = Vec::new();
    let mut in_quotes = false;
    let mut field_start = 0;

    for (i, c) in line.char_indices() {
        if c == '"' {
            in_quotes = !in_quotes;
        } else if c == ',' && !in_quotes {
            fields.push(trim_quotes(&line[field_start..i]));
            field_start = i + 1;
        }
    }
    fields.push(trim_quotes(&line[field_start..]));

    fields
}

fn trim_quotes(s: &str) -> &str {
    let s = s.trim();
    if s.len() >= 2 && s.starts_with('"') && s.ends_with('"') {
        &s[1..s.len() - 1]
    } else {
        s
    }
}

/// 1行分のボックス
struct CsvBox<'a> {
    image: &'a str,
    corners: (f64, f64, f64, f64),
    class_name: &'a str,
}

fn parse_box(line: &str) -> Option<CsvBox<'_>> {
    let fields = parse_csv_line(line);
    if fields.len() < FIELD_COUNT {
        return None;
    }
    let coord = |i: usize| fields[i].parse::<f64>().ok();
    Some(CsvBox {
        image: fields[0],
        corners: (coord(1)?, coord(2)?, coord(3)?, coord(4)?),
        class_name: fields[5],
    })
}

/// CSVを画像ごとのラベルファイルに変換
///
/// 画像パスが相対ならCSVのあるフォルダから解決する。
/// 不明なクラス名や読めない画像の行は失敗として記録し、他の行は続行する。
pub fn csv_to_labels(csv_path: &Path, class_map: &ClassMap, output_dir: &Path) -> Result<BatchReport> {
    if !csv_path.is_file() {
        return Err(AircraftIdError::FileNotFound(csv_path.display().to_string()));
    }
    let content = std::fs::read_to_string(csv_path)?;
    let base_dir = csv_path.parent().unwrap_or(Path::new("."));
    std::fs::create_dir_all(output_dir)?;

    let mut report = BatchReport::default();
    let mut grouped: BTreeMap<String, Vec<YoloLabel>> = BTreeMap::new();
    let mut dimensions: HashMap<String, Option<(u32, u32)>> = HashMap::new();

    for (index, line) in content.lines().enumerate() {
        let line_no = index + 1;
        let line = line.trim_start_matches('\u{feff}');
        if line.trim().is_empty() {
            continue;
        }
        let Some(row) = parse_box(line) else {
            if index == 0 {
                debug!("ヘッダー行をスキップ: {}", line);
            } else {
                report.record_failure(format!("{}行目", line_no), "不正な行");
            }
            continue;
        };

        let Some(class_id) = class_map.index_of(row.class_name) else {
            report.record_failure(
                format!("{}行目", line_no),
                AircraftIdError::UnknownClass(row.class_name.to_string()),
            );
            continue;
        };

        let dims = *dimensions.entry(row.image.to_string()).or_insert_with(|| {
            image::image_dimensions(resolve_image(base_dir, row.image)).ok()
        });
        let Some((width, height)) = dims else {
            report.record_failure(format!("{}行目", line_no), format!("画像を読み込めません: {}", row.image));
            continue;
        };

        match YoloLabel::from_xyxy(class_id, row.corners, width, height) {
            Ok(label) => grouped.entry(row.image.to_string()).or_default().push(label),
            Err(e) => report.record_failure(format!("{}行目", line_no), e),
        }
    }

    for (image, labels) in grouped {
        let stem = Path::new(&image)
            .file_stem()
            .map(|s| s.to_string_lossy().to_string())
            .unwrap_or(image.clone());
        let label_path = output_dir.join(format!("{}.txt", stem));
        std::fs::write(&label_path, format_labels(&labels))?;
        report.record_written(label_path);
    }

    Ok(report)
}

fn resolve_image(base_dir: &Path, image: &str) -> PathBuf {
    let path = Path::new(image);
    if path.is_absolute() {
        path.to_path_buf()
    } else {
        base_dir.join(path)
    }
}
