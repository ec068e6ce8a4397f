//! Open Images バウンディングボックスアノテーションCSV
//!
//! 列: `ImageID,Source,LabelName,Confidence,XMin,XMax,YMin,YMax,
//! IsOccluded,IsTruncated,IsGroupOf,IsDepiction,IsInside`（座標は正規化済み）

use crate::labels::parse_csv_line;
use aircraft_id_common::{Error, Result, YoloLabel};
use std::io::BufRead;

const FIELD_COUNT: usize = 13;
const HEADER_PREFIX: &str = "ImageID";

/// 属性フラグの並び（IsOccluded, IsTruncated, IsGroupOf, IsDepiction, IsInside）
pub const ATTRIBUTE_COUNT: usize = 5;

#[derive(Debug, Clone, PartialEq)]
pub struct BoxAnnotation {
    pub image_id: String,
    /// クラスのラベルコード（例: `/m/0cmf2`）
    pub label_name: String,
    pub x_min: f64,
    pub x_max: f64,
    pub y_min: f64,
    pub y_max: f64,
    /// 属性フラグの文字列表現（IsInsideは先頭1文字）
    pub attributes: [String; ATTRIBUTE_COUNT],
}

impl BoxAnnotation {
    /// 1行をパース（min/max は並べ替える）
    pub fn parse_line(line: &str) -> Result<Self> {
        let fields = parse_csv_line(line);
        if fields.len() < FIELD_COUNT {
            return Err(Error::Parse(format!(
                "expected {} fields, found {}",
                FIELD_COUNT,
                fields.len()
            )));
        }

        let coord = |i: usize| -> Result<f64> {
            fields[i]
                .parse::<f64>()
                .map_err(|_| Error::Parse(format!("invalid coordinate: {}", fields[i])))
        };
        let (x1, x2, y1, y2) = (coord(4)?, coord(5)?, coord(6)?, coord(7)?);

        let inside: String = fields[12].chars().take(1).collect();
        Ok(Self {
            image_id: fields[0].to_string(),
            label_name: fields[2].to_string(),
            x_min: x1.min(x2),
            x_max: x1.max(x2),
            y_min: y1.min(y2),
            y_max: y1.max(y2),
            attributes: [
                fields[8].to_string(),
                fields[9].to_string(),
                fields[10].to_string(),
                fields[11].to_string(),
                inside,
            ],
        })
    }

    pub fn to_label(&self, class_id: usize) -> YoloLabel {
        YoloLabel::from_normalized_minmax(class_id, self.x_min, self.x_max, self.y_min, self.y_max)
    }
}

/// ヘッダー行・空行を除いて各行を順に渡す
///
/// アノテーションCSVは数GBになるため、全件をメモリに載せずに処理する。
pub fn for_each_annotation<R, F>(reader: R, mut f: F) -> Result<()>
where
    R: BufRead,
    F: FnMut(BoxAnnotation),
{
    for (index, line) in reader.lines().enumerate() {
        let line = line?;
        let line = line.trim_start_matches('\u{feff}');
        if line.trim().is_empty() || (index == 0 && line.starts_with(HEADER_PREFIX)) {
            continue;
        }
        let annotation = BoxAnnotation::parse_line(line).map_err(|e| match e {
            Error::Parse(msg) => Error::Parse(format!("line {}: {}", index + 1, msg)),
            other => other,
        })?;
        f(annotation);
    }
    Ok(())
}

pub fn parse_annotations<R: BufRead>(reader: R) -> Result<Vec<BoxAnnotation>> {
    let mut annotations = Vec::new();
    for_each_annotation(reader, |a| annotations.push(a))?;
    Ok(annotations)
}
