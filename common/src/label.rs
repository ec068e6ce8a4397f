//! YOLO形式ラベル
//!
//! 1行1物体: `class_id cx cy w h`（スペース区切り、座標は画像サイズで正規化）

use crate::error::{Error, Result};
use serde::{Deserialize, Serialize};
use std::fmt;

/// ラベル1行分
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct YoloLabel {
    pub class_id: usize,
    pub cx: f64,
    pub cy: f64,
    pub w: f64,
    pub h: f64,
}

impl YoloLabel {
    pub fn new(class_id: usize, cx: f64, cy: f64, w: f64, h: f64) -> Self {
        Self { class_id, cx, cy, w, h }
    }

    /// ピクセル座標のXYXYボックスから生成
    ///
    /// 座標の大小が逆でも並べ替えてから正規化する。
    pub fn from_xyxy(
        class_id: usize,
        (x1, y1, x2, y2): (f64, f64, f64, f64),
        image_width: u32,
        image_height: u32,
    ) -> Result<Self> {
        if image_width == 0 || image_height == 0 {
            return Err(Error::Parse(format!(
                "image size must be non-zero: {}x{}",
                image_width, image_height
            )));
        }

        let (x_min, x_max) = (x1.min(x2), x1.max(x2));
        let (y_min, y_max) = (y1.min(y2), y1.max(y2));
        let width = image_width as f64;
        let height = image_height as f64;

        Ok(Self {
            class_id,
            cx: (x_min + x_max) / 2.0 / width,
            cy: (y_min + y_max) / 2.0 / height,
            w: (x_max - x_min) / width,
            h: (y_max - y_min) / height,
        })
    }

    /// 正規化済みの min/max 座標から生成（Open Imagesのアノテーション形式）
    pub fn from_normalized_minmax(
        class_id: usize,
        x_min: f64,
        x_max: f64,
        y_min: f64,
        y_max: f64,
    ) -> Self {
        let (x_min, x_max) = (x_min.min(x_max), x_min.max(x_max));
        let (y_min, y_max) = (y_min.min(y_max), y_min.max(y_max));
        Self {
            class_id,
            cx: (x_min + x_max) / 2.0,
            cy: (y_min + y_max) / 2.0,
            w: x_max - x_min,
            h: y_max - y_min,
        }
    }

    /// 1行をパース（空行は `None`）
    pub fn parse_line(line: &str) -> Result<Option<Self>> {
        let fields: Vec<&str> = line.split_whitespace().collect();
        if fields.is_empty() {
            return Ok(None);
        }
        if fields.len() != 5 {
            return Err(Error::Parse(format!(
                "expected 5 fields, got {}: {}",
                fields.len(),
                line.trim()
            )));
        }

        let class_id = fields[0]
            .parse::<usize>()
            .map_err(|_| Error::Parse(format!("invalid class id: {}", fields[0])))?;

        let mut values = [0.0f64; 4];
        for (value, field) in values.iter_mut().zip(&fields[1..]) {
            *value = field
                .parse::<f64>()
                .map_err(|_| Error::Parse(format!("invalid coordinate: {}", field)))?;
        }
        let [cx, cy, w, h] = values;

        Ok(Some(Self { class_id, cx, cy, w, h }))
    }
}

impl fmt::Display for YoloLabel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} {} {} {} {}", self.class_id, self.cx, self.cy, self.w, self.h)
    }
}

/// ラベルファイルの内容をパース
pub fn parse_labels(content: &str) -> Result<Vec<YoloLabel>> {
    let mut labels = Vec::new();
    for (index, line) in content.lines().enumerate() {
        let parsed = YoloLabel::parse_line(line)
            .map_err(|e| Error::Parse(format!("line {}: {}", index + 1, e)))?;
        if let Some(label) = parsed {
            labels.push(label);
        }
    }
    Ok(labels)
}

/// ラベル一覧をファイル内容に整形（各行末に改行）
pub fn format_labels(labels: &[YoloLabel]) -> String {
    labels.iter().map(|label| format!("{}\n", label)).collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    const EPS: f64 = 1e-9;

    fn assert_close(a: f64, b: f64) {
        assert!((a - b).abs() < EPS, "{} != {}", a, b);
    }

    #[test]
    fn test_from_xyxy() {
        let label = YoloLabel::from_xyxy(0, (100.0, 50.0, 300.0, 250.0), 400, 500).unwrap();
        assert_close(label.cx, 0.5);
        assert_close(label.cy, 0.3);
        assert_close(label.w, 0.5);
        assert_close(label.h, 0.4);
    }

    #[test]
    fn test_from_xyxy_swapped_corners() {
        let a = YoloLabel::from_xyxy(1, (300.0, 250.0, 100.0, 50.0), 400, 500).unwrap();
        let b = YoloLabel::from_xyxy(1, (100.0, 50.0, 300.0, 250.0), 400, 500).unwrap();
        assert_eq!(a, b);
    }

    #[test]
    fn test_from_xyxy_zero_size_image() {
        assert!(YoloLabel::from_xyxy(0, (0.0, 0.0, 1.0, 1.0), 0, 10).is_err());
    }

    #[test]
    fn test_written_line_parses_back() {
        let boxes = [
            (12.5, 7.25, 640.0, 480.0, 1280, 720),
            (0.0, 0.0, 1.0, 1.0, 3, 7),
            (333.3, 111.1, 999.9, 555.5, 1024, 768),
        ];
        for (x1, y1, x2, y2, w, h) in boxes {
            let label = YoloLabel::from_xyxy(2, (x1, y1, x2, y2), w, h).unwrap();
            let parsed = YoloLabel::parse_line(&label.to_string()).unwrap().unwrap();
            assert_eq!(parsed.class_id, 2);
            assert_close(parsed.cx, label.cx);
            assert_close(parsed.cy, label.cy);
            assert_close(parsed.w, label.w);
            assert_close(parsed.h, label.h);
        }
    }

    #[test]
    fn test_from_normalized_minmax() {
        let label = YoloLabel::from_normalized_minmax(3, 0.2, 0.6, 0.9, 0.1);
        assert_close(label.cx, 0.4);
        assert_close(label.cy, 0.5);
        assert_close(label.w, 0.4);
        assert_close(label.h, 0.8);
    }

    #[test]
    fn test_parse_blank_line() {
        assert!(YoloLabel::parse_line("   ").unwrap().is_none());
    }

    #[test]
    fn test_parse_invalid_lines() {
        assert!(YoloLabel::parse_line("0 0.5 0.5 0.1").is_err());
        assert!(YoloLabel::parse_line("Aircraft 0.5 0.5 0.1 0.1").is_err());
        assert!(YoloLabel::parse_line("0 0.5 x 0.1 0.1").is_err());
    }

    #[test]
    fn test_parse_labels_reports_line_number() {
        let err = parse_labels("0 0.5 0.5 0.1 0.1\n\n0 bad\n").unwrap_err();
        assert!(format!("{}", err).contains("line 3"));
    }

    #[test]
    fn test_format_labels() {
        let labels = vec![
            YoloLabel::new(0, 0.5, 0.5, 0.25, 0.25),
            YoloLabel::new(1, 0.1, 0.2, 0.3, 0.4),
        ];
        let content = format_labels(&labels);
        assert_eq!(content, "0 0.5 0.5 0.25 0.25\n1 0.1 0.2 0.3 0.4\n");
        assert_eq!(parse_labels(&content).unwrap(), labels);
    }
}
