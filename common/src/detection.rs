//! 検出結果の型定義と集計
//!
//! 検出結果JSON:
//! `[{ "image_name": ..., "detections": [{ "class_index", "class_name", "confidence", "bbox": [x1, y1, x2, y2] }] }]`

use crate::error::Result;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// 検出1件（bboxはピクセル座標のXYXY）
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Detection {
    pub class_index: usize,
    #[serde(default)]
    pub class_name: String,
    pub confidence: f64,
    pub bbox: [f64; 4],
}

/// 画像1枚分の検出結果
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ImageDetections {
    pub image_name: String,
    #[serde(default)]
    pub detections: Vec<Detection>,
}

/// 検出結果JSONを読み込み
pub fn load_results(json: &str) -> Result<Vec<ImageDetections>> {
    Ok(serde_json::from_str(json)?)
}

/// ヒストグラムのビン数（[0, 1] を等分）
pub const HISTOGRAM_BINS: usize = 10;

/// クラスごとの集計
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct ClassStats {
    pub class_name: String,
    pub count: usize,
    pub confidence_sum: f64,
    pub histogram: [usize; HISTOGRAM_BINS],
}

impl ClassStats {
    pub fn average_confidence(&self) -> f64 {
        if self.count == 0 {
            0.0
        } else {
            self.confidence_sum / self.count as f64
        }
    }

    fn record(&mut self, confidence: f64) {
        self.count += 1;
        self.confidence_sum += confidence;
        let clamped = confidence.clamp(0.0, 1.0);
        let bin = ((clamped * HISTOGRAM_BINS as f64) as usize).min(HISTOGRAM_BINS - 1);
        self.histogram[bin] += 1;
    }
}

/// 検出結果全体の集計
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct DetectionSummary {
    pub total_images: usize,
    pub images_with_detections: usize,
    pub images_without_detections: usize,
    pub total_detections: usize,
    /// 初出順
    pub classes: Vec<ClassStats>,
    pub images_no_detections: Vec<String>,
}

impl DetectionSummary {
    pub fn from_results(results: &[ImageDetections]) -> Self {
        let mut summary = Self {
            total_images: results.len(),
            ..Default::default()
        };
        let mut class_positions: HashMap<String, usize> = HashMap::new();

        for image in results {
            if image.detections.is_empty() {
                summary.images_without_detections += 1;
                summary.images_no_detections.push(image.image_name.clone());
                continue;
            }
            summary.images_with_detections += 1;

            for detection in &image.detections {
                summary.total_detections += 1;
                let position = *class_positions
                    .entry(detection.class_name.clone())
                    .or_insert_with(|| {
                        summary.classes.push(ClassStats {
                            class_name: detection.class_name.clone(),
                            ..Default::default()
                        });
                        summary.classes.len() - 1
                    });
                summary.classes[position].record(detection.confidence);
            }
        }

        summary
    }

    pub fn class(&self, name: &str) -> Option<&ClassStats> {
        self.classes.iter().find(|c| c.class_name == name)
    }
}
