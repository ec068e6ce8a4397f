//! Open Images からの学習データセット取得
//!
//! アノテーションCSVを属性フラグとクラスで絞り込み、画像IDの一覧とYOLOラベルを作る。
//! 画像本体は `downloader` が固定数のワーカーで取得する。

pub mod annotations;
pub mod class_descriptions;
pub mod downloader;
pub mod image_list;
mod prepare;

pub use annotations::{for_each_annotation, parse_annotations, BoxAnnotation};
pub use class_descriptions::ClassDescriptions;
pub use downloader::{download_all, DownloadRequest, DownloadSummary, Fetch, HttpFetcher};
pub use image_list::{format_image_list, parse_image_list};
pub use prepare::{
    annotation_sources, prepare_dataset, AnnotationSource, PrepareOptions, PrepareSummary,
    IMAGES_DIR, IMAGE_LIST_FILE,
};

use aircraft_id_common::YoloLabel;
use std::collections::{BTreeMap, HashMap, HashSet};

/// 属性フラグの値（2は不問）
pub const ANY: u8 = 2;

/// 属性フラグによる絞り込み条件
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AttributeFilter {
    pub occluded: u8,
    pub truncated: u8,
    pub group_of: u8,
    pub depiction: u8,
    pub inside: u8,
}

impl Default for AttributeFilter {
    fn default() -> Self {
        Self {
            occluded: ANY,
            truncated: ANY,
            group_of: ANY,
            depiction: ANY,
            inside: ANY,
        }
    }
}

impl AttributeFilter {
    fn flags(&self) -> [u8; annotations::ATTRIBUTE_COUNT] {
        [self.occluded, self.truncated, self.group_of, self.depiction, self.inside]
    }

    pub fn matches(&self, annotation: &BoxAnnotation) -> bool {
        self.flags()
            .iter()
            .zip(annotation.attributes.iter())
            .all(|(&wanted, actual)| wanted == ANY || wanted.to_string() == *actual)
    }
}

/// 絞り込み結果
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Selection {
    /// 画像ID（昇順、重複なし）
    pub image_ids: Vec<String>,
    /// 画像IDごとのラベル
    pub labels: BTreeMap<String, Vec<YoloLabel>>,
}

impl Selection {
    pub fn box_count(&self) -> usize {
        self.labels.values().map(Vec::len).sum()
    }
}

/// アノテーションを1件ずつ受け取って絞り込む
///
/// クラスインデックスは要求リスト内の位置。`limit` はクラスごとの画像数の上限。
pub struct Selector {
    class_index: HashMap<String, usize>,
    filter: AttributeFilter,
    limit: Option<usize>,
    images_per_class: Vec<HashSet<String>>,
    labels: BTreeMap<String, Vec<YoloLabel>>,
}

impl Selector {
    pub fn new(class_codes: &[String], filter: AttributeFilter, limit: Option<usize>) -> Self {
        let mut class_index = HashMap::new();
        for (index, code) in class_codes.iter().enumerate() {
            class_index.entry(code.clone()).or_insert(index);
        }
        Self {
            class_index,
            filter,
            limit,
            images_per_class: vec![HashSet::new(); class_codes.len()],
            labels: BTreeMap::new(),
        }
    }

    pub fn push(&mut self, annotation: &BoxAnnotation) {
        let Some(&class_id) = self.class_index.get(&annotation.label_name) else {
            return;
        };
        if !self.filter.matches(annotation) {
            return;
        }

        let images = &mut self.images_per_class[class_id];
        if !images.contains(&annotation.image_id) {
            if self.limit.is_some_and(|limit| images.len() >= limit) {
                return;
            }
            images.insert(annotation.image_id.clone());
        }

        self.labels
            .entry(annotation.image_id.clone())
            .or_default()
            .push(annotation.to_label(class_id));
    }

    pub fn finish(self) -> Selection {
        Selection {
            image_ids: self.labels.keys().cloned().collect(),
            labels: self.labels,
        }
    }
}

/// 要求クラスと属性フラグでアノテーションを絞り込む
pub fn select(
    annotations: &[BoxAnnotation],
    class_codes: &[String],
    filter: AttributeFilter,
    limit: Option<usize>,
) -> Selection {
    let mut selector = Selector::new(class_codes, filter, limit);
    for annotation in annotations {
        selector.push(annotation);
    }
    selector.finish()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn annotation(image_id: &str, label: &str, occluded: &str) -> BoxAnnotation {
        BoxAnnotation {
            image_id: image_id.to_string(),
            label_name: label.to_string(),
            x_min: 0.1,
            x_max: 0.3,
            y_min: 0.2,
            y_max: 0.6,
            attributes: [
                occluded.to_string(),
                "0".to_string(),
                "0".to_string(),
                "0".to_string(),
                "0".to_string(),
            ],
        }
    }

    fn codes(list: &[&str]) -> Vec<String> {
        list.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn test_filter_any_accepts_everything() {
        let filter = AttributeFilter::default();
        assert!(filter.matches(&annotation("a", "/m/1", "1")));
        assert!(filter.matches(&annotation("a", "/m/1", "-1")));
    }

    #[test]
    fn test_filter_exact_flag() {
        let filter = AttributeFilter {
            occluded: 0,
            ..Default::default()
        };
        assert!(filter.matches(&annotation("a", "/m/1", "0")));
        assert!(!filter.matches(&annotation("a", "/m/1", "1")));
    }

    #[test]
    fn test_select_uses_request_position_as_class() {
        let annotations = vec![
            annotation("ccc", "/m/heli", "0"),
            annotation("aaa", "/m/plane", "0"),
            annotation("aaa", "/m/heli", "0"),
            annotation("bbb", "/m/other", "0"),
        ];
        let selection = select(
            &annotations,
            &codes(&["/m/plane", "/m/heli"]),
            AttributeFilter::default(),
            None,
        );

        assert_eq!(selection.image_ids, vec!["aaa", "ccc"]);
        let aaa = &selection.labels["aaa"];
        assert_eq!(aaa.len(), 2);
        assert_eq!(aaa[0].class_id, 0);
        assert_eq!(aaa[1].class_id, 1);
        assert!((aaa[0].cx - 0.2).abs() < 1e-9);
        assert_eq!(selection.box_count(), 3);
    }

    #[test]
    fn test_select_limit_per_class() {
        let annotations = vec![
            annotation("a", "/m/plane", "0"),
            annotation("b", "/m/plane", "0"),
            annotation("a", "/m/plane", "0"),
            annotation("c", "/m/plane", "0"),
        ];
        let selection = select(&annotations, &codes(&["/m/plane"]), AttributeFilter::default(), Some(2));
        assert_eq!(selection.image_ids, vec!["a", "b"]);
        assert_eq!(selection.labels["a"].len(), 2);
    }
}
