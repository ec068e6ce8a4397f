//! Aircraft ID Common Library
//!
//! CLIとテストで共有される型とユーティリティ

pub mod class_map;
pub mod detection;
pub mod error;
pub mod label;
pub mod suffix;

pub use class_map::ClassMap;
pub use detection::{load_results, ClassStats, Detection, DetectionSummary, ImageDetections};
pub use error::{Error, Result};
pub use label::{format_labels, parse_labels, YoloLabel};
pub use suffix::{expand_metadata_key, expand_suffix_range, normalize_date_format};
