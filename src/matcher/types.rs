use serde::Serialize;

/// 台帳1行分（C列: 日付キー, D列: 説明）
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MetadataEntry {
    pub key: String,
    pub description: String,
}

impl MetadataEntry {
    pub fn new(key: impl Into<String>, description: impl Into<String>) -> Self {
        Self {
            key: key.into(),
            description: description.into(),
        }
    }
}

/// 照合結果（説明が空なら未照合）
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PhotoMatch {
    pub file_name: String,
    pub description: String,
    /// 一致した候補文字列
    #[serde(skip_serializing_if = "Option::is_none")]
    pub fragment: Option<String>,
}

impl PhotoMatch {
    pub fn is_matched(&self) -> bool {
        self.fragment.is_some()
    }
}

/// 展開できなかった日付キー
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RejectedKey {
    pub key: String,
    pub reason: String,
}

/// シート1枚分の照合結果
#[derive(Debug, Clone, Default, Serialize)]
pub struct SheetReport {
    pub sheet_name: String,
    pub image_folder: String,
    pub matches: Vec<PhotoMatch>,
    pub rejected_keys: Vec<RejectedKey>,
}

impl SheetReport {
    pub fn matched_count(&self) -> usize {
        self.matches.iter().filter(|m| m.is_matched()).count()
    }
}

#[derive(Debug, Clone, Copy, Default)]
pub struct MatchOptions {
    /// 候補の直後が同種の文字（数字の後の数字、英字の後の英字）なら不一致とする
    pub strict_boundary: bool,
}
