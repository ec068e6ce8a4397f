//! ダウンロード対象の画像リスト（1行1件: `split/imageid[.jpg]`）

use super::downloader::DownloadRequest;
use crate::error::{AircraftIdError, Result};
use regex::Regex;

lazy_static::lazy_static! {
    static ref IMAGE_PATTERN: Regex =
        Regex::new(r"^(test|train|validation|challenge2018)/([a-fA-F0-9]+)$").unwrap();
}

/// 画像リストをパース（空行は無視、`.jpg` は除去）
///
/// 不正な行があれば行番号（1始まり）付きのエラーを返す。
pub fn parse_image_list(text: &str) -> Result<Vec<DownloadRequest>> {
    let mut requests = Vec::new();

    for (index, raw) in text.lines().enumerate() {
        let line = raw.trim().replace(".jpg", "");
        if line.is_empty() {
            continue;
        }
        let captures = IMAGE_PATTERN
            .captures(&line)
            .ok_or_else(|| AircraftIdError::InvalidImageList {
                line: index + 1,
                content: raw.trim().to_string(),
            })?;
        requests.push(DownloadRequest::new(&captures[1], &captures[2]));
    }

    Ok(requests)
}

/// `split/imageid` 形式で書き出し
pub fn format_image_list(requests: &[DownloadRequest]) -> String {
    requests
        .iter()
        .map(|r| format!("{}/{}\n", r.split, r.image_id))
        .collect()
}
