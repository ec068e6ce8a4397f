//! メタデータのサフィックス範囲展開
//!
//! 台帳の日付キー（例: `1984.19.47.a-s`）は同じ撮影日の複数写真を
//! サフィックス範囲でまとめて表す。ここでは範囲を個々のトークンに展開し、
//! ファイル名照合に使う候補文字列を生成する。
//!
//! 2文字トークンは `a..z, aa..az, ba..zz` の順に並ぶ（`z` の次は `aa`）。

use crate::error::{Error, Result};

/// 2文字トークンまでの総数（a..z + aa..zz）
const MAX_ORDINAL: usize = 26 + 26 * 26;

/// 日付キーを日付部とサフィックス部に分割
///
/// `-` と空白を `.` に統一し、先頭3要素を日付、残りをサフィックスとする。
/// 3要素以下ならサフィックスは空。
pub fn normalize_date_format(key: &str) -> (String, String) {
    let standardized = key.trim().replace(['-', ' '], ".");
    let parts: Vec<&str> = standardized.split('.').collect();

    if parts.len() > 3 {
        (parts[..3].join("."), parts[3..].join("."))
    } else {
        (standardized, String::new())
    }
}

/// サフィックス範囲（`a-s`, `a-gg`, `1-3`）を展開
///
/// `-` を含まない場合はそのまま1要素で返す。`-` が複数ある場合は
/// 最初の `-` より前を開始、最後の `-` より後を終了とみなす。
/// 大文字小文字は区別せず、結果は小文字。
pub fn expand_suffix_range(suffix: &str) -> Result<Vec<String>> {
    let suffix = suffix.trim().to_lowercase();

    let (Some(first_dash), Some(last_dash)) = (suffix.find('-'), suffix.rfind('-')) else {
        return Ok(vec![suffix]);
    };

    let start = &suffix[..first_dash];
    let end = &suffix[last_dash + 1..];

    if start.is_empty() {
        return Err(Error::Parse(format!("suffix range has no start: {}", suffix)));
    }
    if end.is_empty() {
        return Ok(vec![start.to_string()]);
    }

    let mut start_chars = start.chars();
    let mut end_chars = end.chars();
    if let (Some(s), None, Some(e), None) = (
        start_chars.next(),
        start_chars.next(),
        end_chars.next(),
        end_chars.next(),
    ) {
        let same_class = (s.is_ascii_lowercase() && e.is_ascii_lowercase())
            || (s.is_ascii_digit() && e.is_ascii_digit());
        if !same_class || s > e {
            return Err(Error::Parse(format!("invalid suffix range: {}", suffix)));
        }
        return Ok((s..=e).map(|c| c.to_string()).collect());
    }

    let s = letter_ordinal(start)
        .ok_or_else(|| Error::Parse(format!("invalid suffix range start: {}", suffix)))?;
    let e = letter_ordinal(end)
        .ok_or_else(|| Error::Parse(format!("invalid suffix range end: {}", suffix)))?;
    if s > e {
        return Err(Error::Parse(format!("suffix range is reversed: {}", suffix)));
    }

    Ok((s..=e).map(letter_token).collect())
}

/// 日付キーを照合候補に展開
///
/// 展開した各サフィックスを日付部にそのまま連結する
/// （`1984.19.47.a-c` → `1984.19.47a`, `1984.19.47b`, `1984.19.47c`）。
pub fn expand_metadata_key(key: &str) -> Result<Vec<String>> {
    let (base, suffix) = normalize_date_format(&key.to_lowercase());
    if suffix.is_empty() {
        return Ok(vec![base]);
    }

    let suffixes = expand_suffix_range(&suffix.replace('.', "-"))?;
    Ok(suffixes
        .into_iter()
        .map(|s| format!("{}{}", base, s))
        .collect())
}

/// 1〜2文字の英小文字トークンを通し番号に変換
fn letter_ordinal(token: &str) -> Option<usize> {
    let bytes = token.as_bytes();
    if !bytes.iter().all(|b| b.is_ascii_lowercase()) {
        return None;
    }
    match bytes {
        [c] => Some((c - b'a') as usize),
        [hi, lo] => Some(26 + (hi - b'a') as usize * 26 + (lo - b'a') as usize),
        _ => None,
    }
}

fn letter_token(ordinal: usize) -> String {
    debug_assert!(ordinal < MAX_ORDINAL);
    if ordinal < 26 {
        return ((b'a' + ordinal as u8) as char).to_string();
    }
    let rest = ordinal - 26;
    let hi = (b'a' + (rest / 26) as u8) as char;
    let lo = (b'a' + (rest % 26) as u8) as char;
    format!("{}{}", hi, lo)
}
