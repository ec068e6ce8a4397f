//! 既存ラベルファイルのクラス列の書き換え

use crate::batch::BatchReport;
use crate::error::Result;
use crate::scanner::scan_folder;
use aircraft_id_common::ClassMap;
use std::path::Path;

const LABEL_EXTENSIONS: &[&str] = &["txt"];

/// 全行の先頭トークンを `new_index` に置換
pub fn relabel_index(folder: &Path, new_index: usize) -> Result<BatchReport> {
    let replacement = new_index.to_string();
    rewrite_first_tokens(folder, |_| Some(replacement.clone()))
}

/// 先頭トークンがクラス名ならインデックスに置換（それ以外の行はそのまま）
pub fn replace_class_names(folder: &Path, class_map: &ClassMap) -> Result<BatchReport> {
    rewrite_first_tokens(folder, |token| class_map.index_of(token).map(|i| i.to_string()))
}

fn rewrite_first_tokens<F>(folder: &Path, replace: F) -> Result<BatchReport>
where
    F: Fn(&str) -> Option<String>,
{
    let mut report = BatchReport::default();

    for file in scan_folder(folder, LABEL_EXTENSIONS)? {
        let content = match std::fs::read_to_string(&file.path) {
            Ok(content) => content,
            Err(e) => {
                report.record_failure(file.file_name, e);
                continue;
            }
        };

        let rewritten = rewrite_content(&content, &replace);
        if rewritten == content {
            report.record_skipped(file.file_name);
            continue;
        }
        match std::fs::write(&file.path, rewritten) {
            Ok(()) => report.record_written(file.path),
            Err(e) => report.record_failure(file.file_name, e),
        }
    }

    Ok(report)
}

/// 空行は除き、各行を空白1つ区切りで出力し直す
fn rewrite_content<F>(content: &str, replace: &F) -> String
where
    F: Fn(&str) -> Option<String>,
{
    let mut out = String::with_capacity(content.len());
    for line in content.lines() {
        let mut parts: Vec<String> = line.split_whitespace().map(str::to_string).collect();
        let Some(first) = parts.first_mut() else {
            continue;
        };
        if let Some(new_token) = replace(first.as_str()) {
            *first = new_token;
        }
        out.push_str(&parts.join(" "));
        out.push('\n');
    }
    out
}
