//! バッチ処理の結果集計
//!
//! 1件の失敗でバッチ全体を止めず、成功・スキップ・失敗を記録して最後に報告する。

use indicatif::{ProgressBar, ProgressStyle};
use log::warn;
use std::path::PathBuf;

/// 失敗した1件
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ItemFailure {
    pub item: String,
    pub reason: String,
}

#[derive(Debug, Clone, Default)]
pub struct BatchReport {
    /// 出力したファイル
    pub written: Vec<PathBuf>,
    /// 処理対象外としてスキップした項目
    pub skipped: Vec<String>,
    pub failures: Vec<ItemFailure>,
}

impl BatchReport {
    pub fn record_written(&mut self, path: PathBuf) {
        self.written.push(path);
    }

    pub fn record_skipped(&mut self, item: impl Into<String>) {
        self.skipped.push(item.into());
    }

    pub fn record_failure(&mut self, item: impl Into<String>, reason: impl ToString) {
        let failure = ItemFailure {
            item: item.into(),
            reason: reason.to_string(),
        };
        warn!("{}: {}", failure.item, failure.reason);
        self.failures.push(failure);
    }

    pub fn is_success(&self) -> bool {
        self.failures.is_empty()
    }

    /// 結果を標準出力に表示
    pub fn print_summary(&self, label: &str) {
        println!(
            "✔ {}: 出力 {}件 / スキップ {}件 / 失敗 {}件",
            label,
            self.written.len(),
            self.skipped.len(),
            self.failures.len()
        );
        for failure in &self.failures {
            println!("  ✗ {}: {}", failure.item, failure.reason);
        }
    }
}

/// ラベル付きのプログレスバーを作成
pub fn create_progress_bar(len: u64, label: &str) -> ProgressBar {
    let pb = ProgressBar::new(len);
    let style = ProgressStyle::default_bar()
        .template(&format!(
            "{{spinner:.green}} [{}] [{{elapsed_precise}}] [{{bar:40.cyan/blue}}] {{pos}}/{{len}} ({{eta}})",
            label
        ))
        .unwrap_or_else(|_| ProgressStyle::default_bar())
        .progress_chars("#>-");
    pb.set_style(style);
    pb
}
