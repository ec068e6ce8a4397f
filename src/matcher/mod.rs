//! 台帳メタデータと写真ファイル名の照合
//!
//! 日付キーをサフィックス展開した候補文字列を、正規化したファイル名に
//! 部分一致で照合する。1ファイルは最初に一致した候補にのみ割り当てる。

pub mod reference;
pub mod report;
mod types;
pub mod workbook;

pub use types::{MatchOptions, MetadataEntry, PhotoMatch, RejectedKey, SheetReport};

use crate::error::Result;
use crate::scanner::list_file_names;
use aircraft_id_common::expand_metadata_key;
use log::{info, warn};
use std::collections::{HashMap, HashSet};
use std::path::Path;

/// 照合候補（候補文字列 → 説明、初出順）
#[derive(Debug, Clone, Default)]
pub struct CandidateSet {
    fragments: Vec<(String, String)>,
    rejected: Vec<RejectedKey>,
}

impl CandidateSet {
    /// 台帳行から候補を構築
    ///
    /// 同じ候補が複数行から生成された場合は最初の位置を保ち、説明は後の行で上書きする。
    /// 展開できないキーは記録してスキップする。
    pub fn build(entries: &[MetadataEntry]) -> Self {
        let mut set = Self::default();
        let mut positions: HashMap<String, usize> = HashMap::new();

        for entry in entries {
            let fragments = match expand_metadata_key(&entry.key) {
                Ok(fragments) => fragments,
                Err(e) => {
                    warn!("日付キーを展開できません: {} ({})", entry.key, e);
                    set.rejected.push(RejectedKey {
                        key: entry.key.clone(),
                        reason: e.to_string(),
                    });
                    continue;
                }
            };

            for fragment in fragments.into_iter().filter(|f| !f.is_empty()) {
                match positions.get(&fragment) {
                    Some(&index) => set.fragments[index].1 = entry.description.clone(),
                    None => {
                        positions.insert(fragment.clone(), set.fragments.len());
                        set.fragments.push((fragment, entry.description.clone()));
                    }
                }
            }
        }

        set
    }

    pub fn fragments(&self) -> &[(String, String)] {
        &self.fragments
    }

    pub fn rejected(&self) -> &[RejectedKey] {
        &self.rejected
    }

    pub fn len(&self) -> usize {
        self.fragments.len()
    }

    pub fn is_empty(&self) -> bool {
        self.fragments.is_empty()
    }
}

/// 照合用にファイル名を正規化（小文字化、`-` と空白を `.` に）
pub fn normalize_file_name(file_name: &str) -> String {
    file_name.to_lowercase().replace(['-', ' '], ".")
}

/// 候補とファイル名を照合
///
/// 候補順に未使用のファイル名を走査し、一致したものを消費する。
/// 残ったファイル名は説明なしで末尾に並ぶ。
pub fn find_matches(
    candidates: &CandidateSet,
    file_names: &[String],
    options: MatchOptions,
) -> Vec<PhotoMatch> {
    let normalized: Vec<String> = file_names.iter().map(|f| normalize_file_name(f)).collect();
    let mut consumed: HashSet<usize> = HashSet::new();
    let mut matches = Vec::with_capacity(file_names.len());

    for (fragment, description) in candidates.fragments() {
        for (index, name) in normalized.iter().enumerate() {
            if consumed.contains(&index) || !contains_fragment(name, fragment, options) {
                continue;
            }
            consumed.insert(index);
            matches.push(PhotoMatch {
                file_name: file_names[index].clone(),
                description: description.clone(),
                fragment: Some(fragment.clone()),
            });
        }
    }

    for (index, file_name) in file_names.iter().enumerate() {
        if !consumed.contains(&index) {
            matches.push(PhotoMatch {
                file_name: file_name.clone(),
                description: String::new(),
                fragment: None,
            });
        }
    }

    matches
}

fn contains_fragment(name: &str, fragment: &str, options: MatchOptions) -> bool {
    if !options.strict_boundary {
        return name.contains(fragment);
    }

    let Some(last) = fragment.chars().last() else {
        return false;
    };

    name.match_indices(fragment).any(|(start, _)| {
        match name[start + fragment.len()..].chars().next() {
            None => true,
            Some(next) if last.is_ascii_digit() => !next.is_ascii_digit(),
            Some(next) if last.is_ascii_alphabetic() => !next.is_ascii_alphabetic(),
            Some(_) => true,
        }
    })
}

/// シート名から写真フォルダ名を得る（`-` は空白に）
pub fn image_folder_for_sheet(photos_root: &Path, sheet_name: &str) -> std::path::PathBuf {
    photos_root.join(sheet_name.replace('-', " "))
}

/// 台帳ワークブックの各シートを照合
///
/// `sheets` が空なら全シートを対象にする。写真フォルダがないシートは空の結果になる。
pub fn process_workbook(
    workbook_path: &Path,
    photos_root: &Path,
    sheets: &[String],
    options: MatchOptions,
) -> Result<Vec<SheetReport>> {
    let sheet_names = if sheets.is_empty() {
        workbook::sheet_names(workbook_path)?
    } else {
        sheets.to_vec()
    };

    let mut reports = Vec::with_capacity(sheet_names.len());
    for sheet_name in sheet_names {
        let entries = workbook::load_metadata(workbook_path, &sheet_name)?;
        let image_folder = image_folder_for_sheet(photos_root, &sheet_name);
        reports.push(match_sheet(&sheet_name, &entries, &image_folder, options)?);
    }

    Ok(reports)
}

/// 1シート分を照合
pub fn match_sheet(
    sheet_name: &str,
    entries: &[MetadataEntry],
    image_folder: &Path,
    options: MatchOptions,
) -> Result<SheetReport> {
    let candidates = CandidateSet::build(entries);
    let mut report = SheetReport {
        sheet_name: sheet_name.to_string(),
        image_folder: image_folder.display().to_string(),
        matches: Vec::new(),
        rejected_keys: candidates.rejected().to_vec(),
    };

    if !image_folder.is_dir() {
        warn!("写真フォルダが存在しません: {}", image_folder.display());
        return Ok(report);
    }

    let file_names = list_file_names(image_folder)?;
    report.matches = find_matches(&candidates, &file_names, options);
    info!(
        "シート '{}': 候補 {}件, ファイル {}件, 照合 {}件",
        sheet_name,
        candidates.len(),
        file_names.len(),
        report.matched_count()
    );

    Ok(report)
}
