//! Open Images からのデータセット作成（CSV取得 → 絞り込み → 画像取得 → ラベル出力）

use super::annotations::for_each_annotation;
use super::class_descriptions::ClassDescriptions;
use super::downloader::{download_all, DownloadRequest, DownloadSummary, Fetch};
use super::image_list::format_image_list;
use super::{AttributeFilter, Selector};
use crate::error::{AircraftIdError, Result};
use aircraft_id_common::{format_labels, YoloLabel};
use dialoguer::Confirm;
use log::info;
use std::collections::{BTreeMap, HashSet};
use std::fs::File;
use std::io::BufReader;
use std::path::{Path, PathBuf};

pub const IMAGES_DIR: &str = "images";
pub const LABELS_DIR: &str = "labels";
pub const IMAGE_LIST_FILE: &str = "img_ids.txt";
const CLASS_DESCRIPTIONS_FILE: &str = "class-descriptions-boxable.csv";

/// ダウンロード元のCSV
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AnnotationSource {
    pub split: String,
    pub file_name: String,
    pub url: String,
}

impl AnnotationSource {
    fn new(annotations_url: &str, split: &str, remote_path: &str) -> Self {
        let file_name = remote_path.rsplit('/').next().unwrap_or(remote_path).to_string();
        Self {
            split: split.to_string(),
            file_name,
            url: format!("{}/{}", annotations_url.trim_end_matches('/'), remote_path),
        }
    }
}

/// splitごとのアノテーションCSV
pub fn annotation_sources(annotations_url: &str, splits: &[String]) -> Result<Vec<AnnotationSource>> {
    splits
        .iter()
        .map(|split| {
            let remote = match split.as_str() {
                "train" => "v6/oidv6-train-annotations-bbox.csv",
                "validation" => "v5/validation-annotations-bbox.csv",
                "test" => "v5/test-annotations-bbox.csv",
                other => {
                    return Err(AircraftIdError::Config(format!(
                        "不明なsplit: {} (train/validation/test)",
                        other
                    )))
                }
            };
            Ok(AnnotationSource::new(annotations_url, split, remote))
        })
        .collect()
}

fn class_descriptions_source(annotations_url: &str) -> AnnotationSource {
    AnnotationSource::new(
        annotations_url,
        "classes",
        &format!("v5/{}", CLASS_DESCRIPTIONS_FILE),
    )
}

#[derive(Debug, Clone)]
pub struct PrepareOptions {
    /// クラス表示名（並び順がクラスインデックスになる）
    pub classes: Vec<String>,
    pub dataset_dir: PathBuf,
    pub csv_dir: PathBuf,
    pub splits: Vec<String>,
    pub filter: AttributeFilter,
    pub limit: Option<usize>,
    pub threads: usize,
    pub annotations_url: String,
    /// 不足CSVを確認なしでダウンロード
    pub auto_download: bool,
    /// 既存のデータセットフォルダを確認なしで削除
    pub assume_yes: bool,
}

#[derive(Debug, Clone, Default)]
pub struct PrepareSummary {
    /// (split, 画像数, ボックス数)
    pub splits: Vec<(String, usize, usize)>,
    pub download: DownloadSummary,
    pub labels_written: usize,
}

/// データセットを作成
///
/// 既存のデータセットフォルダの削除を拒否された場合は `Ok(None)`。
pub fn prepare_dataset<F: Fetch>(options: &PrepareOptions, fetcher: &F) -> Result<Option<PrepareSummary>> {
    if options.classes.is_empty() {
        return Err(AircraftIdError::Config("クラス名を1つ以上指定してください".into()));
    }
    let sources = annotation_sources(&options.annotations_url, &options.splits)?;

    println!("[1/4] データセットフォルダを準備中...");
    if !reset_dataset_dir(&options.dataset_dir, options.assume_yes)? {
        return Ok(None);
    }
    let images_dir = options.dataset_dir.join(IMAGES_DIR);
    let labels_dir = options.dataset_dir.join(LABELS_DIR);
    std::fs::create_dir_all(&images_dir)?;
    std::fs::create_dir_all(&labels_dir)?;

    println!("[2/4] アノテーションCSVを確認中...");
    std::fs::create_dir_all(&options.csv_dir)?;
    let descriptions_path = ensure_csv(
        &class_descriptions_source(&options.annotations_url),
        &options.csv_dir,
        options.auto_download,
        fetcher,
    )?;
    let descriptions = ClassDescriptions::parse(&std::fs::read_to_string(&descriptions_path)?);
    let codes = descriptions.resolve(&options.classes)?;
    for (index, (name, code)) in options.classes.iter().zip(&codes).enumerate() {
        info!("クラス {}: {} ({})", index, name, code);
    }

    println!("[3/4] アノテーションを絞り込み中...");
    let mut summary = PrepareSummary::default();
    let mut requests = Vec::new();
    let mut labels: BTreeMap<String, Vec<YoloLabel>> = BTreeMap::new();
    for source in &sources {
        let path = ensure_csv(source, &options.csv_dir, options.auto_download, fetcher)?;
        let mut selector = Selector::new(&codes, options.filter, options.limit);
        for_each_annotation(BufReader::new(File::open(&path)?), |a| selector.push(&a))?;
        let selection = selector.finish();

        println!(
            "  {}: 画像 {}件 / ボックス {}件",
            source.split,
            selection.image_ids.len(),
            selection.box_count()
        );
        summary.splits.push((
            source.split.clone(),
            selection.image_ids.len(),
            selection.box_count(),
        ));
        requests.extend(
            selection
                .image_ids
                .iter()
                .map(|id| DownloadRequest::new(source.split.as_str(), id.as_str())),
        );
        for (image_id, image_labels) in selection.labels {
            labels.entry(image_id).or_default().extend(image_labels);
        }
    }
    std::fs::write(
        options.dataset_dir.join(IMAGE_LIST_FILE),
        format_image_list(&requests),
    )?;

    println!("[4/4] 画像をダウンロード中...");
    summary.download = download_all(&requests, &images_dir, options.threads, fetcher)?;

    let failed: HashSet<&str> = summary.download.failed.iter().map(|f| f.item.as_str()).collect();
    for (image_id, image_labels) in &labels {
        if failed.contains(image_id.as_str()) {
            continue;
        }
        std::fs::write(labels_dir.join(format!("{}.txt", image_id)), format_labels(image_labels))?;
        summary.labels_written += 1;
    }

    Ok(Some(summary))
}

/// 既存フォルダは確認後に削除（拒否されたら false）
fn reset_dataset_dir(dataset_dir: &Path, assume_yes: bool) -> Result<bool> {
    if !dataset_dir.exists() {
        return Ok(true);
    }
    let confirmed = assume_yes
        || Confirm::new()
            .with_prompt(format!(
                "既存のデータセットフォルダ {} を削除しますか?",
                dataset_dir.display()
            ))
            .default(false)
            .interact()
            .map_err(|e| AircraftIdError::Prompt(e.to_string()))?;
    if !confirmed {
        return Ok(false);
    }
    std::fs::remove_dir_all(dataset_dir)?;
    info!("削除: {}", dataset_dir.display());
    Ok(true)
}

/// CSVがなければダウンロード（自動でなければ確認する）
fn ensure_csv<F: Fetch>(
    source: &AnnotationSource,
    csv_dir: &Path,
    auto_download: bool,
    fetcher: &F,
) -> Result<PathBuf> {
    let path = csv_dir.join(&source.file_name);
    if path.is_file() {
        return Ok(path);
    }

    let confirmed = auto_download
        || Confirm::new()
            .with_prompt(format!("{} がありません。ダウンロードしますか?", source.file_name))
            .default(true)
            .interact()
            .map_err(|e| AircraftIdError::Prompt(e.to_string()))?;
    if !confirmed {
        return Err(AircraftIdError::FileNotFound(path.display().to_string()));
    }

    println!("  ダウンロード: {}", source.url);
    fetcher.fetch_file(&source.url, &path)?;
    Ok(path)
}
