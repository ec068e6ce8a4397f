//! 固定数ワーカーによる画像の並列ダウンロード
//!
//! 各タスクは1枚だけを取得し、失敗はその画像の結果として記録する。
//! 保存先に同じIDのファイル（拡張子不問）があれば要求しない。

use crate::batch::{create_progress_bar, ItemFailure};
use crate::error::{AircraftIdError, Result};
use crate::scanner::list_file_names;
use log::{debug, info, warn};
use rayon::prelude::*;
use std::collections::HashSet;
use std::path::{Path, PathBuf};
use std::time::Duration;

const USER_AGENT: &str = concat!("aircraft-id/", env!("CARGO_PKG_VERSION"));
const PARTIAL_SUFFIX: &str = "part";

#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct DownloadRequest {
    pub split: String,
    pub image_id: String,
}

impl DownloadRequest {
    pub fn new(split: impl Into<String>, image_id: impl Into<String>) -> Self {
        Self {
            split: split.into(),
            image_id: image_id.into(),
        }
    }

    pub fn file_name(&self) -> String {
        format!("{}.jpg", self.image_id)
    }
}

/// 取得処理（ワーカーから共有される）
pub trait Fetch: Sync {
    /// 画像1枚を取得
    fn fetch(&self, request: &DownloadRequest) -> Result<Vec<u8>>;

    /// URLの内容をファイルに保存し、書き込んだバイト数を返す
    fn fetch_file(&self, url: &str, dest: &Path) -> Result<u64>;
}

/// 公開バケットからHTTPSで取得
pub struct HttpFetcher {
    client: reqwest::blocking::Client,
    bucket_url: String,
}

impl HttpFetcher {
    pub fn new(bucket_url: &str, timeout: Duration) -> Result<Self> {
        let client = reqwest::blocking::Client::builder()
            .user_agent(USER_AGENT)
            .timeout(timeout)
            .build()?;
        Ok(Self {
            client,
            bucket_url: bucket_url.trim_end_matches('/').to_string(),
        })
    }

    /// `{bucket}/{split}/{id}.jpg`
    pub fn url_for(&self, request: &DownloadRequest) -> String {
        format!("{}/{}/{}", self.bucket_url, request.split, request.file_name())
    }
}

impl Fetch for HttpFetcher {
    fn fetch(&self, request: &DownloadRequest) -> Result<Vec<u8>> {
        let url = self.url_for(request);
        debug!("GET {}", url);

        let response = self.client.get(&url).send()?;
        let status = response.status();
        if !status.is_success() {
            return Err(AircraftIdError::Download(format!("{} ({})", url, status)));
        }
        Ok(response.bytes()?.to_vec())
    }

    fn fetch_file(&self, url: &str, dest: &Path) -> Result<u64> {
        let mut response = self.client.get(url).send()?.error_for_status()?;
        let pb = create_progress_bar(response.content_length().unwrap_or(0), "CSV");

        let result = write_via_partial(dest, |partial| {
            let mut writer = pb.wrap_write(std::fs::File::create(partial)?);
            Ok(response.copy_to(&mut writer)?)
        });
        pb.finish_and_clear();

        let written = result?;
        info!("{} → {} ({} bytes)", url, dest.display(), written);
        Ok(written)
    }
}

#[derive(Debug, Clone, Default)]
pub struct DownloadSummary {
    pub downloaded: Vec<PathBuf>,
    /// 既に存在した画像ID
    pub skipped: Vec<String>,
    pub failed: Vec<ItemFailure>,
}

impl DownloadSummary {
    pub fn is_success(&self) -> bool {
        self.failed.is_empty()
    }

    pub fn print_summary(&self) {
        println!(
            "✔ ダウンロード: 取得 {}件 / スキップ {}件 / 失敗 {}件",
            self.downloaded.len(),
            self.skipped.len(),
            self.failed.len()
        );
        for failure in &self.failed {
            println!("  ✗ {}: {}", failure.item, failure.reason);
        }
    }
}

/// 未取得の要求だけを残す（重複したIDは最初の1件のみ）
///
/// 戻り値は (取得する要求, 既に存在するID)。
pub fn pending_downloads(
    requests: &[DownloadRequest],
    download_dir: &Path,
) -> Result<(Vec<DownloadRequest>, Vec<String>)> {
    let existing: HashSet<String> = if download_dir.is_dir() {
        list_file_names(download_dir)?
            .iter()
            .filter_map(|name| Path::new(name).file_stem())
            .map(|stem| stem.to_string_lossy().to_string())
            .collect()
    } else {
        HashSet::new()
    };

    let mut seen = HashSet::new();
    let mut pending = Vec::new();
    let mut skipped = Vec::new();
    for request in requests {
        if !seen.insert(request.image_id.clone()) {
            continue;
        }
        if existing.contains(&request.image_id) {
            skipped.push(request.image_id.clone());
        } else {
            pending.push(request.clone());
        }
    }

    Ok((pending, skipped))
}

/// 画像をまとめてダウンロード
///
/// `threads` 個のワーカーで処理し、1件の失敗で他を止めない。再試行はしない。
pub fn download_all<F: Fetch>(
    requests: &[DownloadRequest],
    download_dir: &Path,
    threads: usize,
    fetcher: &F,
) -> Result<DownloadSummary> {
    if threads == 0 {
        return Err(AircraftIdError::Config("スレッド数は1以上を指定してください".into()));
    }
    std::fs::create_dir_all(download_dir)?;

    let (pending, skipped) = pending_downloads(requests, download_dir)?;
    if !skipped.is_empty() {
        info!("既存の画像 {}件をスキップ", skipped.len());
    }

    let pool = rayon::ThreadPoolBuilder::new()
        .num_threads(threads)
        .build()
        .map_err(|e| AircraftIdError::Download(e.to_string()))?;

    let pb = create_progress_bar(pending.len() as u64, "Download");
    let outcomes: Vec<(String, Result<PathBuf>)> = pool.install(|| {
        pending
            .par_iter()
            .map(|request| {
                let result = download_one(request, download_dir, fetcher);
                pb.inc(1);
                (request.image_id.clone(), result)
            })
            .collect()
    });
    pb.finish_and_clear();

    let mut summary = DownloadSummary {
        skipped,
        ..Default::default()
    };
    for (image_id, result) in outcomes {
        match result {
            Ok(path) => summary.downloaded.push(path),
            Err(e) => {
                warn!("{}: {}", image_id, e);
                summary.failed.push(ItemFailure {
                    item: image_id,
                    reason: e.to_string(),
                });
            }
        }
    }

    Ok(summary)
}

fn download_one<F: Fetch>(request: &DownloadRequest, download_dir: &Path, fetcher: &F) -> Result<PathBuf> {
    let bytes = fetcher.fetch(request)?;
    let dest = download_dir.join(request.file_name());
    write_via_partial(&dest, |partial| Ok(std::fs::write(partial, bytes)?))?;
    Ok(dest)
}

/// `.part` に書き込んでから置き換える（失敗時は `.part` を削除）
fn write_via_partial<T>(dest: &Path, write: impl FnOnce(&Path) -> Result<T>) -> Result<T> {
    let partial = partial_path(dest);
    let result = write(&partial).and_then(|value| {
        std::fs::rename(&partial, dest)?;
        Ok(value)
    });

    if result.is_err() && partial.exists() {
        if let Err(e) = std::fs::remove_file(&partial) {
            warn!("{}: {}", partial.display(), e);
        }
    }
    result
}

fn partial_path(dest: &Path) -> PathBuf {
    let mut name = dest.file_name().map(|n| n.to_os_string()).unwrap_or_default();
    name.push(".");
    name.push(PARTIAL_SUFFIX);
    dest.with_file_name(name)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicUsize, Ordering};

    struct FakeFetcher {
        calls: AtomicUsize,
    }

    impl Fetch for FakeFetcher {
        fn fetch(&self, request: &DownloadRequest) -> Result<Vec<u8>> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            if request.image_id.starts_with("bad") {
                Err(AircraftIdError::Download(format!("404 {}", request.image_id)))
            } else {
                Ok(request.image_id.as_bytes().to_vec())
            }
        }

        fn fetch_file(&self, url: &str, _dest: &Path) -> Result<u64> {
            Err(AircraftIdError::Download(url.to_string()))
        }
    }

    #[test]
    fn test_url_for() {
        let fetcher = HttpFetcher::new("https://bucket.example/", Duration::from_secs(5)).unwrap();
        let url = fetcher.url_for(&DownloadRequest::new("train", "00ab"));
        assert_eq!(url, "https://bucket.example/train/00ab.jpg");
    }

    #[test]
    fn test_pending_downloads_skips_existing_any_extension() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(dir.path().join("aa.png"), b"x").unwrap();
        let requests = vec![
            DownloadRequest::new("train", "aa"),
            DownloadRequest::new("train", "bb"),
            DownloadRequest::new("test", "bb"),
        ];

        let (pending, skipped) = pending_downloads(&requests, dir.path()).unwrap();
        assert_eq!(pending, vec![DownloadRequest::new("train", "bb")]);
        assert_eq!(skipped, vec!["aa"]);
    }

    #[test]
    fn test_download_all_isolates_failures() {
        let dir = tempfile::tempdir().unwrap();
        let fetcher = FakeFetcher { calls: AtomicUsize::new(0) };
        let requests = vec![
            DownloadRequest::new("train", "a1"),
            DownloadRequest::new("train", "bad1"),
            DownloadRequest::new("validation", "b2"),
        ];

        let summary = download_all(&requests, dir.path(), 2, &fetcher).unwrap();
        assert_eq!(summary.downloaded.len(), 2);
        assert_eq!(summary.failed.len(), 1);
        assert_eq!(summary.failed[0].item, "bad1");
        assert_eq!(std::fs::read(dir.path().join("b2.jpg")).unwrap(), b"b2");
        assert!(!dir.path().join("bad1.jpg").exists());
        assert_eq!(fetcher.calls.load(Ordering::SeqCst), 3);
    }

    #[test]
    fn test_failed_write_leaves_no_partial_file() {
        let dir = tempfile::tempdir().unwrap();
        let blocked = dir.path().join("a1.jpg");
        std::fs::create_dir(&blocked).unwrap();
        std::fs::write(blocked.join("keep"), b"x").unwrap();
        let fetcher = FakeFetcher { calls: AtomicUsize::new(0) };

        let summary = download_all(&[DownloadRequest::new("train", "a1")], dir.path(), 1, &fetcher).unwrap();
        assert_eq!(summary.failed.len(), 1);
        assert!(summary.downloaded.is_empty());
        assert!(!dir.path().join("a1.jpg.part").exists());
    }

    #[test]
    fn test_download_all_rejects_zero_threads() {
        let dir = tempfile::tempdir().unwrap();
        let fetcher = FakeFetcher { calls: AtomicUsize::new(0) };
        let result = download_all(&[], dir.path(), 0, &fetcher);
        assert!(matches!(result, Err(AircraftIdError::Config(_))));
    }
}
