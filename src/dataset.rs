//! クラスフォルダ構成のデータセットを train / val / test に分割

use crate::error::{AircraftIdError, Result};
use crate::scanner::list_file_names;
use log::{info, warn};
use rand::rngs::StdRng;
use rand::seq::SliceRandom;
use rand::SeedableRng;
use std::path::Path;
use walkdir::WalkDir;

pub const SPLIT_DIRS: [&str; 3] = ["train", "val", "test"];
const RATIO_TOLERANCE: f64 = 1e-6;

/// 分割比率（合計1）
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SplitRatios {
    pub train: f64,
    pub val: f64,
    pub test: f64,
}

impl Default for SplitRatios {
    fn default() -> Self {
        Self {
            train: 0.7,
            val: 0.15,
            test: 0.15,
        }
    }
}

impl SplitRatios {
    pub fn new(train: f64, val: f64, test: f64) -> Result<Self> {
        if [train, val, test].iter().any(|r| !r.is_finite() || *r < 0.0) {
            return Err(AircraftIdError::Config(format!(
                "分割比率は0以上で指定してください: {}, {}, {}",
                train, val, test
            )));
        }
        let sum = train + val + test;
        if (sum - 1.0).abs() > RATIO_TOLERANCE {
            return Err(AircraftIdError::Config(format!(
                "分割比率の合計が1になりません: {}",
                sum
            )));
        }
        Ok(Self { train, val, test })
    }

    pub fn from_slice(ratios: &[f64]) -> Result<Self> {
        match ratios {
            [train, val, test] => Self::new(*train, *val, *test),
            _ => Err(AircraftIdError::Config(format!(
                "分割比率は train,val,test の3つを指定してください（{}個指定）",
                ratios.len()
            ))),
        }
    }

    /// n件の配分（train, val は切り捨て、残りを test）
    pub fn counts(&self, n: usize) -> [usize; 3] {
        let train = ((n as f64 * self.train).floor() as usize).min(n);
        let val = ((n as f64 * self.val).floor() as usize).min(n - train);
        [train, val, n - train - val]
    }
}

/// クラスごとの配分結果
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ClassSplit {
    pub class_name: String,
    pub counts: [usize; 3],
}

/// 入力フォルダ直下のクラスフォルダごとに分割してコピー
///
/// 各クラスのファイルは名前順に並べてからシード付きでシャッフルする。
/// 出力は `<output>/{train,val,test}/<class>/`。
pub fn split_dataset(
    input: &Path,
    output: &Path,
    ratios: SplitRatios,
    seed: u64,
) -> Result<Vec<ClassSplit>> {
    if !input.is_dir() {
        return Err(AircraftIdError::FolderNotFound(input.display().to_string()));
    }

    let mut class_dirs: Vec<_> = WalkDir::new(input)
        .min_depth(1)
        .max_depth(1)
        .into_iter()
        .filter_map(|e| e.ok())
        .filter(|e| {
            if e.file_type().is_dir() {
                true
            } else {
                warn!("クラスフォルダ外のファイルを無視: {}", e.path().display());
                false
            }
        })
        .map(|e| e.into_path())
        .collect();
    class_dirs.sort();

    let mut rng = StdRng::seed_from_u64(seed);
    let mut results = Vec::with_capacity(class_dirs.len());

    for class_dir in class_dirs {
        let class_name = class_dir
            .file_name()
            .map(|n| n.to_string_lossy().to_string())
            .unwrap_or_default();
        let mut files = list_file_names(&class_dir)?;
        files.shuffle(&mut rng);

        let counts = ratios.counts(files.len());
        let mut remaining = files.as_slice();
        for (split, &count) in SPLIT_DIRS.iter().zip(counts.iter()) {
            let (chunk, rest) = remaining.split_at(count);
            remaining = rest;

            let dest_dir = output.join(split).join(&class_name);
            std::fs::create_dir_all(&dest_dir)?;
            for file in chunk {
                std::fs::copy(class_dir.join(file), dest_dir.join(file))?;
            }
        }

        info!(
            "{}: train {} / val {} / test {}",
            class_name, counts[0], counts[1], counts[2]
        );
        results.push(ClassSplit { class_name, counts });
    }

    Ok(results)
}
