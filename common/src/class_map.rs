//! クラス名マップ
//!
//! 学習設定YAMLの `names`（配列またはインデックス→名前のマッピング）を読み込む。

use crate::error::{Error, Result};
use serde::Deserialize;
use std::collections::BTreeMap;
use std::path::Path;

/// 受け付けるクラス数の上限
pub const MAX_CLASSES: usize = 10_000;

/// クラスインデックス順のクラス名一覧
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ClassMap {
    names: Vec<String>,
}

#[derive(Debug, Deserialize)]
struct DataYaml {
    names: DataYamlNames,
}

#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum DataYamlNames {
    Sequence(Vec<String>),
    Mapping(BTreeMap<usize, String>),
}

impl ClassMap {
    pub fn from_names<I, S>(names: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            names: names.into_iter().map(Into::into).collect(),
        }
    }

    /// YAMLファイルから読み込み（BOM付きUTF-8も可）
    pub fn from_yaml_file(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)?;
        Self::from_yaml_str(content.trim_start_matches('\u{feff}'))
    }

    /// YAML文字列から読み込み
    pub fn from_yaml_str(yaml: &str) -> Result<Self> {
        let parsed: DataYaml = serde_yaml::from_str(yaml)?;

        let names = match parsed.names {
            DataYamlNames::Sequence(names) => names,
            DataYamlNames::Mapping(mapping) => names_from_mapping(mapping)?,
        };

        Ok(Self { names })
    }

    /// `Aircraft=0,Helicopter=1` 形式のペアから生成
    pub fn from_pairs(pairs: &str) -> Result<Self> {
        let mut mapping = BTreeMap::new();
        for pair in pairs.split(',').map(str::trim).filter(|p| !p.is_empty()) {
            let (name, index) = pair
                .split_once('=')
                .ok_or_else(|| Error::Config(format!("expected NAME=INDEX: {}", pair)))?;
            let index = index
                .trim()
                .parse::<usize>()
                .map_err(|_| Error::Config(format!("invalid class index: {}", pair)))?;
            mapping.insert(index, name.trim().to_string());
        }

        Ok(Self {
            names: names_from_mapping(mapping)?,
        })
    }

    pub fn index_of(&self, name: &str) -> Option<usize> {
        self.names.iter().position(|n| n == name)
    }

    pub fn name_of(&self, index: usize) -> Option<&str> {
        self.names.get(index).map(String::as_str)
    }

    pub fn names(&self) -> &[String] {
        &self.names
    }

    pub fn len(&self) -> usize {
        self.names.len()
    }

    pub fn is_empty(&self) -> bool {
        self.names.is_empty()
    }
}

/// インデックス→名前の対応を配列に展開（欠番は `class_<i>`）
fn names_from_mapping(mapping: BTreeMap<usize, String>) -> Result<Vec<String>> {
    let len = match mapping.keys().next_back() {
        Some(&max) => max
            .checked_add(1)
            .filter(|&len| len <= MAX_CLASSES)
            .ok_or_else(|| {
                Error::Config(format!("class index {} exceeds the limit of {} classes", max, MAX_CLASSES))
            })?,
        None => 0,
    };

    let mut names: Vec<String> = (0..len).map(|i| format!("class_{}", i)).collect();
    for (index, name) in mapping {
        if !name.trim().is_empty() {
            names[index] = name;
        }
    }
    Ok(names)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_yaml_sequence() {
        let map = ClassMap::from_yaml_str("names:\n  - Aircraft\n  - Helicopter\n").unwrap();
        assert_eq!(map.len(), 2);
        assert_eq!(map.index_of("Helicopter"), Some(1));
        assert_eq!(map.name_of(0), Some("Aircraft"));
    }

    #[test]
    fn test_yaml_mapping_with_gap() {
        let yaml = "path: ../dataset\nnames:\n  0: Aircraft\n  2: Jet\n";
        let map = ClassMap::from_yaml_str(yaml).unwrap();
        assert_eq!(map.names(), &["Aircraft", "class_1", "Jet"]);
    }

    #[test]
    fn test_yaml_missing_names() {
        assert!(ClassMap::from_yaml_str("path: ../dataset\n").is_err());
    }

    #[test]
    fn test_from_pairs() {
        let map = ClassMap::from_pairs("Aircraft=0, Jet=1").unwrap();
        assert_eq!(map.index_of("Aircraft"), Some(0));
        assert_eq!(map.index_of("Jet"), Some(1));
        assert!(ClassMap::from_pairs("Aircraft").is_err());
        assert!(ClassMap::from_pairs("Aircraft=x").is_err());
    }

    #[test]
    fn test_huge_class_index_rejected() {
        let result = ClassMap::from_pairs("Aircraft=18446744073709551615");
        assert!(matches!(result, Err(Error::Config(_))));

        let result = ClassMap::from_yaml_str("names:\n  4000000000: Jet\n");
        assert!(matches!(result, Err(Error::Config(_))));
    }

    #[test]
    fn test_class_index_at_limit() {
        let last = MAX_CLASSES - 1;
        let map = ClassMap::from_pairs(&format!("Jet={}", last)).unwrap();
        assert_eq!(map.len(), MAX_CLASSES);
        assert_eq!(map.index_of("Jet"), Some(last));
        assert!(ClassMap::from_pairs(&format!("Jet={}", MAX_CLASSES)).is_err());
    }

    #[test]
    fn test_unknown_name() {
        let map = ClassMap::from_names(["Aircraft"]);
        assert_eq!(map.index_of("Boat"), None);
        assert_eq!(map.name_of(4), None);
    }
}
