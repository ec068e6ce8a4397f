//! クラス説明CSV（`LabelCode,Display Name`、ヘッダーなし）

use crate::error::{AircraftIdError, Result};
use crate::labels::parse_csv_line;
use std::collections::HashMap;

#[derive(Debug, Clone, Default)]
pub struct ClassDescriptions {
    by_name: HashMap<String, String>,
    by_code: HashMap<String, String>,
}

impl ClassDescriptions {
    pub fn parse(text: &str) -> Self {
        let mut descriptions = Self::default();
        for line in text.lines() {
            let line = line.trim_start_matches('\u{feff}');
            let fields = parse_csv_line(line);
            let (Some(code), Some(name)) = (fields.first(), fields.get(1)) else {
                continue;
            };
            if code.is_empty() || name.is_empty() {
                continue;
            }
            descriptions.by_name.insert(name.to_string(), code.to_string());
            descriptions.by_code.insert(code.to_string(), name.to_string());
        }
        descriptions
    }

    /// 表示名からラベルコード（`_` は空白とみなす）
    pub fn code_of(&self, name: &str) -> Option<&str> {
        self.by_name
            .get(name)
            .or_else(|| self.by_name.get(&name.replace('_', " ")))
            .map(String::as_str)
    }

    pub fn name_of(&self, code: &str) -> Option<&str> {
        self.by_code.get(code).map(String::as_str)
    }

    /// 要求されたクラス名をラベルコードに変換（順序を保つ）
    pub fn resolve(&self, names: &[String]) -> Result<Vec<String>> {
        names
            .iter()
            .map(|name| {
                self.code_of(name)
                    .map(str::to_string)
                    .ok_or_else(|| AircraftIdError::UnknownClass(name.clone()))
            })
            .collect()
    }

    pub fn len(&self) -> usize {
        self.by_code.len()
    }

    pub fn is_empty(&self) -> bool {
        self.by_code.is_empty()
    }
}
