//! 機種一覧ワークブックによる説明文の機種名・型式記号抽出

use super::workbook;
use crate::error::{AircraftIdError, Result};
use calamine::{Data, Range};
use std::collections::HashMap;
use std::path::Path;

const MODEL_COLUMN: u32 = 0;
const DESIGNATOR_COLUMN: u32 = 1;

/// 機種一覧（A列: 機種名, B列: 空白区切りの型式記号）
#[derive(Debug, Clone, Default)]
pub struct AircraftReference {
    models: Vec<String>,
    designators: Vec<String>,
    designator_names: HashMap<String, String>,
}

/// 説明文1件の抽出結果
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Mentions {
    pub models: Vec<String>,
    pub designators: Vec<String>,
    /// 一致した型式記号に対応する機種名
    pub names: Vec<String>,
}

impl Mentions {
    pub fn is_empty(&self) -> bool {
        self.models.is_empty() && self.designators.is_empty()
    }
}

impl AircraftReference {
    /// 先頭シートから読み込み
    pub fn from_workbook(path: &Path) -> Result<Self> {
        let sheets = workbook::sheet_names(path)?;
        let first = sheets
            .first()
            .ok_or_else(|| AircraftIdError::Workbook(format!("シートがありません: {}", path.display())))?;
        let range = workbook::load_sheet(path, first)?;
        Ok(Self::from_range(&range))
    }

    pub fn from_range(range: &Range<Data>) -> Self {
        let mut reference = Self::default();

        for (model, designators) in workbook::column_pairs(range, MODEL_COLUMN, DESIGNATOR_COLUMN) {
            if !model.is_empty() {
                reference.models.push(model.to_lowercase());
            }
            for designator in designators.split_whitespace().map(str::to_lowercase) {
                if !model.is_empty() {
                    reference
                        .designator_names
                        .entry(designator.clone())
                        .or_insert_with(|| model.clone());
                }
                reference.designators.push(designator);
            }
        }

        reference
    }

    pub fn models(&self) -> &[String] {
        &self.models
    }

    pub fn designators(&self) -> &[String] {
        &self.designators
    }

    /// 説明文に含まれる機種名・型式記号（大文字小文字は区別しない部分一致）
    pub fn find_mentions(&self, description: &str) -> Mentions {
        let lower = description.to_lowercase();

        let models: Vec<String> = self
            .models
            .iter()
            .filter(|model| lower.contains(model.as_str()))
            .cloned()
            .collect();
        let designators: Vec<String> = self
            .designators
            .iter()
            .filter(|designator| lower.contains(designator.as_str()))
            .cloned()
            .collect();
        let names = designators
            .iter()
            .filter_map(|designator| self.designator_names.get(designator).cloned())
            .collect();

        Mentions { models, designators, names }
    }
}

/// シートごとの説明文の抽出結果
#[derive(Debug, Clone)]
pub struct SheetMentions {
    pub sheet_name: String,
    pub descriptions: Vec<(String, Mentions)>,
}

/// 台帳ワークブックの全シートの説明文（D列）を走査
///
/// 何も含まない説明文は結果に含めない。
pub fn identify_workbook(path: &Path, reference: &AircraftReference) -> Result<Vec<SheetMentions>> {
    let mut results = Vec::new();

    for sheet_name in workbook::sheet_names(path)? {
        let range = workbook::load_sheet(path, &sheet_name)?;
        let descriptions = workbook::column_values(&range, workbook::DESCRIPTION_COLUMN)
            .into_iter()
            .map(|description| {
                let mentions = reference.find_mentions(&description);
                (description, mentions)
            })
            .filter(|(_, mentions)| !mentions.is_empty())
            .collect();
        results.push(SheetMentions { sheet_name, descriptions });
    }

    Ok(results)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn reference() -> AircraftReference {
        let mut range = Range::new((0, 0), (3, 1));
        range.set_value((0, 0), Data::String("Model".into()));
        range.set_value((0, 1), Data::String("Designator".into()));
        range.set_value((1, 0), Data::String("Fairey Swordfish".into()));
        range.set_value((1, 1), Data::String("TSR2 Mk.I".into()));
        range.set_value((2, 0), Data::String("Supermarine Spitfire".into()));
        range.set_value((2, 1), Data::String("Type 300".into()));
        range.set_value((3, 1), Data::String("XB-1".into()));
        AircraftReference::from_range(&range)
    }

    #[test]
    fn test_from_range() {
        let reference = reference();
        assert_eq!(reference.models(), ["fairey swordfish", "supermarine spitfire"]);
        assert_eq!(reference.designators(), ["tsr2", "mk.i", "type", "300", "xb-1"]);
    }

    #[test]
    fn test_find_mentions() {
        let mentions = reference().find_mentions("Fairey Swordfish TSR2 on deck");
        assert_eq!(mentions.models, vec!["fairey swordfish"]);
        assert_eq!(mentions.designators, vec!["tsr2"]);
        assert_eq!(mentions.names, vec!["Fairey Swordfish"]);
    }

    #[test]
    fn test_designator_without_model_has_no_name() {
        let mentions = reference().find_mentions("experimental xb-1 airframe");
        assert_eq!(mentions.designators, vec!["xb-1"]);
        assert!(mentions.names.is_empty());
    }

    #[test]
    fn test_no_mentions() {
        assert!(reference().find_mentions("unrelated photograph").is_empty());
    }
}
