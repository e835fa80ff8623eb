use crate::aggregate::explode::split_values;
use crate::aggregate::ViewError;
use crate::dataset::column::{CategoricalColumn, GroupKey, NumericColumn};
use crate::dataset::record::Movie;
use chrono::NaiveDate;
use std::collections::{BTreeMap, BTreeSet};

/// 只读源表；各视图每次计算都从这里复制
#[derive(Debug, Clone)]
pub struct Table {
    headers: Vec<String>,
    records: Vec<Movie>,
    release_cutoff: NaiveDate,
}

impl Table {
    pub fn new(headers: Vec<String>, records: Vec<Movie>, release_cutoff: NaiveDate) -> Self {
        Self {
            headers,
            records,
            release_cutoff,
        }
    }

    pub fn records(&self) -> &[Movie] {
        &self.records
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    pub fn release_cutoff(&self) -> NaiveDate {
        self.release_cutoff
    }

    pub fn has_column(&self, name: &str) -> bool {
        self.headers.iter().any(|h| h == name)
    }

    pub fn numeric_column(&self, name: &str) -> Result<NumericColumn, ViewError> {
        match NumericColumn::from_name(name) {
            Some(c) if self.has_column(c.name()) => Ok(c),
            _ => Err(ViewError::MissingColumn(name.trim().to_string())),
        }
    }

    pub fn group_key(&self, name: &str) -> Result<GroupKey, ViewError> {
        match GroupKey::from_name(name) {
            Some(k) if self.has_column(k.source_column()) => Ok(k),
            _ => Err(ViewError::MissingColumn(name.trim().to_string())),
        }
    }

    /// 可供分析的数值列（排除 id）
    pub fn analysable_columns(&self) -> Vec<NumericColumn> {
        NumericColumn::ALL
            .into_iter()
            .filter(|c| *c != NumericColumn::Id && self.has_column(c.name()))
            .collect()
    }

    pub fn decades(&self) -> Vec<i32> {
        let set: BTreeSet<i32> = self.records.iter().filter_map(|m| m.decade).collect();
        set.into_iter().collect()
    }

    /// 出现次数不少于 `min_count` 的分类值，按字典序
    pub fn categories(&self, column: CategoricalColumn, min_count: usize) -> Vec<String> {
        let mut counts: BTreeMap<String, usize> = BTreeMap::new();
        for m in &self.records {
            for v in split_values(m.category(column)) {
                *counts.entry(v).or_insert(0) += 1;
            }
        }
        counts
            .into_iter()
            .filter(|(_, n)| *n >= min_count)
            .map(|(v, _)| v)
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn table() -> Table {
        let headers = ["id", "title", "release_date", "budget", "genres"]
            .iter()
            .map(|s| s.to_string())
            .collect();
        let records = vec![
            Movie {
                genres: "Action, Drama".into(),
                decade: Some(1990),
                ..Default::default()
            },
            Movie {
                genres: "Drama".into(),
                decade: Some(1980),
                ..Default::default()
            },
        ];
        Table::new(headers, records, NaiveDate::from_ymd_opt(2025, 1, 1).unwrap())
    }

    #[test]
    fn resolves_only_present_columns() {
        let t = table();
        assert_eq!(t.numeric_column("budget").unwrap(), NumericColumn::Budget);
        assert!(matches!(
            t.numeric_column("revenue"),
            Err(ViewError::MissingColumn(c)) if c == "revenue"
        ));
        assert!(matches!(
            t.numeric_column("nonsense"),
            Err(ViewError::MissingColumn(_))
        ));
        assert_eq!(t.group_key("decade").unwrap(), GroupKey::Decade);
        assert!(t.group_key("production_countries").is_err());
        assert_eq!(t.analysable_columns(), vec![NumericColumn::Budget]);
    }

    #[test]
    fn lists_decades_and_categories() {
        let t = table();
        assert_eq!(t.decades(), vec![1980, 1990]);
        assert_eq!(
            t.categories(CategoricalColumn::Genres, 1),
            vec!["Action".to_string(), "Drama".to_string()]
        );
        assert_eq!(
            t.categories(CategoricalColumn::Genres, 2),
            vec!["Drama".to_string()]
        );
    }
}
