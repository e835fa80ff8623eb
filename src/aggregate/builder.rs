use crate::aggregate::error::ViewError;
use crate::aggregate::explode::explode;
use crate::aggregate::filter::Filter;
use crate::aggregate::stats::{describe, SummaryStats};
use crate::dataset::{CategoricalColumn, GroupKey, KeyValue, Movie, NumericColumn, Table};
use serde::Serialize;
use std::collections::BTreeMap;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum Reducer {
    Mean,
    Sum,
    Count,
}

impl Reducer {
    pub fn from_name(name: &str) -> Option<Self> {
        match name.trim().to_ascii_lowercase().as_str() {
            "mean" | "avg" | "average" => Some(Reducer::Mean),
            "sum" | "total" => Some(Reducer::Sum),
            "count" => Some(Reducer::Count),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum SortOrder {
    ByKey,
    ByValueDesc,
    /// 每个首键只保留值最大的一行（如：每个年代最多的类型）
    LeaderPerFirstKey,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ViewConfig {
    pub attribute: Option<String>,
    pub group_keys: Vec<String>,
    pub reducer: Reducer,
    pub filters: Vec<Filter>,
    pub order: SortOrder,
    pub limit: Option<usize>,
    pub summary: bool,
}

impl Default for ViewConfig {
    fn default() -> Self {
        Self {
            attribute: None,
            group_keys: Vec::new(),
            reducer: Reducer::Mean,
            filters: Vec::new(),
            order: SortOrder::ByKey,
            limit: None,
            summary: false,
        }
    }
}

impl ViewConfig {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn attribute(mut self, name: Option<impl Into<String>>) -> Self {
        self.attribute = name.map(Into::into);
        self
    }

    pub fn group_by(mut self, key: impl Into<String>) -> Self {
        self.group_keys.push(key.into());
        self
    }

    pub fn reducer(mut self, reducer: Reducer) -> Self {
        self.reducer = reducer;
        self
    }

    pub fn filter(mut self, filter: Filter) -> Self {
        self.filters.push(filter);
        self
    }

    pub fn filters(mut self, filters: impl IntoIterator<Item = Filter>) -> Self {
        self.filters.extend(filters);
        self
    }

    pub fn order(mut self, order: SortOrder) -> Self {
        self.order = order;
        self
    }

    pub fn limit(mut self, n: usize) -> Self {
        self.limit = Some(n);
        self
    }

    pub fn with_summary(mut self) -> Self {
        self.summary = true;
        self
    }

    fn needs_attribute(&self) -> bool {
        self.summary || (!self.group_keys.is_empty() && self.reducer != Reducer::Count)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct AggregateRow {
    pub keys: Vec<KeyValue>,
    pub value: f64,
    /// 组内行数
    pub count: usize,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct AggregateView {
    pub attribute: Option<NumericColumn>,
    pub group_keys: Vec<GroupKey>,
    pub reducer: Reducer,
    pub rows: Vec<AggregateRow>,
    pub summary: Option<SummaryStats>,
    /// 过滤后的记录，供散点图/直方图/列表使用
    #[serde(skip)]
    pub records: Vec<Movie>,
}

impl AggregateView {
    pub fn values(&self, column: NumericColumn) -> Vec<f64> {
        self.records.iter().filter_map(|m| m.metric(column)).collect()
    }
}

/// 纯函数：同样的表和配置得到同样的结果，不修改源表
pub struct AggregateViewBuilder<'a> {
    table: &'a Table,
}

impl<'a> AggregateViewBuilder<'a> {
    pub fn new(table: &'a Table) -> Self {
        Self { table }
    }

    pub fn build(&self, cfg: &ViewConfig) -> Result<AggregateView, ViewError> {
        if cfg.group_keys.len() > 2 {
            return Err(ViewError::TooManyGroupKeys(cfg.group_keys.len()));
        }
        let attribute = match cfg.attribute.as_deref().map(str::trim) {
            Some(name) if !name.is_empty() => Some(self.table.numeric_column(name)?),
            _ => None,
        };
        if attribute.is_none() && cfg.needs_attribute() {
            return Err(ViewError::EmptySelection);
        }
        let keys = cfg
            .group_keys
            .iter()
            .map(|k| self.table.group_key(k))
            .collect::<Result<Vec<_>, _>>()?;
        self.check_filter_columns(&cfg.filters)?;

        let cutoff = self.table.release_cutoff();
        let mut records = self.table.records().to_vec();
        for m in records.iter_mut() {
            m.derive_decade(cutoff);
        }

        for column in exploded_columns(&keys, &cfg.filters) {
            records = explode(records, column);
        }

        for f in &cfg.filters {
            records = f.apply(records, cutoff);
        }

        let summary = match (cfg.summary, attribute) {
            (true, Some(column)) => {
                let values: Vec<f64> = records.iter().filter_map(|m| m.metric(column)).collect();
                Some(describe(&values))
            }
            _ => None,
        };

        let mut rows = if keys.is_empty() {
            Vec::new()
        } else {
            group_rows(&records, &keys, attribute, cfg.reducer)
        };
        sort_rows(&mut rows, cfg.order);
        if let Some(n) = cfg.limit {
            rows.truncate(n);
        }

        Ok(AggregateView {
            attribute,
            group_keys: keys,
            reducer: cfg.reducer,
            rows,
            summary,
            records,
        })
    }

    fn check_filter_columns(&self, filters: &[Filter]) -> Result<(), ViewError> {
        for f in filters {
            for c in f.numeric_columns() {
                if !self.table.has_column(c.name()) {
                    return Err(ViewError::MissingColumn(c.name().to_string()));
                }
            }
            if let Some(c) = f.categorical_column() {
                if !self.table.has_column(c.name()) {
                    return Err(ViewError::MissingColumn(c.name().to_string()));
                }
            }
            if let Filter::Equals { key, .. } = f {
                if !self.table.has_column(key.source_column()) {
                    return Err(ViewError::MissingColumn(key.name().to_string()));
                }
            }
        }
        Ok(())
    }
}

fn exploded_columns(keys: &[GroupKey], filters: &[Filter]) -> Vec<CategoricalColumn> {
    let mut out: Vec<CategoricalColumn> = Vec::new();
    let from_keys = keys.iter().filter_map(|k| match k {
        GroupKey::Category(c) => Some(*c),
        _ => None,
    });
    let from_filters = filters.iter().filter_map(Filter::categorical_column);
    for c in from_keys.chain(from_filters) {
        if !out.contains(&c) {
            out.push(c);
        }
    }
    out
}

#[derive(Default)]
struct Accumulator {
    rows: usize,
    values: usize,
    sum: f64,
}

fn group_rows(
    records: &[Movie],
    keys: &[GroupKey],
    attribute: Option<NumericColumn>,
    reducer: Reducer,
) -> Vec<AggregateRow> {
    let mut groups: BTreeMap<Vec<KeyValue>, Accumulator> = BTreeMap::new();
    for m in records {
        let Some(key) = keys.iter().map(|k| k.value_of(m)).collect::<Option<Vec<_>>>() else {
            continue;
        };
        let acc = groups.entry(key).or_default();
        acc.rows += 1;
        if let Some(v) = attribute.and_then(|c| m.metric(c)) {
            acc.values += 1;
            acc.sum += v;
        }
    }

    groups
        .into_iter()
        .filter_map(|(keys, acc)| {
            let value = match reducer {
                Reducer::Count => acc.rows as f64,
                Reducer::Sum if acc.values > 0 => acc.sum,
                Reducer::Mean if acc.values > 0 => acc.sum / acc.values as f64,
                _ => return None,
            };
            Some(AggregateRow {
                keys,
                value,
                count: acc.rows,
            })
        })
        .collect()
}

fn sort_rows(rows: &mut Vec<AggregateRow>, order: SortOrder) {
    match order {
        // BTreeMap 已按键排序
        SortOrder::ByKey => {}
        SortOrder::ByValueDesc => rows.sort_by(|a, b| b.value.total_cmp(&a.value)),
        SortOrder::LeaderPerFirstKey => {
            let mut leaders: Vec<AggregateRow> = Vec::new();
            for row in rows.drain(..) {
                match leaders.last_mut() {
                    Some(last) if last.keys.first() == row.keys.first() => {
                        if row.value > last.value {
                            *last = row;
                        }
                    }
                    _ => leaders.push(row),
                }
            }
            *rows = leaders;
        }
    }
}
