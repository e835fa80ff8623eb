use crate::aggregate::stats::{quantile_sorted, sorted};
use crate::dataset::{CategoricalColumn, GroupKey, KeyValue, Movie, NumericColumn};
use chrono::NaiveDate;
use serde::Serialize;
use std::collections::HashMap;

pub const DEFAULT_TRIM_PERCENTILE: f64 = 0.01;
pub const IQR_FACTOR: f64 = 1.5;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum ThresholdOp {
    AtLeast,
    Above,
}

impl ThresholdOp {
    fn accepts(self, value: f64, threshold: f64) -> bool {
        match self {
            ThresholdOp::AtLeast => value >= threshold,
            ThresholdOp::Above => value > threshold,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub enum Filter {
    /// 保留 [lower, 1-lower] 分位数之间的行；多列时边界都在同一输入上计算
    PercentileTrim {
        columns: Vec<NumericColumn>,
        lower: f64,
    },
    /// 保留 [Q1-1.5*IQR, Q3+1.5*IQR]
    IqrTrim { column: NumericColumn },
    Threshold {
        column: NumericColumn,
        op: ThresholdOp,
        value: f64,
    },
    Equals { key: GroupKey, value: KeyValue },
    /// 仅保留行数不少于 min 的分类值（作用于展开后的行）
    MinCategoryCount {
        column: CategoricalColumn,
        min: usize,
    },
    /// 上映日期不早于截止日期
    Upcoming,
    /// 日期有效且早于截止日期
    Released,
}

impl Filter {
    pub fn percentile(columns: &[NumericColumn]) -> Self {
        Filter::PercentileTrim {
            columns: columns.to_vec(),
            lower: DEFAULT_TRIM_PERCENTILE,
        }
    }

    pub fn at_least(column: NumericColumn, value: f64) -> Self {
        Filter::Threshold {
            column,
            op: ThresholdOp::AtLeast,
            value,
        }
    }

    pub fn above(column: NumericColumn, value: f64) -> Self {
        Filter::Threshold {
            column,
            op: ThresholdOp::Above,
            value,
        }
    }

    /// 过滤引用到的分类列，构建视图时需要先展开
    pub fn categorical_column(&self) -> Option<CategoricalColumn> {
        match self {
            Filter::Equals {
                key: GroupKey::Category(c),
                ..
            } => Some(*c),
            Filter::MinCategoryCount { column, .. } => Some(*column),
            _ => None,
        }
    }

    pub fn numeric_columns(&self) -> Vec<NumericColumn> {
        match self {
            Filter::PercentileTrim { columns, .. } => columns.clone(),
            Filter::IqrTrim { column } | Filter::Threshold { column, .. } => vec![*column],
            _ => Vec::new(),
        }
    }

    pub fn apply(&self, records: Vec<Movie>, release_cutoff: NaiveDate) -> Vec<Movie> {
        match self {
            Filter::PercentileTrim { columns, lower } => {
                let bounds: Vec<(NumericColumn, Option<(f64, f64)>)> = columns
                    .iter()
                    .map(|c| (*c, percentile_bounds(&records, *c, *lower)))
                    .collect();
                retain_within(records, &bounds)
            }
            Filter::IqrTrim { column } => {
                let bounds = iqr_bounds(&records, *column);
                retain_within(records, &[(*column, bounds)])
            }
            Filter::Threshold { column, op, value } => records
                .into_iter()
                .filter(|m| m.metric(*column).is_some_and(|v| op.accepts(v, *value)))
                .collect(),
            Filter::Equals { key, value } => records
                .into_iter()
                .filter(|m| key.value_of(m).as_ref() == Some(value))
                .collect(),
            Filter::MinCategoryCount { column, min } => {
                let mut counts: HashMap<String, usize> = HashMap::new();
                for m in &records {
                    *counts.entry(m.category(*column).to_string()).or_insert(0) += 1;
                }
                records
                    .into_iter()
                    .filter(|m| counts.get(m.category(*column)).copied().unwrap_or(0) >= *min)
                    .collect()
            }
            Filter::Upcoming => records
                .into_iter()
                .filter(|m| m.release_date.is_some_and(|d| d >= release_cutoff))
                .collect(),
            Filter::Released => records
                .into_iter()
                .filter(|m| m.is_released_before(release_cutoff))
                .collect(),
        }
    }
}

fn column_values(records: &[Movie], column: NumericColumn) -> Vec<f64> {
    sorted(
        &records
            .iter()
            .filter_map(|m| m.metric(column))
            .collect::<Vec<_>>(),
    )
}

pub fn percentile_bounds(records: &[Movie], column: NumericColumn, lower: f64) -> Option<(f64, f64)> {
    let v = column_values(records, column);
    Some((quantile_sorted(&v, lower)?, quantile_sorted(&v, 1.0 - lower)?))
}

pub fn iqr_bounds(records: &[Movie], column: NumericColumn) -> Option<(f64, f64)> {
    let v = column_values(records, column);
    let q1 = quantile_sorted(&v, 0.25)?;
    let q3 = quantile_sorted(&v, 0.75)?;
    let iqr = q3 - q1;
    Some((q1 - IQR_FACTOR * iqr, q3 + IQR_FACTOR * iqr))
}

/// 边界为空（列无数据）时所有行都不满足
fn retain_within(records: Vec<Movie>, bounds: &[(NumericColumn, Option<(f64, f64)>)]) -> Vec<Movie> {
    records
        .into_iter()
        .filter(|m| {
            bounds.iter().all(|(c, b)| match (m.metric(*c), b) {
                (Some(v), Some((lo, hi))) => v >= *lo && v <= *hi,
                _ => false,
            })
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn cutoff() -> NaiveDate {
        NaiveDate::from_ymd_opt(2025, 1, 1).unwrap()
    }

    fn with_budget(values: impl IntoIterator<Item = f64>) -> Vec<Movie> {
        values
            .into_iter()
            .map(|b| Movie {
                budget: Some(b),
                ..Default::default()
            })
            .collect()
    }

    #[test]
    fn percentile_trim_is_inclusive() {
        let records = with_budget((0..=100).map(|i| i as f64));
        let (lo, hi) = percentile_bounds(&records, NumericColumn::Budget, 0.01).unwrap();
        assert_eq!((lo, hi), (1.0, 99.0));

        let kept = Filter::percentile(&[NumericColumn::Budget]).apply(records, cutoff());
        let budgets: Vec<f64> = kept.iter().filter_map(|m| m.budget).collect();
        assert_eq!(budgets.len(), 99);
        assert!(budgets.iter().all(|b| (lo..=hi).contains(b)));
        assert!(budgets.contains(&1.0) && budgets.contains(&99.0));
    }

    #[test]
    fn percentile_trim_bounds_come_from_the_same_input() {
        let mut records = with_budget((0..=100).map(|i| i as f64));
        for (i, m) in records.iter_mut().enumerate() {
            m.revenue = Some((100 - i) as f64);
        }
        let kept = Filter::percentile(&[NumericColumn::Budget, NumericColumn::Revenue])
            .apply(records, cutoff());
        // budget 0 / 100 的行 revenue 分别为 100 / 0，两边同时被剔除
        assert_eq!(kept.len(), 99);
    }

    #[test]
    fn iqr_trim_drops_far_outliers() {
        let mut values: Vec<f64> = (1..=9).map(|i| 90.0 + i as f64).collect();
        values.push(900.0);
        let kept = Filter::IqrTrim {
            column: NumericColumn::Budget,
        }
        .apply(with_budget(values), cutoff());
        assert_eq!(kept.len(), 9);
        assert!(kept.iter().all(|m| m.budget.unwrap() < 900.0));
    }

    #[test]
    fn thresholds_drop_missing_values() {
        let mut records = with_budget([0.0, 5.0, 10.0]);
        records.push(Movie::default());
        let at_least = Filter::at_least(NumericColumn::Budget, 5.0).apply(records.clone(), cutoff());
        assert_eq!(at_least.len(), 2);
        let above = Filter::above(NumericColumn::Budget, 5.0).apply(records, cutoff());
        assert_eq!(above.len(), 1);
    }

    #[test]
    fn budget_and_revenue_positive() {
        let records = vec![
            Movie {
                title: "a".into(),
                budget: Some(100.0),
                revenue: Some(500.0),
                ..Default::default()
            },
            Movie {
                title: "b".into(),
                budget: Some(0.0),
                revenue: Some(0.0),
                ..Default::default()
            },
            Movie {
                title: "c".into(),
                budget: Some(50.0),
                revenue: Some(0.0),
                ..Default::default()
            },
        ];
        let kept = Filter::above(NumericColumn::Budget, 0.0).apply(records, cutoff());
        let kept = Filter::above(NumericColumn::Revenue, 0.0).apply(kept, cutoff());
        assert_eq!(kept.len(), 1);
        assert_eq!(kept[0].title, "a");
    }

    #[test]
    fn min_category_count_and_equals() {
        let records: Vec<Movie> = ["France", "France", "Chad"]
            .iter()
            .map(|c| Movie {
                production_countries: c.to_string(),
                ..Default::default()
            })
            .collect();
        let kept = Filter::MinCategoryCount {
            column: CategoricalColumn::ProductionCountries,
            min: 2,
        }
        .apply(records.clone(), cutoff());
        assert_eq!(kept.len(), 2);

        let chad = Filter::Equals {
            key: GroupKey::Category(CategoricalColumn::ProductionCountries),
            value: KeyValue::Text("Chad".into()),
        }
        .apply(records, cutoff());
        assert_eq!(chad.len(), 1);
    }

    #[test]
    fn upcoming_keeps_dates_on_or_after_cutoff() {
        let records: Vec<Movie> = [
            NaiveDate::from_ymd_opt(2024, 12, 31),
            NaiveDate::from_ymd_opt(2025, 1, 1),
            None,
        ]
        .into_iter()
        .map(|d| Movie {
            release_date: d,
            ..Default::default()
        })
        .collect();
        assert_eq!(Filter::Upcoming.apply(records.clone(), cutoff()).len(), 1);

        let released = Filter::Released.apply(records, cutoff());
        assert_eq!(released.len(), 1);
        assert_eq!(released[0].release_date, NaiveDate::from_ymd_opt(2024, 12, 31));
    }
}
