use crate::dataset::record::Movie;
use serde::Serialize;
use std::fmt;

/// 数值型列
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
pub enum NumericColumn {
    Id,
    Budget,
    Revenue,
    Popularity,
    VoteAverage,
    VoteCount,
    Runtime,
}

impl NumericColumn {
    pub const ALL: [NumericColumn; 7] = [
        NumericColumn::Id,
        NumericColumn::Budget,
        NumericColumn::Revenue,
        NumericColumn::Popularity,
        NumericColumn::VoteAverage,
        NumericColumn::VoteCount,
        NumericColumn::Runtime,
    ];

    pub fn name(self) -> &'static str {
        match self {
            NumericColumn::Id => "id",
            NumericColumn::Budget => "budget",
            NumericColumn::Revenue => "revenue",
            NumericColumn::Popularity => "popularity",
            NumericColumn::VoteAverage => "vote_average",
            NumericColumn::VoteCount => "vote_count",
            NumericColumn::Runtime => "runtime",
        }
    }

    pub fn from_name(name: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|c| c.name() == name.trim())
    }
}

impl fmt::Display for NumericColumn {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&title_case(self.name()))
    }
}

/// 以分隔字符串存储的多值分类列
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
pub enum CategoricalColumn {
    Genres,
    ProductionCompanies,
    ProductionCountries,
}

impl CategoricalColumn {
    pub const ALL: [CategoricalColumn; 3] = [
        CategoricalColumn::Genres,
        CategoricalColumn::ProductionCompanies,
        CategoricalColumn::ProductionCountries,
    ];

    pub fn name(self) -> &'static str {
        match self {
            CategoricalColumn::Genres => "genres",
            CategoricalColumn::ProductionCompanies => "production_companies",
            CategoricalColumn::ProductionCountries => "production_countries",
        }
    }

    pub fn from_name(name: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|c| c.name() == name.trim())
    }
}

/// 分组键：派生的年代、成人标记或展开后的分类列
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
pub enum GroupKey {
    Decade,
    Adult,
    Category(CategoricalColumn),
}

impl GroupKey {
    pub fn name(self) -> &'static str {
        match self {
            GroupKey::Decade => "decade",
            GroupKey::Adult => "adult",
            GroupKey::Category(c) => c.name(),
        }
    }

    pub fn from_name(name: &str) -> Option<Self> {
        match name.trim() {
            "decade" => Some(GroupKey::Decade),
            "adult" => Some(GroupKey::Adult),
            other => CategoricalColumn::from_name(other).map(GroupKey::Category),
        }
    }

    /// 该键依赖的源列（decade 来自 release_date）
    pub fn source_column(self) -> &'static str {
        match self {
            GroupKey::Decade => "release_date",
            other => other.name(),
        }
    }

    /// 取记录上的键值；未展开的分类列按整串取值
    pub fn value_of(self, movie: &Movie) -> Option<KeyValue> {
        match self {
            GroupKey::Decade => movie.decade.map(KeyValue::Decade),
            GroupKey::Adult => Some(KeyValue::Flag(movie.adult)),
            GroupKey::Category(c) => {
                let v = movie.category(c).trim();
                if v.is_empty() {
                    None
                } else {
                    Some(KeyValue::Text(v.to_string()))
                }
            }
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
#[serde(untagged)]
pub enum KeyValue {
    Decade(i32),
    Flag(bool),
    Text(String),
}

impl fmt::Display for KeyValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            KeyValue::Decade(d) => write!(f, "{}", d),
            KeyValue::Flag(true) => f.write_str("Adult"),
            KeyValue::Flag(false) => f.write_str("Non-Adult"),
            KeyValue::Text(s) => f.write_str(s),
        }
    }
}

pub fn title_case(name: &str) -> String {
    name.split('_')
        .filter(|w| !w.is_empty())
        .map(|w| {
            let mut chars = w.chars();
            match chars.next() {
                Some(first) => first.to_uppercase().chain(chars).collect::<String>(),
                None => String::new(),
            }
        })
        .collect::<Vec<_>>()
        .join(" ")
}
