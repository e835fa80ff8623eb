use crate::dataset::column::{CategoricalColumn, NumericColumn};
use chrono::{Datelike, NaiveDate};
use serde::Serialize;

#[derive(Debug, Clone, PartialEq, Default, Serialize)]
pub struct Movie {
    pub id: Option<i64>,
    pub title: String,
    pub release_date: Option<NaiveDate>,
    pub budget: Option<f64>,
    pub revenue: Option<f64>,
    pub popularity: Option<f64>,
    pub vote_average: Option<f64>,
    pub vote_count: Option<f64>,
    pub runtime: Option<f64>,
    pub genres: String,
    pub production_companies: String,
    pub production_countries: String,
    pub adult: bool,
    pub status: String,
    /// 派生字段，仅对截止日期之前的有效日期有值
    pub decade: Option<i32>,
}

impl Movie {
    pub fn metric(&self, column: NumericColumn) -> Option<f64> {
        let v = match column {
            NumericColumn::Id => self.id.map(|i| i as f64),
            NumericColumn::Budget => self.budget,
            NumericColumn::Revenue => self.revenue,
            NumericColumn::Popularity => self.popularity,
            NumericColumn::VoteAverage => self.vote_average,
            NumericColumn::VoteCount => self.vote_count,
            NumericColumn::Runtime => self.runtime,
        };
        v.filter(|x| x.is_finite())
    }

    pub fn category(&self, column: CategoricalColumn) -> &str {
        match column {
            CategoricalColumn::Genres => &self.genres,
            CategoricalColumn::ProductionCompanies => &self.production_companies,
            CategoricalColumn::ProductionCountries => &self.production_countries,
        }
    }

    pub fn set_category(&mut self, column: CategoricalColumn, value: String) {
        match column {
            CategoricalColumn::Genres => self.genres = value,
            CategoricalColumn::ProductionCompanies => self.production_companies = value,
            CategoricalColumn::ProductionCountries => self.production_countries = value,
        }
    }

    pub fn is_released_before(&self, cutoff: NaiveDate) -> bool {
        self.release_date.is_some_and(|d| d < cutoff)
    }

    /// 按截止日期补齐 decade；已有值时保持不变
    pub fn derive_decade(&mut self, cutoff: NaiveDate) {
        if self.decade.is_some() {
            return;
        }
        if self.is_released_before(cutoff) {
            self.decade = self.release_date.map(|d| decade_of(d.year()));
        }
    }
}

pub fn decade_of(year: i32) -> i32 {
    year.div_euclid(10) * 10
}
