use crate::dataset::record::Movie;
use crate::dataset::table::Table;
use anyhow::{Context, Result};
use chrono::{NaiveDate, NaiveDateTime};
use log::{info, warn};
use serde::Deserialize;
use std::collections::HashSet;
use std::fs::File;
use std::io::Read;
use std::path::Path;

const DATE_FORMATS: [&str; 3] = ["%Y-%m-%d", "%Y/%m/%d", "%d.%m.%Y"];
const DATETIME_FORMATS: [&str; 2] = ["%Y-%m-%d %H:%M:%S", "%Y-%m-%dT%H:%M:%S"];

/// CSV 原始行，全部按字符串读取，数值解析失败时置空而不是丢弃整行
#[derive(Debug, Clone, Default, Deserialize)]
struct RawMovieRow {
    #[serde(default)]
    id: Option<String>,
    #[serde(default)]
    title: Option<String>,
    #[serde(default)]
    release_date: Option<String>,
    #[serde(default)]
    budget: Option<String>,
    #[serde(default)]
    revenue: Option<String>,
    #[serde(default)]
    popularity: Option<String>,
    #[serde(default)]
    vote_average: Option<String>,
    #[serde(default)]
    vote_count: Option<String>,
    #[serde(default)]
    runtime: Option<String>,
    #[serde(default)]
    genres: Option<String>,
    #[serde(default)]
    production_companies: Option<String>,
    #[serde(default)]
    production_countries: Option<String>,
    #[serde(default)]
    adult: Option<String>,
    #[serde(default)]
    status: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct LoadReport {
    pub rows_read: usize,
    pub duplicates: usize,
    pub malformed: usize,
    pub invalid_dates: usize,
    /// vote_average > 10 的行数，只统计不修正
    pub suspicious_vote_average: usize,
}

pub fn load_csv(path: &Path, release_cutoff: NaiveDate) -> Result<(Table, LoadReport)> {
    let file = File::open(path)
        .with_context(|| format!("failed to open dataset {}", path.display()))?;
    let (table, report) = read_movies(file, release_cutoff)
        .with_context(|| format!("failed to read dataset {}", path.display()))?;
    info!(
        "dataset {} loaded: {} rows ({} duplicates, {} malformed, {} invalid dates)",
        path.display(),
        table.len(),
        report.duplicates,
        report.malformed,
        report.invalid_dates
    );
    Ok((table, report))
}

pub fn read_movies<R: Read>(reader: R, release_cutoff: NaiveDate) -> Result<(Table, LoadReport)> {
    let mut rdr = csv::ReaderBuilder::new()
        .flexible(true)
        .trim(csv::Trim::Headers)
        .from_reader(reader);
    let header_record = rdr.headers().context("missing CSV header")?.clone();
    let headers: Vec<String> = header_record.iter().map(|h| h.to_string()).collect();

    let mut report = LoadReport::default();
    // 整行（含未使用的列）作为去重键
    let mut seen: HashSet<Vec<String>> = HashSet::new();
    let mut records = Vec::new();

    for result in rdr.records() {
        report.rows_read += 1;
        let raw = result.map_err(anyhow::Error::from).and_then(|record| {
            let fields: Vec<String> = record.iter().map(|f| f.to_string()).collect();
            let row = record.deserialize::<RawMovieRow>(Some(&header_record))?;
            Ok((fields, row))
        });
        let (fields, raw) = match raw {
            Ok(r) => r,
            Err(e) => {
                report.malformed += 1;
                if report.malformed <= 10 {
                    warn!("skipping malformed CSV row {}: {}", report.rows_read, e);
                }
                continue;
            }
        };
        if !seen.insert(fields) {
            report.duplicates += 1;
            continue;
        }

        let movie = into_movie(raw, release_cutoff, &mut report);
        records.push(movie);
    }

    if report.suspicious_vote_average > 0 {
        warn!(
            "{} rows have vote_average > 10; values are kept as-is and should be checked at the source",
            report.suspicious_vote_average
        );
    }

    Ok((Table::new(headers, records, release_cutoff), report))
}

fn into_movie(raw: RawMovieRow, release_cutoff: NaiveDate, report: &mut LoadReport) -> Movie {
    let release_date = match non_empty(raw.release_date) {
        Some(s) => {
            let parsed = parse_date(&s);
            if parsed.is_none() {
                report.invalid_dates += 1;
            }
            parsed
        }
        None => None,
    };

    let vote_average = parse_number(raw.vote_average);
    if vote_average.is_some_and(|v| v > 10.0) {
        report.suspicious_vote_average += 1;
    }

    let mut movie = Movie {
        id: parse_number(raw.id).map(|v| v as i64),
        title: non_empty(raw.title).unwrap_or_default(),
        release_date,
        budget: parse_number(raw.budget),
        revenue: parse_number(raw.revenue),
        popularity: parse_number(raw.popularity),
        vote_average,
        vote_count: parse_number(raw.vote_count),
        runtime: parse_number(raw.runtime),
        genres: raw.genres.unwrap_or_default(),
        production_companies: raw.production_companies.unwrap_or_default(),
        production_countries: raw.production_countries.unwrap_or_default(),
        adult: parse_flag(raw.adult),
        status: non_empty(raw.status).unwrap_or_default(),
        decade: None,
    };
    movie.derive_decade(release_cutoff);
    movie
}

fn non_empty(v: Option<String>) -> Option<String> {
    v.map(|s| s.trim().to_string()).filter(|s| !s.is_empty())
}

fn parse_number(v: Option<String>) -> Option<f64> {
    non_empty(v)
        .and_then(|s| s.parse::<f64>().ok())
        .filter(|x| x.is_finite())
}

fn parse_flag(v: Option<String>) -> bool {
    non_empty(v)
        .map(|s| matches!(s.to_ascii_lowercase().as_str(), "true" | "1" | "yes" | "y"))
        .unwrap_or(false)
}

pub fn parse_date(s: &str) -> Option<NaiveDate> {
    let s = s.trim();
    for fmt in DATE_FORMATS {
        if let Ok(d) = NaiveDate::parse_from_str(s, fmt) {
            return Some(d);
        }
    }
    for fmt in DATETIME_FORMATS {
        if let Ok(dt) = NaiveDateTime::parse_from_str(s, fmt) {
            return Some(dt.date());
        }
    }
    None
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    fn cutoff() -> NaiveDate {
        NaiveDate::from_ymd_opt(2025, 1, 1).unwrap()
    }

    const CSV: &str = "\
id,title,release_date,budget,revenue,popularity,vote_average,vote_count,runtime,genres,production_companies,production_countries,adult,status
1,Heat,1995-12-15,60000000,187436818,40.5,7.9,6500,170,\"Action, Crime, Drama\",Warner Bros.,United States of America,False,Released
2,Soon,2026-05-01,0,0,3.1,0,0,,Drama,,,False,Post Production
3,Broken,not-a-date,100,500,1.0,6540,12,90,Comedy,,,True,Released
1,Heat,1995-12-15,60000000,187436818,40.5,7.9,6500,170,\"Action, Crime, Drama\",Warner Bros.,United States of America,False,Released
";

    #[test]
    fn reads_rows_and_drops_duplicates() {
        let (table, report) = read_movies(CSV.as_bytes(), cutoff()).unwrap();
        assert_eq!(table.len(), 3);
        assert_eq!(report.rows_read, 4);
        assert_eq!(report.duplicates, 1);
        assert_eq!(report.invalid_dates, 1);
        assert_eq!(report.suspicious_vote_average, 1);

        let heat = &table.records()[0];
        assert_eq!(heat.title, "Heat");
        assert_eq!(heat.decade, Some(1990));
        assert_eq!(heat.budget, Some(60_000_000.0));
        assert_eq!(heat.genres, "Action, Crime, Drama");
        assert!(!heat.adult);

        let soon = &table.records()[1];
        assert_eq!(soon.decade, None);
        assert_eq!(soon.runtime, None);

        let broken = &table.records()[2];
        assert_eq!(broken.release_date, None);
        assert_eq!(broken.vote_average, Some(6540.0));
        assert!(broken.adult);
    }

    #[test]
    fn duplicates_compare_every_column() {
        let csv = "\
id,title,budget,overview
1,Heat,100,A heist gone wrong
1,Heat,100,A cop chases a thief
1,Heat,100,A heist gone wrong
";
        let (table, report) = read_movies(csv.as_bytes(), cutoff()).unwrap();
        assert_eq!(table.len(), 2);
        assert_eq!(report.duplicates, 1);
    }

    #[test]
    fn keeps_header_for_column_checks() {
        let csv = "id,title,budget\n1,A,10\n";
        let (table, _) = read_movies(csv.as_bytes(), cutoff()).unwrap();
        assert!(table.has_column("budget"));
        assert!(!table.has_column("revenue"));
        assert_eq!(table.records()[0].revenue, None);
    }

    #[test]
    fn load_csv_reports_missing_file() {
        let err = load_csv(Path::new("/definitely/not/here.csv"), cutoff()).unwrap_err();
        assert!(err.to_string().contains("failed to open dataset"));
    }

    #[test]
    fn load_csv_from_disk() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        file.write_all(CSV.as_bytes()).unwrap();
        let (table, _) = load_csv(file.path(), cutoff()).unwrap();
        assert_eq!(table.len(), 3);
    }

    #[test]
    fn parses_common_date_layouts() {
        let d = NaiveDate::from_ymd_opt(2005, 3, 9);
        assert_eq!(parse_date("2005-03-09"), d);
        assert_eq!(parse_date("2005-03-09 12:00:00"), d);
        assert_eq!(parse_date("09.03.2005"), d);
        assert_eq!(parse_date("March 2005"), None);
    }
}
