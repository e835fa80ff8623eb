use crate::views::DashboardSettings;
use anyhow::{Context, Result};
use chrono::NaiveDate;
use std::path::PathBuf;

pub const DEFAULT_DATASET: &str = "./data/Imdb-Movie-Dataset.csv";
pub const DEFAULT_LOG_DIR: &str = "logs";

#[derive(Debug, Clone, PartialEq)]
pub struct AppConfig {
    pub dataset_path: PathBuf,
    /// 早于此日期的才算已上映，参与年代统计
    pub release_cutoff: NaiveDate,
    pub log_dir: PathBuf,
    pub dashboard: DashboardSettings,
}

pub fn default_cutoff() -> NaiveDate {
    NaiveDate::from_ymd_opt(2025, 1, 1).unwrap_or_default()
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            dataset_path: PathBuf::from(DEFAULT_DATASET),
            release_cutoff: default_cutoff(),
            log_dir: PathBuf::from(DEFAULT_LOG_DIR),
            dashboard: DashboardSettings::default(),
        }
    }
}

impl AppConfig {
    /// 从进程环境读取；返回配置和需要展示给用户的警告
    pub fn from_env(cli_dataset: Option<String>) -> (Self, Vec<String>) {
        Self::from_lookup(|k| std::env::var(k).ok(), cli_dataset)
    }

    pub fn from_lookup(
        lookup: impl Fn(&str) -> Option<String>,
        cli_dataset: Option<String>,
    ) -> (Self, Vec<String>) {
        let mut cfg = AppConfig::default();
        let mut warnings = Vec::new();

        if let Some(p) = cli_dataset.or_else(|| lookup("MOVIES_CSV")) {
            if !p.trim().is_empty() {
                cfg.dataset_path = PathBuf::from(p.trim());
            }
        }
        if let Some(dir) = lookup("LOG_DIR").filter(|d| !d.trim().is_empty()) {
            cfg.log_dir = PathBuf::from(dir.trim());
        }

        if let Some(raw) = lookup("RELEASE_CUTOFF") {
            match parse_cutoff(raw.trim()) {
                Ok(d) => cfg.release_cutoff = d,
                Err(e) => warnings.push(fallback_warning("RELEASE_CUTOFF", &e)),
            }
        }
        if let Some(raw) = lookup("HISTOGRAM_BINS") {
            match positive(raw.trim()) {
                Ok(n) => cfg.dashboard.histogram_bins = n,
                Err(e) => warnings.push(fallback_warning("HISTOGRAM_BINS", &e)),
            }
        }
        if let Some(raw) = lookup("MIN_CATEGORY_COUNT") {
            match positive(raw.trim()) {
                Ok(n) => cfg.dashboard.min_category_count = n,
                Err(e) => warnings.push(fallback_warning("MIN_CATEGORY_COUNT", &e)),
            }
        }

        (cfg, warnings)
    }
}

fn fallback_warning(key: &str, err: &anyhow::Error) -> String {
    format!("⚠ {} 无效，使用默认值: {:#}", key, err)
}

fn parse_cutoff(raw: &str) -> Result<NaiveDate> {
    NaiveDate::parse_from_str(raw, "%Y-%m-%d")
        .with_context(|| format!("expected YYYY-MM-DD, got '{}'", raw))
}

fn positive(raw: &str) -> Result<usize> {
    let v: usize = raw
        .parse()
        .with_context(|| format!("'{}' is not a number", raw))?;
    if v == 0 {
        anyhow::bail!("must be positive");
    }
    Ok(v)
}
