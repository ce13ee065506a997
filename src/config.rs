// src/config.rs

use serde::{Deserialize, Serialize};
use std::{fs, path::Path};
use url::Url;

use crate::error::{BicimadError, Result};
use crate::period::Period;

const DEFAULT_BASE_URL: &str = "https://opendata.emtmadrid.es/";
const DEFAULT_INDEX_PATH: &str = "Datos-estaticos/Datos-generales-(1)";

/// How the published CSV files are laid out.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CsvDialect {
    pub delimiter: char,
    /// chrono formats tried in order for timestamp columns.
    pub timestamp_formats: Vec<String>,
    pub date_format: String,
    /// Rows per Arrow batch while reading.
    pub batch_size: usize,
}

impl Default for CsvDialect {
    fn default() -> Self {
        Self {
            delimiter: ';',
            timestamp_formats: vec!["%Y-%m-%dT%H:%M:%S".into(), "%Y-%m-%d %H:%M:%S".into()],
            date_format: "%Y-%m-%d".into(),
            batch_size: 8192,
        }
    }
}

/// Runtime settings. Every field has a default so a YAML file only needs the
/// keys it overrides:
///
/// ```yaml
/// base_url: https://opendata.emtmadrid.es/
/// window:
///   first: { year: 2021, month: 6 }
///   last: { year: 2023, month: 2 }
/// csv:
///   delimiter: ";"
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    pub base_url: String,
    /// Index page listing the archives, relative to `base_url`.
    pub index_path: String,
    /// Years accepted by `get_url`; anything else is a range error.
    pub min_year: i32,
    pub max_year: i32,
    /// Standardized window; months outside it are never resolved.
    pub window: Window,
    pub csv: CsvDialect,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Window {
    pub first: Period,
    pub last: Period,
}

impl Window {
    pub fn contains(&self, p: Period) -> bool {
        self.first <= p && p <= self.last
    }
}

impl Default for Config {
    fn default() -> Self {
        Self {
            base_url: DEFAULT_BASE_URL.into(),
            index_path: DEFAULT_INDEX_PATH.into(),
            min_year: 2021,
            max_year: 2023,
            window: Window {
                first: Period { year: 2021, month: 6 },
                last: Period { year: 2023, month: 2 },
            },
            csv: CsvDialect::default(),
        }
    }
}

impl Config {
    pub fn from_yaml_str(s: &str) -> Result<Self> {
        let cfg: Config =
            serde_yaml::from_str(s).map_err(|e| BicimadError::Config(e.to_string()))?;
        cfg.validate()?;
        Ok(cfg)
    }

    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let text = fs::read_to_string(path)
            .map_err(|e| BicimadError::Config(format!("reading {}: {}", path.display(), e)))?;
        Self::from_yaml_str(&text)
    }

    pub fn validate(&self) -> Result<()> {
        self.base()?;
        for p in [self.window.first, self.window.last] {
            Period::new(p.year, p.month)
                .map_err(|e| BicimadError::Config(format!("window bound: {}", e)))?;
        }
        if self.window.first > self.window.last {
            return Err(BicimadError::Config(format!(
                "window starts ({}) after it ends ({})",
                self.window.first, self.window.last
            )));
        }
        if self.min_year > self.max_year {
            return Err(BicimadError::Config(format!(
                "min_year {} is greater than max_year {}",
                self.min_year, self.max_year
            )));
        }
        for p in [self.window.first, self.window.last] {
            if !(self.min_year..=self.max_year).contains(&p.year) {
                return Err(BicimadError::Config(format!(
                    "window bound {} lies outside years {}..={}",
                    p, self.min_year, self.max_year
                )));
            }
        }
        if !self.csv.delimiter.is_ascii() {
            return Err(BicimadError::Config(format!(
                "delimiter {:?} is not a single-byte character",
                self.csv.delimiter
            )));
        }
        if self.csv.timestamp_formats.is_empty() {
            return Err(BicimadError::Config("no timestamp formats given".into()));
        }
        if self.csv.batch_size == 0 {
            return Err(BicimadError::Config("batch_size must be positive".into()));
        }
        Ok(())
    }

    pub fn base(&self) -> Result<Url> {
        Url::parse(&self.base_url)
            .map_err(|e| BicimadError::Config(format!("base_url {:?}: {}", self.base_url, e)))
    }

    pub fn index_url(&self) -> Result<Url> {
        self.base()?
            .join(&self.index_path)
            .map_err(|e| BicimadError::Config(format!("index_path {:?}: {}", self.index_path, e)))
    }

    /// Validates a raw (month, year) request against the supported bounds.
    pub fn period(&self, month: i64, year: i64) -> Result<Period> {
        if !(1..=12).contains(&month) {
            return Err(BicimadError::Range {
                what: "month",
                value: month,
                min: 1,
                max: 12,
            });
        }
        if !(self.min_year as i64..=self.max_year as i64).contains(&year) {
            return Err(BicimadError::Range {
                what: "year",
                value: year,
                min: self.min_year as i64,
                max: self.max_year as i64,
            });
        }
        Period::new(year as i32, month as u32)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use tempfile::NamedTempFile;

    #[test]
    fn defaults_are_valid() {
        let cfg = Config::default();
        cfg.validate().unwrap();
        assert_eq!(
            cfg.index_url().unwrap().as_str(),
            "https://opendata.emtmadrid.es/Datos-estaticos/Datos-generales-(1)"
        );
    }

    #[test]
    fn yaml_overrides_only_given_keys() {
        let cfg = Config::from_yaml_str(
            "max_year: 2024\nwindow:\n  first: { year: 2021, month: 6 }\n  last: { year: 2024, month: 1 }\ncsv:\n  delimiter: ','\n",
        )
        .unwrap();
        assert_eq!(cfg.max_year, 2024);
        assert_eq!(cfg.csv.delimiter, ',');
        assert_eq!(cfg.csv.date_format, "%Y-%m-%d");
        assert_eq!(cfg.base_url, DEFAULT_BASE_URL);
    }

    #[test]
    fn load_from_file() -> anyhow::Result<()> {
        let mut f = NamedTempFile::new()?;
        writeln!(f, "base_url: http://localhost:8080/")?;
        let cfg = Config::load(f.path())?;
        assert_eq!(cfg.base()?.as_str(), "http://localhost:8080/");
        Ok(())
    }

    #[test]
    fn rejects_inverted_window() {
        let err = Config::from_yaml_str(
            "window:\n  first: { year: 2023, month: 2 }\n  last: { year: 2021, month: 6 }\n",
        )
        .unwrap_err();
        assert!(matches!(err, BicimadError::Config(_)));
    }

    #[test]
    fn rejects_window_outside_year_bounds() {
        let err = Config::from_yaml_str(
            "window:\n  first: { year: 2021, month: 6 }\n  last: { year: 2024, month: 1 }\n",
        )
        .unwrap_err();
        assert!(matches!(err, BicimadError::Config(ref m) if m.contains("2024-01")), "{}", err);

        let err = Config::from_yaml_str("min_year: 2022\n").unwrap_err();
        assert!(matches!(err, BicimadError::Config(_)));
    }

    #[test]
    fn period_checks_month_before_year() {
        let cfg = Config::default();
        assert!(matches!(
            cfg.period(13, 2022),
            Err(BicimadError::Range { what: "month", .. })
        ));
        assert!(matches!(
            cfg.period(12, 2016),
            Err(BicimadError::Range { what: "year", .. })
        ));
        assert_eq!(cfg.period(9, 2021).unwrap(), Period { year: 2021, month: 9 });
    }
}
