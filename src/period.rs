// src/period.rs

use chrono::Month;
use serde::{Deserialize, Serialize};
use std::fmt;

use crate::error::{BicimadError, Result};

/// A calendar month of trip data. Ordered by year, then month.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct Period {
    pub year: i32,
    pub month: u32,
}

impl Period {
    /// Builds a period, rejecting months outside 1..=12 and non four-digit years.
    pub fn new(year: i32, month: u32) -> Result<Self> {
        if !(1..=12).contains(&month) {
            return Err(BicimadError::Range {
                what: "month",
                value: month as i64,
                min: 1,
                max: 12,
            });
        }
        if !(1000..=9999).contains(&year) {
            return Err(BicimadError::Range {
                what: "year",
                value: year as i64,
                min: 1000,
                max: 9999,
            });
        }
        Ok(Self { year, month })
    }

    /// English month name, as used in the published file names.
    pub fn month_name(&self) -> &'static str {
        u8::try_from(self.month)
            .ok()
            .and_then(|m| Month::try_from(m).ok())
            .map(|m| m.name())
            .unwrap_or("Unknown")
    }

    /// `trips_YY_MM_MonthName`
    pub fn file_stem(&self) -> String {
        format!(
            "trips_{:02}_{:02}_{}",
            self.year.rem_euclid(100),
            self.month,
            self.month_name()
        )
    }
}

impl fmt::Display for Period {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:04}-{:02}", self.year, self.month)
    }
}
