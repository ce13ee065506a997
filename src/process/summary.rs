use arrow::{
    array::{Array, AsArray},
    compute::sum,
    datatypes::{DataType, Float64Type},
};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

use crate::process::clean::CleanedDataset;
use crate::schema::{TRIP_MINUTES, UNLOCK_STATION_NAME};

/// Aggregate view of one month of trips. Recomputed on every request.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Summary {
    pub year: Option<i32>,
    pub month: Option<u32>,
    /// Number of trips (rows).
    pub total_uses: usize,
    /// Sum of `trip_minutes`, in hours.
    pub total_time: f64,
    /// Most frequent `unlock_station_name`; `None` when no trip has one.
    pub most_popular_station: Option<String>,
    pub uses_from_most_popular: usize,
}

/// Summarizes a cleaned dataset. An empty dataset gives zero counts and no
/// station rather than an error.
///
/// Ties for the most popular station go to the one seen first in row order.
pub fn resume(dataset: &CleanedDataset) -> Summary {
    let (most_popular_station, uses_from_most_popular) = match most_frequent_unlock_station(dataset) {
        Some((name, uses)) => (Some(name), uses),
        None => (None, 0),
    };

    Summary {
        year: dataset.period().map(|p| p.year),
        month: dataset.period().map(|p| p.month),
        total_uses: dataset.num_rows(),
        total_time: total_minutes(dataset) / 60.0,
        most_popular_station,
        uses_from_most_popular,
    }
}

fn total_minutes(dataset: &CleanedDataset) -> f64 {
    dataset
        .column(TRIP_MINUTES)
        .filter(|c| c.data_type() == &DataType::Float64)
        .and_then(|c| sum(c.as_primitive::<Float64Type>()))
        .unwrap_or(0.0)
}

fn most_frequent_unlock_station(dataset: &CleanedDataset) -> Option<(String, usize)> {
    let column = dataset
        .column(UNLOCK_STATION_NAME)
        .filter(|c| c.data_type() == &DataType::Utf8)?
        .as_string::<i32>();

    // name → (count, first row seen)
    let mut counts: HashMap<&str, (usize, usize)> = HashMap::new();
    for (row, name) in column.iter().enumerate() {
        if let Some(name) = name {
            counts.entry(name).or_insert((0, row)).0 += 1;
        }
    }

    counts
        .into_iter()
        .max_by(|(_, (ca, fa)), (_, (cb, fb))| ca.cmp(cb).then(fb.cmp(fa)))
        .map(|(name, (count, _))| (name.to_string(), count))
}
