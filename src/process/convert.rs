use crate::config::CsvDialect;
use crate::error::{BicimadError, Result};
use crate::process::{date_parser, utils};
use crate::schema::{map_to_arrow_type, trip_schema, ColumnKind, TRIP_COLUMNS};
use arrow::{
    array::{
        new_null_array, ArrayRef, Date32Builder, Float64Builder, StringArray,
        TimestampMillisecondBuilder,
    },
    record_batch::RecordBatch,
};
use std::sync::Arc;
use tracing::warn;

/// Where each trip column comes from in the raw header, in `TRIP_COLUMNS`
/// order. `None` marks an optional column the file does not have.
pub fn resolve_layout(headers: &[String]) -> Result<Vec<Option<usize>>> {
    let mut missing = Vec::new();
    let layout = TRIP_COLUMNS
        .iter()
        .map(|col| {
            let found = headers.iter().position(|h| h.trim() == col.name);
            if found.is_none() && col.required {
                missing.push(col.name);
            }
            found
        })
        .collect();

    if !missing.is_empty() {
        return Err(BicimadError::Format(format!(
            "CSV header lacks required columns: {}",
            missing.join(", ")
        )));
    }
    Ok(layout)
}

/// Convert a raw all-text batch into the trip schema.
pub fn convert_to_final_types(
    raw: &RecordBatch,
    layout: &[Option<usize>],
    dialect: &CsvDialect,
) -> Result<RecordBatch> {
    let rows = raw.num_rows();
    let mut out = Vec::with_capacity(TRIP_COLUMNS.len());

    for (col, source) in TRIP_COLUMNS.iter().zip(layout) {
        let Some(idx) = *source else {
            out.push(new_null_array(&map_to_arrow_type(col.kind), rows));
            continue;
        };
        let sarr = raw
            .column(idx)
            .as_any()
            .downcast_ref::<StringArray>()
            .ok_or_else(|| BicimadError::Format(format!("raw column {} is not text", col.name)))?;
        let values = sarr.iter().map(|v| v.and_then(utils::clean_str));

        let mut rejected = 0usize;
        let arr: ArrayRef = match col.kind {
            ColumnKind::Text => Arc::new(values.collect::<StringArray>()),

            ColumnKind::Float => {
                let mut b = Float64Builder::with_capacity(rows);
                for v in values {
                    let parsed = v.and_then(|s| s.parse::<f64>().ok());
                    rejected += usize::from(v.is_some() && parsed.is_none());
                    b.append_option(parsed);
                }
                Arc::new(b.finish())
            }

            ColumnKind::Timestamp => {
                let mut b = TimestampMillisecondBuilder::with_capacity(rows);
                for v in values {
                    let parsed =
                        v.and_then(|s| date_parser::parse_timestamp_millis(s, &dialect.timestamp_formats));
                    rejected += usize::from(v.is_some() && parsed.is_none());
                    b.append_option(parsed);
                }
                Arc::new(b.finish())
            }

            ColumnKind::Date => {
                let mut b = Date32Builder::with_capacity(rows);
                for v in values {
                    let parsed = v.and_then(|s| date_parser::parse_date_days(s, &dialect.date_format));
                    rejected += usize::from(v.is_some() && parsed.is_none());
                    b.append_option(parsed);
                }
                Arc::new(b.finish())
            }
        };

        if rejected > 0 {
            warn!(column = col.name, rejected, "unparsable values set to null");
        }
        out.push(arr);
    }

    RecordBatch::try_new(trip_schema(), out).map_err(Into::into)
}
