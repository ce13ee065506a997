use arrow::{
    array::{Array, ArrayRef, AsArray, BooleanArray, StringArray},
    compute::{cast, filter_record_batch},
    datatypes::{DataType, Field, Schema},
    record_batch::RecordBatch,
    util::pretty::pretty_format_batches,
};
use std::{fmt, sync::Arc};
use tracing::debug;

use crate::error::Result;
use crate::period::Period;
use crate::process::utils::normalize_identifier;
use crate::schema::identifier_columns;

/// Trip table after `clean`: no all-empty rows, identifier columns as text.
///
/// The only way to build one is through [`clean`], so holding a
/// `CleanedDataset` means both properties hold.
#[derive(Debug, Clone, PartialEq)]
pub struct CleanedDataset {
    batch: RecordBatch,
    period: Option<Period>,
}

impl CleanedDataset {
    pub fn batch(&self) -> &RecordBatch {
        &self.batch
    }

    pub fn into_batch(self) -> RecordBatch {
        self.batch
    }

    /// Month the data was downloaded for, when it came from the resolver.
    pub fn period(&self) -> Option<Period> {
        self.period
    }

    pub fn with_period(mut self, period: Period) -> Self {
        self.period = Some(period);
        self
    }

    pub fn num_rows(&self) -> usize {
        self.batch.num_rows()
    }

    pub fn is_empty(&self) -> bool {
        self.batch.num_rows() == 0
    }

    pub fn column(&self, name: &str) -> Option<&ArrayRef> {
        self.batch.column_by_name(name)
    }

    /// First `n` rows, for display.
    pub fn head(&self, n: usize) -> RecordBatch {
        self.batch.slice(0, n.min(self.batch.num_rows()))
    }
}

impl fmt::Display for CleanedDataset {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let table = pretty_format_batches(std::slice::from_ref(&self.batch)).map_err(|_| fmt::Error)?;
        write!(f, "{}", table)
    }
}

impl From<CleanedDataset> for RecordBatch {
    fn from(d: CleanedDataset) -> Self {
        d.batch
    }
}

/// Drops rows where every field is null or blank text, and stores the
/// identifier columns as text with float artifacts removed
/// (`"7337.0"` → `"7337"`). Leading zeros and other text are untouched.
///
/// Idempotent: cleaning a cleaned batch returns an equal batch.
pub fn clean(batch: &RecordBatch) -> Result<CleanedDataset> {
    let keep = non_empty_rows(batch);
    let kept = keep.true_count();
    let filtered = if kept == batch.num_rows() {
        batch.clone()
    } else {
        filter_record_batch(batch, &keep)?
    };
    debug!(dropped = batch.num_rows() - kept, "dropped empty rows");

    let schema = filtered.schema();
    let mut fields: Vec<Field> = Vec::with_capacity(schema.fields().len());
    let mut columns: Vec<ArrayRef> = Vec::with_capacity(filtered.num_columns());

    for (field, column) in schema.fields().iter().zip(filtered.columns()) {
        if identifier_columns().any(|id| id == field.name().as_str()) {
            let text = cast(column, &DataType::Utf8)?;
            let normalized: StringArray = text
                .as_string::<i32>()
                .iter()
                .map(|v| v.map(normalize_identifier))
                .collect();
            fields.push(field.as_ref().clone().with_data_type(DataType::Utf8));
            columns.push(Arc::new(normalized));
        } else {
            fields.push(field.as_ref().clone());
            columns.push(column.clone());
        }
    }

    let schema = Arc::new(Schema::new_with_metadata(fields, schema.metadata().clone()));
    Ok(CleanedDataset {
        batch: RecordBatch::try_new(schema, columns)?,
        period: None,
    })
}

/// Re-cleans an existing dataset, keeping its period.
pub fn reclean(dataset: &CleanedDataset) -> Result<CleanedDataset> {
    let mut cleaned = clean(&dataset.batch)?;
    cleaned.period = dataset.period;
    Ok(cleaned)
}

fn non_empty_rows(batch: &RecordBatch) -> BooleanArray {
    (0..batch.num_rows())
        .map(|row| {
            Some(batch.columns().iter().any(|col| {
                col.is_valid(row)
                    && match col.data_type() {
                        DataType::Utf8 => !col.as_string::<i32>().value(row).trim().is_empty(),
                        DataType::LargeUtf8 => !col.as_string::<i64>().value(row).trim().is_empty(),
                        _ => true,
                    }
            }))
        })
        .collect()
}
