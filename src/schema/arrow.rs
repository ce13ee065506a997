// src/schema/arrow.rs

use arrow::datatypes::{DataType, Field as ArrowField, Schema as ArrowSchema, SchemaRef, TimeUnit};
use std::sync::Arc;

use super::types::{Column, ColumnKind};

/// Map a declared column kind into an Arrow DataType.
///
/// Timestamps are Madrid wall-clock times as written in the files, so they
/// carry no timezone.
pub fn map_to_arrow_type(kind: ColumnKind) -> DataType {
    match kind {
        ColumnKind::Text => DataType::Utf8,
        ColumnKind::Float => DataType::Float64,
        ColumnKind::Timestamp => DataType::Timestamp(TimeUnit::Millisecond, None),
        ColumnKind::Date => DataType::Date32,
    }
}

/// Build an ArrowSchema (inside an Arc) from a slice of `Column`s.
pub fn build_arrow_schema(cols: &[Column]) -> SchemaRef {
    let fields: Vec<ArrowField> = cols
        .iter()
        .map(|col| ArrowField::new(col.name, map_to_arrow_type(col.kind), /* nullable = */ true))
        .collect();

    Arc::new(ArrowSchema::new(fields))
}

/// All-text schema with the given header names, used for the raw read.
pub fn raw_text_schema<'a>(headers: impl IntoIterator<Item = &'a str>) -> SchemaRef {
    let fields: Vec<ArrowField> = headers
        .into_iter()
        .map(|name| ArrowField::new(name, DataType::Utf8, true))
        .collect();
    Arc::new(ArrowSchema::new(fields))
}
