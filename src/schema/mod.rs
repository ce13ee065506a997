// src/schema/mod.rs

pub mod arrow;
pub mod types;

pub use self::arrow::{build_arrow_schema, map_to_arrow_type, raw_text_schema};
pub use self::types::{Column, ColumnKind};

use ::arrow::datatypes::SchemaRef;

/// Columns kept from the trip CSVs, in output order. Anything else in the
/// source header is dropped.
pub const TRIP_COLUMNS: &[Column] = &[
    Column::of("fecha", ColumnKind::Date),
    Column::id("idBike"),
    Column::id("fleet"),
    Column::of("trip_minutes", ColumnKind::Float),
    Column::text("geolocation_unlock"),
    Column::text("address_unlock"),
    Column::of("unlock_date", ColumnKind::Timestamp),
    Column::text("locktype"),
    Column::text("unlocktype"),
    Column::text("geolocation_lock"),
    Column::text("address_lock"),
    Column::of("lock_date", ColumnKind::Timestamp),
    Column::id("station_unlock"),
    Column::id("dock_unlock").optional(),
    Column::text("unlock_station_name"),
    Column::id("station_lock"),
    Column::id("dock_lock").optional(),
    Column::text("lock_station_name"),
];

pub const UNLOCK_STATION_NAME: &str = "unlock_station_name";
pub const TRIP_MINUTES: &str = "trip_minutes";

pub fn trip_schema() -> SchemaRef {
    build_arrow_schema(TRIP_COLUMNS)
}

pub fn identifier_columns() -> impl Iterator<Item = &'static str> {
    TRIP_COLUMNS.iter().filter(|c| c.identifier).map(|c| c.name)
}
