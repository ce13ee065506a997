use arrow::{
    compute::concat_batches,
    csv::{reader::Format, ReaderBuilder},
    record_batch::RecordBatch,
};
use std::io::{Cursor, Read};
use std::time::Instant;
use tracing::{debug, info, instrument};

use crate::config::CsvDialect;
use crate::error::{BicimadError, Result};
use crate::process::convert::{convert_to_final_types, resolve_layout};
use crate::schema::{raw_text_schema, trip_schema};

/// Reads a trip CSV into a batch with the declared trip schema.
///
/// Every column is first read as text and then converted column by column,
/// so identifier codes never pass through a numeric type.
#[instrument(level = "info", skip_all)]
pub fn parse_trips<R: Read>(mut reader: R, dialect: &CsvDialect) -> Result<RecordBatch> {
    let start = Instant::now();
    let mut buf = Vec::new();
    reader
        .read_to_end(&mut buf)
        .map_err(|e| BicimadError::Format(format!("reading CSV: {}", e)))?;

    let delimiter = u8::try_from(dialect.delimiter).map_err(|_| {
        BicimadError::Config(format!("delimiter {:?} is not a single byte", dialect.delimiter))
    })?;

    let format = Format::default().with_header(true).with_delimiter(delimiter);
    let (header, _) = format.infer_schema(Cursor::new(&buf), Some(0))?;
    let headers: Vec<String> = header.fields().iter().map(|f| f.name().clone()).collect();
    if headers.is_empty() {
        return Err(BicimadError::Format("CSV has no header row".into()));
    }
    debug!(columns = headers.len(), "read header");
    let layout = resolve_layout(&headers)?;

    let raw_reader = ReaderBuilder::new(raw_text_schema(headers.iter().map(String::as_str)))
        .with_format(format)
        .with_truncated_rows(true)
        .with_batch_size(dialect.batch_size)
        .build(Cursor::new(&buf))?;

    let mut batches = Vec::new();
    for raw in raw_reader {
        batches.push(convert_to_final_types(&raw?, &layout, dialect)?);
    }

    let schema = trip_schema();
    let batch = concat_batches(&schema, &batches)?;
    info!(rows = batch.num_rows(), elapsed = ?start.elapsed(), "parsed trips");
    Ok(batch)
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;
    use arrow::array::{Array, AsArray};
    use arrow::datatypes::Float64Type;

    pub(crate) const HEADER: &str = "fecha;idBike;fleet;trip_minutes;geolocation_unlock;address_unlock;unlock_date;locktype;unlocktype;geolocation_lock;address_lock;lock_date;station_unlock;dock_unlock;unlock_station_name;station_lock;dock_lock;lock_station_name";

    /// A February 2023 extract: four real-shaped trips, one fully blank row
    /// and one truncated row.
    pub(crate) fn february_csv() -> String {
        let rows = [
            "2023-02-01;7337.0;1.0;5.77;{'type': 'Point', 'coordinates': [-3.6956178, 40.4227788]};'Calle Fernando el Santo nº 13 ';2023-02-01T00:00:10;STATION;STATION;{'type': 'Point', 'coordinates': [-3.7048299, 40.4178244]};'Plaza de la Cebada nº 16 ';2023-02-01T00:05:56;109.0;14.0;103 - Fernando el Santo;102.0;7.0;102 - Plaza de la Cebada",
            "2023-02-01;5463.0;1.0;1.6;{'type': 'Point', 'coordinates': [-3.7048299, 40.4178244]};'Plaza de la Cebada nº 16 ';2023-02-01T00:00:23;STATION;STATION;{'type': 'Point', 'coordinates': [-3.7031187, 40.4147334]};'Calle Toledo nº 74 ';2023-02-01T00:01:59;102.0;3.0;102 - Plaza de la Cebada;097;21.0;097 - Toledo",
            ";;;;;;;;;;;;;;;;;",
            "2023-02-01;0451;1.0;12.25;{'type': 'Point', 'coordinates': [-3.7048299, 40.4178244]};'Plaza de la Cebada nº 16 ';2023-02-01T00:02:41;STATION;STATION;{'type': 'Point', 'coordinates': [-3.6881, 40.4531]};'Calle Santa Engracia nº 1 ';2023-02-01T00:14:56;102.0;9.0;102 - Plaza de la Cebada;140.0;2.0;140 - Santa Engracia",
            "2023-02-01;2170.0;1.0;7.03;{'type': 'Point', 'coordinates': [-3.7048299, 40.4178244]};'Plaza de la Cebada nº 16 ';2023-02-01T00:03:12;STATION;STATION;{'type': 'Point', 'coordinates': [-3.7056, 40.4205]};'Calle Alcalá nº 2 ';2023-02-01T00:10:14;102.0;22.0;102 - Plaza de la Cebada;1.0;18.0;001 - Puerta del Sol",
            "2023-02-02;8844.0;1.0",
        ];
        let mut csv = String::from(HEADER);
        csv.push('\n');
        for r in rows {
            csv.push_str(r);
            csv.push('\n');
        }
        csv
    }

    #[test]
    fn parses_every_row_with_declared_types() {
        let batch = parse_trips(Cursor::new(february_csv()), &CsvDialect::default()).unwrap();
        assert_eq!(batch.num_rows(), 6);
        assert_eq!(batch.schema(), trip_schema());

        let minutes = batch.column_by_name("trip_minutes").unwrap().as_primitive::<Float64Type>();
        assert_eq!(minutes.value(0), 5.77);
        assert!(minutes.is_null(2));

        let station = batch.column_by_name("station_lock").unwrap().as_string::<i32>();
        assert_eq!(station.value(1), "097");
        let bikes = batch.column_by_name("idBike").unwrap().as_string::<i32>();
        assert_eq!(bikes.value(3), "0451");

        let truncated = batch.column_by_name("address_lock").unwrap();
        assert!(truncated.is_null(5));
    }

    #[test]
    fn extra_columns_are_dropped_and_order_follows_schema() {
        let csv = format!(
            "extra;{}\nignored;{}\n",
            HEADER,
            "2023-02-01;1;1;2.0;g;a;2023-02-01T00:00:00;S;S;g;a;2023-02-01T00:01:00;1;1;n;2;2;m"
        );
        let batch = parse_trips(Cursor::new(csv), &CsvDialect::default()).unwrap();
        assert!(batch.column_by_name("extra").is_none());
        assert_eq!(batch.schema().field(0).name(), "fecha");
        assert_eq!(batch.num_rows(), 1);
    }

    #[test]
    fn header_only_yields_empty_batch() {
        let batch = parse_trips(Cursor::new(format!("{}\n", HEADER)), &CsvDialect::default()).unwrap();
        assert_eq!(batch.num_rows(), 0);
        assert_eq!(batch.schema(), trip_schema());
    }

    #[test]
    fn empty_input_and_wrong_header_are_format_errors() {
        assert!(matches!(
            parse_trips(Cursor::new(""), &CsvDialect::default()),
            Err(BicimadError::Format(_))
        ));
        assert!(matches!(
            parse_trips(Cursor::new("a;b;c\n1;2;3\n"), &CsvDialect::default()),
            Err(BicimadError::Format(_))
        ));
    }

    #[test]
    fn delimiter_comes_from_dialect() {
        let dialect = CsvDialect {
            delimiter: ',',
            ..CsvDialect::default()
        };
        let csv = format!(
            "{}\n{}\n",
            HEADER.replace(';', ","),
            "2023-02-01,1,1,2.0,g,a,2023-02-01 00:00:00,S,S,g,a,2023-02-01 00:01:00,1,1,n,2,2,m"
        );
        let batch = parse_trips(Cursor::new(csv), &dialect).unwrap();
        assert_eq!(batch.num_rows(), 1);
        assert!(batch.column_by_name("unlock_date").unwrap().is_valid(0));
    }
}
