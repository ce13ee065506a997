// src/fetch/archive.rs

use std::io::{Cursor, Read};
use tracing::{debug, warn};
use zip::ZipArchive;

use crate::error::{BicimadError, Result};

const UTF8_BOM: &str = "\u{feff}";
/// Upper bound on the up-front buffer; the declared size is not trusted.
const MAX_PREALLOC: usize = 64 << 20;

/// Opens `bytes` as a ZIP that must hold exactly one `.csv` member and
/// returns that member decoded as UTF-8, without a leading BOM.
/// `expected_name` is only checked for logging.
pub fn extract_single_csv(bytes: &[u8], expected_name: Option<&str>) -> Result<String> {
    let mut archive = ZipArchive::new(Cursor::new(bytes))?;

    let csv_indices: Vec<usize> = (0..archive.len())
        .filter(|&i| {
            archive
                .by_index(i)
                .map(|e| e.is_file() && e.name().to_lowercase().ends_with(".csv"))
                .unwrap_or(false)
        })
        .collect();

    let index = match csv_indices.as_slice() {
        [only] => *only,
        [] => {
            return Err(BicimadError::Format(format!(
                "archive has no CSV member ({} entries)",
                archive.len()
            )))
        }
        many => {
            return Err(BicimadError::Format(format!(
                "archive has {} CSV members, expected exactly one",
                many.len()
            )))
        }
    };

    let mut entry = archive.by_index(index)?;
    let name = entry.name().to_string();
    if let Some(expected) = expected_name {
        let base = name.rsplit('/').next().unwrap_or(&name);
        if !base.eq_ignore_ascii_case(expected) {
            warn!(member = %name, expected, "CSV member name differs from archive name");
        }
    }

    let mut buf = Vec::with_capacity(initial_capacity(entry.size()));
    entry
        .read_to_end(&mut buf)
        .map_err(|e| BicimadError::Format(format!("reading {}: {}", name, e)))?;
    debug!(member = %name, bytes = buf.len(), "extracted CSV");

    let text = String::from_utf8(buf)
        .map_err(|e| BicimadError::Format(format!("{} is not valid UTF-8: {}", name, e)))?;
    Ok(match text.strip_prefix(UTF8_BOM) {
        Some(rest) => rest.to_string(),
        None => text,
    })
}

/// Buffer size to reserve for a member declaring `declared` bytes.
fn initial_capacity(declared: u64) -> usize {
    usize::try_from(declared)
        .unwrap_or(usize::MAX)
        .min(MAX_PREALLOC)
}
