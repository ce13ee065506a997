// src/schema/types.rs

use serde::{Deserialize, Serialize};

/// Declared storage type of a trip column.
#[derive(Debug, Serialize, Deserialize, PartialEq, Clone, Copy, Eq, Hash)]
#[serde(rename_all = "lowercase")]
pub enum ColumnKind {
    Text,
    Float,
    Timestamp,
    Date,
}

/// A single column of the trip CSV.
#[derive(Debug, PartialEq, Clone, Copy, Eq, Hash)]
pub struct Column {
    pub name: &'static str,
    pub kind: ColumnKind,
    /// Missing required columns make the file unreadable; optional ones are
    /// filled with nulls.
    pub required: bool,
    /// Codes that must stay text (bike ids, station and dock numbers).
    pub identifier: bool,
}

impl Column {
    pub(crate) const fn text(name: &'static str) -> Self {
        Self {
            name,
            kind: ColumnKind::Text,
            required: true,
            identifier: false,
        }
    }

    pub(crate) const fn id(name: &'static str) -> Self {
        Self {
            identifier: true,
            ..Self::text(name)
        }
    }

    pub(crate) const fn of(name: &'static str, kind: ColumnKind) -> Self {
        Self {
            kind,
            ..Self::text(name)
        }
    }

    pub(crate) const fn optional(self) -> Self {
        Self {
            required: false,
            ..self
        }
    }
}
