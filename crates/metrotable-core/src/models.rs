use serde::{Deserialize, Serialize};

use crate::error::AppError;

/// Message carried by the sentinel row of an empty [`ResultSet`].
pub const NO_DATA_MESSAGE: &str = "no data";

/// A section of the target page, matched by its anchor.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SectionReference {
    pub anchor: String,
    pub index: u32,
}

/// Population cell value.
///
/// Numeric text becomes a number (integral values serialize as JSON
/// integers); anything else is kept verbatim.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Population {
    Count(i64),
    Decimal(f64),
    Text(String),
}

impl Population {
    /// Wrap a parsed number, preferring the integral representation.
    /// Non-finite values have no JSON number form and fall back to text.
    pub fn from_number(value: f64) -> Self {
        if !value.is_finite() {
            Population::Text(value.to_string())
        } else if value.fract() == 0.0 && value >= i64::MIN as f64 && value < i64::MAX as f64 {
            Population::Count(value as i64)
        } else {
            Population::Decimal(value)
        }
    }
}

/// One extracted table row.
///
/// Always serializes exactly four keys; missing cells become `null`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TableRecord {
    pub name: Option<String>,
    pub country: Option<String>,
    pub population: Option<Population>,
    /// Link from the name cell, or the page URL when the cell has none.
    pub url: String,
}

/// Placeholder emitted instead of an empty result.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SentinelRecord {
    pub error: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum ResultRow {
    Record(TableRecord),
    Sentinel(SentinelRecord),
}

/// Ordered extraction result, never empty.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(transparent)]
pub struct ResultSet {
    rows: Vec<ResultRow>,
}

impl ResultSet {
    /// Wrap records in table order, substituting the sentinel row when
    /// there are none.
    pub fn from_records(records: Vec<TableRecord>) -> Self {
        if records.is_empty() {
            return Self {
                rows: vec![ResultRow::Sentinel(SentinelRecord {
                    error: NO_DATA_MESSAGE.to_string(),
                })],
            };
        }

        Self {
            rows: records.into_iter().map(ResultRow::Record).collect(),
        }
    }

    pub fn rows(&self) -> &[ResultRow] {
        &self.rows
    }

    /// Extracted records; empty when this is the sentinel set.
    pub fn records(&self) -> impl Iterator<Item = &TableRecord> {
        self.rows.iter().filter_map(|row| match row {
            ResultRow::Record(record) => Some(record),
            ResultRow::Sentinel(_) => None,
        })
    }

    pub fn is_sentinel(&self) -> bool {
        matches!(self.rows.as_slice(), [ResultRow::Sentinel(_)])
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    /// JSON body with tab indentation, as served by the HTTP endpoint.
    pub fn to_pretty_json(&self) -> Result<String, AppError> {
        Ok(to_tab_indented_json(self)?)
    }
}

/// Pretty-print any value as JSON indented with tabs.
pub fn to_tab_indented_json<T: Serialize + ?Sized>(value: &T) -> Result<String, serde_json::Error> {
    let mut buf = Vec::new();
    let formatter = serde_json::ser::PrettyFormatter::with_indent(b"\t");
    let mut serializer = serde_json::Serializer::with_formatter(&mut buf, formatter);
    value.serialize(&mut serializer)?;
    // serde_json only ever writes valid UTF-8.
    Ok(String::from_utf8_lossy(&buf).into_owned())
}
