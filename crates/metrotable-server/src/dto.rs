use serde::Serialize;

use metrotable_core::models::{Population, ResultRow, ResultSet, TableRecord};

// ---------------------------------------------------------------------------
// Areas
// ---------------------------------------------------------------------------

#[derive(Debug, Serialize, utoipa::ToSchema)]
pub struct AreaRecord {
    pub name: Option<String>,
    pub country: Option<String>,
    /// Number when the cell parsed as one, otherwise the cell text
    #[schema(value_type = Option<Object>)]
    pub population: Option<serde_json::Value>,
    /// Link from the name cell, or the page URL
    pub url: String,
}

impl From<&TableRecord> for AreaRecord {
    fn from(record: &TableRecord) -> Self {
        Self {
            name: record.name.clone(),
            country: record.country.clone(),
            population: record.population.as_ref().map(|p| match p {
                Population::Count(n) => serde_json::Value::from(*n),
                Population::Decimal(f) => serde_json::Value::from(*f),
                Population::Text(text) => serde_json::Value::from(text.as_str()),
            }),
            url: record.url.clone(),
        }
    }
}

/// Single row returned when the table had no data rows.
#[derive(Debug, Serialize, utoipa::ToSchema)]
pub struct NoDataResponse {
    pub error: String,
}

#[derive(Debug, Serialize, utoipa::ToSchema)]
#[serde(untagged)]
pub enum AreaRow {
    Record(AreaRecord),
    NoData(NoDataResponse),
}

impl From<&ResultRow> for AreaRow {
    fn from(row: &ResultRow) -> Self {
        match row {
            ResultRow::Record(record) => AreaRow::Record(record.into()),
            ResultRow::Sentinel(sentinel) => AreaRow::NoData(NoDataResponse {
                error: sentinel.error.clone(),
            }),
        }
    }
}

pub fn area_rows(result: &ResultSet) -> Vec<AreaRow> {
    result.rows().iter().map(AreaRow::from).collect()
}

// ---------------------------------------------------------------------------
// Health
// ---------------------------------------------------------------------------

#[derive(Debug, Serialize, utoipa::ToSchema)]
pub struct HealthResponse {
    pub status: &'static str,
}

// ---------------------------------------------------------------------------
// Errors
// ---------------------------------------------------------------------------

#[derive(Debug, Serialize, utoipa::ToSchema)]
pub struct ErrorResponse {
    pub error: String,
    pub message: String,
}
