//! Normalization of provider-shaped tables into [`KlineRecord`] sequences.
//!
//! Each provider declares an explicit, finite [`ColumnMap`] from its own
//! column names to the canonical schema. Normalization fails loudly when a
//! mapped column is missing from the payload instead of silently dropping
//! data, coerces numeric fields (several providers deliver numbers as
//! strings), and sorts the output ascending by date.

use serde_json::Value;
use time::macros::format_description;
use time::{Date, PrimitiveDateTime};

use crate::domain::{KlineRecord, KLINE_SCHEMA};
use crate::error::{FetchError, ValidationError};

/// Finite mapping from provider column names to canonical field names.
///
/// Construction requires every canonical field to be covered exactly once,
/// so a malformed provider map is caught when the adapter is built rather
/// than surfacing as a half-normalized record later.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ColumnMap {
    entries: Vec<(String, &'static str)>,
}

impl ColumnMap {
    pub fn new<S>(entries: impl IntoIterator<Item = (S, &'static str)>) -> Result<Self, ValidationError>
    where
        S: Into<String>,
    {
        let entries: Vec<(String, &'static str)> = entries
            .into_iter()
            .map(|(source, canonical)| (source.into(), canonical))
            .collect();

        for (_, canonical) in &entries {
            if !KLINE_SCHEMA.contains(canonical) {
                return Err(ValidationError::UnknownCanonicalField {
                    field: (*canonical).to_owned(),
                });
            }
        }

        let covered = KLINE_SCHEMA
            .iter()
            .all(|field| entries.iter().filter(|(_, c)| c == field).count() == 1);
        if !covered || entries.len() != KLINE_SCHEMA.len() {
            return Err(ValidationError::IncompleteColumnMap);
        }

        Ok(Self { entries })
    }

    /// Provider column name mapped to `canonical`, if the map covers it.
    pub fn source_for(&self, canonical: &str) -> Option<&str> {
        self.entries
            .iter()
            .find(|(_, c)| *c == canonical)
            .map(|(source, _)| source.as_str())
    }

    pub fn sources(&self) -> impl Iterator<Item = &str> {
        self.entries.iter().map(|(source, _)| source.as_str())
    }
}

/// Tabular payload as a provider returned it: named columns plus rows of
/// loosely-typed values.
#[derive(Debug, Clone, PartialEq)]
pub struct RawTable {
    pub columns: Vec<String>,
    pub rows: Vec<Vec<Value>>,
}

impl RawTable {
    pub fn new(columns: Vec<String>, rows: Vec<Vec<Value>>) -> Self {
        Self { columns, rows }
    }
}

/// Normalize a provider table into an ascending-by-date record sequence.
///
/// An empty table yields an empty sequence. Missing mapped columns,
/// non-numeric OHLCV values, unparseable dates, and records violating the
/// OHLC invariants all surface as upstream errors.
pub fn normalize_records(table: &RawTable, map: &ColumnMap) -> Result<Vec<KlineRecord>, FetchError> {
    if table.rows.is_empty() {
        return Ok(Vec::new());
    }

    let missing: Vec<&str> = map
        .sources()
        .filter(|source| !table.columns.iter().any(|c| c == source))
        .collect();
    if !missing.is_empty() {
        return Err(FetchError::upstream(format!(
            "upstream data is missing expected columns: {missing:?}; available columns: {:?}",
            table.columns
        )));
    }

    let index_of = |canonical: &str| -> usize {
        let source = map
            .source_for(canonical)
            .expect("column map covers every canonical field");
        table
            .columns
            .iter()
            .position(|c| c == source)
            .expect("mapped columns were checked present")
    };
    let date_idx = index_of("date");
    let open_idx = index_of("open");
    let close_idx = index_of("close");
    let high_idx = index_of("high");
    let low_idx = index_of("low");
    let volume_idx = index_of("volume");

    let mut keyed: Vec<(PrimitiveDateTime, KlineRecord)> = Vec::with_capacity(table.rows.len());
    for (row_index, row) in table.rows.iter().enumerate() {
        if row.len() != table.columns.len() {
            return Err(FetchError::upstream(format!(
                "upstream row {row_index} has {} values for {} columns",
                row.len(),
                table.columns.len()
            )));
        }

        let date = coerce_date(&row[date_idx], row_index)?;
        let record = KlineRecord::new(
            date.clone(),
            coerce_number(&row[open_idx], "open", row_index)?,
            coerce_number(&row[high_idx], "high", row_index)?,
            coerce_number(&row[low_idx], "low", row_index)?,
            coerce_number(&row[close_idx], "close", row_index)?,
            coerce_number(&row[volume_idx], "volume", row_index)?,
        )
        .map_err(|error| {
            FetchError::upstream(format!("upstream record at '{date}' failed validation: {error}"))
        })?;

        let key = parse_kline_date(&record.date)
            .map_err(|error| FetchError::upstream(error.to_string()))?;
        keyed.push((key, record));
    }

    keyed.sort_by(|(a, _), (b, _)| a.cmp(b));
    Ok(keyed.into_iter().map(|(_, record)| record).collect())
}

/// Parse a record date, accepting `YYYY-MM-DD` (read as midnight),
/// `YYYY-MM-DD HH:MM`, and `YYYY-MM-DD HH:MM:SS`.
pub fn parse_kline_date(input: &str) -> Result<PrimitiveDateTime, ValidationError> {
    let datetime = format_description!("[year]-[month]-[day] [hour]:[minute]:[second]");
    let datetime_short = format_description!("[year]-[month]-[day] [hour]:[minute]");
    let date_only = format_description!("[year]-[month]-[day]");

    let trimmed = input.trim();
    PrimitiveDateTime::parse(trimmed, &datetime)
        .or_else(|_| PrimitiveDateTime::parse(trimmed, &datetime_short))
        .or_else(|_| Date::parse(trimmed, &date_only).map(Date::midnight))
        .map_err(|_| ValidationError::InvalidDate {
            value: input.to_owned(),
        })
}

fn coerce_date(value: &Value, row_index: usize) -> Result<String, FetchError> {
    match value {
        Value::String(s) => Ok(s.trim().to_owned()),
        other => Err(FetchError::upstream(format!(
            "upstream row {row_index} date value {other} is not a string"
        ))),
    }
}

fn coerce_number(value: &Value, field: &'static str, row_index: usize) -> Result<f64, FetchError> {
    let parsed = match value {
        Value::Number(n) => n.as_f64(),
        Value::String(s) => s.trim().parse::<f64>().ok(),
        _ => None,
    };

    parsed.ok_or_else(|| {
        FetchError::upstream(format!(
            "upstream row {row_index} column '{field}' value {value} is not numeric"
        ))
    })
}
