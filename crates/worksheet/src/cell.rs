use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value as JsonValue;
use std::fmt;

use crate::column::CellType;

/// A single cell value.
///
/// `Null` doubles as the absent value: a row with no entry for a column
/// reads as `Null` until the cell is explicitly written.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum CellValue {
    Null,
    Bool(bool),
    Number(f64),
    Date(DateTime<Utc>),
    Text(String),
}

impl CellValue {
    /// Check if the value is null.
    #[must_use]
    pub fn is_null(&self) -> bool {
        matches!(self, CellValue::Null)
    }

    /// Try to get the value as a boolean.
    #[must_use]
    pub fn as_bool(&self) -> Option<bool> {
        match self {
            CellValue::Bool(b) => Some(*b),
            CellValue::Number(n) => Some(*n != 0.0),
            CellValue::Text(s) => s.parse().ok(),
            CellValue::Null | CellValue::Date(_) => None,
        }
    }

    /// Try to get the value as a number.
    #[must_use]
    pub fn as_number(&self) -> Option<f64> {
        match self {
            CellValue::Number(n) => Some(*n),
            CellValue::Bool(b) => Some(if *b { 1.0 } else { 0.0 }),
            CellValue::Text(s) => s.parse().ok(),
            CellValue::Null | CellValue::Date(_) => None,
        }
    }

    /// Try to get the value as a date instant.
    #[must_use]
    pub fn as_date(&self) -> Option<DateTime<Utc>> {
        match self {
            CellValue::Date(d) => Some(*d),
            CellValue::Text(s) => parse_date(s),
            _ => None,
        }
    }

    /// Get the value as a display string.
    #[must_use]
    pub fn as_str(&self) -> String {
        match self {
            CellValue::Null => String::new(),
            CellValue::Bool(b) => b.to_string(),
            CellValue::Number(n) => n.to_string(),
            CellValue::Date(d) => d.to_rfc3339(),
            CellValue::Text(s) => s.clone(),
        }
    }

    /// Parse a string into a `CellValue` with type inference.
    /// Tries: null -> bool -> number -> date -> text.
    #[must_use]
    pub fn parse(s: &str) -> CellValue {
        let trimmed = s.trim();

        if trimmed.is_empty() {
            return CellValue::Null;
        }

        match trimmed.to_lowercase().as_str() {
            "true" | "yes" => return CellValue::Bool(true),
            "false" | "no" => return CellValue::Bool(false),
            _ => {}
        }

        if let Ok(n) = trimmed.parse::<f64>() {
            return CellValue::Number(n);
        }

        if let Some(date) = parse_date(trimmed) {
            return CellValue::Date(date);
        }

        CellValue::Text(s.to_string())
    }

    /// Coerce raw text input for a column of the given type.
    ///
    /// This is the caller-layer policy the store itself does not apply:
    /// a number cell maps empty or unparsable input to `Null` rather than
    /// NaN, a checkbox becomes a strict boolean, and a date parses to an
    /// instant or `Null`. Text-like columns keep the input verbatim.
    #[must_use]
    pub fn coerce(raw: &str, kind: CellType) -> CellValue {
        match kind {
            CellType::Number => {
                let trimmed = raw.trim();
                if trimmed.is_empty() {
                    return CellValue::Null;
                }
                trimmed.parse().map_or(CellValue::Null, CellValue::Number)
            }
            CellType::Checkbox => CellValue::Bool(matches!(
                raw.trim().to_lowercase().as_str(),
                "true" | "1" | "yes" | "on"
            )),
            CellType::Date => parse_date(raw.trim()).map_or(CellValue::Null, CellValue::Date),
            CellType::Text | CellType::Dropdown | CellType::Formula => {
                CellValue::Text(raw.to_string())
            }
        }
    }

    /// Convert a decoded JSON value into a cell value.
    /// Composite values are stored as their JSON text.
    #[must_use]
    pub fn from_json(json: JsonValue) -> CellValue {
        match json {
            JsonValue::Null => CellValue::Null,
            JsonValue::Bool(b) => CellValue::Bool(b),
            JsonValue::Number(n) => n.as_f64().map_or(CellValue::Null, CellValue::Number),
            JsonValue::String(s) => CellValue::Text(s),
            composite @ (JsonValue::Array(_) | JsonValue::Object(_)) => {
                CellValue::Text(composite.to_string())
            }
        }
    }
}

/// Parse a date from RFC 3339 or plain `YYYY-MM-DD` text.
fn parse_date(s: &str) -> Option<DateTime<Utc>> {
    if let Ok(instant) = DateTime::parse_from_rfc3339(s) {
        return Some(instant.with_timezone(&Utc));
    }
    let date = s.parse::<NaiveDate>().ok()?;
    Some(DateTime::from_naive_utc_and_offset(
        date.and_hms_opt(0, 0, 0)?,
        Utc,
    ))
}

impl Default for CellValue {
    fn default() -> Self {
        CellValue::Null
    }
}

impl fmt::Display for CellValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CellValue::Null => write!(f, ""),
            CellValue::Bool(b) => write!(f, "{b}"),
            CellValue::Number(n) => write!(f, "{n}"),
            CellValue::Date(d) => write!(f, "{}", d.to_rfc3339()),
            CellValue::Text(s) => write!(f, "{s}"),
        }
    }
}

impl From<bool> for CellValue {
    fn from(b: bool) -> Self {
        CellValue::Bool(b)
    }
}

impl From<f64> for CellValue {
    fn from(n: f64) -> Self {
        CellValue::Number(n)
    }
}

impl From<i64> for CellValue {
    fn from(n: i64) -> Self {
        CellValue::Number(n as f64)
    }
}

impl From<i32> for CellValue {
    fn from(n: i32) -> Self {
        CellValue::Number(f64::from(n))
    }
}

impl From<String> for CellValue {
    fn from(s: String) -> Self {
        CellValue::Text(s)
    }
}

impl From<&str> for CellValue {
    fn from(s: &str) -> Self {
        CellValue::Text(s.to_string())
    }
}

impl From<DateTime<Utc>> for CellValue {
    fn from(d: DateTime<Utc>) -> Self {
        CellValue::Date(d)
    }
}

impl<T: Into<CellValue>> From<Option<T>> for CellValue {
    fn from(opt: Option<T>) -> Self {
        match opt {
            Some(v) => v.into(),
            None => CellValue::Null,
        }
    }
}

/// The stored contents of one cell.
///
/// `edited` is set on the first user write, which distinguishes a cell
/// that was never touched from one that was explicitly cleared.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CellData {
    pub value: CellValue,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub display_value: Option<String>,
    #[serde(default, skip_serializing_if = "std::ops::Not::not")]
    pub edited: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub formula: Option<String>,
}

impl CellData {
    /// An untouched cell holding the given value.
    #[must_use]
    pub fn new(value: CellValue) -> Self {
        CellData {
            value,
            display_value: None,
            edited: false,
            formula: None,
        }
    }

    /// A cell state produced by a user write. Any stored formula is
    /// dropped with the rest of the previous state.
    #[must_use]
    pub fn edited(value: CellValue) -> Self {
        CellData {
            value,
            display_value: None,
            edited: true,
            formula: None,
        }
    }
}

impl Default for CellData {
    fn default() -> Self {
        CellData::new(CellValue::Null)
    }
}
