//! Schema-driven field validation.
//!
//! Checks a candidate value against a column's type class, declared length
//! and nullability before a write statement is issued. Validation is opt-in
//! through [`OrmConfig::validate_fields`](crate::OrmConfig).

use std::collections::BTreeMap;
use std::sync::OnceLock;

use chrono::NaiveDate;

use crate::error::{OrmError, OrmResult};
use crate::schema::{FieldDescriptor, TableSchema};
use crate::value::Value;

/// Numeric column types.
pub const NUMERIC_TYPES: &[&str] = &[
    "tinyint", "int", "smallint", "mediumint", "bigint", "decimal", "float", "double", "numeric",
    "integer",
];

/// Character and binary column types.
pub const TEXT_TYPES: &[&str] = &[
    "char",
    "varchar",
    "binary",
    "varbinary",
    "blob",
    "text",
    "enum",
    "set",
    "tinytext",
    "mediumtext",
    "longtext",
];

/// Date and time column types.
pub const TEMPORAL_TYPES: &[&str] = &["date", "datetime", "timestamp", "year", "time"];

const DATE_PATTERN: &str = "YYYY-MM-DD";
const DATETIME_PATTERN: &str = "YYYY-MM-DD HH:MM:SS";
const TIME_PATTERN: &str = "HH:MM:SS";

/// Validate every described column of `schema` against `row`.
///
/// A column with no entry in `row` at all fails with `MissingColumn` — this
/// is distinct from a present-but-empty value, which fails the per-field
/// null check instead.
pub fn validate_all_fields(schema: &TableSchema, row: &BTreeMap<String, Value>) -> OrmResult<()> {
    for field in schema.fields() {
        let Some(value) = row.get(&field.name) else {
            return Err(OrmError::MissingColumn {
                table: field.table.clone(),
                column: field.name.clone(),
            });
        };
        validate_field(field, value)?;
    }
    Ok(())
}

/// Validate one candidate value against its column descriptor, with
/// 24-hour time semantics.
pub fn validate_field(field: &FieldDescriptor, value: &Value) -> OrmResult<()> {
    validate_field_with_mode(field, value, false)
}

/// Validate one candidate value; `twelve_hour` switches `time` hours to 1-12.
pub fn validate_field_with_mode(
    field: &FieldDescriptor,
    value: &Value,
    twelve_hour: bool,
) -> OrmResult<()> {
    validate_null(field, value)?;
    let base = field.base_type.as_str();
    if NUMERIC_TYPES.contains(&base) {
        if !value.is_numeric() && !field.nullable {
            return Err(type_mismatch(field, "numeric"));
        }
    } else if TEXT_TYPES.contains(&base) {
        if !value.is_text() && !field.nullable {
            return Err(type_mismatch(field, "a string"));
        }
        validate_length(field, value)?;
    } else if TEMPORAL_TYPES.contains(&base) && !value.is_empty() {
        validate_temporal(field, value, twelve_hour)?;
    }
    Ok(())
}

/// Semantic calendar check: `true` when year, month and day form a real date.
pub fn is_valid_date(year: i32, month: u32, day: u32) -> bool {
    NaiveDate::from_ymd_opt(year, month, day).is_some()
}

/// Range check for time components. 24-hour mode accepts hours 0-23,
/// 12-hour mode 1-12; minutes and seconds are 0-59 in both.
pub fn is_valid_time(hour: i64, minute: i64, second: i64, twelve_hour: bool) -> bool {
    let hour_ok = if twelve_hour {
        (1..=12).contains(&hour)
    } else {
        (0..=23).contains(&hour)
    };
    hour_ok && (0..=59).contains(&minute) && (0..=59).contains(&second)
}

/// Non-nullable columns must carry a value, unless the engine generates one.
fn validate_null(field: &FieldDescriptor, value: &Value) -> OrmResult<()> {
    if !field.nullable && !field.is_auto_generated() && value.is_empty() {
        return Err(OrmError::MissingValue {
            table: field.table.clone(),
            column: field.name.clone(),
        });
    }
    Ok(())
}

/// Text values may not exceed the declared column length (in characters).
fn validate_length(field: &FieldDescriptor, value: &Value) -> OrmResult<()> {
    let (Some(max), Some(s)) = (field.length, value.as_str()) else {
        return Ok(());
    };
    if s.chars().count() > max as usize {
        return Err(OrmError::LengthExceeded {
            table: field.table.clone(),
            column: field.name.clone(),
            max,
        });
    }
    Ok(())
}

fn validate_temporal(field: &FieldDescriptor, value: &Value, twelve_hour: bool) -> OrmResult<()> {
    let text = value.as_str().map(str::trim).unwrap_or_default();
    match field.base_type.as_str() {
        "date" => {
            if !date_regex().is_match(text) || !date_is_real(text) {
                return Err(date_format(field, DATE_PATTERN));
            }
        }
        "datetime" | "timestamp" => {
            let ok = match text.split_once(' ') {
                Some((date, time)) => date_is_real(date) && time_is_valid(time, twelve_hour),
                None => false,
            };
            if !ok {
                return Err(date_format(field, DATETIME_PATTERN));
            }
        }
        "time" => {
            if !time_is_valid(text, twelve_hour) {
                return Err(OrmError::InvalidTimeFormat {
                    table: field.table.clone(),
                    column: field.name.clone(),
                    pattern: TIME_PATTERN,
                });
            }
        }
        // `year` carries no dedicated format check
        _ => {}
    }
    Ok(())
}

fn date_regex() -> &'static regex::Regex {
    static DATE_RE: OnceLock<regex::Regex> = OnceLock::new();
    DATE_RE.get_or_init(|| {
        regex::Regex::new(r"^(19|20)\d{2}-(0[1-9]|1[012])-(0[1-9]|[12]\d|3[01])$")
            .expect("invalid built-in date regex")
    })
}

/// Exactly three dash-separated components forming a real calendar date.
fn date_is_real(text: &str) -> bool {
    let mut parts = text.split('-');
    let (Some(y), Some(m), Some(d), None) =
        (parts.next(), parts.next(), parts.next(), parts.next())
    else {
        return false;
    };
    match (y.parse(), m.parse(), d.parse()) {
        (Ok(y), Ok(m), Ok(d)) => is_valid_date(y, m, d),
        _ => false,
    }
}

/// Exactly three colon-separated components passing the range checks.
fn time_is_valid(text: &str, twelve_hour: bool) -> bool {
    let mut parts = text.split(':');
    let (Some(h), Some(m), Some(s), None) =
        (parts.next(), parts.next(), parts.next(), parts.next())
    else {
        return false;
    };
    match (h.parse(), m.parse(), s.parse()) {
        (Ok(h), Ok(m), Ok(s)) => is_valid_time(h, m, s, twelve_hour),
        _ => false,
    }
}

fn type_mismatch(field: &FieldDescriptor, expected: &'static str) -> OrmError {
    OrmError::TypeMismatch {
        table: field.table.clone(),
        column: field.name.clone(),
        expected,
    }
}

fn date_format(field: &FieldDescriptor, pattern: &'static str) -> OrmError {
    OrmError::InvalidDateFormat {
        table: field.table.clone(),
        column: field.name.clone(),
        pattern,
    }
}
