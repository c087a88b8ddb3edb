use serde::Serialize;
use serde_json::Value;

use crate::document::Document;

/// Conjunction of field equality predicates.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Filter {
    conditions: Document,
}

impl Filter {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn eq(mut self, field: impl Into<String>, value: impl Into<Value>) -> Self {
        self.conditions.insert(field.into(), value.into());
        self
    }

    pub fn is_empty(&self) -> bool {
        self.conditions.is_empty()
    }

    pub fn conditions(&self) -> &Document {
        &self.conditions
    }

    /// A field matches when it equals the value, or is an array holding it.
    pub fn matches(&self, document: &Document) -> bool {
        self.conditions.iter().all(|(field, expected)| match document.get(field) {
            Some(Value::Array(items)) if !expected.is_array() => items.contains(expected),
            Some(actual) => actual == expected,
            None => expected.is_null(),
        })
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SortOrder {
    Ascending,
    Descending,
}

impl SortOrder {
    /// Accepts the store's native ordering tokens. Anything else is not an
    /// ordering and yields `None`.
    pub fn parse(token: &str) -> Option<Self> {
        match token.trim().to_ascii_lowercase().as_str() {
            "asc" | "ascending" | "1" => Some(SortOrder::Ascending),
            "desc" | "descending" | "-1" => Some(SortOrder::Descending),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct SortSpec {
    pub field: String,
    pub order: SortOrder,
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct FindOptions {
    pub sort: Option<SortSpec>,
    pub skip: Option<u64>,
    pub limit: Option<u64>,
}

/// Coerces a raw query parameter to a number.
///
/// Absent parameters become NaN and blank ones become zero. Plain decimal and
/// exponent notation parse to their value; everything else, including
/// non-finite spellings and hex, is NaN.
pub fn parse_number(raw: Option<&str>) -> f64 {
    let Some(raw) = raw else {
        return f64::NAN;
    };
    let trimmed = raw.trim();
    if trimmed.is_empty() {
        return 0.0;
    }
    match trimmed.parse::<f64>() {
        Ok(value) if value.is_finite() => value,
        _ => f64::NAN,
    }
}

/// Skip/limit derived from `page` and `limit` as `skip = (page - 1) * limit`.
///
/// A NaN operand makes the whole product NaN, which here means "no skip".
/// Limits of zero or NaN mean "no limit"; negative limits use their
/// magnitude. Fractions truncate.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Pagination {
    pub skip: Option<u64>,
    pub limit: Option<u64>,
}

impl Pagination {
    pub fn from_params(page: Option<&str>, limit: Option<&str>) -> Self {
        let page = parse_number(page);
        let limit = parse_number(limit);
        let skip = (page - 1.0) * limit;

        Self {
            skip: to_skip(skip),
            limit: to_limit(limit),
        }
    }
}

fn to_skip(value: f64) -> Option<u64> {
    if !value.is_finite() || value <= 0.0 {
        return None;
    }
    Some(value.trunc() as u64).filter(|n| *n > 0)
}

fn to_limit(value: f64) -> Option<u64> {
    if !value.is_finite() {
        return None;
    }
    Some(value.abs().trunc() as u64).filter(|n| *n > 0)
}

/// Acknowledgment returned by `insert_one`.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct InsertOneResult {
    pub acknowledged: bool,
    pub inserted_id: Value,
}

/// Acknowledgment returned by `delete_one`.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DeleteResult {
    pub acknowledged: bool,
    pub deleted_count: u64,
}
