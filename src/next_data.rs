use chrono::{DateTime, NaiveDate, NaiveDateTime};
use serde_json::Value;

use crate::safe_access::{FieldError, json_type_name, lookup};

const QUERIES_PATH: &[&str] = &["props", "pageProps", "dehydratedState", "queries"];

/// The payload does not look like a hydration payload at all.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum StructureError {
    #[error("required key not found in payload: {path}")]
    KeyNotFound { path: String },

    #[error("{path} is {found}, expected {expected}")]
    UnexpectedShape {
        path: String,
        expected: &'static str,
        found: &'static str,
    },
}

impl From<FieldError> for StructureError {
    fn from(error: FieldError) -> Self {
        match error {
            FieldError::KeyNotFound { path } => StructureError::KeyNotFound { path },
            FieldError::UnexpectedType {
                path,
                expected,
                found,
            } => StructureError::UnexpectedShape {
                path,
                expected,
                found,
            },
            FieldError::Null { path } => StructureError::UnexpectedShape {
                path,
                expected: "a value",
                found: "null",
            },
            FieldError::NotSubscriptable { path, found } => StructureError::UnexpectedShape {
                path,
                expected: "an object",
                found,
            },
            FieldError::Invalid { path, .. } => StructureError::UnexpectedShape {
                path,
                expected: "a valid value",
                found: "an invalid value",
            },
        }
    }
}

/// Which representation of a labelled value to read.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum FieldFormat {
    Id,
    #[default]
    Text,
    EnglishText,
}

impl FieldFormat {
    pub fn key(self) -> &'static str {
        match self {
            FieldFormat::Id => "id",
            FieldFormat::Text => "text",
            FieldFormat::EnglishText => "textEng",
        }
    }
}

/// Accepts `2025-02-09T14:08:15`, fractional seconds, an RFC 3339 offset, or a bare date.
pub fn parse_datetime(text: &str) -> Option<NaiveDateTime> {
    let text = text.trim();
    if let Ok(datetime) = DateTime::parse_from_rfc3339(text) {
        return Some(datetime.naive_local());
    }
    for format in ["%Y-%m-%dT%H:%M:%S%.f", "%Y-%m-%d %H:%M:%S%.f"] {
        if let Ok(datetime) = NaiveDateTime::parse_from_str(text, format) {
            return Some(datetime);
        }
    }
    NaiveDate::parse_from_str(text, "%Y-%m-%d")
        .ok()
        .and_then(|date| date.and_hms_opt(0, 0, 0))
}

/// The Next.js hydration payload embedded in a page.
#[derive(Debug, Clone, PartialEq)]
pub struct NextData {
    data: Value,
}

impl NextData {
    pub fn new(data: Value) -> Self {
        Self { data }
    }

    pub fn from_json_str(text: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str(text).map(Self::new)
    }

    pub fn json(&self) -> &Value {
        &self.data
    }

    pub fn into_json(self) -> Value {
        self.data
    }

    /// Strict top-level access.
    pub fn get(&self, key: &str) -> Result<&Value, StructureError> {
        Ok(lookup(&self.data, &[key])?)
    }

    pub fn queries(&self) -> Result<&[Value], StructureError> {
        let queries = lookup(&self.data, QUERIES_PATH)?;
        queries
            .as_array()
            .map(Vec::as_slice)
            .ok_or_else(|| StructureError::UnexpectedShape {
                path: crate::safe_access::render_path(QUERIES_PATH),
                expected: "an array",
                found: json_type_name(queries),
            })
    }

    /// Every listing object found under the queries' `state.data` maps.
    ///
    /// Queries whose data is absent or a list are skipped, as are entries
    /// that are not objects. The payload path itself must exist.
    pub fn iterate_listings(&self) -> Result<impl Iterator<Item = &Value> + '_, StructureError> {
        let queries = self.queries()?;
        Ok(queries
            .iter()
            .filter_map(|query| match query.get("state").and_then(|state| state.get("data")) {
                Some(Value::Object(data)) => Some(data),
                _ => None,
            })
            .flat_map(|data| data.values())
            .filter_map(Value::as_array)
            .flatten()
            .filter(|listing| listing.is_object()))
    }

    pub fn collect_listings(&self) -> Result<Vec<&Value>, StructureError> {
        Ok(self.iterate_listings()?.collect())
    }
}

impl From<Value> for NextData {
    fn from(data: Value) -> Self {
        Self::new(data)
    }
}
