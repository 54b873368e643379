//! Fault-tolerant access to semi-structured JSON.
//!
//! Listing payloads omit optional fields freely, so every named accessor
//! goes through [`safe`]: a missing key (or a step into something that is
//! not a container) becomes `Ok(None)`, while data that is present but of
//! the wrong kind is still reported.

use std::fmt;

use chrono::NaiveDateTime;
use serde_json::{Map, Value};

use crate::next_data::parse_datetime;

#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum FieldError {
    #[error("key not found: {path}")]
    KeyNotFound { path: String },

    #[error("{path} is null")]
    Null { path: String },

    #[error("{path} is {found} and cannot be subscripted")]
    NotSubscriptable { path: String, found: &'static str },

    #[error("{path} is {found}, expected {expected}")]
    UnexpectedType {
        path: String,
        expected: &'static str,
        found: &'static str,
    },

    #[error("{path} has an invalid value: {reason}")]
    Invalid { path: String, reason: String },
}

impl FieldError {
    /// Failures that mean "the field is not there" rather than "the data is wrong".
    pub fn is_recoverable(&self) -> bool {
        matches!(
            self,
            FieldError::KeyNotFound { .. }
                | FieldError::Null { .. }
                | FieldError::NotSubscriptable { .. }
        )
    }

    pub fn path(&self) -> &str {
        match self {
            FieldError::KeyNotFound { path }
            | FieldError::Null { path }
            | FieldError::NotSubscriptable { path, .. }
            | FieldError::UnexpectedType { path, .. }
            | FieldError::Invalid { path, .. } => path,
        }
    }
}

pub type FieldResult<T> = Result<Option<T>, FieldError>;

/// Evaluates `access`, replacing any recoverable failure with `fallback`.
pub fn or_fallback<T, F>(fallback: T, access: F) -> Result<T, FieldError>
where
    F: FnOnce() -> Result<T, FieldError>,
{
    match access() {
        Err(error) if error.is_recoverable() => {
            log::trace!("Field access fell back to default: {error}");
            Ok(fallback)
        }
        result => result,
    }
}

pub fn safe<T, F>(access: F) -> FieldResult<T>
where
    F: FnOnce() -> Result<T, FieldError>,
{
    or_fallback(None, || access().map(Some))
}

pub fn render_path(path: &[&str]) -> String {
    let mut rendered = String::from("$");
    for key in path {
        rendered.push('.');
        rendered.push_str(key);
    }
    rendered
}

/// Walks `path` from `root`. Array steps take a decimal index.
pub fn lookup<'a>(root: &'a Value, path: &[&str]) -> Result<&'a Value, FieldError> {
    let mut current = root;
    for (depth, key) in path.iter().enumerate() {
        let not_found = move || FieldError::KeyNotFound {
            path: render_path(&path[..=depth]),
        };
        let not_subscriptable = move || FieldError::NotSubscriptable {
            path: render_path(&path[..depth]),
            found: json_type_name(current),
        };
        current = match current {
            Value::Object(map) => map.get(*key).ok_or_else(not_found)?,
            Value::Array(items) => {
                let index = key.parse::<usize>().map_err(|_| not_subscriptable())?;
                items.get(index).ok_or_else(not_found)?
            }
            _ => return Err(not_subscriptable()),
        };
    }
    Ok(current)
}

pub fn json_type_name(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "a boolean",
        Value::Number(_) => "a number",
        Value::String(_) => "a string",
        Value::Array(_) => "an array",
        Value::Object(_) => "an object",
    }
}

/// Types a JSON leaf can be read as.
pub trait FromField<'a>: Sized {
    const EXPECTED: &'static str;

    fn from_value(value: &'a Value) -> Option<Self>;
}

pub fn convert<'a, T: FromField<'a>>(value: &'a Value, path: &str) -> Result<T, FieldError> {
    if value.is_null() {
        return Err(FieldError::Null {
            path: path.to_string(),
        });
    }
    T::from_value(value).ok_or_else(|| FieldError::UnexpectedType {
        path: path.to_string(),
        expected: T::EXPECTED,
        found: json_type_name(value),
    })
}

impl<'a> FromField<'a> for i64 {
    const EXPECTED: &'static str = "an integer";

    fn from_value(value: &'a Value) -> Option<Self> {
        value.as_i64()
    }
}

impl<'a> FromField<'a> for f64 {
    const EXPECTED: &'static str = "a number";

    fn from_value(value: &'a Value) -> Option<Self> {
        value.as_f64()
    }
}

impl<'a> FromField<'a> for bool {
    const EXPECTED: &'static str = "a boolean";

    fn from_value(value: &'a Value) -> Option<Self> {
        value.as_bool()
    }
}

impl<'a> FromField<'a> for &'a str {
    const EXPECTED: &'static str = "a string";

    fn from_value(value: &'a Value) -> Option<Self> {
        value.as_str()
    }
}

impl<'a> FromField<'a> for &'a Map<String, Value> {
    const EXPECTED: &'static str = "an object";

    fn from_value(value: &'a Value) -> Option<Self> {
        value.as_object()
    }
}

impl<'a> FromField<'a> for &'a [Value] {
    const EXPECTED: &'static str = "an array";

    fn from_value(value: &'a Value) -> Option<Self> {
        value.as_array().map(Vec::as_slice)
    }
}

impl<'a> FromField<'a> for &'a Value {
    const EXPECTED: &'static str = "a value";

    fn from_value(value: &'a Value) -> Option<Self> {
        Some(value)
    }
}

impl<'a, T: FromField<'a>> FromField<'a> for Vec<T> {
    const EXPECTED: &'static str = "an array of uniform values";

    fn from_value(value: &'a Value) -> Option<Self> {
        value.as_array()?.iter().map(T::from_value).collect()
    }
}

/// A labelled value read as either its numeric id or one of its texts.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum FieldValue<'a> {
    Number(i64),
    Text(&'a str),
}

impl FieldValue<'_> {
    pub fn as_i64(&self) -> Option<i64> {
        match self {
            FieldValue::Number(number) => Some(*number),
            FieldValue::Text(_) => None,
        }
    }

    pub fn as_str(&self) -> Option<&str> {
        match self {
            FieldValue::Number(_) => None,
            FieldValue::Text(text) => Some(text),
        }
    }
}

impl fmt::Display for FieldValue<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FieldValue::Number(number) => write!(f, "{number}"),
            FieldValue::Text(text) => f.write_str(text),
        }
    }
}

impl<'a> FromField<'a> for FieldValue<'a> {
    const EXPECTED: &'static str = "a number or a string";

    fn from_value(value: &'a Value) -> Option<Self> {
        match value {
            Value::Number(number) => number.as_i64().map(FieldValue::Number),
            Value::String(text) => Some(FieldValue::Text(text)),
            _ => None,
        }
    }
}

/// Uniform safe access for any view over a JSON mapping.
///
/// Implementors only say where their data lives; every provided method
/// routes through [`safe`].
pub trait SafeAccess<'a> {
    fn root(&self) -> &'a Value;

    fn get<T: FromField<'a>>(&self, path: &[&str]) -> FieldResult<T> {
        let root = self.root();
        safe(|| convert(lookup(root, path)?, &render_path(path)))
    }

    /// Reads `key` from every element of the array at `path`.
    fn get_each<T: FromField<'a>>(&self, path: &[&str], key: &str) -> FieldResult<Vec<T>> {
        let root = self.root();
        safe(|| {
            let rendered = render_path(path);
            let items: &'a [Value] = convert(lookup(root, path)?, &rendered)?;
            items
                .iter()
                .map(|item| {
                    let item_path = format!("{rendered}[].{key}");
                    match item {
                        Value::Object(map) => {
                            let value = map.get(key).ok_or_else(|| FieldError::KeyNotFound {
                                path: item_path.clone(),
                            })?;
                            convert(value, &item_path)
                        }
                        _ => Err(FieldError::NotSubscriptable {
                            path: item_path,
                            found: json_type_name(item),
                        }),
                    }
                })
                .collect()
        })
    }

    fn get_datetime(&self, path: &[&str]) -> FieldResult<NaiveDateTime> {
        let root = self.root();
        safe(|| {
            let rendered = render_path(path);
            let text: &str = convert(lookup(root, path)?, &rendered)?;
            parse_datetime(text).ok_or_else(|| FieldError::Invalid {
                path: rendered,
                reason: format!("'{text}' is not an ISO 8601 date"),
            })
        })
    }
}
