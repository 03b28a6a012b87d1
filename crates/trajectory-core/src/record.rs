//! Raw API records and per-field coercion.
//!
//! The remote API is not consistent about key casing or value types: ids may
//! arrive as numbers or numeric strings, timestamps as RFC 3339 strings, and
//! keys as `camelCase` or `snake_case`. [`Attributes`] normalizes a record
//! once and then hands out typed values field by field.

use crate::error::{DomainError, EntityKind, Result};
use chrono::{DateTime, NaiveDateTime, Utc};
use serde_json::{Number, Value};
use std::collections::HashMap;

/// Untyped JSON object as delivered by a remote source
pub type RawRecord = serde_json::Map<String, Value>;

/// Naive datetime layouts accepted after RFC 3339 fails (interpreted as UTC)
const NAIVE_TIMESTAMP_FORMATS: &[&str] = &["%Y-%m-%d %H:%M:%S%.f", "%Y-%m-%dT%H:%M:%S%.f"];

/// Normalize a record key to `snake_case`.
///
/// `estimatedVelocity`, `Estimated-Velocity` and `estimated_velocity` all
/// become `estimated_velocity`.
pub fn normalize_key(key: &str) -> String {
    let chars: Vec<char> = key.trim().chars().collect();
    let mut out = String::with_capacity(chars.len() + 4);

    for (i, &c) in chars.iter().enumerate() {
        if matches!(c, '-' | ' ' | '.') {
            if !out.ends_with('_') {
                out.push('_');
            }
            continue;
        }

        if c.is_uppercase() {
            let prev = i.checked_sub(1).map(|p| chars[p]);
            let next = chars.get(i + 1).copied();
            let boundary = match prev {
                Some(p) if p.is_lowercase() || p.is_ascii_digit() => true,
                Some(p) if p.is_uppercase() => next.is_some_and(|n| n.is_lowercase()),
                _ => false,
            };
            if boundary && !out.ends_with('_') {
                out.push('_');
            }
            out.extend(c.to_lowercase());
        } else {
            out.push(c);
        }
    }

    out
}

/// A raw record with normalized keys and nulls removed.
///
/// When several keys normalize to the same name, a key already written in
/// `snake_case` wins. Between converted keys the later one in record order
/// wins.
pub(crate) struct Attributes {
    entity: EntityKind,
    fields: HashMap<String, Value>,
}

impl Attributes {
    pub(crate) fn new(entity: EntityKind, raw: &RawRecord) -> Self {
        let (exact, converted): (Vec<_>, Vec<_>) = raw
            .iter()
            .filter(|(_, v)| !v.is_null())
            .map(|(k, v)| (k.as_str(), normalize_key(k), v))
            .partition(|(original, normalized, _)| *original == normalized.as_str());

        let fields = converted
            .into_iter()
            .chain(exact)
            .map(|(_, key, value)| (key, value.clone()))
            .collect();

        Self { entity, fields }
    }

    fn invalid(&self, field: &'static str, reason: impl Into<String>) -> DomainError {
        DomainError::InvalidField {
            entity: self.entity,
            field,
            reason: reason.into(),
        }
    }

    /// Integer that must be present
    pub(crate) fn require_i64(&self, field: &'static str) -> Result<i64> {
        self.i64(field)?.ok_or(DomainError::MissingRequiredField {
            entity: self.entity,
            field,
        })
    }

    pub(crate) fn i64(&self, field: &'static str) -> Result<Option<i64>> {
        match self.fields.get(field) {
            None => Ok(None),
            Some(value) => coerce_i64(value)
                .map(Some)
                .map_err(|reason| self.invalid(field, reason)),
        }
    }

    /// Boolean, `false` when absent
    pub(crate) fn bool(&self, field: &'static str) -> Result<bool> {
        let Some(value) = self.fields.get(field) else {
            return Ok(false);
        };

        match value {
            Value::Bool(b) => Ok(*b),
            Value::Number(n) => match n.as_i64() {
                Some(0) => Ok(false),
                Some(1) => Ok(true),
                _ => Err(self.invalid(field, format!("expected boolean, got {}", n))),
            },
            Value::String(s) => match s.trim().to_ascii_lowercase().as_str() {
                "true" | "1" => Ok(true),
                "false" | "0" => Ok(false),
                other => Err(self.invalid(field, format!("expected boolean, got '{}'", other))),
            },
            other => Err(self.invalid(field, format!("expected boolean, got {}", type_name(other)))),
        }
    }

    pub(crate) fn string(&self, field: &'static str) -> Result<Option<String>> {
        match self.fields.get(field) {
            None => Ok(None),
            Some(value) => coerce_string(value)
                .map(Some)
                .map_err(|reason| self.invalid(field, reason)),
        }
    }

    pub(crate) fn timestamp(&self, field: &'static str) -> Result<Option<DateTime<Utc>>> {
        let Some(value) = self.fields.get(field) else {
            return Ok(None);
        };

        let Value::String(s) = value else {
            return Err(self.invalid(
                field,
                format!("expected timestamp string, got {}", type_name(value)),
            ));
        };

        parse_timestamp(s)
            .map(Some)
            .ok_or_else(|| self.invalid(field, format!("unparseable timestamp '{}'", s)))
    }

    /// Integer sequence, empty when absent
    pub(crate) fn i64_list(&self, field: &'static str) -> Result<Vec<i64>> {
        self.list(field, coerce_i64)
    }

    /// String sequence, empty when absent
    pub(crate) fn string_list(&self, field: &'static str) -> Result<Vec<String>> {
        self.list(field, coerce_string)
    }

    fn list<T>(
        &self,
        field: &'static str,
        coerce: fn(&Value) -> std::result::Result<T, String>,
    ) -> Result<Vec<T>> {
        let Some(value) = self.fields.get(field) else {
            return Ok(Vec::new());
        };

        let Value::Array(items) = value else {
            return Err(self.invalid(field, format!("expected array, got {}", type_name(value))));
        };

        items
            .iter()
            .enumerate()
            .map(|(i, item)| {
                coerce(item).map_err(|reason| self.invalid(field, format!("element {}: {}", i, reason)))
            })
            .collect()
    }
}

fn coerce_i64(value: &Value) -> std::result::Result<i64, String> {
    match value {
        Value::Number(n) => number_to_i64(n),
        Value::String(s) => s
            .trim()
            .parse::<i64>()
            .map_err(|_| format!("expected integer, got '{}'", s)),
        other => Err(format!("expected integer, got {}", type_name(other))),
    }
}

fn number_to_i64(n: &Number) -> std::result::Result<i64, String> {
    if let Some(i) = n.as_i64() {
        return Ok(i);
    }

    match n.as_f64() {
        // i64::MAX as f64 rounds up to 2^63, hence the strict upper bound
        Some(f) if f.fract() == 0.0 && f >= i64::MIN as f64 && f < i64::MAX as f64 => Ok(f as i64),
        _ => Err(format!("expected integer, got {}", n)),
    }
}

fn coerce_string(value: &Value) -> std::result::Result<String, String> {
    match value {
        Value::String(s) => Ok(s.clone()),
        Value::Number(n) => Ok(n.to_string()),
        Value::Bool(b) => Ok(b.to_string()),
        other => Err(format!("expected string, got {}", type_name(other))),
    }
}

fn parse_timestamp(s: &str) -> Option<DateTime<Utc>> {
    let s = s.trim();

    if let Ok(dt) = DateTime::parse_from_rfc3339(s) {
        return Some(dt.with_timezone(&Utc));
    }

    NAIVE_TIMESTAMP_FORMATS
        .iter()
        .find_map(|fmt| NaiveDateTime::parse_from_str(s, fmt).ok())
        .map(|naive| naive.and_utc())
}

fn type_name(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "boolean",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}

/// Unwrap a `json!` object literal into a record.
#[cfg(test)]
pub(crate) fn test_record(value: Value) -> RawRecord {
    match value {
        Value::Object(map) => map,
        _ => panic!("record must be a JSON object"),
    }
}
