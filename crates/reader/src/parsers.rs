//! Per-field value decoders.
//!
//! The service returns raw JSON scalars; callers register a decoder per field
//! name to turn them into the values they need. Fields without a decoder pass
//! through untouched.

use std::collections::HashMap;
use std::fmt;
use std::sync::Arc;

use serde_json::{Number, Value};

/// Decodes one raw field value.
pub type FieldParser = Arc<dyn Fn(Value) -> Value + Send + Sync>;

/// Mapping from field name to its [`FieldParser`].
///
/// ```
/// use reader::parsers::{parse_int, ParserRegistry};
/// use serde_json::json;
///
/// let parsers = ParserRegistry::new().with("age", parse_int);
/// assert_eq!(parsers.apply("age", json!("42")), json!(42));
/// assert_eq!(parsers.apply("country", json!("US")), json!("US"));
/// ```
#[derive(Clone, Default)]
pub struct ParserRegistry {
    parsers: HashMap<String, FieldParser>,
}

impl ParserRegistry {
    /// Creates an empty registry; every field passes through.
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers `parser` for `field`, builder style.
    #[must_use]
    pub fn with<F>(mut self, field: impl Into<String>, parser: F) -> Self
    where
        F: Fn(Value) -> Value + Send + Sync + 'static,
    {
        self.insert(field, parser);
        self
    }

    /// Registers `parser` for `field`, replacing any previous one.
    pub fn insert<F>(&mut self, field: impl Into<String>, parser: F)
    where
        F: Fn(Value) -> Value + Send + Sync + 'static,
    {
        self.parsers.insert(field.into(), Arc::new(parser));
    }

    /// Parser registered for `field`, if any.
    pub fn get(&self, field: &str) -> Option<&FieldParser> {
        self.parsers.get(field)
    }

    /// Decodes `value` with the parser for `field`, or returns it unchanged.
    pub fn apply(&self, field: &str, value: Value) -> Value {
        match self.parsers.get(field) {
            Some(parser) => parser(value),
            None => value,
        }
    }

    /// Number of registered parsers.
    pub fn len(&self) -> usize {
        self.parsers.len()
    }

    /// Returns `true` if no parser is registered.
    pub fn is_empty(&self) -> bool {
        self.parsers.is_empty()
    }
}

impl fmt::Debug for ParserRegistry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut fields: Vec<&str> = self.parsers.keys().map(String::as_str).collect();
        fields.sort_unstable();
        f.debug_struct("ParserRegistry").field("fields", &fields).finish()
    }
}

// ---------------------------------------------------------------------------
// Stock parsers
// ---------------------------------------------------------------------------

/// Parses a leading integer, like `parseInt(value, 10)`.
///
/// Strings yield the optionally signed digit prefix after leading whitespace
/// (`" 42px"` → `42`); numbers are truncated toward zero. Anything without a
/// digit prefix becomes `null`.
pub fn parse_int(value: Value) -> Value {
    match value {
        Value::Number(n) if n.is_f64() => n
            .as_f64()
            .filter(|f| f.is_finite() && f.abs() < i64::MAX as f64)
            .map_or(Value::Null, |f| Value::from(f.trunc() as i64)),
        Value::Number(n) => Value::Number(n),
        Value::String(s) => {
            let trimmed = s.trim_start();
            let unsigned = trimmed.trim_start_matches(['+', '-']);
            let sign_len = trimmed.len() - unsigned.len();
            if sign_len > 1 {
                return Value::Null;
            }
            let digits = unsigned.len() - unsigned.trim_start_matches(|c: char| c.is_ascii_digit()).len();
            trimmed[..sign_len + digits]
                .parse::<i64>()
                .map_or(Value::Null, Value::from)
        }
        _ => Value::Null,
    }
}

/// Parses a floating-point number; numbers pass through, unparsable text
/// becomes `null`.
pub fn parse_float(value: Value) -> Value {
    match value {
        Value::Number(n) => Value::Number(n),
        Value::String(s) => s
            .trim()
            .parse::<f64>()
            .ok()
            .and_then(Number::from_f64)
            .map_or(Value::Null, Value::Number),
        _ => Value::Null,
    }
}

/// Parses `"true"` / `"false"` (case-insensitive); booleans pass through.
pub fn parse_bool(value: Value) -> Value {
    match value {
        Value::Bool(b) => Value::Bool(b),
        Value::String(s) if s.eq_ignore_ascii_case("true") => Value::Bool(true),
        Value::String(s) if s.eq_ignore_ascii_case("false") => Value::Bool(false),
        _ => Value::Null,
    }
}

/// Renders scalars as text; `null` stays `null`, containers become JSON text.
pub fn parse_string(value: Value) -> Value {
    match value {
        Value::Null => Value::Null,
        Value::String(s) => Value::String(s),
        Value::Bool(b) => Value::String(b.to_string()),
        Value::Number(n) => Value::String(n.to_string()),
        other => Value::String(other.to_string()),
    }
}
