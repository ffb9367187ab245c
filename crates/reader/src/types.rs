//! Wire and result value types.
//!
//! [`TabularResult`] is the body the service returns for a record query;
//! [`Record`] is one reshaped row handed back to the caller. [`Asset`] is the
//! decoded body of an asset request.

use bytes::Bytes;
use serde::{Deserialize, Deserializer, Serialize};
use serde_json::{Map, Value};

// ---------------------------------------------------------------------------
// Wire format
// ---------------------------------------------------------------------------

/// Body of a successful record query.
///
/// `header` names the columns; each entry of `rows` holds one value per
/// column in the same order. Absent or `null` arrays decode as empty.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct TabularResult {
    /// Authoritative dataset version reported by the service, if any.
    #[serde(
        default,
        deserialize_with = "version_text",
        skip_serializing_if = "Option::is_none"
    )]
    pub version: Option<String>,

    /// Field names, in column order.
    #[serde(default, deserialize_with = "null_as_empty")]
    pub header: Vec<String>,

    /// Raw row values, positionally aligned with `header`.
    #[serde(default, deserialize_with = "null_as_empty")]
    pub rows: Vec<Vec<Value>>,
}

fn null_as_empty<'de, D, T>(deserializer: D) -> Result<Vec<T>, D::Error>
where
    D: Deserializer<'de>,
    T: Deserialize<'de>,
{
    Ok(Option::<Vec<T>>::deserialize(deserializer)?.unwrap_or_default())
}

/// Versions are strings on the wire, but some deployments emit bare numbers.
fn version_text<'de, D>(deserializer: D) -> Result<Option<String>, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(match Option::<Value>::deserialize(deserializer)? {
        Some(Value::String(s)) => Some(s),
        Some(Value::Number(n)) => Some(n.to_string()),
        _ => None,
    })
}

// ---------------------------------------------------------------------------
// Records
// ---------------------------------------------------------------------------

/// One row of a query result, keyed by field name.
///
/// Fields keep the order of the response header.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Record(Map<String, Value>);

impl Record {
    /// Creates an empty record.
    pub fn new() -> Self {
        Self(Map::new())
    }

    /// Sets `field` to `value`, returning the previous value if any.
    pub fn insert(&mut self, field: impl Into<String>, value: Value) -> Option<Value> {
        self.0.insert(field.into(), value)
    }

    /// Value of `field`, if present.
    pub fn get(&self, field: &str) -> Option<&Value> {
        self.0.get(field)
    }

    /// Field names in header order.
    pub fn fields(&self) -> impl Iterator<Item = &str> {
        self.0.keys().map(String::as_str)
    }

    /// `(field, value)` pairs in header order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &Value)> {
        self.0.iter().map(|(k, v)| (k.as_str(), v))
    }

    /// Number of fields.
    pub fn len(&self) -> usize {
        self.0.len()
    }

    /// Returns `true` if the record has no fields.
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Consumes the record, returning the underlying JSON object.
    pub fn into_map(self) -> Map<String, Value> {
        self.0
    }
}

impl From<Record> for Value {
    fn from(record: Record) -> Self {
        Value::Object(record.0)
    }
}

impl FromIterator<(String, Value)> for Record {
    fn from_iter<I: IntoIterator<Item = (String, Value)>>(iter: I) -> Self {
        Self(iter.into_iter().collect())
    }
}

// ---------------------------------------------------------------------------
// Assets
// ---------------------------------------------------------------------------

/// Decoded body of an asset request.
#[derive(Debug, Clone, PartialEq)]
pub enum Asset {
    /// The service declared `application/json`; the body was parsed.
    Json(Value),
    /// Any other content (images, shapes, text), returned unparsed.
    Binary {
        /// Declared `Content-Type`, if the service sent one.
        content_type: Option<String>,
        /// Raw body.
        bytes: Bytes,
    },
}

impl Asset {
    /// The parsed JSON document, for JSON assets.
    pub fn as_json(&self) -> Option<&Value> {
        match self {
            Self::Json(value) => Some(value),
            Self::Binary { .. } => None,
        }
    }

    /// The raw payload, for non-JSON assets.
    pub fn as_bytes(&self) -> Option<&Bytes> {
        match self {
            Self::Json(_) => None,
            Self::Binary { bytes, .. } => Some(bytes),
        }
    }
}
