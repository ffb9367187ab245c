//! URLON encoder.

use serde_json::{Number, Value};

use crate::uri::encode_uri;
use crate::STRUCTURAL;

/// Encodes `value` as a URLON string suitable for a URL query.
///
/// Never fails: every JSON value has an encoding.
///
/// ```
/// let query = serde_json::json!({ "select": { "key": ["geo", "time"] } });
/// assert_eq!(urlon::stringify(&query), "$select$key@=geo&=time");
/// ```
pub fn stringify(value: &Value) -> String {
    let mut out = String::new();
    write_value(value, &mut out);
    let trimmed = out.trim_end_matches(';').len();
    out.truncate(trimmed);
    out
}

fn write_value(value: &Value, out: &mut String) {
    match value {
        Value::Null => out.push_str(":null"),
        Value::Bool(b) => {
            out.push(':');
            out.push_str(if *b { "true" } else { "false" });
        }
        Value::Number(n) => {
            out.push(':');
            out.push_str(&format_number(n));
        }
        Value::String(s) => {
            out.push('=');
            out.push_str(&escape_text(s));
        }
        Value::Array(items) => {
            out.push('@');
            for (i, item) in items.iter().enumerate() {
                if i > 0 {
                    out.push('&');
                }
                write_value(item, out);
            }
            out.push(';');
        }
        Value::Object(map) => {
            out.push('$');
            for (i, (key, item)) in map.iter().enumerate() {
                if i > 0 {
                    out.push('&');
                }
                out.push_str(&escape_text(key));
                write_value(item, out);
            }
            out.push(';');
        }
    }
}

/// Numbers print the way JavaScript prints them: integral floats lose the
/// fractional part (`2.0` becomes `2`).
fn format_number(n: &Number) -> String {
    if n.is_f64() {
        match n.as_f64() {
            Some(f) => format!("{f}"),
            None => n.to_string(),
        }
    } else {
        n.to_string()
    }
}

fn escape_text(text: &str) -> String {
    let mut escaped = String::with_capacity(text.len());
    for c in text.chars() {
        if STRUCTURAL.contains(&c) {
            escaped.push('/');
        }
        escaped.push(c);
    }
    encode_uri(&escaped)
}
