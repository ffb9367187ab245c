//! URLON decoder.

use serde_json::{Map, Number, Value};

use crate::uri::decode_uri;
use crate::UrlonError;

/// Decodes a URLON string produced by [`crate::stringify`] (or by the
/// service's own encoder) back into a JSON value.
///
/// Numeric literals that do not parse decode to `null`, matching the
/// service's behaviour.
///
/// # Errors
///
/// Returns [`UrlonError`] when the input is empty, contains an unknown type
/// marker, or carries malformed percent escapes.
pub fn parse(input: &str) -> Result<Value, UrlonError> {
    let decoded = decode_uri(input)?;
    let mut parser = Parser {
        chars: decoded.chars().collect(),
        pos: 0,
    };
    parser.value()
}

struct Parser {
    chars: Vec<char>,
    pos: usize,
}

impl Parser {
    fn at_end_of_container(&self) -> bool {
        self.pos >= self.chars.len() || self.chars[self.pos] == ';'
    }

    /// Reads an escaped text token up to the next unescaped structural marker.
    fn token(&mut self) -> String {
        let mut token = String::new();
        while self.pos < self.chars.len() {
            let c = self.chars[self.pos];
            if c == '/' {
                self.pos += 1;
                match self.chars.get(self.pos) {
                    Some(&escaped) => token.push(escaped),
                    // A lone trailing `/` escaped a `;` that was trimmed away.
                    None => {
                        token.push(';');
                        break;
                    }
                }
            } else if matches!(c, '=' | ':' | '@' | '$' | '&' | ';') {
                break;
            } else {
                token.push(c);
            }
            self.pos += 1;
        }
        token
    }

    fn value(&mut self) -> Result<Value, UrlonError> {
        let Some(&marker) = self.chars.get(self.pos) else {
            return Err(UrlonError::UnexpectedEnd { position: self.pos });
        };
        self.pos += 1;
        match marker {
            '=' => Ok(Value::String(self.token())),
            ':' => Ok(literal(&self.token())),
            '@' => {
                let mut items = Vec::new();
                if !self.at_end_of_container() {
                    loop {
                        items.push(self.value()?);
                        if self.at_end_of_container() {
                            break;
                        }
                        self.separator()?;
                    }
                }
                self.pos += 1;
                Ok(Value::Array(items))
            }
            '$' => {
                let mut map = Map::new();
                if !self.at_end_of_container() {
                    loop {
                        let key = self.token();
                        let item = self.value()?;
                        map.insert(key, item);
                        if self.at_end_of_container() {
                            break;
                        }
                        self.separator()?;
                    }
                }
                self.pos += 1;
                Ok(Value::Object(map))
            }
            other => Err(UrlonError::UnexpectedChar {
                found: other,
                position: self.pos - 1,
            }),
        }
    }

    fn separator(&mut self) -> Result<(), UrlonError> {
        match self.chars[self.pos] {
            '&' => {
                self.pos += 1;
                Ok(())
            }
            other => Err(UrlonError::UnexpectedChar {
                found: other,
                position: self.pos,
            }),
        }
    }
}

/// Decodes the text after a `:` marker.
fn literal(text: &str) -> Value {
    match text {
        "true" => Value::Bool(true),
        "false" => Value::Bool(false),
        _ => {
            let text = text.trim();
            if let Ok(i) = text.parse::<i64>() {
                return Value::from(i);
            }
            if let Ok(u) = text.parse::<u64>() {
                return Value::from(u);
            }
            float_literal(text)
        }
    }
}

fn float_literal(text: &str) -> Value {
    match text.parse::<f64>() {
        Ok(f) if f.is_finite() && f.fract() == 0.0 && f.abs() < i64::MAX as f64 => {
            Value::from(f as i64)
        }
        Ok(f) => Number::from_f64(f).map_or(Value::Null, Value::Number),
        Err(_) => Value::Null,
    }
}
