//! URL Object Notation (URLON) codec.
//!
//! Encodes arbitrary JSON values (nested objects, arrays and scalars) into a
//! compact string that can be placed directly in a URL query, and decodes such
//! strings back into values. The DDF service decodes its query parameter with
//! the same scheme, so [`stringify`] and [`parse`] must stay byte-compatible
//! with it.
//!
//! ## Grammar
//!
//! | Value | Encoding | Example |
//! |-------|----------|---------|
//! | string | `=` + text | `=usa` |
//! | number / bool / null | `:` + literal | `:42`, `:true`, `:null` |
//! | array | `@` + items joined by `&` + `;` | `@=geo&=time;` |
//! | object | `$` + `key` + value pairs joined by `&` + `;` | `$key@=geo;;` |
//!
//! Characters with a structural meaning (`= : @ $ / & ;`) are escaped with a
//! leading `/` inside keys and strings. Trailing `;` terminators are dropped
//! from the final output.
//!
//! ## Module Layout
//!
//! | Module | Contents |
//! |--------|----------|
//! | [`encode`] | [`stringify`] |
//! | [`decode`] | [`parse`] |
//! | [`uri`] | `encodeURI` / `decodeURI` compatible percent-coding |
//! | [`errors`] | [`UrlonError`] |

pub mod decode;
pub mod encode;
pub mod errors;
pub mod uri;

pub use decode::parse;
pub use encode::stringify;
pub use errors::UrlonError;

/// Characters that carry structural meaning and must be `/`-escaped in text.
pub(crate) const STRUCTURAL: [char; 7] = ['=', ':', '@', '$', '/', '&', ';'];
