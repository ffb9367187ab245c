//! Newtype identifiers for the values that address data on the service.
//!
//! A dataset name, a dataset version and an asset path are all strings on the
//! wire, but they occupy different URL positions and must never be swapped.

use serde::{Deserialize, Serialize};

// ---------------------------------------------------------------------------
// Macro for String-wrapped newtypes.
// Generates: struct, new() returning Option<Self>, as_str(), Display.
// ---------------------------------------------------------------------------
macro_rules! string_id {
    (
        $(#[$attr:meta])*
        $name:ident
    ) => {
        $(#[$attr])*
        #[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
        pub struct $name(String);

        impl $name {
            /// Creates a new identifier, returning `None` if the value is empty.
            pub fn new(value: impl Into<String>) -> Option<Self> {
                let v = value.into();
                if v.is_empty() { None } else { Some(Self(v)) }
            }

            /// Returns the identifier as a string slice.
            pub fn as_str(&self) -> &str {
                &self.0
            }
        }

        impl std::fmt::Display for $name {
            fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
                write!(f, "{}", self.0)
            }
        }
    };
}

string_id! {
    /// Name of a dataset hosted by the service, e.g. `"systema_globalis"`.
    ///
    /// Forms the first path segment of every request URL.
    DatasetId
}

string_id! {
    /// Identifier of an immutable dataset snapshot.
    ///
    /// Once the service reports a version, the reader pins it and every later
    /// request addresses `/{dataset}/{version}` explicitly.
    Version
}

// ---------------------------------------------------------------------------

/// Path of an asset relative to the dataset's `assets/` directory.
///
/// Some datasets list asset names with the `assets/` root still attached;
/// [`AssetPath::normalize`] strips one such leading segment so both spellings
/// address the same file.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct AssetPath(String);

impl AssetPath {
    const ROOT: &'static str = "assets/";

    /// Normalizes a caller-supplied asset path.
    pub fn normalize(path: &str) -> Self {
        Self(path.strip_prefix(Self::ROOT).unwrap_or(path).to_owned())
    }

    /// Returns the normalized path.
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl std::fmt::Display for AssetPath {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_identifiers_are_rejected() {
        assert!(DatasetId::new("").is_none());
        assert!(Version::new(String::new()).is_none());
        assert_eq!(Version::new("1.2").unwrap().as_str(), "1.2");
    }

    #[test]
    fn asset_root_is_stripped_once() {
        assert_eq!(AssetPath::normalize("assets/foo/bar.png").as_str(), "foo/bar.png");
        assert_eq!(AssetPath::normalize("foo/bar.png").as_str(), "foo/bar.png");
        assert_eq!(AssetPath::normalize("assets/assets/x.json").as_str(), "assets/x.json");
        assert_eq!(AssetPath::normalize("my-assets/x.json").as_str(), "my-assets/x.json");
    }
}
