//! Subject alternative names as reported by the detail endpoint.
//!
//! Backends disagree on the shape of this field, so it is classified once,
//! while decoding, into one of a closed set of variants.

use serde::{Deserialize, Deserializer};
use serde_json::Value;

/// The alternative-names field of a detail response, as it arrived.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AltNamesInput {
    /// `["a.example.com", "b.example.com"]`
    PlainStrings(Vec<String>),
    /// `[{"type": "dns", "value": "a.example.com"}]`
    TypedEntries(Vec<TypedAltName>),
    /// `"a.example.com, b.example.com"`
    CommaString(String),
    /// Any other JSON value.
    Unrecognized,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TypedAltName {
    pub kind: Option<String>,
    pub value: Option<String>,
}

impl AltNamesInput {
    fn from_value(value: Value) -> Self {
        match value {
            Value::String(s) => AltNamesInput::CommaString(s),
            Value::Array(items) => {
                if items.iter().all(Value::is_string) {
                    AltNamesInput::PlainStrings(
                        items.into_iter().filter_map(|v| v.as_str().map(String::from)).collect(),
                    )
                } else if items.iter().all(Value::is_object) {
                    AltNamesInput::TypedEntries(
                        items
                            .iter()
                            .map(|entry| TypedAltName {
                                kind: entry.get("type").and_then(Value::as_str).map(String::from),
                                value: entry.get("value").and_then(Value::as_str).map(String::from),
                            })
                            .collect(),
                    )
                } else {
                    AltNamesInput::Unrecognized
                }
            }
            _ => AltNamesInput::Unrecognized,
        }
    }

    /// Flatten to a list of names.
    pub fn names(&self) -> Vec<String> {
        match self {
            AltNamesInput::PlainStrings(names) => names.clone(),
            AltNamesInput::TypedEntries(entries) => {
                entries.iter().filter_map(|e| e.value.clone()).collect()
            }
            AltNamesInput::CommaString(s) => s
                .split(',')
                .map(str::trim)
                .filter(|name| !name.is_empty())
                .map(String::from)
                .collect(),
            AltNamesInput::Unrecognized => Vec::new(),
        }
    }
}

impl<'de> Deserialize<'de> for AltNamesInput {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        Value::deserialize(deserializer).map(AltNamesInput::from_value)
    }
}

/// Parse the alt-names field of a detail response.
///
/// A missing, empty or unparseable field yields an empty list, which callers
/// store as `Some(vec![])` ("the backend has none") rather than `None`
/// ("never fetched").
pub fn parse_alt_names(input: Option<&AltNamesInput>) -> Vec<String> {
    input.map(AltNamesInput::names).unwrap_or_default()
}
