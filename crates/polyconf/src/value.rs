//! Untyped configuration tree
//!
//! [`Value`] is the input of every decode. JSON documents produce string-keyed
//! [`Value::Map`] nodes, YAML documents produce [`Value::DynMap`] nodes keyed by
//! arbitrary values. Everything that expects a mapping accepts both.

use std::fmt;

use indexmap::IndexMap;
use serde::Deserialize;

use crate::error::ParseError;

/// String-keyed mapping, insertion ordered
pub type Mapping = IndexMap<String, Value>;

/// Mapping keyed by arbitrary values (the shape YAML parsers produce)
pub type DynMapping = Vec<(Value, Value)>;

/// Generic configuration node
#[derive(Debug, Clone, PartialEq, Default)]
pub enum Value {
    /// Explicit null or missing document
    #[default]
    Null,

    /// Boolean scalar
    Bool(bool),

    /// Integer scalar
    Integer(i64),

    /// Integer scalar above `i64::MAX`
    Unsigned(u64),

    /// Floating point scalar
    Float(f64),

    /// String scalar
    String(String),

    /// Ordered sequence
    Sequence(Vec<Value>),

    /// String-keyed mapping
    Map(Mapping),

    /// Mapping with dynamically typed keys
    DynMap(DynMapping),
}

/// Shape of a [`Value`], used as the source type seen by decode hooks
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ValueKind {
    /// [`Value::Null`]
    Null,
    /// [`Value::Bool`]
    Bool,
    /// [`Value::Integer`] and [`Value::Unsigned`]
    Integer,
    /// [`Value::Float`]
    Float,
    /// [`Value::String`]
    String,
    /// [`Value::Sequence`]
    Sequence,
    /// [`Value::Map`]
    Map,
    /// [`Value::DynMap`]
    DynMap,
}

impl ValueKind {
    /// Human readable name used in error messages
    #[inline]
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Null => "null",
            Self::Bool => "bool",
            Self::Integer => "integer",
            Self::Float => "float",
            Self::String => "string",
            Self::Sequence => "sequence",
            Self::Map => "map",
            Self::DynMap => "dynamic map",
        }
    }

    /// Whether this kind is one of the two mapping representations
    #[inline]
    #[must_use]
    pub fn is_mapping(self) -> bool {
        matches!(self, Self::Map | Self::DynMap)
    }
}

impl fmt::Display for ValueKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Failure converting a node into a string-keyed [`Mapping`]
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum IntoMappingError {
    /// The node is not a mapping at all; it is handed back untouched
    #[error("expected a mapping, got {}", .0.kind())]
    NotAMap(Value),

    /// A dynamic mapping holds a key that is not a string
    #[error("mapping key must be a string, got {0}")]
    NonStringKey(ValueKind),
}

impl Value {
    /// Shape of this node
    #[inline]
    #[must_use]
    pub fn kind(&self) -> ValueKind {
        match self {
            Self::Null => ValueKind::Null,
            Self::Bool(_) => ValueKind::Bool,
            Self::Integer(_) | Self::Unsigned(_) => ValueKind::Integer,
            Self::Float(_) => ValueKind::Float,
            Self::String(_) => ValueKind::String,
            Self::Sequence(_) => ValueKind::Sequence,
            Self::Map(_) => ValueKind::Map,
            Self::DynMap(_) => ValueKind::DynMap,
        }
    }

    /// String contents, if this is a string scalar
    #[inline]
    #[must_use]
    pub fn as_str(&self) -> Option<&str> {
        match self {
            Self::String(s) => Some(s),
            _ => None,
        }
    }

    /// Check for null
    #[inline]
    #[must_use]
    pub fn is_null(&self) -> bool {
        matches!(self, Self::Null)
    }

    /// Look up a string key in either mapping representation
    #[must_use]
    pub fn get(&self, key: &str) -> Option<&Value> {
        match self {
            Self::Map(map) => map.get(key),
            Self::DynMap(entries) => entries
                .iter()
                .find(|(k, _)| k.as_str() == Some(key))
                .map(|(_, v)| v),
            _ => None,
        }
    }

    /// Get value at a dot separated path of mapping keys
    #[must_use]
    pub fn get_path(&self, path: &str) -> Option<&Value> {
        let mut current = self;
        for segment in path.split('.') {
            current = current.get(segment)?;
        }
        Some(current)
    }

    /// Normalize either mapping representation into a string-keyed [`Mapping`]
    ///
    /// # Errors
    /// [`IntoMappingError::NotAMap`] hands non-mapping nodes back unchanged;
    /// [`IntoMappingError::NonStringKey`] reports the first non-string key.
    pub fn into_mapping(self) -> Result<Mapping, IntoMappingError> {
        match self {
            Self::Map(map) => Ok(map),
            Self::DynMap(entries) => {
                let mut map = Mapping::with_capacity(entries.len());
                for (key, value) in entries {
                    match key {
                        Self::String(key) => {
                            map.insert(key, value);
                        }
                        other => return Err(IntoMappingError::NonStringKey(other.kind())),
                    }
                }
                Ok(map)
            }
            other => Err(IntoMappingError::NotAMap(other)),
        }
    }

    /// Parse a JSON document
    ///
    /// # Errors
    /// Returns error if JSON is invalid
    pub fn from_json_str(json: &str) -> Result<Self, ParseError> {
        let value: serde_json::Value = serde_json::from_str(json)?;
        Ok(value.into())
    }

    /// Parse a single YAML document
    ///
    /// # Errors
    /// Returns error if YAML is invalid
    pub fn from_yaml_str(yaml: &str) -> Result<Self, ParseError> {
        let value: serde_yaml::Value = serde_yaml::from_str(yaml)?;
        Ok(value.into())
    }

    /// Parse every document of a multi-document YAML stream
    ///
    /// # Errors
    /// Returns error on the first invalid document
    pub fn from_yaml_documents(yaml: &str) -> Result<Vec<Self>, ParseError> {
        serde_yaml::Deserializer::from_str(yaml)
            .map(|doc| {
                serde_yaml::Value::deserialize(doc)
                    .map(Self::from)
                    .map_err(ParseError::from)
            })
            .collect()
    }
}

impl From<serde_json::Value> for Value {
    fn from(value: serde_json::Value) -> Self {
        use serde_json::Value as Json;

        match value {
            Json::Null => Self::Null,
            Json::Bool(b) => Self::Bool(b),
            Json::Number(n) => number(n.as_i64(), n.as_u64(), n.as_f64()),
            Json::String(s) => Self::String(s),
            Json::Array(items) => Self::Sequence(items.into_iter().map(Self::from).collect()),
            Json::Object(object) => {
                Self::Map(object.into_iter().map(|(k, v)| (k, Self::from(v))).collect())
            }
        }
    }
}

impl From<serde_yaml::Value> for Value {
    fn from(value: serde_yaml::Value) -> Self {
        use serde_yaml::Value as Yaml;

        match value {
            Yaml::Null => Self::Null,
            Yaml::Bool(b) => Self::Bool(b),
            Yaml::Number(n) => number(n.as_i64(), n.as_u64(), n.as_f64()),
            Yaml::String(s) => Self::String(s),
            Yaml::Sequence(items) => Self::Sequence(items.into_iter().map(Self::from).collect()),
            Yaml::Mapping(mapping) => Self::DynMap(
                mapping
                    .into_iter()
                    .map(|(k, v)| (Self::from(k), Self::from(v)))
                    .collect(),
            ),
            Yaml::Tagged(tagged) => Self::from(tagged.value),
        }
    }
}

fn number(int: Option<i64>, unsigned: Option<u64>, float: Option<f64>) -> Value {
    match (int, unsigned, float) {
        (Some(i), _, _) => Value::Integer(i),
        (None, Some(u), _) => Value::Unsigned(u),
        (None, None, Some(f)) => Value::Float(f),
        (None, None, None) => Value::Null,
    }
}

impl From<bool> for Value {
    fn from(b: bool) -> Self {
        Self::Bool(b)
    }
}

impl From<i64> for Value {
    fn from(i: i64) -> Self {
        Self::Integer(i)
    }
}

impl From<u64> for Value {
    fn from(u: u64) -> Self {
        i64::try_from(u).map_or(Self::Unsigned(u), Self::Integer)
    }
}

impl From<f64> for Value {
    fn from(f: f64) -> Self {
        Self::Float(f)
    }
}

impl From<&str> for Value {
    fn from(s: &str) -> Self {
        Self::String(s.to_string())
    }
}

impl From<String> for Value {
    fn from(s: String) -> Self {
        Self::String(s)
    }
}

impl From<Vec<Value>> for Value {
    fn from(items: Vec<Value>) -> Self {
        Self::Sequence(items)
    }
}

impl From<Mapping> for Value {
    fn from(map: Mapping) -> Self {
        Self::Map(map)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn json_objects_are_string_keyed() {
        let value = Value::from_json_str(r#"{"a": 1, "b": [true, null]}"#).unwrap();
        assert_eq!(value.kind(), ValueKind::Map);
        assert_eq!(value.get("a"), Some(&Value::Integer(1)));
        assert_eq!(
            value.get("b"),
            Some(&Value::Sequence(vec![Value::Bool(true), Value::Null]))
        );
    }

    #[test]
    fn yaml_mappings_are_dynamic() {
        let value = Value::from_yaml_str("server:\n  host: localhost\n  port: 8080\n").unwrap();
        assert_eq!(value.kind(), ValueKind::DynMap);
        assert_eq!(
            value.get_path("server.host"),
            Some(&Value::String("localhost".to_string()))
        );
        assert_eq!(value.get_path("server.port"), Some(&Value::Integer(8080)));
        assert_eq!(value.get_path("server.missing"), None);
    }

    #[test]
    fn yaml_tags_are_stripped() {
        let value = Value::from_yaml_str("!point\nx: 1\ny: 2\n").unwrap();
        assert_eq!(value.kind(), ValueKind::DynMap);
        assert_eq!(value.get("y"), Some(&Value::Integer(2)));
    }

    #[test]
    fn large_unsigned_stays_exact() {
        let json = Value::from_json_str(r#"{"max": 18446744073709551615}"#).unwrap();
        assert_eq!(json.get("max"), Some(&Value::Unsigned(u64::MAX)));
        assert_eq!(json.get("max").map(Value::kind), Some(ValueKind::Integer));

        let yaml = Value::from_yaml_str("big: 9223372036854775809\n").unwrap();
        assert_eq!(yaml.get("big"), Some(&Value::Unsigned(9_223_372_036_854_775_809)));

        assert_eq!(Value::from(7u64), Value::Integer(7));
    }

    #[test]
    fn json_objects_keep_key_order() {
        let value = Value::from_json_str(r#"{"b": 1, "a": 2, "c": 3}"#).unwrap();
        let map = value.into_mapping().unwrap();
        assert_eq!(map.keys().collect::<Vec<_>>(), vec!["b", "a", "c"]);
    }

    #[test]
    fn into_mapping_normalizes_dynamic_keys() {
        let value = Value::DynMap(vec![
            (Value::from("x"), Value::Integer(1)),
            (Value::from("y"), Value::Integer(2)),
        ]);
        let map = value.into_mapping().unwrap();
        assert_eq!(map.keys().collect::<Vec<_>>(), vec!["x", "y"]);
    }

    #[test]
    fn into_mapping_rejects_non_string_keys() {
        let value = Value::DynMap(vec![(Value::Integer(1), Value::Null)]);
        assert_eq!(
            value.into_mapping(),
            Err(IntoMappingError::NonStringKey(ValueKind::Integer))
        );
    }

    #[test]
    fn into_mapping_returns_scalars() {
        let err = Value::from("text").into_mapping().unwrap_err();
        assert_eq!(err, IntoMappingError::NotAMap(Value::from("text")));
        assert_eq!(err.to_string(), "expected a mapping, got string");
    }

    #[test]
    fn yaml_multi_document() {
        let docs = Value::from_yaml_documents("---\nname: doc1\n---\nname: doc2\n").unwrap();
        assert_eq!(docs.len(), 2);
        assert_eq!(docs[1].get("name"), Some(&Value::from("doc2")));
    }

    #[test]
    fn invalid_json_is_parse_error() {
        assert!(matches!(
            Value::from_json_str("{nope"),
            Err(ParseError::Json(_))
        ));
    }
}
