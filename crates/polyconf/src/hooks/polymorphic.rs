//! Discriminator-driven construction of registered interfaces

use super::{DecodeHook, Hooked};
use crate::decode::{Decoder, Target};
use crate::error::DecodeError;
use crate::value::{IntoMappingError, Mapping, Value, ValueKind};

/// Builds trait objects for registered interfaces
///
/// For a target registered with
/// [`Registry::register_interface`](crate::Registry::register_interface):
/// 1. reads the discriminator from the mapping,
/// 2. instantiates the matching factory,
/// 3. decodes the remaining keys into the fresh instance with the same
///    decoder, unused keys rejected.
///
/// Unregistered targets and non-mapping values pass through untouched.
#[derive(Debug, Clone, Copy, Default)]
pub struct PolymorphicHook;

impl DecodeHook for PolymorphicHook {
    fn apply(
        &self,
        target: &Target,
        value: Value,
        de: &Decoder<'_>,
    ) -> Result<Hooked, DecodeError> {
        let Some(descriptor) = de.registry().get(target.key()) else {
            return Ok(Hooked::Value(value));
        };
        let key = descriptor.discriminator_key();
        let interface = descriptor.interface().name();

        let (kind, payload) = match extract_discriminator(key, value) {
            Ok(Extracted::NotAMap(value)) => return Ok(Hooked::Value(value)),
            Ok(Extracted::Found { kind, payload }) => (kind, payload),
            Err(ExtractError::NonStringKey { found }) => {
                return Err(DecodeError::NonStringKey {
                    path: de.path().clone(),
                    found,
                })
            }
            Err(reason) => {
                return Err(DecodeError::MissingDiscriminator {
                    path: de.path().clone(),
                    key: key.to_string(),
                    interface,
                    reason,
                })
            }
        };

        if kind.is_empty() {
            return Err(DecodeError::EmptyDiscriminator {
                path: de.path().clone(),
                key: key.to_string(),
                interface,
            });
        }

        let Some(mut instance) = descriptor.instantiate(&kind) else {
            return Err(DecodeError::UnknownKind {
                path: de.path().clone(),
                kind,
                interface,
            });
        };

        tracing::trace!(path = %de.path(), interface, kind = %kind, "resolved polymorphic value");
        descriptor.populate(instance.as_mut(), payload, &de.strict())?;
        Ok(Hooked::Built(instance))
    }
}

/// Outcome of [`extract_discriminator`]
#[derive(Debug, Clone, PartialEq)]
pub enum Extracted {
    /// The value is not a mapping; handed back unchanged
    NotAMap(Value),
    /// Discriminator and the mapping without it
    Found {
        /// Discriminator value
        kind: String,
        /// Remaining keys
        payload: Mapping,
    },
}

/// Why a discriminator could not be read from a mapping
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ExtractError {
    /// The key is absent
    #[error("no element '{key}' found")]
    Missing { key: String },

    /// The key holds something other than a string
    #[error("element '{key}' is a {found}, not a string")]
    NotAString { key: String, found: ValueKind },

    /// A dynamic mapping holds a non-string key
    #[error("mapping key must be a string, got {found}")]
    NonStringKey { found: ValueKind },
}

/// Split a mapping into its discriminator and the remaining payload
///
/// Accepts string-keyed and dynamically keyed mappings alike; any other
/// value comes back as [`Extracted::NotAMap`].
///
/// # Errors
/// Returns error if the key is missing, not a string, or if a dynamic mapping
/// holds a non-string key
pub fn extract_discriminator(key: &str, value: Value) -> Result<Extracted, ExtractError> {
    let mut payload = match value.into_mapping() {
        Ok(mapping) => mapping,
        Err(IntoMappingError::NotAMap(value)) => return Ok(Extracted::NotAMap(value)),
        Err(IntoMappingError::NonStringKey(found)) => {
            return Err(ExtractError::NonStringKey { found })
        }
    };

    match payload.shift_remove(key) {
        Some(Value::String(kind)) => Ok(Extracted::Found { kind, payload }),
        Some(other) => Err(ExtractError::NotAString {
            key: key.to_string(),
            found: other.kind(),
        }),
        None => Err(ExtractError::Missing {
            key: key.to_string(),
        }),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    fn string_keyed(pairs: &[(&str, &str)]) -> Value {
        Value::Map(
            pairs
                .iter()
                .map(|(k, v)| (k.to_string(), Value::from(*v)))
                .collect(),
        )
    }

    fn dyn_keyed(pairs: &[(&str, &str)]) -> Value {
        Value::DynMap(
            pairs
                .iter()
                .map(|(k, v)| (Value::from(*k), Value::from(*v)))
                .collect(),
        )
    }

    #[test]
    fn extract_from_string_keyed_map() {
        let value = string_keyed(&[("alice", "foo"), ("other", "bar")]);
        let Extracted::Found { kind, payload } = extract_discriminator("alice", value).unwrap()
        else {
            panic!("expected a mapping");
        };
        assert_eq!(kind, "foo");
        assert_eq!(payload.len(), 1);
        assert_eq!(payload["other"], Value::from("bar"));
    }

    #[test]
    fn extract_from_dynamic_map() {
        let value = dyn_keyed(&[("alice", "foo"), ("other", "bar")]);
        let Extracted::Found { kind, payload } = extract_discriminator("alice", value).unwrap()
        else {
            panic!("expected a mapping");
        };
        assert_eq!(kind, "foo");
        assert_eq!(payload.len(), 1);
        assert_eq!(payload["other"], Value::from("bar"));
    }

    #[test]
    fn extract_from_scalar_is_not_a_map() {
        let value = Value::from("something else");
        assert_eq!(
            extract_discriminator("alice", value.clone()),
            Ok(Extracted::NotAMap(value))
        );
    }

    #[test]
    fn extract_missing_key() {
        let value = string_keyed(&[("other", "bar")]);
        assert_eq!(
            extract_discriminator("alice", value),
            Err(ExtractError::Missing {
                key: "alice".to_string()
            })
        );
    }

    #[test]
    fn extract_non_string_discriminator() {
        let value = Value::DynMap(vec![(Value::from("alice"), Value::Integer(3))]);
        assert_eq!(
            extract_discriminator("alice", value),
            Err(ExtractError::NotAString {
                key: "alice".to_string(),
                found: ValueKind::Integer
            })
        );
    }

    #[test]
    fn extract_rejects_non_string_keys() {
        let value = Value::DynMap(vec![
            (Value::from("alice"), Value::from("foo")),
            (Value::Bool(true), Value::Null),
        ]);
        assert_eq!(
            extract_discriminator("alice", value),
            Err(ExtractError::NonStringKey {
                found: ValueKind::Bool
            })
        );
    }

    proptest! {
        #[test]
        fn prop_representation_independent(
            kind in "[a-z]{0,8}",
            entries in proptest::collection::btree_map("[a-z]{1,6}", "[ -~]{0,12}", 0..8),
        ) {
            let mut pairs: Vec<(String, String)> = entries
                .into_iter()
                .filter(|(k, _)| k != "kind")
                .collect();
            pairs.push(("kind".to_string(), kind.clone()));
            let borrowed: Vec<(&str, &str)> =
                pairs.iter().map(|(k, v)| (k.as_str(), v.as_str())).collect();

            let from_strings = extract_discriminator("kind", string_keyed(&borrowed));
            let from_dynamic = extract_discriminator("kind", dyn_keyed(&borrowed));

            prop_assert_eq!(&from_strings, &from_dynamic);
            match from_strings {
                Ok(Extracted::Found { kind: found, payload }) => {
                    prop_assert_eq!(found, kind);
                    prop_assert_eq!(payload.len(), pairs.len() - 1);
                    prop_assert!(!payload.contains_key("kind"));
                }
                other => prop_assert!(false, "unexpected extraction: {:?}", other),
            }
        }

        #[test]
        fn prop_missing_key_always_fails(
            entries in proptest::collection::btree_map("[a-j]{1,6}", "[a-z]{0,6}", 0..8),
        ) {
            let pairs: Vec<(&str, &str)> =
                entries.iter().map(|(k, v)| (k.as_str(), v.as_str())).collect();
            let result = extract_discriminator("kind", dyn_keyed(&pairs));
            prop_assert!(
                matches!(result, Err(ExtractError::Missing { .. })),
                "expected missing discriminator"
            );
        }
    }
}
