//! String to custom type conversion

use super::{DecodeHook, Hooked};
use crate::decode::{Decoder, Target};
use crate::error::DecodeError;
use crate::value::Value;

/// Builds targets that advertise a parse capability from string nodes
///
/// See [`Target::with_parse`] and [`decode_from_str!`](crate::decode_from_str).
#[derive(Debug, Clone, Copy, Default)]
pub struct StringUnmarshalHook;

impl DecodeHook for StringUnmarshalHook {
    fn apply(
        &self,
        target: &Target,
        value: Value,
        de: &Decoder<'_>,
    ) -> Result<Hooked, DecodeError> {
        let Value::String(input) = value else {
            return Ok(Hooked::Value(value));
        };
        match target.parse(&input) {
            None => Ok(Hooked::Value(Value::String(input))),
            Some(Ok(instance)) => Ok(Hooked::Built(instance)),
            Some(Err(source)) => Err(DecodeError::Parse {
                path: de.path().clone(),
                input,
                target: target.name(),
                source,
            }),
        }
    }
}
