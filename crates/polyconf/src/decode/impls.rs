//! `Decode` for standard types

use std::collections::{BTreeMap, HashMap};
use std::hash::BuildHasher;
use std::path::PathBuf;
use std::time::Duration;

use indexmap::IndexMap;

use super::{Decode, DecodeFields, Decoder, Target};
use crate::error::DecodeError;
use crate::value::Value;

impl Decode for Value {
    fn decode(value: Value, _de: &Decoder<'_>) -> Result<Self, DecodeError> {
        Ok(value)
    }
}

impl Decode for bool {
    fn decode(value: Value, de: &Decoder<'_>) -> Result<Self, DecodeError> {
        match value {
            Value::Bool(b) => Ok(b),
            Value::Integer(i) if de.weakly_typed() => Ok(i != 0),
            Value::Unsigned(u) if de.weakly_typed() => Ok(u != 0),
            Value::Float(f) if de.weakly_typed() => Ok(f != 0.0),
            Value::String(s) if de.weakly_typed() => parse_weak_bool(&s).ok_or_else(|| {
                DecodeError::Parse {
                    path: de.path().clone(),
                    input: s,
                    target: "bool",
                    source: "expected true/false/1/0".into(),
                }
            }),
            other => Err(de.mismatch("bool", &other)),
        }
    }
}

fn parse_weak_bool(s: &str) -> Option<bool> {
    match s.trim().to_ascii_lowercase().as_str() {
        "true" | "t" | "1" => Some(true),
        "false" | "f" | "0" | "" => Some(false),
        _ => None,
    }
}

/// Integer source value, before range checks
fn integer(value: Value, de: &Decoder<'_>, target: &'static str) -> Result<i128, DecodeError> {
    match value {
        Value::Integer(i) => Ok(i128::from(i)),
        Value::Unsigned(u) => Ok(i128::from(u)),
        Value::Float(f) if f.fract() == 0.0 && f.is_finite() => float_to_int(f, de, target),
        Value::Float(f) if de.weakly_typed() => float_to_int(f.trunc(), de, target),
        Value::Bool(b) if de.weakly_typed() => Ok(i128::from(b)),
        Value::String(s) if de.weakly_typed() => {
            s.trim()
                .parse::<i128>()
                .map_err(|err| DecodeError::Parse {
                    path: de.path().clone(),
                    input: s,
                    target,
                    source: err.into(),
                })
        }
        other => Err(de.mismatch("integer", &other)),
    }
}

fn float_to_int(f: f64, de: &Decoder<'_>, target: &'static str) -> Result<i128, DecodeError> {
    if f.is_finite() && f >= i128::MIN as f64 && f <= i128::MAX as f64 {
        Ok(f as i128)
    } else {
        Err(DecodeError::OutOfRange {
            path: de.path().clone(),
            value: f.to_string(),
            target,
        })
    }
}

macro_rules! impl_decode_int {
    ($($ty:ty),* $(,)?) => {$(
        impl Decode for $ty {
            fn decode(value: Value, de: &Decoder<'_>) -> Result<Self, DecodeError> {
                let wide = integer(value, de, stringify!($ty))?;
                <$ty>::try_from(wide).map_err(|_| DecodeError::OutOfRange {
                    path: de.path().clone(),
                    value: wide.to_string(),
                    target: stringify!($ty),
                })
            }
        }
    )*};
}

impl_decode_int!(i8, i16, i32, i64, isize, u8, u16, u32, u64, usize);

macro_rules! impl_decode_float {
    ($($ty:ty),* $(,)?) => {$(
        impl Decode for $ty {
            fn decode(value: Value, de: &Decoder<'_>) -> Result<Self, DecodeError> {
                match value {
                    #[allow(clippy::cast_precision_loss, clippy::cast_possible_truncation)]
                    Value::Float(f) => Ok(f as $ty),
                    #[allow(clippy::cast_precision_loss)]
                    Value::Integer(i) => Ok(i as $ty),
                    #[allow(clippy::cast_precision_loss)]
                    Value::Unsigned(u) => Ok(u as $ty),
                    Value::Bool(b) if de.weakly_typed() => Ok(if b { 1.0 } else { 0.0 }),
                    Value::String(s) if de.weakly_typed() => {
                        s.trim().parse::<$ty>().map_err(|err| DecodeError::Parse {
                            path: de.path().clone(),
                            input: s,
                            target: stringify!($ty),
                            source: err.into(),
                        })
                    }
                    other => Err(de.mismatch("float", &other)),
                }
            }
        }
    )*};
}

impl_decode_float!(f32, f64);

impl Decode for String {
    fn decode(value: Value, de: &Decoder<'_>) -> Result<Self, DecodeError> {
        match value {
            Value::String(s) => Ok(s),
            Value::Bool(b) if de.weakly_typed() => Ok(if b { "1" } else { "0" }.to_string()),
            Value::Integer(i) if de.weakly_typed() => Ok(i.to_string()),
            Value::Unsigned(u) if de.weakly_typed() => Ok(u.to_string()),
            Value::Float(f) if de.weakly_typed() => Ok(f.to_string()),
            other => Err(de.mismatch("string", &other)),
        }
    }
}

impl Decode for PathBuf {
    fn decode(value: Value, de: &Decoder<'_>) -> Result<Self, DecodeError> {
        String::decode(value, de).map(PathBuf::from)
    }
}

/// Built by [`DurationHook`](crate::hooks::DurationHook) from strings
impl Decode for Duration {
    fn decode(value: Value, de: &Decoder<'_>) -> Result<Self, DecodeError> {
        Err(de.mismatch("duration string", &value))
    }
}

impl<T: Decode> Decode for Option<T> {
    fn decode(value: Value, de: &Decoder<'_>) -> Result<Self, DecodeError> {
        match value {
            Value::Null => Ok(None),
            other => de.decode(other).map(Some),
        }
    }

    fn decode_in_place(&mut self, value: Value, de: &Decoder<'_>) -> Result<(), DecodeError> {
        if value.is_null() {
            *self = None;
            return Ok(());
        }
        match self {
            Some(existing) => de.decode_into(existing, value),
            None => {
                *self = Some(de.decode(value)?);
                Ok(())
            }
        }
    }
}

impl<T: Decode> Decode for Vec<T> {
    fn decode(value: Value, de: &Decoder<'_>) -> Result<Self, DecodeError> {
        let items = match value {
            Value::Sequence(items) => items,
            Value::Null => return Ok(Vec::new()),
            other if de.weakly_typed() && !other.kind().is_mapping() => vec![other],
            other => return Err(de.mismatch("sequence", &other)),
        };
        items
            .into_iter()
            .enumerate()
            .map(|(i, item)| de.at_index(i).decode(item))
            .collect()
    }

    fn decode_in_place(&mut self, value: Value, de: &Decoder<'_>) -> Result<(), DecodeError> {
        if value.is_null() {
            return Ok(());
        }
        *self = Self::decode(value, de)?;
        Ok(())
    }
}

macro_rules! impl_decode_map {
    ($($map:ty => [$($generics:tt)*]),* $(,)?) => {$(
        impl<$($generics)*> Decode for $map {
            fn decode(value: Value, de: &Decoder<'_>) -> Result<Self, DecodeError> {
                let mut map = Self::default();
                map.decode_in_place(value, de)?;
                Ok(map)
            }

            /// Merges: existing entries are decoded into, new ones inserted
            fn decode_in_place(&mut self, value: Value, de: &Decoder<'_>) -> Result<(), DecodeError> {
                if value.is_null() {
                    return Ok(());
                }
                for (key, item) in de.mapping(value)? {
                    let de = de.at(&key);
                    match self.get_mut(&key) {
                        Some(existing) => de.decode_into(existing, item)?,
                        None => {
                            let decoded = de.decode(item)?;
                            self.insert(key, decoded);
                        }
                    }
                }
                Ok(())
            }
        }
    )*};
}

impl_decode_map!(
    HashMap<String, V, S> => [V: Decode, S: BuildHasher + Default + 'static],
    IndexMap<String, V, S> => [V: Decode, S: BuildHasher + Default + 'static],
    BTreeMap<String, V> => [V: Decode],
);

/// Trait object slots, filled by [`PolymorphicHook`](crate::hooks::PolymorphicHook)
///
/// Reaching `decode` means no hook claimed the value: either the interface is
/// not registered, or the node is not a mapping.
impl<I: ?Sized + DecodeFields + 'static> Decode for Box<I> {
    fn target() -> Target {
        Target::of::<I>()
    }

    fn decode(value: Value, de: &Decoder<'_>) -> Result<Self, DecodeError> {
        let target = Self::target();
        if de.registry().get(target.key()).is_some() {
            return Err(de.mismatch("mapping with a kind", &value));
        }
        Err(DecodeError::UnresolvedInterface {
            path: de.path().clone(),
            interface: target.name(),
            found: value.kind(),
        })
    }
}
