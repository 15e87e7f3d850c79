//! Runtime descriptors of decode targets
//!
//! Hooks never see Rust types directly. They see a [`Target`]: the
//! [`TypeKey`] of the slot being filled plus the optional capabilities the
//! type advertised through [`Decode::target`](crate::Decode::target).

use std::any::{Any, TypeId};
use std::fmt;
use std::hash::{Hash, Hasher};
use std::str::FromStr;

use crate::error::BoxError;

/// Parses a string into a boxed instance of the target type
pub type ParseFn = fn(&str) -> Result<Box<dyn Any>, BoxError>;

/// Stable identity of a type, usable as a map key
///
/// Equality and hashing use the [`TypeId`] only; the name is kept for
/// messages. Interfaces are keyed by the trait object type, e.g.
/// `TypeKey::of::<dyn Plugin>()`.
#[derive(Clone, Copy)]
pub struct TypeKey {
    id: TypeId,
    name: &'static str,
}

impl TypeKey {
    /// Key for `T`
    #[inline]
    #[must_use]
    pub fn of<T: ?Sized + 'static>() -> Self {
        Self {
            id: TypeId::of::<T>(),
            name: std::any::type_name::<T>(),
        }
    }

    /// Type name for diagnostics
    #[inline]
    #[must_use]
    pub fn name(&self) -> &'static str {
        self.name
    }

    /// Underlying type id
    #[inline]
    #[must_use]
    pub fn type_id(&self) -> TypeId {
        self.id
    }
}

impl PartialEq for TypeKey {
    fn eq(&self, other: &Self) -> bool {
        self.id == other.id
    }
}

impl Eq for TypeKey {}

impl Hash for TypeKey {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.id.hash(state);
    }
}

impl fmt::Debug for TypeKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name)
    }
}

impl fmt::Display for TypeKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name)
    }
}

/// The type a decoder is about to produce
#[derive(Clone, Copy)]
pub struct Target {
    key: TypeKey,
    parse: Option<ParseFn>,
}

impl Target {
    /// Plain target for `T`, without capabilities
    #[inline]
    #[must_use]
    pub fn of<T: ?Sized + 'static>() -> Self {
        Self {
            key: TypeKey::of::<T>(),
            parse: None,
        }
    }

    /// Advertise that `T` can be built from a string through [`FromStr`]
    ///
    /// Picked up by [`StringUnmarshalHook`](crate::hooks::StringUnmarshalHook).
    #[inline]
    #[must_use]
    pub fn with_parse<T>(mut self) -> Self
    where
        T: FromStr + 'static,
        T::Err: Into<BoxError>,
    {
        self.parse = Some(parse_boxed::<T>);
        self
    }

    /// Identity of the target type
    #[inline]
    #[must_use]
    pub fn key(&self) -> &TypeKey {
        &self.key
    }

    /// Target type name
    #[inline]
    #[must_use]
    pub fn name(&self) -> &'static str {
        self.key.name
    }

    /// Check whether the target is exactly `T`
    #[inline]
    #[must_use]
    pub fn is<T: ?Sized + 'static>(&self) -> bool {
        self.key.id == TypeId::of::<T>()
    }

    /// Whether the target can be built from a string
    #[inline]
    #[must_use]
    pub fn can_parse(&self) -> bool {
        self.parse.is_some()
    }

    /// Run the string capability, if any
    #[must_use]
    pub fn parse(&self, input: &str) -> Option<Result<Box<dyn Any>, BoxError>> {
        self.parse.map(|parse| parse(input))
    }
}

impl fmt::Debug for Target {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Target")
            .field("type", &self.key.name)
            .field("parse", &self.parse.is_some())
            .finish()
    }
}

fn parse_boxed<T>(input: &str) -> Result<Box<dyn Any>, BoxError>
where
    T: FromStr + 'static,
    T::Err: Into<BoxError>,
{
    input
        .parse::<T>()
        .map(|value| Box::new(value) as Box<dyn Any>)
        .map_err(Into::into)
}
