//! Structural decoder
//!
//! Walks a [`Value`] tree into statically typed structures. Every type
//! transition goes through the configured [`HookChain`] first, which is where
//! polymorphic resolution and string parsing plug in.
//!
//! # Flow
//!
//! ```text
//! Decoder::decode_into(slot, value)
//!     ├─> HookChain::run(T::target(), value)
//!     │       ├─> Hooked::Built(instance)  → *slot = instance
//!     │       └─> Hooked::Value(value)     → slot.decode_in_place(value)
//!     └─> struct impls recurse field by field through Decoder::at(key)
//! ```

mod impls;
mod macros;
mod path;
mod target;

pub use path::{FieldPath, Segment};
pub use target::{ParseFn, Target, TypeKey};

use crate::error::DecodeError;
use crate::hooks::{DecodeHook, HookChain, Hooked};
use crate::registry::Registry;
use crate::value::{IntoMappingError, Mapping, Value};

/// Types that can be decoded from a [`Value`]
///
/// Implemented for the standard scalar and collection types. Structs use
/// [`decode_struct!`](crate::decode_struct), string-parsable types use
/// [`decode_from_str!`](crate::decode_from_str).
pub trait Decode: Sized + 'static {
    /// Describe this type to decode hooks
    fn target() -> Target {
        Target::of::<Self>()
    }

    /// Build a fresh instance
    ///
    /// # Errors
    /// Returns error if the value does not fit this type
    fn decode(value: Value, de: &Decoder<'_>) -> Result<Self, DecodeError>;

    /// Update an existing instance
    ///
    /// Structs and maps override this to keep fields the input does not
    /// mention. The default replaces the whole value.
    ///
    /// # Errors
    /// Returns error if the value does not fit this type
    fn decode_in_place(&mut self, value: Value, de: &Decoder<'_>) -> Result<(), DecodeError> {
        *self = Self::decode(value, de)?;
        Ok(())
    }
}

/// Object-safe decoding of a payload into an existing instance
///
/// Make it a supertrait of every polymorphic interface
/// (`trait Plugin: DecodeFields`) so factories' products can be filled
/// through the trait object.
pub trait DecodeFields {
    /// Decode `payload` into `self` with the full decoder, hooks included
    ///
    /// # Errors
    /// Returns error if the payload does not fit the concrete type
    fn decode_fields(&mut self, payload: Mapping, de: &Decoder<'_>) -> Result<(), DecodeError>;
}

impl<T: Decode> DecodeFields for T {
    fn decode_fields(&mut self, payload: Mapping, de: &Decoder<'_>) -> Result<(), DecodeError> {
        de.decode_into(self, Value::Map(payload))
    }
}

/// Decoder configuration
#[derive(Debug)]
pub struct DecoderConfig {
    /// Reject input keys that match no struct field
    pub error_unused: bool,
    /// Coerce between scalar kinds (`"42"` → `42`, `true` → `1`, ...)
    pub weakly_typed_input: bool,
    /// Hooks tried at every type transition, in order
    pub hooks: HookChain,
}

impl DecoderConfig {
    /// Default configuration: strict, no coercion, standard hooks
    #[inline]
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Toggle unused key detection
    #[inline]
    #[must_use]
    pub fn with_error_unused(mut self, error_unused: bool) -> Self {
        self.error_unused = error_unused;
        self
    }

    /// Toggle scalar coercion
    #[inline]
    #[must_use]
    pub fn with_weakly_typed_input(mut self, weak: bool) -> Self {
        self.weakly_typed_input = weak;
        self
    }

    /// Replace the hook chain
    #[inline]
    #[must_use]
    pub fn with_hooks(mut self, hooks: HookChain) -> Self {
        self.hooks = hooks;
        self
    }

    /// Append a hook after the existing ones
    #[must_use]
    pub fn with_hook(mut self, hook: impl DecodeHook + 'static) -> Self {
        self.hooks.push(hook);
        self
    }

    /// Append a closure hook after the existing ones
    #[must_use]
    pub fn with_hook_fn<F>(mut self, hook: F) -> Self
    where
        F: Fn(&Target, Value, &Decoder<'_>) -> Result<Hooked, DecodeError> + Send + Sync + 'static,
    {
        self.hooks.push_fn(hook);
        self
    }

    /// Decode `source` into `out` against `registry` with this configuration
    ///
    /// # Errors
    /// Returns the first data error; `out` is unspecified afterwards
    pub fn decode<T: Decode>(
        &self,
        registry: &Registry,
        source: impl Into<Value>,
        out: &mut T,
    ) -> Result<(), DecodeError> {
        Decoder::new(registry, self)
            .decode_into(out, source.into())
            .map_err(|err| {
                tracing::debug!(target_type = std::any::type_name::<T>(), error = %err, "decode failed");
                err
            })
    }
}

impl Default for DecoderConfig {
    fn default() -> Self {
        Self {
            error_unused: true,
            weakly_typed_input: false,
            hooks: HookChain::standard(),
        }
    }
}

/// Decode a configuration tree into `out` with the default configuration
///
/// This is the entry point application code calls once per document.
///
/// # Errors
/// Returns the first data error; `out` is unspecified afterwards
pub fn decode<T: Decode>(
    registry: &Registry,
    source: impl Into<Value>,
    out: &mut T,
) -> Result<(), DecodeError> {
    DecoderConfig::default().decode(registry, source, out)
}

/// Decoding context: registry, configuration and current location
#[derive(Debug, Clone)]
pub struct Decoder<'a> {
    registry: &'a Registry,
    config: &'a DecoderConfig,
    path: FieldPath,
    error_unused: bool,
}

impl<'a> Decoder<'a> {
    /// Decoder positioned at the document root
    #[must_use]
    pub fn new(registry: &'a Registry, config: &'a DecoderConfig) -> Self {
        Self {
            registry,
            config,
            path: FieldPath::root(),
            error_unused: config.error_unused,
        }
    }

    /// Interface registry
    #[inline]
    #[must_use]
    pub fn registry(&self) -> &'a Registry {
        self.registry
    }

    /// Active configuration
    #[inline]
    #[must_use]
    pub fn config(&self) -> &'a DecoderConfig {
        self.config
    }

    /// Location of the node being decoded
    #[inline]
    #[must_use]
    pub fn path(&self) -> &FieldPath {
        &self.path
    }

    /// Whether unused keys are rejected at this level
    #[inline]
    #[must_use]
    pub fn error_unused(&self) -> bool {
        self.error_unused
    }

    /// Whether scalar coercion is enabled
    #[inline]
    #[must_use]
    pub fn weakly_typed(&self) -> bool {
        self.config.weakly_typed_input
    }

    /// Descend into a mapping key
    #[must_use]
    pub fn at(&self, key: &str) -> Self {
        Self {
            path: self.path.key(key),
            ..self.clone()
        }
    }

    /// Descend into a sequence element
    #[must_use]
    pub fn at_index(&self, index: usize) -> Self {
        Self {
            path: self.path.index(index),
            ..self.clone()
        }
    }

    /// Same position with unused key detection forced on
    #[must_use]
    pub fn strict(&self) -> Self {
        Self {
            error_unused: true,
            ..self.clone()
        }
    }

    /// Decode a fresh `T`
    ///
    /// # Errors
    /// Returns error from hooks or from `T`'s own decoding
    pub fn decode<T: Decode>(&self, value: Value) -> Result<T, DecodeError> {
        let target = T::target();
        match self.config.hooks.run(&target, value, self)? {
            Hooked::Built(instance) => self.downcast(instance, &target),
            Hooked::Value(value) => T::decode(value, self),
        }
    }

    /// Decode into an existing `T`, keeping what the input does not override
    ///
    /// # Errors
    /// Returns error from hooks or from `T`'s own decoding
    pub fn decode_into<T: Decode>(&self, slot: &mut T, value: Value) -> Result<(), DecodeError> {
        let target = T::target();
        match self.config.hooks.run(&target, value, self)? {
            Hooked::Built(instance) => {
                *slot = self.downcast(instance, &target)?;
                Ok(())
            }
            Hooked::Value(value) => slot.decode_in_place(value, self),
        }
    }

    /// Normalize a node into a string-keyed mapping
    ///
    /// # Errors
    /// [`DecodeError::TypeMismatch`] for non-mappings,
    /// [`DecodeError::NonStringKey`] for dynamic maps with other keys
    pub fn mapping(&self, value: Value) -> Result<Mapping, DecodeError> {
        value.into_mapping().map_err(|err| match err {
            IntoMappingError::NotAMap(value) => self.mismatch("mapping", &value),
            IntoMappingError::NonStringKey(found) => DecodeError::NonStringKey {
                path: self.path.clone(),
                found,
            },
        })
    }

    /// Start decoding a struct; `Null` yields no fields
    ///
    /// # Errors
    /// Returns error if the value is not a mapping
    pub fn struct_fields(
        &self,
        value: Value,
        type_name: &'static str,
    ) -> Result<StructFields<'_, 'a>, DecodeError> {
        let entries = match value {
            Value::Null => Mapping::new(),
            other => self.mapping(other)?,
        };
        Ok(StructFields {
            de: self,
            type_name,
            entries,
        })
    }

    /// Type mismatch at the current path
    #[must_use]
    pub fn mismatch(&self, expected: &'static str, found: &Value) -> DecodeError {
        DecodeError::TypeMismatch {
            path: self.path.clone(),
            expected,
            found: found.kind(),
        }
    }

    fn downcast<T: Decode>(
        &self,
        instance: Box<dyn std::any::Any>,
        target: &Target,
    ) -> Result<T, DecodeError> {
        instance
            .downcast::<T>()
            .map(|boxed| *boxed)
            .map_err(|_| DecodeError::HookTypeMismatch {
                path: self.path.clone(),
                expected: target.name(),
            })
    }
}

/// Remaining input keys of a struct being decoded
#[derive(Debug)]
pub struct StructFields<'d, 'a> {
    de: &'d Decoder<'a>,
    type_name: &'static str,
    entries: Mapping,
}

impl StructFields<'_, '_> {
    /// Remove the entry for field `name`
    ///
    /// Exact key match first, then ASCII case-insensitive.
    pub fn take(&mut self, name: &str) -> Option<(String, Value)> {
        if let Some(entry) = self.entries.shift_remove_entry(name) {
            return Some(entry);
        }
        let index = self
            .entries
            .keys()
            .position(|key| key.eq_ignore_ascii_case(name))?;
        self.entries.shift_remove_index(index)
    }

    /// Decode the entry for `name` into `slot`; absent entries keep the slot
    ///
    /// # Errors
    /// Returns error from decoding the field
    pub fn field<T: Decode>(&mut self, name: &str, slot: &mut T) -> Result<(), DecodeError> {
        match self.take(name) {
            Some((key, value)) => self.de.at(&key).decode_into(slot, value),
            None => Ok(()),
        }
    }

    /// Check for leftover keys
    ///
    /// # Errors
    /// [`DecodeError::UnusedKeys`] when unused key detection is on
    pub fn finish(self) -> Result<(), DecodeError> {
        if self.entries.is_empty() || !self.de.error_unused() {
            return Ok(());
        }
        Err(DecodeError::UnusedKeys {
            path: self.de.path().clone(),
            target: self.type_name,
            keys: self.entries.into_keys().collect(),
        })
    }
}
