//! Decode hooks
//!
//! A hook sees every type transition the decoder performs and may replace the
//! default conversion:
//! - [`DurationHook`]: `"42s"` → [`std::time::Duration`]
//! - [`PolymorphicHook`]: mapping with a kind → registered trait object
//! - [`StringUnmarshalHook`]: string → type with a parse capability
//!
//! Hooks are composed into a [`HookChain`] and tried in order.

use std::fmt;

use crate::decode::{Decoder, Target};
use crate::error::DecodeError;
use crate::value::Value;

mod duration;
mod polymorphic;
mod string;

pub use duration::{parse_duration, DurationError, DurationHook};
pub use polymorphic::{extract_discriminator, ExtractError, Extracted, PolymorphicHook};
pub use string::StringUnmarshalHook;

/// Result of running a hook
pub enum Hooked {
    /// Continue with this value (unchanged or transformed)
    Value(Value),
    /// A finished instance of the target type; stops the chain
    Built(Box<dyn std::any::Any>),
}

impl fmt::Debug for Hooked {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Value(value) => f.debug_tuple("Value").field(value).finish(),
            Self::Built(_) => f.write_str("Built(..)"),
        }
    }
}

/// Extension point invoked at every type transition
///
/// The source type is `value.kind()`; the target type is described by
/// [`Target`]. Returning `Hooked::Value(value)` unchanged is a passthrough.
pub trait DecodeHook: Send + Sync {
    /// Transform `value` on its way into `target`
    ///
    /// # Errors
    /// Errors abort the whole decode and reach the caller unchanged
    fn apply(&self, target: &Target, value: Value, de: &Decoder<'_>)
        -> Result<Hooked, DecodeError>;

    /// Name shown in debug output
    fn name(&self) -> &'static str {
        std::any::type_name::<Self>()
    }
}

impl<F> DecodeHook for F
where
    F: Fn(&Target, Value, &Decoder<'_>) -> Result<Hooked, DecodeError> + Send + Sync,
{
    fn apply(
        &self,
        target: &Target,
        value: Value,
        de: &Decoder<'_>,
    ) -> Result<Hooked, DecodeError> {
        self(target, value, de)
    }

    fn name(&self) -> &'static str {
        "closure"
    }
}

/// Ordered hook composition
///
/// Each hook receives the value produced by the previous one. The first
/// hook to return [`Hooked::Built`] ends the chain.
#[derive(Default)]
pub struct HookChain {
    hooks: Vec<Box<dyn DecodeHook>>,
}

impl HookChain {
    /// Chain without hooks
    #[inline]
    #[must_use]
    pub fn new() -> Self {
        Self { hooks: Vec::new() }
    }

    /// Durations, then polymorphic interfaces, then string parsing
    #[must_use]
    pub fn standard() -> Self {
        let mut chain = Self::new();
        chain.push(DurationHook);
        chain.push(PolymorphicHook);
        chain.push(StringUnmarshalHook);
        chain
    }

    /// Append a hook
    pub fn push(&mut self, hook: impl DecodeHook + 'static) {
        self.hooks.push(Box::new(hook));
    }

    /// Append a closure hook
    pub fn push_fn<F>(&mut self, hook: F)
    where
        F: Fn(&Target, Value, &Decoder<'_>) -> Result<Hooked, DecodeError> + Send + Sync + 'static,
    {
        self.hooks.push(Box::new(hook));
    }

    /// Builder form of [`push`](Self::push)
    #[inline]
    #[must_use]
    pub fn with(mut self, hook: impl DecodeHook + 'static) -> Self {
        self.push(hook);
        self
    }

    /// Number of hooks
    #[inline]
    #[must_use]
    pub fn len(&self) -> usize {
        self.hooks.len()
    }

    /// Check for an empty chain
    #[inline]
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.hooks.is_empty()
    }

    /// Hook names in order
    #[must_use]
    pub fn names(&self) -> Vec<&'static str> {
        self.hooks.iter().map(|hook| hook.name()).collect()
    }

    /// Run every hook in order
    ///
    /// # Errors
    /// Returns the first hook error
    pub fn run(
        &self,
        target: &Target,
        mut value: Value,
        de: &Decoder<'_>,
    ) -> Result<Hooked, DecodeError> {
        for hook in &self.hooks {
            match hook.apply(target, value, de)? {
                Hooked::Value(next) => value = next,
                built @ Hooked::Built(_) => return Ok(built),
            }
        }
        Ok(Hooked::Value(value))
    }
}

impl fmt::Debug for HookChain {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("HookChain")
            .field("hooks", &self.names())
            .finish()
    }
}
