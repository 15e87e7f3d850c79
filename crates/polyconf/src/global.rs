//! Process-wide registry
//!
//! Convenience layer for applications that register their interfaces from
//! startup code scattered across modules. The first decode seals the
//! registry; [`reset_registry`] reopens it for tests.

use once_cell::sync::Lazy;
use parking_lot::RwLock;

use crate::decode::{Decode, DecodeFields, DecoderConfig};
use crate::error::{DecodeError, RegistryError};
use crate::registry::Registry;
use crate::value::Value;

static REGISTRY: Lazy<RwLock<Registry>> = Lazy::new(|| RwLock::new(Registry::new()));

/// Register interface `I` in the global registry
///
/// # Errors
/// See [`Registry::register_interface`]
pub fn register_interface<I>(discriminator_key: impl Into<String>) -> Result<(), RegistryError>
where
    I: ?Sized + DecodeFields + 'static,
{
    REGISTRY.write().register_interface::<I>(discriminator_key)
}

/// Register a kind of interface `I` in the global registry
///
/// # Errors
/// See [`Registry::register`]
pub fn register<I, F>(kind: impl Into<String>, factory: F) -> Result<(), RegistryError>
where
    I: ?Sized + 'static,
    F: Fn() -> Box<I> + Send + Sync + 'static,
{
    REGISTRY.write().register::<I, F>(kind, factory)
}

/// Empty and unseal the global registry
pub fn reset_registry() {
    REGISTRY.write().reset();
}

/// Decode with the default configuration against the global registry
///
/// # Errors
/// Returns the first data error
pub fn decode<T: Decode>(source: impl Into<Value>, out: &mut T) -> Result<(), DecodeError> {
    decode_with(&DecoderConfig::default(), source, out)
}

/// Decode with `config` against the global registry
///
/// The registry is read locked for the whole decode. Hooks and factories
/// must not register; use [`with_registry`] to inspect it.
///
/// # Errors
/// Returns the first data error
pub fn decode_with<T: Decode>(
    config: &DecoderConfig,
    source: impl Into<Value>,
    out: &mut T,
) -> Result<(), DecodeError> {
    if !REGISTRY.read().is_sealed() {
        REGISTRY.write().seal();
    }
    let registry = REGISTRY.read();
    config.decode(&registry, source, out)
}

/// Run `f` with shared access to the global registry
///
/// Safe to call from factories and hooks during [`decode`]: the read lock is
/// taken recursively, so a queued writer cannot block it behind the decode's
/// own read lock. Registering from there still deadlocks.
pub fn with_registry<R>(f: impl FnOnce(&Registry) -> R) -> R {
    f(&REGISTRY.read_recursive())
}
