//! Interface registry
//!
//! Maps an abstract type (`dyn Trait`) to the discriminator key that selects
//! its concrete variants and to one factory per variant. Registration happens
//! once during startup; afterwards the registry is only read.

use std::any::Any;
use std::collections::HashMap;
use std::fmt;
use std::sync::Arc;

use crate::decode::{DecodeFields, Decoder, TypeKey};
use crate::error::{DecodeError, RegistryError};
use crate::value::Mapping;

/// Type-erased factory producing a `Box<I>` wrapped in `Box<dyn Any>`
pub type Factory = Arc<dyn Fn() -> Box<dyn Any> + Send + Sync>;

type PopulateFn = fn(&mut dyn Any, Mapping, &Decoder<'_>) -> Result<(), DecodeError>;

/// Everything known about one registered interface
pub struct InterfaceDescriptor {
    interface: TypeKey,
    discriminator_key: String,
    constructors: HashMap<String, Factory>,
    populate: PopulateFn,
}

impl InterfaceDescriptor {
    /// Identity of the interface
    #[inline]
    #[must_use]
    pub fn interface(&self) -> TypeKey {
        self.interface
    }

    /// Mapping key whose value selects the concrete kind
    #[inline]
    #[must_use]
    pub fn discriminator_key(&self) -> &str {
        &self.discriminator_key
    }

    /// Factory registered for `kind`
    #[inline]
    #[must_use]
    pub fn constructor(&self, kind: &str) -> Option<&Factory> {
        self.constructors.get(kind)
    }

    /// Check whether `kind` has a factory
    #[inline]
    #[must_use]
    pub fn has_kind(&self, kind: &str) -> bool {
        self.constructors.contains_key(kind)
    }

    /// Number of registered kinds
    #[inline]
    #[must_use]
    pub fn kind_count(&self) -> usize {
        self.constructors.len()
    }

    /// Fresh instance for `kind`, a `Box<I>` behind `dyn Any`
    #[must_use]
    pub fn instantiate(&self, kind: &str) -> Option<Box<dyn Any>> {
        self.constructors.get(kind).map(|factory| factory())
    }

    /// Decode `payload` into an instance produced by [`instantiate`](Self::instantiate)
    ///
    /// # Errors
    /// Returns error from decoding the concrete type
    pub fn populate(
        &self,
        instance: &mut dyn Any,
        payload: Mapping,
        de: &Decoder<'_>,
    ) -> Result<(), DecodeError> {
        (self.populate)(instance, payload, de)
    }
}

impl fmt::Debug for InterfaceDescriptor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut kinds: Vec<_> = self.constructors.keys().collect();
        kinds.sort();
        f.debug_struct("InterfaceDescriptor")
            .field("interface", &self.interface)
            .field("discriminator_key", &self.discriminator_key)
            .field("kinds", &kinds)
            .finish()
    }
}

/// Table of registered interfaces
///
/// Two phases: open for registration, then optionally [`seal`](Self::seal)ed
/// so late registrations fail instead of racing with decoding.
#[derive(Debug, Default)]
pub struct Registry {
    interfaces: HashMap<TypeKey, InterfaceDescriptor>,
    sealed: bool,
}

impl Registry {
    /// Create empty registry
    #[inline]
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Register interface `I` with the key that names its kinds
    ///
    /// `I` is the trait object type, e.g. `dyn Plugin`, and must have
    /// [`DecodeFields`] as a supertrait.
    ///
    /// # Errors
    /// [`RegistryError::DuplicateInterface`] if `I` is already registered (the
    /// registry is left unchanged), [`RegistryError::Sealed`] after sealing,
    /// [`RegistryError::EmptyDiscriminatorKey`] for an empty key
    pub fn register_interface<I>(&mut self, discriminator_key: impl Into<String>) -> Result<(), RegistryError>
    where
        I: ?Sized + DecodeFields + 'static,
    {
        let interface = TypeKey::of::<I>();
        if self.sealed {
            return Err(RegistryError::Sealed {
                interface: interface.name(),
            });
        }
        if self.interfaces.contains_key(&interface) {
            return Err(RegistryError::DuplicateInterface {
                interface: interface.name(),
            });
        }
        let discriminator_key = discriminator_key.into();
        if discriminator_key.is_empty() {
            return Err(RegistryError::EmptyDiscriminatorKey {
                interface: interface.name(),
            });
        }

        tracing::debug!(interface = interface.name(), key = %discriminator_key, "registered interface");
        self.interfaces.insert(
            interface,
            InterfaceDescriptor {
                interface,
                discriminator_key,
                constructors: HashMap::with_capacity(2),
                populate: populate_boxed::<I>,
            },
        );
        Ok(())
    }

    /// Register the factory for `kind` of interface `I`
    ///
    /// A later registration of the same kind replaces the earlier one.
    ///
    /// ```rust,ignore
    /// registry.register::<dyn Plugin, _>("kindA", || Box::new(PlugA::default()))?;
    /// ```
    ///
    /// # Errors
    /// [`RegistryError::InterfaceNotRegistered`] if `I` has no descriptor yet,
    /// [`RegistryError::Sealed`] after sealing
    pub fn register<I, F>(&mut self, kind: impl Into<String>, factory: F) -> Result<(), RegistryError>
    where
        I: ?Sized + 'static,
        F: Fn() -> Box<I> + Send + Sync + 'static,
    {
        let interface = TypeKey::of::<I>();
        let kind = kind.into();
        if self.sealed {
            return Err(RegistryError::Sealed {
                interface: interface.name(),
            });
        }
        let Some(descriptor) = self.interfaces.get_mut(&interface) else {
            return Err(RegistryError::InterfaceNotRegistered {
                interface: interface.name(),
                kind,
            });
        };

        tracing::debug!(interface = interface.name(), kind = %kind, "registered kind");
        let factory: Factory = Arc::new(move || Box::new(factory()) as Box<dyn Any>);
        descriptor.constructors.insert(kind, factory);
        Ok(())
    }

    /// Discard every interface and unseal; meant for test isolation
    pub fn reset(&mut self) {
        tracing::debug!(interfaces = self.interfaces.len(), "registry reset");
        self.interfaces.clear();
        self.sealed = false;
    }

    /// Close registration; later registrations fail with [`RegistryError::Sealed`]
    pub fn seal(&mut self) {
        if !self.sealed {
            tracing::debug!(interfaces = self.interfaces.len(), "registry sealed");
        }
        self.sealed = true;
    }

    /// Check whether registration is closed
    #[inline]
    #[must_use]
    pub fn is_sealed(&self) -> bool {
        self.sealed
    }

    /// Descriptor for an interface key
    #[inline]
    #[must_use]
    pub fn get(&self, interface: &TypeKey) -> Option<&InterfaceDescriptor> {
        self.interfaces.get(interface)
    }

    /// Descriptor for interface `I`
    #[inline]
    #[must_use]
    pub fn descriptor<I: ?Sized + 'static>(&self) -> Option<&InterfaceDescriptor> {
        self.get(&TypeKey::of::<I>())
    }

    /// Check whether `I` is registered
    #[inline]
    #[must_use]
    pub fn contains<I: ?Sized + 'static>(&self) -> bool {
        self.interfaces.contains_key(&TypeKey::of::<I>())
    }

    /// Number of registered interfaces
    #[inline]
    #[must_use]
    pub fn len(&self) -> usize {
        self.interfaces.len()
    }

    /// Check if registry is empty
    #[inline]
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.interfaces.is_empty()
    }
}

fn populate_boxed<I>(instance: &mut dyn Any, payload: Mapping, de: &Decoder<'_>) -> Result<(), DecodeError>
where
    I: ?Sized + DecodeFields + 'static,
{
    match instance.downcast_mut::<Box<I>>() {
        // through the trait object, not `Box<I>`'s own impl
        Some(boxed) => DecodeFields::decode_fields(&mut **boxed, payload, de),
        None => Err(DecodeError::HookTypeMismatch {
            path: de.path().clone(),
            expected: std::any::type_name::<Box<I>>(),
        }),
    }
}
