//! polyconf - Polymorphic configuration decoding
//!
//! Decodes untyped configuration trees (parsed JSON or YAML) into typed
//! structures whose fields may be trait objects. The concrete type behind a
//! trait object is chosen by a discriminator key in the input:
//! - Interfaces are registered once with the key that names their kinds
//! - Each kind gets a factory producing a default-initialized instance
//! - A decode hook resolves the kind, builds the instance and decodes the
//!   remaining keys into it, recursively
//!
//! # Example
//!
//! ```rust,ignore
//! use polyconf::{decode, decode_struct, DecodeFields, Registry, Value};
//!
//! trait Plugin: DecodeFields {}
//!
//! #[derive(Default)]
//! struct PlugA { a: String }
//! decode_struct!(PlugA { a });
//! impl Plugin for PlugA {}
//!
//! let mut registry = Registry::new();
//! registry.register_interface::<dyn Plugin>("kind")?;
//! registry.register::<dyn Plugin, _>("kindA", || Box::new(PlugA::default()))?;
//!
//! let mut plugin: Option<Box<dyn Plugin>> = None;
//! decode(&registry, Value::from_yaml_str("kind: kindA\na: hello\n")?, &mut plugin)?;
//! ```

#![warn(unreachable_pub)]
#![allow(missing_docs)]

// Core modules
pub mod decode;
pub mod error;
pub mod global;
pub mod hooks;
pub mod registry;
pub mod value;

// Re-exports for convenience
pub use decode::{
    decode, Decode, DecodeFields, Decoder, DecoderConfig, FieldPath, ParseFn, Segment,
    StructFields, Target, TypeKey,
};
pub use error::{BoxError, DecodeError, ParseError, RegistryError};
pub use hooks::{DecodeHook, HookChain, Hooked};
pub use registry::{Factory, InterfaceDescriptor, Registry};
pub use value::{DynMapping, IntoMappingError, Mapping, Value, ValueKind};

/// Prelude module for common imports
pub mod prelude {
    //! Common imports for declaring and decoding polymorphic configuration
    pub use crate::{
        decode, decode_from_str, decode_struct, Decode, DecodeError, DecodeFields, Decoder,
        DecoderConfig, Registry, RegistryError, Value,
    };
}

/// Version of this crate
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
