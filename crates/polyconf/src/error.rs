//! Error types for polyconf
//!
//! Two families with different handling:
//! - [`RegistryError`]: wiring mistakes made while registering interfaces.
//!   They surface during startup and callers treat them as fatal.
//! - [`DecodeError`]: problems with the configuration data itself. They are
//!   returned from every level of a recursive decode unchanged.

use crate::decode::FieldPath;
use crate::hooks::ExtractError;
use crate::value::ValueKind;

/// Boxed error used for user supplied parsers
pub type BoxError = Box<dyn std::error::Error + Send + Sync + 'static>;

/// Registration misuse
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum RegistryError {
    /// The interface already has a descriptor
    #[error("interface already registered: {interface}")]
    DuplicateInterface { interface: &'static str },

    /// A kind was registered before its interface
    #[error("interface not registered: {interface} (while registering kind '{kind}')")]
    InterfaceNotRegistered {
        interface: &'static str,
        kind: String,
    },

    /// The registry was sealed for decoding
    #[error("registry is sealed; cannot register {interface}")]
    Sealed { interface: &'static str },

    /// An interface was registered with an empty discriminator key
    #[error("empty discriminator key for interface {interface}")]
    EmptyDiscriminatorKey { interface: &'static str },
}

impl RegistryError {
    /// Registration errors are always coding mistakes, never data problems
    #[inline]
    #[must_use]
    pub fn is_programming_error(&self) -> bool {
        true
    }
}

/// Data errors raised while decoding a configuration tree
#[derive(Debug, thiserror::Error)]
pub enum DecodeError {
    /// The discriminator key is absent or does not hold a string
    #[error("{path}: no kind with key '{key}' found for {interface}: {reason}")]
    MissingDiscriminator {
        path: FieldPath,
        key: String,
        interface: &'static str,
        #[source]
        reason: ExtractError,
    },

    /// The discriminator is present but empty
    #[error("{path}: empty kind under key '{key}' for {interface}")]
    EmptyDiscriminator {
        path: FieldPath,
        key: String,
        interface: &'static str,
    },

    /// No factory is registered for the discriminator value
    #[error("{path}: no registered kind '{kind}' for {interface}")]
    UnknownKind {
        path: FieldPath,
        kind: String,
        interface: &'static str,
    },

    /// Input keys that match no field of the target struct
    #[error("{path}: {target} has invalid keys: {}", keys.join(", "))]
    UnusedKeys {
        path: FieldPath,
        target: &'static str,
        keys: Vec<String>,
    },

    /// The node has the wrong shape for the target type
    #[error("{path}: expected {expected}, got {found}")]
    TypeMismatch {
        path: FieldPath,
        expected: &'static str,
        found: ValueKind,
    },

    /// A mapping holds a key that is not a string
    #[error("{path}: mapping key must be a string, got {found}")]
    NonStringKey { path: FieldPath, found: ValueKind },

    /// A number does not fit the target type
    #[error("{path}: {value} out of range for {target}")]
    OutOfRange {
        path: FieldPath,
        value: String,
        target: &'static str,
    },

    /// A string could not be parsed into the target type
    #[error("{path}: cannot parse '{input}' as {target}: {source}")]
    Parse {
        path: FieldPath,
        input: String,
        target: &'static str,
        #[source]
        source: BoxError,
    },

    /// A trait object slot was reached without a registered interface
    #[error("{path}: cannot decode {found} into {interface}: not a registered interface")]
    UnresolvedInterface {
        path: FieldPath,
        interface: &'static str,
        found: ValueKind,
    },

    /// A hook built an instance of the wrong type
    #[error("{path}: hook produced a value that is not {expected}")]
    HookTypeMismatch {
        path: FieldPath,
        expected: &'static str,
    },

    /// Error raised by user code
    #[error("{path}: {message}")]
    Custom { path: FieldPath, message: String },
}

impl DecodeError {
    /// Create a custom error at path
    pub fn custom(path: &FieldPath, message: impl Into<String>) -> Self {
        Self::Custom {
            path: path.clone(),
            message: message.into(),
        }
    }

    /// Location of the offending node
    #[must_use]
    pub fn path(&self) -> &FieldPath {
        match self {
            Self::MissingDiscriminator { path, .. }
            | Self::EmptyDiscriminator { path, .. }
            | Self::UnknownKind { path, .. }
            | Self::UnusedKeys { path, .. }
            | Self::TypeMismatch { path, .. }
            | Self::NonStringKey { path, .. }
            | Self::OutOfRange { path, .. }
            | Self::Parse { path, .. }
            | Self::UnresolvedInterface { path, .. }
            | Self::HookTypeMismatch { path, .. }
            | Self::Custom { path, .. } => path,
        }
    }

    /// Whether the error comes from discriminator resolution
    #[inline]
    #[must_use]
    pub fn is_discriminator_error(&self) -> bool {
        matches!(
            self,
            Self::MissingDiscriminator { .. }
                | Self::EmptyDiscriminator { .. }
                | Self::UnknownKind { .. }
        )
    }
}

/// Errors from the textual format parsers
#[derive(Debug, thiserror::Error)]
pub enum ParseError {
    #[error("invalid JSON: {0}")]
    Json(#[from] serde_json::Error),

    #[error("invalid YAML: {0}")]
    Yaml(#[from] serde_yaml::Error),
}
