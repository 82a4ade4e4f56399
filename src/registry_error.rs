use std::sync::Arc;
use std::time::Duration;

use thiserror::Error;

/// Boxed error returned by a registered constructor.
pub type BoxError = Box<dyn std::error::Error + Send + Sync + 'static>;

/// Errors reported by registry operations.
///
/// Construction failures are never cached: the error reaches the caller that
/// triggered construction and the slot stays empty for the next attempt.
#[derive(Debug, Clone, Error)]
pub enum RegistryError {
    /// `get` was called for a type with no value and no registered constructor.
    #[error("no constructor registered for type: {type_name}")]
    ConstructorNotFound { type_name: &'static str },

    /// The constructor for the type returned an error.
    #[error("construction failed for type {type_name}: {source}")]
    Construction {
        type_name: &'static str,
        #[source]
        source: Arc<dyn std::error::Error + Send + Sync + 'static>,
    },

    /// A value was registered for a type that is already initialized.
    #[error("singleton already initialized for type: {type_name}")]
    AlreadyInitialized { type_name: &'static str },

    /// Waiting for another caller's construction exceeded the registry timeout.
    #[error("timed out after {timeout:?} waiting to initialize type: {type_name}")]
    Timeout {
        type_name: &'static str,
        timeout: Duration,
    },

    /// The slot stored under the type's key has an unexpected type.
    ///
    /// Slots are keyed by the `TypeId` of the type they hold, so registries
    /// never produce this; it guards the type-erased downcast.
    #[error("type mismatch in registry for type: {type_name}")]
    TypeMismatch { type_name: &'static str },
}

impl RegistryError {
    /// Name of the type the failed operation was about.
    pub fn type_name(&self) -> &'static str {
        match self {
            RegistryError::ConstructorNotFound { type_name }
            | RegistryError::Construction { type_name, .. }
            | RegistryError::AlreadyInitialized { type_name }
            | RegistryError::Timeout { type_name, .. }
            | RegistryError::TypeMismatch { type_name } => type_name,
        }
    }

    pub(crate) fn construction(type_name: &'static str, source: BoxError) -> Self {
        RegistryError::Construction {
            type_name,
            source: Arc::from(source),
        }
    }
}

/// Shorthand `Result` used throughout the crate.
pub type Result<T, E = RegistryError> = std::result::Result<T, E>;
