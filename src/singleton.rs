//! Types that know how to construct their own single instance.

use std::sync::Arc;

use crate::registry_error::{BoxError, Result};

/// A type with exactly one process-wide instance, built on first use.
///
/// `construct` takes no arguments: everything the instance needs must come from
/// its environment, including other singletons. The instance lives in the
/// default registry unless resolved through another registry's
/// [`instance`](crate::RegistryApi::instance).
///
/// # Examples
///
/// ```rust
/// use once_registry::Singleton;
/// use std::convert::Infallible;
/// use std::sync::Arc;
///
/// struct DatabaseConnection {
///     connection_string: String,
/// }
///
/// impl Singleton for DatabaseConnection {
///     type Error = Infallible;
///
///     fn construct() -> Result<Self, Infallible> {
///         Ok(DatabaseConnection {
///             connection_string: "localhost:27017".to_string(),
///         })
///     }
/// }
///
/// let db1 = DatabaseConnection::instance().unwrap();
/// let db2 = DatabaseConnection::instance().unwrap();
/// assert!(Arc::ptr_eq(&db1, &db2));
/// assert_eq!(db1.connection_string, "localhost:27017");
/// ```
pub trait Singleton: Send + Sync + Sized + 'static {
    /// Error returned when construction fails.
    type Error: Into<BoxError>;

    /// Build the instance. Runs at most once per registry on success.
    fn construct() -> std::result::Result<Self, Self::Error>;

    /// The shared instance from the default registry.
    fn instance() -> Result<Arc<Self>> {
        crate::registry::instance::<Self>()
    }
}
