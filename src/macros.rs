//! Macros for creating isolated singleton registries.

/// Creates a complete singleton registry with a single macro invocation.
///
/// The macro generates a module containing:
/// - Slot storage and trace callback statics (hidden)
/// - An `Api` struct that implements `RegistryApi`, and its `API` constant
/// - Free functions delegating to `API`
///
/// An optional `init_timeout = <Duration>` bounds how long callers wait for
/// another caller's in-flight construction.
///
/// # Examples
///
/// ```rust
/// use once_registry::define_registry;
/// use std::sync::Arc;
///
/// define_registry!(services);
///
/// struct Logger {
///     log_file: String,
/// }
///
/// let l1: Arc<Logger> = services::get_or_init(|| Logger {
///     log_file: "/var/log/app.log".to_string(),
/// })
/// .unwrap();
/// let l2: Arc<Logger> = services::get().unwrap();
///
/// assert!(Arc::ptr_eq(&l1, &l2));
/// ```
///
/// # Multiple Registries
///
/// Each registry is completely isolated:
///
/// ```rust
/// use once_registry::define_registry;
///
/// define_registry!(database);
/// define_registry!(cache);
///
/// database::register("db_connection".to_string()).unwrap();
///
/// assert!(database::contains::<String>());
/// assert!(!cache::contains::<String>());
/// ```
///
/// # Timeouts and Trait-Based Usage
///
/// ```rust
/// use once_registry::{define_registry, RegistryApi};
/// use std::sync::Arc;
/// use std::time::Duration;
///
/// define_registry!(app, init_timeout = Duration::from_secs(5));
///
/// app::API.register(100i32).unwrap();
/// let value: Arc<i32> = app::API.get().unwrap();
/// assert_eq!(*value, 100);
/// ```
#[macro_export]
macro_rules! define_registry {
    ($name:ident) => {
        $crate::define_registry!(@module $name, {});
    };
    ($name:ident, init_timeout = $timeout:expr) => {
        $crate::define_registry!(@module $name, {
            fn init_timeout() -> ::std::option::Option<::std::time::Duration> {
                ::std::option::Option::Some($timeout)
            }
        });
    };
    (@module $name:ident, { $($config:tt)* }) => {
        pub mod $name {
            #![allow(dead_code)]

            use std::sync::Arc;

            // Storage for per-type slots, reached through `Api`
            #[doc(hidden)]
            pub static STORAGE: $crate::SlotStorage =
                ::std::sync::LazyLock::new(|| ::std::default::Default::default());

            // Trace callback storage, reached through `Api`
            #[doc(hidden)]
            pub static TRACE: $crate::TraceStorage =
                ::std::sync::LazyLock::new(|| ::std::default::Default::default());

            /// Zero-sized type that implements the registry API.
            ///
            /// All registry operations are provided by the `RegistryApi` trait's
            /// default implementations. This struct only provides access to the statics.
            pub struct Api;

            /// Convenient constant for accessing the registry API.
            pub const API: Api = Api;

            /// Seed the singleton for `T`.
            pub fn register<T: Send + Sync + 'static>(value: T) -> $crate::Result<()> {
                use $crate::RegistryApi;
                API.register(value)
            }

            /// Seed the singleton for `T` with an Arc-wrapped value.
            pub fn register_arc<T: Send + Sync + 'static>(value: Arc<T>) -> $crate::Result<()> {
                use $crate::RegistryApi;
                API.register_arc(value)
            }

            /// Associate a zero-argument constructor with `T`.
            pub fn register_constructor<T, E, F>(constructor: F) -> $crate::Result<()>
            where
                T: Send + Sync + 'static,
                E: Into<$crate::BoxError>,
                F: Fn() -> ::std::result::Result<T, E> + Send + Sync + 'static,
            {
                use $crate::RegistryApi;
                API.register_constructor(constructor)
            }

            /// Retrieve the singleton for `T`, constructing it on first request.
            pub fn get<T: Send + Sync + 'static>() -> $crate::Result<Arc<T>> {
                use $crate::RegistryApi;
                API.get()
            }

            /// Retrieve the singleton for `T`, constructing it with `init` on first request.
            pub fn get_or_init<T, F>(init: F) -> $crate::Result<Arc<T>>
            where
                T: Send + Sync + 'static,
                F: FnOnce() -> T,
            {
                use $crate::RegistryApi;
                API.get_or_init(init)
            }

            /// Retrieve the singleton for `T`, constructing it with the fallible `init` on first request.
            pub fn get_or_try_init<T, E, F>(init: F) -> $crate::Result<Arc<T>>
            where
                T: Send + Sync + 'static,
                E: Into<$crate::BoxError>,
                F: FnOnce() -> ::std::result::Result<T, E>,
            {
                use $crate::RegistryApi;
                API.get_or_try_init(init)
            }

            /// Retrieve the instance of a `Singleton` type from this registry.
            pub fn instance<T: $crate::Singleton>() -> $crate::Result<Arc<T>> {
                use $crate::RegistryApi;
                API.instance()
            }

            /// Retrieve a cloned value from the registry.
            pub fn get_cloned<T: Send + Sync + Clone + 'static>() -> $crate::Result<T> {
                use $crate::RegistryApi;
                API.get_cloned()
            }

            /// Check whether the singleton for `T` is initialized.
            pub fn contains<T: Send + Sync + 'static>() -> bool {
                use $crate::RegistryApi;
                API.contains::<T>()
            }

            /// Set a tracing callback for registry operations.
            pub fn set_trace_callback(callback: impl Fn(&$crate::RegistryEvent) + Send + Sync + 'static) {
                use $crate::RegistryApi;
                API.set_trace_callback(callback)
            }

            /// Clear the tracing callback.
            pub fn clear_trace_callback() {
                use $crate::RegistryApi;
                API.clear_trace_callback()
            }
        }

        // Implemented at the invocation site so configuration expressions
        // resolve against the caller's imports.
        impl $crate::RegistryApi for $name::Api {
            fn storage() -> &'static $crate::SlotStorage {
                &$name::STORAGE
            }

            fn trace() -> &'static $crate::TraceStorage {
                &$name::TRACE
            }

            $($config)*
        }
    };
}
