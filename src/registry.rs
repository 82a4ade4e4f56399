//! The default process-wide registry.
//!
//! Free functions in this module operate on one global registry, so most code
//! never needs [`define_registry!`](crate::define_registry). Every type gets one
//! slot that is constructed at most once and never reset.
//!
//! # Examples
//!
//! ```
//! use once_registry::{get, register_constructor};
//! use std::sync::Arc;
//!
//! struct AppName(String);
//!
//! register_constructor(|| Ok::<_, std::convert::Infallible>(AppName("shop".to_string()))).unwrap();
//!
//! let name: Arc<AppName> = get().unwrap();
//! assert_eq!(name.0, "shop");
//! ```

use std::{
    collections::HashMap,
    sync::{Arc, LazyLock},
};

use parking_lot::Mutex;

use crate::registry_error::{BoxError, Result};
use crate::registry_trait::{RegistryApi, SlotStorage, TraceStorage};
use crate::{RegistryEvent, Singleton};

/// Slot storage of the default registry.
static GLOBAL_STORAGE: SlotStorage = LazyLock::new(|| Mutex::new(HashMap::new()));

/// Holds an optional user-defined tracing callback for the default registry.
static GLOBAL_TRACE: TraceStorage = LazyLock::new(|| Mutex::new(None));

/// Zero-sized handle to the default registry.
///
/// Use it where a [`RegistryApi`] value is expected; the free functions of this
/// module delegate to it.
#[derive(Debug, Clone, Copy, Default)]
pub struct GlobalRegistry;

impl RegistryApi for GlobalRegistry {
    fn storage() -> &'static SlotStorage {
        &GLOBAL_STORAGE
    }

    fn trace() -> &'static TraceStorage {
        &GLOBAL_TRACE
    }
}

/// The default registry.
pub const GLOBAL: GlobalRegistry = GlobalRegistry;

/// Seeds the singleton for `T` in the default registry.
///
/// # Errors
///
/// Returns [`RegistryError::AlreadyInitialized`](crate::RegistryError::AlreadyInitialized)
/// if `T` already has a value.
///
/// # Examples
///
/// ```
/// use once_registry::{register, get};
/// use std::sync::Arc;
///
/// struct Client(&'static str);
///
/// register(Client("Raj")).unwrap();
/// assert!(register(Client("Ann")).is_err());
///
/// let client: Arc<Client> = get().unwrap();
/// assert_eq!(client.0, "Raj");
/// ```
pub fn register<T: Send + Sync + 'static>(value: T) -> Result<()> {
    GLOBAL.register(value)
}

/// Seeds the singleton for `T` with an `Arc` you already own.
pub fn register_arc<T: Send + Sync + 'static>(value: Arc<T>) -> Result<()> {
    GLOBAL.register_arc(value)
}

/// Associates a zero-argument constructor with `T` in the default registry.
pub fn register_constructor<T, E, F>(constructor: F) -> Result<()>
where
    T: Send + Sync + 'static,
    E: Into<BoxError>,
    F: Fn() -> std::result::Result<T, E> + Send + Sync + 'static,
{
    GLOBAL.register_constructor(constructor)
}

/// Retrieves the singleton for `T`, running its registered constructor on first request.
///
/// # Examples
///
/// ```
/// use once_registry::{get, RegistryError};
///
/// struct NeverRegistered;
///
/// let result = get::<NeverRegistered>();
/// assert!(matches!(result, Err(RegistryError::ConstructorNotFound { .. })));
/// ```
pub fn get<T: Send + Sync + 'static>() -> Result<Arc<T>> {
    GLOBAL.get()
}

/// Retrieves the singleton for `T`, constructing it with `init` on first request.
pub fn get_or_init<T, F>(init: F) -> Result<Arc<T>>
where
    T: Send + Sync + 'static,
    F: FnOnce() -> T,
{
    GLOBAL.get_or_init(init)
}

/// Retrieves the singleton for `T`, constructing it with the fallible `init` on first request.
pub fn get_or_try_init<T, E, F>(init: F) -> Result<Arc<T>>
where
    T: Send + Sync + 'static,
    E: Into<BoxError>,
    F: FnOnce() -> std::result::Result<T, E>,
{
    GLOBAL.get_or_try_init(init)
}

/// Retrieves the instance of a [`Singleton`] type from the default registry.
pub fn instance<T: Singleton>() -> Result<Arc<T>> {
    GLOBAL.instance()
}

/// Retrieves a clone of the singleton for `T`.
pub fn get_cloned<T: Send + Sync + Clone + 'static>() -> Result<T> {
    GLOBAL.get_cloned()
}

/// Checks whether the singleton for `T` is initialized in the default registry.
pub fn contains<T: Send + Sync + 'static>() -> bool {
    GLOBAL.contains::<T>()
}

/// Sets a tracing callback invoked on every default-registry interaction.
///
/// # Example
/// ```rust
/// use once_registry::{clear_trace_callback, set_trace_callback};
///
/// set_trace_callback(|event| println!("[registry-trace] {}", event));
/// clear_trace_callback();
/// ```
pub fn set_trace_callback(callback: impl Fn(&RegistryEvent) + Send + Sync + 'static) {
    GLOBAL.set_trace_callback(callback)
}

/// Clears the tracing callback of the default registry.
pub fn clear_trace_callback() {
    GLOBAL.clear_trace_callback()
}

// -------------------------------------------------------------------------------------------------
// Tests
// -------------------------------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;
    use crate::RegistryError;
    use serial_test::serial;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Barrier;
    use std::thread;
    use std::time::Duration;

    #[test]
    #[serial]
    fn test_register_and_get_custom_type() {
        #[derive(Debug, PartialEq, Eq, Clone)]
        struct MyStruct {
            field: String,
        }

        let my_value = MyStruct {
            field: "test".into(),
        };
        register(my_value.clone()).unwrap();

        let retrieved: Arc<MyStruct> = get().unwrap();
        assert_eq!(&*retrieved, &my_value);
        assert_eq!(get_cloned::<MyStruct>().unwrap(), my_value);
    }

    #[test]
    #[serial]
    fn test_multiple_types() {
        #[derive(Debug, PartialEq, Eq, Clone)]
        struct Num(i32);
        #[derive(Debug, PartialEq, Eq, Clone)]
        struct Text(String);

        get_or_init(|| Num(42)).unwrap();
        get_or_init(|| Text("hello".to_string())).unwrap();

        assert_eq!(get::<Num>().unwrap().0, 42);
        assert_eq!(get::<Text>().unwrap().0, "hello");
    }

    #[test]
    #[serial]
    fn test_function_pointer_registration() {
        struct Doubler(fn(i32) -> i32);

        register(Doubler(|x| x * 2)).unwrap();

        let doubler: Arc<Doubler> = get().unwrap();
        assert_eq!((doubler.0)(21), 42);
    }

    #[test]
    #[serial]
    fn test_contains_never_constructs() {
        struct Lazy;
        static BUILDS: AtomicUsize = AtomicUsize::new(0);

        register_constructor(|| {
            BUILDS.fetch_add(1, Ordering::SeqCst);
            Ok::<_, RegistryError>(Lazy)
        })
        .unwrap();

        assert!(!contains::<Lazy>());
        assert_eq!(BUILDS.load(Ordering::SeqCst), 0);

        get::<Lazy>().unwrap();
        assert!(contains::<Lazy>());
        assert_eq!(BUILDS.load(Ordering::SeqCst), 1);
    }

    #[test]
    #[serial]
    fn test_concurrent_get_constructs_once() {
        struct Pool(usize);
        static BUILDS: AtomicUsize = AtomicUsize::new(0);

        register_constructor(|| {
            let n = BUILDS.fetch_add(1, Ordering::SeqCst);
            thread::sleep(Duration::from_millis(50));
            Ok::<_, RegistryError>(Pool(n))
        })
        .unwrap();

        let barrier = Arc::new(Barrier::new(4));
        let handles: Vec<_> = (0..4)
            .map(|_| {
                let barrier = barrier.clone();
                thread::spawn(move || {
                    barrier.wait();
                    get::<Pool>().unwrap()
                })
            })
            .collect();

        let pools: Vec<Arc<Pool>> = handles.into_iter().map(|h| h.join().unwrap()).collect();
        assert_eq!(BUILDS.load(Ordering::SeqCst), 1);
        assert!(pools.iter().all(|p| Arc::ptr_eq(p, &pools[0])));
        assert_eq!(pools[0].0, 0);
    }

    #[test]
    #[serial]
    fn test_trace_callback_invoked() {
        struct Counted;
        static COUNT: AtomicUsize = AtomicUsize::new(0);

        set_trace_callback(|_e| {
            COUNT.fetch_add(1, Ordering::SeqCst);
        });
        register(Counted).unwrap();
        clear_trace_callback();

        assert_eq!(COUNT.load(Ordering::SeqCst), 1);
    }
}
