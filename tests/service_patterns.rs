//! Integration tests for real-world singleton patterns.
//!
//! Services that construct themselves (`Singleton`), trait-object services
//! behind a concrete wrapper, and shared mutable state behind a lock.

use once_registry::{define_registry, RegistryError, Singleton};
use std::convert::Infallible;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};

define_registry!(services);

trait Logger: Send + Sync {
    fn name(&self) -> &str;
}

struct ConsoleLogger;

impl Logger for ConsoleLogger {
    fn name(&self) -> &str {
        "ConsoleLogger"
    }
}

/// Trait objects are not `Sized`, so the registry keys them by a wrapper type.
struct AppLogger(Box<dyn Logger>);

#[derive(Debug, Clone, PartialEq)]
struct AppConfig {
    database_url: String,
    max_connections: u32,
}

static CONFIG_BUILDS: AtomicUsize = AtomicUsize::new(0);

impl Singleton for AppConfig {
    type Error = Infallible;

    fn construct() -> Result<Self, Infallible> {
        CONFIG_BUILDS.fetch_add(1, Ordering::SeqCst);
        Ok(AppConfig {
            database_url: "postgresql://localhost/mydb".to_string(),
            max_connections: 100,
        })
    }
}

#[test]
fn test_configuration_pattern() {
    let c1 = services::instance::<AppConfig>().unwrap();
    let c2 = services::instance::<AppConfig>().unwrap();

    assert!(Arc::ptr_eq(&c1, &c2));
    assert_eq!(c1.max_connections, 100);
    assert_eq!(CONFIG_BUILDS.load(Ordering::SeqCst), 1);

    // `get` finds the instance built through the trait.
    let via_get: AppConfig = services::get_cloned().unwrap();
    assert_eq!(via_get.database_url, "postgresql://localhost/mydb");
}

#[test]
fn test_trait_object_service() {
    services::register_constructor(|| Ok::<_, Infallible>(AppLogger(Box::new(ConsoleLogger))))
        .unwrap();

    let logger = services::get::<AppLogger>().unwrap();
    assert_eq!(logger.0.name(), "ConsoleLogger");
}

#[test]
fn test_shared_state_pattern() {
    struct Counter(Mutex<i32>);

    let first = services::get_or_init(|| Counter(Mutex::new(0))).unwrap();
    *first.0.lock().unwrap() += 10;

    let second = services::get_or_init(|| Counter(Mutex::new(-1))).unwrap();
    *second.0.lock().unwrap() += 32;

    assert_eq!(*first.0.lock().unwrap(), 42);
}

#[test]
fn test_service_locator_pattern() {
    struct DatabaseService {
        connection_string: String,
    }

    struct CacheService {
        redis_url: String,
    }

    services::register(DatabaseService {
        connection_string: "postgres://localhost".to_string(),
    })
    .unwrap();
    services::register_constructor(|| {
        Ok::<_, RegistryError>(CacheService {
            redis_url: "redis://localhost".to_string(),
        })
    })
    .unwrap();

    let db = services::get::<DatabaseService>().unwrap();
    let cache = services::get::<CacheService>().unwrap();

    assert_eq!(db.connection_string, "postgres://localhost");
    assert_eq!(cache.redis_url, "redis://localhost");
}

#[test]
fn test_singleton_instance_uses_default_registry() {
    struct Clock {
        zone: &'static str,
    }

    impl Singleton for Clock {
        type Error = Infallible;

        fn construct() -> Result<Self, Infallible> {
            Ok(Clock { zone: "UTC" })
        }
    }

    let clock = Clock::instance().unwrap();
    assert_eq!(clock.zone, "UTC");
    assert!(once_registry::contains::<Clock>());

    // The isolated registry has its own, still uninitialized, slot.
    assert!(!services::contains::<Clock>());
}
