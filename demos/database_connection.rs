//! Registry-based singleton example for once-registry.
//!
//! Demonstrates:
//! - Types that construct themselves through the `Singleton` trait
//! - One instance per type in the default registry
//! - A constructor that fails once and is retried on the next request
//!
//! Run with: `RUST_LOG=debug cargo run --example database_connection`

use once_registry::{get, register_constructor, set_trace_callback, RegistryError, Singleton};
use std::convert::Infallible;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use tracing_subscriber::EnvFilter;

#[derive(Debug)]
struct DatabaseConnection {
    connection_string: String,
}

impl Singleton for DatabaseConnection {
    type Error = Infallible;

    fn construct() -> Result<Self, Infallible> {
        Ok(DatabaseConnection {
            connection_string: "localhost:27017".to_string(),
        })
    }
}

#[derive(Debug)]
struct Logger {
    log_file: String,
}

impl Singleton for Logger {
    type Error = Infallible;

    fn construct() -> Result<Self, Infallible> {
        Ok(Logger {
            log_file: "/var/log/app.log".to_string(),
        })
    }
}

/// Connection to a replica that refuses the first attempt.
#[derive(Debug)]
struct Replica {
    attempt: usize,
}

#[derive(Debug, thiserror::Error)]
#[error("replica not reachable (attempt {0})")]
struct ReplicaDown(usize);

fn main() -> Result<(), RegistryError> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .init();

    println!("=== once-registry: Registry-Based Singletons ===\n");

    set_trace_callback(|event| println!("   [registry-trace] {}", event));

    // -------------------------------------------------------------------------
    // 1. DatabaseConnection
    // -------------------------------------------------------------------------
    println!("1. Requesting DatabaseConnection twice...");

    let db1 = DatabaseConnection::instance()?;
    let db2 = DatabaseConnection::instance()?;

    println!("   db1 is db2: {}", Arc::ptr_eq(&db1, &db2));
    println!("   connection: {}", db1.connection_string);

    // -------------------------------------------------------------------------
    // 2. Logger, independent of the connection
    // -------------------------------------------------------------------------
    println!("\n2. Requesting Logger twice...");

    let l1 = Logger::instance()?;
    let l2 = Logger::instance()?;

    println!("   l1 is l2: {}", Arc::ptr_eq(&l1, &l2));
    println!("   log file: {}", l1.log_file);

    // -------------------------------------------------------------------------
    // 3. Failed construction is retried
    // -------------------------------------------------------------------------
    println!("\n3. Registering a Replica constructor that fails once...");

    static ATTEMPTS: AtomicUsize = AtomicUsize::new(0);
    register_constructor(|| {
        let attempt = ATTEMPTS.fetch_add(1, Ordering::SeqCst) + 1;
        if attempt == 1 {
            Err(ReplicaDown(attempt))
        } else {
            Ok(Replica { attempt })
        }
    })?;

    match get::<Replica>() {
        Ok(replica) => println!("   unexpected success: {:?}", replica),
        Err(err) => println!("   first request failed: {}", err),
    }

    let replica = get::<Replica>()?;
    println!("   second request succeeded on attempt {}", replica.attempt);

    println!("\n=== Example completed successfully! ===");
    Ok(())
}
