//! Basic usage example for once-registry.
//!
//! Demonstrates:
//! - Seeding singletons eagerly with `register()`
//! - Lazy construction with `get_or_init()` and registered constructors
//! - Retrieving values with `get()` (returns `Arc<T>`) and `get_cloned()` (returns `T`)
//! - Checking initialization with `contains()`
//!
//! Run with: `cargo run --example basic_usage`

use once_registry::{define_registry, RegistryError};
use std::sync::Arc;

// Create an isolated registry for this example
define_registry!(app);

#[derive(Debug, Clone, PartialEq)]
struct AppConfig {
    name: String,
    version: u32,
    debug_mode: bool,
}

#[derive(Debug)]
struct Pool {
    size: usize,
}

fn main() -> Result<(), RegistryError> {
    println!("=== once-registry: Basic Usage ===\n");

    // -------------------------------------------------------------------------
    // 1. Seed a value eagerly
    // -------------------------------------------------------------------------
    println!("1. Registering AppConfig...");

    app::register(AppConfig {
        name: "MyApp".to_string(),
        version: 1,
        debug_mode: true,
    })?;

    // -------------------------------------------------------------------------
    // 2. Register a constructor; construction waits for the first get()
    // -------------------------------------------------------------------------
    println!("\n2. Registering a Pool constructor...");

    app::register_constructor(|| {
        println!("   constructing Pool...");
        Ok::<_, RegistryError>(Pool { size: 8 })
    })?;

    println!("   contains::<AppConfig>() = {}", app::contains::<AppConfig>());
    println!("   contains::<Pool>()      = {}", app::contains::<Pool>());

    // -------------------------------------------------------------------------
    // 3. Retrieve values with get() - returns Arc<T>
    // -------------------------------------------------------------------------
    println!("\n3. Retrieving values with get() -> Arc<T>...");

    let cfg: Arc<AppConfig> = app::get()?;
    let pool: Arc<Pool> = app::get()?;
    let pool_again: Arc<Pool> = app::get()?;

    println!("   AppConfig: {:?}", *cfg);
    println!(
        "   Pool:      size {} (same instance: {})",
        pool.size,
        Arc::ptr_eq(&pool, &pool_again)
    );

    // -------------------------------------------------------------------------
    // 4. Initialize at the call site with get_or_init()
    // -------------------------------------------------------------------------
    println!("\n4. Initializing a greeting with get_or_init()...");

    let greeting = app::get_or_init(|| "Hello, once-registry!".to_string())?;
    let ignored = app::get_or_init(|| "never built".to_string())?;
    println!("   {} / {}", greeting, ignored);

    // -------------------------------------------------------------------------
    // 5. Retrieve cloned values with get_cloned() - returns T
    // -------------------------------------------------------------------------
    println!("\n5. Retrieving a cloned value with get_cloned() -> T...");

    let cfg_owned: AppConfig = app::get_cloned()?;
    println!("   AppConfig (owned): {:?}", cfg_owned);

    // -------------------------------------------------------------------------
    // 6. Handle missing types gracefully
    // -------------------------------------------------------------------------
    println!("\n6. Handling missing types...");

    match app::get::<Vec<u8>>() {
        Ok(value) => println!("   Found Vec<u8>: {:?}", value),
        Err(e) => println!("   Error (expected): {}", e),
    }

    println!("\n=== Example Complete ===");
    Ok(())
}
