//! Double-checked singleton example for once-registry.
//!
//! Demonstrates:
//! - A `static` `Holder` initialized on first use
//! - Several threads racing for the first access; the creation message prints once
//! - Every thread receives the same instance
//!
//! Run with: `RUST_LOG=debug cargo run --example double_checked`

use once_registry::Holder;
use std::sync::{Arc, Barrier};
use std::thread;
use std::time::Duration;
use tracing_subscriber::EnvFilter;

/// The shared client session.
#[derive(Debug)]
struct Session {
    client: String,
}

static SESSION: Holder<Session> = Holder::new();

fn session() -> Arc<Session> {
    SESSION.get_or_init(|| {
        println!("   OBJ DOES NOT EXIST, CREATING IT");
        thread::sleep(Duration::from_millis(50));
        Session {
            client: "Raj".to_string(),
        }
    })
}

fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .init();

    println!("=== once-registry: Double-Checked Singleton ===\n");

    // -------------------------------------------------------------------------
    // 1. Sequential access
    // -------------------------------------------------------------------------
    println!("1. Initialized before first use? {}", SESSION.is_initialized());

    // -------------------------------------------------------------------------
    // 2. Concurrent first access
    // -------------------------------------------------------------------------
    println!("\n2. Four threads request the session at the same time...");

    let barrier = Arc::new(Barrier::new(4));
    let handles: Vec<_> = (0..4)
        .map(|i| {
            let barrier = barrier.clone();
            thread::spawn(move || {
                barrier.wait();
                let s = session();
                println!("   thread {i} got client {}", s.client);
                s
            })
        })
        .collect();

    let sessions: Vec<Arc<Session>> = handles
        .into_iter()
        .map(|h| h.join().expect("worker thread panicked"))
        .collect();

    // -------------------------------------------------------------------------
    // 3. Identity check
    // -------------------------------------------------------------------------
    let same = sessions.iter().all(|s| Arc::ptr_eq(s, &sessions[0]));
    println!("\n3. All threads share one instance: {same}");
    println!("   Later call is the same object: {}", Arc::ptr_eq(&session(), &sessions[0]));

    println!("\n=== Example completed successfully! ===");
}
