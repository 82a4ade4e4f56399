//! Trait contracts example for once-registry.
//!
//! Demonstrates the **contract-based** singleton pattern:
//! - Define traits (contracts) that specify behavior
//! - Register a constructor that picks the concrete implementation once
//! - Retrieve and use the shared `Arc<dyn Trait>` via trait methods
//! - A contract cannot be swapped after it was constructed
//!
//! Run with: `cargo run --example trait_contracts`
//! (set `NOTIFIER=sms` to pick the other notifier)

use once_registry::{define_registry, RegistryError};
use std::convert::Infallible;
use std::sync::Arc;

// Create an isolated registry for this example
define_registry!(services);

// =============================================================================
// Contract Definitions (Traits)
// =============================================================================

/// Contract for a logging service.
trait Logger: Send + Sync {
    fn log(&self, message: &str);
    fn name(&self) -> &str;
}

/// Contract for a notification service.
trait Notifier: Send + Sync {
    fn notify(&self, recipient: &str, message: &str);
    fn service_type(&self) -> &str;
}

// =============================================================================
// Concrete Implementations
// =============================================================================

struct ConsoleLogger;

impl Logger for ConsoleLogger {
    fn log(&self, message: &str) {
        println!("[CONSOLE] {}", message);
    }

    fn name(&self) -> &str {
        "ConsoleLogger"
    }
}

struct FileLogger {
    path: String,
}

impl Logger for FileLogger {
    fn log(&self, message: &str) {
        println!("[FILE:{}] {}", self.path, message);
    }

    fn name(&self) -> &str {
        "FileLogger"
    }
}

struct EmailNotifier {
    smtp_server: String,
}

impl Notifier for EmailNotifier {
    fn notify(&self, recipient: &str, message: &str) {
        println!(
            "[EMAIL via {}] To: {} - {}",
            self.smtp_server, recipient, message
        );
    }

    fn service_type(&self) -> &str {
        "Email"
    }
}

struct SmsNotifier {
    api_key: String,
}

impl Notifier for SmsNotifier {
    fn notify(&self, recipient: &str, message: &str) {
        println!(
            "[SMS via API:{}] To: {} - {}",
            &self.api_key[..8],
            recipient,
            message
        );
    }

    fn service_type(&self) -> &str {
        "SMS"
    }
}

// =============================================================================
// Application Code (Uses Contracts, Not Implementations)
// =============================================================================

/// Business logic that depends on Logger and Notifier contracts.
fn process_order(order_id: u32) -> Result<(), RegistryError> {
    let logger = services::get::<Arc<dyn Logger>>()?;
    let notifier = services::get::<Arc<dyn Notifier>>()?;

    logger.log(&format!("Processing order #{}", order_id));
    logger.log("Order confirmed!");

    notifier.notify("customer@example.com", &format!("Order #{} confirmed!", order_id));
    Ok(())
}

fn main() -> Result<(), RegistryError> {
    println!("=== once-registry: Trait Contracts ===\n");

    // -------------------------------------------------------------------------
    // 1. Register constructors; nothing is built yet
    // -------------------------------------------------------------------------
    println!("1. Registering contract constructors...");

    services::register(Arc::new(ConsoleLogger) as Arc<dyn Logger>)?;

    services::register_constructor(|| {
        let notifier: Arc<dyn Notifier> = match std::env::var("NOTIFIER").as_deref() {
            Ok("sms") => Arc::new(SmsNotifier {
                api_key: "sk_live_abc123xyz789".to_string(),
            }),
            _ => Arc::new(EmailNotifier {
                smtp_server: "smtp.example.com".to_string(),
            }),
        };
        Ok::<_, Infallible>(notifier)
    })?;

    println!(
        "   Notifier constructed yet? {}",
        services::contains::<Arc<dyn Notifier>>()
    );

    // -------------------------------------------------------------------------
    // 2. Use the contracts (business logic is decoupled)
    // -------------------------------------------------------------------------
    println!("\n2. Processing orders...\n");

    process_order(1001)?;
    process_order(1002)?;

    // -------------------------------------------------------------------------
    // 3. Contracts are fixed once constructed
    // -------------------------------------------------------------------------
    println!("\n3. Trying to swap the logger...");

    let swap = services::register(Arc::new(FileLogger {
        path: "/var/log/app.log".to_string(),
    }) as Arc<dyn Logger>);

    match swap {
        Ok(()) => println!("   unexpected: logger replaced"),
        Err(err) => println!("   rejected: {}", err),
    }

    let logger = services::get::<Arc<dyn Logger>>()?;
    let notifier = services::get::<Arc<dyn Notifier>>()?;

    println!("   Current Logger: {}", logger.name());
    println!("   Current Notifier: {}", notifier.service_type());

    println!("\n=== Example Complete ===");
    Ok(())
}
