//! # Once Registry
//!
//! Thread-safe lazy singletons: each value is constructed at most once, on first
//! request, and shared as an `Arc` for the rest of the process.
//!
//! Two building blocks are provided:
//!
//! - [`Holder`] - a single slot with double-checked initialization, usable in a `static`
//! - [`RegistryApi`] - a per-type registry of holders, either the default global
//!   registry (crate-level free functions) or isolated ones from [`define_registry!`]
//!
//! ## Quick Start
//!
//! ```rust
//! use once_registry::{get, register_constructor};
//! use std::sync::Arc;
//!
//! struct DatabaseConnection {
//!     connection_string: String,
//! }
//!
//! register_constructor(|| {
//!     Ok::<_, std::io::Error>(DatabaseConnection {
//!         connection_string: "localhost:27017".to_string(),
//!     })
//! })
//! .unwrap();
//!
//! let db1: Arc<DatabaseConnection> = get().unwrap();
//! let db2: Arc<DatabaseConnection> = get().unwrap();
//! assert!(Arc::ptr_eq(&db1, &db2));
//! ```
//!
//! ## Guarantees
//!
//! - **Once per key**: concurrent first callers block until one of them has
//!   constructed the value; all of them receive the same `Arc`
//! - **No poisoning**: a failed or panicking constructor leaves the slot empty
//!   and the next caller retries
//! - **Never reset**: an initialized slot is never overwritten or cleared
//! - **Independent keys**: constructing one type never blocks another
//!
//! ## Main Functions
//!
//! - [`get`] - Retrieve a singleton, running its registered constructor on first use
//! - [`get_or_init`] / [`get_or_try_init`] - Retrieve with a call-site constructor
//! - [`instance`] / [`Singleton::instance`] - Retrieve a type that constructs itself
//! - [`register`] / [`register_arc`] - Seed a singleton eagerly
//! - [`register_constructor`] - Associate a zero-argument constructor with a type
//! - [`contains`] - Check if a singleton is initialized
//! - [`set_trace_callback`] - Observe registry operations

mod holder;
mod macros;
mod registry;
mod registry_error;
mod registry_event;
mod registry_trait;
mod singleton;

pub use holder::{Holder, InitError};
pub use registry::{
    clear_trace_callback, contains, get, get_cloned, get_or_init, get_or_try_init, instance,
    register, register_arc, register_constructor, set_trace_callback, GlobalRegistry, GLOBAL,
};
pub use registry_error::{BoxError, RegistryError, Result};
pub use registry_event::RegistryEvent;
pub use registry_trait::{RegistryApi, SlotStorage, TraceCallback, TraceStorage};
pub use singleton::Singleton;
