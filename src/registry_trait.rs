//! Core trait defining registry behavior.
//!
//! This module provides the `RegistryApi` trait with default implementations for
//! lazy, type-keyed singleton construction, seeding, lookup and tracing.
//!
//! The registry is type-based: each type (`TypeId`) owns one slot holding a
//! [`Holder`] and an optional registered constructor. A slot goes from empty to
//! ready exactly once and is never overwritten or cleared. The storage lock is
//! only held to find or create a slot; construction happens under the slot's
//! own lock, so a slow constructor for one type never blocks another type.

use std::any::{type_name, Any, TypeId};
use std::collections::HashMap;
use std::sync::{Arc, LazyLock};
use std::time::Duration;

use parking_lot::{Mutex, RwLock};

use crate::holder::{Holder, InitError};
use crate::registry_error::{BoxError, Result};
use crate::{RegistryError, RegistryEvent, Singleton};

/// Type alias for the user-supplied tracing callback.
///
/// The callback receives a reference to a `RegistryEvent` every time the registry is
/// interacted with. It must be thread-safe because registries are globally shared.
pub type TraceCallback = dyn Fn(&RegistryEvent) + Send + Sync + 'static;

/// Static storage for a registry's trace callback.
pub type TraceStorage = LazyLock<Mutex<Option<Arc<TraceCallback>>>>;

/// Static storage for a registry's per-type slots.
///
/// Values are type-erased slots; only this module knows their concrete type.
pub type SlotStorage = LazyLock<Mutex<HashMap<TypeId, Arc<dyn Any + Send + Sync>>>>;

type Constructor<T> = dyn Fn() -> std::result::Result<T, BoxError> + Send + Sync;

struct Slot<T> {
    holder: Holder<T>,
    constructor: RwLock<Option<Arc<Constructor<T>>>>,
}

impl<T> Slot<T> {
    fn new() -> Self {
        Slot {
            holder: Holder::new(),
            constructor: RwLock::new(None),
        }
    }
}

/// Core trait defining registry behavior.
///
/// Provides default implementations for all registry operations, requiring only
/// two accessor methods (`storage` and `trace`) to be implemented by the implementor.
pub trait RegistryApi {
    // -------------------------------------------------------------------------------------------------
    // Configuration
    // -------------------------------------------------------------------------------------------------

    /// Access the slot storage static.
    fn storage() -> &'static SlotStorage;

    /// Access the trace callback static.
    fn trace() -> &'static TraceStorage;

    /// Maximum time to wait for another caller's in-flight construction.
    ///
    /// `None` (the default) waits indefinitely.
    fn init_timeout() -> Option<Duration> {
        None
    }

    // -------------------------------------------------------------------------------------------------
    // Tracing
    // -------------------------------------------------------------------------------------------------

    /// Set a tracing callback for registry operations, replacing any previous one.
    ///
    /// The callback is invoked after the trace lock is released, so it may call
    /// into registries, including this one. Calling `get` for the type currently
    /// being constructed from a `Construct` event deadlocks, as would any
    /// reentrant construction of the same type.
    fn set_trace_callback(&self, callback: impl Fn(&RegistryEvent) + Send + Sync + 'static) {
        *Self::trace().lock() = Some(Arc::new(callback));
    }

    /// Clear the tracing callback.
    ///
    /// Registered values and constructors are not affected.
    fn clear_trace_callback(&self) {
        *Self::trace().lock() = None;
    }

    /// Emit a registry event using the current callback, if any.
    ///
    /// If the callback panics, the panic propagates to the caller.
    fn emit_event(&self, event: &RegistryEvent) {
        let callback = Self::trace().lock().clone();
        if let Some(callback) = callback {
            callback(event);
        }
    }

    // -------------------------------------------------------------------------------------------------
    // Registry
    // -------------------------------------------------------------------------------------------------

    /// Seed the singleton for `T` with `value`.
    ///
    /// # Errors
    ///
    /// - [`RegistryError::AlreadyInitialized`] if `T` already has a value; the
    ///   existing value is kept.
    fn register<T: Send + Sync + 'static>(&self, value: T) -> Result<()> {
        self.register_arc(Arc::new(value))
    }

    /// Seed the singleton for `T` with an Arc-wrapped value.
    ///
    /// More efficient than `register` when you already have an `Arc`. If a
    /// construction for `T` is in flight, waits for it (bounded by
    /// [`init_timeout`](Self::init_timeout)) and then fails.
    ///
    /// # Errors
    ///
    /// - [`RegistryError::AlreadyInitialized`] if `T` already has a value
    /// - [`RegistryError::Timeout`] if the registry has an init timeout and an
    ///   in-flight construction outlasted it
    fn register_arc<T: Send + Sync + 'static>(&self, value: Arc<T>) -> Result<()> {
        let type_name = type_name::<T>();
        self.emit_event(&RegistryEvent::Register { type_name });

        let rejected = || {
            tracing::debug!(type_name, "rejected registration of initialized singleton");
            RegistryError::AlreadyInitialized { type_name }
        };

        let slot = slot_for::<Self, T>()?;
        match Self::init_timeout() {
            None => slot.holder.set(value).map_err(|_| rejected()),
            Some(timeout) => slot.holder.set_timeout(value, timeout).map_err(|err| match err {
                InitError::TimedOut(timeout) => timed_out(type_name, timeout),
                InitError::Failed(_) => rejected(),
            }),
        }
    }

    /// Associate a zero-argument constructor with `T`.
    ///
    /// [`get`](Self::get) runs it on first request. Replacing the constructor of
    /// an initialized type has no effect on the stored value.
    fn register_constructor<T, E, F>(&self, constructor: F) -> Result<()>
    where
        T: Send + Sync + 'static,
        E: Into<BoxError>,
        F: Fn() -> std::result::Result<T, E> + Send + Sync + 'static,
    {
        let type_name = type_name::<T>();
        self.emit_event(&RegistryEvent::RegisterConstructor { type_name });

        let slot = slot_for::<Self, T>()?;
        let constructor: Arc<Constructor<T>> =
            Arc::new(move || -> std::result::Result<T, BoxError> { constructor().map_err(Into::into) });
        *slot.constructor.write() = Some(constructor);
        Ok(())
    }

    /// Retrieve the singleton for `T`, constructing it with the registered
    /// constructor on first request.
    ///
    /// If another caller is constructing `T` (through any entry point), waits
    /// for it before deciding; an in-flight construction is never reported as
    /// a missing constructor. Looking up an unknown type does not allocate a
    /// slot for it.
    ///
    /// # Errors
    ///
    /// - [`RegistryError::ConstructorNotFound`] if `T` has neither a value nor
    ///   a registered constructor
    /// - [`RegistryError::Construction`] if the constructor failed; the next
    ///   call retries
    /// - [`RegistryError::Timeout`] if the registry has an init timeout and it
    ///   elapsed
    fn get<T: Send + Sync + 'static>(&self) -> Result<Arc<T>> {
        let type_name = type_name::<T>();

        let result = match existing_slot::<Self, T>() {
            None => Err(RegistryError::ConstructorNotFound { type_name }),
            Some(slot) => match slot.holder.get() {
                Some(value) => Ok(value),
                None => lock_and_init::<Self, T, _>(&slot, || {
                    let constructor = slot.constructor.read().clone();
                    match constructor {
                        Some(constructor) => construct(self, type_name, || constructor()),
                        None => Err(RegistryError::ConstructorNotFound { type_name }),
                    }
                }),
            },
        };

        self.emit_event(&RegistryEvent::Get {
            type_name,
            found: result.is_ok(),
        });

        result
    }

    /// Retrieve the singleton for `T`, constructing it with `init` on first
    /// request. `init` is not run if `T` is already initialized.
    fn get_or_init<T, F>(&self, init: F) -> Result<Arc<T>>
    where
        T: Send + Sync + 'static,
        F: FnOnce() -> T,
    {
        self.get_or_try_init(|| Ok::<T, std::convert::Infallible>(init()))
    }

    /// Retrieve the singleton for `T`, constructing it with the fallible `init`
    /// on first request.
    ///
    /// A failure is reported only to this caller and leaves `T` uninitialized.
    fn get_or_try_init<T, E, F>(&self, init: F) -> Result<Arc<T>>
    where
        T: Send + Sync + 'static,
        E: Into<BoxError>,
        F: FnOnce() -> std::result::Result<T, E>,
    {
        let type_name = type_name::<T>();
        let result = slot_for::<Self, T>().and_then(|slot| {
            lock_and_init::<Self, T, _>(&slot, || {
                construct(self, type_name, || init().map_err(Into::into))
            })
        });

        self.emit_event(&RegistryEvent::Get {
            type_name,
            found: result.is_ok(),
        });

        result
    }

    /// Retrieve the singleton for a [`Singleton`] type, constructing it with
    /// [`Singleton::construct`] on first request.
    fn instance<T: Singleton>(&self) -> Result<Arc<T>> {
        self.get_or_try_init(T::construct)
    }

    /// Retrieve a cloned value from the registry.
    ///
    /// Constructs `T` with its registered constructor if needed, like [`get`](Self::get).
    fn get_cloned<T: Send + Sync + Clone + 'static>(&self) -> Result<T> {
        let arc = self.get::<T>()?;
        Ok((*arc).clone())
    }

    /// Check whether the singleton for `T` is initialized. Never constructs.
    fn contains<T: Send + Sync + 'static>(&self) -> bool {
        let found = Self::storage()
            .lock()
            .get(&TypeId::of::<T>())
            .and_then(|slot| slot.downcast_ref::<Slot<T>>())
            .is_some_and(|slot| slot.holder.is_initialized());

        self.emit_event(&RegistryEvent::Contains {
            type_name: type_name::<T>(),
            found,
        });

        found
    }
}

/// Find or create the slot for `T`. The storage lock is released on return.
fn slot_for<R, T>() -> Result<Arc<Slot<T>>>
where
    R: RegistryApi + ?Sized,
    T: Send + Sync + 'static,
{
    let erased = R::storage()
        .lock()
        .entry(TypeId::of::<T>())
        .or_insert_with(|| Arc::new(Slot::<T>::new()) as Arc<dyn Any + Send + Sync>)
        .clone();

    erased
        .downcast::<Slot<T>>()
        .map_err(|_| RegistryError::TypeMismatch {
            type_name: type_name::<T>(),
        })
}

/// Look up the slot for `T` without creating one.
fn existing_slot<R, T>() -> Option<Arc<Slot<T>>>
where
    R: RegistryApi + ?Sized,
    T: Send + Sync + 'static,
{
    let erased = R::storage().lock().get(&TypeId::of::<T>())?.clone();
    erased.downcast::<Slot<T>>().ok()
}

/// Double-checked initialization of `slot`: `init` runs under the slot's lock
/// only if the slot is still empty once the lock is taken.
///
/// Waiting for the lock is bounded by the registry's init timeout, if any.
fn lock_and_init<R, T, F>(slot: &Slot<T>, init: F) -> Result<Arc<T>>
where
    R: RegistryApi + ?Sized,
    T: Send + Sync + 'static,
    F: FnOnce() -> Result<T>,
{
    match R::init_timeout() {
        None => slot.holder.get_or_try_init(init),
        Some(timeout) => slot
            .holder
            .get_or_try_init_timeout(timeout, init)
            .map_err(|err| match err {
                InitError::TimedOut(timeout) => timed_out(type_name::<T>(), timeout),
                InitError::Failed(err) => err,
            }),
    }
}

/// Run a constructor, reporting it through events and logs.
fn construct<R, T, F>(registry: &R, type_name: &'static str, init: F) -> Result<T>
where
    R: RegistryApi + ?Sized,
    F: FnOnce() -> std::result::Result<T, BoxError>,
{
    registry.emit_event(&RegistryEvent::Construct { type_name });
    tracing::debug!(type_name, "constructing singleton");

    match init() {
        Ok(value) => {
            tracing::debug!(type_name, "singleton constructed");
            Ok(value)
        }
        Err(source) => {
            tracing::warn!(type_name, error = %source, "singleton construction failed");
            registry.emit_event(&RegistryEvent::ConstructFailed { type_name });
            Err(RegistryError::construction(type_name, source))
        }
    }
}

fn timed_out(type_name: &'static str, timeout: Duration) -> RegistryError {
    tracing::warn!(type_name, ?timeout, "timed out waiting for singleton construction");
    RegistryError::Timeout { type_name, timeout }
}

// -------------------------------------------------------------------------------------------------
// Tests
// -------------------------------------------------------------------------------------------------
