//! Single-slot lazily initialized singleton.
//!
//! [`Holder`] performs double-checked initialization: an unlocked read of the
//! published value, then a lock scoped to this holder, then a second read under
//! the lock before the constructor runs. Once a value is stored it is never
//! replaced or cleared.
//!
//! ```rust
//! use once_registry::Holder;
//!
//! struct Connection {
//!     url: String,
//! }
//!
//! static CONNECTION: Holder<Connection> = Holder::new();
//!
//! let first = CONNECTION.get_or_init(|| Connection {
//!     url: "localhost:27017".to_string(),
//! });
//! let second = CONNECTION.get_or_init(|| unreachable!());
//!
//! assert!(std::sync::Arc::ptr_eq(&first, &second));
//! assert_eq!(second.url, "localhost:27017");
//! ```

use std::convert::Infallible;
use std::fmt;
use std::sync::{Arc, OnceLock};
use std::time::Duration;

use parking_lot::Mutex;
use thiserror::Error;

/// Error returned by [`Holder::get_or_try_init_timeout`].
#[derive(Debug, Error, PartialEq)]
pub enum InitError<E> {
    /// Another caller held the initialization lock for longer than the timeout.
    #[error("timed out after {0:?} waiting for initialization")]
    TimedOut(Duration),

    /// The constructor returned an error.
    #[error("initialization failed: {0}")]
    Failed(E),
}

/// A slot that is empty until its first successful initialization.
///
/// Values are handed out as `Arc<T>`, so every caller observes the same
/// allocation. A failed or panicking constructor leaves the holder empty and
/// the next caller retries.
pub struct Holder<T> {
    value: OnceLock<Arc<T>>,
    init_lock: Mutex<()>,
}

impl<T> Holder<T> {
    /// Creates an empty holder. Usable in `static` items.
    pub const fn new() -> Self {
        Holder {
            value: OnceLock::new(),
            init_lock: Mutex::new(()),
        }
    }

    /// Returns the value if initialized. Never blocks.
    pub fn get(&self) -> Option<Arc<T>> {
        self.value.get().cloned()
    }

    /// Returns `true` once a value has been stored. Never blocks.
    pub fn is_initialized(&self) -> bool {
        self.value.get().is_some()
    }

    /// Returns the value, constructing it with `init` on first use.
    pub fn get_or_init(&self, init: impl FnOnce() -> T) -> Arc<T> {
        match self.get_or_try_init(|| Ok::<T, Infallible>(init())) {
            Ok(value) => value,
            Err(never) => match never {},
        }
    }

    /// Returns the value, constructing it with the fallible `init` on first use.
    ///
    /// If `init` fails the error is returned to this caller only and the holder
    /// stays empty. Callers blocked on the lock meanwhile re-check and run their
    /// own constructor.
    pub fn get_or_try_init<E>(&self, init: impl FnOnce() -> Result<T, E>) -> Result<Arc<T>, E> {
        if let Some(value) = self.value.get() {
            return Ok(value.clone());
        }

        let _guard = self.init_lock.lock();
        self.init_locked(init)
    }

    /// Like [`get_or_try_init`](Self::get_or_try_init), but waits at most
    /// `timeout` for the initialization lock.
    ///
    /// The timeout bounds only the wait for another caller's construction; once
    /// the lock is taken, `init` runs to completion.
    pub fn get_or_try_init_timeout<E>(
        &self,
        timeout: Duration,
        init: impl FnOnce() -> Result<T, E>,
    ) -> Result<Arc<T>, InitError<E>> {
        if let Some(value) = self.value.get() {
            return Ok(value.clone());
        }

        let Some(_guard) = self.init_lock.try_lock_for(timeout) else {
            return Err(InitError::TimedOut(timeout));
        };
        self.init_locked(init).map_err(InitError::Failed)
    }

    /// Stores `value` if the holder is empty.
    ///
    /// Returns the rejected value if the holder was already initialized. Waits
    /// for an in-flight construction to finish first.
    pub fn set(&self, value: Arc<T>) -> Result<(), Arc<T>> {
        if self.is_initialized() {
            return Err(value);
        }

        let _guard = self.init_lock.lock();
        self.value.set(value)
    }

    /// Like [`set`](Self::set), but waits at most `timeout` for an in-flight
    /// construction. A rejected value comes back in [`InitError::Failed`].
    pub fn set_timeout(&self, value: Arc<T>, timeout: Duration) -> Result<(), InitError<Arc<T>>> {
        if self.is_initialized() {
            return Err(InitError::Failed(value));
        }

        let Some(_guard) = self.init_lock.try_lock_for(timeout) else {
            return Err(InitError::TimedOut(timeout));
        };
        self.value.set(value).map_err(InitError::Failed)
    }

    // Caller holds `init_lock`.
    fn init_locked<E>(&self, init: impl FnOnce() -> Result<T, E>) -> Result<Arc<T>, E> {
        if let Some(value) = self.value.get() {
            return Ok(value.clone());
        }

        let value = Arc::new(init()?);
        Ok(self.value.get_or_init(|| value).clone())
    }
}

impl<T> Default for Holder<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T: fmt::Debug> fmt::Debug for Holder<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.value.get() {
            Some(value) => f.debug_tuple("Holder").field(value).finish(),
            None => f.write_str("Holder(<uninit>)"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::panic::{self, AssertUnwindSafe};
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::{mpsc, Barrier};
    use std::thread;

    #[test]
    fn test_empty_until_initialized() {
        let holder: Holder<i32> = Holder::new();
        assert!(!holder.is_initialized());
        assert!(holder.get().is_none());

        let value = holder.get_or_init(|| 7);
        assert_eq!(*value, 7);
        assert!(holder.is_initialized());
        assert_eq!(holder.get().as_deref(), Some(&7));
    }

    #[test]
    fn test_constructor_runs_once() {
        let holder = Holder::new();
        let calls = AtomicUsize::new(0);

        let first = holder.get_or_init(|| {
            calls.fetch_add(1, Ordering::SeqCst);
            "client".to_string()
        });
        let second = holder.get_or_init(|| {
            calls.fetch_add(1, Ordering::SeqCst);
            "other".to_string()
        });

        assert!(Arc::ptr_eq(&first, &second));
        assert_eq!(&*second, "client");
        assert_eq!(calls.load(Ordering::SeqCst), 1);
    }

    #[test]
    fn test_concurrent_callers_share_one_instance() {
        const THREADS: usize = 8;

        let holder = Arc::new(Holder::new());
        let barrier = Arc::new(Barrier::new(THREADS));
        let calls = Arc::new(AtomicUsize::new(0));

        let handles: Vec<_> = (0..THREADS)
            .map(|_| {
                let holder = holder.clone();
                let barrier = barrier.clone();
                let calls = calls.clone();
                thread::spawn(move || {
                    barrier.wait();
                    holder.get_or_init(|| {
                        calls.fetch_add(1, Ordering::SeqCst);
                        thread::sleep(Duration::from_millis(20));
                        vec![1u8, 2, 3]
                    })
                })
            })
            .collect();

        let results: Vec<Arc<Vec<u8>>> = handles.into_iter().map(|h| h.join().unwrap()).collect();

        assert_eq!(calls.load(Ordering::SeqCst), 1);
        for value in &results[1..] {
            assert!(Arc::ptr_eq(&results[0], value));
        }
    }

    #[test]
    fn test_failure_leaves_holder_empty() {
        let holder: Holder<u32> = Holder::new();

        let result = holder.get_or_try_init(|| Err("unreachable host"));
        assert_eq!(result, Err("unreachable host"));
        assert!(!holder.is_initialized());

        let value = holder.get_or_try_init(|| Ok::<_, &str>(5)).unwrap();
        assert_eq!(*value, 5);
    }

    #[test]
    fn test_panic_leaves_holder_empty() {
        let holder: Holder<u32> = Holder::new();

        let outcome = panic::catch_unwind(AssertUnwindSafe(|| {
            holder.get_or_init(|| panic!("constructor exploded"));
        }));
        assert!(outcome.is_err());
        assert!(!holder.is_initialized());

        // The lock was released during unwinding.
        assert_eq!(*holder.get_or_init(|| 9), 9);
    }

    #[test]
    fn test_timeout_while_other_caller_constructs() {
        let holder: Arc<Holder<u32>> = Arc::new(Holder::new());
        let (started_tx, started_rx) = mpsc::channel();
        let (release_tx, release_rx) = mpsc::channel::<()>();

        let builder = {
            let holder = holder.clone();
            thread::spawn(move || {
                holder.get_or_init(|| {
                    started_tx.send(()).unwrap();
                    release_rx.recv().unwrap();
                    1
                })
            })
        };

        started_rx.recv().unwrap();
        let waited = holder.get_or_try_init_timeout(Duration::from_millis(10), || Ok::<_, ()>(2));
        assert_eq!(waited, Err(InitError::TimedOut(Duration::from_millis(10))));

        release_tx.send(()).unwrap();
        assert_eq!(*builder.join().unwrap(), 1);

        let ready = holder.get_or_try_init_timeout(Duration::from_millis(10), || Ok::<_, ()>(2));
        assert_eq!(ready.map(|v| *v), Ok(1));
    }

    #[test]
    fn test_timeout_reports_constructor_error() {
        let holder: Holder<u32> = Holder::new();
        let result = holder.get_or_try_init_timeout(Duration::from_millis(10), || Err("boom"));
        assert_eq!(result, Err(InitError::Failed("boom")));
        assert!(!holder.is_initialized());
    }

    #[test]
    fn test_set_never_overwrites() {
        let holder = Holder::new();
        assert!(holder.set(Arc::new(1)).is_ok());

        let rejected = holder.set(Arc::new(2)).unwrap_err();
        assert_eq!(*rejected, 2);
        assert_eq!(*holder.get_or_init(|| 3), 1);
    }

    #[test]
    fn test_set_timeout_while_other_caller_constructs() {
        let holder: Arc<Holder<u32>> = Arc::new(Holder::new());
        let (started_tx, started_rx) = mpsc::channel();
        let (release_tx, release_rx) = mpsc::channel::<()>();

        let builder = {
            let holder = holder.clone();
            thread::spawn(move || {
                holder.get_or_init(|| {
                    started_tx.send(()).unwrap();
                    release_rx.recv().unwrap();
                    1
                })
            })
        };

        started_rx.recv().unwrap();
        let waited = holder.set_timeout(Arc::new(2), Duration::from_millis(10));
        assert_eq!(waited, Err(InitError::TimedOut(Duration::from_millis(10))));

        release_tx.send(()).unwrap();
        assert_eq!(*builder.join().unwrap(), 1);

        match holder.set_timeout(Arc::new(3), Duration::from_millis(10)) {
            Err(InitError::Failed(rejected)) => assert_eq!(*rejected, 3),
            other => panic!("expected rejection, got {other:?}"),
        }
        assert_eq!(holder.get().as_deref(), Some(&1));
    }

    #[test]
    fn test_set_timeout_on_empty_holder() {
        let holder = Holder::new();
        assert_eq!(holder.set_timeout(Arc::new("seed"), Duration::from_millis(10)), Ok(()));
        assert_eq!(holder.get().as_deref(), Some(&"seed"));
    }

    #[test]
    fn test_debug_format() {
        let holder: Holder<i32> = Holder::new();
        assert_eq!(format!("{:?}", holder), "Holder(<uninit>)");
        holder.get_or_init(|| 4);
        assert_eq!(format!("{:?}", holder), "Holder(4)");
    }
}
