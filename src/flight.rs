//! # Call Coalescing
//!
//! [`CallCoalescer`] runs at most one computation per key at a time. The
//! first caller for a key becomes the executor; callers arriving while it runs
//! block until it finishes and receive a clone of the same result.
//!
//! ## Call Lifecycle
//!
//! ```text
//!   caller A: call("k", f)           caller B: call("k", g)
//!     lock calls                         │
//!     no record → insert Call(Pending)   │
//!     unlock                             │
//!     run f() ...                        lock calls
//!        │                               record found → clone Arc<Call>
//!        │                               unlock, wait on Call.done
//!     state = Done(result)               │
//!     notify_all ───────────────────────►│ wakes, clones result
//!     lock calls, remove "k", unlock     │
//!     return result                      return result (g never runs)
//! ```
//!
//! The record is removed as soon as the executor finishes, so nothing is
//! cached here: the next call for the key after removal runs again, and an
//! error is never replayed beyond the callers that overlapped it.
//!
//! If the executor panics, the record is removed and then marked abandoned
//! before the panic propagates; each waiter then retries as if it had arrived
//! fresh, so a panic never leaves a key blocked.

use std::fmt;
use std::sync::Arc;

use parking_lot::{Condvar, Mutex};
use rustc_hash::FxHashMap;

enum CallState<T, E> {
    Pending,
    Done(Result<T, E>),
    Abandoned,
}

struct Call<T, E> {
    state: Mutex<CallState<T, E>>,
    done: Condvar,
}

impl<T: Clone, E: Clone> Call<T, E> {
    fn new() -> Self {
        Self {
            state: Mutex::new(CallState::Pending),
            done: Condvar::new(),
        }
    }

    /// Blocks until the executor finishes. `None` means it panicked.
    fn wait(&self) -> Option<Result<T, E>> {
        let mut state = self.state.lock();
        loop {
            match &*state {
                CallState::Pending => self.done.wait(&mut state),
                CallState::Done(result) => return Some(result.clone()),
                CallState::Abandoned => return None,
            }
        }
    }
}

type CallMap<T, E> = Mutex<FxHashMap<String, Arc<Call<T, E>>>>;

/// Deduplicates concurrent calls that share a key.
///
/// # Example
///
/// ```
/// use peercache::CallCoalescer;
///
/// let flights: CallCoalescer<u32, String> = CallCoalescer::new();
/// let value = flights.call("answer", || Ok(42));
/// assert_eq!(value, Ok(42));
/// assert_eq!(flights.in_flight(), 0);
/// ```
pub struct CallCoalescer<T, E> {
    calls: CallMap<T, E>,
}

impl<T: Clone, E: Clone> CallCoalescer<T, E> {
    pub fn new() -> Self {
        Self {
            calls: Mutex::new(FxHashMap::default()),
        }
    }

    /// Runs `f` unless a call for `key` is already in flight, in which case
    /// the in-flight result is shared instead.
    pub fn call<F>(&self, key: &str, f: F) -> Result<T, E>
    where
        F: FnOnce() -> Result<T, E>,
    {
        self.call_shared(key, f).0
    }

    /// Like [`call`](Self::call), additionally reporting whether the result
    /// came from another caller's execution.
    pub fn call_shared<F>(&self, key: &str, f: F) -> (Result<T, E>, bool)
    where
        F: FnOnce() -> Result<T, E>,
    {
        loop {
            let mut calls = self.calls.lock();
            if let Some(call) = calls.get(key).map(Arc::clone) {
                drop(calls);
                match call.wait() {
                    Some(result) => return (result, true),
                    None => continue,
                }
            }

            let call = Arc::new(Call::new());
            calls.insert(key.to_owned(), Arc::clone(&call));
            drop(calls);

            let mut flight = Flight {
                calls: &self.calls,
                key,
                call,
                outcome: None,
            };
            let result = f();
            flight.outcome = Some(result.clone());
            drop(flight);
            return (result, false);
        }
    }

    /// Number of keys with a computation currently running.
    pub fn in_flight(&self) -> usize {
        self.calls.lock().len()
    }
}

impl<T: Clone, E: Clone> Default for CallCoalescer<T, E> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T, E> fmt::Debug for CallCoalescer<T, E> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("CallCoalescer")
            .field("in_flight", &self.calls.lock().len())
            .finish()
    }
}

/// Publishes the executor's outcome and clears the record, also on unwind.
struct Flight<'a, T, E> {
    calls: &'a CallMap<T, E>,
    key: &'a str,
    call: Arc<Call<T, E>>,
    outcome: Option<Result<T, E>>,
}

impl<T, E> Flight<'_, T, E> {
    fn clear_record(&self) {
        let mut calls = self.calls.lock();
        if calls
            .get(self.key)
            .is_some_and(|current| Arc::ptr_eq(current, &self.call))
        {
            calls.remove(self.key);
        }
    }
}

impl<T, E> Drop for Flight<'_, T, E> {
    fn drop(&mut self) {
        let outcome = self.outcome.take();
        let finished = outcome.is_some();
        // an abandoned record must be gone before waiters wake and retry
        if !finished {
            self.clear_record();
        }
        {
            let mut state = self.call.state.lock();
            *state = match outcome {
                Some(result) => CallState::Done(result),
                None => CallState::Abandoned,
            };
        }
        self.call.done.notify_all();

        if finished {
            self.clear_record();
        }
    }
}
