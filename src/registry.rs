//! Routing registry mapping dimension keys to stream sinks.
//!
//! The registry is the only shared mutable state in the crate. Its lock is
//! held for map access only; sink I/O always happens after release.

use std::collections::HashMap;
use std::fmt;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use once_cell::sync::Lazy;

use crate::sink::StreamSink;
use crate::tags::DimensionKey;

/// Process-wide registry shared by emitters that are not given their own.
static SHARED: Lazy<Arc<Registry>> = Lazy::new(|| Arc::new(Registry::new()));

/// Access the process-wide registry.
///
/// Lives for the whole process and is never cleared; tests that bind keys
/// here rely on "last binder wins" for the keys they touch. Prefer a private
/// `Registry::new()` when isolation matters.
pub fn shared() -> Arc<Registry> {
    Arc::clone(&SHARED)
}

/// Mapping from dimension key to at most one bound sink.
#[derive(Default)]
pub struct Registry {
    dimensions: Mutex<HashMap<DimensionKey, Arc<StreamSink>>>,
}

impl Registry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Bind every key in `keys` to `sink`, replacing earlier bindings.
    pub fn bind(&self, keys: &[DimensionKey], sink: Arc<StreamSink>) {
        let mut dimensions = self.lock_dimensions();
        for key in keys {
            if dimensions.insert(key.clone(), Arc::clone(&sink)).is_some() {
                log::trace!("[Registry] Rebound dimension '{}'", key);
            } else {
                log::trace!("[Registry] Bound dimension '{}'", key);
            }
        }
    }

    /// Deliver one message to every distinct sink reachable from `keys`.
    ///
    /// The message is formatted only when at least one sink is bound. The
    /// line is prefixed with the tags of the first key, whichever key
    /// actually matched.
    pub fn deliver(&self, keys: &[DimensionKey], message: fmt::Arguments<'_>) {
        let Some(first) = keys.first() else {
            return;
        };
        let sinks = self.collect_sinks(keys);
        if sinks.is_empty() {
            return;
        }

        let line = format!("{}: {}", first.prefix(), message);
        for sink in &sinks {
            if let Err(err) = sink.write_line(&line) {
                log::warn!(
                    "[Registry] Failed to write to sink for '{}': {}",
                    first,
                    err
                );
            }
        }
    }

    /// Whether `key` currently has a sink bound.
    pub fn is_bound(&self, key: &DimensionKey) -> bool {
        self.lock_dimensions().contains_key(key)
    }

    /// Number of bound keys.
    pub fn len(&self) -> usize {
        self.lock_dimensions().len()
    }

    pub fn is_empty(&self) -> bool {
        self.lock_dimensions().is_empty()
    }

    /// Distinct sinks bound to any of `keys`, deduplicated by identity.
    fn collect_sinks(&self, keys: &[DimensionKey]) -> Vec<Arc<StreamSink>> {
        let dimensions = self.lock_dimensions();
        let mut sinks: Vec<Arc<StreamSink>> = Vec::new();
        for sink in keys.iter().filter_map(|key| dimensions.get(key)) {
            if !sinks.iter().any(|seen| Arc::ptr_eq(seen, sink)) {
                sinks.push(Arc::clone(sink));
            }
        }
        sinks
    }

    fn lock_dimensions(&self) -> MutexGuard<'_, HashMap<DimensionKey, Arc<StreamSink>>> {
        self.dimensions.lock().unwrap_or_else(|poisoned: PoisonError<_>| {
            log::warn!("[Registry] Dimension map lock poisoned, recovering");
            poisoned.into_inner()
        })
    }
}

impl fmt::Debug for Registry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Registry")
            .field("bound", &self.len())
            .finish()
    }
}
