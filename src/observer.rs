//! Diagnostic observers for build traceability.
//!
//! Observers are notified as the container builds entries: when a build
//! starts, finishes, fails, produces nothing, or when a request is coalesced
//! onto an in-flight build. The container already emits `tracing` events on
//! its own; observers are for callers that want the same signals in code.

use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;

use parking_lot::Mutex;
use tracing::{debug, info, warn};

use crate::error::DiError;

/// Observer trait for container build events.
///
/// # Performance
///
/// Observer calls are made synchronously while a build runs. Keep
/// implementations lightweight.
///
/// # Examples
///
/// ```
/// use ferrous_wiring::{ContainerBuilder, DiError, DiObserver};
/// use std::sync::Arc;
/// use std::time::Duration;
///
/// struct PrintObserver;
///
/// impl DiObserver for PrintObserver {
///     fn resolving(&self, name: &str) {
///         println!("building {}", name);
///     }
///
///     fn resolved(&self, name: &str, duration: Duration) {
///         println!("built {} in {:?}", name, duration);
///     }
///
///     fn build_failed(&self, name: &str, error: &DiError) {
///         println!("{} failed: {}", name, error);
///     }
/// }
///
/// let mut builder = ContainerBuilder::new();
/// builder.add_observer(Arc::new(PrintObserver));
/// ```
pub trait DiObserver: Send + Sync {
    /// Called when a build for `name` starts.
    fn resolving(&self, name: &str);

    /// Called when a build for `name` produced a value.
    fn resolved(&self, name: &str, duration: Duration);

    /// Called when a build for `name` failed.
    fn build_failed(&self, name: &str, error: &DiError);

    /// Called when a build for `name` produced nothing.
    fn nothing_built(&self, name: &str) {
        let _ = name;
    }

    /// Called when a request for `name` is served from the cache.
    fn coalesced(&self, name: &str) {
        let _ = name;
    }
}

#[derive(Default, Clone)]
pub(crate) struct Observers {
    observers: Vec<Arc<dyn DiObserver>>,
}

impl Observers {
    pub(crate) fn new() -> Self {
        Self { observers: Vec::new() }
    }

    pub(crate) fn add(&mut self, observer: Arc<dyn DiObserver>) {
        self.observers.push(observer);
    }

    #[inline]
    pub(crate) fn has_observers(&self) -> bool {
        !self.observers.is_empty()
    }

    #[inline]
    pub(crate) fn resolving(&self, name: &str) {
        for observer in &self.observers {
            observer.resolving(name);
        }
    }

    #[inline]
    pub(crate) fn resolved(&self, name: &str, duration: Duration) {
        for observer in &self.observers {
            observer.resolved(name, duration);
        }
    }

    #[inline]
    pub(crate) fn build_failed(&self, name: &str, error: &DiError) {
        for observer in &self.observers {
            observer.build_failed(name, error);
        }
    }

    #[inline]
    pub(crate) fn nothing_built(&self, name: &str) {
        for observer in &self.observers {
            observer.nothing_built(name);
        }
    }

    #[inline]
    pub(crate) fn coalesced(&self, name: &str) {
        for observer in &self.observers {
            observer.coalesced(name);
        }
    }
}

/// Observer that forwards every event to `tracing`.
///
/// ```
/// use ferrous_wiring::{ContainerBuilder, LoggingObserver};
/// use std::sync::Arc;
///
/// let mut builder = ContainerBuilder::new();
/// builder.add_observer(Arc::new(LoggingObserver::with_target_label("checkout")));
/// ```
pub struct LoggingObserver {
    label: String,
}

impl LoggingObserver {
    pub fn new() -> Self {
        Self { label: "ferrous-wiring".to_string() }
    }

    /// Tags every event with `label`, for telling containers apart.
    pub fn with_target_label(label: impl Into<String>) -> Self {
        Self { label: label.into() }
    }
}

impl Default for LoggingObserver {
    fn default() -> Self {
        Self::new()
    }
}

impl DiObserver for LoggingObserver {
    fn resolving(&self, name: &str) {
        debug!(container = %self.label, entry = name, "resolving");
    }

    fn resolved(&self, name: &str, duration: Duration) {
        debug!(container = %self.label, entry = name, ?duration, "resolved");
    }

    fn build_failed(&self, name: &str, error: &DiError) {
        warn!(container = %self.label, entry = name, %error, "build failed");
    }

    fn nothing_built(&self, name: &str) {
        info!(container = %self.label, entry = name, "nothing built");
    }

    fn coalesced(&self, name: &str) {
        debug!(container = %self.label, entry = name, "served from cache");
    }
}

/// Per-entry build counters.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct BuildStats {
    pub builds: u64,
    pub failures: u64,
    pub nothing_built: u64,
    pub cache_hits: u64,
    pub total_time: Duration,
}

/// Observer that counts builds per entry.
///
/// ```
/// use ferrous_wiring::{ContainerBuilder, MetricsObserver};
/// use std::sync::Arc;
///
/// # futures::executor::block_on(async {
/// let metrics = Arc::new(MetricsObserver::new());
/// let mut builder = ContainerBuilder::new();
/// builder.add_observer(metrics.clone());
/// builder.register("answer").static_value(42u32);
///
/// let container = builder.finalize().await.unwrap();
/// container.get("answer").await.unwrap();
/// container.get("answer").await.unwrap();
///
/// let stats = metrics.stats("answer");
/// assert_eq!(stats.builds, 1);
/// assert_eq!(stats.cache_hits, 1);
/// # });
/// ```
#[derive(Default)]
pub struct MetricsObserver {
    stats: Mutex<HashMap<String, BuildStats>>,
}

impl MetricsObserver {
    pub fn new() -> Self {
        Self { stats: Mutex::new(HashMap::new()) }
    }

    /// Counters for `name`; all zero if it was never seen.
    pub fn stats(&self, name: &str) -> BuildStats {
        self.stats.lock().get(name).cloned().unwrap_or_default()
    }

    pub fn total_builds(&self) -> u64 {
        self.stats.lock().values().map(|s| s.builds).sum()
    }

    fn update(&self, name: &str, f: impl FnOnce(&mut BuildStats)) {
        let mut stats = self.stats.lock();
        f(stats.entry(name.to_string()).or_default());
    }
}

impl DiObserver for MetricsObserver {
    fn resolving(&self, name: &str) {
        self.update(name, |s| s.builds += 1);
    }

    fn resolved(&self, name: &str, duration: Duration) {
        self.update(name, |s| s.total_time += duration);
    }

    fn build_failed(&self, name: &str, _error: &DiError) {
        self.update(name, |s| s.failures += 1);
    }

    fn nothing_built(&self, name: &str) {
        self.update(name, |s| s.nothing_built += 1);
    }

    fn coalesced(&self, name: &str) {
        self.update(name, |s| s.cache_hits += 1);
    }
}
