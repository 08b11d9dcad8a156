//! Container module: the resolution engine.
//!
//! A [`Container`] owns the frozen entry map of a finalized graph plus a
//! build cache, and resolves names on demand.

use std::any::{type_name, Any};
use std::collections::HashMap;
use std::fmt;
use std::panic::AssertUnwindSafe;
use std::sync::{Arc, Weak};
use std::time::{Duration, Instant};

use futures::future::{join_all, BoxFuture, FutureExt};
use tracing::{debug, info};

use crate::config::{ContainerConfig, MissingNamePolicy};
use crate::dependencies::{Dependencies, Modules};
use crate::descriptors::{self, EntryDescriptor};
use crate::entry::Entry;
use crate::error::{DiError, DiResult};
use crate::lifetime::Lifetime;
use crate::modules::{self, ModuleResolver};
use crate::observer::Observers;

pub mod cache;
pub use cache::{Resolution, Resolved};
use cache::BuildCache;

/// Hands a build future to an executor so it runs apart from its callers.
///
/// Without a spawner a build only makes progress while some caller polls
/// its [`Resolution`].
pub type Spawner = Arc<dyn Fn(BoxFuture<'static, ()>) + Send + Sync>;

/// A finalized, validated object graph.
///
/// Obtained from [`ContainerBuilder::finalize`](crate::ContainerBuilder::finalize).
/// The container is cheap to clone; clones share the entry map and cache.
///
/// # Resolution
///
/// [`get`](Self::get) returns a [`Resolution`], a shared future:
///
/// - A cached or in-flight build for the name is returned as is, so
///   concurrent requests observe one build and one outcome.
/// - Otherwise a new build is recorded in the cache before it first runs.
///   It resolves every dependency concurrently through this same
///   container, resolves required modules, and calls the factory.
/// - When the build settles, singleton values stay cached; prototype
///   values, failures, and "nothing built" outcomes are evicted.
///
/// A name with no entry resolves to `None` and is logged (see
/// [`MissingNamePolicy`]). Cycles are not detected: a build that depends
/// on itself waits on its own shared future forever. Such a build, like
/// any build still in flight, is released when the last `Container`
/// handle is dropped.
///
/// Builds are driven by whoever polls them. A `Resolution` dropped before
/// completion leaves its build in the cache, and the next request for the
/// name resumes it. Configure a spawner with
/// [`ContainerBuilder::with_spawner`](crate::ContainerBuilder::with_spawner)
/// to run every build to completion regardless of its callers.
///
/// A panicking factory fails its build with `DiError::Panicked`; the
/// failure is settled like any other.
///
/// # Examples
///
/// ```
/// use ferrous_wiring::ContainerBuilder;
///
/// # futures::executor::block_on(async {
/// let mut builder = ContainerBuilder::new();
/// builder.register("a").static_value(1i32);
/// builder.register("b").factory(|_| 2i32);
/// builder.register("c")
///     .depends_on("a")
///     .depends_on("b")
///     .factory(|deps| deps.get::<i32>("a").unwrap_or(0) + deps.get::<i32>("b").unwrap_or(0));
///
/// let container = builder.finalize().await.unwrap();
/// let c = container.get_required::<i32>("c").await.unwrap();
/// assert_eq!(*c, 3);
///
/// // Unknown names resolve to nothing rather than failing.
/// assert!(container.get("zzz").await.unwrap().is_none());
/// # });
/// ```
#[derive(Clone)]
pub struct Container {
    _handle: Arc<LastHandle>,
    inner: Arc<ContainerInner>,
}

pub(crate) struct ContainerInner {
    entries: HashMap<String, Entry>,
    cache: BuildCache,
    resolver: Arc<dyn ModuleResolver>,
    observers: Observers,
    config: ContainerConfig,
    spawner: Option<Spawner>,
}

/// Shared by every `Container` clone; clears the cache when the last one goes.
///
/// An in-flight build holds the container strongly while the cache holds
/// the build, so without this the pair would never be freed.
struct LastHandle {
    inner: Weak<ContainerInner>,
}

impl Drop for LastHandle {
    fn drop(&mut self) {
        if let Some(inner) = self.inner.upgrade() {
            let released = inner.cache.clear();
            if released > 0 {
                debug!(released, "container dropped with cached builds");
            }
        }
    }
}

impl Container {
    pub(crate) fn new(
        entries: HashMap<String, Entry>,
        resolver: Arc<dyn ModuleResolver>,
        observers: Observers,
        config: ContainerConfig,
        spawner: Option<Spawner>,
    ) -> Self {
        let inner = Arc::new(ContainerInner {
            entries,
            cache: BuildCache::new(),
            resolver,
            observers,
            config,
            spawner,
        });
        Self {
            _handle: Arc::new(LastHandle { inner: Arc::downgrade(&inner) }),
            inner,
        }
    }

    /// Resolves `name`.
    ///
    /// The returned future is shared: it can be cloned, and every clone,
    /// like every concurrent call for the same name, yields the same outcome.
    pub fn get(&self, name: &str) -> Resolution {
        self.inner.get(name)
    }

    /// Resolves `name` and downcasts the value to `T`.
    ///
    /// `Ok(None)` means nothing was built for the name.
    pub async fn get_as<T: Any + Send + Sync>(&self, name: &str) -> DiResult<Option<Arc<T>>> {
        match self.get(name).await? {
            None => Ok(None),
            Some(value) => value.downcast::<T>().map(Some).map_err(|_| DiError::TypeMismatch {
                name: name.to_string(),
                expected: type_name::<T>(),
            }),
        }
    }

    /// Resolves `name` as `T`, treating "nothing built" as `DiError::NotFound`.
    pub async fn get_required<T: Any + Send + Sync>(&self, name: &str) -> DiResult<Arc<T>> {
        self.get_as::<T>(name)
            .await?
            .ok_or_else(|| DiError::NotFound(name.to_string()))
    }

    pub fn contains(&self, name: &str) -> bool {
        self.inner.entries.contains_key(name)
    }

    /// Registered names, sorted.
    pub fn names(&self) -> Vec<&str> {
        let mut names: Vec<&str> = self.inner.entries.keys().map(String::as_str).collect();
        names.sort_unstable();
        names
    }

    pub fn len(&self) -> usize {
        self.inner.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.inner.entries.is_empty()
    }

    pub fn descriptors(&self) -> Vec<EntryDescriptor> {
        descriptors::describe(self.inner.entries.iter())
    }

    /// Whether a build for `name` is cached or in flight.
    pub fn is_cached(&self, name: &str) -> bool {
        self.inner.cache.contains(name)
    }

    pub fn cached_count(&self) -> usize {
        self.inner.cache.len()
    }

    pub fn config(&self) -> &ContainerConfig {
        &self.inner.config
    }

    pub(crate) fn eager_names(&self) -> Vec<String> {
        let mut names: Vec<String> = self
            .inner
            .entries
            .iter()
            .filter(|(_, entry)| !entry.is_lazy())
            .map(|(name, _)| name.clone())
            .collect();
        names.sort_unstable();
        names
    }
}

impl fmt::Debug for Container {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Container")
            .field("entries", &self.names())
            .field("cached", &self.cached_count())
            .field("observed", &self.inner.observers.has_observers())
            .field("spawned", &self.inner.spawner.is_some())
            .field("config", &self.inner.config)
            .finish()
    }
}

impl ContainerInner {
    fn get(self: &Arc<Self>, name: &str) -> Resolution {
        let (resolution, reused) = self.cache.get_or_start(name, || {
            let inner = Arc::downgrade(self);
            let name = name.to_string();
            async move {
                let Some(inner) = inner.upgrade() else {
                    return Err(DiError::ContainerDropped(name));
                };
                let started = Instant::now();
                let caught = AssertUnwindSafe(inner.build(&name)).catch_unwind().await;
                let outcome = caught.unwrap_or_else(|panic| {
                    Err(DiError::Panicked {
                        name: name.clone(),
                        message: panic_message(panic.as_ref()),
                    })
                });
                inner.settle(&name, &outcome, started.elapsed());
                outcome
            }
            .boxed()
            .shared()
        });
        if reused {
            self.observers.coalesced(name);
        } else if let Some(spawner) = &self.spawner {
            spawner(resolution.clone().map(|_| ()).boxed());
        }
        resolution
    }

    async fn build(self: &Arc<Self>, name: &str) -> Resolved {
        let Some(entry) = self.entries.get(name) else {
            return match self.config.missing_names {
                MissingNamePolicy::Absent => Ok(None),
                MissingNamePolicy::Error => Err(DiError::NotFound(name.to_string())),
            };
        };

        self.observers.resolving(name);
        debug!(entry = name, dependencies = entry.dependencies().len(), "building");

        // Every get() is issued before any is awaited, so dependencies build
        // concurrently. All of them settle before a failure is reported.
        let pending: Vec<Resolution> = entry.dependencies().iter().map(|dep| self.get(dep)).collect();
        let settled = join_all(pending).await;

        let mut deps = Dependencies::new();
        for (dep, outcome) in entry.dependencies().iter().zip(settled) {
            match outcome {
                Ok(Some(value)) => deps.insert(dep.clone(), value),
                Ok(None) => {}
                Err(source) => {
                    return Err(DiError::Dependency {
                        name: name.to_string(),
                        dependency: dep.clone(),
                        source: Box::new(source),
                    })
                }
            }
        }

        let modules = modules::resolve_all(self.resolver.as_ref(), name, entry.required_modules())?;

        entry
            .invoke(Modules::new(modules), deps)
            .await
            .map_err(|source| DiError::Factory {
                name: name.to_string(),
                source: Arc::from(source),
            })
    }

    fn settle(&self, name: &str, outcome: &Resolved, elapsed: Duration) {
        let lifetime = self.entries.get(name).map(Entry::lifetime);
        match outcome {
            Ok(None) => {
                info!("Nothing built for '{}', so not caching it", name);
                self.observers.nothing_built(name);
                self.cache.evict(name);
            }
            Ok(Some(_)) => {
                debug!(entry = name, ?elapsed, ?lifetime, "built");
                self.observers.resolved(name, elapsed);
                if lifetime == Some(Lifetime::Prototype) {
                    self.cache.evict(name);
                }
            }
            Err(error) => {
                debug!(entry = name, %error, "build failed");
                self.observers.build_failed(name, error);
                let keep = self.config.cache_failures && lifetime == Some(Lifetime::Singleton);
                if !keep {
                    self.cache.evict(name);
                }
            }
        }
    }
}

fn panic_message(payload: &(dyn Any + Send)) -> String {
    if let Some(message) = payload.downcast_ref::<&str>() {
        message.to_string()
    } else if let Some(message) = payload.downcast_ref::<String>() {
        message.clone()
    } else {
        "non-string panic payload".to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::BoxError;
    use crate::modules::ModuleRegistry;
    use std::sync::atomic::{AtomicUsize, Ordering};

    fn container(entries: Vec<(&str, Entry)>) -> Container {
        Container::new(
            entries.into_iter().map(|(n, e)| (n.to_string(), e)).collect(),
            Arc::new(ModuleRegistry::new()),
            Observers::new(),
            ContainerConfig::default(),
            None,
        )
    }

    #[tokio::test]
    async fn singleton_is_retained_after_build() {
        let mut entry = Entry::new();
        entry.static_value(7u8);
        let container = container(vec![("seven", entry)]);

        assert!(!container.is_cached("seven"));
        let value = container.get_required::<u8>("seven").await.unwrap();
        assert_eq!(*value, 7);
        assert!(container.is_cached("seven"));
    }

    #[tokio::test]
    async fn prototype_slot_is_evicted_after_build() {
        let counter = Arc::new(AtomicUsize::new(0));
        let c = counter.clone();
        let mut entry = Entry::new();
        entry.prototype().factory(move |_| c.fetch_add(1, Ordering::SeqCst) + 1);
        let container = container(vec![("p", entry)]);

        let pending = container.get("p");
        assert!(container.is_cached("p"));
        pending.await.unwrap();
        assert!(!container.is_cached("p"));
        assert_eq!(counter.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn missing_name_resolves_to_none_and_is_not_cached() {
        let container = container(vec![]);
        assert!(container.get("ghost").await.unwrap().is_none());
        assert!(!container.is_cached("ghost"));
    }

    #[tokio::test]
    async fn missing_name_errors_under_strict_policy() {
        let container = Container::new(
            HashMap::new(),
            Arc::new(ModuleRegistry::new()),
            Observers::new(),
            ContainerConfig::default().with_missing_names(MissingNamePolicy::Error),
            None,
        );
        assert!(matches!(container.get("ghost").await, Err(DiError::NotFound(n)) if n == "ghost"));
    }

    #[tokio::test]
    async fn pending_build_fails_once_container_is_dropped() {
        let mut entry = Entry::new();
        entry.static_value(1u8);
        let container = container(vec![("one", entry)]);

        let pending = container.get("one");
        drop(container);
        assert!(matches!(pending.await, Err(DiError::ContainerDropped(n)) if n == "one"));
    }

    #[test]
    fn stalled_build_is_released_with_the_last_handle() {
        let mut entry = Entry::new();
        entry.async_factory(|_, _| futures::future::pending::<Result<u8, BoxError>>());
        let container = container(vec![("stuck", entry)]);

        assert!(container.get("stuck").now_or_never().is_none());
        assert!(container.is_cached("stuck"));

        let other = container.clone();
        let weak = Arc::downgrade(&container.inner);
        drop(container);
        assert!(other.is_cached("stuck"));
        drop(other);
        assert!(weak.upgrade().is_none());
    }

    #[test]
    fn panic_payloads_become_messages() {
        let boxed: Box<dyn Any + Send> = Box::new("static text");
        assert_eq!(panic_message(boxed.as_ref()), "static text");
        let boxed: Box<dyn Any + Send> = Box::new(format!("owned {}", 1));
        assert_eq!(panic_message(boxed.as_ref()), "owned 1");
        let boxed: Box<dyn Any + Send> = Box::new(7u8);
        assert_eq!(panic_message(boxed.as_ref()), "non-string panic payload");
    }

    #[test]
    fn eager_names_are_sorted() {
        let mut a = Entry::new();
        a.eager();
        let mut b = Entry::new();
        b.eager();
        let container = container(vec![("b", b), ("lazy", Entry::new()), ("a", a)]);
        assert_eq!(container.eager_names(), vec!["a".to_string(), "b".to_string()]);
    }
}
