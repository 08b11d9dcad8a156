//! Container builder module.
//!
//! This module contains the [`ContainerBuilder`] type, which collects entry
//! registrations, validates the finished graph, and produces a ready
//! [`Container`].

use std::collections::hash_map::{Entry as Slot, HashMap};
use std::fmt;
use std::sync::Arc;

use futures::future::BoxFuture;
use tracing::{debug, info, warn};

use crate::config::{ContainerConfig, EagerFailurePolicy};
use crate::descriptors::{self, EntryDescriptor};
use crate::entry::Entry;
use crate::error::{DiError, DiResult};
use crate::modules::{ModuleRegistry, ModuleResolver};
use crate::observer::{DiObserver, Observers};
use crate::prewarm::{self, EagerReport};
use crate::provider::{Container, Spawner};
use crate::validation::{self, ValidationResult};

pub mod module_system;
pub use module_system::*;

/// Collects named entries and assembles them into a [`Container`].
///
/// # Examples
///
/// ```rust
/// use ferrous_wiring::{ContainerBuilder, Dependencies, ModuleRegistry};
///
/// # futures::executor::block_on(async {
/// let mut modules = ModuleRegistry::new();
/// modules.insert("./d", 1i32);
///
/// let mut builder = ContainerBuilder::new().with_resolver(modules);
/// builder.register("a").static_value(1i32);
/// builder.register("b").factory(|_| 2i32);
/// builder.register("c")
///     .depends_on("a")
///     .depends_on("b")
///     .factory(|deps| deps.get::<i32>("a").unwrap() + deps.get::<i32>("b").unwrap());
/// builder.register("d")
///     .requires("./d")
///     .try_factory(|modules, _| Ok(*modules.get::<i32>(0).unwrap()));
/// // No factory: the value is the dependency map itself.
/// builder.register("e")
///     .depends_on("a")
///     .depends_on("b")
///     .depends_on("c")
///     .depends_on("d");
///
/// let container = builder.finalize().await.unwrap();
/// let e = container.get_required::<Dependencies>("e").await.unwrap();
/// assert_eq!(e.get::<i32>("c"), Some(3));
/// assert_eq!(e.get::<i32>("d"), Some(1));
/// # });
/// ```
pub struct ContainerBuilder {
    entries: HashMap<String, Entry>,
    resolver: Arc<dyn ModuleResolver>,
    observers: Observers,
    config: ContainerConfig,
    spawner: Option<Spawner>,
}

impl ContainerBuilder {
    /// Creates an empty builder with default configuration and no modules.
    pub fn new() -> Self {
        Self {
            entries: HashMap::new(),
            resolver: Arc::new(ModuleRegistry::new()),
            observers: Observers::new(),
            config: ContainerConfig::default(),
            spawner: None,
        }
    }

    pub fn with_config(mut self, config: ContainerConfig) -> Self {
        self.config = config;
        self
    }

    /// Sets the resolver used for required module references.
    pub fn with_resolver(mut self, resolver: impl ModuleResolver + 'static) -> Self {
        self.resolver = Arc::new(resolver);
        self
    }

    pub fn with_shared_resolver(mut self, resolver: Arc<dyn ModuleResolver>) -> Self {
        self.resolver = resolver;
        self
    }

    /// Runs every build on `spawner`, so it completes even if all of its
    /// callers stop polling.
    ///
    /// ```rust
    /// use ferrous_wiring::ContainerBuilder;
    ///
    /// # #[tokio::main]
    /// # async fn main() {
    /// let mut builder = ContainerBuilder::new().with_spawner(|build| {
    ///     tokio::spawn(build);
    /// });
    /// builder.register("answer").static_value(42u32);
    ///
    /// let container = builder.finalize().await.unwrap();
    /// assert_eq!(*container.get_required::<u32>("answer").await.unwrap(), 42);
    /// # }
    /// ```
    pub fn with_spawner<F>(mut self, spawner: F) -> Self
    where
        F: Fn(BoxFuture<'static, ()>) + Send + Sync + 'static,
    {
        self.spawner = Some(Arc::new(spawner));
        self
    }

    pub fn config(&self) -> &ContainerConfig {
        &self.config
    }

    /// Adds an observer notified of every build of the finished container.
    pub fn add_observer(&mut self, observer: Arc<dyn DiObserver>) -> &mut Self {
        self.observers.add(observer);
        self
    }

    /// Registers a fresh entry under `name` and returns it for configuration.
    ///
    /// Registering a name again replaces the earlier entry.
    pub fn register(&mut self, name: impl Into<String>) -> &mut Entry {
        match self.entries.entry(name.into()) {
            Slot::Occupied(mut slot) => {
                debug!(entry = %slot.key(), "replacing existing registration");
                slot.insert(Entry::new());
                slot.into_mut()
            }
            Slot::Vacant(slot) => slot.insert(Entry::new()),
        }
    }

    /// Registers every entry of `module`.
    pub fn add_module<M: EntryModule>(&mut self, module: M) -> DiResult<&mut Self> {
        module.register_entries(self)?;
        Ok(self)
    }

    pub fn contains(&self, name: &str) -> bool {
        self.entries.contains_key(name)
    }

    pub fn entry(&self, name: &str) -> Option<&Entry> {
        self.entries.get(name)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn descriptors(&self) -> Vec<EntryDescriptor> {
        descriptors::describe(self.entries.iter())
    }

    /// Checks the graph without consuming the builder.
    pub fn validate(&self) -> ValidationResult {
        validation::validate(&self.entries)
    }

    /// Validates the graph, builds the container, and runs eager initialization.
    ///
    /// Fails with `DiError::MissingDependencies` before anything is built
    /// if any entry names an unregistered dependency. Eager build failures
    /// are handled per [`EagerFailurePolicy`].
    pub async fn finalize(self) -> DiResult<Container> {
        self.finalize_with_report().await.map(|(container, _)| container)
    }

    /// Like [`finalize`](Self::finalize), also returning the eager build report.
    pub async fn finalize_with_report(self) -> DiResult<(Container, EagerReport)> {
        validation::validate(&self.entries).into_result()?;

        let container = Container::new(
            self.entries,
            self.resolver,
            self.observers,
            self.config,
            self.spawner,
        );
        let report = prewarm::initialize_eager(&container).await;

        if !report.all_built() {
            match container.config().eager_failures {
                EagerFailurePolicy::Ignore => {
                    warn!(failed = report.failed_count(), "container finalized with failed eager entries");
                }
                EagerFailurePolicy::Abort => {
                    return Err(DiError::EagerInitialization(report.into_failures()));
                }
            }
        }

        info!(
            entries = container.len(),
            eager = report.results.len(),
            elapsed = ?report.total_duration,
            "container ready"
        );
        Ok((container, report))
    }
}

impl Default for ContainerBuilder {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Debug for ContainerBuilder {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut names: Vec<&String> = self.entries.keys().collect();
        names.sort();
        f.debug_struct("ContainerBuilder")
            .field("entries", &names)
            .field("config", &self.config)
            .field("spawner", &self.spawner.is_some())
            .finish_non_exhaustive()
    }
}
