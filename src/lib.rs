//! # ferrous-wiring
//!
//! Name-keyed, async dependency injection. Declare entries, validate the
//! graph once, and resolve wired values on demand.
//!
//! ## Features
//!
//! - **Named entries**: every value is registered and requested by string name
//! - **Async factories**: builds run as futures; dependencies build concurrently
//! - **Coalescing**: concurrent requests for one name share one build and one outcome
//! - **Lifetimes**: singletons are built once, prototypes on every request
//! - **Eager entries**: built while the container is finalized
//! - **Up-front validation**: every missing dependency is reported before anything runs
//!
//! ## Quick Start
//!
//! ```rust
//! use ferrous_wiring::ContainerBuilder;
//!
//! struct Database {
//!     url: String,
//! }
//!
//! struct UserService {
//!     db: std::sync::Arc<Database>,
//! }
//!
//! # futures::executor::block_on(async {
//! let mut builder = ContainerBuilder::new();
//! builder.register("db.url").static_value("postgres://localhost".to_string());
//! builder.register("db")
//!     .depends_on("db.url")
//!     .factory(|deps| Database { url: deps.get::<String>("db.url").unwrap_or_default() });
//! builder.register("users")
//!     .depends_on("db")
//!     .try_factory(|_, deps| Ok(UserService { db: deps.require::<Database>("db")? }));
//!
//! let container = builder.finalize().await.unwrap();
//! let users = container.get_required::<UserService>("users").await.unwrap();
//! assert_eq!(users.db.url, "postgres://localhost");
//! # });
//! ```
//!
//! ## Lifetimes
//!
//! - **Singleton** (default): built once, the value is cached for the container's life
//! - **Prototype**: built fresh for every request
//!
//! ```rust
//! use ferrous_wiring::ContainerBuilder;
//! use std::sync::atomic::{AtomicUsize, Ordering};
//! use std::sync::Arc;
//!
//! # futures::executor::block_on(async {
//! let counter = Arc::new(AtomicUsize::new(0));
//! let c = counter.clone();
//!
//! let mut builder = ContainerBuilder::new();
//! builder.register("ticket")
//!     .prototype()
//!     .factory(move |_| c.fetch_add(1, Ordering::SeqCst) + 1);
//!
//! let container = builder.finalize().await.unwrap();
//! assert_eq!(*container.get_required::<usize>("ticket").await.unwrap(), 1);
//! assert_eq!(*container.get_required::<usize>("ticket").await.unwrap(), 2);
//! # });
//! ```
//!
//! ## Modules
//!
//! Entries may require external modules by reference. References are
//! resolved through a [`ModuleResolver`]; [`ModuleRegistry`] is the
//! in-memory one.
//!
//! ```rust
//! use ferrous_wiring::{ContainerBuilder, ModuleRegistry};
//!
//! # futures::executor::block_on(async {
//! let mut registry = ModuleRegistry::new();
//! registry.insert("./greeting", "hello".to_string());
//!
//! let mut builder = ContainerBuilder::new().with_resolver(registry);
//! builder.register("greeting")
//!     .requires("./greeting")
//!     .try_factory(|modules, _| Ok(modules.get::<String>(0).map(|s| s.len()).unwrap_or(0)));
//!
//! let container = builder.finalize().await.unwrap();
//! assert_eq!(*container.get_required::<usize>("greeting").await.unwrap(), 5);
//! # });
//! ```

pub mod async_factories;
pub mod collection;
pub mod config;
pub mod dependencies;
pub mod descriptors;
pub mod entry;
pub mod error;
pub mod lifetime;
pub mod modules;
pub mod observer;
pub mod prewarm;
pub mod provider;
pub mod validation;

// Re-export core types
pub use async_factories::AsyncFactory;
pub use collection::{ContainerBuilder, ContainerBuilderExt, EntryModule};
pub use config::{ContainerConfig, EagerFailurePolicy, MissingNamePolicy};
pub use dependencies::{AnyArc, Dependencies, Modules};
pub use descriptors::EntryDescriptor;
pub use entry::{Entry, Factory, FactoryOutput};
pub use error::{BoxError, DiError, DiResult, MissingDependency, SharedError};
pub use lifetime::{Eagerness, Lifetime};
pub use modules::{ModuleRegistry, ModuleResolver};
pub use observer::{BuildStats, DiObserver, LoggingObserver, MetricsObserver};
pub use prewarm::{EagerReport, EagerResult};
pub use provider::{Container, Resolution, Resolved, Spawner};
pub use validation::{validate, ValidationResult, ValidationWarning};
