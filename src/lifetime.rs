//! Entry lifecycle and eagerness policies.

/// Entry lifecycles controlling result caching
///
/// # Examples
///
/// ```rust
/// use ferrous_wiring::{ContainerBuilder, Lifetime};
/// use std::sync::Arc;
/// use std::sync::atomic::{AtomicUsize, Ordering};
///
/// # futures::executor::block_on(async {
/// let counter = Arc::new(AtomicUsize::new(0));
/// let c = counter.clone();
///
/// let mut builder = ContainerBuilder::new();
/// builder.register("config").singleton().static_value("postgres://localhost".to_string());
/// builder.register("request_id")
///     .prototype()
///     .factory(move |_| c.fetch_add(1, Ordering::SeqCst) + 1);
///
/// let container = builder.finalize().await.unwrap();
///
/// // Singleton: same instance every time
/// let a = container.get_required::<String>("config").await.unwrap();
/// let b = container.get_required::<String>("config").await.unwrap();
/// assert!(Arc::ptr_eq(&a, &b));
///
/// // Prototype: fresh build every time
/// let first = container.get_required::<usize>("request_id").await.unwrap();
/// let second = container.get_required::<usize>("request_id").await.unwrap();
/// assert_eq!((*first, *second), (1, 2));
/// # });
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
#[cfg_attr(feature = "config", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "config", serde(rename_all = "snake_case"))]
pub enum Lifetime {
    /// Built once, then cached for the container's lifetime
    ///
    /// Concurrent requests share the single in-flight build; once it
    /// completes the value is retained and every later request is served
    /// from the cache without touching the factory.
    #[default]
    Singleton,
    /// Built fresh for every request, never retained
    ///
    /// Requests that arrive while a build is still in flight are coalesced
    /// onto it; the cache slot is evicted as soon as the build settles.
    Prototype,
}

/// When an entry is first built
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
#[cfg_attr(feature = "config", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "config", serde(rename_all = "snake_case"))]
pub enum Eagerness {
    /// Built during `ContainerBuilder::finalize`, before the container is handed out
    Eager,
    /// Built on the first `Container::get`
    #[default]
    Lazy,
}
