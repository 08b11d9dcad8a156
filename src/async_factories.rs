//! Async factory support for entries.
//!
//! This module provides the trait-object flavour of entry factories, for
//! values that need asynchronous initialization such as connection pools,
//! network handshakes, or cache warm-up.

use std::sync::Arc;

use async_trait::async_trait;

use crate::dependencies::{Dependencies, Modules};
use crate::error::BoxError;

/// Trait for factories that build an entry's value asynchronously.
///
/// Registered with [`Entry::factory_impl`](crate::Entry::factory_impl). The
/// factory receives the entry's resolved required modules and dependencies.
///
/// # Examples
///
/// ```
/// use ferrous_wiring::{AsyncFactory, BoxError, ContainerBuilder, Dependencies, Modules};
/// use async_trait::async_trait;
/// use std::sync::Arc;
///
/// struct DatabasePool {
///     url: String,
/// }
///
/// struct PoolFactory;
///
/// #[async_trait]
/// impl AsyncFactory<DatabasePool> for PoolFactory {
///     async fn create(&self, _modules: &Modules, deps: &Dependencies) -> Result<Arc<DatabasePool>, BoxError> {
///         let url = deps.require::<String>("url")?;
///         Ok(Arc::new(DatabasePool { url: url.to_string() }))
///     }
/// }
///
/// # futures::executor::block_on(async {
/// let mut builder = ContainerBuilder::new();
/// builder.register("url").static_value("postgres://localhost".to_string());
/// builder.register("pool").depends_on("url").factory_impl(PoolFactory);
///
/// let container = builder.finalize().await.unwrap();
/// let pool = container.get_required::<DatabasePool>("pool").await.unwrap();
/// assert_eq!(pool.url, "postgres://localhost");
/// # });
/// ```
#[async_trait]
pub trait AsyncFactory<T: Send + Sync + 'static>: Send + Sync {
    /// Builds a new value from the resolved modules and dependencies.
    async fn create(&self, modules: &Modules, deps: &Dependencies) -> Result<Arc<T>, BoxError>;
}

#[async_trait]
impl<T, F, Fut> AsyncFactory<T> for F
where
    T: Send + Sync + 'static,
    F: Fn(Modules, Dependencies) -> Fut + Send + Sync,
    Fut: std::future::Future<Output = Result<Arc<T>, BoxError>> + Send,
{
    async fn create(&self, modules: &Modules, deps: &Dependencies) -> Result<Arc<T>, BoxError> {
        self(modules.clone(), deps.clone()).await
    }
}
