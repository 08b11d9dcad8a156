//! Entry declarations: how to build one named value.

use std::any::Any;
use std::fmt;
use std::future::Future;
use std::sync::Arc;

use futures::future::{self, BoxFuture, FutureExt};

use crate::async_factories::AsyncFactory;
use crate::dependencies::{AnyArc, Dependencies, Modules};
use crate::error::BoxError;
use crate::lifetime::{Eagerness, Lifetime};

/// What a factory produces: a value, `None` when nothing was built, or an error.
pub type FactoryOutput = Result<Option<AnyArc>, BoxError>;

/// Type-erased factory stored on an [`Entry`].
pub type Factory = Arc<dyn Fn(Modules, Dependencies) -> BoxFuture<'static, FactoryOutput> + Send + Sync>;

/// A named build recipe.
///
/// Created by [`ContainerBuilder::register`](crate::ContainerBuilder::register)
/// and configured through chained setters. Nothing is validated here; an
/// entry may name dependencies that do not exist until the graph is
/// finalized.
///
/// An entry with no factory builds its own [`Dependencies`] map.
///
/// # Examples
///
/// ```rust
/// use ferrous_wiring::{ContainerBuilder, Lifetime, Eagerness};
///
/// let mut builder = ContainerBuilder::new();
/// let entry = builder
///     .register("report")
///     .depends_on("a")
///     .depends_on("b")
///     .eager()
///     .prototype();
///
/// assert_eq!(entry.dependencies(), ["a", "b"]);
/// assert_eq!(entry.lifetime(), Lifetime::Prototype);
/// assert_eq!(entry.eagerness(), Eagerness::Eager);
/// ```
#[derive(Clone)]
pub struct Entry {
    dependencies: Vec<String>,
    lifetime: Lifetime,
    eagerness: Eagerness,
    factory: Factory,
    required_modules: Vec<String>,
}

impl Entry {
    /// Creates a lazy singleton with no dependencies and the default factory.
    pub fn new() -> Self {
        Self {
            dependencies: Vec::new(),
            lifetime: Lifetime::Singleton,
            eagerness: Eagerness::Lazy,
            factory: erase(|_modules, deps| future::ready(Ok(Some(Arc::new(deps) as AnyArc))).boxed()),
            required_modules: Vec::new(),
        }
    }

    // ----- Lifecycle -----

    /// Builds a fresh value on every request.
    pub fn prototype(&mut self) -> &mut Self {
        self.lifetime = Lifetime::Prototype;
        self
    }

    /// Builds once and caches the value.
    pub fn singleton(&mut self) -> &mut Self {
        self.lifetime = Lifetime::Singleton;
        self
    }

    pub fn lifetime_policy(&mut self, lifetime: Lifetime) -> &mut Self {
        self.lifetime = lifetime;
        self
    }

    // ----- Eagerness -----

    /// Defers the build until the first request.
    pub fn lazy(&mut self) -> &mut Self {
        self.eagerness = Eagerness::Lazy;
        self
    }

    /// Builds during finalization, before the container is returned.
    pub fn eager(&mut self) -> &mut Self {
        self.eagerness = Eagerness::Eager;
        self
    }

    // ----- Inputs -----

    /// Appends a dependency. Duplicates are kept and resolved independently.
    pub fn depends_on(&mut self, name: impl Into<String>) -> &mut Self {
        self.dependencies.push(name.into());
        self
    }

    /// Appends a required module reference, passed to the factory positionally.
    pub fn requires(&mut self, reference: impl Into<String>) -> &mut Self {
        self.required_modules.push(reference.into());
        self
    }

    // ----- Factories -----

    /// Always builds the given value.
    ///
    /// Every build hands out the same shared instance, including for
    /// prototype entries.
    pub fn static_value<T: Any + Send + Sync>(&mut self, value: T) -> &mut Self {
        let value: AnyArc = Arc::new(value);
        self.factory = erase(move |_modules, _deps| future::ready(Ok(Some(value.clone()))).boxed());
        self
    }

    /// Builds the value synchronously from the resolved dependencies.
    ///
    /// Required modules are still resolved for the build but are not passed
    /// to `f`; use [`try_factory`](Self::try_factory) or
    /// [`async_factory`](Self::async_factory) to read them.
    pub fn factory<T, F>(&mut self, f: F) -> &mut Self
    where
        T: Any + Send + Sync,
        F: Fn(&Dependencies) -> T + Send + Sync + 'static,
    {
        self.factory = erase(move |_modules, deps| {
            let value = f(&deps);
            future::ready(Ok(Some(Arc::new(value) as AnyArc))).boxed()
        });
        self
    }

    /// Builds the value synchronously; the factory may fail.
    pub fn try_factory<T, F>(&mut self, f: F) -> &mut Self
    where
        T: Any + Send + Sync,
        F: Fn(&Modules, &Dependencies) -> Result<T, BoxError> + Send + Sync + 'static,
    {
        self.factory = erase(move |modules, deps| {
            let built = f(&modules, &deps).map(|value| Some(Arc::new(value) as AnyArc));
            future::ready(built).boxed()
        });
        self
    }

    /// Builds the value synchronously; returning `None` means nothing was built.
    pub fn optional_factory<T, F>(&mut self, f: F) -> &mut Self
    where
        T: Any + Send + Sync,
        F: Fn(&Modules, &Dependencies) -> Option<T> + Send + Sync + 'static,
    {
        self.factory = erase(move |modules, deps| {
            let built = f(&modules, &deps).map(|value| Arc::new(value) as AnyArc);
            future::ready(Ok(built)).boxed()
        });
        self
    }

    /// Builds the value with an async closure.
    pub fn async_factory<T, F, Fut>(&mut self, f: F) -> &mut Self
    where
        T: Any + Send + Sync,
        F: Fn(Modules, Dependencies) -> Fut + Send + Sync + 'static,
        Fut: Future<Output = Result<T, BoxError>> + Send + 'static,
    {
        self.factory = erase(move |modules, deps| {
            f(modules, deps)
                .map(|built| built.map(|value| Some(Arc::new(value) as AnyArc)))
                .boxed()
        });
        self
    }

    /// Builds the value with an [`AsyncFactory`] implementation.
    pub fn factory_impl<T, A>(&mut self, factory: A) -> &mut Self
    where
        T: Send + Sync + 'static,
        A: AsyncFactory<T> + 'static,
    {
        let factory = Arc::new(factory);
        self.factory = erase(move |modules, deps| {
            let factory = factory.clone();
            async move {
                let value = factory.create(&modules, &deps).await?;
                Ok::<_, BoxError>(Some(value as AnyArc))
            }
            .boxed()
        });
        self
    }

    /// Installs an already type-erased factory.
    pub fn raw_factory(&mut self, factory: Factory) -> &mut Self {
        self.factory = factory;
        self
    }

    // ----- Accessors -----

    pub fn dependencies(&self) -> &[String] {
        &self.dependencies
    }

    pub fn required_modules(&self) -> &[String] {
        &self.required_modules
    }

    pub fn lifetime(&self) -> Lifetime {
        self.lifetime
    }

    pub fn eagerness(&self) -> Eagerness {
        self.eagerness
    }

    pub fn is_prototype(&self) -> bool {
        self.lifetime == Lifetime::Prototype
    }

    pub fn is_lazy(&self) -> bool {
        self.eagerness == Eagerness::Lazy
    }

    pub(crate) fn invoke(&self, modules: Modules, deps: Dependencies) -> BoxFuture<'static, FactoryOutput> {
        (self.factory)(modules, deps)
    }
}

fn erase<F>(f: F) -> Factory
where
    F: Fn(Modules, Dependencies) -> BoxFuture<'static, FactoryOutput> + Send + Sync + 'static,
{
    Arc::new(f)
}

impl Default for Entry {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Debug for Entry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Entry")
            .field("dependencies", &self.dependencies)
            .field("lifetime", &self.lifetime)
            .field("eagerness", &self.eagerness)
            .field("required_modules", &self.required_modules)
            .finish_non_exhaustive()
    }
}
