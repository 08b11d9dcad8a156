//! Resolved inputs handed to entry factories.

use std::any::{type_name, Any};
use std::fmt;
use std::sync::Arc;

use crate::error::{DiError, DiResult};

/// Type-erased value stored in the container.
pub type AnyArc = Arc<dyn Any + Send + Sync>;

/// Resolved dependencies of one build, keyed by dependency name.
///
/// Keys keep declaration order. A name declared twice is resolved twice
/// but appears once; the later declaration's value is kept.
#[derive(Clone, Default)]
pub struct Dependencies {
    values: Vec<(String, AnyArc)>,
}

impl Dependencies {
    pub fn new() -> Self {
        Self { values: Vec::new() }
    }

    pub(crate) fn insert(&mut self, name: String, value: AnyArc) {
        match self.values.iter_mut().find(|(n, _)| *n == name) {
            Some(slot) => slot.1 = value,
            None => self.values.push((name, value)),
        }
    }

    /// Gets the raw value resolved for `name`.
    pub fn get_any(&self, name: &str) -> Option<&AnyArc> {
        self.values.iter().find(|(n, _)| n == name).map(|(_, v)| v)
    }

    /// Gets the value resolved for `name`, downcast to `T`.
    ///
    /// Returns `None` when the name is absent or holds a different type.
    ///
    /// # Examples
    ///
    /// ```rust
    /// use ferrous_wiring::ContainerBuilder;
    ///
    /// # futures::executor::block_on(async {
    /// let mut builder = ContainerBuilder::new();
    /// builder.register("a").static_value(1i32);
    /// builder.register("b").static_value(2i32);
    /// builder.register("c")
    ///     .depends_on("a")
    ///     .depends_on("b")
    ///     .factory(|deps| deps.get::<i32>("a").unwrap() + deps.get::<i32>("b").unwrap());
    ///
    /// let container = builder.finalize().await.unwrap();
    /// assert_eq!(*container.get_required::<i32>("c").await.unwrap(), 3);
    /// # });
    /// ```
    pub fn get<T: Any + Send + Sync + Clone>(&self, name: &str) -> Option<T> {
        self.get_arc::<T>(name).map(|v| (*v).clone())
    }

    /// Gets the shared value resolved for `name`, downcast to `T`.
    pub fn get_arc<T: Any + Send + Sync>(&self, name: &str) -> Option<Arc<T>> {
        self.get_any(name).and_then(|v| v.clone().downcast::<T>().ok())
    }

    /// Like [`get_arc`](Self::get_arc) but reports why the lookup failed.
    pub fn require<T: Any + Send + Sync>(&self, name: &str) -> DiResult<Arc<T>> {
        let value = self
            .get_any(name)
            .ok_or_else(|| DiError::NotFound(name.to_string()))?;
        value.clone().downcast::<T>().map_err(|_| DiError::TypeMismatch {
            name: name.to_string(),
            expected: type_name::<T>(),
        })
    }

    pub fn contains(&self, name: &str) -> bool {
        self.get_any(name).is_some()
    }

    /// Dependency names in declaration order.
    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.values.iter().map(|(n, _)| n.as_str())
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }
}

impl fmt::Debug for Dependencies {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_list().entries(self.names()).finish()
    }
}

/// Resolved required modules of one build, in declaration order.
#[derive(Clone, Default)]
pub struct Modules {
    values: Vec<AnyArc>,
}

impl Modules {
    pub(crate) fn new(values: Vec<AnyArc>) -> Self {
        Self { values }
    }

    pub fn get_any(&self, index: usize) -> Option<&AnyArc> {
        self.values.get(index)
    }

    /// Gets the module at `index`, downcast to `T`.
    pub fn get<T: Any + Send + Sync>(&self, index: usize) -> Option<Arc<T>> {
        self.get_any(index).and_then(|v| v.clone().downcast::<T>().ok())
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }
}

impl fmt::Debug for Modules {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Modules({})", self.values.len())
    }
}
