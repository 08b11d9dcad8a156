//! Entry module system for grouped registration.
//!
//! This module provides traits for organizing entry registrations into
//! reusable modules.

use crate::collection::ContainerBuilder;
use crate::error::DiResult;

/// A module that registers a group of entries with a [`ContainerBuilder`].
///
/// # Example
///
/// ```rust
/// use ferrous_wiring::{ContainerBuilder, EntryModule, DiResult};
///
/// struct StorageModule {
///     url: String,
/// }
///
/// impl EntryModule for StorageModule {
///     fn register_entries(self, builder: &mut ContainerBuilder) -> DiResult<()> {
///         builder.register("storage.url").static_value(self.url);
///         builder.register("storage").depends_on("storage.url");
///         Ok(())
///     }
/// }
///
/// # fn main() -> DiResult<()> {
/// let mut builder = ContainerBuilder::new();
/// builder.add_module(StorageModule { url: "s3://bucket".to_string() })?;
/// assert!(builder.contains("storage"));
/// # Ok(())
/// # }
/// ```
pub trait EntryModule {
    /// Register this module's entries with the builder.
    fn register_entries(self, builder: &mut ContainerBuilder) -> DiResult<()>;
}

/// Extension trait providing by-value module chaining.
pub trait ContainerBuilderExt {
    /// Add a module, consuming and returning the builder.
    ///
    /// ```rust
    /// use ferrous_wiring::{ContainerBuilder, ContainerBuilderExt, EntryModule, DiResult};
    ///
    /// struct Clock;
    /// impl EntryModule for Clock {
    ///     fn register_entries(self, b: &mut ContainerBuilder) -> DiResult<()> {
    ///         b.register("clock").static_value(0u64);
    ///         Ok(())
    ///     }
    /// }
    ///
    /// struct Metrics;
    /// impl EntryModule for Metrics {
    ///     fn register_entries(self, b: &mut ContainerBuilder) -> DiResult<()> {
    ///         b.register("metrics").depends_on("clock");
    ///         Ok(())
    ///     }
    /// }
    ///
    /// # fn main() -> DiResult<()> {
    /// let builder = ContainerBuilder::new()
    ///     .with_module(Clock)?
    ///     .with_module(Metrics)?;
    /// assert_eq!(builder.len(), 2);
    /// # Ok(())
    /// # }
    /// ```
    fn with_module<M: EntryModule>(self, module: M) -> DiResult<Self>
    where
        Self: Sized;
}

impl ContainerBuilderExt for ContainerBuilder {
    fn with_module<M: EntryModule>(mut self, module: M) -> DiResult<Self> {
        module.register_entries(&mut self)?;
        Ok(self)
    }
}
