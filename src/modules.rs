//! Module reference resolution.
//!
//! Entries may declare required modules by opaque string reference. The
//! container asks an injected [`ModuleResolver`] to turn each reference into
//! a value every time the entry is built, and passes the results to the
//! factory positionally.

use std::collections::HashMap;
use std::fmt;
use std::sync::Arc;

use crate::dependencies::AnyArc;
use crate::error::{DiError, DiResult};

/// Resolves module references to values.
///
/// Implementations must resolve deterministically for a given reference.
/// Calls are synchronous and happen once per required module per build.
///
/// # Examples
///
/// ```rust
/// use ferrous_wiring::{ModuleResolver, DiResult, DiError, AnyArc};
/// use std::sync::Arc;
///
/// struct Versions;
///
/// impl ModuleResolver for Versions {
///     fn resolve(&self, reference: &str) -> DiResult<AnyArc> {
///         match reference {
///             "version" => Ok(Arc::new("1.2.0".to_string())),
///             other => Err(DiError::ModuleNotFound {
///                 entry: String::new(),
///                 reference: other.to_string(),
///             }),
///         }
///     }
/// }
/// ```
pub trait ModuleResolver: Send + Sync {
    fn resolve(&self, reference: &str) -> DiResult<AnyArc>;
}

impl<F> ModuleResolver for F
where
    F: Fn(&str) -> Option<AnyArc> + Send + Sync,
{
    fn resolve(&self, reference: &str) -> DiResult<AnyArc> {
        self(reference).ok_or_else(|| DiError::ModuleNotFound {
            entry: String::new(),
            reference: reference.to_string(),
        })
    }
}

/// Map-backed [`ModuleResolver`] populated by the host application.
#[derive(Default, Clone)]
pub struct ModuleRegistry {
    modules: HashMap<String, AnyArc>,
}

impl ModuleRegistry {
    pub fn new() -> Self {
        Self { modules: HashMap::new() }
    }

    /// Registers `value` under `reference`, replacing any previous module.
    pub fn insert<T: std::any::Any + Send + Sync>(&mut self, reference: impl Into<String>, value: T) -> &mut Self {
        self.modules.insert(reference.into(), Arc::new(value));
        self
    }

    pub fn insert_arc(&mut self, reference: impl Into<String>, value: AnyArc) -> &mut Self {
        self.modules.insert(reference.into(), value);
        self
    }

    pub fn contains(&self, reference: &str) -> bool {
        self.modules.contains_key(reference)
    }

    pub fn len(&self) -> usize {
        self.modules.len()
    }

    pub fn is_empty(&self) -> bool {
        self.modules.is_empty()
    }
}

impl ModuleResolver for ModuleRegistry {
    fn resolve(&self, reference: &str) -> DiResult<AnyArc> {
        self.modules
            .get(reference)
            .cloned()
            .ok_or_else(|| DiError::ModuleNotFound {
                entry: String::new(),
                reference: reference.to_string(),
            })
    }
}

impl fmt::Debug for ModuleRegistry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut refs: Vec<_> = self.modules.keys().collect();
        refs.sort();
        f.debug_struct("ModuleRegistry").field("modules", &refs).finish()
    }
}

/// Resolves every reference of one entry, attributing failures to it.
pub(crate) fn resolve_all(
    resolver: &dyn ModuleResolver,
    entry: &str,
    references: &[String],
) -> DiResult<Vec<AnyArc>> {
    references
        .iter()
        .map(|reference| {
            resolver.resolve(reference).map_err(|err| match err {
                DiError::ModuleNotFound { reference, .. } => DiError::ModuleNotFound {
                    entry: entry.to_string(),
                    reference,
                },
                other => other,
            })
        })
        .collect()
}
