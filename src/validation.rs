//! Graph validation run by `ContainerBuilder::finalize`.
//!
//! Validation checks every declared dependency edge before anything is
//! built:
//!
//! - **Missing dependency**: Error - the dependency name has no entry
//! - **Singleton → Prototype**: Warning - the singleton keeps the one
//!   prototype instance it was built with
//!
//! Cycles are not detected; a cyclic graph never finishes resolving.

use std::collections::HashMap;
use std::fmt;

use tracing::warn;

use crate::entry::Entry;
use crate::error::{DiError, DiResult, MissingDependency};
use crate::lifetime::Lifetime;

/// A validation warning about a legal but suspicious graph.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ValidationWarning {
    /// Singleton depends on prototype (will always hold the same instance)
    SingletonDependsOnPrototype { singleton: String, prototype: String },
}

impl fmt::Display for ValidationWarning {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ValidationWarning::SingletonDependsOnPrototype { singleton, prototype } => write!(
                f,
                "Singleton '{}' depends on prototype '{}' and will reuse its first instance",
                singleton, prototype
            ),
        }
    }
}

/// Result of validating an entry graph.
#[derive(Debug, Default)]
pub struct ValidationResult {
    /// Every dependency edge without a target, entries in name order
    pub errors: Vec<MissingDependency>,
    /// Suspicious but legal edges
    pub warnings: Vec<ValidationWarning>,
}

impl ValidationResult {
    pub fn is_valid(&self) -> bool {
        self.errors.is_empty()
    }

    /// Logs warnings and converts errors into `DiError::MissingDependencies`.
    pub fn into_result(self) -> DiResult<()> {
        for warning in &self.warnings {
            warn!("{}", warning);
        }
        if self.errors.is_empty() {
            Ok(())
        } else {
            Err(DiError::MissingDependencies(self.errors))
        }
    }
}

/// Validates every dependency edge of `entries`.
pub fn validate(entries: &HashMap<String, Entry>) -> ValidationResult {
    let mut names: Vec<&String> = entries.keys().collect();
    names.sort();

    let mut result = ValidationResult::default();
    for name in names {
        let entry = &entries[name];
        for dep in entry.dependencies() {
            match entries.get(dep) {
                None => result.errors.push(MissingDependency {
                    entry: name.clone(),
                    dependency: dep.clone(),
                }),
                Some(target) => {
                    if entry.lifetime() == Lifetime::Singleton && target.lifetime() == Lifetime::Prototype {
                        let warning = ValidationWarning::SingletonDependsOnPrototype {
                            singleton: name.clone(),
                            prototype: dep.clone(),
                        };
                        if !result.warnings.contains(&warning) {
                            result.warnings.push(warning);
                        }
                    }
                }
            }
        }
    }
    result
}
