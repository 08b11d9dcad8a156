//! Entry descriptors for introspection and diagnostics.

use crate::entry::Entry;
use crate::lifetime::{Eagerness, Lifetime};

/// Read-only summary of one registered entry
///
/// # Examples
///
/// ```rust
/// use ferrous_wiring::{ContainerBuilder, Lifetime, Eagerness};
///
/// let mut builder = ContainerBuilder::new();
/// builder.register("db").eager().static_value(5432u16);
/// builder.register("repo").prototype().depends_on("db");
///
/// let descriptors = builder.descriptors();
/// assert_eq!(descriptors.len(), 2);
///
/// let repo = descriptors.iter().find(|d| d.name == "repo").unwrap();
/// assert_eq!(repo.lifetime, Lifetime::Prototype);
/// assert_eq!(repo.eagerness, Eagerness::Lazy);
/// assert_eq!(repo.dependencies, vec!["db".to_string()]);
///
/// let eager = descriptors.iter().filter(|d| d.is_eager()).count();
/// assert_eq!(eager, 1);
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EntryDescriptor {
    pub name: String,
    pub lifetime: Lifetime,
    pub eagerness: Eagerness,
    pub dependencies: Vec<String>,
    pub required_modules: Vec<String>,
}

impl EntryDescriptor {
    pub(crate) fn from_entry(name: &str, entry: &Entry) -> Self {
        Self {
            name: name.to_string(),
            lifetime: entry.lifetime(),
            eagerness: entry.eagerness(),
            dependencies: entry.dependencies().to_vec(),
            required_modules: entry.required_modules().to_vec(),
        }
    }

    pub fn is_eager(&self) -> bool {
        self.eagerness == Eagerness::Eager
    }

    pub fn is_prototype(&self) -> bool {
        self.lifetime == Lifetime::Prototype
    }
}

/// Descriptors for a set of entries, sorted by name.
pub(crate) fn describe<'a>(entries: impl Iterator<Item = (&'a String, &'a Entry)>) -> Vec<EntryDescriptor> {
    let mut descriptors: Vec<_> = entries
        .map(|(name, entry)| EntryDescriptor::from_entry(name, entry))
        .collect();
    descriptors.sort_by(|a, b| a.name.cmp(&b.name));
    descriptors
}
