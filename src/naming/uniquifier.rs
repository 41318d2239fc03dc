//! Collision-free identifier assignment
//!
//! Every naming scope (entity types, entity sets, the properties of one
//! entity, the parameters of one function, ...) owns its own
//! [`UniqueIdentifierService`]. Proposed names are transformed, checked
//! against the names already handed out under the scope's comparison policy,
//! and suffixed with the smallest free positive integer on collision.

use std::collections::{HashMap, HashSet};
use std::hash::Hash;

use crate::error::EdmGenError;

/// How two identifiers are compared for equality within a scope
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NameComparer {
    /// Exact, case-sensitive comparison (store space)
    Ordinal,
    /// Case-insensitive comparison (conceptual space)
    OrdinalIgnoreCase,
}

impl NameComparer {
    fn key(self, name: &str) -> String {
        match self {
            NameComparer::Ordinal => name.to_string(),
            NameComparer::OrdinalIgnoreCase => name.to_lowercase(),
        }
    }
}

type NameTransform = Box<dyn Fn(&str) -> String>;

/// Hands out unique identifiers within a single naming scope.
///
/// `K` is the owner key used to remember which object received which name.
/// Scopes that never look names up again use the default `()` owner.
pub struct UniqueIdentifierService<K = ()> {
    comparer: NameComparer,
    transform: Option<NameTransform>,
    used: HashSet<String>,
    assigned: HashMap<K, String>,
}

impl<K: Hash + Eq> UniqueIdentifierService<K> {
    /// Create a scope with the given comparison policy and no transform
    pub fn new(comparer: NameComparer) -> Self {
        Self {
            comparer,
            transform: None,
            used: HashSet::new(),
            assigned: HashMap::new(),
        }
    }

    /// Create a scope whose proposed names are rewritten by `transform`
    /// before collision checking (e.g. `.` replaced with `_`).
    pub fn with_transform<F>(comparer: NameComparer, transform: F) -> Self
    where
        F: Fn(&str) -> String + 'static,
    {
        Self {
            comparer,
            transform: Some(Box::new(transform)),
            used: HashSet::new(),
            assigned: HashMap::new(),
        }
    }

    /// Mark `name` as taken. Registering the same name twice is a caller error.
    pub fn register_used_identifier(&mut self, name: &str) -> Result<(), EdmGenError> {
        if !self.used.insert(self.comparer.key(name)) {
            return Err(EdmGenError::IdentifierAlreadyRegistered {
                name: name.to_string(),
            });
        }
        Ok(())
    }

    /// Whether `name` is already taken in this scope
    pub fn is_used(&self, name: &str) -> bool {
        self.used.contains(&self.comparer.key(name))
    }

    /// Return `proposed` (after the scope transform) if it is free, otherwise
    /// the transformed name followed by the smallest unused positive integer.
    ///
    /// The result is registered, and remembered for `owner` when one is given.
    pub fn adjust_identifier(&mut self, proposed: &str, owner: Option<K>) -> String {
        let base = match &self.transform {
            Some(transform) => transform(proposed),
            None => proposed.to_string(),
        };

        let adjusted = if self.is_used(&base) {
            let mut suffix: u32 = 1;
            loop {
                let candidate = format!("{}{}", base, suffix);
                if !self.is_used(&candidate) {
                    break candidate;
                }
                suffix += 1;
            }
        } else {
            base
        };

        self.used.insert(self.comparer.key(&adjusted));
        if let Some(owner) = owner {
            self.assigned.insert(owner, adjusted.clone());
        }
        adjusted
    }

    /// Look up the name previously assigned to `owner`
    pub fn try_get_adjusted_name(&self, owner: &K) -> Option<&str> {
        self.assigned.get(owner).map(String::as_str)
    }
}

impl<K> std::fmt::Debug for UniqueIdentifierService<K> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("UniqueIdentifierService")
            .field("comparer", &self.comparer)
            .field("has_transform", &self.transform.is_some())
            .field("used", &self.used.len())
            .finish()
    }
}
