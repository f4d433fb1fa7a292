use crate::*;
use std::collections::BTreeSet;

/// Nullifiers consumed by accepted votes in a single poll.
#[derive(Serialize, Deserialize, Clone, Debug, Default, PartialEq, Eq)]
pub struct NullifierRegistry {
    used: BTreeSet<Field>,
}

impl NullifierRegistry {
    pub fn new() -> Self {
        NullifierRegistry::default()
    }

    pub fn contains(&self, nullifier: &Field) -> bool {
        self.used.contains(nullifier)
    }

    /// Consume a nullifier. Returns `false`, leaving the set untouched, if it was already used.
    pub fn insert(&mut self, nullifier: Field) -> bool {
        self.used.insert(nullifier)
    }

    pub fn len(&self) -> usize {
        self.used.len()
    }

    pub fn is_empty(&self) -> bool {
        self.used.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &Field> {
        self.used.iter()
    }
}
