//! Tagged pending mutations.

use serde::{Deserialize, Serialize};

use crate::entity::Entity;

/// What a pending mutation intends to do to its entity.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Intent {
    Create,
    Update,
    Delete,
}

impl Intent {
    pub fn as_str(&self) -> &'static str {
        match self {
            Intent::Create => "create",
            Intent::Update => "update",
            Intent::Delete => "delete",
        }
    }
}

impl std::fmt::Display for Intent {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One entry of a pending mutation set: an entity tagged with its intent.
#[derive(Debug, Clone)]
pub struct Mutation<E> {
    intent: Intent,
    entity: E,
}

impl<E: Entity> Mutation<E> {
    pub fn new(intent: Intent, entity: E) -> Self {
        Self { intent, entity }
    }

    pub fn create(entity: E) -> Self {
        Self::new(Intent::Create, entity)
    }

    pub fn update(entity: E) -> Self {
        Self::new(Intent::Update, entity)
    }

    pub fn delete(entity: E) -> Self {
        Self::new(Intent::Delete, entity)
    }

    pub fn intent(&self) -> Intent {
        self.intent
    }

    pub fn entity(&self) -> &E {
        &self.entity
    }

    pub fn entity_mut(&mut self) -> &mut E {
        &mut self.entity
    }

    /// Splits the mutation into its intent and entity.
    pub fn into_parts(self) -> (Intent, E) {
        (self.intent, self.entity)
    }
}
