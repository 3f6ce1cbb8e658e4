use std::collections::HashSet;

use async_trait::async_trait;

use crate::{Entity, Intent, Mutation, Result, StoreError};

/// Write side of a durable store.
///
/// Implementations must apply a batch atomically: either every mutation
/// becomes visible to later reads, or none does.
///
/// - `Create` inserts the entity and assigns its identifier.
/// - `Update` replaces the stored record. The stored created stamp is kept.
/// - `Delete` tombstones audited entities and removes unaudited ones.
#[async_trait]
pub trait StoreWriter: Send + Sync {
    /// The entity type this store persists.
    type Entity: Entity;

    /// Writes the batch and returns the written entities in batch order,
    /// with identifiers assigned to created entities.
    async fn write(&self, batch: Vec<Mutation<Self::Entity>>) -> Result<Vec<Self::Entity>>;
}

/// Validates a batch before it is written.
///
/// Creates must not carry an identifier, updates and deletes must, and no
/// identifier may be targeted twice in one batch.
pub fn validate_batch<E: Entity>(batch: &[Mutation<E>]) -> Result<()> {
    let mut targeted = HashSet::new();

    for mutation in batch {
        match (mutation.intent(), mutation.entity().id()) {
            (Intent::Create, Some(id)) => {
                return Err(StoreError::InvalidMutation(format!(
                    "cannot create {} {id}: it already has an identifier",
                    E::entity_type()
                )));
            }
            (Intent::Create, None) => {}
            (intent, None) => {
                return Err(StoreError::InvalidMutation(format!(
                    "cannot {intent} a {} that was never persisted",
                    E::entity_type()
                )));
            }
            (_, Some(id)) => {
                if !targeted.insert(id) {
                    return Err(StoreError::InvalidMutation(format!(
                        "{} {id} is targeted more than once in the same batch",
                        E::entity_type()
                    )));
                }
            }
        }
    }

    Ok(())
}
