//! Audit stamping of a pending mutation set.

use std::sync::Arc;

use common::Actor;

use crate::clock::{Clock, SystemClock};
use crate::entity::Entity;
use crate::mutation::{Intent, Mutation};

/// Populates audit fields on a pending mutation set according to each intent.
///
/// - `Create` resets the audit fields and stamps the created date and author.
/// - `Update` stamps the last-modified date and author.
/// - `Delete` also stamps the last-modified date and author, so the tombstone
///   records who removed it and when.
///
/// Every mutation in one set receives the same timestamp. Entities that are
/// not audited are left untouched.
#[derive(Debug, Clone)]
pub struct AuditStamper {
    clock: Arc<dyn Clock>,
}

impl AuditStamper {
    /// Creates a stamper backed by the system clock.
    pub fn new() -> Self {
        Self::with_clock(Arc::new(SystemClock::new()))
    }

    /// Creates a stamper backed by the given clock.
    pub fn with_clock(clock: Arc<dyn Clock>) -> Self {
        Self { clock }
    }

    /// Stamps every audited entity in the set and returns how many were stamped.
    pub fn stamp<E: Entity>(&self, mutations: &mut [Mutation<E>], actor: &Actor) -> usize {
        let now = self.clock.now();
        let mut stamped = 0;

        for mutation in mutations.iter_mut() {
            let intent = mutation.intent();
            let Some(audit) = mutation.entity_mut().audit_mut() else {
                continue;
            };

            match intent {
                Intent::Create => audit.stamp_created(actor, now),
                Intent::Update | Intent::Delete => audit.stamp_modified(actor, now),
            }
            stamped += 1;
        }

        stamped
    }
}

impl Default for AuditStamper {
    fn default() -> Self {
        Self::new()
    }
}
