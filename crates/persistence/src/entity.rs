//! Entity base: the audit fields every audited record carries.

use chrono::{DateTime, Utc};
use common::Actor;
use serde::{Deserialize, Serialize};

/// Audit metadata recorded on every commit that touches an audited entity.
///
/// The created stamp is written once, by the commit that carries the create
/// intent. The last-modified stamp is rewritten by every later update or
/// delete commit. Deleted records are kept as tombstones.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct AuditFields {
    created_date: Option<DateTime<Utc>>,
    created_by: Option<String>,
    last_modified_date: Option<DateTime<Utc>>,
    last_modified_by: Option<String>,
    deleted: bool,
}

impl AuditFields {
    /// Rebuilds audit fields from stored columns.
    pub fn restore(
        created_date: Option<DateTime<Utc>>,
        created_by: Option<String>,
        last_modified_date: Option<DateTime<Utc>>,
        last_modified_by: Option<String>,
        deleted: bool,
    ) -> Self {
        Self {
            created_date,
            created_by,
            last_modified_date,
            last_modified_by,
            deleted,
        }
    }

    pub fn created_date(&self) -> Option<DateTime<Utc>> {
        self.created_date
    }

    pub fn created_by(&self) -> Option<&str> {
        self.created_by.as_deref()
    }

    pub fn last_modified_date(&self) -> Option<DateTime<Utc>> {
        self.last_modified_date
    }

    pub fn last_modified_by(&self) -> Option<&str> {
        self.last_modified_by.as_deref()
    }

    /// Returns true if the record has been tombstoned by a delete commit.
    pub fn is_deleted(&self) -> bool {
        self.deleted
    }

    /// Marks the record as a tombstone.
    pub fn tombstone(&mut self) {
        self.deleted = true;
    }

    /// Audit fields for this stored record after it is replaced by `incoming`.
    ///
    /// The created stamp and tombstone flag stay as stored; only the
    /// last-modified stamp is taken from the incoming copy. A caller-supplied
    /// copy can never rewrite who created a record or when.
    pub fn replaced_by(&self, incoming: &AuditFields) -> AuditFields {
        AuditFields {
            created_date: self.created_date,
            created_by: self.created_by.clone(),
            last_modified_date: incoming.last_modified_date,
            last_modified_by: incoming.last_modified_by.clone(),
            deleted: self.deleted,
        }
    }

    /// Audit fields for a record being inserted: the created stamp only.
    ///
    /// Stores insert with this so a new record never starts out modified or
    /// tombstoned.
    pub fn for_insert(&self) -> AuditFields {
        AuditFields {
            created_date: self.created_date,
            created_by: self.created_by.clone(),
            ..AuditFields::default()
        }
    }

    /// Replaces every field with a fresh created stamp.
    pub(crate) fn stamp_created(&mut self, actor: &Actor, at: DateTime<Utc>) {
        *self = AuditFields {
            created_date: Some(at),
            created_by: Some(actor.as_str().to_string()),
            ..AuditFields::default()
        };
    }

    pub(crate) fn stamp_modified(&mut self, actor: &Actor, at: DateTime<Utc>) {
        self.last_modified_date = Some(at);
        self.last_modified_by = Some(actor.as_str().to_string());
    }
}

/// A record that can be written through a unit of work.
///
/// Entities that carry [`AuditFields`] expose them through [`Entity::audit`]
/// and [`Entity::audit_mut`]; entities that don't keep the default `None`
/// and are written without stamps.
pub trait Entity: Clone + Send + Sync + 'static {
    /// Store-assigned identifier type.
    type Id: Copy + Eq + std::hash::Hash + std::fmt::Debug + std::fmt::Display + Send + Sync;

    /// Returns the entity type name, used in errors and log fields.
    fn entity_type() -> &'static str;

    /// Returns the identifier, or `None` before the first successful commit.
    fn id(&self) -> Option<Self::Id>;

    /// Returns the audit fields, if this entity is audited.
    fn audit(&self) -> Option<&AuditFields> {
        None
    }

    /// Returns the audit fields mutably, if this entity is audited.
    fn audit_mut(&mut self) -> Option<&mut AuditFields> {
        None
    }
}
