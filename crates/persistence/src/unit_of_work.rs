//! Unit of work: stamp a pending mutation set, then write it atomically.

use std::time::Instant;

use common::Actor;

use crate::{AuditStamper, Mutation, Result, StoreWriter};

/// Result of a successful commit.
#[derive(Debug, Clone)]
pub struct CommitOutcome<E> {
    /// Number of records written.
    pub affected: usize,

    /// The written entities in registration order, identifiers assigned.
    pub entities: Vec<E>,
}

/// A set of pending mutations committed as one atomic batch.
///
/// Stamps are applied to the batch handed to the store and nowhere else,
/// so a failed write leaves no audit metadata behind.
pub struct UnitOfWork<'a, S: StoreWriter> {
    store: &'a S,
    stamper: &'a AuditStamper,
    pending: Vec<Mutation<S::Entity>>,
}

impl<'a, S: StoreWriter> UnitOfWork<'a, S> {
    /// Starts an empty unit of work against a store.
    pub fn new(store: &'a S, stamper: &'a AuditStamper) -> Self {
        Self {
            store,
            stamper,
            pending: Vec::new(),
        }
    }

    /// Registers a tagged mutation.
    pub fn register(&mut self, mutation: Mutation<S::Entity>) -> &mut Self {
        self.pending.push(mutation);
        self
    }

    /// Registers a new entity to insert.
    pub fn register_new(&mut self, entity: S::Entity) -> &mut Self {
        self.register(Mutation::create(entity))
    }

    /// Registers a changed entity to replace.
    pub fn register_modified(&mut self, entity: S::Entity) -> &mut Self {
        self.register(Mutation::update(entity))
    }

    /// Registers an entity to delete.
    pub fn register_deleted(&mut self, entity: S::Entity) -> &mut Self {
        self.register(Mutation::delete(entity))
    }

    pub fn len(&self) -> usize {
        self.pending.len()
    }

    pub fn is_empty(&self) -> bool {
        self.pending.is_empty()
    }

    /// Stamps the pending set on behalf of `actor` and writes it atomically.
    #[tracing::instrument(skip(self, actor), fields(actor = %actor, pending = self.pending.len()))]
    pub async fn commit(self, actor: &Actor) -> Result<CommitOutcome<S::Entity>> {
        if self.pending.is_empty() {
            return Ok(CommitOutcome {
                affected: 0,
                entities: Vec::new(),
            });
        }

        let start = Instant::now();
        let mut batch = self.pending;
        let stamped = self.stamper.stamp(&mut batch, actor);

        match self.store.write(batch).await {
            Ok(entities) => {
                metrics::counter!("unit_of_work_commits_total").increment(1);
                metrics::histogram!("unit_of_work_commit_duration_seconds")
                    .record(start.elapsed().as_secs_f64());
                tracing::debug!(affected = entities.len(), stamped, "commit applied");

                Ok(CommitOutcome {
                    affected: entities.len(),
                    entities,
                })
            }
            Err(e) => {
                metrics::counter!("unit_of_work_commit_failures_total").increment(1);
                tracing::warn!(error = %e, "commit rejected by store");
                Err(e)
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use std::collections::BTreeMap;
    use std::sync::atomic::{AtomicBool, Ordering};

    use async_trait::async_trait;
    use tokio::sync::RwLock;

    use super::*;
    use crate::{AuditFields, Entity, Intent, StoreError, validate_batch};

    #[derive(Debug, Clone, Default, PartialEq)]
    struct Note {
        id: Option<u64>,
        text: String,
        audit: AuditFields,
    }

    impl Note {
        fn new(text: &str) -> Self {
            Self {
                text: text.to_string(),
                ..Default::default()
            }
        }
    }

    impl Entity for Note {
        type Id = u64;

        fn entity_type() -> &'static str {
            "Note"
        }

        fn id(&self) -> Option<u64> {
            self.id
        }

        fn audit(&self) -> Option<&AuditFields> {
            Some(&self.audit)
        }

        fn audit_mut(&mut self) -> Option<&mut AuditFields> {
            Some(&mut self.audit)
        }
    }

    #[derive(Default)]
    struct NoteStore {
        rows: RwLock<BTreeMap<u64, Note>>,
        fail_writes: AtomicBool,
    }

    #[async_trait]
    impl StoreWriter for NoteStore {
        type Entity = Note;

        async fn write(&self, batch: Vec<Mutation<Note>>) -> Result<Vec<Note>> {
            validate_batch(&batch)?;
            if self.fail_writes.load(Ordering::SeqCst) {
                return Err(StoreError::Unavailable("disk full".into()));
            }

            let mut rows = self.rows.write().await;
            let mut staged = rows.clone();
            let mut written = Vec::new();
            for mutation in batch {
                let (intent, mut note) = mutation.into_parts();
                match intent {
                    Intent::Create => {
                        let id = staged.keys().next_back().copied().unwrap_or(0) + 1;
                        note.id = Some(id);
                        staged.insert(id, note.clone());
                    }
                    Intent::Update => {
                        let id = note.id.unwrap_or_default();
                        let stored = staged.get(&id).ok_or(StoreError::NotFound {
                            entity_type: "Note",
                            id: id.to_string(),
                        })?;
                        note.audit = stored.audit.replaced_by(&note.audit);
                        staged.insert(id, note.clone());
                    }
                    Intent::Delete => {
                        note.audit.tombstone();
                        staged.insert(note.id.unwrap_or_default(), note.clone());
                    }
                }
                written.push(note);
            }
            *rows = staged;
            Ok(written)
        }
    }

    impl NoteStore {
        async fn get(&self, id: u64) -> Option<Note> {
            self.rows.read().await.get(&id).cloned()
        }
    }

    #[tokio::test]
    async fn commit_stamps_and_assigns_identifier() {
        let store = NoteStore::default();
        let stamper = AuditStamper::new();
        let mut uow = UnitOfWork::new(&store, &stamper);
        uow.register_new(Note::new("first"));

        let outcome = uow.commit(&Actor::new("alice")).await.unwrap();

        assert_eq!(outcome.affected, 1);
        let note = &outcome.entities[0];
        assert_eq!(note.id, Some(1));
        assert_eq!(note.audit.created_by(), Some("alice"));

        let stored = store.get(1).await.unwrap();
        assert_eq!(&stored, note);
    }

    #[tokio::test]
    async fn empty_commit_writes_nothing() {
        let store = NoteStore::default();
        store.fail_writes.store(true, Ordering::SeqCst);
        let stamper = AuditStamper::new();

        let uow = UnitOfWork::new(&store, &stamper);
        assert!(uow.is_empty());
        let outcome = uow.commit(&Actor::system()).await.unwrap();

        assert_eq!(outcome.affected, 0);
        assert!(outcome.entities.is_empty());
    }

    #[tokio::test]
    async fn failed_write_leaves_no_stamps_or_changes() {
        let store = NoteStore::default();
        let stamper = AuditStamper::new();

        let mut uow = UnitOfWork::new(&store, &stamper);
        uow.register_new(Note::new("original"));
        let created = uow.commit(&Actor::new("alice")).await.unwrap().entities[0].clone();

        store.fail_writes.store(true, Ordering::SeqCst);
        let mut edited = created.clone();
        edited.text = "edited".into();
        let mut uow = UnitOfWork::new(&store, &stamper);
        uow.register_modified(edited).register_new(Note::new("second"));
        assert_eq!(uow.len(), 2);

        let result = uow.commit(&Actor::new("bob")).await;

        assert!(matches!(result, Err(StoreError::Unavailable(_))));
        assert_eq!(store.get(1).await.unwrap(), created);
        assert!(store.get(2).await.is_none());
    }

    #[tokio::test]
    async fn partial_failure_rolls_back_whole_batch() {
        let store = NoteStore::default();
        let stamper = AuditStamper::new();

        let missing = Note {
            id: Some(99),
            ..Note::new("ghost")
        };
        let mut uow = UnitOfWork::new(&store, &stamper);
        uow.register_new(Note::new("would be first"))
            .register_modified(missing);

        let result = uow.commit(&Actor::system()).await;

        assert!(matches!(result, Err(StoreError::NotFound { .. })));
        assert!(store.get(1).await.is_none());
    }

    #[tokio::test]
    async fn update_and_delete_restamp_last_modified() {
        let store = NoteStore::default();
        let stamper = AuditStamper::new();

        let mut uow = UnitOfWork::new(&store, &stamper);
        uow.register_new(Note::new("draft"));
        let created = uow.commit(&Actor::new("alice")).await.unwrap().entities[0].clone();

        let mut uow = UnitOfWork::new(&store, &stamper);
        uow.register_modified(created.clone());
        let updated = uow.commit(&Actor::new("bob")).await.unwrap().entities[0].clone();
        assert_eq!(updated.audit.last_modified_by(), Some("bob"));
        assert_eq!(updated.audit.created_date(), created.audit.created_date());

        let mut uow = UnitOfWork::new(&store, &stamper);
        uow.register_deleted(updated.clone());
        let deleted = uow.commit(&Actor::new("carol")).await.unwrap().entities[0].clone();

        assert!(deleted.audit.is_deleted());
        assert_eq!(deleted.audit.last_modified_by(), Some("carol"));
        assert!(deleted.audit.last_modified_date() > updated.audit.last_modified_date());
        assert_eq!(deleted.audit.created_by(), Some("alice"));
    }
}
