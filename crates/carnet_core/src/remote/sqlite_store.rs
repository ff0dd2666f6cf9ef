//! SQLite-backed collection store.
//!
//! # Responsibility
//! - Persist documents as JSON field maps keyed by `(collection, id)`.
//! - Push the full collection snapshot to every open subscription of a
//!   collection after each successful write.
//!
//! # Invariants
//! - A subscription receives the current snapshot as its first event.
//! - Closed subscriptions are pruned on the next publish.
//! - Snapshot document order is by id, which carries no meaning; consumers
//!   sort by their own keys.

use super::document::{Document, DocumentId, Fields};
use super::stream::{snapshot_channel, Snapshot, SnapshotEvent, SnapshotSender, SnapshotStream};
use super::{CollectionStore, RemoteError, RemoteResult};
use crate::db::{open_db, open_db_in_memory};
use chrono::Utc;
use log::{debug, error};
use rusqlite::{params, Connection, OptionalExtension};
use std::cell::RefCell;
use std::path::Path;
use uuid::Uuid;

/// Document store over one SQLite connection.
pub struct SqliteCollectionStore {
    conn: Connection,
    subscribers: RefCell<Vec<SnapshotSender>>,
}

impl SqliteCollectionStore {
    /// Wraps a connection that already went through `open_db`.
    pub fn new(conn: Connection) -> Self {
        Self {
            conn,
            subscribers: RefCell::new(Vec::new()),
        }
    }

    pub fn open(path: impl AsRef<Path>) -> RemoteResult<Self> {
        Ok(Self::new(open_db(path)?))
    }

    pub fn open_in_memory() -> RemoteResult<Self> {
        Ok(Self::new(open_db_in_memory()?))
    }

    /// Number of open subscriptions on `collection`.
    pub fn subscriber_count(&self, collection: &str) -> usize {
        self.prune_closed();
        self.subscribers
            .borrow()
            .iter()
            .filter(|sender| sender.collection() == collection)
            .count()
    }

    /// Reads every document of `collection`.
    pub fn load_collection(&self, collection: &str) -> RemoteResult<Vec<Document>> {
        let mut stmt = self.conn.prepare(
            "SELECT id, fields
             FROM documents
             WHERE collection = ?1
             ORDER BY id ASC;",
        )?;
        let mut rows = stmt.query([collection])?;
        let mut documents = Vec::new();

        while let Some(row) = rows.next()? {
            let id_text: String = row.get(0)?;
            let payload: String = row.get(1)?;
            documents.push(parse_document(collection, &id_text, &payload)?);
        }

        Ok(documents)
    }

    fn load_fields(&self, collection: &str, id: DocumentId) -> RemoteResult<Option<Fields>> {
        let payload: Option<String> = self
            .conn
            .query_row(
                "SELECT fields FROM documents WHERE collection = ?1 AND id = ?2;",
                params![collection, id.to_string()],
                |row| row.get(0),
            )
            .optional()?;

        match payload {
            Some(payload) => Ok(Some(serde_json::from_str(&payload)?)),
            None => Ok(None),
        }
    }

    fn prune_closed(&self) {
        self.subscribers.borrow_mut().retain(SnapshotSender::is_open);
    }

    fn publish(&self, collection: &str) {
        self.prune_closed();
        let targets: Vec<SnapshotSender> = self
            .subscribers
            .borrow()
            .iter()
            .filter(|sender| sender.collection() == collection)
            .cloned()
            .collect();
        if targets.is_empty() {
            return;
        }

        let event = match self.load_collection(collection) {
            Ok(documents) => {
                debug!(
                    "event=snapshot_publish module=remote status=ok collection={} documents={} subscribers={}",
                    collection,
                    documents.len(),
                    targets.len()
                );
                SnapshotEvent::Snapshot(Snapshot {
                    collection: collection.to_string(),
                    documents,
                })
            }
            Err(err) => {
                error!(
                    "event=snapshot_publish module=remote status=error collection={} error={}",
                    collection, err
                );
                SnapshotEvent::Error(err.to_string())
            }
        };

        for sender in &targets {
            sender.send(event.clone());
        }
    }
}

impl CollectionStore for SqliteCollectionStore {
    fn subscribe(&self, collection: &str) -> RemoteResult<SnapshotStream> {
        let documents = self.load_collection(collection)?;
        let (sender, stream) = snapshot_channel(collection);
        sender.send_snapshot(documents);
        self.subscribers.borrow_mut().push(sender);

        debug!("event=subscribe module=remote status=ok collection={collection}");
        Ok(stream)
    }

    fn add(&self, collection: &str, fields: Fields) -> RemoteResult<DocumentId> {
        let id = Uuid::new_v4();
        let now_ms = Utc::now().timestamp_millis();
        self.conn.execute(
            "INSERT INTO documents (collection, id, fields, created_at, updated_at)
             VALUES (?1, ?2, ?3, ?4, ?4);",
            params![collection, id.to_string(), serde_json::to_string(&fields)?, now_ms],
        )?;

        debug!("event=document_add module=remote status=ok collection={collection} id={id}");
        self.publish(collection);
        Ok(id)
    }

    fn update(&self, collection: &str, id: DocumentId, fields: Fields) -> RemoteResult<()> {
        let mut merged = self
            .load_fields(collection, id)?
            .ok_or_else(|| RemoteError::NotFound {
                collection: collection.to_string(),
                id,
            })?;
        merged.extend(fields);

        self.conn.execute(
            "UPDATE documents
             SET fields = ?1, updated_at = ?2
             WHERE collection = ?3 AND id = ?4;",
            params![
                serde_json::to_string(&merged)?,
                Utc::now().timestamp_millis(),
                collection,
                id.to_string(),
            ],
        )?;

        debug!("event=document_update module=remote status=ok collection={collection} id={id}");
        self.publish(collection);
        Ok(())
    }

    fn delete(&self, collection: &str, id: DocumentId) -> RemoteResult<()> {
        let changed = self.conn.execute(
            "DELETE FROM documents WHERE collection = ?1 AND id = ?2;",
            params![collection, id.to_string()],
        )?;
        if changed == 0 {
            return Err(RemoteError::NotFound {
                collection: collection.to_string(),
                id,
            });
        }

        debug!("event=document_delete module=remote status=ok collection={collection} id={id}");
        self.publish(collection);
        Ok(())
    }
}

fn parse_document(collection: &str, id_text: &str, payload: &str) -> RemoteResult<Document> {
    let id = Uuid::parse_str(id_text).map_err(|_| {
        RemoteError::InvalidData(format!(
            "invalid document id `{id_text}` in collection `{collection}`"
        ))
    })?;
    let fields: Fields = serde_json::from_str(payload).map_err(|err| {
        RemoteError::InvalidData(format!("{collection}/{id}: unreadable fields: {err}"))
    })?;
    Ok(Document::new(id, fields))
}
