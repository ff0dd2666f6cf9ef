//! Remote collection store contract.
//!
//! # Responsibility
//! - Define the per-collection subscribe/add/update/delete API that entity
//!   stores depend on.
//! - Model push notifications as cancellable snapshot streams.
//!
//! # Invariants
//! - The first event of every stream is the collection's current snapshot.
//! - A closed stream never yields another event.
//! - `update`/`delete` on a missing id fail with `RemoteError::NotFound`.

use crate::db::DbError;
use std::error::Error;
use std::fmt::{Display, Formatter};
use std::rc::Rc;

pub mod document;
pub mod sqlite_store;
mod stream;

pub use document::{fields, Document, DocumentId, FieldReader, FieldValue, Fields, StoreTimestamp};
pub use sqlite_store::SqliteCollectionStore;
pub use stream::{snapshot_channel, Snapshot, SnapshotEvent, SnapshotSender, SnapshotStream};

pub type RemoteResult<T> = Result<T, RemoteError>;

/// Failure reported by a collection store.
#[derive(Debug)]
pub enum RemoteError {
    NotFound {
        collection: String,
        id: DocumentId,
    },
    Db(DbError),
    InvalidData(String),
    Unavailable(String),
}

impl RemoteError {
    pub fn is_not_found(&self) -> bool {
        matches!(self, Self::NotFound { .. })
    }
}

impl Display for RemoteError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::NotFound { collection, id } => write!(f, "document not found: {collection}/{id}"),
            Self::Db(err) => write!(f, "{err}"),
            Self::InvalidData(message) => write!(f, "invalid document data: {message}"),
            Self::Unavailable(message) => write!(f, "collection store unavailable: {message}"),
        }
    }
}

impl Error for RemoteError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Db(err) => Some(err),
            _ => None,
        }
    }
}

impl From<DbError> for RemoteError {
    fn from(value: DbError) -> Self {
        Self::Db(value)
    }
}

impl From<rusqlite::Error> for RemoteError {
    fn from(value: rusqlite::Error) -> Self {
        Self::Db(DbError::Sqlite(value))
    }
}

impl From<serde_json::Error> for RemoteError {
    fn from(value: serde_json::Error) -> Self {
        Self::InvalidData(value.to_string())
    }
}

/// Document database exposing named collections.
pub trait CollectionStore {
    /// Opens a live subscription to `collection`.
    fn subscribe(&self, collection: &str) -> RemoteResult<SnapshotStream>;
    /// Writes a new document and returns its generated id.
    fn add(&self, collection: &str, fields: Fields) -> RemoteResult<DocumentId>;
    /// Merges `fields` into an existing document.
    fn update(&self, collection: &str, id: DocumentId, fields: Fields) -> RemoteResult<()>;
    fn delete(&self, collection: &str, id: DocumentId) -> RemoteResult<()>;
}

impl<T: CollectionStore + ?Sized> CollectionStore for &T {
    fn subscribe(&self, collection: &str) -> RemoteResult<SnapshotStream> {
        (**self).subscribe(collection)
    }

    fn add(&self, collection: &str, fields: Fields) -> RemoteResult<DocumentId> {
        (**self).add(collection, fields)
    }

    fn update(&self, collection: &str, id: DocumentId, fields: Fields) -> RemoteResult<()> {
        (**self).update(collection, id, fields)
    }

    fn delete(&self, collection: &str, id: DocumentId) -> RemoteResult<()> {
        (**self).delete(collection, id)
    }
}

impl<T: CollectionStore + ?Sized> CollectionStore for Rc<T> {
    fn subscribe(&self, collection: &str) -> RemoteResult<SnapshotStream> {
        (**self).subscribe(collection)
    }

    fn add(&self, collection: &str, fields: Fields) -> RemoteResult<DocumentId> {
        (**self).add(collection, fields)
    }

    fn update(&self, collection: &str, id: DocumentId, fields: Fields) -> RemoteResult<()> {
        (**self).update(collection, id, fields)
    }

    fn delete(&self, collection: &str, id: DocumentId) -> RemoteResult<()> {
        (**self).delete(collection, id)
    }
}
