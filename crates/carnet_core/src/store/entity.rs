//! Per-kind hooks plugged into the generic `EntityStore`.

use crate::remote::{Document, DocumentId, Fields, RemoteResult};
use chrono::{DateTime, Utc};

/// User-facing messages recorded in `EntityStore::error`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct StoreMessages {
    pub load: &'static str,
    pub add: &'static str,
    pub update: &'static str,
    pub remove: &'static str,
}

/// A record kind mirrored from one remote collection.
pub trait Entity: Clone {
    /// Input of `add`, already validated upstream.
    type Draft;
    /// Input of `update`.
    type Patch;

    const COLLECTION: &'static str;
    const MESSAGES: StoreMessages;

    fn id(&self) -> DocumentId;
    fn created_at(&self) -> DateTime<Utc>;

    /// Maps a snapshot document into a record, checking its invariants.
    fn decode(document: &Document) -> RemoteResult<Self>;

    /// Full document for a new record, including derived fields.
    fn draft_fields(draft: &Self::Draft, created_at: DateTime<Utc>) -> Fields;

    /// Partial document written by `update`.
    fn patch_fields(patch: &Self::Patch) -> Fields;

    /// Local mirror of `patch_fields`, used for the optimistic patch.
    fn apply_patch(&mut self, patch: &Self::Patch);
}
