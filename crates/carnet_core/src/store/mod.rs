//! Entity stores: local mirrors of remote collections.
//!
//! # Responsibility
//! - Keep an ordered cache of one collection in sync with pushed snapshots.
//! - Forward add/update/remove to the remote store and track
//!   `loading`/`error` for the views.
//!
//! # Invariants
//! - After every applied snapshot the cache is sorted by creation time,
//!   most recent first.
//! - A failed `update`/`remove` leaves the cache as it was before the call.
//! - Remote failures are recorded in `error` and returned; they never panic.
//! - Only stores talk to the `CollectionStore`.

use crate::remote::{CollectionStore, Document, DocumentId, RemoteError, SnapshotEvent, SnapshotStream};
use chrono::{DateTime, Utc};
use log::{error, info, warn};
use std::error::Error;
use std::fmt::{Display, Formatter};

pub mod entity;
pub mod expense_store;
pub mod income_store;
pub mod task_store;

pub use entity::{Entity, StoreMessages};
pub use expense_store::ExpenseStore;
pub use income_store::IncomeStore;
pub use task_store::TaskStore;

pub type StoreResult<T> = Result<T, StoreError>;

/// Mutation or subscription failure surfaced by an entity store.
#[derive(Debug)]
pub enum StoreError {
    /// Remote write, read or subscribe failure.
    Persistence {
        message: &'static str,
        source: RemoteError,
    },
    /// The target id does not exist (any more).
    NotFound {
        message: &'static str,
        id: DocumentId,
    },
}

impl StoreError {
    fn from_remote(message: &'static str, err: RemoteError) -> Self {
        match err {
            RemoteError::NotFound { id, .. } => Self::NotFound { message, id },
            other => Self::Persistence {
                message,
                source: other,
            },
        }
    }

    /// Message shown to the user. Not-found and other persistence failures
    /// share the operation's generic message.
    pub fn user_message(&self) -> &'static str {
        match self {
            Self::Persistence { message, .. } | Self::NotFound { message, .. } => message,
        }
    }

    pub fn is_not_found(&self) -> bool {
        matches!(self, Self::NotFound { .. })
    }
}

impl Display for StoreError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Persistence { message, source } => write!(f, "{message}: {source}"),
            Self::NotFound { message, id } => write!(f, "{message}: document {id} not found"),
        }
    }
}

impl Error for StoreError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Persistence { source, .. } => Some(source),
            Self::NotFound { .. } => None,
        }
    }
}

/// Handle returned by `EntityStore::subscribe`.
#[must_use = "dropping the handle leaves the subscription open; pass it to `unsubscribe`"]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct SubscriptionHandle(u64);

/// Cached mirror of one collection, generic over the record kind and the
/// injected remote store.
pub struct EntityStore<E: Entity, S: CollectionStore> {
    remote: S,
    items: Vec<E>,
    loading: bool,
    error: Option<String>,
    subscriptions: Vec<(SubscriptionHandle, SnapshotStream)>,
    next_subscription: u64,
    clock: fn() -> DateTime<Utc>,
}

impl<E: Entity, S: CollectionStore> EntityStore<E, S> {
    pub fn new(remote: S) -> Self {
        Self {
            remote,
            items: Vec::new(),
            loading: false,
            error: None,
            subscriptions: Vec::new(),
            next_subscription: 0,
            clock: Utc::now,
        }
    }

    /// Replaces the time source used for creation and completion stamps.
    pub fn with_clock(mut self, clock: fn() -> DateTime<Utc>) -> Self {
        self.clock = clock;
        self
    }

    /// Cached records, most recent first.
    pub fn items(&self) -> &[E] {
        &self.items
    }

    pub fn get(&self, id: DocumentId) -> Option<&E> {
        self.items.iter().find(|item| item.id() == id)
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    pub fn is_loading(&self) -> bool {
        self.loading
    }

    pub fn error(&self) -> Option<&str> {
        self.error.as_deref()
    }

    pub fn clear_error(&mut self) {
        self.error = None;
    }

    pub fn remote(&self) -> &S {
        &self.remote
    }

    pub fn subscription_count(&self) -> usize {
        self.subscriptions.len()
    }

    /// Opens a new live subscription to the collection.
    ///
    /// Every call opens an independent stream; callers own the handles and
    /// must `unsubscribe` the ones they no longer need.
    pub fn subscribe(&mut self) -> StoreResult<SubscriptionHandle> {
        self.loading = true;
        self.error = None;

        match self.remote.subscribe(E::COLLECTION) {
            Ok(stream) => {
                let handle = SubscriptionHandle(self.next_subscription);
                self.next_subscription += 1;
                self.subscriptions.push((handle, stream));
                info!(
                    "event=store_subscribe module=store status=ok collection={} subscription={}",
                    E::COLLECTION,
                    handle.0
                );
                Ok(handle)
            }
            Err(err) => Err(self.fail(E::MESSAGES.load, "subscribe", err)),
        }
    }

    /// Closes one subscription. Returns `false` for an unknown handle.
    pub fn unsubscribe(&mut self, handle: SubscriptionHandle) -> bool {
        let Some(index) = self
            .subscriptions
            .iter()
            .position(|(candidate, _)| *candidate == handle)
        else {
            return false;
        };

        let (_, mut stream) = self.subscriptions.remove(index);
        stream.close();
        info!(
            "event=store_unsubscribe module=store status=ok collection={} subscription={}",
            E::COLLECTION,
            handle.0
        );
        true
    }

    /// Applies every queued push from every open subscription.
    ///
    /// Subscriptions are drained one after another in the order they were
    /// opened; events of one subscription keep their arrival order.
    /// Returns the number of events applied.
    pub fn poll_snapshots(&mut self) -> usize {
        let mut events = Vec::new();
        self.subscriptions.retain_mut(|(_, stream)| {
            events.extend(stream.drain());
            stream.is_open()
        });

        let applied = events.len();
        for event in events {
            self.apply_event(event);
        }
        applied
    }

    fn apply_event(&mut self, event: SnapshotEvent) {
        match event {
            SnapshotEvent::Snapshot(snapshot) => self.replace_with(&snapshot.documents),
            SnapshotEvent::Error(message) => {
                error!(
                    "event=store_snapshot module=store status=error collection={} error={}",
                    E::COLLECTION,
                    message
                );
                self.error = Some(E::MESSAGES.load.to_string());
                self.loading = false;
            }
        }
    }

    fn replace_with(&mut self, documents: &[Document]) {
        let mut items = Vec::with_capacity(documents.len());
        for document in documents {
            match E::decode(document) {
                Ok(item) => items.push(item),
                Err(err) => warn!(
                    "event=store_snapshot module=store status=skip collection={} id={} error={}",
                    E::COLLECTION,
                    document.id,
                    err
                ),
            }
        }
        items.sort_by(|a, b| {
            b.created_at()
                .cmp(&a.created_at())
                .then_with(|| a.id().cmp(&b.id()))
        });

        self.items = items;
        self.loading = false;
    }

    /// Writes a new record. The cache is not touched; the record shows up
    /// with the next applied snapshot.
    pub fn add(&mut self, draft: &E::Draft) -> StoreResult<DocumentId> {
        self.loading = true;
        self.error = None;

        let fields = E::draft_fields(draft, self.now());
        match self.remote.add(E::COLLECTION, fields) {
            Ok(id) => {
                self.loading = false;
                info!(
                    "event=store_add module=store status=ok collection={} id={}",
                    E::COLLECTION,
                    id
                );
                Ok(id)
            }
            Err(err) => Err(self.fail(E::MESSAGES.add, "add", err)),
        }
    }

    /// Writes `patch` to record `id`, patching the cached entry first.
    ///
    /// On failure the cached entry is restored.
    pub fn update(&mut self, id: DocumentId, patch: &E::Patch) -> StoreResult<()> {
        self.loading = true;
        self.error = None;

        let previous = self
            .items
            .iter_mut()
            .find(|item| item.id() == id)
            .map(|item| {
                let before = item.clone();
                item.apply_patch(patch);
                before
            });

        match self.remote.update(E::COLLECTION, id, E::patch_fields(patch)) {
            Ok(()) => {
                self.loading = false;
                info!(
                    "event=store_update module=store status=ok collection={} id={}",
                    E::COLLECTION,
                    id
                );
                Ok(())
            }
            Err(err) => {
                if let Some(before) = previous {
                    if let Some(slot) = self.items.iter_mut().find(|item| item.id() == id) {
                        *slot = before;
                    }
                }
                Err(self.fail(E::MESSAGES.update, "update", err))
            }
        }
    }

    /// Deletes record `id`, dropping it from the cache first.
    ///
    /// On failure the entry is put back at its former position.
    pub fn remove(&mut self, id: DocumentId) -> StoreResult<()> {
        self.loading = true;
        self.error = None;

        let removed = self
            .items
            .iter()
            .position(|item| item.id() == id)
            .map(|index| (index, self.items.remove(index)));

        match self.remote.delete(E::COLLECTION, id) {
            Ok(()) => {
                self.loading = false;
                info!(
                    "event=store_remove module=store status=ok collection={} id={}",
                    E::COLLECTION,
                    id
                );
                Ok(())
            }
            Err(err) => {
                if let Some((index, item)) = removed {
                    let index = index.min(self.items.len());
                    self.items.insert(index, item);
                }
                Err(self.fail(E::MESSAGES.remove, "remove", err))
            }
        }
    }

    fn now(&self) -> DateTime<Utc> {
        (self.clock)()
    }

    fn fail(&mut self, message: &'static str, operation: &str, err: RemoteError) -> StoreError {
        error!(
            "event=store_{} module=store status=error collection={} error={}",
            operation,
            E::COLLECTION,
            err
        );
        self.error = Some(message.to_string());
        self.loading = false;
        StoreError::from_remote(message, err)
    }
}
