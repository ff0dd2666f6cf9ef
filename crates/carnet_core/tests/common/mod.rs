#![allow(dead_code)]

use carnet_core::remote::{
    fields, snapshot_channel, CollectionStore, Document, DocumentId, FieldValue, Fields,
    RemoteError, RemoteResult, SnapshotEvent, SnapshotSender, SnapshotStream, StoreTimestamp,
};
use chrono::{DateTime, NaiveDate, TimeZone, Utc};
use rust_decimal::Decimal;
use std::cell::{Cell, RefCell};
use std::str::FromStr;
use uuid::Uuid;

/// One recorded call against a `ScriptedStore`.
#[derive(Debug, Clone, PartialEq)]
pub enum Call {
    Subscribe(String),
    Add(String, Fields),
    Update(String, DocumentId, Fields),
    Delete(String, DocumentId),
}

/// Collection store double: pushes only what the test scripts, records
/// every call and fails writes on demand.
#[derive(Default)]
pub struct ScriptedStore {
    senders: RefCell<Vec<SnapshotSender>>,
    calls: RefCell<Vec<Call>>,
    fail_writes: Cell<bool>,
    fail_subscribe: Cell<bool>,
}

impl ScriptedStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn fail_writes(&self, fail: bool) {
        self.fail_writes.set(fail);
    }

    pub fn fail_subscribe(&self, fail: bool) {
        self.fail_subscribe.set(fail);
    }

    pub fn calls(&self) -> Vec<Call> {
        self.calls.borrow().clone()
    }

    pub fn write_count(&self) -> usize {
        self.calls
            .borrow()
            .iter()
            .filter(|call| !matches!(call, Call::Subscribe(_)))
            .count()
    }

    pub fn open_subscriptions(&self, collection: &str) -> usize {
        self.senders
            .borrow()
            .iter()
            .filter(|sender| sender.collection() == collection && sender.is_open())
            .count()
    }

    /// Pushes a snapshot to every open subscription of `collection`.
    pub fn push(&self, collection: &str, documents: Vec<Document>) {
        for sender in self.targets(collection) {
            sender.send_snapshot(documents.clone());
        }
    }

    pub fn push_error(&self, collection: &str, message: &str) {
        for sender in self.targets(collection) {
            sender.send(SnapshotEvent::Error(message.to_string()));
        }
    }

    fn targets(&self, collection: &str) -> Vec<SnapshotSender> {
        self.senders
            .borrow()
            .iter()
            .filter(|sender| sender.collection() == collection)
            .cloned()
            .collect()
    }

    fn write(&self, call: Call) -> RemoteResult<()> {
        self.calls.borrow_mut().push(call);
        if self.fail_writes.get() {
            return Err(RemoteError::Unavailable("scripted failure".to_string()));
        }
        Ok(())
    }
}

impl CollectionStore for ScriptedStore {
    fn subscribe(&self, collection: &str) -> RemoteResult<SnapshotStream> {
        self.calls
            .borrow_mut()
            .push(Call::Subscribe(collection.to_string()));
        if self.fail_subscribe.get() {
            return Err(RemoteError::Unavailable("scripted failure".to_string()));
        }
        let (sender, stream) = snapshot_channel(collection);
        self.senders.borrow_mut().push(sender);
        Ok(stream)
    }

    fn add(&self, collection: &str, fields: Fields) -> RemoteResult<DocumentId> {
        self.write(Call::Add(collection.to_string(), fields))?;
        Ok(Uuid::new_v4())
    }

    fn update(&self, collection: &str, id: DocumentId, fields: Fields) -> RemoteResult<()> {
        self.write(Call::Update(collection.to_string(), id, fields))
    }

    fn delete(&self, collection: &str, id: DocumentId) -> RemoteResult<()> {
        self.write(Call::Delete(collection.to_string(), id))
    }
}

pub fn at(day: u32, hour: u32) -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2024, 5, day, hour, 0, 0).unwrap()
}

pub fn fixed_now() -> DateTime<Utc> {
    at(20, 12)
}

pub fn dec(value: &str) -> Decimal {
    Decimal::from_str(value).unwrap()
}

pub fn id(n: u128) -> DocumentId {
    Uuid::from_u128(n)
}

pub fn task_doc(id: DocumentId, text: &str, created_at: DateTime<Utc>) -> Document {
    Document::new(
        id,
        fields([
            ("tache", FieldValue::from(text)),
            ("fait", FieldValue::from(false)),
            ("date_ajout", FieldValue::from(created_at)),
            ("date_finit", FieldValue::Null),
        ]),
    )
}

pub fn done_task_doc(id: DocumentId, text: &str, created_at: DateTime<Utc>) -> Document {
    let mut document = task_doc(id, text, created_at);
    document
        .fields
        .insert("fait".to_string(), FieldValue::from(true));
    document
        .fields
        .insert("date_finit".to_string(), FieldValue::from(created_at));
    document
}

pub fn expense_doc(
    id: DocumentId,
    amount: &str,
    tax_applicable: bool,
    created_at: DateTime<Utc>,
) -> Document {
    Document::new(
        id,
        fields([
            ("montant", FieldValue::from(dec(amount))),
            ("description", FieldValue::from("Plein d'essence")),
            ("categorie", FieldValue::from("Véhicule")),
            (
                "date",
                FieldValue::Timestamp(StoreTimestamp::from_date(
                    NaiveDate::from_ymd_opt(2024, 5, 2).unwrap(),
                )),
            ),
            ("date_ajout", FieldValue::from(created_at)),
            ("isTVAApplicable", FieldValue::from(tax_applicable)),
        ]),
    )
}

pub fn income_doc(id: DocumentId, amount: &str, created_at: DateTime<Utc>) -> Document {
    Document::new(
        id,
        fields([
            ("montant", FieldValue::from(dec(amount))),
            ("description", FieldValue::from("Facture client")),
            ("categorie", FieldValue::from("Prestations")),
            ("date_ajout", FieldValue::from(created_at)),
        ]),
    )
}
