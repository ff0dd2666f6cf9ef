//! Document shapes exchanged with a remote collection store.
//!
//! # Responsibility
//! - Define the store-native field encoding (scalars, booleans, timestamps).
//! - Convert store-native timestamps into `DateTime<Utc>`.
//! - Provide typed field access for entity decoders.
//!
//! # Invariants
//! - Decimals travel as strings so amounts never pick up binary rounding.
//! - A missing field and an explicit `Null` read the same way.

use super::{RemoteError, RemoteResult};
use chrono::{DateTime, NaiveDate, NaiveTime, TimeZone, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use uuid::Uuid;

/// Store-assigned document identifier.
pub type DocumentId = Uuid;

/// Field map of one document. Ordered so encoded payloads are stable.
pub type Fields = BTreeMap<String, FieldValue>;

/// Store-native timestamp: whole seconds since the Unix epoch plus nanos.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct StoreTimestamp {
    pub seconds: i64,
    pub nanos: u32,
}

impl StoreTimestamp {
    pub fn now() -> Self {
        Self::from_datetime(Utc::now())
    }

    pub fn from_datetime(value: DateTime<Utc>) -> Self {
        Self {
            seconds: value.timestamp(),
            nanos: value.timestamp_subsec_nanos(),
        }
    }

    /// Timestamp for midnight UTC of a calendar day.
    pub fn from_date(value: NaiveDate) -> Self {
        Self::from_datetime(Utc.from_utc_datetime(&value.and_time(NaiveTime::default())))
    }

    /// Returns `None` when the stored pair is outside chrono's range.
    pub fn to_datetime(self) -> Option<DateTime<Utc>> {
        DateTime::from_timestamp(self.seconds, self.nanos)
    }
}

/// One encoded field value.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", content = "value", rename_all = "snake_case")]
pub enum FieldValue {
    Null,
    Bool(bool),
    Decimal(Decimal),
    Text(String),
    Timestamp(StoreTimestamp),
}

impl FieldValue {
    fn kind(&self) -> &'static str {
        match self {
            Self::Null => "null",
            Self::Bool(_) => "bool",
            Self::Decimal(_) => "decimal",
            Self::Text(_) => "text",
            Self::Timestamp(_) => "timestamp",
        }
    }
}

impl From<bool> for FieldValue {
    fn from(value: bool) -> Self {
        Self::Bool(value)
    }
}

impl From<Decimal> for FieldValue {
    fn from(value: Decimal) -> Self {
        Self::Decimal(value)
    }
}

impl From<String> for FieldValue {
    fn from(value: String) -> Self {
        Self::Text(value)
    }
}

impl From<&str> for FieldValue {
    fn from(value: &str) -> Self {
        Self::Text(value.to_string())
    }
}

impl From<DateTime<Utc>> for FieldValue {
    fn from(value: DateTime<Utc>) -> Self {
        Self::Timestamp(StoreTimestamp::from_datetime(value))
    }
}

impl<T: Into<FieldValue>> From<Option<T>> for FieldValue {
    fn from(value: Option<T>) -> Self {
        value.map_or(Self::Null, Into::into)
    }
}

/// One document as delivered in a snapshot.
#[derive(Debug, Clone, PartialEq)]
pub struct Document {
    pub id: DocumentId,
    pub fields: Fields,
}

impl Document {
    pub fn new(id: DocumentId, fields: Fields) -> Self {
        Self { id, fields }
    }

    /// Typed read access scoped to `collection` for error messages.
    pub fn reader<'a>(&'a self, collection: &'a str) -> FieldReader<'a> {
        FieldReader {
            collection,
            document: self,
        }
    }
}

/// Builds a `Fields` map from `(name, value)` pairs.
pub fn fields<I, K, V>(pairs: I) -> Fields
where
    I: IntoIterator<Item = (K, V)>,
    K: Into<String>,
    V: Into<FieldValue>,
{
    pairs
        .into_iter()
        .map(|(name, value)| (name.into(), value.into()))
        .collect()
}

/// Typed accessor over a document's fields.
///
/// Every failure is reported as `RemoteError::InvalidData` naming the
/// collection, document and field.
pub struct FieldReader<'a> {
    collection: &'a str,
    document: &'a Document,
}

impl FieldReader<'_> {
    fn get(&self, name: &str) -> Option<&FieldValue> {
        match self.document.fields.get(name) {
            None | Some(FieldValue::Null) => None,
            Some(value) => Some(value),
        }
    }

    fn invalid(&self, name: &str, reason: impl Into<String>) -> RemoteError {
        RemoteError::InvalidData(format!(
            "{}/{} field `{name}`: {}",
            self.collection,
            self.document.id,
            reason.into()
        ))
    }

    fn require(&self, name: &str) -> RemoteResult<&FieldValue> {
        self.get(name).ok_or_else(|| self.invalid(name, "missing"))
    }

    fn mismatch(&self, name: &str, expected: &str, found: &FieldValue) -> RemoteError {
        self.invalid(name, format!("expected {expected}, found {}", found.kind()))
    }

    pub fn text(&self, name: &str) -> RemoteResult<String> {
        match self.require(name)? {
            FieldValue::Text(value) => Ok(value.clone()),
            other => Err(self.mismatch(name, "text", other)),
        }
    }

    pub fn decimal(&self, name: &str) -> RemoteResult<Decimal> {
        match self.require(name)? {
            FieldValue::Decimal(value) => Ok(*value),
            other => Err(self.mismatch(name, "decimal", other)),
        }
    }

    pub fn decimal_or(&self, name: &str, default: Decimal) -> RemoteResult<Decimal> {
        match self.get(name) {
            None => Ok(default),
            Some(FieldValue::Decimal(value)) => Ok(*value),
            Some(other) => Err(self.mismatch(name, "decimal", other)),
        }
    }

    pub fn flag(&self, name: &str) -> RemoteResult<bool> {
        match self.require(name)? {
            FieldValue::Bool(value) => Ok(*value),
            other => Err(self.mismatch(name, "bool", other)),
        }
    }

    pub fn flag_or(&self, name: &str, default: bool) -> RemoteResult<bool> {
        match self.get(name) {
            None => Ok(default),
            Some(FieldValue::Bool(value)) => Ok(*value),
            Some(other) => Err(self.mismatch(name, "bool", other)),
        }
    }

    pub fn datetime(&self, name: &str) -> RemoteResult<DateTime<Utc>> {
        match self.require(name)? {
            FieldValue::Timestamp(value) => self.convert(name, *value),
            other => Err(self.mismatch(name, "timestamp", other)),
        }
    }

    pub fn optional_datetime(&self, name: &str) -> RemoteResult<Option<DateTime<Utc>>> {
        match self.get(name) {
            None => Ok(None),
            Some(FieldValue::Timestamp(value)) => self.convert(name, *value).map(Some),
            Some(other) => Err(self.mismatch(name, "timestamp", other)),
        }
    }

    /// Calendar day (UTC) of a timestamp field.
    pub fn date(&self, name: &str) -> RemoteResult<NaiveDate> {
        self.datetime(name).map(|value| value.date_naive())
    }

    fn convert(&self, name: &str, value: StoreTimestamp) -> RemoteResult<DateTime<Utc>> {
        value
            .to_datetime()
            .ok_or_else(|| self.invalid(name, format!("timestamp out of range: {value:?}")))
    }
}
