//! Document store abstraction used for progress and session history.
//!
//! The state machines never touch a store; only the progress aggregator
//! does. Implementations live in this crate (`MemoryStore`) and in
//! `wordquest-store` (`JsonFileStore`).

use std::cmp::Ordering;
use std::fmt;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use uuid::Uuid;

use crate::error::StoreError;

// ---------------------------------------------------------------------------
// Document store trait
// ---------------------------------------------------------------------------

/// Trait for document stores with create/list/update semantics.
#[async_trait]
pub trait DocumentStore: Send + Sync {
    /// Human-readable store name (e.g. "memory").
    fn name(&self) -> &str;

    /// Insert a new record. Fails if the id is already taken.
    async fn create(&self, collection: Collection, document: Document)
        -> Result<Document, StoreError>;

    /// List records matching `query`.
    async fn list(
        &self,
        collection: Collection,
        query: &ListQuery,
    ) -> Result<Vec<Document>, StoreError>;

    /// Shallow-merge `patch` into an existing record and return the result.
    async fn update(
        &self,
        collection: Collection,
        id: Uuid,
        patch: Map<String, Value>,
    ) -> Result<Document, StoreError>;
}

/// The collections the engine persists.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Collection {
    Progress,
    Sessions,
}

impl Collection {
    pub const ALL: [Collection; 2] = [Collection::Progress, Collection::Sessions];

    pub fn name(self) -> &'static str {
        match self {
            Collection::Progress => "progress",
            Collection::Sessions => "sessions",
        }
    }
}

impl fmt::Display for Collection {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// A stored record: an id plus a flat JSON object.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Document {
    pub id: Uuid,
    pub fields: Map<String, Value>,
}

impl Document {
    /// Serialize a record into a document. The record must serialize to a
    /// JSON object.
    pub fn from_record<T: Serialize>(id: Uuid, record: &T) -> Result<Self, StoreError> {
        match serde_json::to_value(record)? {
            Value::Object(fields) => Ok(Self { id, fields }),
            other => Err(StoreError::Serialization(format!(
                "expected a JSON object, got {other}"
            ))),
        }
    }

    /// Deserialize the document back into a typed record.
    pub fn into_record<T: DeserializeOwned>(self) -> Result<T, StoreError> {
        Ok(serde_json::from_value(Value::Object(self.fields))?)
    }

    /// Apply a shallow merge patch. The id is never changed.
    pub fn merge(&mut self, patch: Map<String, Value>) {
        for (key, value) in patch {
            self.fields.insert(key, value);
        }
    }

    fn field(&self, name: &str) -> Option<&Value> {
        self.fields.get(name)
    }
}

// ---------------------------------------------------------------------------
// Queries
// ---------------------------------------------------------------------------

/// Sort direction for [`OrderBy`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Direction {
    Asc,
    Desc,
}

/// Ordering clause of a [`ListQuery`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OrderBy {
    pub field: String,
    pub direction: Direction,
}

/// Filter, order and limit for [`DocumentStore::list`].
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ListQuery {
    /// Field equality constraints, all of which must hold.
    #[serde(default)]
    pub filter: Vec<(String, Value)>,
    #[serde(default)]
    pub order: Option<OrderBy>,
    #[serde(default)]
    pub limit: Option<usize>,
}

impl ListQuery {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn where_eq(mut self, field: impl Into<String>, value: impl Into<Value>) -> Self {
        self.filter.push((field.into(), value.into()));
        self
    }

    pub fn order_by(mut self, field: impl Into<String>, direction: Direction) -> Self {
        self.order = Some(OrderBy {
            field: field.into(),
            direction,
        });
        self
    }

    pub fn limit(mut self, limit: Option<usize>) -> Self {
        self.limit = limit;
        self
    }

    pub fn matches(&self, document: &Document) -> bool {
        self.filter
            .iter()
            .all(|(field, expected)| document.field(field) == Some(expected))
    }

    /// Filter, sort and truncate documents given in insertion order.
    ///
    /// Ties keep insertion order when ascending and reverse insertion order
    /// when descending, so "newest first" holds even for equal timestamps.
    pub fn apply<'a, I>(&self, documents: I) -> Vec<Document>
    where
        I: IntoIterator<Item = &'a Document>,
        I::IntoIter: DoubleEndedIterator,
    {
        let iter = documents.into_iter();
        let mut selected: Vec<Document> = match self.order.as_ref().map(|o| o.direction) {
            Some(Direction::Desc) => iter.rev().filter(|d| self.matches(d)).cloned().collect(),
            _ => iter.filter(|d| self.matches(d)).cloned().collect(),
        };

        if let Some(order) = &self.order {
            selected.sort_by(|a, b| {
                let ord = compare_values(a.field(&order.field), b.field(&order.field));
                match order.direction {
                    Direction::Asc => ord,
                    Direction::Desc => ord.reverse(),
                }
            });
        }

        if let Some(limit) = self.limit {
            selected.truncate(limit);
        }
        selected
    }
}

/// Total order over optional JSON values used for sorting.
///
/// Missing values sort first. Strings that parse as RFC 3339 timestamps
/// compare chronologically since their textual form has variable precision.
pub fn compare_values(a: Option<&Value>, b: Option<&Value>) -> Ordering {
    match (a, b) {
        (None, None) => Ordering::Equal,
        (None, Some(_)) => Ordering::Less,
        (Some(_), None) => Ordering::Greater,
        (Some(Value::Number(x)), Some(Value::Number(y))) => {
            let x = x.as_f64().unwrap_or(f64::NAN);
            let y = y.as_f64().unwrap_or(f64::NAN);
            x.partial_cmp(&y).unwrap_or(Ordering::Equal)
        }
        (Some(Value::String(x)), Some(Value::String(y))) => {
            match (
                x.parse::<DateTime<Utc>>().ok(),
                y.parse::<DateTime<Utc>>().ok(),
            ) {
                (Some(tx), Some(ty)) => tx.cmp(&ty),
                _ => x.cmp(y),
            }
        }
        (Some(Value::Bool(x)), Some(Value::Bool(y))) => x.cmp(y),
        (Some(x), Some(y)) => x.to_string().cmp(&y.to_string()),
    }
}
