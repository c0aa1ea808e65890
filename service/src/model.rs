//! Todo records and their wire representation.
//!
//! # Design
//! `TodoRecord` is what a store persists; `TodoView` is what goes over the
//! wire. The identifier is an opaque `TodoId`: callers parse and display it
//! but never look inside, and only stores mint new ones.

use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use thiserror::Error;
use uuid::Uuid;

/// Opaque, immutable identifier of a stored todo.
///
/// Freshly generated ids sort in creation order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct TodoId(Uuid);

impl TodoId {
    /// Mints a new unique id. Only store backends call this.
    pub(crate) fn generate() -> Self {
        Self(Uuid::now_v7())
    }

    pub(crate) const fn from_uuid(uuid: Uuid) -> Self {
        Self(uuid)
    }

    pub(crate) const fn as_uuid(&self) -> &Uuid {
        &self.0
    }
}

impl fmt::Display for TodoId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.0.fmt(f)
    }
}

/// The string handed in did not name a todo id.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("invalid todo id: {0:?}")]
pub struct InvalidTodoId(pub String);

impl FromStr for TodoId {
    type Err = InvalidTodoId;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Uuid::parse_str(s.trim())
            .map(Self)
            .map_err(|_| InvalidTodoId(s.to_string()))
    }
}

/// A persisted todo.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TodoRecord {
    pub id: TodoId,
    pub title: String,
    pub notes: String,
    pub completed: bool,
    pub created_at: DateTime<Utc>,
}

/// A validated todo that has not been stored yet. The store assigns the id.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewTodo {
    pub title: String,
    pub notes: String,
    pub created_at: DateTime<Utc>,
}

impl NewTodo {
    pub(crate) fn into_record(self, id: TodoId) -> TodoRecord {
        TodoRecord {
            id,
            title: self.title,
            notes: self.notes,
            completed: false,
            created_at: self.created_at,
        }
    }
}

/// The fields an update replaces. `id` and `created_at` are never touched.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TodoChanges {
    pub title: String,
    pub notes: String,
    pub completed: bool,
}

impl TodoChanges {
    pub(crate) fn apply(self, record: &mut TodoRecord) {
        record.title = self.title;
        record.notes = self.notes;
        record.completed = self.completed;
    }
}

/// Wire form of a todo.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TodoView {
    pub id: String,
    pub title: String,
    pub notes: String,
    pub completed: bool,
    pub created_at: DateTime<Utc>,
}

impl From<TodoRecord> for TodoView {
    fn from(record: TodoRecord) -> Self {
        Self {
            id: record.id.to_string(),
            title: record.title,
            notes: record.notes,
            completed: record.completed,
            created_at: record.created_at,
        }
    }
}

/// Request body for `POST /todo/`.
///
/// Missing fields default to empty so that an absent title is reported as a
/// validation failure rather than a malformed body.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct CreateTodo {
    #[serde(default)]
    pub title: String,
    #[serde(default)]
    pub notes: String,
}

/// Request body for `PUT /todo/{id}`. Replaces all mutable fields.
///
/// Unknown fields are ignored, so a `TodoView` can be sent back as-is.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct UpdateTodo {
    #[serde(default)]
    pub title: String,
    #[serde(default)]
    pub notes: String,
    #[serde(default)]
    pub completed: bool,
}
