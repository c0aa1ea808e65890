//! Wire DTOs for the todo API.
//!
//! # Design
//! These mirror the service's JSON but are defined independently so the
//! client does not pull in the server stack. Integration tests catch any
//! schema drift between the two crates.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// A todo as listed by the API.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct Todo {
    pub id: String,
    pub title: String,
    pub notes: String,
    pub completed: bool,
    pub created_at: DateTime<Utc>,
}

/// Request payload for creating a todo. New todos always start incomplete.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CreateTodo {
    pub title: String,
    #[serde(default)]
    pub notes: String,
}

/// Request payload for updating a todo. All three fields are replaced.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UpdateTodo {
    pub title: String,
    pub notes: String,
    pub completed: bool,
}

impl From<Todo> for UpdateTodo {
    fn from(todo: Todo) -> Self {
        Self {
            title: todo.title,
            notes: todo.notes,
            completed: todo.completed,
        }
    }
}

#[derive(Debug, Deserialize)]
pub(crate) struct TodoList {
    pub data: Vec<Todo>,
}

/// Acknowledgment of a successful create.
#[derive(Debug, Clone, Deserialize, PartialEq, Eq)]
pub struct Created {
    pub message: String,
    #[serde(rename = "todoId")]
    pub todo_id: String,
}

#[derive(Debug, Deserialize)]
pub(crate) struct Message {
    pub message: String,
}

#[derive(Debug, Default, Deserialize)]
pub(crate) struct ErrorBody {
    #[serde(default)]
    pub message: String,
    pub error: Option<String>,
}
