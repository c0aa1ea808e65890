//! The four todo operations.
//!
//! # Design
//! `TodoService` validates input, turns wire DTOs into store calls and
//! reports outcomes as `TodoError`. It knows nothing about HTTP. The store
//! handle is injected and shared, so cloning the service is cheap.
//!
//! Every store call is bounded by the service's timeout. An elapsed call is
//! dropped, which cancels it, and reported as `StoreError::Unavailable`.

use std::future::Future;
use std::sync::Arc;
use std::time::Duration;

use chrono::Utc;

use crate::config::DEFAULT_REQUEST_TIMEOUT;
use crate::error::{StoreError, TodoError};
use crate::model::{CreateTodo, NewTodo, TodoChanges, TodoId, TodoView, UpdateTodo};
use crate::store::{InMemoryTodoStore, TodoStore};

pub const TITLE_REQUIRED: &str = "Title is required";

#[derive(Clone)]
pub struct TodoService {
    store: Arc<dyn TodoStore>,
    store_timeout: Duration,
}

impl TodoService {
    pub fn new(store: Arc<dyn TodoStore>) -> Self {
        Self {
            store,
            store_timeout: DEFAULT_REQUEST_TIMEOUT,
        }
    }

    /// Sets how long a single store call may take.
    #[must_use]
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.store_timeout = timeout;
        self
    }

    /// A service over a fresh, empty in-memory store.
    pub fn in_memory() -> Self {
        Self::new(Arc::new(InMemoryTodoStore::new()))
    }

    /// # Errors
    ///
    /// `TodoError::Storage` if the store read fails.
    pub async fn list_todos(&self) -> Result<Vec<TodoView>, TodoError> {
        let records = self.bounded(self.store.find_all()).await?;
        Ok(records.into_iter().map(TodoView::from).collect())
    }

    /// Stores a new, not yet completed todo and returns its id.
    ///
    /// # Errors
    ///
    /// `TodoError::Validation` if the title is blank, `TodoError::Storage`
    /// if the insert fails. Nothing is stored in either case.
    pub async fn create_todo(&self, input: CreateTodo) -> Result<TodoId, TodoError> {
        let title = required_title(&input.title)?;
        let record = self
            .bounded(self.store.insert(NewTodo {
                title,
                notes: input.notes,
                created_at: Utc::now(),
            }))
            .await?;
        tracing::debug!(id = %record.id, "todo created");
        Ok(record.id)
    }

    /// Replaces title, notes and completion of the todo with `id`.
    ///
    /// # Errors
    ///
    /// `TodoError::InvalidId` if `id` does not parse, `TodoError::Validation`
    /// if the title is blank, `TodoError::NotFound` if no todo has `id`,
    /// `TodoError::Storage` if the update fails.
    pub async fn update_todo(&self, id: &str, input: UpdateTodo) -> Result<TodoView, TodoError> {
        let id: TodoId = id.parse()?;
        let changes = TodoChanges {
            title: required_title(&input.title)?,
            notes: input.notes,
            completed: input.completed,
        };
        match self.bounded(self.store.update(&id, changes)).await? {
            Some(record) => {
                tracing::debug!(%id, completed = record.completed, "todo updated");
                Ok(record.into())
            }
            None => Err(TodoError::NotFound(id.to_string())),
        }
    }

    /// # Errors
    ///
    /// `TodoError::InvalidId` if `id` does not parse, `TodoError::NotFound`
    /// if no todo has `id`, `TodoError::Storage` if the removal fails.
    pub async fn delete_todo(&self, id: &str) -> Result<(), TodoError> {
        let id: TodoId = id.parse()?;
        if self.bounded(self.store.remove(&id)).await? {
            tracing::debug!(%id, "todo deleted");
            Ok(())
        } else {
            Err(TodoError::NotFound(id.to_string()))
        }
    }
}

impl TodoService {
    async fn bounded<T>(
        &self,
        call: impl Future<Output = Result<T, StoreError>>,
    ) -> Result<T, StoreError> {
        tokio::time::timeout(self.store_timeout, call)
            .await
            .unwrap_or_else(|_| {
                Err(StoreError::unavailable(format!(
                    "store call timed out after {:?}",
                    self.store_timeout
                )))
            })
    }
}

fn required_title(title: &str) -> Result<String, TodoError> {
    let title = title.trim();
    if title.is_empty() {
        return Err(TodoError::Validation(TITLE_REQUIRED.to_string()));
    }
    Ok(title.to_string())
}
