//! Persistence for todos.
//!
//! A `TodoStore` is a key-addressed collection of todo documents. Backends
//! own identifier generation, so nothing above this module depends on how
//! ids are encoded. Implementations must be safe to share between
//! concurrent requests; same-id writes race and the last one wins.

mod memory;
mod postgres;

use std::sync::Arc;

use async_trait::async_trait;

pub use memory::InMemoryTodoStore;
pub use postgres::PostgresTodoStore;

use crate::config::{Config, StoreMode};
use crate::error::StoreError;
use crate::model::{NewTodo, TodoChanges, TodoId, TodoRecord};

#[async_trait]
pub trait TodoStore: Send + Sync {
    /// Prepares the collection. Safe to call more than once.
    async fn init(&self) -> Result<(), StoreError>;

    /// Checks that the store answers.
    async fn ping(&self) -> Result<(), StoreError>;

    /// Persists `todo` under a freshly generated id and returns the record.
    async fn insert(&self, todo: NewTodo) -> Result<TodoRecord, StoreError>;

    /// Every stored todo, in the store's natural order.
    async fn find_all(&self) -> Result<Vec<TodoRecord>, StoreError>;

    /// Applies `changes` to the todo with `id`. `Ok(None)` if there is none.
    async fn update(
        &self,
        id: &TodoId,
        changes: TodoChanges,
    ) -> Result<Option<TodoRecord>, StoreError>;

    /// Deletes the todo with `id`. `Ok(false)` if there was none.
    async fn remove(&self, id: &TodoId) -> Result<bool, StoreError>;
}

/// Builds the backend selected by `config.store_mode`, initializes it and
/// checks that it answers.
///
/// # Errors
///
/// Returns `StoreError` if the store cannot be reached or prepared.
pub async fn connect(config: &Config) -> Result<Arc<dyn TodoStore>, StoreError> {
    let store: Arc<dyn TodoStore> = match config.store_mode {
        StoreMode::InMemory => Arc::new(InMemoryTodoStore::new()),
        StoreMode::Postgres => Arc::new(PostgresTodoStore::connect(config).await?),
    };
    store.ping().await?;
    store.init().await?;
    Ok(store)
}
