use std::collections::BTreeMap;
use std::sync::Arc;

use async_trait::async_trait;
use tokio::sync::RwLock;

use super::TodoStore;
use crate::error::StoreError;
use crate::model::{NewTodo, TodoChanges, TodoId, TodoRecord};

/// Process-local store. Ids are time ordered, so iteration is creation order.
#[derive(Debug, Clone, Default)]
pub struct InMemoryTodoStore {
    todos: Arc<RwLock<BTreeMap<TodoId, TodoRecord>>>,
}

impl InMemoryTodoStore {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl TodoStore for InMemoryTodoStore {
    async fn init(&self) -> Result<(), StoreError> {
        Ok(())
    }

    async fn ping(&self) -> Result<(), StoreError> {
        Ok(())
    }

    async fn insert(&self, todo: NewTodo) -> Result<TodoRecord, StoreError> {
        let record = todo.into_record(TodoId::generate());
        self.todos.write().await.insert(record.id, record.clone());
        Ok(record)
    }

    async fn find_all(&self) -> Result<Vec<TodoRecord>, StoreError> {
        Ok(self.todos.read().await.values().cloned().collect())
    }

    async fn update(
        &self,
        id: &TodoId,
        changes: TodoChanges,
    ) -> Result<Option<TodoRecord>, StoreError> {
        let mut todos = self.todos.write().await;
        Ok(todos.get_mut(id).map(|record| {
            changes.apply(record);
            record.clone()
        }))
    }

    async fn remove(&self, id: &TodoId) -> Result<bool, StoreError> {
        Ok(self.todos.write().await.remove(id).is_some())
    }
}
