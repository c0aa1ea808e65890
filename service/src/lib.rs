//! HTTP service for a personal todo list.
//!
//! # Overview
//! JSON CRUD over a single collection of todos: list, create, update and
//! delete, plus a static home page. Storage is pluggable behind
//! [`store::TodoStore`]; an in-memory backend serves tests and local runs,
//! a `PostgreSQL` JSONB backend serves everything else.
//!
//! # Design
//! - [`service::TodoService`] holds the only decision logic (validation and
//!   outcome reporting) and is independent of HTTP.
//! - [`routes`] maps outcomes to status codes and JSON envelopes.
//! - The store handle is built once at startup and injected into the router
//!   state; there are no process-wide singletons.

pub mod config;
pub mod error;
pub mod model;
pub mod routes;
pub mod server;
pub mod service;
pub mod store;

use tokio::net::TcpListener;

pub use config::{Config, ConfigurationError, StoreMode};
pub use error::{StoreError, TodoError};
pub use model::{CreateTodo, TodoId, TodoView, UpdateTodo};
pub use routes::app;
pub use service::TodoService;

/// Serves an in-memory todo service on `listener` until the process is
/// killed. Meant for tests and local demos.
///
/// # Errors
///
/// Returns the I/O error if the server fails.
pub async fn run(listener: TcpListener) -> Result<(), std::io::Error> {
    axum::serve(listener, app(TodoService::in_memory())).await
}
