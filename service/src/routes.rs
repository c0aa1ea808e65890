//! HTTP surface.
//!
//! | Method | Path | Success |
//! |---|---|---|
//! | GET | `/` | 200 home page |
//! | GET | `/todo/` | 200 `{data: [TodoView]}` |
//! | POST | `/todo/` | 201 `{message, todoId}` |
//! | PUT | `/todo/{id}` | 200 `{message}` |
//! | DELETE | `/todo/{id}` | 200 `{message}` |
//!
//! Failures are `{message}` or, for storage failures, `{message, error}`.
//! The collection routes also answer without the trailing slash. A store
//! call that outlives the service timeout is a storage failure like any other.

use axum::{
    extract::{rejection::JsonRejection, Path, State},
    http::StatusCode,
    response::{Html, IntoResponse, Response},
    routing::{get, put},
    Json, Router,
};
use serde::{Deserialize, Serialize};
use tower_http::trace::TraceLayer;

use crate::error::TodoError;
use crate::model::{CreateTodo, TodoView, UpdateTodo};
use crate::service::TodoService;

const HOME_PAGE: &str = include_str!("../static/home.html");

pub const TODO_NOT_FOUND: &str = "Todo not found";

#[derive(Debug, Serialize, Deserialize)]
pub struct TodoList {
    pub data: Vec<TodoView>,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct Created {
    pub message: String,
    #[serde(rename = "todoId")]
    pub todo_id: String,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct Message {
    pub message: String,
}

/// Body of every failure response.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ErrorBody {
    pub message: String,
    /// Underlying cause, only for storage failures. Already redacted.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

#[derive(Debug, Clone)]
pub struct ApiErrorResponse {
    pub status: StatusCode,
    pub body: ErrorBody,
}

impl ApiErrorResponse {
    pub fn new(status: StatusCode, message: impl Into<String>) -> Self {
        Self {
            status,
            body: ErrorBody {
                message: message.into(),
                error: None,
            },
        }
    }

    pub fn bad_request(message: impl Into<String>) -> Self {
        Self::new(StatusCode::BAD_REQUEST, message)
    }

    pub fn not_found(message: impl Into<String>) -> Self {
        Self::new(StatusCode::NOT_FOUND, message)
    }

    pub fn unprocessable(message: impl Into<String>) -> Self {
        Self::new(StatusCode::UNPROCESSABLE_ENTITY, message)
    }

    /// Maps a service failure. `failed` is the message used when the store
    /// is at fault, e.g. "Failed to save todo".
    pub fn from_todo_error(error: TodoError, failed: &str) -> Self {
        match error {
            TodoError::Validation(message) => Self::bad_request(message),
            TodoError::InvalidId(_) => Self::bad_request(TODO_NOT_FOUND),
            TodoError::NotFound(_) => Self::not_found(TODO_NOT_FOUND),
            TodoError::Storage(cause) => {
                tracing::warn!(error = %cause, "{failed}");
                Self {
                    status: StatusCode::UNPROCESSABLE_ENTITY,
                    body: ErrorBody {
                        message: failed.to_string(),
                        error: Some(cause.to_string()),
                    },
                }
            }
        }
    }
}

impl IntoResponse for ApiErrorResponse {
    fn into_response(self) -> Response {
        (self.status, Json(self.body)).into_response()
    }
}

impl From<JsonRejection> for ApiErrorResponse {
    fn from(rejection: JsonRejection) -> Self {
        Self::bad_request(rejection.body_text())
    }
}

/// Builds the router. Every request is traced.
pub fn app(service: TodoService) -> Router {
    Router::new()
        .route("/", get(home))
        .route("/todo", get(list_todos).post(create_todo))
        .route("/todo/", get(list_todos).post(create_todo))
        .route("/todo/{id}", put(update_todo).delete(delete_todo))
        .layer(TraceLayer::new_for_http())
        .with_state(service)
}

async fn home() -> Html<&'static str> {
    Html(HOME_PAGE)
}

async fn list_todos(State(service): State<TodoService>) -> Result<Json<TodoList>, ApiErrorResponse> {
    let data = service
        .list_todos()
        .await
        .map_err(|e| ApiErrorResponse::from_todo_error(e, "Failed to fetch todo"))?;
    Ok(Json(TodoList { data }))
}

async fn create_todo(
    State(service): State<TodoService>,
    payload: Result<Json<CreateTodo>, JsonRejection>,
) -> Result<(StatusCode, Json<Created>), ApiErrorResponse> {
    let Json(input) = payload?;
    let id = service
        .create_todo(input)
        .await
        .map_err(|e| ApiErrorResponse::from_todo_error(e, "Failed to save todo"))?;
    Ok((
        StatusCode::CREATED,
        Json(Created {
            message: "Todo created successfully".to_string(),
            todo_id: id.to_string(),
        }),
    ))
}

async fn update_todo(
    State(service): State<TodoService>,
    Path(id): Path<String>,
    payload: Result<Json<UpdateTodo>, JsonRejection>,
) -> Result<Json<Message>, ApiErrorResponse> {
    let Json(input) = payload?;
    service
        .update_todo(&id, input)
        .await
        .map_err(|e| match e {
            // Update reports a blank title as unprocessable, create as bad request.
            TodoError::Validation(message) => ApiErrorResponse::unprocessable(message),
            other => ApiErrorResponse::from_todo_error(other, "Failed to update todo"),
        })?;
    Ok(Json(Message {
        message: "Todo updated successfully".to_string(),
    }))
}

async fn delete_todo(
    State(service): State<TodoService>,
    Path(id): Path<String>,
) -> Result<Json<Message>, ApiErrorResponse> {
    service
        .delete_todo(&id)
        .await
        .map_err(|e| ApiErrorResponse::from_todo_error(e, "Failed to delete todo"))?;
    Ok(Json(Message {
        message: "Todo deleted successfully".to_string(),
    }))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::StoreError;
    use crate::model::InvalidTodoId;

    #[test]
    fn error_mapping_matches_the_http_contract() {
        let cases = [
            (TodoError::Validation("Title is required".into()), StatusCode::BAD_REQUEST),
            (TodoError::InvalidId(InvalidTodoId("x".into())), StatusCode::BAD_REQUEST),
            (TodoError::NotFound("id".into()), StatusCode::NOT_FOUND),
            (
                TodoError::Storage(StoreError::backend("boom")),
                StatusCode::UNPROCESSABLE_ENTITY,
            ),
        ];
        for (error, status) in cases {
            assert_eq!(ApiErrorResponse::from_todo_error(error, "Failed").status, status);
        }
    }

    #[test]
    fn storage_failures_echo_the_cause() {
        let response = ApiErrorResponse::from_todo_error(
            TodoError::Storage(StoreError::unavailable("postgres://u:pw@db refused")),
            "Failed to fetch todo",
        );
        assert_eq!(response.body.message, "Failed to fetch todo");
        let cause = response.body.error.unwrap();
        assert!(cause.contains("refused"));
        assert!(!cause.contains("pw"));
    }

    #[test]
    fn client_errors_carry_no_cause() {
        let body = serde_json::to_value(ApiErrorResponse::bad_request("nope").body).unwrap();
        assert_eq!(body, serde_json::json!({ "message": "nope" }));
    }
}
