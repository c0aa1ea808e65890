//! Stateless HTTP request builder and response parser for the todo API.
//!
//! # Design
//! `TodoClient` holds only a `base_url` and carries no mutable state between
//! calls. Each operation is split into a `build_*` method that produces an
//! `HttpRequest` and a `parse_*` method that consumes an `HttpResponse`.

use serde::de::DeserializeOwned;

use crate::error::ApiError;
use crate::http::{HttpMethod, HttpRequest, HttpResponse};
use crate::types::{CreateTodo, Created, ErrorBody, Message, Todo, TodoList, UpdateTodo};

/// Synchronous, stateless client for the todo API.
#[derive(Debug, Clone)]
pub struct TodoClient {
    base_url: String,
}

impl TodoClient {
    pub fn new(base_url: &str) -> Self {
        Self {
            base_url: base_url.trim_end_matches('/').to_string(),
        }
    }

    fn collection_url(&self) -> String {
        format!("{}/todo/", self.base_url)
    }

    fn item_url(&self, id: &str) -> String {
        format!("{}/todo/{id}", self.base_url)
    }

    pub fn build_list_todos(&self) -> HttpRequest {
        HttpRequest::new(HttpMethod::Get, self.collection_url())
    }

    pub fn build_create_todo(&self, input: &CreateTodo) -> Result<HttpRequest, ApiError> {
        let body = to_json(input)?;
        Ok(HttpRequest::new(HttpMethod::Post, self.collection_url()).with_json(body))
    }

    pub fn build_update_todo(&self, id: &str, input: &UpdateTodo) -> Result<HttpRequest, ApiError> {
        let body = to_json(input)?;
        Ok(HttpRequest::new(HttpMethod::Put, self.item_url(id)).with_json(body))
    }

    pub fn build_delete_todo(&self, id: &str) -> HttpRequest {
        HttpRequest::new(HttpMethod::Delete, self.item_url(id))
    }

    pub fn parse_list_todos(&self, response: HttpResponse) -> Result<Vec<Todo>, ApiError> {
        check_status(&response, 200)?;
        from_json::<TodoList>(&response.body).map(|list| list.data)
    }

    /// Returns the acknowledgment, including the new todo's id.
    pub fn parse_create_todo(&self, response: HttpResponse) -> Result<Created, ApiError> {
        check_status(&response, 201)?;
        from_json(&response.body)
    }

    /// Returns the confirmation message.
    pub fn parse_update_todo(&self, response: HttpResponse) -> Result<String, ApiError> {
        check_status(&response, 200)?;
        from_json::<Message>(&response.body).map(|m| m.message)
    }

    /// Returns the confirmation message.
    pub fn parse_delete_todo(&self, response: HttpResponse) -> Result<String, ApiError> {
        check_status(&response, 200)?;
        from_json::<Message>(&response.body).map(|m| m.message)
    }
}

fn to_json<T: serde::Serialize>(value: &T) -> Result<String, ApiError> {
    serde_json::to_string(value).map_err(|e| ApiError::SerializationError(e.to_string()))
}

fn from_json<T: DeserializeOwned>(body: &str) -> Result<T, ApiError> {
    serde_json::from_str(body).map_err(|e| ApiError::DeserializationError(e.to_string()))
}

/// Map non-success status codes to the matching `ApiError` variant.
fn check_status(response: &HttpResponse, expected: u16) -> Result<(), ApiError> {
    if response.status == expected {
        return Ok(());
    }
    let body: Option<ErrorBody> = serde_json::from_str(&response.body).ok();
    match (response.status, body) {
        (404, _) => Err(ApiError::NotFound),
        (400, Some(body)) => Err(ApiError::BadRequest {
            message: body.message,
        }),
        (422, Some(body)) => Err(ApiError::Unprocessable {
            message: body.message,
            error: body.error,
        }),
        (status, _) => Err(ApiError::HttpError {
            status,
            body: response.body.clone(),
        }),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const ID: &str = "0190f5a2-7c1e-7d3a-9b6e-2f4c8a1d0e5b";

    fn client() -> TodoClient {
        TodoClient::new("http://localhost:9090")
    }

    #[test]
    fn build_list_todos_produces_correct_request() {
        let req = client().build_list_todos();
        assert_eq!(req.method, HttpMethod::Get);
        assert_eq!(req.path, "http://localhost:9090/todo/");
        assert!(req.body.is_none());
        assert!(req.headers.is_empty());
    }

    #[test]
    fn build_create_todo_produces_correct_request() {
        let input = CreateTodo {
            title: "Buy milk".to_string(),
            notes: "2%".to_string(),
        };
        let req = client().build_create_todo(&input).unwrap();
        assert_eq!(req.method, HttpMethod::Post);
        assert_eq!(req.path, "http://localhost:9090/todo/");
        assert_eq!(req.header("Content-Type"), Some("application/json"));
        let body: serde_json::Value = serde_json::from_str(req.body.as_deref().unwrap()).unwrap();
        assert_eq!(body, serde_json::json!({ "title": "Buy milk", "notes": "2%" }));
    }

    #[test]
    fn build_update_todo_sends_all_fields() {
        let input = UpdateTodo {
            title: "Updated".to_string(),
            notes: String::new(),
            completed: true,
        };
        let req = client().build_update_todo(ID, &input).unwrap();
        assert_eq!(req.method, HttpMethod::Put);
        assert_eq!(req.path, format!("http://localhost:9090/todo/{ID}"));
        let body: serde_json::Value = serde_json::from_str(req.body.as_deref().unwrap()).unwrap();
        assert_eq!(body["title"], "Updated");
        assert_eq!(body["notes"], "");
        assert_eq!(body["completed"], true);
    }

    #[test]
    fn build_delete_todo_produces_correct_request() {
        let req = client().build_delete_todo(ID);
        assert_eq!(req.method.as_str(), "DELETE");
        assert!(req.path.ends_with(ID));
        assert!(req.body.is_none());
    }

    #[test]
    fn parse_list_todos_unwraps_the_data_envelope() {
        let response = HttpResponse::new(
            200,
            format!(
                r#"{{"data":[{{"id":"{ID}","title":"Test","notes":"","completed":false,"createdAt":"2024-05-01T12:00:00Z"}}]}}"#
            ),
        );
        let todos = client().parse_list_todos(response).unwrap();
        assert_eq!(todos.len(), 1);
        assert_eq!(todos[0].id, ID);
        assert_eq!(todos[0].title, "Test");
        assert_eq!(todos[0].created_at.to_rfc3339(), "2024-05-01T12:00:00+00:00");
    }

    #[test]
    fn parse_list_todos_storage_failure() {
        let response = HttpResponse::new(
            422,
            r#"{"message":"Failed to fetch todo","error":"store unavailable: timed out"}"#,
        );
        let err = client().parse_list_todos(response).unwrap_err();
        assert!(matches!(
            err,
            ApiError::Unprocessable { ref message, error: Some(ref cause) }
                if message == "Failed to fetch todo" && cause.contains("timed out")
        ));
    }

    #[test]
    fn parse_create_todo_success() {
        let response = HttpResponse::new(
            201,
            format!(r#"{{"message":"Todo created successfully","todoId":"{ID}"}}"#),
        );
        let created = client().parse_create_todo(response).unwrap();
        assert_eq!(created.todo_id, ID);
    }

    #[test]
    fn parse_create_todo_blank_title() {
        let response = HttpResponse::new(400, r#"{"message":"Title is required"}"#);
        let err = client().parse_create_todo(response).unwrap_err();
        assert!(matches!(err, ApiError::BadRequest { message } if message == "Title is required"));
    }

    #[test]
    fn parse_create_todo_wrong_status() {
        let response = HttpResponse::new(500, "internal error");
        let err = client().parse_create_todo(response).unwrap_err();
        assert!(matches!(err, ApiError::HttpError { status: 500, .. }));
    }

    #[test]
    fn parse_update_todo_success() {
        let response = HttpResponse::new(200, r#"{"message":"Todo updated successfully"}"#);
        assert_eq!(
            client().parse_update_todo(response).unwrap(),
            "Todo updated successfully"
        );
    }

    #[test]
    fn parse_delete_todo_not_found() {
        let response = HttpResponse::new(404, r#"{"message":"Todo not found"}"#);
        let err = client().parse_delete_todo(response).unwrap_err();
        assert!(matches!(err, ApiError::NotFound));
    }

    #[test]
    fn non_json_400_is_a_plain_http_error() {
        let response = HttpResponse::new(400, "oops");
        let err = client().parse_delete_todo(response).unwrap_err();
        assert!(matches!(err, ApiError::HttpError { status: 400, .. }));
    }

    #[test]
    fn trailing_slash_is_stripped() {
        let client = TodoClient::new("http://localhost:9090/");
        let req = client.build_list_todos();
        assert_eq!(req.path, "http://localhost:9090/todo/");
    }

    #[test]
    fn parse_list_todos_bad_json() {
        let response = HttpResponse::new(200, "not json");
        let err = client().parse_list_todos(response).unwrap_err();
        assert!(matches!(err, ApiError::DeserializationError(_)));
    }

    #[test]
    fn listed_todo_converts_into_an_update() {
        let todo = Todo {
            id: ID.to_string(),
            title: "t".to_string(),
            notes: "n".to_string(),
            completed: true,
            created_at: chrono::DateTime::from_timestamp(0, 0).unwrap(),
        };
        let update = UpdateTodo::from(todo);
        assert_eq!(update.title, "t");
        assert!(update.completed);
    }
}
