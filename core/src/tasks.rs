//! The `tasks` sub-resource client.
//!
//! # Design
//! Every operation is split into a pure `build_*` method that produces an
//! `HttpRequest` and a `parse_*` method that consumes an `HttpResponse`. The
//! plain-named method (`create_task`, ...) validates the payload, builds,
//! submits through the current transport and parses. Paths are relative to
//! the transport's base path.

use std::sync::Arc;

use serde::de::DeserializeOwned;
use serde::Serialize;
use tracing::debug;

use crate::error::ApiError;
use crate::formats::FormatRegistry;
use crate::http::{HttpMethod, HttpRequest, HttpResponse};
use crate::transport::ClientTransport;
use crate::types::{
    Comment, ListTasksParams, NewComment, NewTask, Task, TaskPage, UpdateTask, Validate,
};

/// Response header carrying the id of the last task on a page.
pub const LAST_TASK_ID_HEADER: &str = "x-last-task-id";

/// Client for the task operations of the API.
#[derive(Debug, Clone)]
pub struct TasksClient {
    transport: Arc<dyn ClientTransport>,
    formats: Arc<FormatRegistry>,
}

impl TasksClient {
    pub fn new(transport: Arc<dyn ClientTransport>, formats: Arc<FormatRegistry>) -> Self {
        Self { transport, formats }
    }

    /// Replace the transport used by subsequent operations.
    pub fn set_transport(&mut self, transport: Arc<dyn ClientTransport>) {
        self.transport = transport;
    }

    pub fn transport(&self) -> &Arc<dyn ClientTransport> {
        &self.transport
    }

    pub fn formats(&self) -> &Arc<FormatRegistry> {
        &self.formats
    }

    // -----------------------------------------------------------------------
    // Operations
    // -----------------------------------------------------------------------

    pub fn list_tasks(&self, params: &ListTasksParams) -> Result<TaskPage, ApiError> {
        let response = self.submit(self.build_list_tasks(params))?;
        self.parse_list_tasks(response)
    }

    pub fn create_task(&self, input: &NewTask) -> Result<Task, ApiError> {
        input.validate(&self.formats)?;
        let response = self.submit(self.build_create_task(input)?)?;
        self.parse_create_task(response)
    }

    pub fn get_task_details(&self, id: i64) -> Result<Task, ApiError> {
        let response = self.submit(self.build_get_task_details(id))?;
        self.parse_get_task_details(response)
    }

    pub fn update_task(&self, id: i64, input: &UpdateTask) -> Result<Task, ApiError> {
        input.validate(&self.formats)?;
        let response = self.submit(self.build_update_task(id, input)?)?;
        self.parse_update_task(response)
    }

    pub fn delete_task(&self, id: i64) -> Result<(), ApiError> {
        let response = self.submit(self.build_delete_task(id))?;
        self.parse_delete_task(response)
    }

    pub fn get_task_comments(&self, id: i64) -> Result<Vec<Comment>, ApiError> {
        let response = self.submit(self.build_get_task_comments(id))?;
        self.parse_get_task_comments(response)
    }

    pub fn add_comment_to_task(&self, id: i64, input: &NewComment) -> Result<Comment, ApiError> {
        input.validate(&self.formats)?;
        let response = self.submit(self.build_add_comment_to_task(id, input)?)?;
        self.parse_add_comment_to_task(response)
    }

    fn submit(&self, request: HttpRequest) -> Result<HttpResponse, ApiError> {
        debug!(method = request.method.as_str(), path = %request.path, "tasks operation");
        Ok(self.transport.submit(request)?)
    }

    // -----------------------------------------------------------------------
    // Request builders
    // -----------------------------------------------------------------------

    pub fn build_list_tasks(&self, params: &ListTasksParams) -> HttpRequest {
        let mut request = HttpRequest::new(HttpMethod::Get, "/tasks".to_string());
        request.query = params.to_query();
        request
    }

    pub fn build_create_task(&self, input: &NewTask) -> Result<HttpRequest, ApiError> {
        Ok(HttpRequest::new(HttpMethod::Post, "/tasks".to_string()).with_json_body(to_json(input)?))
    }

    pub fn build_get_task_details(&self, id: i64) -> HttpRequest {
        HttpRequest::new(HttpMethod::Get, format!("/tasks/{id}"))
    }

    pub fn build_update_task(&self, id: i64, input: &UpdateTask) -> Result<HttpRequest, ApiError> {
        Ok(HttpRequest::new(HttpMethod::Put, format!("/tasks/{id}")).with_json_body(to_json(input)?))
    }

    pub fn build_delete_task(&self, id: i64) -> HttpRequest {
        HttpRequest::new(HttpMethod::Delete, format!("/tasks/{id}"))
    }

    pub fn build_get_task_comments(&self, id: i64) -> HttpRequest {
        HttpRequest::new(HttpMethod::Get, format!("/tasks/{id}/comments"))
    }

    pub fn build_add_comment_to_task(
        &self,
        id: i64,
        input: &NewComment,
    ) -> Result<HttpRequest, ApiError> {
        Ok(HttpRequest::new(HttpMethod::Post, format!("/tasks/{id}/comments"))
            .with_json_body(to_json(input)?))
    }

    // -----------------------------------------------------------------------
    // Response parsers
    // -----------------------------------------------------------------------

    pub fn parse_list_tasks(&self, response: HttpResponse) -> Result<TaskPage, ApiError> {
        check_status(&response, 200)?;
        let last_task_id = response
            .header(LAST_TASK_ID_HEADER)
            .and_then(|v| v.trim().parse().ok());
        let tasks = from_json(&response.body)?;
        Ok(TaskPage {
            tasks,
            last_task_id,
        })
    }

    pub fn parse_create_task(&self, response: HttpResponse) -> Result<Task, ApiError> {
        check_status(&response, 201)?;
        from_json(&response.body)
    }

    pub fn parse_get_task_details(&self, response: HttpResponse) -> Result<Task, ApiError> {
        check_status(&response, 200)?;
        from_json(&response.body)
    }

    pub fn parse_update_task(&self, response: HttpResponse) -> Result<Task, ApiError> {
        check_status(&response, 200)?;
        from_json(&response.body)
    }

    pub fn parse_delete_task(&self, response: HttpResponse) -> Result<(), ApiError> {
        check_status(&response, 204)
    }

    pub fn parse_get_task_comments(&self, response: HttpResponse) -> Result<Vec<Comment>, ApiError> {
        check_status(&response, 200)?;
        from_json(&response.body)
    }

    pub fn parse_add_comment_to_task(&self, response: HttpResponse) -> Result<Comment, ApiError> {
        check_status(&response, 201)?;
        from_json(&response.body)
    }
}

fn to_json<T: Serialize>(value: &T) -> Result<String, ApiError> {
    serde_json::to_string(value).map_err(|e| ApiError::SerializationError(e.to_string()))
}

fn from_json<T: DeserializeOwned>(body: &str) -> Result<T, ApiError> {
    serde_json::from_str(body).map_err(|e| ApiError::DeserializationError(e.to_string()))
}

/// Map non-success status codes to the appropriate `ApiError` variant.
fn check_status(response: &HttpResponse, expected: u16) -> Result<(), ApiError> {
    if response.status == expected {
        return Ok(());
    }
    if response.status == 404 {
        return Err(ApiError::NotFound);
    }
    Err(ApiError::HttpError {
        status: response.status,
        body: response.body.clone(),
    })
}
