//! Domain DTOs for the task tracker API.
//!
//! # Design
//! Field names follow the API's camelCase JSON. Formatted strings (`date`,
//! `date-time`) stay as `String` and are checked against the client's
//! `FormatRegistry` through `Validate` before they leave the process, so a
//! custom registry can tighten or replace the rules.

use serde::{Deserialize, Serialize};

use crate::error::ValidationError;
use crate::formats::FormatRegistry;

pub const TITLE_MIN_LEN: usize = 5;
pub const TITLE_MAX_LEN: usize = 150;
pub const SEVERITY_RANGE: std::ops::RangeInclusive<u8> = 1..=5;

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "lowercase")]
pub enum TaskStatus {
    Open,
    Closed,
    Ignored,
    Rejected,
}

impl TaskStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            TaskStatus::Open => "open",
            TaskStatus::Closed => "closed",
            TaskStatus::Ignored => "ignored",
            TaskStatus::Rejected => "rejected",
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct Milestone {
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    /// Format `date`.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub due_date: Option<String>,
}

/// A task as returned by the API.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct Task {
    pub id: i64,
    pub title: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    pub status: TaskStatus,
    pub severity: u8,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub effort: Option<u32>,
    #[serde(default)]
    pub tags: Vec<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub milestone: Option<Milestone>,
    /// Format `date-time`.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub reported_at: Option<String>,
    /// Format `date-time`.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub last_updated: Option<String>,
}

/// Request payload for creating a task. The server assigns `id` and
/// timestamps; `status` defaults to open when omitted.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct NewTask {
    pub title: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub status: Option<TaskStatus>,
    pub severity: u8,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub effort: Option<u32>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub tags: Vec<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub milestone: Option<Milestone>,
}

/// Request payload for updating a task. Only the fields present in the JSON
/// are applied; omitted fields remain unchanged on the server.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct UpdateTask {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub status: Option<TaskStatus>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub severity: Option<u8>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub effort: Option<u32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub tags: Option<Vec<String>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub milestone: Option<Milestone>,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct Comment {
    pub id: i64,
    pub task_id: i64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub user: Option<String>,
    pub content: String,
    /// Format `date-time`.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub created_at: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct NewComment {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub user: Option<String>,
    pub content: String,
}

/// Filters for listing tasks.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ListTasksParams {
    /// Only return tasks with an id greater than this one.
    pub since_id: Option<i64>,
    pub tags: Vec<String>,
    pub status: Vec<TaskStatus>,
    pub page_size: Option<u32>,
}

impl ListTasksParams {
    /// Query pairs in the order the API documents them.
    pub fn to_query(&self) -> Vec<(String, String)> {
        let mut query = Vec::new();
        if let Some(since_id) = self.since_id {
            query.push(("sinceId".to_string(), since_id.to_string()));
        }
        if !self.tags.is_empty() {
            query.push(("tags".to_string(), self.tags.join(",")));
        }
        if !self.status.is_empty() {
            let status: Vec<&str> = self.status.iter().map(TaskStatus::as_str).collect();
            query.push(("status".to_string(), status.join(",")));
        }
        if let Some(page_size) = self.page_size {
            query.push(("pageSize".to_string(), page_size.to_string()));
        }
        query
    }
}

/// One page of `list_tasks`. Pass `last_task_id` as the next `since_id`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TaskPage {
    pub tasks: Vec<Task>,
    pub last_task_id: Option<i64>,
}

/// Client-side checks run before a payload is serialized.
pub trait Validate {
    fn validate(&self, formats: &FormatRegistry) -> Result<(), ValidationError>;
}

impl Validate for Milestone {
    fn validate(&self, formats: &FormatRegistry) -> Result<(), ValidationError> {
        if self.name.trim().is_empty() {
            return Err(constraint("milestone.name", "must not be empty"));
        }
        if let Some(due_date) = &self.due_date {
            formats.check("milestone.dueDate", "date", due_date)?;
        }
        Ok(())
    }
}

impl Validate for NewTask {
    fn validate(&self, formats: &FormatRegistry) -> Result<(), ValidationError> {
        check_title(&self.title)?;
        check_severity(self.severity)?;
        if let Some(milestone) = &self.milestone {
            milestone.validate(formats)?;
        }
        Ok(())
    }
}

impl Validate for UpdateTask {
    fn validate(&self, formats: &FormatRegistry) -> Result<(), ValidationError> {
        if let Some(title) = &self.title {
            check_title(title)?;
        }
        if let Some(severity) = self.severity {
            check_severity(severity)?;
        }
        if let Some(milestone) = &self.milestone {
            milestone.validate(formats)?;
        }
        Ok(())
    }
}

impl Validate for NewComment {
    fn validate(&self, _formats: &FormatRegistry) -> Result<(), ValidationError> {
        if self.content.trim().is_empty() {
            return Err(constraint("content", "must not be empty"));
        }
        Ok(())
    }
}

fn check_title(title: &str) -> Result<(), ValidationError> {
    let len = title.chars().count();
    if !(TITLE_MIN_LEN..=TITLE_MAX_LEN).contains(&len) {
        return Err(constraint(
            "title",
            &format!("length {len} outside {TITLE_MIN_LEN}..={TITLE_MAX_LEN}"),
        ));
    }
    Ok(())
}

fn check_severity(severity: u8) -> Result<(), ValidationError> {
    if !SEVERITY_RANGE.contains(&severity) {
        return Err(constraint(
            "severity",
            &format!("{severity} outside {}..={}", SEVERITY_RANGE.start(), SEVERITY_RANGE.end()),
        ));
    }
    Ok(())
}

fn constraint(field: &str, reason: &str) -> ValidationError {
    ValidationError::Constraint {
        field: field.to_string(),
        reason: reason.to_string(),
    }
}
