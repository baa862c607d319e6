use std::{collections::BTreeMap, sync::Arc};

use axum::{
    extract::{Path, Query, State},
    http::{HeaderMap, HeaderValue, StatusCode},
    routing::get,
    Json, Router,
};
use chrono::{SecondsFormat, Utc};
use serde::{Deserialize, Serialize};
use tokio::{net::TcpListener, sync::RwLock};
use tracing::info;

pub const BASE_PATH: &str = "/api";
pub const DEFAULT_PAGE_SIZE: usize = 20;
pub const TITLE_LEN: std::ops::RangeInclusive<usize> = 5..=150;

#[derive(Clone, Debug, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct Milestone {
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub due_date: Option<String>,
}

#[derive(Clone, Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Task {
    pub id: i64,
    pub title: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    pub status: String,
    pub severity: u8,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub effort: Option<u32>,
    #[serde(default)]
    pub tags: Vec<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub milestone: Option<Milestone>,
    pub reported_at: String,
    pub last_updated: String,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NewTask {
    pub title: String,
    pub description: Option<String>,
    pub status: Option<String>,
    pub severity: u8,
    pub effort: Option<u32>,
    #[serde(default)]
    pub tags: Vec<String>,
    pub milestone: Option<Milestone>,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UpdateTask {
    pub title: Option<String>,
    pub description: Option<String>,
    pub status: Option<String>,
    pub severity: Option<u8>,
    pub effort: Option<u32>,
    pub tags: Option<Vec<String>>,
    pub milestone: Option<Milestone>,
}

#[derive(Clone, Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Comment {
    pub id: i64,
    pub task_id: i64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub user: Option<String>,
    pub content: String,
    pub created_at: String,
}

#[derive(Deserialize)]
pub struct NewComment {
    pub user: Option<String>,
    pub content: String,
}

#[derive(Deserialize, Default)]
#[serde(rename_all = "camelCase")]
pub struct ListParams {
    pub since_id: Option<i64>,
    pub tags: Option<String>,
    pub status: Option<String>,
    pub page_size: Option<usize>,
}

#[derive(Default)]
pub struct Store {
    next_task_id: i64,
    next_comment_id: i64,
    tasks: BTreeMap<i64, Task>,
    comments: BTreeMap<i64, Vec<Comment>>,
}

pub type Db = Arc<RwLock<Store>>;

const STATUSES: [&str; 4] = ["open", "closed", "ignored", "rejected"];

pub fn app() -> Router {
    let db: Db = Arc::new(RwLock::new(Store::default()));
    let api = Router::new()
        .route("/tasks", get(list_tasks).post(create_task))
        .route(
            "/tasks/{id}",
            get(get_task).put(update_task).delete(delete_task),
        )
        .route(
            "/tasks/{id}/comments",
            get(list_comments).post(add_comment),
        )
        .with_state(db);
    Router::new().nest(BASE_PATH, api)
}

pub async fn run(listener: TcpListener) -> Result<(), std::io::Error> {
    axum::serve(listener, app()).await
}

fn now() -> String {
    Utc::now().to_rfc3339_opts(SecondsFormat::Secs, true)
}

fn valid_status(status: &str) -> bool {
    STATUSES.contains(&status)
}

fn valid_title(title: &str) -> bool {
    TITLE_LEN.contains(&title.chars().count())
}

fn split_csv(value: Option<&str>) -> Vec<&str> {
    value
        .map(|v| v.split(',').map(str::trim).filter(|s| !s.is_empty()).collect())
        .unwrap_or_default()
}

async fn list_tasks(
    State(db): State<Db>,
    Query(params): Query<ListParams>,
) -> (HeaderMap, Json<Vec<Task>>) {
    let store = db.read().await;
    let tags = split_csv(params.tags.as_deref());
    let statuses = split_csv(params.status.as_deref());
    let since_id = params.since_id.unwrap_or(0);
    let page_size = params.page_size.unwrap_or(DEFAULT_PAGE_SIZE);

    let page: Vec<Task> = store
        .tasks
        .range(since_id.saturating_add(1)..)
        .map(|(_, task)| task)
        .filter(|task| tags.is_empty() || tags.iter().any(|t| task.tags.iter().any(|tt| tt == t)))
        .filter(|task| statuses.is_empty() || statuses.contains(&task.status.as_str()))
        .take(page_size)
        .cloned()
        .collect();

    let mut headers = HeaderMap::new();
    if let Some(last) = page.last() {
        headers.insert("x-last-task-id", HeaderValue::from(last.id));
    }
    (headers, Json(page))
}

async fn create_task(
    State(db): State<Db>,
    Json(input): Json<NewTask>,
) -> Result<(StatusCode, Json<Task>), StatusCode> {
    let status = input.status.unwrap_or_else(|| "open".to_string());
    if !valid_title(&input.title)
        || !valid_status(&status)
        || !(1..=5).contains(&input.severity)
    {
        return Err(StatusCode::UNPROCESSABLE_ENTITY);
    }
    let mut store = db.write().await;
    store.next_task_id += 1;
    let timestamp = now();
    let task = Task {
        id: store.next_task_id,
        title: input.title,
        description: input.description,
        status,
        severity: input.severity,
        effort: input.effort,
        tags: input.tags,
        milestone: input.milestone,
        reported_at: timestamp.clone(),
        last_updated: timestamp,
    };
    store.tasks.insert(task.id, task.clone());
    info!(id = task.id, title = %task.title, "task created");
    Ok((StatusCode::CREATED, Json(task)))
}

async fn get_task(State(db): State<Db>, Path(id): Path<i64>) -> Result<Json<Task>, StatusCode> {
    let store = db.read().await;
    store.tasks.get(&id).cloned().map(Json).ok_or(StatusCode::NOT_FOUND)
}

async fn update_task(
    State(db): State<Db>,
    Path(id): Path<i64>,
    Json(input): Json<UpdateTask>,
) -> Result<Json<Task>, StatusCode> {
    let mut store = db.write().await;
    let task = store.tasks.get_mut(&id).ok_or(StatusCode::NOT_FOUND)?;
    if let Some(title) = &input.title {
        if !valid_title(title) {
            return Err(StatusCode::UNPROCESSABLE_ENTITY);
        }
    }
    if let Some(status) = &input.status {
        if !valid_status(status) {
            return Err(StatusCode::UNPROCESSABLE_ENTITY);
        }
    }
    if let Some(severity) = input.severity {
        if !(1..=5).contains(&severity) {
            return Err(StatusCode::UNPROCESSABLE_ENTITY);
        }
        task.severity = severity;
    }
    if let Some(title) = input.title {
        task.title = title;
    }
    if let Some(description) = input.description {
        task.description = Some(description);
    }
    if let Some(status) = input.status {
        task.status = status;
    }
    if let Some(effort) = input.effort {
        task.effort = Some(effort);
    }
    if let Some(tags) = input.tags {
        task.tags = tags;
    }
    if let Some(milestone) = input.milestone {
        task.milestone = Some(milestone);
    }
    task.last_updated = now();
    info!(id, "task updated");
    Ok(Json(task.clone()))
}

async fn delete_task(
    State(db): State<Db>,
    Path(id): Path<i64>,
) -> Result<StatusCode, StatusCode> {
    let mut store = db.write().await;
    store.tasks.remove(&id).ok_or(StatusCode::NOT_FOUND)?;
    store.comments.remove(&id);
    info!(id, "task deleted");
    Ok(StatusCode::NO_CONTENT)
}

async fn list_comments(
    State(db): State<Db>,
    Path(id): Path<i64>,
) -> Result<Json<Vec<Comment>>, StatusCode> {
    let store = db.read().await;
    if !store.tasks.contains_key(&id) {
        return Err(StatusCode::NOT_FOUND);
    }
    Ok(Json(store.comments.get(&id).cloned().unwrap_or_default()))
}

async fn add_comment(
    State(db): State<Db>,
    Path(id): Path<i64>,
    Json(input): Json<NewComment>,
) -> Result<(StatusCode, Json<Comment>), StatusCode> {
    let mut store = db.write().await;
    if !store.tasks.contains_key(&id) {
        return Err(StatusCode::NOT_FOUND);
    }
    if input.content.trim().is_empty() {
        return Err(StatusCode::UNPROCESSABLE_ENTITY);
    }
    store.next_comment_id += 1;
    let comment = Comment {
        id: store.next_comment_id,
        task_id: id,
        user: input.user,
        content: input.content,
        created_at: now(),
    };
    store.comments.entry(id).or_default().push(comment.clone());
    info!(task_id = id, comment_id = comment.id, "comment added");
    Ok((StatusCode::CREATED, Json(comment)))
}
