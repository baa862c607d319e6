//! Full task lifecycle against the live mock server.
//!
//! # Design
//! Starts the mock server on a random port, builds a `TaskTracker` pointed at
//! it through `TransportConfig`, and exercises every `tasks` operation over
//! real HTTP with the ureq-backed transport.

use std::sync::Arc;

use task_tracker_core::{
    new_http_client_with_config, ApiError, HttpTransport, ListTasksParams,
    Milestone, NewComment, NewTask, TaskStatus, TaskTracker, TransportConfig, UpdateTask,
};

/// Bind a listener on a random port and serve the mock API from a
/// background thread. Returns `host:port`.
fn start_server() -> String {
    let std_listener = std::net::TcpListener::bind("127.0.0.1:0").unwrap();
    let addr = std_listener.local_addr().unwrap();
    std_listener.set_nonblocking(true).unwrap();

    std::thread::spawn(move || {
        let rt = tokio::runtime::Builder::new_current_thread()
            .enable_all()
            .build()
            .unwrap();
        rt.block_on(async {
            let listener = tokio::net::TcpListener::from_std(std_listener).unwrap();
            mock_server::run(listener).await
        })
        .unwrap();
    });

    addr.to_string()
}

fn new_task(title: &str, tags: &[&str]) -> NewTask {
    NewTask {
        title: title.to_string(),
        description: None,
        status: None,
        severity: 2,
        effort: None,
        tags: tags.iter().map(|t| t.to_string()).collect(),
        milestone: None,
    }
}

#[test]
fn task_lifecycle() {
    let host = start_server();
    let mut config = TransportConfig::default();
    config
        .with_host(host)
        .with_base_path(mock_server::BASE_PATH)
        .with_schemes(["http"]);
    let client = new_http_client_with_config(None, Some(config));
    let tasks = &client.tasks;

    // Step 1: list is empty.
    let page = tasks.list_tasks(&ListTasksParams::default()).unwrap();
    assert!(page.tasks.is_empty());
    assert_eq!(page.last_task_id, None);

    // Step 2: create two tasks.
    let mut first = new_task("Fix login redirect", &["auth"]);
    first.milestone = Some(Milestone {
        name: "1.2".to_string(),
        description: None,
        due_date: Some("2030-01-31".to_string()),
    });
    let created = tasks.create_task(&first).unwrap();
    assert_eq!(created.title, "Fix login redirect");
    assert_eq!(created.status, TaskStatus::Open);
    assert!(created.reported_at.is_some());
    let id = created.id;

    let second = tasks.create_task(&new_task("Dark mode toggle", &["ui"])).unwrap();
    assert!(second.id > id);

    // Step 3: get details.
    let fetched = tasks.get_task_details(id).unwrap();
    assert_eq!(fetched.milestone, created.milestone);

    // Step 4: filter and page.
    let params = ListTasksParams {
        tags: vec!["ui".to_string()],
        ..ListTasksParams::default()
    };
    let page = tasks.list_tasks(&params).unwrap();
    assert_eq!(page.tasks.len(), 1);
    assert_eq!(page.last_task_id, Some(second.id));

    let params = ListTasksParams {
        page_size: Some(1),
        ..ListTasksParams::default()
    };
    let page = tasks.list_tasks(&params).unwrap();
    assert_eq!(page.tasks[0].id, id);
    let params = ListTasksParams {
        since_id: page.last_task_id,
        page_size: Some(1),
        ..ListTasksParams::default()
    };
    let page = tasks.list_tasks(&params).unwrap();
    assert_eq!(page.tasks[0].id, second.id);

    // Step 5: partial update.
    let update = UpdateTask {
        status: Some(TaskStatus::Closed),
        ..UpdateTask::default()
    };
    let updated = tasks.update_task(id, &update).unwrap();
    assert_eq!(updated.status, TaskStatus::Closed);
    assert_eq!(updated.title, "Fix login redirect");

    // Step 6: comments.
    let comment = tasks
        .add_comment_to_task(
            id,
            &NewComment {
                user: Some("ana@example.com".to_string()),
                content: "Verified on staging".to_string(),
            },
        )
        .unwrap();
    assert_eq!(comment.task_id, id);
    let comments = tasks.get_task_comments(id).unwrap();
    assert_eq!(comments, vec![comment]);

    // Step 7: delete, then everything about the task is gone.
    tasks.delete_task(id).unwrap();
    assert!(matches!(tasks.get_task_details(id), Err(ApiError::NotFound)));
    assert!(matches!(tasks.get_task_comments(id), Err(ApiError::NotFound)));
    assert!(matches!(tasks.delete_task(id), Err(ApiError::NotFound)));

    let page = tasks.list_tasks(&ListTasksParams::default()).unwrap();
    assert_eq!(page.tasks.len(), 1);
}

#[test]
fn swapping_transport_redirects_to_another_server() {
    let dead = "127.0.0.1:1".to_string();
    let mut config = TransportConfig::default();
    config
        .with_host(dead)
        .with_base_path("/api")
        .with_schemes(["http"]);
    let mut client = new_http_client_with_config(None, Some(config));

    // Construction succeeded; the bad host only shows up on use.
    let err = client
        .tasks
        .list_tasks(&ListTasksParams::default())
        .unwrap_err();
    assert!(matches!(err, ApiError::Transport(_)));

    let live = start_server();
    client.set_transport(Arc::new(HttpTransport::new(
        &live,
        "/api",
        &["http".to_string()],
    )));
    let page = client.tasks.list_tasks(&ListTasksParams::default()).unwrap();
    assert!(page.tasks.is_empty());
}

#[test]
fn build_submit_parse_can_be_driven_by_hand() {
    let host = start_server();
    let transport = Arc::new(HttpTransport::new(&host, "/api", &["http".to_string()]));
    let client = TaskTracker::new(transport, None);

    let request = client.tasks.build_update_task(
        999,
        &UpdateTask {
            title: Some("Does not exist".to_string()),
            ..UpdateTask::default()
        },
    );
    let response = client.transport().submit(request.unwrap()).unwrap();
    assert_eq!(response.status, 404);
    assert!(matches!(
        client.tasks.parse_update_task(response),
        Err(ApiError::NotFound)
    ));
}
