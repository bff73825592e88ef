//! Integration tests for the gateway client against a local axum gateway.

use std::collections::HashMap;
use std::net::SocketAddr;

use axum::extract::{Path, Query};
use axum::http::{HeaderMap, StatusCode};
use axum::response::{IntoResponse, Response};
use axum::routing::{get, post};
use axum::{Json, Router};
use chrono::{TimeZone, Utc};
use nodewatch_client::GatewayClient;
use nodewatch_core::dto::log::{LogEvent, LogEventsPage, LogStreamDescription};
use nodewatch_core::dto::task::{DesiredStatus, TaskDescription};
use nodewatch_core::dto::trigger::{TriggerRequest, TriggerResponse};

const STREAM: &str = "ecs/node-a/0f3c9a";
const TOKEN: &str = "s3cret";

fn task(task_id: &str, last_status: &str) -> TaskDescription {
    TaskDescription {
        task_id: task_id.to_string(),
        family: "node-a".to_string(),
        last_status: last_status.to_string(),
        environment: HashMap::from([("TRIGGER_ID".to_string(), "trg-1".to_string())]),
        exit_code: None,
        stopped_reason: None,
        created_at: Utc.with_ymd_and_hms(2024, 5, 1, 12, 0, 0).unwrap(),
    }
}

fn events() -> Vec<LogEvent> {
    (0..5)
        .map(|i| LogEvent {
            timestamp: 1_714_564_800_000 + i,
            message: format!("line {}", i),
        })
        .collect()
}

async fn list_tasks(Query(query): Query<HashMap<String, String>>) -> Json<Vec<TaskDescription>> {
    let family = query.get("family").map(String::as_str);
    let status = query.get("desired_status").map(String::as_str);

    let tasks = match (family, status) {
        (Some("node-a"), Some("RUNNING")) => vec![task("0f3c9a", "PROVISIONING")],
        (Some("node-a"), Some("STOPPED")) => vec![task("9e8d7c", "STOPPED")],
        _ => Vec::new(),
    };
    Json(tasks)
}

async fn describe_task(Path(task_id): Path<String>) -> Response {
    if task_id == "0f3c9a" {
        Json(task("0f3c9a", "RUNNING")).into_response()
    } else {
        (StatusCode::NOT_FOUND, format!("task {} not found", task_id)).into_response()
    }
}

async fn list_streams(
    Query(query): Query<HashMap<String, String>>,
) -> Json<Vec<LogStreamDescription>> {
    let prefix = query.get("prefix").cloned().unwrap_or_default();
    let streams = [STREAM, "ecs/node-b/1a2b3c"]
        .iter()
        .filter(|name| name.starts_with(&prefix))
        .map(|name| LogStreamDescription {
            log_stream_name: name.to_string(),
            last_event_at: None,
        })
        .collect();
    Json(streams)
}

async fn log_events(Query(query): Query<HashMap<String, String>>) -> Response {
    if query.get("stream").map(String::as_str) != Some(STREAM) {
        return (StatusCode::NOT_FOUND, "The specified log stream does not exist.").into_response();
    }

    let start: usize = query
        .get("next_token")
        .and_then(|token| token.strip_prefix("f/"))
        .and_then(|index| index.parse().ok())
        .unwrap_or(0);
    let limit: usize = query
        .get("limit")
        .and_then(|limit| limit.parse().ok())
        .unwrap_or(usize::MAX);

    let all = events();
    if query.get("start_from_head").map(String::as_str) == Some("false") {
        let tail: Vec<LogEvent> = all.iter().skip(all.len().saturating_sub(limit)).cloned().collect();
        return Json(LogEventsPage {
            events: tail,
            next_forward_token: Some(format!("f/{}", all.len())),
        })
        .into_response();
    }
    let page: Vec<LogEvent> = all.iter().skip(start).take(limit).cloned().collect();
    let next = start + page.len();
    Json(LogEventsPage {
        events: page,
        next_forward_token: Some(format!("f/{}", next)),
    })
    .into_response()
}

async fn trigger(headers: HeaderMap, Json(req): Json<TriggerRequest>) -> Response {
    let expected = format!("Bearer {}", TOKEN);
    let authorized = headers
        .get("authorization")
        .and_then(|value| value.to_str().ok())
        == Some(expected.as_str());
    if !authorized {
        return (StatusCode::UNAUTHORIZED, "missing credentials").into_response();
    }

    match req.model_id.as_str() {
        "broken" => (StatusCode::INTERNAL_SERVER_ERROR, "Internal Server Error").into_response(),
        "cron" => Json(TriggerResponse { trigger_id: None }).into_response(),
        _ => Json(TriggerResponse {
            trigger_id: Some("trg-1".to_string()),
        })
        .into_response(),
    }
}

async fn spawn_gateway() -> SocketAddr {
    let app = Router::new()
        .route("/api/tasks", get(list_tasks))
        .route("/api/tasks/{task_id}", get(describe_task))
        .route("/api/logs/streams", get(list_streams))
        .route("/api/logs/events", get(log_events))
        .route("/api/triggers", post(trigger));

    let listener = tokio::net::TcpListener::bind("127.0.0.1:0")
        .await
        .expect("failed to bind test gateway");
    let addr = listener.local_addr().expect("no local address");
    tokio::spawn(async move {
        axum::serve(listener, app).await.expect("test gateway crashed");
    });
    addr
}

#[tokio::test]
async fn test_list_tasks_by_desired_status() {
    let addr = spawn_gateway().await;
    let client = GatewayClient::new(format!("http://{}", addr));

    let running = client
        .list_tasks("node-a", DesiredStatus::Running)
        .await
        .expect("list running tasks");
    assert_eq!(running.len(), 1);
    assert_eq!(running[0].task_id, "0f3c9a");
    assert_eq!(running[0].last_status, "PROVISIONING");

    let stopped = client
        .list_tasks("node-a", DesiredStatus::Stopped)
        .await
        .expect("list stopped tasks");
    assert_eq!(stopped[0].task_id, "9e8d7c");

    let none = client
        .list_tasks("node-z", DesiredStatus::Running)
        .await
        .expect("list tasks of unknown family");
    assert!(none.is_empty());
}

#[tokio::test]
async fn test_describe_unknown_task_is_not_found() {
    let addr = spawn_gateway().await;
    let client = GatewayClient::new(format!("http://{}", addr));

    let task = client.describe_task("0f3c9a").await.expect("describe task");
    assert_eq!(task.last_status, "RUNNING");

    let err = client.describe_task("missing").await.unwrap_err();
    assert!(err.is_not_found());
    assert!(err.to_string().contains("task missing not found"));
}

#[tokio::test]
async fn test_stream_prefix_with_slashes() {
    let addr = spawn_gateway().await;
    let client = GatewayClient::new(format!("http://{}", addr));

    let streams = client
        .describe_log_streams("/fargate/service/node-a", Some("ecs/node-a/"))
        .await
        .expect("describe streams");
    assert_eq!(streams.len(), 1);
    assert_eq!(streams[0].log_stream_name, STREAM);
}

#[tokio::test]
async fn test_paginated_reads_cover_whole_stream() {
    let addr = spawn_gateway().await;
    let client = GatewayClient::new(format!("http://{}", addr));

    let mut token: Option<String> = None;
    let mut seen = Vec::new();
    loop {
        let page = client
            .get_log_events("/fargate/service/node-a", STREAM, token.as_deref(), Some(2))
            .await
            .expect("read events");
        if page.events.is_empty() {
            break;
        }
        seen.extend(page.events.into_iter().map(|event| event.message));
        token = page.next_forward_token;
    }

    let expected: Vec<String> = events().into_iter().map(|event| event.message).collect();
    assert_eq!(seen, expected);
}

#[tokio::test]
async fn test_latest_events_come_from_the_tail() {
    let addr = spawn_gateway().await;
    let client = GatewayClient::new(format!("http://{}", addr));

    let page = client
        .get_latest_log_events("/fargate/service/node-a", STREAM, 2)
        .await
        .expect("read latest events");
    let messages: Vec<String> = page.events.into_iter().map(|event| event.message).collect();
    assert_eq!(messages, vec!["line 3", "line 4"]);
}

#[tokio::test]
async fn test_missing_stream_is_not_found() {
    let addr = spawn_gateway().await;
    let client = GatewayClient::new(format!("http://{}", addr));

    let err = client
        .get_log_events("/fargate/service/node-a", "ecs/node-a/nope", None, None)
        .await
        .unwrap_err();
    assert!(err.is_not_found());
}

#[tokio::test]
async fn test_trigger_webhook() {
    let addr = spawn_gateway().await;
    let client = GatewayClient::new(format!("http://{}", addr)).with_token(TOKEN);

    let ack = client.trigger_webhook("model-1").await.expect("trigger");
    assert_eq!(ack.trigger_id.as_deref(), Some("trg-1"));

    let cron = client.trigger_webhook("cron").await.expect("trigger cron");
    assert_eq!(cron.trigger_id, None);

    let err = client.trigger_webhook("broken").await.unwrap_err();
    assert!(err.is_server_error());
    assert!(err.to_string().contains("Internal Server Error"));
}

#[tokio::test]
async fn test_trigger_requires_token() {
    let addr = spawn_gateway().await;
    let client = GatewayClient::new(format!("http://{}", addr));

    let err = client.trigger_webhook("model-1").await.unwrap_err();
    assert!(!err.is_server_error());
    assert!(matches!(
        err,
        nodewatch_client::ClientError::ApiError { status: 401, .. }
    ));
}
