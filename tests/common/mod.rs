#![allow(
    dead_code,
    clippy::unwrap_used,
    clippy::expect_used,
    clippy::panic,
    clippy::indexing_slicing
)]

use answerhub_ban::credentials::Credentials;
use axum::{
    Json, Router,
    extract::{Path, Query, State},
    http::{HeaderMap, StatusCode, header::AUTHORIZATION},
    response::{IntoResponse, Response},
    routing::{get, put},
};
use serde::Deserialize;
use serde_json::{Value, json};
use std::{
    collections::HashSet,
    env,
    path::PathBuf,
    sync::{Arc, Mutex},
};
use tokio::{net::TcpListener, task::JoinHandle};

pub const USER_ID: u64 = 42;
pub const USERNAME: &str = "admin";
pub const PASSWORD: &str = "secret";
/// `Basic base64("admin:secret")`
const AUTHORIZATION_VALUE: &str = "Basic YWRtaW46c2VjcmV0";

/// Mutable state of the fake forum, the lists shrink as nodes are deleted
#[derive(Debug, Default)]
pub struct ForumState {
    pub page_size: usize,
    /// (action id, node id) in listing order
    pub actions: Vec<(u64, u64)>,
    /// (question id, body)
    pub questions: Vec<(u64, String)>,
    pub deleted: Vec<u64>,
    pub scrubbed: Vec<(u64, String)>,
    pub deactivated: Vec<u64>,
    /// Nodes whose delete answers 500
    pub failing: HashSet<u64>,
    /// Action pages answer with a non JSON body
    pub garbage: bool,
    /// Every request as "METHOD path"
    pub requests: Vec<String>,
}

type Shared = Arc<Mutex<ForumState>>;

pub struct FakeForum {
    pub base_url: String,
    pub state: Shared,
    handle: JoinHandle<()>,
}

impl Drop for FakeForum {
    fn drop(&mut self) {
        self.handle.abort();
    }
}

impl FakeForum {
    /// Start a forum whose user 42 owns one action per node in `nodes`
    pub async fn start(page_size: usize, nodes: &[u64]) -> Self {
        let state = ForumState {
            page_size,
            actions: nodes
                .iter()
                .enumerate()
                .map(|(i, node)| (1000 + i as u64, *node))
                .collect(),
            ..ForumState::default()
        };
        Self::with_state(state).await
    }

    pub async fn with_state(state: ForumState) -> Self {
        let state: Shared = Arc::new(Mutex::new(state));

        let app = Router::new()
            .route("/services/v2/user/{id}/action.json", get(list_actions))
            .route("/services/v2/user/{id}/question.json", get(list_questions))
            .route(
                "/services/v2/user/{id}/deactivateUser.json",
                put(deactivate_user),
            )
            .route("/services/v2/node/{id}/delete.json", put(delete_node))
            .route("/services/v2/question/{file}", put(update_question))
            .with_state(state.clone());

        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        let handle = tokio::spawn(async move {
            axum::serve(listener, app).await.unwrap();
        });

        Self {
            base_url: format!("http://{addr}"),
            state,
            handle,
        }
    }

    pub fn credentials(&self) -> Credentials {
        Credentials {
            base_url: self.base_url.clone(),
            username: USERNAME.to_string(),
            password: PASSWORD.to_string(),
        }
    }

    pub fn remaining_nodes(&self) -> Vec<u64> {
        self.state
            .lock()
            .unwrap()
            .actions
            .iter()
            .map(|(_, node)| *node)
            .collect()
    }

    pub fn deleted(&self) -> Vec<u64> {
        self.state.lock().unwrap().deleted.clone()
    }

    pub fn deactivated(&self) -> Vec<u64> {
        self.state.lock().unwrap().deactivated.clone()
    }

    pub fn requests(&self) -> Vec<String> {
        self.state.lock().unwrap().requests.clone()
    }
}

#[derive(Debug, Deserialize)]
struct PageQuery {
    page: Option<usize>,
}

fn authorized(headers: &HeaderMap) -> bool {
    headers
        .get(AUTHORIZATION)
        .and_then(|value| value.to_str().ok())
        .is_some_and(|value| value == AUTHORIZATION_VALUE)
}

fn envelope(name: &str, page: usize, page_size: usize, all: &[Value]) -> Value {
    let total = all.len();
    let page_count = total.div_ceil(page_size);
    let start = (page - 1) * page_size;
    let list: Vec<Value> = all.iter().skip(start).take(page_size).cloned().collect();

    json!({
        "name": name,
        "sort": "newest",
        "page": page,
        "pageSize": page_size,
        "pageCount": page_count,
        "listCount": list.len(),
        "totalCount": total,
        "list": list
    })
}

async fn list_actions(
    State(state): State<Shared>,
    Path(id): Path<u64>,
    Query(query): Query<PageQuery>,
    headers: HeaderMap,
) -> Response {
    let mut state = state.lock().unwrap();
    let page = query.page.unwrap_or(1).max(1);
    state
        .requests
        .push(format!("GET user/{id}/action.json?page={page}"));

    if !authorized(&headers) {
        return StatusCode::UNAUTHORIZED.into_response();
    }
    if state.garbage {
        return (StatusCode::OK, "<html>Bad Gateway</html>").into_response();
    }

    let all: Vec<Value> = if id == USER_ID {
        state
            .actions
            .iter()
            .map(|(action, node)| {
                json!({
                    "id": action,
                    "verb": "create",
                    "user": {"id": id, "username": "spammer"},
                    "node": {"id": node, "type": "question", "title": format!("spam {node}")},
                    "rootNode": {"id": node, "type": "question"}
                })
            })
            .collect()
    } else {
        Vec::new()
    };

    Json(envelope("actions", page, state.page_size, &all)).into_response()
}

async fn list_questions(
    State(state): State<Shared>,
    Path(id): Path<u64>,
    Query(query): Query<PageQuery>,
    headers: HeaderMap,
) -> Response {
    let mut state = state.lock().unwrap();
    let page = query.page.unwrap_or(1).max(1);
    state
        .requests
        .push(format!("GET user/{id}/question.json?page={page}"));

    if !authorized(&headers) {
        return StatusCode::UNAUTHORIZED.into_response();
    }

    let all: Vec<Value> = if id == USER_ID {
        state
            .questions
            .iter()
            .map(|(question, body)| {
                json!({
                    "id": question,
                    "type": "question",
                    "title": format!("question {question}"),
                    "body": body,
                    "author": {"id": id, "username": "spammer"}
                })
            })
            .collect()
    } else {
        Vec::new()
    };

    Json(envelope("questions", page, state.page_size, &all)).into_response()
}

async fn delete_node(
    State(state): State<Shared>,
    Path(id): Path<u64>,
    headers: HeaderMap,
) -> StatusCode {
    let mut state = state.lock().unwrap();
    state.requests.push(format!("PUT node/{id}/delete.json"));

    if !authorized(&headers) {
        return StatusCode::UNAUTHORIZED;
    }
    if state.failing.contains(&id) {
        return StatusCode::INTERNAL_SERVER_ERROR;
    }

    state.actions.retain(|(_, node)| *node != id);
    state.questions.retain(|(question, _)| *question != id);
    state.deleted.push(id);
    StatusCode::NO_CONTENT
}

async fn update_question(
    State(state): State<Shared>,
    Path(file): Path<String>,
    headers: HeaderMap,
    Json(body): Json<Value>,
) -> StatusCode {
    let mut state = state.lock().unwrap();
    state.requests.push(format!("PUT question/{file}"));

    if !authorized(&headers) {
        return StatusCode::UNAUTHORIZED;
    }
    let Some(id) = file
        .strip_suffix(".json")
        .and_then(|id| id.parse::<u64>().ok())
    else {
        return StatusCode::NOT_FOUND;
    };

    let text = body["body"].as_str().unwrap_or_default().to_string();
    for (question, current) in &mut state.questions {
        if *question == id {
            current.clone_from(&text);
        }
    }
    state.scrubbed.push((id, text));
    StatusCode::OK
}

async fn deactivate_user(
    State(state): State<Shared>,
    Path(id): Path<u64>,
    headers: HeaderMap,
) -> StatusCode {
    let mut state = state.lock().unwrap();
    state
        .requests
        .push(format!("PUT user/{id}/deactivateUser.json"));

    if !authorized(&headers) {
        return StatusCode::UNAUTHORIZED;
    }

    state.deactivated.push(id);
    StatusCode::OK
}

pub fn binary_path() -> PathBuf {
    env::var_os("CARGO_BIN_EXE_answerhub-ban")
        .map_or_else(|| PathBuf::from("target/debug/answerhub-ban"), PathBuf::from)
}
