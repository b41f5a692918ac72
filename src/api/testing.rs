#![allow(dead_code, clippy::unwrap_used, clippy::expect_used, clippy::panic)]

use super::transport::{Response, Transport};
use crate::error::{Error, Result};
use reqwest::Method;
use std::{
    collections::{HashMap, HashSet, VecDeque},
    sync::Mutex,
};

/// In-memory transport answering from a script and recording every call.
///
/// Each path has a queue of responses, the last one is repeated once the
/// queue is drained. Unknown paths answer 404.
#[derive(Default)]
pub struct ScriptedTransport {
    routes: Mutex<HashMap<String, VecDeque<Response>>>,
    broken: HashSet<String>,
    calls: Mutex<Vec<String>>,
    bodies: Mutex<HashMap<String, Vec<u8>>>,
}

impl ScriptedTransport {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn respond(self, path: &str, status: u16, body: &str) -> Self {
        self.routes
            .lock()
            .unwrap()
            .entry(path.to_string())
            .or_default()
            .push_back(Response {
                status,
                body: body.as_bytes().to_vec(),
            });
        self
    }

    pub fn respond_json(self, path: &str, value: &serde_json::Value) -> Self {
        self.respond(path, 200, &value.to_string())
    }

    /// Requests to `path` fail as if the network was down
    pub fn fail(mut self, path: &str) -> Self {
        self.broken.insert(path.to_string());
        self
    }

    pub fn calls(&self) -> Vec<String> {
        self.calls.lock().unwrap().clone()
    }

    /// Calls whose method is PUT, without the method prefix
    pub fn mutations(&self) -> Vec<String> {
        self.calls()
            .into_iter()
            .filter_map(|call| call.strip_prefix("PUT ").map(str::to_string))
            .collect()
    }

    pub fn body_of(&self, path: &str) -> Option<Vec<u8>> {
        self.bodies.lock().unwrap().get(path).cloned()
    }
}

impl Transport for ScriptedTransport {
    async fn request(&self, method: Method, path: &str, body: Option<Vec<u8>>) -> Result<Response> {
        self.calls.lock().unwrap().push(format!("{method} {path}"));
        if let Some(body) = body {
            self.bodies.lock().unwrap().insert(path.to_string(), body);
        }

        if self.broken.contains(path) {
            return Err(Error::Transport(format!("{method} {path}: connection refused")));
        }

        let mut routes = self.routes.lock().unwrap();
        let response = match routes.get_mut(path) {
            Some(queue) if queue.len() > 1 => queue.pop_front().unwrap(),
            Some(queue) => queue.front().cloned().unwrap(),
            None => Response {
                status: 404,
                body: Vec::new(),
            },
        };
        drop(routes);

        Ok(response)
    }
}
