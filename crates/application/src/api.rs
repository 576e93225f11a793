//! REST API client seam.

use serde_json::Value;
use std::cell::RefCell;
use std::collections::HashMap;

pub const OK_STATUS: &[u16] = &[200, 201, 202, 204];
pub const NOTOK_STATUS: &[u16] = &[400, 401, 403];
pub const UNAUTHORIZED_STATUS: &[u16] = &[401, 403];

#[derive(Debug, Clone, PartialEq)]
pub struct ApiResponse {
    pub status: u16,
    pub body: Value,
}

impl ApiResponse {
    pub fn new(status: u16, body: Value) -> Self {
        Self { status, body }
    }

    pub fn is_ok(&self) -> bool {
        OK_STATUS.contains(&self.status)
    }

    pub fn is_notok(&self) -> bool {
        NOTOK_STATUS.contains(&self.status)
    }

    pub fn is_unauthorized(&self) -> bool {
        UNAUTHORIZED_STATUS.contains(&self.status)
    }
}

/// Client for the telephony platform's REST API.
pub trait ApiClient {
    fn get(&self, path: &str) -> anyhow::Result<ApiResponse>;
    fn put(&self, path: &str, body: Value) -> anyhow::Result<ApiResponse>;
}

/// API client answering from canned responses, recording every request.
#[derive(Default)]
pub struct ScriptedApi {
    responses: RefCell<HashMap<(String, String), ApiResponse>>,
    requests: RefCell<Vec<(String, String, Option<Value>)>>,
}

impl ScriptedApi {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn respond(&self, method: &str, path: &str, response: ApiResponse) {
        self.responses
            .borrow_mut()
            .insert((method.to_string(), path.to_string()), response);
    }

    /// Requests seen so far as `(method, path, body)`.
    pub fn requests(&self) -> Vec<(String, String, Option<Value>)> {
        self.requests.borrow().clone()
    }

    fn answer(&self, method: &str, path: &str, body: Option<Value>) -> anyhow::Result<ApiResponse> {
        self.requests
            .borrow_mut()
            .push((method.to_string(), path.to_string(), body));
        self.responses
            .borrow()
            .get(&(method.to_string(), path.to_string()))
            .cloned()
            .ok_or_else(|| anyhow::anyhow!("no scripted response for {method} {path}"))
    }
}

impl ApiClient for ScriptedApi {
    fn get(&self, path: &str) -> anyhow::Result<ApiResponse> {
        self.answer("GET", path, None)
    }

    fn put(&self, path: &str, body: Value) -> anyhow::Result<ApiResponse> {
        self.answer("PUT", path, Some(body))
    }
}
