//! In-memory Artifactory for exercising reconcilers without a server
//!
//! Answers the same endpoints as the real API, including its status-code
//! quirks (a missing repository is a 400), records every request, and can
//! inject failures or simulate a concurrent writer.

use std::collections::HashMap;
use std::sync::{Mutex, MutexGuard};

use async_trait::async_trait;
use reqwest::Method;
use serde_json::{json, Value};

use crate::client::{ApiRequest, ApiResponse, ResourceKind, Transport};
use crate::error::Result;

type Key = (ResourceKind, String);

#[derive(Default)]
struct State {
    documents: HashMap<Key, Value>,
    requests: Vec<ApiRequest>,
    failures: Vec<(Method, String, ApiResponse)>,
    concurrent_writes: Vec<(Key, Value)>,
}

/// Fake Artifactory instance
#[derive(Default)]
pub struct InMemoryArtifactory {
    state: Mutex<State>,
}

impl InMemoryArtifactory {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_document(self, kind: ResourceKind, name: &str, doc: Value) -> Self {
        self.insert(kind, name, doc);
        self
    }

    /// Store a document as if it had been created upstream
    pub fn insert(&self, kind: ResourceKind, name: &str, doc: Value) {
        self.lock()
            .documents
            .insert((kind, name.to_string()), with_identity(kind, name, doc));
    }

    pub fn document(&self, kind: ResourceKind, name: &str) -> Option<Value> {
        self.lock().documents.get(&(kind, name.to_string())).cloned()
    }

    pub fn contains(&self, kind: ResourceKind, name: &str) -> bool {
        self.document(kind, name).is_some()
    }

    /// Every request received so far, in order
    pub fn requests(&self) -> Vec<ApiRequest> {
        self.lock().requests.clone()
    }

    /// Number of PUT/POST requests received so far
    pub fn write_count(&self) -> usize {
        self.lock().requests.iter().filter(|r| r.is_write()).count()
    }

    /// Answer the next `method path` request with `response` instead
    pub fn fail_next(&self, method: Method, path: impl Into<String>, response: ApiResponse) {
        self.lock().failures.push((method, path.into(), response));
    }

    /// Replace the document right after the next GET of it has been answered,
    /// as another client writing between our read and our write would.
    pub fn write_after_next_read(&self, kind: ResourceKind, name: &str, doc: Value) {
        let doc = with_identity(kind, name, doc);
        self.lock()
            .concurrent_writes
            .push(((kind, name.to_string()), doc));
    }

    fn lock(&self) -> MutexGuard<'_, State> {
        self.state.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
    }
}

#[async_trait]
impl Transport for InMemoryArtifactory {
    async fn send(&self, request: &ApiRequest) -> Result<ApiResponse> {
        let mut state = self.lock();
        state.requests.push(request.clone());

        if let Some(pos) = state
            .failures
            .iter()
            .position(|(method, path, _)| *method == request.method && *path == request.path)
        {
            let (_, _, response) = state.failures.remove(pos);
            return Ok(response);
        }

        let Some((kind, name)) = ResourceKind::parse_path(&request.path) else {
            return Ok(ApiResponse::new(404, "Not Found"));
        };
        let key = (kind, name.to_string());
        let exists = state.documents.contains_key(&key);

        let method = &request.method;
        let response = if *method == Method::GET {
            match state.documents.get(&key).cloned() {
                Some(doc) => {
                    if let Some(pos) = state.concurrent_writes.iter().position(|(k, _)| *k == key) {
                        let (_, concurrent) = state.concurrent_writes.remove(pos);
                        state.documents.insert(key, concurrent);
                    }
                    ApiResponse::new(200, doc.to_string())
                }
                None => absent(kind, name),
            }
        } else if *method == kind.write_method() {
            if *method == Method::POST && !exists {
                absent(kind, name)
            } else {
                let doc = request.body.clone().unwrap_or_else(|| json!({}));
                state.documents.insert(key, with_identity(kind, name, doc));
                ApiResponse::new(if exists { 200 } else { 201 }, "")
            }
        } else if *method == Method::DELETE {
            match state.documents.remove(&key) {
                Some(_) => ApiResponse::new(200, ""),
                None => absent(kind, name),
            }
        } else {
            ApiResponse::new(405, "Method Not Allowed")
        };
        Ok(response)
    }
}

/// The "does not exist" answer Artifactory gives for each kind
fn absent(kind: ResourceKind, name: &str) -> ApiResponse {
    let status = kind.absent_statuses()[0];
    let message = match kind {
        ResourceKind::Repository => "Bad Request".to_string(),
        _ => format!("{} '{}' does not exist", kind, name),
    };
    ApiResponse::new(
        status,
        json!({"errors": [{"status": status, "message": message}]}).to_string(),
    )
}

/// Stored documents carry their own name, as Artifactory's GET responses do
fn with_identity(kind: ResourceKind, name: &str, mut doc: Value) -> Value {
    let field = match kind {
        ResourceKind::Repository => "key",
        _ => "name",
    };
    if let Some(map) = doc.as_object_mut() {
        map.entry(field).or_insert_with(|| Value::String(name.to_string()));
    }
    doc
}
