//! Test Helper Utilities
//!
//! In-process stand-in for the repository contents API, served by axum on an
//! ephemeral localhost port. Each repository is scripted with a response and
//! every request is recorded.

#![allow(dead_code)]

pub mod log_capture;

use attendance_client::codec;
use attendance_client::services::{LocalStore, RemoteSourceResolver};
use attendance_client::AcquisitionPipeline;
use attendance_common::config::RemoteConfig;
use axum::extract::{Path, Query, State};
use axum::http::{header, HeaderMap, StatusCode};
use axum::response::{IntoResponse, Response};
use axum::routing::get;
use axum::{Json, Router};
use serde_json::json;
use std::collections::HashMap;
use std::sync::{Arc, Mutex};

pub const OWNER: &str = "test-owner";
pub const PRIMARY_REPO: &str = "primary-repo";
pub const BACKUP_REPO: &str = "backup-repo";
pub const TOKEN_PREFIX: &str = "test_";
pub const TOKEN_SUFFIX: &str = "credential";

/// Scripted answer for one repository
#[derive(Debug, Clone)]
pub enum MockResponse {
    /// 200 with the body as-is
    Raw(String),
    /// 200 with a JSON envelope holding line-wrapped base64 content
    Wrapped(String),
    /// Bare status code
    Status(u16),
}

/// One request seen by the mock server
#[derive(Debug, Clone)]
pub struct RecordedRequest {
    pub owner: String,
    pub repo: String,
    pub path: String,
    pub git_ref: Option<String>,
    pub accept: Option<String>,
    pub authorization: Option<String>,
}

#[derive(Default)]
struct MockState {
    responses: Mutex<HashMap<String, MockResponse>>,
    requests: Mutex<Vec<RecordedRequest>>,
}

pub struct MockRepositoryServer {
    base_url: String,
    state: Arc<MockState>,
}

impl MockRepositoryServer {
    pub async fn start() -> Self {
        let state = Arc::new(MockState::default());
        let app = Router::new()
            .route("/repos/:owner/:repo/contents/:path", get(contents))
            .with_state(state.clone());

        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        tokio::spawn(async move {
            axum::serve(listener, app).await.unwrap();
        });

        Self {
            base_url: format!("http://{}", addr),
            state,
        }
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    pub fn respond(&self, repo: &str, response: MockResponse) {
        self.state
            .responses
            .lock()
            .unwrap()
            .insert(repo.to_string(), response);
    }

    pub fn requests(&self) -> Vec<RecordedRequest> {
        self.state.requests.lock().unwrap().clone()
    }

    pub fn requests_to(&self, repo: &str) -> usize {
        self.requests().iter().filter(|r| r.repo == repo).count()
    }

    pub fn remote_config(&self) -> RemoteConfig {
        RemoteConfig {
            api_base: self.base_url.clone(),
            owner: OWNER.to_string(),
            primary_repo: PRIMARY_REPO.to_string(),
            backup_repo: BACKUP_REPO.to_string(),
            branch: "main".to_string(),
            token_prefix: Some(TOKEN_PREFIX.to_string()),
            token_suffix: Some(TOKEN_SUFFIX.to_string()),
            request_timeout_secs: 5,
        }
    }

    pub fn pipeline(&self, cache_dir: &std::path::Path) -> AcquisitionPipeline {
        let resolver = RemoteSourceResolver::from_config(&self.remote_config()).unwrap();
        AcquisitionPipeline::new(LocalStore::new(cache_dir), resolver)
    }
}

async fn contents(
    State(state): State<Arc<MockState>>,
    Path((owner, repo, path)): Path<(String, String, String)>,
    Query(query): Query<HashMap<String, String>>,
    headers: HeaderMap,
) -> Response {
    let header_value = |name: header::HeaderName| {
        headers
            .get(name)
            .and_then(|v| v.to_str().ok())
            .map(str::to_string)
    };

    state.requests.lock().unwrap().push(RecordedRequest {
        owner,
        repo: repo.clone(),
        path,
        git_ref: query.get("ref").cloned(),
        accept: header_value(header::ACCEPT),
        authorization: header_value(header::AUTHORIZATION),
    });

    let scripted = state.responses.lock().unwrap().get(&repo).cloned();
    match scripted {
        Some(MockResponse::Raw(body)) => (StatusCode::OK, body).into_response(),
        Some(MockResponse::Wrapped(body)) => {
            let encoded = codec::encode(&body);
            let wrapped: Vec<String> = encoded
                .as_bytes()
                .chunks(60)
                .map(|c| String::from_utf8_lossy(c).into_owned())
                .collect();
            Json(json!({
                "type": "file",
                "encoding": "base64",
                "content": format!("{}\n", wrapped.join("\n")),
            }))
            .into_response()
        }
        Some(MockResponse::Status(code)) => StatusCode::from_u16(code)
            .unwrap_or(StatusCode::INTERNAL_SERVER_ERROR)
            .into_response(),
        None => (StatusCode::NOT_FOUND, Json(json!({"message": "Not Found"}))).into_response(),
    }
}

/// A small realistic dataset: two students, two subjects
pub fn sample_dataset() -> String {
    json!([
        {
            "Student ID": 2023001,
            "Name": "Mariam Hassan",
            "Group": "A",
            "Total Required": 20,
            "Total Attended": 18,
            "Percentage": "90%",
            "Status": "Pass",
            "Sessions Needed": 0,
            "Required anatomy (Total)": 12,
            "Attended anatomy (Total)": 11,
            "anatomy S1 (Req)": 6,
            "anatomy S1 (Att)": 6,
            "anatomy S2 (Req)": 6,
            "anatomy S2 (Att)": 5,
            "Required histology (Total)": 8,
            "Attended histology (Total)": 7
        },
        {
            "Student ID": "2023002",
            "Name": "Youssef Ali",
            "Group": "B",
            "Total Required": 20,
            "Total Attended": 13,
            "Percentage": "65%",
            "Status": "High Risk",
            "Sessions Needed": 2,
            "Required anatomy (Total)": 12,
            "Attended anatomy (Total)": 8
        }
    ])
    .to_string()
}
