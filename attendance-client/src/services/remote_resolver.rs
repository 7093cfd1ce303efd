//! Remote dataset resolution with ordered provider fallback
//!
//! Providers are tried in priority order; the first successful response
//! wins. A non-success status, a connection failure or a per-attempt timeout
//! moves on to the next provider. A successful response whose body does not
//! parse is surfaced immediately and never retried elsewhere.

use crate::codec;
use crate::error::{AttendanceError, AttendanceResult, FailedAttempt};
use crate::models::{DatasetKey, DatasetRecord};
use crate::services::transport::{
    DatasetTransport, HttpTransport, ResourceRequest, StaticToken, TokenProvider,
};
use attendance_common::config::RemoteConfig;
use serde::Deserialize;
use std::sync::Arc;
use std::time::Duration;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, warn};

/// Accept header asking for the file body itself
const ACCEPT_RAW: &str = "application/vnd.github.v3.raw";
/// Accept header asking for the JSON metadata envelope
const ACCEPT_WRAPPED: &str = "application/vnd.github.v3+json";

/// Representation requested from a provider
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Acceptance {
    /// Body is the dataset text
    Raw,
    /// Body is a JSON envelope with base64 `content`
    Wrapped,
}

impl Acceptance {
    pub fn media_type(&self) -> &'static str {
        match self {
            Acceptance::Raw => ACCEPT_RAW,
            Acceptance::Wrapped => ACCEPT_WRAPPED,
        }
    }
}

/// One remote repository able to serve datasets
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProviderDescriptor {
    /// Name used in logs ("primary", "backup")
    pub name: String,
    /// Repository holding the dataset files
    pub repo: String,
    pub accept: Acceptance,
}

impl ProviderDescriptor {
    pub fn new(name: impl Into<String>, repo: impl Into<String>, accept: Acceptance) -> Self {
        Self {
            name: name.into(),
            repo: repo.into(),
            accept,
        }
    }
}

/// Envelope returned for the wrapped representation
#[derive(Debug, Deserialize)]
struct ContentEnvelope {
    content: Option<String>,
    #[serde(default)]
    encoding: Option<String>,
}

enum AttemptOutcome {
    Success(String),
    Failed(String),
}

/// Resolves a dataset key against the ordered provider list
pub struct RemoteSourceResolver {
    api_base: String,
    owner: String,
    branch: String,
    providers: Vec<ProviderDescriptor>,
    attempt_timeout: Duration,
    transport: Arc<dyn DatasetTransport>,
    tokens: Arc<dyn TokenProvider>,
}

impl RemoteSourceResolver {
    pub fn new(
        config: &RemoteConfig,
        providers: Vec<ProviderDescriptor>,
        transport: Arc<dyn DatasetTransport>,
        tokens: Arc<dyn TokenProvider>,
    ) -> Self {
        Self {
            api_base: config.api_base.trim_end_matches('/').to_string(),
            owner: config.owner.clone(),
            branch: config.branch.clone(),
            providers,
            attempt_timeout: config.request_timeout(),
            transport,
            tokens,
        }
    }

    /// Production resolver: reqwest transport, token from config fragments,
    /// primary (raw) then backup (wrapped).
    pub fn from_config(config: &RemoteConfig) -> AttendanceResult<Self> {
        let transport = HttpTransport::new(config.request_timeout()).map_err(|e| {
            AttendanceError::Common(attendance_common::Error::Config(format!(
                "Failed to create HTTP client: {}",
                e
            )))
        })?;
        let tokens = StaticToken::from_fragments(
            config.token_prefix.as_deref(),
            config.token_suffix.as_deref(),
        );

        Ok(Self::new(
            config,
            default_providers(config),
            Arc::new(transport),
            Arc::new(tokens),
        ))
    }

    pub fn providers(&self) -> &[ProviderDescriptor] {
        &self.providers
    }

    /// Resource URL for a dataset file in a provider's repository
    pub fn resource_url(&self, provider: &ProviderDescriptor, file_name: &str) -> String {
        format!(
            "{}/repos/{}/{}/contents/{}?ref={}",
            self.api_base, self.owner, provider.repo, file_name, self.branch
        )
    }

    fn build_request(&self, provider: &ProviderDescriptor, file_name: &str) -> ResourceRequest {
        ResourceRequest {
            url: self.resource_url(provider, file_name),
            accept: provider.accept.media_type(),
            authorization: self.tokens.token().map(|t| format!("token {}", t)),
        }
    }

    /// Fetch a dataset, trying providers in order
    pub async fn fetch(
        &self,
        key: &DatasetKey,
        cancel: Option<&CancellationToken>,
    ) -> AttendanceResult<Vec<DatasetRecord>> {
        let file_name = key.file_name();
        let mut attempts = Vec::with_capacity(self.providers.len());

        for provider in &self.providers {
            if cancel.is_some_and(|c| c.is_cancelled()) {
                return Err(AttendanceError::Cancelled);
            }

            let source_path = format!("{}/{}", provider.repo, file_name);
            let request = self.build_request(provider, &file_name);
            info!(
                provider = %provider.name,
                url = %request.url,
                "Requesting attendance dataset"
            );

            match self.attempt(&request, cancel).await? {
                AttemptOutcome::Success(body) => {
                    let records = parse_body(provider.accept, &source_path, &body)?;
                    info!(
                        provider = %provider.name,
                        records = records.len(),
                        "Downloaded attendance dataset"
                    );
                    return Ok(records);
                }
                AttemptOutcome::Failed(reason) => {
                    warn!(
                        provider = %provider.name,
                        path = %source_path,
                        reason = %reason,
                        "Provider attempt failed, trying next"
                    );
                    attempts.push(FailedAttempt {
                        path: source_path,
                        reason,
                    });
                }
            }
        }

        Err(AttendanceError::SourceExhausted { attempts })
    }

    async fn attempt(
        &self,
        request: &ResourceRequest,
        cancel: Option<&CancellationToken>,
    ) -> AttendanceResult<AttemptOutcome> {
        let bounded = tokio::time::timeout(self.attempt_timeout, self.transport.get(request));

        let result = match cancel {
            Some(token) => tokio::select! {
                _ = token.cancelled() => return Err(AttendanceError::Cancelled),
                result = bounded => result,
            },
            None => bounded.await,
        };

        Ok(match result {
            Err(_) => AttemptOutcome::Failed(format!(
                "timed out after {}s",
                self.attempt_timeout.as_secs_f64()
            )),
            Ok(Err(e)) => AttemptOutcome::Failed(e.to_string()),
            Ok(Ok(response)) if !response.is_success() => {
                AttemptOutcome::Failed(format!("HTTP {}", response.status))
            }
            Ok(Ok(response)) => AttemptOutcome::Success(response.body),
        })
    }
}

/// Primary repository (raw) followed by the backup repository (wrapped)
pub fn default_providers(config: &RemoteConfig) -> Vec<ProviderDescriptor> {
    vec![
        ProviderDescriptor::new("primary", &config.primary_repo, Acceptance::Raw),
        ProviderDescriptor::new("backup", &config.backup_repo, Acceptance::Wrapped),
    ]
}

fn parse_body(
    accept: Acceptance,
    source_path: &str,
    body: &str,
) -> AttendanceResult<Vec<DatasetRecord>> {
    match accept {
        Acceptance::Raw => parse_dataset(source_path, body),
        Acceptance::Wrapped => {
            let envelope: ContentEnvelope =
                serde_json::from_str(body).map_err(|e| AttendanceError::MalformedPayload {
                    source_path: source_path.to_string(),
                    reason: format!("invalid content envelope: {}", e),
                })?;

            let content = envelope
                .content
                .ok_or_else(|| AttendanceError::MalformedPayload {
                    source_path: source_path.to_string(),
                    reason: "content envelope has no `content` field".to_string(),
                })?;

            if let Some(encoding) = envelope.encoding.as_deref() {
                if encoding != "base64" {
                    debug!(encoding, "Unexpected envelope encoding, decoding as base64");
                }
            }

            let text = codec::decode_wrapped(&content)?;
            parse_dataset(source_path, &text)
        }
    }
}

fn parse_dataset(source_path: &str, text: &str) -> AttendanceResult<Vec<DatasetRecord>> {
    serde_json::from_str(text).map_err(|e| AttendanceError::MalformedPayload {
        source_path: source_path.to_string(),
        reason: e.to_string(),
    })
}
