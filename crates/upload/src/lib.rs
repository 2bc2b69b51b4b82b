use base64::{Engine as _, engine::general_purpose::STANDARD};
use flamegraph_action_core::{
    models::{UploadTarget, UploadedFlamegraph},
    util::{UrlExt, size},
};
use reqwest::{Client, StatusCode};
use serde::{Deserialize, Serialize};
use thiserror::Error;
use url::Url;

const UPLOAD_PATH: &str = "/api/upload/v1";

#[derive(Error, Debug)]
pub enum UploadError {
    #[error("Failed to read {path}")]
    Read {
        path: String,
        #[source]
        source: std::io::Error,
    },
    #[error("Error uploading a flamegraph to {endpoint}")]
    Transport {
        endpoint: Url,
        #[source]
        source: reqwest::Error,
    },
    #[error("Error uploading a flamegraph. Server responded with {status}: '{body}'")]
    Status { status: StatusCode, body: String },
    #[error("Error uploading a flamegraph. Response contains '{body}'")]
    MalformedResponse { body: String },
}

#[derive(Serialize)]
struct UploadRequest<'a> {
    filename: &'a str,
    name: &'a str,
    profile: String,
}

#[derive(Deserialize)]
struct UploadResponse {
    result: Option<UploadResult>,
}

#[derive(Deserialize)]
struct UploadResult {
    url: String,
    key: String,
}

/// Client for the flamegraph.com upload API.
#[derive(Clone)]
pub struct Uploader {
    client: Client,
    endpoint: Url,
}

impl Uploader {
    pub fn new(base_url: &Url) -> Result<Self, reqwest::Error> {
        let client = Client::builder()
            .user_agent(concat!("flamegraph-action/", env!("CARGO_PKG_VERSION")))
            .build()?;
        Ok(Self { client, endpoint: base_url.join_path(UPLOAD_PATH) })
    }

    pub fn endpoint(&self) -> &Url { &self.endpoint }

    /// Uploads a single profile. The file is sent as-is, base64 encoded; the
    /// service decides whether it understands the format.
    pub async fn upload(&self, target: &UploadTarget) -> Result<UploadedFlamegraph, UploadError> {
        let path = target.filepath.as_str();
        let data = tokio::fs::read(path)
            .await
            .map_err(|source| UploadError::Read { path: path.to_string(), source })?;
        tracing::info!("Uploading {} ({})", path, size(data.len() as u64));
        let request = UploadRequest { filename: path, name: path, profile: STANDARD.encode(&data) };
        let transport =
            |source| UploadError::Transport { endpoint: self.endpoint.clone(), source };
        let response = self
            .client
            .post(self.endpoint.clone())
            .json(&request)
            .send()
            .await
            .map_err(transport)?;
        let status = response.status();
        let body = response.text().await.map_err(transport)?;
        if !status.is_success() {
            return Err(UploadError::Status { status, body });
        }
        let result = serde_json::from_str::<UploadResponse>(&body)
            .ok()
            .and_then(|response| response.result)
            .ok_or_else(|| UploadError::MalformedResponse { body: body.clone() })?;
        tracing::debug!("Uploaded {} as {}", path, result.key);
        Ok(UploadedFlamegraph { filepath: path.to_string(), url: result.url, key: result.key })
    }
}
