//! Boundary to the remote analysis service.

use std::{path::Path, time::Duration};

use async_trait::async_trait;
use reqwest::{
    multipart::{Form, Part},
    Client, Response,
};
use serde::de::DeserializeOwned;
use shared::{
    error::{ApiException, ErrorBody},
    protocol::{
        HealthResponse, QueryRequest, QueryResponse, UploadResponse, HEALTH_PATH, QUERY_PATH,
        UPLOAD_FIELD, UPLOAD_PATH,
    },
};
use tracing::debug;
use url::Url;

use crate::{config::ClientSettings, error::BackendError};

#[async_trait]
pub trait AnalysisBackend: Send + Sync {
    async fn query(&self, request: QueryRequest) -> Result<QueryResponse, BackendError>;
    async fn upload(&self, file: UploadFile) -> Result<UploadResponse, BackendError>;
    async fn health(&self) -> Result<HealthResponse, BackendError>;
}

/// A document chosen by the user, ready to be sent as-is.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UploadFile {
    pub name: String,
    pub mime_type: Option<String>,
    pub bytes: Vec<u8>,
}

impl UploadFile {
    pub fn new(name: impl Into<String>, bytes: Vec<u8>) -> Self {
        Self {
            name: name.into(),
            mime_type: None,
            bytes,
        }
    }

    pub async fn from_path(path: &Path) -> Result<Self, BackendError> {
        let bytes = tokio::fs::read(path)
            .await
            .map_err(|source| BackendError::File {
                path: path.display().to_string(),
                source,
            })?;
        let name = path
            .file_name()
            .map(|name| name.to_string_lossy().into_owned())
            .unwrap_or_else(|| path.display().to_string());
        let mime_type = mime_guess::from_path(path)
            .first()
            .map(|mime| mime.essence_str().to_string());
        Ok(Self {
            name,
            mime_type,
            bytes,
        })
    }
}

pub struct HttpAnalysisBackend {
    http: Client,
    base_url: Url,
}

impl HttpAnalysisBackend {
    pub fn new(base_url: Url, request_timeout: Option<Duration>) -> Result<Self, BackendError> {
        let mut builder = Client::builder();
        if let Some(timeout) = request_timeout {
            builder = builder.timeout(timeout);
        }
        Ok(Self {
            http: builder.build()?,
            base_url,
        })
    }

    pub fn from_settings(settings: &ClientSettings) -> Result<Self, BackendError> {
        Self::new(settings.api_base_url.clone(), settings.request_timeout)
    }

    pub fn base_url(&self) -> &Url {
        &self.base_url
    }

    fn endpoint(&self, path: &str) -> Result<Url, BackendError> {
        Ok(self.base_url.join(path)?)
    }
}

#[async_trait]
impl AnalysisBackend for HttpAnalysisBackend {
    async fn query(&self, request: QueryRequest) -> Result<QueryResponse, BackendError> {
        let url = self.endpoint(QUERY_PATH)?;
        debug!(%url, "posting query");
        let response = self.http.post(url).json(&request).send().await?;
        read_json(response).await
    }

    async fn upload(&self, file: UploadFile) -> Result<UploadResponse, BackendError> {
        let url = self.endpoint(UPLOAD_PATH)?;
        debug!(%url, file = %file.name, size_bytes = file.bytes.len(), "posting upload");
        let mut part = Part::bytes(file.bytes).file_name(file.name);
        if let Some(mime_type) = &file.mime_type {
            part = part.mime_str(mime_type)?;
        }
        let form = Form::new().part(UPLOAD_FIELD, part);
        let response = self.http.post(url).multipart(form).send().await?;
        read_json(response).await
    }

    async fn health(&self) -> Result<HealthResponse, BackendError> {
        let url = self.endpoint(HEALTH_PATH)?;
        let response = self.http.get(url).send().await?;
        read_json(response).await
    }
}

async fn read_json<T: DeserializeOwned>(response: Response) -> Result<T, BackendError> {
    let status = response.status();
    if !status.is_success() {
        let raw = response.bytes().await.unwrap_or_default();
        return Err(ApiException::new(status.as_u16(), ErrorBody::parse(&raw)).into());
    }
    let raw = response.bytes().await?;
    serde_json::from_slice(&raw).map_err(|e| BackendError::Decode(e.to_string()))
}

#[cfg(test)]
#[path = "tests/backend_tests.rs"]
mod tests;
