//! HTTP transport against the host: document upload and REST service calls.

use std::sync::Arc;

use async_trait::async_trait;
use reqwest::{
    multipart::{Form, Part},
    Client, Response,
};
use serde_json::Value;
use shared::protocol::{service_route, upload_route, UploadResponse, UPLOAD_FIELD};
use thiserror::Error;
use tracing::debug;
use url::Url;

use crate::{upload::PdfFile, ConnectionContext, FileUploader, ServiceCaller};

#[derive(Debug, Error)]
pub enum TransportError {
    /// The host answered with a non-success status; `message` is its error text.
    #[error("{message}")]
    Status { status: u16, message: String },
    #[error(transparent)]
    Http(#[from] reqwest::Error),
    #[error("invalid host url: {0}")]
    Url(#[from] url::ParseError),
}

#[derive(Clone)]
pub struct HomeAssistantClient {
    http: Client,
    base_url: String,
}

impl HomeAssistantClient {
    pub fn new(base_url: &str) -> Result<Self, TransportError> {
        Self::with_http(Client::new(), base_url)
    }

    pub fn with_http(http: Client, base_url: &str) -> Result<Self, TransportError> {
        let parsed = Url::parse(base_url)?;
        Ok(Self {
            http,
            base_url: parsed.as_str().trim_end_matches('/').to_string(),
        })
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    /// Mints a connection snapshot whose service calls go through this client.
    pub fn connection_context(&self, access_token: impl Into<String>) -> ConnectionContext {
        let access_token = access_token.into();
        let services = RestServiceCaller {
            http: self.http.clone(),
            base_url: self.base_url.clone(),
            access_token: access_token.clone(),
        };
        ConnectionContext::new(access_token, Arc::new(services))
    }
}

#[async_trait]
impl FileUploader for HomeAssistantClient {
    async fn upload(
        &self,
        access_token: &str,
        file: &PdfFile,
    ) -> Result<UploadResponse, TransportError> {
        let part = Part::bytes(file.bytes.clone())
            .file_name(file.name.clone())
            .mime_str(&file.mime_type)?;
        let form = Form::new().part(UPLOAD_FIELD, part);

        let url = format!("{}{}", self.base_url, upload_route());
        debug!(%url, file = %file.name, size = file.bytes.len(), "uploading document");
        let response = self
            .http
            .post(url)
            .bearer_auth(access_token)
            .multipart(form)
            .send()
            .await?;

        Ok(ensure_success(response).await?.json().await?)
    }
}

/// Service calls over the host's REST API, authenticated with a fixed credential.
pub struct RestServiceCaller {
    http: Client,
    base_url: String,
    access_token: String,
}

#[async_trait]
impl ServiceCaller for RestServiceCaller {
    async fn call_service(
        &self,
        domain: &str,
        service: &str,
        data: Value,
    ) -> Result<(), TransportError> {
        let url = format!("{}{}", self.base_url, service_route(domain, service));
        debug!(%url, "calling service");
        let response = self
            .http
            .post(url)
            .bearer_auth(&self.access_token)
            .json(&data)
            .send()
            .await?;
        ensure_success(response).await?;
        Ok(())
    }
}

async fn ensure_success(response: Response) -> Result<Response, TransportError> {
    let status = response.status();
    if status.is_success() {
        return Ok(response);
    }

    let body = response.text().await.unwrap_or_default();
    let message = if body.trim().is_empty() {
        status.to_string()
    } else {
        body
    };
    Err(TransportError::Status {
        status: status.as_u16(),
        message,
    })
}

#[cfg(test)]
#[path = "tests/transport_tests.rs"]
mod tests;
