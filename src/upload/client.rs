use crate::config::AppConfig;
use crate::error::{ClientError, UploadFailure};
use crate::upload::types::{FileRef, UploadResult};
use crate::utils::token_parser;
use async_trait::async_trait;
use reqwest::header::HeaderMap;
use reqwest::multipart::{Form, Part};
use reqwest::StatusCode;
use serde::Deserialize;
use std::time::Duration;

/// The remote side of an upload. One call per attempt, no retries, no progress.
#[async_trait]
pub trait Uploader: Send + Sync {
    async fn upload(&self, file: &FileRef) -> Result<UploadResult, UploadFailure>;
}

#[derive(Deserialize)]
struct UploadResponse {
    image: Option<UploadedImage>,
}

#[derive(Deserialize)]
struct UploadedImage {
    #[serde(rename = "_id")]
    id: Option<String>,
    #[serde(rename = "cloudinaryUrl")]
    url: Option<String>,
}

#[derive(Deserialize)]
struct ErrorResponse {
    message: Option<String>,
}

/// Uploads images to the REST API as multipart form data.
#[derive(Clone)]
pub struct ApiClient {
    client: reqwest::Client,
    api_url: String,
    headers: HeaderMap,
}

impl ApiClient {
    pub fn new(api_url: &str, headers: HeaderMap, timeout: Duration) -> Result<Self, ClientError> {
        let client = reqwest::Client::builder().timeout(timeout).build()?;
        Ok(Self {
            client,
            api_url: api_url.trim_end_matches('/').to_string(),
            headers,
        })
    }

    pub fn from_config(config: &AppConfig, token_text: &str) -> Result<Self, ClientError> {
        let headers = token_parser::parse(token_text)?;
        Self::new(&config.api_url, headers, config.request_timeout())
    }

    pub fn upload_url(&self) -> String {
        format!("{}/images/upload", self.api_url)
    }

    async fn send(&self, file: &FileRef) -> Result<UploadResult, UploadFailure> {
        let bytes = tokio::fs::read(&file.path)
            .await
            .map_err(|e| UploadFailure::new(format!("Failed to read file: {}", e)))?;

        let part = Part::bytes(bytes)
            .file_name(file.name.clone())
            .mime_str(&file.mime_type)
            .map_err(|e| UploadFailure::new(format!("Invalid content type: {}", e)))?;
        let form = Form::new().part("image", part);

        let response = self
            .client
            .post(self.upload_url())
            .headers(self.headers.clone())
            .multipart(form)
            .send()
            .await
            .map_err(|e| UploadFailure::new(format!("Failed to send request: {}", e)))?;

        let status = response.status();
        let body = response
            .text()
            .await
            .map_err(|e| UploadFailure::new(format!("Failed to read response: {}", e)))?;

        if status == StatusCode::UNAUTHORIZED {
            log::warn!(
                "Upload of '{}' was rejected as unauthorized, session may have expired",
                file.name
            );
        }

        interpret_response(status, &body)
    }
}

#[async_trait]
impl Uploader for ApiClient {
    async fn upload(&self, file: &FileRef) -> Result<UploadResult, UploadFailure> {
        log::debug!("POST {} ({}, {} bytes)", self.upload_url(), file.name, file.size);
        self.send(file).await
    }
}

/// Maps a finished HTTP exchange to the upload contract.
pub fn interpret_response(status: StatusCode, body: &str) -> Result<UploadResult, UploadFailure> {
    if !status.is_success() {
        let reason = serde_json::from_str::<ErrorResponse>(body)
            .ok()
            .and_then(|error| error.message)
            .filter(|message| !message.trim().is_empty());
        return Err(UploadFailure { reason });
    }

    // A 2xx body without an image id carries no usable reason.
    let metadata: serde_json::Value =
        serde_json::from_str(body).map_err(|_| UploadFailure::unspecified())?;
    let parsed: UploadResponse =
        serde_json::from_value(metadata.clone()).map_err(|_| UploadFailure::unspecified())?;
    let image = parsed.image.ok_or_else(UploadFailure::unspecified)?;
    let remote_id = image.id.ok_or_else(UploadFailure::unspecified)?;

    Ok(UploadResult {
        remote_id,
        url: image.url,
        metadata,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn success_body_yields_remote_id_and_url() {
        let body = r#"{"message":"ok","image":{"_id":"42","cloudinaryUrl":"https://cdn/x.jpg","status":"processing"}}"#;
        let result = interpret_response(StatusCode::CREATED, body).unwrap();
        assert_eq!(result.remote_id, "42");
        assert_eq!(result.url.as_deref(), Some("https://cdn/x.jpg"));
        assert_eq!(result.metadata["image"]["status"], "processing");
    }

    #[test]
    fn error_body_message_becomes_reason() {
        let body = r#"{"message":"File too large"}"#;
        let failure = interpret_response(StatusCode::BAD_REQUEST, body).unwrap_err();
        assert_eq!(failure.message(), "File too large");
    }

    #[test]
    fn error_without_message_falls_back() {
        let failure = interpret_response(StatusCode::INTERNAL_SERVER_ERROR, "<html>").unwrap_err();
        assert_eq!(failure.reason, None);
        assert_eq!(failure.message(), "Upload failed");

        let blank = interpret_response(StatusCode::UNAUTHORIZED, r#"{"message":"  "}"#).unwrap_err();
        assert_eq!(blank.message(), "Upload failed");
    }

    #[test]
    fn success_without_image_id_falls_back() {
        for body in ["not json", "{}", r#"{"image":{"cloudinaryUrl":"u"}}"#] {
            let failure = interpret_response(StatusCode::OK, body).unwrap_err();
            assert_eq!(failure, UploadFailure::unspecified());
            assert_eq!(failure.message(), "Upload failed");
        }
    }

    #[test]
    fn upload_url_joins_without_double_slash() {
        let client = ApiClient::new(
            "http://localhost:5000/api/",
            HeaderMap::new(),
            Duration::from_secs(5),
        )
        .unwrap();
        assert_eq!(client.upload_url(), "http://localhost:5000/api/images/upload");
    }

    #[tokio::test]
    async fn unreadable_file_fails_before_sending() {
        let client =
            ApiClient::new("http://127.0.0.1:9", HeaderMap::new(), Duration::from_secs(1)).unwrap();
        let file = FileRef::new("/definitely/not/here.png", 10);
        let failure = client.upload(&file).await.unwrap_err();
        assert!(failure.message().starts_with("Failed to read file"));
    }
}
