use bytes::Bytes;
use engine_logging::{engine_debug, engine_warn};
use futures_util::stream::BoxStream;
use futures_util::StreamExt;
use reqwest::header::{ACCEPT, CONTENT_TYPE};
use reqwest::multipart::{Form, Part};
use reqwest::{Response, Url};
use serde::de::DeserializeOwned;

use crate::{ApiError, ClientSettings, FailureKind, RemoteItem, UploadParams};

const MAX_ERROR_BODY: usize = 200;

/// The backend contract the orchestrator and synchronizer run against.
#[async_trait::async_trait]
pub trait ArchiveApi: Send + Sync {
    async fn upload_params(&self, filename: &str) -> Result<UploadParams, ApiError>;

    /// Raw PUT to a pre-authorized object-storage target.
    async fn put_object(
        &self,
        upload_url: &str,
        content_type: &str,
        bytes: Bytes,
    ) -> Result<(), ApiError>;

    async fn finalize(
        &self,
        original_filename: &str,
        storage_path: &str,
        metadata_json: &str,
    ) -> Result<RemoteItem, ApiError>;

    async fn upload_proxied(
        &self,
        filename: &str,
        content_type: &str,
        bytes: Bytes,
        metadata_json: &str,
    ) -> Result<RemoteItem, ApiError>;

    async fn list_items(&self) -> Result<Vec<RemoteItem>, ApiError>;

    async fn delete_item(&self, id: &str) -> Result<(), ApiError>;
}

pub type ByteStream = BoxStream<'static, Result<Bytes, ApiError>>;

/// Long-lived byte stream carrying server-sent events.
#[async_trait::async_trait]
pub trait EventFeed: Send + Sync {
    async fn subscribe(&self) -> Result<ByteStream, ApiError>;
}

#[derive(Debug, Clone)]
pub struct ReqwestArchiveApi {
    settings: ClientSettings,
    client: reqwest::Client,
    /// No total timeout: the event stream stays open indefinitely.
    stream_client: reqwest::Client,
}

impl ReqwestArchiveApi {
    pub fn new(settings: ClientSettings) -> Result<Self, ApiError> {
        let client = reqwest::Client::builder()
            .connect_timeout(settings.connect_timeout)
            .timeout(settings.request_timeout)
            .build()
            .map_err(|err| ApiError::new(FailureKind::Network, err.to_string()))?;
        let stream_client = reqwest::Client::builder()
            .connect_timeout(settings.connect_timeout)
            .build()
            .map_err(|err| ApiError::new(FailureKind::Network, err.to_string()))?;
        Ok(Self {
            settings,
            client,
            stream_client,
        })
    }

    /// Open `GET /events`; the caller reads the body as a byte stream.
    pub async fn open_events(&self) -> Result<Response, ApiError> {
        let url = self.url("events")?;
        let request = self
            .stream_client
            .get(url)
            .header(ACCEPT, "text/event-stream");
        send(request, "GET /events").await
    }

    fn url(&self, path: &str) -> Result<Url, ApiError> {
        let endpoint = self.settings.endpoint(path);
        Url::parse(&endpoint).map_err(|err| {
            ApiError::new(FailureKind::InvalidUrl, format!("{endpoint}: {err}"))
        })
    }
}

#[async_trait::async_trait]
impl ArchiveApi for ReqwestArchiveApi {
    async fn upload_params(&self, filename: &str) -> Result<UploadParams, ApiError> {
        let mut url = self.url("upload/params")?;
        url.query_pairs_mut().append_pair("filename", filename);
        let response = send(self.client.get(url), "GET /upload/params").await?;
        decode(response).await
    }

    async fn put_object(
        &self,
        upload_url: &str,
        content_type: &str,
        bytes: Bytes,
    ) -> Result<(), ApiError> {
        let url = Url::parse(upload_url).map_err(|err| {
            ApiError::new(FailureKind::InvalidUrl, format!("{upload_url}: {err}"))
        })?;
        let request = self
            .client
            .put(url)
            .header(CONTENT_TYPE, content_type)
            .body(bytes);
        send(request, "PUT object").await?;
        Ok(())
    }

    async fn finalize(
        &self,
        original_filename: &str,
        storage_path: &str,
        metadata_json: &str,
    ) -> Result<RemoteItem, ApiError> {
        let form = Form::new()
            .text("original_filename", original_filename.to_string())
            .text("storage_path", storage_path.to_string())
            .text("metadata", metadata_json.to_string());
        let url = self.url("upload/finalize")?;
        let response = send(self.client.post(url).multipart(form), "POST /upload/finalize").await?;
        decode(response).await
    }

    async fn upload_proxied(
        &self,
        filename: &str,
        content_type: &str,
        bytes: Bytes,
        metadata_json: &str,
    ) -> Result<RemoteItem, ApiError> {
        let form = Form::new()
            .part("file", file_part(filename, content_type, &bytes))
            .text("metadata", metadata_json.to_string());
        let url = self.url("upload")?;
        let response = send(self.client.post(url).multipart(form), "POST /upload").await?;
        decode(response).await
    }

    async fn list_items(&self) -> Result<Vec<RemoteItem>, ApiError> {
        let url = self.url("items")?;
        let response = send(self.client.get(url), "GET /items").await?;
        decode(response).await
    }

    async fn delete_item(&self, id: &str) -> Result<(), ApiError> {
        let mut url = self.url("items")?;
        url.path_segments_mut()
            .map_err(|_| ApiError::new(FailureKind::InvalidUrl, "base url cannot hold a path"))?
            .push(id);
        send(self.client.delete(url), "DELETE /items/{id}").await?;
        Ok(())
    }
}

#[async_trait::async_trait]
impl EventFeed for ReqwestArchiveApi {
    async fn subscribe(&self) -> Result<ByteStream, ApiError> {
        let response = self.open_events().await?;
        Ok(response
            .bytes_stream()
            .map(|chunk| chunk.map_err(map_reqwest_error))
            .boxed())
    }
}

fn file_part(filename: &str, content_type: &str, bytes: &Bytes) -> Part {
    let build = || Part::bytes(bytes.to_vec()).file_name(filename.to_string());
    build().mime_str(content_type).unwrap_or_else(|_| {
        engine_warn!(
            "Invalid content type {:?} for {}, sending the part untyped",
            content_type,
            filename
        );
        build()
    })
}

async fn send(request: reqwest::RequestBuilder, what: &str) -> Result<Response, ApiError> {
    let response = request.send().await.map_err(|err| {
        let mapped = map_reqwest_error(err);
        engine_debug!("{} failed: {}", what, mapped);
        mapped
    })?;

    let status = response.status();
    if !status.is_success() {
        let body = response.text().await.unwrap_or_default();
        engine_debug!("{} returned {}", what, status);
        return Err(ApiError::new(
            FailureKind::HttpStatus(status.as_u16()),
            error_message(status, &body),
        ));
    }
    engine_debug!("{} ok ({})", what, status);
    Ok(response)
}

async fn decode<T: DeserializeOwned>(response: Response) -> Result<T, ApiError> {
    let body = response.bytes().await.map_err(map_reqwest_error)?;
    serde_json::from_slice(&body)
        .map_err(|err| ApiError::new(FailureKind::InvalidResponse, err.to_string()))
}

fn error_message(status: reqwest::StatusCode, body: &str) -> String {
    let body = body.trim();
    if body.is_empty() {
        return status.to_string();
    }
    let snippet: String = body.chars().take(MAX_ERROR_BODY).collect();
    format!("{status}: {snippet}")
}

pub(crate) fn map_reqwest_error(err: reqwest::Error) -> ApiError {
    if err.is_timeout() {
        return ApiError::new(FailureKind::Timeout, err.to_string());
    }
    ApiError::new(FailureKind::Network, err.to_string())
}
