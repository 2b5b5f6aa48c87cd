//! REST client for the Google Drive v3 files endpoints.
//!
//! Wraps `files.create` (streamed multipart media upload), `files.get` and
//! `files.list` using [`reqwest`] with bearer-token auth.

use std::io::Cursor;

use chrono::{DateTime, Utc};
use futures::StreamExt;
use serde::{Deserialize, Serialize};
use tokio::io::AsyncRead;
use tokio_util::io::ReaderStream;

use crate::config::DriveConfig;

/// Content type of the metadata part in a multipart upload.
const METADATA_CONTENT_TYPE: &str = "application/json; charset=UTF-8";

/// Drive's prefix for native document types (folders, docs, sheets...).
pub const GOOGLE_APPS_PREFIX: &str = "application/vnd.google-apps.";

/// Content type Drive uses for folders.
pub const FOLDER_MIME_TYPE: &str = "application/vnd.google-apps.folder";

/// Errors from the Drive REST API layer.
#[derive(Debug, thiserror::Error)]
pub enum DriveApiError {
    /// The HTTP request itself failed (network, DNS, TLS, timeout, etc.).
    #[error("HTTP request failed: {0}")]
    Request(#[from] reqwest::Error),

    /// Drive returned a non-2xx status code.
    #[error("Drive API error ({status}): {body}")]
    ApiError {
        /// HTTP status code.
        status: u16,
        /// Raw response body for debugging.
        body: String,
    },

    /// The metadata part could not be encoded.
    #[error("Failed to encode file metadata: {0}")]
    Encode(#[from] serde_json::Error),
}

impl DriveApiError {
    /// Whether Drive reported that the file or folder does not exist.
    pub fn is_not_found(&self) -> bool {
        matches!(self, Self::ApiError { status: 404, .. })
    }
}

/// Metadata sent alongside uploaded content.
#[derive(Debug, Clone, Default, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct FileMetadata {
    pub name: String,
    #[serde(skip_serializing_if = "String::is_empty")]
    pub description: String,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub parents: Vec<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub mime_type: Option<String>,
}

/// A Drive file resource, limited to the fields this crate requests.
///
/// Drive encodes `size` as a decimal string.
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct DriveFile {
    pub id: String,
    pub name: String,
    pub mime_type: String,
    pub description: Option<String>,
    pub parents: Vec<String>,
    pub size: Option<String>,
    pub created_time: Option<DateTime<Utc>>,
    pub modified_time: Option<DateTime<Utc>>,
}

impl DriveFile {
    /// Whether this entry is a folder.
    pub fn is_folder(&self) -> bool {
        self.mime_type == FOLDER_MIME_TYPE
    }

    /// Size in bytes; folders and native documents report none.
    pub fn size_bytes(&self) -> u64 {
        self.size
            .as_deref()
            .and_then(|s| s.parse().ok())
            .unwrap_or(0)
    }

    /// Browser link for the file.
    pub fn web_view_url(&self) -> String {
        format!("https://drive.google.com/file/d/{}/view", self.id)
    }
}

/// One page of a `files.list` response.
#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase", default)]
struct FileList {
    files: Vec<DriveFile>,
    next_page_token: Option<String>,
}

/// HTTP client for the Drive v3 API.
#[derive(Debug, Clone)]
pub struct DriveApi {
    client: reqwest::Client,
    config: DriveConfig,
}

impl DriveApi {
    /// Create a client with the configured request timeout.
    pub fn new(config: DriveConfig) -> Result<Self, DriveApiError> {
        let client = reqwest::Client::builder()
            .timeout(config.request_timeout)
            .build()?;
        Ok(Self { client, config })
    }

    /// Create a client reusing an existing [`reqwest::Client`].
    pub fn with_client(client: reqwest::Client, config: DriveConfig) -> Self {
        Self { client, config }
    }

    /// Upload `media` as a new file.
    ///
    /// Sends `POST {upload_url}/files?uploadType=multipart` with a
    /// `multipart/related` body: the JSON metadata part followed by the media
    /// part. The media is streamed from `media`; `media_len` must be its
    /// exact length in bytes.
    pub async fn create_file<R>(
        &self,
        metadata: &FileMetadata,
        media: R,
        media_len: u64,
    ) -> Result<DriveFile, DriveApiError>
    where
        R: AsyncRead + Send + 'static,
    {
        let boundary = format!("upqueue-{}", uuid::Uuid::new_v4().simple());
        let metadata_json = serde_json::to_vec(metadata)?;
        let media_type = metadata
            .mime_type
            .as_deref()
            .unwrap_or(upqueue_core::mime::OCTET_STREAM);
        let (head, tail) = related_delimiters(&boundary, &metadata_json, media_type);
        let content_length = head.len() as u64 + media_len + tail.len() as u64;

        let body = ReaderStream::new(Cursor::new(head))
            .chain(ReaderStream::new(media))
            .chain(ReaderStream::new(Cursor::new(tail)));

        let response = self
            .client
            .post(format!("{}/files", self.config.upload_url))
            .query(&[("uploadType", "multipart"), ("fields", "id,name,mimeType,parents")])
            .bearer_auth(&self.config.access_token)
            .header(
                reqwest::header::CONTENT_TYPE,
                format!("multipart/related; boundary={boundary}"),
            )
            .header(reqwest::header::CONTENT_LENGTH, content_length)
            .body(reqwest::Body::wrap_stream(body))
            .send()
            .await?;

        Self::parse_response(response).await
    }

    /// Fetch a single file's metadata.
    ///
    /// `fields` is a Drive partial-response selector such as
    /// `"id,name,mimeType"`.
    pub async fn get_file(&self, file_id: &str, fields: &str) -> Result<DriveFile, DriveApiError> {
        let response = self
            .client
            .get(format!("{}/files/{}", self.config.api_url, file_id))
            .query(&[("fields", fields)])
            .bearer_auth(&self.config.access_token)
            .send()
            .await?;

        Self::parse_response(response).await
    }

    /// List the direct children of a folder, following every page.
    pub async fn list_children(
        &self,
        folder_id: &str,
        fields: &str,
    ) -> Result<Vec<DriveFile>, DriveApiError> {
        let query = format!("'{folder_id}' in parents");
        let files_fields = format!("nextPageToken,files({fields})");
        let mut files = Vec::new();
        let mut page_token: Option<String> = None;

        loop {
            let mut request = self
                .client
                .get(format!("{}/files", self.config.api_url))
                .query(&[("q", query.as_str()), ("fields", files_fields.as_str())])
                .bearer_auth(&self.config.access_token);
            if let Some(token) = &page_token {
                request = request.query(&[("pageToken", token.as_str())]);
            }

            let page: FileList = Self::parse_response(request.send().await?).await?;
            files.extend(page.files);

            match page.next_page_token {
                Some(token) if !token.is_empty() => page_token = Some(token),
                _ => break,
            }
        }

        Ok(files)
    }

    // ---- private helpers ----

    /// Ensure the response has a success status code. Returns the
    /// response unchanged on success, or a [`DriveApiError::ApiError`]
    /// containing the status and body text on failure.
    async fn ensure_success(
        response: reqwest::Response,
    ) -> Result<reqwest::Response, DriveApiError> {
        let status = response.status();
        if !status.is_success() {
            let body = response
                .text()
                .await
                .unwrap_or_else(|_| "<unreadable body>".to_string());
            return Err(DriveApiError::ApiError {
                status: status.as_u16(),
                body,
            });
        }
        Ok(response)
    }

    /// Parse a successful JSON response body into the expected type.
    async fn parse_response<T: serde::de::DeserializeOwned>(
        response: reqwest::Response,
    ) -> Result<T, DriveApiError> {
        let response = Self::ensure_success(response).await?;
        Ok(response.json::<T>().await?)
    }
}

/// Framing of a two-part `multipart/related` body.
///
/// Returns everything before the media bytes (opening boundary, metadata
/// part, media part header) and everything after them (closing boundary).
pub fn related_delimiters(
    boundary: &str,
    metadata_json: &[u8],
    media_type: &str,
) -> (Vec<u8>, Vec<u8>) {
    let mut head = Vec::with_capacity(metadata_json.len() + 128);
    head.extend_from_slice(format!("--{boundary}\r\n").as_bytes());
    head.extend_from_slice(format!("Content-Type: {METADATA_CONTENT_TYPE}\r\n\r\n").as_bytes());
    head.extend_from_slice(metadata_json);
    head.extend_from_slice(format!("\r\n--{boundary}\r\n").as_bytes());
    head.extend_from_slice(format!("Content-Type: {media_type}\r\n\r\n").as_bytes());

    let tail = format!("\r\n--{boundary}--\r\n").into_bytes();
    (head, tail)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn related_delimiters_frame_metadata_then_media() {
        let (head, tail) = related_delimiters("xyz", br#"{"name":"a.txt"}"#, "text/plain");
        let mut body = head;
        body.extend_from_slice(b"hello");
        body.extend_from_slice(&tail);

        assert_eq!(
            String::from_utf8(body).unwrap(),
            "--xyz\r\n\
             Content-Type: application/json; charset=UTF-8\r\n\r\n\
             {\"name\":\"a.txt\"}\r\n\
             --xyz\r\n\
             Content-Type: text/plain\r\n\r\n\
             hello\r\n\
             --xyz--\r\n"
        );
    }

    #[test]
    fn metadata_omits_empty_fields() {
        let metadata = FileMetadata {
            name: "clip.mp4".into(),
            ..Default::default()
        };

        let json = serde_json::to_value(&metadata).unwrap();
        assert_eq!(json, serde_json::json!({ "name": "clip.mp4" }));
    }

    #[test]
    fn metadata_uses_camel_case() {
        let metadata = FileMetadata {
            name: "clip.mp4".into(),
            description: "take 2".into(),
            parents: vec!["folder".into()],
            mime_type: Some("video/mp4".into()),
        };

        let json = serde_json::to_value(&metadata).unwrap();
        assert_eq!(json["mimeType"], "video/mp4");
        assert_eq!(json["parents"][0], "folder");
        assert_eq!(json["description"], "take 2");
    }

    #[test]
    fn drive_file_decodes_string_size() {
        let file: DriveFile = serde_json::from_value(serde_json::json!({
            "id": "1AbC",
            "name": "clip.mp4",
            "mimeType": "video/mp4",
            "size": "1048576",
            "modifiedTime": "2024-03-01T12:30:00.000Z"
        }))
        .unwrap();

        assert_eq!(file.size_bytes(), 1_048_576);
        assert!(!file.is_folder());
        assert!(file.modified_time.is_some());
        assert_eq!(file.web_view_url(), "https://drive.google.com/file/d/1AbC/view");
    }

    #[test]
    fn not_found_is_detectable() {
        let err = DriveApiError::ApiError {
            status: 404,
            body: "File not found".into(),
        };

        assert!(err.is_not_found());
        assert!(!DriveApiError::ApiError {
            status: 500,
            body: String::new()
        }
        .is_not_found());
    }
}
