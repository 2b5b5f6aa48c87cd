use async_trait::async_trait;
use upqueue_core::Task;
use upqueue_worker::{UploadError, Uploader};

use crate::api::{DriveApi, DriveApiError, FileMetadata};

/// [`Uploader`] that writes each task's file into Google Drive.
pub struct DriveUploader {
    api: DriveApi,
}

impl DriveUploader {
    pub fn new(api: DriveApi) -> Self {
        Self { api }
    }

    /// Build the Drive metadata for a task: base name, description,
    /// parents, and the resolved content type.
    pub fn metadata_for(task: &Task) -> Result<FileMetadata, UploadError> {
        Ok(FileMetadata {
            name: task.file_name()?.to_string(),
            description: task.description.clone(),
            parents: task.parents.clone(),
            mime_type: task.content_type(),
        })
    }
}

impl From<DriveApiError> for UploadError {
    fn from(err: DriveApiError) -> Self {
        UploadError::Backend(Box::new(err))
    }
}

#[async_trait]
impl Uploader for DriveUploader {
    async fn upload(&self, task: &Task) -> Result<String, UploadError> {
        let metadata = Self::metadata_for(task)?;
        let read_error = |source: std::io::Error| UploadError::Read {
            path: task.filename.clone(),
            source,
        };
        let content = tokio::fs::File::open(&task.filename)
            .await
            .map_err(read_error)?;
        let len = content.metadata().await.map_err(read_error)?.len();

        tracing::info!(
            task_id = %task.id,
            name = %metadata.name,
            bytes = len,
            mime_type = metadata.mime_type.as_deref().unwrap_or("<detect>"),
            "Uploading",
        );

        let file = self.api.create_file(&metadata, content, len).await?;
        tracing::info!(task_id = %task.id, url = %file.web_view_url(), "Uploaded");

        Ok(file.id)
    }
}
