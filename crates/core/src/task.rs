//! Upload task model.
//!
//! A [`Task`] is created by a caller with an empty `id` and `running=false`.
//! The dispatcher assigns the id on admission ([`Task::admit`]) and a worker
//! flips `running` when it claims the task.

use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::error::CoreError;
use crate::mime;
use crate::types::TaskId;

/// A single upload job.
///
/// Field names on the wire follow the control surface's JSON format
/// (`mimeType` is camelCase). Missing fields decode to their defaults.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Task {
    /// Dispatcher-assigned identity; empty until admitted.
    pub id: TaskId,
    /// Local path of the file to upload.
    pub filename: String,
    /// Free-text description attached to the remote file.
    pub description: String,
    /// Destination folder ids, in order.
    pub parents: Vec<String>,
    /// Explicit content type. When absent or empty the type is inferred
    /// from the filename extension.
    #[serde(rename = "mimeType", skip_serializing_if = "Option::is_none")]
    pub mime_type: Option<String>,
    /// Whether a worker has claimed the task.
    pub running: bool,
}

impl Task {
    /// Create a task for the file at `filename` with no metadata.
    pub fn new(filename: impl Into<String>) -> Self {
        Self {
            filename: filename.into(),
            ..Self::default()
        }
    }

    /// Set the description.
    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = description.into();
        self
    }

    /// Set the destination folder ids.
    pub fn with_parents<I, S>(mut self, parents: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.parents = parents.into_iter().map(Into::into).collect();
        self
    }

    /// Set an explicit content type.
    pub fn with_mime_type(mut self, mime_type: impl Into<String>) -> Self {
        self.mime_type = Some(mime_type.into());
        self
    }

    /// Canonicalize the lifecycle fields on admission: assign `id` and reset
    /// `running`, discarding whatever the caller supplied.
    pub fn admit(&mut self, id: TaskId) {
        self.id = id;
        self.running = false;
    }

    /// Whether the dispatcher has assigned an identity.
    pub fn is_admitted(&self) -> bool {
        !self.id.is_empty()
    }

    /// Base name of `filename`, used as the remote file name.
    pub fn file_name(&self) -> Result<&str, CoreError> {
        Path::new(&self.filename)
            .file_name()
            .and_then(|name| name.to_str())
            .ok_or_else(|| {
                CoreError::Validation(format!(
                    "filename '{}' has no usable base name",
                    self.filename
                ))
            })
    }

    /// Resolve the content type: the explicit field wins, otherwise infer it
    /// from the filename extension. `None` means unknown.
    pub fn content_type(&self) -> Option<String> {
        match self.mime_type.as_deref() {
            Some(explicit) if !explicit.trim().is_empty() => Some(explicit.to_string()),
            _ => mime::content_type_for(&self.filename).map(str::to_string),
        }
    }
}
