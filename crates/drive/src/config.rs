use std::time::Duration;

/// Default Drive v3 metadata endpoint.
pub const DEFAULT_API_URL: &str = "https://www.googleapis.com/drive/v3";

/// Default Drive v3 media upload endpoint.
pub const DEFAULT_UPLOAD_URL: &str = "https://www.googleapis.com/upload/drive/v3";

/// Default per-request timeout. Uploads of large media need headroom.
pub const DEFAULT_REQUEST_TIMEOUT_SECS: u64 = 600;

/// Errors raised while reading Drive settings from the environment.
#[derive(Debug, thiserror::Error)]
pub enum DriveConfigError {
    #[error("{0} must be set")]
    Missing(&'static str),

    #[error("{name} must be a valid {expected}, got '{value}'")]
    Invalid {
        name: &'static str,
        expected: &'static str,
        value: String,
    },
}

/// Connection settings for the Drive API.
#[derive(Clone)]
pub struct DriveConfig {
    /// OAuth 2.0 bearer token with a Drive scope.
    pub access_token: String,
    /// Base URL for metadata calls (`files.get`, `files.list`).
    pub api_url: String,
    /// Base URL for media uploads (`files.create` with content).
    pub upload_url: String,
    /// Per-request timeout.
    pub request_timeout: Duration,
}

impl std::fmt::Debug for DriveConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("DriveConfig")
            .field("access_token", &"<redacted>")
            .field("api_url", &self.api_url)
            .field("upload_url", &self.upload_url)
            .field("request_timeout", &self.request_timeout)
            .finish()
    }
}

impl DriveConfig {
    /// Settings pointing at the public Drive endpoints.
    pub fn new(access_token: impl Into<String>) -> Self {
        Self {
            access_token: access_token.into(),
            api_url: DEFAULT_API_URL.to_string(),
            upload_url: DEFAULT_UPLOAD_URL.to_string(),
            request_timeout: Duration::from_secs(DEFAULT_REQUEST_TIMEOUT_SECS),
        }
    }

    /// Load settings from environment variables.
    ///
    /// | Env Var                      | Default                                       |
    /// |------------------------------|-----------------------------------------------|
    /// | `DRIVE_ACCESS_TOKEN`         | required                                      |
    /// | `DRIVE_API_URL`              | `https://www.googleapis.com/drive/v3`         |
    /// | `DRIVE_UPLOAD_URL`           | `https://www.googleapis.com/upload/drive/v3`  |
    /// | `DRIVE_REQUEST_TIMEOUT_SECS` | `600`                                         |
    pub fn from_env() -> Result<Self, DriveConfigError> {
        let access_token = std::env::var("DRIVE_ACCESS_TOKEN")
            .ok()
            .filter(|token| !token.trim().is_empty())
            .ok_or(DriveConfigError::Missing("DRIVE_ACCESS_TOKEN"))?;

        let mut config = Self::new(access_token);

        if let Ok(url) = std::env::var("DRIVE_API_URL") {
            config.api_url = url.trim_end_matches('/').to_string();
        }
        if let Ok(url) = std::env::var("DRIVE_UPLOAD_URL") {
            config.upload_url = url.trim_end_matches('/').to_string();
        }
        if let Ok(raw) = std::env::var("DRIVE_REQUEST_TIMEOUT_SECS") {
            let secs: u64 = raw.parse().map_err(|_| DriveConfigError::Invalid {
                name: "DRIVE_REQUEST_TIMEOUT_SECS",
                expected: "u64",
                value: raw.clone(),
            })?;
            config.request_timeout = Duration::from_secs(secs);
        }

        Ok(config)
    }
}
