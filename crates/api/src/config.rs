use upqueue_worker::config::{DEFAULT_POOL_SIZE, DEFAULT_QUEUE_CAPACITY};
use upqueue_worker::DispatcherConfig;

/// Server configuration loaded from environment variables.
///
/// All fields have defaults suitable for running on a workstation.
#[derive(Debug, Clone)]
pub struct ServerConfig {
    /// Bind address (default: `0.0.0.0`).
    pub host: String,
    /// Bind port (default: `5119`).
    pub port: u16,
    /// HTTP request timeout in seconds (default: `30`).
    pub request_timeout_secs: u64,
    /// How long shutdown waits for in-flight uploads, in seconds (default: `30`).
    pub shutdown_timeout_secs: u64,
    /// Worker pool size and admission queue capacity.
    pub dispatcher: DispatcherConfig,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: "0.0.0.0".to_string(),
            port: 5119,
            request_timeout_secs: 30,
            shutdown_timeout_secs: 30,
            dispatcher: DispatcherConfig::default(),
        }
    }
}

impl ServerConfig {
    /// Load configuration from environment variables with defaults.
    ///
    /// | Env Var                 | Default   |
    /// |-------------------------|-----------|
    /// | `UPQUEUE_HOST`          | `0.0.0.0` |
    /// | `UPQUEUE_PORT`          | `5119`    |
    /// | `REQUEST_TIMEOUT_SECS`  | `30`      |
    /// | `SHUTDOWN_TIMEOUT_SECS` | `30`      |
    /// | `MAX_WORKER_SIZE`       | `1`       |
    /// | `MAX_QUEUE_SIZE`        | `100`     |
    ///
    /// Pool and queue sizes that are missing, non-numeric or not positive
    /// fall back to their defaults.
    pub fn from_env() -> Self {
        let host = std::env::var("UPQUEUE_HOST").unwrap_or_else(|_| "0.0.0.0".into());

        let port: u16 = std::env::var("UPQUEUE_PORT")
            .unwrap_or_else(|_| "5119".into())
            .parse()
            .expect("UPQUEUE_PORT must be a valid u16");

        let request_timeout_secs: u64 = std::env::var("REQUEST_TIMEOUT_SECS")
            .unwrap_or_else(|_| "30".into())
            .parse()
            .expect("REQUEST_TIMEOUT_SECS must be a valid u64");

        let shutdown_timeout_secs: u64 = std::env::var("SHUTDOWN_TIMEOUT_SECS")
            .unwrap_or_else(|_| "30".into())
            .parse()
            .expect("SHUTDOWN_TIMEOUT_SECS must be a valid u64");

        let dispatcher = DispatcherConfig::new(
            positive_or(std::env::var("MAX_WORKER_SIZE").ok(), DEFAULT_POOL_SIZE),
            positive_or(std::env::var("MAX_QUEUE_SIZE").ok(), DEFAULT_QUEUE_CAPACITY),
        );

        Self {
            host,
            port,
            request_timeout_secs,
            shutdown_timeout_secs,
            dispatcher,
        }
    }
}

/// Parse a positive size, falling back to `default` for anything else.
fn positive_or(raw: Option<String>, default: usize) -> usize {
    raw.and_then(|v| v.trim().parse::<i64>().ok())
        .filter(|n| *n > 0)
        .and_then(|n| usize::try_from(n).ok())
        .unwrap_or(default)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn positive_values_are_used() {
        assert_eq!(positive_or(Some("4".into()), 1), 4);
        assert_eq!(positive_or(Some(" 250 ".into()), 100), 250);
    }

    #[test]
    fn non_positive_or_invalid_values_fall_back() {
        assert_eq!(positive_or(None, 1), 1);
        assert_eq!(positive_or(Some("0".into()), 1), 1);
        assert_eq!(positive_or(Some("-3".into()), 100), 100);
        assert_eq!(positive_or(Some("many".into()), 100), 100);
    }

    #[test]
    fn defaults_match_documented_values() {
        let config = ServerConfig::default();

        assert_eq!(config.port, 5119);
        assert_eq!(config.dispatcher.pool_size, 1);
        assert_eq!(config.dispatcher.queue_capacity, 100);
    }
}
