#![allow(dead_code)]

use std::sync::Arc;

use async_trait::async_trait;
use axum::body::Body;
use axum::http::{Method, Request, Response};
use axum::Router;
use http_body_util::BodyExt;
use tokio::sync::Semaphore;
use tower::ServiceExt;
use upqueue_api::config::ServerConfig;
use upqueue_api::router::build_app_router;
use upqueue_api::state::AppState;
use upqueue_core::Task;
use upqueue_worker::{Dispatcher, DispatcherConfig, UploadError, Uploader};

/// Uploader whose calls wait for a permit from `gate`.
pub struct GatedUploader {
    pub gate: Semaphore,
}

impl GatedUploader {
    pub fn closed() -> Arc<Self> {
        Arc::new(Self {
            gate: Semaphore::new(0),
        })
    }
}

#[async_trait]
impl Uploader for GatedUploader {
    async fn upload(&self, task: &Task) -> Result<String, UploadError> {
        self.gate
            .acquire()
            .await
            .map_err(|e| UploadError::Backend(e.into()))?
            .forget();
        Ok(format!("remote-{}", task.id))
    }
}

/// Build a test `ServerConfig` with a small pool and queue.
pub fn test_config() -> ServerConfig {
    ServerConfig {
        host: "127.0.0.1".to_string(),
        port: 0,
        dispatcher: DispatcherConfig::new(1, 8),
        ..ServerConfig::default()
    }
}

/// Build the full application router around a started dispatcher.
pub fn build_test_app(uploader: Arc<dyn Uploader>) -> (Router, Dispatcher) {
    let (app, dispatcher) = build_unstarted_app(uploader, test_config());
    dispatcher.start().expect("dispatcher starts once");
    (app, dispatcher)
}

/// Build the router with `config`, leaving the dispatcher stopped so the
/// admission queue fills up.
pub fn build_unstarted_app(
    uploader: Arc<dyn Uploader>,
    config: ServerConfig,
) -> (Router, Dispatcher) {
    let dispatcher = Dispatcher::new(config.dispatcher, uploader);

    let state = AppState {
        dispatcher: dispatcher.clone(),
        config: Arc::new(config.clone()),
    };

    (build_app_router(state, &config), dispatcher)
}

pub async fn send(app: Router, method: Method, uri: &str, body: Body) -> Response<Body> {
    let request = Request::builder()
        .method(method)
        .uri(uri)
        .header("content-type", "application/json")
        .body(body)
        .unwrap();
    app.oneshot(request).await.unwrap()
}

pub async fn get(app: Router, uri: &str) -> Response<Body> {
    send(app, Method::GET, uri, Body::empty()).await
}

pub async fn post_json(app: Router, uri: &str, json: serde_json::Value) -> Response<Body> {
    send(app, Method::POST, uri, Body::from(json.to_string())).await
}

pub async fn body_bytes(response: Response<Body>) -> Vec<u8> {
    response
        .into_body()
        .collect()
        .await
        .unwrap()
        .to_bytes()
        .to_vec()
}

pub async fn body_json(response: Response<Body>) -> serde_json::Value {
    serde_json::from_slice(&body_bytes(response).await).unwrap()
}

/// Poll the dispatcher until its waiting set has `n` entries.
pub async fn registry_len_reaches(dispatcher: &Dispatcher, n: usize) {
    tokio::time::timeout(std::time::Duration::from_secs(5), async {
        while dispatcher.snapshot().await.len() != n {
            tokio::time::sleep(std::time::Duration::from_millis(5)).await;
        }
    })
    .await
    .unwrap_or_else(|_| panic!("registry never reached {n} entries"));
}
