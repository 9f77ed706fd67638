//! Test server harness.

use crosscheck::config::{Config, PipelineConfig};
use crosscheck::discovery::MockSearchProvider;
use crosscheck::extraction::MockExtractor;
use crosscheck::gateway::{HandlerState, create_router_with_state};
use crosscheck::inference::MockInference;
use crosscheck::pipeline::Pipeline;
use std::net::SocketAddr;
use std::time::Duration;
use tokio::net::TcpListener;
use tokio::sync::oneshot;
use tokio::task::JoinHandle;

const STARTUP_WAIT_TIMEOUT_SECS: u64 = 5;
const STARTUP_POLL_INTERVAL_MS: u64 = 50;

/// Collaborators wired into a mocked server.
#[derive(Clone)]
pub struct TestServerConfig {
    pub extractor: MockExtractor,
    pub search: MockSearchProvider,
    pub inference: MockInference,
    pub pipeline: PipelineConfig,
}

impl Default for TestServerConfig {
    fn default() -> Self {
        Self {
            extractor: MockExtractor::new("Primary page content."),
            search: MockSearchProvider::new(),
            inference: MockInference::new(["ok", "==END=="]),
            pipeline: PipelineConfig::default(),
        }
    }
}

pub struct TestServer {
    pub addr: SocketAddr,
    _server_handle: JoinHandle<()>,
    shutdown_tx: Option<oneshot::Sender<()>>,
}

impl TestServer {
    pub fn url(&self) -> String {
        format!("http://{}", self.addr)
    }

    pub async fn shutdown(mut self) {
        if let Some(tx) = self.shutdown_tx.take() {
            let _ = tx.send(());
        }
    }
}

impl Drop for TestServer {
    fn drop(&mut self) {
        if let Some(tx) = self.shutdown_tx.take() {
            let _ = tx.send(());
        }
    }
}

pub async fn wait_for_server_ready(
    addr: SocketAddr,
    timeout: Duration,
    interval: Duration,
) -> Result<(), ServerStartupError> {
    let start = std::time::Instant::now();

    loop {
        if start.elapsed() > timeout {
            return Err(ServerStartupError::Timeout);
        }

        match tokio::net::TcpStream::connect(addr).await {
            Ok(_) => return Ok(()),
            Err(_) => {
                tokio::time::sleep(interval).await;
            }
        }
    }
}

#[derive(Debug, thiserror::Error)]
pub enum ServerStartupError {
    #[error("Server failed to start within timeout")]
    Timeout,
    #[error("Failed to bind to address: {0}")]
    BindError(#[from] std::io::Error),
    #[error("Server startup failed: {0}")]
    StartupFailed(String),
}

async fn serve(app: axum::Router) -> Result<TestServer, ServerStartupError> {
    let listener = TcpListener::bind(SocketAddr::from(([127, 0, 0, 1], 0))).await?;
    let local_addr = listener.local_addr()?;

    let (shutdown_tx, shutdown_rx) = oneshot::channel();

    let server_handle = tokio::spawn(async move {
        axum::serve(listener, app)
            .with_graceful_shutdown(async {
                let _ = shutdown_rx.await;
            })
            .await
            .unwrap();
    });

    wait_for_server_ready(
        local_addr,
        Duration::from_secs(STARTUP_WAIT_TIMEOUT_SECS),
        Duration::from_millis(STARTUP_POLL_INTERVAL_MS),
    )
    .await?;

    Ok(TestServer {
        addr: local_addr,
        _server_handle: server_handle,
        shutdown_tx: Some(shutdown_tx),
    })
}

/// Spawns a server whose extraction, search and inference collaborators are all mocks.
pub async fn spawn_test_server(config: TestServerConfig) -> Result<TestServer, ServerStartupError> {
    let pipeline = Pipeline::new(
        config.extractor,
        config.search,
        config.inference,
        config.pipeline,
    );

    serve(create_router_with_state(HandlerState::new(pipeline))).await
}

/// Spawns a server backed by the real collaborators configured through `CROSSCHECK_*`.
///
/// Requires a running crawl service, a search API key and an inference endpoint.
pub async fn spawn_real_server() -> Result<TestServer, ServerStartupError> {
    let config = Config::from_env().map_err(|e| ServerStartupError::StartupFailed(e.to_string()))?;
    config
        .validate()
        .map_err(|e| ServerStartupError::StartupFailed(e.to_string()))?;

    let pipeline = Pipeline::from_config(&config)
        .map_err(|e| ServerStartupError::StartupFailed(e.to_string()))?;

    serve(create_router_with_state(HandlerState::new(pipeline))).await
}
