//! Shared utilities for integration tests.

use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;
use tokio::net::TcpListener;

use status_board::board::ServiceCatalog;
use status_board::config::BoardConfig;
use status_board::http::HttpServer;
use status_board::lifecycle::Shutdown;
use status_board::model::{HealthCheck, HealthCheckStatus, Service};
use status_board::store::MemoryStore;

/// A board serving on an ephemeral port.
pub struct TestBoard {
    pub addr: SocketAddr,
    pub catalog: ServiceCatalog,
    pub shutdown: Shutdown,
}

impl TestBoard {
    pub fn url(&self, path: &str) -> String {
        format!("http://{}{}", self.addr, path)
    }

    pub fn base_url(&self) -> String {
        format!("http://{}", self.addr)
    }
}

/// Start a board on 127.0.0.1 with an empty in-memory store.
pub async fn spawn_board(config: BoardConfig) -> TestBoard {
    let catalog = ServiceCatalog::from_store(Arc::new(MemoryStore::default()));
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();

    let shutdown = Shutdown::new();
    let server = HttpServer::new(config, catalog.clone());
    let rx = shutdown.subscribe();
    tokio::spawn(async move {
        let _ = server.run(listener, rx).await;
    });

    wait_for_listener(addr).await;
    TestBoard { addr, catalog, shutdown }
}

async fn wait_for_listener(addr: SocketAddr) {
    for _ in 0..50 {
        if tokio::net::TcpStream::connect(addr).await.is_ok() {
            return;
        }
        tokio::time::sleep(Duration::from_millis(20)).await;
    }
    panic!("board did not start listening on {}", addr);
}

/// The service used across scenarios: two checks, both Ok.
#[allow(dead_code)]
pub fn auth_service() -> Service {
    Service::new("Auth service")
        .with_tags(["Prod", "Auth"])
        .with_checks(vec![
            HealthCheck::new("Ping https", HealthCheckStatus::Ok),
            HealthCheck::new("NFS Endpoint", HealthCheckStatus::Ok),
        ])
}
