//! Qdrant test infrastructure

use testcontainers::core::{IntoContainerPort, WaitFor};
use testcontainers::runners::AsyncRunner;
use testcontainers::{ContainerAsync, GenericImage};

const IMAGE: &str = "qdrant/qdrant";
const TAG: &str = "v1.15.1";
const GRPC_PORT: u16 = 6334;
const HTTP_PORT: u16 = 6333;

/// Qdrant container exposing both the REST and gRPC ports
///
/// Removed when dropped.
pub struct TestQdrant {
    #[allow(dead_code)]
    container: ContainerAsync<GenericImage>,
    /// gRPC endpoint, the one `qdrant-client` talks to
    pub grpc_url: String,
    pub http_url: String,
}

impl TestQdrant {
    pub async fn new() -> Self {
        let container = GenericImage::new(IMAGE, TAG)
            .with_exposed_port(GRPC_PORT.tcp())
            .with_exposed_port(HTTP_PORT.tcp())
            .with_wait_for(WaitFor::message_on_stdout("Qdrant gRPC listening on"))
            .start()
            .await
            .expect("Failed to start Qdrant container");

        let grpc_port = container
            .get_host_port_ipv4(GRPC_PORT)
            .await
            .expect("Failed to get Qdrant gRPC port");
        let http_port = container
            .get_host_port_ipv4(HTTP_PORT)
            .await
            .expect("Failed to get Qdrant HTTP port");

        tracing::info!(grpc_port, http_port, "Test Qdrant ready");

        Self {
            container,
            grpc_url: format!("http://127.0.0.1:{}", grpc_port),
            http_url: format!("http://127.0.0.1:{}", http_port),
        }
    }

    pub fn grpc_url(&self) -> &str {
        &self.grpc_url
    }
}

impl Drop for TestQdrant {
    fn drop(&mut self) {
        tracing::debug!("Cleaning up test Qdrant container");
    }
}
