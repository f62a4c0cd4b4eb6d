use std::sync::Arc;

use pico_silo::Silo;
use tokio::net::TcpListener;

use crate::config::ServerConfig;
use crate::error::{ServerError, ServerResult};
use crate::handlers::AppState;
use crate::router::build_router;

/// Silo HTTP server.
pub struct SiloServer {
    config: Arc<ServerConfig>,
    silo: Arc<Silo>,
}

impl SiloServer {
    pub fn new(config: ServerConfig, silo: Arc<Silo>) -> Self {
        Self {
            config: Arc::new(config),
            silo,
        }
    }

    pub fn config(&self) -> &ServerConfig {
        &self.config
    }

    /// Build the router (useful for testing).
    pub fn router(&self) -> axum::Router {
        build_router(AppState {
            silo: Arc::clone(&self.silo),
            config: Arc::clone(&self.config),
        })
    }

    /// Start serving requests.
    pub async fn serve(self) -> ServerResult<()> {
        let app = self.router();
        let listener = TcpListener::bind(&self.config.bind_addr).await?;
        tracing::info!("silo listening on {}", self.config.bind_addr);
        axum::serve(listener, app)
            .await
            .map_err(|e| ServerError::Internal(e.to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pico_store::MemoryKv;

    fn server() -> SiloServer {
        SiloServer::new(
            ServerConfig::default(),
            Arc::new(Silo::new(Arc::new(MemoryKv::new()))),
        )
    }

    #[test]
    fn server_construction() {
        let s = server();
        assert_eq!(s.config().bind_addr, "127.0.0.1:5000".parse().unwrap());
    }

    #[test]
    fn router_builds() {
        let _router = server().router();
    }
}
