//! Router assembly and serving

#![allow(clippy::must_use_candidate)]

mod cors;
mod health;
mod rate_limit;
mod request_context;

use std::net::SocketAddr;
use std::sync::Arc;

use axum::Router;
use axon_chat::ChatState;
use axon_config::Config;
use tower_http::trace::TraceLayer;

/// Assembled server with all routes and middleware
pub struct Server {
    router: Router,
    listen_address: SocketAddr,
}

impl Server {
    /// Build the server from configuration
    ///
    /// # Errors
    ///
    /// Returns an error if chat state construction or rate-limiter
    /// construction fails
    pub fn new(config: &Config) -> anyhow::Result<Self> {
        let chat_state = ChatState::from_config(config)?;
        Self::with_chat_state(config, chat_state)
    }

    /// Build the server around an existing chat state
    ///
    /// Lets embedders and tests supply their own backend or registry.
    ///
    /// # Errors
    ///
    /// Returns an error if rate-limiter construction fails
    pub fn with_chat_state(config: &Config, chat_state: ChatState) -> anyhow::Result<Self> {
        let listen_address = config
            .server
            .listen_address
            .unwrap_or_else(|| SocketAddr::from(([0, 0, 0, 0], 3000)));

        let mut app = Router::new();

        // Health check
        if config.server.health.enabled {
            app = app.route(&config.server.health.path, axum::routing::get(health::health_handler));
        }

        // Chat completion routes
        app = app.merge(axon_chat::chat_router(chat_state));

        // Apply middleware layers (innermost first)

        // Request context (runs just before handlers)
        app = app.layer(axum::middleware::from_fn(request_context::request_context_middleware));

        // Tracing
        app = app.layer(TraceLayer::new_for_http());

        // CORS
        if let Some(ref cors_config) = config.server.cors {
            app = app.layer(cors::cors_layer(cors_config));
        }

        // Rate limiting
        if let Some(ref rl_config) = config.server.rate_limit {
            let limiter = Arc::new(axon_ratelimit::create_request_limiter(rl_config)?);
            app = app.layer(axum::middleware::from_fn(move |req, next| {
                let limiter = Arc::clone(&limiter);
                async move { rate_limit::rate_limit_middleware(limiter, req, next).await }
            }));
        }

        Ok(Self {
            router: app,
            listen_address,
        })
    }

    /// Get the configured listen address
    #[must_use]
    pub const fn listen_address(&self) -> SocketAddr {
        self.listen_address
    }

    /// Consume the server and return the inner router
    ///
    /// Useful for testing when the caller manages the listener
    #[must_use]
    pub fn into_router(self) -> Router {
        self.router
    }

    /// Start serving requests
    ///
    /// Blocks until the cancellation token is triggered.
    ///
    /// # Errors
    ///
    /// Returns an error if binding the TCP listener or serving fails
    pub async fn serve(self, shutdown: tokio_util::sync::CancellationToken) -> anyhow::Result<()> {
        let listener = tokio::net::TcpListener::bind(self.listen_address).await?;
        let local_addr = listener.local_addr()?;
        tracing::info!(%local_addr, "server listening");

        axum::serve(listener, self.router)
            .with_graceful_shutdown(async move {
                shutdown.cancelled().await;
                tracing::info!("graceful shutdown initiated");
            })
            .await?;

        Ok(())
    }
}
