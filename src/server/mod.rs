// HTTP gateway server
//
// Owns the shared application state (provider clients + session store) and
// the serve loop. Clients are dependency-injected into the router through
// `AppState`, so integration tests can stand up the same router against
// mock upstreams.

pub mod api_types;
mod handlers;

pub use handlers::{create_router, health_check};

use anyhow::Result;
use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;

use crate::config::{constants, Config, DefaultsConfig};
use crate::providers::{AvatarClient, LlmClient, RendererClient};
use crate::session::SessionStore;

/// How often the background task sweeps for expired sessions.
const EVICTION_INTERVAL_SECS: u64 = 60;

/// Shared state injected into every handler.
pub struct AppState {
    pub llm: LlmClient,
    pub avatar: AvatarClient,
    pub renderer: RendererClient,
    pub sessions: Arc<SessionStore>,
    pub defaults: DefaultsConfig,
}

impl AppState {
    /// Wire up provider clients and the session store from config.
    pub fn from_config(config: &Config) -> Result<Self> {
        let sessions = Arc::new(SessionStore::new(Duration::from_secs(
            config.server.session_ttl_minutes * 60,
        )));

        Ok(Self {
            llm: LlmClient::new(&config.llm)?,
            avatar: AvatarClient::new(&config.avatar, Arc::clone(&sessions))?,
            renderer: RendererClient::new(&config.renderer)?,
            sessions,
            defaults: config.defaults.clone(),
        })
    }
}

/// The gateway server.
pub struct GatewayServer {
    config: Config,
    state: Arc<AppState>,
}

impl GatewayServer {
    pub fn new(config: Config) -> Result<Self> {
        let state = Arc::new(AppState::from_config(&config)?);
        Ok(Self { config, state })
    }

    /// Bind and serve until the process is stopped.
    pub async fn serve(self) -> Result<()> {
        let addr: SocketAddr = self.config.server.bind_address.parse()?;

        // Background sweep so idle sessions don't pile up between lookups
        let sessions = Arc::clone(&self.state.sessions);
        tokio::spawn(async move {
            let mut interval =
                tokio::time::interval(Duration::from_secs(EVICTION_INTERVAL_SECS));
            loop {
                interval.tick().await;
                sessions.evict_expired(tokio::time::Instant::now());
            }
        });

        // CORS is permissive: every consolidated variant served a browser
        // frontend from a different origin.
        let app = create_router(Arc::clone(&self.state))
            .layer(axum::extract::DefaultBodyLimit::max(constants::MAX_BODY_BYTES))
            .layer(CorsLayer::permissive())
            .layer(TraceLayer::new_for_http());

        tracing::info!(
            renderer_configured = self.config.renderer.base_url.is_some(),
            "Starting tutorgate gateway on {}",
            addr
        );

        let listener = tokio::net::TcpListener::bind(addr).await?;
        axum::serve(listener, app).await?;

        Ok(())
    }
}
