//! tactix-api library - puzzle trainer HTTP service
//!
//! Serves puzzle CRUD, the practice sequence, login and per-user results.

use axum::Router;
use chrono::Duration;
use sqlx::SqlitePool;
use std::sync::Arc;
use tactix_common::config::TomlConfig;
use tactix_common::{LegalityOracle, StandardChess};
use tower_http::{cors::CorsLayer, trace::TraceLayer};

pub mod api;
pub mod error;

pub use error::ApiError;

/// Sequencing settings applied per request
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SequenceSettings {
    /// Maximum entries in each returned list
    pub cap: usize,
    /// Fixed seed for reproducible random orders; fresh entropy when `None`
    pub seed: Option<u64>,
}

/// Application state shared across HTTP handlers
#[derive(Clone)]
pub struct AppState {
    /// Database connection pool
    pub db: SqlitePool,
    /// Chess rules used to validate new puzzles
    pub oracle: Arc<dyn LegalityOracle>,
    pub sequence: SequenceSettings,
    /// Lifetime of a login token
    pub token_ttl: Duration,
}

impl AppState {
    /// Create application state with standard chess rules
    pub fn new(db: SqlitePool, sequence: SequenceSettings, token_ttl: Duration) -> Self {
        Self {
            db,
            oracle: Arc::new(StandardChess),
            sequence,
            token_ttl,
        }
    }

    /// State derived from loaded configuration
    pub fn from_config(db: SqlitePool, config: &TomlConfig) -> Self {
        Self::new(
            db,
            SequenceSettings {
                cap: config.sequence.cap,
                seed: config.sequence.seed,
            },
            Duration::hours(config.auth.token_ttl_hours),
        )
    }

    /// Swap the legality oracle
    pub fn with_oracle(mut self, oracle: Arc<dyn LegalityOracle>) -> Self {
        self.oracle = oracle;
        self
    }
}

/// Build application router
///
/// Authentication is enforced per handler through the
/// [`api::auth::AuthenticatedUser`] extractor.
pub fn build_router(state: AppState) -> Router {
    use axum::routing::{delete, get, post};

    let exercises = Router::new()
        .route(
            "/api/exercises",
            get(api::list_exercises).post(api::create_exercise),
        )
        .route("/api/exercises/sequence", get(api::get_sequence))
        .route("/api/exercises/:id", delete(api::delete_exercise));

    let users = Router::new()
        .route("/api/users/register", post(api::register))
        .route("/api/users/login", post(api::login))
        .route("/api/users/logout", post(api::logout));

    let results = Router::new().route(
        "/api/results",
        get(api::list_results).post(api::submit_result),
    );

    Router::new()
        .merge(exercises)
        .merge(users)
        .merge(results)
        .merge(api::health_routes())
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive())
        .with_state(state)
}
