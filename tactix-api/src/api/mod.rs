//! HTTP API handlers for tactix-api

pub mod auth;
pub mod exercises;
pub mod health;
pub mod results;
pub mod sequence;
pub mod users;

pub use exercises::{create_exercise, delete_exercise, list_exercises};
pub use health::health_routes;
pub use results::{list_results, submit_result};
pub use sequence::get_sequence;
pub use users::{login, logout, register};

use serde::Serialize;

/// Plain confirmation body
#[derive(Debug, Serialize)]
pub struct MessageResponse {
    pub message: String,
}

impl MessageResponse {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
        }
    }
}
