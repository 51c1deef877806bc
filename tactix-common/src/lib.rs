//! # Tactix Common Library
//!
//! Shared code for the Tactix puzzle trainer:
//! - Domain models (puzzles, users, training results)
//! - Puzzle sequencing engine (browse order and diversity-first practice order)
//! - Move token parsing and the chess legality oracle
//! - SQLite store (schema, migrations, queries)
//! - Credential hashing
//! - Configuration loading

pub mod config;
pub mod credentials;
pub mod db;
pub mod error;
pub mod legality;
pub mod models;
pub mod moves;
pub mod sequencing;

pub use error::{Error, Result};
pub use legality::{LegalityError, LegalityOracle, StandardChess};
pub use models::{CategoryKey, NewPuzzle, Puzzle, SideToMove, TrainingResult, User};
pub use moves::{MoveToken, MoveTokenError};
