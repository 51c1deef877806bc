//! SQLite store: schema setup and queries

pub mod init;
pub mod migrations;
pub mod puzzles;
pub mod results;
pub mod sessions;
pub mod users;

pub use init::init_database;
pub use migrations::run_migrations;
