//! Infrastructure layer - Framework implementations
//!
//! This layer contains:
//! - Database connection and table bootstrap (db)
//! - HTTP router assembly (server)
//! - Configuration loading (config)
//! - Repository implementations (repositories)
//! - Application state (state)

pub mod config;
pub mod db;
pub mod repositories;
pub mod server;
pub mod state;

pub use repositories::*;
pub use state::AppState;
