//! Domain layer - Pure business abstractions
//!
//! Trait definitions, input types and domain error types. No Axum here.

pub mod errors;
pub mod metadata;
pub mod repositories;

pub use errors::DomainError;
pub use metadata::{BookInfo, MetadataProvider};
pub use repositories::*;
