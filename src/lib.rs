//! Scholar Match - scholarship matching service
//!
//! This library provides the matching core: hard eligibility filtering of a
//! scholarship catalog followed by embedding-based ranking with rule bonuses.

pub mod config;
pub mod core;
pub mod error;
pub mod models;
pub mod routes;
pub mod services;

// Re-export commonly used types
pub use crate::core::{Embedder, HashingEmbedder, MatchPipeline, Matcher};
pub use error::MatchError;
pub use models::{MatchResult, Scholarship, UserProfile};
pub use services::{InMemoryStore, PostgresStore, Storage, StorageError};
