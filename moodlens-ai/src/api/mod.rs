//! HTTP API handlers for moodlens-ai
//!
//! - POST /api/photos/analyze
//! - GET /api/photos/getAnalyzedPhotos
//! - GET /health

pub mod health;
pub mod photos;

pub use health::health_routes;
pub use photos::photo_routes;
