//! Musicify Server Library
//!
//! REST API over the Musicify catalog: songs, genres, artists, albums and
//! user playlists, with local media storage and optional Spotify lookup.
//!
//! This library exposes the core components for testing purposes.

pub mod api;
pub mod config;
pub mod error;
pub mod forms;
pub mod middleware;
pub mod router;
pub mod services;
pub mod state;

// Re-export commonly used types for convenience
pub use config::ServerConfig;
pub use error::{Result, ServerError};
pub use router::create_router;
pub use services::{AuthService, FileStorage, SpotifyMetadata};
pub use state::AppState;
