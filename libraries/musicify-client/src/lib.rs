//! Musicify Client
//!
//! Client-side library for a Musicify server.
//!
//! # Features
//!
//! - **HTTP client**: playlist, song and health endpoints with bearer auth
//! - **Playlist store**: shared playlist state with optimistic song removal
//!   and playlist deletion, reconciled in the background
//! - **Player**: an explicit playback state machine emitting side-effect actions
//! - **Lyrics**: LRC parsing and the active-line lookup
//!
//! # Example
//!
//! ```ignore
//! use musicify_client::{ClientConfig, MusicifyClient, PlaylistStore};
//! use std::sync::Arc;
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let client = MusicifyClient::new(ClientConfig::with_token("https://music.example.com", "token"))?;
//!     let store = PlaylistStore::new(Arc::new(client.playlists().await));
//!
//!     store.refresh_playlists().await?;
//!     store.load_playlist(1).await?;
//!
//!     // Gone from `store.current()` immediately; restored if the server refuses
//!     let pending = store.remove_song(1, 42);
//!     println!("{:?}", pending.outcome().await);
//!
//!     Ok(())
//! }
//! ```

mod client;
mod error;
pub mod lyrics;
pub mod player;
mod playlists;
pub mod store;
mod types;

pub use client::MusicifyClient;
pub use error::{ClientError, Result};
pub use lyrics::{active_line, fetch_lyrics, parse_lrc, LyricLine};
pub use player::{LoopMode, PlayerAction, PlayerEvent, PlayerMachine, PlayerState};
pub use playlists::{PlaylistClient, PlaylistRemote};
pub use store::{
    DeletePlaylistCommand, MutationOutcome, MutationStatus, OptimisticCommand, PendingMutation,
    PlaylistStore, Reconciliation, RemoveSongCommand, StoreEvent, StoreState,
};
pub use types::{
    ClientConfig, HealthInfo, ImageUpload, MutationResponse, NewPlaylist, PlaylistDetail,
    PlaylistSummary,
};
