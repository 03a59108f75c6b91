/// Server services
pub mod auth;
pub mod file_storage;
pub mod metadata;

pub use auth::AuthService;
pub use file_storage::FileStorage;
pub use metadata::SpotifyMetadata;
