/// API route modules
pub mod albums;
pub mod artists;
pub mod auth;
pub mod genres;
pub mod health;
pub mod playlists;
pub mod songs;
pub mod users;
