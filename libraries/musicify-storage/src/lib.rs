//! Musicify Storage
//!
//! `SQLite` persistence for the Musicify catalog, plus the relationship
//! engine that keeps genre and artist back-references in step with songs.
//!
//! # Architecture
//!
//! - **Canonical vs mirrored**: a song owns its artist and genre lists;
//!   `Genre.song_list`/`song_count` and `Artist.genres` are mirrors
//! - **Vertical Slicing**: each entity owns its own queries
//! - **Pool or connection**: lookups used by callers take the pool; the
//!   pieces the engine composes take a `&mut SqliteConnection`, so they run
//!   inside its transactions
//!
//! # Example
//!
//! ```rust,no_run
//! use musicify_core::{CreateGenre, NewSong};
//! use musicify_storage::{create_pool, genres, relationships, run_migrations};
//!
//! # async fn example() -> Result<(), Box<dyn std::error::Error>> {
//! let pool = create_pool("sqlite://musicify.db").await?;
//! run_migrations(&pool).await?;
//!
//! let pop = genres::create(&pool, CreateGenre::named("Pop")).await?;
//! let song = relationships::create_song(
//!     &pool,
//!     NewSong {
//!         name: "Intro".into(),
//!         file: "/media/audio/intro.mp3".into(),
//!         genres: vec![pop.id].into(),
//!         ..Default::default()
//!     },
//! )
//! .await?;
//! assert_eq!(song.genres, vec![pop.id]);
//! # Ok(())
//! # }
//! ```

mod database;

// Vertical slices
pub mod albums;
pub mod artists;
pub mod genres;
pub mod playlists;
pub mod songs;
pub mod users;

// Cross-entity bookkeeping
pub mod relationships;

pub use database::Database;

use sqlx::migrate::Migrator;
use sqlx::sqlite::SqlitePool;

// Embed migrations into binary
static MIGRATOR: Migrator = sqlx::migrate!("./migrations");

/// Run database migrations
///
/// # Errors
///
/// Returns an error if migrations fail to run
pub async fn run_migrations(pool: &SqlitePool) -> Result<(), sqlx::migrate::MigrateError> {
    MIGRATOR.run(pool).await
}

/// Create a new `SQLite` pool
///
/// # Arguments
///
/// * `database_url` - `SQLite` connection string (e.g., `<sqlite://musicify.db>`)
///
/// # Errors
///
/// Returns an error if the connection fails
pub async fn create_pool(database_url: &str) -> Result<SqlitePool, sqlx::Error> {
    use sqlx::sqlite::{SqliteConnectOptions, SqliteJournalMode, SqlitePoolOptions};
    use std::str::FromStr;

    tracing::debug!(url = %database_url, "Creating SQLite pool");

    let options = SqliteConnectOptions::from_str(database_url)?
        .create_if_missing(true)
        .journal_mode(SqliteJournalMode::Wal)
        .foreign_keys(true)
        .busy_timeout(std::time::Duration::from_secs(30));

    SqlitePoolOptions::new()
        .max_connections(5)
        .connect_with(options)
        .await
}

/// Parse a `group_concat` column of ids into a vector.
pub(crate) fn split_ids(csv: Option<String>) -> Vec<i64> {
    csv.map(|s| {
        s.split(',')
            .filter_map(|part| part.trim().parse::<i64>().ok())
            .collect()
    })
    .unwrap_or_default()
}
