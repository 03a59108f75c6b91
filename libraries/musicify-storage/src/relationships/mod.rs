//! Relationship consistency engine
//!
//! Songs own their artist and genre lists. Every genre mirrors the songs
//! tagged with it (`song_list`, `song_count`), and every artist mirrors the
//! genres of the songs crediting it. This module is the only writer of those
//! mirrors.
//!
//! - **Create**: the song is persisted, then genre and artist mirrors are
//!   updated best-effort. A failure there is logged and left for `repair`.
//! - **Update**: one transaction covers the song write and every mirror
//!   change; any failure rolls all of it back.
//! - **Remove**: genre mirrors are cleaned up and the song deleted in one
//!   transaction. If either fails the song is kept.
//!
//! Update and remove take the song's row lock before reading it, so
//! concurrent writers to the same song run one after the other and each
//! diffs against what the previous one committed.

use crate::{artists, genres, songs};
use musicify_core::{
    error::{MusicifyError, Result},
    normalize_genre_name,
    types::*,
    IdList, NameList,
};
use sqlx::{SqliteConnection, SqlitePool};
use tracing::{debug, error, info, warn};

/// Turn requested genre ids plus inline names into one duplicate-free set.
///
/// Inline names are created first, or resolved to the existing genre whose
/// normalized name matches. Requested ids must exist.
pub async fn resolve_genres(
    conn: &mut SqliteConnection,
    ids: &IdList,
    new_names: &NameList,
) -> Result<IdList> {
    if let Some(missing) = genres::missing(&mut *conn, ids).await?.first() {
        return Err(MusicifyError::not_found("Genre", missing));
    }

    let mut resolved = ids.clone();
    for name in new_names.iter() {
        let normalized = normalize_genre_name(name);
        if normalized.is_empty() {
            return Err(MusicifyError::validation(format!(
                "Genre name must contain letters or digits: {:?}",
                name
            )));
        }

        let id = match genres::find_by_normalized_name(&mut *conn, &normalized).await? {
            Some(existing) => existing.id,
            None => {
                let created = genres::insert(&mut *conn, CreateGenre::named(name)).await?;
                debug!(genre_id = created.id, name = %created.name, "Created inline genre");
                created.id
            }
        };
        resolved.push(id);
    }

    Ok(resolved)
}

/// Persist a new song and register it with its genres and artists.
pub async fn create_song(pool: &SqlitePool, song: NewSong) -> Result<Song> {
    if song.name.trim().is_empty() {
        return Err(MusicifyError::validation("Song name is required"));
    }
    if song.file.trim().is_empty() {
        return Err(MusicifyError::validation("Audio file is required"));
    }

    let mut tx = pool.begin().await?;
    let genre_ids = resolve_genres(&mut *tx, &song.genres, &song.new_genres).await?;
    let artist_name = artists::names_for(&mut *tx, &song.artists).await?.join(", ");
    let song_id = songs::insert(&mut *tx, &song, &artist_name, &genre_ids).await?;
    tx.commit().await?;

    info!(song_id, genres = genre_ids.len(), "Song created");

    if let Err(e) = attach_to_genres(pool, song_id, &genre_ids).await {
        warn!(song_id, error = %e, "Genre back-references not updated for new song");
    }

    if let Err(e) = merge_artist_genres(pool, &song.artists, &genre_ids).await {
        warn!(song_id, error = %e, "Artist genres not updated for new song");
    }

    songs::get_by_id(pool, song_id)
        .await?
        .ok_or(MusicifyError::SongNotFound(song_id))
}

async fn attach_to_genres(pool: &SqlitePool, song_id: SongId, genre_ids: &IdList) -> Result<()> {
    let mut tx = pool.begin().await?;
    for genre_id in genre_ids.iter() {
        genres::attach_song(&mut *tx, genre_id, song_id).await?;
    }
    tx.commit().await?;
    Ok(())
}

async fn merge_artist_genres(pool: &SqlitePool, artist_ids: &IdList, genre_ids: &IdList) -> Result<()> {
    if genre_ids.is_empty() {
        return Ok(());
    }

    let mut tx = pool.begin().await?;
    for artist_id in artist_ids.iter() {
        let current = artists::genre_ids(&mut *tx, artist_id).await?;
        artists::set_genres(&mut *tx, artist_id, &current.union(genre_ids)).await?;
    }
    tx.commit().await?;
    Ok(())
}

/// Remove a song after detaching it from every genre it is tagged with.
pub async fn remove_song(pool: &SqlitePool, id: SongId) -> Result<()> {
    let mut tx = pool.begin().await?;
    if !songs::lock_for_update(&mut *tx, id).await? {
        return Err(MusicifyError::SongNotFound(id));
    }
    let song = songs::fetch(&mut *tx, id)
        .await?
        .ok_or(MusicifyError::SongNotFound(id))?;

    // A failure here aborts the removal; the song stays
    for genre_id in &song.genres {
        genres::detach_song(&mut *tx, *genre_id, id).await?;
    }
    songs::delete(&mut *tx, id).await?;
    tx.commit().await?;

    info!(song_id = id, "Song removed");

    for artist_id in song.artists {
        if let Err(e) = recompute_artist_genres(pool, artist_id).await {
            warn!(song_id = id, artist_id, error = %e, "Artist genres not recomputed after removal");
        }
    }

    Ok(())
}

async fn recompute_artist_genres(pool: &SqlitePool, artist_id: ArtistId) -> Result<()> {
    let mut tx = pool.begin().await?;
    let genre_ids = songs::genre_union_for_artist(&mut *tx, artist_id, None).await?;
    artists::set_genres(&mut *tx, artist_id, &genre_ids).await?;
    tx.commit().await?;
    Ok(())
}

/// Update a song and every mirror it affects in one transaction.
///
/// A missing song is reported as `SongNotFound` before the transaction
/// opens. Validation, duplicate and not-found errors pass through unchanged;
/// anything else becomes `TransactionFailed`. In every error case nothing
/// was written.
pub async fn update_song(pool: &SqlitePool, id: SongId, update: SongUpdate) -> Result<Song> {
    if songs::get_by_id(pool, id).await?.is_none() {
        return Err(MusicifyError::SongNotFound(id));
    }

    if matches!(update.name.as_deref().map(str::trim), Some("")) {
        return Err(MusicifyError::validation("Song name cannot be empty"));
    }

    if let Err(e) = apply_update(pool, id, &update).await {
        return Err(match e {
            MusicifyError::Validation(_)
            | MusicifyError::DuplicateName(_)
            | MusicifyError::NotFound { .. }
            | MusicifyError::SongNotFound(_) => e,
            other => {
                error!(song_id = id, error = %other, "Song update rolled back");
                MusicifyError::TransactionFailed(other.to_string())
            }
        });
    }

    songs::get_by_id(pool, id)
        .await?
        .ok_or(MusicifyError::SongNotFound(id))
}

async fn apply_update(pool: &SqlitePool, id: SongId, update: &SongUpdate) -> Result<()> {
    let mut tx = pool.begin().await?;

    // The old lists must be read under the lock, not before it
    if !songs::lock_for_update(&mut *tx, id).await? {
        return Err(MusicifyError::SongNotFound(id));
    }
    let current = songs::fetch(&mut *tx, id)
        .await?
        .ok_or(MusicifyError::SongNotFound(id))?;

    let old_genres: IdList = current.genres.iter().copied().collect();
    let new_genres = if update.touches_genres() {
        let requested = update.genres.as_ref().unwrap_or(&old_genres);
        resolve_genres(&mut *tx, requested, &update.new_genres).await?
    } else {
        old_genres.clone()
    };

    let old_artists: IdList = current.artists.iter().copied().collect();
    let new_artists = update.artists.clone().unwrap_or_else(|| old_artists.clone());
    let artist_name = match &update.artists {
        Some(ids) => Some(artists::names_for(&mut *tx, ids).await?.join(", ")),
        None => None,
    };

    // 1. Diff genres
    let removed_genres = old_genres.difference(&new_genres);
    let added_genres = new_genres.difference(&old_genres);

    // 2. Song fields and canonical lists
    songs::update_fields(&mut *tx, id, update, artist_name.as_deref()).await?;
    if new_genres != old_genres {
        songs::set_genres(&mut *tx, id, &new_genres).await?;
    }
    if new_artists != old_artists {
        songs::set_artists(&mut *tx, id, &new_artists).await?;
    }

    // 3. Pull from genres the song left
    for genre_id in removed_genres.iter() {
        genres::detach_song(&mut *tx, genre_id, id).await?;
    }

    // 4. Add to genres the song joined
    for genre_id in added_genres.iter() {
        genres::attach_song(&mut *tx, genre_id, id).await?;
    }

    // 5. Diff artists
    let removed_artists = old_artists.difference(&new_artists);
    let added_artists = new_artists.difference(&old_artists);

    // 6. Removed artists: full recompute from their other songs
    for artist_id in removed_artists.iter() {
        let genre_ids = songs::genre_union_for_artist(&mut *tx, artist_id, Some(id)).await?;
        artists::set_genres(&mut *tx, artist_id, &genre_ids).await?;
    }

    // 7. Added artists: union with the song's genres
    for artist_id in added_artists.iter() {
        let existing = artists::genre_ids(&mut *tx, artist_id).await?;
        artists::set_genres(&mut *tx, artist_id, &existing.union(&new_genres)).await?;
    }

    // Artists kept on the song see its genre change too
    if new_genres != old_genres {
        for artist_id in new_artists.difference(&added_artists).iter() {
            let genre_ids = songs::genre_union_for_artist(&mut *tx, artist_id, None).await?;
            artists::set_genres(&mut *tx, artist_id, &genre_ids).await?;
        }
    }

    // 8. Commit
    tx.commit().await?;

    info!(
        song_id = id,
        genres_added = added_genres.len(),
        genres_removed = removed_genres.len(),
        artists_added = added_artists.len(),
        artists_removed = removed_artists.len(),
        "Song updated"
    );

    Ok(())
}

/// What a `repair` pass changed
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct RepairReport {
    /// Song references dropped from genres that no song backs
    pub stale_genre_refs: u64,
    /// Song references added to genres that were missing them
    pub missing_genre_refs: u64,
    /// Genres whose `song_count` disagreed with their list
    pub genre_counts_fixed: u64,
    /// Artists whose genre set was recomputed
    pub artists_fixed: u64,
}

impl RepairReport {
    pub fn is_clean(&self) -> bool {
        *self == Self::default()
    }
}

/// Rebuild every mirror from canonical song data.
///
/// This is the recovery path for the best-effort legs of create and remove.
pub async fn repair(pool: &SqlitePool) -> Result<RepairReport> {
    let mut tx = pool.begin().await?;
    let mut report = RepairReport::default();

    report.stale_genre_refs = sqlx::query(
        "DELETE FROM genre_songs
         WHERE NOT EXISTS (
             SELECT 1 FROM song_genres sg
             WHERE sg.genre_id = genre_songs.genre_id AND sg.song_id = genre_songs.song_id
         )",
    )
    .execute(&mut *tx)
    .await?
    .rows_affected();

    report.missing_genre_refs = sqlx::query(
        "INSERT OR IGNORE INTO genre_songs (genre_id, song_id)
         SELECT genre_id, song_id FROM song_genres ORDER BY song_id, position",
    )
    .execute(&mut *tx)
    .await?
    .rows_affected();

    report.genre_counts_fixed = sqlx::query(
        "UPDATE genres
         SET song_count = (SELECT COUNT(*) FROM genre_songs gs WHERE gs.genre_id = genres.id)
         WHERE song_count != (SELECT COUNT(*) FROM genre_songs gs WHERE gs.genre_id = genres.id)",
    )
    .execute(&mut *tx)
    .await?
    .rows_affected();

    let artist_ids: Vec<i64> = sqlx::query_scalar("SELECT id FROM artists ORDER BY id")
        .fetch_all(&mut *tx)
        .await?;

    for artist_id in artist_ids {
        let expected = songs::genre_union_for_artist(&mut *tx, artist_id, None).await?;
        let stored = artists::genre_ids(&mut *tx, artist_id).await?;
        let same = expected.len() == stored.len() && expected.iter().all(|g| stored.contains(g));
        if !same {
            artists::set_genres(&mut *tx, artist_id, &expected).await?;
            report.artists_fixed += 1;
        }
    }

    tx.commit().await?;

    if report.is_clean() {
        info!("Repair found no drift");
    } else {
        warn!(?report, "Repair corrected drifted back-references");
    }

    Ok(report)
}
