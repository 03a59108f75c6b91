use crate::songs::{song_from_row, song_select};
use musicify_core::{
    error::{MusicifyError, Result},
    types::*,
    IdList,
};
use sqlx::{sqlite::SqliteRow, Row, SqlitePool};

const SUMMARY_SELECT: &str = "SELECT p.id, p.name, p.description, p.image, p.creator_id, p.is_public,
            p.created_at, p.updated_at,
            (SELECT COUNT(*) FROM playlist_songs ps WHERE ps.playlist_id = p.id) AS song_count
     FROM playlists p";

fn summary_from_row(row: &SqliteRow) -> PlaylistSummary {
    PlaylistSummary {
        id: row.get("id"),
        name: row.get("name"),
        description: row.get("description"),
        image: row.get("image"),
        creator: row.get("creator_id"),
        is_public: row.get::<i64, _>("is_public") != 0,
        song_count: row.get("song_count"),
        updated_at: row.get("updated_at"),
    }
}

/// Playlists a viewer can see: every public one plus the viewer's own
pub async fn get_visible(pool: &SqlitePool, viewer: Option<UserId>) -> Result<Vec<PlaylistSummary>> {
    let rows = sqlx::query(&format!(
        "{SUMMARY_SELECT}
         WHERE p.is_public = 1 OR p.creator_id = ?
         ORDER BY p.updated_at DESC, p.id DESC"
    ))
    .bind(viewer)
    .fetch_all(pool)
    .await?;

    Ok(rows.iter().map(summary_from_row).collect())
}

pub async fn get_summary(pool: &SqlitePool, id: PlaylistId) -> Result<Option<PlaylistSummary>> {
    let row = sqlx::query(&format!("{SUMMARY_SELECT} WHERE p.id = ?"))
        .bind(id)
        .fetch_optional(pool)
        .await?;

    Ok(row.as_ref().map(summary_from_row))
}

/// Get playlist with its songs in playlist order
pub async fn get_with_songs(pool: &SqlitePool, id: PlaylistId) -> Result<Option<Playlist>> {
    let Some(row) = sqlx::query(
        "SELECT id, name, description, image, creator_id, is_public, created_at, updated_at
         FROM playlists
         WHERE id = ?",
    )
    .bind(id)
    .fetch_optional(pool)
    .await?
    else {
        return Ok(None);
    };

    let song_rows = sqlx::query(&format!(
        "{}
         INNER JOIN playlist_songs ps ON ps.song_id = s.id
         WHERE ps.playlist_id = ?
         ORDER BY ps.position",
        song_select()
    ))
    .bind(id)
    .fetch_all(pool)
    .await?;

    Ok(Some(Playlist {
        id: row.get("id"),
        name: row.get("name"),
        description: row.get("description"),
        image: row.get("image"),
        creator: row.get("creator_id"),
        is_public: row.get::<i64, _>("is_public") != 0,
        songs: song_rows.iter().map(song_from_row).collect(),
        created_at: row.get("created_at"),
        updated_at: row.get("updated_at"),
    }))
}

/// Create new playlist
pub async fn create(pool: &SqlitePool, playlist: CreatePlaylist) -> Result<PlaylistSummary> {
    let name = playlist.name.trim();
    if name.is_empty() {
        return Err(MusicifyError::validation("Playlist name is required"));
    }

    let result = sqlx::query(
        r#"
        INSERT INTO playlists (name, description, image, creator_id, is_public)
        VALUES (?, ?, ?, ?, ?)
        "#,
    )
    .bind(name)
    .bind(&playlist.description)
    .bind(&playlist.image)
    .bind(playlist.creator)
    .bind(i64::from(playlist.is_public))
    .execute(pool)
    .await?;

    get_summary(pool, result.last_insert_rowid())
        .await?
        .ok_or_else(|| MusicifyError::Database("Failed to retrieve created playlist".to_string()))
}

pub async fn update(
    pool: &SqlitePool,
    id: PlaylistId,
    update: UpdatePlaylist,
) -> Result<PlaylistSummary> {
    if matches!(update.name.as_deref().map(str::trim), Some("")) {
        return Err(MusicifyError::validation("Playlist name is required"));
    }

    let result = sqlx::query(
        r#"
        UPDATE playlists
        SET name = COALESCE(?, name),
            description = COALESCE(?, description),
            image = COALESCE(?, image),
            is_public = COALESCE(?, is_public),
            updated_at = datetime('now')
        WHERE id = ?
        "#,
    )
    .bind(update.name.as_deref().map(str::trim))
    .bind(update.description)
    .bind(update.image)
    .bind(update.is_public.map(i64::from))
    .bind(id)
    .execute(pool)
    .await?;

    if result.rows_affected() == 0 {
        return Err(MusicifyError::not_found("Playlist", id));
    }

    get_summary(pool, id)
        .await?
        .ok_or_else(|| MusicifyError::not_found("Playlist", id))
}

pub async fn delete(pool: &SqlitePool, id: PlaylistId) -> Result<()> {
    let result = sqlx::query("DELETE FROM playlists WHERE id = ?")
        .bind(id)
        .execute(pool)
        .await?;

    if result.rows_affected() == 0 {
        return Err(MusicifyError::not_found("Playlist", id));
    }

    Ok(())
}

/// Append a song. Returns `false` when it is already in the playlist.
pub async fn add_song(pool: &SqlitePool, id: PlaylistId, song_id: SongId) -> Result<bool> {
    let mut tx = pool.begin().await?;

    let song_exists: Option<i64> = sqlx::query_scalar("SELECT id FROM songs WHERE id = ?")
        .bind(song_id)
        .fetch_optional(&mut *tx)
        .await?;
    if song_exists.is_none() {
        return Err(MusicifyError::SongNotFound(song_id));
    }

    let inserted = sqlx::query(
        r#"
        INSERT OR IGNORE INTO playlist_songs (playlist_id, song_id, position)
        VALUES (?, ?, COALESCE((SELECT MAX(position) + 1 FROM playlist_songs WHERE playlist_id = ?), 0))
        "#,
    )
    .bind(id)
    .bind(song_id)
    .bind(id)
    .execute(&mut *tx)
    .await?
    .rows_affected();

    if inserted > 0 {
        touch(&mut tx, id).await?;
    }
    tx.commit().await?;

    Ok(inserted > 0)
}

/// Remove a song. Returns `false` when it was not in the playlist.
pub async fn remove_song(pool: &SqlitePool, id: PlaylistId, song_id: SongId) -> Result<bool> {
    let mut tx = pool.begin().await?;

    let removed = sqlx::query("DELETE FROM playlist_songs WHERE playlist_id = ? AND song_id = ?")
        .bind(id)
        .bind(song_id)
        .execute(&mut *tx)
        .await?
        .rows_affected();

    if removed > 0 {
        touch(&mut tx, id).await?;
    }
    tx.commit().await?;

    Ok(removed > 0)
}

/// Rewrite song order. `order` must be a permutation of the current songs.
pub async fn reorder(pool: &SqlitePool, id: PlaylistId, order: &IdList) -> Result<()> {
    let mut tx = pool.begin().await?;

    let current: Vec<i64> =
        sqlx::query_scalar("SELECT song_id FROM playlist_songs WHERE playlist_id = ? ORDER BY position")
            .bind(id)
            .fetch_all(&mut *tx)
            .await?;

    let same_songs =
        current.len() == order.len() && current.iter().all(|song_id| order.contains(*song_id));
    if !same_songs {
        return Err(MusicifyError::validation(
            "Song order must list every song in the playlist exactly once",
        ));
    }

    for (position, song_id) in order.iter().enumerate() {
        sqlx::query("UPDATE playlist_songs SET position = ? WHERE playlist_id = ? AND song_id = ?")
            .bind(position as i64)
            .bind(id)
            .bind(song_id)
            .execute(&mut *tx)
            .await?;
    }

    touch(&mut tx, id).await?;
    tx.commit().await?;

    Ok(())
}

async fn touch(tx: &mut sqlx::Transaction<'_, sqlx::Sqlite>, id: PlaylistId) -> Result<()> {
    sqlx::query("UPDATE playlists SET updated_at = datetime('now') WHERE id = ?")
        .bind(id)
        .execute(&mut **tx)
        .await?;
    Ok(())
}
