//! Song records and their canonical artist/genre lists
//!
//! Nothing here touches the genre or artist mirrors; callers that change a
//! song's relationships go through `relationships`.

use crate::split_ids;
use musicify_core::{
    error::{MusicifyError, Result},
    types::*,
    IdList,
};
use sqlx::{sqlite::SqliteRow, Row, SqliteConnection, SqlitePool};

const SONG_SELECT: &str = "SELECT s.id, s.name, s.artist_name, s.album, s.image, s.file, s.lrc_file,
            s.duration, s.created_at,
            (SELECT group_concat(artist_id) FROM
                (SELECT sa.artist_id FROM song_artists sa WHERE sa.song_id = s.id ORDER BY sa.position)
            ) AS artist_ids,
            (SELECT group_concat(genre_id) FROM
                (SELECT sg.genre_id FROM song_genres sg WHERE sg.song_id = s.id ORDER BY sg.position)
            ) AS genre_ids
     FROM songs s";

pub(crate) fn song_from_row(row: &SqliteRow) -> Song {
    Song {
        id: row.get("id"),
        name: row.get("name"),
        artists: split_ids(row.get("artist_ids")),
        artist_name: row.get("artist_name"),
        album: row.get("album"),
        image: row.get("image"),
        file: row.get("file"),
        lrc_file: row.get("lrc_file"),
        duration: row.get("duration"),
        genres: split_ids(row.get("genre_ids")),
        created_at: row.get("created_at"),
    }
}

pub(crate) fn song_select() -> &'static str {
    SONG_SELECT
}

/// All songs, newest first. `search` matches name, album or artist name,
/// case-insensitively.
pub async fn list(pool: &SqlitePool, search: Option<&str>) -> Result<Vec<Song>> {
    let search = search.map(str::trim).filter(|s| !s.is_empty());

    let rows = match search {
        Some(term) => {
            let pattern = format!("%{}%", escape_like(term));
            sqlx::query(&format!(
                "{SONG_SELECT}
                 WHERE s.name LIKE ?1 ESCAPE '\\'
                    OR s.album LIKE ?1 ESCAPE '\\'
                    OR s.artist_name LIKE ?1 ESCAPE '\\'
                 ORDER BY s.created_at DESC, s.id DESC"
            ))
            .bind(pattern)
            .fetch_all(pool)
            .await?
        }
        None => {
            sqlx::query(&format!("{SONG_SELECT} ORDER BY s.created_at DESC, s.id DESC"))
                .fetch_all(pool)
                .await?
        }
    };

    Ok(rows.iter().map(song_from_row).collect())
}

fn escape_like(term: &str) -> String {
    let mut escaped = String::with_capacity(term.len());
    for c in term.chars() {
        if matches!(c, '%' | '_' | '\\') {
            escaped.push('\\');
        }
        escaped.push(c);
    }
    escaped
}

pub async fn get_by_id(pool: &SqlitePool, id: SongId) -> Result<Option<Song>> {
    let mut conn = pool.acquire().await?;
    fetch(&mut conn, id).await
}

/// `get_by_id` on a connection, so a transaction sees its own writes
pub async fn fetch(conn: &mut SqliteConnection, id: SongId) -> Result<Option<Song>> {
    let row = sqlx::query(&format!("{SONG_SELECT} WHERE s.id = ?"))
        .bind(id)
        .fetch_optional(&mut *conn)
        .await?;

    Ok(row.as_ref().map(song_from_row))
}

/// Take the write lock on the song's row before anything is read.
///
/// `SQLite` cannot upgrade a read snapshot once another writer has committed,
/// so an update that reads first can lose to a concurrent one. Writing first
/// makes concurrent updates queue on the busy timeout instead. Returns false
/// when the song does not exist.
pub async fn lock_for_update(conn: &mut SqliteConnection, id: SongId) -> Result<bool> {
    let result = sqlx::query("UPDATE songs SET name = name WHERE id = ?")
        .bind(id)
        .execute(&mut *conn)
        .await?;

    Ok(result.rows_affected() > 0)
}

/// Insert the song row with its artist and genre lists.
pub async fn insert(
    conn: &mut SqliteConnection,
    song: &NewSong,
    artist_name: &str,
    genres: &IdList,
) -> Result<SongId> {
    let id = sqlx::query(
        "INSERT INTO songs (name, artist_name, album, image, file, lrc_file, duration)
         VALUES (?, ?, ?, ?, ?, ?, ?)",
    )
    .bind(song.name.trim())
    .bind(artist_name)
    .bind(&song.album)
    .bind(&song.image)
    .bind(&song.file)
    .bind(&song.lrc_file)
    .bind(&song.duration)
    .execute(&mut *conn)
    .await?
    .last_insert_rowid();

    set_artists(&mut *conn, id, &song.artists).await?;
    set_genres(&mut *conn, id, genres).await?;

    Ok(id)
}

/// Apply scalar field changes; `None` fields keep their value.
pub async fn update_fields(
    conn: &mut SqliteConnection,
    id: SongId,
    update: &SongUpdate,
    artist_name: Option<&str>,
) -> Result<()> {
    let result = sqlx::query(
        "UPDATE songs
         SET name = COALESCE(?, name),
             album = COALESCE(?, album),
             image = COALESCE(?, image),
             file = COALESCE(?, file),
             lrc_file = COALESCE(?, lrc_file),
             duration = COALESCE(?, duration),
             artist_name = COALESCE(?, artist_name)
         WHERE id = ?",
    )
    .bind(update.name.as_deref().map(str::trim))
    .bind(&update.album)
    .bind(&update.image)
    .bind(&update.file)
    .bind(&update.lrc_file)
    .bind(&update.duration)
    .bind(artist_name)
    .bind(id)
    .execute(&mut *conn)
    .await?;

    if result.rows_affected() == 0 {
        return Err(MusicifyError::SongNotFound(id));
    }

    Ok(())
}

/// Replace the credit list
pub async fn set_artists(conn: &mut SqliteConnection, id: SongId, artists: &IdList) -> Result<()> {
    sqlx::query("DELETE FROM song_artists WHERE song_id = ?")
        .bind(id)
        .execute(&mut *conn)
        .await?;

    for (position, artist_id) in artists.iter().enumerate() {
        sqlx::query("INSERT INTO song_artists (song_id, artist_id, position) VALUES (?, ?, ?)")
            .bind(id)
            .bind(artist_id)
            .bind(position as i64)
            .execute(&mut *conn)
            .await?;
    }

    Ok(())
}

/// Replace the canonical genre list
pub async fn set_genres(conn: &mut SqliteConnection, id: SongId, genres: &IdList) -> Result<()> {
    sqlx::query("DELETE FROM song_genres WHERE song_id = ?")
        .bind(id)
        .execute(&mut *conn)
        .await?;

    for (position, genre_id) in genres.iter().enumerate() {
        sqlx::query("INSERT INTO song_genres (song_id, genre_id, position) VALUES (?, ?, ?)")
            .bind(id)
            .bind(genre_id)
            .bind(position as i64)
            .execute(&mut *conn)
            .await?;
    }

    Ok(())
}

/// Delete the song row. Genre mirrors are not touched.
pub async fn delete(conn: &mut SqliteConnection, id: SongId) -> Result<()> {
    let result = sqlx::query("DELETE FROM songs WHERE id = ?")
        .bind(id)
        .execute(&mut *conn)
        .await?;

    if result.rows_affected() == 0 {
        return Err(MusicifyError::SongNotFound(id));
    }

    Ok(())
}

/// Union of genres across the songs crediting `artist_id`, optionally
/// leaving one song out.
pub async fn genre_union_for_artist(
    conn: &mut SqliteConnection,
    artist_id: ArtistId,
    excluding: Option<SongId>,
) -> Result<IdList> {
    let ids: Vec<i64> = sqlx::query_scalar(
        "SELECT sg.genre_id
         FROM song_artists sa
         INNER JOIN songs s ON s.id = sa.song_id
         INNER JOIN song_genres sg ON sg.song_id = sa.song_id
         WHERE sa.artist_id = ? AND (? IS NULL OR sa.song_id != ?)
         ORDER BY s.id, sg.position",
    )
    .bind(artist_id)
    .bind(excluding)
    .bind(excluding)
    .fetch_all(&mut *conn)
    .await?;

    // IdList keeps first occurrence
    Ok(ids.into())
}

/// Ids of songs whose album field equals `album`
pub async fn ids_by_album(pool: &SqlitePool, album: &str) -> Result<Vec<SongId>> {
    let ids = sqlx::query_scalar("SELECT id FROM songs WHERE album = ? ORDER BY id")
        .bind(album)
        .fetch_all(pool)
        .await?;

    Ok(ids)
}
