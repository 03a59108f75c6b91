use crate::split_ids;
use musicify_core::{
    error::{MusicifyError, Result},
    normalize_genre_name,
    types::*,
    IdList,
};
use sqlx::{sqlite::SqliteRow, Row, SqliteConnection, SqlitePool};

const GENRE_SELECT: &str = "SELECT g.id, g.name, g.normalized_name, g.bg_color, g.song_count, g.created_at,
            (SELECT group_concat(song_id) FROM
                (SELECT gs.song_id FROM genre_songs gs WHERE gs.genre_id = g.id ORDER BY gs.id)
            ) AS song_list
     FROM genres g";

fn genre_from_row(row: &SqliteRow) -> Genre {
    Genre {
        id: row.get("id"),
        name: row.get("name"),
        normalized_name: row.get("normalized_name"),
        bg_color: row.get("bg_color"),
        song_list: split_ids(row.get("song_list")),
        song_count: row.get("song_count"),
        created_at: row.get("created_at"),
    }
}

pub async fn get_all(pool: &SqlitePool) -> Result<Vec<Genre>> {
    let rows = sqlx::query(&format!("{GENRE_SELECT} ORDER BY g.name COLLATE NOCASE"))
        .fetch_all(pool)
        .await?;

    Ok(rows.iter().map(genre_from_row).collect())
}

pub async fn get_by_id(pool: &SqlitePool, id: GenreId) -> Result<Option<Genre>> {
    let mut conn = pool.acquire().await?;
    fetch(&mut conn, id).await
}

pub async fn fetch(conn: &mut SqliteConnection, id: GenreId) -> Result<Option<Genre>> {
    let row = sqlx::query(&format!("{GENRE_SELECT} WHERE g.id = ?"))
        .bind(id)
        .fetch_optional(&mut *conn)
        .await?;

    Ok(row.as_ref().map(genre_from_row))
}

pub async fn find_by_normalized_name(
    conn: &mut SqliteConnection,
    normalized_name: &str,
) -> Result<Option<Genre>> {
    let row = sqlx::query(&format!("{GENRE_SELECT} WHERE g.normalized_name = ?"))
        .bind(normalized_name)
        .fetch_optional(&mut *conn)
        .await?;

    Ok(row.as_ref().map(genre_from_row))
}

/// Ids from `ids` that do not name an existing genre
pub async fn missing(conn: &mut SqliteConnection, ids: &IdList) -> Result<Vec<GenreId>> {
    let mut missing = Vec::new();
    for id in ids.iter() {
        let found: Option<i64> = sqlx::query_scalar("SELECT id FROM genres WHERE id = ?")
            .bind(id)
            .fetch_optional(&mut *conn)
            .await?;
        if found.is_none() {
            missing.push(id);
        }
    }
    Ok(missing)
}

/// Create a genre, rejecting names that collide after normalization
pub async fn create(pool: &SqlitePool, genre: CreateGenre) -> Result<Genre> {
    let mut conn = pool.acquire().await?;
    insert(&mut conn, genre).await
}

/// `create` on a connection or inside a transaction
pub async fn insert(conn: &mut SqliteConnection, genre: CreateGenre) -> Result<Genre> {
    let name = genre.name.trim().to_string();
    let normalized = normalize_genre_name(&name);
    if normalized.is_empty() {
        return Err(MusicifyError::validation(
            "Genre name must contain letters or digits",
        ));
    }

    if let Some(existing) = find_by_normalized_name(&mut *conn, &normalized).await? {
        return Err(MusicifyError::DuplicateName(existing.name));
    }

    let bg_color = genre
        .bg_color
        .filter(|c| !c.trim().is_empty())
        .unwrap_or_else(|| "#000000".to_string());

    let result = sqlx::query(
        "INSERT INTO genres (name, normalized_name, bg_color)
         VALUES (?, ?, ?)",
    )
    .bind(&name)
    .bind(&normalized)
    .bind(&bg_color)
    .execute(&mut *conn)
    .await?;

    let id = result.last_insert_rowid();

    fetch(&mut *conn, id)
        .await?
        .ok_or_else(|| MusicifyError::Database("Failed to retrieve created genre".to_string()))
}

/// Update name and/or color; a rename must stay unique among other genres
pub async fn update(pool: &SqlitePool, id: GenreId, update: UpdateGenre) -> Result<Genre> {
    let mut tx = pool.begin().await?;

    let current = fetch(&mut *tx, id)
        .await?
        .ok_or_else(|| MusicifyError::not_found("Genre", id))?;

    let (name, normalized) = match update.name.as_deref().map(str::trim) {
        Some(name) if name != current.name => {
            let normalized = normalize_genre_name(name);
            if normalized.is_empty() {
                return Err(MusicifyError::validation(
                    "Genre name must contain letters or digits",
                ));
            }
            if let Some(other) = find_by_normalized_name(&mut *tx, &normalized).await? {
                if other.id != id {
                    return Err(MusicifyError::DuplicateName(other.name));
                }
            }
            (name.to_string(), normalized)
        }
        _ => (current.name.clone(), current.normalized_name.clone()),
    };

    let bg_color = update
        .bg_color
        .filter(|c| !c.trim().is_empty())
        .unwrap_or(current.bg_color);

    sqlx::query("UPDATE genres SET name = ?, normalized_name = ?, bg_color = ? WHERE id = ?")
        .bind(&name)
        .bind(&normalized)
        .bind(&bg_color)
        .bind(id)
        .execute(&mut *tx)
        .await?;

    let genre = fetch(&mut *tx, id)
        .await?
        .ok_or_else(|| MusicifyError::not_found("Genre", id))?;
    tx.commit().await?;

    Ok(genre)
}

/// Delete a genre; songs and artists lose the tag through cascades
pub async fn delete(pool: &SqlitePool, id: GenreId) -> Result<()> {
    let result = sqlx::query("DELETE FROM genres WHERE id = ?")
        .bind(id)
        .execute(pool)
        .await?;

    if result.rows_affected() == 0 {
        return Err(MusicifyError::not_found("Genre", id));
    }

    Ok(())
}

/// Add a song to the genre's song list (add-to-set) and bump the count.
///
/// The count only moves when the list did, so `song_count` tracks
/// `song_list` even if the mirror had drifted. Returns whether the song
/// was added.
pub async fn attach_song(
    conn: &mut SqliteConnection,
    genre_id: GenreId,
    song_id: SongId,
) -> Result<bool> {
    let inserted = sqlx::query("INSERT OR IGNORE INTO genre_songs (genre_id, song_id) VALUES (?, ?)")
        .bind(genre_id)
        .bind(song_id)
        .execute(&mut *conn)
        .await?
        .rows_affected();

    if inserted > 0 {
        sqlx::query("UPDATE genres SET song_count = song_count + 1 WHERE id = ?")
            .bind(genre_id)
            .execute(&mut *conn)
            .await?;
    }

    Ok(inserted > 0)
}

/// Pull a song from the genre's song list and drop the count.
pub async fn detach_song(
    conn: &mut SqliteConnection,
    genre_id: GenreId,
    song_id: SongId,
) -> Result<bool> {
    let removed = sqlx::query("DELETE FROM genre_songs WHERE genre_id = ? AND song_id = ?")
        .bind(genre_id)
        .bind(song_id)
        .execute(&mut *conn)
        .await?
        .rows_affected();

    if removed > 0 {
        sqlx::query("UPDATE genres SET song_count = MAX(song_count - 1, 0) WHERE id = ?")
            .bind(genre_id)
            .execute(&mut *conn)
            .await?;
    }

    Ok(removed > 0)
}
