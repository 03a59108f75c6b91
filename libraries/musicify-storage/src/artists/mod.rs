use crate::split_ids;
use musicify_core::{
    error::{MusicifyError, Result},
    types::*,
    IdList,
};
use sqlx::{sqlite::SqliteRow, Row, SqliteConnection, SqlitePool};

const ARTIST_SELECT: &str = "SELECT a.id, a.name, a.image, a.bg_color, a.created_at,
            (SELECT group_concat(genre_id) FROM
                (SELECT ag.genre_id FROM artist_genres ag WHERE ag.artist_id = a.id ORDER BY ag.position)
            ) AS genres
     FROM artists a";

fn artist_from_row(row: &SqliteRow) -> Artist {
    Artist {
        id: row.get("id"),
        name: row.get("name"),
        image: row.get("image"),
        bg_color: row.get("bg_color"),
        genres: split_ids(row.get("genres")),
        created_at: row.get("created_at"),
    }
}

pub async fn get_all(pool: &SqlitePool) -> Result<Vec<Artist>> {
    let rows = sqlx::query(&format!("{ARTIST_SELECT} ORDER BY a.name COLLATE NOCASE"))
        .fetch_all(pool)
        .await?;

    Ok(rows.iter().map(artist_from_row).collect())
}

pub async fn get_by_id(pool: &SqlitePool, id: ArtistId) -> Result<Option<Artist>> {
    let mut conn = pool.acquire().await?;
    fetch(&mut conn, id).await
}

pub async fn fetch(conn: &mut SqliteConnection, id: ArtistId) -> Result<Option<Artist>> {
    let row = sqlx::query(&format!("{ARTIST_SELECT} WHERE a.id = ?"))
        .bind(id)
        .fetch_optional(&mut *conn)
        .await?;

    Ok(row.as_ref().map(artist_from_row))
}

/// Case-insensitive lookup, creating the artist when absent
pub async fn find_or_create_by_name(
    pool: &SqlitePool,
    name: &str,
    image: Option<&str>,
) -> Result<Artist> {
    let name = name.trim();
    if name.is_empty() {
        return Err(MusicifyError::validation("Artist name is required"));
    }

    let existing: Option<i64> =
        sqlx::query_scalar("SELECT id FROM artists WHERE name = ? COLLATE NOCASE ORDER BY id LIMIT 1")
            .bind(name)
            .fetch_optional(pool)
            .await?;

    let id = match existing {
        Some(id) => id,
        None => sqlx::query("INSERT INTO artists (name, image) VALUES (?, ?)")
            .bind(name)
            .bind(image.unwrap_or_default())
            .execute(pool)
            .await?
            .last_insert_rowid(),
    };

    get_by_id(pool, id)
        .await?
        .ok_or_else(|| MusicifyError::not_found("Artist", id))
}

pub async fn create(pool: &SqlitePool, artist: CreateArtist) -> Result<Artist> {
    let name = artist.name.trim();
    if name.is_empty() {
        return Err(MusicifyError::validation("Artist name is required"));
    }

    let result = sqlx::query(
        "INSERT INTO artists (name, image, bg_color)
         VALUES (?, ?, COALESCE(?, '#e0e0e0'))",
    )
    .bind(name)
    .bind(&artist.image)
    .bind(artist.bg_color.filter(|c| !c.trim().is_empty()))
    .execute(pool)
    .await?;

    get_by_id(pool, result.last_insert_rowid())
        .await?
        .ok_or_else(|| MusicifyError::Database("Failed to retrieve created artist".to_string()))
}

pub async fn update(pool: &SqlitePool, id: ArtistId, update: UpdateArtist) -> Result<Artist> {
    if matches!(update.name.as_deref().map(str::trim), Some("")) {
        return Err(MusicifyError::validation("Artist name is required"));
    }

    let result = sqlx::query(
        "UPDATE artists
         SET name = COALESCE(?, name), image = COALESCE(?, image), bg_color = COALESCE(?, bg_color)
         WHERE id = ?",
    )
    .bind(update.name.as_deref().map(str::trim))
    .bind(update.image)
    .bind(update.bg_color)
    .bind(id)
    .execute(pool)
    .await?;

    if result.rows_affected() == 0 {
        return Err(MusicifyError::not_found("Artist", id));
    }

    get_by_id(pool, id)
        .await?
        .ok_or_else(|| MusicifyError::not_found("Artist", id))
}

/// Delete an artist; songs drop the credit but keep their stored artist name
pub async fn delete(pool: &SqlitePool, id: ArtistId) -> Result<()> {
    let result = sqlx::query("DELETE FROM artists WHERE id = ?")
        .bind(id)
        .execute(pool)
        .await?;

    if result.rows_affected() == 0 {
        return Err(MusicifyError::not_found("Artist", id));
    }

    Ok(())
}

/// Names for the given ids, in the same order.
///
/// Fails with `NotFound` on the first id that does not exist.
pub async fn names_for(conn: &mut SqliteConnection, ids: &IdList) -> Result<Vec<String>> {
    let mut names = Vec::with_capacity(ids.len());
    for id in ids.iter() {
        let name: Option<String> = sqlx::query_scalar("SELECT name FROM artists WHERE id = ?")
            .bind(id)
            .fetch_optional(&mut *conn)
            .await?;
        names.push(name.ok_or_else(|| MusicifyError::not_found("Artist", id))?);
    }
    Ok(names)
}

pub async fn genre_ids(conn: &mut SqliteConnection, id: ArtistId) -> Result<IdList> {
    let ids: Vec<i64> = sqlx::query_scalar(
        "SELECT genre_id FROM artist_genres WHERE artist_id = ? ORDER BY position",
    )
    .bind(id)
    .fetch_all(&mut *conn)
    .await?;

    Ok(ids.into())
}

/// Overwrite an artist's genre set
pub async fn set_genres(conn: &mut SqliteConnection, id: ArtistId, genres: &IdList) -> Result<()> {
    sqlx::query("DELETE FROM artist_genres WHERE artist_id = ?")
        .bind(id)
        .execute(&mut *conn)
        .await?;

    for (position, genre_id) in genres.iter().enumerate() {
        sqlx::query("INSERT INTO artist_genres (artist_id, genre_id, position) VALUES (?, ?, ?)")
            .bind(id)
            .bind(genre_id)
            .bind(position as i64)
            .execute(&mut *conn)
            .await?;
    }

    Ok(())
}
