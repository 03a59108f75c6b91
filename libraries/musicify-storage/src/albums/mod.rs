use musicify_core::{
    error::{MusicifyError, Result},
    types::*,
};
use sqlx::{sqlite::SqliteRow, Row, SqlitePool};

fn album_from_row(row: &SqliteRow) -> Album {
    Album {
        id: row.get("id"),
        name: row.get("name"),
        desc: row.get("description"),
        image: row.get("image"),
        bg_color: row.get("bg_color"),
        created_at: row.get("created_at"),
    }
}

pub async fn get_all(pool: &SqlitePool) -> Result<Vec<Album>> {
    let rows = sqlx::query(
        "SELECT id, name, description, image, bg_color, created_at
         FROM albums
         ORDER BY name COLLATE NOCASE",
    )
    .fetch_all(pool)
    .await?;

    Ok(rows.iter().map(album_from_row).collect())
}

pub async fn get_by_id(pool: &SqlitePool, id: AlbumId) -> Result<Option<Album>> {
    let row = sqlx::query(
        "SELECT id, name, description, image, bg_color, created_at
         FROM albums
         WHERE id = ?",
    )
    .bind(id)
    .fetch_optional(pool)
    .await?;

    Ok(row.as_ref().map(album_from_row))
}

pub async fn create(pool: &SqlitePool, album: CreateAlbum) -> Result<Album> {
    let name = album.name.trim();
    if name.is_empty() {
        return Err(MusicifyError::validation("Album name is required"));
    }

    let result = sqlx::query(
        "INSERT INTO albums (name, description, image, bg_color)
         VALUES (?, ?, ?, COALESCE(?, '#121212'))",
    )
    .bind(name)
    .bind(&album.desc)
    .bind(&album.image)
    .bind(album.bg_color.filter(|c| !c.trim().is_empty()))
    .execute(pool)
    .await?;

    get_by_id(pool, result.last_insert_rowid())
        .await?
        .ok_or_else(|| MusicifyError::Database("Failed to retrieve created album".to_string()))
}

/// Update album fields. Songs keep the album name they were saved with.
pub async fn update(pool: &SqlitePool, id: AlbumId, update: UpdateAlbum) -> Result<Album> {
    if matches!(update.name.as_deref().map(str::trim), Some("")) {
        return Err(MusicifyError::validation("Album name is required"));
    }

    let result = sqlx::query(
        "UPDATE albums
         SET name = COALESCE(?, name),
             description = COALESCE(?, description),
             image = COALESCE(?, image),
             bg_color = COALESCE(?, bg_color)
         WHERE id = ?",
    )
    .bind(update.name.as_deref().map(str::trim))
    .bind(update.desc)
    .bind(update.image)
    .bind(update.bg_color)
    .bind(id)
    .execute(pool)
    .await?;

    if result.rows_affected() == 0 {
        return Err(MusicifyError::not_found("Album", id));
    }

    get_by_id(pool, id)
        .await?
        .ok_or_else(|| MusicifyError::not_found("Album", id))
}

pub async fn delete(pool: &SqlitePool, id: AlbumId) -> Result<()> {
    let result = sqlx::query("DELETE FROM albums WHERE id = ?")
        .bind(id)
        .execute(pool)
        .await?;

    if result.rows_affected() == 0 {
        return Err(MusicifyError::not_found("Album", id));
    }

    Ok(())
}
