//! Users created from external-auth callbacks

use musicify_core::{
    error::{MusicifyError, Result},
    types::*,
};
use sqlx::{sqlite::SqliteRow, Row, SqlitePool};

fn user_from_row(row: &SqliteRow) -> User {
    User {
        id: row.get("id"),
        clerk_id: row.get("clerk_id"),
        email: row.get("email"),
        first_name: row.get("first_name"),
        last_name: row.get("last_name"),
        image_url: row.get("image_url"),
        created_at: row.get("created_at"),
    }
}

/// Create the user on first sight; later calls refresh the profile fields.
/// The clerk id itself never changes.
pub async fn upsert(pool: &SqlitePool, user: UpsertUser) -> Result<User> {
    let clerk_id = user.clerk_id.trim();
    if clerk_id.is_empty() {
        return Err(MusicifyError::validation("clerkId is required"));
    }

    sqlx::query(
        "INSERT INTO users (clerk_id, email, first_name, last_name, image_url)
         VALUES (?, ?, ?, ?, ?)
         ON CONFLICT(clerk_id) DO UPDATE SET
             email = COALESCE(excluded.email, email),
             first_name = COALESCE(excluded.first_name, first_name),
             last_name = COALESCE(excluded.last_name, last_name),
             image_url = COALESCE(excluded.image_url, image_url)",
    )
    .bind(clerk_id)
    .bind(&user.email)
    .bind(&user.first_name)
    .bind(&user.last_name)
    .bind(&user.image_url)
    .execute(pool)
    .await?;

    get_by_clerk_id(pool, clerk_id)
        .await?
        .ok_or_else(|| MusicifyError::not_found("User", clerk_id))
}

pub async fn get_by_clerk_id(pool: &SqlitePool, clerk_id: &str) -> Result<Option<User>> {
    let row = sqlx::query(
        "SELECT id, clerk_id, email, first_name, last_name, image_url, created_at
         FROM users
         WHERE clerk_id = ?",
    )
    .bind(clerk_id)
    .fetch_optional(pool)
    .await?;

    Ok(row.as_ref().map(user_from_row))
}

pub async fn get_all(pool: &SqlitePool) -> Result<Vec<User>> {
    let rows = sqlx::query(
        "SELECT id, clerk_id, email, first_name, last_name, image_url, created_at
         FROM users
         ORDER BY id",
    )
    .fetch_all(pool)
    .await?;

    Ok(rows.iter().map(user_from_row).collect())
}
