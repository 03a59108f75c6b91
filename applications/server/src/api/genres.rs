/// Genre API routes
///
/// A name that collides with an existing genre after normalization comes
/// back as 409 with `isDuplicate: true`.
use crate::{error::Result, forms::RequestForm, state::AppState};
use axum::{extract::State, Json};
use musicify_core::{CreateGenre, MusicifyError, UpdateGenre};
use musicify_storage::genres;
use serde_json::{json, Value};

/// POST /api/genre/add
pub async fn add_genre(
    State(app_state): State<AppState>,
    form: RequestForm,
) -> Result<Json<Value>> {
    let genre = genres::create(
        app_state.pool(),
        CreateGenre {
            name: form.required_text("name", "Genre name is required")?,
            bg_color: form.text("bgColor"),
        },
    )
    .await?;

    tracing::info!(genre_id = genre.id, "Genre added: {}", genre.name);

    Ok(Json(json!({
        "success": true,
        "message": "Genre added",
        "genre": genre,
    })))
}

/// GET /api/genre/list
/// With `?id=` returns that single genre instead of the list
pub async fn list_genres(
    State(app_state): State<AppState>,
    form: RequestForm,
) -> Result<Json<Value>> {
    if let Some(id) = form.opt_id("id")? {
        let genre = genres::get_by_id(app_state.pool(), id)
            .await?
            .ok_or_else(|| MusicifyError::not_found("Genre", id))?;
        return Ok(Json(json!({ "success": true, "genre": genre })));
    }

    let genres = genres::get_all(app_state.pool()).await?;
    Ok(Json(json!({ "success": true, "genres": genres })))
}

/// POST /api/genre/update
pub async fn update_genre(
    State(app_state): State<AppState>,
    form: RequestForm,
) -> Result<Json<Value>> {
    let id = form.id("id")?;
    let genre = genres::update(
        app_state.pool(),
        id,
        UpdateGenre {
            name: form.text("name"),
            bg_color: form.text("bgColor"),
        },
    )
    .await?;

    Ok(Json(json!({
        "success": true,
        "message": "Genre updated",
        "genre": genre,
    })))
}

/// POST /api/genre/remove
pub async fn remove_genre(
    State(app_state): State<AppState>,
    form: RequestForm,
) -> Result<Json<Value>> {
    let id = form.id("id")?;
    genres::delete(app_state.pool(), id).await?;

    Ok(Json(json!({ "success": true, "message": "Genre removed" })))
}
