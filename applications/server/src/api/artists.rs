/// Artist API routes
use crate::{error::Result, forms::RequestForm, state::AppState};
use axum::{extract::State, Json};
use musicify_core::{CreateArtist, MediaKind, UpdateArtist};
use musicify_storage::artists;
use serde_json::{json, Value};

/// POST /api/artist/add
pub async fn add_artist(
    State(app_state): State<AppState>,
    mut form: RequestForm,
) -> Result<Json<Value>> {
    let name = form.required_text("name", "Artist name is required")?;
    let image = match form.take_file("image") {
        Some(file) => app_state.uploader.upload(file, MediaKind::Image).await?.url,
        None => form.text("image").unwrap_or_default(),
    };

    let artist = artists::create(
        app_state.pool(),
        CreateArtist {
            name,
            image,
            bg_color: form.text("bgColor"),
        },
    )
    .await?;

    Ok(Json(json!({
        "success": true,
        "message": "Artist added",
        "artist": artist,
    })))
}

/// GET /api/artist/list
pub async fn list_artists(State(app_state): State<AppState>) -> Result<Json<Value>> {
    let artists = artists::get_all(app_state.pool()).await?;
    Ok(Json(json!({ "success": true, "artists": artists })))
}

/// POST /api/artist/update
pub async fn update_artist(
    State(app_state): State<AppState>,
    mut form: RequestForm,
) -> Result<Json<Value>> {
    let id = form.id("id")?;
    let image = match form.take_file("image") {
        Some(file) => Some(app_state.uploader.upload(file, MediaKind::Image).await?.url),
        None => None,
    };

    let artist = artists::update(
        app_state.pool(),
        id,
        UpdateArtist {
            name: form.text("name"),
            image,
            bg_color: form.text("bgColor"),
        },
    )
    .await?;

    Ok(Json(json!({
        "success": true,
        "message": "Artist updated",
        "artist": artist,
    })))
}

/// POST /api/artist/remove
pub async fn remove_artist(
    State(app_state): State<AppState>,
    form: RequestForm,
) -> Result<Json<Value>> {
    let id = form.id("id")?;
    artists::delete(app_state.pool(), id).await?;

    Ok(Json(json!({ "success": true, "message": "Artist removed" })))
}
