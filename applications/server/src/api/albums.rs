/// Album API routes
use crate::{
    error::{Result, ServerError},
    forms::RequestForm,
    state::AppState,
};
use axum::{extract::State, Json};
use musicify_core::{CreateAlbum, MediaKind, MusicifyError, UpdateAlbum};
use musicify_storage::{albums, relationships, songs};
use serde_json::{json, Value};

/// POST /api/album/add
pub async fn add_album(
    State(app_state): State<AppState>,
    mut form: RequestForm,
) -> Result<Json<Value>> {
    let name = form.required_text("name", "Album name is required")?;
    let image = match form.take_file("image") {
        Some(file) => app_state.uploader.upload(file, MediaKind::Image).await?.url,
        None => form.text("image").unwrap_or_default(),
    };

    let album = albums::create(
        app_state.pool(),
        CreateAlbum {
            name,
            desc: form.text("desc").unwrap_or_default(),
            image,
            bg_color: form.text("bgColor"),
        },
    )
    .await?;

    Ok(Json(json!({
        "success": true,
        "message": "Album added",
        "album": album,
    })))
}

/// GET /api/album/list
pub async fn list_albums(State(app_state): State<AppState>) -> Result<Json<Value>> {
    let albums = albums::get_all(app_state.pool()).await?;
    Ok(Json(json!({ "success": true, "albums": albums })))
}

/// POST /api/album/update
pub async fn update_album(
    State(app_state): State<AppState>,
    mut form: RequestForm,
) -> Result<Json<Value>> {
    let id = form.id("id")?;
    let image = match form.take_file("image") {
        Some(file) => Some(app_state.uploader.upload(file, MediaKind::Image).await?.url),
        None => None,
    };

    let album = albums::update(
        app_state.pool(),
        id,
        UpdateAlbum {
            name: form.text("name"),
            desc: form.text("desc"),
            image,
            bg_color: form.text("bgColor"),
        },
    )
    .await?;

    Ok(Json(json!({
        "success": true,
        "message": "Album updated",
        "album": album,
    })))
}

/// POST /api/album/remove
///
/// Songs filed under the album go with it, but only once the caller
/// confirms with `confirmed=true`; until then the song count is reported.
pub async fn remove_album(
    State(app_state): State<AppState>,
    form: RequestForm,
) -> Result<Json<Value>> {
    let id = form.id("id")?;
    let album = albums::get_by_id(app_state.pool(), id)
        .await?
        .ok_or_else(|| MusicifyError::not_found("Album", id))?;

    let song_ids = songs::ids_by_album(app_state.pool(), &album.name).await?;
    if !song_ids.is_empty() && !form.flag("confirmed") {
        return Err(ServerError::ConfirmationRequired {
            message: format!(
                "Album \"{}\" has {} song(s); removing it removes them too",
                album.name,
                song_ids.len()
            ),
            song_count: song_ids.len(),
        });
    }

    for song_id in &song_ids {
        relationships::remove_song(app_state.pool(), *song_id).await?;
    }
    albums::delete(app_state.pool(), id).await?;

    tracing::info!(album_id = id, songs = song_ids.len(), "Album removed");

    Ok(Json(json!({
        "success": true,
        "message": "Album removed",
        "removedSongs": song_ids.len(),
    })))
}
