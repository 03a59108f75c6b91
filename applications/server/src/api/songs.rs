/// Song API routes
///
/// Bodies may be JSON or multipart (`audio`, `image`, `lrc` files). The
/// relationship bookkeeping itself lives in `musicify_storage::relationships`.
use crate::{
    error::{Result, ServerError},
    forms::RequestForm,
    state::AppState,
};
use axum::{extract::State, Json};
use musicify_core::{
    extract_spotify_track_id, format_duration, IdList, MediaKind, NewSong, SongUpdate,
};
use musicify_storage::{albums, artists, relationships, songs};
use serde_json::{json, Value};

/// `artists`, falling back to the legacy singular `artist` field
fn artist_ids(form: &RequestForm) -> Result<Option<IdList>> {
    match form.opt_ids("artists")? {
        Some(ids) => Ok(Some(ids)),
        None => form.opt_ids("artist"),
    }
}

/// Image of the album named by `albumId`, when `useAlbumImage` is set
async fn album_image(app_state: &AppState, form: &RequestForm) -> Result<Option<String>> {
    if !form.flag("useAlbumImage") {
        return Ok(None);
    }
    let Some(album_id) = form.opt_id("albumId")? else {
        return Ok(None);
    };

    albums::get_by_id(app_state.pool(), album_id)
        .await?
        .map(|album| album.image)
        .filter(|image| !image.is_empty())
        .map(Some)
        .ok_or_else(|| ServerError::BadRequest("Album image not found".to_string()))
}

async fn upload_lyrics(app_state: &AppState, form: &mut RequestForm) -> Result<Option<String>> {
    match form.take_file("lrc") {
        Some(lrc) => Ok(Some(app_state.uploader.upload(lrc, MediaKind::Lyrics).await?.url)),
        None => Ok(None),
    }
}

/// POST /api/song/add
pub async fn add_song(
    State(app_state): State<AppState>,
    mut form: RequestForm,
) -> Result<Json<Value>> {
    let genres = form.ids("genres")?;
    let new_genres = form.names("newGenres")?;
    let audio = form
        .take_file("audio")
        .ok_or_else(|| ServerError::BadRequest("Audio file is required".to_string()))?;

    let mut song = match form.text("spotifyUrl").filter(|url| !url.trim().is_empty()) {
        Some(url) => from_spotify(&app_state, &form, &url).await?,
        None => {
            let name = form.required_text("name", "Song name is required")?;
            let artists = artist_ids(&form)?.unwrap_or_default();
            let image = match album_image(&app_state, &form).await? {
                Some(image) => image,
                None => {
                    let file = form
                        .take_file("image")
                        .ok_or_else(|| ServerError::BadRequest("Image is required".to_string()))?;
                    app_state.uploader.upload(file, MediaKind::Image).await?.url
                }
            };

            NewSong {
                name,
                artists,
                album: form.text("album").unwrap_or_default(),
                image,
                ..Default::default()
            }
        }
    };

    let uploaded = app_state.uploader.upload(audio, MediaKind::Audio).await?;
    song.file = uploaded.url;
    if let Some(seconds) = uploaded.duration_seconds {
        song.duration = format_duration(seconds);
    } else if song.duration.is_empty() {
        song.duration = format_duration(0.0);
    }

    song.lrc_file = upload_lyrics(&app_state, &mut form).await?;
    song.genres = genres;
    song.new_genres = new_genres;

    let song = relationships::create_song(app_state.pool(), song).await?;

    Ok(Json(json!({
        "success": true,
        "message": "Song Added",
        "song": song,
    })))
}

/// Song details from a Spotify track link; artists are found or created by name
async fn from_spotify(app_state: &AppState, form: &RequestForm, url: &str) -> Result<NewSong> {
    let track_id = extract_spotify_track_id(url)
        .ok_or_else(|| ServerError::BadRequest("Invalid Spotify URL".to_string()))?;
    let lookup = app_state.metadata.as_ref().ok_or_else(|| {
        ServerError::BadRequest("Spotify lookup is not configured on this server".to_string())
    })?;

    let track = lookup.lookup(&track_id).await?;

    let mut artist_ids = IdList::new();
    for artist in &track.artists {
        let artist =
            artists::find_or_create_by_name(app_state.pool(), &artist.name, artist.image_url.as_deref())
                .await?;
        artist_ids.push(artist.id);
    }

    tracing::info!(track_id, artists = artist_ids.len(), "Resolved Spotify track");

    Ok(NewSong {
        name: track.title,
        artists: artist_ids,
        album: form
            .text("album")
            .filter(|album| !album.trim().is_empty())
            .unwrap_or_else(|| "none".to_string()),
        image: track.image_url.unwrap_or_default(),
        duration: track
            .duration_ms
            .map(|ms| format_duration(ms as f64 / 1000.0))
            .unwrap_or_default(),
        ..Default::default()
    })
}

/// GET /api/song/list?search=
pub async fn list_songs(
    State(app_state): State<AppState>,
    form: RequestForm,
) -> Result<Json<Value>> {
    let search = form.text("search");
    let songs = songs::list(app_state.pool(), search.as_deref()).await?;

    Ok(Json(json!({ "success": true, "songs": songs })))
}

/// POST /api/song/remove
pub async fn remove_song(
    State(app_state): State<AppState>,
    form: RequestForm,
) -> Result<Json<Value>> {
    let id = form.id("id")?;
    relationships::remove_song(app_state.pool(), id).await?;

    Ok(Json(json!({
        "success": true,
        "message": "Song removed successfully",
    })))
}

/// POST /api/song/update
pub async fn update_song(
    State(app_state): State<AppState>,
    mut form: RequestForm,
) -> Result<Json<Value>> {
    let id = form.id("id")?;

    // Nothing gets uploaded for a song that is not there
    if songs::get_by_id(app_state.pool(), id).await?.is_none() {
        return Err(musicify_core::MusicifyError::SongNotFound(id).into());
    }

    let mut update = SongUpdate {
        name: form.text("name"),
        album: form.text("album"),
        artists: artist_ids(&form)?,
        genres: form.opt_ids("genres")?,
        new_genres: form.names("newGenres")?,
        ..Default::default()
    };

    update.image = match album_image(&app_state, &form).await? {
        Some(image) => Some(image),
        None => match form.take_file("image") {
            Some(file) => Some(app_state.uploader.upload(file, MediaKind::Image).await?.url),
            None => None,
        },
    };

    if let Some(audio) = form.take_file("audio") {
        let uploaded = app_state.uploader.upload(audio, MediaKind::Audio).await?;
        update.file = Some(uploaded.url);
        update.duration = uploaded.duration_seconds.map(format_duration);
    }
    update.lrc_file = upload_lyrics(&app_state, &mut form).await?;

    let song = relationships::update_song(app_state.pool(), id, update).await?;

    Ok(Json(json!({
        "success": true,
        "message": "Song updated",
        "song": song,
    })))
}
