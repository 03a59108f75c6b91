/// HTTP routing
use crate::{api, middleware, state::AppState};
use axum::{
    extract::DefaultBodyLimit,
    middleware as axum_middleware,
    routing::{get, post},
    Router,
};
use std::{path::Path, sync::Arc};
use tower_http::{
    cors::CorsLayer,
    services::ServeDir,
    trace::{DefaultMakeSpan, TraceLayer},
};

/// Uploads carry whole audio files
const MAX_BODY_BYTES: usize = 50 * 1024 * 1024;

/// Build the application router; uploaded media is served from `media_path`
pub fn create_router(app_state: AppState, media_path: &Path) -> Router {
    let api_routes = Router::new()
        .route("/health", get(api::health::health))
        .route("/auth/callback", post(api::auth::callback))
        .route("/user", get(api::users::list_users))
        // Songs
        .route("/song/add", post(api::songs::add_song))
        .route("/song/list", get(api::songs::list_songs))
        .route("/song/remove", post(api::songs::remove_song))
        .route("/song/update", post(api::songs::update_song))
        // Genres
        .route("/genre/add", post(api::genres::add_genre))
        .route("/genre/list", get(api::genres::list_genres))
        .route("/genre/remove", post(api::genres::remove_genre))
        .route("/genre/update", post(api::genres::update_genre))
        // Artists
        .route("/artist/add", post(api::artists::add_artist))
        .route("/artist/list", get(api::artists::list_artists))
        .route("/artist/remove", post(api::artists::remove_artist))
        .route("/artist/update", post(api::artists::update_artist))
        // Albums
        .route("/album/add", post(api::albums::add_album))
        .route("/album/list", get(api::albums::list_albums))
        .route("/album/remove", post(api::albums::remove_album))
        .route("/album/update", post(api::albums::update_album))
        // Playlists
        .route("/playlist/create", post(api::playlists::create_playlist))
        .route("/playlist/list", get(api::playlists::list_playlists))
        .route("/playlist/get", get(api::playlists::get_playlist))
        .route("/playlist/update", post(api::playlists::update_playlist))
        .route("/playlist/delete", post(api::playlists::delete_playlist))
        .route("/playlist/add-song", post(api::playlists::add_song))
        .route("/playlist/remove-song", post(api::playlists::remove_song))
        .route("/playlist/reorder-songs", post(api::playlists::reorder_songs))
        .layer(axum_middleware::from_fn_with_state(
            Arc::clone(&app_state.auth_service),
            middleware::auth_middleware,
        ));

    Router::new()
        .nest("/api", api_routes)
        .nest_service("/media", ServeDir::new(media_path))
        .layer(DefaultBodyLimit::max(MAX_BODY_BYTES))
        .layer(TraceLayer::new_for_http().make_span_with(DefaultMakeSpan::default()))
        .layer(CorsLayer::permissive())
        .with_state(app_state)
}
