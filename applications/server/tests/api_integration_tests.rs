/// API integration tests
/// Tests complete HTTP request/response cycles with a real database
mod common;

use async_trait::async_trait;
use axum::http::StatusCode;
use common::{song_form, MultipartBody, TestApp};
use mockall::mock;
use musicify_core::{LookupArtist, MetadataLookup, MusicifyError, TrackMetadata};
use serde_json::{json, Value};
use std::sync::Arc;

mock! {
    pub Lookup {}

    #[async_trait]
    impl MetadataLookup for Lookup {
        async fn lookup(&self, track_ref: &str) -> musicify_core::Result<TrackMetadata>;
    }
}

async fn add_genre(app: &TestApp, name: &str) -> i64 {
    let (status, body) = app
        .post_json("/api/genre/add", json!({ "name": name }), None)
        .await;
    assert_eq!(status, StatusCode::OK, "{body}");
    body["genre"]["id"].as_i64().unwrap()
}

async fn get_genre(app: &TestApp, id: i64) -> Value {
    let (status, body) = app.get(&format!("/api/genre/list?id={id}"), None).await;
    assert_eq!(status, StatusCode::OK, "{body}");
    body["genre"].clone()
}

async fn add_artist(app: &TestApp, name: &str) -> i64 {
    let (status, body) = app
        .post_json("/api/artist/add", json!({ "name": name }), None)
        .await;
    assert_eq!(status, StatusCode::OK, "{body}");
    body["artist"]["id"].as_i64().unwrap()
}

async fn add_song(app: &TestApp, form: MultipartBody) -> Value {
    let (status, body) = app.post_multipart("/api/song/add", form).await;
    assert_eq!(status, StatusCode::OK, "{body}");
    assert_eq!(body["success"], true);
    body["song"].clone()
}

#[tokio::test]
async fn test_health() {
    let app = TestApp::new().await;

    let (status, body) = app.get("/api/health", None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["status"], "ok");
    assert_eq!(body["songs"], 0);
}

#[tokio::test]
async fn test_duplicate_genre_is_flagged() {
    let app = TestApp::new().await;
    add_genre(&app, "Hip-Hop").await;

    let (status, body) = app
        .post_json("/api/genre/add", json!({ "name": "  hip hop!!  " }), None)
        .await;

    assert_eq!(status, StatusCode::CONFLICT);
    assert_eq!(body["success"], false);
    assert_eq!(body["isDuplicate"], true);

    // Other failures are not flagged as duplicates
    let (status, body) = app
        .post_json("/api/genre/add", json!({ "name": "   " }), None)
        .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["success"], false);
    assert!(body.get("isDuplicate").is_none());

    let (_, body) = app.get("/api/genre/list", None).await;
    assert_eq!(body["genres"].as_array().unwrap().len(), 1);
}

#[tokio::test]
async fn test_genre_rename_collision() {
    let app = TestApp::new().await;
    add_genre(&app, "Rock").await;
    let jazz = add_genre(&app, "Jazz").await;

    let (status, body) = app
        .post_json("/api/genre/update", json!({ "id": jazz, "name": "ROCK" }), None)
        .await;
    assert_eq!(status, StatusCode::CONFLICT);
    assert_eq!(body["isDuplicate"], true);

    let (status, body) = app
        .post_json(
            "/api/genre/update",
            json!({ "id": jazz, "name": "Free Jazz", "bgColor": "#123456" }),
            None,
        )
        .await;
    assert_eq!(status, StatusCode::OK, "{body}");
    assert_eq!(body["genre"]["normalizedName"], "freejazz");
    assert_eq!(body["genre"]["bgColor"], "#123456");
}

#[tokio::test]
async fn test_add_song_multipart_registers_genres() {
    let app = TestApp::new().await;
    let pop = add_genre(&app, "Pop").await;
    let artist = add_artist(&app, "Nova").await;

    let song = add_song(
        &app,
        song_form("First Light")
            .text("artists", &artist.to_string())
            .text("genres", &pop.to_string())
            .text("newGenres", "[\"Synthwave\", \"pop\"]"),
    )
    .await;

    assert_eq!(song["name"], "First Light");
    assert_eq!(song["artistName"], "Nova");
    assert_eq!(song["duration"], "0:0");
    assert!(song["file"].as_str().unwrap().starts_with("/media/audio/"));
    assert!(song["image"].as_str().unwrap().starts_with("/media/images/"));

    let genres = song["genres"].as_array().unwrap();
    assert_eq!(genres.len(), 2, "\"pop\" reuses the existing genre");
    let song_id = song["id"].as_i64().unwrap();

    let pop_genre = get_genre(&app, pop).await;
    assert_eq!(pop_genre["songCount"], 1);
    assert_eq!(pop_genre["songList"], json!([song_id]));

    let (_, body) = app.get("/api/artist/list", None).await;
    assert_eq!(body["artists"][0]["genres"].as_array().unwrap().len(), 2);

    // Uploaded audio is served back
    let (status, bytes) = app.fetch_media(song["file"].as_str().unwrap()).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(bytes, b"fake audio bytes");
}

#[tokio::test]
async fn test_add_song_requires_audio() {
    let app = TestApp::new().await;

    let form = MultipartBody::new()
        .text("name", "Silent")
        .file("image", "cover.png", "image/png", b"img");
    let (status, body) = app.post_multipart("/api/song/add", form).await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["success"], false);
    assert_eq!(body["message"], "Audio file is required");

    let (_, body) = app.get("/api/song/list", None).await;
    assert!(body["songs"].as_array().unwrap().is_empty());
}

#[tokio::test]
async fn test_add_song_with_album_image() {
    let app = TestApp::new().await;

    let (status, body) = app
        .post_json(
            "/api/album/add",
            json!({ "name": "Blue", "image": "/media/images/blue.jpg" }),
            None,
        )
        .await;
    assert_eq!(status, StatusCode::OK, "{body}");
    let album_id = body["album"]["id"].as_i64().unwrap();

    let form = MultipartBody::new()
        .text("name", "Azure")
        .text("album", "Blue")
        .text("useAlbumImage", "true")
        .text("albumId", &album_id.to_string())
        .file("audio", "azure.mp3", "audio/mpeg", b"audio");
    let song = add_song(&app, form).await;
    assert_eq!(song["image"], "/media/images/blue.jpg");

    let form = MultipartBody::new()
        .text("name", "Nowhere")
        .text("useAlbumImage", "true")
        .text("albumId", "9999")
        .file("audio", "x.mp3", "audio/mpeg", b"audio");
    let (status, body) = app.post_multipart("/api/song/add", form).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["message"], "Album image not found");
}

#[tokio::test]
async fn test_update_song_moves_genre_references() {
    let app = TestApp::new().await;
    let a = add_genre(&app, "A").await;
    let b = add_genre(&app, "B").await;
    let c = add_genre(&app, "C").await;

    let song = add_song(
        &app,
        song_form("Shifting")
            .text("genres", &a.to_string())
            .text("genres", &b.to_string()),
    )
    .await;
    let song_id = song["id"].as_i64().unwrap();

    let (status, body) = app
        .post_json(
            "/api/song/update",
            json!({ "id": song_id, "genres": [b.to_string(), c] }),
            None,
        )
        .await;
    assert_eq!(status, StatusCode::OK, "{body}");
    assert_eq!(body["song"]["genres"], json!([b, c]));
    assert_eq!(body["song"]["name"], "Shifting");

    assert_eq!(get_genre(&app, a).await["songCount"], 0);
    assert_eq!(get_genre(&app, a).await["songList"], json!([]));
    assert_eq!(get_genre(&app, b).await["songCount"], 1);
    assert_eq!(get_genre(&app, c).await["songList"], json!([song_id]));
}

#[tokio::test]
async fn test_update_missing_song() {
    let app = TestApp::new().await;

    let (status, body) = app
        .post_json("/api/song/update", json!({ "id": 404, "name": "Ghost" }), None)
        .await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body["success"], false);

    let (status, body) = app
        .post_json("/api/song/update", json!({ "id": "not-a-number" }), None)
        .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["success"], false);
}

#[tokio::test]
async fn test_genre_lifecycle_end_to_end() {
    let app = TestApp::new().await;
    let pop = add_genre(&app, "Pop").await;
    assert_eq!(get_genre(&app, pop).await["songCount"], 0);

    let song = add_song(&app, song_form("S1").text("genres", &pop.to_string())).await;
    let s1 = song["id"].as_i64().unwrap();
    let pop_genre = get_genre(&app, pop).await;
    assert_eq!(pop_genre["songCount"], 1);
    assert_eq!(pop_genre["songList"], json!([s1]));

    let (status, body) = app
        .post_json(
            "/api/song/update",
            json!({ "id": s1, "genres": [], "newGenres": ["Rock"] }),
            None,
        )
        .await;
    assert_eq!(status, StatusCode::OK, "{body}");
    let rock = body["song"]["genres"][0].as_i64().unwrap();
    assert_eq!(get_genre(&app, pop).await["songCount"], 0);
    assert_eq!(get_genre(&app, rock).await["songCount"], 1);

    let (status, body) = app
        .post_json("/api/song/remove", json!({ "id": s1 }), None)
        .await;
    assert_eq!(status, StatusCode::OK, "{body}");
    let rock_genre = get_genre(&app, rock).await;
    assert_eq!(rock_genre["songCount"], 0);
    assert_eq!(rock_genre["songList"], json!([]));

    let (status, body) = app
        .post_json("/api/song/remove", json!({ "id": s1 }), None)
        .await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body["success"], false);
}

#[tokio::test]
async fn test_song_search() {
    let app = TestApp::new().await;
    let artist = add_artist(&app, "Marlow").await;
    add_song(&app, song_form("Harbor Lights").text("artists", &artist.to_string())).await;
    add_song(&app, song_form("Engine Room")).await;

    let (_, body) = app.get("/api/song/list?search=harbor", None).await;
    assert_eq!(body["songs"].as_array().unwrap().len(), 1);

    let (_, body) = app.get("/api/song/list?search=marlow", None).await;
    assert_eq!(body["songs"][0]["name"], "Harbor Lights");

    let (_, body) = app.get("/api/song/list", None).await;
    assert_eq!(body["songs"].as_array().unwrap().len(), 2);
}

#[tokio::test]
async fn test_album_removal_needs_confirmation() {
    let app = TestApp::new().await;
    let pop = add_genre(&app, "Pop").await;

    let (_, body) = app
        .post_json("/api/album/add", json!({ "name": "Test Album" }), None)
        .await;
    let album_id = body["album"]["id"].as_i64().unwrap();
    add_song(&app, song_form("Track One").text("genres", &pop.to_string())).await;

    let (status, body) = app
        .post_json("/api/album/remove", json!({ "id": album_id }), None)
        .await;
    assert_eq!(status, StatusCode::CONFLICT);
    assert_eq!(body["requiresConfirmation"], true);
    assert_eq!(body["songCount"], 1);

    let (status, body) = app
        .post_json(
            "/api/album/remove",
            json!({ "id": album_id, "confirmed": true }),
            None,
        )
        .await;
    assert_eq!(status, StatusCode::OK, "{body}");
    assert_eq!(body["removedSongs"], 1);

    let (_, body) = app.get("/api/song/list", None).await;
    assert!(body["songs"].as_array().unwrap().is_empty());
    assert_eq!(get_genre(&app, pop).await["songCount"], 0);
}

#[tokio::test]
async fn test_auth_callback() {
    let app = TestApp::new().await;
    let token = app.auth.create_token("user_abc").unwrap();

    let (status, _) = app
        .post_json("/api/auth/callback", json!({ "id": "user_abc" }), None)
        .await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);

    let (status, body) = app
        .post_json("/api/auth/callback", json!({ "id": "user_other" }), Some(&token))
        .await;
    assert_eq!(status, StatusCode::FORBIDDEN);
    assert_eq!(body["success"], false);

    let (status, body) = app
        .post_json(
            "/api/auth/callback",
            json!({ "id": "user_abc", "email": "a@example.com", "firstName": "Ada" }),
            Some(&token),
        )
        .await;
    assert_eq!(status, StatusCode::OK, "{body}");
    assert_eq!(body["user"]["clerkId"], "user_abc");
    assert_eq!(body["user"]["firstName"], "Ada");

    let (status, body) = app.get("/api/health", Some("garbage")).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
    assert_eq!(body["message"], "Invalid token");
}

#[tokio::test]
async fn test_list_users_excludes_caller() {
    let app = TestApp::new().await;
    let (_, token) = app.register("user_a").await;
    app.register("user_b").await;

    let (status, _) = app.get("/api/user", None).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);

    let (status, body) = app.get("/api/user", Some(&token)).await;
    assert_eq!(status, StatusCode::OK);
    let users = body["users"].as_array().unwrap();
    assert_eq!(users.len(), 1);
    assert_eq!(users[0]["clerkId"], "user_b");
}

#[tokio::test]
async fn test_playlist_permissions_and_songs() {
    let app = TestApp::new().await;
    let (_, owner) = app.register("owner").await;
    let (_, other) = app.register("other").await;
    let song = add_song(&app, song_form("Playlisted")).await;
    let song_id = song["id"].as_i64().unwrap();

    let (status, _) = app
        .post_json("/api/playlist/create", json!({ "name": "Mine" }), None)
        .await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);

    let (status, body) = app
        .post_json(
            "/api/playlist/create",
            json!({ "name": "Mine", "isPublic": false }),
            Some(&owner),
        )
        .await;
    assert_eq!(status, StatusCode::OK, "{body}");
    let playlist_id = body["playlist"]["id"].as_i64().unwrap();

    // Private: invisible and unreadable to others
    let (_, body) = app.get("/api/playlist/list", Some(&other)).await;
    assert!(body["playlists"].as_array().unwrap().is_empty());
    let (status, _) = app
        .get(&format!("/api/playlist/get?id={playlist_id}"), Some(&other))
        .await;
    assert_eq!(status, StatusCode::FORBIDDEN);

    let (status, body) = app
        .post_json(
            "/api/playlist/add-song",
            json!({ "playlistId": playlist_id, "songId": song_id }),
            Some(&other),
        )
        .await;
    assert_eq!(status, StatusCode::FORBIDDEN);
    assert_eq!(body["success"], false);

    let (status, body) = app
        .post_json(
            "/api/playlist/add-song",
            json!({ "playlistId": playlist_id, "songId": song_id }),
            Some(&owner),
        )
        .await;
    assert_eq!(status, StatusCode::OK, "{body}");

    let (status, body) = app
        .post_json(
            "/api/playlist/add-song",
            json!({ "playlistId": playlist_id, "songId": song_id }),
            Some(&owner),
        )
        .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["message"], "Song already in playlist");

    let (_, body) = app
        .get(&format!("/api/playlist/get?id={playlist_id}"), Some(&owner))
        .await;
    assert_eq!(body["playlist"]["songs"][0]["id"], song_id);

    let (_, body) = app.get("/api/playlist/list", Some(&owner)).await;
    assert_eq!(body["playlists"][0]["songCount"], 1);

    let (status, body) = app
        .post_json(
            "/api/playlist/remove-song",
            json!({ "playlistId": playlist_id, "songId": song_id }),
            Some(&owner),
        )
        .await;
    assert_eq!(status, StatusCode::OK, "{body}");

    let (status, body) = app
        .post_json(
            "/api/playlist/remove-song",
            json!({ "playlistId": playlist_id, "songId": song_id }),
            Some(&owner),
        )
        .await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body["success"], false);

    let (status, _) = app
        .post_json("/api/playlist/delete", json!({ "id": playlist_id }), Some(&other))
        .await;
    assert_eq!(status, StatusCode::FORBIDDEN);

    let (status, body) = app
        .post_json("/api/playlist/delete", json!({ "id": playlist_id }), Some(&owner))
        .await;
    assert_eq!(status, StatusCode::OK, "{body}");

    let (status, _) = app
        .get(&format!("/api/playlist/get?id={playlist_id}"), Some(&owner))
        .await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_playlist_reorder() {
    let app = TestApp::new().await;
    let (_, owner) = app.register("owner").await;
    let first = add_song(&app, song_form("First")).await["id"].as_i64().unwrap();
    let second = add_song(&app, song_form("Second")).await["id"].as_i64().unwrap();

    let (_, body) = app
        .post_json("/api/playlist/create", json!({ "name": "Order" }), Some(&owner))
        .await;
    let playlist_id = body["playlist"]["id"].as_i64().unwrap();
    for song_id in [first, second] {
        app.post_json(
            "/api/playlist/add-song",
            json!({ "playlistId": playlist_id, "songId": song_id }),
            Some(&owner),
        )
        .await;
    }

    let (status, body) = app
        .post_json(
            "/api/playlist/reorder-songs",
            json!({ "playlistId": playlist_id, "songIds": [first] }),
            Some(&owner),
        )
        .await;
    assert_eq!(status, StatusCode::BAD_REQUEST, "{body}");

    let (status, body) = app
        .post_json(
            "/api/playlist/reorder-songs",
            json!({ "playlistId": playlist_id, "songIds": [second, first] }),
            Some(&owner),
        )
        .await;
    assert_eq!(status, StatusCode::OK, "{body}");

    // Public playlists are readable anonymously
    let (_, body) = app
        .get(&format!("/api/playlist/get?id={playlist_id}"), None)
        .await;
    assert_eq!(body["playlist"]["songs"][0]["id"], second);
    assert_eq!(body["playlist"]["songs"][1]["id"], first);
}

#[tokio::test]
async fn test_add_song_from_spotify() {
    let mut lookup = MockLookup::new();
    lookup
        .expect_lookup()
        .withf(|track_ref| track_ref.to_string() == "4uLU6hMCjMI75M1A2tKUQC")
        .times(1)
        .returning(|_| {
            Ok(TrackMetadata {
                title: "Looked Up".to_string(),
                artists: vec![
                    LookupArtist {
                        name: "Duo One".to_string(),
                        image_url: Some("https://img/duo.jpg".to_string()),
                    },
                    LookupArtist {
                        name: "Duo Two".to_string(),
                        image_url: None,
                    },
                ],
                image_url: Some("https://img/cover.jpg".to_string()),
                duration_ms: Some(185_000),
            })
        });

    let app = TestApp::with_metadata(Arc::new(lookup)).await;
    let existing = add_artist(&app, "duo one").await;

    let form = MultipartBody::new()
        .text(
            "spotifyUrl",
            "https://open.spotify.com/track/4uLU6hMCjMI75M1A2tKUQC?si=abc",
        )
        .file("audio", "rip.mp3", "audio/mpeg", b"audio");
    let song = add_song(&app, form).await;

    assert_eq!(song["name"], "Looked Up");
    assert_eq!(song["album"], "none");
    assert_eq!(song["image"], "https://img/cover.jpg");
    assert_eq!(song["duration"], "3:5");
    assert_eq!(song["artists"][0], existing, "artist matched case-insensitively");
    assert_eq!(song["artistName"], "duo one, Duo Two");

    let (_, body) = app.get("/api/artist/list", None).await;
    assert_eq!(body["artists"].as_array().unwrap().len(), 2);
}

#[tokio::test]
async fn test_spotify_errors() {
    let mut lookup = MockLookup::new();
    lookup
        .expect_lookup()
        .returning(|id| Err(MusicifyError::not_found("Track", id)));
    let app = TestApp::with_metadata(Arc::new(lookup)).await;

    let form = MultipartBody::new()
        .text("spotifyUrl", "https://open.spotify.com/album/xyz")
        .file("audio", "rip.mp3", "audio/mpeg", b"audio");
    let (status, body) = app.post_multipart("/api/song/add", form).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["message"], "Invalid Spotify URL");

    let form = MultipartBody::new()
        .text("spotifyUrl", "https://open.spotify.com/track/missing1")
        .file("audio", "rip.mp3", "audio/mpeg", b"audio");
    let (status, body) = app.post_multipart("/api/song/add", form).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body["success"], false);

    // Without a configured lookup the link is refused outright
    let plain = TestApp::new().await;
    let form = MultipartBody::new()
        .text("spotifyUrl", "https://open.spotify.com/track/abc")
        .file("audio", "rip.mp3", "audio/mpeg", b"audio");
    let (status, _) = plain.post_multipart("/api/song/add", form).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
}

#[tokio::test(flavor = "multi_thread", worker_threads = 2)]
async fn test_catalog_handlers_run_on_spawned_tasks() {
    use axum::{extract::State, Json};
    use musicify_server::{api, forms::RequestForm};

    let app = TestApp::new().await;
    let form = |value: Value| RequestForm::from_json(value).unwrap();

    let Json(body) = tokio::spawn(api::genres::add_genre(
        State(app.state.clone()),
        form(json!({ "name": "Pop" })),
    ))
    .await
    .unwrap()
    .unwrap();
    let pop = body["genre"]["id"].as_i64().unwrap();

    let song = add_song(&app, song_form("Spawned").text("genres", &pop.to_string())).await;
    let song_id = song["id"].as_i64().unwrap();

    let Json(body) = tokio::spawn(api::genres::update_genre(
        State(app.state.clone()),
        form(json!({ "id": pop, "bgColor": "#ff00ff" })),
    ))
    .await
    .unwrap()
    .unwrap();
    assert_eq!(body["genre"]["bgColor"], "#ff00ff");

    let Json(body) = tokio::spawn(api::songs::update_song(
        State(app.state.clone()),
        form(json!({ "id": song_id, "newGenres": ["Fresh"] })),
    ))
    .await
    .unwrap()
    .unwrap();
    assert_eq!(body["song"]["genres"].as_array().unwrap().len(), 2);
    assert_eq!(get_genre(&app, pop).await["songCount"], 1);

    let Json(body) = tokio::spawn(api::songs::remove_song(
        State(app.state.clone()),
        form(json!({ "id": song_id })),
    ))
    .await
    .unwrap()
    .unwrap();
    assert_eq!(body["success"], true);
    assert_eq!(get_genre(&app, pop).await["songCount"], 0);

    let (_, body) = app
        .post_json("/api/album/add", json!({ "name": "Test Album" }), None)
        .await;
    let album = body["album"]["id"].as_i64().unwrap();
    add_song(&app, song_form("Filed")).await;

    let Json(body) = tokio::spawn(api::albums::remove_album(
        State(app.state.clone()),
        form(json!({ "id": album, "confirmed": true })),
    ))
    .await
    .unwrap()
    .unwrap();
    assert_eq!(body["removedSongs"], 1);
}
