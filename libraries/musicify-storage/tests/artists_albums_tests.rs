//! Integration tests for artists, albums, songs and users slices
//!
//! Tests:
//! - Artist and album CRUD
//! - Case-insensitive artist lookup
//! - Song listing order and search
//! - User upsert from auth callbacks


use musicify_core::{types::*, MusicifyError};
use test_helpers::*;

// ============================================================================
// Artist Tests
// ============================================================================

#[tokio::test]
async fn test_create_and_update_artist() {
    let test_db = TestDb::new().await;
    let pool = test_db.pool();

    let artist = musicify_storage::artists::create(
        pool,
        CreateArtist {
            name: "Nina".to_string(),
            image: "/media/images/nina.jpg".to_string(),
            bg_color: None,
        },
    )
    .await
    .unwrap();

    assert_eq!(artist.name, "Nina");
    assert_eq!(artist.bg_color, "#e0e0e0");
    assert!(artist.genres.is_empty());

    let updated = musicify_storage::artists::update(
        pool,
        artist.id,
        UpdateArtist {
            name: Some("Nina S.".to_string()),
            ..Default::default()
        },
    )
    .await
    .unwrap();
    assert_eq!(updated.name, "Nina S.");
    assert_eq!(updated.image, "/media/images/nina.jpg");
}

#[tokio::test]
async fn test_find_or_create_artist_by_name() {
    let test_db = TestDb::new().await;
    let pool = test_db.pool();

    let existing = create_test_artist(pool, "Daft Punk").await;

    let found = musicify_storage::artists::find_or_create_by_name(pool, "daft punk", None)
        .await
        .unwrap();
    assert_eq!(found.id, existing);

    let created = musicify_storage::artists::find_or_create_by_name(
        pool,
        "Air",
        Some("https://img.example/air.jpg"),
    )
    .await
    .unwrap();
    assert_ne!(created.id, existing);
    assert_eq!(created.image, "https://img.example/air.jpg");
}

#[tokio::test]
async fn test_delete_artist_keeps_song_artist_name() {
    let test_db = TestDb::new().await;
    let pool = test_db.pool();

    let artist = create_test_artist(pool, "Departed").await;
    let song = create_test_song(pool, "Legacy", &[artist], &[]).await;

    musicify_storage::artists::delete(pool, artist).await.unwrap();

    let song = get_song(pool, song.id).await.unwrap();
    assert!(song.artists.is_empty());
    assert_eq!(song.artist_name, "Departed");
}

// ============================================================================
// Album Tests
// ============================================================================

#[tokio::test]
async fn test_album_crud() {
    let test_db = TestDb::new().await;
    let pool = test_db.pool();

    let album = musicify_storage::albums::create(
        pool,
        CreateAlbum {
            name: "Discovery".to_string(),
            desc: "2001".to_string(),
            image: String::new(),
            bg_color: None,
        },
    )
    .await
    .unwrap();
    assert_eq!(album.desc, "2001");
    assert_eq!(album.bg_color, "#121212");

    let updated = musicify_storage::albums::update(
        pool,
        album.id,
        UpdateAlbum {
            desc: Some("Second studio album".to_string()),
            ..Default::default()
        },
    )
    .await
    .unwrap();
    assert_eq!(updated.name, "Discovery");
    assert_eq!(updated.desc, "Second studio album");

    let blank = musicify_storage::albums::create(
        pool,
        CreateAlbum {
            name: " ".to_string(),
            desc: String::new(),
            image: String::new(),
            bg_color: None,
        },
    )
    .await;
    assert!(matches!(blank, Err(MusicifyError::Validation(_))));

    musicify_storage::albums::delete(pool, album.id).await.unwrap();
    assert!(musicify_storage::albums::get_by_id(pool, album.id)
        .await
        .unwrap()
        .is_none());
}

#[tokio::test]
async fn test_song_ids_by_album() {
    let test_db = TestDb::new().await;
    let pool = test_db.pool();

    let a = create_test_song(pool, "One", &[], &[]).await;
    let b = create_test_song(pool, "Two", &[], &[]).await;

    // create_test_song files every song under "Test Album"
    let ids = musicify_storage::songs::ids_by_album(pool, "Test Album")
        .await
        .unwrap();
    assert_eq!(ids, vec![a.id, b.id]);
    assert!(musicify_storage::songs::ids_by_album(pool, "Nope")
        .await
        .unwrap()
        .is_empty());
}

// ============================================================================
// Song listing
// ============================================================================

#[tokio::test]
async fn test_list_songs_newest_first_with_search() {
    let test_db = TestDb::new().await;
    let pool = test_db.pool();

    let artist = create_test_artist(pool, "Searchable").await;
    let first = create_test_song(pool, "Morning", &[], &[]).await;
    let second = create_test_song(pool, "Evening", &[artist], &[]).await;
    let third = create_test_song(pool, "100% Night", &[], &[]).await;

    let all = musicify_storage::songs::list(pool, None).await.unwrap();
    let ids: Vec<SongId> = all.iter().map(|s| s.id).collect();
    assert_eq!(ids, vec![third.id, second.id, first.id]);

    let by_name = musicify_storage::songs::list(pool, Some("morn")).await.unwrap();
    assert_eq!(by_name.len(), 1);
    assert_eq!(by_name[0].id, first.id);

    let by_artist = musicify_storage::songs::list(pool, Some("SEARCH")).await.unwrap();
    assert_eq!(by_artist.len(), 1);
    assert_eq!(by_artist[0].id, second.id);

    let literal_percent = musicify_storage::songs::list(pool, Some("100%")).await.unwrap();
    assert_eq!(literal_percent.len(), 1);

    let blank = musicify_storage::songs::list(pool, Some("  ")).await.unwrap();
    assert_eq!(blank.len(), 3);
}

// ============================================================================
// User Tests
// ============================================================================

#[tokio::test]
async fn test_upsert_user() {
    let test_db = TestDb::new().await;
    let pool = test_db.pool();

    let created = musicify_storage::users::upsert(
        pool,
        UpsertUser {
            clerk_id: "user_123".to_string(),
            email: Some("a@example.com".to_string()),
            first_name: Some("Ada".to_string()),
            ..Default::default()
        },
    )
    .await
    .unwrap();
    assert_eq!(created.display_name(), "Ada");

    let refreshed = musicify_storage::users::upsert(
        pool,
        UpsertUser {
            clerk_id: "user_123".to_string(),
            last_name: Some("Lovelace".to_string()),
            ..Default::default()
        },
    )
    .await
    .unwrap();

    assert_eq!(refreshed.id, created.id);
    assert_eq!(refreshed.email.as_deref(), Some("a@example.com"));
    assert_eq!(refreshed.display_name(), "Ada Lovelace");
    assert_eq!(musicify_storage::users::get_all(pool).await.unwrap().len(), 1);

    let blank = musicify_storage::users::upsert(pool, UpsertUser::default()).await;
    assert!(matches!(blank, Err(MusicifyError::Validation(_))));
}
