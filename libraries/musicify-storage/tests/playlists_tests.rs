//! Integration tests for playlists vertical slice
//!
//! Tests playlist operations including:
//! - CRUD with creator ownership
//! - Visibility of public and private playlists
//! - Song ordering and reordering


use musicify_core::{types::*, MusicifyError};
use test_helpers::*;

#[tokio::test]
async fn test_create_and_get_playlist() {
    let test_db = TestDb::new().await;
    let pool = test_db.pool();

    let user_id = create_test_user(pool, "user_alice").await;

    let playlist = musicify_storage::playlists::create(
        pool,
        CreatePlaylist {
            name: " Road Trip ".to_string(),
            description: "Long drives".to_string(),
            image: None,
            creator: user_id,
            is_public: false,
        },
    )
    .await
    .expect("Failed to create playlist");

    assert_eq!(playlist.name, "Road Trip");
    assert_eq!(playlist.creator, user_id);
    assert!(!playlist.is_public);
    assert_eq!(playlist.song_count, 0);

    let detail = musicify_storage::playlists::get_with_songs(pool, playlist.id)
        .await
        .unwrap()
        .unwrap();
    assert_eq!(detail.description, "Long drives");
    assert!(detail.songs.is_empty());

    assert!(musicify_storage::playlists::get_with_songs(pool, 999)
        .await
        .unwrap()
        .is_none());
}

#[tokio::test]
async fn test_create_requires_name() {
    let test_db = TestDb::new().await;
    let pool = test_db.pool();

    let user_id = create_test_user(pool, "user_alice").await;
    let result = musicify_storage::playlists::create(
        pool,
        CreatePlaylist {
            name: "   ".to_string(),
            description: String::new(),
            image: None,
            creator: user_id,
            is_public: true,
        },
    )
    .await;

    assert!(matches!(result, Err(MusicifyError::Validation(_))));
}

#[tokio::test]
async fn test_visibility() {
    let test_db = TestDb::new().await;
    let pool = test_db.pool();

    let alice = create_test_user(pool, "user_alice").await;
    let bob = create_test_user(pool, "user_bob").await;

    let public = create_test_playlist(pool, "Public", alice, true).await;
    let private = create_test_playlist(pool, "Private", alice, false).await;

    let ids = |list: Vec<PlaylistSummary>| list.into_iter().map(|p| p.id).collect::<Vec<_>>();

    let for_alice = ids(musicify_storage::playlists::get_visible(pool, Some(alice)).await.unwrap());
    assert!(for_alice.contains(&public));
    assert!(for_alice.contains(&private));

    let for_bob = ids(musicify_storage::playlists::get_visible(pool, Some(bob)).await.unwrap());
    assert_eq!(for_bob, vec![public]);

    let anonymous = ids(musicify_storage::playlists::get_visible(pool, None).await.unwrap());
    assert_eq!(anonymous, vec![public]);
}

#[tokio::test]
async fn test_add_and_remove_songs() {
    let test_db = TestDb::new().await;
    let pool = test_db.pool();

    let user = create_test_user(pool, "user_alice").await;
    let playlist = create_test_playlist(pool, "Mix", user, true).await;
    let first = create_test_song(pool, "First", &[], &[]).await;
    let second = create_test_song(pool, "Second", &[], &[]).await;

    assert!(musicify_storage::playlists::add_song(pool, playlist, first.id).await.unwrap());
    assert!(musicify_storage::playlists::add_song(pool, playlist, second.id).await.unwrap());
    assert!(!musicify_storage::playlists::add_song(pool, playlist, first.id).await.unwrap());

    let missing = musicify_storage::playlists::add_song(pool, playlist, 9999).await;
    assert!(matches!(missing, Err(MusicifyError::SongNotFound(9999))));

    let detail = musicify_storage::playlists::get_with_songs(pool, playlist)
        .await
        .unwrap()
        .unwrap();
    let order: Vec<SongId> = detail.songs.iter().map(|s| s.id).collect();
    assert_eq!(order, vec![first.id, second.id]);

    assert!(musicify_storage::playlists::remove_song(pool, playlist, first.id).await.unwrap());
    assert!(!musicify_storage::playlists::remove_song(pool, playlist, first.id).await.unwrap());

    let summary = musicify_storage::playlists::get_summary(pool, playlist)
        .await
        .unwrap()
        .unwrap();
    assert_eq!(summary.song_count, 1);
}

#[tokio::test]
async fn test_reorder_songs() {
    let test_db = TestDb::new().await;
    let pool = test_db.pool();

    let user = create_test_user(pool, "user_alice").await;
    let playlist = create_test_playlist(pool, "Ordered", user, true).await;
    let mut ids = Vec::new();
    for name in ["A", "B", "C"] {
        let song = create_test_song(pool, name, &[], &[]).await;
        musicify_storage::playlists::add_song(pool, playlist, song.id)
            .await
            .unwrap();
        ids.push(song.id);
    }

    musicify_storage::playlists::reorder(pool, playlist, &vec![ids[2], ids[0], ids[1]].into())
        .await
        .unwrap();

    let detail = musicify_storage::playlists::get_with_songs(pool, playlist)
        .await
        .unwrap()
        .unwrap();
    let order: Vec<SongId> = detail.songs.iter().map(|s| s.id).collect();
    assert_eq!(order, vec![ids[2], ids[0], ids[1]]);

    // Not a permutation of the current songs
    let partial =
        musicify_storage::playlists::reorder(pool, playlist, &vec![ids[0], ids[1]].into()).await;
    assert!(matches!(partial, Err(MusicifyError::Validation(_))));

    let foreign =
        musicify_storage::playlists::reorder(pool, playlist, &vec![ids[0], ids[1], 4242].into())
            .await;
    assert!(matches!(foreign, Err(MusicifyError::Validation(_))));
}

#[tokio::test]
async fn test_update_and_delete_playlist() {
    let test_db = TestDb::new().await;
    let pool = test_db.pool();

    let user = create_test_user(pool, "user_alice").await;
    let playlist = create_test_playlist(pool, "Draft", user, true).await;

    let updated = musicify_storage::playlists::update(
        pool,
        playlist,
        UpdatePlaylist {
            name: Some("Final".to_string()),
            is_public: Some(false),
            ..Default::default()
        },
    )
    .await
    .unwrap();
    assert_eq!(updated.name, "Final");
    assert!(!updated.is_public);

    musicify_storage::playlists::delete(pool, playlist).await.unwrap();
    assert!(musicify_storage::playlists::get_summary(pool, playlist)
        .await
        .unwrap()
        .is_none());

    let again = musicify_storage::playlists::delete(pool, playlist).await;
    assert!(matches!(again, Err(MusicifyError::NotFound { .. })));
}
