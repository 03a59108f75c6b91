use musicify_core::{types::*, MusicifyError};

use test_helpers::*;

#[tokio::test]
async fn test_create_and_get_genre() {
    let test_db = TestDb::new().await;
    let pool = test_db.pool();

    let genre = musicify_storage::genres::create(
        pool,
        CreateGenre {
            name: "  Hip-Hop ".to_string(),
            bg_color: Some("#ff8800".to_string()),
        },
    )
    .await
    .unwrap();

    assert_eq!(genre.name, "Hip-Hop");
    assert_eq!(genre.normalized_name, "hiphop");
    assert_eq!(genre.bg_color, "#ff8800");
    assert_eq!(genre.song_count, 0);
    assert!(genre.song_list.is_empty());

    let fetched = musicify_storage::genres::get_by_id(pool, genre.id)
        .await
        .unwrap()
        .unwrap();
    assert_eq!(fetched, genre);
}

#[tokio::test]
async fn test_default_color() {
    let test_db = TestDb::new().await;
    let pool = test_db.pool();

    let genre = musicify_storage::genres::create(pool, CreateGenre::named("Rock"))
        .await
        .unwrap();
    assert_eq!(genre.bg_color, "#000000");
}

#[tokio::test]
async fn test_duplicate_after_normalization() {
    let test_db = TestDb::new().await;
    let pool = test_db.pool();

    create_test_genre(pool, "Hip Hop").await;

    for variant in ["hip-hop", "HIPHOP", " Hip.Hop! "] {
        let result = musicify_storage::genres::create(pool, CreateGenre::named(variant)).await;
        match result {
            Err(MusicifyError::DuplicateName(existing)) => assert_eq!(existing, "Hip Hop"),
            other => panic!("expected duplicate for {variant:?}, got {other:?}"),
        }
    }

    let all = musicify_storage::genres::get_all(pool).await.unwrap();
    assert_eq!(all.len(), 1);
}

#[tokio::test]
async fn test_create_rejects_name_without_letters() {
    let test_db = TestDb::new().await;
    let pool = test_db.pool();

    let result = musicify_storage::genres::create(pool, CreateGenre::named("--!!--")).await;
    assert!(matches!(result, Err(MusicifyError::Validation(_))));
}

#[tokio::test]
async fn test_update_genre() {
    let test_db = TestDb::new().await;
    let pool = test_db.pool();

    let jazz = create_test_genre(pool, "Jazz").await;
    let rock = create_test_genre(pool, "Rock").await;

    // Renaming to a case variant of itself is allowed
    let renamed = musicify_storage::genres::update(
        pool,
        jazz,
        UpdateGenre {
            name: Some("JAZZ".to_string()),
            bg_color: None,
        },
    )
    .await
    .unwrap();
    assert_eq!(renamed.name, "JAZZ");
    assert_eq!(renamed.normalized_name, "jazz");

    let clash = musicify_storage::genres::update(
        pool,
        jazz,
        UpdateGenre {
            name: Some("rock!".to_string()),
            bg_color: None,
        },
    )
    .await;
    assert!(matches!(clash, Err(MusicifyError::DuplicateName(_))));

    let recolored = musicify_storage::genres::update(
        pool,
        rock,
        UpdateGenre {
            name: None,
            bg_color: Some("#123456".to_string()),
        },
    )
    .await
    .unwrap();
    assert_eq!(recolored.name, "Rock");
    assert_eq!(recolored.bg_color, "#123456");

    let missing = musicify_storage::genres::update(pool, 999, UpdateGenre::default()).await;
    assert!(matches!(missing, Err(MusicifyError::NotFound { .. })));
}

#[tokio::test]
async fn test_attach_and_detach_song_keep_count_in_step() {
    let test_db = TestDb::new().await;
    let pool = test_db.pool();

    let genre = create_test_genre(pool, "Pop").await;
    let mut conn = pool.acquire().await.unwrap();

    assert!(musicify_storage::genres::attach_song(&mut conn, genre, 10).await.unwrap());
    assert!(musicify_storage::genres::attach_song(&mut conn, genre, 11).await.unwrap());
    // Add-to-set: repeat attaches change nothing
    assert!(!musicify_storage::genres::attach_song(&mut conn, genre, 10).await.unwrap());

    let fetched = get_genre(pool, genre).await;
    assert_eq!(fetched.song_list, vec![10, 11]);
    assert_eq!(fetched.song_count, 2);

    assert!(musicify_storage::genres::detach_song(&mut conn, genre, 10).await.unwrap());
    assert!(!musicify_storage::genres::detach_song(&mut conn, genre, 10).await.unwrap());

    let fetched = get_genre(pool, genre).await;
    assert_eq!(fetched.song_list, vec![11]);
    assert_eq!(fetched.song_count, 1);
}

#[tokio::test]
async fn test_delete_genre_untags_songs() {
    let test_db = TestDb::new().await;
    let pool = test_db.pool();

    let pop = create_test_genre(pool, "Pop").await;
    let rock = create_test_genre(pool, "Rock").await;
    let artist = create_test_artist(pool, "Shared").await;
    let song = create_test_song(pool, "Tagged", &[artist], &[pop, rock]).await;

    musicify_storage::genres::delete(pool, pop).await.unwrap();

    assert_eq!(get_song(pool, song.id).await.unwrap().genres, vec![rock]);
    assert_eq!(get_artist(pool, artist).await.genres, vec![rock]);
    assert!(musicify_storage::genres::get_by_id(pool, pop).await.unwrap().is_none());

    let again = musicify_storage::genres::delete(pool, pop).await;
    assert!(matches!(again, Err(MusicifyError::NotFound { .. })));
}

#[tokio::test]
async fn test_unique_violations_map_by_index() {
    let test_db = TestDb::new().await;
    let pool = test_db.pool();

    create_test_genre(pool, "Hip Hop").await;

    // Past the explicit check, straight into the unique index
    let genre_clash =
        sqlx::query("INSERT INTO genres (name, normalized_name) VALUES ('HIP-HOP', 'hiphop')")
            .execute(pool)
            .await
            .unwrap_err();
    assert!(matches!(
        MusicifyError::from(genre_clash),
        MusicifyError::DuplicateName(_)
    ));

    create_test_user(pool, "user_1").await;
    let user_clash = sqlx::query("INSERT INTO users (clerk_id) VALUES ('user_1')")
        .execute(pool)
        .await
        .unwrap_err();
    let err = MusicifyError::from(user_clash);
    assert!(matches!(err, MusicifyError::Database(_)));
    assert!(!err.is_duplicate());
}
