//! Integration tests for the fetch and write-back pipeline
//!
//! Tests cover:
//! - Playlist listing pagination
//! - Track fetch pagination, feature batching and merge
//! - Missing-song labels
//! - Replace/append write-back batching
//! - Playlist creation

mod helpers;

use std::sync::atomic::Ordering;

use helpers::{features, local_track, playlist, track, Call, FakeCatalog};
use mixwheel_web::catalog::{CatalogError, NewPlaylist, MAX_ITEMS_PER_REQUEST, PAGE_LIMIT};
use mixwheel_web::pipeline::{
    create_and_fill, fetch_all_playlists, fetch_playlist_tracks, write_sequence, WriteMode,
};

fn uris(count: usize) -> Vec<String> {
    (0..count).map(|i| format!("spotify:track:t{}", i)).collect()
}

#[tokio::test]
async fn test_fetch_all_playlists_pages_until_empty() {
    let mut catalog = FakeCatalog::new();
    catalog.playlists = (0..120)
        .map(|i| playlist(&format!("pl{}", i), &format!("List {}", i), 0))
        .collect();

    let playlists = fetch_all_playlists(&catalog, "tok").await.unwrap();

    assert_eq!(playlists.len(), 120);
    assert_eq!(playlists[0].id, "pl0");
    assert_eq!(playlists[119].id, "pl119");
    assert_eq!(
        catalog.calls(),
        vec![
            Call::Playlists { limit: 50, offset: 0 },
            Call::Playlists { limit: 50, offset: 50 },
            Call::Playlists { limit: 50, offset: 100 },
            Call::Playlists { limit: 50, offset: 120 },
        ]
    );
}

#[tokio::test]
async fn test_fetch_all_playlists_empty_account() {
    let catalog = FakeCatalog::new();
    let playlists = fetch_all_playlists(&catalog, "tok").await.unwrap();
    assert!(playlists.is_empty());
    assert_eq!(catalog.calls().len(), 1);
}

#[tokio::test]
async fn test_fetch_playlist_tracks_merges_in_order() {
    let items = (0..130)
        .map(|i| Some(track(&format!("t{}", i), &format!("Song {}", i), &["Band"])))
        .collect();
    let catalog = FakeCatalog::new().with_playlist("big", "Big", items).with_features(
        (0..130)
            .map(|i| features(&format!("t{}", i), (i % 12) as i64, (i % 2) as i64, 100.0 + i as f64))
            .collect(),
    );

    let outcome = fetch_playlist_tracks(&catalog, "tok", "big").await.unwrap();

    assert_eq!(outcome.enriched.len(), 130);
    assert!(outcome.missing.is_empty());
    for (i, t) in outcome.enriched.iter().enumerate() {
        assert_eq!(t.id(), format!("t{}", i));
        assert_eq!(t.track.name, format!("Song {}", i));
        assert_eq!(t.tempo(), 100.0 + i as f64);
    }

    // 3 item pages plus the terminating empty page
    let item_pages: Vec<u32> = catalog
        .calls()
        .iter()
        .filter_map(|c| match c {
            Call::PlaylistItems { offset, limit, .. } => {
                assert_eq!(*limit, PAGE_LIMIT);
                Some(*offset)
            }
            _ => None,
        })
        .collect();
    assert_eq!(item_pages, vec![0, 50, 100, 130]);
}

#[tokio::test]
async fn test_feature_lookups_never_exceed_batch_limit() {
    let items = (0..260)
        .map(|i| Some(track(&format!("t{}", i), "Song", &["Band"])))
        .collect();
    let catalog = FakeCatalog::new()
        .with_playlist("big", "Big", items)
        .with_features((0..260).map(|i| features(&format!("t{}", i), 0, 1, 120.0)).collect());

    fetch_playlist_tracks(&catalog, "tok", "big").await.unwrap();

    let batches: Vec<usize> = catalog
        .calls()
        .iter()
        .filter_map(|c| match c {
            Call::AudioFeatures { ids } => Some(ids.len()),
            _ => None,
        })
        .collect();
    assert!(!batches.is_empty());
    assert!(batches.iter().all(|&n| n > 0 && n <= MAX_ITEMS_PER_REQUEST));
    assert_eq!(batches.iter().sum::<usize>(), 260);
}

#[tokio::test]
async fn test_missing_features_reported_with_labels() {
    let items = vec![
        Some(track("a", "Found", &["Solo"])),
        Some(track("b", "No Features", &["First", "Second"])),
        Some(local_track("Home Demo", "Me")),
        None,
        Some(track("c", "Also Found", &["Solo"])),
    ];
    let catalog = FakeCatalog::new()
        .with_playlist("mix", "Mix", items)
        .with_features(vec![features("a", 1, 1, 120.0), features("c", 2, 0, 110.0)]);

    let outcome = fetch_playlist_tracks(&catalog, "tok", "mix").await.unwrap();

    let ids: Vec<&str> = outcome.enriched.iter().map(|t| t.id()).collect();
    assert_eq!(ids, vec!["a", "c"]);
    assert_eq!(
        outcome.missing,
        vec![
            "First, Second - No Features".to_string(),
            "Me - Home Demo".to_string()
        ]
    );

    // Local tracks carry no id and are never sent to the lookup
    let looked_up: Vec<String> = catalog
        .calls()
        .into_iter()
        .filter_map(|c| match c {
            Call::AudioFeatures { ids } => Some(ids),
            _ => None,
        })
        .flatten()
        .collect();
    assert_eq!(looked_up, vec!["a", "b", "c"]);
}

#[tokio::test]
async fn test_duplicates_survive_fetch() {
    let items = vec![
        Some(track("a", "Twice", &["Band"])),
        Some(track("a", "Twice", &["Band"])),
    ];
    let catalog = FakeCatalog::new()
        .with_playlist("dup", "Dup", items)
        .with_features(vec![features("a", 5, 1, 124.0)]);

    let outcome = fetch_playlist_tracks(&catalog, "tok", "dup").await.unwrap();
    assert_eq!(outcome.enriched.len(), 2);
}

#[tokio::test]
async fn test_replace_clears_then_appends_in_batches() {
    let catalog = FakeCatalog::new();
    let sequence = uris(250);

    write_sequence(&catalog, "tok", "pl1", &sequence, WriteMode::Replace)
        .await
        .unwrap();

    let writes = catalog.writes();
    assert_eq!(writes.len(), 4);
    assert_eq!(
        writes[0],
        Call::Replace {
            playlist_id: "pl1".to_string(),
            uris: vec![]
        }
    );
    let mut written = Vec::new();
    for call in &writes[1..] {
        match call {
            Call::Add { playlist_id, uris } => {
                assert_eq!(playlist_id, "pl1");
                assert!(uris.len() <= MAX_ITEMS_PER_REQUEST);
                written.extend(uris.clone());
            }
            other => panic!("unexpected write {:?}", other),
        }
    }
    assert_eq!(written, sequence);
}

#[tokio::test]
async fn test_append_does_not_clear() {
    let catalog = FakeCatalog::new();
    write_sequence(&catalog, "tok", "pl1", &uris(3), WriteMode::Append)
        .await
        .unwrap();

    assert_eq!(
        catalog.writes(),
        vec![Call::Add {
            playlist_id: "pl1".to_string(),
            uris: uris(3)
        }]
    );
}

#[tokio::test]
async fn test_replace_with_empty_sequence_only_clears() {
    let catalog = FakeCatalog::new();
    write_sequence(&catalog, "tok", "pl1", &[], WriteMode::Replace)
        .await
        .unwrap();
    assert_eq!(catalog.writes().len(), 1);
}

#[tokio::test]
async fn test_create_and_fill() {
    let catalog = FakeCatalog::new();
    let new_playlist = NewPlaylist {
        name: "Organized".to_string(),
        description: "Sorted by key".to_string(),
        public: false,
        collaborative: false,
    };

    let created = create_and_fill(&catalog, "tok", &new_playlist, &uris(150))
        .await
        .unwrap();

    assert_eq!(created.id, "created1");
    let writes = catalog.writes();
    assert_eq!(
        writes[0],
        Call::CreatePlaylist {
            user_id: "listener".to_string(),
            playlist: new_playlist
        }
    );
    let added: Vec<usize> = writes[1..]
        .iter()
        .map(|c| match c {
            Call::Add { playlist_id, uris } => {
                assert_eq!(playlist_id, "created1");
                uris.len()
            }
            other => panic!("unexpected write {:?}", other),
        })
        .collect();
    assert_eq!(added, vec![100, 50]);
}

#[tokio::test]
async fn test_unauthorized_propagates() {
    let catalog = FakeCatalog::new().with_playlist("pl1", "One", vec![]);
    catalog.reject_tokens.store(true, Ordering::SeqCst);

    let result = fetch_playlist_tracks(&catalog, "expired", "pl1").await;
    assert!(matches!(result, Err(CatalogError::Unauthorized)));

    let result = write_sequence(&catalog, "expired", "pl1", &uris(1), WriteMode::Replace).await;
    assert!(matches!(result, Err(CatalogError::Unauthorized)));
    assert!(catalog.writes().is_empty());
}
