mod common;

use std::{collections::HashSet, sync::Arc};

use axum::{Router, routing::get};
use plugtify::{
    Error,
    spotify::{
        ApiClient, RecommendationEngine,
        recommendations::{
            SEED_COUNT, TargetProfile, dedupe_against_history, sample_distinct, select_seeds,
        },
    },
};
use rand::{Rng, SeedableRng, rngs::StdRng};
use serde_json::json;

use common::*;

fn engine(base: &str) -> RecommendationEngine {
    RecommendationEngine::new(Arc::new(ApiClient::new(config(base)).unwrap()))
}

fn history_of(ids: &[&str]) -> Vec<plugtify::types::Track> {
    ids.iter()
        .map(|id| track(id, 50, Some(features(id, 0.5))))
        .collect()
}

#[test]
fn test_target_profile_means_and_floor_popularity() {
    let history = vec![
        track("a", 41, Some(features("a", 0.2))),
        track("b", 50, Some(features("b", 0.4))),
        track("c", 99, None),
    ];

    let profile = TargetProfile::from_history(&history).unwrap();

    assert!((profile.energy - 0.3).abs() < 1e-9);
    assert!((profile.valence - 0.3).abs() < 1e-9);
    // (41 + 50) / 2 = 45.5, the track without features is ignored
    assert_eq!(profile.min_popularity, 45);

    let query = profile.query();
    assert_eq!(query.len(), 8);
    assert!(query.contains(&("min_popularity", "45".to_string())));
}

#[test]
fn test_target_profile_without_features_is_empty_history() {
    assert!(matches!(
        TargetProfile::from_history(&[]),
        Err(Error::EmptyHistory)
    ));
    assert!(matches!(
        TargetProfile::from_history(&[track("a", 10, None)]),
        Err(Error::EmptyHistory)
    ));
}

#[test]
fn test_short_history_seeds_with_most_recent_track() {
    let history = history_of(&["h1", "h2", "h3"]);
    let mut rng = StdRng::seed_from_u64(7);
    let mut untouched = rng.clone();

    let seeds = select_seeds(&history, &mut rng);

    assert_eq!(seeds, vec!["h1"]);
    assert_eq!(rng.random::<u64>(), untouched.random::<u64>());
}

#[test]
fn test_empty_history_has_no_seeds() {
    let mut rng = StdRng::seed_from_u64(7);
    assert!(select_seeds(&[], &mut rng).is_empty());
}

#[test]
fn test_long_history_seeds_are_distinct_history_ids() {
    let ids: Vec<String> = (0..12).map(|i| format!("t{i}")).collect();
    let refs: Vec<&str> = ids.iter().map(String::as_str).collect();
    let history = history_of(&refs);

    for seed in 0..50 {
        let mut rng = StdRng::seed_from_u64(seed);
        let seeds = select_seeds(&history, &mut rng);

        assert_eq!(seeds.len(), SEED_COUNT);
        let distinct: HashSet<&String> = seeds.iter().collect();
        assert_eq!(distinct.len(), SEED_COUNT);
        assert!(seeds.iter().all(|s| ids.contains(s)));
    }
}

#[test]
fn test_repetitive_history_uses_all_distinct_ids() {
    let refs: Vec<&str> = ["a", "b", "c"].iter().cycle().take(12).copied().collect();
    let history = history_of(&refs);
    let mut rng = StdRng::seed_from_u64(1);

    assert_eq!(select_seeds(&history, &mut rng), vec!["a", "b", "c"]);
}

#[test]
fn test_sample_distinct_draw_count_stays_small() {
    let candidates: Vec<String> = (0..10).map(|i| format!("t{i}")).collect();
    let refs: Vec<&str> = candidates.iter().map(String::as_str).collect();

    let mut total = 0;
    for seed in 0..200 {
        let mut rng = StdRng::seed_from_u64(seed);
        let draw = sample_distinct(&refs, 5, &mut rng);
        assert_eq!(draw.ids.len(), 5);
        assert!(draw.draws >= 5);
        total += draw.draws;
    }

    // coupon collector expectation for 5 of 10 is about 6.5 draws
    assert!(total / 200 < 8, "average draws too high: {}", total / 200);
}

#[test]
#[should_panic(expected = "distinct candidates")]
fn test_sample_distinct_requires_enough_candidates() {
    let mut rng = StdRng::seed_from_u64(3);
    sample_distinct(&["a", "b", "a", "b"], 5, &mut rng);
}

#[test]
fn test_dedupe_against_history_keeps_order() {
    let history = history_of(&["h1", "h2"]);
    let recommended = vec![
        track("r1", 10, None),
        track("h2", 10, None),
        track("r2", 10, None),
        track("h1", 10, None),
    ];

    let fresh = dedupe_against_history(recommended, &history);

    let ids: Vec<&str> = fresh.iter().map(|t| t.id.as_str()).collect();
    assert_eq!(ids, vec!["r1", "r2"]);
}

#[tokio::test]
async fn test_suggested_playlist_flow() {
    let router = Router::new()
        .route(
            "/me/player/recently-played",
            get(reply(200, history_json(&["h1", "h2", "h3"]))),
        )
        .route("/tracks", get(tracks_by_ids))
        .route("/audio-features", get(features_by_ids))
        .route(
            "/recommendations",
            get(reply(
                200,
                json!({ "tracks": [track_json("h2"), track_json("r1"), track_json("r2")] }),
            )),
        );
    let (base, calls) = spawn(router).await;
    let mut rng = StdRng::seed_from_u64(42);

    let envelope = engine(&base)
        .get_suggested_playlist_with(&fresh_token(), &mut rng)
        .await
        .unwrap();

    assert_eq!(envelope.status, 200);
    let ids: Vec<&str> = envelope.body.iter().map(|t| t.id.as_str()).collect();
    assert_eq!(ids, vec!["r1", "r2"]);

    assert_eq!(
        calls.sequence(),
        vec![
            "GET /me/player/recently-played",
            "GET /tracks",
            "GET /audio-features",
            "GET /recommendations",
            "GET /tracks"
        ]
    );

    let recommendation = calls.to("GET", "/recommendations").remove(0);
    let query = &recommendation.query;
    assert_eq!(query.get("limit").map(String::as_str), Some("50"));
    assert_eq!(query.get("seed_tracks").map(String::as_str), Some("h1"));
    assert_eq!(query.get("target_energy").map(String::as_str), Some("0.5"));
    assert_eq!(query.get("min_popularity").map(String::as_str), Some("50"));

    let refetch = calls.to("GET", "/tracks").remove(1);
    assert_eq!(refetch.query.get("ids").map(String::as_str), Some("r1,r2"));
}

#[tokio::test]
async fn test_all_recommendations_already_heard() {
    let router = Router::new()
        .route(
            "/me/player/recently-played",
            get(reply(200, history_json(&["h1", "h2"]))),
        )
        .route("/tracks", get(tracks_by_ids))
        .route("/audio-features", get(features_by_ids))
        .route(
            "/recommendations",
            get(reply(200, json!({ "tracks": [track_json("h1")] }))),
        );
    let (base, calls) = spawn(router).await;
    let mut rng = StdRng::seed_from_u64(42);

    let envelope = engine(&base)
        .get_suggested_playlist_with(&fresh_token(), &mut rng)
        .await
        .unwrap();

    assert!(envelope.body.is_empty());
    assert_eq!(calls.to("GET", "/tracks").len(), 1);
}

#[tokio::test]
async fn test_history_without_features_is_empty_history() {
    let router = Router::new()
        .route(
            "/me/player/recently-played",
            get(reply(200, history_json(&["h1"]))),
        )
        .route("/tracks", get(tracks_by_ids))
        .route(
            "/audio-features",
            get(reply(200, json!({ "audio_features": [] }))),
        );
    let (base, calls) = spawn(router).await;

    let err = engine(&base)
        .get_suggested_playlist(&fresh_token())
        .await
        .unwrap_err();

    assert!(matches!(err, Error::EmptyHistory));
    assert!(calls.to("GET", "/recommendations").is_empty());
}

#[tokio::test]
async fn test_recommendation_failure_propagates() {
    let router = Router::new()
        .route(
            "/me/player/recently-played",
            get(reply(200, history_json(&["h1"]))),
        )
        .route("/tracks", get(tracks_by_ids))
        .route("/audio-features", get(features_by_ids))
        .route(
            "/recommendations",
            get(reply(
                429,
                json!({ "error": { "status": 429, "message": "API rate limit exceeded" } }),
            )),
        );
    let (base, _) = spawn(router).await;

    let err = engine(&base)
        .get_suggested_playlist(&fresh_token())
        .await
        .unwrap_err();

    assert_eq!(err.upstream_status(), Some(429));
    assert!(err.to_string().contains("API rate limit exceeded"));
}
