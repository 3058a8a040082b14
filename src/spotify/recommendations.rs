use std::{collections::HashSet, sync::Arc};

use rand::{Rng, SeedableRng, rngs::StdRng};

use crate::{
    Error, Res,
    spotify::{
        client::{ApiClient, TokenSource},
        history::{HISTORY_LIMIT, HistoryAggregator},
    },
    types::{Envelope, RecommendationsResponse, Track, TracksResponse},
};

/// Number of distinct seed tracks drawn from a large enough history.
pub const SEED_COUNT: usize = 5;
/// Below this many history tracks only the most recent one is used as seed.
pub const RANDOM_SEED_THRESHOLD: usize = 10;
pub const RECOMMENDATION_LIMIT: u32 = 50;

/// Mean audio features and popularity of a listening history, sent upstream
/// as `target_*` values and `min_popularity`.
#[derive(Debug, Clone, PartialEq)]
pub struct TargetProfile {
    pub acousticness: f64,
    pub danceability: f64,
    pub energy: f64,
    pub instrumentalness: f64,
    pub liveness: f64,
    pub speechiness: f64,
    pub valence: f64,
    /// Integer mean, rounded down.
    pub min_popularity: u32,
}

impl TargetProfile {
    /// Averages every track that carries audio features.
    ///
    /// # Errors
    ///
    /// [`Error::EmptyHistory`] when no track carries features.
    pub fn from_history(tracks: &[Track]) -> Res<Self> {
        let mut profile = TargetProfile {
            acousticness: 0.0,
            danceability: 0.0,
            energy: 0.0,
            instrumentalness: 0.0,
            liveness: 0.0,
            speechiness: 0.0,
            valence: 0.0,
            min_popularity: 0,
        };
        let mut popularity: u64 = 0;
        let mut count: usize = 0;

        for track in tracks {
            let Some(features) = &track.audio_features else {
                continue;
            };
            profile.acousticness += features.acousticness;
            profile.danceability += features.danceability;
            profile.energy += features.energy;
            profile.instrumentalness += features.instrumentalness;
            profile.liveness += features.liveness;
            profile.speechiness += features.speechiness;
            profile.valence += features.valence;
            popularity += u64::from(track.popularity);
            count += 1;
        }

        if count == 0 {
            return Err(Error::EmptyHistory);
        }

        let n = count as f64;
        profile.acousticness /= n;
        profile.danceability /= n;
        profile.energy /= n;
        profile.instrumentalness /= n;
        profile.liveness /= n;
        profile.speechiness /= n;
        profile.valence /= n;
        profile.min_popularity = u32::try_from(popularity / count as u64).unwrap_or(u32::MAX);

        Ok(profile)
    }

    pub fn query(&self) -> Vec<(&'static str, String)> {
        vec![
            ("target_acousticness", self.acousticness.to_string()),
            ("target_danceability", self.danceability.to_string()),
            ("target_energy", self.energy.to_string()),
            ("target_instrumentalness", self.instrumentalness.to_string()),
            ("target_liveness", self.liveness.to_string()),
            ("target_speechiness", self.speechiness.to_string()),
            ("target_valence", self.valence.to_string()),
            ("min_popularity", self.min_popularity.to_string()),
        ]
    }
}

/// Result of [`sample_distinct`]: the drawn ids in draw order and how many
/// random draws it took to collect them.
#[derive(Debug, Clone)]
pub struct SeedDraw {
    pub ids: Vec<String>,
    pub draws: usize,
}

/// Draws `count` distinct ids uniformly at random, without replacement, by
/// repeated draws until `count` distinct ones have been seen.
///
/// The loop terminates with probability 1 because at least `count` distinct
/// candidates exist; the expected number of draws is bounded by the coupon
/// collector sum `n * (1/n + 1/(n-1) + .. + 1/(n-count+1))`, which is below 7
/// for `count = 5` and `n >= 10`.
///
/// # Panics
///
/// Panics if `candidates` holds fewer than `count` distinct ids. Callers must
/// check this before sampling; it is a contract violation, not a runtime path.
pub fn sample_distinct<R: Rng + ?Sized>(
    candidates: &[&str],
    count: usize,
    rng: &mut R,
) -> SeedDraw {
    let distinct: HashSet<&str> = candidates.iter().copied().collect();
    assert!(
        distinct.len() >= count,
        "sample_distinct needs at least {count} distinct candidates, got {}",
        distinct.len()
    );

    let mut seen: HashSet<&str> = HashSet::with_capacity(count);
    let mut ids = Vec::with_capacity(count);
    let mut draws = 0;

    while ids.len() < count {
        let candidate = candidates[rng.random_range(0..candidates.len())];
        draws += 1;
        if seen.insert(candidate) {
            ids.push(candidate.to_string());
        }
    }

    SeedDraw { ids, draws }
}

/// Picks the seed track ids for a recommendation request.
///
/// - fewer than [`RANDOM_SEED_THRESHOLD`] tracks: the first (most recent) id only
/// - otherwise [`SEED_COUNT`] distinct ids drawn at random; if the history
///   repeats so much that fewer than [`SEED_COUNT`] distinct ids exist, all of
///   them are used in history order
pub fn select_seeds<R: Rng + ?Sized>(history: &[Track], rng: &mut R) -> Vec<String> {
    if history.len() < RANDOM_SEED_THRESHOLD {
        return history.first().map(|t| t.id.clone()).into_iter().collect();
    }

    let candidates: Vec<&str> = history.iter().map(|t| t.id.as_str()).collect();
    let mut seen = HashSet::new();
    let distinct: Vec<&str> = candidates.iter().copied().filter(|id| seen.insert(*id)).collect();
    if distinct.len() < SEED_COUNT {
        return distinct.into_iter().map(str::to_string).collect();
    }

    sample_distinct(&candidates, SEED_COUNT, rng).ids
}

/// Drops every recommended track the user already has in their history,
/// keeping upstream order.
pub fn dedupe_against_history(recommended: Vec<Track>, history: &[Track]) -> Vec<Track> {
    let heard: HashSet<&str> = history.iter().map(|t| t.id.as_str()).collect();
    recommended
        .into_iter()
        .filter(|t| !heard.contains(t.id.as_str()))
        .collect()
}

/// Turns listening history into a fresh set of recommended tracks.
pub struct RecommendationEngine {
    client: Arc<ApiClient>,
    history: HistoryAggregator,
}

impl RecommendationEngine {
    pub fn new(client: Arc<ApiClient>) -> Self {
        Self {
            history: HistoryAggregator::new(Arc::clone(&client)),
            client,
        }
    }

    /// Builds the suggestion set. `tokens` is asked for a token before every
    /// upstream request of the pipeline.
    pub async fn get_suggested_playlist(
        &self,
        tokens: &dyn TokenSource,
    ) -> Res<Envelope<Vec<Track>>> {
        let mut rng = StdRng::from_rng(&mut rand::rng());
        self.get_suggested_playlist_with(tokens, &mut rng).await
    }

    /// Same as [`Self::get_suggested_playlist`] with a caller supplied RNG for
    /// seed selection.
    pub async fn get_suggested_playlist_with<R: Rng + Send + ?Sized>(
        &self,
        tokens: &dyn TokenSource,
        rng: &mut R,
    ) -> Res<Envelope<Vec<Track>>> {
        let history = match self.history.get_recently_played(tokens, HISTORY_LIMIT).await {
            Ok(history) if history.is_empty() => return Err(Error::EmptyHistory),
            result => result?,
        };

        let profile = TargetProfile::from_history(&history)?;
        let seeds = select_seeds(&history, rng);

        let mut query = vec![
            ("limit", RECOMMENDATION_LIMIT.to_string()),
            ("seed_tracks", seeds.join(",")),
        ];
        query.extend(profile.query());

        let recommended = self
            .client
            .get::<RecommendationsResponse>(&tokens.token().await?, "/recommendations", &query)
            .await?
            .body
            .map(|b| b.tracks)
            .unwrap_or_default();

        let fresh = dedupe_against_history(recommended, &history);
        if fresh.is_empty() {
            return Ok(Envelope::ok(Vec::new(), 200));
        }

        let ids = fresh
            .iter()
            .map(|t| t.id.as_str())
            .collect::<Vec<_>>()
            .join(",");

        let response = self
            .client
            .get::<TracksResponse>(&tokens.token().await?, "/tracks", &[("ids", ids)])
            .await?;
        let upstream_status = response.upstream_status;
        let tracks = response.body.ok_or_else(|| {
            Error::Internal(
                "There was a problem getting the full object for each track".to_string(),
            )
        })?;

        Ok(Envelope::ok(
            tracks.tracks.into_iter().flatten().collect(),
            upstream_status,
        ))
    }
}
