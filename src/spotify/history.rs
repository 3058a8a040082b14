use std::{collections::HashMap, sync::Arc};

use crate::{
    Error, Res,
    spotify::client::{ApiClient, TokenSource},
    types::{AudioFeatures, AudioFeaturesResponse, PlayHistoryResponse, Track, TracksResponse},
};

/// Number of history entries requested by default (the endpoint's maximum).
pub const HISTORY_LIMIT: u32 = 50;

/// Fetches a user's recent plays and joins each track with its audio features.
pub struct HistoryAggregator {
    client: Arc<ApiClient>,
}

impl HistoryAggregator {
    pub fn new(client: Arc<ApiClient>) -> Self {
        Self { client }
    }

    /// Returns the recently played tracks, most recent first, each carrying its
    /// audio features. Nothing is cached; every call hits the API again.
    /// A token is taken from `tokens` before each of the three requests.
    ///
    /// # Errors
    ///
    /// - [`Error::NoHistory`] if the history endpoint answered without a body
    /// - [`Error::NoIds`] if the history contained no track ids
    /// - [`Error::Internal`] if the batch track lookup answered without a body
    /// - [`Error::Upstream`] for any failed call
    pub async fn get_recently_played(
        &self,
        tokens: &dyn TokenSource,
        limit: u32,
    ) -> Res<Vec<Track>> {
        let history = self
            .client
            .get::<PlayHistoryResponse>(
                &tokens.token().await?,
                "/me/player/recently-played",
                &[("limit", limit.to_string())],
            )
            .await?
            .body
            .ok_or(Error::NoHistory)?;

        let ids: Vec<String> = history
            .items
            .into_iter()
            .filter_map(|item| item.track.and_then(|t| t.id))
            .collect();
        if ids.is_empty() {
            return Err(Error::NoIds);
        }

        let ids = ids.join(",");

        let tracks = self
            .client
            .get::<TracksResponse>(&tokens.token().await?, "/tracks", &[("ids", ids.clone())])
            .await?
            .body
            .ok_or_else(|| {
                Error::Internal(
                    "There was a problem getting the full object for each track".to_string(),
                )
            })?;

        let features = self
            .client
            .get::<AudioFeaturesResponse>(
                &tokens.token().await?,
                "/audio-features",
                &[("ids", ids)],
            )
            .await?
            .body
            .map(|b| b.audio_features)
            .unwrap_or_default();

        Ok(join_features(
            tracks.tracks.into_iter().flatten().collect(),
            features.into_iter().flatten().collect(),
        ))
    }
}

/// Attaches to each track the feature record with the same id. Tracks without
/// a matching record are dropped; the order of the remaining tracks is kept.
pub fn join_features(tracks: Vec<Track>, features: Vec<AudioFeatures>) -> Vec<Track> {
    let mut by_id: HashMap<String, AudioFeatures> = HashMap::with_capacity(features.len());
    for feature in features {
        by_id.entry(feature.id.clone()).or_insert(feature);
    }

    tracks
        .into_iter()
        .filter_map(|mut track| {
            let features = by_id.get(&track.id)?.clone();
            track.audio_features = Some(features);
            Some(track)
        })
        .collect()
}
