use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tabled::Tabled;

/// OAuth2 credential pair plus the bookkeeping needed to know when it expires.
///
/// A token is owned by exactly one [`User`] and is always replaced as a whole
/// on refresh or re-exchange.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Token {
    pub access_token: String,
    pub refresh_token: String,
    pub token_type: String,
    pub scope: String,
    pub expires_in: u64,
    pub last_update_time: DateTime<Utc>,
}

impl Token {
    /// Value of the `Authorization` header for catalog calls.
    pub fn authorization(&self) -> String {
        format!("{} {}", self.token_type, self.access_token)
    }
}

/// Body of a successful authorization-code or refresh-token grant.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TokenResponse {
    pub access_token: String,
    #[serde(default = "default_token_type")]
    pub token_type: String,
    #[serde(default)]
    pub scope: String,
    pub expires_in: u64,
    #[serde(default)]
    pub refresh_token: Option<String>,
}

fn default_token_type() -> String {
    "Bearer".to_string()
}

impl TokenResponse {
    /// Builds a token stamped with `now`. A refresh grant usually omits the
    /// refresh token, in which case `previous_refresh` is carried over.
    pub fn into_token(self, previous_refresh: Option<&str>, now: DateTime<Utc>) -> Token {
        Token {
            access_token: self.access_token,
            refresh_token: self
                .refresh_token
                .or_else(|| previous_refresh.map(str::to_string))
                .unwrap_or_default(),
            token_type: self.token_type,
            scope: self.scope,
            expires_in: self.expires_in,
            last_update_time: now,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct User {
    pub login: String,
    pub email: String,
    #[serde(default)]
    pub token: Option<Token>,
    #[serde(default)]
    pub playlist_id: Option<String>,
}

impl User {
    pub fn new(login: &str, email: &str) -> Self {
        Self {
            login: normalize(login),
            email: normalize(email),
            token: None,
            playlist_id: None,
        }
    }

    pub fn has_token(&self) -> bool {
        self.token.is_some()
    }

    pub fn playlist_state(&self) -> PlaylistState {
        match &self.playlist_id {
            Some(id) => PlaylistState::HasPlaylist(id.clone()),
            None => PlaylistState::NoPlaylist,
        }
    }
}

/// Logins and emails are compared trimmed and lowercased.
pub fn normalize(value: &str) -> String {
    value.trim().to_lowercase()
}

/// Where a user stands with respect to the managed playlist.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PlaylistState {
    NoPlaylist,
    HasPlaylist(String),
}

/// Local success envelope wrapping every public operation result.
///
/// `status` is always 200: the reverse proxy in front of the service rejects
/// non-standard upstream status lines, so the upstream status only travels
/// along in `upstream_status` for diagnostics.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Envelope<T> {
    pub status: u16,
    pub upstream_status: u16,
    pub body: T,
}

impl<T> Envelope<T> {
    pub fn ok(body: T, upstream_status: u16) -> Self {
        Self {
            status: 200,
            upstream_status,
            body,
        }
    }

    pub fn map<U>(self, f: impl FnOnce(T) -> U) -> Envelope<U> {
        Envelope {
            status: self.status,
            upstream_status: self.upstream_status,
            body: f(self.body),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct AudioFeatures {
    pub id: String,
    pub acousticness: f64,
    pub danceability: f64,
    pub energy: f64,
    pub instrumentalness: f64,
    pub liveness: f64,
    pub speechiness: f64,
    pub valence: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TrackArtist {
    pub name: String,
}

/// A track flowing through the recommendation pipeline. Never persisted.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Track {
    pub id: String,
    #[serde(default)]
    pub name: String,
    pub uri: String,
    #[serde(default)]
    pub popularity: u32,
    #[serde(default)]
    pub artists: Vec<TrackArtist>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub audio_features: Option<AudioFeatures>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct PlayHistoryResponse {
    #[serde(default)]
    pub items: Vec<PlayHistoryItem>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct PlayHistoryItem {
    pub track: Option<PlayedTrack>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct PlayedTrack {
    pub id: Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct TracksResponse {
    #[serde(default)]
    pub tracks: Vec<Option<Track>>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct AudioFeaturesResponse {
    #[serde(default)]
    pub audio_features: Vec<Option<AudioFeatures>>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct RecommendationsResponse {
    #[serde(default)]
    pub tracks: Vec<Track>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CreatePlaylistRequest {
    pub name: String,
    pub description: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CreatePlaylistResponse {
    pub id: String,
    #[serde(default)]
    pub name: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ReplaceTracksRequest {
    pub uris: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Profile {
    pub id: String,
    #[serde(default)]
    pub display_name: Option<String>,
    #[serde(default)]
    pub email: Option<String>,
    #[serde(default)]
    pub country: Option<String>,
    #[serde(default)]
    pub product: Option<String>,
}

#[derive(Tabled)]
pub struct TrackTableRow {
    pub name: String,
    pub artists: String,
    pub popularity: u32,
}

impl From<&Track> for TrackTableRow {
    fn from(track: &Track) -> Self {
        Self {
            name: track.name.clone(),
            artists: track
                .artists
                .iter()
                .map(|a| a.name.as_str())
                .collect::<Vec<_>>()
                .join(", "),
            popularity: track.popularity,
        }
    }
}
