#![allow(dead_code)]

use std::{
    collections::HashMap,
    future::Future,
    pin::Pin,
    sync::{Arc, Mutex},
    time::Duration,
};

use axum::{
    Json, Router,
    body::{Body, to_bytes},
    extract::{Query, Request, State},
    http::StatusCode,
    middleware::{self, Next},
    response::{IntoResponse, Response},
};
use chrono::{Duration as TimeDelta, Utc};
use plugtify::{
    Plugtify,
    config::SpotifyConfig,
    management::MemoryUserStore,
    types::{AudioFeatures, Token, Track, TrackArtist, User},
};
use serde_json::{Value, json};

/// One request received by the fake upstream.
#[derive(Debug, Clone)]
pub struct Call {
    pub method: String,
    pub path: String,
    pub query: HashMap<String, String>,
    pub authorization: Option<String>,
    pub body: String,
}

impl Call {
    pub fn json(&self) -> Value {
        serde_json::from_str(&self.body).unwrap_or(Value::Null)
    }
}

#[derive(Clone, Default)]
pub struct Calls(Arc<Mutex<Vec<Call>>>);

impl Calls {
    pub fn all(&self) -> Vec<Call> {
        self.0.lock().unwrap().clone()
    }

    /// `"METHOD /path"` for every call, in arrival order.
    pub fn sequence(&self) -> Vec<String> {
        self.all()
            .iter()
            .map(|c| format!("{} {}", c.method, c.path))
            .collect()
    }

    pub fn to(&self, method: &str, path: &str) -> Vec<Call> {
        self.all()
            .into_iter()
            .filter(|c| c.method == method && c.path == path)
            .collect()
    }
}

async fn record(State(calls): State<Calls>, request: Request, next: Next) -> Response {
    let (parts, body) = request.into_parts();
    let bytes = to_bytes(body, usize::MAX).await.unwrap_or_default();

    let query = Query::<HashMap<String, String>>::try_from_uri(&parts.uri)
        .map(|q| q.0)
        .unwrap_or_default();
    let authorization = parts
        .headers
        .get("authorization")
        .and_then(|v| v.to_str().ok())
        .map(str::to_string);

    calls.0.lock().unwrap().push(Call {
        method: parts.method.to_string(),
        path: parts.uri.path().to_string(),
        query,
        authorization,
        body: String::from_utf8_lossy(&bytes).to_string(),
    });

    next.run(Request::from_parts(parts, Body::from(bytes))).await
}

/// Serves `router` on an ephemeral port, recording every request. Returns the
/// base URL and the call log.
pub async fn spawn(router: Router) -> (String, Calls) {
    let calls = Calls::default();
    let app = router.layer(middleware::from_fn_with_state(calls.clone(), record));

    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move {
        axum::serve(listener, app).await.unwrap();
    });

    (format!("http://{addr}"), calls)
}

/// Handler answering `status` with a JSON body.
pub fn reply(
    status: u16,
    body: Value,
) -> impl Fn() -> std::future::Ready<Response> + Clone + Send + Sync + 'static {
    move || {
        let status = StatusCode::from_u16(status).unwrap();
        std::future::ready((status, Json(body.clone())).into_response())
    }
}

/// Handler answering `status` without a body.
pub fn reply_empty(
    status: u16,
) -> impl Fn() -> std::future::Ready<Response> + Clone + Send + Sync + 'static {
    move || std::future::ready(StatusCode::from_u16(status).unwrap().into_response())
}

pub type BoxedResponse = Pin<Box<dyn Future<Output = Response> + Send>>;

/// Handler answering like [`reply`] after sleeping `delay`.
pub fn reply_after(
    delay: Duration,
    status: u16,
    body: Value,
) -> impl Fn() -> BoxedResponse + Clone + Send + Sync + 'static {
    move || {
        let body = body.clone();
        Box::pin(async move {
            tokio::time::sleep(delay).await;
            let status = StatusCode::from_u16(status).unwrap();
            (status, Json(body)).into_response()
        })
    }
}

/// `GET /tracks?ids=..` echoing a full track object for each requested id.
pub async fn tracks_by_ids(Query(q): Query<HashMap<String, String>>) -> Json<Value> {
    let tracks: Vec<Value> = ids(&q).into_iter().map(|id| track_json(&id)).collect();
    Json(json!({ "tracks": tracks }))
}

/// `GET /audio-features?ids=..` echoing features (all 0.5) for each id.
pub async fn features_by_ids(Query(q): Query<HashMap<String, String>>) -> Json<Value> {
    let features: Vec<Value> = ids(&q)
        .into_iter()
        .map(|id| features_json(&id, 0.5))
        .collect();
    Json(json!({ "audio_features": features }))
}

fn ids(q: &HashMap<String, String>) -> Vec<String> {
    q.get("ids")
        .map(|ids| {
            ids.split(',')
                .filter(|s| !s.is_empty())
                .map(str::to_string)
                .collect()
        })
        .unwrap_or_default()
}

pub fn track_json(id: &str) -> Value {
    json!({
        "id": id,
        "name": format!("Track {id}"),
        "uri": format!("spotify:track:{id}"),
        "popularity": 50,
        "artists": [{ "name": "Artist" }]
    })
}

pub fn features_json(id: &str, value: f64) -> Value {
    json!({
        "id": id,
        "acousticness": value,
        "danceability": value,
        "energy": value,
        "instrumentalness": value,
        "liveness": value,
        "speechiness": value,
        "valence": value
    })
}

pub fn history_json(ids: &[&str]) -> Value {
    let items: Vec<Value> = ids
        .iter()
        .map(|id| json!({ "track": { "id": id }, "played_at": "2024-01-01T00:00:00Z" }))
        .collect();
    json!({ "items": items })
}

pub fn token_response(access_token: &str) -> Value {
    json!({
        "access_token": access_token,
        "token_type": "Bearer",
        "scope": "playlist-modify-public user-read-recently-played",
        "expires_in": 3600
    })
}

pub fn config(base: &str) -> SpotifyConfig {
    SpotifyConfig {
        client_id: "client".to_string(),
        client_secret: "secret".to_string(),
        api_url: base.to_string(),
        token_url: format!("{base}/api/token"),
        redirect_uri: "http://localhost:8080/callback".to_string(),
        timeout: Duration::from_secs(2),
    }
}

pub const BASIC_AUTH: &str = "Basic Y2xpZW50OnNlY3JldA==";

pub fn token(access_token: &str, age_secs: i64) -> Token {
    Token {
        access_token: access_token.to_string(),
        refresh_token: "refresh-1".to_string(),
        token_type: "Bearer".to_string(),
        scope: "playlist-modify-public".to_string(),
        expires_in: 3600,
        last_update_time: Utc::now() - TimeDelta::seconds(age_secs),
    }
}

pub fn fresh_token() -> Token {
    token("access-1", 0)
}

/// One hour lifetime with one second left.
pub fn expiring_token() -> Token {
    token("access-1", 3599)
}

/// Issued two hours ago with a one hour lifetime.
pub fn expired_token() -> Token {
    token("access-1", 2 * 3600)
}

pub fn user(token: Option<Token>, playlist_id: Option<&str>) -> User {
    let mut user = User::new("jane", "jane@example.com");
    user.token = token;
    user.playlist_id = playlist_id.map(str::to_string);
    user
}

pub fn track(id: &str, popularity: u32, features: Option<AudioFeatures>) -> Track {
    Track {
        id: id.to_string(),
        name: format!("Track {id}"),
        uri: format!("spotify:track:{id}"),
        popularity,
        artists: vec![TrackArtist {
            name: "Artist".to_string(),
        }],
        audio_features: features,
    }
}

pub fn features(id: &str, value: f64) -> AudioFeatures {
    AudioFeatures {
        id: id.to_string(),
        acousticness: value,
        danceability: value,
        energy: value,
        instrumentalness: value,
        liveness: value,
        speechiness: value,
        valence: value,
    }
}

/// Plugtify wired against the fake upstream with `users` preloaded.
pub fn plugtify(base: &str, users: Vec<User>) -> (Plugtify, Arc<MemoryUserStore>) {
    let store = Arc::new(MemoryUserStore::with_users(users));
    let plugtify = Plugtify::new(config(base), store.clone()).unwrap();
    (plugtify, store)
}
