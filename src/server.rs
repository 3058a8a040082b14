use std::{net::SocketAddr, str::FromStr, sync::Arc};

use axum::{
    Extension, Router,
    routing::{get, post},
};

use crate::{Error, Plugtify, Res, api};

/// Builds the router serving the Plugtify API.
pub fn router(plugtify: Arc<Plugtify>) -> Router {
    Router::new()
        .route("/health", get(api::health))
        .route(
            "/api/spotify/authorization-code",
            post(api::authorization_code),
        )
        .route("/api/spotify/recently-played", get(api::recently_played))
        .route(
            "/api/spotify/suggested-playlist",
            get(api::suggested_playlist),
        )
        .route(
            "/api/spotify/playlist",
            post(api::add_tracks).delete(api::unfollow_playlist),
        )
        .route("/api/spotify/me", get(api::current_profile))
        .layer(Extension(plugtify))
}

pub async fn start_api_server(plugtify: Arc<Plugtify>, addr: &str) -> Res<()> {
    let addr = SocketAddr::from_str(addr)
        .map_err(|e| Error::Config(format!("Failed to parse server address: {e}")))?;

    let listener = tokio::net::TcpListener::bind(&addr)
        .await
        .map_err(|e| Error::Internal(format!("Failed to bind {addr}: {e}")))?;
    axum::serve(listener, router(plugtify))
        .await
        .map_err(|e| Error::Internal(e.to_string()))
}
