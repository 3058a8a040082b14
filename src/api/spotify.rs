use std::sync::Arc;

use axum::{Extension, Json};
use serde::Deserialize;

use crate::{
    Plugtify,
    api::{ApiError, CurrentUser},
    types::{Envelope, Profile, Track},
};

type ApiResult<T> = Result<Json<Envelope<T>>, ApiError>;

#[derive(Debug, Deserialize)]
pub struct AuthorizationCode {
    pub code: String,
    pub redirect_uri: Option<String>,
}

pub async fn authorization_code(
    Extension(plugtify): Extension<Arc<Plugtify>>,
    user: CurrentUser,
    Json(payload): Json<AuthorizationCode>,
) -> ApiResult<()> {
    let redirect_uri = payload
        .redirect_uri
        .unwrap_or_else(|| plugtify.redirect_uri().to_string());

    let envelope = plugtify
        .exchange_authorization_code(user.login(), &payload.code, &redirect_uri)
        .await?;
    Ok(Json(envelope))
}

pub async fn recently_played(
    Extension(plugtify): Extension<Arc<Plugtify>>,
    user: CurrentUser,
) -> ApiResult<Vec<Track>> {
    Ok(Json(plugtify.recently_played(user.login()).await?))
}

pub async fn suggested_playlist(
    Extension(plugtify): Extension<Arc<Plugtify>>,
    user: CurrentUser,
) -> ApiResult<Vec<Track>> {
    Ok(Json(plugtify.suggested_playlist(user.login()).await?))
}

pub async fn add_tracks(
    Extension(plugtify): Extension<Arc<Plugtify>>,
    user: CurrentUser,
    Json(tracks): Json<Vec<Track>>,
) -> ApiResult<()> {
    Ok(Json(plugtify.add_tracks(user.login(), &tracks).await?))
}

pub async fn unfollow_playlist(
    Extension(plugtify): Extension<Arc<Plugtify>>,
    user: CurrentUser,
) -> ApiResult<()> {
    let principal = user.login().ok_or(crate::Error::UserNotFound)?;
    Ok(Json(plugtify.unfollow_playlist(principal).await?))
}

pub async fn current_profile(
    Extension(plugtify): Extension<Arc<Plugtify>>,
    user: CurrentUser,
) -> ApiResult<Option<Profile>> {
    Ok(Json(plugtify.current_profile(user.login()).await?))
}
