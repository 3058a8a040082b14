//! # API Module
//!
//! HTTP endpoints exposing the Plugtify operations to the frontend behind the
//! reverse proxy.
//!
//! Every successful answer is HTTP 200 with the operation's [`Envelope`] as
//! JSON body; the upstream status is only reported inside the envelope.
//! Failures map to:
//!
//! - `401` - no authenticated user ([`Error::UserNotFound`])
//! - `502` - upstream failures ([`Error::Upstream`], [`Error::UpstreamAuth`])
//! - `500` - everything else
//!
//! The authenticated principal is taken from the [`USER_HEADER`] header,
//! which the authentication layer in front of this service sets.
//!
//! [`Envelope`]: crate::types::Envelope

mod health;
mod spotify;

use std::convert::Infallible;

use axum::{
    Json,
    extract::FromRequestParts,
    http::{StatusCode, request::Parts},
    response::{IntoResponse, Response},
};
use serde_json::json;

use crate::Error;

pub use health::health;
pub use spotify::{
    add_tracks, authorization_code, current_profile, recently_played, suggested_playlist,
    unfollow_playlist,
};

pub const USER_HEADER: &str = "x-plugtify-user";

/// Login of the authenticated caller, if any.
#[derive(Debug, Clone)]
pub struct CurrentUser(pub Option<String>);

impl CurrentUser {
    pub fn login(&self) -> Option<&str> {
        self.0.as_deref()
    }
}

impl<S: Send + Sync> FromRequestParts<S> for CurrentUser {
    type Rejection = Infallible;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        let login = parts
            .headers
            .get(USER_HEADER)
            .and_then(|v| v.to_str().ok())
            .map(str::trim)
            .filter(|v| !v.is_empty())
            .map(str::to_string);

        Ok(CurrentUser(login))
    }
}

/// Wraps [`Error`] so handlers can return it directly.
pub struct ApiError(pub Error);

impl From<Error> for ApiError {
    fn from(err: Error) -> Self {
        ApiError(err)
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = match &self.0 {
            Error::UserNotFound => StatusCode::UNAUTHORIZED,
            Error::Upstream { .. } | Error::UpstreamAuth(_) => StatusCode::BAD_GATEWAY,
            _ => StatusCode::INTERNAL_SERVER_ERROR,
        };

        let body = json!({
            "error": self.0.to_string(),
            "upstream_status": self.0.upstream_status(),
        });

        (status, Json(body)).into_response()
    }
}
