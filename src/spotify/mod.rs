//! # Spotify Integration Module
//!
//! This module implements every call Plugtify makes against the Spotify Web API
//! and the Spotify accounts service.
//!
//! ## Architecture
//!
//! ```text
//! Service Layer (Plugtify facade, CLI, HTTP API)
//!          ↓
//! Spotify Integration Layer
//!     ├── Recommendations (target profile, seeds, dedupe)
//!     ├── History (recent plays joined with audio features)
//!     ├── Playlist (create-or-replace of the managed playlist)
//!     └── Authentication (code exchange, refresh grants)
//!          ↓
//! ApiClient (reqwest, JSON / form-urlencoded, per-call timeout)
//!          ↓
//! Spotify Web API
//! ```
//!
//! ## Error Handling
//!
//! Calls are never retried. A transport failure, a timeout or a non-2xx answer
//! becomes [`crate::Error::Upstream`] carrying the upstream status and message.
//! The only built-in recovery is the playlist replace→create fallback.
//!
//! ## API Coverage
//!
//! - `POST /api/token` - authorization-code and refresh-token grants
//! - `GET /me` - current profile
//! - `GET /me/player/recently-played` - play history
//! - `GET /tracks` - batch track lookup
//! - `GET /audio-features` - batch audio feature lookup
//! - `GET /recommendations` - recommendations for seeds and target features
//! - `POST /me/playlists` - create the managed playlist
//! - `PUT /playlists/{id}/tracks` - replace its tracks
//! - `DELETE /playlists/{id}/followers` - unfollow it

pub mod auth;
pub mod client;
pub mod history;
pub mod playlist;
pub mod recommendations;

pub use client::{ApiClient, TokenSource};
pub use history::HistoryAggregator;
pub use playlist::PlaylistSynchronizer;
pub use recommendations::RecommendationEngine;
