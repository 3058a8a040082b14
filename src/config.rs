//! Configuration management for Plugtify.
//!
//! This module handles loading and accessing configuration values from environment
//! variables and `.env` files. Required values (the Spotify client credentials)
//! produce an [`Error::Config`] when missing, everything else falls back to a
//! sensible default.
//!
//! The configuration system follows a hierarchical approach:
//! 1. Environment variables (highest priority)
//! 2. `.env` file in the local data directory
//! 3. Application defaults (where applicable)

use std::{env, path::PathBuf, time::Duration};

use crate::{Error, Res};

const DEFAULT_API_URL: &str = "https://api.spotify.com/v1";
const DEFAULT_TOKEN_URL: &str = "https://accounts.spotify.com/api/token";
const DEFAULT_REDIRECT_URI: &str = "http://127.0.0.1:8080/callback";
const DEFAULT_SERVER_ADDRESS: &str = "127.0.0.1:8080";
const DEFAULT_TIMEOUT_SECS: u64 = 10;

/// Loads environment variables from a `.env` file in the local data directory.
///
/// The file lives under `plugtify/.env` inside the platform-specific local data
/// directory:
/// - Linux: `~/.local/share/plugtify/.env`
/// - macOS: `~/Library/Application Support/plugtify/.env`
/// - Windows: `%LOCALAPPDATA%/plugtify/.env`
///
/// A missing file is not an error; the process environment may already carry
/// every variable. Variables already present in the environment are not
/// overridden.
///
/// # Errors
///
/// Returns [`Error::Config`] if the directory cannot be created or the file
/// exists but cannot be parsed.
pub async fn load_env() -> Res<()> {
    let path = data_dir().join(".env");
    if let Some(parent) = path.parent() {
        async_fs::create_dir_all(parent)
            .await
            .map_err(|e| Error::Config(e.to_string()))?;
    }

    if path.is_file() {
        dotenv::from_path(&path).map_err(|e| Error::Config(e.to_string()))?;
    }

    Ok(())
}

/// Returns the `plugtify` folder inside the local data directory.
pub fn data_dir() -> PathBuf {
    let mut path = dirs::data_local_dir().unwrap_or_else(|| PathBuf::from("."));
    path.push("plugtify");
    path
}

fn required(name: &str) -> Res<String> {
    env::var(name).map_err(|_| Error::Config(format!("{name} must be set")))
}

fn optional(name: &str, default: &str) -> String {
    env::var(name).unwrap_or_else(|_| default.to_string())
}

/// Returns the Spotify API client ID (`SPOTIFY_API_AUTH_CLIENT_ID`).
pub fn spotify_client_id() -> Res<String> {
    required("SPOTIFY_API_AUTH_CLIENT_ID")
}

/// Returns the Spotify API client secret (`SPOTIFY_API_AUTH_CLIENT_SECRET`).
///
/// The secret is only ever sent inside the Basic credentials of the token
/// grants and should never be logged.
pub fn spotify_client_secret() -> Res<String> {
    required("SPOTIFY_API_AUTH_CLIENT_SECRET")
}

/// Returns the Spotify Web API base URL (`SPOTIFY_API_URL`).
pub fn spotify_apiurl() -> String {
    optional("SPOTIFY_API_URL", DEFAULT_API_URL)
}

/// Returns the Spotify OAuth token URL (`SPOTIFY_API_TOKEN_URL`), used for both
/// the authorization-code and the refresh-token grant.
pub fn spotify_apitoken_url() -> String {
    optional("SPOTIFY_API_TOKEN_URL", DEFAULT_TOKEN_URL)
}

/// Returns the redirect URI registered with Spotify (`SPOTIFY_API_REDIRECT_URI`).
pub fn spotify_redirect_uri() -> String {
    optional("SPOTIFY_API_REDIRECT_URI", DEFAULT_REDIRECT_URI)
}

/// Returns the per-call timeout for upstream requests (`SPOTIFY_API_TIMEOUT_SECS`).
///
/// # Errors
///
/// Returns [`Error::Config`] if the variable is set but not a positive integer.
pub fn spotify_timeout() -> Res<Duration> {
    match env::var("SPOTIFY_API_TIMEOUT_SECS") {
        Ok(raw) => match raw.trim().parse::<u64>() {
            Ok(secs) if secs > 0 => Ok(Duration::from_secs(secs)),
            _ => Err(Error::Config(format!(
                "SPOTIFY_API_TIMEOUT_SECS must be a positive number of seconds, got {raw:?}"
            ))),
        },
        Err(_) => Ok(Duration::from_secs(DEFAULT_TIMEOUT_SECS)),
    }
}

/// Returns the address the HTTP API binds to (`SERVER_ADDRESS`).
pub fn server_addr() -> String {
    optional("SERVER_ADDRESS", DEFAULT_SERVER_ADDRESS)
}

/// Returns the location of the JSON user store (`PLUGTIFY_USERS_FILE`).
pub fn users_path() -> PathBuf {
    match env::var("PLUGTIFY_USERS_FILE") {
        Ok(path) => PathBuf::from(path),
        Err(_) => data_dir().join("users.json"),
    }
}

/// Everything the Spotify client needs to talk to the catalog and auth APIs.
#[derive(Debug, Clone)]
pub struct SpotifyConfig {
    pub client_id: String,
    pub client_secret: String,
    pub api_url: String,
    pub token_url: String,
    pub redirect_uri: String,
    pub timeout: Duration,
}

impl SpotifyConfig {
    /// Builds the configuration from the environment.
    pub fn from_env() -> Res<Self> {
        Ok(Self {
            client_id: spotify_client_id()?,
            client_secret: spotify_client_secret()?,
            api_url: spotify_apiurl(),
            token_url: spotify_apitoken_url(),
            redirect_uri: spotify_redirect_uri(),
            timeout: spotify_timeout()?,
        })
    }
}
