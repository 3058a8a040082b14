use std::sync::Arc;

use serde::de::IgnoredAny;
use tokio::sync::OwnedMutexGuard;

use crate::{
    Error, Res, info,
    management::{TokenManager, UserLocks, UserStore},
    spotify::client::ApiClient,
    types::{
        CreatePlaylistRequest, CreatePlaylistResponse, Envelope, PlaylistState,
        ReplaceTracksRequest, Token, Track, User,
    },
    warning,
};

pub const PLAYLIST_NAME: &str = "Plugtify Playlist";
pub const PLAYLIST_DESCRIPTION: &str = "Playlist created with Plugtify";
/// Tracks beyond this many are dropped from a replace call.
pub const MAX_PLAYLIST_TRACKS: usize = 40;

/// URIs sent by a replace call: those of the first [`MAX_PLAYLIST_TRACKS`]
/// tracks, in order.
pub fn replace_uris(tracks: &[Track]) -> Vec<String> {
    tracks
        .iter()
        .take(MAX_PLAYLIST_TRACKS)
        .map(|t| t.uri.clone())
        .collect()
}

/// Catalog path of `suffix` under the playlist, with the id percent-encoded.
pub fn playlist_path(playlist_id: &str, suffix: &str) -> String {
    format!("/playlists/{}/{suffix}", urlencoding::encode(playlist_id))
}

/// Keeps exactly one managed playlist per user filled with a given track set.
///
/// Per user the playlist is either absent (`NoPlaylist`) or known by id
/// (`HasPlaylist`). A known playlist that vanished upstream (404) or refused
/// the update (304) is replaced by a freshly created one.
pub struct PlaylistSynchronizer {
    client: Arc<ApiClient>,
    tokens: Arc<TokenManager>,
    store: Arc<dyn UserStore>,
    locks: Arc<UserLocks>,
}

impl PlaylistSynchronizer {
    pub fn new(
        client: Arc<ApiClient>,
        tokens: Arc<TokenManager>,
        store: Arc<dyn UserStore>,
        locks: Arc<UserLocks>,
    ) -> Self {
        Self {
            client,
            tokens,
            store,
            locks,
        }
    }

    /// Publishes `tracks` to the current user's managed playlist, creating the
    /// playlist first if the user has none. Returns the status of the last
    /// upstream call.
    ///
    /// The user's lock is held for the whole sequence. The token is checked
    /// for expiry before every upstream call.
    pub async fn add_tracks(&self, login: Option<&str>, tracks: &[Track]) -> Res<Envelope<()>> {
        let login = self.tokens.current_user(login).await?.login;

        let guard = self.locks.acquire(&login).await;
        let mut user = self
            .store
            .find_by_login(&login)
            .await?
            .ok_or(Error::UserNotFound)?;

        match user.playlist_state() {
            PlaylistState::HasPlaylist(playlist_id) => {
                let token = self.tokens.ensure_fresh_locked(&mut user, &guard).await?;
                match self.replace_tracks(&token, &playlist_id, tracks).await {
                    Err(Error::Upstream {
                        status: Some(status @ (404 | 304)),
                        ..
                    }) => {
                        warning!(
                            "Playlist {} answered {} for {}, creating a new one",
                            playlist_id,
                            status,
                            user.login
                        );
                        self.create_playlist(&mut user, &guard, tracks).await
                    }
                    result => result,
                }
            }
            PlaylistState::NoPlaylist => self.create_playlist(&mut user, &guard, tracks).await,
        }
    }

    /// Unfollows the managed playlist of `principal`.
    ///
    /// Succeeds without calling upstream when the user has no token or no
    /// playlist. The stored playlist id is kept after unfollowing.
    pub async fn unfollow_playlist(&self, principal: &str) -> Res<Envelope<()>> {
        let user = self.tokens.current_user(Some(principal)).await?;

        let (true, Some(playlist_id)) = (user.has_token(), user.playlist_id.clone()) else {
            return Ok(Envelope::ok((), 200));
        };

        let token = self.tokens.ensure_fresh(&user.login).await?;
        let response = self
            .client
            .delete::<IgnoredAny>(&token, &playlist_path(&playlist_id, "followers"))
            .await?;

        Ok(response.map(|_| ()))
    }

    /// Replaces the playlist content with the URIs of the first
    /// [`MAX_PLAYLIST_TRACKS`] tracks.
    pub async fn replace_tracks(
        &self,
        token: &Token,
        playlist_id: &str,
        tracks: &[Track],
    ) -> Res<Envelope<()>> {
        let request = ReplaceTracksRequest {
            uris: replace_uris(tracks),
        };

        let response = self
            .client
            .put::<_, IgnoredAny>(token, &playlist_path(playlist_id, "tracks"), &request)
            .await?;

        Ok(response.map(|_| ()))
    }

    async fn create_playlist(
        &self,
        user: &mut User,
        guard: &OwnedMutexGuard<()>,
        tracks: &[Track],
    ) -> Res<Envelope<()>> {
        let request = CreatePlaylistRequest {
            name: PLAYLIST_NAME.to_string(),
            description: PLAYLIST_DESCRIPTION.to_string(),
        };

        let token = self.tokens.ensure_fresh_locked(user, guard).await?;
        let response = self
            .client
            .post::<_, CreatePlaylistResponse>(&token, "/me/playlists", &request)
            .await?;
        let upstream_status = response.upstream_status;
        let playlist = response.body.ok_or_else(|| Error::Upstream {
            status: Some(upstream_status),
            message: "playlist creation returned no body".to_string(),
        })?;

        user.playlist_id = Some(playlist.id.clone());
        self.store.save(user).await?;
        info!("Created playlist {} for {}", playlist.id, user.login);

        if upstream_status == 200 || upstream_status == 201 {
            let token = self.tokens.ensure_fresh_locked(user, guard).await?;
            self.replace_tracks(&token, &playlist.id, tracks).await
        } else {
            Ok(Envelope::ok((), upstream_status))
        }
    }
}
