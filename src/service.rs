use std::sync::Arc;

use crate::{
    Res,
    config::SpotifyConfig,
    management::{TokenManager, UserLocks, UserStore},
    spotify::{
        ApiClient, HistoryAggregator, PlaylistSynchronizer, RecommendationEngine,
        history::HISTORY_LIMIT,
    },
    types::{Envelope, Profile, Track},
};

/// Entry point composing the token manager, history, recommendation and
/// playlist components around one shared [`ApiClient`] and [`UserStore`].
///
/// The current user is always passed in explicitly as `login`; `None` stands
/// for "no authenticated user" and fails with [`crate::Error::UserNotFound`].
pub struct Plugtify {
    client: Arc<ApiClient>,
    store: Arc<dyn UserStore>,
    tokens: Arc<TokenManager>,
    history: HistoryAggregator,
    recommendations: RecommendationEngine,
    playlists: PlaylistSynchronizer,
}

impl Plugtify {
    pub fn new(config: SpotifyConfig, store: Arc<dyn UserStore>) -> Res<Self> {
        let client = Arc::new(ApiClient::new(config)?);
        let locks = Arc::new(UserLocks::new());
        let tokens = Arc::new(TokenManager::new(
            Arc::clone(&client),
            Arc::clone(&store),
            Arc::clone(&locks),
        ));

        Ok(Self {
            history: HistoryAggregator::new(Arc::clone(&client)),
            recommendations: RecommendationEngine::new(Arc::clone(&client)),
            playlists: PlaylistSynchronizer::new(
                Arc::clone(&client),
                Arc::clone(&tokens),
                Arc::clone(&store),
                locks,
            ),
            client,
            store,
            tokens,
        })
    }

    pub fn store(&self) -> &Arc<dyn UserStore> {
        &self.store
    }

    pub fn tokens(&self) -> &TokenManager {
        &self.tokens
    }

    pub fn redirect_uri(&self) -> &str {
        &self.client.config().redirect_uri
    }

    pub async fn exchange_authorization_code(
        &self,
        login: Option<&str>,
        code: &str,
        redirect_uri: &str,
    ) -> Res<Envelope<()>> {
        self.tokens
            .exchange_authorization_code(login, code, redirect_uri)
            .await
    }

    pub async fn recently_played(&self, login: Option<&str>) -> Res<Envelope<Vec<Track>>> {
        let user = self.tokens.current_user(login).await?;
        let tokens = self.tokens.for_user(&user.login);
        let tracks = self
            .history
            .get_recently_played(&tokens, HISTORY_LIMIT)
            .await?;
        Ok(Envelope::ok(tracks, 200))
    }

    pub async fn suggested_playlist(&self, login: Option<&str>) -> Res<Envelope<Vec<Track>>> {
        let user = self.tokens.current_user(login).await?;
        let tokens = self.tokens.for_user(&user.login);
        self.recommendations.get_suggested_playlist(&tokens).await
    }

    pub async fn add_tracks(&self, login: Option<&str>, tracks: &[Track]) -> Res<Envelope<()>> {
        self.playlists.add_tracks(login, tracks).await
    }

    pub async fn unfollow_playlist(&self, principal: &str) -> Res<Envelope<()>> {
        self.playlists.unfollow_playlist(principal).await
    }

    pub async fn current_profile(&self, login: Option<&str>) -> Res<Envelope<Option<Profile>>> {
        let user = self.tokens.current_user(login).await?;
        let token = self.tokens.ensure_fresh(&user.login).await?;
        self.client.get::<Profile>(&token, "/me", &[]).await
    }
}
