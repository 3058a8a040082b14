use std::sync::Arc;

use async_trait::async_trait;
use chrono::{DateTime, Duration, Utc};
use tokio::sync::OwnedMutexGuard;

use crate::{
    Error, Res, info,
    management::{UserLocks, UserStore},
    spotify::{
        auth,
        client::{ApiClient, TokenSource},
    },
    types::{Envelope, Token, User},
};

/// True iff `now >= last_update_time + expires_in`. The boundary itself counts
/// as expired.
pub fn is_expired(token: &Token, now: DateTime<Utc>) -> bool {
    let expires_in = i64::try_from(token.expires_in).unwrap_or(i64::MAX);
    let expires_at = Duration::try_seconds(expires_in)
        .and_then(|ttl| token.last_update_time.checked_add_signed(ttl));

    match expires_at {
        Some(expires_at) => now >= expires_at,
        None => false,
    }
}

/// Owns the token lifecycle of every user: code exchange, expiry checks and
/// refresh grants, each persisted through the [`UserStore`].
pub struct TokenManager {
    client: Arc<ApiClient>,
    store: Arc<dyn UserStore>,
    locks: Arc<UserLocks>,
}

impl TokenManager {
    pub fn new(client: Arc<ApiClient>, store: Arc<dyn UserStore>, locks: Arc<UserLocks>) -> Self {
        Self {
            client,
            store,
            locks,
        }
    }

    /// Resolves the principal passed by the caller to a stored user.
    pub async fn current_user(&self, login: Option<&str>) -> Res<User> {
        let login = login.ok_or(Error::UserNotFound)?;
        self.store
            .find_by_login(login)
            .await?
            .ok_or(Error::UserNotFound)
    }

    /// Returns a usable token for `login`, refreshing and persisting it first
    /// if it has expired.
    ///
    /// The user's lock is held from the expiry check until the refreshed
    /// token is saved, so two concurrent callers refresh at most once.
    pub async fn ensure_fresh(&self, login: &str) -> Res<Token> {
        let guard = self.locks.acquire(login).await;

        let mut user = self
            .store
            .find_by_login(login)
            .await?
            .ok_or(Error::UserNotFound)?;
        self.ensure_fresh_locked(&mut user, &guard).await
    }

    /// [`Self::ensure_fresh`] for a user loaded while the caller holds that
    /// user's lock. The refreshed token is written to `user` and persisted.
    pub async fn ensure_fresh_locked(
        &self,
        user: &mut User,
        _guard: &OwnedMutexGuard<()>,
    ) -> Res<Token> {
        let token = user
            .token
            .clone()
            .ok_or_else(|| Error::Internal("User doesn't have Access Token!".to_string()))?;

        if !is_expired(&token, Utc::now()) {
            return Ok(token);
        }

        info!("Access token of {} expired, refreshing", user.login);
        let refreshed = self.refresh(&token).await?;
        user.token = Some(refreshed.clone());
        self.store.save(user).await?;

        Ok(refreshed)
    }

    /// Token source for `login` that runs [`Self::ensure_fresh`] on every
    /// request it hands a token to.
    pub fn for_user<'a>(&'a self, login: &'a str) -> UserToken<'a> {
        UserToken {
            tokens: self,
            login,
        }
    }

    /// Performs the refresh-token grant and builds the replacement token.
    pub async fn refresh(&self, token: &Token) -> Res<Token> {
        let response = auth::refresh_token(&self.client, &token.refresh_token).await?;
        let body = response
            .body
            .ok_or_else(|| Error::UpstreamAuth("response body is empty".to_string()))?;

        Ok(body.into_token(Some(&token.refresh_token), Utc::now()))
    }

    /// Exchanges an authorization code for a new token owned by the current
    /// user.
    ///
    /// Once the grant call has answered, any token the user already had is
    /// detached and saved *before* the answer is checked for a body. An
    /// answer without a body therefore leaves the user without a token and
    /// fails with [`Error::Internal`].
    pub async fn exchange_authorization_code(
        &self,
        login: Option<&str>,
        code: &str,
        redirect_uri: &str,
    ) -> Res<Envelope<()>> {
        let login = self.current_user(login).await?.login;
        let _guard = self.locks.acquire(&login).await;

        let response = auth::exchange_code(&self.client, code, redirect_uri).await?;

        let mut user = self
            .store
            .find_by_login(&login)
            .await?
            .ok_or(Error::UserNotFound)?;

        if user.token.take().is_some() {
            self.store.save(&user).await?;
        }

        let upstream_status = response.upstream_status;
        let body = response
            .body
            .ok_or_else(|| Error::Internal("token exchange response has no body".to_string()))?;

        user.token = Some(body.into_token(None, Utc::now()));
        self.store.save(&user).await?;
        info!("Stored new access token for {}", user.login);

        Ok(Envelope::ok((), upstream_status))
    }
}

/// Fresh token of one user, checked for expiry each time it is asked for.
pub struct UserToken<'a> {
    tokens: &'a TokenManager,
    login: &'a str,
}

#[async_trait]
impl<'a> TokenSource for UserToken<'a> {
    async fn token(&self) -> Res<Token> {
        self.tokens.ensure_fresh(self.login).await
    }
}
