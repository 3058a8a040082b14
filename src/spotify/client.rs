use async_trait::async_trait;
use base64::{Engine, engine::general_purpose::STANDARD};
use reqwest::{Client, Method, RequestBuilder, StatusCode, header::AUTHORIZATION};
use serde::{Serialize, de::DeserializeOwned};
use serde_json::Value;

use crate::{
    Error, Res,
    config::SpotifyConfig,
    types::{Envelope, Token},
};

/// Hands out the token to use for the next catalog call.
///
/// Multi-call pipelines ask for a token before every request, so a token
/// that expires halfway through is refreshed before the next call goes out.
#[async_trait]
pub trait TokenSource: Send + Sync {
    async fn token(&self) -> Res<Token>;
}

/// A fixed token, used as is for every call.
#[async_trait]
impl TokenSource for Token {
    async fn token(&self) -> Res<Token> {
        Ok(self.clone())
    }
}

/// Authenticated request executor for the Spotify catalog and auth APIs.
///
/// Catalog calls are JSON and carry `Authorization: {token_type} {access_token}`.
/// Grant calls are form-urlencoded and carry the client's Basic credentials.
///
/// Every call resolves to one of:
/// - `Ok(Envelope)` for a 2xx answer; the body is `None` when upstream sent none
/// - `Err(Error::Upstream)` for a transport failure, a timeout (`status: None`)
///   or a non-2xx answer (`status: Some(code)` plus the upstream message)
pub struct ApiClient {
    http: Client,
    config: SpotifyConfig,
}

impl ApiClient {
    pub fn new(config: SpotifyConfig) -> Res<Self> {
        let http = Client::builder()
            .timeout(config.timeout)
            .build()
            .map_err(|e| Error::Internal(format!("failed to build http client: {e}")))?;

        Ok(Self { http, config })
    }

    pub fn config(&self) -> &SpotifyConfig {
        &self.config
    }

    pub async fn get<T: DeserializeOwned>(
        &self,
        token: &Token,
        path: &str,
        query: &[(&str, String)],
    ) -> Res<Envelope<Option<T>>> {
        let request = self.catalog(Method::GET, path, token).query(query);
        self.execute(request).await
    }

    pub async fn post<B, T>(&self, token: &Token, path: &str, body: &B) -> Res<Envelope<Option<T>>>
    where
        B: Serialize + ?Sized,
        T: DeserializeOwned,
    {
        let request = self.catalog(Method::POST, path, token).json(body);
        self.execute(request).await
    }

    pub async fn put<B, T>(&self, token: &Token, path: &str, body: &B) -> Res<Envelope<Option<T>>>
    where
        B: Serialize + ?Sized,
        T: DeserializeOwned,
    {
        let request = self.catalog(Method::PUT, path, token).json(body);
        self.execute(request).await
    }

    pub async fn delete<T: DeserializeOwned>(
        &self,
        token: &Token,
        path: &str,
    ) -> Res<Envelope<Option<T>>> {
        let request = self.catalog(Method::DELETE, path, token);
        self.execute(request).await
    }

    /// Posts an OAuth grant (authorization code or refresh token) to the token
    /// endpoint.
    pub async fn grant<T: DeserializeOwned>(
        &self,
        form: &[(&str, &str)],
    ) -> Res<Envelope<Option<T>>> {
        let request = self
            .http
            .post(&self.config.token_url)
            .header(AUTHORIZATION, self.basic_authorization())
            .form(form);

        self.execute(request).await
    }

    /// `Basic base64(client_id:client_secret)`.
    pub fn basic_authorization(&self) -> String {
        let credentials = format!("{}:{}", self.config.client_id, self.config.client_secret);
        format!("Basic {}", STANDARD.encode(credentials))
    }

    fn catalog(&self, method: Method, path: &str, token: &Token) -> RequestBuilder {
        let url = format!("{}{}", self.config.api_url.trim_end_matches('/'), path);
        self.http
            .request(method, url)
            .header(AUTHORIZATION, token.authorization())
    }

    async fn execute<T: DeserializeOwned>(
        &self,
        request: RequestBuilder,
    ) -> Res<Envelope<Option<T>>> {
        let response = request.send().await?;
        let status = response.status();
        let text = response.text().await?;

        if !status.is_success() {
            return Err(Error::Upstream {
                status: Some(status.as_u16()),
                message: upstream_message(status, &text),
            });
        }

        let body = if text.trim().is_empty() {
            None
        } else {
            let parsed = serde_json::from_str::<T>(&text).map_err(|e| Error::Upstream {
                status: Some(status.as_u16()),
                message: format!("invalid response body: {e}"),
            })?;
            Some(parsed)
        };

        Ok(Envelope::ok(body, status.as_u16()))
    }
}

/// Pulls the message out of `{"error": {"message": ..}}` or the OAuth
/// `{"error_description": ..}` shape, falling back to the raw body.
fn upstream_message(status: StatusCode, body: &str) -> String {
    if let Ok(json) = serde_json::from_str::<Value>(body) {
        let message = json["error"]["message"]
            .as_str()
            .or_else(|| json["error_description"].as_str())
            .or_else(|| json["error"].as_str());
        if let Some(message) = message {
            return message.to_string();
        }
    }

    if body.trim().is_empty() {
        status
            .canonical_reason()
            .unwrap_or("unknown upstream error")
            .to_string()
    } else {
        body.trim().to_string()
    }
}
