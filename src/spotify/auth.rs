use crate::{
    Res,
    spotify::client::ApiClient,
    types::{Envelope, TokenResponse},
};

/// Exchanges a refresh token for a new access token.
///
/// Uses the `refresh_token` grant type against the token endpoint with the
/// client's Basic credentials. The response may or may not rotate the refresh
/// token; callers decide what to keep.
///
/// # Returns
///
/// - `Ok(Envelope)` whose body is `None` when the endpoint answered without one
/// - `Err(Error::Upstream)` on transport failures and non-2xx answers
pub async fn refresh_token(
    client: &ApiClient,
    refresh_token: &str,
) -> Res<Envelope<Option<TokenResponse>>> {
    client
        .grant(&[
            ("grant_type", "refresh_token"),
            ("refresh_token", refresh_token),
        ])
        .await
}

/// Exchanges an authorization code for an access/refresh token pair.
///
/// `redirect_uri` must match the one used when the code was issued.
pub async fn exchange_code(
    client: &ApiClient,
    code: &str,
    redirect_uri: &str,
) -> Res<Envelope<Option<TokenResponse>>> {
    client
        .grant(&[
            ("grant_type", "authorization_code"),
            ("code", code),
            ("redirect_uri", redirect_uri),
        ])
        .await
}
