use crate::{Plugtify, error, success};

pub async fn authorize(
    plugtify: &Plugtify,
    user: Option<&str>,
    code: &str,
    redirect_uri: Option<String>,
) {
    let redirect_uri = redirect_uri.unwrap_or_else(|| plugtify.redirect_uri().to_string());

    match plugtify
        .exchange_authorization_code(user, code, &redirect_uri)
        .await
    {
        Ok(_) => success!("Authorization successful!"),
        Err(e) => error!("Authorization failed: {}", e),
    }
}
