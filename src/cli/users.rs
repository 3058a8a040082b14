use crate::{Plugtify, error, success, types::User, warning};

pub async fn add_user(plugtify: &Plugtify, login: &str, email: &str) {
    let store = plugtify.store();

    match store.find_by_login(login).await {
        Ok(Some(existing)) => {
            warning!("User {} already exists", existing.login);
            return;
        }
        Ok(None) => {}
        Err(e) => error!("Failed to read user store: {}", e),
    }

    let user = User::new(login, email);
    if let Err(e) = store.save(&user).await {
        error!("Failed to save user {}: {}", user.login, e);
    }

    success!(
        "User {} added. Run plugtify --user {} authorize --code <code> next.",
        user.login,
        user.login
    );
}
