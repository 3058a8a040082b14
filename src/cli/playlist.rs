use crate::{Plugtify, error, success};

pub async fn unfollow(plugtify: &Plugtify, user: Option<&str>) {
    let Some(principal) = user else {
        error!("No user given. Pass --user <login>.");
    };

    match plugtify.unfollow_playlist(principal).await {
        Ok(_) => success!("Managed playlist unfollowed."),
        Err(e) => error!("Failed to unfollow playlist: {}", e),
    }
}
