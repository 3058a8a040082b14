use crate::{Plugtify, error, info, warning};

pub async fn profile(plugtify: &Plugtify, user: Option<&str>) {
    match plugtify.current_profile(user).await {
        Ok(envelope) => match envelope.body {
            Some(profile) => {
                info!("Spotify id: {}", profile.id);
                info!("Name:       {}", profile.display_name.unwrap_or_default());
                info!("Email:      {}", profile.email.unwrap_or_default());
                info!("Country:    {}", profile.country.unwrap_or_default());
                info!("Product:    {}", profile.product.unwrap_or_default());
            }
            None => warning!("Spotify returned an empty profile."),
        },
        Err(e) => error!("Failed to fetch profile: {}", e),
    }
}
