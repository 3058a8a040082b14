use std::sync::Arc;

use crate::{Plugtify, config, error, info, server};

pub async fn serve(plugtify: Plugtify, addr: Option<String>) {
    let addr = addr.unwrap_or_else(config::server_addr);
    info!("Serving Plugtify API on http://{}", addr);

    if let Err(e) = server::start_api_server(Arc::new(plugtify), &addr).await {
        error!("API server stopped: {}", e);
    }
}
