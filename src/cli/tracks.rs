use tabled::Table;

use crate::{
    Plugtify,
    cli::spinner,
    error, info, success,
    types::{Track, TrackTableRow},
    warning,
};

pub async fn history(plugtify: &Plugtify, user: Option<&str>) {
    let pb = spinner("Fetching recently played tracks...");
    let result = plugtify.recently_played(user).await;
    pb.finish_and_clear();

    match result {
        Ok(envelope) => print_tracks(&envelope.body),
        Err(e) => error!("Failed to fetch recently played tracks: {}", e),
    }
}

pub async fn recommend(plugtify: &Plugtify, user: Option<&str>, sync: bool) {
    let pb = spinner("Building recommendations from your history...");
    let result = plugtify.suggested_playlist(user).await;
    pb.finish_and_clear();

    let tracks = match result {
        Ok(envelope) => envelope.body,
        Err(e) => error!("Failed to build recommendations: {}", e),
    };

    if tracks.is_empty() {
        warning!("No new tracks to recommend.");
        return;
    }

    print_tracks(&tracks);

    if !sync {
        return;
    }

    info!("Sync managed playlist with {} tracks", tracks.len());
    match plugtify.add_tracks(user, &tracks).await {
        Ok(envelope) => success!(
            "Playlist synced (upstream status {}).",
            envelope.upstream_status
        ),
        Err(e) => error!("Failed to sync playlist: {}", e),
    }
}

fn print_tracks(tracks: &[Track]) {
    let rows: Vec<TrackTableRow> = tracks.iter().map(TrackTableRow::from).collect();
    println!("{}", Table::new(rows));
}
