//! # CLI Module
//!
//! Command-line front end for Plugtify. Every command acts on behalf of the
//! user given with the global `--user` flag and reports through the crate's
//! console macros.
//!
//! ## Commands
//!
//! - [`add_user`] - Records a user in the local user store
//! - [`authorize`] - Exchanges an authorization code for a token
//! - [`history`] - Lists recently played tracks with their audio features
//! - [`recommend`] - Lists recommended tracks, optionally syncing the managed playlist
//! - [`unfollow`] - Unfollows the managed playlist
//! - [`profile`] - Shows the Spotify profile of the user
//! - [`serve`] - Starts the HTTP API
//!
//! ## Usage Patterns
//!
//! ```bash
//! plugtify users add --login jane --email jane@example.com
//! plugtify --user jane authorize --code AQD...
//! plugtify --user jane recommend --sync
//! plugtify --user jane unfollow
//! ```

mod auth;
mod playlist;
mod profile;
mod serve;
mod tracks;
mod users;

use std::time::Duration;

use indicatif::{ProgressBar, ProgressStyle};

pub use auth::authorize;
pub use playlist::unfollow;
pub use profile::profile;
pub use serve::serve;
pub use tracks::history;
pub use tracks::recommend;
pub use users::add_user;

fn spinner(message: &'static str) -> ProgressBar {
    let pb = ProgressBar::new_spinner();
    pb.set_message(message);
    pb.enable_steady_tick(Duration::from_millis(100));
    if let Ok(style) = ProgressStyle::with_template("{spinner:.blue} {msg}") {
        pb.set_style(style.tick_chars("⠋⠙⠹⠸⠼⠴⠦⠧⠇⠏"));
    }
    pb
}
