//! Plugtify Library
//!
//! This library keeps a per-user Spotify token alive, turns a user's listening
//! history into a recommendation set and keeps one managed playlist per user in
//! sync with that set.
//!
//! # Modules
//!
//! - `api` - HTTP endpoints exposing the operations behind a success envelope
//! - `cli` - Command-line interface implementations
//! - `config` - Configuration management and environment variables
//! - `error` - The crate error type
//! - `management` - Token lifecycle, user store and per-user locking
//! - `server` - Local HTTP server wiring for the `api` endpoints
//! - `service` - The `Plugtify` facade composing all components
//! - `spotify` - Spotify Web API client, history, recommendations and playlists
//! - `types` - Data structures and wire types

pub mod api;
pub mod cli;
pub mod config;
pub mod error;
pub mod management;
pub mod server;
pub mod service;
pub mod spotify;
pub mod types;

pub use error::Error;
pub use service::Plugtify;

/// A convenient Result type alias for operations that may fail.
///
/// Every fallible operation in the crate reports an [`Error`] so callers can
/// match on the failure kind (missing user, upstream failure, empty history...).
pub type Res<T> = std::result::Result<T, Error>;

/// Prints an informational message with a blue bullet point.
///
/// # Example
///
/// ```
/// info!("Refreshing access token for {}", login);
/// ```
#[macro_export]
macro_rules! info {
  ($($arg:tt)*) => ({
    use colored::Colorize;
    println!("[{}] {}", "o".blue().bold(), std::format_args!($($arg)*));
  })
}

/// Prints a success message with a green checkmark.
#[macro_export]
macro_rules! success {
  ($($arg:tt)*) => ({
    use colored::Colorize;
    println!("[{}] {}", "✓".green().bold(), std::format_args!($($arg)*));
  })
}

/// Prints an error message with a red exclamation mark and exits the program.
///
/// Only the binary layer uses this macro. Library code returns [`Error`]
/// instead of terminating the process.
#[macro_export]
macro_rules! error {
  ($($arg:tt)*) => ({
    use colored::Colorize;
    println!("[{}] {}", "!".red().bold(), std::format_args!($($arg)*));
    std::process::exit(1);
  })
}

/// Prints a warning message with a yellow exclamation mark.
///
/// Used for recoverable situations such as a managed playlist that vanished
/// upstream and has to be recreated.
#[macro_export]
macro_rules! warning {
  ($($arg:tt)*) => ({
    use colored::Colorize;
    println!("[{}] {}", "!".yellow().bold(), std::format_args!($($arg)*));
  })
}
