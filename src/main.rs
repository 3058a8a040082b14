use std::sync::Arc;

use clap::{ArgAction, CommandFactory, Parser, Subcommand};
use clap_complete::{Shell, generate};
use plugtify::{
    Plugtify, cli,
    config::{self, SpotifyConfig},
    error,
    management::FileUserStore,
};

#[derive(Parser, Debug)]
#[command(
    name = "plugtify",
    version,
    about = "Recommendations from your Spotify history, kept in one playlist",
    long_about = None
)]
struct Cli {
    /// Login of the user to act for
    #[clap(long, global = true)]
    user: Option<String>,

    /// Print more details about each step
    #[clap(long, short = 'v', global = true, action = ArgAction::SetTrue)]
    verbose: bool,

    #[command(subcommand)]
    command: Command,
}

impl Cli {
    fn command_for_update() -> clap::Command {
        <Self as CommandFactory>::command()
    }
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Manage locally known users
    Users(UsersOptions),
    /// Exchange an authorization code for a Spotify token
    Authorize(AuthorizeOptions),
    /// Show recently played tracks
    History,
    /// Show recommended tracks based on your history
    Recommend(RecommendOptions),
    /// Unfollow the managed playlist
    Unfollow,
    /// Show the Spotify profile
    Profile,
    /// Start the HTTP API
    Serve(ServeOptions),
    /// Generate shell completions
    Completions(CompletionsOption),
}

#[derive(Parser, Debug, Clone)]
struct UsersOptions {
    #[command(subcommand)]
    command: UsersSubcommand,
}

#[derive(Subcommand, Debug, Clone)]
enum UsersSubcommand {
    /// Add a user to the local store
    Add(AddUserOptions),
}

#[derive(Parser, Debug, Clone)]
struct AddUserOptions {
    #[clap(long)]
    login: String,
    #[clap(long)]
    email: String,
}

#[derive(Parser, Debug, Clone)]
struct AuthorizeOptions {
    /// Authorization code returned by Spotify
    #[clap(long)]
    code: String,
    /// Redirect URI the code was issued for (defaults to SPOTIFY_API_REDIRECT_URI)
    #[clap(long)]
    redirect_uri: Option<String>,
}

#[derive(Parser, Debug, Clone)]
struct RecommendOptions {
    /// Also replace the managed playlist with the recommendations
    #[clap(long)]
    sync: bool,
}

#[derive(Parser, Debug, Clone)]
struct ServeOptions {
    /// Address to bind (defaults to SERVER_ADDRESS)
    #[clap(long)]
    addr: Option<String>,
}

#[derive(Parser, Debug, Clone)]
struct CompletionsOption {
    shell: Shell,
}

#[tokio::main]
async fn main() {
    let cli = Cli::parse();

    if let Command::Completions(opt) = &cli.command {
        let mut cmd = Cli::command_for_update();
        let name = cmd.get_name().to_string();
        generate(opt.shell, &mut cmd, name, &mut std::io::stdout());
        return;
    }

    if let Err(e) = config::load_env().await {
        error!("Cannot load environment. Err: {}", e);
    }

    let spotify_config = match SpotifyConfig::from_env() {
        Ok(c) => c,
        Err(e) => error!("{}", e),
    };

    let users_path = config::users_path();
    if cli.verbose {
        plugtify::info!("Using user store {}", users_path.display());
        plugtify::info!("Using Spotify API {}", spotify_config.api_url);
    }

    let store = Arc::new(FileUserStore::new(users_path));
    let plugtify = match Plugtify::new(spotify_config, store) {
        Ok(p) => p,
        Err(e) => error!("Cannot initialize Plugtify. Err: {}", e),
    };

    let user = cli.user.as_deref();

    match cli.command {
        Command::Users(opt) => match opt.command {
            UsersSubcommand::Add(a) => cli::add_user(&plugtify, &a.login, &a.email).await,
        },
        Command::Authorize(opt) => {
            cli::authorize(&plugtify, user, &opt.code, opt.redirect_uri).await
        }
        Command::History => cli::history(&plugtify, user).await,
        Command::Recommend(opt) => cli::recommend(&plugtify, user, opt.sync).await,
        Command::Unfollow => cli::unfollow(&plugtify, user).await,
        Command::Profile => cli::profile(&plugtify, user).await,
        Command::Serve(opt) => cli::serve(plugtify, opt.addr).await,
        Command::Completions(_) => {}
    }
}
