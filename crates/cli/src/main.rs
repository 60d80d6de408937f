mod commands;

use {
    clap::{Parser, Subcommand},
    tracing::info,
    tracing_subscriber::{EnvFilter, fmt, layer::SubscriberExt, util::SubscriberInitExt},
};

#[derive(Parser)]
#[command(name = "inkctl", version, about = "inkctl — publish articles to Medium")]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Enable debug output.
    #[arg(long, short = 'd', global = true, default_value_t = false)]
    debug: bool,

    /// Log level (trace, debug, info, warn, error).
    #[arg(long, global = true, default_value = "warn")]
    log_level: String,

    /// Output logs as JSON instead of human-readable.
    #[arg(long, global = true, default_value_t = false)]
    json_logs: bool,
}

#[derive(Subcommand)]
enum Commands {
    /// Set up the API credential with OAuth.
    #[command(alias = "a")]
    Auth {
        /// Client ID of the OAuth application.
        #[arg(long, short = 'i')]
        client_id: String,
        /// Client secret of the OAuth application.
        #[arg(long, short = 's')]
        client_secret: String,
        /// Redirect URI registered with the OAuth application
        /// (e.g. http://127.0.0.1:4000/callback).
        #[arg(long, short = 'r')]
        redirect_uri: String,
    },
    /// Refresh the stored API credential.
    #[command(alias = "r")]
    Refresh,
    /// Show the current user and their publications.
    #[command(alias = "i")]
    Info,
    /// Post an article to the current user's profile.
    #[command(alias = "u")]
    User {
        /// Markdown or HTML file, with optional YAML front matter.
        file: std::path::PathBuf,
    },
    /// Post an article to one of the user's publications.
    #[command(alias = "p")]
    Publication {
        /// Markdown or HTML file; `publicationNumber` in its front matter
        /// selects the publication.
        file: std::path::PathBuf,
    },
}

fn init_telemetry(cli: &Cli) {
    let default = if cli.debug { "debug" } else { &cli.log_level };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default));

    if cli.json_logs {
        tracing_subscriber::registry()
            .with(filter)
            .with(fmt::layer().json().with_target(true).with_thread_ids(false))
            .init();
    } else {
        tracing_subscriber::registry()
            .with(filter)
            .with(
                fmt::layer()
                    .with_target(false)
                    .with_thread_ids(false)
                    .with_ansi(true),
            )
            .init();
    }
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();
    let cli = Cli::parse();
    init_telemetry(&cli);

    info!(version = env!("CARGO_PKG_VERSION"), "inkctl starting");

    match cli.command {
        Commands::Auth {
            client_id,
            client_secret,
            redirect_uri,
        } => commands::auth(&client_id, &client_secret, &redirect_uri).await,
        Commands::Refresh => commands::refresh().await,
        Commands::Info => commands::info().await,
        Commands::User { file } => commands::post(&file, true).await,
        Commands::Publication { file } => commands::post(&file, false).await,
    }
}
