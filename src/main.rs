use anyhow::Result;
use clap::{Parser, Subcommand};
use profile_insights::core::config_manager::LoggingConfig;
use profile_insights::profile_cli::{handle_profile_command, ProfileCli};
use profile_insights::{start_web_server, ConfigManager};
use tracing::info;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;
use tracing_subscriber::{fmt, EnvFilter, Registry};

const DEFAULT_LOG_FILTER: &str = "profile_insights=info,rocket=warn";

#[derive(Parser)]
#[command(name = "profile-insights")]
#[command(about = "LinkedIn profile analysis backend")]
struct Cli {
    #[command(subcommand)]
    command: Option<Command>,
}

#[derive(Subcommand)]
enum Command {
    /// Run the HTTP API (default)
    Serve,
    /// Operate on stored profiles
    Profiles(ProfileCli),
}

fn init_tracing(logging: &LoggingConfig) {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| {
        EnvFilter::new(logging.filter.as_deref().unwrap_or(DEFAULT_LOG_FILTER))
    });

    Registry::default()
        .with((!logging.json).then(|| fmt::layer()))
        .with(logging.json.then(|| fmt::layer().json().with_current_span(false)))
        .with(filter)
        .init();
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    let config = ConfigManager::load()?;
    init_tracing(&config.logging);
    info!("{}", config.summary());

    match cli.command.unwrap_or(Command::Serve) {
        Command::Serve => {
            info!("Starting profile insights ({})", config.environment_name);
            start_web_server(config).await
        }
        Command::Profiles(profile_cli) => handle_profile_command(profile_cli, &config).await,
    }
}
