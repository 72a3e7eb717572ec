use std::sync::Arc;

use clap::{Parser, Subcommand, ValueEnum};
use tracing_subscriber::{EnvFilter, layer::SubscriberExt, util::SubscriberInitExt};

use skincare_bot::Config;
use skincare_bot::api::ApiClient;
use skincare_bot::bot::Bot;
use skincare_bot::channels::TelegramChannel;
use skincare_bot::llm::OpenRouterProvider;
use skincare_bot::profile::ProfileStore;
use skincare_bot::questionnaire::{FormEngine, InMemoryStateStore};
use skincare_bot::recommendations::RecommendationService;

#[derive(Parser)]
#[command(
    name = "skincare-bot",
    version,
    about = "Telegram skincare questionnaire and recommendation bot"
)]
struct Cli {
    /// Log output format.
    #[arg(long, env = "LOG_FORMAT", value_enum, default_value = "pretty", global = true)]
    log_format: LogFormat,

    #[command(subcommand)]
    command: Option<Command>,
}

#[derive(Subcommand)]
enum Command {
    /// Start long polling (default).
    Run,

    /// Load and validate configuration, then print it with secrets redacted.
    CheckConfig,
}

#[derive(Clone, Copy, Debug, ValueEnum)]
enum LogFormat {
    Pretty,
    Json,
}

fn init_tracing(format: LogFormat, debug: bool) {
    let default_filter = if debug {
        "skincare_bot=debug"
    } else {
        "skincare_bot=info"
    };
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_filter));

    let registry = tracing_subscriber::registry().with(filter);
    match format {
        LogFormat::Pretty => registry
            .with(tracing_subscriber::fmt::layer().with_target(false))
            .init(),
        LogFormat::Json => registry.with(tracing_subscriber::fmt::layer().json()).init(),
    }
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    let config = Config::from_env();
    init_tracing(
        cli.log_format,
        config.as_ref().is_ok_and(|config| config.debug),
    );
    let config = config?;

    match cli.command.unwrap_or(Command::Run) {
        Command::CheckConfig => {
            println!("Configuration OK:\n");
            for line in config.redacted_summary() {
                println!("  {line}");
            }
            Ok(())
        }
        Command::Run => run(config).await,
    }
}

async fn run(config: Config) -> anyhow::Result<()> {
    let api = Arc::new(ApiClient::new(&config.api)?);
    let llm = Arc::new(OpenRouterProvider::new(config.llm.clone())?);
    let transport = Arc::new(TelegramChannel::new(&config.telegram)?);

    let profiles: Arc<dyn ProfileStore> = api.clone();
    let forms = FormEngine::new(Arc::new(InMemoryStateStore::new()), Arc::clone(&profiles));
    let recommendations = RecommendationService::new(
        Arc::clone(&profiles),
        llm,
        config.llm.max_tokens,
        config.llm.temperature,
    );

    tracing::info!(
        api = %config.api.base_url,
        model = %config.llm.model,
        "Starting skincare bot"
    );

    let bot = Arc::new(Bot::new(
        transport,
        forms,
        profiles,
        api,
        recommendations,
        &config.assets,
    ));

    tokio::select! {
        result = bot.run() => result?,
        _ = tokio::signal::ctrl_c() => tracing::info!("Received Ctrl-C, shutting down"),
    }
    Ok(())
}
