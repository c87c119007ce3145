use std::path::PathBuf;
use std::sync::Arc;

use anyhow::Context;
use clap::{Parser, Subcommand};
use futures::StreamExt;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;
use tracing_subscriber::{EnvFilter, fmt};

use mod_intake::channels::cli::CONSOLE_GUILD_ID;
use mod_intake::channels::{Channel, CliChannel, CliParser, DiscordChannel};
use mod_intake::classifier::{ClassifierGateway, LlmClassifier};
use mod_intake::config::BotConfig;
use mod_intake::error::ConfigError;
use mod_intake::evaluation::{Evaluator, load_dataset};
use mod_intake::llm::create_provider;
use mod_intake::platform::{ChatPlatform, DiscordPlatform, MemoryPlatform};
use mod_intake::router::ChannelRouter;
use mod_intake::triage::{QueueKind, TriageQueues};

#[derive(Parser)]
#[command(name = "mod-intake")]
#[command(about = "Abuse-report intake and moderator review bot")]
#[command(version)]
struct Cli {
    #[command(subcommand)]
    command: Option<Command>,
}

#[derive(Subcommand)]
enum Command {
    /// Run the bot (the default)
    Run,
    /// Score the classifier against a labelled dataset
    Eval {
        /// One `<message> <yes|no> <category>` per line
        dataset: PathBuf,
    },
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    // Install rustls crypto provider before any TLS usage
    rustls::crypto::ring::default_provider()
        .install_default()
        .map_err(|_| anyhow::anyhow!("Failed to install rustls crypto provider"))?;

    let config = BotConfig::from_env().context("Failed to load configuration")?;

    // Keep the guard alive so buffered log lines are flushed on exit
    let (file_layer, _log_guard) = match &config.log_dir {
        Some(dir) => {
            std::fs::create_dir_all(dir).map_err(ConfigError::Io)?;
            let appender = tracing_appender::rolling::daily(dir, "mod-intake.log");
            let (writer, guard) = tracing_appender::non_blocking(appender);
            let layer = fmt::layer()
                .with_writer(writer)
                .with_ansi(false)
                .with_target(false);
            (Some(layer), Some(guard))
        }
        None => (None, None),
    };

    tracing_subscriber::registry()
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .with(fmt::layer().with_target(false).with_writer(std::io::stderr))
        .with(file_layer)
        .init();

    let llm = create_provider(&config.llm)?;
    let classifier =
        Arc::new(LlmClassifier::new(llm).with_max_tokens(config.classifier_max_tokens));

    match cli.command.unwrap_or(Command::Run) {
        Command::Run => run_bot(config, classifier).await,
        Command::Eval { dataset } => run_eval(classifier, dataset).await,
    }
}

async fn run_eval(
    classifier: Arc<dyn ClassifierGateway>,
    dataset: PathBuf,
) -> anyhow::Result<()> {
    let examples = load_dataset(&dataset).await?;
    tracing::info!(path = %dataset.display(), examples = examples.len(), "Dataset loaded");

    let report = Evaluator::new(classifier).evaluate(&examples).await?;
    println!("{report}");
    Ok(())
}

async fn run_bot(
    config: BotConfig,
    classifier: Arc<dyn ClassifierGateway>,
) -> anyhow::Result<()> {
    eprintln!("🛡️  Moderation intake v{}", env!("CARGO_PKG_VERSION"));
    eprintln!("   Model: {}", config.llm.model);
    eprintln!("   Monitored channel: #{}", config.router.monitored_channel);
    eprintln!("   Moderator channel: #{}", config.router.mod_channel);

    // Console mode keeps a handle on the memory platform so it can record
    // channel messages as they arrive.
    let (platform, channel, console): (
        Arc<dyn ChatPlatform>,
        Box<dyn Channel>,
        Option<Arc<MemoryPlatform>>,
    ) = match &config.discord {
        Some(discord) => {
            let mut platform = DiscordPlatform::new(discord.bot_token.clone());
            if let Some(base) = &discord.api_base {
                platform = platform.with_api_base(base);
            }
            let mut gateway = DiscordChannel::new(discord.bot_token.clone());
            if let Some(url) = &discord.gateway_url {
                gateway = gateway.with_gateway_url(url);
            }
            eprintln!("   Platform: discord");
            (Arc::new(platform), Box::new(gateway), None)
        }
        None => {
            let console = Arc::new(MemoryPlatform::console());
            let mut parser = CliParser::new();
            for name in [&config.router.monitored_channel, &config.router.mod_channel] {
                let channel = parser.channel_named(name);
                console
                    .add_channel(CONSOLE_GUILD_ID, "console", channel.id, &channel.name)
                    .await;
            }
            eprintln!("   Platform: console");
            (
                console.clone(),
                Box::new(CliChannel::with_parser(parser)),
                Some(console),
            )
        }
    };

    let queues = TriageQueues::new();
    let mut router = ChannelRouter::new(
        config.router.clone(),
        platform,
        classifier,
        Arc::clone(&queues),
    );

    let mut messages = channel.start().await?;
    eprintln!("   Channels: {}\n", channel.name());

    while let Some(msg) = messages.next().await {
        if let Some(console) = &console {
            console.observe(&msg).await;
        }
        if let Err(e) = router.route(&msg).await {
            tracing::error!(message_id = msg.id, error = %e, "Failed to process message");
        }
    }

    channel.shutdown().await?;
    tracing::info!(
        manual = queues.len(QueueKind::Manual).await,
        automated = queues.len(QueueKind::Automated).await,
        "Input closed, shutting down"
    );
    Ok(())
}
