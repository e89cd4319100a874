use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Duration;

use clap::{Parser, Subcommand};
use tokio::io::AsyncBufReadExt;

use export_roster_bot::application::export::process_many;
use export_roster_bot::application::formatters::format_report;
use export_roster_bot::application::messaging::{MessageDispatcher, MessageParser};
use export_roster_bot::application::services::{ProcessingService, ProcessingSettings};
use export_roster_bot::application::session::SessionStore;
use export_roster_bot::domain::traits::Bot;
use export_roster_bot::infrastructure::adapters::console::ConsoleAdapter;
use export_roster_bot::infrastructure::adapters::telegram::{self, TelegramAdapter};
use export_roster_bot::infrastructure::config::Config;
use export_roster_bot::infrastructure::spreadsheet::render_workbook;

/// Pause before retrying a failed getUpdates call
const POLL_RETRY_DELAY: Duration = Duration::from_secs(5);

#[derive(Parser)]
#[command(name = "export-roster-bot")]
#[command(about = "Builds participant rosters from Telegram chat exports", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Config file path
    #[arg(short, long, default_value = "config.yaml")]
    config: String,

    /// Bot token (overrides config)
    #[arg(short, long)]
    token: Option<String>,
}

#[derive(Subcommand)]
enum Commands {
    /// Start the bot
    Run,
    /// Extract participants from local export files
    Scan {
        /// Telegram Desktop JSON exports
        #[arg(required = true)]
        files: Vec<PathBuf>,
        /// Write an Excel workbook here instead of printing a report
        #[arg(long)]
        xlsx: Option<PathBuf>,
    },
    /// Show version
    Version,
    /// Generate default config
    InitConfig {
        /// Write the config to this file instead of printing it
        #[arg(short, long)]
        output: Option<PathBuf>,
    },
}

fn main() {
    // Initialize logging
    tracing_subscriber::fmt()
        .with_target(false)
        .with_env_filter(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive(tracing::Level::INFO.into()),
        )
        .init();

    let cli = Cli::parse();

    match cli.command {
        Commands::Run => {
            run_bot(&cli.config, cli.token);
        }
        Commands::Scan { files, xlsx } => {
            if let Err(e) = scan(&files, xlsx.as_deref()) {
                eprintln!("Error: {}", e);
                std::process::exit(1);
            }
        }
        Commands::Version => {
            println!("export-roster-bot v{}", env!("CARGO_PKG_VERSION"));
        }
        Commands::InitConfig { output } => {
            init_config(output);
        }
    }
}

fn load_config(config_path: &str, token_override: Option<String>) -> Config {
    let mut config = if Path::new(config_path).exists() {
        Config::load(config_path).unwrap_or_else(|e| {
            tracing::warn!("Failed to load config: {}, using defaults", e);
            Config::load_env()
        })
    } else {
        Config::load_env()
    };

    if let Some(token) = token_override {
        let telegram = config.adapters.telegram.get_or_insert_with(|| {
            export_roster_bot::infrastructure::config::TelegramConfig {
                enabled: true,
                token: None,
                poll_timeout_secs: 30,
            }
        });
        telegram.token = Some(token);
        telegram.enabled = true;
    }

    config
}

fn run_bot(config_path: &str, token_override: Option<String>) {
    let config = load_config(config_path, token_override);
    tracing::info!("Starting {}", config.bot.name);

    let rt = match tokio::runtime::Runtime::new() {
        Ok(rt) => rt,
        Err(e) => {
            tracing::error!("Failed to start async runtime: {}", e);
            std::process::exit(1);
        }
    };

    if let Some(token) = config.telegram_token() {
        rt.block_on(run_telegram_bot(TelegramAdapter::new(token), &config));
    } else {
        let output_dir = config.adapters.console
            .as_ref()
            .map(|c| c.output_dir.clone())
            .unwrap_or_else(|| PathBuf::from("./out"));
        rt.block_on(run_console_bot(ConsoleAdapter::new(output_dir), &config));
    }
}

fn build_dispatcher(bot: Arc<dyn Bot>, config: &Config) -> MessageDispatcher {
    let store = Arc::new(SessionStore::new(config.limits.session_ttl(), config.limits.max_files));
    let processor = Arc::new(ProcessingService::new(
        bot.clone(),
        store.clone(),
        ProcessingSettings::from(config),
    ));
    MessageDispatcher::new(bot, store, processor)
}

async fn run_telegram_bot(mut bot: TelegramAdapter, config: &Config) {
    // Fetch bot info
    if let Err(e) = bot.fetch_bot_info().await {
        tracing::error!("Failed to fetch bot info: {}", e);
        return;
    }

    if let Err(e) = bot.register_commands().await {
        tracing::warn!("Failed to register commands: {}", e);
    }

    let info = bot.bot_info();
    tracing::info!("Bot started: @{}", info.username);

    let username = if info.username.is_empty() {
        config.bot.username.clone()
    } else {
        info.username.clone()
    };
    let parser = MessageParser::new(username);
    let timeout_seconds = config.adapters.telegram
        .as_ref()
        .map_or(30, |t| t.poll_timeout_secs);

    let bot = Arc::new(bot);
    let dispatcher = build_dispatcher(bot.clone(), config);

    let mut offset: i64 = 0;
    tracing::info!("Starting message loop...");

    loop {
        let updates = tokio::select! {
            _ = tokio::signal::ctrl_c() => {
                tracing::info!("Shutting down");
                return;
            }
            updates = bot.get_updates(offset, timeout_seconds) => updates,
        };

        match updates {
            Ok(updates) => {
                if !updates.is_empty() {
                    tracing::debug!("Received {} updates", updates.len());
                }
                if let Some(next) = TelegramAdapter::get_next_offset(&updates) {
                    offset = next;
                }
                for update in &updates {
                    if let Some(message) = telegram::to_message(&parser, update) {
                        dispatcher.dispatch(message).await;
                    }
                }
            }
            Err(e) => {
                tracing::warn!("Failed to get updates: {}", e);
                tokio::time::sleep(POLL_RETRY_DELAY).await;
            }
        }
    }
}

async fn run_console_bot(bot: ConsoleAdapter, config: &Config) {
    if let Err(e) = bot.start().await {
        tracing::error!("Failed to start bot: {}", e);
        return;
    }

    let info = bot.bot_info();
    tracing::info!("Bot started: @{}", info.username);
    println!("Type /start to begin, /file <path> to upload an export, /go to process.");

    let parser = MessageParser::new(info.username);
    let dispatcher = build_dispatcher(Arc::new(bot), config);
    let mut lines = tokio::io::BufReader::new(tokio::io::stdin()).lines();

    // Main loop (for console mode)
    loop {
        let line = tokio::select! {
            _ = tokio::signal::ctrl_c() => break,
            line = lines.next_line() => line,
        };

        match line {
            Ok(Some(line)) => {
                if let Some(message) = ConsoleAdapter::to_message(&parser, &line) {
                    dispatcher.dispatch(message).await;
                }
            }
            Ok(None) => break,
            Err(e) => {
                tracing::error!("Failed to read stdin: {}", e);
                break;
            }
        }
    }
    tracing::info!("Console session closed");
}

fn scan(files: &[PathBuf], xlsx: Option<&Path>) -> Result<(), Box<dyn std::error::Error>> {
    let result = process_many(files)?;

    match xlsx {
        Some(out) => {
            let bytes = render_workbook(&result, chrono::Utc::now())?;
            std::fs::write(out, bytes)?;
            println!(
                "Wrote {} ({} participants, {} mentions, {} channels, {} unique users)",
                out.display(),
                result.participants.len(),
                result.mentions.len(),
                result.channels.len(),
                result.unique_users_count()
            );
        }
        None => {
            let names: Vec<String> = files
                .iter()
                .map(|f| {
                    f.file_name()
                        .map(|n| n.to_string_lossy().into_owned())
                        .unwrap_or_else(|| f.display().to_string())
                })
                .collect();
            let names: Vec<&str> = names.iter().map(String::as_str).collect();
            print!("{}", format_report(&names, &result));
            println!("\nUnique users: {}", result.unique_users_count());
        }
    }

    Ok(())
}

fn init_config(output: Option<PathBuf>) {
    let config = Config::default();
    let result = match output {
        Some(path) => config.save(&path).map(|()| {
            println!("Default config written to {}", path.display());
        }),
        None => config.to_yaml().map(|yaml| {
            println!("{}", yaml);
            println!("\nSave this to config.yaml and adjust as needed.");
        }),
    };

    if let Err(e) = result {
        eprintln!("Error: {}", e);
        std::process::exit(1);
    }
}
