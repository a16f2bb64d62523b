// Module-specific lints configuration
#![allow(clippy::uninlined_format_args)]

use anyhow::{Context, Result};
use clap::{Parser, ValueEnum};
use log::{error, info, warn, Level, LevelFilter, Log, Metadata, Record, SetLoggerError};
use std::io::Write;
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Instant;

use sheetwai::app_config::{Config, LogLevel};
use sheetwai::app_controller::{format_duration, Controller};
use sheetwai::errors::AppError;
use sheetwai::file_utils::FileManager;
use sheetwai::language::TranslationDirection;
use sheetwai::translation::{SystemPrompt, TranslationService};
use sheetwai::workbook::ooxml::OoxmlHostFactory;

/// CLI Wrapper for LogLevel to implement ValueEnum
#[derive(Debug, Clone, ValueEnum)]
enum CliLogLevel {
    Error,
    Warn,
    Info,
    Debug,
    Trace,
}

impl From<CliLogLevel> for LogLevel {
    fn from(cli_level: CliLogLevel) -> Self {
        match cli_level {
            CliLogLevel::Error => LogLevel::Error,
            CliLogLevel::Warn => LogLevel::Warn,
            CliLogLevel::Info => LogLevel::Info,
            CliLogLevel::Debug => LogLevel::Debug,
            CliLogLevel::Trace => LogLevel::Trace,
        }
    }
}

/// SheetWAI - spreadsheet translation with AI
///
/// Translates every workbook in the input directory between Vietnamese and
/// Japanese, cell text and shape text alike, keeping the original formatting.
#[derive(Parser, Debug)]
#[command(name = "sheetwai")]
#[command(version)]
#[command(about = "AI-powered workbook translation tool")]
#[command(long_about = "SheetWAI translates the cells and shapes of every workbook in the input directory and writes <name>-translated.<ext> files to the output directory.

EXAMPLES:
    sheetwai                      # Vietnamese to Japanese (default)
    sheetwai --to vi              # Japanese to Vietnamese
    sheetwai --log-level debug    # Verbose diagnostics

CONFIGURATION:
    Configuration is stored in conf.json by default. If the file doesn't exist,
    a default one is created. The API key is read from the config or from the
    environment variable it names (GEMINI_API_KEY by default); a .env file is
    loaded first.")]
struct CommandLineOptions {
    /// Target language: ja (Vietnamese to Japanese) or vi (Japanese to Vietnamese)
    #[arg(long = "to", value_enum)]
    to: Option<TranslationDirection>,

    /// Configuration file path
    #[arg(short, long, default_value = "conf.json")]
    config_path: PathBuf,

    /// Set logging level
    #[arg(short, long, value_enum)]
    log_level: Option<CliLogLevel>,
}

// @struct: Custom logger implementation; filtering follows the global max level
struct CustomLogger;

impl CustomLogger {
    // @initializes: Global logger
    fn init(level: LevelFilter) -> Result<(), SetLoggerError> {
        log::set_boxed_logger(Box::new(CustomLogger))?;
        log::set_max_level(level);
        Ok(())
    }

    // @returns: Emoji for log level
    fn get_emoji_for_level(level: Level) -> &'static str {
        match level {
            Level::Error => "❌",
            Level::Warn => "🚧",
            Level::Info => "",
            Level::Debug => "🔍",
            Level::Trace => "📋",
        }
    }

    // @returns: ANSI colour for log level
    fn get_color_for_level(level: Level) -> &'static str {
        match level {
            Level::Error => "\x1B[1;31m",
            Level::Warn => "\x1B[1;33m",
            Level::Info => "\x1B[1;32m",
            Level::Debug => "\x1B[1;36m",
            Level::Trace => "\x1B[1;35m",
        }
    }
}

impl Log for CustomLogger {
    fn enabled(&self, metadata: &Metadata) -> bool {
        metadata.level() <= log::max_level()
    }

    fn log(&self, record: &Record) {
        if self.enabled(record.metadata()) {
            let now = chrono::Local::now().format("%H:%M:%S%.3f");
            let level = record.level();
            let _ = writeln!(
                std::io::stderr(),
                "{}{} {} {}\x1B[0m",
                Self::get_color_for_level(level),
                now,
                Self::get_emoji_for_level(level),
                record.args()
            );
        }
    }

    fn flush(&self) {
        let _ = std::io::stderr().flush();
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    // Initialize the logger once with info level by default
    // We'll update the level after loading the config if needed
    CustomLogger::init(LevelFilter::Info)?;

    let start_time = Instant::now();
    dotenv::dotenv().ok();

    let options = CommandLineOptions::parse();
    if let Some(cmd_log_level) = &options.log_level {
        log::set_max_level(LogLevel::from(cmd_log_level.clone()).to_level_filter());
    }

    if !options.config_path.exists() {
        warn!("Config file not found at '{}', creating default config.", options.config_path.display());
    }
    let config = Config::load_or_create(&options.config_path)?;
    config.validate()
        .context("Configuration validation failed")?;

    if options.log_level.is_none() {
        log::set_max_level(config.log_level.to_level_filter());
    }

    let direction = options.to.unwrap_or(config.target_language);

    if !FileManager::dir_exists(&config.input_dir) {
        FileManager::ensure_dir(&config.input_dir)?;
        info!("📁 Created input directory: {}", config.input_dir.display());
        info!("Put the workbooks to translate there and run again.");
        return Ok(());
    }

    FileManager::ensure_dir(&config.output_dir)?;
    info!("📂 Output directory: {}", config.output_dir.display());
    info!("🌐 Target language: {}", direction.target_name());

    let system_prompt = SystemPrompt::load_or_create(
        &config.translation.common.system_prompt_file,
        &config.translation.common.delimiter,
    )?;
    let translator = match TranslationService::new(&config.translation, system_prompt) {
        Ok(translator) => translator,
        Err(AppError::DependencyMissing(message)) => {
            error!("{}", message);
            std::process::exit(1);
        }
        Err(e) => return Err(e.into()),
    };
    info!("🤖 Using {} model {}", config.translation.provider.display_name(), translator.model());

    let input_dir = config.input_dir.clone();
    let controller = Controller::new(config, translator, Arc::new(OoxmlHostFactory));
    if let Err(e) = controller.run_folder(&input_dir, direction).await {
        error!("{}", e);
    }

    info!("⏱️ Total execution time: {}", format_duration(start_time.elapsed()));
    Ok(())
}
