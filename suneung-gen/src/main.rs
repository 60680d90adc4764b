mod classify;
mod credential;
mod driver;
mod models;
mod pane;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use driver::{Driver, GeminiGateway, GenerationRequest};
use llm_client::Config;
use log::debug;
use models::Model;
use pane::ConsolePane;
use std::num::NonZeroU32;
use std::process::ExitCode;
use std::time::Duration;

/// Subject every run asks for
const SUBJECT: &str = "math-I";

/// Problems generated per run
const PROBLEM_COUNT: NonZeroU32 = match NonZeroU32::new(5) {
    Some(count) => count,
    None => panic!("problem count must be non-zero"),
};

#[derive(Parser, Debug)]
#[command(
    name = "suneung",
    about = "Generate CSAT-style math problems with Gemini",
    long_about = "Asks a Gemini model for math-I problems one at a time, pausing between requests to stay under the per-minute quota"
)]
#[command(version)]
struct Args {
    /// Model to use (overrides default from config)
    #[arg(short, long, value_enum)]
    model: Option<Model>,

    /// API key for this run only; leave empty to use the configured keys
    #[arg(short = 'k', long = "api-key")]
    api_key: Option<String>,

    /// Enable debug mode for verbose output
    #[arg(short, long, default_value_t = false)]
    debug: bool,

    /// Configuration subcommand
    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Configuration management
    Config {
        #[command(subcommand)]
        action: ConfigAction,
    },
}

#[derive(Subcommand, Debug)]
enum ConfigAction {
    /// Show current configuration (keys are never printed)
    Show,
    /// List selectable models
    Models,
    /// Set the default model
    SetDefault {
        #[arg(value_enum)]
        model: Model,
    },
    /// Append an API key to the default key list
    AddKey {
        /// The key to store
        key: String,
    },
    /// Set the pause between problems, in seconds
    SetPacing { secs: u64 },
}

/// Handle config subcommands
fn handle_config_command(action: &ConfigAction) -> Result<()> {
    match action {
        ConfigAction::Show => {
            let config = Config::load()?;
            let path = Config::config_path()?;
            println!("Config file: {}", path.display());
            println!();
            println!("default_model: {}", config.default_model);
            println!("pacing_secs:   {}", config.pacing_secs);
            println!(
                "base_url:      {}",
                config.gemini.base_url.as_deref().unwrap_or("(default)")
            );
            println!("api keys:      {} available", config.default_api_keys().len());
        }
        ConfigAction::Models => {
            let config = Config::load()?;
            println!("Available models:");
            for model in Model::ALL {
                let default_marker = if model.id() == config.default_model {
                    " (default)"
                } else {
                    ""
                };
                println!("  {} - {} tier{}", model.id(), model.tier(), default_marker);
            }
        }
        ConfigAction::SetDefault { model } => {
            let mut config = Config::load()?;
            config.default_model = model.id().to_string();
            config.save()?;
            println!("Default model set to: {}", model);
        }
        ConfigAction::AddKey { key } => {
            let mut config = Config::load()?;
            config.add_api_key(key)?;
            config.save()?;
            println!(
                "API key stored ({} configured)",
                config.gemini.api_keys.len()
            );
        }
        ConfigAction::SetPacing { secs } => {
            let mut config = Config::load()?;
            config.pacing_secs = *secs;
            config.save()?;
            println!("Pacing set to {} second(s)", secs);
        }
    }
    Ok(())
}

fn init_logging(debug: bool) {
    let default_filter = if debug {
        "suneung=debug,llm_client=debug"
    } else {
        "warn"
    };
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(default_filter))
        .format_timestamp(None)
        .init();
}

/// Pick the model from the flag, else from config
fn select_model(flag: Option<Model>, config: &Config) -> Result<Model> {
    if let Some(model) = flag {
        return Ok(model);
    }
    Model::from_id(&config.default_model).with_context(|| {
        format!(
            "Configured default_model `{}` is not selectable. Use `suneung config set-default`.",
            config.default_model
        )
    })
}

async fn run() -> Result<ExitCode> {
    let args = Args::parse();
    init_logging(args.debug);

    // Handle config subcommands first (before any gateway setup)
    if let Some(Commands::Config { action }) = &args.command {
        handle_config_command(action)?;
        return Ok(ExitCode::SUCCESS);
    }

    let config = Config::load().context("Failed to load configuration")?;
    let model = select_model(args.model, &config)?;
    debug!("Using model {} ({} tier)", model, model.tier());

    let driver = Driver::new(
        GeminiGateway::from_config(&config.gemini),
        config.default_api_keys(),
        Duration::from_secs(config.pacing_secs),
    );
    let request = GenerationRequest {
        subject: SUBJECT.to_string(),
        count: PROBLEM_COUNT,
        model,
        override_credential: args.api_key,
    };

    println!(
        "Generating {} {} problem(s) with {}...\n",
        request.count, request.subject, model
    );

    let mut pane = ConsolePane::stdio();
    let outcome = driver.run(&request, &mut pane).await;

    println!("---");
    match outcome {
        driver::RunOutcome::Completed { count } => {
            println!("Generated: {}", count);
        }
        driver::RunOutcome::Aborted { completed, kind } => {
            println!("Generated: {}, stopped: {}", completed, kind);
        }
    }

    Ok(if outcome.is_completed() {
        ExitCode::SUCCESS
    } else {
        ExitCode::FAILURE
    })
}

#[tokio::main]
async fn main() -> ExitCode {
    match run().await {
        Ok(code) => code,
        Err(e) => {
            eprintln!("Error: {e:#}");
            ExitCode::FAILURE
        }
    }
}
