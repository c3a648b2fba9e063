// Copyright 2026 MikuCast contributors
// SPDX-License-Identifier: AGPL-3.0-or-later

//! MikuCast main entry point - CLI over config resolution and model
//! discovery.

use clap::{Parser, Subcommand, ValueEnum};
use colored::Colorize;

use mikucast::config::{self, ConfigPaths};
use mikucast::providers::ProviderRegistry;
use mikucast::setup::{run_setup, SetupOutcome, SetupRequest};
use mikucast::telemetry::init_telemetry;
use mikucast::Settings;

/// Exit code for a configuration that failed validation.
const EXIT_NEEDS_SETUP: i32 = 2;

/// MikuCast - a command-line AI assistant.
#[derive(Parser)]
#[command(name = "mikucast")]
#[command(author, version, about = "A command-line AI assistant", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Option<Commands>,
}

/// Subcommands for mikucast.
#[derive(Subcommand)]
enum Commands {
    /// Configure a provider and pick a model
    Setup {
        /// Provider key (openai, gemini, anthropic, or a custom name)
        #[arg(short, long)]
        provider: String,

        /// Base URL of the provider API
        #[arg(long)]
        base_url: Option<String>,

        /// API key to store in the secrets file
        #[arg(long, env = "MIKUCAST_SETUP_API_KEY")]
        api_key: Option<String>,

        /// Model to select; when omitted, discovered models are listed
        #[arg(short, long)]
        model: Option<String>,
    },

    /// List models available from a provider
    Models {
        /// Provider key; defaults to the configured provider
        provider: Option<String>,

        /// Output format (text or json)
        #[arg(short, long, default_value = "text")]
        format: OutputFormat,
    },

    /// Show or check configuration
    Config {
        #[command(subcommand)]
        action: ConfigAction,
    },
}

/// Config subcommand actions.
#[derive(Subcommand)]
enum ConfigAction {
    /// Show the effective configuration with secrets redacted
    Show,
    /// Validate the configuration and report violations
    Validate,
}

/// Output format for listings.
#[derive(Debug, Clone, Copy, ValueEnum)]
enum OutputFormat {
    Text,
    Json,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    let paths = ConfigPaths::default_paths()?;
    // Config problems here are fatal; validation problems are not.
    let settings = config::resolve()?;
    let _guard = init_telemetry(&settings.log)?;

    match cli.command {
        Some(Commands::Setup {
            provider,
            base_url,
            api_key,
            model,
        }) => {
            let request = SetupRequest {
                provider,
                base_url,
                api_key,
                model,
            };
            handle_setup(&settings, &paths, request).await
        }
        Some(Commands::Models { provider, format }) => {
            handle_models(&settings, provider, format).await
        }
        Some(Commands::Config { action }) => handle_config(&settings, action),
        None => handle_status(&settings),
    }
}

/// Bare invocation: show whether the configuration is usable.
fn handle_status(settings: &Settings) -> anyhow::Result<()> {
    match settings.validate() {
        Ok(()) => {
            let provider = settings.model.provider.as_deref().unwrap_or("?");
            let model = settings.model.name.as_deref().unwrap_or("?");
            println!(
                "{} using {} via {}",
                "ready".green().bold(),
                model.cyan(),
                provider.cyan()
            );
            Ok(())
        }
        Err(err) => {
            eprintln!("{}", "configuration is incomplete:".yellow().bold());
            for violation in &err.violations {
                eprintln!("  - {violation}");
            }
            eprintln!("\nRun {} to fix it.", "mikucast setup".bold());
            std::process::exit(EXIT_NEEDS_SETUP);
        }
    }
}

async fn handle_setup(
    settings: &Settings,
    paths: &ConfigPaths,
    request: SetupRequest,
) -> anyhow::Result<()> {
    match run_setup(settings, paths, request).await? {
        SetupOutcome::Saved { provider, model } => {
            println!(
                "{} {} via {} saved",
                "ok:".green().bold(),
                model.cyan(),
                provider.cyan()
            );
            Ok(())
        }
        SetupOutcome::ModelChoiceNeeded { models } => {
            println!("Available models:");
            for model in &models {
                println!("  {model}");
            }
            println!(
                "\nRerun with {} to pick one.",
                "--model <NAME>".bold()
            );
            Ok(())
        }
        SetupOutcome::ManualModelNeeded { reason } => {
            match reason {
                Some(err) => eprintln!("{} {err}", "model discovery failed:".yellow().bold()),
                None => eprintln!(
                    "{}",
                    "the provider reported no models".yellow().bold()
                ),
            }
            eprintln!("Rerun with {} to set one manually.", "--model <NAME>".bold());
            Ok(())
        }
    }
}

async fn handle_models(
    settings: &Settings,
    provider: Option<String>,
    format: OutputFormat,
) -> anyhow::Result<()> {
    if let Err(err) = settings.validate() {
        eprintln!("{}", "configuration is incomplete:".yellow().bold());
        for violation in &err.violations {
            eprintln!("  - {violation}");
        }
        eprintln!("\nRun {} first.", "mikucast setup".bold());
        std::process::exit(EXIT_NEEDS_SETUP);
    }

    let key = match provider.or_else(|| settings.model.provider.clone()) {
        Some(key) => key,
        None => anyhow::bail!("no provider configured; pass one or run `mikucast setup`"),
    };

    let registry = ProviderRegistry::new(settings);
    let fetcher = registry.resolve(&key)?;
    let (models, error) = fetcher.fetch_models_or_empty().await;

    if let Some(err) = error {
        eprintln!("{} {err}", "warning:".yellow().bold());
    }

    match format {
        OutputFormat::Json => println!("{}", serde_json::to_string_pretty(&models)?),
        OutputFormat::Text => {
            if models.is_empty() {
                println!("no models reported by {key}");
            } else {
                for model in &models {
                    println!("{model}");
                }
            }
        }
    }
    Ok(())
}

fn handle_config(settings: &Settings, action: ConfigAction) -> anyhow::Result<()> {
    match action {
        ConfigAction::Show => {
            let redacted = settings.redacted();
            println!("{}", toml::to_string_pretty(&redacted)?);
            Ok(())
        }
        ConfigAction::Validate => match settings.validate() {
            Ok(()) => {
                println!("{}", "configuration is valid".green().bold());
                Ok(())
            }
            Err(err) => {
                for violation in &err.violations {
                    eprintln!("  - {violation}");
                }
                std::process::exit(EXIT_NEEDS_SETUP);
            }
        },
    }
}
