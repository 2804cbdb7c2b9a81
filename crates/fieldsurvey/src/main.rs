//! `fsurvey` - CLI for fieldsurvey
//!
//! This binary runs the field client's screens in a terminal and manages its
//! configuration.

#![warn(missing_debug_implementations)]
#![deny(unsafe_code)]

use std::io::{BufRead, Write};
use std::sync::Arc;

use anyhow::Context;
use clap::Parser;

use fieldsurvey::cli::{Cli, Command, ConfigCommand};
use fieldsurvey::console::{render_archive, run_home, run_login, run_survey, Console};
use fieldsurvey::landing::Route;
use fieldsurvey::notify::{Notifier, TerminalNotifier};
use fieldsurvey::remote::{FirestoreStore, IdentityToolkit, MemoryStore, SurveyStore};
use fieldsurvey::{init_logging, AuthScreen, AuthState, Config, Landing, SurveyWizard};

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    // Initialize logging based on verbosity
    init_logging(cli.verbosity());

    // Load configuration
    let config = Config::load_from(cli.config.clone())?;

    match cli.command {
        Command::Config(config_cmd) => handle_config(&config, config_cmd),
        command => {
            // The screens are single-threaded and event driven.
            let runtime = tokio::runtime::Builder::new_current_thread()
                .enable_all()
                .build()
                .context("failed to start async runtime")?;
            runtime.block_on(run_screens(&config, command))
        }
    }
}

async fn run_screens(config: &Config, command: Command) -> anyhow::Result<()> {
    let mut console = Console::stdio();
    let notifier: Arc<dyn Notifier> = Arc::new(TerminalNotifier::stdout());
    let auth = AuthState::new();

    let route = match command {
        Command::Home => {
            let landing = Landing::mount(&config.landing, auth.clone());
            let route = run_home(&mut console, &landing).await?;
            // Unmounting cancels the caption timer.
            drop(landing);
            route
        }
        Command::Login => Some(Route::Login),
        Command::Survey(cmd) => {
            return survey_screen(&mut console, config, notifier, cmd.dry_run).await;
        }
        Command::Config(_) => None,
    };

    match route {
        Some(Route::Survey) => survey_screen(&mut console, config, notifier, false).await,
        Some(Route::Login) => {
            if login_screen(&mut console, config, notifier, &auth).await? {
                render_archive(console.out())?;
            }
            Ok(())
        }
        Some(Route::Archive) => Ok(render_archive(console.out())?),
        None => Ok(()),
    }
}

async fn survey_screen<R: BufRead, W: Write>(
    console: &mut Console<R, W>,
    config: &Config,
    notifier: Arc<dyn Notifier>,
    dry_run: bool,
) -> anyhow::Result<()> {
    let memory = Arc::new(MemoryStore::new());
    let store: Arc<dyn SurveyStore> = if dry_run {
        memory.clone()
    } else {
        Arc::new(FirestoreStore::from_config(config).context("cannot reach the archive")?)
    };

    let wizard = SurveyWizard::new(store, notifier);
    run_survey(console, &wizard).await?;

    if dry_run {
        memory.dump(console.out())?;
    }
    Ok(())
}

async fn login_screen<R: BufRead, W: Write>(
    console: &mut Console<R, W>,
    config: &Config,
    notifier: Arc<dyn Notifier>,
    auth: &AuthState,
) -> anyhow::Result<bool> {
    let service =
        Arc::new(IdentityToolkit::from_config(config).context("cannot reach the identity service")?);
    let screen = AuthScreen::new(service, notifier, auth.on_login());
    Ok(run_login(console, &screen, auth).await?)
}

fn handle_config(config: &Config, cmd: ConfigCommand) -> anyhow::Result<()> {
    match cmd {
        ConfigCommand::Show { json } => {
            if json {
                let mut shown = config.clone();
                shown.archive.api_key = fieldsurvey::config::mask(&config.archive.api_key).to_string();
                println!("{}", serde_json::to_string_pretty(&shown)?);
            } else {
                let archive = &config.archive;
                println!("Current Configuration");
                println!("=====================");
                println!();
                println!("[Archive]");
                println!("  Project:            {}", archive.project_id);
                println!("  Database:           {}", archive.database);
                println!("  Collection:         {}", archive.collection);
                println!(
                    "  API key:            {}",
                    fieldsurvey::config::mask(&archive.api_key)
                );
                println!("  Document store:     {}", archive.firestore_url);
                println!("  Identity service:   {}", archive.identity_url);
                println!("  Timeout (s):        {}", archive.request_timeout_secs);
                println!();
                println!("[Landing]");
                println!("  Caption:            {}", config.landing.caption);
                println!("  Reveal interval:    {} ms", config.landing.reveal_interval_ms);
            }
        }
        ConfigCommand::Path => {
            println!("{}", Config::default_config_path().display());
        }
        ConfigCommand::Validate { file } => {
            let path = file.unwrap_or_else(Config::default_config_path);
            println!("Validating configuration: {}", path.display());
            if !path.exists() {
                return Err(fieldsurvey::Error::ConfigMissing { path }.into());
            }
            Config::load_from(Some(path))?;
            println!("Configuration is valid.");
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use std::path::PathBuf;

    use super::*;

    #[test]
    fn test_validate_fails_on_invalid_config() {
        figment::Jail::expect_with(|jail| {
            jail.create_file("bad.toml", "[landing]\nreveal_interval_ms = 0\n")?;

            let result = handle_config(
                &Config::default(),
                ConfigCommand::Validate {
                    file: Some(PathBuf::from("bad.toml")),
                },
            );

            let err = result.unwrap_err().to_string();
            assert!(err.contains("reveal_interval_ms"));
            Ok(())
        });
    }

    #[test]
    fn test_validate_fails_on_missing_file() {
        let result = handle_config(
            &Config::default(),
            ConfigCommand::Validate {
                file: Some(PathBuf::from("/nonexistent/fieldsurvey.toml")),
            },
        );
        assert!(result.is_err());
    }

    #[test]
    fn test_validate_accepts_valid_config() {
        figment::Jail::expect_with(|jail| {
            jail.create_file("good.toml", "[archive]\ncollection = \"pilot\"\n")?;

            let result = handle_config(
                &Config::default(),
                ConfigCommand::Validate {
                    file: Some(PathBuf::from("good.toml")),
                },
            );

            assert!(result.is_ok());
            Ok(())
        });
    }
}
