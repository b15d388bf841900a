// SPDX-License-Identifier: AGPL-3.0-or-later
// Copyright (C) 2025 Blackman Artificial Intelligence Technologies Inc.

//! agentchat - terminal client for the agent chat backend
//!
//! Entry point for the agentchat CLI application.

use clap::Parser;

use agentchat::cli::{Cli, Commands};
use agentchat::config::Settings;
use agentchat::error::Result;

#[path = "main/chat_ui.rs"]
mod chat_ui;
#[path = "main/cli_commands.rs"]
mod cli_commands;

use cli_commands::{run_send, run_sessions_command, run_settings_command, run_upload};

#[tokio::main]
async fn main() -> Result<()> {
    // Parse CLI arguments
    let cli = Cli::parse();

    // Initialize tracing
    let mut env_filter = tracing_subscriber::EnvFilter::from_default_env()
        .add_directive(tracing::Level::WARN.into());

    // `-v` turns on stream diagnostics without knowing target names
    if cli.verbose > 0 {
        let level = if cli.verbose > 1 { "trace" } else { "debug" };
        for target in [
            "agentchat.controller",
            "agentchat.stream",
            "agentchat.api",
            "agentchat.upload",
        ] {
            if let Ok(parsed) = format!("{}={}", target, level).parse() {
                env_filter = env_filter.add_directive(parsed);
            }
        }
    }

    tracing_subscriber::fmt()
        .with_env_filter(env_filter)
        .with_writer(std::io::stderr)
        .init();

    // Load settings
    let settings_path = cli.config.clone().unwrap_or_else(Settings::default_path);
    let settings = Settings::load_from(&settings_path)?;

    let format = cli.format;
    match cli.command {
        Commands::Send(args) => run_send(args, &settings).await?,
        Commands::Sessions(args) => run_sessions_command(args, &settings, format).await?,
        Commands::Upload(args) => run_upload(args, &settings, format).await?,
        Commands::Settings(args) => run_settings_command(args, settings, &settings_path)?,
    }

    Ok(())
}
