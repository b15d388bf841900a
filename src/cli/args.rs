// SPDX-License-Identifier: AGPL-3.0-or-later
// Copyright (C) 2025 Blackman Artificial Intelligence Technologies Inc.

//! CLI argument definitions using Clap
//!
//! Defines all command-line arguments and subcommands for agentchat.

use clap::{Parser, Subcommand, ValueEnum};
use std::path::PathBuf;

/// agentchat - terminal client for the agent chat backend
#[derive(Parser, Debug)]
#[command(name = "agentchat")]
#[command(version, about = "Terminal client for the agent chat backend")]
#[command(propagate_version = true)]
pub struct Cli {
    /// Config file path
    #[arg(long, global = true)]
    pub config: Option<PathBuf>,

    /// Verbosity level (-v, -vv)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    pub verbose: u8,

    /// Output format
    #[arg(long, global = true, default_value = "text")]
    pub format: OutputFormat,

    #[command(subcommand)]
    pub command: Commands,
}

/// Available subcommands
#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Send a message and stream the agent's reply
    Send(SendArgs),

    /// Manage chat sessions
    Sessions(SessionsArgs),

    /// Upload a document to a session
    Upload(UploadArgs),

    /// Show or change configuration
    #[command(alias = "config")]
    Settings(SettingsArgs),
}

/// Arguments for the send subcommand
#[derive(clap::Args, Debug)]
pub struct SendArgs {
    /// Session to send to
    #[arg(short, long)]
    pub session: String,

    /// Uploaded document ids to attach
    #[arg(short, long = "doc")]
    pub docs: Vec<String>,

    /// Message text
    #[arg(required = true, num_args = 1..)]
    pub message: Vec<String>,
}

impl SendArgs {
    /// Message words joined with spaces
    pub fn text(&self) -> String {
        self.message.join(" ")
    }
}

/// Arguments for the sessions subcommand
#[derive(clap::Args, Debug)]
pub struct SessionsArgs {
    #[command(subcommand)]
    pub command: SessionsCommands,
}

/// Sessions subcommands
#[derive(Subcommand, Debug)]
pub enum SessionsCommands {
    /// List all sessions
    List,

    /// Create a session
    Create {
        /// Session title
        #[arg(short, long)]
        title: Option<String>,
    },

    /// Show a session and its messages
    Show {
        id: String,
    },

    /// Rename a session
    Rename {
        id: String,
        title: String,
    },

    /// Delete a session
    Delete {
        id: String,
    },

    /// Delete all messages in a session
    Clear {
        id: String,
    },

    /// Show the stored message count
    Stats {
        id: String,
    },
}

/// Arguments for the upload subcommand
#[derive(clap::Args, Debug)]
pub struct UploadArgs {
    /// Session to attach the document to
    #[arg(short, long)]
    pub session: String,

    /// File to upload
    pub path: PathBuf,
}

/// Arguments for the settings subcommand
#[derive(clap::Args, Debug)]
pub struct SettingsArgs {
    #[command(subcommand)]
    pub command: Option<SettingsCommands>,
}

/// Settings subcommands
#[derive(Subcommand, Debug)]
pub enum SettingsCommands {
    /// Show current configuration
    Show,

    /// Print the settings file path
    Path,

    /// Set the backend base URL
    SetBaseUrl {
        url: String,
    },

    /// Reset configuration to defaults
    Reset,
}

/// Output format for listings
#[derive(ValueEnum, Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum OutputFormat {
    /// Plain text output
    #[default]
    Text,

    /// JSON output
    Json,
}
