// SPDX-License-Identifier: AGPL-3.0-or-later
// Copyright (C) 2025 Blackman Artificial Intelligence Technologies Inc.

use std::path::Path;
use std::sync::Arc;

use crossterm::{
    style::{Color, ResetColor, SetForegroundColor},
    ExecutableCommand,
};
use indicatif::{ProgressBar, ProgressStyle};
use tokio_util::sync::CancellationToken;

use agentchat::api::{ApiClient, DocumentUploader, Session, SessionStore};
use agentchat::chat::{HttpTransport, RejectReason, StreamController, StreamOutcome};
use agentchat::cli::{
    OutputFormat, SendArgs, SessionsArgs, SessionsCommands, SettingsArgs, SettingsCommands,
    UploadArgs,
};
use agentchat::config::Settings;
use agentchat::error::{ApiError, ChatError, Result};

use super::chat_ui::{print_transcript, TurnRenderer};

/// Send one message and stream the reply until it ends or Ctrl-C cancels it.
pub(super) async fn run_send(args: SendArgs, settings: &Settings) -> Result<()> {
    let api = ApiClient::from_settings(settings);
    let controller = StreamController::new(Arc::new(HttpTransport::new(api)))
        .with_session(args.session.clone());
    let mut turns = controller.subscribe_turn();
    let mut renderer = TurnRenderer::default();

    let text = args.text();
    let send = controller.send_with_documents(&text, args.docs);
    tokio::pin!(send);

    let outcome = loop {
        tokio::select! {
            outcome = &mut send => break outcome,
            changed = turns.changed() => {
                if changed.is_ok() {
                    renderer.render(&turns.borrow_and_update())?;
                }
            }
            _ = tokio::signal::ctrl_c() => {
                controller.cancel();
            }
        }
    };
    renderer.render(&controller.turn())?;
    renderer.finish();

    match outcome {
        StreamOutcome::Completed => Ok(()),
        StreamOutcome::Cancelled => {
            eprintln!("(cancelled)");
            Ok(())
        }
        StreamOutcome::Failed(message) => Err(ApiError::StreamError(message).into()),
        StreamOutcome::Rejected(reason) => Err(ChatError::InvalidInput(
            match reason {
                RejectReason::EmptyMessage => "Message is empty",
                RejectReason::NoSession => "No session selected",
                RejectReason::AlreadyStreaming => "A reply is already streaming",
            }
            .to_string(),
        )),
    }
}

pub(super) async fn run_sessions_command(
    args: SessionsArgs,
    settings: &Settings,
    format: OutputFormat,
) -> Result<()> {
    let store = SessionStore::new(ApiClient::from_settings(settings));

    match args.command {
        SessionsCommands::List => {
            let sessions = store.list().await?;
            if format == OutputFormat::Json {
                println!("{}", serde_json::to_string_pretty(&sessions)?);
            } else if sessions.is_empty() {
                println!("No sessions.");
            } else {
                for session in &sessions {
                    print_session_line(session)?;
                }
            }
        }
        SessionsCommands::Create { title } => {
            let session = store.create(title.as_deref()).await?;
            if format == OutputFormat::Json {
                println!("{}", serde_json::to_string_pretty(&session)?);
            } else {
                println!("Created session {}", session.id);
            }
        }
        SessionsCommands::Show { id } => {
            let detail = store.get(&id).await?;
            if format == OutputFormat::Json {
                let json = serde_json::json!({
                    "session": detail.session,
                    "messages": detail.messages,
                });
                println!("{}", serde_json::to_string_pretty(&json)?);
            } else {
                print_session_line(&detail.session)?;
                println!();
                print_transcript(&detail.messages)?;
            }
        }
        SessionsCommands::Rename { id, title } => {
            store.rename(&id, &title).await?;
            println!("Renamed session {}", id);
        }
        SessionsCommands::Delete { id } => {
            store.delete(&id).await?;
            println!("Deleted session {}", id);
        }
        SessionsCommands::Clear { id } => {
            store.clear_messages(&id).await?;
            println!("Cleared messages in session {}", id);
        }
        SessionsCommands::Stats { id } => {
            let count = store.message_count(&id).await?;
            if format == OutputFormat::Json {
                println!("{}", serde_json::json!({ "message_count": count }));
            } else {
                println!("{} messages", count);
            }
        }
    }

    Ok(())
}

fn print_session_line(session: &Session) -> Result<()> {
    let mut stdout = std::io::stdout();
    stdout.execute(SetForegroundColor(Color::Cyan))?;
    print!("{}", session.id);
    stdout.execute(ResetColor)?;
    print!("  {}", session.title);
    stdout.execute(SetForegroundColor(Color::DarkGrey))?;
    println!("  {}", session.updated_at.format("%Y-%m-%d %H:%M"));
    stdout.execute(ResetColor)?;
    Ok(())
}

pub(super) async fn run_upload(
    args: UploadArgs,
    settings: &Settings,
    format: OutputFormat,
) -> Result<()> {
    let uploader = DocumentUploader::new(
        ApiClient::from_settings(settings),
        settings.upload.clone(),
    );
    let cancel = CancellationToken::new();
    let watcher = tokio::spawn({
        let cancel = cancel.clone();
        async move {
            if tokio::signal::ctrl_c().await.is_ok() {
                cancel.cancel();
            }
        }
    });

    let bar = ProgressBar::new(0);
    if let Ok(style) = ProgressStyle::with_template(
        "{msg} [{bar:30}] {bytes}/{total_bytes} ({bytes_per_sec})",
    ) {
        bar.set_style(style.progress_chars("=> "));
    }
    bar.set_message(
        args.path
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_default(),
    );
    let mut progress = uploader.subscribe_progress();
    let renderer = tokio::spawn({
        let bar = bar.clone();
        async move {
            while progress.changed().await.is_ok() {
                let current = *progress.borrow_and_update();
                bar.set_length(current.total);
                bar.set_position(current.sent);
            }
        }
    });

    let result = uploader.upload(&args.session, &args.path, &cancel).await;
    watcher.abort();
    renderer.abort();
    bar.finish_and_clear();
    let document = result?;

    if format == OutputFormat::Json {
        println!("{}", serde_json::to_string_pretty(&document)?);
    } else {
        println!("{}", document.document_id);
    }
    Ok(())
}

pub(super) fn run_settings_command(
    args: SettingsArgs,
    mut settings: Settings,
    path: &Path,
) -> Result<()> {
    match args.command {
        None | Some(SettingsCommands::Show) => {
            let json = serde_json::to_string_pretty(&settings)?;
            println!("{}", json);
        }
        Some(SettingsCommands::Path) => {
            println!("{}", path.display());
        }
        Some(SettingsCommands::SetBaseUrl { url }) => {
            settings.api.base_url = url.trim().trim_end_matches('/').to_string();
            settings.validate()?;
            settings.save_to(path)?;
            println!("Base URL set to {}", settings.api.base_url);
        }
        Some(SettingsCommands::Reset) => {
            Settings::default().save_to(path)?;
            println!("Settings reset to defaults");
        }
    }
    Ok(())
}
