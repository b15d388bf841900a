// SPDX-License-Identifier: AGPL-3.0-or-later
// Copyright (C) 2025 Blackman Artificial Intelligence Technologies Inc.

use std::collections::HashMap;
use std::io::{self, Write};

use crossterm::{
    style::{Color, ResetColor, SetForegroundColor},
    ExecutableCommand,
};

use agentchat::chat::{ChatMessage, Role, Turn};
use agentchat::error::Result;
use agentchat::stream::{AgentStep, StepStatus};

/// Prints a live turn incrementally from successive snapshots.
///
/// Reply text goes to stdout; steps, status and errors go to stderr.
#[derive(Debug, Default)]
pub(super) struct TurnRenderer {
    /// Bytes of reply text already written
    printed: usize,
    steps: HashMap<i64, StepStatus>,
    status: Option<String>,
    error_shown: bool,
    summarized_shown: bool,
}

impl TurnRenderer {
    pub(super) fn render(&mut self, turn: &Turn) -> Result<()> {
        let mut stderr = io::stderr();

        if turn.was_summarized() && !self.summarized_shown {
            self.summarized_shown = true;
            stderr.execute(SetForegroundColor(Color::Yellow))?;
            eprintln!("(conversation history was summarized)");
            stderr.execute(ResetColor)?;
        }

        for step in turn.steps() {
            if self.steps.get(&step.step_index) != Some(&step.status) {
                self.steps.insert(step.step_index, step.status);
                print_step(step)?;
            }
        }

        let status = turn.status().map(str::to_owned);
        if status != self.status {
            if let Some(ref text) = status {
                stderr.execute(SetForegroundColor(Color::DarkGrey))?;
                eprintln!("{}...", text);
                stderr.execute(ResetColor)?;
            }
            self.status = status;
        }

        let text = turn.text();
        if text.len() > self.printed {
            let mut stdout = io::stdout();
            write!(stdout, "{}", &text[self.printed..])?;
            stdout.flush()?;
            self.printed = text.len();
        }

        if let Some(error) = turn.error() {
            if !self.error_shown {
                self.error_shown = true;
                stderr.execute(SetForegroundColor(Color::Red))?;
                eprintln!("\n[{}] {}", error.kind, error.message);
                stderr.execute(ResetColor)?;
            }
        }

        Ok(())
    }

    /// Terminate the reply line
    pub(super) fn finish(&self) {
        if self.printed > 0 {
            println!();
        }
    }
}

fn print_step(step: &AgentStep) -> Result<()> {
    let mut stderr = io::stderr();
    let color = match step.status {
        StepStatus::Success => Color::Green,
        StepStatus::Error => Color::Red,
        _ => Color::Blue,
    };
    stderr.execute(SetForegroundColor(Color::DarkGrey))?;
    eprint!("[step {}] ", step.step_index);
    stderr.execute(SetForegroundColor(Color::Magenta))?;
    eprint!("{}", step.agent_name);
    stderr.execute(ResetColor)?;
    eprint!(" {} ", step.action);
    stderr.execute(SetForegroundColor(color))?;
    eprintln!("({})", step.status.as_str());
    stderr.execute(ResetColor)?;
    Ok(())
}

/// Print a stored transcript
pub(super) fn print_transcript(messages: &[ChatMessage]) -> Result<()> {
    let mut stdout = io::stdout();
    for message in messages {
        let (label, color) = match message.role {
            Role::User => ("you", Color::Cyan),
            Role::Assistant => ("agent", Color::Green),
        };
        stdout.execute(SetForegroundColor(color))?;
        print!("{} ", label);
        stdout.execute(SetForegroundColor(Color::DarkGrey))?;
        println!("{}", message.created_at.format("%Y-%m-%d %H:%M"));
        stdout.execute(ResetColor)?;
        println!("{}", message.content);
        if let Some(trace) = &message.trace {
            stdout.execute(SetForegroundColor(Color::DarkGrey))?;
            println!(
                "  trace {} ({} steps)",
                trace.trace_id,
                trace.agent_steps.len()
            );
            stdout.execute(ResetColor)?;
        }
        println!();
    }
    Ok(())
}
