//! Terminal front end: stdin commands in, screen text out.

use std::sync::Arc;

use futures::{StreamExt, stream};
use tokio::io::{AsyncBufReadExt, BufReader};
use tokio::sync::mpsc;
use tracing::{debug, error, info};

use crate::catalog::Catalog;
use crate::flow::{Action, ArtifactState, Screen, Session, ViewController};
use crate::unload::UnloadLatch;

const HELP: &str = "\
Commands:
  start               begin (or resume) the questionnaire
  <text>              answer the current question
  =<text>             answer with text that looks like a command
  next                confirm the current answer again
  back                previous question
  reset               start over (asks first while answering)
  yes / no            answer the exit prompt
  tour                show the guided tour
  tour next|back|skip move through the tour
  help                this text
  quit                leave";

/// One parsed line of input.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Command {
    Answer(String),
    Next,
    Back,
    Start,
    Reset,
    Yes,
    No,
    Tour,
    TourNext,
    TourBack,
    TourSkip,
    Help,
    Quit,
}

impl Command {
    /// Parse a trimmed, non-empty input line.
    pub fn parse(line: &str) -> Self {
        if let Some(text) = line.strip_prefix('=') {
            return Self::Answer(text.to_string());
        }
        let words: Vec<String> = line.split_whitespace().map(str::to_lowercase).collect();
        let words: Vec<&str> = words.iter().map(String::as_str).collect();
        match words.as_slice() {
            ["next"] => Self::Next,
            ["back"] => Self::Back,
            ["start"] => Self::Start,
            ["reset"] => Self::Reset,
            ["yes" | "y"] => Self::Yes,
            ["no" | "n"] => Self::No,
            ["tour"] => Self::Tour,
            ["tour", "next"] => Self::TourNext,
            ["tour", "back"] => Self::TourBack,
            ["tour", "skip"] => Self::TourSkip,
            ["help" | "?"] => Self::Help,
            ["quit" | "exit" | "/quit"] => Self::Quit,
            _ => Self::Answer(line.to_string()),
        }
    }

    /// Actions to dispatch for this command, in order.
    pub fn actions(self) -> Vec<Action> {
        match self {
            Self::Answer(text) => vec![Action::SetBuffer(text), Action::Confirm],
            Self::Next => vec![Action::Confirm],
            Self::Back => vec![Action::Back],
            Self::Start => vec![Action::Start],
            Self::Reset => vec![Action::Reset],
            Self::Yes => vec![Action::ConfirmExit],
            Self::No => vec![Action::CancelExit],
            Self::Tour => vec![Action::ActivateTour],
            Self::TourNext => vec![Action::TourAdvance],
            Self::TourBack => vec![Action::TourRetreat],
            Self::TourSkip => vec![Action::TourSkip],
            Self::Help | Self::Quit => Vec::new(),
        }
    }
}

/// Text for the current state of the flow.
pub fn describe(session: &Session, catalog: &Catalog) -> String {
    let mut out = Vec::new();

    match session.screen() {
        Screen::Intro => {
            out.push("== Product Blueprint ==".to_string());
            out.push("Answer a few questions and get a one-page blueprint of your idea.".to_string());
            out.push("Type 'start' to begin, 'tour' for a guided tour, 'help' for commands.".to_string());
        }
        Screen::Questioning => {
            if let Some(question) = session.current_question(catalog) {
                out.push(format!(
                    "[{}/{}  {}%] {}",
                    question.index + 1,
                    catalog.question_count(),
                    session.progress(catalog),
                    question.title
                ));
                out.push(question.prompt.clone());
                if !question.helper.is_empty() {
                    out.push(format!("  ({})", question.helper));
                }
                if session.buffer().is_empty() {
                    out.push(format!("  e.g. {}", question.placeholder));
                } else {
                    out.push(format!("  current: {}", session.buffer()));
                }
            }
        }
        Screen::Result => {
            if let Some(result) = session.result() {
                out.push(result.record.summary());
                out.push(match &result.artifact {
                    ArtifactState::Pending => "Rendering your blueprint...".to_string(),
                    ArtifactState::Ready(artifact) => format!("Blueprint: {artifact}"),
                    ArtifactState::Unavailable { reason } => {
                        format!("Blueprint image unavailable ({reason}).")
                    }
                });
            }
            out.push("Type 'reset' to start over.".to_string());
        }
    }

    if let Some(overlay) = session.tour_overlay(catalog) {
        out.push(String::new());
        out.push(format!(
            "-- Tour {}/{}: {} --",
            overlay.position + 1,
            catalog.beat_count(),
            overlay.beat.title
        ));
        out.push(overlay.beat.body.clone());
        let mut controls = Vec::new();
        if !overlay.is_first {
            controls.push("tour back");
        }
        controls.push(if overlay.is_last { "tour next (finish)" } else { "tour next" });
        controls.push("tour skip");
        out.push(controls.join(" | "));
    }

    if session.exit_guard_visible() {
        out.push(String::new());
        out.push("Leave the questionnaire? Your answers will be lost. (yes/no)".to_string());
    }

    out.join("\n")
}

/// Run the interactive loop until `quit`, EOF, or a confirmed Ctrl-C.
pub async fn run(mut controller: ViewController, latch: Arc<UnloadLatch>) {
    let (tx, rx) = mpsc::unbounded_channel();
    tokio::spawn(async move {
        let mut lines = BufReader::new(tokio::io::stdin()).lines();
        loop {
            match lines.next_line().await {
                Ok(Some(line)) => {
                    if tx.send(line).is_err() {
                        break;
                    }
                }
                Ok(None) => break,
                Err(e) => {
                    error!("Error reading stdin: {}", e);
                    break;
                }
            }
        }
    });
    let mut input = Box::pin(stream::unfold(rx, |mut rx| async move {
        rx.recv().await.map(|line| (line, rx))
    }));

    let Some(mut background) = controller.take_background_receiver() else {
        error!("Background receiver already taken");
        return;
    };

    let mut exit_requested = false;
    print_state(&controller);

    loop {
        tokio::select! {
            line = input.next() => {
                let Some(line) = line else {
                    debug!("stdin closed");
                    break;
                };
                let line = line.trim();
                if line.is_empty() {
                    eprint!("> ");
                    continue;
                }
                exit_requested = false;
                match Command::parse(line) {
                    Command::Quit => break,
                    Command::Help => {
                        println!("{HELP}");
                        eprint!("> ");
                    }
                    command => {
                        for action in command.actions() {
                            controller.dispatch(action).await;
                        }
                        print_state(&controller);
                    }
                }
            }
            Some(action) = background.recv() => {
                if !controller.dispatch(action).await.is_empty() {
                    print_state(&controller);
                }
            }
            _ = tokio::signal::ctrl_c() => {
                if latch.is_armed() && !exit_requested {
                    exit_requested = true;
                    eprintln!("\nYou are in the middle of the questionnaire. Press Ctrl-C again to leave.");
                    eprint!("> ");
                } else {
                    break;
                }
            }
        }
    }

    controller.shutdown();
    info!("Goodbye");
}

fn print_state(controller: &ViewController) {
    println!("\n{}\n", describe(controller.session(), controller.catalog()));
    eprint!("> ");
}
