//! Interactive speech session.
//!
//! Each input line is spoken. Lines starting with `/` are commands; speech
//! events are printed as they arrive, so `/cancel` can interrupt playback.

use anyhow::Result;
use tokio::io::{AsyncBufReadExt, BufReader};

use sadak_speech::SpeechService;

use crate::bootstrap::CliContext;
use crate::error::CliError;
use crate::handlers::print_event;

const HELP: &str = "\
Type text to speak it. Commands:
  /cancel          stop speaking and clear the queue
  /lang <code>     change the speech language (saved)
  /voice on|off    turn voice responses on or off (saved)
  /help            show this help
  /quit            leave the session";

/// What the session should do after a line.
#[derive(Debug, PartialEq, Eq)]
enum Input<'a> {
    Speak(&'a str),
    Cancel,
    Language(&'a str),
    Voice(bool),
    Help,
    Quit,
    Empty,
    Unknown(&'a str),
}

fn parse_line(line: &str) -> Input<'_> {
    let line = line.trim();
    if line.is_empty() {
        return Input::Empty;
    }
    let Some(command) = line.strip_prefix('/') else {
        return Input::Speak(line);
    };

    let mut parts = command.split_whitespace();
    match (parts.next(), parts.next()) {
        (Some("cancel" | "stop"), None) => Input::Cancel,
        (Some("lang"), Some(code)) => Input::Language(code),
        (Some("voice"), Some("on")) => Input::Voice(true),
        (Some("voice"), Some("off")) => Input::Voice(false),
        (Some("help"), None) => Input::Help,
        (Some("quit" | "exit"), None) => Input::Quit,
        _ => Input::Unknown(line),
    }
}

pub async fn execute(ctx: &CliContext) -> Result<()> {
    let (service, mut events) = ctx.start_speech().await?;
    service.unlock_audio();
    println!("{HELP}");

    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    loop {
        tokio::select! {
            line = lines.next_line() => {
                let Some(line) = line? else { break };
                if !handle_input(&service, parse_line(&line)).await {
                    break;
                }
            }
            Some(event) = events.recv() => print_event(&event),
        }
    }

    service.cancel();
    Ok(())
}

/// Apply one input. Returns `false` when the session should end.
async fn handle_input(service: &SpeechService, input: Input<'_>) -> bool {
    match input {
        Input::Speak(text) => {
            if service.speak(text) == 0 {
                if service.handle().is_voice_response_enabled() {
                    println!("Nothing to speak.");
                } else {
                    println!("Voice responses are off. Use /voice on.");
                }
            }
        }
        Input::Cancel => service.cancel(),
        Input::Language(code) => match service.set_language(code).await {
            Ok(()) => println!("Language set to {code}."),
            Err(err) => println!("{}", CliError::from(err)),
        },
        Input::Voice(enabled) => match service.set_voice_enabled(enabled).await {
            Ok(()) => println!("Voice responses {}.", if enabled { "on" } else { "off" }),
            Err(err) => println!("{}", CliError::from(err)),
        },
        Input::Help => println!("{HELP}"),
        Input::Quit => return false,
        Input::Empty => {}
        Input::Unknown(line) => println!("Unknown command: {line} (try /help)"),
    }
    true
}
