//! Operator console: line parsing and event display.

use std::io::BufRead;

use anyhow::{anyhow, bail, Context};
use crossbeam_channel::Receiver;
use serde::de::DeserializeOwned;
use serde_json::Value;
use tracing::{debug, info, instrument};

use scorecast_ipc::{
    BroadcastDetails, ControllerCommand, ControllerEvent, Destination, DestinationDraft, Side,
};

use crate::AppState;

/// Console help text.
pub const HELP: &str = "\
camera on|off                     start or end the camera session
live | stop | toggle              go live, stop, or toggle
record on|off, mute on|off        local capture and microphone
quality 480p|720p|1080p           stream resolution
fps <n>, bitrate standard|high    encoder rate settings
clear                             clear the current error
dest add <name> <url> [key]       add a destination
dest update <id> <name> <url> [key]
dest rm <id>, dest use <id>       delete or select a destination
link on|off                       mark the platform account linked
broadcasts                        refresh platform broadcasts
broadcast <id>                    select a broadcast
schedule <start> <title...>       schedule a platform broadcast
clock start|stop|toggle|reset|set <m:ss>
period next|prev|length <m:ss>
penalty home|away|clear|length <m:ss>
score home|away +|-
team home|away name <name...> | color <hex>
status, help, quit";

/// One parsed console line.
#[derive(Debug, Clone)]
pub enum ConsoleInput {
    Command(ControllerCommand),
    Status,
    Help,
    Quit,
}

/// Parse a console line. Blank lines and `#` comments yield `None`.
pub fn parse_line(line: &str) -> anyhow::Result<Option<ConsoleInput>> {
    let words: Vec<&str> = line.split_whitespace().collect();
    let Some((&verb, rest)) = words.split_first() else {
        return Ok(None);
    };
    if verb.starts_with('#') {
        return Ok(None);
    }

    let command = match (verb, rest) {
        ("status", []) => return Ok(Some(ConsoleInput::Status)),
        ("help", _) => return Ok(Some(ConsoleInput::Help)),
        ("quit" | "exit", []) => return Ok(Some(ConsoleInput::Quit)),

        ("camera", [flag]) => ControllerCommand::SetCameraActive(on_off(flag)?),
        ("live", []) => ControllerCommand::GoLive,
        ("stop", []) => ControllerCommand::StopLive,
        ("toggle", []) => ControllerCommand::ToggleLive,
        ("record", [flag]) => ControllerCommand::SetRecordLocally(on_off(flag)?),
        ("mute", [flag]) => ControllerCommand::SetMuted(on_off(flag)?),
        ("quality", [value]) => ControllerCommand::SetStreamQuality(from_word(value)?),
        ("fps", [value]) => {
            ControllerCommand::SetFps(value.parse().context("fps must be a number")?)
        }
        ("bitrate", [value]) => ControllerCommand::SetBitrateQuality(from_word(value)?),
        ("clear", []) => ControllerCommand::ClearError,

        ("dest", ["add", name, url, key @ ..]) => {
            ControllerCommand::AddDestination(DestinationDraft {
                name: name.to_string(),
                url: url.to_string(),
                key: optional_key(key)?,
            })
        }
        ("dest", ["update", id, name, url, key @ ..]) => {
            ControllerCommand::UpdateDestination(Destination {
                id: parse_id(id)?,
                name: name.to_string(),
                url: url.to_string(),
                key: optional_key(key)?,
            })
        }
        ("dest", ["rm", id]) => ControllerCommand::DeleteDestination(parse_id(id)?),
        ("dest", ["use", id]) => ControllerCommand::SelectDestination(parse_id(id)?),

        ("link", [flag]) => ControllerCommand::SetPlatformLinked(on_off(flag)?),
        ("broadcasts", []) => ControllerCommand::RefreshBroadcasts,
        ("broadcast", [id]) => ControllerCommand::SelectBroadcast(id.to_string()),
        ("schedule", [start, title @ ..]) if !title.is_empty() => {
            ControllerCommand::ScheduleBroadcast(BroadcastDetails {
                title: title.join(" "),
                description: String::new(),
                scheduled_start: start.to_string(),
            })
        }

        ("clock", ["start"]) => ControllerCommand::StartGameClock,
        ("clock", ["stop"]) => ControllerCommand::StopGameClock,
        ("clock", ["toggle"]) => ControllerCommand::ToggleGameClock,
        ("clock", ["reset"]) => ControllerCommand::ResetGameClock,
        ("clock", ["set", value]) => ControllerCommand::SetGameClock(parse_clock(value)?),

        ("period", ["next"]) => ControllerCommand::AdvancePeriod,
        ("period", ["prev"]) => ControllerCommand::PreviousPeriod,
        ("period", ["length", value]) => ControllerCommand::SetPeriodLength(parse_clock(value)?),

        ("penalty", ["clear"]) => ControllerCommand::ClearPenalty,
        ("penalty", ["length", value]) => {
            ControllerCommand::SetPenaltyLength(parse_clock(value)?)
        }
        ("penalty", [side]) => ControllerCommand::StartPenalty(parse_side(side)?),

        ("score", [side, "+"]) => ControllerCommand::IncrementScore(parse_side(side)?),
        ("score", [side, "-"]) => ControllerCommand::DecrementScore(parse_side(side)?),

        ("team", [side, "name", name @ ..]) if !name.is_empty() => ControllerCommand::RenameTeam {
            side: parse_side(side)?,
            name: name.join(" "),
        },
        ("team", [side, "color", color]) => ControllerCommand::SetTeamColor {
            side: parse_side(side)?,
            color: color.to_string(),
        },

        _ => bail!("Unrecognized command: {} (try `help`)", line.trim()),
    };

    Ok(Some(ConsoleInput::Command(command)))
}

/// Read console lines until EOF or `quit`, forwarding commands.
#[instrument(name = "console", skip_all)]
pub fn console<R: BufRead>(state: &AppState, input: R) -> anyhow::Result<()> {
    for line in input.lines() {
        let line = line.context("Failed to read console input")?;

        match parse_line(&line) {
            Ok(None) => {}
            Ok(Some(ConsoleInput::Quit)) => break,
            Ok(Some(ConsoleInput::Help)) => println!("{HELP}"),
            Ok(Some(ConsoleInput::Status)) => {
                let snapshot = state.snapshot.read().clone();
                println!("{}", serde_json::to_string_pretty(&snapshot)?);
            }
            Ok(Some(ConsoleInput::Command(command))) => {
                debug!(?command, "Sending command");
                state
                    .command_tx
                    .send(command)
                    .map_err(|e| anyhow!("Controller stopped: {}", e))?;
            }
            Err(e) => println!("error: {e}"),
        }
    }

    Ok(())
}

/// Print controller events until the controller hangs up.
pub fn print_events(event_rx: Receiver<ControllerEvent>) {
    for event in event_rx.iter() {
        if let Some(line) = describe_event(&event) {
            println!("{line}");
        }
    }
    info!("Event stream closed");
}

/// One-line description of an event, or `None` for high-rate events.
pub fn describe_event(event: &ControllerEvent) -> Option<String> {
    let line = match event {
        ControllerEvent::StatusChanged { current, .. } => format!("connection: {}", current.name()),
        ControllerEvent::CameraChanged { active } => {
            format!("camera: {}", if *active { "on" } else { "off" })
        }
        ControllerEvent::LiveChanged { live } => {
            format!("live: {}", if *live { "on" } else { "off" })
        }
        ControllerEvent::Telemetry(sample) => {
            debug!(bitrate_kbps = sample.bitrate_kbps, "Telemetry");
            return None;
        }
        ControllerEvent::RenderingRate(fps) => {
            debug!(fps, "Rendering rate");
            return None;
        }
        ControllerEvent::ClockChanged(clock) => format!("clock: {}", clock),
        ControllerEvent::PenaltyChanged(penalty) => format!("penalty: {}", penalty),
        ControllerEvent::PeriodChanged(period) => format!("period: {}", period),
        ControllerEvent::TeamsChanged { home, away } => format!(
            "score: {} {} - {} {}",
            home.name, home.score, away.score, away.name
        ),
        ControllerEvent::DestinationsChanged {
            destinations,
            active_id,
        } => {
            let names: Vec<String> = destinations
                .iter()
                .map(|d| {
                    let marker = if Some(d.id) == *active_id { "*" } else { "" };
                    format!("{}{}:{}", marker, d.id, d.name)
                })
                .collect();
            format!("destinations: {}", names.join(", "))
        }
        ControllerEvent::BroadcastsChanged {
            broadcasts,
            active_id,
        } => format!(
            "broadcasts: {} (selected: {})",
            broadcasts.len(),
            active_id.as_deref().unwrap_or("none")
        ),
        ControllerEvent::Error { message } => format!("error: {message}"),
        ControllerEvent::ErrorCleared => "error cleared".to_string(),
        ControllerEvent::Snapshot(_) => return None,
        ControllerEvent::Ready => "ready".to_string(),
        ControllerEvent::Shutdown => "shutdown".to_string(),
    };

    Some(line)
}

fn on_off(word: &str) -> anyhow::Result<bool> {
    match word {
        "on" | "true" | "yes" => Ok(true),
        "off" | "false" | "no" => Ok(false),
        other => bail!("Expected on or off, got {other}"),
    }
}

/// Parse a word with the same names the config file uses.
fn from_word<T: DeserializeOwned>(word: &str) -> anyhow::Result<T> {
    serde_json::from_value(Value::String(word.to_ascii_lowercase()))
        .with_context(|| format!("Unknown setting value: {word}"))
}

fn parse_id(word: &str) -> anyhow::Result<u32> {
    word.parse()
        .with_context(|| format!("Invalid destination id: {word}"))
}

fn parse_side(word: &str) -> anyhow::Result<Side> {
    Ok(word.parse::<Side>()?)
}

fn optional_key(rest: &[&str]) -> anyhow::Result<String> {
    match rest {
        [] => Ok(String::new()),
        [key] => Ok(key.to_string()),
        _ => bail!("Stream keys cannot contain spaces"),
    }
}

/// Parse `m:ss` or plain seconds.
fn parse_clock(word: &str) -> anyhow::Result<u32> {
    let seconds = match word.split_once(':') {
        Some((minutes, seconds)) => {
            let minutes: u32 = minutes.parse().context("Invalid minutes")?;
            let seconds: u32 = seconds.parse().context("Invalid seconds")?;
            if seconds >= 60 {
                bail!("Seconds must be below 60");
            }
            minutes
                .checked_mul(60)
                .and_then(|m| m.checked_add(seconds))
                .ok_or_else(|| anyhow!("Time is too large: {word}"))?
        }
        None => word.parse().context("Invalid time")?,
    };
    Ok(seconds)
}
