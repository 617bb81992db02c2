//! Command parsing for the annotator front end.
//!
//! One command per line. Blank lines and lines starting with `#` are
//! ignored so that scripted sessions can carry comments.

use framemark_core::types::FrameIndex;

#[derive(Debug, Clone, PartialEq)]
pub enum Command {
    /// `load <name> [duration_secs]`
    Load {
        name: String,
        duration_secs: Option<f64>,
    },
    /// `duration <secs>`
    Duration(f64),
    /// `tick <secs>`: playback position notification.
    Tick(f64),
    /// `seek <frame>`
    Seek(FrameIndex),
    /// `label [text]`: rest of the line, may be empty.
    Label(String),
    Save,
    List,
    Status,
    Export,
    Help,
    Quit,
}

#[derive(Debug, thiserror::Error, PartialEq, Eq)]
pub enum CommandError {
    #[error("Unknown command '{0}' (try 'help')")]
    Unknown(String),

    #[error("'{command}' requires <{argument}>")]
    MissingArgument {
        command: &'static str,
        argument: &'static str,
    },

    #[error("Invalid {argument} '{value}'")]
    InvalidArgument {
        argument: &'static str,
        value: String,
    },
}

pub const HELP: &[&str] = &[
    "load <name> [duration]  load a video, discarding current annotations",
    "duration <secs>         set the video duration once known",
    "tick <secs>             playback position update",
    "seek <frame>            move to a frame",
    "label [text]            set the label text for the next save",
    "save                    attach the label to the current frame",
    "list                    show saved annotations",
    "status                  show video, frame and annotation count",
    "export                  write annotations.json and sync it remotely",
    "quit                    stop reading commands",
];

impl Command {
    /// Parse one input line. Returns `Ok(None)` for blank and comment lines.
    ///
    /// Only the line terminator is stripped from `label` text; everything
    /// after the keyword and its single separator is kept as typed.
    pub fn parse(line: &str) -> Result<Option<Self>, CommandError> {
        let line = line.trim_end_matches(['\r', '\n']);
        let trimmed = line.trim();
        if trimmed.is_empty() || trimmed.starts_with('#') {
            return Ok(None);
        }

        let line = line.trim_start();
        let (keyword, raw_rest) = line.split_once(char::is_whitespace).unwrap_or((line, ""));
        let rest = raw_rest.trim();

        let command = match keyword.to_ascii_lowercase().as_str() {
            "load" => parse_load(rest)?,
            "duration" => Self::Duration(parse_secs("duration", required(rest, "duration", "secs")?)?),
            "tick" => Self::Tick(parse_secs("time", required(rest, "tick", "secs")?)?),
            "seek" => {
                let raw = required(rest, "seek", "frame")?;
                let frame = raw.parse::<FrameIndex>().map_err(|_| CommandError::InvalidArgument {
                    argument: "frame",
                    value: raw.to_string(),
                })?;
                Self::Seek(frame)
            }
            "label" => Self::Label(raw_rest.to_string()),
            "save" => Self::Save,
            "list" => Self::List,
            "status" => Self::Status,
            "export" => Self::Export,
            "help" => Self::Help,
            "quit" | "exit" => Self::Quit,
            other => return Err(CommandError::Unknown(other.to_string())),
        };

        Ok(Some(command))
    }
}

/// `load <name> [duration]`: the last token is the duration when it is
/// numeric, everything before it is the name.
fn parse_load(rest: &str) -> Result<Command, CommandError> {
    if rest.is_empty() {
        return Err(CommandError::MissingArgument {
            command: "load",
            argument: "name",
        });
    }

    match rest.rsplit_once(char::is_whitespace) {
        Some((name, last)) if last.parse::<f64>().is_ok() => Ok(Command::Load {
            name: name.trim_end().to_string(),
            duration_secs: Some(parse_secs("duration", last)?),
        }),
        _ => Ok(Command::Load {
            name: rest.to_string(),
            duration_secs: None,
        }),
    }
}

fn required<'a>(
    rest: &'a str,
    command: &'static str,
    argument: &'static str,
) -> Result<&'a str, CommandError> {
    rest.split_whitespace()
        .next()
        .ok_or(CommandError::MissingArgument { command, argument })
}

fn parse_secs(argument: &'static str, raw: &str) -> Result<f64, CommandError> {
    raw.parse::<f64>()
        .ok()
        .filter(|v| v.is_finite())
        .ok_or_else(|| CommandError::InvalidArgument {
            argument,
            value: raw.to_string(),
        })
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
