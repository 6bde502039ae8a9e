//! Line-oriented control surface on stdin.
//!
//! ```text
//! list                 show every surfaced constant
//! set <id> <value>     set a constant's value directly
//! knob <id> <0..1>     set a constant from a knob position
//! reset [id]           restore one constant, or all, to the initial value
//! quit                 stop the synth
//! ```

use std::io::{self, BufRead, Write};

use modsynth_core::{ControlError, ControlPanel};
use modsynth_io::Liveness;
use thiserror::Error;

/// A parsed controller command.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Command {
    List,
    Help,
    Set { id: usize, value: f32 },
    Knob { id: usize, position: f32 },
    Reset(Option<usize>),
    Quit,
}

/// Why a command line was not accepted.
#[derive(Debug, Error, PartialEq)]
pub enum CommandError {
    #[error("unknown command '{0}' (try 'help')")]
    Unknown(String),
    #[error("usage: {0}")]
    Usage(&'static str),
    #[error("'{0}' is not a node id")]
    BadId(String),
    #[error("'{0}' is not a number")]
    BadNumber(String),
    #[error(transparent)]
    Control(#[from] ControlError),
    #[error("output error: {0}")]
    Output(String),
}

/// Parses one input line. Blank lines give `None`.
pub fn parse_command(line: &str) -> Result<Option<Command>, CommandError> {
    let mut words = line.split_whitespace();
    let Some(verb) = words.next() else {
        return Ok(None);
    };
    let args: Vec<&str> = words.collect();

    let command = match (verb, args.as_slice()) {
        ("list" | "ls", []) => Command::List,
        ("help" | "?", []) => Command::Help,
        ("quit" | "q" | "exit", []) => Command::Quit,
        ("set", [id, value]) => Command::Set {
            id: parse_id(id)?,
            value: parse_number(value)?,
        },
        ("set", _) => return Err(CommandError::Usage("set <id> <value>")),
        ("knob", [id, position]) => Command::Knob {
            id: parse_id(id)?,
            position: parse_number(position)?,
        },
        ("knob", _) => return Err(CommandError::Usage("knob <id> <0..1>")),
        ("reset", []) => Command::Reset(None),
        ("reset", [id]) => Command::Reset(Some(parse_id(id)?)),
        ("reset", _) => return Err(CommandError::Usage("reset [id]")),
        ("list" | "ls" | "help" | "?" | "quit" | "q" | "exit", _) => {
            return Err(CommandError::Usage("list | help | quit take no arguments"));
        }
        (other, _) => return Err(CommandError::Unknown(other.to_string())),
    };
    Ok(Some(command))
}

fn parse_id(word: &str) -> Result<usize, CommandError> {
    word.parse()
        .map_err(|_| CommandError::BadId(word.to_string()))
}

fn parse_number(word: &str) -> Result<f32, CommandError> {
    word.parse()
        .map_err(|_| CommandError::BadNumber(word.to_string()))
}

/// Writes one row per surfaced constant.
pub fn print_controls(panel: &ControlPanel, out: &mut impl Write) -> io::Result<()> {
    for id in panel.surfaced().map(|id| id.index()) {
        let (Some(category), Some(value)) = (panel.category(id), panel.value(id)) else {
            continue;
        };
        writeln!(
            out,
            "  [{id:>3}] {category} {:>12}  knob {:.3}  {}",
            category.display(value).to_string(),
            category.to_knob(value),
            panel.label(id).unwrap_or_default(),
        )?;
    }
    Ok(())
}

/// Applies a command. Returns `false` once the controller should stop.
fn apply(
    command: Command,
    panel: &ControlPanel,
    liveness: &Liveness,
    out: &mut impl Write,
) -> Result<bool, CommandError> {
    match command {
        Command::List => print_controls(panel, out).map_err(io_error)?,
        Command::Help => writeln!(
            out,
            "commands: list | set <id> <value> | knob <id> <0..1> | reset [id] | quit"
        )
        .map_err(io_error)?,
        Command::Set { id, value } => {
            panel.set_value(id, value)?;
            tracing::debug!(node = id, value, "constant set");
        }
        Command::Knob { id, position } => {
            let value = panel.set_knob(id, position)?;
            if let Some(category) = panel.category(id) {
                writeln!(out, "  [{id:>3}] {}", category.display(value)).map_err(io_error)?;
            }
        }
        Command::Reset(Some(id)) => panel.reset(id)?,
        Command::Reset(None) => panel.reset_all(),
        Command::Quit => {
            liveness.request_stop();
            return Ok(false);
        }
    }
    Ok(true)
}

fn io_error(err: io::Error) -> CommandError {
    CommandError::Output(err.to_string())
}

/// Reads commands until `quit`, end of input, or the synth stops.
pub fn run_controller(
    input: impl BufRead,
    mut out: impl Write,
    panel: &ControlPanel,
    liveness: &Liveness,
) -> io::Result<()> {
    for line in input.lines() {
        let line = line?;
        if !liveness.keep_running() {
            break;
        }
        let outcome = parse_command(&line).and_then(|command| match command {
            Some(command) => apply(command, panel, liveness, &mut out),
            None => Ok(true),
        });
        match outcome {
            Ok(true) => {}
            Ok(false) => break,
            Err(err) => writeln!(out, "error: {err}")?,
        }
        out.flush()?;
    }
    Ok(())
}
