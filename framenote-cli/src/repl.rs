// ============================================================================
// framenote-cli/src/repl.rs
// ============================================================================
//
// INTERACTIVE SESSION: Line-Oriented Annotation Commands
//
// Reads one command per line (from stdin or a script), turns it into a
// session action or an I/O operation, and prints the resulting view.
//
// KEY COMPONENTS:
// - ReplCommand / parse_command: the command language
// - Repl: owns the session and executes commands against it
//
// A failed command prints its error and the session carries on; only a
// broken output stream ends the loop early.

use std::fmt;
use std::io::{BufRead, Write};
use std::path::PathBuf;

use framenote_core::media::save_frame_image;
use framenote_core::utils::unescape_text;
use framenote_core::{
    Action, CoreConfig, CoreError, LoadedSession, MediaTools, ReportFormat, Session,
};

use crate::commands::{open_with_spinner, write_report};
use crate::error::{CliErrorContext, CliResult};
use crate::terminal::Terminal;

pub const PROMPT: &str = "framenote> ";

pub const HELP: &str = "\
Commands:
  next | n                 go to the next frame
  prev | p                 go to the previous frame
  goto N | g N             jump to frame N (clamped)
  step K                   move K frames, e.g. step +10 or step -5
  first | last             jump to the first or last frame
  show                     show the current frame, its note and the draft
  note [TEXT]              save TEXT as the note of the current frame
  draft TEXT               replace the draft without saving it
  global TEXT              set the global comment
  global+ TEXT             append a line to the global comment
  list                     list all notes and the global comment
  snapshot FILE            save the current frame as an image
  export csv|pdf [FILE]    write a report (timestamped name without FILE)
  load FILE                open another video (current notes are discarded)
  help                     show this help
  quit | q                 leave the session
Use \\n inside TEXT for a line break.";

/// One parsed session command.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ReplCommand {
    Next,
    Previous,
    GoTo(i64),
    Step(i64),
    First,
    Last,
    Show,
    Note(String),
    Draft(String),
    Global(String),
    GlobalAppend(String),
    List,
    Snapshot(PathBuf),
    Export(ReportFormat, Option<PathBuf>),
    Load(PathBuf),
    Help,
    Quit,
    /// Blank line or `#` comment
    Nothing,
}

/// Why a line could not be parsed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ParseError {
    Unknown(String),
    Usage(&'static str),
}

impl fmt::Display for ParseError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ParseError::Unknown(word) => write!(f, "Unknown command '{word}'"),
            ParseError::Usage(usage) => write!(f, "Usage: {usage}"),
        }
    }
}

fn parse_number(rest: &str, usage: &'static str) -> Result<i64, ParseError> {
    rest.trim().parse::<i64>().map_err(|_| ParseError::Usage(usage))
}

fn required_path(rest: &str, usage: &'static str) -> Result<PathBuf, ParseError> {
    let rest = rest.trim();
    if rest.is_empty() {
        Err(ParseError::Usage(usage))
    } else {
        Ok(PathBuf::from(rest))
    }
}

/// Parses one input line.
///
/// Text arguments keep everything after the first space verbatim, with `\n`
/// turned into a line break.
pub fn parse_command(line: &str) -> Result<ReplCommand, ParseError> {
    let line = line.trim_end_matches(['\r', '\n']).trim_start();
    if line.is_empty() || line.starts_with('#') {
        return Ok(ReplCommand::Nothing);
    }
    let (word, rest) = line.split_once(char::is_whitespace).unwrap_or((line, ""));

    let command = match word.to_ascii_lowercase().as_str() {
        "next" | "n" => ReplCommand::Next,
        "prev" | "p" => ReplCommand::Previous,
        "goto" | "g" => ReplCommand::GoTo(parse_number(rest, "goto N")?),
        "step" => ReplCommand::Step(parse_number(rest, "step +K | step -K")?),
        "first" => ReplCommand::First,
        "last" => ReplCommand::Last,
        "show" => ReplCommand::Show,
        "note" => ReplCommand::Note(unescape_text(rest)),
        "draft" => ReplCommand::Draft(unescape_text(rest)),
        "global" => ReplCommand::Global(unescape_text(rest)),
        "global+" => {
            if rest.trim().is_empty() {
                return Err(ParseError::Usage("global+ TEXT"));
            }
            ReplCommand::GlobalAppend(unescape_text(rest))
        }
        "list" => ReplCommand::List,
        "snapshot" => ReplCommand::Snapshot(required_path(rest, "snapshot FILE")?),
        "export" => {
            const USAGE: &str = "export csv|pdf [FILE]";
            let rest = rest.trim();
            let (format, path) = rest.split_once(char::is_whitespace).unwrap_or((rest, ""));
            let format = format
                .parse::<ReportFormat>()
                .map_err(|_| ParseError::Usage(USAGE))?;
            let path = path.trim();
            ReplCommand::Export(format, (!path.is_empty()).then(|| PathBuf::from(path)))
        }
        "load" => ReplCommand::Load(required_path(rest, "load FILE")?),
        "help" | "h" | "?" => ReplCommand::Help,
        "quit" | "q" | "exit" => ReplCommand::Quit,
        _ => return Err(ParseError::Unknown(word.to_string())),
    };
    Ok(command)
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Flow {
    Continue,
    Quit,
}

/// An interactive annotation session bound to a set of media tools.
pub struct Repl<'a> {
    tools: &'a MediaTools,
    config: &'a CoreConfig,
    session: Session,
}

impl<'a> Repl<'a> {
    pub fn new(tools: &'a MediaTools, config: &'a CoreConfig) -> Self {
        Self {
            tools,
            config,
            session: Session::new(),
        }
    }

    pub fn session(&self) -> &Session {
        &self.session
    }

    /// Reads commands until `quit` or end of input.
    ///
    /// With `prompt` set, a prompt is written before each line.
    pub fn run<R: BufRead, W: Write>(
        &mut self,
        input: R,
        term: &mut Terminal<W>,
        prompt: bool,
    ) -> CliResult<()> {
        let mut lines = input.lines();
        loop {
            if prompt {
                term.prompt(PROMPT)?;
            }
            let Some(line) = lines.next() else {
                break;
            };
            let line = line.cli_context("Reading session input")?;

            let flow = match parse_command(&line) {
                Ok(command) => match self.execute(command, term) {
                    Ok(flow) => flow,
                    Err(err) => {
                        term.error(&err.to_string())?;
                        Flow::Continue
                    }
                },
                Err(err @ ParseError::Unknown(_)) => {
                    term.warning(&err.to_string())?;
                    term.line(HELP)?;
                    Flow::Continue
                }
                Err(err) => {
                    term.warning(&err.to_string())?;
                    Flow::Continue
                }
            };
            if flow == Flow::Quit {
                break;
            }
        }
        term.flush()?;
        Ok(())
    }

    /// Executes one command against the session.
    fn execute<W: Write>(
        &mut self,
        command: ReplCommand,
        term: &mut Terminal<W>,
    ) -> CliResult<Flow> {
        match command {
            ReplCommand::Next => self.navigate(Action::Next, term)?,
            ReplCommand::Previous => self.navigate(Action::Previous, term)?,
            ReplCommand::GoTo(raw) => self.navigate(Action::GoTo(raw), term)?,
            ReplCommand::Step(delta) => self.navigate(Action::Step(delta), term)?,
            ReplCommand::First => self.navigate(Action::First, term)?,
            ReplCommand::Last => self.navigate(Action::Last, term)?,
            ReplCommand::Show => {
                let loaded = self.session.require_loaded()?;
                show_frame(loaded, term, true)?;
            }
            ReplCommand::Note(text) => {
                self.apply(Action::SaveNote(text))?;
                let frame = self.session.require_loaded()?.current_frame();
                term.success(&format!("Saved note for frame {frame}"))?;
            }
            ReplCommand::Draft(text) => {
                self.apply(Action::EditDraft(text))?;
                term.success("Draft updated")?;
            }
            ReplCommand::Global(text) => {
                self.apply(Action::SetGlobalComment(text))?;
                term.success("Global comment set")?;
            }
            ReplCommand::GlobalAppend(text) => {
                let current = self.session.require_loaded()?.store().global_comment();
                let combined = if current.is_empty() {
                    text
                } else {
                    format!("{current}\n{text}")
                };
                self.apply(Action::SetGlobalComment(combined))?;
                term.success("Global comment extended")?;
            }
            ReplCommand::List => list_notes(self.session.require_loaded()?, term)?,
            ReplCommand::Snapshot(path) => {
                let loaded = self.session.require_loaded()?;
                let frame = loaded.current_frame();
                let image = loaded
                    .handle()
                    .read_frame(self.tools.decoder.as_ref(), frame)?
                    .cli_with_context(|| format!("Frame {frame} could not be decoded"))?;
                save_frame_image(&image, &path)?;
                term.success(&format!("Saved frame {frame} to {}", path.display()))?;
            }
            ReplCommand::Export(format, path) => {
                let loaded = self.session.require_loaded()?;
                write_report(term, loaded, self.tools, self.config, format, path)?;
            }
            ReplCommand::Load(path) => self.load(&path, term)?,
            ReplCommand::Help => term.line(HELP)?,
            ReplCommand::Quit => return Ok(Flow::Quit),
            ReplCommand::Nothing => {}
        }
        Ok(Flow::Continue)
    }

    /// Replaces the current session with a fresh one on `path`.
    ///
    /// The previous video and its notes are released before the new video is
    /// opened, so a failed load leaves the session empty.
    pub fn load<W: Write>(
        &mut self,
        path: &std::path::Path,
        term: &mut Terminal<W>,
    ) -> CliResult<()> {
        self.session = std::mem::take(&mut self.session).close();
        let handle = open_with_spinner(path, self.tools, self.config)?;
        self.session = Session::new().load(handle, self.config);

        let loaded = self.session.require_loaded()?;
        let handle = loaded.handle();
        term.section("Video")?;
        term.status("File", &path.display().to_string(), false)?;
        term.status("Frames", &handle.frame_count().to_string(), true)?;
        term.status("Source", handle.resolved_frame_count().source(), false)?;
        if let Some(properties) = handle.properties() {
            term.status("Resolution", &properties.resolution(), false)?;
        }
        for record in handle.fallbacks() {
            term.warning(&format!("Fallback: {record}"))?;
            for line in record.reason.diagnostics() {
                term.sub_item(line)?;
            }
        }
        show_frame(loaded, term, false)?;
        Ok(())
    }

    fn apply(&mut self, action: Action) -> CliResult<()> {
        if !self.session.is_loaded() {
            return Err(CoreError::NoVideoLoaded);
        }
        self.session = std::mem::take(&mut self.session).apply(action)?;
        Ok(())
    }

    fn navigate<W: Write>(&mut self, action: Action, term: &mut Terminal<W>) -> CliResult<()> {
        self.apply(action)?;
        show_frame(self.session.require_loaded()?, term, false)
    }
}

/// Prints the current frame and its note. `detailed` adds the draft.
fn show_frame<W: Write>(
    loaded: &LoadedSession,
    term: &mut Terminal<W>,
    detailed: bool,
) -> CliResult<()> {
    let last = loaded.frame_count().saturating_sub(1);
    term.processing(&format!("Frame {} / {}", loaded.current_frame(), last))?;

    let note = loaded.current_note();
    if detailed {
        term.status("Note", &single_line(note), false)?;
        if loaded.draft() != note {
            term.status("Draft", &single_line(loaded.draft()), false)?;
        }
    } else if !note.is_empty() {
        term.sub_item(note)?;
    }
    Ok(())
}

/// Folds multi-line text onto one status line.
fn single_line(text: &str) -> String {
    if text.is_empty() {
        "(none)".to_string()
    } else {
        text.lines().collect::<Vec<_>>().join(" | ")
    }
}

fn list_notes<W: Write>(loaded: &LoadedSession, term: &mut Terminal<W>) -> CliResult<()> {
    let store = loaded.store();
    term.section("Notes")?;
    if store.is_empty() {
        term.sub_item("No frame notes yet")?;
    }
    for (frame, note) in store.iter() {
        term.processing(&format!("Frame {frame}"))?;
        term.sub_item(note)?;
    }
    if !store.global_comment().is_empty() {
        term.processing("Global comment")?;
        term.sub_item(store.global_comment())?;
    }
    Ok(())
}
