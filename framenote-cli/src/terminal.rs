// ============================================================================
// framenote-cli/src/terminal.rs
// ============================================================================
//
// TERMINAL OUTPUT: UI Components and Styling
//
// Consistent styling for everything the CLI prints on stdout: section
// headers, status lines, success/warning/error markers and indented items.
// Output goes through a `Terminal` wrapping any writer so the interactive
// session can be driven and checked in tests.
//
// KEY COMPONENTS:
// - Terminal: styled writer (colour on a TTY unless NO_COLOR is set)
// - ScanSpinner: indicatif spinner shown during exhaustive frame scans
//
// Colours come from owo-colors, bold text from console.

use std::cell::RefCell;
use std::io::{self, IsTerminal, Write};
use std::time::Duration;

use console::style;
use framenote_core::ScanObserver;
use indicatif::{ProgressBar, ProgressDrawTarget, ProgressStyle};
use owo_colors::OwoColorize;
use unicode_width::UnicodeWidthStr;

/// Styling constants for terminal output
pub mod styling {
    pub const SUCCESS_SYMBOL: &str = "✓";
    pub const PROCESSING_SYMBOL: &str = "»";
    pub const WARNING_SYMBOL: &str = "!";
    pub const ERROR_SYMBOL: &str = "✗";

    pub const SECTION_PREFIX: &str = "===== ";
    pub const SECTION_SUFFIX: &str = " =====";

    pub const STATUS_INDENT: &str = "  ";
    pub const SUB_ITEM_INDENT: &str = "    ";

    /// Column the value of a status line starts at, after the label
    pub const LABEL_WIDTH: usize = 15;
}

/// Returns false when the user opted out of colour via `NO_COLOR`.
pub fn should_use_color() -> bool {
    std::env::var_os("NO_COLOR").is_none()
}

/// Styled line-oriented writer.
pub struct Terminal<W: Write> {
    out: W,
    color: bool,
}

impl Terminal<io::Stdout> {
    /// Terminal on stdout; colour only when stdout is a TTY.
    pub fn stdout() -> Self {
        let out = io::stdout();
        let color = should_use_color() && out.is_terminal();
        Self { out, color }
    }
}

impl<W: Write> Terminal<W> {
    pub fn new(out: W, color: bool) -> Self {
        Self { out, color }
    }

    /// Uncoloured terminal, used for scripted sessions and tests.
    pub fn plain(out: W) -> Self {
        Self::new(out, false)
    }

    pub fn into_inner(self) -> W {
        self.out
    }

    /// Writes a line verbatim.
    pub fn line(&mut self, text: &str) -> io::Result<()> {
        writeln!(self.out, "{text}")
    }

    /// Section header (Level 1), upper-cased and cyan.
    pub fn section(&mut self, title: &str) -> io::Result<()> {
        let title = title.to_uppercase();
        writeln!(self.out)?;
        if self.color {
            writeln!(
                self.out,
                "{}{}{}",
                styling::SECTION_PREFIX,
                title.cyan().bold(),
                styling::SECTION_SUFFIX
            )
        } else {
            writeln!(self.out, "{}{}{}", styling::SECTION_PREFIX, title, styling::SECTION_SUFFIX)
        }
    }

    /// Processing step (Level 2), bold.
    pub fn processing(&mut self, message: &str) -> io::Result<()> {
        if self.color {
            writeln!(
                self.out,
                "{}{} {}",
                styling::STATUS_INDENT,
                styling::PROCESSING_SYMBOL,
                style(message).bold()
            )
        } else {
            writeln!(
                self.out,
                "{}{} {}",
                styling::STATUS_INDENT,
                styling::PROCESSING_SYMBOL,
                message
            )
        }
    }

    /// Label/value line with the value aligned at [`styling::LABEL_WIDTH`].
    pub fn status(&mut self, label: &str, value: &str, highlight: bool) -> io::Result<()> {
        let padding = styling::LABEL_WIDTH.saturating_sub(label.width()).max(1);
        if self.color && highlight {
            writeln!(
                self.out,
                "{}{}:{}{}",
                styling::SUB_ITEM_INDENT,
                label,
                " ".repeat(padding),
                style(value).bold()
            )
        } else {
            writeln!(
                self.out,
                "{}{}:{}{}",
                styling::SUB_ITEM_INDENT,
                label,
                " ".repeat(padding),
                value
            )
        }
    }

    pub fn success(&mut self, message: &str) -> io::Result<()> {
        if self.color {
            writeln!(
                self.out,
                "{}{} {}",
                styling::STATUS_INDENT,
                styling::SUCCESS_SYMBOL,
                message.green()
            )
        } else {
            writeln!(self.out, "{}{} {}", styling::STATUS_INDENT, styling::SUCCESS_SYMBOL, message)
        }
    }

    pub fn warning(&mut self, message: &str) -> io::Result<()> {
        if self.color {
            writeln!(
                self.out,
                "{}{} {}",
                styling::STATUS_INDENT,
                styling::WARNING_SYMBOL,
                message.yellow()
            )
        } else {
            writeln!(self.out, "{}{} {}", styling::STATUS_INDENT, styling::WARNING_SYMBOL, message)
        }
    }

    pub fn error(&mut self, message: &str) -> io::Result<()> {
        if self.color {
            writeln!(
                self.out,
                "{}{} {}",
                styling::STATUS_INDENT,
                styling::ERROR_SYMBOL,
                message.bright_red()
            )
        } else {
            writeln!(self.out, "{}{} {}", styling::STATUS_INDENT, styling::ERROR_SYMBOL, message)
        }
    }

    /// Indented item (Level 3). Multi-line text keeps the indent on every line.
    pub fn sub_item(&mut self, message: &str) -> io::Result<()> {
        for line in message.split('\n') {
            writeln!(self.out, "{}{}", styling::SUB_ITEM_INDENT, line)?;
        }
        Ok(())
    }

    /// Writes a prompt without a newline and flushes it.
    pub fn prompt(&mut self, text: &str) -> io::Result<()> {
        if self.color {
            write!(self.out, "{}", text.dimmed())?;
        } else {
            write!(self.out, "{text}")?;
        }
        self.out.flush()
    }

    pub fn flush(&mut self) -> io::Result<()> {
        self.out.flush()
    }
}

/// Spinner shown on stderr while ffmpeg decodes a whole video to count frames.
///
/// The bar is created on the first progress callback, so videos resolved
/// from container metadata never show it. Hidden when stderr is not a TTY.
pub struct ScanSpinner {
    bar: RefCell<Option<ProgressBar>>,
    visible: bool,
}

impl ScanSpinner {
    pub fn new() -> Self {
        Self {
            bar: RefCell::new(None),
            visible: io::stderr().is_terminal(),
        }
    }

    fn start(&self) -> ProgressBar {
        let bar = if self.visible {
            ProgressBar::with_draw_target(None, ProgressDrawTarget::stderr())
        } else {
            ProgressBar::hidden()
        };
        if let Ok(style) = ProgressStyle::with_template("{spinner:.green} {msg} [{elapsed}]") {
            bar.set_style(style);
        }
        bar.enable_steady_tick(Duration::from_millis(120));
        bar
    }

    /// Removes the spinner, if one was started.
    pub fn finish(&self) {
        if let Some(bar) = self.bar.borrow_mut().take() {
            bar.finish_and_clear();
        }
    }
}

impl Default for ScanSpinner {
    fn default() -> Self {
        Self::new()
    }
}

impl ScanObserver for ScanSpinner {
    fn frames_scanned(&self, frames: u64) {
        let mut slot = self.bar.borrow_mut();
        let bar = slot.get_or_insert_with(|| self.start());
        bar.set_message(format!("Counting frames: {frames} decoded"));
    }
}

impl Drop for ScanSpinner {
    fn drop(&mut self) {
        self.finish();
    }
}
