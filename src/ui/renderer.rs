use std::io::{self, Write};

use ratatui::crossterm::{
    cursor::MoveTo,
    queue,
    style::{Print, ResetColor, SetForegroundColor},
    terminal::{Clear, ClearType},
};

use crate::core::transcript::{LineKind, OutputLine};
use crate::ui::theme::{Theme, ERROR_COLOR};

pub const PROMPT: &str = "⟩⟩";

/// Writes output lines to a terminal, optionally in color.
#[derive(Debug, Clone, Copy)]
pub struct Renderer {
    color: bool,
    terminal: bool,
    show_echo: bool,
}

impl Renderer {
    /// `terminal` gates cursor control; `color` only picks styled or plain text.
    pub fn new(color: bool, terminal: bool) -> Self {
        Self {
            color,
            terminal,
            show_echo: true,
        }
    }

    /// Skip echo lines; the terminal already shows what was typed at the prompt.
    pub fn interactive(color: bool, terminal: bool) -> Self {
        Self {
            color,
            terminal,
            show_echo: false,
        }
    }

    pub fn render_line<W: Write>(
        &self,
        out: &mut W,
        line: &OutputLine,
        theme: Theme,
    ) -> io::Result<()> {
        let text = match line.kind {
            LineKind::Echo if !self.show_echo => return Ok(()),
            LineKind::Echo => format!("{PROMPT} {}", line.text),
            _ => line.text.clone(),
        };

        if !self.color {
            return writeln!(out, "{text}");
        }

        let color = if line.is_error() {
            ERROR_COLOR
        } else {
            theme.accent()
        };
        queue!(out, SetForegroundColor(color), Print(text), ResetColor, Print("\n"))?;
        out.flush()
    }

    pub fn render_lines<W: Write>(
        &self,
        out: &mut W,
        lines: &[OutputLine],
        theme: Theme,
    ) -> io::Result<()> {
        for line in lines {
            self.render_line(out, line, theme)?;
        }
        Ok(())
    }

    pub fn prompt<W: Write>(&self, out: &mut W, label: &str, theme: Theme) -> io::Result<()> {
        if self.color {
            queue!(
                out,
                SetForegroundColor(theme.accent()),
                Print(label),
                Print(" "),
                ResetColor
            )?;
        } else {
            write!(out, "{label} ")?;
        }
        out.flush()
    }

    pub fn clear_screen<W: Write>(&self, out: &mut W) -> io::Result<()> {
        if self.terminal {
            queue!(out, Clear(ClearType::All), MoveTo(0, 0))?;
        }
        out.flush()
    }
}
