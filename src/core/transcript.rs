//! Terminal scrollback.

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LineKind {
    /// The submitted input, shown after the prompt marker.
    Echo,
    Output,
    Error,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OutputLine {
    pub text: String,
    pub kind: LineKind,
}

impl OutputLine {
    pub fn echo(text: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            kind: LineKind::Echo,
        }
    }

    pub fn output(text: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            kind: LineKind::Output,
        }
    }

    pub fn error(text: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            kind: LineKind::Error,
        }
    }

    pub fn is_error(&self) -> bool {
        self.kind == LineKind::Error
    }
}

/// Append-only sequence of output lines, emptied wholesale by `clear`.
#[derive(Debug, Default)]
pub struct Transcript {
    lines: Vec<OutputLine>,
}

impl Transcript {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, line: OutputLine) {
        self.lines.push(line);
    }

    pub fn extend(&mut self, lines: impl IntoIterator<Item = OutputLine>) {
        self.lines.extend(lines);
    }

    pub fn clear(&mut self) {
        self.lines.clear();
    }

    pub fn lines(&self) -> &[OutputLine] {
        &self.lines
    }

    pub fn len(&self) -> usize {
        self.lines.len()
    }

    pub fn is_empty(&self) -> bool {
        self.lines.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn preserves_submission_order_until_cleared() {
        let mut transcript = Transcript::new();
        transcript.push(OutputLine::echo("help"));
        transcript.extend([OutputLine::output("a"), OutputLine::error("b")]);

        let texts: Vec<&str> = transcript.lines().iter().map(|l| l.text.as_str()).collect();
        assert_eq!(texts, vec!["help", "a", "b"]);
        assert!(transcript.lines()[2].is_error());

        transcript.clear();
        assert!(transcript.is_empty());
    }
}
