//! Output seam between the driver and whatever renders it

use std::fmt;
use std::io::Write;

use crate::classify::Diagnostic;

/// One line (or block) appended to the output pane
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Emission {
    /// Iteration `i` has started
    Generating(u32),
    /// Iteration `i` succeeded
    Done(u32),
    /// Generated text, verbatim
    Content { index: u32, text: String },
    /// The run stopped here
    Failed(Diagnostic),
}

impl fmt::Display for Emission {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Generating(i) => write!(f, "Generating problem {}...", i),
            Self::Done(i) => write!(f, "Problem {} done", i),
            Self::Content { text, .. } => f.write_str(text),
            Self::Failed(diag) => write!(f, "[{}] {}", diag.kind, diag.message),
        }
    }
}

/// Append-only sink owned by the presentation host
pub trait OutputPane {
    fn emit(&mut self, emission: Emission);
}

/// Renders emissions to the terminal, errors on stderr
pub struct ConsolePane<O: Write, E: Write> {
    out: O,
    err: E,
}

impl ConsolePane<std::io::Stdout, std::io::Stderr> {
    pub fn stdio() -> Self {
        Self::new(std::io::stdout(), std::io::stderr())
    }
}

impl<O: Write, E: Write> ConsolePane<O, E> {
    pub fn new(out: O, err: E) -> Self {
        Self { out, err }
    }

    #[cfg(test)]
    pub fn into_inner(self) -> (O, E) {
        (self.out, self.err)
    }
}

impl<O: Write, E: Write> OutputPane for ConsolePane<O, E> {
    fn emit(&mut self, emission: Emission) {
        // Console write failures never abort the run
        let written = match &emission {
            Emission::Failed(_) => writeln!(self.err, "\n{}", emission),
            Emission::Content { index, text } => {
                writeln!(self.out, "\n--- Problem {} ---\n{}\n", index, text)
            }
            _ => writeln!(self.out, "{}", emission),
        };
        if let Err(e) = written.and_then(|_| self.out.flush()) {
            log::warn!("Failed to write to console: {}", e);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::classify::ErrorKind;

    #[test]
    fn test_console_layout() {
        let mut pane = ConsolePane::new(Vec::new(), Vec::new());
        pane.emit(Emission::Generating(1));
        pane.emit(Emission::Done(1));
        pane.emit(Emission::Content {
            index: 1,
            text: "x^2 = 4".to_string(),
        });
        pane.emit(Emission::Failed(Diagnostic {
            kind: ErrorKind::QuotaExceeded,
            message: "try another key".to_string(),
        }));

        let (out, err) = pane.into_inner();
        assert_eq!(
            String::from_utf8(out).unwrap(),
            "Generating problem 1...\nProblem 1 done\n\n--- Problem 1 ---\nx^2 = 4\n\n"
        );
        assert_eq!(
            String::from_utf8(err).unwrap(),
            "\n[quota exceeded] try another key\n"
        );
    }
}
