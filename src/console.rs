//! Host input and output
//!
//! The parser reads lines and prints text only through [`Console`].
//! [`StdConsole`] talks to the terminal; [`ScriptedConsole`] replays a fixed
//! list of lines and keeps everything printed, for tests and batch runs.

use crate::error::ParserError;
use log::debug;
use std::collections::VecDeque;
use std::io::{self, BufRead, Write};

/// Why the parser wants a line.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PromptKind {
    /// A fresh command
    Command,
    /// The answer to a "which do you mean" or "what do you want" question
    Question,
}

pub trait Console {
    /// Read one line. `Ok(None)` means the input is closed.
    fn read_line(&mut self, kind: PromptKind) -> Result<Option<String>, ParserError>;

    fn print(&mut self, text: &str) -> Result<(), ParserError>;

    /// Show the prompt before a read.
    fn prompt(&mut self, text: &str) -> Result<(), ParserError> {
        self.print(text)
    }
}

/// Console over stdin and stdout.
pub struct StdConsole {
    stdin: io::Stdin,
    echo_prompt: bool,
}

impl StdConsole {
    /// Prompts are shown only when stdin is a terminal.
    pub fn new() -> Self {
        StdConsole {
            stdin: io::stdin(),
            echo_prompt: atty::is(atty::Stream::Stdin),
        }
    }
}

impl Default for StdConsole {
    fn default() -> Self {
        StdConsole::new()
    }
}

impl Console for StdConsole {
    fn read_line(&mut self, kind: PromptKind) -> Result<Option<String>, ParserError> {
        let mut line = String::new();
        let n = self.stdin.lock().read_line(&mut line)?;
        if n == 0 {
            debug!("stdin closed while waiting for {:?}", kind);
            return Ok(None);
        }
        Ok(Some(line))
    }

    fn print(&mut self, text: &str) -> Result<(), ParserError> {
        let mut out = io::stdout();
        out.write_all(text.as_bytes())?;
        out.flush()?;
        Ok(())
    }

    fn prompt(&mut self, text: &str) -> Result<(), ParserError> {
        if self.echo_prompt {
            self.print(text)
        } else {
            Ok(())
        }
    }
}

/// Console that reads from a script and records its output.
#[derive(Debug, Default)]
pub struct ScriptedConsole {
    script: VecDeque<String>,
    output: String,
    reads: Vec<(PromptKind, String)>,
}

impl ScriptedConsole {
    pub fn new(lines: &[&str]) -> Self {
        ScriptedConsole {
            script: lines.iter().map(|l| l.to_string()).collect(),
            output: String::new(),
            reads: Vec::new(),
        }
    }

    /// Queue more input.
    pub fn push_line(&mut self, line: &str) {
        self.script.push_back(line.to_string());
    }

    /// Everything printed so far
    pub fn output(&self) -> &str {
        &self.output
    }

    /// Printed output split into non-empty lines
    pub fn output_lines(&self) -> Vec<&str> {
        self.output.lines().filter(|l| !l.is_empty()).collect()
    }

    /// Forget what has been printed.
    pub fn take_output(&mut self) -> String {
        std::mem::take(&mut self.output)
    }

    /// Lines read so far, with the kind of prompt each answered
    pub fn reads(&self) -> &[(PromptKind, String)] {
        &self.reads
    }

    pub fn remaining(&self) -> usize {
        self.script.len()
    }
}

impl Console for ScriptedConsole {
    fn read_line(&mut self, kind: PromptKind) -> Result<Option<String>, ParserError> {
        let line = self.script.pop_front();
        if let Some(l) = &line {
            debug!("scripted input ({:?}): {}", kind, l);
            self.reads.push((kind, l.clone()));
        }
        Ok(line)
    }

    fn print(&mut self, text: &str) -> Result<(), ParserError> {
        self.output.push_str(text);
        Ok(())
    }

    fn prompt(&mut self, _text: &str) -> Result<(), ParserError> {
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_scripted_console_replays_and_records() {
        let mut c = ScriptedConsole::new(&["take ball", "ball"]);
        assert_eq!(
            c.read_line(PromptKind::Command).unwrap().as_deref(),
            Some("take ball")
        );
        c.print("Which do you mean, ").unwrap();
        c.print("the red ball or the red box?\n").unwrap();
        c.prompt("\n>").unwrap();
        assert_eq!(c.read_line(PromptKind::Question).unwrap().as_deref(), Some("ball"));
        assert_eq!(c.read_line(PromptKind::Command).unwrap(), None);

        assert_eq!(
            c.output_lines(),
            vec!["Which do you mean, the red ball or the red box?"]
        );
        assert_eq!(c.reads()[1].0, PromptKind::Question);
        assert_eq!(c.take_output().len(), 48);
        assert!(c.output().is_empty());
    }
}
