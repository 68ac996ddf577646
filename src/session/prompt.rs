//! Interactive selection of the adapter and the target address.

use std::fmt;
use std::io::{BufRead, Write};

use crate::network::AdapterIdentity;

/// Where the new address comes from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TargetChoice {
    /// User-entered text, not yet validated.
    Manual(String),
    /// Generate a random unicast address.
    Random,
}

/// Source of the session's interactive decisions.
pub trait Prompter {
    /// Picks one of `adapters` (never empty) and returns its index.
    fn choose_adapter(&mut self, adapters: &[AdapterIdentity]) -> usize;

    /// Picks how the target address is obtained.
    fn choose_target(&mut self) -> TargetChoice;
}

/// Numbered-menu prompter over any line reader and writer.
///
/// Non-numeric or out-of-range answers re-prompt. End of input picks the
/// first option, and ends manual entry with an empty string.
#[derive(Debug)]
pub struct ConsolePrompter<R, W> {
    input: R,
    output: W,
}

impl<R: BufRead, W: Write> ConsolePrompter<R, W> {
    /// Creates a prompter reading answers from `input`.
    pub const fn new(input: R, output: W) -> Self {
        Self { input, output }
    }

    /// Returns the output sink.
    pub const fn output(&self) -> &W {
        &self.output
    }

    fn choose(&mut self, options: &[String], prompt: &str) -> usize {
        for (number, option) in (1..).zip(options) {
            self.say(format_args!("{number}. {option}\n"));
        }

        loop {
            self.say(format_args!("{prompt} "));
            let Some(answer) = self.read_line() else {
                return 0;
            };

            if answer.is_empty() || !answer.bytes().all(|b| b.is_ascii_digit()) {
                self.say(format_args!("[!] Enter the number of your choice.\n"));
                continue;
            }
            match answer.parse::<usize>() {
                Ok(n) if (1..=options.len()).contains(&n) => return n - 1,
                _ => self.say(format_args!(
                    "[!] Choose a number between 1 and {}.\n",
                    options.len()
                )),
            }
        }
    }

    /// Reads one trimmed line. `None` at end of input or on read failure.
    fn read_line(&mut self) -> Option<String> {
        let mut line = String::new();
        match self.input.read_line(&mut line) {
            Ok(0) => None,
            Ok(_) => Some(line.trim().to_string()),
            Err(e) => {
                tracing::debug!("Input unavailable: {e}");
                None
            }
        }
    }

    // Prompt output is best effort; a closed stdout must not stop the restore.
    fn say(&mut self, args: fmt::Arguments<'_>) {
        let _ = self.output.write_fmt(args);
        let _ = self.output.flush();
    }
}

impl<R: BufRead, W: Write> Prompter for ConsolePrompter<R, W> {
    fn choose_adapter(&mut self, adapters: &[AdapterIdentity]) -> usize {
        self.say(format_args!("Detected Wi-Fi adapters:\n"));
        let options: Vec<String> = adapters.iter().map(ToString::to_string).collect();
        self.choose(&options, "Select adapter number to modify:")
    }

    fn choose_target(&mut self) -> TargetChoice {
        self.say(format_args!("\nMAC options:\n"));
        let options = [
            "Manual entry (pattern: XX:XX:XX:XX:XX:XX)".to_string(),
            "Generate random unicast MAC".to_string(),
        ];
        if self.choose(&options, "Choose MAC option (1 or 2):") != 0 {
            return TargetChoice::Random;
        }

        self.say(format_args!("Enter MAC (e.g. B8:3A:37:04:78:D1): "));
        TargetChoice::Manual(self.read_line().unwrap_or_default())
    }
}
