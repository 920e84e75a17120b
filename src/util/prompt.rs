use std::io::{self, BufRead, Write};

use crate::error::{PromptError, Result};
use crate::types::is_affirmative;

pub trait Prompter {
    /// Reads one line with echo. The trailing line break is removed.
    fn read_line(&mut self, prompt: &str) -> Result<String>;
    fn read_secret(&mut self, prompt: &str) -> Result<String>;
    fn say(&mut self, message: &str);
}

pub struct TerminalPrompter;

impl Prompter for TerminalPrompter {
    fn read_line(&mut self, prompt: &str) -> Result<String> {
        print!("{}", prompt);
        io::stdout().flush().map_err(PromptError::Terminal)?;
        let mut line = String::new();
        let read = io::stdin()
            .lock()
            .read_line(&mut line)
            .map_err(PromptError::Terminal)?;
        if read == 0 {
            return Err(PromptError::Closed.into());
        }
        Ok(line.trim_end_matches(['\r', '\n']).to_string())
    }

    fn read_secret(&mut self, prompt: &str) -> Result<String> {
        match rpassword::prompt_password(prompt) {
            Ok(value) => Ok(value),
            Err(err) if err.kind() == io::ErrorKind::UnexpectedEof => {
                Err(PromptError::Closed.into())
            }
            Err(err) => Err(PromptError::Terminal(err).into()),
        }
    }

    fn say(&mut self, message: &str) {
        println!("{}", message);
    }
}

/// Asks for a value. A blank answer takes `default`; blank with no default
/// re-prompts.
pub fn ask<P: Prompter + ?Sized>(
    prompter: &mut P,
    message: &str,
    default: Option<&str>,
    masked: bool,
) -> Result<String> {
    let default = default.filter(|value| !value.is_empty());
    let prompt = match default {
        Some(value) if !masked => format!("{} [{}]: ", message, value),
        Some(_) => format!("{} [keep current]: ", message),
        None => format!("{}: ", message),
    };
    loop {
        let raw = if masked {
            prompter.read_secret(&prompt)?
        } else {
            prompter.read_line(&prompt)?
        };
        let input = raw.trim();
        if !input.is_empty() {
            return Ok(input.to_string());
        }
        if let Some(value) = default {
            return Ok(value.to_string());
        }
        prompter.say("Error: input cannot be empty. Please enter a valid value.");
    }
}

/// Dual entry: the value must be typed twice and both entries must match.
pub fn ask_twice<P: Prompter + ?Sized>(
    prompter: &mut P,
    message: &str,
    masked: bool,
) -> Result<String> {
    loop {
        let first = ask(prompter, message, None, masked)?;
        let second = ask(prompter, "Confirm", None, masked)?;
        if first == second {
            return Ok(first);
        }
        prompter.say("Entries do not match. Try again.");
    }
}

/// Yes/no gate. The prompt text should carry its own `(Y/n)` or `(y/N)` hint.
pub fn confirm<P: Prompter + ?Sized>(
    prompter: &mut P,
    message: &str,
    default_yes: bool,
) -> Result<bool> {
    let answer = prompter.read_line(message)?;
    Ok(is_affirmative(&answer, default_yes))
}

#[cfg(test)]
pub mod testing {
    use std::collections::VecDeque;

    use super::Prompter;
    use crate::error::{PromptError, Result};

    #[derive(Default)]
    pub struct ScriptedPrompter {
        answers: VecDeque<String>,
        pub prompts: Vec<String>,
        pub said: Vec<String>,
        pub secret_reads: usize,
    }

    impl ScriptedPrompter {
        pub fn new(answers: &[&str]) -> Self {
            Self {
                answers: answers.iter().map(|a| a.to_string()).collect(),
                ..Default::default()
            }
        }

        pub fn remaining(&self) -> usize {
            self.answers.len()
        }

        pub fn said_contains(&self, needle: &str) -> bool {
            self.said.iter().any(|line| line.contains(needle))
        }

        fn next(&mut self, prompt: &str) -> Result<String> {
            self.prompts.push(prompt.to_string());
            self.answers.pop_front().ok_or_else(|| PromptError::Closed.into())
        }
    }

    impl Prompter for ScriptedPrompter {
        fn read_line(&mut self, prompt: &str) -> Result<String> {
            self.next(prompt)
        }

        fn read_secret(&mut self, prompt: &str) -> Result<String> {
            self.secret_reads += 1;
            self.next(prompt)
        }

        fn say(&mut self, message: &str) {
            self.said.push(message.to_string());
        }
    }
}

#[cfg(test)]
mod tests {
    use super::testing::ScriptedPrompter;
    use super::*;
    use crate::error::PersephoneError;

    #[test]
    fn ask_rejects_empty_without_default() {
        let mut p = ScriptedPrompter::new(&["", "  ", "/tmp/repo"]);
        let value = ask(&mut p, "Repository", None, false).unwrap();
        assert_eq!(value, "/tmp/repo");
        assert_eq!(
            p.said
                .iter()
                .filter(|l| l.contains("input cannot be empty"))
                .count(),
            2
        );
    }

    #[test]
    fn ask_takes_default_on_blank() {
        let mut p = ScriptedPrompter::new(&[""]);
        let value = ask(&mut p, "Paths", Some("/etc /srv"), false).unwrap();
        assert_eq!(value, "/etc /srv");
        assert_eq!(p.prompts[0], "Paths [/etc /srv]: ");
    }

    #[test]
    fn masked_default_is_not_echoed_in_prompt() {
        let mut p = ScriptedPrompter::new(&[""]);
        ask(&mut p, "Secret", Some("hunter2"), true).unwrap();
        assert!(!p.prompts[0].contains("hunter2"));
        assert_eq!(p.secret_reads, 1);
    }

    #[test]
    fn ask_twice_loops_until_match() {
        let mut p = ScriptedPrompter::new(&["p1", "p2", "p1", "p1"]);
        let value = ask_twice(&mut p, "Password", true).unwrap();
        assert_eq!(value, "p1");
        assert!(p.said_contains("do not match"));
        assert_eq!(p.remaining(), 0);
    }

    #[test]
    fn closed_input_is_an_error() {
        let mut p = ScriptedPrompter::new(&[]);
        let err = ask(&mut p, "Repository", None, false).unwrap_err();
        assert!(matches!(err, PersephoneError::Prompt(PromptError::Closed)));
    }

    #[test]
    fn confirm_respects_default() {
        let mut p = ScriptedPrompter::new(&["", "", "nope"]);
        assert!(confirm(&mut p, "ok? (Y/n): ", true).unwrap());
        assert!(!confirm(&mut p, "ok? (y/N): ", false).unwrap());
        assert!(!confirm(&mut p, "ok? (Y/n): ", true).unwrap());
    }
}
