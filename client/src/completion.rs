//! Command word list used for auto-completion (`commands.txt`).

use log::debug;
use std::path::Path;

pub const DEFAULT_COMMANDS_FILE: &str = "commands.txt";

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CompletionList {
    commands: Vec<String>,
}

impl CompletionList {
    /// One command per line; empty lines and repeats are skipped, first
    /// occurrence order is kept.
    pub fn from_lines(text: &str) -> Self {
        let mut commands: Vec<String> = Vec::new();
        for line in text.lines() {
            if !line.is_empty() && !commands.iter().any(|c| c == line) {
                commands.push(line.to_string());
            }
        }
        Self { commands }
    }

    /// Reads the list from `path`; a missing or unreadable file gives an empty list.
    pub fn load(path: impl AsRef<Path>) -> Self {
        let path = path.as_ref();
        match std::fs::read_to_string(path) {
            Ok(text) => Self::from_lines(&text),
            Err(e) => {
                debug!("No completion list at {} ({})", path.display(), e);
                Self::default()
            }
        }
    }

    pub fn len(&self) -> usize {
        self.commands.len()
    }

    pub fn is_empty(&self) -> bool {
        self.commands.is_empty()
    }

    pub fn commands(&self) -> &[String] {
        &self.commands
    }

    /// Commands starting with `prefix`, ignoring ASCII case.
    pub fn matches(&self, prefix: &str) -> Vec<&str> {
        let prefix = prefix.to_ascii_lowercase();
        self.commands
            .iter()
            .filter(|command| command.to_ascii_lowercase().starts_with(&prefix))
            .map(String::as_str)
            .collect()
    }
}
