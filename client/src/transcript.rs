//! Per-server command/response transcript.
//!
//! Each record is appended by opening the file, writing, and closing it
//! again, so no handle outlives a call and a crash loses at most the record
//! being written. Nothing here ever truncates the file.

use crate::error::ClientError;
use chrono::{DateTime, Local};
use log::warn;
use protocol::Server;
use std::fs::OpenOptions;
use std::io::Write;
use std::path::{Path, PathBuf};

/// Timestamp layout of command records, e.g. `Mon Oct 19 14:03:07 2026`.
pub const TIMESTAMP_FORMAT: &str = "%a %b %-d %H:%M:%S %Y";

#[derive(Debug, Clone)]
pub struct TranscriptLogger {
    path: PathBuf,
    enabled: bool,
}

impl TranscriptLogger {
    /// Logger writing to `<dir>/log_<host>_<port>.log`.
    pub fn new(dir: impl AsRef<Path>, server: &Server, enabled: bool) -> Self {
        Self {
            path: dir.as_ref().join(server.log_file_name()),
            enabled,
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn is_enabled(&self) -> bool {
        self.enabled
    }

    /// Appends `line` verbatim. Failures are logged and otherwise ignored.
    pub fn append(&self, line: &str) {
        if !self.enabled {
            return;
        }

        if let Err(e) = self.try_append(line) {
            warn!("{}", e);
        }
    }

    fn try_append(&self, line: &str) -> Result<(), ClientError> {
        let log_write = |source| ClientError::LogWrite {
            path: self.path.clone(),
            source,
        };

        let mut file = OpenOptions::new()
            .create(true)
            .append(true)
            .open(&self.path)
            .map_err(log_write)?;
        file.write_all(line.as_bytes()).map_err(log_write)?;
        Ok(())
    }

    /// Records an outgoing command. The command must already be redacted.
    pub fn log_command(&self, command: &str) {
        self.append(&command_record(Local::now(), command));
    }

    /// Records one console output line. The line must already be plain text
    /// and redacted.
    pub fn log_output(&self, line: &str) {
        self.append(&format!("{}\n", line));
    }
}

/// Formats an outgoing command as `<timestamp> > <command>` plus a blank line.
pub fn command_record(at: DateTime<Local>, command: &str) -> String {
    format!("{} > {}\n\n", at.format(TIMESTAMP_FORMAT), command)
}
