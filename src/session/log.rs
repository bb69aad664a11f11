// ABOUTME: JSONL run transcripts: one file per run, one line per conversation message.
// ABOUTME: Stored under ~/.local/share/auditgraph/runs/ unless the config names another dir.

use std::fs::{self, File};
use std::io::{BufWriter, Write};
use std::path::{Path, PathBuf};

use chrono::Utc;
use serde::{Deserialize, Serialize};

use crate::agent::Message;
use crate::agent::RunOutcome;

/// A single JSONL log entry containing a timestamp and the conversation message.
#[derive(Debug, Serialize, Deserialize)]
pub struct LogEntry {
    pub timestamp: String,
    pub message: Message,
}

/// Appends conversation messages as JSONL lines to a transcript file.
pub struct TranscriptLogger {
    writer: BufWriter<File>,
    pub path: PathBuf,
}

impl TranscriptLogger {
    /// Create the directory and open a new transcript file named by timestamp.
    pub fn create_in_dir(dir: &Path) -> anyhow::Result<Self> {
        fs::create_dir_all(dir)?;
        let timestamp = Utc::now().format("%Y-%m-%dT%H-%M-%S%.6f").to_string();
        let path = dir.join(format!("{}.jsonl", timestamp));
        let file = File::create(&path)?;
        Ok(Self {
            writer: BufWriter::new(file),
            path,
        })
    }

    /// Append a message to the transcript.
    pub fn log_message(&mut self, msg: &Message) -> anyhow::Result<()> {
        let entry = LogEntry {
            timestamp: Utc::now().to_rfc3339(),
            message: msg.clone(),
        };
        let line = serde_json::to_string(&entry)?;
        writeln!(self.writer, "{}", line)?;
        Ok(())
    }

    pub fn flush(&mut self) -> anyhow::Result<()> {
        self.writer.flush()?;
        Ok(())
    }
}

/// Write a finished run's history to a new transcript file in `dir`.
pub fn write_transcript(dir: &Path, outcome: &RunOutcome) -> anyhow::Result<PathBuf> {
    let mut logger = TranscriptLogger::create_in_dir(dir)?;
    for msg in &outcome.history {
        logger.log_message(msg)?;
    }
    logger.flush()?;
    Ok(logger.path)
}

/// Read a transcript back, one entry per line.
pub fn read_transcript(path: &Path) -> anyhow::Result<Vec<LogEntry>> {
    let content = fs::read_to_string(path)?;
    content
        .lines()
        .filter(|line| !line.trim().is_empty())
        .map(|line| serde_json::from_str::<LogEntry>(line).map_err(anyhow::Error::from))
        .collect()
}
