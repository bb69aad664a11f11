// ABOUTME: Session module: JSONL transcripts of finished runs.
// ABOUTME: Gives each run's history a durable, replayable audit trail.

pub mod log;

pub use log::{LogEntry, TranscriptLogger, read_transcript, write_transcript};
