//! Append-only workout journal.
//!
//! Completed workouts are appended to a JSONL (JSON Lines) file with file
//! locking so concurrent writers stay safe. The journal is the primary
//! source of the recent-history samples the recommendation scorer consumes.

use crate::{Result, WorkoutHistorySample};
use fs2::FileExt;
use std::fs::{File, OpenOptions};
use std::io::{BufRead, BufReader, Write};
use std::path::{Path, PathBuf};

/// Sink for recording workout history samples
pub trait SampleSink {
    fn append(&mut self, sample: &WorkoutHistorySample) -> Result<()>;
}

/// JSONL-based sample sink with file locking
pub struct JsonlSink {
    path: PathBuf,
}

impl JsonlSink {
    /// Create a new JSONL sink for the given path
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    fn ensure_parent_dir(&self) -> Result<()> {
        if let Some(parent) = self.path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        Ok(())
    }
}

impl SampleSink for JsonlSink {
    fn append(&mut self, sample: &WorkoutHistorySample) -> Result<()> {
        self.ensure_parent_dir()?;

        let file = OpenOptions::new()
            .create(true)
            .append(true)
            .open(&self.path)?;

        file.lock_exclusive()?;

        let mut writer = std::io::BufWriter::new(&file);
        let line = serde_json::to_string(sample)?;
        writer.write_all(line.as_bytes())?;
        writer.write_all(b"\n")?;
        writer.flush()?;

        file.unlock()?;

        tracing::debug!("Appended workout sample to journal {:?}", self.path);
        Ok(())
    }
}

/// Read all samples from a journal file
///
/// Corrupt lines are logged and skipped; a missing file is an empty journal.
pub fn read_samples(path: &Path) -> Result<Vec<WorkoutHistorySample>> {
    if !path.exists() {
        return Ok(Vec::new());
    }

    let file = File::open(path)?;
    file.lock_shared()?;

    let reader = BufReader::new(&file);
    let mut samples = Vec::new();

    for (line_num, line_result) in reader.lines().enumerate() {
        let line = line_result?;
        if line.trim().is_empty() {
            continue;
        }

        match serde_json::from_str::<WorkoutHistorySample>(&line) {
            Ok(sample) => samples.push(sample),
            Err(e) => {
                tracing::warn!("Failed to parse journal line {}: {}", line_num + 1, e);
            }
        }
    }

    file.unlock()?;
    tracing::debug!("Read {} samples from journal", samples.len());
    Ok(samples)
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;

    fn create_test_sample() -> WorkoutHistorySample {
        WorkoutHistorySample {
            started_at: Utc::now(),
            duration_minutes: 40,
        }
    }

    #[test]
    fn test_append_and_read_single_sample() {
        let temp_dir = tempfile::tempdir().unwrap();
        let journal_path = temp_dir.path().join("workouts.jsonl");

        let mut sink = JsonlSink::new(&journal_path);
        sink.append(&create_test_sample()).unwrap();

        let samples = read_samples(&journal_path).unwrap();
        assert_eq!(samples.len(), 1);
        assert_eq!(samples[0].duration_minutes, 40);
    }

    #[test]
    fn test_append_multiple_samples() {
        let temp_dir = tempfile::tempdir().unwrap();
        let journal_path = temp_dir.path().join("workouts.jsonl");

        let mut sink = JsonlSink::new(&journal_path);
        for _ in 0..5 {
            sink.append(&create_test_sample()).unwrap();
        }

        let samples = read_samples(&journal_path).unwrap();
        assert_eq!(samples.len(), 5);
    }

    #[test]
    fn test_read_missing_journal_is_empty() {
        let temp_dir = tempfile::tempdir().unwrap();
        let samples = read_samples(&temp_dir.path().join("nonexistent.jsonl")).unwrap();
        assert!(samples.is_empty());
    }

    #[test]
    fn test_corrupt_lines_are_skipped() {
        let temp_dir = tempfile::tempdir().unwrap();
        let journal_path = temp_dir.path().join("workouts.jsonl");

        let mut sink = JsonlSink::new(&journal_path);
        sink.append(&create_test_sample()).unwrap();

        let mut file = OpenOptions::new()
            .append(true)
            .open(&journal_path)
            .unwrap();
        writeln!(file, "not json at all").unwrap();

        sink.append(&create_test_sample()).unwrap();

        let samples = read_samples(&journal_path).unwrap();
        assert_eq!(samples.len(), 2);
    }
}
