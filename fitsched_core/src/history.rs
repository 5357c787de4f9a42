//! Recent workout history: the 28-day window the scorer reasons over.
//!
//! [`HistoryStats`] is the pure summary the recommendation scorer consumes.
//! [`load_recent_samples`] assembles the underlying samples from the JSONL
//! journal plus an optional exported CSV archive, tolerating bad rows.

use crate::{Result, WorkoutHistorySample};
use chrono::{DateTime, Duration, Utc};
use csv::ReaderBuilder;
use serde::Deserialize;
use std::collections::HashSet;
use std::path::Path;

/// Rolling window, in days, of history the scorer considers
pub const RECENT_WINDOW_DAYS: i64 = 28;

/// Summary statistics over the recent-history window
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct HistoryStats {
    /// Workouts started within the window
    pub recent_count: usize,
    /// Workouts per week (recent count over the 4-week window)
    pub per_week: f64,
    /// Average session duration in minutes; 0 with no recent workouts
    pub avg_duration_minutes: f64,
}

impl HistoryStats {
    /// Summarize samples whose start time falls within the last 28 days
    pub fn compute(samples: &[WorkoutHistorySample], now: DateTime<Utc>) -> Self {
        let cutoff = now - Duration::days(RECENT_WINDOW_DAYS);
        let recent: Vec<&WorkoutHistorySample> =
            samples.iter().filter(|s| s.started_at >= cutoff).collect();

        let recent_count = recent.len();
        let avg_duration_minutes = if recent_count == 0 {
            0.0
        } else {
            recent.iter().map(|s| s.duration_minutes as f64).sum::<f64>() / recent_count as f64
        };

        Self {
            recent_count,
            per_week: recent_count as f64 / 4.0,
            avg_duration_minutes,
        }
    }
}

/// CSV row format for reading exported workout history
#[derive(Debug, Deserialize)]
struct CsvRow {
    started_at: String,
    duration_minutes: u32,
}

impl TryFrom<CsvRow> for WorkoutHistorySample {
    type Error = crate::Error;

    fn try_from(row: CsvRow) -> Result<Self> {
        let started_at = DateTime::parse_from_rfc3339(&row.started_at)
            .map_err(|e| crate::Error::Other(format!("Invalid date: {}", e)))?
            .with_timezone(&Utc);

        Ok(WorkoutHistorySample {
            started_at,
            duration_minutes: row.duration_minutes,
        })
    }
}

/// Load samples from the recent window from both the journal and a CSV export
///
/// Returns samples sorted by start time (newest first). Samples appearing in
/// both sources with identical start time and duration are de-duplicated.
pub fn load_recent_samples(
    journal_path: &Path,
    csv_path: &Path,
    now: DateTime<Utc>,
) -> Result<Vec<WorkoutHistorySample>> {
    let cutoff = now - Duration::days(RECENT_WINDOW_DAYS);
    let mut samples = Vec::new();
    let mut seen: HashSet<(i64, u32)> = HashSet::new();

    if journal_path.exists() {
        for sample in crate::journal::read_samples(journal_path)? {
            if sample.started_at >= cutoff
                && seen.insert((sample.started_at.timestamp_millis(), sample.duration_minutes))
            {
                samples.push(sample);
            }
        }
        tracing::debug!("Loaded {} samples from journal", samples.len());
    }

    if csv_path.exists() {
        let mut csv_count = 0;
        for sample in load_samples_from_csv(csv_path)? {
            if sample.started_at >= cutoff
                && seen.insert((sample.started_at.timestamp_millis(), sample.duration_minutes))
            {
                samples.push(sample);
                csv_count += 1;
            }
        }
        tracing::debug!("Loaded {} samples from CSV", csv_count);
    }

    samples.sort_by(|a, b| b.started_at.cmp(&a.started_at));

    tracing::info!(
        "Loaded {} total samples from last {} days",
        samples.len(),
        RECENT_WINDOW_DAYS
    );

    Ok(samples)
}

/// Load all samples from a CSV export, skipping rows that fail to parse
fn load_samples_from_csv(path: &Path) -> Result<Vec<WorkoutHistorySample>> {
    let mut reader = ReaderBuilder::new().has_headers(true).from_path(path)?;

    let mut samples = Vec::new();
    for result in reader.deserialize::<CsvRow>() {
        match result {
            Ok(row) => match WorkoutHistorySample::try_from(row) {
                Ok(sample) => samples.push(sample),
                Err(e) => {
                    tracing::warn!("Failed to parse CSV row: {}", e);
                }
            },
            Err(e) => {
                tracing::warn!("Failed to deserialize CSV row: {}", e);
            }
        }
    }

    Ok(samples)
}
