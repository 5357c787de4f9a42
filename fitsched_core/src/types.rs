//! Core domain types for the fitsched recommendation and scheduling system.
//!
//! This module defines the fundamental types used throughout the system:
//! - Program candidates and their properties
//! - User context for recommendations (goal, activity, history)
//! - Weekdays and schedule preferences
//! - Recommendation and schedule-mapping outputs

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use uuid::Uuid;

// ============================================================================
// Program and User Enums
// ============================================================================

/// The user's high-level body-composition goal
#[derive(Clone, Copy, Debug, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum Goal {
    Lose,
    Maintain,
    Gain,
}

/// Self-reported day-to-day activity level
#[derive(Clone, Copy, Debug, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum ActivityLevel {
    Sedentary,
    Light,
    Moderate,
    VeryActive,
    Athlete,
}

impl ActivityLevel {
    /// Default training days per week for users without an explicit preference
    pub fn default_days_per_week(self) -> u32 {
        match self {
            ActivityLevel::Sedentary | ActivityLevel::Light => 3,
            ActivityLevel::Moderate => 4,
            ActivityLevel::VeryActive => 5,
            ActivityLevel::Athlete => 6,
        }
    }
}

/// Training experience level, ordered beginner < intermediate < advanced
#[derive(Clone, Copy, Debug, Serialize, Deserialize, PartialEq, Eq, PartialOrd, Ord)]
#[serde(rename_all = "snake_case")]
pub enum ExperienceLevel {
    Beginner,
    Intermediate,
    Advanced,
}

impl ExperienceLevel {
    /// Position on the ordinal scale, used for level-distance scoring
    pub fn rank(self) -> i32 {
        match self {
            ExperienceLevel::Beginner => 0,
            ExperienceLevel::Intermediate => 1,
            ExperienceLevel::Advanced => 2,
        }
    }

    /// Parse a free-form tag (e.g. from a preferences blob); None if unknown
    pub fn from_tag(tag: &str) -> Option<Self> {
        match tag.trim().to_lowercase().as_str() {
            "beginner" => Some(ExperienceLevel::Beginner),
            "intermediate" => Some(ExperienceLevel::Intermediate),
            "advanced" => Some(ExperienceLevel::Advanced),
            _ => None,
        }
    }
}

/// Category of training program
#[derive(Clone, Copy, Debug, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "snake_case")]
pub enum ProgramCategory {
    Strength,
    Hypertrophy,
    FatLoss,
    Intro,
    Endurance,
    Mobility,
}

// ============================================================================
// Program Candidate and History Types
// ============================================================================

/// A training program available for recommendation
///
/// Immutable; sourced from the built-in catalog or persisted program records.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct ProgramCandidate {
    pub id: String,
    pub name: String,
    pub level: ExperienceLevel,
    pub duration_weeks: u32,
    pub days_per_week: u32,
    pub category: Option<ProgramCategory>,
    pub required_equipment: Vec<String>,
    pub avg_session_minutes: Option<u32>,
}

/// A past workout's start time and duration
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct WorkoutHistorySample {
    pub started_at: DateTime<Utc>,
    pub duration_minutes: u32,
}

/// A workout template belonging to a chosen program
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct WorkoutTemplate {
    pub id: String,
    pub name: String,
}

/// Runtime context for the recommendation scorer
///
/// `workout_preferences` is the user's free-form preferences blob; it may
/// embed a partial profile (see [`crate::profile::WorkoutProfile`]) and is
/// tolerated in any shape.
#[derive(Clone, Debug)]
pub struct RecommendationContext {
    pub now: DateTime<Utc>,
    pub goal: Goal,
    pub activity_level: ActivityLevel,
    pub workout_preferences: Option<Value>,
}

// ============================================================================
// Recommendation Output Types
// ============================================================================

/// How much recent-history evidence backs a recommendation's score
#[derive(Clone, Copy, Debug, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum Confidence {
    Low,
    Medium,
    High,
}

/// A scored and ranked program recommendation
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct ProgramRecommendation {
    pub program_id: String,
    /// Match score, clamped to 0..=100
    pub score: u8,
    pub confidence: Confidence,
    /// Up to 3 reason strings, strongest factor first
    pub reasons: Vec<String>,
    /// Projected training minutes per week on this program
    pub weekly_minutes: u32,
    /// 1-based position after sorting by score descending
    pub rank: usize,
}

// ============================================================================
// Weekday and Schedule Types
// ============================================================================

/// Day of the week, in the fixed Monday→Sunday order that all rotation
/// arithmetic is based on
#[derive(Clone, Copy, Debug, Serialize, Deserialize, PartialEq, Eq, Hash)]
pub enum WeekDay {
    Monday,
    Tuesday,
    Wednesday,
    Thursday,
    Friday,
    Saturday,
    Sunday,
}

impl WeekDay {
    /// All seven days in canonical Monday→Sunday order
    pub const ALL: [WeekDay; 7] = [
        WeekDay::Monday,
        WeekDay::Tuesday,
        WeekDay::Wednesday,
        WeekDay::Thursday,
        WeekDay::Friday,
        WeekDay::Saturday,
        WeekDay::Sunday,
    ];

    /// Index within the canonical order (Monday = 0)
    pub fn index(self) -> usize {
        match self {
            WeekDay::Monday => 0,
            WeekDay::Tuesday => 1,
            WeekDay::Wednesday => 2,
            WeekDay::Thursday => 3,
            WeekDay::Friday => 4,
            WeekDay::Saturday => 5,
            WeekDay::Sunday => 6,
        }
    }

    /// Canonical display name
    pub fn name(self) -> &'static str {
        match self {
            WeekDay::Monday => "Monday",
            WeekDay::Tuesday => "Tuesday",
            WeekDay::Wednesday => "Wednesday",
            WeekDay::Thursday => "Thursday",
            WeekDay::Friday => "Friday",
            WeekDay::Saturday => "Saturday",
            WeekDay::Sunday => "Sunday",
        }
    }

    /// Parse a day name case-insensitively; None if unrecognized
    pub fn from_name(name: &str) -> Option<Self> {
        match name.trim().to_lowercase().as_str() {
            "monday" => Some(WeekDay::Monday),
            "tuesday" => Some(WeekDay::Tuesday),
            "wednesday" => Some(WeekDay::Wednesday),
            "thursday" => Some(WeekDay::Thursday),
            "friday" => Some(WeekDay::Friday),
            "saturday" => Some(WeekDay::Saturday),
            "sunday" => Some(WeekDay::Sunday),
            _ => None,
        }
    }
}

/// Raw, untrusted schedule preferences as read from a preferences blob or
/// supplied by a caller; sanitized before use
#[derive(Clone, Debug, Default, Serialize, Deserialize, PartialEq, Eq)]
pub struct SchedulePreferencesInput {
    #[serde(default)]
    pub start_day: Option<String>,
    #[serde(default)]
    pub rest_days: Option<Vec<String>>,
}

/// Sanitized schedule preferences
///
/// Invariants (enforced by [`crate::schedule::sanitize_schedule_preferences`]):
/// `rest_days` holds at most 6 distinct days in canonical Monday→Sunday
/// order, so at least one training day always remains.
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq, Eq)]
pub struct SchedulePreferences {
    pub start_day: WeekDay,
    pub rest_days: Vec<WeekDay>,
}

impl Default for SchedulePreferences {
    fn default() -> Self {
        Self {
            start_day: WeekDay::Monday,
            rest_days: Vec::new(),
        }
    }
}

/// A single template-to-day assignment
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq, Eq)]
pub struct ScheduleAssignment {
    pub template_id: String,
    pub day: WeekDay,
}

/// Result of mapping an ordered template list onto the week
///
/// Computed fresh on every scheduling request; only the assignments are
/// persisted (by the schedule store), never this value itself.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct MappedTemplateSchedule {
    pub assignments: Vec<ScheduleAssignment>,
    /// Template ids that could not be placed, in original order
    pub dropped: Vec<String>,
    /// The training days actually used for assignment, in rotation order
    pub training_days: Vec<WeekDay>,
    /// The sanitized preferences the mapping was computed with
    pub preferences: SchedulePreferences,
}

/// A persisted schedule-assignment record
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq, Eq)]
pub struct ScheduleRecord {
    pub user_id: Uuid,
    pub template_id: String,
    pub day: WeekDay,
}

/// Result of applying a schedule for a user, including how many assignment
/// records were created
#[derive(Clone, Debug)]
pub struct AppliedSchedule {
    pub mapped: MappedTemplateSchedule,
    pub created: usize,
}
