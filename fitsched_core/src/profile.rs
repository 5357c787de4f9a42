//! Partial workout profile embedded in the user's preferences blob.
//!
//! The preferences blob is free-form JSON owned by the application shell.
//! It may carry a partial profile (fitness level, goals, days per week,
//! available equipment, target areas); every field is optional and any
//! malformed value degrades to its default. Extraction happens once at the
//! boundary so the scorer works against a typed struct.

use crate::ExperienceLevel;
use serde_json::Value;

/// Validated partial profile extracted from the preferences blob
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct WorkoutProfile {
    pub fitness_level: Option<ExperienceLevel>,
    pub goals: Vec<String>,
    pub days_per_week: Option<u32>,
    pub available_equipment: Vec<String>,
    pub target_areas: Vec<String>,
}

impl WorkoutProfile {
    /// Extract a profile from a preferences blob
    ///
    /// A missing blob, a non-object blob, or any individually malformed
    /// field yields the empty/default value for that field. Never fails.
    pub fn from_preferences(prefs: Option<&Value>) -> Self {
        let Some(obj) = prefs.and_then(Value::as_object) else {
            tracing::debug!("No usable workout preferences object, using empty profile");
            return Self::default();
        };

        Self {
            fitness_level: obj
                .get("fitness_level")
                .and_then(Value::as_str)
                .and_then(ExperienceLevel::from_tag),
            goals: string_list(obj.get("goals")),
            days_per_week: obj
                .get("days_per_week")
                .and_then(Value::as_u64)
                .map(|d| d as u32),
            available_equipment: string_list(obj.get("available_equipment")),
            target_areas: string_list(obj.get("target_areas")),
        }
    }
}

/// Collect the string entries of a JSON array, trimmed, skipping everything
/// else (non-array values, non-string entries, empty strings)
fn string_list(value: Option<&Value>) -> Vec<String> {
    value
        .and_then(Value::as_array)
        .map(|items| {
            items
                .iter()
                .filter_map(Value::as_str)
                .map(str::trim)
                .filter(|s| !s.is_empty())
                .map(str::to_string)
                .collect()
        })
        .unwrap_or_default()
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_missing_blob_yields_empty_profile() {
        let profile = WorkoutProfile::from_preferences(None);
        assert_eq!(profile, WorkoutProfile::default());
    }

    #[test]
    fn test_non_object_blob_yields_empty_profile() {
        let blob = json!("not an object");
        let profile = WorkoutProfile::from_preferences(Some(&blob));
        assert_eq!(profile, WorkoutProfile::default());
    }

    #[test]
    fn test_full_profile_extraction() {
        let blob = json!({
            "fitness_level": "intermediate",
            "goals": ["muscle_gain", "strength"],
            "days_per_week": 4,
            "available_equipment": ["barbell", "dumbbell"],
            "target_areas": ["back"],
            "schedule_preferences": { "start_day": "Monday" }
        });

        let profile = WorkoutProfile::from_preferences(Some(&blob));

        assert_eq!(profile.fitness_level, Some(ExperienceLevel::Intermediate));
        assert_eq!(profile.goals, vec!["muscle_gain", "strength"]);
        assert_eq!(profile.days_per_week, Some(4));
        assert_eq!(profile.available_equipment, vec!["barbell", "dumbbell"]);
        assert_eq!(profile.target_areas, vec!["back"]);
    }

    #[test]
    fn test_malformed_fields_degrade_individually() {
        let blob = json!({
            "fitness_level": "superhuman",
            "goals": "not an array",
            "days_per_week": "four",
            "available_equipment": ["barbell", 42, "", "  bands "]
        });

        let profile = WorkoutProfile::from_preferences(Some(&blob));

        assert_eq!(profile.fitness_level, None);
        assert!(profile.goals.is_empty());
        assert_eq!(profile.days_per_week, None);
        // Non-strings and empties are skipped, strings are trimmed
        assert_eq!(profile.available_equipment, vec!["barbell", "bands"]);
    }
}
