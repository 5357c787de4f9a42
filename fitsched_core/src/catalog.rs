//! Built-in catalog of training programs.
//!
//! This module provides the static program candidates the recommendation
//! scorer is seeded with when no persisted program records exist.

use crate::types::*;
use once_cell::sync::Lazy;

/// The catalog of program candidates, in a stable presentation order
#[derive(Clone, Debug)]
pub struct ProgramCatalog {
    pub programs: Vec<ProgramCandidate>,
}

/// Cached default catalog - built once and reused across all operations
static DEFAULT_CATALOG: Lazy<ProgramCatalog> = Lazy::new(build_default_catalog_internal);

/// Get a reference to the cached default catalog
pub fn get_default_catalog() -> &'static ProgramCatalog {
    &DEFAULT_CATALOG
}

/// Builds the default catalog of training programs
///
/// **Note**: For production use, prefer `get_default_catalog()` which returns
/// a cached reference. This function is retained for testing and custom
/// catalog creation.
pub fn build_default_catalog() -> ProgramCatalog {
    build_default_catalog_internal()
}

fn build_default_catalog_internal() -> ProgramCatalog {
    let programs = vec![
        ProgramCandidate {
            id: "foundations_full_body".into(),
            name: "Foundations Full Body".into(),
            level: ExperienceLevel::Beginner,
            duration_weeks: 6,
            days_per_week: 3,
            category: Some(ProgramCategory::Intro),
            required_equipment: vec![],
            avg_session_minutes: Some(35),
        },
        ProgramCandidate {
            id: "linear_strength_531".into(),
            name: "Linear Strength".into(),
            level: ExperienceLevel::Intermediate,
            duration_weeks: 12,
            days_per_week: 4,
            category: Some(ProgramCategory::Strength),
            required_equipment: vec!["barbell".into(), "rack".into()],
            avg_session_minutes: Some(60),
        },
        ProgramCandidate {
            id: "hypertrophy_split_ppl".into(),
            name: "Push Pull Legs Hypertrophy".into(),
            level: ExperienceLevel::Intermediate,
            duration_weeks: 10,
            days_per_week: 6,
            category: Some(ProgramCategory::Hypertrophy),
            required_equipment: vec!["barbell".into(), "dumbbell".into(), "cable_machine".into()],
            avg_session_minutes: Some(70),
        },
        ProgramCandidate {
            id: "fat_loss_circuits".into(),
            name: "Fat Loss Circuits".into(),
            level: ExperienceLevel::Beginner,
            duration_weeks: 8,
            days_per_week: 4,
            category: Some(ProgramCategory::FatLoss),
            required_equipment: vec!["dumbbell".into()],
            avg_session_minutes: Some(30),
        },
        ProgramCandidate {
            id: "endurance_builder".into(),
            name: "Endurance Builder".into(),
            level: ExperienceLevel::Intermediate,
            duration_weeks: 8,
            days_per_week: 5,
            category: Some(ProgramCategory::Endurance),
            required_equipment: vec![],
            avg_session_minutes: Some(45),
        },
        ProgramCandidate {
            id: "advanced_powerbuilding".into(),
            name: "Advanced Powerbuilding".into(),
            level: ExperienceLevel::Advanced,
            duration_weeks: 16,
            days_per_week: 5,
            category: Some(ProgramCategory::Strength),
            required_equipment: vec!["barbell".into(), "rack".into(), "cable_machine".into()],
            avg_session_minutes: Some(75),
        },
        ProgramCandidate {
            id: "mobility_reset".into(),
            name: "Mobility Reset".into(),
            level: ExperienceLevel::Beginner,
            duration_weeks: 4,
            days_per_week: 3,
            category: Some(ProgramCategory::Mobility),
            required_equipment: vec!["bands".into()],
            avg_session_minutes: Some(20),
        },
        ProgramCandidate {
            id: "bodyweight_anywhere".into(),
            name: "Bodyweight Anywhere".into(),
            level: ExperienceLevel::Beginner,
            duration_weeks: 8,
            days_per_week: 4,
            category: Some(ProgramCategory::Endurance),
            required_equipment: vec!["bodyweight".into()],
            avg_session_minutes: Some(30),
        },
    ];

    ProgramCatalog { programs }
}

impl ProgramCatalog {
    /// Validate catalog consistency, returning all problems found
    pub fn validate(&self) -> Vec<String> {
        let mut errors = Vec::new();
        let mut seen_ids = std::collections::HashSet::new();

        for program in &self.programs {
            if program.id.is_empty() {
                errors.push("Program has empty ID".to_string());
            }
            if !seen_ids.insert(program.id.as_str()) {
                errors.push(format!("Duplicate program ID '{}'", program.id));
            }
            if program.name.is_empty() {
                errors.push(format!("Program '{}' has empty name", program.id));
            }
            if program.days_per_week == 0 || program.days_per_week > 7 {
                errors.push(format!(
                    "Program '{}' has invalid days_per_week {}",
                    program.id, program.days_per_week
                ));
            }
            if program.duration_weeks == 0 {
                errors.push(format!("Program '{}' has zero duration", program.id));
            }
            if program.required_equipment.iter().any(|t| t.trim().is_empty()) {
                errors.push(format!(
                    "Program '{}' has an empty equipment tag",
                    program.id
                ));
            }
        }

        errors
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_catalog_validates() {
        let catalog = build_default_catalog();
        let errors = catalog.validate();
        assert!(
            errors.is_empty(),
            "Default catalog has validation errors: {:?}",
            errors
        );
    }

    #[test]
    fn test_catalog_covers_all_levels() {
        let catalog = build_default_catalog();
        for level in [
            ExperienceLevel::Beginner,
            ExperienceLevel::Intermediate,
            ExperienceLevel::Advanced,
        ] {
            assert!(
                catalog.programs.iter().any(|p| p.level == level),
                "No program at level {:?}",
                level
            );
        }
    }

    #[test]
    fn test_catalog_has_equipment_free_options() {
        let catalog = build_default_catalog();
        let free = catalog
            .programs
            .iter()
            .filter(|p| {
                p.required_equipment.is_empty()
                    || p.required_equipment.iter().all(|t| t == "bodyweight")
            })
            .count();
        assert!(free >= 2, "Should have at least 2 equipment-free programs");
    }

    #[test]
    fn test_validate_flags_bad_program() {
        let mut catalog = build_default_catalog();
        catalog.programs.push(ProgramCandidate {
            id: "foundations_full_body".into(), // duplicate
            name: "".into(),
            level: ExperienceLevel::Beginner,
            duration_weeks: 0,
            days_per_week: 9,
            category: None,
            required_equipment: vec![" ".into()],
            avg_session_minutes: None,
        });

        let errors = catalog.validate();
        assert!(errors.len() >= 4, "Expected several errors: {:?}", errors);
    }

    #[test]
    fn test_cached_catalog_matches_built() {
        let cached = get_default_catalog();
        let built = build_default_catalog();
        assert_eq!(cached.programs.len(), built.programs.len());
    }
}
