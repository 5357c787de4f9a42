//! Program recommendation scorer.
//!
//! Ranks candidate training programs against a user's goal, activity level,
//! optional partial profile, and recent workout history. The scorer is a
//! pure function: five weighted sub-scores per candidate, clamped to a
//! 0–100 match score, a history-backed confidence tier, and up to three
//! human-readable reasons ordered by factor strength.

use crate::history::HistoryStats;
use crate::profile::WorkoutProfile;
use crate::{
    ActivityLevel, Confidence, Config, ExperienceLevel, Goal, ProgramCandidate, ProgramCategory,
    ProgramRecommendation, RecommendationContext, WorkoutHistorySample,
};
use std::collections::HashSet;

/// Recent workouts per week above which the user is treated as advanced
const ADVANCED_PER_WEEK: f64 = 4.5;
/// Recent workouts per week above which the user is treated as intermediate
const INTERMEDIATE_PER_WEEK: f64 = 2.5;

/// Equipment tag every user implicitly has
const BODYWEIGHT: &str = "bodyweight";

/// Reason used when no sub-score produced one
const DEFAULT_REASON: &str = "Balanced overall fit for your profile";

/// Score and rank candidate programs for a user
///
/// Pure and deterministic: inputs are never mutated, an empty candidate
/// list yields an empty result, and ties keep their original input order
/// (stable sort). Ranks are 1-based positions after sorting by score
/// descending.
pub fn recommend_programs_for_user(
    ctx: &RecommendationContext,
    programs: &[ProgramCandidate],
    workouts: &[WorkoutHistorySample],
) -> Vec<ProgramRecommendation> {
    let profile = WorkoutProfile::from_preferences(ctx.workout_preferences.as_ref());
    recommend_with_profile(ctx, profile, programs, workouts)
}

/// Same scorer, with the configured default equipment standing in for
/// users whose profile declares none
pub fn recommend_programs_for_user_with_config(
    ctx: &RecommendationContext,
    programs: &[ProgramCandidate],
    workouts: &[WorkoutHistorySample],
    config: &Config,
) -> Vec<ProgramRecommendation> {
    let mut profile = WorkoutProfile::from_preferences(ctx.workout_preferences.as_ref());
    if profile.available_equipment.is_empty() {
        profile.available_equipment = config.equipment.available.clone();
    }
    recommend_with_profile(ctx, profile, programs, workouts)
}

fn recommend_with_profile(
    ctx: &RecommendationContext,
    profile: WorkoutProfile,
    programs: &[ProgramCandidate],
    workouts: &[WorkoutHistorySample],
) -> Vec<ProgramRecommendation> {
    let stats = HistoryStats::compute(workouts, ctx.now);

    let level = infer_fitness_level(&profile, &stats, ctx.activity_level);
    let desired_days = desired_days_per_week(&profile, ctx.activity_level);
    let targets = target_categories(&profile, ctx.goal);
    let confidence = confidence_tier(&stats);

    tracing::info!(
        "Scoring {} programs: level {:?}, {} days/week desired, {} recent workouts",
        programs.len(),
        level,
        desired_days,
        stats.recent_count
    );

    let mut recommendations: Vec<ProgramRecommendation> = programs
        .iter()
        .map(|program| {
            score_candidate(
                program,
                level,
                desired_days,
                &targets,
                ctx.goal,
                &profile,
                &stats,
                confidence,
            )
        })
        .collect();

    // Stable sort keeps input order on equal scores.
    recommendations.sort_by(|a, b| b.score.cmp(&a.score));
    for (i, rec) in recommendations.iter_mut().enumerate() {
        rec.rank = i + 1;
    }

    recommendations
}

/// Explicit profile level wins; otherwise recent training volume, then
/// activity level, decide
fn infer_fitness_level(
    profile: &WorkoutProfile,
    stats: &HistoryStats,
    activity: ActivityLevel,
) -> ExperienceLevel {
    if let Some(level) = profile.fitness_level {
        return level;
    }
    if stats.per_week >= ADVANCED_PER_WEEK {
        return ExperienceLevel::Advanced;
    }
    if stats.per_week >= INTERMEDIATE_PER_WEEK {
        return ExperienceLevel::Intermediate;
    }
    if matches!(activity, ActivityLevel::Athlete | ActivityLevel::VeryActive) {
        return ExperienceLevel::Intermediate;
    }
    ExperienceLevel::Beginner
}

/// Explicit profile value in [2,7] wins; otherwise an activity-level lookup
fn desired_days_per_week(profile: &WorkoutProfile, activity: ActivityLevel) -> u32 {
    match profile.days_per_week {
        Some(days) if (2..=7).contains(&days) => days,
        _ => activity.default_days_per_week(),
    }
}

/// Program categories worth recommending toward
///
/// Declared profile goals map to categories; when none map (absent goals or
/// all unknown tags) the context goal decides instead.
fn target_categories(profile: &WorkoutProfile, goal: Goal) -> HashSet<ProgramCategory> {
    let mut targets = HashSet::new();

    for tag in &profile.goals {
        match tag.trim().to_lowercase().as_str() {
            "muscle_gain" | "strength" => {
                targets.insert(ProgramCategory::Strength);
                targets.insert(ProgramCategory::Hypertrophy);
            }
            "weight_loss" | "endurance" => {
                targets.insert(ProgramCategory::FatLoss);
                targets.insert(ProgramCategory::Endurance);
            }
            "general_fitness" => {
                targets.insert(ProgramCategory::Intro);
                targets.insert(ProgramCategory::Strength);
                targets.insert(ProgramCategory::Endurance);
            }
            _ => {}
        }
    }

    if !targets.is_empty() {
        return targets;
    }

    match goal {
        Goal::Lose => [
            ProgramCategory::FatLoss,
            ProgramCategory::Endurance,
            ProgramCategory::Intro,
        ]
        .into(),
        Goal::Maintain => [
            ProgramCategory::Strength,
            ProgramCategory::Endurance,
            ProgramCategory::Mobility,
            ProgramCategory::Intro,
        ]
        .into(),
        Goal::Gain => [ProgramCategory::Strength, ProgramCategory::Hypertrophy].into(),
    }
}

fn confidence_tier(stats: &HistoryStats) -> Confidence {
    if stats.recent_count >= 12 {
        Confidence::High
    } else if stats.recent_count >= 4 {
        Confidence::Medium
    } else {
        Confidence::Low
    }
}

#[allow(clippy::too_many_arguments)]
fn score_candidate(
    program: &ProgramCandidate,
    level: ExperienceLevel,
    desired_days: u32,
    targets: &HashSet<ProgramCategory>,
    goal: Goal,
    profile: &WorkoutProfile,
    stats: &HistoryStats,
    confidence: Confidence,
) -> ProgramRecommendation {
    let mut reasons: Vec<(String, i32)> = Vec::new();
    let mut total: i32 = 0;

    // Level fit: 22 / 14 / 6 by ordinal distance, always reasoned.
    let distance = (program.level.rank() - level.rank()).abs();
    let (level_points, level_reason) = match distance {
        0 => (22, "Matches your experience level"),
        1 => (14, "Close to your experience level"),
        _ => (6, "A stretch from your experience level"),
    };
    total += level_points;
    reasons.push((level_reason.to_string(), level_points));

    // Category fit: 24 in-target, 14 for strength under a maintenance goal,
    // 8 otherwise (including candidates with no category).
    let category_points = match program.category {
        Some(cat) if targets.contains(&cat) => {
            reasons.push(("Aligned with your goal focus".to_string(), 24));
            24
        }
        Some(ProgramCategory::Strength) if goal == Goal::Maintain => {
            reasons.push(("Strength work suits a maintenance goal".to_string(), 14));
            14
        }
        _ => 8,
    };
    total += category_points;

    // Frequency fit: near matches score, larger mismatches are penalized.
    // Any distance past 7 scores identically to 7 (base 0, full penalty).
    let d = program.days_per_week.abs_diff(desired_days).min(7) as i32;
    let base = (22 - 6 * d).clamp(0, 22);
    if d <= 1 {
        total += base;
        reasons.push(("Training frequency fits your schedule".to_string(), base));
    } else {
        let penalty = -(4.max(14 - base));
        total += penalty;
        reasons.push((
            "Asks for a different weekly frequency than you want".to_string(),
            penalty,
        ));
    }

    // Equipment fit against the profile's equipment plus implicit bodyweight.
    let (equipment_points, equipment_reason) =
        equipment_fit(&program.required_equipment, &profile.available_equipment);
    total += equipment_points;
    if let Some(reason) = equipment_reason {
        reasons.push((reason, equipment_points));
    }

    // Adherence, only when there is recent history to judge by.
    if stats.recent_count > 0 {
        let mut points = 6;
        let ratio = stats.recent_count as f64 / 4.0_f64.max((desired_days * 4) as f64);
        if ratio >= 0.9 {
            points = 10;
            reasons.push(("You've been training consistently".to_string(), 10));
        } else if ratio < 0.6 && program.days_per_week > desired_days + 1 {
            points = -8;
            reasons.push((
                "A big jump from your recent training volume".to_string(),
                -8,
            ));
        }
        if stats.avg_duration_minutes > 0.0
            && stats.avg_duration_minutes < 30.0
            && program.days_per_week >= 5
        {
            points -= 4;
            reasons.push((
                "Dense schedule next to your short recent sessions".to_string(),
                -4,
            ));
        }
        total += points;
    }

    let score = total.clamp(0, 100) as u8;

    // Strongest factors first; stable sort preserves emission order on ties.
    reasons.sort_by(|a, b| b.1.abs().cmp(&a.1.abs()));
    let mut reasons: Vec<String> = reasons.into_iter().take(3).map(|(text, _)| text).collect();
    if reasons.is_empty() {
        reasons.push(DEFAULT_REASON.to_string());
    }

    let weekly_minutes = program
        .avg_session_minutes
        .unwrap_or(45)
        .max(25)
        .saturating_mul(program.days_per_week.max(1));

    ProgramRecommendation {
        program_id: program.id.clone(),
        score,
        confidence,
        reasons,
        weekly_minutes,
        rank: 0, // assigned after the final sort
    }
}

/// Equipment sub-score: round(18 × matched/required), a penalty when
/// anything required is missing. An empty requirement list counts as fully
/// matched; `bodyweight` is always available.
fn equipment_fit(required: &[String], available: &[String]) -> (i32, Option<String>) {
    let mut required_tags: Vec<String> = Vec::new();
    for tag in required {
        let tag = tag.trim().to_lowercase();
        if !tag.is_empty() && !required_tags.contains(&tag) {
            required_tags.push(tag);
        }
    }

    if required_tags.is_empty() {
        return (18, None);
    }

    let mut available_tags: HashSet<String> = available
        .iter()
        .map(|tag| tag.trim().to_lowercase())
        .collect();
    available_tags.insert(BODYWEIGHT.to_string());

    let matched = required_tags
        .iter()
        .filter(|tag| available_tags.contains(*tag))
        .count();
    let ratio = matched as f64 / required_tags.len() as f64;
    let score = (18.0 * ratio).round() as i32;

    if ratio >= 1.0 {
        (
            score,
            Some("You have all the required equipment".to_string()),
        )
    } else {
        (
            -(3.max(14 - score)),
            Some("Missing some of the required equipment".to_string()),
        )
    }
}
