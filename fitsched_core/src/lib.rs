#![forbid(unsafe_code)]

//! Core domain model and business logic for the fitsched system.
//!
//! This crate provides:
//! - Domain types (programs, history samples, weekdays, preferences)
//! - Program catalog
//! - Recommendation scorer
//! - Template-to-weekday schedule mapper
//! - Schedule persistence (journal, JSON state store)

pub mod types;
pub mod error;
pub mod catalog;
pub mod config;
pub mod logging;
pub mod profile;
pub mod journal;
pub mod history;
pub mod recommend;
pub mod schedule;
pub mod store;

// Re-export commonly used types
pub use error::{Error, Result};
pub use types::*;
pub use catalog::{build_default_catalog, get_default_catalog};
pub use config::Config;
pub use journal::{JsonlSink, SampleSink};
pub use history::{load_recent_samples, HistoryStats};
pub use profile::WorkoutProfile;
pub use recommend::{recommend_programs_for_user, recommend_programs_for_user_with_config};
pub use schedule::{
    apply_template_schedule_for_user, map_templates_to_schedule, sanitize_schedule_preferences,
};
pub use store::{JsonStateStore, MemoryStore, ScheduleStore};
