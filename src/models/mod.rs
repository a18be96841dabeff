//! Core data model shared across the planning pipeline

pub mod plan;
pub mod profile;
pub mod route;

pub use plan::{DaySchedule, ExerciseDetail, Phase, PhaseType, PlanPhase, TrainingPlan, Weekday};
pub use profile::{ClimberProfile, ExperienceLevel};
pub use route::{RouteDescriptor, RouteFeatures};

/// Delimiter joining combined exercise names in a day's focus field.
pub const FOCUS_COMBINATOR: &str = " + ";
