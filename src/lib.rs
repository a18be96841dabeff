//! Route-specific training plan generation for climbers
//!
//! Turns a route description and a climber profile into a multi-week,
//! periodized training plan. The deterministic pipeline (route features,
//! exercise ranking, phase structure) runs locally; the weekly schedules
//! are written by an external text compositor whose output is validated,
//! repaired, and ordered here.
//!
//! ```no_run
//! use crux_coach::{PlanAssembler, PlanRequest};
//!
//! # async fn generate(request: PlanRequest) -> Result<(), Box<dyn std::error::Error>> {
//! let assembler = PlanAssembler::from_env()?;
//! let plan = assembler.assemble(&request).await?;
//! println!("{}", serde_json::to_string_pretty(&plan)?);
//! # Ok(())
//! # }
//! ```

pub mod assembler;
pub mod catalog;
pub mod compositor;
pub mod features;
pub mod filter;
pub mod intensity;
pub mod models;
pub mod phases;

#[cfg(test)]
pub mod test_utils;

pub use assembler::{PlanAssembler, PlanError, PlanRequest, ProgressSink};
pub use catalog::{builtin_catalog, ExerciseCategory, ExerciseDef, ExercisePriority};
pub use compositor::{ClaudeCompositor, Compositor, CompositorError};
pub use filter::{CatalogFilter, PhaseBias, RankedExercise};
pub use intensity::IntensityTable;
pub use models::{
  ClimberProfile, DaySchedule, ExperienceLevel, Phase, PhaseType, RouteDescriptor, RouteFeatures,
  TrainingPlan, Weekday,
};
