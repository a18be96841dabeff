//! Plan artifacts: phases, day schedules, and the assembled training plan

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// ---------------------------------------------------------------------------
/// Weekday
/// ---------------------------------------------------------------------------

/// Canonical weekday names, ordered Monday through Sunday. Day schedules
/// are always sorted into this order regardless of generation order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum Weekday {
  Monday,
  Tuesday,
  Wednesday,
  Thursday,
  Friday,
  Saturday,
  Sunday,
}

impl Weekday {
  pub const ALL: [Weekday; 7] = [
    Weekday::Monday,
    Weekday::Tuesday,
    Weekday::Wednesday,
    Weekday::Thursday,
    Weekday::Friday,
    Weekday::Saturday,
    Weekday::Sunday,
  ];

  pub fn as_str(&self) -> &'static str {
    match self {
      Weekday::Monday => "Monday",
      Weekday::Tuesday => "Tuesday",
      Weekday::Wednesday => "Wednesday",
      Weekday::Thursday => "Thursday",
      Weekday::Friday => "Friday",
      Weekday::Saturday => "Saturday",
      Weekday::Sunday => "Sunday",
    }
  }

  /// Position in the canonical week, Monday = 0.
  pub fn ordinal(&self) -> usize {
    *self as usize
  }
}

impl std::fmt::Display for Weekday {
  fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
    write!(f, "{}", self.as_str())
  }
}

impl std::str::FromStr for Weekday {
  type Err = String;

  fn from_str(s: &str) -> Result<Self, Self::Err> {
    match s.trim().to_lowercase().as_str() {
      "monday" | "mon" => Ok(Weekday::Monday),
      "tuesday" | "tue" | "tues" => Ok(Weekday::Tuesday),
      "wednesday" | "wed" => Ok(Weekday::Wednesday),
      "thursday" | "thu" | "thurs" => Ok(Weekday::Thursday),
      "friday" | "fri" => Ok(Weekday::Friday),
      "saturday" | "sat" => Ok(Weekday::Saturday),
      "sunday" | "sun" => Ok(Weekday::Sunday),
      other => Err(format!("Unknown weekday: {}", other)),
    }
  }
}

/// ---------------------------------------------------------------------------
/// Phase
/// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PhaseType {
  /// Capacity building: strength, aerobic base, volume
  Base,
  /// Application: power endurance, route-specific intensity
  Peak,
  /// Volume reduction before the attempt; always the final phase
  Taper,
}

impl std::fmt::Display for PhaseType {
  fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
    match self {
      Self::Base => write!(f, "base"),
      Self::Peak => write!(f, "peak"),
      Self::Taper => write!(f, "taper"),
    }
  }
}

/// One periodization block within a plan. Durations across a plan's phase
/// list always sum to the requested training weeks.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Phase {
  /// Human-readable name embedding the week range, e.g.
  /// "Strength Base (Weeks 1-4)"
  pub name: String,

  pub phase_type: PhaseType,

  /// Duration in weeks, always >= 1
  pub weeks: u32,

  /// Training emphasis summary for the compositor and the final plan
  pub description: String,

  /// Optional emphasis tag, e.g. "power_endurance"
  #[serde(default, skip_serializing_if = "Option::is_none")]
  pub emphasis: Option<String>,
}

/// ---------------------------------------------------------------------------
/// Day Schedule
/// ---------------------------------------------------------------------------

/// Per-exercise detail fragment produced by decomposing a combined day.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ExerciseDetail {
  pub exercise: String,
  pub details: String,
}

/// A single training day within a phase's weekly template.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DaySchedule {
  pub day: Weekday,

  /// Exercise names joined by " + ", highest intensity first
  pub focus: String,

  /// Free-text session description from the compositor
  pub details: String,

  /// Decomposed per-exercise fragments when `focus` combined several
  /// exercises; None for single-exercise days
  #[serde(default, skip_serializing_if = "Option::is_none")]
  pub exercise_details: Option<Vec<ExerciseDetail>>,
}

impl DaySchedule {
  /// Exercise names in the focus field, in order.
  pub fn focus_exercises(&self) -> Vec<&str> {
    self
      .focus
      .split(crate::models::FOCUS_COMBINATOR)
      .map(str::trim)
      .filter(|s| !s.is_empty())
      .collect()
  }
}

/// ---------------------------------------------------------------------------
/// Training Plan (terminal artifact)
/// ---------------------------------------------------------------------------

/// A completed phase: the phase record plus its weekly schedule, sorted
/// into canonical weekday order.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PlanPhase {
  #[serde(rename = "phase_name")]
  pub name: String,

  pub phase_type: PhaseType,
  pub weeks: u32,
  pub description: String,
  pub weekly_schedule: Vec<DaySchedule>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TrainingPlan {
  pub phases: Vec<PlanPhase>,
  pub generated_at: DateTime<Utc>,
}

impl TrainingPlan {
  /// Total weeks across all phases.
  pub fn total_weeks(&self) -> u32 {
    self.phases.iter().map(|p| p.weeks).sum()
  }
}
