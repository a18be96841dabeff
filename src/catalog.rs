//! Exercise catalog: static reference data shared across requests
//!
//! The built-in catalog ships as embedded JSON and is parsed once.
//! Deployments can supply their own catalog; everything downstream takes a
//! slice of `ExerciseDef` and never mutates it.

use std::sync::OnceLock;

use serde::{Deserialize, Serialize};

/// ---------------------------------------------------------------------------
/// Taxonomy
/// ---------------------------------------------------------------------------

/// Energy system or skill an exercise targets. This is the primary
/// scoring dimension for exercise selection.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ExerciseCategory {
  Strength,
  Power,
  PowerEndurance,
  AerobicPower,
  AerobicCapacity,
  FingerStrength,
  Technique,
  Core,
  Mobility,
}

impl ExerciseCategory {
  pub fn as_str(&self) -> &'static str {
    match self {
      Self::Strength => "strength",
      Self::Power => "power",
      Self::PowerEndurance => "power_endurance",
      Self::AerobicPower => "aerobic_power",
      Self::AerobicCapacity => "aerobic_capacity",
      Self::FingerStrength => "finger_strength",
      Self::Technique => "technique",
      Self::Core => "core",
      Self::Mobility => "mobility",
    }
  }

  /// Endurance-side categories (aerobic base and application).
  pub fn is_endurance(&self) -> bool {
    matches!(self, Self::AerobicCapacity | Self::AerobicPower)
  }

  /// Power-side categories (maximal and explosive work).
  pub fn is_power_side(&self) -> bool {
    matches!(self, Self::Power | Self::Strength | Self::FingerStrength)
  }
}

impl std::fmt::Display for ExerciseCategory {
  fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
    write!(f, "{}", self.as_str())
  }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ExercisePriority {
  High,
  Medium,
}

/// ---------------------------------------------------------------------------
/// Exercise Definition
/// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ExerciseDef {
  /// Unique name; the vocabulary the compositor must stay within
  pub name: String,

  pub category: ExerciseCategory,
  pub priority: ExercisePriority,

  /// Minutes a single session of this exercise takes
  pub time_required: u32,

  /// Facility tokens that must all be available
  #[serde(default)]
  pub required_facilities: Vec<String>,

  /// Exercises that pair well in the same session
  #[serde(default, skip_serializing_if = "Option::is_none")]
  pub compatible_with: Option<Vec<String>>,
}

impl ExerciseDef {
  /// All required facilities present in the given set.
  pub fn facilities_satisfied(&self, available: &[String]) -> bool {
    self
      .required_facilities
      .iter()
      .all(|req| available.iter().any(|a| a == req))
  }

  /// Campus boarding is the one safety-gated modality in the catalog.
  pub fn is_campus_exercise(&self) -> bool {
    self.required_facilities.iter().any(|f| f == "campus_board")
  }
}

/// ---------------------------------------------------------------------------
/// Built-in catalog
/// ---------------------------------------------------------------------------

static BUILTIN_CATALOG: OnceLock<Vec<ExerciseDef>> = OnceLock::new();

/// The embedded default catalog, parsed once and shared read-only across
/// all requests.
pub fn builtin_catalog() -> &'static [ExerciseDef] {
  BUILTIN_CATALOG.get_or_init(|| {
    serde_json::from_str(include_str!("data/catalog.json"))
      .expect("embedded exercise catalog is valid JSON")
  })
}
