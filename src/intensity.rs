//! Canonical intensity ordering
//!
//! Within one training day, higher-neuromuscular-demand exercises come
//! first. The ranking lives in data, not code, so catalog changes do not
//! require recompiling: the built-in table ships as JSON and deployments
//! can inject their own.

use std::collections::HashMap;

use serde::Deserialize;

/// Rank assigned to exercise names missing from the table; sorts last.
const UNRANKED: u32 = 99;

#[derive(Debug, Clone, Deserialize)]
pub struct IntensityTable {
  ranks: HashMap<String, u32>,
}

impl IntensityTable {
  pub fn new(ranks: HashMap<String, u32>) -> Self {
    Self { ranks }
  }

  /// The embedded default table matching the built-in catalog.
  pub fn from_builtin() -> Self {
    Self {
      ranks: serde_json::from_str(include_str!("data/intensity.json"))
        .expect("embedded intensity table is valid JSON"),
    }
  }

  /// Rank for an exercise name; lower = more intense = performed first.
  /// Unknown names get a low-priority rank instead of an error.
  pub fn rank(&self, exercise_name: &str) -> u32 {
    self.ranks.get(exercise_name).copied().unwrap_or(UNRANKED)
  }

  /// Sort combined exercise names into canonical intensity order.
  /// Stable, so equally-ranked (including unknown) names keep their
  /// relative order.
  pub fn order(&self, names: &mut [String]) {
    names.sort_by_key(|name| self.rank(name));
  }
}

impl Default for IntensityTable {
  fn default() -> Self {
    Self::from_builtin()
  }
}
