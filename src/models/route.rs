//! Route description and derived route features

use serde::{Deserialize, Serialize};

/// ---------------------------------------------------------------------------
/// Route Descriptor (request input)
/// ---------------------------------------------------------------------------

/// A target route as described by the climber. All fields are free text;
/// nothing here is validated beyond being present or absent.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct RouteDescriptor {
  /// Grade string, e.g. "5.12a", "7b+", "V6"
  pub grade: String,

  /// Crag or area name (informational only)
  #[serde(default)]
  pub crag: String,

  /// Angle descriptors, e.g. "steep overhang", "slab"
  #[serde(default)]
  pub angle: String,

  /// Length descriptors, e.g. "long, 30m", "short and bouldery"
  #[serde(default)]
  pub length: String,

  /// Hold-type descriptors, e.g. "crimps and pockets"
  #[serde(default)]
  pub hold_types: String,

  /// Free-text route description
  #[serde(default)]
  pub description: String,

  /// Optional single style selector chosen by the user, e.g. "pumpy"
  #[serde(default)]
  pub style: Option<String>,
}

/// ---------------------------------------------------------------------------
/// Route Features (derived)
/// ---------------------------------------------------------------------------

/// Boolean route characteristics derived from a `RouteDescriptor`.
///
/// Recomputed per request and never mutated afterwards. `challenges`
/// preserves first-detected order with duplicates removed.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct RouteFeatures {
  pub is_steep: bool,
  pub is_technical: bool,
  pub is_endurance: bool,
  pub is_power: bool,
  pub is_crimpy: bool,
  pub is_slopey: bool,
  pub is_pockety: bool,
  pub is_pumpy: bool,
  pub is_sustained: bool,
  pub is_bouldery: bool,
  pub is_dynamic: bool,

  /// Grade string carried over from the descriptor, used by the
  /// campus-board safety gate and the compositor context
  pub grade: String,

  /// Dominant style label, "mixed" when nothing stands out
  pub primary_style: String,

  /// Ordered, de-duplicated challenge tags
  pub challenges: Vec<String>,
}

impl RouteFeatures {
  /// Append a challenge tag unless it is already present.
  pub fn add_challenge(&mut self, challenge: &str) {
    if !self.challenges.iter().any(|c| c == challenge) {
      self.challenges.push(challenge.to_string());
    }
  }

  /// True when the route rewards endurance-side capacity.
  pub fn endurance_leaning(&self) -> bool {
    self.is_endurance || self.is_pumpy || self.is_sustained
  }

  /// True when the route rewards power-side capacity.
  pub fn power_leaning(&self) -> bool {
    self.is_power || self.is_bouldery || self.is_dynamic
  }
}
