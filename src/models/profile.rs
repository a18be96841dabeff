//! Climber profile and the free-text parsing that normalizes it
//!
//! The profile arrives as loosely structured user input. Everything here
//! parses that input into canonical values with documented defaults, so the
//! rest of the pipeline never probes for missing fields.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

/// Default session budget when the profile gives no usable time descriptor.
pub const DEFAULT_SESSION_MINUTES: u32 = 120;

/// Facilities assumed when the profile names none ("typical climbing gym").
pub const DEFAULT_FACILITIES: &[&str] = &["climbing_wall", "hangboard", "pullup_bar", "weights"];

/// ---------------------------------------------------------------------------
/// Climber Profile (request input)
/// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ClimberProfile {
  /// Free-text weaknesses, e.g. "finger strength and pump endurance"
  #[serde(default)]
  pub weaknesses: String,

  /// Free-text strengths
  #[serde(default)]
  pub strengths: String,

  /// Raw attribute self-ratings: either a JSON object or labeled pairs
  /// like "finger strength: 2, endurance: 4"
  #[serde(default)]
  pub attribute_ratings: String,

  /// Canonical facility tokens, e.g. ["hangboard", "campus_board"].
  /// Empty means a typical gym is assumed.
  #[serde(default)]
  pub available_facilities: Vec<String>,

  /// Free-text session time, e.g. "90 minutes", "2 hours", "1.5"
  #[serde(default)]
  pub available_time: Option<String>,

  /// Free-text experience, e.g. "3 years", "beginner"
  #[serde(default)]
  pub experience: Option<String>,

  /// Injury notes, advisory only (passed through to the compositor)
  #[serde(default)]
  pub injuries: Option<String>,
}

impl ClimberProfile {
  /// Facilities to filter against, substituting the default gym set
  /// when the profile supplies none.
  pub fn facility_set(&self) -> Vec<String> {
    if self.available_facilities.is_empty() {
      DEFAULT_FACILITIES.iter().map(|f| f.to_string()).collect()
    } else {
      self.available_facilities.clone()
    }
  }

  /// Session time budget in minutes, parsed from the free-text descriptor.
  pub fn session_budget_minutes(&self) -> u32 {
    match &self.available_time {
      Some(text) => parse_session_minutes(text),
      None => DEFAULT_SESSION_MINUTES,
    }
  }

  /// Experience bucket, defaulting to intermediate.
  pub fn experience_level(&self) -> ExperienceLevel {
    match &self.experience {
      Some(text) => ExperienceLevel::parse(text),
      None => ExperienceLevel::Intermediate,
    }
  }

  /// Canonical 1-5 attribute ratings parsed from the raw text.
  pub fn ratings(&self) -> BTreeMap<String, u8> {
    parse_attribute_ratings(&self.attribute_ratings)
  }
}

/// ---------------------------------------------------------------------------
/// Experience Level
/// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum ExperienceLevel {
  Beginner,
  #[default]
  Intermediate,
  Advanced,
}

impl std::fmt::Display for ExperienceLevel {
  fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
    match self {
      Self::Beginner => write!(f, "beginner"),
      Self::Intermediate => write!(f, "intermediate"),
      Self::Advanced => write!(f, "advanced"),
    }
  }
}

impl ExperienceLevel {
  /// Parse free-text experience. "N years" buckets at <1 beginner and
  /// >=5 advanced; explicit level keywords win over year counts.
  pub fn parse(text: &str) -> Self {
    let lower = text.to_lowercase();

    if lower.contains("beginner") || lower.contains("novice") || lower.contains("new to") {
      return Self::Beginner;
    }
    if lower.contains("advanced") || lower.contains("expert") {
      return Self::Advanced;
    }

    if let Some(value) = leading_number(&lower) {
      let years = if lower.contains("month") { value / 12.0 } else { value };
      if years < 1.0 {
        return Self::Beginner;
      }
      if years >= 5.0 {
        return Self::Advanced;
      }
      return Self::Intermediate;
    }

    Self::Intermediate
  }
}

/// ---------------------------------------------------------------------------
/// Free-text parsing helpers
/// ---------------------------------------------------------------------------

/// Parse a session-time descriptor into minutes.
///
/// Extracts the leading numeric value; "hour" multiplies by 60, "minute"
/// is taken as-is, anything else is interpreted as hours. No numeric value
/// yields the default budget.
pub fn parse_session_minutes(text: &str) -> u32 {
  let lower = text.to_lowercase();
  let Some(value) = leading_number(&lower) else {
    return DEFAULT_SESSION_MINUTES;
  };

  let minutes = if lower.contains("hour") || lower.contains("hr") {
    value * 60.0
  } else if lower.contains("min") {
    value
  } else {
    // Bare numbers read as hours: "1.5" means an hour and a half
    value * 60.0
  };

  minutes.round().max(0.0) as u32
}

/// Find the first number in a string, accepting decimals.
fn leading_number(text: &str) -> Option<f64> {
  let start = text.find(|c: char| c.is_ascii_digit())?;
  let rest = &text[start..];
  let end = rest
    .char_indices()
    .find(|(_, c)| !c.is_ascii_digit() && *c != '.')
    .map(|(i, _)| i)
    .unwrap_or(rest.len());
  rest[..end].parse().ok()
}

/// Canonical attribute keys the pipeline understands.
const CANONICAL_ATTRIBUTES: &[(&str, &[&str])] = &[
  ("finger_strength", &["finger strength", "finger_strength", "fingers", "grip"]),
  ("strength", &["strength", "pulling", "lockoff", "lock-off"]),
  ("power", &["power", "explosiveness"]),
  ("power_endurance", &["power endurance", "power_endurance", "anaerobic"]),
  ("endurance", &["endurance", "stamina", "aerobic"]),
  ("technique", &["technique", "footwork", "movement"]),
  ("core", &["core", "core strength", "core_strength", "tension"]),
  ("flexibility", &["flexibility", "mobility"]),
];

/// Parse attribute self-ratings into a canonical key -> 1-5 map.
///
/// Tries a structured JSON object first, then falls back to scanning for
/// labeled pairs ("finger strength: 3"). Unparseable input yields an empty
/// map, never an error. Ratings are clamped to 1..=5.
pub fn parse_attribute_ratings(text: &str) -> BTreeMap<String, u8> {
  let mut ratings = BTreeMap::new();
  let trimmed = text.trim();
  if trimmed.is_empty() {
    return ratings;
  }

  // Structured parse first
  if let Ok(serde_json::Value::Object(map)) = serde_json::from_str::<serde_json::Value>(trimmed) {
    for (key, value) in map {
      let Some(rating) = value.as_f64().or_else(|| value.as_str().and_then(|s| s.parse().ok()))
      else {
        continue;
      };
      if let Some(canonical) = canonical_attribute(&key) {
        ratings.insert(canonical.to_string(), clamp_rating(rating));
      }
    }
    if !ratings.is_empty() {
      return ratings;
    }
  }

  // Labeled-pair fallback: split on separators, look for "label: N"
  let lower = trimmed.to_lowercase();
  for fragment in lower.split(|c| c == ',' || c == '\n' || c == ';') {
    let Some((label, value)) = fragment.split_once(|c| c == ':' || c == '-' || c == '=') else {
      continue;
    };
    let Ok(rating) = value.trim().parse::<f64>() else {
      continue;
    };
    if let Some(canonical) = canonical_attribute(label.trim()) {
      ratings.entry(canonical.to_string()).or_insert(clamp_rating(rating));
    }
  }

  ratings
}

fn canonical_attribute(label: &str) -> Option<&'static str> {
  let cleaned = label.trim().to_lowercase();
  for (canonical, aliases) in CANONICAL_ATTRIBUTES {
    if cleaned == *canonical || aliases.iter().any(|a| cleaned == *a) {
      return Some(canonical);
    }
  }
  // Loose match: an alias appearing inside a longer label, e.g.
  // "my finger strength"
  for (canonical, aliases) in CANONICAL_ATTRIBUTES {
    if aliases.iter().any(|a| cleaned.contains(a)) {
      return Some(canonical);
    }
  }
  None
}

fn clamp_rating(value: f64) -> u8 {
  (value.round() as i64).clamp(1, 5) as u8
}

/// ---------------------------------------------------------------------------
/// Tests
/// ---------------------------------------------------------------------------
