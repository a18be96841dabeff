//! Exercise catalog filtering and ranking
//!
//! Applies hard constraints (facilities, session time, campus-board safety)
//! and then scores the survivors against the route's demands and the
//! climber's weaknesses. Scoring always operates on catalog copies; the
//! shared catalog is never mutated.

use tracing::debug;

use crate::catalog::{ExerciseCategory, ExerciseDef, ExercisePriority};
use crate::models::{ClimberProfile, ExperienceLevel, PhaseType, RouteFeatures};

/// Minimum number of positively-scored entries before backfill kicks in.
const BACKFILL_THRESHOLD: usize = 12;

/// Upper bound on the ranked list after backfill.
const LIST_CAP: usize = 15;

/// ---------------------------------------------------------------------------
/// Ranked Exercise
/// ---------------------------------------------------------------------------

/// A catalog entry plus its request-scoped relevance score. Lives only for
/// the duration of one phase's generation.
#[derive(Debug, Clone)]
pub struct RankedExercise {
  pub exercise: ExerciseDef,
  pub score: i32,

  /// Set when phase-aware scoring adjusted this entry
  pub phase_note: Option<String>,
}

/// ---------------------------------------------------------------------------
/// Phase bias configuration
/// ---------------------------------------------------------------------------

/// Tunable phase-aware scoring deltas. Base phases lean on strength and
/// power work, peak phases on power endurance and aerobic power; tapers
/// shrink the list instead of re-weighting it.
#[derive(Debug, Clone)]
pub struct PhaseBias {
  pub base_strength_bonus: i32,
  pub base_power_bonus: i32,
  pub peak_power_endurance_bonus: i32,
  pub peak_aerobic_power_bonus: i32,

  /// Maximum list length during a taper; backfill is disabled so no
  /// unfamiliar work appears in the final week(s)
  pub taper_max_exercises: usize,
}

impl Default for PhaseBias {
  fn default() -> Self {
    Self {
      base_strength_bonus: 3,
      base_power_bonus: 2,
      peak_power_endurance_bonus: 3,
      peak_aerobic_power_bonus: 3,
      taper_max_exercises: 8,
    }
  }
}

/// ---------------------------------------------------------------------------
/// Scoring tables
/// ---------------------------------------------------------------------------

/// Staple exercises that earn a fixed bonus regardless of route features.
const ESSENTIAL_EXERCISES: &[(&str, i32)] = &[
  ("Hangboard Max Hangs", 3),
  ("Limit Bouldering", 3),
  ("ARC Training", 2),
  ("4x4 Boulder Circuits", 2),
  ("Weighted Pull-Ups", 2),
  ("Silent Feet Drills", 2),
];

/// Weakness keywords -> categories the climber should prioritize.
/// Scanned in order with matched text consumed, so the longer keywords
/// listed first ("power endurance") are not also counted as their
/// substrings ("power", "endurance").
const WEAKNESS_KEYWORDS: &[(&str, &[ExerciseCategory])] = &[
  ("power endurance", &[ExerciseCategory::PowerEndurance]),
  ("finger", &[ExerciseCategory::FingerStrength]),
  ("endurance", &[ExerciseCategory::AerobicCapacity, ExerciseCategory::AerobicPower]),
  ("stamina", &[ExerciseCategory::AerobicCapacity]),
  ("pump", &[ExerciseCategory::AerobicCapacity, ExerciseCategory::PowerEndurance]),
  ("power", &[ExerciseCategory::Power]),
  ("strength", &[ExerciseCategory::Strength]),
  ("technique", &[ExerciseCategory::Technique]),
  ("footwork", &[ExerciseCategory::Technique]),
  ("core", &[ExerciseCategory::Core]),
  ("flexib", &[ExerciseCategory::Mobility]),
  ("mobility", &[ExerciseCategory::Mobility]),
];

/// ---------------------------------------------------------------------------
/// Catalog Filter
/// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Default)]
pub struct CatalogFilter {
  bias: PhaseBias,
}

impl CatalogFilter {
  pub fn new() -> Self {
    Self::default()
  }

  pub fn with_bias(bias: PhaseBias) -> Self {
    Self { bias }
  }

  /// Filter the catalog against hard constraints and rank the survivors.
  ///
  /// Never fails: over-constrained inputs produce a short or empty list.
  /// When `phase_type` is given, scoring shifts toward that phase's
  /// training emphasis.
  pub fn filter_and_rank(
    &self,
    catalog: &[ExerciseDef],
    profile: &ClimberProfile,
    features: &RouteFeatures,
    phase_type: Option<PhaseType>,
    phase_weeks: Option<u32>,
  ) -> Vec<RankedExercise> {
    let facilities = profile.facility_set();
    let budget = profile.session_budget_minutes();
    let experience = profile.experience_level();
    let campus_allowed =
      experience != ExperienceLevel::Beginner && grade_indicates_advanced(&features.grade);
    let weakness_categories = weakness_categories(&profile.weaknesses);

    // Hard constraints first; survivors keep their catalog index so ties
    // and backfill stay in catalog order.
    let eligible: Vec<(usize, &ExerciseDef)> = catalog
      .iter()
      .enumerate()
      .filter(|(_, ex)| ex.facilities_satisfied(&facilities))
      .filter(|(_, ex)| ex.time_required <= budget)
      .filter(|(_, ex)| campus_allowed || !ex.is_campus_exercise())
      .collect();

    let mut ranked: Vec<(usize, RankedExercise)> = Vec::new();
    let mut zero_scored: Vec<(usize, &ExerciseDef)> = Vec::new();

    for (idx, exercise) in &eligible {
      let scored = self.score(exercise, features, &weakness_categories, experience, phase_type);
      if scored.relevance > 0 {
        ranked.push((
          *idx,
          RankedExercise {
            exercise: (*exercise).clone(),
            score: scored.total(),
            phase_note: scored.phase_note,
          },
        ));
      } else {
        zero_scored.push((*idx, exercise));
      }
    }

    // Descending by score, catalog order on ties
    ranked.sort_by(|(ia, a), (ib, b)| b.score.cmp(&a.score).then(ia.cmp(ib)));
    let mut result: Vec<RankedExercise> = ranked.into_iter().map(|(_, r)| r).collect();

    if phase_type == Some(PhaseType::Taper) {
      // Lower volume, nothing unfamiliar: cap the list and skip backfill
      result.truncate(self.bias.taper_max_exercises);
    } else if result.len() < BACKFILL_THRESHOLD {
      for (_, exercise) in zero_scored {
        if result.len() >= LIST_CAP {
          break;
        }
        result.push(RankedExercise {
          exercise: exercise.clone(),
          score: 0,
          phase_note: None,
        });
      }
    }

    debug!(
      phase = %phase_type.map(|p| p.to_string()).unwrap_or_else(|| "none".into()),
      phase_weeks,
      candidates = eligible.len(),
      selected = result.len(),
      "filtered exercise catalog"
    );

    result
  }

  /// Additive scoring. `relevance` comes from route demands, declared
  /// weaknesses, staples, experience fit, and phase emphasis; `static_bonus`
  /// from catalog priority and session efficiency. Exercises with zero
  /// relevance stay out of the primary list and only appear as backfill.
  fn score(
    &self,
    exercise: &ExerciseDef,
    features: &RouteFeatures,
    weakness_categories: &[ExerciseCategory],
    experience: ExperienceLevel,
    phase_type: Option<PhaseType>,
  ) -> ScoredExercise {
    let mut relevance = 0;
    let category = exercise.category;

    // Route demand matches
    if features.endurance_leaning() && category.is_endurance() {
      relevance += 5;
    }
    if features.power_leaning() && category == ExerciseCategory::Power {
      relevance += 5;
    }
    if features.is_technical && category == ExerciseCategory::Technique {
      relevance += 5;
    }
    if features.is_pockety && exercise.name.to_lowercase().contains("pocket") {
      relevance += 5;
    }

    // Declared weaknesses
    if weakness_categories.contains(&category) {
      relevance += 4;
    }

    // Staples
    if let Some((_, bonus)) = ESSENTIAL_EXERCISES.iter().find(|(name, _)| *name == exercise.name) {
      relevance += bonus;
    }

    // Experience appropriateness
    match experience {
      ExperienceLevel::Beginner => {
        if matches!(category, ExerciseCategory::Technique | ExerciseCategory::AerobicCapacity) {
          relevance += 2;
        }
      }
      ExperienceLevel::Advanced => {
        if category.is_power_side() {
          relevance += 2;
        }
      }
      ExperienceLevel::Intermediate => {}
    }

    // Phase emphasis
    let mut phase_note = None;
    match phase_type {
      Some(PhaseType::Base) => {
        let bonus = if matches!(category, ExerciseCategory::Strength | ExerciseCategory::FingerStrength) {
          self.bias.base_strength_bonus
        } else if category == ExerciseCategory::Power {
          self.bias.base_power_bonus
        } else {
          0
        };
        if bonus > 0 {
          relevance += bonus;
          phase_note = Some("base-phase emphasis".to_string());
        }
      }
      Some(PhaseType::Peak) => {
        let bonus = match category {
          ExerciseCategory::PowerEndurance => self.bias.peak_power_endurance_bonus,
          ExerciseCategory::AerobicPower => self.bias.peak_aerobic_power_bonus,
          _ => 0,
        };
        if bonus > 0 {
          relevance += bonus;
          phase_note = Some("peak-phase emphasis".to_string());
        }
      }
      Some(PhaseType::Taper) | None => {}
    }

    // Static catalog priority
    let mut static_bonus = match exercise.priority {
      ExercisePriority::High => 3,
      ExercisePriority::Medium => 2,
    };

    // Short sessions slot in anywhere
    if exercise.time_required < 30 {
      static_bonus += 1;
    }

    ScoredExercise {
      relevance,
      static_bonus,
      phase_note,
    }
  }
}

struct ScoredExercise {
  relevance: i32,
  static_bonus: i32,
  phase_note: Option<String>,
}

impl ScoredExercise {
  fn total(&self) -> i32 {
    self.relevance + self.static_bonus
  }
}

/// Convenience wrapper with default bias.
pub fn filter_and_rank(
  catalog: &[ExerciseDef],
  profile: &ClimberProfile,
  features: &RouteFeatures,
  phase_type: Option<PhaseType>,
  phase_weeks: Option<u32>,
) -> Vec<RankedExercise> {
  CatalogFilter::new().filter_and_rank(catalog, profile, features, phase_type, phase_weeks)
}

/// ---------------------------------------------------------------------------
/// Helpers
/// ---------------------------------------------------------------------------

fn weakness_categories(weaknesses: &str) -> Vec<ExerciseCategory> {
  let mut remaining = weaknesses.to_lowercase();
  let mut categories = Vec::new();
  for (keyword, mapped) in WEAKNESS_KEYWORDS {
    if !remaining.contains(keyword) {
      continue;
    }
    // Consume the match so shorter keywords cannot re-match inside it
    remaining = remaining.replace(keyword, " ");
    for category in *mapped {
      if !categories.contains(category) {
        categories.push(*category);
      }
    }
  }
  categories
}

/// Whether a grade string indicates at least solidly advanced climbing:
/// YDS 5.12, French 7a, or V6. Unparseable grades are conservative (false).
pub fn grade_indicates_advanced(grade: &str) -> bool {
  let trimmed = grade.trim().to_lowercase();
  if trimmed.is_empty() {
    return false;
  }

  // YDS: "5.12a" and up
  if let Some(rest) = trimmed.strip_prefix("5.") {
    let digits: String = rest.chars().take_while(|c| c.is_ascii_digit()).collect();
    return digits.parse::<u32>().map(|n| n >= 12).unwrap_or(false);
  }

  // V-scale: "v6" and up
  if let Some(rest) = trimmed.strip_prefix('v') {
    let digits: String = rest.chars().take_while(|c| c.is_ascii_digit()).collect();
    return digits.parse::<u32>().map(|n| n >= 6).unwrap_or(false);
  }

  // French: "7a" and up
  if let Some(first) = trimmed.chars().next() {
    if let Some(digit) = first.to_digit(10) {
      let has_letter = trimmed
        .chars()
        .nth(1)
        .map(|c| matches!(c, 'a'..='c'))
        .unwrap_or(false);
      return has_letter && digit >= 7;
    }
  }

  false
}

/// ---------------------------------------------------------------------------
/// Tests
/// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
  use super::*;
  use crate::catalog::builtin_catalog;

  fn endurance_route() -> RouteFeatures {
    RouteFeatures {
      is_endurance: true,
      is_pumpy: true,
      ..Default::default()
    }
  }

  fn profile_with(facilities: &[&str], time: &str) -> ClimberProfile {
    ClimberProfile {
      available_facilities: facilities.iter().map(|f| f.to_string()).collect(),
      available_time: Some(time.to_string()),
      ..Default::default()
    }
  }

  #[test]
  fn survivors_satisfy_facility_and_time_constraints() {
    let profile = profile_with(&["hangboard", "pullup_bar"], "30 minutes");
    let ranked = filter_and_rank(builtin_catalog(), &profile, &endurance_route(), None, None);

    assert!(!ranked.is_empty());
    for entry in &ranked {
      assert!(entry.exercise.time_required <= 30);
      assert!(entry.exercise.facilities_satisfied(&profile.facility_set()));
    }
  }

  #[test]
  fn default_facilities_used_when_profile_has_none() {
    let profile = ClimberProfile::default();
    let ranked = filter_and_rank(builtin_catalog(), &profile, &endurance_route(), None, None);

    // Wall-based endurance staples should survive under the default gym set
    assert!(ranked.iter().any(|r| r.exercise.name == "ARC Training"));
    // But nothing requiring a campus or system board
    assert!(ranked.iter().all(|r| !r.exercise.is_campus_exercise()));
  }

  #[test]
  fn campus_board_gated_by_experience_and_grade() {
    let mut profile = profile_with(&["campus_board", "climbing_wall", "pullup_bar"], "2 hours");

    // Beginner: excluded even with the facility available
    profile.experience = Some("6 months".to_string());
    let hard_route = RouteFeatures {
      grade: "5.13a".to_string(),
      is_power: true,
      ..Default::default()
    };
    let ranked = filter_and_rank(builtin_catalog(), &profile, &hard_route, None, None);
    assert!(ranked.iter().all(|r| !r.exercise.is_campus_exercise()));

    // Advanced climber on an advanced grade: allowed
    profile.experience = Some("8 years".to_string());
    let ranked = filter_and_rank(builtin_catalog(), &profile, &hard_route, None, None);
    assert!(ranked.iter().any(|r| r.exercise.is_campus_exercise()));

    // Advanced climber on a moderate route: still excluded
    let moderate_route = RouteFeatures {
      grade: "5.10b".to_string(),
      is_power: true,
      ..Default::default()
    };
    let ranked = filter_and_rank(builtin_catalog(), &profile, &moderate_route, None, None);
    assert!(ranked.iter().all(|r| !r.exercise.is_campus_exercise()));
  }

  #[test]
  fn ranked_descending_with_stable_ties() {
    let profile = ClimberProfile {
      weaknesses: "endurance and pump management".to_string(),
      ..Default::default()
    };
    let ranked = filter_and_rank(builtin_catalog(), &profile, &endurance_route(), None, None);

    for pair in ranked.windows(2) {
      assert!(pair[0].score >= pair[1].score);
    }
    // Endurance exercises should rise to the top: route match + weakness
    assert!(ranked[0].exercise.category.is_endurance());
  }

  #[test]
  fn backfill_extends_short_lists_with_zero_scorers() {
    // A featureless route and a blank profile leave only the staples
    // relevant, so backfill tops the list up to the cap
    let profile = ClimberProfile::default();
    let ranked = filter_and_rank(builtin_catalog(), &profile, &RouteFeatures::default(), None, None);

    assert_eq!(ranked.len(), LIST_CAP);

    let positives = ranked.iter().filter(|r| r.score > 0).count();
    assert!(positives < BACKFILL_THRESHOLD);
    // Backfill entries carry zero score and sit after the ranked ones
    assert!(ranked[positives..].iter().all(|r| r.score == 0));
  }

  #[test]
  fn base_phase_biases_strength_over_neutral() {
    let profile = ClimberProfile::default();
    let features = RouteFeatures::default();

    let neutral = filter_and_rank(builtin_catalog(), &profile, &features, None, None);
    let base = filter_and_rank(builtin_catalog(), &profile, &features, Some(PhaseType::Base), Some(4));

    let score_of = |list: &[RankedExercise], name: &str| {
      list.iter().find(|r| r.exercise.name == name).map(|r| r.score)
    };

    let neutral_hangs = score_of(&neutral, "Hangboard Max Hangs").unwrap();
    let base_hangs = score_of(&base, "Hangboard Max Hangs").unwrap();
    assert!(base_hangs > neutral_hangs);

    let biased = base
      .iter()
      .find(|r| r.exercise.name == "Hangboard Max Hangs")
      .unwrap();
    assert_eq!(biased.phase_note.as_deref(), Some("base-phase emphasis"));
  }

  #[test]
  fn peak_phase_biases_power_endurance() {
    let profile = ClimberProfile::default();
    let features = endurance_route();

    let peak = filter_and_rank(builtin_catalog(), &profile, &features, Some(PhaseType::Peak), Some(3));
    let top_categories: Vec<_> = peak.iter().take(4).map(|r| r.exercise.category).collect();

    assert!(top_categories
      .iter()
      .any(|c| matches!(c, ExerciseCategory::PowerEndurance | ExerciseCategory::AerobicPower)));
  }

  #[test]
  fn taper_phase_shrinks_the_list_without_backfill() {
    let profile = ClimberProfile::default();
    let features = endurance_route();

    let normal = filter_and_rank(builtin_catalog(), &profile, &features, None, None);
    let taper = filter_and_rank(builtin_catalog(), &profile, &features, Some(PhaseType::Taper), Some(1));

    assert!(taper.len() <= PhaseBias::default().taper_max_exercises);
    assert!(taper.len() <= normal.len());
    assert!(taper.iter().all(|r| r.score > 0), "taper must not introduce unfamiliar work");
  }

  #[test]
  fn over_constrained_input_soft_fails_to_empty() {
    let profile = profile_with(&["nothing_useful"], "5 minutes");
    let ranked = filter_and_rank(builtin_catalog(), &profile, &endurance_route(), None, None);
    assert!(ranked.is_empty());
  }

  #[test]
  fn grade_threshold_parsing() {
    assert!(grade_indicates_advanced("5.12a"));
    assert!(grade_indicates_advanced("5.13"));
    assert!(!grade_indicates_advanced("5.9"));
    assert!(!grade_indicates_advanced("5.11d"));
    assert!(grade_indicates_advanced("7a+"));
    assert!(grade_indicates_advanced("8b"));
    assert!(!grade_indicates_advanced("6c"));
    assert!(grade_indicates_advanced("V7"));
    assert!(!grade_indicates_advanced("V4"));
    assert!(!grade_indicates_advanced(""));
    assert!(!grade_indicates_advanced("hard"));
  }

  #[test]
  fn weakness_keywords_map_to_categories() {
    let categories = weakness_categories("weak fingers and power endurance");
    assert!(categories.contains(&ExerciseCategory::FingerStrength));
    assert!(categories.contains(&ExerciseCategory::PowerEndurance));

    assert!(weakness_categories("").is_empty());
  }

  #[test]
  fn compound_weakness_keywords_are_consumed_once() {
    // "power endurance" alone maps to exactly one category, not to its
    // "power" and "endurance" substrings as well
    assert_eq!(
      weakness_categories("power endurance"),
      vec![ExerciseCategory::PowerEndurance]
    );

    // A separate mention of power still registers
    let categories = weakness_categories("power endurance and raw power");
    assert!(categories.contains(&ExerciseCategory::PowerEndurance));
    assert!(categories.contains(&ExerciseCategory::Power));
    assert!(!categories.contains(&ExerciseCategory::AerobicCapacity));
  }
}
