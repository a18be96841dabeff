//! Phase structure determination
//!
//! Splits the available training weeks into periodized phases and picks the
//! weekdays to train on. Deterministic given its inputs and never fails:
//! the returned phase durations always sum exactly to the requested weeks,
//! and a taper (when present) is always the final phase.

use std::collections::BTreeMap;

use crate::models::{ClimberProfile, ExperienceLevel, Phase, PhaseType, RouteFeatures, Weekday};

/// ---------------------------------------------------------------------------
/// Training days
/// ---------------------------------------------------------------------------

/// Map sessions-per-week to explicit weekdays, spacing high-intensity days
/// for recovery wherever the count allows. Out-of-range values fall back
/// to the three-session default.
pub fn determine_training_days(sessions_per_week: u32) -> Vec<Weekday> {
  use Weekday::*;
  match sessions_per_week {
    2 => vec![Monday, Thursday],
    3 => vec![Monday, Wednesday, Friday],
    4 => vec![Monday, Wednesday, Friday, Sunday],
    5 => vec![Monday, Tuesday, Thursday, Friday, Sunday],
    6 => vec![Monday, Tuesday, Wednesday, Thursday, Friday, Saturday],
    _ => vec![Monday, Wednesday, Friday],
  }
}

/// ---------------------------------------------------------------------------
/// Needs analysis
/// ---------------------------------------------------------------------------

/// What the climber must develop, inferred from low attribute ratings
/// (<= 2 of 5) or weakness keywords.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct TrainingNeeds {
  pub strength: bool,
  pub endurance: bool,
  pub power_endurance: bool,
  pub technique: bool,
  pub experience: ExperienceLevel,
}

/// Attributes whose low rating implies each need.
const NEED_ATTRIBUTES: &[(&str, &[&str])] = &[
  ("strength", &["strength", "finger_strength", "power"]),
  ("endurance", &["endurance"]),
  ("power_endurance", &["power_endurance"]),
  ("technique", &["technique"]),
];

/// Weakness keywords implying each need.
const NEED_KEYWORDS: &[(&str, &[&str])] = &[
  ("strength", &["strength", "finger", "weak arms", "lockoff"]),
  ("endurance", &["endurance", "pump", "stamina"]),
  ("power_endurance", &["power endurance", "anaerobic"]),
  ("technique", &["technique", "footwork", "sloppy"]),
];

pub fn analyze_needs(profile: &ClimberProfile, ratings: &BTreeMap<String, u8>) -> TrainingNeeds {
  let weaknesses = profile.weaknesses.to_lowercase();

  let from_ratings = |need: &str| {
    NEED_ATTRIBUTES
      .iter()
      .find(|(n, _)| *n == need)
      .map(|(_, attrs)| attrs.iter().any(|a| ratings.get(*a).is_some_and(|r| *r <= 2)))
      .unwrap_or(false)
  };
  let from_keywords = |need: &str| {
    NEED_KEYWORDS
      .iter()
      .find(|(n, _)| *n == need)
      .map(|(_, words)| words.iter().any(|w| weaknesses.contains(w)))
      .unwrap_or(false)
  };

  TrainingNeeds {
    strength: from_ratings("strength") || from_keywords("strength"),
    endurance: from_ratings("endurance") || from_keywords("endurance"),
    power_endurance: from_ratings("power_endurance") || from_keywords("power_endurance"),
    technique: from_ratings("technique") || from_keywords("technique"),
    experience: profile.experience_level(),
  }
}

/// ---------------------------------------------------------------------------
/// Phase determination
/// ---------------------------------------------------------------------------

/// Build the periodized phase list for a plan.
///
/// `weeks` below 1 is clamped to 1 so the contract (non-empty list, exact
/// sum) always holds.
pub fn determine_phases(
  profile: &ClimberProfile,
  weeks: u32,
  sessions_per_week: u32,
  features: &RouteFeatures,
  ratings: &BTreeMap<String, u8>,
) -> (Vec<Phase>, Vec<Weekday>) {
  let weeks = weeks.max(1);
  let needs = analyze_needs(profile, ratings);
  let days = determine_training_days(sessions_per_week);

  let phases = match weeks {
    1..=4 => single_phase(weeks, features, &needs),
    5..=8 => two_phases(weeks, features, &needs),
    _ => long_progression(weeks, features, &needs),
  };

  debug_assert_eq!(phases.iter().map(|p| p.weeks).sum::<u32>(), weeks);
  (phases, days)
}

/// Endurance is the dominant demand when the route leans endurance
/// without also leaning power.
fn endurance_dominant(features: &RouteFeatures) -> bool {
  features.endurance_leaning() && !features.power_leaning()
}

/// Label like "Week 3" or "Weeks 1-4", 1-based and inclusive.
fn week_label(start: u32, weeks: u32) -> String {
  if weeks == 1 {
    format!("Week {}", start)
  } else {
    format!("Weeks {}-{}", start, start + weeks - 1)
  }
}

fn phase(
  title: &str,
  start: u32,
  weeks: u32,
  phase_type: PhaseType,
  description: String,
  emphasis: Option<&str>,
) -> Phase {
  Phase {
    name: format!("{} ({})", title, week_label(start, weeks)),
    phase_type,
    weeks,
    description,
    emphasis: emphasis.map(str::to_string),
  }
}

/// Up to 4 weeks: one phase carrying everything.
fn single_phase(weeks: u32, features: &RouteFeatures, needs: &TrainingNeeds) -> Vec<Phase> {
  if features.endurance_leaning() && !needs.strength {
    return vec![phase(
      "Route Preparation",
      1,
      weeks,
      PhaseType::Peak,
      format!(
        "Short runway: go straight to route-specific endurance work. \
         Power endurance circuits and route intervals over all {} week(s), \
         tuned to {} climbing.",
        weeks, features.primary_style
      ),
      Some("power_endurance"),
    )];
  }

  if features.power_leaning() || needs.strength {
    return vec![phase(
      "Strength Focus",
      1,
      weeks,
      PhaseType::Base,
      format!(
        "Concentrated strength block: maximum recruitment and hard bouldering \
         for {} week(s) to meet the route's {} demands.",
        weeks, features.primary_style
      ),
      Some("strength"),
    )];
  }

  vec![phase(
    "Balanced Preparation",
    1,
    weeks,
    PhaseType::Base,
    format!(
      "A single balanced block mixing strength, capacity, and technique work \
       across {} week(s), appropriate for an {} climber.",
      weeks, needs.experience
    ),
    None,
  )]
}

/// 5 to 8 weeks: a base block followed by a peak block.
fn two_phases(weeks: u32, features: &RouteFeatures, needs: &TrainingNeeds) -> Vec<Phase> {
  let route_endurance = features.endurance_leaning();

  let (base_weeks, base_title, base_desc, base_emphasis, peak_title, peak_desc, peak_emphasis) =
    if route_endurance && needs.endurance {
      // Endurance route, endurance-limited climber: front-load less, apply more
      let base = if weeks <= 6 { weeks / 2 } else { 3 };
      (
        base,
        "Aerobic Base",
        "Build aerobic capacity with high-volume, low-intensity climbing".to_string(),
        Some("endurance"),
        "Endurance Peak",
        "Convert the base into route endurance: intervals, linked circuits, and pump tolerance".to_string(),
        Some("power_endurance"),
      )
    } else if route_endurance {
      (
        weeks / 2,
        "Endurance Building",
        "Raise climbing volume and aerobic capacity toward the route's sustained demands".to_string(),
        Some("endurance"),
        "Endurance Application",
        "Route-specific endurance: long links and on-route pacing".to_string(),
        Some("endurance"),
      )
    } else if features.power_leaning() || needs.strength {
      (
        weeks / 2,
        "Strength Base",
        "Maximum strength and finger recruitment to raise the ceiling".to_string(),
        Some("strength"),
        "Power Application",
        "Transfer strength into explosive movement and hard sequences".to_string(),
        Some("power"),
      )
    } else {
      (
        weeks / 2,
        "Foundation",
        "General capacity: strength, technique, and aerobic groundwork".to_string(),
        None,
        "Route Preparation",
        "Sharpen route-specific fitness and rehearse the style of the objective".to_string(),
        None,
      )
    };

  let peak_weeks = weeks - base_weeks;
  vec![
    phase(
      base_title,
      1,
      base_weeks,
      PhaseType::Base,
      format!("{} for the {} objective.", base_desc, features.primary_style),
      base_emphasis,
    ),
    phase(
      peak_title,
      1 + base_weeks,
      peak_weeks,
      PhaseType::Peak,
      format!("{}.", peak_desc),
      peak_emphasis,
    ),
  ]
}

/// More than 8 weeks: a multi-block progression, with a one-week taper
/// reserved for plans of 10 weeks or longer.
fn long_progression(weeks: u32, features: &RouteFeatures, needs: &TrainingNeeds) -> Vec<Phase> {
  let taper_weeks = if weeks >= 10 { 1 } else { 0 };
  let remaining = weeks - taper_weeks;
  let mut phases = Vec::new();
  let mut start = 1;

  if remaining >= 12 && endurance_dominant(features) && !needs.strength {
    // Four-block endurance progression in rough quarters
    let quarter = remaining / 4;
    let blocks = [
      ("Aerobic Base", PhaseType::Base, quarter, "Large volumes of easy climbing to grow the aerobic engine", Some("endurance")),
      ("Volume Block", PhaseType::Base, quarter, "Peak climbing volume: long sessions, high mileage, controlled intensity", Some("endurance")),
      ("Power Endurance", PhaseType::Peak, quarter, "Intervals and circuits at route intensity to build pump tolerance", Some("power_endurance")),
      ("Route Simulation", PhaseType::Peak, remaining - 3 * quarter, "Rehearse the route's demands: linked cruxes, redpoint pacing, full-length efforts", Some("power_endurance")),
    ];
    for (title, phase_type, block_weeks, desc, emphasis) in blocks {
      phases.push(phase(title, start, block_weeks, phase_type, format!("{}.", desc), emphasis));
      start += block_weeks;
    }
  } else if (9..=11).contains(&remaining) && endurance_dominant(features) {
    // 40/30/30 base, build, peak
    let base = percent_weeks(remaining, 40);
    let build = percent_weeks(remaining, 30);
    let peak = remaining - base - build;
    let blocks = [
      ("Aerobic Base", PhaseType::Base, base, "Aerobic capacity and climbing volume", Some("endurance")),
      ("Build", PhaseType::Base, build, "Progressively harder endurance work: longer links, steeper terrain", Some("build")),
      ("Endurance Peak", PhaseType::Peak, peak, "Route-intensity intervals and full-length simulation", Some("power_endurance")),
    ];
    for (title, phase_type, block_weeks, desc, emphasis) in blocks {
      phases.push(phase(title, start, block_weeks, phase_type, format!("{}.", desc), emphasis));
      start += block_weeks;
    }
  } else {
    // 40/20/40 strength, transition, peak
    let strength = percent_weeks(remaining, 40);
    let transition = percent_weeks(remaining, 20);
    let peak = remaining - strength - transition;
    let blocks = [
      ("Max Strength", PhaseType::Base, strength, "Heavy fingerboarding, limit bouldering, and weighted pulling", Some("strength")),
      ("Transition", PhaseType::Base, transition, "Convert raw strength into climbing power and movement quality", Some("power")),
      ("Performance Peak", PhaseType::Peak, peak, "Route-specific intensity: power endurance and simulation of the objective", Some("power_endurance")),
    ];
    for (title, phase_type, block_weeks, desc, emphasis) in blocks {
      phases.push(phase(title, start, block_weeks, phase_type, format!("{}.", desc), emphasis));
      start += block_weeks;
    }
  }

  if taper_weeks > 0 {
    phases.push(phase(
      "Taper",
      start,
      taper_weeks,
      PhaseType::Taper,
      "Cut volume, keep a little intensity, and arrive fresh.".to_string(),
      None,
    ));
  }

  phases
}

/// Round a percentage split to whole weeks, at least 1.
fn percent_weeks(total: u32, percent: u32) -> u32 {
  ((total * percent + 50) / 100).max(1)
}

/// ---------------------------------------------------------------------------
/// Tests
/// ---------------------------------------------------------------------------
