//! Route feature extraction
//!
//! Turns a free-text route description into boolean feature flags, an
//! ordered challenge list, and a primary style label. Pure and
//! deterministic; empty input yields all-false flags and "mixed".

use crate::models::{RouteDescriptor, RouteFeatures};

/// ---------------------------------------------------------------------------
/// Keyword tables
/// ---------------------------------------------------------------------------

/// Flags addressable by name from the keyword tables.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Flag {
  Steep,
  Technical,
  Endurance,
  Power,
  Crimpy,
  Slopey,
  Pockety,
  Pumpy,
  Sustained,
  Bouldery,
  Dynamic,
}

fn set_flag(features: &mut RouteFeatures, flag: Flag) {
  match flag {
    Flag::Steep => features.is_steep = true,
    Flag::Technical => features.is_technical = true,
    Flag::Endurance => features.is_endurance = true,
    Flag::Power => features.is_power = true,
    Flag::Crimpy => features.is_crimpy = true,
    Flag::Slopey => features.is_slopey = true,
    Flag::Pockety => features.is_pockety = true,
    Flag::Pumpy => features.is_pumpy = true,
    Flag::Sustained => features.is_sustained = true,
    Flag::Bouldery => features.is_bouldery = true,
    Flag::Dynamic => features.is_dynamic = true,
  }
}

/// Explicit user-selected style -> (flags, challenge tag).
const STYLE_TABLE: &[(&str, &[Flag], &str)] = &[
  ("bouldery", &[Flag::Bouldery, Flag::Power], "bouldery sequences"),
  ("pumpy", &[Flag::Pumpy, Flag::Endurance], "pump management"),
  ("technical", &[Flag::Technical], "precise footwork"),
  ("endurance", &[Flag::Endurance, Flag::Sustained], "sustained climbing"),
  ("powerful", &[Flag::Power], "powerful moves"),
  ("dynamic", &[Flag::Dynamic, Flag::Power], "dynamic movement"),
  ("crimpy", &[Flag::Crimpy], "small crimps"),
  ("slopey", &[Flag::Slopey], "sloper compression"),
  ("sustained", &[Flag::Sustained, Flag::Endurance], "sustained climbing"),
];

/// Free-text description keywords -> (flag, challenge tag).
/// Substring match, case-insensitive, first-detected order preserved.
const DESCRIPTION_TABLE: &[(&str, Flag, &str)] = &[
  ("pump", Flag::Pumpy, "pump management"),
  ("sustained", Flag::Sustained, "sustained difficulty"),
  ("relentless", Flag::Sustained, "sustained difficulty"),
  ("powerful", Flag::Power, "powerful moves"),
  ("power", Flag::Power, "powerful moves"),
  ("dyno", Flag::Dynamic, "dynamic movement"),
  ("dynamic", Flag::Dynamic, "dynamic movement"),
  ("deadpoint", Flag::Dynamic, "dynamic movement"),
  ("crimp", Flag::Crimpy, "small crimps"),
  ("sloper", Flag::Slopey, "sloper compression"),
  ("slopey", Flag::Slopey, "sloper compression"),
  ("pocket", Flag::Pockety, "pocket pulling"),
  ("mono", Flag::Pockety, "pocket pulling"),
  ("overhang", Flag::Steep, "steep terrain"),
  ("roof", Flag::Steep, "steep terrain"),
  ("steep", Flag::Steep, "steep terrain"),
  ("technical", Flag::Technical, "precise footwork"),
  ("balancy", Flag::Technical, "precise footwork"),
  ("footwork", Flag::Technical, "precise footwork"),
  ("slab", Flag::Technical, "precise footwork"),
  ("endurance", Flag::Endurance, "sustained climbing"),
  ("stamina", Flag::Endurance, "sustained climbing"),
  ("bouldery", Flag::Bouldery, "bouldery sequences"),
  ("boulder problem", Flag::Bouldery, "bouldery sequences"),
  ("crux", Flag::Bouldery, "hard cruxes"),
];

/// ---------------------------------------------------------------------------
/// Extraction
/// ---------------------------------------------------------------------------

/// Derive route features from a route descriptor.
///
/// Calling this twice with identical input yields identical output; the
/// descriptor is never mutated.
pub fn extract(route: &RouteDescriptor) -> RouteFeatures {
  let mut features = RouteFeatures {
    grade: route.grade.trim().to_string(),
    ..Default::default()
  };
  let mut explicit_style: Option<String> = None;

  // 1. Explicit style selector wins the primary_style slot outright
  if let Some(style) = &route.style {
    let style_lower = style.trim().to_lowercase();
    if !style_lower.is_empty() {
      for (token, flags, challenge) in STYLE_TABLE {
        if style_lower == *token {
          for flag in *flags {
            set_flag(&mut features, *flag);
          }
          features.add_challenge(challenge);
          break;
        }
      }
      explicit_style = Some(style_lower);
    }
  }

  // 2. Angle, length, and hold-type tokens
  let angle = route.angle.to_lowercase();
  if angle.contains("overhang") || angle.contains("roof") || angle.contains("steep") {
    features.is_steep = true;
  }
  if angle.contains("slab") {
    features.is_technical = true;
  }

  let length = route.length.to_lowercase();
  if length.contains("long") {
    features.is_endurance = true;
  }
  if length.contains("short") || length.contains("boulder") {
    features.is_power = true;
  }

  let holds = route.hold_types.to_lowercase();
  if holds.contains("crimp") {
    features.is_crimpy = true;
  }
  if holds.contains("sloper") || holds.contains("slopey") {
    features.is_slopey = true;
  }
  if holds.contains("pocket") || holds.contains("mono") {
    features.is_pockety = true;
  }
  if holds.contains("pinch") {
    // Pinches shape training but carry no dedicated flag
    features.add_challenge("pinches");
  }

  // 3. Free-text description scan
  let description = route.description.to_lowercase();
  if !description.is_empty() {
    for (keyword, flag, challenge) in DESCRIPTION_TABLE {
      if description.contains(keyword) {
        set_flag(&mut features, *flag);
        features.add_challenge(challenge);
      }
    }
  }

  // 4. Primary style resolution
  features.primary_style = match explicit_style {
    Some(style) => style,
    None => resolve_primary_style(&features),
  };

  features
}

/// Priority-ordered style resolution; the first matching rule wins.
fn resolve_primary_style(f: &RouteFeatures) -> String {
  let style = if f.is_steep && f.is_power {
    "powerful overhanging"
  } else if f.is_steep && f.is_endurance {
    "endurance overhanging"
  } else if f.is_technical && !f.is_steep {
    "technical face"
  } else if f.is_endurance && !f.is_steep {
    "sustained vertical"
  } else if f.is_crimpy && f.is_technical {
    "technical crimping"
  } else if f.is_pockety {
    "pocket-intensive"
  } else if f.is_pumpy {
    "pumpy"
  } else if f.is_bouldery {
    "bouldery"
  } else {
    "mixed"
  };
  style.to_string()
}

/// ---------------------------------------------------------------------------
/// Tests
/// ---------------------------------------------------------------------------
