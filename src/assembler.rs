//! Plan assembly orchestration
//!
//! Drives the whole pipeline for one request: route features, phase
//! structure, per-phase exercise ranking, compositor invocation with
//! bounded retries and escalating strictness, vocabulary repair, day
//! decomposition, intensity ordering, and weekday ordering.

use std::cmp::min;

use chrono::Utc;
use serde::Deserialize;
use thiserror::Error;
use tracing::{info, warn};

use crate::catalog::{builtin_catalog, ExerciseDef};
use crate::compositor::{extract_json, Compositor, CompositorError};
use crate::features;
use crate::filter::{CatalogFilter, RankedExercise};
use crate::intensity::IntensityTable;
use crate::models::{
  ClimberProfile, DaySchedule, ExerciseDetail, Phase, PlanPhase, RouteDescriptor, RouteFeatures,
  TrainingPlan, Weekday, FOCUS_COMBINATOR,
};
use crate::phases;

/// Retry budget per phase
const MAX_ATTEMPTS: u32 = 3;

/// Sampling temperature per attempt; later attempts get stricter
const TEMPERATURE_SCHEDULE: [f32; 3] = [0.7, 0.4, 0.2];

/// How many ranked exercises the compositor sees
const PROMPT_EXERCISE_LIMIT: usize = 15;

/// How many allowed names the retry addendum enumerates
const STRICT_NAME_LIMIT: usize = 20;

/// Minimum similarity for rewriting a hallucinated exercise name
const SIMILARITY_CUTOFF: f64 = 0.8;

const SYSTEM_PROMPT: &str = include_str!("prompts/schedule_system.txt");

/// ---------------------------------------------------------------------------
/// Request & Error Types
/// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Deserialize)]
pub struct PlanRequest {
  pub route: RouteDescriptor,
  pub profile: ClimberProfile,
  pub weeks_to_train: u32,
  pub sessions_per_week: u32,

  /// Optional prior coaching analysis to carry into the prompts
  #[serde(default)]
  pub previous_analysis: Option<String>,
}

#[derive(Error, Debug)]
pub enum PlanError {
  /// A phase exhausted its retry budget; the whole plan is abandoned
  /// rather than returned partially.
  #[error("Failed to generate phase {index} (\"{phase}\") after {attempts} attempts: {reason}")]
  PhaseGeneration {
    index: usize,
    phase: String,
    attempts: u32,
    reason: String,
  },

  /// Non-retryable compositor failure (missing credentials)
  #[error(transparent)]
  Compositor(#[from] CompositorError),
}

/// Callback invoked after each phase completes.
pub type ProgressSink = Box<dyn Fn(usize, usize) + Send + Sync>;

/// Compositor response shape before validation.
#[derive(Debug, Deserialize)]
struct RawWeeklySchedule {
  weekly_schedule: Vec<RawDay>,
}

#[derive(Debug, Deserialize)]
struct RawDay {
  day: String,
  focus: String,
  #[serde(default)]
  details: String,
}

/// ---------------------------------------------------------------------------
/// Plan Assembler
/// ---------------------------------------------------------------------------

pub struct PlanAssembler {
  compositor: Box<dyn Compositor>,
  filter: CatalogFilter,
  catalog: Vec<ExerciseDef>,
  intensity: IntensityTable,
  progress: Option<ProgressSink>,
  max_attempts: u32,
}

impl PlanAssembler {
  /// Assembler over the built-in catalog and intensity table.
  pub fn new(compositor: Box<dyn Compositor>) -> Self {
    Self {
      compositor,
      filter: CatalogFilter::new(),
      catalog: builtin_catalog().to_vec(),
      intensity: IntensityTable::from_builtin(),
      progress: None,
      max_attempts: MAX_ATTEMPTS,
    }
  }

  /// Production construction: Claude compositor configured from the
  /// environment. Missing credentials fail here, before any request.
  pub fn from_env() -> Result<Self, CompositorError> {
    let compositor = crate::compositor::ClaudeCompositor::from_env()?;
    Ok(Self::new(Box::new(compositor)))
  }

  pub fn with_catalog(mut self, catalog: Vec<ExerciseDef>) -> Self {
    self.catalog = catalog;
    self
  }

  pub fn with_filter(mut self, filter: CatalogFilter) -> Self {
    self.filter = filter;
    self
  }

  pub fn with_intensity_table(mut self, intensity: IntensityTable) -> Self {
    self.intensity = intensity;
    self
  }

  pub fn with_progress(mut self, sink: ProgressSink) -> Self {
    self.progress = Some(sink);
    self
  }

  /// Generate a complete training plan.
  ///
  /// Phases are generated strictly in order; a phase that exhausts its
  /// retry budget aborts the plan with `PlanError::PhaseGeneration`.
  pub async fn assemble(&self, request: &PlanRequest) -> Result<TrainingPlan, PlanError> {
    let features = features::extract(&request.route);
    let ratings = request.profile.ratings();
    let (phase_list, training_days) = phases::determine_phases(
      &request.profile,
      request.weeks_to_train,
      request.sessions_per_week,
      &features,
      &ratings,
    );

    let total = phase_list.len();
    let mut plan_phases = Vec::with_capacity(total);

    for (index, phase) in phase_list.iter().enumerate() {
      let ranked = self.filter.filter_and_rank(
        &self.catalog,
        &request.profile,
        &features,
        Some(phase.phase_type),
        Some(phase.weeks),
      );

      let weekly_schedule = self
        .generate_phase(index, phase, &ranked, &features, request, &training_days)
        .await?;

      plan_phases.push(PlanPhase {
        name: phase.name.clone(),
        phase_type: phase.phase_type,
        weeks: phase.weeks,
        description: phase.description.clone(),
        weekly_schedule,
      });

      info!(phase = %phase.name, completed = index + 1, total, "phase generated");
      if let Some(sink) = &self.progress {
        sink(index + 1, total);
      }
    }

    Ok(TrainingPlan {
      phases: plan_phases,
      generated_at: Utc::now(),
    })
  }

  /// Bounded-retry generation of one phase's weekly schedule. Attempts
  /// after the first lower the sampling temperature and enumerate the
  /// allowed exercise names explicitly.
  async fn generate_phase(
    &self,
    index: usize,
    phase: &Phase,
    ranked: &[RankedExercise],
    features: &RouteFeatures,
    request: &PlanRequest,
    training_days: &[Weekday],
  ) -> Result<Vec<DaySchedule>, PlanError> {
    let valid_names: Vec<String> = ranked.iter().map(|r| r.exercise.name.clone()).collect();
    let base_message = build_user_message(phase, ranked, features, request, training_days);
    let mut last_error = String::from("no attempts made");

    for attempt in 0..self.max_attempts {
      let temperature = TEMPERATURE_SCHEDULE[min(attempt as usize, TEMPERATURE_SCHEDULE.len() - 1)];
      let message = if attempt == 0 {
        base_message.clone()
      } else {
        format!("{}\n\n{}", base_message, strict_addendum(&valid_names))
      };

      match self.compositor.compose(SYSTEM_PROMPT, &message, temperature).await {
        Ok(text) => {
          match self.process_schedule(&text, training_days, &valid_names) {
            Ok(days) => return Ok(days),
            Err(reason) => {
              warn!(phase = %phase.name, attempt = attempt + 1, %reason, "schedule rejected, retrying");
              last_error = reason;
            }
          }
        }
        Err(e) if e.is_retryable() => {
          warn!(phase = %phase.name, attempt = attempt + 1, error = %e, "compositor call failed, retrying");
          last_error = e.to_string();
        }
        Err(e) => return Err(e.into()),
      }
    }

    Err(PlanError::PhaseGeneration {
      index,
      phase: phase.name.clone(),
      attempts: self.max_attempts,
      reason: last_error,
    })
  }

  /// Parse, validate, repair, decompose, and order one raw response.
  /// Any rejection reason feeds the retry loop rather than escalating.
  fn process_schedule(
    &self,
    text: &str,
    training_days: &[Weekday],
    valid_names: &[String],
  ) -> Result<Vec<DaySchedule>, String> {
    let json = extract_json(text).map_err(|e| e.to_string())?;
    let raw: RawWeeklySchedule =
      serde_json::from_str(&json).map_err(|e| format!("schedule JSON invalid: {}", e))?;

    // The resolved training-day list is the contract here, not the raw
    // request: out-of-range session counts already fell back to the
    // default days and the prompt asked for exactly this many.
    if raw.weekly_schedule.len() != training_days.len() {
      return Err(format!(
        "expected {} training days, got {}",
        training_days.len(),
        raw.weekly_schedule.len()
      ));
    }

    let mut seen: Vec<Weekday> = Vec::new();
    let mut days: Vec<DaySchedule> = Vec::new();

    for raw_day in &raw.weekly_schedule {
      let day: Weekday = raw_day.day.parse()?;
      if !training_days.contains(&day) {
        return Err(format!("{} is not a scheduled training day", day));
      }
      if seen.contains(&day) {
        return Err(format!("{} appears more than once", day));
      }
      seen.push(day);

      let mut focus = repair_focus(&raw_day.focus, valid_names);
      if focus.is_empty() {
        return Err(format!("no valid exercises left for {}", day));
      }

      // Canonical intensity order: hardest work first
      self.intensity.order(&mut focus);

      let exercise_details = if focus.len() > 1 {
        Some(decompose_details(&focus, &raw_day.details))
      } else {
        None
      };

      days.push(DaySchedule {
        day,
        focus: focus.join(FOCUS_COMBINATOR),
        details: raw_day.details.clone(),
        exercise_details,
      });
    }

    // Canonical weekday order, independent of generation order
    days.sort_by_key(|d| d.day.ordinal());
    Ok(days)
  }
}

/// ---------------------------------------------------------------------------
/// Vocabulary repair
/// ---------------------------------------------------------------------------

/// Resolve a raw focus string against the phase's exercise vocabulary.
/// Exact matches (case-insensitive) pass through; near misses above the
/// similarity cutoff are rewritten; everything else is dropped and logged.
fn repair_focus(focus: &str, valid_names: &[String]) -> Vec<String> {
  let mut result: Vec<String> = Vec::new();

  for token in focus.split('+').map(str::trim).filter(|t| !t.is_empty()) {
    let resolved = resolve_name(token, valid_names);
    match resolved {
      Some(name) => {
        if !result.contains(&name) {
          result.push(name);
        }
      }
      None => {
        warn!(token, "dropping unresolved exercise name");
      }
    }
  }

  result
}

fn resolve_name(token: &str, valid_names: &[String]) -> Option<String> {
  if let Some(exact) = valid_names.iter().find(|n| n.eq_ignore_ascii_case(token)) {
    return Some(exact.clone());
  }

  let token_lower = token.to_lowercase();
  let (best, score) = valid_names
    .iter()
    .map(|n| (n, strsim::normalized_levenshtein(&token_lower, &n.to_lowercase())))
    .max_by(|(_, a), (_, b)| a.total_cmp(b))?;

  if score >= SIMILARITY_CUTOFF {
    warn!(token, repaired = %best, score, "repaired exercise name");
    Some(best.clone())
  } else {
    None
  }
}

/// ---------------------------------------------------------------------------
/// Day decomposition
/// ---------------------------------------------------------------------------

/// Split a combined day's details into per-exercise fragments using the
/// exercise names as anchors. A name that never appears in the text gets
/// the full details duplicated (lossy fallback, not a failure).
fn decompose_details(focus: &[String], details: &str) -> Vec<ExerciseDetail> {
  let lower = details.to_lowercase();
  let anchors: Vec<Option<usize>> = focus.iter().map(|n| lower.find(&n.to_lowercase())).collect();

  let mut positions: Vec<usize> = anchors.iter().flatten().copied().collect();
  positions.sort_unstable();

  focus
    .iter()
    .zip(&anchors)
    .map(|(name, anchor)| {
      let fragment = match anchor {
        Some(start) => {
          let end = positions
            .iter()
            .copied()
            .find(|p| *p > *start)
            .unwrap_or(details.len());
          details
            .get(*start..end)
            .unwrap_or(details)
            .trim()
            .trim_end_matches([',', ';'])
            .trim_end()
            .to_string()
        }
        None => details.to_string(),
      };
      ExerciseDetail {
        exercise: name.clone(),
        details: fragment,
      }
    })
    .collect()
}

/// ---------------------------------------------------------------------------
/// Prompt construction
/// ---------------------------------------------------------------------------

fn build_user_message(
  phase: &Phase,
  ranked: &[RankedExercise],
  features: &RouteFeatures,
  request: &PlanRequest,
  training_days: &[Weekday],
) -> String {
  let exercises: Vec<String> = ranked
    .iter()
    .take(PROMPT_EXERCISE_LIMIT)
    .map(|r| {
      format!(
        "- {} ({}, {} min)",
        r.exercise.name, r.exercise.category, r.exercise.time_required
      )
    })
    .collect();

  let day_names: Vec<&str> = training_days.iter().map(|d| d.as_str()).collect();
  let profile = &request.profile;

  let mut message = format!(
    r#"Write the weekly schedule for this training phase.

PHASE: {name}
TYPE: {phase_type}
DURATION: {weeks} week(s)
EMPHASIS: {description}

ROUTE: {grade} ({style}){challenges}

CLIMBER:
- Experience: {experience}
- Session budget: {budget} minutes
- Weaknesses: {weaknesses}
- Injuries: {injuries}

AVAILABLE EXERCISES:
{exercises}

TRAINING DAYS: {days}

Schedule exactly {sessions} days. Respond with valid JSON matching the
OUTPUT FORMAT in your instructions."#,
    name = phase.name,
    phase_type = phase.phase_type,
    weeks = phase.weeks,
    description = phase.description,
    grade = if features.grade.is_empty() { "ungraded" } else { &features.grade },
    style = features.primary_style,
    challenges = if features.challenges.is_empty() {
      String::new()
    } else {
      format!("\nCHALLENGES: {}", features.challenges.join(", "))
    },
    experience = profile.experience_level(),
    budget = profile.session_budget_minutes(),
    weaknesses = if profile.weaknesses.is_empty() { "none noted" } else { &profile.weaknesses },
    injuries = profile.injuries.as_deref().unwrap_or("none"),
    exercises = exercises.join("\n"),
    days = day_names.join(", "),
    sessions = training_days.len(),
  );

  if let Some(analysis) = &request.previous_analysis {
    message.push_str(&format!("\n\nPREVIOUS COACHING ANALYSIS:\n{}", analysis));
  }

  message
}

/// Injected on retries: the vocabulary, spelled out.
fn strict_addendum(valid_names: &[String]) -> String {
  let names: Vec<&str> = valid_names
    .iter()
    .take(STRICT_NAME_LIMIT)
    .map(String::as_str)
    .collect();
  format!(
    "IMPORTANT: your previous response was invalid. Use ONLY these exercise \
     names, copied exactly:\n{}",
    names.join("\n")
  )
}

/// ---------------------------------------------------------------------------
/// Tests
/// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
  use super::*;
  use crate::compositor::CompositorError;
  use crate::test_utils::{
    fenced_schedule_json, sample_profile, sample_route, schedule_json, MockCompositor,
  };
  use std::sync::{Arc, Mutex};

  fn request(weeks: u32, sessions: u32) -> PlanRequest {
    PlanRequest {
      route: sample_route(),
      profile: sample_profile(),
      weeks_to_train: weeks,
      sessions_per_week: sessions,
      previous_analysis: None,
    }
  }

  fn three_day_schedule() -> String {
    schedule_json(&[
      ("Monday", "ARC Training", "30-40 minutes of continuous easy climbing."),
      ("Wednesday", "Route Intervals", "4 x route laps at moderate intensity."),
      ("Friday", "4x4 Boulder Circuits", "Four problems, four rounds, minimal rest."),
    ])
  }

  fn assembler_with(mock: MockCompositor) -> (PlanAssembler, Arc<MockCompositor>) {
    let mock = Arc::new(mock);
    let for_assembler = Arc::clone(&mock);

    struct Shared(Arc<MockCompositor>);

    #[async_trait::async_trait]
    impl Compositor for Shared {
      async fn compose(
        &self,
        system_prompt: &str,
        user_message: &str,
        temperature: f32,
      ) -> Result<String, CompositorError> {
        self.0.compose(system_prompt, user_message, temperature).await
      }
    }

    (PlanAssembler::new(Box::new(Shared(for_assembler))), mock)
  }

  #[tokio::test]
  async fn assembles_single_phase_plan() {
    let (assembler, mock) = assembler_with(MockCompositor::always(&three_day_schedule()));
    let plan = assembler.assemble(&request(3, 3)).await.unwrap();

    assert_eq!(plan.phases.len(), 1);
    assert_eq!(plan.phases[0].weeks, 3);
    assert_eq!(plan.total_weeks(), 3);
    assert_eq!(mock.call_count(), 1);

    let schedule = &plan.phases[0].weekly_schedule;
    assert_eq!(schedule.len(), 3);
    assert_eq!(schedule[0].day, Weekday::Monday);
    assert_eq!(schedule[0].focus, "ARC Training");
  }

  #[tokio::test]
  async fn handles_fenced_json_responses() {
    let fenced = fenced_schedule_json(&[
      ("Monday", "ARC Training", "Easy mileage."),
      ("Wednesday", "Route Intervals", "Intervals."),
      ("Friday", "Limit Bouldering", "Hard pulls."),
    ]);
    let (assembler, mock) = assembler_with(MockCompositor::always(&fenced));
    let plan = assembler.assemble(&request(3, 3)).await.unwrap();

    assert_eq!(plan.phases[0].weekly_schedule.len(), 3);
    assert_eq!(mock.call_count(), 1);
  }

  #[tokio::test]
  async fn sorts_days_into_canonical_weekday_order() {
    let shuffled = schedule_json(&[
      ("Friday", "4x4 Boulder Circuits", "Circuits."),
      ("Monday", "ARC Training", "Mileage."),
      ("Wednesday", "Route Intervals", "Intervals."),
    ]);
    let (assembler, _) = assembler_with(MockCompositor::always(&shuffled));
    let plan = assembler.assemble(&request(3, 3)).await.unwrap();

    let days: Vec<Weekday> = plan.phases[0].weekly_schedule.iter().map(|d| d.day).collect();
    assert_eq!(days, vec![Weekday::Monday, Weekday::Wednesday, Weekday::Friday]);
  }

  #[tokio::test]
  async fn reorders_combined_focus_by_intensity() {
    let combined = schedule_json(&[
      ("Monday", "ARC Training + Limit Bouldering", "Bouldering then mileage."),
      ("Wednesday", "Route Intervals", "Intervals."),
      ("Friday", "4x4 Boulder Circuits", "Circuits."),
    ]);
    let (assembler, _) = assembler_with(MockCompositor::always(&combined));
    let plan = assembler.assemble(&request(3, 3)).await.unwrap();

    // Limit Bouldering ranks harder than ARC Training, so it climbs first
    assert_eq!(
      plan.phases[0].weekly_schedule[0].focus,
      "Limit Bouldering + ARC Training"
    );
  }

  #[tokio::test]
  async fn repairs_near_miss_exercise_names() {
    let misspelled = schedule_json(&[
      ("Monday", "ARC Trainig", "Mileage."),
      ("Wednesday", "Route Intervals", "Intervals."),
      ("Friday", "4x4 Boulder Circuits", "Circuits."),
    ]);
    let (assembler, _) = assembler_with(MockCompositor::always(&misspelled));
    let plan = assembler.assemble(&request(3, 3)).await.unwrap();

    assert_eq!(plan.phases[0].weekly_schedule[0].focus, "ARC Training");
  }

  #[tokio::test]
  async fn drops_unrecognizable_names_but_keeps_the_day() {
    let hallucinated = schedule_json(&[
      ("Monday", "ARC Training + Underwater Basket Weaving", "Mixed session."),
      ("Wednesday", "Route Intervals", "Intervals."),
      ("Friday", "4x4 Boulder Circuits", "Circuits."),
    ]);
    let (assembler, _) = assembler_with(MockCompositor::always(&hallucinated));
    let plan = assembler.assemble(&request(3, 3)).await.unwrap();

    let monday = &plan.phases[0].weekly_schedule[0];
    assert_eq!(monday.focus, "ARC Training");
    assert!(!monday.focus.contains("Basket"));
  }

  #[tokio::test]
  async fn decomposes_combined_day_details() {
    let details = "Limit Bouldering: 45 minutes of maximal problems. ARC Training: finish with 30 minutes easy.";
    let combined = schedule_json(&[
      ("Monday", "Limit Bouldering + ARC Training", details),
      ("Wednesday", "Route Intervals", "Intervals."),
      ("Friday", "4x4 Boulder Circuits", "Circuits."),
    ]);
    let (assembler, _) = assembler_with(MockCompositor::always(&combined));
    let plan = assembler.assemble(&request(3, 3)).await.unwrap();

    let monday = &plan.phases[0].weekly_schedule[0];
    let fragments = monday.exercise_details.as_ref().unwrap();
    assert_eq!(fragments.len(), 2);
    assert!(fragments[0].details.starts_with("Limit Bouldering"));
    assert!(fragments[0].details.contains("maximal problems"));
    assert!(fragments[1].details.starts_with("ARC Training"));
  }

  #[tokio::test]
  async fn duplicates_details_when_no_anchor_found() {
    let details = "Alternate hard pulls with easy mileage all session.";
    let combined = schedule_json(&[
      ("Monday", "Limit Bouldering + ARC Training", details),
      ("Wednesday", "Route Intervals", "Intervals."),
      ("Friday", "4x4 Boulder Circuits", "Circuits."),
    ]);
    let (assembler, _) = assembler_with(MockCompositor::always(&combined));
    let plan = assembler.assemble(&request(3, 3)).await.unwrap();

    let fragments = plan.phases[0].weekly_schedule[0]
      .exercise_details
      .as_ref()
      .unwrap();
    assert!(fragments.iter().all(|f| f.details == details));
  }

  #[tokio::test]
  async fn retries_with_lower_temperature_and_explicit_vocabulary() {
    let (assembler, mock) = assembler_with(MockCompositor::new(vec![
      Ok("I cannot produce a schedule right now.".to_string()),
      Ok(three_day_schedule()),
    ]));

    let plan = assembler.assemble(&request(3, 3)).await.unwrap();
    assert_eq!(plan.phases.len(), 1);

    let calls = mock.recorded_calls();
    assert_eq!(calls.len(), 2);
    assert!(calls[0].temperature > calls[1].temperature);
    assert!(!calls[0].user_message.contains("copied exactly"));
    assert!(calls[1].user_message.contains("copied exactly"));
    assert!(calls[1].user_message.contains("ARC Training"));
  }

  #[tokio::test]
  async fn transport_errors_retry_in_the_same_loop() {
    let (assembler, mock) = assembler_with(MockCompositor::new(vec![
      Err(CompositorError::Timeout),
      Ok(three_day_schedule()),
    ]));

    let plan = assembler.assemble(&request(3, 3)).await.unwrap();
    assert_eq!(plan.phases.len(), 1);
    assert_eq!(mock.call_count(), 2);
  }

  #[tokio::test]
  async fn exhausted_retries_name_the_failed_phase() {
    let (assembler, mock) = assembler_with(MockCompositor::always("still not json"));

    let err = assembler.assemble(&request(3, 3)).await.unwrap_err();
    assert_eq!(mock.call_count(), 3);

    match err {
      PlanError::PhaseGeneration { index, phase, attempts, .. } => {
        assert_eq!(index, 0);
        assert_eq!(attempts, 3);
        assert!(phase.contains("Weeks 1-3") || phase.contains("Week"), "{}", phase);
      }
      other => panic!("unexpected error: {}", other),
    }
  }

  #[tokio::test]
  async fn missing_credentials_abort_without_retry() {
    let (assembler, mock) = assembler_with(MockCompositor::new(vec![
      Err(CompositorError::MissingApiKey),
      Ok(three_day_schedule()),
    ]));

    let err = assembler.assemble(&request(3, 3)).await.unwrap_err();
    assert!(matches!(err, PlanError::Compositor(CompositorError::MissingApiKey)));
    assert_eq!(mock.call_count(), 1);
  }

  #[tokio::test]
  async fn out_of_range_session_counts_use_the_fallback_days() {
    // 7 sessions/week has no weekday mapping; the schedule contract must
    // follow the resolved 3-day fallback, not the raw request
    let (assembler, mock) = assembler_with(MockCompositor::always(&three_day_schedule()));
    let plan = assembler.assemble(&request(3, 7)).await.unwrap();

    assert_eq!(plan.phases[0].weekly_schedule.len(), 3);
    assert_eq!(mock.call_count(), 1);
    assert!(mock.recorded_calls()[0]
      .user_message
      .contains("Schedule exactly 3 days"));
  }

  #[tokio::test]
  async fn wrong_day_count_is_rejected_and_retried() {
    let short = schedule_json(&[
      ("Monday", "ARC Training", "Mileage."),
      ("Wednesday", "Route Intervals", "Intervals."),
    ]);
    let (assembler, mock) = assembler_with(MockCompositor::new(vec![
      Ok(short),
      Ok(three_day_schedule()),
    ]));

    let plan = assembler.assemble(&request(3, 3)).await.unwrap();
    assert_eq!(plan.phases[0].weekly_schedule.len(), 3);
    assert_eq!(mock.call_count(), 2);
  }

  #[tokio::test]
  async fn off_schedule_days_are_rejected() {
    let wrong_day = schedule_json(&[
      ("Tuesday", "ARC Training", "Mileage."),
      ("Wednesday", "Route Intervals", "Intervals."),
      ("Friday", "4x4 Boulder Circuits", "Circuits."),
    ]);
    let (assembler, mock) = assembler_with(MockCompositor::new(vec![
      Ok(wrong_day),
      Ok(three_day_schedule()),
    ]));

    let plan = assembler.assemble(&request(3, 3)).await.unwrap();
    assert_eq!(mock.call_count(), 2);
    assert_eq!(plan.phases[0].weekly_schedule[0].day, Weekday::Monday);
  }

  #[tokio::test]
  async fn multi_phase_plan_reports_monotonic_progress() {
    let four_day = schedule_json(&[
      ("Monday", "ARC Training", "Mileage."),
      ("Wednesday", "Route Intervals", "Intervals."),
      ("Friday", "4x4 Boulder Circuits", "Circuits."),
      ("Sunday", "Hangboard Max Hangs", "Max hangs."),
    ]);
    let progress: Arc<Mutex<Vec<(usize, usize)>>> = Arc::new(Mutex::new(Vec::new()));
    let recorded = Arc::clone(&progress);

    let (assembler, mock) = assembler_with(MockCompositor::always(&four_day));
    let assembler = assembler.with_progress(Box::new(move |completed, total| {
      recorded.lock().unwrap().push((completed, total));
    }));

    // 8 weeks on an endurance route with an endurance-limited climber:
    // two phases, base then peak
    let plan = assembler.assemble(&request(8, 4)).await.unwrap();

    assert_eq!(plan.phases.len(), 2);
    assert_eq!(plan.total_weeks(), 8);
    assert_eq!(mock.call_count(), 2);
    assert_eq!(*progress.lock().unwrap(), vec![(1, 2), (2, 2)]);
  }

  #[tokio::test]
  async fn prompt_contains_phase_route_and_exercises() {
    let (assembler, mock) = assembler_with(MockCompositor::always(&three_day_schedule()));
    assembler.assemble(&request(3, 3)).await.unwrap();

    let call = &mock.recorded_calls()[0];
    assert!(call.system_prompt.contains("weekly_schedule"));
    assert!(call.user_message.contains("5.12a"));
    assert!(call.user_message.contains("TRAINING DAYS: Monday, Wednesday, Friday"));
    assert!(call.user_message.contains("ARC Training"));
    assert!(call.user_message.contains("Schedule exactly 3 days"));
  }

  #[tokio::test]
  async fn previous_analysis_is_carried_into_the_prompt() {
    let (assembler, mock) = assembler_with(MockCompositor::always(&three_day_schedule()));
    let mut req = request(3, 3);
    req.previous_analysis = Some("Last cycle the climber plateaued on endurance.".to_string());
    assembler.assemble(&req).await.unwrap();

    let call = &mock.recorded_calls()[0];
    assert!(call.user_message.contains("PREVIOUS COACHING ANALYSIS"));
    assert!(call.user_message.contains("plateaued"));
  }

  #[test]
  fn resolve_name_thresholds() {
    let valid = vec!["Hangboard Max Hangs".to_string(), "ARC Training".to_string()];

    // Exact, case-insensitive
    assert_eq!(resolve_name("arc training", &valid).as_deref(), Some("ARC Training"));
    // One edit away: well above the cutoff
    assert_eq!(
      resolve_name("Hangboard Max Hangz", &valid).as_deref(),
      Some("Hangboard Max Hangs")
    );
    // Unrelated: below the cutoff
    assert_eq!(resolve_name("Yoga Flow", &valid), None);
  }
}
