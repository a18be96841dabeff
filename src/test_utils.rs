//! Test utilities and helpers
//!
//! Mock compositor, profile/route factories, and schedule JSON builders
//! shared by the unit tests.

use std::sync::Mutex;

use async_trait::async_trait;

use crate::compositor::{Compositor, CompositorError};
use crate::models::{ClimberProfile, RouteDescriptor};

/// ---------------------------------------------------------------------------
/// Mock Compositor
/// ---------------------------------------------------------------------------

/// One recorded compositor invocation.
#[derive(Debug, Clone)]
pub struct RecordedCall {
  pub system_prompt: String,
  pub user_message: String,
  pub temperature: f32,
}

/// Scripted compositor: pops pre-loaded responses in order and records
/// every call. When the script runs out, the last response repeats.
pub struct MockCompositor {
  responses: Mutex<Vec<Result<String, CompositorError>>>,
  pub calls: Mutex<Vec<RecordedCall>>,
}

impl MockCompositor {
  pub fn new(responses: Vec<Result<String, CompositorError>>) -> Self {
    assert!(!responses.is_empty(), "mock compositor needs at least one response");
    Self {
      responses: Mutex::new(responses),
      calls: Mutex::new(Vec::new()),
    }
  }

  /// A compositor that always returns the same text.
  pub fn always(text: &str) -> Self {
    Self::new(vec![Ok(text.to_string())])
  }

  pub fn call_count(&self) -> usize {
    self.calls.lock().unwrap().len()
  }

  pub fn recorded_calls(&self) -> Vec<RecordedCall> {
    self.calls.lock().unwrap().clone()
  }
}

#[async_trait]
impl Compositor for MockCompositor {
  async fn compose(
    &self,
    system_prompt: &str,
    user_message: &str,
    temperature: f32,
  ) -> Result<String, CompositorError> {
    self.calls.lock().unwrap().push(RecordedCall {
      system_prompt: system_prompt.to_string(),
      user_message: user_message.to_string(),
      temperature,
    });

    let mut responses = self.responses.lock().unwrap();
    let response = if responses.len() > 1 {
      responses.remove(0)
    } else {
      clone_response(&responses[0])
    };
    response
  }
}

fn clone_response(r: &Result<String, CompositorError>) -> Result<String, CompositorError> {
  match r {
    Ok(text) => Ok(text.clone()),
    Err(CompositorError::MissingApiKey) => Err(CompositorError::MissingApiKey),
    Err(CompositorError::Timeout) => Err(CompositorError::Timeout),
    Err(CompositorError::Request(m)) => Err(CompositorError::Request(m.clone())),
    Err(CompositorError::Api(m)) => Err(CompositorError::Api(m.clone())),
    Err(CompositorError::Parse(m)) => Err(CompositorError::Parse(m.clone())),
  }
}

/// ---------------------------------------------------------------------------
/// Fixtures
/// ---------------------------------------------------------------------------

/// A typical intermediate climber with a full gym available.
pub fn sample_profile() -> ClimberProfile {
  ClimberProfile {
    weaknesses: "endurance, I pump out on long routes".to_string(),
    strengths: "strong fingers, good at bouldering".to_string(),
    attribute_ratings: "finger strength: 4, endurance: 2, technique: 3".to_string(),
    available_facilities: vec![
      "climbing_wall".to_string(),
      "hangboard".to_string(),
      "pullup_bar".to_string(),
      "weights".to_string(),
    ],
    available_time: Some("2 hours".to_string()),
    experience: Some("4 years".to_string()),
    injuries: None,
  }
}

/// A long pumpy endurance route.
pub fn sample_route() -> RouteDescriptor {
  RouteDescriptor {
    grade: "5.12a".to_string(),
    crag: "Red River Gorge".to_string(),
    angle: "gently overhanging".to_string(),
    length: "long, 30 meters".to_string(),
    hold_types: "jugs and crimps".to_string(),
    description: "Sustained pumpy climbing with no good rests until the chains".to_string(),
    style: None,
  }
}

/// Build a weekly-schedule JSON response from (day, focus, details) rows.
pub fn schedule_json(days: &[(&str, &str, &str)]) -> String {
  let entries: Vec<String> = days
    .iter()
    .map(|(day, focus, details)| {
      format!(
        r#"{{"day": "{}", "focus": "{}", "details": "{}"}}"#,
        day, focus, details
      )
    })
    .collect();
  format!(r#"{{"weekly_schedule": [{}]}}"#, entries.join(", "))
}

/// Same schedule, wrapped in a markdown code fence the way models often
/// return it.
pub fn fenced_schedule_json(days: &[(&str, &str, &str)]) -> String {
  format!("Here is the plan:\n\n```json\n{}\n```\n", schedule_json(days))
}
