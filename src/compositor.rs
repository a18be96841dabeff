//! Text compositor integration
//!
//! The compositor is the external text-generation collaborator that turns a
//! structured phase context into a weekly schedule. This module defines the
//! trait the assembler talks to plus the Claude-backed production client.

use std::time::Duration;

use async_trait::async_trait;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// ---------------------------------------------------------------------------
/// Configuration
/// ---------------------------------------------------------------------------

const CLAUDE_API_URL: &str = "https://api.anthropic.com/v1/messages";
const CLAUDE_MODEL: &str = "claude-sonnet-4-20250514";
const API_VERSION: &str = "2023-06-01";

/// Upper bound on a single compositor attempt
const REQUEST_TIMEOUT: Duration = Duration::from_secs(45);

const MAX_TOKENS: u32 = 2000;

/// ---------------------------------------------------------------------------
/// Error Types
/// ---------------------------------------------------------------------------

#[derive(Error, Debug)]
pub enum CompositorError {
  #[error("API key not configured")]
  MissingApiKey,

  #[error("Request failed: {0}")]
  Request(String),

  #[error("Request timed out")]
  Timeout,

  #[error("API error: {0}")]
  Api(String),

  #[error("Parse error: {0}")]
  Parse(String),
}

impl CompositorError {
  /// Whether the per-phase retry loop should try again after this error.
  /// Only missing credentials are terminal at this level.
  pub fn is_retryable(&self) -> bool {
    !matches!(self, Self::MissingApiKey)
  }
}

/// ---------------------------------------------------------------------------
/// Compositor trait
/// ---------------------------------------------------------------------------

/// An opaque text-generation service. Implementations must return the raw
/// response text; JSON extraction and validation happen in the caller.
#[async_trait]
pub trait Compositor: Send + Sync {
  async fn compose(
    &self,
    system_prompt: &str,
    user_message: &str,
    temperature: f32,
  ) -> Result<String, CompositorError>;
}

/// ---------------------------------------------------------------------------
/// Claude API Types
/// ---------------------------------------------------------------------------

#[derive(Debug, Serialize)]
struct ClaudeRequest {
  model: String,
  max_tokens: u32,
  temperature: f32,
  system: String,
  messages: Vec<ClaudeMessage>,
}

#[derive(Debug, Serialize)]
struct ClaudeMessage {
  role: String,
  content: String,
}

#[derive(Debug, Deserialize)]
struct ClaudeResponse {
  content: Vec<ContentBlock>,
}

#[derive(Debug, Deserialize)]
struct ContentBlock {
  #[serde(rename = "type")]
  content_type: String,
  text: Option<String>,
}

#[derive(Debug, Deserialize)]
struct ClaudeErrorResponse {
  error: ClaudeErrorDetail,
}

#[derive(Debug, Deserialize)]
struct ClaudeErrorDetail {
  message: String,
}

/// ---------------------------------------------------------------------------
/// Claude Compositor
/// ---------------------------------------------------------------------------

pub struct ClaudeCompositor {
  client: Client,
  api_key: String,
  base_url: String,
}

impl ClaudeCompositor {
  /// Create a client, loading the API key from the environment (a .env
  /// file is honored). Missing credentials fail construction and are
  /// never retried.
  pub fn from_env() -> Result<Self, CompositorError> {
    dotenvy::dotenv().ok();
    let api_key =
      std::env::var("ANTHROPIC_API_KEY").map_err(|_| CompositorError::MissingApiKey)?;
    Self::new(api_key)
  }

  pub fn new(api_key: String) -> Result<Self, CompositorError> {
    let client = Client::builder()
      .timeout(REQUEST_TIMEOUT)
      .build()
      .map_err(|e| CompositorError::Request(e.to_string()))?;

    Ok(Self {
      client,
      api_key,
      base_url: CLAUDE_API_URL.to_string(),
    })
  }

  /// Point the client at a different endpoint (tests).
  pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
    self.base_url = base_url.into();
    self
  }
}

#[async_trait]
impl Compositor for ClaudeCompositor {
  async fn compose(
    &self,
    system_prompt: &str,
    user_message: &str,
    temperature: f32,
  ) -> Result<String, CompositorError> {
    let request = ClaudeRequest {
      model: CLAUDE_MODEL.to_string(),
      max_tokens: MAX_TOKENS,
      temperature,
      system: system_prompt.to_string(),
      messages: vec![ClaudeMessage {
        role: "user".to_string(),
        content: user_message.to_string(),
      }],
    };

    let response = self
      .client
      .post(&self.base_url)
      .header("x-api-key", &self.api_key)
      .header("anthropic-version", API_VERSION)
      .header("content-type", "application/json")
      .json(&request)
      .send()
      .await
      .map_err(|e| {
        if e.is_timeout() {
          CompositorError::Timeout
        } else {
          CompositorError::Request(e.to_string())
        }
      })?;

    let status = response.status();
    let body = response
      .text()
      .await
      .map_err(|e| CompositorError::Request(e.to_string()))?;

    if !status.is_success() {
      if let Ok(error_resp) = serde_json::from_str::<ClaudeErrorResponse>(&body) {
        return Err(CompositorError::Api(error_resp.error.message));
      }
      return Err(CompositorError::Api(format!("HTTP {}: {}", status, body)));
    }

    let claude_response: ClaudeResponse =
      serde_json::from_str(&body).map_err(|e| CompositorError::Parse(e.to_string()))?;

    claude_response
      .content
      .iter()
      .find(|c| c.content_type == "text")
      .and_then(|c| c.text.clone())
      .ok_or_else(|| CompositorError::Parse("No text content in response".to_string()))
  }
}

/// ---------------------------------------------------------------------------
/// JSON extraction
/// ---------------------------------------------------------------------------

/// Extract JSON from a compositor response (handles markdown code blocks).
pub fn extract_json(text: &str) -> Result<String, CompositorError> {
  // Try direct parse first
  if text.trim().starts_with('{') {
    return Ok(text.trim().to_string());
  }

  // Look for JSON in code blocks
  if let Some(start) = text.find("```json") {
    let start = start + 7;
    if let Some(end) = text[start..].find("```") {
      return Ok(text[start..start + end].trim().to_string());
    }
  }

  // Look for plain code blocks
  if let Some(start) = text.find("```") {
    let start = start + 3;
    // Skip language identifier if present
    let content_start = text[start..]
      .find('\n')
      .map(|i| start + i + 1)
      .unwrap_or(start);
    if let Some(end) = text[content_start..].find("```") {
      return Ok(text[content_start..content_start + end].trim().to_string());
    }
  }

  // Last resort: find first { to last }
  if let (Some(start), Some(end)) = (text.find('{'), text.rfind('}')) {
    return Ok(text[start..=end].to_string());
  }

  Err(CompositorError::Parse(
    "Could not extract JSON from response".to_string(),
  ))
}

/// ---------------------------------------------------------------------------
/// Tests
/// ---------------------------------------------------------------------------
