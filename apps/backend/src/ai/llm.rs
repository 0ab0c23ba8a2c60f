//! LLM provider - asks an OpenAI-compatible chat-completions endpoint.
//!
//! The provider owns a circuit breaker. After a run of consecutive failures
//! it reports itself unavailable for a cooldown period, and the controller
//! falls back to random choices without calling it.

use std::time::{Duration, Instant};

use async_trait::async_trait;
use parking_lot::Mutex;
use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use super::prompts;
use super::trait_def::{AiError, DecisionProvider};
use crate::config::LlmConfig;
use crate::domain::{ParticipantId, Role, VisibleState};

const FAILURE_THRESHOLD: u32 = 3;
const COOLDOWN: Duration = Duration::from_secs(60);
const MAX_SPEECH_CHARS: usize = 400;

#[derive(Debug, Default)]
struct BreakerState {
    consecutive_failures: u32,
    open_until: Option<Instant>,
}

/// Consecutive-failure circuit breaker.
#[derive(Debug)]
pub struct CircuitBreaker {
    state: Mutex<BreakerState>,
    threshold: u32,
    cooldown: Duration,
}

impl CircuitBreaker {
    pub fn new(threshold: u32, cooldown: Duration) -> Self {
        Self {
            state: Mutex::new(BreakerState::default()),
            threshold: threshold.max(1),
            cooldown,
        }
    }

    /// Closed, or open but past its cooldown (half-open: one trial allowed).
    pub fn allows_requests(&self) -> bool {
        match self.state.lock().open_until {
            None => true,
            Some(until) => Instant::now() >= until,
        }
    }

    pub fn record_success(&self) {
        let mut state = self.state.lock();
        state.consecutive_failures = 0;
        state.open_until = None;
    }

    pub fn record_failure(&self) {
        let mut state = self.state.lock();
        state.consecutive_failures += 1;
        if state.consecutive_failures >= self.threshold {
            state.open_until = Some(Instant::now() + self.cooldown);
        }
    }
}

#[derive(Serialize)]
struct ChatMessage<'a> {
    role: &'a str,
    content: &'a str,
}

#[derive(Serialize)]
struct ChatRequest<'a> {
    model: &'a str,
    messages: Vec<ChatMessage<'a>>,
    temperature: f32,
    max_tokens: u32,
}

#[derive(Deserialize)]
struct ChatResponse {
    choices: Vec<ChatChoice>,
}

#[derive(Deserialize)]
struct ChatChoice {
    message: ChatReply,
}

#[derive(Deserialize)]
struct ChatReply {
    #[serde(default)]
    content: Option<String>,
}

pub struct LlmProvider {
    client: reqwest::Client,
    config: LlmConfig,
    breaker: CircuitBreaker,
}

impl LlmProvider {
    pub const NAME: &'static str = "llm";
    pub const VERSION: &'static str = "1.0.0";

    pub fn new(config: LlmConfig) -> Result<Self, AiError> {
        Self::with_breaker(config, CircuitBreaker::new(FAILURE_THRESHOLD, COOLDOWN))
    }

    pub fn with_breaker(config: LlmConfig, breaker: CircuitBreaker) -> Result<Self, AiError> {
        let client = reqwest::Client::builder()
            .timeout(config.timeout)
            .build()
            .map_err(|e| AiError::Internal(format!("http client: {e}")))?;
        Ok(Self {
            client,
            config,
            breaker,
        })
    }

    async fn complete(&self, system: &str, user: &str) -> Result<String, AiError> {
        let result = self.request(system, user).await;
        match &result {
            Ok(_) => self.breaker.record_success(),
            Err(err) => {
                warn!(provider = Self::NAME, error = %err, "Completion failed");
                self.breaker.record_failure();
            }
        }
        result
    }

    async fn request(&self, system: &str, user: &str) -> Result<String, AiError> {
        let url = format!("{}/chat/completions", self.config.base_url.trim_end_matches('/'));
        let body = ChatRequest {
            model: &self.config.model,
            messages: vec![
                ChatMessage {
                    role: "system",
                    content: system,
                },
                ChatMessage {
                    role: "user",
                    content: user,
                },
            ],
            temperature: 0.8,
            max_tokens: 200,
        };

        let response = self
            .client
            .post(url)
            .bearer_auth(&self.config.api_key)
            .json(&body)
            .send()
            .await
            .map_err(|e| {
                if e.is_timeout() {
                    AiError::Timeout
                } else {
                    AiError::Internal(format!("request: {e}"))
                }
            })?;

        let status = response.status();
        if !status.is_success() {
            return Err(AiError::Internal(format!("endpoint returned {status}")));
        }

        let parsed: ChatResponse = response
            .json()
            .await
            .map_err(|e| AiError::Internal(format!("decode: {e}")))?;

        let content = parsed
            .choices
            .into_iter()
            .next()
            .and_then(|c| c.message.content)
            .map(|c| c.trim().to_string())
            .filter(|c| !c.is_empty())
            .ok_or_else(|| AiError::Internal("empty completion".into()))?;

        debug!(provider = Self::NAME, chars = content.len(), "Completion received");
        Ok(content)
    }
}

/// First number in `text` that is one of `valid`.
pub fn parse_target(text: &str, valid: &[ParticipantId]) -> Result<ParticipantId, AiError> {
    text.split(|c: char| !c.is_ascii_digit())
        .filter(|s| !s.is_empty())
        .filter_map(|s| s.parse::<ParticipantId>().ok())
        .find(|id| valid.contains(id))
        .ok_or_else(|| AiError::InvalidMove(format!("no valid target in {text:?}")))
}

pub fn parse_protect(text: &str) -> Result<bool, AiError> {
    let upper = text.to_ascii_uppercase();
    if upper.contains("SAVE") || upper.contains("YES") {
        Ok(true)
    } else if upper.contains("PASS") || upper.contains("NO") {
        Ok(false)
    } else {
        Err(AiError::InvalidMove(format!("unclear protect answer {text:?}")))
    }
}

pub fn parse_poison(text: &str, valid: &[ParticipantId]) -> Result<Option<ParticipantId>, AiError> {
    let upper = text.to_ascii_uppercase();
    if upper.contains("NONE") || upper.contains("PASS") {
        return Ok(None);
    }
    parse_target(text, valid).map(Some)
}

pub fn clean_speech(text: &str) -> String {
    let trimmed = text.trim().trim_matches('"').trim();
    trimmed.chars().take(MAX_SPEECH_CHARS).collect()
}

#[async_trait]
impl DecisionProvider for LlmProvider {
    fn name(&self) -> &'static str {
        Self::NAME
    }

    fn is_available(&self) -> bool {
        self.breaker.allows_requests()
    }

    async fn produce_speech(&self, view: &VisibleState) -> Result<String, AiError> {
        let reply = self
            .complete(&prompts::system_prompt(view), &prompts::speech_prompt(view))
            .await?;
        let speech = clean_speech(&reply);
        if speech.is_empty() {
            return Err(AiError::InvalidMove("blank speech".into()));
        }
        Ok(speech)
    }

    async fn produce_vote(
        &self,
        view: &VisibleState,
        valid: &[ParticipantId],
    ) -> Result<ParticipantId, AiError> {
        let reply = self
            .complete(&prompts::system_prompt(view), &prompts::vote_prompt(view, valid))
            .await?;
        parse_target(&reply, valid)
    }

    async fn produce_night_target(
        &self,
        role: Role,
        view: &VisibleState,
        valid: &[ParticipantId],
    ) -> Result<ParticipantId, AiError> {
        let reply = self
            .complete(
                &prompts::system_prompt(view),
                &prompts::night_target_prompt(role, view, valid),
            )
            .await?;
        parse_target(&reply, valid)
    }

    async fn produce_protect_decision(&self, view: &VisibleState) -> Result<bool, AiError> {
        let reply = self
            .complete(&prompts::system_prompt(view), &prompts::protect_prompt(view))
            .await?;
        parse_protect(&reply)
    }

    async fn produce_poison_decision(
        &self,
        view: &VisibleState,
        valid: &[ParticipantId],
    ) -> Result<Option<ParticipantId>, AiError> {
        let reply = self
            .complete(&prompts::system_prompt(view), &prompts::poison_prompt(view, valid))
            .await?;
        parse_poison(&reply, valid)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_first_valid_number() {
        assert_eq!(parse_target("I vote for #12, no wait, 4", &[4, 5]), Ok(4));
        assert_eq!(parse_target("5", &[4, 5]), Ok(5));
        assert!(parse_target("nobody", &[4, 5]).is_err());
        assert!(parse_target("999", &[4, 5]).is_err());
    }

    #[test]
    fn parses_protector_answers() {
        assert_eq!(parse_protect("SAVE"), Ok(true));
        assert_eq!(parse_protect("pass"), Ok(false));
        assert!(parse_protect("hmm").is_err());
        assert_eq!(parse_poison("NONE", &[1]), Ok(None));
        assert_eq!(parse_poison("poison 3", &[1, 3]), Ok(Some(3)));
    }

    #[test]
    fn speech_is_unquoted_and_capped() {
        assert_eq!(clean_speech("  \"Hello there\" "), "Hello there");
        assert_eq!(clean_speech(&"x".repeat(1000)).len(), MAX_SPEECH_CHARS);
    }

    #[test]
    fn breaker_opens_after_threshold_and_recovers() {
        let breaker = CircuitBreaker::new(2, Duration::from_secs(3600));
        assert!(breaker.allows_requests());
        breaker.record_failure();
        assert!(breaker.allows_requests());
        breaker.record_failure();
        assert!(!breaker.allows_requests());
        breaker.record_success();
        assert!(breaker.allows_requests());

        let instant = CircuitBreaker::new(1, Duration::ZERO);
        instant.record_failure();
        assert!(instant.allows_requests());
    }
}
