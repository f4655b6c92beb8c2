//! Advisory throttle implementation

use std::collections::HashMap;
use std::sync::Arc;
use std::time::{Duration, Instant};

use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::{debug, info, warn};

use advisory::{fallback_text, AdvisoryProvider, AdvisoryRequest};
use tracker::WellnessAlert;

/// Throttle error types
#[derive(Error, Debug)]
pub enum ThrottleError {
    #[error("invalid configuration: {0}")]
    InvalidConfig(String),
}

/// Throttle configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ThrottleConfig {
    /// Minimum seconds between advisory requests for one alert kind
    pub cooldown_seconds: u64,
    /// Upper bound on a single advisory request before falling back
    pub advisory_timeout_seconds: u64,
}

impl Default for ThrottleConfig {
    fn default() -> Self {
        Self {
            cooldown_seconds: 60,
            advisory_timeout_seconds: 8,
        }
    }
}

impl ThrottleConfig {
    /// Reject configurations no session should start with.
    pub fn validate(&self) -> Result<(), ThrottleError> {
        if self.cooldown_seconds == 0 {
            return Err(ThrottleError::InvalidConfig(
                "cooldown_seconds must be at least 1".into(),
            ));
        }
        if self.advisory_timeout_seconds == 0 {
            return Err(ThrottleError::InvalidConfig(
                "advisory_timeout_seconds must be at least 1".into(),
            ));
        }
        Ok(())
    }
}

/// Last request bookkeeping for one alert kind.
#[derive(Debug, Clone)]
struct KindState {
    /// When the last request (successful or fallback) completed
    last_request: Instant,
    /// Text that request produced
    text: String,
}

/// Cooldown-gated advisory requests for one session.
///
/// Owned by the session task alongside its tracker, so alert kinds never
/// leak across sessions. Mutated only when a cooldown has elapsed and a
/// request completes.
pub struct AdvisoryThrottle {
    config: ThrottleConfig,
    provider: Arc<dyn AdvisoryProvider>,
    states: HashMap<WellnessAlert, KindState>,
}

impl AdvisoryThrottle {
    /// Create a throttle over the given provider. Fails fast on an
    /// invalid configuration.
    pub fn new(
        config: ThrottleConfig,
        provider: Arc<dyn AdvisoryProvider>,
    ) -> Result<Self, ThrottleError> {
        config.validate()?;
        Ok(Self {
            config,
            provider,
            states: HashMap::new(),
        })
    }

    /// Advisory text for this frame's alert, using the current time.
    pub async fn advise(&mut self, request: &AdvisoryRequest) -> String {
        self.advise_at(request, Instant::now()).await
    }

    /// Advisory text for this frame's alert.
    ///
    /// Inside the cooldown the cached text comes back without touching
    /// the provider. Otherwise the provider is asked for fresh text under
    /// the configured timeout; failure or timeout substitutes the static
    /// fallback, and the cooldown advances either way so a broken
    /// provider is not retried every frame.
    pub async fn advise_at(&mut self, request: &AdvisoryRequest, now: Instant) -> String {
        let kind = request.kind;

        if let Some(state) = self.states.get(&kind) {
            let cooldown = Duration::from_secs(self.config.cooldown_seconds);
            if now.duration_since(state.last_request) <= cooldown {
                debug!(kind = kind.as_str(), "advisory in cooldown, serving cached text");
                return state.text.clone();
            }
        }

        let timeout = Duration::from_secs(self.config.advisory_timeout_seconds);
        let text = match tokio::time::timeout(timeout, self.provider.generate(request)).await {
            Ok(Ok(text)) => {
                info!(kind = kind.as_str(), "advisory refreshed");
                text
            }
            Ok(Err(e)) => {
                warn!(kind = kind.as_str(), error = %e, "advisory generation failed, using fallback");
                fallback_text(kind).to_string()
            }
            Err(_) => {
                warn!(
                    kind = kind.as_str(),
                    timeout_secs = self.config.advisory_timeout_seconds,
                    "advisory generation timed out, using fallback"
                );
                fallback_text(kind).to_string()
            }
        };

        self.states.insert(
            kind,
            KindState {
                last_request: now,
                text: text.clone(),
            },
        );
        text
    }
}
