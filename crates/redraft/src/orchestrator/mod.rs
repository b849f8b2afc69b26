//! Per-invocation transform orchestration.
//!
//! An [`Invocation`] coordinates one transform end to end: fetch the
//! composer text, run the blocking service call on a worker thread, bring
//! up the wait indicator only when the request runs long, and deliver the
//! outcome back through the host on the UI context. Instances are
//! single-use; `run` consumes the invocation.

mod timer;

pub use timer::{ScheduledOnce, schedule_once};

use std::rc::Rc;
use std::sync::Arc;
use std::time::Duration;

use tracing::{debug, error, warn};

use crate::config::Prompt;
use crate::host::{AlertKind, ComposerHost, ContentKind};
use crate::llm::TransformBackend;

/// Delay before a still-running request brings up the wait indicator.
pub const WAIT_INDICATOR_DELAY: Duration = Duration::from_millis(800);

/// Notice shown when there is nothing to insert.
const NO_RESPONSE_NOTICE: &str = "No response received from the rewriting service";

/// Alert shown when the worker died without delivering a result.
const INTERRUPTED_NOTICE: &str = "The rewriting request was interrupted";

/// Everything one worker-bound service call needs, snapshotted at dispatch
/// time. Owned by exactly one invocation and dropped with it; the worker
/// never reads live registry state.
#[derive(Debug, Clone)]
pub struct OrchestrationRequest {
    pub prompt_id: String,
    pub source_text: String,
    pub model: String,
    pub api_key: String,
    pub prompts: Arc<[Prompt]>,
}

/// Terminal result of one invocation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Outcome {
    /// Transformed text was inserted into the composer.
    Completed,
    /// Nothing to do: blank input, or the service answered without text.
    Empty,
    /// The service call failed; the error was surfaced to the user.
    Failed,
    /// A precondition failed or the composer went away; nothing
    /// user-visible happened.
    Aborted,
}

/// Lifecycle phases, logged as the invocation advances.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Phase {
    Idle,
    AwaitingContent,
    Dispatched,
    Completing,
    Failed,
    Empty,
}

fn advance(phase: &mut Phase, next: Phase) {
    debug!(from = ?phase, to = ?next, "Invocation advanced");
    *phase = next;
}

/// Single-use coordinator for one transform.
///
/// Built by the action layer with a snapshot of the registry state; run on
/// the UI execution context.
pub struct Invocation {
    prompt_id: String,
    model: String,
    api_key: Option<String>,
    prompts: Arc<[Prompt]>,
    backend: Arc<dyn TransformBackend>,
    host: Rc<dyn ComposerHost>,
    wait_delay: Duration,
}

impl Invocation {
    pub fn new(
        prompt_id: impl Into<String>,
        model: impl Into<String>,
        api_key: Option<String>,
        prompts: Arc<[Prompt]>,
        backend: Arc<dyn TransformBackend>,
        host: Rc<dyn ComposerHost>,
    ) -> Self {
        Self {
            prompt_id: prompt_id.into(),
            model: model.into(),
            api_key,
            prompts,
            backend,
            host,
            wait_delay: WAIT_INDICATOR_DELAY,
        }
    }

    #[cfg(test)]
    fn with_wait_delay(mut self, delay: Duration) -> Self {
        self.wait_delay = delay;
        self
    }

    /// Drive the invocation to its terminal outcome.
    ///
    /// Preconditions (a prompt id, a non-empty prompt set, an api key) are
    /// wiring guarantees; when one is violated the invocation aborts with a
    /// log entry and no user-visible activity.
    pub async fn run(self) -> Outcome {
        let mut phase = Phase::Idle;

        if self.prompt_id.is_empty() {
            warn!("Transform invoked without a prompt id, aborting");
            return Outcome::Aborted;
        }
        if self.prompts.is_empty() {
            warn!("Transform invoked with no prompts configured, aborting");
            return Outcome::Aborted;
        }
        let Some(api_key) = self.api_key.clone() else {
            warn!("Transform invoked without an api key, aborting");
            return Outcome::Aborted;
        };

        advance(&mut phase, Phase::AwaitingContent);
        let source_text = match self.host.content(ContentKind::Plain).await {
            Ok(text) => text,
            Err(e) => {
                warn!(error = %e, "Composer content unavailable, aborting");
                return Outcome::Aborted;
            }
        };

        // Blank input short-circuits before any network activity and reads
        // to the user exactly like an empty service answer.
        if source_text.trim().is_empty() {
            advance(&mut phase, Phase::Empty);
            self.host.submit_alert(AlertKind::Info, NO_RESPONSE_NOTICE);
            return Outcome::Empty;
        }

        advance(&mut phase, Phase::Dispatched);
        let request = OrchestrationRequest {
            prompt_id: self.prompt_id.clone(),
            source_text,
            model: self.model.clone(),
            api_key,
            prompts: Arc::clone(&self.prompts),
        };

        let backend = Arc::clone(&self.backend);
        let mut call = tokio::task::spawn_blocking(move || backend.transform(&request));

        let mut wait_timer = schedule_once(self.wait_delay);
        let mut indicator_shown = false;

        let joined = loop {
            tokio::select! {
                joined = &mut call => break joined,
                _ = wait_timer.fired(), if !indicator_shown => {
                    if self.host.is_alive() {
                        debug!(model = %self.model, "Request still running, showing wait indicator");
                        self.host.show_wait_indicator(&self.model);
                    }
                    indicator_shown = true;
                }
            }
        };

        // Back on the UI context. The timer must never outlive the request,
        // fired or not.
        wait_timer.cancel();

        if !self.host.is_alive() {
            warn!("Composer went away mid-request, dropping the result");
            return Outcome::Aborted;
        }

        // Dismiss before branching so no outcome ever shows on top of the
        // wait indicator.
        self.host.dismiss_wait_indicator();

        let outcome = match joined {
            Ok(Ok(Some(text))) => {
                advance(&mut phase, Phase::Completing);
                debug!(chars = text.len(), "Transform completed, inserting text");
                self.host.insert_content(&text, ContentKind::Plain);
                Outcome::Completed
            }
            Ok(Ok(None)) => {
                advance(&mut phase, Phase::Empty);
                debug!("Transform service answered without text");
                self.host.submit_alert(AlertKind::Info, NO_RESPONSE_NOTICE);
                Outcome::Empty
            }
            Ok(Err(e)) => {
                advance(&mut phase, Phase::Failed);
                warn!(error = %e, "Transform failed");
                self.host.submit_alert(AlertKind::Error, &e.to_string());
                Outcome::Failed
            }
            Err(e) => {
                advance(&mut phase, Phase::Failed);
                error!(error = %e, "Transform worker died");
                self.host.submit_alert(AlertKind::Error, INTERRUPTED_NOTICE);
                Outcome::Failed
            }
        };

        debug!(outcome = ?outcome, "Invocation finished");
        outcome
    }
}
