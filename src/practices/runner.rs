//! Registry and concurrent runner for practices.

use std::any::Any;
use std::collections::BTreeMap;
use std::panic::AssertUnwindSafe;
use std::sync::Arc;

use futures::future::join_all;
use futures::FutureExt;
use serde::{Deserialize, Serialize};
use tracing::{debug, info, warn};

use super::{builtin_practices, Practice, PracticeContext};
use crate::model::{PracticeEvaluationResult, PracticeImpact};

/// Why a practice ended up `unknown` instead of producing a verdict.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PracticeDiagnostic {
    /// Key of the failing practice.
    pub practice: String,
    /// Error or panic message.
    pub message: String,
}

/// Aggregated outcome of one run.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct PracticeReport {
    /// Verdict per evaluated practice, ordered by key.
    pub results: BTreeMap<String, PracticeEvaluationResult>,
    /// Effective impact per evaluated practice.
    pub impacts: BTreeMap<String, PracticeImpact>,
    /// Failures that were turned into `unknown`.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub diagnostics: Vec<PracticeDiagnostic>,
}

impl PracticeReport {
    /// Verdict for `key`, if the practice was evaluated.
    pub fn result(&self, key: &str) -> Option<PracticeEvaluationResult> {
        self.results.get(key).copied()
    }

    /// Number of practices with the given verdict.
    pub fn count(&self, verdict: PracticeEvaluationResult) -> usize {
        self.results.values().filter(|r| **r == verdict).count()
    }
}

/// Holds registered practices and evaluates them against a context.
#[derive(Default)]
pub struct PracticeRunner {
    practices: Vec<Arc<dyn Practice>>,
    overrides: BTreeMap<String, PracticeImpact>,
}

impl PracticeRunner {
    /// Creates an empty runner.
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates a runner with every built-in practice registered.
    pub fn with_builtin_practices() -> Self {
        let mut runner = Self::new();
        for practice in builtin_practices() {
            runner.register(practice);
        }
        runner
    }

    /// Applies configured impact overrides. `off` disables a practice.
    #[must_use]
    pub fn with_overrides(mut self, overrides: BTreeMap<String, PracticeImpact>) -> Self {
        self.overrides = overrides;
        self
    }

    /// Registers a practice. A second practice with an existing key is ignored.
    pub fn register(&mut self, practice: Arc<dyn Practice>) -> &mut Self {
        if self.practices.iter().any(|p| p.key() == practice.key()) {
            warn!(practice = practice.key(), "Practice already registered, ignoring duplicate");
        } else {
            debug!(practice = practice.key(), "Registered practice");
            self.practices.push(practice);
        }
        self
    }

    /// Registered practices in registration order.
    pub fn practices(&self) -> &[Arc<dyn Practice>] {
        &self.practices
    }

    /// Effective impact of a practice after overrides.
    pub fn impact_of(&self, practice: &dyn Practice) -> PracticeImpact {
        self.overrides
            .get(practice.key())
            .copied()
            .unwrap_or(practice.metadata().impact)
    }

    /// Evaluates every enabled, applicable practice concurrently.
    ///
    /// Each evaluation is isolated: an error or a panic yields `unknown` for
    /// that practice plus a diagnostic, and never affects the others.
    pub async fn run(&self, ctx: &PracticeContext) -> PracticeReport {
        let mut report = PracticeReport::default();
        let mut selected = Vec::new();

        for practice in &self.practices {
            let key = practice.key();
            let impact = self.impact_of(practice.as_ref());
            if impact == PracticeImpact::Off {
                debug!(practice = key, "Practice disabled by configuration");
                continue;
            }
            match std::panic::catch_unwind(AssertUnwindSafe(|| practice.is_applicable(ctx))) {
                Ok(true) => selected.push((practice, impact)),
                Ok(false) => debug!(practice = key, "Practice not applicable"),
                Err(payload) => {
                    record_failure(&mut report, key, impact, panic_message(payload.as_ref()));
                }
            }
        }

        let evaluations = selected.into_iter().map(|(practice, impact)| async move {
            let outcome = AssertUnwindSafe(async { practice.evaluate(ctx).await })
                .catch_unwind()
                .await;
            (practice.key(), impact, outcome)
        });

        for (key, impact, outcome) in join_all(evaluations).await {
            match outcome {
                Ok(Ok(result)) => {
                    debug!(practice = key, %result, "Evaluated practice");
                    report.results.insert(key.to_string(), result);
                    report.impacts.insert(key.to_string(), impact);
                }
                Ok(Err(e)) => record_failure(&mut report, key, impact, format!("{e:#}")),
                Err(payload) => {
                    record_failure(&mut report, key, impact, panic_message(payload.as_ref()));
                }
            }
        }

        info!(
            evaluated = report.results.len(),
            failed = report.diagnostics.len(),
            "Practice run finished"
        );
        report
    }
}

fn record_failure(
    report: &mut PracticeReport,
    key: &str,
    impact: PracticeImpact,
    message: String,
) {
    warn!(practice = key, error = %message, "Practice evaluation failed");
    report
        .results
        .insert(key.to_string(), PracticeEvaluationResult::Unknown);
    report.impacts.insert(key.to_string(), impact);
    report.diagnostics.push(PracticeDiagnostic {
        practice: key.to_string(),
        message,
    });
}

fn panic_message(payload: &(dyn Any + Send)) -> String {
    if let Some(s) = payload.downcast_ref::<&str>() {
        format!("panicked: {s}")
    } else if let Some(s) = payload.downcast_ref::<String>() {
        format!("panicked: {s}")
    } else {
        "panicked".to_string()
    }
}
