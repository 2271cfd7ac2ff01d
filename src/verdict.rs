//! Validation outcomes and the aggregate verdict.

use crate::browser::BrowserKind;
use serde::Serialize;
use std::collections::BTreeMap;

/// How an outcome participates in the verdict.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum OutcomeKind {
    /// A failure marks the request suspicious
    Mandatory,
    /// Logged only, never affects the verdict
    Informational,
    /// Combined with the mandatory result by the final gate
    Gate,
}

impl OutcomeKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            OutcomeKind::Mandatory => "mandatory",
            OutcomeKind::Informational => "informational",
            OutcomeKind::Gate => "gate",
        }
    }
}

/// Result of a single validator.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ValidationOutcome {
    /// Validator name
    pub check: &'static str,
    pub kind: OutcomeKind,
    pub passed: bool,
    /// Reason code
    pub reason: String,
    /// Values the decision was based on
    pub details: BTreeMap<&'static str, String>,
}

impl ValidationOutcome {
    pub fn pass(check: &'static str, kind: OutcomeKind, reason: impl Into<String>) -> Self {
        Self {
            check,
            kind,
            passed: true,
            reason: reason.into(),
            details: BTreeMap::new(),
        }
    }

    pub fn fail(check: &'static str, kind: OutcomeKind, reason: impl Into<String>) -> Self {
        Self {
            passed: false,
            ..Self::pass(check, kind, reason)
        }
    }

    /// Add a detail field.
    pub fn with_detail(mut self, key: &'static str, value: impl Into<String>) -> Self {
        self.details.insert(key, value.into());
        self
    }

    /// True for a failed outcome that counts toward the suspicious flag.
    pub fn is_mandatory_failure(&self) -> bool {
        !self.passed && self.kind == OutcomeKind::Mandatory
    }

    /// True for an informational outcome that raised a flag.
    pub fn is_flag(&self) -> bool {
        !self.passed && self.kind == OutcomeKind::Informational
    }
}

/// Aggregate result for one request.
#[derive(Debug, Clone, Serialize)]
pub struct Verdict {
    /// Final decision: the Accept gate failed or any mandatory check failed
    pub suspicious: bool,
    /// Whether any mandatory check failed
    pub checks_suspicious: bool,
    /// Whether the generic Accept plausibility gate passed
    pub accept_plausible: bool,
    pub browser: BrowserKind,
    /// Outcomes in evaluation order
    pub outcomes: Vec<ValidationOutcome>,
}

impl Verdict {
    /// Combine outcomes. Exactly one [`OutcomeKind::Gate`] outcome is expected;
    /// without one the gate counts as passed.
    pub fn from_outcomes(browser: BrowserKind, outcomes: Vec<ValidationOutcome>) -> Self {
        let checks_suspicious = outcomes.iter().any(ValidationOutcome::is_mandatory_failure);
        let accept_plausible = outcomes
            .iter()
            .filter(|o| o.kind == OutcomeKind::Gate)
            .all(|o| o.passed);

        Self {
            suspicious: !(accept_plausible && !checks_suspicious),
            checks_suspicious,
            accept_plausible,
            browser,
            outcomes,
        }
    }

    /// Reason codes of the outcomes that made the request suspicious.
    pub fn reasons(&self) -> Vec<&str> {
        self.outcomes
            .iter()
            .filter(|o| !o.passed && o.kind != OutcomeKind::Informational)
            .map(|o| o.reason.as_str())
            .collect()
    }

    /// Reason codes raised by informational checks.
    pub fn flags(&self) -> Vec<&str> {
        self.outcomes
            .iter()
            .filter(|o| o.is_flag())
            .map(|o| o.reason.as_str())
            .collect()
    }

    /// Outcome for a named check, if it ran.
    pub fn outcome(&self, check: &str) -> Option<&ValidationOutcome> {
        self.outcomes.iter().find(|o| o.check == check)
    }

    /// True if the named check ran and failed.
    pub fn failed(&self, check: &str) -> bool {
        self.outcomes.iter().any(|o| o.check == check && !o.passed)
    }
}
