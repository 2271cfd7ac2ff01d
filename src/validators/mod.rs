//! Header consistency validators.
//!
//! Each validator checks one aspect of the request and returns a
//! [`ValidationOutcome`]. Validators are pure and total: every input,
//! including missing or malformed headers, yields a definite pass or fail.

pub mod accept;
pub mod client_hints;
pub mod fetch_metadata;
pub mod headers;
pub mod user_agent;

pub use accept::{ChromiumAcceptValidator, FirefoxAcceptValidator};
pub use client_hints::{
    ClientHintVersionValidator, DeviceMemoryValidator, LinuxPlatformValidator,
    SecChUaBrandValidator, WindowsPlatformVersionValidator,
};
pub use fetch_metadata::SecFetchValidator;
pub use headers::{
    AcceptCharsetValidator, AcceptEncodingValidator, AcceptLanguageValidator,
    AcceptPlausibilityValidator, DevtoolsProbeValidator, HeaderCountValidator,
};
pub use user_agent::{StaleVersionValidator, UserAgentReductionValidator};

use crate::browser::BrowserKind;
use crate::request::RequestHeaderSnapshot;
use crate::signals::{RequestClass, Signals};
use crate::verdict::{OutcomeKind, ValidationOutcome};

/// Everything a validator may look at for one request.
///
/// The browser kind and request class are computed once here and shared by
/// every validator.
#[derive(Debug, Clone, Copy)]
pub struct ValidationContext<'a> {
    pub request: &'a RequestHeaderSnapshot,
    pub signals: Signals<'a>,
    pub browser: BrowserKind,
    pub class: RequestClass,
}

impl<'a> ValidationContext<'a> {
    pub fn new(request: &'a RequestHeaderSnapshot) -> Self {
        let signals = Signals::extract(request);
        Self {
            request,
            browser: BrowserKind::detect(&signals),
            class: signals.request_class(),
            signals,
        }
    }

    /// Same as [`ValidationContext::new`] with a forced browser kind.
    pub fn with_browser(request: &'a RequestHeaderSnapshot, browser: BrowserKind) -> Self {
        Self {
            browser,
            ..Self::new(request)
        }
    }
}

/// A single consistency check.
pub trait Validator: Send + Sync {
    /// Validator name, used as the outcome's check name.
    fn name(&self) -> &'static str;

    /// How a failure affects the verdict.
    fn kind(&self) -> OutcomeKind {
        OutcomeKind::Mandatory
    }

    /// Whether this validator runs for the request.
    fn applies(&self, _ctx: &ValidationContext<'_>) -> bool {
        true
    }

    /// Run the check.
    fn check(&self, ctx: &ValidationContext<'_>) -> ValidationOutcome;

    fn pass(&self, reason: &str) -> ValidationOutcome {
        ValidationOutcome::pass(self.name(), self.kind(), reason)
    }

    fn fail(&self, reason: &str) -> ValidationOutcome {
        ValidationOutcome::fail(self.name(), self.kind(), reason)
    }
}
