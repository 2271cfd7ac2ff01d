//! Browser-agnostic header checks.
//!
//! - Header-name count per browser
//! - Deprecated and canonical Accept-* headers
//! - DevTools probe path
//! - Generic Accept plausibility (the final gate)

use super::{ValidationContext, Validator};
use crate::config::HeaderCountConfig;
use crate::request::names;
use crate::verdict::{OutcomeKind, ValidationOutcome};

/// Path some DevTools integrations request on every page load.
pub const DEVTOOLS_PATH: &str = "/.well-known/appspecific/com.chrome.devtools.json";

/// Accept-Encoding sent by current Chromium and Firefox builds.
pub const CANONICAL_ACCEPT_ENCODING: &str = "gzip, deflate, br, zstd";

/// Distinct header names must fall within the range for the claimed browser.
pub struct HeaderCountValidator {
    ranges: HeaderCountConfig,
}

impl HeaderCountValidator {
    pub fn new(ranges: HeaderCountConfig) -> Self {
        Self { ranges }
    }
}

impl Default for HeaderCountValidator {
    fn default() -> Self {
        Self::new(HeaderCountConfig::default())
    }
}

impl Validator for HeaderCountValidator {
    fn name(&self) -> &'static str {
        "header_count"
    }

    fn check(&self, ctx: &ValidationContext<'_>) -> ValidationOutcome {
        let count = ctx.request.header_count();

        let Some(range) = self.ranges.range_for(ctx.browser) else {
            return self
                .pass("no_range_for_unknown_browser")
                .with_detail("count", count.to_string());
        };

        let outcome = if count < range.min {
            self.fail("too_few_headers")
        } else if count > range.max {
            self.fail("too_many_headers")
        } else {
            self.pass("within_expected_range")
        };

        outcome
            .with_detail("count", count.to_string())
            .with_detail("min", range.min.to_string())
            .with_detail("max", range.max.to_string())
    }
}

/// Accept-Charset is deprecated; current browsers never send it.
pub struct AcceptCharsetValidator;

impl Validator for AcceptCharsetValidator {
    fn name(&self) -> &'static str {
        "accept_charset"
    }

    fn check(&self, ctx: &ValidationContext<'_>) -> ValidationOutcome {
        let charset = ctx.signals.accept_charset;
        if charset.is_empty() {
            self.pass("no_accept_charset")
        } else {
            self.fail("deprecated_accept_charset")
                .with_detail(names::ACCEPT_CHARSET, charset)
        }
    }
}

/// Flags a missing Accept-Language or one containing a space.
pub struct AcceptLanguageValidator;

impl AcceptLanguageValidator {
    /// Reason code for a flagged value, `None` when the value looks normal.
    pub fn flag(accept_language: &str) -> Option<&'static str> {
        if accept_language.trim().is_empty() {
            Some("missing_accept_language")
        } else if accept_language.contains(' ') {
            Some("accept_language_contains_space")
        } else {
            None
        }
    }
}

impl Validator for AcceptLanguageValidator {
    fn name(&self) -> &'static str {
        "accept_language"
    }

    fn kind(&self) -> OutcomeKind {
        OutcomeKind::Informational
    }

    fn check(&self, ctx: &ValidationContext<'_>) -> ValidationOutcome {
        let value = ctx.signals.accept_language;
        match Self::flag(value) {
            Some(reason) => self.fail(reason).with_detail(names::ACCEPT_LANGUAGE, value),
            None => self.pass("accept_language_present"),
        }
    }
}

/// Accept-Encoding must be exactly the canonical value. Off by default.
pub struct AcceptEncodingValidator;

impl AcceptEncodingValidator {
    pub fn is_canonical(accept_encoding: &str) -> bool {
        accept_encoding == CANONICAL_ACCEPT_ENCODING
    }
}

impl Validator for AcceptEncodingValidator {
    fn name(&self) -> &'static str {
        "accept_encoding"
    }

    fn check(&self, ctx: &ValidationContext<'_>) -> ValidationOutcome {
        let value = ctx.signals.accept_encoding;
        if Self::is_canonical(value) {
            self.pass("canonical_accept_encoding")
        } else {
            self.fail("non_canonical_accept_encoding")
                .with_detail(names::ACCEPT_ENCODING, value)
                .with_detail("expected", CANONICAL_ACCEPT_ENCODING)
        }
    }
}

/// Flags requests for the DevTools well-known path.
pub struct DevtoolsProbeValidator;

impl Validator for DevtoolsProbeValidator {
    fn name(&self) -> &'static str {
        "devtools_probe"
    }

    fn kind(&self) -> OutcomeKind {
        OutcomeKind::Informational
    }

    fn check(&self, ctx: &ValidationContext<'_>) -> ValidationOutcome {
        if ctx.request.path() == DEVTOOLS_PATH {
            self.fail("devtools_probe_path").with_detail("path", ctx.request.path())
        } else {
            self.pass("regular_path")
        }
    }
}

/// Fails when the only Accept value is `*/*`.
pub struct AcceptPlausibilityValidator;

impl AcceptPlausibilityValidator {
    pub fn is_plausible(accept_values: &[String]) -> bool {
        !(accept_values.len() == 1 && accept_values[0] == "*/*")
    }
}

impl Validator for AcceptPlausibilityValidator {
    fn name(&self) -> &'static str {
        "accept_plausibility"
    }

    fn kind(&self) -> OutcomeKind {
        OutcomeKind::Gate
    }

    fn check(&self, ctx: &ValidationContext<'_>) -> ValidationOutcome {
        if Self::is_plausible(ctx.request.header_values(names::ACCEPT)) {
            self.pass("specific_accept")
        } else {
            self.fail("wildcard_only_accept")
        }
    }
}
