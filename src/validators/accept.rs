//! Accept header reference matching.
//!
//! Genuine browsers send a fixed Accept value for a given request type. The
//! comparison is case-insensitive and otherwise exact: reordered or extra
//! tokens fail.

use super::{ValidationContext, Validator};
use crate::browser::{is_brave, BrowserKind};
use crate::request::names;
use crate::signals::RequestClass;
use crate::verdict::ValidationOutcome;
use regex::Regex;
use std::sync::LazyLock;

pub const CHROME_DOCUMENT_ACCEPT: &str = "text/html,application/xhtml+xml,application/xml;q=0.9,image/avif,image/webp,image/apng,*/*;q=0.8,application/signed-exchange;v=b3;q=0.7";
pub const BRAVE_DOCUMENT_ACCEPT: &str = "text/html,application/xhtml+xml,application/xml;q=0.9,image/avif,image/webp,image/apng,*/*;q=0.8";
pub const CHROME_IMAGE_ACCEPT: &str = "image/avif,image/webp,image/apng,image/svg+xml,image/*,*/*;q=0.8";
pub const BRAVE_IMAGE_ACCEPT: &str = "image/avif,image/webp,image/apng,image/svg+xml,image/*,*/*;q=0.8";

pub const FIREFOX_DOCUMENT_ACCEPT: &str = "text/html,application/xhtml+xml,application/xml;q=0.9,*/*;q=0.8";
pub const FIREFOX_IMAGE_ACCEPT: &str = "image/avif,image/webp,image/png,image/svg+xml,image/*;q=0.8,*/*;q=0.5";

/// Chrome releases the references above were captured from (131-199).
static SUPPORTED_CHROME: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"Chrome/(13[1-9]|1[4-9][0-9])\.0").unwrap());

/// Firefox releases the references above were captured from (132-199).
static SUPPORTED_FIREFOX: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"Firefox/(13[2-9]|1[4-9][0-9])\.0").unwrap());

fn compare(
    validator: &dyn Validator,
    accept: &str,
    expected: &'static str,
    variant: &'static str,
) -> ValidationOutcome {
    if accept.eq_ignore_ascii_case(expected) {
        validator.pass("accept_matches_reference").with_detail("variant", variant)
    } else {
        validator
            .fail("accept_mismatch")
            .with_detail("variant", variant)
            .with_detail(names::ACCEPT, accept)
            .with_detail("expected", expected)
    }
}

/// Accept header check for Chrome and Edge.
pub struct ChromiumAcceptValidator;

impl ChromiumAcceptValidator {
    /// Reference value and its label for the request.
    pub fn reference(class: RequestClass, brave: bool) -> (&'static str, &'static str) {
        match (class, brave) {
            (RequestClass::Image, true) => (BRAVE_IMAGE_ACCEPT, "brave_image"),
            (RequestClass::Image, false) => (CHROME_IMAGE_ACCEPT, "chrome_image"),
            (_, true) => (BRAVE_DOCUMENT_ACCEPT, "brave_document"),
            (_, false) => (CHROME_DOCUMENT_ACCEPT, "chrome_document"),
        }
    }
}

impl Validator for ChromiumAcceptValidator {
    fn name(&self) -> &'static str {
        "accept_header"
    }

    fn applies(&self, ctx: &ValidationContext<'_>) -> bool {
        ctx.browser.is_chromium_family()
    }

    fn check(&self, ctx: &ValidationContext<'_>) -> ValidationOutcome {
        let signals = &ctx.signals;
        if !SUPPORTED_CHROME.is_match(signals.user_agent) {
            return self
                .fail("unsupported_chrome_version")
                .with_detail(names::USER_AGENT, signals.user_agent);
        }

        let brave = is_brave(signals.sec_ch_ua, signals.sec_ch_ua_full_version_list);
        let (expected, variant) = Self::reference(ctx.class, brave);
        compare(self, signals.accept, expected, variant)
    }
}

/// Accept header check for Firefox.
pub struct FirefoxAcceptValidator;

impl FirefoxAcceptValidator {
    pub fn reference(class: RequestClass) -> (&'static str, &'static str) {
        match class {
            RequestClass::Image => (FIREFOX_IMAGE_ACCEPT, "firefox_image"),
            _ => (FIREFOX_DOCUMENT_ACCEPT, "firefox_document"),
        }
    }
}

impl Validator for FirefoxAcceptValidator {
    fn name(&self) -> &'static str {
        "accept_header"
    }

    fn applies(&self, ctx: &ValidationContext<'_>) -> bool {
        ctx.browser == BrowserKind::Firefox
    }

    fn check(&self, ctx: &ValidationContext<'_>) -> ValidationOutcome {
        let signals = &ctx.signals;
        if !SUPPORTED_FIREFOX.is_match(signals.user_agent) {
            return self
                .fail("unsupported_firefox_version")
                .with_detail(names::USER_AGENT, signals.user_agent);
        }

        let (expected, variant) = Self::reference(ctx.class);
        compare(self, signals.accept, expected, variant)
    }
}
