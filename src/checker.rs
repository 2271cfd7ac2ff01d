//! Header checker: runs the validator battery and produces a verdict.

use crate::config::HeaderCheckerConfig;
use crate::error::Result;
use crate::request::RequestHeaderSnapshot;
use crate::validators::{
    AcceptCharsetValidator, AcceptEncodingValidator, AcceptLanguageValidator,
    AcceptPlausibilityValidator, ChromiumAcceptValidator, ClientHintVersionValidator,
    DevtoolsProbeValidator, DeviceMemoryValidator, FirefoxAcceptValidator, HeaderCountValidator,
    LinuxPlatformValidator, SecChUaBrandValidator, SecFetchValidator, StaleVersionValidator,
    UserAgentReductionValidator, ValidationContext, Validator, WindowsPlatformVersionValidator,
};
use crate::verdict::{OutcomeKind, ValidationOutcome, Verdict};
use tracing::{debug, info, warn};

/// Response header carrying the detected browser kind.
pub const BROWSER_HEADER: &str = "X-Header-Check-Browser";

/// Response header carrying failing reason codes (debug only).
pub const REASONS_HEADER: &str = "X-Header-Check-Reasons";

/// Browser-identity header consistency checker.
///
/// Immutable after construction; share it by reference or `Arc` across
/// threads.
pub struct HeaderChecker {
    config: HeaderCheckerConfig,
    validators: Vec<Box<dyn Validator>>,
}

impl HeaderChecker {
    /// Create a checker from a validated configuration.
    pub fn new(config: HeaderCheckerConfig) -> Result<Self> {
        config.validate()?;
        let validators = Self::build_battery(&config);

        debug!(
            validators = validators.len(),
            verdict_header = %config.verdict_header,
            "Header checker ready"
        );

        Ok(Self { config, validators })
    }

    /// Create with default configuration.
    pub fn with_defaults() -> Self {
        let config = HeaderCheckerConfig::default();
        let validators = Self::build_battery(&config);
        Self { config, validators }
    }

    fn build_battery(config: &HeaderCheckerConfig) -> Vec<Box<dyn Validator>> {
        let enabled = &config.detection;
        let mut battery: Vec<Box<dyn Validator>> = Vec::new();

        // Unconditional
        if enabled.header_count {
            battery.push(Box::new(HeaderCountValidator::new(config.header_count.clone())));
        }
        if enabled.user_agent_reduction {
            battery.push(Box::new(UserAgentReductionValidator));
        }
        if enabled.stale_version {
            battery.push(Box::new(StaleVersionValidator::new(config.stale_versions.clone())));
        }
        if enabled.accept_charset {
            battery.push(Box::new(AcceptCharsetValidator));
        }
        if enabled.sec_fetch {
            battery.push(Box::new(SecFetchValidator));
        }
        if enabled.accept_language {
            battery.push(Box::new(AcceptLanguageValidator));
        }
        if enabled.devtools_probe {
            battery.push(Box::new(DevtoolsProbeValidator));
        }

        // Firefox
        if enabled.accept_header {
            battery.push(Box::new(FirefoxAcceptValidator));
        }

        // Chrome and Edge
        if enabled.device_memory {
            battery.push(Box::new(DeviceMemoryValidator));
        }
        if enabled.windows_platform_version {
            battery.push(Box::new(WindowsPlatformVersionValidator));
        }
        if enabled.client_hint_versions {
            battery.push(Box::new(ClientHintVersionValidator));
        }
        if enabled.accept_header {
            battery.push(Box::new(ChromiumAcceptValidator));
        }
        if enabled.sec_ch_ua_brand {
            battery.push(Box::new(SecChUaBrandValidator));
        }
        if enabled.linux_platform {
            battery.push(Box::new(LinuxPlatformValidator));
        }

        if enabled.accept_encoding {
            battery.push(Box::new(AcceptEncodingValidator));
        }

        // The gate always runs last
        battery.push(Box::new(AcceptPlausibilityValidator));
        battery
    }

    pub fn config(&self) -> &HeaderCheckerConfig {
        &self.config
    }

    /// Names of the validators in registration order.
    pub fn validator_names(&self) -> Vec<&'static str> {
        self.validators.iter().map(|v| v.name()).collect()
    }

    /// Evaluate one request.
    pub fn evaluate(&self, request: &RequestHeaderSnapshot) -> Verdict {
        // Full header values (cookies included) only when debug headers are on
        if self.config.debug_headers {
            info!(
                method = %request.method(),
                path = %request.path(),
                query = %request.query(),
                headers = ?request.headers(),
                "Incoming HTTP request"
            );
        } else {
            debug!(
                method = %request.method(),
                path = %request.path(),
                query = %request.query(),
                header_count = request.header_count(),
                "Evaluating request headers"
            );
        }

        let ctx = ValidationContext::new(request);
        let outcomes: Vec<ValidationOutcome> = self
            .validators
            .iter()
            .filter(|v| v.applies(&ctx))
            .map(|v| {
                let outcome = v.check(&ctx);
                log_outcome(&ctx, &outcome);
                outcome
            })
            .collect();

        let verdict = Verdict::from_outcomes(ctx.browser, outcomes);

        info!(
            path = %request.path(),
            browser = %verdict.browser,
            class = ctx.class.as_str(),
            suspicious = verdict.suspicious,
            checks_suspicious = verdict.checks_suspicious,
            accept_plausible = verdict.accept_plausible,
            reasons = ?verdict.reasons(),
            "Header check complete"
        );

        verdict
    }

    /// Header pairs a host attaches for the next stage.
    pub fn annotations(&self, verdict: &Verdict) -> Vec<(String, String)> {
        let mut headers = vec![
            (
                self.config.verdict_header.clone(),
                (!verdict.suspicious).to_string(),
            ),
            (BROWSER_HEADER.to_string(), verdict.browser.as_str().to_string()),
        ];

        if self.config.debug_headers {
            headers.push((REASONS_HEADER.to_string(), verdict.reasons().join(",")));
        }

        headers
    }
}

impl Default for HeaderChecker {
    fn default() -> Self {
        Self::with_defaults()
    }
}

fn log_outcome(ctx: &ValidationContext<'_>, outcome: &ValidationOutcome) {
    if outcome.passed {
        debug!(
            check = outcome.check,
            reason = %outcome.reason,
            browser = %ctx.browser,
            "Check passed"
        );
        return;
    }

    match outcome.kind {
        OutcomeKind::Informational => warn!(
            check = outcome.check,
            reason = %outcome.reason,
            browser = %ctx.browser,
            details = ?outcome.details,
            "Header flag raised"
        ),
        OutcomeKind::Mandatory | OutcomeKind::Gate => warn!(
            check = outcome.check,
            reason = %outcome.reason,
            browser = %ctx.browser,
            kind = outcome.kind.as_str(),
            details = ?outcome.details,
            "Check failed"
        ),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::browser::BrowserKind;
    use crate::config::CountRange;
    use crate::error::ConfigError;
    use crate::validators::test_support::*;
    use std::sync::{Arc, Mutex};
    use tracing::field::{Field, Visit};
    use tracing::Level;
    use tracing_subscriber::layer::{Context, SubscriberExt};
    use tracing_subscriber::Layer;

    /// Records every event as its level and a `name=value` field dump.
    #[derive(Clone, Default)]
    struct CapturedEvents(Arc<Mutex<Vec<(Level, String)>>>);

    struct FieldDump(String);

    impl Visit for FieldDump {
        fn record_debug(&mut self, field: &Field, value: &dyn std::fmt::Debug) {
            self.0.push_str(&format!("{}={:?} ", field.name(), value));
        }
    }

    impl<S: tracing::Subscriber> Layer<S> for CapturedEvents {
        fn on_event(&self, event: &tracing::Event<'_>, _ctx: Context<'_, S>) {
            let mut dump = FieldDump(String::new());
            event.record(&mut dump);
            self.0.lock().unwrap().push((*event.metadata().level(), dump.0));
        }
    }

    fn capture_logs(f: impl FnOnce()) -> Vec<(Level, String)> {
        let events = CapturedEvents::default();
        let subscriber = tracing_subscriber::registry().with(events.clone());
        tracing::subscriber::with_default(subscriber, f);
        let captured = events.0.lock().unwrap().clone();
        captured
    }

    #[test]
    fn test_checker_creation() {
        let checker = HeaderChecker::new(HeaderCheckerConfig::default()).unwrap();
        let names = checker.validator_names();
        assert_eq!(names.first(), Some(&"header_count"));
        assert_eq!(names.last(), Some(&"accept_plausibility"));
        assert!(!names.contains(&"accept_encoding"));
    }

    #[test]
    fn test_invalid_config_rejected() {
        let mut config = HeaderCheckerConfig::default();
        config.header_count.chrome = CountRange::new(40, 10);
        assert!(matches!(
            HeaderChecker::new(config),
            Err(ConfigError::InvertedRange { browser: "chrome", .. })
        ));
    }

    #[test]
    fn test_disabled_validators_are_skipped() {
        let mut config = HeaderCheckerConfig::default();
        config.detection.sec_fetch = false;
        config.detection.accept_encoding = true;
        let checker = HeaderChecker::new(config).unwrap();

        let names = checker.validator_names();
        assert!(!names.contains(&"sec_fetch"));
        assert!(names.contains(&"accept_encoding"));
        assert_eq!(names.last(), Some(&"accept_plausibility"));
    }

    #[test]
    fn test_unknown_browser_gets_unconditional_set() {
        let checker = HeaderChecker::with_defaults();
        let req = make_request("/", &[("User-Agent", "curl/8.5.0"), ("Accept", "*/*")]);
        let verdict = checker.evaluate(&req);

        assert_eq!(verdict.browser, BrowserKind::Unknown);
        assert!(verdict.outcome("device_memory").is_none());
        assert!(verdict.outcome("accept_header").is_none());
        assert!(verdict.outcome("header_count").is_some_and(|o| o.passed));
        assert!(verdict.failed("user_agent_reduction"));
        assert!(!verdict.accept_plausible);
        assert!(verdict.suspicious);
    }

    #[test]
    fn test_firefox_dispatch() {
        let checker = HeaderChecker::with_defaults();
        let req = make_request("/", &[("User-Agent", FIREFOX_LINUX_UA), ("TE", "trailers")]);
        let verdict = checker.evaluate(&req);

        assert_eq!(verdict.browser, BrowserKind::Firefox);
        assert!(verdict.outcome("accept_header").is_some());
        assert!(verdict.outcome("client_hint_versions").is_none());
        assert!(verdict.outcome("linux_platform").is_none());
    }

    #[test]
    fn test_chrome_dispatch() {
        let checker = HeaderChecker::with_defaults();
        let req = make_request("/", &[("User-Agent", CHROME_WINDOWS_UA)]);
        let verdict = checker.evaluate(&req);

        assert_eq!(verdict.browser, BrowserKind::Chrome);
        for check in [
            "device_memory",
            "windows_platform_version",
            "client_hint_versions",
            "accept_header",
            "sec_ch_ua_brand",
        ] {
            assert!(verdict.outcome(check).is_some(), "{check} should run for Chrome");
        }
        // No Linux platform hint
        assert!(verdict.outcome("linux_platform").is_none());
    }

    #[test]
    fn test_annotations() {
        let checker = HeaderChecker::with_defaults();
        let req = make_request("/", &[("User-Agent", EDGE_WINDOWS_UA)]);
        let verdict = checker.evaluate(&req);

        let headers = checker.annotations(&verdict);
        assert_eq!(
            headers,
            vec![
                ("SecureHeader".to_string(), "false".to_string()),
                (BROWSER_HEADER.to_string(), "edge".to_string()),
            ]
        );
    }

    #[test]
    fn test_debug_annotations() {
        let config = HeaderCheckerConfig {
            verdict_header: "X-Browser-Verified".to_string(),
            debug_headers: true,
            ..HeaderCheckerConfig::default()
        };
        let checker = HeaderChecker::new(config).unwrap();
        let req = make_request("/", &[("Accept", "*/*")]);
        let verdict = checker.evaluate(&req);

        let headers = checker.annotations(&verdict);
        assert_eq!(headers[0], ("X-Browser-Verified".to_string(), "false".to_string()));
        let reasons = &headers[2];
        assert_eq!(reasons.0, REASONS_HEADER);
        assert!(reasons.1.contains("wildcard_only_accept"));
        assert!(reasons.1.contains("unreduced_user_agent"));
    }

    #[test]
    fn test_debug_headers_log_incoming_request() {
        let config = HeaderCheckerConfig {
            debug_headers: true,
            ..HeaderCheckerConfig::default()
        };
        let checker = HeaderChecker::new(config).unwrap();
        let req = make_request(
            "/login?next=%2F",
            &[("User-Agent", CHROME_LINUX_UA), ("X-Trace", "trace-7f3a")],
        );

        let events = capture_logs(|| {
            checker.evaluate(&req);
        });
        let incoming = events
            .iter()
            .find(|(level, text)| *level == Level::INFO && text.contains("Incoming HTTP request"))
            .map(|(_, text)| text.as_str())
            .unwrap_or_default();

        assert!(incoming.contains("method=GET"), "{incoming}");
        assert!(incoming.contains("path=/login"), "{incoming}");
        assert!(incoming.contains("query=next=%2F"), "{incoming}");
        assert!(incoming.contains("x-trace"), "{incoming}");
        assert!(incoming.contains("trace-7f3a"), "{incoming}");
    }

    #[test]
    fn test_header_values_not_logged_by_default() {
        let checker = HeaderChecker::with_defaults();
        let req = make_request("/", &[("User-Agent", CHROME_LINUX_UA), ("X-Trace", "trace-7f3a")]);

        let events = capture_logs(|| {
            checker.evaluate(&req);
        });

        assert!(events.iter().any(|(level, text)| {
            *level == Level::DEBUG && text.contains("Evaluating request headers")
        }));
        assert!(!events.iter().any(|(_, text)| text.contains("Incoming HTTP request")));
        assert!(!events.iter().any(|(_, text)| text.contains("trace-7f3a")));
    }
}
