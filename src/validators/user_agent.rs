//! User-Agent checks.
//!
//! Current Chromium builds send a reduced User-Agent with a frozen platform
//! token. Anything else is a hand-written or outdated string.

use super::{ValidationContext, Validator};
use crate::config::StaleVersionConfig;
use crate::request::names;
use crate::verdict::ValidationOutcome;
use regex::Regex;
use std::sync::LazyLock;

/// Frozen platform tokens of reduced User-Agents. Matched case-sensitively.
pub const REDUCED_PLATFORM_TOKENS: &[&str] = &[
    "Android 10; K",
    "Macintosh; Intel Mac OS X 10_15_7",
    "Windows NT 10.0; Win64; x64",
    "X11; CrOS x86_64 14541.0.0",
    "X11; Linux x86_64",
    "iPhone; CPU iPhone OS 18_7 like Mac OS X",
    "iPad; CPU OS 18_7 like Mac OS X",
];

const IPHONE_PREFIX: &str = "iPhone; CPU iPhone OS";
const IOS_CHROMIUM_TOKENS: &[&str] = &["CriOS", "EdgiOS"];

/// True when the UA carries a reduced platform token, or is Chrome/Edge on
/// iPhone, which keep the real OS version.
pub fn is_reduced(user_agent: &str) -> bool {
    if user_agent.contains(IPHONE_PREFIX)
        && IOS_CHROMIUM_TOKENS.iter().any(|t| user_agent.contains(t))
    {
        return true;
    }

    REDUCED_PLATFORM_TOKENS.iter().any(|t| user_agent.contains(t))
}

pub struct UserAgentReductionValidator;

impl Validator for UserAgentReductionValidator {
    fn name(&self) -> &'static str {
        "user_agent_reduction"
    }

    fn check(&self, ctx: &ValidationContext<'_>) -> ValidationOutcome {
        let ua = ctx.signals.user_agent;
        if is_reduced(ua) {
            self.pass("reduced_user_agent")
        } else {
            self.fail("unreduced_user_agent").with_detail(names::USER_AGENT, ua)
        }
    }
}

static CHROME_MAJOR: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"Chrome/([0-9]{1,3})\.[0-9]").unwrap());

static FIREFOX_MAJOR: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"Firefox/([0-9]{1,3})\.[0-9]").unwrap());

static EDGE_MAJOR: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"Edg/([0-9]{1,3})\.[0-9]").unwrap());

static CHROME_IOS_MAJOR: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"CriOS/([0-9]{1,3})\.[0-9]").unwrap());

static FIREFOX_IOS_MAJOR: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"FxiOS/([0-9]{1,3})\.[0-9]").unwrap());

/// Rejects User-Agents announcing an engine at or below its version ceiling.
pub struct StaleVersionValidator {
    ceilings: StaleVersionConfig,
}

impl StaleVersionValidator {
    pub fn new(ceilings: StaleVersionConfig) -> Self {
        Self { ceilings }
    }

    fn engines(&self) -> [(&'static str, &'static Regex, u32); 5] {
        [
            ("chrome", &*CHROME_MAJOR, self.ceilings.chrome),
            ("firefox", &*FIREFOX_MAJOR, self.ceilings.firefox),
            ("firefox_ios", &*FIREFOX_IOS_MAJOR, self.ceilings.firefox_ios),
            ("chrome_ios", &*CHROME_IOS_MAJOR, self.ceilings.chrome_ios),
            ("edge", &*EDGE_MAJOR, self.ceilings.edge),
        ]
    }

    /// First stale engine found in the UA, with its major version.
    pub fn find_stale(&self, user_agent: &str) -> Option<(&'static str, u32)> {
        self.engines().into_iter().find_map(|(engine, re, ceiling)| {
            re.captures_iter(user_agent)
                .filter_map(|c| c.get(1)?.as_str().parse::<u32>().ok())
                .find(|major| *major <= ceiling)
                .map(|major| (engine, major))
        })
    }

    pub fn is_stale(&self, user_agent: &str) -> bool {
        self.find_stale(user_agent).is_some()
    }
}

impl Default for StaleVersionValidator {
    fn default() -> Self {
        Self::new(StaleVersionConfig::default())
    }
}

impl Validator for StaleVersionValidator {
    fn name(&self) -> &'static str {
        "stale_version"
    }

    fn check(&self, ctx: &ValidationContext<'_>) -> ValidationOutcome {
        match self.find_stale(ctx.signals.user_agent) {
            Some((engine, major)) => self
                .fail("stale_browser_version")
                .with_detail("engine", engine)
                .with_detail("major", major.to_string()),
            None => self.pass("current_browser_version"),
        }
    }
}
