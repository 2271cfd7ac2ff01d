//! Major-version extraction for cross-referencing Client Hints.
//!
//! Every extractor returns the first captured group, or `""` when nothing
//! matched. An empty result means "not present", which is different from a
//! present-but-mismatched version.

use crate::signals::Signals;
use regex::Regex;
use serde::Serialize;
use std::sync::LazyLock;

/// `133` from `"133.0.6943.53"`.
static THREE_DIGITS: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"\b([0-9]{3})\b").unwrap());

/// `133` from `Chrome/133.0.0.0`.
static CHROME_FROM_UA: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"Chrome/([0-9]{3})").unwrap());

/// `133` from `"Google Chrome";v="133"` or `"Microsoft Edge";v="133.0.3065.69"`.
static BRAND_VERSION: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r#"(?:Google Chrome|Microsoft Edge)"?;v="([0-9]{3})"#).unwrap()
});

fn first_capture<'a>(re: &Regex, s: &'a str) -> &'a str {
    re.captures(s)
        .and_then(|c| c.get(1))
        .map(|m| m.as_str())
        .unwrap_or("")
}

/// First standalone 3-digit number.
pub fn first_three_digits(s: &str) -> &str {
    first_capture(&THREE_DIGITS, s)
}

/// Chrome major version from a User-Agent.
pub fn chrome_from_ua(ua: &str) -> &str {
    first_capture(&CHROME_FROM_UA, ua)
}

/// Chrome/Edge major version from a brand list.
pub fn brand_version(brands: &str) -> &str {
    first_capture(&BRAND_VERSION, brands)
}

/// The four major versions a Chromium request announces.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct ClientHintVersions<'a> {
    /// From `Sec-Ch-Ua-Full-Version`
    pub full_version: &'a str,
    /// From `Sec-Ch-Ua-Full-Version-List`
    pub full_version_list: &'a str,
    /// From the User-Agent
    pub user_agent: &'a str,
    /// From `Sec-Ch-Ua`
    pub brand: &'a str,
}

impl<'a> ClientHintVersions<'a> {
    pub fn extract(signals: &Signals<'a>) -> Self {
        Self {
            full_version: first_three_digits(signals.sec_ch_ua_full_version),
            full_version_list: brand_version(signals.sec_ch_ua_full_version_list),
            user_agent: chrome_from_ua(signals.user_agent),
            brand: brand_version(signals.sec_ch_ua),
        }
    }

    /// True when all four are present and identical.
    pub fn all_match(&self) -> bool {
        let all = [self.full_version, self.full_version_list, self.user_agent, self.brand];
        all.iter().all(|v| !v.is_empty() && *v == self.full_version)
    }
}
