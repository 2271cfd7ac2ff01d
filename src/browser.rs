//! Browser identification from User-Agent and Client Hints.

use crate::signals::Signals;
use regex::Regex;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::sync::LazyLock;

static FIREFOX_UA: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"Firefox/\d+\.\d+").unwrap());
static EDGE_UA: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"Edg/\d+\.\d+").unwrap());
static CHROME_UA: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"Chrome/\d+\.\d+").unwrap());

/// The browser a request claims to be.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum BrowserKind {
    Chrome,
    Edge,
    Firefox,
    Brave,
    #[default]
    Unknown,
}

impl BrowserKind {
    /// Detect the browser. First match wins:
    ///
    /// 1. Firefox UA together with `Te: trailers`
    /// 2. Edge UA token
    /// 3. "brave" anywhere in the brand Client Hints
    /// 4. Chrome UA token
    /// 5. Unknown
    ///
    /// Brave and Edge both send a Chrome-compatible UA, so they are tested
    /// before Chrome.
    pub fn detect(signals: &Signals<'_>) -> Self {
        let ua = signals.user_agent;

        // A Firefox UA without the trailers TE falls through
        if FIREFOX_UA.is_match(ua) && signals.te == "trailers" {
            return BrowserKind::Firefox;
        }

        if EDGE_UA.is_match(ua) || ua.to_lowercase().contains("edg/") {
            return BrowserKind::Edge;
        }

        if is_brave(signals.sec_ch_ua, signals.sec_ch_ua_full_version_list) {
            return BrowserKind::Brave;
        }

        if CHROME_UA.is_match(ua) {
            return BrowserKind::Chrome;
        }

        BrowserKind::Unknown
    }

    /// Chrome and Edge share the Chromium Client Hint checks.
    pub fn is_chromium_family(&self) -> bool {
        matches!(self, BrowserKind::Chrome | BrowserKind::Edge)
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            BrowserKind::Chrome => "chrome",
            BrowserKind::Edge => "edge",
            BrowserKind::Firefox => "firefox",
            BrowserKind::Brave => "brave",
            BrowserKind::Unknown => "unknown",
        }
    }
}

impl fmt::Display for BrowserKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Brave heuristic: "brave" in `Sec-Ch-Ua` or `Sec-Ch-Ua-Full-Version-List`,
/// case-insensitive.
pub fn is_brave(sec_ch_ua: &str, sec_ch_ua_full_version_list: &str) -> bool {
    format!("{sec_ch_ua} {sec_ch_ua_full_version_list}")
        .to_lowercase()
        .contains("brave")
}

#[cfg(test)]
mod tests {
    use super::*;

    const CHROME_133: &str = "Mozilla/5.0 (Windows NT 10.0; Win64; x64) AppleWebKit/537.36 (KHTML, like Gecko) Chrome/133.0.0.0 Safari/537.36";
    const EDGE_120: &str = "Mozilla/5.0 (Windows NT 10.0; Win64; x64) AppleWebKit/537.36 (KHTML, like Gecko) Chrome/120.0.0.0 Safari/537.36 Edg/120.0.0.0";
    const FIREFOX_134: &str = "Mozilla/5.0 (X11; Linux x86_64; rv:134.0) Gecko/20100101 Firefox/134.0";

    fn signals<'a>(ua: &'a str, te: &'a str, sec_ch_ua: &'a str, full_list: &'a str) -> Signals<'a> {
        Signals {
            user_agent: ua,
            te,
            sec_ch_ua,
            sec_ch_ua_full_version_list: full_list,
            ..Default::default()
        }
    }

    #[test]
    fn test_firefox_requires_trailers() {
        assert_eq!(
            BrowserKind::detect(&signals(FIREFOX_134, "trailers", "", "")),
            BrowserKind::Firefox
        );
        assert_eq!(
            BrowserKind::detect(&signals(FIREFOX_134, "", "", "")),
            BrowserKind::Unknown
        );
    }

    #[test]
    fn test_edge_wins_over_chrome() {
        assert_eq!(BrowserKind::detect(&signals(EDGE_120, "", "", "")), BrowserKind::Edge);
        assert_eq!(
            BrowserKind::detect(&signals("Mozilla/5.0 Chrome/120.0 EDG/120", "", "", "")),
            BrowserKind::Edge
        );
    }

    #[test]
    fn test_edge_wins_over_brave_hints() {
        assert_eq!(
            BrowserKind::detect(&signals(EDGE_120, "", "\"Brave\";v=\"120\"", "")),
            BrowserKind::Edge
        );
    }

    #[test]
    fn test_brave_from_client_hints() {
        let hints = "\"Not(A:Brand\";v=\"99\", \"Brave\";v=\"133\", \"Chromium\";v=\"133\"";
        assert_eq!(BrowserKind::detect(&signals(CHROME_133, "", hints, "")), BrowserKind::Brave);
        assert_eq!(BrowserKind::detect(&signals(CHROME_133, "", "", hints)), BrowserKind::Brave);
    }

    #[test]
    fn test_chrome_and_unknown() {
        assert_eq!(BrowserKind::detect(&signals(CHROME_133, "", "", "")), BrowserKind::Chrome);
        assert_eq!(BrowserKind::detect(&signals("curl/8.5.0", "", "", "")), BrowserKind::Unknown);
        assert_eq!(BrowserKind::detect(&signals("", "", "", "")), BrowserKind::Unknown);
    }

    #[test]
    fn test_brave_heuristic_is_case_insensitive() {
        assert!(is_brave("\"BRAVE\";v=\"133\"", ""));
        assert!(is_brave("", "\"Brave\";v=\"133.0.0.0\""));
        assert!(!is_brave("\"Google Chrome\";v=\"133\"", ""));
        assert!(!is_brave("", ""));
    }

    #[test]
    fn test_chromium_family() {
        assert!(BrowserKind::Chrome.is_chromium_family());
        assert!(BrowserKind::Edge.is_chromium_family());
        assert!(!BrowserKind::Brave.is_chromium_family());
        assert!(!BrowserKind::Firefox.is_chromium_family());
    }
}
