//! Configuration types for the header checker agent.

use crate::browser::BrowserKind;
use crate::error::{ConfigError, Result};
use serde::{Deserialize, Serialize};
use std::path::Path;

/// Main configuration for the header checker.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct HeaderCheckerConfig {
    /// Expected header-name counts per browser
    pub header_count: HeaderCountConfig,

    /// Inclusive major-version ceilings considered stale
    pub stale_versions: StaleVersionConfig,

    /// Validator toggles
    pub detection: DetectionConfig,

    /// Response header carrying the verdict for the next stage
    pub verdict_header: String,

    /// Include failing reason codes in the annotations
    pub debug_headers: bool,
}

impl Default for HeaderCheckerConfig {
    fn default() -> Self {
        Self {
            header_count: HeaderCountConfig::default(),
            stale_versions: StaleVersionConfig::default(),
            detection: DetectionConfig::default(),
            verdict_header: "SecureHeader".to_string(),
            debug_headers: false,
        }
    }
}

impl HeaderCheckerConfig {
    /// Load a configuration file. `.yaml`/`.yml` files are parsed as YAML,
    /// everything else as JSON.
    pub fn from_file(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path).map_err(|source| ConfigError::Read {
            path: path.to_path_buf(),
            source,
        })?;

        let config: Self = if path.extension().is_some_and(|e| e == "yaml" || e == "yml") {
            serde_yaml::from_str(&content)?
        } else {
            serde_json::from_str(&content)?
        };

        config.validate()?;
        Ok(config)
    }

    /// Reject configurations the checker cannot run with.
    pub fn validate(&self) -> Result<()> {
        for (browser, range) in self.header_count.ranges() {
            if range.min > range.max {
                return Err(ConfigError::InvertedRange {
                    browser: browser.as_str(),
                    min: range.min,
                    max: range.max,
                });
            }
        }

        if self.verdict_header.trim().is_empty() {
            return Err(ConfigError::EmptyVerdictHeader);
        }

        Ok(())
    }
}

/// Inclusive `[min, max]` range of distinct header names.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct CountRange {
    pub min: usize,
    pub max: usize,
}

impl CountRange {
    pub const fn new(min: usize, max: usize) -> Self {
        Self { min, max }
    }

    pub fn contains(&self, count: usize) -> bool {
        (self.min..=self.max).contains(&count)
    }
}

/// Header-count ranges observed for genuine browsers.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct HeaderCountConfig {
    pub brave: CountRange,
    pub chrome: CountRange,
    pub edge: CountRange,
    pub firefox: CountRange,
}

impl Default for HeaderCountConfig {
    fn default() -> Self {
        Self {
            brave: CountRange::new(16, 23),
            chrome: CountRange::new(27, 32),
            edge: CountRange::new(25, 30),
            firefox: CountRange::new(9, 13),
        }
    }
}

impl HeaderCountConfig {
    /// Range for a browser kind. Unknown browsers have no range.
    pub fn range_for(&self, browser: BrowserKind) -> Option<CountRange> {
        match browser {
            BrowserKind::Brave => Some(self.brave),
            BrowserKind::Chrome => Some(self.chrome),
            BrowserKind::Edge => Some(self.edge),
            BrowserKind::Firefox => Some(self.firefox),
            BrowserKind::Unknown => None,
        }
    }

    fn ranges(&self) -> [(BrowserKind, CountRange); 4] {
        [
            (BrowserKind::Brave, self.brave),
            (BrowserKind::Chrome, self.chrome),
            (BrowserKind::Edge, self.edge),
            (BrowserKind::Firefox, self.firefox),
        ]
    }
}

/// Highest major version (inclusive) still treated as stale, per engine token.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct StaleVersionConfig {
    pub chrome: u32,
    pub edge: u32,
    pub firefox: u32,
    pub chrome_ios: u32,
    pub firefox_ios: u32,
}

impl Default for StaleVersionConfig {
    fn default() -> Self {
        // One below the oldest release the Accept-header references cover.
        Self {
            chrome: 130,
            edge: 130,
            firefox: 131,
            chrome_ios: 130,
            firefox_ios: 131,
        }
    }
}

/// Validator toggles. The Accept plausibility gate cannot be disabled.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct DetectionConfig {
    pub header_count: bool,
    pub user_agent_reduction: bool,
    pub stale_version: bool,
    pub accept_charset: bool,
    pub sec_fetch: bool,
    pub accept_language: bool,
    pub devtools_probe: bool,
    pub accept_header: bool,
    pub client_hint_versions: bool,
    pub linux_platform: bool,
    pub windows_platform_version: bool,
    pub device_memory: bool,
    pub sec_ch_ua_brand: bool,

    /// Require the canonical Accept-Encoding value
    pub accept_encoding: bool,
}

impl Default for DetectionConfig {
    fn default() -> Self {
        Self {
            header_count: true,
            user_agent_reduction: true,
            stale_version: true,
            accept_charset: true,
            sec_fetch: true,
            accept_language: true,
            devtools_probe: true,
            accept_header: true,
            client_hint_versions: true,
            linux_platform: true,
            windows_platform_version: true,
            device_memory: true,
            sec_ch_ua_brand: true,
            accept_encoding: false,
        }
    }
}
