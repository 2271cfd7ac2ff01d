//! Read-only view of an incoming request.

use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// Header names read by the checker.
pub mod names {
    pub const USER_AGENT: &str = "user-agent";
    pub const ACCEPT: &str = "accept";
    pub const ACCEPT_LANGUAGE: &str = "accept-language";
    pub const ACCEPT_ENCODING: &str = "accept-encoding";
    pub const ACCEPT_CHARSET: &str = "accept-charset";
    pub const CONTENT_TYPE: &str = "content-type";
    pub const TE: &str = "te";
    pub const HOST: &str = "host";

    pub const SEC_FETCH_SITE: &str = "sec-fetch-site";
    pub const SEC_FETCH_MODE: &str = "sec-fetch-mode";
    pub const SEC_FETCH_DEST: &str = "sec-fetch-dest";

    pub const SEC_CH_UA: &str = "sec-ch-ua";
    pub const SEC_CH_UA_FULL_VERSION: &str = "sec-ch-ua-full-version";
    pub const SEC_CH_UA_FULL_VERSION_LIST: &str = "sec-ch-ua-full-version-list";
    pub const SEC_CH_UA_PLATFORM: &str = "sec-ch-ua-platform";
    pub const SEC_CH_UA_PLATFORM_VERSION: &str = "sec-ch-ua-platform-version";
    pub const SEC_CH_DEVICE_MEMORY: &str = "sec-ch-device-memory";
}

/// Serialized form accepted by [`RequestHeaderSnapshot`]'s `Deserialize`.
#[derive(Debug, Default, Deserialize)]
#[serde(default)]
struct RawSnapshot {
    method: String,
    path: String,
    query: String,
    headers: HashMap<String, HeaderValues>,
}

#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum HeaderValues {
    One(String),
    Many(Vec<String>),
}

/// Immutable per-request snapshot: method, path, raw query and headers.
///
/// Header names are stored lower-cased, so lookups are case-insensitive.
/// Values keep their original bytes and order.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(from = "RawSnapshot")]
pub struct RequestHeaderSnapshot {
    method: String,
    path: String,
    query: String,
    headers: HashMap<String, Vec<String>>,
}

impl From<RawSnapshot> for RequestHeaderSnapshot {
    fn from(raw: RawSnapshot) -> Self {
        let mut snapshot = Self::new(raw.method, raw.path);
        if !raw.query.is_empty() {
            snapshot.query = raw.query;
        }
        for (name, values) in raw.headers {
            match values {
                HeaderValues::One(value) => snapshot.push_header(&name, value),
                HeaderValues::Many(values) => {
                    for value in values {
                        snapshot.push_header(&name, value);
                    }
                }
            }
        }
        snapshot
    }
}

impl RequestHeaderSnapshot {
    /// Create a snapshot with no headers. A `?query` suffix on `path` is split off.
    pub fn new(method: impl Into<String>, path: impl Into<String>) -> Self {
        let path = path.into();
        let (path, query) = match path.split_once('?') {
            Some((p, q)) => (p.to_string(), q.to_string()),
            None => (path, String::new()),
        };
        Self {
            method: method.into(),
            path,
            query,
            headers: HashMap::new(),
        }
    }

    /// Build a snapshot from `(name, value)` pairs. Repeated names accumulate.
    pub fn from_pairs<I, K, V>(method: impl Into<String>, path: impl Into<String>, pairs: I) -> Self
    where
        I: IntoIterator<Item = (K, V)>,
        K: AsRef<str>,
        V: Into<String>,
    {
        let mut snapshot = Self::new(method, path);
        for (name, value) in pairs {
            snapshot.push_header(name.as_ref(), value.into());
        }
        snapshot
    }

    /// Add a header value.
    pub fn with_header(mut self, name: &str, value: impl Into<String>) -> Self {
        self.push_header(name, value.into());
        self
    }

    fn push_header(&mut self, name: &str, value: String) {
        self.headers
            .entry(name.to_ascii_lowercase())
            .or_default()
            .push(value);
    }

    pub fn method(&self) -> &str {
        &self.method
    }

    pub fn path(&self) -> &str {
        &self.path
    }

    pub fn query(&self) -> &str {
        &self.query
    }

    /// First value of a header, if present.
    pub fn header(&self, name: &str) -> Option<&str> {
        self.headers
            .get(&name.to_ascii_lowercase())
            .and_then(|v| v.first())
            .map(|s| s.as_str())
    }

    /// First value of a header, or `""` when absent.
    pub fn header_or_empty(&self, name: &str) -> &str {
        self.header(name).unwrap_or("")
    }

    /// Every value sent for a header, in arrival order.
    pub fn header_values(&self, name: &str) -> &[String] {
        self.headers
            .get(&name.to_ascii_lowercase())
            .map(|v| v.as_slice())
            .unwrap_or(&[])
    }

    /// Number of distinct header names, not counting `Host`.
    ///
    /// HTTP servers usually lift `Host` out of the header map, and the
    /// per-browser ranges are measured without it.
    pub fn header_count(&self) -> usize {
        self.headers.len() - usize::from(self.headers.contains_key(names::HOST))
    }

    pub fn headers(&self) -> &HashMap<String, Vec<String>> {
        &self.headers
    }
}
