//! Signal extraction.
//!
//! Projects the headers every validator reads out of a
//! [`RequestHeaderSnapshot`]. Absent headers become `""`.

use crate::request::{names, RequestHeaderSnapshot};
use serde::Serialize;

const IMAGE_EXTENSIONS: &[&str] = &[".ico", ".png", ".jpg", ".jpeg", ".gif", ".webp", ".avif"];
const SCRIPT_MIME_TYPES: &[&str] = &["application/javascript", "text/javascript"];

/// What a request appears to be fetching.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum RequestClass {
    Image,
    Script,
    Document,
}

impl RequestClass {
    /// Classify by path extension, Content-Type and Accept. Image wins over script.
    pub fn classify(path: &str, accept: &str, content_type: &str) -> Self {
        let path = path.to_ascii_lowercase();
        let content_type = content_type.to_ascii_lowercase();

        if IMAGE_EXTENSIONS.iter().any(|ext| path.ends_with(ext))
            || content_type.starts_with("image/")
        {
            return RequestClass::Image;
        }

        let accept = accept.to_ascii_lowercase();
        if path.ends_with(".js")
            || SCRIPT_MIME_TYPES.iter().any(|m| content_type.starts_with(m))
            || SCRIPT_MIME_TYPES.iter().any(|m| accept.contains(m))
        {
            return RequestClass::Script;
        }

        RequestClass::Document
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            RequestClass::Image => "image",
            RequestClass::Script => "script",
            RequestClass::Document => "document",
        }
    }
}

/// Header values read by the validator battery.
#[derive(Debug, Clone, Copy, Default)]
pub struct Signals<'a> {
    pub user_agent: &'a str,
    pub accept: &'a str,
    pub accept_language: &'a str,
    pub accept_encoding: &'a str,
    pub accept_charset: &'a str,
    pub content_type: &'a str,
    pub te: &'a str,
    pub sec_fetch_site: &'a str,
    pub sec_fetch_mode: &'a str,
    pub sec_fetch_dest: &'a str,
    pub sec_ch_ua: &'a str,
    pub sec_ch_ua_full_version: &'a str,
    pub sec_ch_ua_full_version_list: &'a str,
    pub sec_ch_ua_platform: &'a str,
    pub sec_ch_ua_platform_version: &'a str,
    pub sec_ch_device_memory: &'a str,
    pub path: &'a str,
}

impl<'a> Signals<'a> {
    pub fn extract(req: &'a RequestHeaderSnapshot) -> Self {
        Self {
            user_agent: req.header_or_empty(names::USER_AGENT),
            accept: req.header_or_empty(names::ACCEPT),
            accept_language: req.header_or_empty(names::ACCEPT_LANGUAGE),
            accept_encoding: req.header_or_empty(names::ACCEPT_ENCODING),
            accept_charset: req.header_or_empty(names::ACCEPT_CHARSET),
            content_type: req.header_or_empty(names::CONTENT_TYPE),
            te: req.header_or_empty(names::TE),
            sec_fetch_site: req.header_or_empty(names::SEC_FETCH_SITE),
            sec_fetch_mode: req.header_or_empty(names::SEC_FETCH_MODE),
            sec_fetch_dest: req.header_or_empty(names::SEC_FETCH_DEST),
            sec_ch_ua: req.header_or_empty(names::SEC_CH_UA),
            sec_ch_ua_full_version: req.header_or_empty(names::SEC_CH_UA_FULL_VERSION),
            sec_ch_ua_full_version_list: req.header_or_empty(names::SEC_CH_UA_FULL_VERSION_LIST),
            sec_ch_ua_platform: req.header_or_empty(names::SEC_CH_UA_PLATFORM),
            sec_ch_ua_platform_version: req.header_or_empty(names::SEC_CH_UA_PLATFORM_VERSION),
            sec_ch_device_memory: req.header_or_empty(names::SEC_CH_DEVICE_MEMORY),
            path: req.path(),
        }
    }

    pub fn request_class(&self) -> RequestClass {
        RequestClass::classify(self.path, self.accept, self.content_type)
    }
}
