//! Client Hint consistency checks for Chromium browsers.
//!
//! Chrome and Edge announce their identity twice: once in the User-Agent and
//! again in the `Sec-Ch-*` headers. Automation frameworks that patch one but
//! not the other are caught here.

use super::{ValidationContext, Validator};
use crate::browser::is_brave;
use crate::request::names;
use crate::verdict::ValidationOutcome;
use crate::version::ClientHintVersions;
use std::str::Chars;

/// Brands a mainstream Chromium `Sec-Ch-Ua` must mention (lower-case).
pub const ALLOWED_BRANDS: &[&str] = &["google chrome", "microsoft edge", "brave"];

/// The only Linux platform token reduced Chromium UAs carry.
pub const LINUX_DESKTOP_TOKEN: &str = "X11; Linux x86_64";

/// Platform version reported by genuine Windows 11 Chromium builds.
pub const EXPECTED_WINDOWS_PLATFORM_VERSION: &str = "19.0.0";

/// Full-version, full-version-list, UA and brand versions must all agree.
pub struct ClientHintVersionValidator;

impl Validator for ClientHintVersionValidator {
    fn name(&self) -> &'static str {
        "client_hint_versions"
    }

    fn applies(&self, ctx: &ValidationContext<'_>) -> bool {
        ctx.browser.is_chromium_family()
    }

    fn check(&self, ctx: &ValidationContext<'_>) -> ValidationOutcome {
        let signals = &ctx.signals;
        let versions = ClientHintVersions::extract(signals);

        // Brave strips most version hints
        if versions.full_version.is_empty()
            && is_brave(signals.sec_ch_ua, signals.sec_ch_ua_full_version_list)
        {
            return self
                .pass("brave_versions_omitted")
                .with_detail(names::SEC_CH_UA, signals.sec_ch_ua);
        }

        let outcome = if versions.all_match() {
            self.pass("versions_match")
        } else {
            self.fail("version_mismatch")
        };

        outcome
            .with_detail("full_version", versions.full_version)
            .with_detail("full_version_list", versions.full_version_list)
            .with_detail("user_agent", versions.user_agent)
            .with_detail("brand", versions.brand)
    }
}

/// A Linux platform hint requires the reduced desktop Linux UA token.
pub struct LinuxPlatformValidator;

impl Validator for LinuxPlatformValidator {
    fn name(&self) -> &'static str {
        "linux_platform"
    }

    fn applies(&self, ctx: &ValidationContext<'_>) -> bool {
        ctx.browser.is_chromium_family()
            && ctx.signals.sec_ch_ua_platform.to_lowercase().contains("linux")
    }

    fn check(&self, ctx: &ValidationContext<'_>) -> ValidationOutcome {
        if ctx.signals.user_agent.contains(LINUX_DESKTOP_TOKEN) {
            self.pass("linux_desktop_user_agent")
        } else {
            self.fail("linux_platform_user_agent_mismatch")
                .with_detail(names::USER_AGENT, ctx.signals.user_agent)
                .with_detail(names::SEC_CH_UA, ctx.signals.sec_ch_ua)
        }
    }
}

/// Remove one layer of quoting from a `"..."`, `'c'` or backtick literal.
///
/// Escapes follow the usual C-like grammar: the single-letter escapes,
/// `\xNN`, `\uNNNN`, `\UNNNNNNNN` and three-digit octal `\NNN`. Values that
/// are not a well-formed literal are returned unchanged.
pub fn unquote_once(s: &str) -> String {
    try_unquote(s).unwrap_or_else(|| s.to_string())
}

fn try_unquote(s: &str) -> Option<String> {
    let bytes = s.as_bytes();
    if bytes.len() < 2 || !matches!(bytes[0], b'"' | b'\'' | b'`') {
        return None;
    }
    let quote = bytes[0];
    if bytes[bytes.len() - 1] != quote {
        return None;
    }

    // Both ends are ASCII, so slicing stays on char boundaries
    let inner = &s[1..s.len() - 1];
    match quote {
        b'`' => (!inner.contains('`')).then(|| inner.replace('\r', "")),
        b'"' => unescape(inner, '"'),
        _ => unescape(inner, '\'').filter(|rune| rune.chars().count() == 1),
    }
}

fn unescape(inner: &str, quote: char) -> Option<String> {
    // \x and octal escapes yield raw bytes, which may not be UTF-8 on their own
    let mut out: Vec<u8> = Vec::with_capacity(inner.len());
    let mut chars = inner.chars();

    while let Some(c) = chars.next() {
        match c {
            '\n' => return None,
            c if c == quote => return None,
            '\\' => decode_escape(&mut chars, quote, &mut out)?,
            c => push_char(&mut out, c),
        }
    }

    Some(String::from_utf8_lossy(&out).into_owned())
}

fn decode_escape(chars: &mut Chars<'_>, quote: char, out: &mut Vec<u8>) -> Option<()> {
    let c = chars.next()?;
    match c {
        'a' => out.push(0x07),
        'b' => out.push(0x08),
        'f' => out.push(0x0C),
        'n' => out.push(b'\n'),
        'r' => out.push(b'\r'),
        't' => out.push(b'\t'),
        'v' => out.push(0x0B),
        '\\' => out.push(b'\\'),
        // A quote escape is only valid inside its own kind of literal
        '\'' | '"' if c == quote => push_char(out, c),
        'x' => out.push(u8::try_from(radix_digits(chars, 16, 2, 0)?).ok()?),
        'u' => push_char(out, char::from_u32(radix_digits(chars, 16, 4, 0)?)?),
        'U' => push_char(out, char::from_u32(radix_digits(chars, 16, 8, 0)?)?),
        '0'..='7' => {
            let first = c.to_digit(8)?;
            out.push(u8::try_from(radix_digits(chars, 8, 2, first)?).ok()?);
        }
        _ => return None,
    }
    Some(())
}

/// Fold exactly `count` more digits of `radix` onto `init`.
fn radix_digits(chars: &mut Chars<'_>, radix: u32, count: usize, init: u32) -> Option<u32> {
    (0..count).try_fold(init, |acc, _| Some(acc * radix + chars.next()?.to_digit(radix)?))
}

fn push_char(out: &mut Vec<u8>, c: char) {
    let mut buf = [0u8; 4];
    out.extend_from_slice(c.encode_utf8(&mut buf).as_bytes());
}

fn has_outer_whitespace(s: &str) -> bool {
    s != s.trim()
}

/// Windows platform version check.
///
/// Passes when the platform hint is not Windows. When it is, the
/// platform version must be [`EXPECTED_WINDOWS_PLATFORM_VERSION`]. Both
/// raw values must be free of surrounding whitespace.
pub fn validate_windows_platform_version(platform: &str, platform_version: &str) -> bool {
    windows_platform_reason(platform, platform_version).0
}

fn windows_platform_reason(platform: &str, platform_version: &str) -> (bool, &'static str) {
    if has_outer_whitespace(platform) || has_outer_whitespace(platform_version) {
        return (false, "platform_hint_whitespace");
    }

    let platform = unquote_once(platform);
    if platform.is_empty() {
        return (true, "no_platform_hint");
    }
    if platform != "\"Windows\"" {
        return (true, "not_windows");
    }

    if unquote_once(platform_version) == EXPECTED_WINDOWS_PLATFORM_VERSION {
        (true, "windows_platform_version_ok")
    } else {
        (false, "windows_platform_version_mismatch")
    }
}

pub struct WindowsPlatformVersionValidator;

impl Validator for WindowsPlatformVersionValidator {
    fn name(&self) -> &'static str {
        "windows_platform_version"
    }

    fn applies(&self, ctx: &ValidationContext<'_>) -> bool {
        ctx.browser.is_chromium_family()
    }

    fn check(&self, ctx: &ValidationContext<'_>) -> ValidationOutcome {
        let platform = ctx.signals.sec_ch_ua_platform;
        let version = ctx.signals.sec_ch_ua_platform_version;
        let (passed, reason) = windows_platform_reason(platform, version);

        let outcome = if passed { self.pass(reason) } else { self.fail(reason) };
        outcome
            .with_detail(names::SEC_CH_UA_PLATFORM, platform)
            .with_detail(names::SEC_CH_UA_PLATFORM_VERSION, version)
    }
}

/// `Sec-Ch-Device-Memory` must be present and equal to `8`. Brave omits it.
pub struct DeviceMemoryValidator;

impl Validator for DeviceMemoryValidator {
    fn name(&self) -> &'static str {
        "device_memory"
    }

    fn applies(&self, ctx: &ValidationContext<'_>) -> bool {
        ctx.browser.is_chromium_family()
    }

    fn check(&self, ctx: &ValidationContext<'_>) -> ValidationOutcome {
        let signals = &ctx.signals;
        let memory = signals.sec_ch_device_memory;

        if memory.trim().is_empty() {
            return if is_brave(signals.sec_ch_ua, signals.sec_ch_ua_full_version_list) {
                self.pass("brave_device_memory_omitted")
            } else {
                self.fail("missing_device_memory")
            };
        }

        if memory == "8" {
            self.pass("device_memory_ok")
        } else {
            self.fail("unexpected_device_memory")
                .with_detail(names::SEC_CH_DEVICE_MEMORY, memory)
        }
    }
}

/// `Sec-Ch-Ua` must name a mainstream brand. Headless and bare Chromium
/// builds only announce "Chromium".
pub struct SecChUaBrandValidator;

impl SecChUaBrandValidator {
    pub fn has_allowed_brand(sec_ch_ua: &str) -> bool {
        let lower = sec_ch_ua.to_lowercase();
        !sec_ch_ua.is_empty() && ALLOWED_BRANDS.iter().any(|brand| lower.contains(brand))
    }
}

impl Validator for SecChUaBrandValidator {
    fn name(&self) -> &'static str {
        "sec_ch_ua_brand"
    }

    fn applies(&self, ctx: &ValidationContext<'_>) -> bool {
        ctx.browser.is_chromium_family()
    }

    fn check(&self, ctx: &ValidationContext<'_>) -> ValidationOutcome {
        let sec_ch_ua = ctx.signals.sec_ch_ua;
        if Self::has_allowed_brand(sec_ch_ua) {
            self.pass("allowed_brand")
        } else {
            self.fail("automation_brand").with_detail(names::SEC_CH_UA, sec_ch_ua)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::browser::BrowserKind;
    use crate::validators::test_support::*;

    const CHROME_HINTS: &str = r#""Not(A:Brand";v="99", "Google Chrome";v="133", "Chromium";v="133""#;
    const CHROME_FULL_LIST: &str = r#""Not(A:Brand";v="99.0.0.0", "Google Chrome";v="133.0.6943.53", "Chromium";v="133.0.6943.53""#;
    const BRAVE_HINTS: &str = r#""Not(A:Brand";v="99", "Brave";v="133", "Chromium";v="133""#;

    fn check_chrome(validator: &dyn Validator, headers: &[(&str, &str)]) -> ValidationOutcome {
        let req = make_request("/", headers);
        let ctx = ValidationContext::with_browser(&req, BrowserKind::Chrome);
        validator.check(&ctx)
    }

    #[test]
    fn test_versions_match() {
        let outcome = check_chrome(
            &ClientHintVersionValidator,
            &[
                ("User-Agent", CHROME_LINUX_UA),
                ("Sec-Ch-Ua", CHROME_HINTS),
                ("Sec-Ch-Ua-Full-Version", "\"133.0.6943.53\""),
                ("Sec-Ch-Ua-Full-Version-List", CHROME_FULL_LIST),
            ],
        );
        assert!(outcome.passed, "{outcome:?}");
    }

    #[test]
    fn test_version_mismatch() {
        let outcome = check_chrome(
            &ClientHintVersionValidator,
            &[
                ("User-Agent", CHROME_LINUX_UA),
                ("Sec-Ch-Ua", CHROME_HINTS),
                ("Sec-Ch-Ua-Full-Version", "\"132.0.6834.110\""),
                ("Sec-Ch-Ua-Full-Version-List", CHROME_FULL_LIST),
            ],
        );
        assert!(!outcome.passed);
        assert_eq!(outcome.reason, "version_mismatch");
        assert_eq!(outcome.details.get("full_version"), Some(&"132".to_string()));
        assert_eq!(outcome.details.get("user_agent"), Some(&"133".to_string()));
    }

    #[test]
    fn test_missing_version_hints_fail() {
        let outcome = check_chrome(
            &ClientHintVersionValidator,
            &[("User-Agent", CHROME_LINUX_UA), ("Sec-Ch-Ua", CHROME_HINTS)],
        );
        assert!(!outcome.passed);
    }

    #[test]
    fn test_brave_exception() {
        let outcome = check_chrome(
            &ClientHintVersionValidator,
            &[("User-Agent", CHROME_LINUX_UA), ("Sec-Ch-Ua", BRAVE_HINTS)],
        );
        assert!(outcome.passed);
        assert_eq!(outcome.reason, "brave_versions_omitted");
    }

    #[test]
    fn test_linux_platform() {
        let req = make_request(
            "/",
            &[("User-Agent", CHROME_LINUX_UA), ("Sec-Ch-Ua-Platform", "\"Linux\"")],
        );
        let ctx = ValidationContext::with_browser(&req, BrowserKind::Chrome);
        assert!(LinuxPlatformValidator.applies(&ctx));
        assert!(LinuxPlatformValidator.check(&ctx).passed);

        let android = "Mozilla/5.0 (Linux; Android 10; K) AppleWebKit/537.36 (KHTML, like Gecko) Chrome/133.0.0.0 Mobile Safari/537.36";
        let req = make_request("/", &[("User-Agent", android), ("Sec-Ch-Ua-Platform", "\"Linux\"")]);
        let ctx = ValidationContext::with_browser(&req, BrowserKind::Chrome);
        assert!(!LinuxPlatformValidator.check(&ctx).passed);
    }

    #[test]
    fn test_linux_platform_only_for_linux_hint() {
        let req = make_request(
            "/",
            &[("User-Agent", CHROME_WINDOWS_UA), ("Sec-Ch-Ua-Platform", "\"Windows\"")],
        );
        let ctx = ValidationContext::with_browser(&req, BrowserKind::Chrome);
        assert!(!LinuxPlatformValidator.applies(&ctx));

        let req = make_request("/", &[("Sec-Ch-Ua-Platform", "\"Linux\"")]);
        let ctx = ValidationContext::with_browser(&req, BrowserKind::Firefox);
        assert!(!LinuxPlatformValidator.applies(&ctx));
    }

    #[test]
    fn test_unquote_once() {
        assert_eq!(unquote_once(r#""\"Windows\"""#), "\"Windows\"");
        assert_eq!(unquote_once("\"Windows\""), "Windows");
        assert_eq!(unquote_once("Windows"), "Windows");
        assert_eq!(unquote_once("`raw`"), "raw");
        assert_eq!(unquote_once("\""), "\"");
        assert_eq!(unquote_once(r#""bad\q""#), r#""bad\q""#);
        assert_eq!(unquote_once(r#""a"b""#), r#""a"b""#);
        assert_eq!(unquote_once(""), "");
    }

    #[test]
    fn test_unquote_numeric_escapes() {
        assert_eq!(unquote_once(r#""\x22Windows\x22""#), "\"Windows\"");
        assert_eq!(unquote_once(r#""\u0022Windows\u0022""#), "\"Windows\"");
        assert_eq!(unquote_once(r#""\U00000022Windows\U00000022""#), "\"Windows\"");
        assert_eq!(unquote_once(r#""\042Windows\042""#), "\"Windows\"");
        assert_eq!(unquote_once(r#""\U0001F600""#), "\u{1F600}");
        assert_eq!(unquote_once(r#""caf\u00e9""#), "caf\u{e9}");
    }

    #[test]
    fn test_unquote_rejects_invalid_escapes() {
        for literal in [
            r#""\xZZ""#,
            r#""\x2""#,
            r#""\ud800""#,
            r#""\U00110000""#,
            r#""\400""#,
            r#""\08""#,
            r#""\+f""#,
            r#""it\'s""#,
        ] {
            assert_eq!(unquote_once(literal), literal, "{literal} should stay quoted");
        }
    }

    #[test]
    fn test_unquote_rune_literals() {
        assert_eq!(unquote_once("'W'"), "W");
        assert_eq!(unquote_once(r"'\''"), "'");
        assert_eq!(unquote_once(r"'\x41'"), "A");
        assert_eq!(unquote_once(r"'\u00e9'"), "\u{e9}");
        assert_eq!(unquote_once("'ab'"), "'ab'");
        assert_eq!(unquote_once("''"), "''");
        assert_eq!(unquote_once(r#"'\"'"#), r#"'\"'"#);
        assert_eq!(unquote_once("'W\""), "'W\"");
    }

    #[test]
    fn test_windows_platform_version() {
        let cases = [
            (r#""\"Windows\"""#, "\"19.0.0\"", true),
            (r#""\"Windows\"""#, "\"18.0.0\"", false),
            (r#""\"Windows\"""#, "", false),
            ("\"macOS\"", "\"14.0.0\"", true),
            ("\"Android\"", "", true),
            ("", "", true),
            ("  \"Windows\"  ", "  \"19.0.0\"  ", false),
            ("  \"Windows\"  ", "  \"20.0.0\"  ", false),
            ("\"macOS\"", " \"14.0.0\"", false),
            (r#""\x22Windows\x22""#, "18.0.0", false),
            (r#""\x22Windows\x22""#, "19.0.0", true),
            (r#""\u0022Windows\u0022""#, "\"18.0.0\"", false),
            (r#""\042Windows\042""#, r#""\x31\x39.0.0""#, true),
            ("'W'", "18.0.0", true),
        ];

        for (platform, version, expected) in cases {
            assert_eq!(
                validate_windows_platform_version(platform, version),
                expected,
                "platform={platform:?} version={version:?}"
            );
        }
    }

    #[test]
    fn test_windows_validator_details() {
        let outcome = check_chrome(
            &WindowsPlatformVersionValidator,
            &[
                ("Sec-Ch-Ua-Platform", r#""\"Windows\"""#),
                ("Sec-Ch-Ua-Platform-Version", "\"15.0.0\""),
            ],
        );
        assert!(!outcome.passed);
        assert_eq!(outcome.reason, "windows_platform_version_mismatch");
        assert_eq!(
            outcome.details.get(names::SEC_CH_UA_PLATFORM_VERSION),
            Some(&"\"15.0.0\"".to_string())
        );
    }

    #[test]
    fn test_device_memory() {
        let ok = check_chrome(&DeviceMemoryValidator, &[("Sec-Ch-Device-Memory", "8")]);
        assert!(ok.passed);

        let low = check_chrome(&DeviceMemoryValidator, &[("Sec-Ch-Device-Memory", "4")]);
        assert_eq!(low.reason, "unexpected_device_memory");

        let missing = check_chrome(&DeviceMemoryValidator, &[("Sec-Ch-Ua", CHROME_HINTS)]);
        assert_eq!(missing.reason, "missing_device_memory");

        let brave = check_chrome(&DeviceMemoryValidator, &[("Sec-Ch-Ua", BRAVE_HINTS)]);
        assert!(brave.passed);

        let blank = check_chrome(&DeviceMemoryValidator, &[("Sec-Ch-Device-Memory", "  ")]);
        assert!(!blank.passed);
    }

    #[test]
    fn test_brand_allow_list() {
        assert!(SecChUaBrandValidator::has_allowed_brand(CHROME_HINTS));
        assert!(SecChUaBrandValidator::has_allowed_brand(BRAVE_HINTS));
        assert!(SecChUaBrandValidator::has_allowed_brand(
            r#""Microsoft Edge";v="133", "Chromium";v="133""#
        ));
        assert!(!SecChUaBrandValidator::has_allowed_brand(""));
        assert!(!SecChUaBrandValidator::has_allowed_brand(
            r#""Not;A=Brand";v="24", "Chromium";v="128""#
        ));
        assert!(!SecChUaBrandValidator::has_allowed_brand(
            r#""Not)A;Brand";v="8", "Chromium";v="138", "HeadlessChrome";v="138""#
        ));
    }

    #[test]
    fn test_brand_validator_reason() {
        let outcome = check_chrome(&SecChUaBrandValidator, &[]);
        assert_eq!(outcome.reason, "automation_brand");
    }
}
