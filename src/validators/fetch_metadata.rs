//! Fetch Metadata (`Sec-Fetch-*`) triad check.

use super::{ValidationContext, Validator};
use crate::request::names;
use crate::signals::RequestClass;
use crate::verdict::ValidationOutcome;

/// Expected `(site, mode, dest)` for a request class.
pub fn expected_triad(class: RequestClass) -> (&'static str, &'static str, &'static str) {
    match class {
        RequestClass::Image => ("same-origin", "no-cors", "image"),
        RequestClass::Script => ("same-origin", "no-cors", "script"),
        RequestClass::Document => ("none", "navigate", "document"),
    }
}

/// All three `Sec-Fetch-*` headers must be present and match the request class.
pub struct SecFetchValidator;

impl Validator for SecFetchValidator {
    fn name(&self) -> &'static str {
        "sec_fetch"
    }

    fn check(&self, ctx: &ValidationContext<'_>) -> ValidationOutcome {
        let s = &ctx.signals;
        let actual = (s.sec_fetch_site, s.sec_fetch_mode, s.sec_fetch_dest);

        if actual.0.is_empty() || actual.1.is_empty() || actual.2.is_empty() {
            return self
                .fail("missing_sec_fetch")
                .with_detail(names::SEC_FETCH_SITE, actual.0)
                .with_detail(names::SEC_FETCH_MODE, actual.1)
                .with_detail(names::SEC_FETCH_DEST, actual.2);
        }

        let expected = expected_triad(ctx.class);
        if actual == expected {
            self.pass("sec_fetch_matches").with_detail("class", ctx.class.as_str())
        } else {
            self.fail("sec_fetch_mismatch")
                .with_detail("class", ctx.class.as_str())
                .with_detail(names::SEC_FETCH_SITE, actual.0)
                .with_detail(names::SEC_FETCH_MODE, actual.1)
                .with_detail(names::SEC_FETCH_DEST, actual.2)
        }
    }
}
