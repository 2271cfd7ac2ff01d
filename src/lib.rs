//! Header Checker Agent for Zentinel
//!
//! Flags requests whose headers are inconsistent with the browser they claim
//! to come from, and returns a single suspicious/not-suspicious verdict for
//! the next proxy stage.
//!
//! # Features
//!
//! - Browser detection (Chrome, Edge, Firefox, Brave)
//! - Client Hint consistency (versions, platform, device memory, brands)
//! - Accept and Fetch Metadata reference matching per request type
//! - Reduced and stale User-Agent detection
//! - Header-count ranges per browser
//!
//! # Example
//!
//! ```ignore
//! use zentinel_agent_header_checker::{HeaderChecker, RequestHeaderSnapshot};
//!
//! let checker = HeaderChecker::with_defaults();
//! let request = RequestHeaderSnapshot::new("GET", "/")
//!     .with_header("User-Agent", "Mozilla/5.0 ...")
//!     .with_header("Accept", "*/*");
//!
//! let verdict = checker.evaluate(&request);
//! for (name, value) in checker.annotations(&verdict) {
//!     println!("{name}: {value}");
//! }
//! ```

pub mod browser;
pub mod checker;
pub mod config;
pub mod error;
pub mod request;
pub mod signals;
pub mod validators;
pub mod verdict;
pub mod version;

pub use browser::BrowserKind;
pub use checker::HeaderChecker;
pub use config::HeaderCheckerConfig;
pub use error::ConfigError;
pub use request::RequestHeaderSnapshot;
pub use signals::{RequestClass, Signals};
pub use verdict::{OutcomeKind, ValidationOutcome, Verdict};
