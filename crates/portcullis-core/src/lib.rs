//! Core infrastructure for the portcullis contact service.
//!
//! This crate contains the process-wide shared context, the configuration
//! view, and the abuse-mitigation pipeline that guards expensive endpoints:
//! a sliding-window frequency limiter, a breach ledger, and the server
//! blacklist they escalate into.

#![deny(clippy::unwrap_used, clippy::expect_used, clippy::panic)]
#![forbid(unsafe_code)]

pub mod app;
pub mod clock;
pub mod context;
pub mod prelude;
pub mod rate_limit;
pub mod settings;

pub use app::{App, AppOpts, AppState, ServerMode};
pub use clock::MonotonicClock;
pub use context::{SharedContext, Tag};
pub use settings::Config;

// vim: ts=4
