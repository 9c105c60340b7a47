//! Shared types for the portcullis workspace.
//!
//! Holds the error type, the canonical client address key and the prelude
//! that the core, email and server crates build on.

#![deny(clippy::unwrap_used, clippy::expect_used, clippy::panic)]
#![forbid(unsafe_code)]

pub mod address;
pub mod error;
pub mod prelude;

pub use address::AddressKey;
pub use error::{Error, PcResult};

/// Milliseconds on a monotonic clock
pub type Millis = u64;

// vim: ts=4
