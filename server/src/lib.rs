//! Portcullis contact service
//!
//! A small web server with a single expensive endpoint: `POST /api/contact`
//! turns a submitted form into an email. The endpoint is guarded by the
//! admission pipeline of `portcullis-core`; addresses that keep hammering it
//! end up in the server blacklist and are refused before routing.

#![deny(clippy::unwrap_used, clippy::expect_used, clippy::panic)]
#![forbid(unsafe_code)]

pub mod app;
pub mod contact;
pub mod health;
pub mod prelude;
pub mod routes;

pub use app::AppBuilder;

// vim: ts=4
