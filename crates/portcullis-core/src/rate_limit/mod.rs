//! Abuse-mitigation pipeline
//!
//! Guards expensive endpoints with a sliding-window frequency limiter keyed
//! by client address. Refusals are counted in a breach ledger, and repeat
//! offenders are escalated into the server-wide blacklist.

mod admission;
mod blacklist;
mod config;
mod error;
mod extractors;
mod ledger;
mod limiter;
mod middleware;

pub use admission::{AdmissionController, Decision, BREACH_MAP_TAG, DOS_TABLE_TAG};
pub use blacklist::{Blacklist, BlacklistInsert};
pub use config::{
	AdmissionConfig, DEFAULT_BLACKLIST_LIMIT, DEFAULT_LIMIT, DEFAULT_REFUSAL_DELAY, DEFAULT_WINDOW,
	EXPIRE_AFTER,
};
pub use error::{RefuseReason, Refusal, DOS_MESSAGE};
pub use extractors::{client_key, extract_client_ip, ClientKey};
pub use ledger::BreachLedger;
pub use limiter::FrequencyLimiter;
pub use middleware::BlacklistLayer;

// vim: ts=4
