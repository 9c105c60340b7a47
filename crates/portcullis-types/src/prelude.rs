pub use crate::address::AddressKey;
pub use crate::error::{Error, PcResult};
pub use crate::Millis;

pub use tracing::{debug, debug_span, error, error_span, info, info_span, warn, warn_span};

// vim: ts=4
