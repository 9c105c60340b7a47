pub use portcullis_core::prelude::*;

// vim: ts=4
