pub use portcullis_types::prelude::*;

// vim: ts=4
