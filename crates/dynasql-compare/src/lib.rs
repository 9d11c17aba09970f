//! Order-independent deep comparison and tagged JSON restoration.
//!
//! Fixtures are JSON documents that may carry envelopes such as
//! `{"py/tuple": [1, 2]}`. [`json_loads`] parses a document and restores
//! those envelopes bottom-up; [`compare`] then checks actual query results
//! against the restored fixture without caring about element order.

pub mod canonical;
pub mod compare;
pub mod error;
pub mod restore;
pub mod schema;

pub use canonical::Canonical;
pub use compare::{Comparison, compare, deep_equal};
pub use error::RestoreError;
pub use restore::{Envelope, json_loads, restore_json, to_json};
pub use schema::{dump_tokens, dumps_equal};
