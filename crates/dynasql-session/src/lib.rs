//! Labelled multi-session registry for dynasql.
//!
//! The registry is an owned context object: keywords receive it by `&mut`
//! rather than reaching for process-wide state. The query engine itself is an
//! external collaborator reached through the [`Connector`] and
//! [`QueryHandle`] traits.

pub mod config;
pub mod engine;
pub mod error;
pub mod registry;

pub use config::{Credentials, DEFAULT_PORT, SessionConfig};
pub use engine::{Connector, QueryHandle, QueryResponse, Rows};
pub use error::RegistryError;
pub use registry::{DuplicatePolicy, SessionRegistry, SlotSummary, normalize_label};
