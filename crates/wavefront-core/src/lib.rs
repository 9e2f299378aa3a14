//! Wavefront API client and idempotent reconciliation of sources and tags.
//!
//! The reconciler ([`reconcile`]) is pure: it compares observed state with a
//! partial desired state and yields at most one write call plus a `changed`
//! flag. The operations in [`ops`] wire it to [`client::WavefrontClient`] and
//! produce the result records automation hosts register.

pub mod client;
pub mod error;
pub mod event;
pub mod model;
pub mod module;
pub mod ops;
pub mod params;
pub mod reconcile;

pub use client::WavefrontClient;
pub use error::{ErrorCategory, Result, WavefrontError};
pub use model::{Source, TagSet};
pub use module::{ModuleKind, failure_record, run_module};
pub use params::{
    AlertParams, Connection, DEFAULT_ENDPOINT, EventParams, SourceParams, SourceTagsParams,
};
pub use reconcile::{
    DesiredState, TagReconciliation, TagState, reconcile_attributes, reconcile_tags,
};
