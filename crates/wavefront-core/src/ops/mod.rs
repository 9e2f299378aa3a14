//! One operation per automation module: read alerts, converge sources and
//! their tags, and manage events.
//!
//! Every operation performs at most one read followed by zero or one write,
//! and returns a result record whose `changed` flag reports whether the write
//! happened.

pub mod alert;
pub mod event;
pub mod source;
pub mod source_tags;

pub use alert::{AlertOutcome, get_alert};
pub use event::{EventOutcome, run_event};
pub use source::{SourceOutcome, apply_source};
pub use source_tags::{SourceTagsOutcome, apply_source_tags};
