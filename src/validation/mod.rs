//! Entry conformance checking.
//!
//! An [`EntryValidator`] checks entries against a [`Schema`](crate::schema::Schema)
//! in eight passes: the DN, object class resolution, the structural class,
//! required and optional attributes, each present attribute, auxiliary classes
//! allowed by a DIT content rule, and the RDN. Every violation found is
//! collected; validation never stops at the first one.
//!
//! # Key Types
//!
//! - [`EntryValidator`] - Shareable validator holding the schema, checks and statistics
//! - [`ValidatorConfig`] - Independently toggleable checks
//! - [`ValidationOutcome`] - Verdict and violations for one entry
//! - [`ValidationStatistics`] - Snapshot of the running counters

pub mod config;
mod counters;
pub mod validator;

pub use config::ValidatorConfig;
pub use counters::ValidationStatistics;
pub use validator::{EntryValidator, ValidationOutcome};
