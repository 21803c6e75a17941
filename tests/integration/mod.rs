//! Integration tests.
//!
//! End-to-end scenarios: loading schemas from LDIF, the bundled default schema,
//! definition round trips and sharing one validator between threads.

pub mod concurrency;
pub mod default_schema;
pub mod ldif_loading;
pub mod round_trip;
