//! Entry validation tests.
//!
//! These tests drive [`EntryValidator`](ldap_schema::EntryValidator) through its
//! public API only, against the schemas in [`crate::common::fixtures`].

pub mod attributes;
pub mod rdn;
pub mod statistics;
pub mod structure;
