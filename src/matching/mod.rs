//! Equality matching rules used for attribute syntax checks.
//!
//! The validator only needs one capability from a matching rule: normalizing a
//! raw value, which fails when the value does not conform to the rule's syntax.
//! Rules are collected in a [`MatchingRuleRegistry`] that is built once and
//! shared through an `Arc`.
//!
//! # Examples
//!
//! ```rust
//! use ldap_schema::matching::MatchingRuleRegistry;
//!
//! let registry = MatchingRuleRegistry::standard();
//! let rule = registry.get("caseIgnoreMatch").unwrap();
//! assert_eq!(rule.normalize(b"  Hello   World ").unwrap(), b"hello world");
//! assert!(registry.get("integerMatch").unwrap().normalize(b"12x").is_err());
//! ```

pub mod registry;
pub mod rules;

pub use registry::MatchingRuleRegistry;

use crate::error::MatchingRuleResult;
use std::fmt;

/// A matching rule that can normalize raw attribute values.
pub trait MatchingRule: fmt::Debug + Send + Sync {
    fn oid(&self) -> &str;

    /// Names of the rule; the first is the preferred name.
    fn names(&self) -> &[&str];

    /// Normalize a raw value, or fail if it is not valid for the rule's syntax.
    fn normalize(&self, value: &[u8]) -> MatchingRuleResult<Vec<u8>>;

    /// Compare two raw values after normalization.
    fn values_match(&self, first: &[u8], second: &[u8]) -> MatchingRuleResult<bool> {
        Ok(self.normalize(first)? == self.normalize(second)?)
    }

    fn name_or_oid(&self) -> &str {
        self.names().first().copied().unwrap_or_else(|| self.oid())
    }

    /// Whether `value` is the rule's OID or one of its names, ignoring case.
    fn has_name_or_oid(&self, value: &str) -> bool {
        self.oid().eq_ignore_ascii_case(value)
            || self.names().iter().any(|n| n.eq_ignore_ascii_case(value))
    }
}
