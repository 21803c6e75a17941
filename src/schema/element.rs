//! The contract shared by every schema definition kind.
//!
//! Definitions are immutable values. Two definitions compare equal when their
//! semantic content matches: OIDs and names compare case-insensitively,
//! multi-valued fields ignore order, and extensions compare by name and value set.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Capability interface implemented by each definition kind.
pub trait SchemaElement: fmt::Display {
    /// Human-readable kind name used in errors and log messages.
    const KIND: &'static str;

    /// The element's identity: its numeric OID, or the rule ID for DIT structure rules.
    fn identifier(&self) -> &str;

    fn names(&self) -> &[String];

    fn description(&self) -> Option<&str>;

    fn is_obsolete(&self) -> bool;

    fn extensions(&self) -> &Extensions;

    /// Canonical RFC 4512 rendering, computed once when the value is built.
    fn definition_string(&self) -> &str;

    /// The first name if there is one, otherwise the identifier.
    fn name_or_oid(&self) -> &str {
        self.names()
            .first()
            .map(String::as_str)
            .unwrap_or_else(|| self.identifier())
    }

    /// Whether `value` matches the identifier or any name, ignoring case.
    fn has_name_or_oid(&self, value: &str) -> bool {
        self.identifier().eq_ignore_ascii_case(value)
            || self.names().iter().any(|n| n.eq_ignore_ascii_case(value))
    }
}

/// Ordered map of vendor `X-` extensions to their values.
///
/// Insertion order is preserved so rendering reproduces the source order.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Extensions(Vec<(String, Vec<String>)>);

impl Extensions {
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert or replace the values of an extension.
    pub fn insert(&mut self, name: impl Into<String>, values: Vec<String>) {
        let name = name.into();
        match self.0.iter_mut().find(|(n, _)| n.eq_ignore_ascii_case(&name)) {
            Some(entry) => entry.1 = values,
            None => self.0.push((name, values)),
        }
    }

    /// Values of the named extension, matched case-insensitively.
    pub fn get(&self, name: &str) -> Option<&[String]> {
        self.0
            .iter()
            .find(|(n, _)| n.eq_ignore_ascii_case(name))
            .map(|(_, v)| v.as_slice())
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &[String])> {
        self.0.iter().map(|(n, v)| (n.as_str(), v.as_slice()))
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl PartialEq for Extensions {
    fn eq(&self, other: &Self) -> bool {
        self.len() == other.len()
            && self.0.iter().all(|(name, values)| {
                other.get(name).is_some_and(|theirs| {
                    let mut mine = values.clone();
                    let mut theirs = theirs.to_vec();
                    mine.sort();
                    theirs.sort();
                    mine == theirs
                })
            })
    }
}

impl Eq for Extensions {}

impl<N: Into<String>> FromIterator<(N, Vec<String>)> for Extensions {
    fn from_iter<I: IntoIterator<Item = (N, Vec<String>)>>(iter: I) -> Self {
        let mut extensions = Self::new();
        for (name, values) in iter {
            extensions.insert(name, values);
        }
        extensions
    }
}

fn folded(values: &[String]) -> Vec<String> {
    let mut folded: Vec<String> = values.iter().map(|v| v.to_ascii_lowercase()).collect();
    folded.sort();
    folded.dedup();
    folded
}

/// Order-independent, case-insensitive comparison of name or OID lists.
pub(crate) fn same_identifiers(a: &[String], b: &[String]) -> bool {
    folded(a) == folded(b)
}

/// Case-insensitive comparison of an optional OID or descriptor.
pub(crate) fn same_identifier(a: Option<&str>, b: Option<&str>) -> bool {
    match (a, b) {
        (Some(a), Some(b)) => a.eq_ignore_ascii_case(b),
        (None, None) => true,
        _ => false,
    }
}

/// The fields every definition kind carries.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub(crate) struct CommonFields {
    pub names: Vec<String>,
    pub description: Option<String>,
    pub obsolete: bool,
    pub extensions: Extensions,
}

impl CommonFields {
    pub(crate) fn same_as(&self, other: &Self) -> bool {
        same_identifiers(&self.names, &other.names)
            && self.description == other.description
            && self.obsolete == other.obsolete
            && self.extensions == other.extensions
    }
}
