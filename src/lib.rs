//! LDAP schema model and entry conformance validator for Rust.
//!
//! Parses the definitions a directory server publishes in its subschema entry
//! (RFC 4512), builds an inheritance-aware schema from them, and checks
//! directory entries against that schema.
//!
//! # Core Components
//!
//! - [`Schema`] - Immutable, indexed view of a subschema entry
//! - [`EntryValidator`] - Configurable, shareable entry checker with running statistics
//! - [`MatchingRuleRegistry`] - Equality matching rules used for syntax checks
//! - [`Entry`] - A directory entry with raw attribute values
//!
//! # Quick Start
//!
//! ```rust
//! use std::sync::Arc;
//! use ldap_schema::{Entry, EntryValidator, Schema};
//!
//! let validator = EntryValidator::new(Arc::new(Schema::load_default()));
//! let entry = Entry::new("cn=Printer,dc=example,dc=com")
//!     .with_attribute("objectClass", ["top", "device"])
//!     .with_attribute("cn", ["Printer"])
//!     .with_attribute("serialNumber", ["A-1", "B-2"]);
//!
//! let mut reasons = Vec::new();
//! assert!(validator.entry_is_valid(&entry, &mut reasons));
//! assert!(reasons.is_empty());
//! ```

pub mod dn;
pub mod entry;
pub mod error;
pub mod ldif;
pub mod matching;
pub mod schema;
pub mod validation;

// Re-export commonly used types for convenience
pub use dn::{Dn, Rdn};
pub use entry::{Attribute, Entry};
pub use error::{
    DnError, EntryViolation, LdifError, MatchingRuleError, SchemaError, SchemaResult,
    ViolationCategory,
};
pub use matching::{MatchingRule, MatchingRuleRegistry};
pub use schema::{DefinitionKind, Schema, SchemaElement};
pub use validation::{EntryValidator, ValidationOutcome, ValidationStatistics, ValidatorConfig};
