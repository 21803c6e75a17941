//! LDAP schema definitions and the schema aggregate.
//!
//! This module models the eight kinds of definitions a directory server
//! publishes in its subschema entry (RFC 4512 section 4.1) and indexes them in
//! a [`Schema`] for case-insensitive lookup.
//!
//! # Key Types
//!
//! - [`Schema`] - Immutable, indexed view of every definition in a subschema entry
//! - [`SchemaElement`] - Behavior shared by all definition kinds
//! - [`AttributeTypeDefinition`], [`ObjectClassDefinition`] and friends - Parsed definitions
//!
//! # Examples
//!
//! ```rust
//! use ldap_schema::schema::{ObjectClassType, Schema, SchemaElement};
//!
//! let schema = Schema::load_default();
//! let person = schema.object_class("inetOrgPerson").unwrap();
//! assert_eq!(person.object_class_type(&schema), ObjectClassType::Structural);
//! assert!(schema.attribute_type("mail").is_some());
//! ```

pub mod element;
pub mod embedded;
pub(crate) mod grammar;
pub mod registry;
pub mod types;


pub use element::{Extensions, SchemaElement};
pub use grammar::escape_qdstring;
pub use registry::{DEFAULT_SUBSCHEMA_DN, Schema};
pub use types::{
    AttributeSyntaxDefinition, AttributeTypeBuilder, AttributeTypeDefinition, AttributeUsage,
    DefinitionKind, DitContentRuleBuilder, DitContentRuleDefinition, DitStructureRuleBuilder,
    DitStructureRuleDefinition, MatchingRuleDefinition, MatchingRuleUseDefinition,
    NameFormBuilder, NameFormDefinition, ObjectClassBuilder, ObjectClassDefinition,
    ObjectClassType,
};
