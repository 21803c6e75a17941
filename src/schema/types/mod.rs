//! Schema definition value types.
//!
//! This module contains one immutable value type per RFC 4512 definition kind,
//! together with the small enumerations they share. Each type can be parsed from
//! its textual form or assembled with a builder, and always carries its canonical
//! rendering.

use serde::{Deserialize, Serialize};
use std::fmt;

pub mod attribute_syntax;
pub mod attribute_type;
pub mod dit_content_rule;
pub mod dit_structure_rule;
pub mod matching_rule;
pub mod matching_rule_use;
pub mod name_form;
pub mod object_class;

pub use attribute_syntax::AttributeSyntaxDefinition;
pub use attribute_type::{AttributeTypeBuilder, AttributeTypeDefinition};
pub use dit_content_rule::{DitContentRuleBuilder, DitContentRuleDefinition};
pub use dit_structure_rule::{DitStructureRuleBuilder, DitStructureRuleDefinition};
pub use matching_rule::MatchingRuleDefinition;
pub use matching_rule_use::MatchingRuleUseDefinition;
pub use name_form::{NameFormBuilder, NameFormDefinition};
pub use object_class::{ObjectClassBuilder, ObjectClassDefinition};

/// The kind of an object class.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ObjectClassType {
    Abstract,
    Structural,
    Auxiliary,
}

impl ObjectClassType {
    /// Keyword used in the definition string.
    pub fn name(self) -> &'static str {
        match self {
            Self::Abstract => "ABSTRACT",
            Self::Structural => "STRUCTURAL",
            Self::Auxiliary => "AUXILIARY",
        }
    }

    pub fn from_name(name: &str) -> Option<Self> {
        [Self::Abstract, Self::Structural, Self::Auxiliary]
            .into_iter()
            .find(|t| t.name().eq_ignore_ascii_case(name))
    }
}

impl fmt::Display for ObjectClassType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// The usage of an attribute type.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum AttributeUsage {
    #[default]
    UserApplications,
    DirectoryOperation,
    DistributedOperation,
    DsaOperation,
}

impl AttributeUsage {
    /// Keyword used in the definition string.
    pub fn name(self) -> &'static str {
        match self {
            Self::UserApplications => "userApplications",
            Self::DirectoryOperation => "directoryOperation",
            Self::DistributedOperation => "distributedOperation",
            Self::DsaOperation => "dSAOperation",
        }
    }

    pub fn from_name(name: &str) -> Option<Self> {
        [
            Self::UserApplications,
            Self::DirectoryOperation,
            Self::DistributedOperation,
            Self::DsaOperation,
        ]
        .into_iter()
        .find(|u| u.name().eq_ignore_ascii_case(name))
    }

    /// Every usage other than `userApplications` is operational.
    pub fn is_operational(self) -> bool {
        self != Self::UserApplications
    }
}

impl fmt::Display for AttributeUsage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// The eight kinds of definitions published in a subschema entry.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum DefinitionKind {
    AttributeSyntax,
    AttributeType,
    ObjectClass,
    DitContentRule,
    DitStructureRule,
    MatchingRule,
    MatchingRuleUse,
    NameForm,
}

impl DefinitionKind {
    pub const ALL: [DefinitionKind; 8] = [
        Self::AttributeSyntax,
        Self::AttributeType,
        Self::ObjectClass,
        Self::DitContentRule,
        Self::DitStructureRule,
        Self::MatchingRule,
        Self::MatchingRuleUse,
        Self::NameForm,
    ];

    /// Name of the subschema attribute holding definitions of this kind.
    pub fn attribute_name(self) -> &'static str {
        match self {
            Self::AttributeSyntax => "ldapSyntaxes",
            Self::AttributeType => "attributeTypes",
            Self::ObjectClass => "objectClasses",
            Self::DitContentRule => "dITContentRules",
            Self::DitStructureRule => "dITStructureRules",
            Self::MatchingRule => "matchingRules",
            Self::MatchingRuleUse => "matchingRuleUse",
            Self::NameForm => "nameForms",
        }
    }

    pub fn from_attribute_name(name: &str) -> Option<Self> {
        Self::ALL
            .into_iter()
            .find(|k| k.attribute_name().eq_ignore_ascii_case(name))
    }

    /// Parse `definition` as this kind, discarding the result.
    pub fn check_definition(self, definition: &str) -> crate::error::SchemaResult<()> {
        match self {
            Self::AttributeSyntax => AttributeSyntaxDefinition::parse(definition).map(drop),
            Self::AttributeType => AttributeTypeDefinition::parse(definition).map(drop),
            Self::ObjectClass => ObjectClassDefinition::parse(definition).map(drop),
            Self::DitContentRule => DitContentRuleDefinition::parse(definition).map(drop),
            Self::DitStructureRule => DitStructureRuleDefinition::parse(definition).map(drop),
            Self::MatchingRule => MatchingRuleDefinition::parse(definition).map(drop),
            Self::MatchingRuleUse => MatchingRuleUseDefinition::parse(definition).map(drop),
            Self::NameForm => NameFormDefinition::parse(definition).map(drop),
        }
    }
}

/// Builder methods for the fields shared by every definition kind.
macro_rules! common_builder_methods {
    () => {
        /// Add a name. The first name added is the preferred name.
        pub fn name(mut self, name: impl Into<String>) -> Self {
            self.common.names.push(name.into());
            self
        }

        pub fn description(mut self, description: impl Into<String>) -> Self {
            self.common.description = Some(description.into());
            self
        }

        pub fn obsolete(mut self, obsolete: bool) -> Self {
            self.common.obsolete = obsolete;
            self
        }

        pub fn extension(mut self, name: impl Into<String>, values: Vec<String>) -> Self {
            self.common.extensions.insert(name, values);
            self
        }
    };
}

/// Implement [`SchemaElement`](crate::schema::SchemaElement), `Display` and the
/// string conversions for a definition type. Serde uses the definition string as
/// the serialized form, so deserialization re-parses and re-validates it.
macro_rules! schema_element {
    ($ty:ident, $kind:literal, $id:ident) => {
        impl $crate::schema::element::SchemaElement for $ty {
            const KIND: &'static str = $kind;

            fn identifier(&self) -> &str {
                &self.$id
            }

            fn names(&self) -> &[String] {
                &self.common.names
            }

            fn description(&self) -> Option<&str> {
                self.common.description.as_deref()
            }

            fn is_obsolete(&self) -> bool {
                self.common.obsolete
            }

            fn extensions(&self) -> &$crate::schema::element::Extensions {
                &self.common.extensions
            }

            fn definition_string(&self) -> &str {
                &self.definition
            }
        }

        impl std::fmt::Display for $ty {
            fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
                f.write_str(&self.definition)
            }
        }

        impl std::str::FromStr for $ty {
            type Err = $crate::error::SchemaError;

            fn from_str(s: &str) -> Result<Self, Self::Err> {
                Self::parse(s)
            }
        }

        impl TryFrom<String> for $ty {
            type Error = $crate::error::SchemaError;

            fn try_from(value: String) -> Result<Self, Self::Error> {
                Self::parse(&value)
            }
        }

        impl From<$ty> for String {
            fn from(value: $ty) -> String {
                value.definition
            }
        }
    };
}

pub(crate) use common_builder_methods;
pub(crate) use schema_element;

/// Wrap a grammar failure with the definition kind and text.
pub(crate) fn decode_failure(
    kind: &'static str,
    definition: &str,
) -> impl FnOnce(crate::error::DecodeError) -> crate::error::SchemaError {
    move |source| crate::error::SchemaError::Decode {
        kind,
        definition: definition.to_string(),
        source,
    }
}

pub(crate) fn missing_field(kind: &'static str, message: &str) -> crate::error::SchemaError {
    crate::error::SchemaError::InvalidDefinition {
        kind,
        message: message.to_string(),
    }
}

/// Collects the NAME, DESC, OBSOLETE and `X-` elements every kind accepts.
#[derive(Debug, Default)]
pub(crate) struct CommonDecoder {
    names: Option<Vec<String>>,
    description: Option<String>,
    obsolete: bool,
    extensions: crate::schema::element::Extensions,
}

impl CommonDecoder {
    /// Consume the token's value if it is a shared element. Returns `false` for
    /// tokens the caller must handle itself.
    pub(crate) fn accept(
        &mut self,
        keyword: &str,
        token: &str,
        reader: &mut crate::schema::grammar::DefinitionReader,
    ) -> crate::error::DecodeResult<bool> {
        use crate::schema::grammar::{read_extension, set_flag, set_once};
        match keyword {
            "NAME" => {
                let names = reader.read_qdstrings()?;
                set_once(&mut self.names, names, "NAME", reader)?;
            }
            "DESC" => {
                let description = reader.read_qdstring()?;
                set_once(&mut self.description, description, "DESC", reader)?;
            }
            "OBSOLETE" => set_flag(&mut self.obsolete, "OBSOLETE", reader)?,
            ext if ext.starts_with("X-") => read_extension(reader, token, &mut self.extensions)?,
            _ => return Ok(false),
        }
        Ok(true)
    }

    pub(crate) fn finish(self) -> crate::schema::element::CommonFields {
        crate::schema::element::CommonFields {
            names: self.names.unwrap_or_default(),
            description: self.description,
            obsolete: self.obsolete,
            extensions: self.extensions,
        }
    }
}

/// Render `( oid NAME ... DESC ... OBSOLETE`, the opening of every definition.
pub(crate) fn render_head(oid: &str, common: &crate::schema::element::CommonFields) -> String {
    use crate::schema::grammar::{render_flag, render_qdstring, render_qdstrings};
    let mut out = format!("( {oid}");
    render_qdstrings(&mut out, "NAME", &common.names);
    render_qdstring(&mut out, "DESC", common.description.as_deref());
    render_flag(&mut out, "OBSOLETE", common.obsolete);
    out
}

/// Render the extensions and the closing parenthesis.
pub(crate) fn render_tail(mut out: String, common: &crate::schema::element::CommonFields) -> String {
    crate::schema::grammar::render_extensions(&mut out, &common.extensions);
    out.push_str(" )");
    out
}
