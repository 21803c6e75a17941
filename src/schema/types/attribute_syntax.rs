//! Attribute syntax definitions (`ldapSyntaxes`).

use super::{decode_failure, missing_field, schema_element};
use crate::error::{DecodeResult, SchemaResult};
use crate::schema::element::{CommonFields, Extensions};
use crate::schema::grammar::{
    self, DefinitionReader, read_extension, render_extensions, render_qdstring,
};
use serde::{Deserialize, Serialize};

/// An attribute syntax: an OID, an optional description and extensions.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct AttributeSyntaxDefinition {
    oid: String,
    common: CommonFields,
    definition: String,
}

impl AttributeSyntaxDefinition {
    /// Create a syntax definition from its parts.
    pub fn new(
        oid: impl Into<String>,
        description: Option<String>,
        extensions: Extensions,
    ) -> SchemaResult<Self> {
        let oid = oid.into();
        if oid.is_empty() {
            return Err(missing_field("attribute syntax", "an OID is required"));
        }
        Ok(Self::from_parts(
            oid,
            CommonFields {
                description,
                extensions,
                ..CommonFields::default()
            },
        ))
    }

    /// Parse a definition string such as
    /// `( 1.3.6.1.4.1.1466.115.121.1.15 DESC 'Directory String' )`.
    pub fn parse(definition: &str) -> SchemaResult<Self> {
        Self::decode(definition).map_err(decode_failure("attribute syntax", definition))
    }

    fn decode(definition: &str) -> DecodeResult<Self> {
        let mut reader = DefinitionReader::new(definition)?;
        let oid = reader.read_oid()?;
        let mut description = None;
        let mut extensions = Extensions::new();

        while let Some(token) = reader.next_keyword()? {
            match token.to_ascii_uppercase().as_str() {
                "DESC" => {
                    let value = reader.read_qdstring()?;
                    grammar::set_once(&mut description, value, "DESC", &reader)?;
                }
                ext if ext.starts_with("X-") => read_extension(&mut reader, &token, &mut extensions)?,
                _ => return Err(reader.error(format!("unrecognized token '{token}'"))),
            }
        }

        Ok(Self::from_parts(
            oid,
            CommonFields {
                description,
                extensions,
                ..CommonFields::default()
            },
        ))
    }

    fn from_parts(oid: String, common: CommonFields) -> Self {
        let mut definition = format!("( {oid}");
        render_qdstring(&mut definition, "DESC", common.description.as_deref());
        render_extensions(&mut definition, &common.extensions);
        definition.push_str(" )");
        Self {
            oid,
            common,
            definition,
        }
    }

    pub fn oid(&self) -> &str {
        &self.oid
    }
}

schema_element!(AttributeSyntaxDefinition, "attribute syntax", oid);

impl PartialEq for AttributeSyntaxDefinition {
    fn eq(&self, other: &Self) -> bool {
        self.oid.eq_ignore_ascii_case(&other.oid) && self.common.same_as(&other.common)
    }
}

impl Eq for AttributeSyntaxDefinition {}
