//! Name form definitions (`nameForms`).
//!
//! A name form binds one structural object class to the attributes allowed in
//! the RDN of entries of that class.

use super::{
    CommonDecoder, common_builder_methods, decode_failure, missing_field, render_head,
    render_tail, schema_element,
};
use crate::error::{DecodeResult, SchemaResult};
use crate::schema::element::{CommonFields, same_identifiers};
use crate::schema::grammar::{DefinitionReader, render_oid, render_oids, set_once};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct NameFormDefinition {
    oid: String,
    common: CommonFields,
    structural_class: String,
    required_attributes: Vec<String>,
    optional_attributes: Vec<String>,
    definition: String,
}

/// Fluent builder for [`NameFormDefinition`].
#[derive(Debug, Clone, Default)]
pub struct NameFormBuilder {
    oid: String,
    common: CommonFields,
    structural_class: Option<String>,
    required_attributes: Vec<String>,
    optional_attributes: Vec<String>,
}

impl NameFormBuilder {
    common_builder_methods!();

    pub fn structural_class(mut self, class: impl Into<String>) -> Self {
        self.structural_class = Some(class.into());
        self
    }

    pub fn required_attribute(mut self, attribute: impl Into<String>) -> Self {
        self.required_attributes.push(attribute.into());
        self
    }

    pub fn optional_attribute(mut self, attribute: impl Into<String>) -> Self {
        self.optional_attributes.push(attribute.into());
        self
    }

    pub fn build(self) -> SchemaResult<NameFormDefinition> {
        if self.oid.is_empty() {
            return Err(missing_field("name form", "an OID is required"));
        }
        if self.required_attributes.is_empty() {
            return Err(missing_field("name form", "at least one MUST attribute is required"));
        }
        let Some(structural_class) = self.structural_class.clone() else {
            return Err(missing_field("name form", "an OC element is required"));
        };
        Ok(self.finish(structural_class))
    }

    fn finish(self, structural_class: String) -> NameFormDefinition {
        let mut definition = render_head(&self.oid, &self.common);
        render_oid(&mut definition, "OC", Some(structural_class.as_str()));
        render_oids(&mut definition, "MUST", &self.required_attributes);
        render_oids(&mut definition, "MAY", &self.optional_attributes);
        let definition = render_tail(definition, &self.common);

        NameFormDefinition {
            oid: self.oid,
            common: self.common,
            structural_class,
            required_attributes: self.required_attributes,
            optional_attributes: self.optional_attributes,
            definition,
        }
    }
}

impl NameFormDefinition {
    pub fn builder(oid: impl Into<String>) -> NameFormBuilder {
        NameFormBuilder {
            oid: oid.into(),
            ..NameFormBuilder::default()
        }
    }

    pub fn parse(definition: &str) -> SchemaResult<Self> {
        Self::decode(definition).map_err(decode_failure("name form", definition))
    }

    fn decode(definition: &str) -> DecodeResult<Self> {
        let mut reader = DefinitionReader::new(definition)?;
        let oid = reader.read_oid()?;
        let mut common = CommonDecoder::default();
        let mut class = None;
        let mut must = None;
        let mut may = None;

        while let Some(token) = reader.next_keyword()? {
            let keyword = token.to_ascii_uppercase();
            if common.accept(&keyword, &token, &mut reader)? {
                continue;
            }
            match keyword.as_str() {
                "OC" => {
                    let value = reader.read_oid()?;
                    set_once(&mut class, value, "OC", &reader)?;
                }
                "MUST" => {
                    let value = reader.read_oids()?;
                    set_once(&mut must, value, "MUST", &reader)?;
                }
                "MAY" => {
                    let value = reader.read_oids()?;
                    set_once(&mut may, value, "MAY", &reader)?;
                }
                _ => return Err(reader.error(format!("unrecognized token '{token}'"))),
            }
        }

        let Some(structural_class) = class else {
            return Err(reader.error("name form has no OC element"));
        };
        let Some(required_attributes) = must else {
            return Err(reader.error("name form has no MUST element"));
        };
        Ok(NameFormBuilder {
            oid,
            common: common.finish(),
            structural_class: None,
            required_attributes,
            optional_attributes: may.unwrap_or_default(),
        }
        .finish(structural_class))
    }

    pub fn oid(&self) -> &str {
        &self.oid
    }

    /// Name or OID of the structural class this name form governs.
    pub fn structural_class(&self) -> &str {
        &self.structural_class
    }

    pub fn required_attributes(&self) -> &[String] {
        &self.required_attributes
    }

    pub fn optional_attributes(&self) -> &[String] {
        &self.optional_attributes
    }
}

schema_element!(NameFormDefinition, "name form", oid);

impl PartialEq for NameFormDefinition {
    fn eq(&self, other: &Self) -> bool {
        self.oid.eq_ignore_ascii_case(&other.oid)
            && self.common.same_as(&other.common)
            && self.structural_class.eq_ignore_ascii_case(&other.structural_class)
            && same_identifiers(&self.required_attributes, &other.required_attributes)
            && same_identifiers(&self.optional_attributes, &other.optional_attributes)
    }
}

impl Eq for NameFormDefinition {}
