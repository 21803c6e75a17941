//! DIT content rule definitions (`dITContentRules`).
//!
//! A content rule is identified by the OID of the structural object class it
//! governs. It lists the auxiliary classes entries of that class may carry, and
//! adjusts the attributes they must, may and must not contain.

use super::{
    CommonDecoder, common_builder_methods, decode_failure, missing_field, render_head,
    render_tail, schema_element,
};
use crate::error::{DecodeResult, SchemaResult};
use crate::schema::element::{CommonFields, same_identifiers};
use crate::schema::grammar::{DefinitionReader, render_oids, set_once};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct DitContentRuleDefinition {
    oid: String,
    common: CommonFields,
    auxiliary_classes: Vec<String>,
    required_attributes: Vec<String>,
    optional_attributes: Vec<String>,
    prohibited_attributes: Vec<String>,
    definition: String,
}

/// Fluent builder for [`DitContentRuleDefinition`].
#[derive(Debug, Clone, Default)]
pub struct DitContentRuleBuilder {
    oid: String,
    common: CommonFields,
    auxiliary_classes: Vec<String>,
    required_attributes: Vec<String>,
    optional_attributes: Vec<String>,
    prohibited_attributes: Vec<String>,
}

impl DitContentRuleBuilder {
    common_builder_methods!();

    pub fn auxiliary_class(mut self, class: impl Into<String>) -> Self {
        self.auxiliary_classes.push(class.into());
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

    pub fn prohibited_attribute(mut self, attribute: impl Into<String>) -> Self {
        self.prohibited_attributes.push(attribute.into());
        self
    }

    pub fn build(self) -> SchemaResult<DitContentRuleDefinition> {
        if self.oid.is_empty() {
            return Err(missing_field(
                "DIT content rule",
                "the structural object class OID is required",
            ));
        }
        Ok(self.finish())
    }

    fn finish(self) -> DitContentRuleDefinition {
        let mut definition = render_head(&self.oid, &self.common);
        render_oids(&mut definition, "AUX", &self.auxiliary_classes);
        render_oids(&mut definition, "MUST", &self.required_attributes);
        render_oids(&mut definition, "MAY", &self.optional_attributes);
        render_oids(&mut definition, "NOT", &self.prohibited_attributes);
        let definition = render_tail(definition, &self.common);

        DitContentRuleDefinition {
            oid: self.oid,
            common: self.common,
            auxiliary_classes: self.auxiliary_classes,
            required_attributes: self.required_attributes,
            optional_attributes: self.optional_attributes,
            prohibited_attributes: self.prohibited_attributes,
            definition,
        }
    }
}

impl DitContentRuleDefinition {
    /// Start a rule for the structural class with the given OID.
    pub fn builder(structural_class_oid: impl Into<String>) -> DitContentRuleBuilder {
        DitContentRuleBuilder {
            oid: structural_class_oid.into(),
            ..DitContentRuleBuilder::default()
        }
    }

    pub fn parse(definition: &str) -> SchemaResult<Self> {
        Self::decode(definition).map_err(decode_failure("DIT content rule", definition))
    }

    fn decode(definition: &str) -> DecodeResult<Self> {
        let mut reader = DefinitionReader::new(definition)?;
        let oid = reader.read_oid()?;
        let mut common = CommonDecoder::default();
        let mut aux = None;
        let mut must = None;
        let mut may = None;
        let mut not = None;

        while let Some(token) = reader.next_keyword()? {
            let keyword = token.to_ascii_uppercase();
            if common.accept(&keyword, &token, &mut reader)? {
                continue;
            }
            let slot = match keyword.as_str() {
                "AUX" => &mut aux,
                "MUST" => &mut must,
                "MAY" => &mut may,
                "NOT" => &mut not,
                _ => return Err(reader.error(format!("unrecognized token '{token}'"))),
            };
            let value = reader.read_oids()?;
            set_once(slot, value, &keyword, &reader)?;
        }

        Ok(DitContentRuleBuilder {
            oid,
            common: common.finish(),
            auxiliary_classes: aux.unwrap_or_default(),
            required_attributes: must.unwrap_or_default(),
            optional_attributes: may.unwrap_or_default(),
            prohibited_attributes: not.unwrap_or_default(),
        }
        .finish())
    }

    /// OID of the structural object class this rule applies to.
    pub fn oid(&self) -> &str {
        &self.oid
    }

    pub fn auxiliary_classes(&self) -> &[String] {
        &self.auxiliary_classes
    }

    pub fn required_attributes(&self) -> &[String] {
        &self.required_attributes
    }

    pub fn optional_attributes(&self) -> &[String] {
        &self.optional_attributes
    }

    pub fn prohibited_attributes(&self) -> &[String] {
        &self.prohibited_attributes
    }
}

schema_element!(DitContentRuleDefinition, "DIT content rule", oid);

impl PartialEq for DitContentRuleDefinition {
    fn eq(&self, other: &Self) -> bool {
        self.oid.eq_ignore_ascii_case(&other.oid)
            && self.common.same_as(&other.common)
            && same_identifiers(&self.auxiliary_classes, &other.auxiliary_classes)
            && same_identifiers(&self.required_attributes, &other.required_attributes)
            && same_identifiers(&self.optional_attributes, &other.optional_attributes)
            && same_identifiers(&self.prohibited_attributes, &other.prohibited_attributes)
    }
}

impl Eq for DitContentRuleDefinition {}
