//! Matching rule use definitions (`matchingRuleUse`).

use super::{CommonDecoder, decode_failure, missing_field, render_head, render_tail, schema_element};
use crate::error::{DecodeResult, SchemaResult};
use crate::schema::element::{CommonFields, Extensions, same_identifiers};
use crate::schema::grammar::{DefinitionReader, render_oids, set_once};
use serde::{Deserialize, Serialize};

/// Lists the attribute types a matching rule may be used with in extensible matches.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct MatchingRuleUseDefinition {
    oid: String,
    common: CommonFields,
    applicable_types: Vec<String>,
    definition: String,
}

impl MatchingRuleUseDefinition {
    /// Create a matching rule use definition from its parts.
    pub fn new(
        oid: impl Into<String>,
        names: Vec<String>,
        description: Option<String>,
        obsolete: bool,
        applicable_types: Vec<String>,
        extensions: Extensions,
    ) -> SchemaResult<Self> {
        let oid = oid.into();
        if oid.is_empty() || applicable_types.is_empty() {
            return Err(missing_field(
                "matching rule use",
                "an OID and at least one APPLIES attribute are required",
            ));
        }
        let common = CommonFields {
            names,
            description,
            obsolete,
            extensions,
        };
        Ok(Self::from_parts(oid, common, applicable_types))
    }

    pub fn parse(definition: &str) -> SchemaResult<Self> {
        Self::decode(definition).map_err(decode_failure("matching rule use", definition))
    }

    fn decode(definition: &str) -> DecodeResult<Self> {
        let mut reader = DefinitionReader::new(definition)?;
        let oid = reader.read_oid()?;
        let mut common = CommonDecoder::default();
        let mut applies = None;

        while let Some(token) = reader.next_keyword()? {
            let keyword = token.to_ascii_uppercase();
            if common.accept(&keyword, &token, &mut reader)? {
                continue;
            }
            if keyword != "APPLIES" {
                return Err(reader.error(format!("unrecognized token '{token}'")));
            }
            let value = reader.read_oids()?;
            set_once(&mut applies, value, "APPLIES", &reader)?;
        }

        let Some(applicable_types) = applies else {
            return Err(reader.error("matching rule use has no APPLIES element"));
        };
        Ok(Self::from_parts(oid, common.finish(), applicable_types))
    }

    fn from_parts(oid: String, common: CommonFields, applicable_types: Vec<String>) -> Self {
        let mut definition = render_head(&oid, &common);
        render_oids(&mut definition, "APPLIES", &applicable_types);
        let definition = render_tail(definition, &common);
        Self {
            oid,
            common,
            applicable_types,
            definition,
        }
    }

    /// OID of the matching rule this use applies to.
    pub fn oid(&self) -> &str {
        &self.oid
    }

    pub fn applicable_attribute_types(&self) -> &[String] {
        &self.applicable_types
    }
}

schema_element!(MatchingRuleUseDefinition, "matching rule use", oid);

impl PartialEq for MatchingRuleUseDefinition {
    fn eq(&self, other: &Self) -> bool {
        self.oid.eq_ignore_ascii_case(&other.oid)
            && self.common.same_as(&other.common)
            && same_identifiers(&self.applicable_types, &other.applicable_types)
    }
}

impl Eq for MatchingRuleUseDefinition {}
