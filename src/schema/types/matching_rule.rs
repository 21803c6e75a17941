//! Matching rule definitions (`matchingRules`).

use super::{CommonDecoder, decode_failure, missing_field, render_head, render_tail, schema_element};
use crate::error::{DecodeResult, SchemaResult};
use crate::schema::element::{CommonFields, Extensions};
use crate::schema::grammar::{DefinitionReader, render_oid, set_once};
use serde::{Deserialize, Serialize};

/// A matching rule definition, bound to exactly one assertion syntax.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct MatchingRuleDefinition {
    oid: String,
    common: CommonFields,
    syntax_oid: String,
    definition: String,
}

impl MatchingRuleDefinition {
    /// Create a matching rule definition from its parts.
    pub fn new(
        oid: impl Into<String>,
        names: Vec<String>,
        description: Option<String>,
        obsolete: bool,
        syntax_oid: impl Into<String>,
        extensions: Extensions,
    ) -> SchemaResult<Self> {
        let oid = oid.into();
        let syntax_oid = syntax_oid.into();
        if oid.is_empty() || syntax_oid.is_empty() {
            return Err(missing_field("matching rule", "an OID and a SYNTAX are required"));
        }
        let common = CommonFields {
            names,
            description,
            obsolete,
            extensions,
        };
        Ok(Self::from_parts(oid, common, syntax_oid))
    }

    pub fn parse(definition: &str) -> SchemaResult<Self> {
        Self::decode(definition).map_err(decode_failure("matching rule", definition))
    }

    fn decode(definition: &str) -> DecodeResult<Self> {
        let mut reader = DefinitionReader::new(definition)?;
        let oid = reader.read_oid()?;
        let mut common = CommonDecoder::default();
        let mut syntax = None;

        while let Some(token) = reader.next_keyword()? {
            let keyword = token.to_ascii_uppercase();
            if common.accept(&keyword, &token, &mut reader)? {
                continue;
            }
            if keyword != "SYNTAX" {
                return Err(reader.error(format!("unrecognized token '{token}'")));
            }
            let value = reader.read_oid()?;
            set_once(&mut syntax, value, "SYNTAX", &reader)?;
        }

        let Some(syntax_oid) = syntax else {
            return Err(reader.error("matching rule has no SYNTAX element"));
        };
        Ok(Self::from_parts(oid, common.finish(), syntax_oid))
    }

    fn from_parts(oid: String, common: CommonFields, syntax_oid: String) -> Self {
        let mut definition = render_head(&oid, &common);
        render_oid(&mut definition, "SYNTAX", Some(syntax_oid.as_str()));
        let definition = render_tail(definition, &common);
        Self {
            oid,
            common,
            syntax_oid,
            definition,
        }
    }

    pub fn oid(&self) -> &str {
        &self.oid
    }

    pub fn syntax_oid(&self) -> &str {
        &self.syntax_oid
    }
}

schema_element!(MatchingRuleDefinition, "matching rule", oid);

impl PartialEq for MatchingRuleDefinition {
    fn eq(&self, other: &Self) -> bool {
        self.oid.eq_ignore_ascii_case(&other.oid)
            && self.common.same_as(&other.common)
            && self.syntax_oid.eq_ignore_ascii_case(&other.syntax_oid)
    }
}

impl Eq for MatchingRuleDefinition {}
