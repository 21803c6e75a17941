//! DIT structure rule definitions (`dITStructureRules`).
//!
//! Structure rules are identified by an integer rule ID rather than an OID.

use super::{
    CommonDecoder, common_builder_methods, decode_failure, missing_field, render_head,
    render_tail, schema_element,
};
use crate::error::{DecodeResult, SchemaResult};
use crate::schema::element::CommonFields;
use crate::schema::grammar::{DefinitionReader, render_oid, set_once};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct DitStructureRuleDefinition {
    rule_id: u32,
    rule_id_string: String,
    common: CommonFields,
    name_form_id: String,
    superior_rule_ids: Vec<u32>,
    definition: String,
}

/// Fluent builder for [`DitStructureRuleDefinition`].
#[derive(Debug, Clone, Default)]
pub struct DitStructureRuleBuilder {
    rule_id: u32,
    common: CommonFields,
    name_form_id: Option<String>,
    superior_rule_ids: Vec<u32>,
}

impl DitStructureRuleBuilder {
    common_builder_methods!();

    pub fn name_form(mut self, name_form: impl Into<String>) -> Self {
        self.name_form_id = Some(name_form.into());
        self
    }

    pub fn superior_rule(mut self, rule_id: u32) -> Self {
        self.superior_rule_ids.push(rule_id);
        self
    }

    pub fn build(self) -> SchemaResult<DitStructureRuleDefinition> {
        let Some(name_form_id) = self.name_form_id.clone() else {
            return Err(missing_field("DIT structure rule", "a FORM is required"));
        };
        Ok(self.finish(name_form_id))
    }

    fn finish(self, name_form_id: String) -> DitStructureRuleDefinition {
        let rule_id_string = self.rule_id.to_string();
        let mut definition = render_head(&rule_id_string, &self.common);
        render_oid(&mut definition, "FORM", Some(name_form_id.as_str()));
        match self.superior_rule_ids.as_slice() {
            [] => {}
            [single] => definition.push_str(&format!(" SUP {single}")),
            many => {
                let ids: Vec<String> = many.iter().map(u32::to_string).collect();
                definition.push_str(&format!(" SUP ( {} )", ids.join(" ")));
            }
        }
        let definition = render_tail(definition, &self.common);

        DitStructureRuleDefinition {
            rule_id: self.rule_id,
            rule_id_string,
            common: self.common,
            name_form_id,
            superior_rule_ids: self.superior_rule_ids,
            definition,
        }
    }
}

impl DitStructureRuleDefinition {
    pub fn builder(rule_id: u32) -> DitStructureRuleBuilder {
        DitStructureRuleBuilder {
            rule_id,
            ..DitStructureRuleBuilder::default()
        }
    }

    pub fn parse(definition: &str) -> SchemaResult<Self> {
        Self::decode(definition).map_err(decode_failure("DIT structure rule", definition))
    }

    fn decode(definition: &str) -> DecodeResult<Self> {
        let mut reader = DefinitionReader::new(definition)?;
        let rule_id = reader.read_rule_id()?;
        let mut common = CommonDecoder::default();
        let mut form = None;
        let mut superior = None;

        while let Some(token) = reader.next_keyword()? {
            let keyword = token.to_ascii_uppercase();
            if common.accept(&keyword, &token, &mut reader)? {
                continue;
            }
            match keyword.as_str() {
                "FORM" => {
                    let value = reader.read_oid()?;
                    set_once(&mut form, value, "FORM", &reader)?;
                }
                "SUP" => {
                    let value = reader.read_rule_ids()?;
                    set_once(&mut superior, value, "SUP", &reader)?;
                }
                _ => return Err(reader.error(format!("unrecognized token '{token}'"))),
            }
        }

        let Some(name_form_id) = form else {
            return Err(reader.error("DIT structure rule has no FORM element"));
        };
        Ok(DitStructureRuleBuilder {
            rule_id,
            common: common.finish(),
            name_form_id: None,
            superior_rule_ids: superior.unwrap_or_default(),
        }
        .finish(name_form_id))
    }

    pub fn rule_id(&self) -> u32 {
        self.rule_id
    }

    /// Name or OID of the name form this rule is bound to.
    pub fn name_form_id(&self) -> &str {
        &self.name_form_id
    }

    pub fn superior_rule_ids(&self) -> &[u32] {
        &self.superior_rule_ids
    }
}

schema_element!(DitStructureRuleDefinition, "DIT structure rule", rule_id_string);

impl PartialEq for DitStructureRuleDefinition {
    fn eq(&self, other: &Self) -> bool {
        let mut mine = self.superior_rule_ids.clone();
        let mut theirs = other.superior_rule_ids.clone();
        mine.sort_unstable();
        theirs.sort_unstable();

        self.rule_id == other.rule_id
            && self.common.same_as(&other.common)
            && self.name_form_id.eq_ignore_ascii_case(&other.name_form_id)
            && mine == theirs
    }
}

impl Eq for DitStructureRuleDefinition {}
