//! Attribute type definitions (`attributeTypes`).
//!
//! Matching rule and syntax accessors take an optional [`Schema`]. When one is
//! supplied and the value is not set locally, the accessor walks the SUP chain.
//! A [`Schema`] never contains cyclic SUP chains, so the walk terminates.

use super::{
    AttributeUsage, CommonDecoder, common_builder_methods, decode_failure, missing_field,
    render_head, render_tail, schema_element,
};
use crate::error::{DecodeResult, SchemaResult};
use crate::schema::Schema;
use crate::schema::element::{CommonFields, same_identifier};
use crate::schema::grammar::{DefinitionReader, render_flag, render_oid, set_flag, set_once};
use serde::{Deserialize, Serialize};

/// An attribute type definition.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct AttributeTypeDefinition {
    oid: String,
    common: CommonFields,
    superior_type: Option<String>,
    equality_matching_rule: Option<String>,
    ordering_matching_rule: Option<String>,
    substring_matching_rule: Option<String>,
    syntax_oid: Option<String>,
    single_value: bool,
    collective: bool,
    no_user_modification: bool,
    usage: AttributeUsage,
    definition: String,
}

/// Fluent builder for [`AttributeTypeDefinition`].
#[derive(Debug, Clone, Default)]
pub struct AttributeTypeBuilder {
    oid: String,
    common: CommonFields,
    superior_type: Option<String>,
    equality_matching_rule: Option<String>,
    ordering_matching_rule: Option<String>,
    substring_matching_rule: Option<String>,
    syntax_oid: Option<String>,
    single_value: bool,
    collective: bool,
    no_user_modification: bool,
    usage: AttributeUsage,
}

impl AttributeTypeBuilder {
    common_builder_methods!();

    pub fn superior_type(mut self, superior: impl Into<String>) -> Self {
        self.superior_type = Some(superior.into());
        self
    }

    pub fn equality_matching_rule(mut self, rule: impl Into<String>) -> Self {
        self.equality_matching_rule = Some(rule.into());
        self
    }

    pub fn ordering_matching_rule(mut self, rule: impl Into<String>) -> Self {
        self.ordering_matching_rule = Some(rule.into());
        self
    }

    pub fn substring_matching_rule(mut self, rule: impl Into<String>) -> Self {
        self.substring_matching_rule = Some(rule.into());
        self
    }

    /// Syntax OID, optionally with a `{n}` minimum upper bound suffix.
    pub fn syntax_oid(mut self, syntax: impl Into<String>) -> Self {
        self.syntax_oid = Some(syntax.into());
        self
    }

    pub fn single_value(mut self, single_value: bool) -> Self {
        self.single_value = single_value;
        self
    }

    pub fn collective(mut self, collective: bool) -> Self {
        self.collective = collective;
        self
    }

    pub fn no_user_modification(mut self, no_user_modification: bool) -> Self {
        self.no_user_modification = no_user_modification;
        self
    }

    pub fn usage(mut self, usage: AttributeUsage) -> Self {
        self.usage = usage;
        self
    }

    pub fn build(self) -> SchemaResult<AttributeTypeDefinition> {
        if self.oid.is_empty() {
            return Err(missing_field("attribute type", "an OID is required"));
        }
        Ok(self.finish())
    }

    fn finish(self) -> AttributeTypeDefinition {
        let mut definition = render_head(&self.oid, &self.common);
        render_oid(&mut definition, "SUP", self.superior_type.as_deref());
        render_oid(&mut definition, "EQUALITY", self.equality_matching_rule.as_deref());
        render_oid(&mut definition, "ORDERING", self.ordering_matching_rule.as_deref());
        render_oid(&mut definition, "SUBSTR", self.substring_matching_rule.as_deref());
        render_oid(&mut definition, "SYNTAX", self.syntax_oid.as_deref());
        render_flag(&mut definition, "SINGLE-VALUE", self.single_value);
        render_flag(&mut definition, "COLLECTIVE", self.collective);
        render_flag(&mut definition, "NO-USER-MODIFICATION", self.no_user_modification);
        if self.usage.is_operational() {
            render_oid(&mut definition, "USAGE", Some(self.usage.name()));
        }
        let definition = render_tail(definition, &self.common);

        AttributeTypeDefinition {
            oid: self.oid,
            common: self.common,
            superior_type: self.superior_type,
            equality_matching_rule: self.equality_matching_rule,
            ordering_matching_rule: self.ordering_matching_rule,
            substring_matching_rule: self.substring_matching_rule,
            syntax_oid: self.syntax_oid,
            single_value: self.single_value,
            collective: self.collective,
            no_user_modification: self.no_user_modification,
            usage: self.usage,
            definition,
        }
    }
}

impl AttributeTypeDefinition {
    pub fn builder(oid: impl Into<String>) -> AttributeTypeBuilder {
        AttributeTypeBuilder {
            oid: oid.into(),
            ..AttributeTypeBuilder::default()
        }
    }

    /// Parse an attribute type definition string.
    pub fn parse(definition: &str) -> SchemaResult<Self> {
        Self::decode(definition).map_err(decode_failure("attribute type", definition))
    }

    fn decode(definition: &str) -> DecodeResult<Self> {
        let mut reader = DefinitionReader::new(definition)?;
        let oid = reader.read_oid()?;
        let mut common = CommonDecoder::default();
        let mut superior_type = None;
        let mut equality = None;
        let mut ordering = None;
        let mut substring = None;
        let mut syntax = None;
        let mut single_value = false;
        let mut collective = false;
        let mut no_user_modification = false;
        let mut usage = None;

        while let Some(token) = reader.next_keyword()? {
            let keyword = token.to_ascii_uppercase();
            if common.accept(&keyword, &token, &mut reader)? {
                continue;
            }
            match keyword.as_str() {
                "SUP" => {
                    let value = reader.read_oid()?;
                    set_once(&mut superior_type, value, "SUP", &reader)?;
                }
                "EQUALITY" => {
                    let value = reader.read_oid()?;
                    set_once(&mut equality, value, "EQUALITY", &reader)?;
                }
                "ORDERING" => {
                    let value = reader.read_oid()?;
                    set_once(&mut ordering, value, "ORDERING", &reader)?;
                }
                "SUBSTR" => {
                    let value = reader.read_oid()?;
                    set_once(&mut substring, value, "SUBSTR", &reader)?;
                }
                "SYNTAX" => {
                    let value = reader.read_oid()?;
                    set_once(&mut syntax, value, "SYNTAX", &reader)?;
                }
                "SINGLE-VALUE" => set_flag(&mut single_value, "SINGLE-VALUE", &reader)?,
                "COLLECTIVE" => set_flag(&mut collective, "COLLECTIVE", &reader)?,
                "NO-USER-MODIFICATION" => {
                    set_flag(&mut no_user_modification, "NO-USER-MODIFICATION", &reader)?
                }
                "USAGE" => {
                    let name = reader.read_oid()?;
                    let value = AttributeUsage::from_name(&name)
                        .ok_or_else(|| reader.error(format!("unrecognized usage '{name}'")))?;
                    set_once(&mut usage, value, "USAGE", &reader)?;
                }
                _ => return Err(reader.error(format!("unrecognized token '{token}'"))),
            }
        }

        Ok(AttributeTypeBuilder {
            oid,
            common: common.finish(),
            superior_type,
            equality_matching_rule: equality,
            ordering_matching_rule: ordering,
            substring_matching_rule: substring,
            syntax_oid: syntax,
            single_value,
            collective,
            no_user_modification,
            usage: usage.unwrap_or_default(),
        }
        .finish())
    }

    pub fn oid(&self) -> &str {
        &self.oid
    }

    /// Name or OID of the superior type, as written in the definition.
    pub fn superior_type_name(&self) -> Option<&str> {
        self.superior_type.as_deref()
    }

    /// Resolve the superior type in `schema`.
    pub fn superior_type<'a>(&self, schema: &'a Schema) -> Option<&'a AttributeTypeDefinition> {
        self.superior_type
            .as_deref()
            .and_then(|name| schema.attribute_type(name))
    }

    fn inherited<'a>(
        &'a self,
        schema: Option<&'a Schema>,
        field: fn(&AttributeTypeDefinition) -> Option<&str>,
    ) -> Option<&'a str> {
        let mut current = self;
        loop {
            if let Some(value) = field(current) {
                return Some(value);
            }
            current = current.superior_type(schema?)?;
        }
    }

    pub fn equality_matching_rule<'a>(&'a self, schema: Option<&'a Schema>) -> Option<&'a str> {
        self.inherited(schema, |d| d.equality_matching_rule.as_deref())
    }

    pub fn ordering_matching_rule<'a>(&'a self, schema: Option<&'a Schema>) -> Option<&'a str> {
        self.inherited(schema, |d| d.ordering_matching_rule.as_deref())
    }

    pub fn substring_matching_rule<'a>(&'a self, schema: Option<&'a Schema>) -> Option<&'a str> {
        self.inherited(schema, |d| d.substring_matching_rule.as_deref())
    }

    /// Syntax OID including any `{n}` suffix.
    pub fn syntax_oid<'a>(&'a self, schema: Option<&'a Schema>) -> Option<&'a str> {
        self.inherited(schema, |d| d.syntax_oid.as_deref())
    }

    /// Syntax OID with any `{n}` suffix removed.
    pub fn base_syntax_oid<'a>(&'a self, schema: Option<&'a Schema>) -> Option<&'a str> {
        self.syntax_oid(schema).map(strip_upper_bound)
    }

    /// The `{n}` minimum upper bound of the syntax, if present and numeric.
    pub fn syntax_minimum_upper_bound(&self, schema: Option<&Schema>) -> Option<u32> {
        let syntax = self.syntax_oid(schema)?;
        let start = syntax.find('{')?;
        let end = syntax[start..].find('}')? + start;
        syntax[start + 1..end].parse().ok()
    }

    pub fn is_single_valued(&self) -> bool {
        self.single_value
    }

    pub fn is_collective(&self) -> bool {
        self.collective
    }

    pub fn is_no_user_modification(&self) -> bool {
        self.no_user_modification
    }

    pub fn usage(&self) -> AttributeUsage {
        self.usage
    }

    pub fn is_operational(&self) -> bool {
        self.usage.is_operational()
    }
}

/// Remove a `{n}` minimum upper bound suffix from a syntax OID.
pub(crate) fn strip_upper_bound(syntax: &str) -> &str {
    match syntax.find('{') {
        Some(index) => &syntax[..index],
        None => syntax,
    }
}

schema_element!(AttributeTypeDefinition, "attribute type", oid);

impl PartialEq for AttributeTypeDefinition {
    fn eq(&self, other: &Self) -> bool {
        self.oid.eq_ignore_ascii_case(&other.oid)
            && self.common.same_as(&other.common)
            && same_identifier(self.superior_type.as_deref(), other.superior_type.as_deref())
            && same_identifier(
                self.equality_matching_rule.as_deref(),
                other.equality_matching_rule.as_deref(),
            )
            && same_identifier(
                self.ordering_matching_rule.as_deref(),
                other.ordering_matching_rule.as_deref(),
            )
            && same_identifier(
                self.substring_matching_rule.as_deref(),
                other.substring_matching_rule.as_deref(),
            )
            && same_identifier(self.syntax_oid.as_deref(), other.syntax_oid.as_deref())
            && self.single_value == other.single_value
            && self.collective == other.collective
            && self.no_user_modification == other.no_user_modification
            && self.usage == other.usage
    }
}

impl Eq for AttributeTypeDefinition {}
