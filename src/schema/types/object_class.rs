//! Object class definitions (`objectClasses`).

use super::{
    CommonDecoder, ObjectClassType, common_builder_methods, decode_failure, missing_field,
    render_head, render_tail, schema_element,
};
use crate::error::{DecodeResult, SchemaResult};
use crate::schema::Schema;
use crate::schema::element::{CommonFields, SchemaElement, same_identifiers};
use crate::schema::grammar::{DefinitionReader, render_oids, set_once};
use crate::schema::types::AttributeTypeDefinition;
use serde::{Deserialize, Serialize};
use std::collections::HashSet;

/// OID of the `extensibleObject` auxiliary class (RFC 4512 section 4.3).
pub const EXTENSIBLE_OBJECT_OID: &str = "1.3.6.1.4.1.1466.101.120.111";

/// An object class definition.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct ObjectClassDefinition {
    oid: String,
    common: CommonFields,
    superior_classes: Vec<String>,
    object_class_type: Option<ObjectClassType>,
    required_attributes: Vec<String>,
    optional_attributes: Vec<String>,
    definition: String,
}

/// Fluent builder for [`ObjectClassDefinition`].
#[derive(Debug, Clone, Default)]
pub struct ObjectClassBuilder {
    oid: String,
    common: CommonFields,
    superior_classes: Vec<String>,
    object_class_type: Option<ObjectClassType>,
    required_attributes: Vec<String>,
    optional_attributes: Vec<String>,
}

impl ObjectClassBuilder {
    common_builder_methods!();

    pub fn superior_class(mut self, superior: impl Into<String>) -> Self {
        self.superior_classes.push(superior.into());
        self
    }

    pub fn object_class_type(mut self, object_class_type: ObjectClassType) -> Self {
        self.object_class_type = Some(object_class_type);
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

    pub fn build(self) -> SchemaResult<ObjectClassDefinition> {
        if self.oid.is_empty() {
            return Err(missing_field("object class", "an OID is required"));
        }
        Ok(self.finish())
    }

    fn finish(self) -> ObjectClassDefinition {
        let mut definition = render_head(&self.oid, &self.common);
        render_oids(&mut definition, "SUP", &self.superior_classes);
        if let Some(kind) = self.object_class_type {
            definition.push(' ');
            definition.push_str(kind.name());
        }
        render_oids(&mut definition, "MUST", &self.required_attributes);
        render_oids(&mut definition, "MAY", &self.optional_attributes);
        let definition = render_tail(definition, &self.common);

        ObjectClassDefinition {
            oid: self.oid,
            common: self.common,
            superior_classes: self.superior_classes,
            object_class_type: self.object_class_type,
            required_attributes: self.required_attributes,
            optional_attributes: self.optional_attributes,
            definition,
        }
    }
}

impl ObjectClassDefinition {
    pub fn builder(oid: impl Into<String>) -> ObjectClassBuilder {
        ObjectClassBuilder {
            oid: oid.into(),
            ..ObjectClassBuilder::default()
        }
    }

    /// Parse an object class definition string.
    pub fn parse(definition: &str) -> SchemaResult<Self> {
        Self::decode(definition).map_err(decode_failure("object class", definition))
    }

    fn decode(definition: &str) -> DecodeResult<Self> {
        let mut reader = DefinitionReader::new(definition)?;
        let oid = reader.read_oid()?;
        let mut common = CommonDecoder::default();
        let mut superior = None;
        let mut kind = None;
        let mut must = None;
        let mut may = None;

        while let Some(token) = reader.next_keyword()? {
            let keyword = token.to_ascii_uppercase();
            if common.accept(&keyword, &token, &mut reader)? {
                continue;
            }
            match keyword.as_str() {
                "SUP" => {
                    let value = reader.read_oids()?;
                    set_once(&mut superior, value, "SUP", &reader)?;
                }
                "ABSTRACT" | "STRUCTURAL" | "AUXILIARY" => {
                    let value = ObjectClassType::from_name(&keyword)
                        .ok_or_else(|| reader.error("unrecognized object class type"))?;
                    if kind.is_some() {
                        return Err(reader.error("multiple object class types"));
                    }
                    kind = Some(value);
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

        Ok(ObjectClassBuilder {
            oid,
            common: common.finish(),
            superior_classes: superior.unwrap_or_default(),
            object_class_type: kind,
            required_attributes: must.unwrap_or_default(),
            optional_attributes: may.unwrap_or_default(),
        }
        .finish())
    }

    pub fn oid(&self) -> &str {
        &self.oid
    }

    /// Superior class names or OIDs, as written in the definition.
    pub fn superior_class_names(&self) -> &[String] {
        &self.superior_classes
    }

    /// The kind declared in the definition itself, if any.
    pub fn explicit_type(&self) -> Option<ObjectClassType> {
        self.object_class_type
    }

    /// The effective kind: the declared kind, otherwise the kind of the first
    /// superior that resolves in `schema`, otherwise STRUCTURAL.
    pub fn object_class_type(&self, schema: &Schema) -> ObjectClassType {
        if let Some(kind) = self.object_class_type {
            return kind;
        }
        self.superior_classes
            .iter()
            .find_map(|name| schema.object_class(name))
            .map(|superior| superior.object_class_type(schema))
            .unwrap_or(ObjectClassType::Structural)
    }

    /// Resolve the superior classes, transitively when `recursive` is set.
    ///
    /// Each class appears once, nearest superiors first.
    pub fn superior_classes<'a>(
        &self,
        schema: &'a Schema,
        recursive: bool,
    ) -> Vec<&'a ObjectClassDefinition> {
        let mut seen = HashSet::new();
        let mut result: Vec<&'a ObjectClassDefinition> = Vec::new();
        let mut pending: Vec<&str> = self.superior_classes.iter().map(String::as_str).collect();
        let mut index = 0;

        while index < pending.len() {
            let name = pending[index];
            index += 1;
            let Some(class) = schema.object_class(name) else {
                continue;
            };
            if !seen.insert(class.oid.to_ascii_lowercase()) {
                continue;
            }
            result.push(class);
            if recursive {
                pending.extend(class.superior_classes.iter().map(String::as_str));
            }
        }
        result
    }

    /// Required attribute names or OIDs, as written in the definition.
    pub fn required_attribute_names(&self) -> &[String] {
        &self.required_attributes
    }

    /// Optional attribute names or OIDs, as written in the definition.
    pub fn optional_attribute_names(&self) -> &[String] {
        &self.optional_attributes
    }

    /// Resolve the required attribute types, optionally including those of all superiors.
    pub fn required_attributes<'a>(
        &'a self,
        schema: &'a Schema,
        include_superior: bool,
    ) -> Vec<&'a AttributeTypeDefinition> {
        self.collect_attributes(schema, include_superior, |c| c.required_attributes.as_slice())
    }

    /// Resolve the optional attribute types, optionally including those of all superiors.
    pub fn optional_attributes<'a>(
        &'a self,
        schema: &'a Schema,
        include_superior: bool,
    ) -> Vec<&'a AttributeTypeDefinition> {
        self.collect_attributes(schema, include_superior, |c| c.optional_attributes.as_slice())
    }

    fn collect_attributes<'a>(
        &'a self,
        schema: &'a Schema,
        include_superior: bool,
        names: fn(&ObjectClassDefinition) -> &[String],
    ) -> Vec<&'a AttributeTypeDefinition> {
        let mut classes = vec![self];
        if include_superior {
            classes.extend(self.superior_classes(schema, true));
        }

        let mut seen = HashSet::new();
        classes
            .into_iter()
            .flat_map(|class| names(class).iter())
            .filter_map(|name| schema.attribute_type(name))
            .filter(|at| seen.insert(at.oid().to_ascii_lowercase()))
            .collect()
    }

    /// Whether this is the `extensibleObject` class, by OID or name.
    pub fn is_extensible_object(&self) -> bool {
        self.has_name_or_oid(EXTENSIBLE_OBJECT_OID) || self.has_name_or_oid("extensibleObject")
    }
}

schema_element!(ObjectClassDefinition, "object class", oid);

impl PartialEq for ObjectClassDefinition {
    fn eq(&self, other: &Self) -> bool {
        self.oid.eq_ignore_ascii_case(&other.oid)
            && self.common.same_as(&other.common)
            && same_identifiers(&self.superior_classes, &other.superior_classes)
            && self.object_class_type == other.object_class_type
            && same_identifiers(&self.required_attributes, &other.required_attributes)
            && same_identifiers(&self.optional_attributes, &other.optional_attributes)
    }
}

impl Eq for ObjectClassDefinition {}
