//! The schema aggregate: every definition published by a subschema entry,
//! indexed for case-insensitive lookup by OID and name.
//!
//! A [`Schema`] is built once and never mutated, so it can be shared between
//! threads and validators behind an `Arc`.

use super::element::SchemaElement;
use super::embedded;
use super::types::attribute_type::strip_upper_bound;
use super::types::{
    AttributeSyntaxDefinition, AttributeTypeDefinition, DefinitionKind, DitContentRuleDefinition,
    DitStructureRuleDefinition, MatchingRuleDefinition, MatchingRuleUseDefinition,
    NameFormDefinition, ObjectClassDefinition, ObjectClassType,
};
use crate::entry::{Attribute, Entry};
use crate::error::SchemaError;
use log::{debug, warn};
use std::borrow::Cow;
use std::collections::{HashMap, HashSet};

/// DN of the subschema entry synthesized for schemas not read from a directory.
pub const DEFAULT_SUBSCHEMA_DN: &str = "cn=schema";

/// Definitions of one kind, with a lower-cased OID/name index.
#[derive(Debug, Clone)]
struct ElementIndex<T> {
    elements: Vec<T>,
    by_key: HashMap<String, usize>,
}

impl<T: SchemaElement> ElementIndex<T> {
    /// Index `elements`. A later definition with the same identifier replaces an
    /// earlier one in place; identifiers take precedence over names when keys collide.
    fn new(parsed: Vec<T>) -> Self {
        let mut elements: Vec<T> = Vec::with_capacity(parsed.len());
        let mut by_key = HashMap::new();
        for element in parsed {
            let key = element.identifier().to_ascii_lowercase();
            match by_key.get(&key) {
                Some(&index) => elements[index] = element,
                None => {
                    by_key.insert(key, elements.len());
                    elements.push(element);
                }
            }
        }
        for (index, element) in elements.iter().enumerate() {
            for name in element.names() {
                by_key.entry(name.to_ascii_lowercase()).or_insert(index);
            }
        }
        Self { elements, by_key }
    }

    fn get(&self, key: &str) -> Option<&T> {
        self.by_key
            .get(&key.to_ascii_lowercase())
            .map(|&index| &self.elements[index])
    }
}

/// An immutable, indexed view of a directory schema.
///
/// # Examples
///
/// ```rust
/// use ldap_schema::schema::{DefinitionKind, Schema, SchemaElement};
///
/// let schema = Schema::from_definitions([
///     (DefinitionKind::AttributeType, "( 2.5.4.3 NAME ( 'cn' 'commonName' ) )"),
///     (DefinitionKind::ObjectClass, "( 2.5.6.6 NAME 'person' STRUCTURAL MUST cn )"),
/// ]);
/// let person = schema.object_class("PERSON").unwrap();
/// assert_eq!(person.oid(), "2.5.6.6");
/// assert_eq!(schema.attribute_type("commonname").unwrap().name_or_oid(), "cn");
/// ```
#[derive(Debug, Clone)]
pub struct Schema {
    subschema_entry: Entry,
    attribute_syntaxes: ElementIndex<AttributeSyntaxDefinition>,
    attribute_types: ElementIndex<AttributeTypeDefinition>,
    object_classes: ElementIndex<ObjectClassDefinition>,
    dit_content_rules: ElementIndex<DitContentRuleDefinition>,
    dit_structure_rules: ElementIndex<DitStructureRuleDefinition>,
    matching_rules: ElementIndex<MatchingRuleDefinition>,
    matching_rule_uses: ElementIndex<MatchingRuleUseDefinition>,
    name_forms: ElementIndex<NameFormDefinition>,
    structure_rules_by_name_form: HashMap<String, usize>,
    name_forms_by_class: HashMap<String, usize>,
    abstract_classes: Vec<usize>,
    auxiliary_classes: Vec<usize>,
    structural_classes: Vec<usize>,
    user_types: Vec<usize>,
    operational_types: Vec<usize>,
    subordinate_types: HashMap<String, Vec<usize>>,
}

impl Schema {
    /// Build a schema from a subschema entry.
    ///
    /// Each value of the eight schema attributes is parsed on its own. A value
    /// that does not parse is logged and left out; the rest of the schema still
    /// loads. Elements whose superior chain forms a cycle are also left out.
    pub fn new(subschema_entry: Entry) -> Self {
        let attribute_syntaxes = parse_all(&subschema_entry, DefinitionKind::AttributeSyntax);
        let attribute_types = acyclic_index(
            parse_all(&subschema_entry, DefinitionKind::AttributeType),
            |at: &AttributeTypeDefinition| at.superior_type_name().into_iter().collect(),
        );
        let object_classes = acyclic_index(
            parse_all(&subschema_entry, DefinitionKind::ObjectClass),
            |oc: &ObjectClassDefinition| {
                oc.superior_class_names().iter().map(String::as_str).collect()
            },
        );

        let mut schema = Self {
            attribute_syntaxes: ElementIndex::new(attribute_syntaxes),
            attribute_types,
            object_classes,
            dit_content_rules: ElementIndex::new(parse_all(
                &subschema_entry,
                DefinitionKind::DitContentRule,
            )),
            dit_structure_rules: ElementIndex::new(parse_all(
                &subschema_entry,
                DefinitionKind::DitStructureRule,
            )),
            matching_rules: ElementIndex::new(parse_all(&subschema_entry, DefinitionKind::MatchingRule)),
            matching_rule_uses: ElementIndex::new(parse_all(
                &subschema_entry,
                DefinitionKind::MatchingRuleUse,
            )),
            name_forms: ElementIndex::new(parse_all(&subschema_entry, DefinitionKind::NameForm)),
            subschema_entry,
            structure_rules_by_name_form: HashMap::new(),
            name_forms_by_class: HashMap::new(),
            abstract_classes: Vec::new(),
            auxiliary_classes: Vec::new(),
            structural_classes: Vec::new(),
            user_types: Vec::new(),
            operational_types: Vec::new(),
            subordinate_types: HashMap::new(),
        };
        schema.build_derived_indexes();

        debug!(
            "Loaded schema from '{}': {} syntaxes, {} attribute types, {} object classes, \
             {} content rules, {} structure rules, {} matching rules, {} matching rule uses, {} name forms",
            schema.subschema_entry.dn(),
            schema.attribute_syntaxes.elements.len(),
            schema.attribute_types.elements.len(),
            schema.object_classes.elements.len(),
            schema.dit_content_rules.elements.len(),
            schema.dit_structure_rules.elements.len(),
            schema.matching_rules.elements.len(),
            schema.matching_rule_uses.elements.len(),
            schema.name_forms.elements.len(),
        );
        schema
    }

    /// Build a schema from `(kind, definition)` pairs, synthesizing a
    /// `cn=schema` subschema entry to hold them.
    pub fn from_definitions<I, S>(definitions: I) -> Self
    where
        I: IntoIterator<Item = (DefinitionKind, S)>,
        S: Into<String>,
    {
        let mut grouped: Vec<Vec<String>> = vec![Vec::new(); DefinitionKind::ALL.len()];
        for (kind, definition) in definitions {
            grouped[kind_index(kind)].push(definition.into());
        }

        let mut entry = Entry::new(DEFAULT_SUBSCHEMA_DN)
            .with_attribute("objectClass", ["top", "ldapSubentry", "subschema"])
            .with_attribute("cn", ["schema"]);
        for (kind, values) in DefinitionKind::ALL.into_iter().zip(grouped) {
            if !values.is_empty() {
                entry.add_attribute(Attribute::new(kind.attribute_name(), values));
            }
        }
        Self::new(entry)
    }

    /// Parse the standard schema bundled with the crate: RFC 4512 operational
    /// definitions, the RFC 4519 user schema, RFC 4517 syntaxes and matching
    /// rules, the RFC 4524 COSINE attributes it references and RFC 2798
    /// `inetOrgPerson`.
    ///
    /// Each call parses the definitions afresh; callers that need the schema in
    /// several places should load it once and share it.
    pub fn load_default() -> Self {
        Self::from_definitions(embedded::default_definitions())
    }

    /// Merge several schemas into one.
    ///
    /// Definitions are combined per kind by OID (rule ID for structure rules);
    /// when more than one schema defines the same element, the one from the
    /// later schema wins. Returns `None` for an empty slice.
    pub fn merge(schemas: &[&Schema]) -> Option<Schema> {
        match schemas {
            [] => None,
            [single] => Some((*single).clone()),
            _ => {
                let mut merged: Vec<(DefinitionKind, String)> = Vec::new();
                for kind in DefinitionKind::ALL {
                    let mut order: Vec<String> = Vec::new();
                    let mut by_id: HashMap<String, String> = HashMap::new();
                    for schema in schemas {
                        for (id, definition) in schema.identified_definitions(kind) {
                            let key = id.to_ascii_lowercase();
                            if by_id.insert(key.clone(), definition.to_string()).is_none() {
                                order.push(key);
                            }
                        }
                    }
                    merged.extend(
                        order
                            .into_iter()
                            .filter_map(|key| by_id.remove(&key))
                            .map(|definition| (kind, definition)),
                    );
                }
                Some(Self::from_definitions(merged))
            }
        }
    }

    fn build_derived_indexes(&mut self) {
        let this: &Schema = self;

        let mut structure_rules_by_name_form = HashMap::new();
        for (index, rule) in this.dit_structure_rules.elements.iter().enumerate() {
            structure_rules_by_name_form
                .entry(rule.name_form_id().to_ascii_lowercase())
                .or_insert(index);
        }

        let mut name_forms_by_class = HashMap::new();
        for (index, name_form) in this.name_forms.elements.iter().enumerate() {
            let class = name_form.structural_class();
            let mut keys = vec![class.to_ascii_lowercase()];
            if let Some(oc) = this.object_class(class) {
                keys.push(oc.oid().to_ascii_lowercase());
                keys.extend(oc.names().iter().map(|n| n.to_ascii_lowercase()));
            }
            for key in keys {
                name_forms_by_class.entry(key).or_insert(index);
            }
        }

        let (mut abstract_classes, mut auxiliary_classes, mut structural_classes) =
            (Vec::new(), Vec::new(), Vec::new());
        for (index, oc) in this.object_classes.elements.iter().enumerate() {
            match oc.object_class_type(this) {
                ObjectClassType::Abstract => abstract_classes.push(index),
                ObjectClassType::Auxiliary => auxiliary_classes.push(index),
                ObjectClassType::Structural => structural_classes.push(index),
            }
        }

        let (mut user_types, mut operational_types) = (Vec::new(), Vec::new());
        let mut subordinate_types: HashMap<String, Vec<usize>> = HashMap::new();
        for (index, attribute_type) in this.attribute_types.elements.iter().enumerate() {
            if attribute_type.is_operational() {
                operational_types.push(index);
            } else {
                user_types.push(index);
            }
            let mut superior = attribute_type.superior_type(this);
            while let Some(parent) = superior {
                subordinate_types
                    .entry(parent.oid().to_ascii_lowercase())
                    .or_default()
                    .push(index);
                superior = parent.superior_type(this);
            }
        }

        self.structure_rules_by_name_form = structure_rules_by_name_form;
        self.name_forms_by_class = name_forms_by_class;
        self.abstract_classes = abstract_classes;
        self.auxiliary_classes = auxiliary_classes;
        self.structural_classes = structural_classes;
        self.user_types = user_types;
        self.operational_types = operational_types;
        self.subordinate_types = subordinate_types;
    }

    /// The subschema entry this schema was read from.
    pub fn subschema_entry(&self) -> &Entry {
        &self.subschema_entry
    }

    pub fn attribute_syntax(&self, oid: &str) -> Option<&AttributeSyntaxDefinition> {
        self.attribute_syntaxes.get(strip_upper_bound(oid))
    }

    pub fn attribute_syntaxes(&self) -> &[AttributeSyntaxDefinition] {
        &self.attribute_syntaxes.elements
    }

    /// Look up an attribute type by name or OID, ignoring case.
    pub fn attribute_type(&self, name_or_oid: &str) -> Option<&AttributeTypeDefinition> {
        self.attribute_types.get(name_or_oid)
    }

    pub fn attribute_types(&self) -> &[AttributeTypeDefinition] {
        &self.attribute_types.elements
    }

    /// Attribute types with `userApplications` usage.
    pub fn user_attribute_types(&self) -> Vec<&AttributeTypeDefinition> {
        self.pick(&self.attribute_types, &self.user_types)
    }

    pub fn operational_attribute_types(&self) -> Vec<&AttributeTypeDefinition> {
        self.pick(&self.attribute_types, &self.operational_types)
    }

    /// Every attribute type whose superior chain includes `name_or_oid`.
    pub fn subordinate_attribute_types(&self, name_or_oid: &str) -> Vec<&AttributeTypeDefinition> {
        self.attribute_type(name_or_oid)
            .and_then(|at| self.subordinate_types.get(&at.oid().to_ascii_lowercase()))
            .map(|indexes| self.pick(&self.attribute_types, indexes))
            .unwrap_or_default()
    }

    /// Syntax OID of an attribute type, inherited through superior types, with
    /// any `{n}` suffix removed.
    pub fn effective_syntax_oid(&self, attribute: &str) -> Option<&str> {
        self.attribute_type(attribute)?.base_syntax_oid(Some(self))
    }

    /// Look up an object class by name or OID, ignoring case.
    pub fn object_class(&self, name_or_oid: &str) -> Option<&ObjectClassDefinition> {
        self.object_classes.get(name_or_oid)
    }

    pub fn object_classes(&self) -> &[ObjectClassDefinition] {
        &self.object_classes.elements
    }

    pub fn abstract_object_classes(&self) -> Vec<&ObjectClassDefinition> {
        self.pick(&self.object_classes, &self.abstract_classes)
    }

    pub fn auxiliary_object_classes(&self) -> Vec<&ObjectClassDefinition> {
        self.pick(&self.object_classes, &self.auxiliary_classes)
    }

    pub fn structural_object_classes(&self) -> Vec<&ObjectClassDefinition> {
        self.pick(&self.object_classes, &self.structural_classes)
    }

    /// Look up a DIT content rule by the OID of its structural class, or by name.
    pub fn dit_content_rule(&self, name_or_oid: &str) -> Option<&DitContentRuleDefinition> {
        self.dit_content_rules.get(name_or_oid)
    }

    pub fn dit_content_rules(&self) -> &[DitContentRuleDefinition] {
        &self.dit_content_rules.elements
    }

    pub fn dit_structure_rule_by_id(&self, rule_id: u32) -> Option<&DitStructureRuleDefinition> {
        self.dit_structure_rules.get(&rule_id.to_string())
    }

    pub fn dit_structure_rule_by_name(&self, name: &str) -> Option<&DitStructureRuleDefinition> {
        self.dit_structure_rules.get(name)
    }

    /// Look up the structure rule bound to a name form, given the name form's
    /// name or OID.
    pub fn dit_structure_rule_by_name_form(
        &self,
        name_form: &str,
    ) -> Option<&DitStructureRuleDefinition> {
        let mut keys = vec![name_form];
        if let Some(nf) = self.name_form(name_form) {
            keys.push(nf.oid());
            keys.extend(nf.names().iter().map(String::as_str));
        }
        keys.iter()
            .find_map(|key| self.structure_rules_by_name_form.get(&key.to_ascii_lowercase()))
            .map(|&index| &self.dit_structure_rules.elements[index])
    }

    pub fn dit_structure_rules(&self) -> &[DitStructureRuleDefinition] {
        &self.dit_structure_rules.elements
    }

    pub fn matching_rule(&self, name_or_oid: &str) -> Option<&MatchingRuleDefinition> {
        self.matching_rules.get(name_or_oid)
    }

    pub fn matching_rules(&self) -> &[MatchingRuleDefinition] {
        &self.matching_rules.elements
    }

    /// Look up a matching rule use by the OID or name of its matching rule.
    pub fn matching_rule_use(&self, name_or_oid: &str) -> Option<&MatchingRuleUseDefinition> {
        self.matching_rule_uses.get(name_or_oid).or_else(|| {
            let rule = self.matching_rule(name_or_oid)?;
            self.matching_rule_uses.get(rule.oid())
        })
    }

    pub fn matching_rule_uses(&self) -> &[MatchingRuleUseDefinition] {
        &self.matching_rule_uses.elements
    }

    pub fn name_form(&self, name_or_oid: &str) -> Option<&NameFormDefinition> {
        self.name_forms.get(name_or_oid)
    }

    /// Look up the name form that governs an object class, given the class's
    /// name or OID.
    pub fn name_form_by_object_class(&self, name_or_oid: &str) -> Option<&NameFormDefinition> {
        let direct = self.name_forms_by_class.get(&name_or_oid.to_ascii_lowercase());
        let index = direct.or_else(|| {
            let class = self.object_class(name_or_oid)?;
            std::iter::once(class.oid())
                .chain(class.names().iter().map(String::as_str))
                .find_map(|key| self.name_forms_by_class.get(&key.to_ascii_lowercase()))
        })?;
        Some(&self.name_forms.elements[*index])
    }

    pub fn name_forms(&self) -> &[NameFormDefinition] {
        &self.name_forms.elements
    }

    /// Canonical definition strings of one kind, in schema order.
    pub fn definition_strings(&self, kind: DefinitionKind) -> Vec<&str> {
        self.identified_definitions(kind)
            .into_iter()
            .map(|(_, definition)| definition)
            .collect()
    }

    fn identified_definitions(&self, kind: DefinitionKind) -> Vec<(&str, &str)> {
        fn pairs<T: SchemaElement>(index: &ElementIndex<T>) -> Vec<(&str, &str)> {
            index
                .elements
                .iter()
                .map(|e| (e.identifier(), e.definition_string()))
                .collect()
        }
        match kind {
            DefinitionKind::AttributeSyntax => pairs(&self.attribute_syntaxes),
            DefinitionKind::AttributeType => pairs(&self.attribute_types),
            DefinitionKind::ObjectClass => pairs(&self.object_classes),
            DefinitionKind::DitContentRule => pairs(&self.dit_content_rules),
            DefinitionKind::DitStructureRule => pairs(&self.dit_structure_rules),
            DefinitionKind::MatchingRule => pairs(&self.matching_rules),
            DefinitionKind::MatchingRuleUse => pairs(&self.matching_rule_uses),
            DefinitionKind::NameForm => pairs(&self.name_forms),
        }
    }

    fn pick<'a, T>(&'a self, index: &'a ElementIndex<T>, positions: &[usize]) -> Vec<&'a T> {
        positions.iter().map(|&i| &index.elements[i]).collect()
    }
}

impl PartialEq for Schema {
    /// Two schemas are equal when they hold the same definitions, regardless of
    /// the subschema entry they came from.
    fn eq(&self, other: &Self) -> bool {
        fn same<T: SchemaElement + PartialEq>(a: &ElementIndex<T>, b: &ElementIndex<T>) -> bool {
            a.elements.len() == b.elements.len()
                && a.elements
                    .iter()
                    .all(|e| b.get(e.identifier()).is_some_and(|theirs| theirs == e))
        }
        same(&self.attribute_syntaxes, &other.attribute_syntaxes)
            && same(&self.attribute_types, &other.attribute_types)
            && same(&self.object_classes, &other.object_classes)
            && same(&self.dit_content_rules, &other.dit_content_rules)
            && same(&self.dit_structure_rules, &other.dit_structure_rules)
            && same(&self.matching_rules, &other.matching_rules)
            && same(&self.matching_rule_uses, &other.matching_rule_uses)
            && same(&self.name_forms, &other.name_forms)
    }
}

fn kind_index(kind: DefinitionKind) -> usize {
    DefinitionKind::ALL
        .iter()
        .position(|k| *k == kind)
        .unwrap_or_default()
}

/// Values of the subschema attribute holding definitions of `kind`.
fn raw_definitions(entry: &Entry, kind: DefinitionKind) -> Vec<String> {
    entry
        .attribute(kind.attribute_name())
        .map(|a| a.string_values().map(Cow::into_owned).collect())
        .unwrap_or_default()
}

/// Parse every definition of one kind, logging and skipping the ones that fail.
fn parse_all<T>(entry: &Entry, kind: DefinitionKind) -> Vec<T>
where
    T: SchemaElement + TryFrom<String, Error = SchemaError>,
{
    raw_definitions(entry, kind)
        .into_iter()
        .filter_map(|definition| match T::try_from(definition) {
            Ok(element) => Some(element),
            Err(error) => {
                debug!("Skipping {} value in '{}': {error}", kind.attribute_name(), entry.dn());
                None
            }
        })
        .collect()
}

/// Index `elements`, leaving out every element whose superior chain runs into
/// a cycle.
///
/// Superiors resolve through the deduplicated index, the same way lookups do.
/// Names freed by a dropped element may resolve elsewhere, so the check repeats
/// until the index is acyclic. Superior names that do not resolve end the chain.
fn acyclic_index<T, F>(elements: Vec<T>, superiors: F) -> ElementIndex<T>
where
    T: SchemaElement,
    F: Fn(&T) -> Vec<&str>,
{
    let mut index = ElementIndex::new(elements);
    loop {
        let edges: Vec<Vec<usize>> = index
            .elements
            .iter()
            .map(|element| {
                superiors(element)
                    .into_iter()
                    .filter_map(|name| index.by_key.get(&name.to_ascii_lowercase()).copied())
                    .collect()
            })
            .collect();

        let cyclic = cyclic_nodes(&edges);
        if cyclic.is_empty() {
            return index;
        }
        let survivors = index
            .elements
            .into_iter()
            .enumerate()
            .filter_map(|(position, element)| {
                if cyclic.contains(&position) {
                    let error = SchemaError::SuperiorCycle {
                        kind: T::KIND,
                        element: element.name_or_oid().to_string(),
                    };
                    warn!("Dropping {} from the schema: {error}", T::KIND);
                    None
                } else {
                    Some(element)
                }
            })
            .collect();
        index = ElementIndex::new(survivors);
    }
}

#[derive(Clone, Copy, PartialEq, Eq)]
enum Visit {
    New,
    Active,
    Acyclic,
    Cyclic,
}

/// Nodes that lie on, or lead into, a cycle of the superior graph.
fn cyclic_nodes(edges: &[Vec<usize>]) -> HashSet<usize> {
    fn visit(node: usize, edges: &[Vec<usize>], state: &mut [Visit]) -> bool {
        match state[node] {
            Visit::Active | Visit::Cyclic => return true,
            Visit::Acyclic => return false,
            Visit::New => {}
        }
        state[node] = Visit::Active;
        let mut cyclic = false;
        for &next in &edges[node] {
            cyclic |= visit(next, edges, state);
        }
        state[node] = if cyclic { Visit::Cyclic } else { Visit::Acyclic };
        cyclic
    }

    let mut state = vec![Visit::New; edges.len()];
    (0..edges.len())
        .filter(|&node| visit(node, edges, &mut state))
        .collect()
}
