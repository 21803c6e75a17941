//! The entry validator.

use super::config::ValidatorConfig;
use super::counters::{ValidationCounters, ValidationStatistics};
use crate::dn::{Rdn, parse_rdn};
use crate::entry::{Attribute, Entry, OBJECT_CLASS_ATTRIBUTE, base_name};
use crate::error::{DnError, EntryViolation, ViolationCategory};
use crate::matching::MatchingRuleRegistry;
use crate::schema::{
    AttributeTypeDefinition, DitContentRuleDefinition, NameFormDefinition, ObjectClassDefinition,
    ObjectClassType, Schema, SchemaElement,
};
use log::{debug, trace};
use std::collections::{BTreeMap, HashSet};
use std::sync::Arc;

/// OID of the `objectClass` attribute type.
const OBJECT_CLASS_OID: &str = "2.5.4.0";

/// The result of validating one entry.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ValidationOutcome {
    violations: Vec<EntryViolation>,
    structural_class: Option<String>,
}

impl ValidationOutcome {
    pub fn is_valid(&self) -> bool {
        self.violations.is_empty()
    }

    pub fn violations(&self) -> &[EntryViolation] {
        &self.violations
    }

    /// The violations as human-readable reasons, in the order they were found.
    pub fn reasons(&self) -> Vec<String> {
        self.violations.iter().map(ToString::to_string).collect()
    }

    /// Name or OID of the entry's structural class, when exactly one was found.
    pub fn structural_class(&self) -> Option<&str> {
        self.structural_class.as_deref()
    }

    pub fn into_violations(self) -> Vec<EntryViolation> {
        self.violations
    }
}

/// Checks entries against a schema and keeps running statistics.
///
/// `validate` takes `&self`, so one validator can be shared between threads
/// (for example in an `Arc`) once it is configured. The configuration setters
/// take `&mut self` and therefore cannot run while validations are in flight.
///
/// # Examples
///
/// ```rust
/// use std::sync::Arc;
/// use ldap_schema::entry::Entry;
/// use ldap_schema::schema::Schema;
/// use ldap_schema::validation::EntryValidator;
///
/// let validator = EntryValidator::new(Arc::new(Schema::load_default()));
/// let entry = Entry::new("uid=jdoe,ou=People,dc=example,dc=com")
///     .with_attribute("objectClass", ["top", "person", "organizationalPerson", "inetOrgPerson"])
///     .with_attribute("uid", ["jdoe"])
///     .with_attribute("cn", ["John Doe"])
///     .with_attribute("sn", ["Doe"]);
///
/// let outcome = validator.validate(&entry);
/// assert!(outcome.is_valid(), "{:?}", outcome.reasons());
/// assert_eq!(validator.entries_examined(), 1);
/// ```
#[derive(Debug)]
pub struct EntryValidator {
    schema: Arc<Schema>,
    matching_rules: Arc<MatchingRuleRegistry>,
    config: ValidatorConfig,
    counters: ValidationCounters,
}

macro_rules! flag_setters {
    ($($flag:ident => $setter:ident),* $(,)?) => {
        $(
            pub fn $setter(&mut self, enabled: bool) {
                self.config.$flag = enabled;
            }
        )*
    };
}

/// Object-class picture of an entry: every resolved class and what it implies.
struct ClassResolution<'s> {
    classes: Vec<&'s ObjectClassDefinition>,
    structural: Option<&'s ObjectClassDefinition>,
    content_rule: Option<&'s DitContentRuleDefinition>,
    name_form: Option<&'s NameFormDefinition>,
}

/// Attribute types an entry must and may contain.
#[derive(Default)]
struct AllowedAttributes<'s> {
    required: Vec<&'s AttributeTypeDefinition>,
    required_ids: HashSet<String>,
    optional_ids: HashSet<String>,
}

impl<'s> AllowedAttributes<'s> {
    fn require(&mut self, attribute_type: &'s AttributeTypeDefinition) {
        if self.required_ids.insert(attribute_type.oid().to_ascii_lowercase()) {
            self.required.push(attribute_type);
        }
    }

    fn allow(&mut self, attribute_type: &AttributeTypeDefinition) {
        let id = attribute_type.oid().to_ascii_lowercase();
        if !self.required_ids.contains(&id) {
            self.optional_ids.insert(id);
        }
    }

    fn prohibit(&mut self, attribute_type: &AttributeTypeDefinition) {
        self.optional_ids
            .remove(&attribute_type.oid().to_ascii_lowercase());
    }

    fn permits(&self, attribute_type: &AttributeTypeDefinition) -> bool {
        let id = attribute_type.oid().to_ascii_lowercase();
        self.required_ids.contains(&id) || self.optional_ids.contains(&id)
    }
}

impl EntryValidator {
    /// Create a validator with the default checks and the standard matching rules.
    pub fn new(schema: Arc<Schema>) -> Self {
        Self::with_matching_rules(schema, Arc::new(MatchingRuleRegistry::standard()))
    }

    /// Create a validator that shares an existing matching rule registry.
    pub fn with_matching_rules(
        schema: Arc<Schema>,
        matching_rules: Arc<MatchingRuleRegistry>,
    ) -> Self {
        Self {
            schema,
            matching_rules,
            config: ValidatorConfig::default(),
            counters: ValidationCounters::default(),
        }
    }

    /// Builder-style variant of [`EntryValidator::set_config`].
    pub fn with_config(mut self, config: ValidatorConfig) -> Self {
        self.config = config;
        self
    }

    pub fn schema(&self) -> &Arc<Schema> {
        &self.schema
    }

    pub fn matching_rules(&self) -> &Arc<MatchingRuleRegistry> {
        &self.matching_rules
    }

    pub fn config(&self) -> &ValidatorConfig {
        &self.config
    }

    pub fn set_config(&mut self, config: ValidatorConfig) {
        self.config = config;
    }

    flag_setters! {
        check_malformed_dns => set_check_malformed_dns,
        check_undefined_object_classes => set_check_undefined_object_classes,
        check_missing_superior_object_classes => set_check_missing_superior_object_classes,
        check_prohibited_object_classes => set_check_prohibited_object_classes,
        check_structural_object_classes => set_check_structural_object_classes,
        check_missing_attributes => set_check_missing_attributes,
        check_undefined_attributes => set_check_undefined_attributes,
        check_prohibited_attributes => set_check_prohibited_attributes,
        check_single_valued_attributes => set_check_single_valued_attributes,
        check_attribute_syntax => set_check_attribute_syntax,
        check_name_forms => set_check_name_forms,
        check_entry_missing_rdn_values => set_check_entry_missing_rdn_values,
    }

    /// Validate an entry, collecting every violation the enabled checks find.
    ///
    /// Statistics are updated whatever the outcome.
    pub fn validate(&self, entry: &Entry) -> ValidationOutcome {
        let mut violations = Vec::new();

        let rdn = self.check_dn(entry, &mut violations);
        let resolution = self.resolve_object_classes(entry, &mut violations);
        let allowed = self.allowed_attributes(&resolution);

        self.check_missing_attributes(entry, rdn.as_ref(), &allowed, &mut violations);
        for attribute in entry.attributes() {
            self.check_attribute(attribute, &allowed, &mut violations);
        }
        self.check_auxiliary_classes(&resolution, &mut violations);
        if let Some(rdn) = &rdn {
            self.check_rdn(entry, rdn, &allowed, resolution.name_form, &mut violations);
        }

        self.counters.record(&violations);
        if !violations.is_empty() {
            debug!(
                "Entry '{}' violates the schema in {} way(s)",
                entry.dn(),
                violations.len()
            );
        }
        ValidationOutcome {
            violations,
            structural_class: resolution
                .structural
                .map(|class| class.name_or_oid().to_string()),
        }
    }

    /// Validate an entry, appending the reason for each violation to `reasons`.
    pub fn entry_is_valid(&self, entry: &Entry, reasons: &mut Vec<String>) -> bool {
        let outcome = self.validate(entry);
        reasons.extend(outcome.reasons());
        outcome.is_valid()
    }

    fn check_dn(&self, entry: &Entry, violations: &mut Vec<EntryViolation>) -> Option<Rdn> {
        match parse_rdn(entry.dn()) {
            Ok(rdn) => rdn,
            Err(DnError::Malformed { reason, .. }) => {
                if self.config.check_malformed_dns {
                    violations.push(EntryViolation::MalformedDn {
                        dn: entry.dn().to_string(),
                        reason,
                    });
                }
                None
            }
        }
    }

    /// Resolve the declared object classes and their superiors, then find the
    /// structural class and the content rule and name form it brings.
    fn resolve_object_classes(
        &self,
        entry: &Entry,
        violations: &mut Vec<EntryViolation>,
    ) -> ClassResolution<'_> {
        let schema = self.schema.as_ref();
        let declared = entry.object_class_values();

        let mut seen = HashSet::new();
        let mut classes: Vec<&ObjectClassDefinition> = Vec::new();
        for value in &declared {
            match schema.object_class(value) {
                Some(class) => {
                    if seen.insert(class.oid().to_ascii_lowercase()) {
                        classes.push(class);
                    }
                }
                None if self.config.check_undefined_object_classes => {
                    violations.push(EntryViolation::UndefinedObjectClass {
                        object_class: value.clone(),
                    });
                }
                None => {}
            }
        }

        let declared_count = classes.len();
        for position in 0..declared_count {
            let class = classes[position];
            for superior in class.superior_classes(schema, true) {
                if !seen.insert(superior.oid().to_ascii_lowercase()) {
                    continue;
                }
                if self.config.check_missing_superior_object_classes {
                    violations.push(EntryViolation::MissingSuperiorObjectClass {
                        superior: superior.name_or_oid().to_string(),
                        object_class: class.name_or_oid().to_string(),
                    });
                }
                classes.push(superior);
            }
        }

        let structural = if declared.is_empty() {
            if self.config.check_structural_object_classes {
                violations.push(EntryViolation::NoObjectClasses);
            }
            None
        } else {
            self.structural_class(&classes, violations)
        };

        ClassResolution {
            content_rule: structural.and_then(|s| schema.dit_content_rule(s.oid())),
            name_form: structural.and_then(|s| schema.name_form_by_object_class(s.oid())),
            classes,
            structural,
        }
    }

    /// Reduce the class set to the single structural class that defines the entry.
    fn structural_class<'s>(
        &'s self,
        classes: &[&'s ObjectClassDefinition],
        violations: &mut Vec<EntryViolation>,
    ) -> Option<&'s ObjectClassDefinition> {
        let schema = self.schema.as_ref();
        let mut removed = HashSet::new();
        for class in classes {
            let kind = class.object_class_type(schema);
            if kind == ObjectClassType::Abstract {
                continue;
            }
            if kind == ObjectClassType::Auxiliary {
                removed.insert(class.oid().to_ascii_lowercase());
            }
            for superior in class.superior_classes(schema, true) {
                removed.insert(superior.oid().to_ascii_lowercase());
            }
        }

        let mut candidates = Vec::new();
        for class in classes {
            if removed.contains(&class.oid().to_ascii_lowercase()) {
                continue;
            }
            if class.object_class_type(schema) == ObjectClassType::Abstract {
                if self.config.check_prohibited_object_classes {
                    violations.push(EntryViolation::AbstractObjectClass {
                        object_class: class.name_or_oid().to_string(),
                    });
                }
                continue;
            }
            candidates.push(*class);
        }

        match candidates.as_slice() {
            [structural] => Some(*structural),
            [] => {
                if self.config.check_structural_object_classes {
                    violations.push(EntryViolation::NoStructuralClass);
                }
                None
            }
            _ => {
                if self.config.check_structural_object_classes {
                    violations.push(EntryViolation::MultipleStructuralClasses {
                        classes: candidates
                            .iter()
                            .map(|c| c.name_or_oid().to_string())
                            .collect(),
                    });
                }
                None
            }
        }
    }

    fn allowed_attributes<'s>(&'s self, resolution: &ClassResolution<'s>) -> AllowedAttributes<'s> {
        let schema = self.schema.as_ref();
        let mut allowed = AllowedAttributes::default();

        for class in resolution.classes.iter().copied() {
            for attribute_type in class.required_attributes(schema, true) {
                allowed.require(attribute_type);
            }
        }
        if let Some(rule) = resolution.content_rule {
            for attribute_type in rule
                .required_attributes()
                .iter()
                .filter_map(|name| schema.attribute_type(name))
            {
                allowed.require(attribute_type);
            }
        }

        if resolution.classes.iter().any(|c| c.is_extensible_object()) {
            for attribute_type in schema.user_attribute_types() {
                allowed.allow(attribute_type);
            }
            return allowed;
        }

        for class in resolution.classes.iter().copied() {
            for attribute_type in class.optional_attributes(schema, true) {
                allowed.allow(attribute_type);
            }
        }
        if let Some(rule) = resolution.content_rule {
            for attribute_type in rule
                .optional_attributes()
                .iter()
                .filter_map(|name| schema.attribute_type(name))
            {
                allowed.allow(attribute_type);
            }
            for attribute_type in rule
                .prohibited_attributes()
                .iter()
                .filter_map(|name| schema.attribute_type(name))
            {
                allowed.prohibit(attribute_type);
            }
        }
        allowed
    }

    fn check_missing_attributes(
        &self,
        entry: &Entry,
        rdn: Option<&Rdn>,
        allowed: &AllowedAttributes<'_>,
        violations: &mut Vec<EntryViolation>,
    ) {
        if !self.config.check_missing_attributes {
            return;
        }
        for attribute_type in &allowed.required {
            let in_entry = entry
                .attributes()
                .iter()
                .any(|a| attribute_type.has_name_or_oid(a.base_name()));
            let in_rdn = rdn.is_some_and(|rdn| {
                rdn.attribute_names()
                    .any(|name| attribute_type.has_name_or_oid(base_name(name)))
            });
            if !in_entry && !in_rdn {
                violations.push(EntryViolation::MissingAttribute {
                    attribute: attribute_type.name_or_oid().to_string(),
                });
            }
        }
    }

    fn check_attribute(
        &self,
        attribute: &Attribute,
        allowed: &AllowedAttributes<'_>,
        violations: &mut Vec<EntryViolation>,
    ) {
        let name = attribute.base_name();
        let is_object_class = name.eq_ignore_ascii_case(OBJECT_CLASS_ATTRIBUTE)
            || name.eq_ignore_ascii_case(OBJECT_CLASS_OID);

        let Some(attribute_type) = self.schema.attribute_type(name) else {
            if self.config.check_undefined_attributes && !is_object_class {
                violations.push(EntryViolation::UndefinedAttribute {
                    attribute: name.to_string(),
                });
            }
            return;
        };

        if self.config.check_prohibited_attributes
            && !is_object_class
            && !attribute_type.is_operational()
            && !allowed.permits(attribute_type)
        {
            violations.push(EntryViolation::ProhibitedAttribute {
                attribute: name.to_string(),
            });
        }

        if self.config.check_single_valued_attributes
            && attribute_type.is_single_valued()
            && attribute.len() > 1
        {
            violations.push(EntryViolation::SingleValueViolation {
                attribute: name.to_string(),
                count: attribute.len(),
            });
        }

        if self.config.check_attribute_syntax {
            let rule = self
                .matching_rules
                .select_equality_rule(name, None, Some(self.schema.as_ref()));
            for value in attribute.values() {
                if let Err(error) = rule.normalize(value) {
                    violations.push(EntryViolation::AttributeSyntax {
                        attribute: name.to_string(),
                        value: String::from_utf8_lossy(value).into_owned(),
                        reason: error.to_string(),
                    });
                }
            }
        }
    }

    fn check_auxiliary_classes(
        &self,
        resolution: &ClassResolution<'_>,
        violations: &mut Vec<EntryViolation>,
    ) {
        if !self.config.check_prohibited_object_classes {
            return;
        }
        let Some(rule) = resolution.content_rule else {
            return;
        };
        for class in &resolution.classes {
            if class.object_class_type(&self.schema) != ObjectClassType::Auxiliary {
                continue;
            }
            let listed = rule
                .auxiliary_classes()
                .iter()
                .any(|name| class.has_name_or_oid(name));
            if !listed {
                violations.push(EntryViolation::AuxiliaryClassNotAllowed {
                    object_class: class.name_or_oid().to_string(),
                    content_rule: rule.name_or_oid().to_string(),
                });
            }
        }
    }

    fn check_rdn(
        &self,
        entry: &Entry,
        rdn: &Rdn,
        allowed: &AllowedAttributes<'_>,
        name_form: Option<&NameFormDefinition>,
        violations: &mut Vec<EntryViolation>,
    ) {
        let name_form = name_form.filter(|_| self.config.check_name_forms);

        for component in rdn.components() {
            let name = base_name(component.attribute());
            match self.schema.attribute_type(name) {
                None => {
                    if self.config.check_undefined_attributes {
                        violations.push(EntryViolation::UndefinedRdnAttribute {
                            attribute: name.to_string(),
                        });
                    }
                }
                Some(attribute_type) => {
                    if self.config.check_prohibited_attributes
                        && !attribute_type.is_operational()
                        && !allowed.permits(attribute_type)
                    {
                        violations.push(EntryViolation::ProhibitedRdnAttribute {
                            attribute: name.to_string(),
                        });
                    }
                }
            }

            if let Some(name_form) = name_form {
                let permitted = name_form
                    .required_attributes()
                    .iter()
                    .chain(name_form.optional_attributes())
                    .any(|listed| self.same_attribute_type(listed, name));
                if !permitted {
                    violations.push(EntryViolation::NameFormProhibitedAttribute {
                        attribute: name.to_string(),
                        name_form: name_form.name_or_oid().to_string(),
                    });
                }
            }
        }

        if let Some(name_form) = name_form {
            for required in name_form.required_attributes() {
                let present = rdn
                    .attribute_names()
                    .any(|name| self.same_attribute_type(required, base_name(name)));
                if !present {
                    violations.push(EntryViolation::NameFormMissingAttribute {
                        attribute: required.clone(),
                        name_form: name_form.name_or_oid().to_string(),
                    });
                }
            }
        }

        if self.config.check_entry_missing_rdn_values {
            self.check_rdn_values(entry, rdn, violations);
        }
    }

    /// Each RDN value must also be one of the entry's values for that attribute,
    /// compared with the attribute's equality matching rule.
    fn check_rdn_values(&self, entry: &Entry, rdn: &Rdn, violations: &mut Vec<EntryViolation>) {
        for component in rdn.components() {
            let name = base_name(component.attribute());
            let rule = self
                .matching_rules
                .select_equality_rule(name, None, Some(self.schema.as_ref()));
            let wanted = rule.normalize(component.value()).ok();
            let present = self.attributes_of_type(entry, name).any(|attribute| {
                attribute.values().iter().any(|value| match &wanted {
                    Some(wanted) => rule.normalize(value).ok().as_ref() == Some(wanted),
                    None => value.as_slice() == component.value(),
                })
            });
            if !present {
                violations.push(EntryViolation::MissingRdnValue {
                    attribute: name.to_string(),
                    value: component.value_string(),
                });
            }
        }
    }

    /// Attributes of the entry that hold values of the named type, whichever of
    /// its names or OID they use.
    fn attributes_of_type<'e>(
        &'e self,
        entry: &'e Entry,
        name: &'e str,
    ) -> impl Iterator<Item = &'e Attribute> + 'e {
        entry
            .attributes()
            .iter()
            .filter(move |attribute| self.same_attribute_type(attribute.base_name(), name))
    }

    /// Whether two attribute names or OIDs denote the same attribute type.
    fn same_attribute_type(&self, first: &str, second: &str) -> bool {
        if first.eq_ignore_ascii_case(second) {
            return true;
        }
        match (
            self.schema.attribute_type(first),
            self.schema.attribute_type(second),
        ) {
            (Some(a), Some(b)) => a.oid().eq_ignore_ascii_case(b.oid()),
            _ => false,
        }
    }

    pub fn entries_examined(&self) -> u64 {
        self.counters.entries_examined()
    }

    pub fn invalid_entries(&self) -> u64 {
        self.counters.invalid_entries()
    }

    pub fn malformed_dn_entries(&self) -> u64 {
        self.counters.category(ViolationCategory::MalformedDn)
    }

    pub fn entries_without_object_classes(&self) -> u64 {
        self.counters.category(ViolationCategory::NoObjectClasses)
    }

    pub fn entries_missing_structural_class(&self) -> u64 {
        self.counters.category(ViolationCategory::NoStructuralClass)
    }

    pub fn entries_with_multiple_structural_classes(&self) -> u64 {
        self.counters
            .category(ViolationCategory::MultipleStructuralClasses)
    }

    pub fn entries_with_name_form_violations(&self) -> u64 {
        self.counters.category(ViolationCategory::NameForm)
    }

    pub fn entries_missing_rdn_values(&self) -> u64 {
        self.counters.category(ViolationCategory::MissingRdnValue)
    }

    /// Number of entries missing each required attribute, by lower-cased name.
    pub fn missing_attribute_counts(&self) -> BTreeMap<String, u64> {
        self.counters.tally(ViolationCategory::MissingAttribute)
    }

    pub fn prohibited_attribute_counts(&self) -> BTreeMap<String, u64> {
        self.counters.tally(ViolationCategory::ProhibitedAttribute)
    }

    pub fn undefined_attribute_counts(&self) -> BTreeMap<String, u64> {
        self.counters.tally(ViolationCategory::UndefinedAttribute)
    }

    pub fn single_value_violation_counts(&self) -> BTreeMap<String, u64> {
        self.counters.tally(ViolationCategory::SingleValueViolation)
    }

    pub fn attribute_syntax_violation_counts(&self) -> BTreeMap<String, u64> {
        self.counters.tally(ViolationCategory::AttributeSyntax)
    }

    pub fn undefined_object_class_counts(&self) -> BTreeMap<String, u64> {
        self.counters.tally(ViolationCategory::UndefinedObjectClass)
    }

    pub fn prohibited_object_class_counts(&self) -> BTreeMap<String, u64> {
        self.counters.tally(ViolationCategory::ProhibitedObjectClass)
    }

    pub fn missing_superior_object_class_counts(&self) -> BTreeMap<String, u64> {
        self.counters
            .tally(ViolationCategory::MissingSuperiorObjectClass)
    }

    /// A serializable snapshot of every counter and tally.
    pub fn statistics(&self) -> ValidationStatistics {
        self.counters.snapshot()
    }

    /// Human-readable summary of the invalid entries seen so far.
    ///
    /// See [`ValidationStatistics::summary_lines`].
    pub fn invalid_entry_summary(&self, detailed: bool) -> Vec<String> {
        self.statistics().summary_lines(detailed)
    }

    /// Clear every counter and tally. Must not race with in-flight validations.
    pub fn reset_counts(&self) {
        trace!("Resetting entry validation statistics");
        self.counters.reset();
    }
}
