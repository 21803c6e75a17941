//! Test data builders for creating conforming and non-conforming entries.
//!
//! Each builder starts from an entry that conforms to the people schema and
//! records the violation categories every modification is expected to produce,
//! so a test can check the validator's verdict against the builder's.

use ldap_schema::{Attribute, Entry, ViolationCategory};

/// Builder for `person` entries with a fluent API for introducing violations
#[derive(Debug, Clone)]
pub struct PersonBuilder {
    entry: Entry,
    expected: Vec<ViolationCategory>,
}

impl PersonBuilder {
    /// Create a new PersonBuilder for `cn=Bob,dc=example,dc=com`
    pub fn new() -> Self {
        Self::named("cn=Bob,dc=example,dc=com")
    }

    /// Create a PersonBuilder with the given DN and the usual `cn` and `sn`
    pub fn named(dn: &str) -> Self {
        Self {
            entry: Entry::new(dn)
                .with_attribute("objectClass", ["top", "person"])
                .with_attribute("cn", ["Bob"])
                .with_attribute("sn", ["Smith"]),
            expected: Vec::new(),
        }
    }

    /// Add values to an attribute without expecting any violation
    pub fn with_attribute(mut self, name: &str, values: &[&str]) -> Self {
        self.entry.add_attribute(Attribute::new(name, values.iter().copied()));
        self
    }

    /// Add an auxiliary class without expecting any violation
    pub fn with_object_class(self, object_class: &str) -> Self {
        self.with_attribute("objectClass", &[object_class])
    }

    /// Remove the surname, which `person` requires
    pub fn without_surname(mut self) -> Self {
        self.entry.remove_attribute("sn");
        self.expected.push(ViolationCategory::MissingAttribute);
        self
    }

    /// Add an attribute no schema in the suite defines
    pub fn with_undefined_attribute(self) -> Self {
        self.with_attribute("shoeSize", &["42"])
            .expecting(ViolationCategory::UndefinedAttribute)
    }

    /// Add `employeeCount` without the `counted` class that allows it
    pub fn with_prohibited_attribute(self) -> Self {
        self.with_attribute("employeeCount", &["3"])
            .expecting(ViolationCategory::ProhibitedAttribute)
    }

    /// Add a second structural class unrelated to `person`
    pub fn with_second_structural_class(self) -> Self {
        self.with_object_class("device")
            .expecting(ViolationCategory::MultipleStructuralClasses)
    }

    /// Add an object class the schema does not define
    pub fn with_undefined_object_class(self) -> Self {
        self.with_object_class("wizard")
            .expecting(ViolationCategory::UndefinedObjectClass)
    }

    /// Replace the DN with one that does not parse
    pub fn with_malformed_dn(mut self) -> Self {
        let mut entry = Entry::new("cn=Bob,=example");
        for attribute in self.entry.attributes() {
            entry.add_attribute(attribute.clone());
        }
        self.entry = entry;
        self.expected.push(ViolationCategory::MalformedDn);
        self
    }

    /// Record an additional expected violation category
    pub fn expecting(mut self, category: ViolationCategory) -> Self {
        self.expected.push(category);
        self
    }

    /// Build the entry
    pub fn build(self) -> Entry {
        self.entry
    }

    /// Build the entry along with the violation categories it should produce
    pub fn build_with_expectations(self) -> (Entry, Vec<ViolationCategory>) {
        (self.entry, self.expected)
    }
}

impl Default for PersonBuilder {
    fn default() -> Self {
        Self::new()
    }
}
