//! Object class resolution, structural class selection and DIT content rules.

use crate::common::builders::PersonBuilder;
use crate::common::fixtures::{content_rule_schema, people_schema, schema_with};
use crate::common::{assert_categories, assert_valid, init_logging};
use ldap_schema::schema::DefinitionKind;
use ldap_schema::{Entry, EntryValidator, EntryViolation, ViolationCategory};

#[test]
fn test_structural_auxiliary_and_abstract_resolve_to_the_structural_class() {
    init_logging();
    let validator = EntryValidator::new(people_schema());

    for classes in [
        ["top", "person", "counted"],
        ["counted", "person", "top"],
        ["person", "counted", "top"],
    ] {
        let entry = Entry::new("cn=Bob,dc=example,dc=com")
            .with_attribute("objectClass", classes)
            .with_attribute("cn", ["Bob"])
            .with_attribute("sn", ["Smith"]);
        let outcome = validator.validate(&entry);
        assert_valid(&outcome);
        assert_eq!(outcome.structural_class(), Some("person"));
    }
}

#[test]
fn test_structural_superiors_do_not_compete() {
    let schema = schema_with(&[(
        DefinitionKind::ObjectClass,
        "( 9.9.2.4 NAME 'employee' SUP person STRUCTURAL MAY employeeCount )",
    )]);
    let validator = EntryValidator::new(schema);

    let entry = PersonBuilder::new()
        .with_object_class("employee")
        .with_attribute("employeeCount", &["7"])
        .build();
    let outcome = validator.validate(&entry);
    assert_valid(&outcome);
    assert_eq!(outcome.structural_class(), Some("employee"));
}

#[test]
fn test_second_independent_structural_class() {
    let validator = EntryValidator::new(people_schema());
    let (entry, expected) = PersonBuilder::new()
        .with_second_structural_class()
        .build_with_expectations();

    let outcome = validator.validate(&entry);
    assert_categories(&outcome, &expected);
    assert_eq!(
        outcome.violations(),
        [EntryViolation::MultipleStructuralClasses {
            classes: vec!["person".to_string(), "device".to_string()],
        }]
    );
    assert_eq!(outcome.structural_class(), None);
    assert_eq!(validator.entries_with_multiple_structural_classes(), 1);
}

#[test]
fn test_no_structural_class() {
    let validator = EntryValidator::new(people_schema());
    let entry = Entry::new("cn=Bob,dc=example,dc=com").with_attribute("objectClass", ["top", "counted"]);

    let outcome = validator.validate(&entry);
    assert_categories(
        &outcome,
        &[
            ViolationCategory::NoStructuralClass,
            ViolationCategory::ProhibitedAttribute,
        ],
    );
    assert!(outcome.reasons()[0].contains("does not have a structural object class"));
    assert_eq!(validator.entries_missing_structural_class(), 1);
}

#[test]
fn test_abstract_class_cannot_stand_alone() {
    let validator = EntryValidator::new(people_schema());
    let entry = Entry::new("dc=example,dc=com").with_attribute("objectClass", ["top"]);

    let outcome = validator.validate(&entry);
    assert!(outcome.violations().contains(&EntryViolation::AbstractObjectClass {
        object_class: "top".to_string(),
    }));
    assert!(outcome.violations().contains(&EntryViolation::NoStructuralClass));
    assert_eq!(validator.prohibited_object_class_counts().get("top"), Some(&1));
}

#[test]
fn test_missing_superior_is_reported_once_and_resolved() {
    let validator = EntryValidator::new(people_schema());
    let entry = Entry::new("cn=Bob,dc=example,dc=com")
        .with_attribute("objectClass", ["person", "counted"])
        .with_attribute("cn", ["Bob"])
        .with_attribute("sn", ["Smith"]);

    let outcome = validator.validate(&entry);
    assert_eq!(
        outcome.violations(),
        [EntryViolation::MissingSuperiorObjectClass {
            superior: "top".to_string(),
            object_class: "person".to_string(),
        }]
    );
    assert_eq!(outcome.structural_class(), Some("person"));
    assert_eq!(
        validator.missing_superior_object_class_counts().get("top"),
        Some(&1)
    );
}

#[test]
fn test_undefined_object_class_does_not_hide_the_structural_class() {
    let validator = EntryValidator::new(people_schema());
    let (entry, expected) = PersonBuilder::new()
        .with_undefined_object_class()
        .build_with_expectations();

    let outcome = validator.validate(&entry);
    assert_categories(&outcome, &expected);
    assert_eq!(outcome.structural_class(), Some("person"));
    assert_eq!(validator.undefined_object_class_counts().get("wizard"), Some(&1));
}

#[test]
fn test_content_rule_adds_required_attributes() {
    let validator = EntryValidator::new(content_rule_schema());

    let outcome = validator.validate(&PersonBuilder::new().build());
    assert_eq!(
        outcome.violations(),
        [EntryViolation::MissingAttribute {
            attribute: "description".to_string(),
        }]
    );

    let described = PersonBuilder::new()
        .with_attribute("description", &["Builder"])
        .build();
    assert_valid(&validator.validate(&described));

    // Both the class and the rule contribute to the required set.
    let outcome = validator.validate(&PersonBuilder::new().without_surname().build());
    assert_categories(
        &outcome,
        &[
            ViolationCategory::MissingAttribute,
            ViolationCategory::MissingAttribute,
        ],
    );
    let statistics = validator.statistics();
    assert_eq!(statistics.category(ViolationCategory::MissingAttribute), 2);
    assert_eq!(validator.missing_attribute_counts().get("description"), Some(&2));
    assert_eq!(validator.missing_attribute_counts().get("sn"), Some(&1));
}

#[test]
fn test_content_rule_prohibits_listed_attributes() {
    let validator = EntryValidator::new(content_rule_schema());
    let entry = PersonBuilder::new()
        .with_attribute("description", &["Builder"])
        .with_attribute("telephoneNumber", &["+1 555 0100"])
        .build();

    let outcome = validator.validate(&entry);
    assert_eq!(
        outcome.violations(),
        [EntryViolation::ProhibitedAttribute {
            attribute: "telephoneNumber".to_string(),
        }]
    );
}

#[test]
fn test_content_rule_limits_auxiliary_classes() {
    let validator = EntryValidator::new(content_rule_schema());

    let allowed = PersonBuilder::new()
        .with_attribute("description", &["Builder"])
        .with_object_class("counted")
        .with_attribute("employeeCount", &["12"])
        .build();
    assert_valid(&validator.validate(&allowed));

    let outcome = validator.validate(
        &PersonBuilder::new()
            .with_attribute("description", &["Builder"])
            .with_object_class("badged")
            .with_attribute("roomNumber", &["4B"])
            .build(),
    );
    assert_eq!(
        outcome.violations(),
        [EntryViolation::AuxiliaryClassNotAllowed {
            object_class: "badged".to_string(),
            content_rule: "personContentRule".to_string(),
        }]
    );

    let mut lenient = EntryValidator::new(content_rule_schema());
    lenient.set_check_prohibited_object_classes(false);
    let entry = PersonBuilder::new()
        .with_attribute("description", &["Builder"])
        .with_object_class("badged")
        .build();
    assert_valid(&lenient.validate(&entry));
}

#[test]
fn test_extensible_object_allows_any_user_attribute() {
    let validator = EntryValidator::new(people_schema());
    let entry = PersonBuilder::new()
        .with_object_class("extensibleObject")
        .with_attribute("employeeCount", &["3"])
        .with_attribute("roomNumber", &["4B"])
        .with_attribute("uid", &["bob"])
        .build();
    assert_valid(&validator.validate(&entry));

    // Undefined attributes are still undefined.
    let (entry, expected) = PersonBuilder::new()
        .with_object_class("1.3.6.1.4.1.1466.101.120.111")
        .with_undefined_attribute()
        .build_with_expectations();
    assert_categories(&validator.validate(&entry), &expected);
}

#[test]
fn test_extensible_object_ignores_content_rule_exclusions() {
    let validator = EntryValidator::new(content_rule_schema());
    let entry = PersonBuilder::new()
        .with_attribute("description", &["Builder"])
        .with_object_class("extensibleObject")
        .with_attribute("telephoneNumber", &["+1 555 0100"])
        .build();

    // The rule still governs which auxiliary classes may appear.
    let outcome = validator.validate(&entry);
    assert_eq!(
        outcome.violations(),
        [EntryViolation::AuxiliaryClassNotAllowed {
            object_class: "extensibleObject".to_string(),
            content_rule: "personContentRule".to_string(),
        }]
    );
}
