//! Required, optional, single-valued and syntax checks on attributes.

use crate::common::builders::PersonBuilder;
use crate::common::fixtures::people_schema;
use crate::common::{assert_categories, assert_valid, categories};
use ldap_schema::{EntryValidator, EntryViolation, ValidatorConfig, ViolationCategory};

fn counted_person(counts: &[&str]) -> PersonBuilder {
    PersonBuilder::new()
        .with_object_class("counted")
        .with_attribute("employeeCount", counts)
}

#[test]
fn test_builder_expectations_match_the_validator() {
    let validator = EntryValidator::new(people_schema());
    let cases = [
        PersonBuilder::new(),
        PersonBuilder::new().without_surname(),
        PersonBuilder::new().with_undefined_attribute(),
        PersonBuilder::new().with_prohibited_attribute(),
        PersonBuilder::new()
            .without_surname()
            .with_undefined_attribute()
            .with_prohibited_attribute(),
    ];

    for builder in cases {
        let (entry, expected) = builder.build_with_expectations();
        assert_categories(&validator.validate(&entry), &expected);
    }
}

#[test]
fn test_attribute_names_and_options_are_resolved() {
    let validator = EntryValidator::new(people_schema());
    let entry = PersonBuilder::new()
        .with_attribute("DESCRIPTION;lang-en", &["Builder"])
        .with_attribute("2.5.4.20", &["+1 555 0100"])
        .build();
    assert_valid(&validator.validate(&entry));

    // Aliases of a required attribute satisfy it.
    let entry = PersonBuilder::new()
        .without_surname()
        .with_attribute("surname", &["Smith"])
        .build();
    assert_valid(&validator.validate(&entry));
}

#[test]
fn test_operational_attributes_are_always_permitted() {
    let validator = EntryValidator::new(people_schema());
    let entry = PersonBuilder::new()
        .with_attribute("createTimestamp", &["20240101120000Z"])
        .build();
    assert_valid(&validator.validate(&entry));
}

#[test]
fn test_single_value_with_syntax_checks_on() {
    let validator = EntryValidator::new(people_schema());

    let outcome = validator.validate(&counted_person(&["12", "13"]).build());
    assert_eq!(
        outcome.violations(),
        [EntryViolation::SingleValueViolation {
            attribute: "employeeCount".to_string(),
            count: 2,
        }]
    );

    let outcome = validator.validate(&counted_person(&["12", "dozen"]).build());
    assert_eq!(
        categories(&outcome),
        [
            ViolationCategory::SingleValueViolation,
            ViolationCategory::AttributeSyntax,
        ]
    );
    assert!(outcome.reasons()[1].contains("'dozen'"));
    assert_eq!(
        validator.single_value_violation_counts().get("employeecount"),
        Some(&2)
    );
    assert_eq!(
        validator.attribute_syntax_violation_counts().get("employeecount"),
        Some(&1)
    );
}

#[test]
fn test_single_value_with_syntax_checks_off() {
    let validator = EntryValidator::new(people_schema())
        .with_config(ValidatorConfig::default().with_attribute_syntax(false));

    let outcome = validator.validate(&counted_person(&["12", "dozen"]).build());
    assert_eq!(
        categories(&outcome),
        [ViolationCategory::SingleValueViolation]
    );
    assert_valid(&validator.validate(&counted_person(&["dozen"]).build()));

    let mut validator = validator;
    validator.set_check_single_valued_attributes(false);
    assert_valid(&validator.validate(&counted_person(&["12", "dozen"]).build()));
}

#[test]
fn test_syntax_violations_name_each_bad_value() {
    let validator = EntryValidator::new(people_schema());
    let entry = PersonBuilder::new()
        .with_attribute("createTimestamp", &["yesterday"])
        .with_attribute("telephoneNumber", &["+1 555 0100", " - "])
        .build();

    let outcome = validator.validate(&entry);
    assert_categories(
        &outcome,
        &[
            ViolationCategory::AttributeSyntax,
            ViolationCategory::AttributeSyntax,
        ],
    );
    let tallies = validator.attribute_syntax_violation_counts();
    assert_eq!(tallies.get("createtimestamp"), Some(&1));
    assert_eq!(tallies.get("telephonenumber"), Some(&1));
    assert_eq!(validator.invalid_entries(), 1);
}

#[test]
fn test_disabled_checks_report_nothing() {
    let validator = EntryValidator::new(people_schema()).with_config(ValidatorConfig::all_disabled());
    let entry = PersonBuilder::new()
        .without_surname()
        .with_undefined_attribute()
        .with_prohibited_attribute()
        .with_second_structural_class()
        .with_malformed_dn()
        .build();

    assert_valid(&validator.validate(&entry));
    assert_eq!(validator.entries_examined(), 1);
    assert_eq!(validator.invalid_entries(), 0);
}
