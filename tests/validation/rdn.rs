//! RDN checks: naming attributes, name forms and RDN values.

use crate::common::builders::PersonBuilder;
use crate::common::fixtures::people_schema;
use crate::common::{assert_categories, assert_valid};
use ldap_schema::schema::DefinitionKind;
use ldap_schema::{Entry, EntryValidator, EntryViolation, Schema, ViolationCategory};
use std::sync::Arc;

fn account(dn: &str) -> Entry {
    Entry::new(dn)
        .with_attribute("objectClass", ["top", "account"])
        .with_attribute("uid", ["bob"])
}

#[test]
fn test_multi_valued_rdn_satisfies_required_attributes() {
    // person with no superior, content rule or name form
    let schema = Arc::new(Schema::from_definitions([
        (
            DefinitionKind::AttributeType,
            "( 2.5.4.3 NAME 'cn' EQUALITY caseIgnoreMatch SYNTAX 1.3.6.1.4.1.1466.115.121.1.15 )",
        ),
        (
            DefinitionKind::AttributeType,
            "( 2.5.4.4 NAME 'sn' EQUALITY caseIgnoreMatch SYNTAX 1.3.6.1.4.1.1466.115.121.1.15 )",
        ),
        (
            DefinitionKind::AttributeType,
            "( 2.5.4.13 NAME 'description' EQUALITY caseIgnoreMatch SYNTAX 1.3.6.1.4.1.1466.115.121.1.15 )",
        ),
        (
            DefinitionKind::ObjectClass,
            "( 2.5.6.6 NAME 'person' STRUCTURAL MUST ( cn $ sn ) MAY description )",
        ),
    ]));
    let validator = EntryValidator::new(schema);

    let mut entry = Entry::new("cn=Bob+sn=Smith,dc=example")
        .with_attribute("objectClass", ["person"])
        .with_attribute("cn", ["Bob"])
        .with_attribute("sn", ["Smith"]);
    let mut reasons = Vec::new();
    assert!(validator.entry_is_valid(&entry, &mut reasons));
    assert!(reasons.is_empty());

    assert!(entry.remove_attribute("sn"));
    assert!(validator.entry_is_valid(&entry, &mut reasons), "{reasons:?}");
    assert!(reasons.is_empty());
    assert_eq!(validator.entries_examined(), 2);
    assert_eq!(validator.invalid_entries(), 0);
}

#[test]
fn test_rdn_attributes_must_be_defined_and_allowed() {
    let validator = EntryValidator::new(people_schema());

    let outcome = validator.validate(&PersonBuilder::named("shoeSize=42,dc=example,dc=com").build());
    assert_eq!(
        outcome.violations(),
        [EntryViolation::UndefinedRdnAttribute {
            attribute: "shoeSize".to_string(),
        }]
    );

    let outcome = validator.validate(&PersonBuilder::named("uid=bob,dc=example,dc=com").build());
    assert_eq!(
        outcome.violations(),
        [EntryViolation::ProhibitedRdnAttribute {
            attribute: "uid".to_string(),
        }]
    );
}

#[test]
fn test_name_form_governs_naming_attributes() {
    let validator = EntryValidator::new(people_schema());
    assert_valid(&validator.validate(&account("uid=bob,dc=example,dc=com")));

    let outcome = validator.validate(
        &account("description=Bob,dc=example,dc=com").with_attribute("description", ["Bob"]),
    );
    assert_eq!(
        outcome.violations(),
        [
            EntryViolation::NameFormProhibitedAttribute {
                attribute: "description".to_string(),
                name_form: "accountNameForm".to_string(),
            },
            EntryViolation::NameFormMissingAttribute {
                attribute: "uid".to_string(),
                name_form: "accountNameForm".to_string(),
            },
        ]
    );

    // Two violations from one entry still count as one entry.
    let outcome = validator.validate(
        &account("uid=bob+description=Bob,dc=example,dc=com").with_attribute("description", ["Bob"]),
    );
    assert_categories(&outcome, &[ViolationCategory::NameForm]);
    assert_eq!(validator.entries_with_name_form_violations(), 2);
}

#[test]
fn test_name_form_check_can_be_disabled() {
    let mut validator = EntryValidator::new(people_schema());
    validator.set_check_name_forms(false);
    let entry = account("description=Bob,dc=example,dc=com").with_attribute("description", ["Bob"]);
    assert_valid(&validator.validate(&entry));
}

#[test]
fn test_rdn_values_must_appear_in_the_entry() {
    let mut validator = EntryValidator::new(people_schema());
    validator.set_check_entry_missing_rdn_values(true);

    assert_valid(&validator.validate(&PersonBuilder::named("CN=  bob,dc=example,dc=com").build()));
    assert_valid(&validator.validate(&PersonBuilder::named("commonName=BOB,dc=example,dc=com").build()));

    let outcome = validator.validate(&PersonBuilder::named("cn=Robert+sn=Smith,dc=example,dc=com").build());
    assert_eq!(
        outcome.violations(),
        [EntryViolation::MissingRdnValue {
            attribute: "cn".to_string(),
            value: "Robert".to_string(),
        }]
    );
    assert_eq!(validator.entries_missing_rdn_values(), 1);
}

#[test]
fn test_malformed_dn_skips_naming_checks() {
    let validator = EntryValidator::new(people_schema());
    let (entry, expected) = PersonBuilder::new().with_malformed_dn().build_with_expectations();

    let outcome = validator.validate(&entry);
    assert_categories(&outcome, &expected);
    assert!(outcome.reasons()[0].contains("cn=Bob,=example"));
    assert_eq!(validator.malformed_dn_entries(), 1);
}
