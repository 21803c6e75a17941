//! Entries checked against the schema bundled with the crate.

use crate::common::{assert_categories, assert_valid};
use ldap_schema::schema::{ObjectClassDefinition, ObjectClassType};
use ldap_schema::{
    DefinitionKind, Entry, EntryValidator, EntryViolation, Schema, SchemaElement, ViolationCategory,
};
use std::sync::{Arc, OnceLock};

fn default_schema() -> Arc<Schema> {
    static SCHEMA: OnceLock<Arc<Schema>> = OnceLock::new();
    Arc::clone(SCHEMA.get_or_init(|| Arc::new(Schema::load_default())))
}

fn jane() -> Entry {
    Entry::new("uid=jdoe,ou=People,dc=example,dc=com")
        .with_attribute(
            "objectClass",
            ["top", "person", "organizationalPerson", "inetOrgPerson"],
        )
        .with_attribute("uid", ["jdoe"])
        .with_attribute("cn", ["Jane Doe"])
        .with_attribute("sn", ["Doe"])
        .with_attribute("givenName", ["Jane"])
        .with_attribute("mail", ["jane.doe@example.com"])
        .with_attribute("telephoneNumber", ["+1 555 0100"])
        .with_attribute("employeeNumber", ["4711"])
}

#[test]
fn test_inet_org_person() {
    let validator = EntryValidator::new(default_schema());
    let outcome = validator.validate(&jane());
    assert_valid(&outcome);
    assert_eq!(outcome.structural_class(), Some("inetOrgPerson"));
}

#[test]
fn test_inet_org_person_violations() {
    let validator = EntryValidator::new(default_schema());
    let mut entry = jane()
        .with_attribute("employeeNumber", ["4712"])
        .with_attribute("mail", ["jäne@example.com"])
        .with_attribute("serialNumber", ["A-1"]);
    entry.remove_attribute("sn");

    let outcome = validator.validate(&entry);
    assert_categories(
        &outcome,
        &[
            ViolationCategory::MissingAttribute,
            ViolationCategory::SingleValueViolation,
            ViolationCategory::AttributeSyntax,
            ViolationCategory::ProhibitedAttribute,
        ],
    );
    assert!(outcome.violations().contains(&EntryViolation::SingleValueViolation {
        attribute: "employeeNumber".to_string(),
        count: 2,
    }));
}

#[test]
fn test_inet_org_person_media_and_certificates() {
    let validator = EntryValidator::new(default_schema());
    let der = vec![0x30, 0x82, 0x01, 0xff, 0x00, 0xc3];
    let entry = jane()
        .with_attribute("labeledURI", ["https://example.com/~jdoe Home Page"])
        .with_attribute("userCertificate;binary", [der.clone()])
        .with_attribute("photo", [vec![0x00, 0xfe, 0x80]])
        .with_attribute("audio", [der]);

    let outcome = validator.validate(&entry);
    assert_valid(&outcome);
    assert_eq!(validator.invalid_entries(), 0);
}

#[test]
fn test_organizational_units_and_domains() {
    let validator = EntryValidator::new(default_schema());

    let people = Entry::new("ou=People,dc=example,dc=com")
        .with_attribute("objectClass", ["top", "organizationalUnit"])
        .with_attribute("ou", ["People"])
        .with_attribute("description", ["Everyone"]);
    assert_valid(&validator.validate(&people));

    let domain = Entry::new("dc=example,dc=com")
        .with_attribute("objectClass", ["top", "organization", "dcObject"])
        .with_attribute("o", ["Example"])
        .with_attribute("dc", ["example"]);
    let outcome = validator.validate(&domain);
    assert_valid(&outcome);
    assert_eq!(outcome.structural_class(), Some("organization"));
}

#[test]
fn test_default_schema_partitions() {
    let schema = default_schema();
    let lookup: &Schema = &schema;
    let is = |kind: ObjectClassType| {
        move |class: &&ObjectClassDefinition| class.object_class_type(lookup) == kind
    };

    let classes = schema.object_classes();
    assert_eq!(
        classes.iter().filter(is(ObjectClassType::Abstract)).count(),
        schema.abstract_object_classes().len()
    );
    assert_eq!(
        classes.iter().filter(is(ObjectClassType::Auxiliary)).count(),
        schema.auxiliary_object_classes().len()
    );
    assert_eq!(
        schema.abstract_object_classes().len()
            + schema.auxiliary_object_classes().len()
            + schema.structural_object_classes().len(),
        classes.len()
    );
    assert!(
        schema
            .auxiliary_object_classes()
            .iter()
            .any(|class| class.is_extensible_object())
    );
    assert_eq!(
        schema.user_attribute_types().len() + schema.operational_attribute_types().len(),
        schema.attribute_types().len()
    );
    assert!(
        schema
            .subordinate_attribute_types("name")
            .iter()
            .any(|t| t.has_name_or_oid("cn"))
    );
}

#[test]
fn test_merged_schema_extends_the_default() {
    let extension = Schema::from_definitions([
        (
            DefinitionKind::AttributeType,
            "( 1.3.6.1.4.1.99999.1.1 NAME 'badgeNumber' EQUALITY integerMatch SYNTAX 1.3.6.1.4.1.1466.115.121.1.27 SINGLE-VALUE )",
        ),
        (
            DefinitionKind::ObjectClass,
            "( 1.3.6.1.4.1.99999.2.1 NAME 'badgeHolder' SUP top AUXILIARY MUST badgeNumber )",
        ),
        // Redefines description as single-valued.
        (
            DefinitionKind::AttributeType,
            "( 2.5.4.13 NAME 'description' EQUALITY caseIgnoreMatch SYNTAX 1.3.6.1.4.1.1466.115.121.1.15 SINGLE-VALUE )",
        ),
    ]);
    let base = default_schema();
    let merged = Schema::merge(&[base.as_ref(), &extension]).unwrap();
    assert_eq!(
        merged.attribute_types().len(),
        base.attribute_types().len() + 1
    );
    assert!(merged.attribute_type("description").unwrap().is_single_valued());

    let validator = EntryValidator::new(Arc::new(merged));
    let entry = jane().with_attribute("objectClass", ["badgeHolder"]);
    assert_eq!(
        validator.validate(&entry).violations(),
        [EntryViolation::MissingAttribute {
            attribute: "badgeNumber".to_string(),
        }]
    );

    let entry = jane()
        .with_attribute("objectClass", ["badgeHolder"])
        .with_attribute("badgeNumber", ["1024"])
        .with_attribute("description", ["one", "two"]);
    assert_categories(
        &validator.validate(&entry),
        &[ViolationCategory::SingleValueViolation],
    );
}
