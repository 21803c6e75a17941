//! Schemas and entries read from LDIF documents.

use crate::common::fixtures::{PEOPLE_LDIF, SUBSCHEMA_LDIF};
use crate::common::{assert_valid, init_logging};
use ldap_schema::ldif;
use ldap_schema::{DefinitionKind, EntryValidator, EntryViolation, LdifError, Schema};
use std::io::Cursor;
use std::sync::Arc;

fn subschema() -> Schema {
    let mut entries = ldif::parse_entries(SUBSCHEMA_LDIF).unwrap();
    assert_eq!(entries.len(), 1);
    Schema::new(entries.remove(0))
}

#[test]
fn test_schema_from_exported_subschema_entry() {
    init_logging();
    let schema = subschema();

    assert_eq!(schema.subschema_entry().dn(), "cn=schema");
    assert_eq!(
        schema.attribute_type("objectClass").map(|t| t.oid()),
        Some("2.5.4.0")
    );
    assert_eq!(
        schema.effective_syntax_oid("cn"),
        Some("1.3.6.1.4.1.1466.115.121.1.15")
    );
    // The malformed definition is skipped, the rest survive.
    assert!(schema.attribute_type("broken").is_none());
    assert_eq!(schema.attribute_types().len(), 4);
    assert_eq!(
        schema.name_form_by_object_class("person").map(|f| f.oid()),
        Some("9.9.3.2")
    );
}

#[test]
fn test_each_bad_definition_can_be_reported() {
    let entries = ldif::parse_entries(SUBSCHEMA_LDIF).unwrap();
    let subschema = &entries[0];

    let failures: Vec<String> = DefinitionKind::ALL
        .into_iter()
        .filter_map(|kind| subschema.attribute(kind.attribute_name()).map(|a| (kind, a)))
        .flat_map(|(kind, attribute)| {
            attribute
                .string_values()
                .filter_map(move |value| kind.check_definition(&value).err())
                .map(|e| e.to_string())
                .collect::<Vec<_>>()
        })
        .collect();

    assert_eq!(failures.len(), 1);
    assert!(failures[0].contains("9.9.1.99"), "{}", failures[0]);
}

#[test]
fn test_entries_validated_against_loaded_schema() {
    let validator = EntryValidator::new(Arc::new(subschema()));
    let entries = ldif::read_entries(Cursor::new(PEOPLE_LDIF.as_bytes())).unwrap();
    assert_eq!(entries.len(), 3);

    assert_valid(&validator.validate(&entries[0]));
    assert_eq!(
        validator.validate(&entries[1]).violations(),
        [EntryViolation::MissingAttribute {
            attribute: "sn".to_string(),
        }]
    );

    // The base64 value decodes to the cn the name form asks for, but the RDN
    // names the entry by sn.
    assert_eq!(
        entries[2].attribute("cn").map(|a| a.values().to_vec()),
        Some(vec![b"Bob".to_vec()])
    );
    assert_eq!(
        validator.validate(&entries[2]).violations(),
        [
            EntryViolation::NameFormProhibitedAttribute {
                attribute: "sn".to_string(),
                name_form: "personNameForm".to_string(),
            },
            EntryViolation::NameFormMissingAttribute {
                attribute: "cn".to_string(),
                name_form: "personNameForm".to_string(),
            },
        ]
    );

    assert_eq!(validator.entries_examined(), 3);
    assert_eq!(validator.invalid_entries(), 2);
}

#[test]
fn test_malformed_ldif_is_rejected() {
    let error = ldif::parse_entries("dn: cn=Bob,dc=example\nthis line has no separator\n").unwrap_err();
    assert!(matches!(error, LdifError::Malformed { line: 2, .. }), "{error}");

    let error = ldif::parse_entries("dn: cn=Bob,dc=example\ncn:: not base64!\n").unwrap_err();
    assert!(error.to_string().contains("line 2"), "{error}");
}

#[test]
fn test_schema_definitions_survive_ldif_round_trip() {
    let schema = subschema();
    let rebuilt = Schema::from_definitions(DefinitionKind::ALL.into_iter().flat_map(|kind| {
        schema
            .definition_strings(kind)
            .into_iter()
            .map(move |definition| (kind, definition.to_string()))
    }));
    assert_eq!(rebuilt, schema);
}
