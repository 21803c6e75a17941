//! Test fixtures: schema definitions and LDIF documents.
//!
//! The people schema is small enough to reason about in a test yet exercises
//! every definition kind the validator consults: abstract, structural and
//! auxiliary classes, attribute inheritance, an operational attribute, and a
//! name form with its structure rule.

use ldap_schema::Schema;
use ldap_schema::schema::DefinitionKind;
use std::sync::Arc;

pub const EXTENSIBLE_OBJECT_OID: &str = "1.3.6.1.4.1.1466.101.120.111";

/// Definitions shared by every schema in the suite.
pub const PEOPLE_DEFINITIONS: &[(DefinitionKind, &str)] = &[
    (
        DefinitionKind::AttributeType,
        "( 2.5.4.0 NAME 'objectClass' EQUALITY objectIdentifierMatch SYNTAX 1.3.6.1.4.1.1466.115.121.1.38 )",
    ),
    (
        DefinitionKind::AttributeType,
        "( 2.5.4.41 NAME 'name' EQUALITY caseIgnoreMatch SYNTAX 1.3.6.1.4.1.1466.115.121.1.15 )",
    ),
    (DefinitionKind::AttributeType, "( 2.5.4.3 NAME ( 'cn' 'commonName' ) SUP name )"),
    (DefinitionKind::AttributeType, "( 2.5.4.4 NAME ( 'sn' 'surname' ) SUP name )"),
    (
        DefinitionKind::AttributeType,
        "( 2.5.4.13 NAME 'description' EQUALITY caseIgnoreMatch SYNTAX 1.3.6.1.4.1.1466.115.121.1.15 )",
    ),
    (
        DefinitionKind::AttributeType,
        "( 2.5.4.20 NAME 'telephoneNumber' EQUALITY telephoneNumberMatch SYNTAX 1.3.6.1.4.1.1466.115.121.1.50 )",
    ),
    (
        DefinitionKind::AttributeType,
        "( 0.9.2342.19200300.100.1.1 NAME 'uid' EQUALITY caseIgnoreMatch SYNTAX 1.3.6.1.4.1.1466.115.121.1.15 )",
    ),
    (
        DefinitionKind::AttributeType,
        "( 9.9.1.1 NAME 'employeeCount' EQUALITY integerMatch SYNTAX 1.3.6.1.4.1.1466.115.121.1.27 SINGLE-VALUE )",
    ),
    (
        DefinitionKind::AttributeType,
        "( 9.9.1.2 NAME 'roomNumber' EQUALITY caseIgnoreMatch SYNTAX 1.3.6.1.4.1.1466.115.121.1.15 )",
    ),
    (
        DefinitionKind::AttributeType,
        "( 2.5.18.1 NAME 'createTimestamp' EQUALITY generalizedTimeMatch SYNTAX 1.3.6.1.4.1.1466.115.121.1.24 SINGLE-VALUE NO-USER-MODIFICATION USAGE directoryOperation )",
    ),
    (DefinitionKind::ObjectClass, "( 2.5.6.0 NAME 'top' ABSTRACT MUST objectClass )"),
    (
        DefinitionKind::ObjectClass,
        "( 2.5.6.6 NAME 'person' SUP top STRUCTURAL MUST ( sn $ cn ) MAY ( description $ telephoneNumber ) )",
    ),
    (
        DefinitionKind::ObjectClass,
        "( 2.5.6.14 NAME 'device' SUP top STRUCTURAL MUST cn MAY description )",
    ),
    (
        DefinitionKind::ObjectClass,
        "( 9.9.2.3 NAME 'account' SUP top STRUCTURAL MUST uid MAY description )",
    ),
    (
        DefinitionKind::ObjectClass,
        "( 9.9.2.1 NAME 'counted' SUP top AUXILIARY MAY employeeCount )",
    ),
    (
        DefinitionKind::ObjectClass,
        "( 9.9.2.2 NAME 'badged' SUP top AUXILIARY MAY roomNumber )",
    ),
    (
        DefinitionKind::ObjectClass,
        "( 1.3.6.1.4.1.1466.101.120.111 NAME 'extensibleObject' SUP top AUXILIARY )",
    ),
    (
        DefinitionKind::NameForm,
        "( 9.9.3.1 NAME 'accountNameForm' OC account MUST uid )",
    ),
    (
        DefinitionKind::DitStructureRule,
        "( 1 NAME 'accountStructure' FORM accountNameForm )",
    ),
];

/// A content rule for `person`: `counted` is the only auxiliary class allowed,
/// a description is required and telephone numbers are not permitted.
pub const PERSON_CONTENT_RULE: &str =
    "( 2.5.6.6 NAME 'personContentRule' AUX counted MUST description NOT telephoneNumber )";

/// The people schema.
pub fn people_schema() -> Arc<Schema> {
    schema_with(&[])
}

/// The people schema plus extra definitions.
pub fn schema_with(extra: &[(DefinitionKind, &str)]) -> Arc<Schema> {
    Arc::new(Schema::from_definitions(
        PEOPLE_DEFINITIONS.iter().chain(extra).copied(),
    ))
}

/// The people schema with [`PERSON_CONTENT_RULE`] in effect.
pub fn content_rule_schema() -> Arc<Schema> {
    schema_with(&[(DefinitionKind::DitContentRule, PERSON_CONTENT_RULE)])
}

/// A subschema entry as a directory server would export it, with a folded line
/// and one definition that does not parse.
pub const SUBSCHEMA_LDIF: &str = "\
version: 1
# exported subschema
dn: cn=schema
objectClass: top
objectClass: subschema
cn: schema
attributeTypes: ( 2.5.4.0 NAME 'objectClass' EQUALITY objectIdentifierMatch SY
 NTAX 1.3.6.1.4.1.1466.115.121.1.38 )
attributeTypes: ( 2.5.4.41 NAME 'name' EQUALITY caseIgnoreMatch SYNTAX 1.3.6.1
 .4.1.1466.115.121.1.15 )
attributeTypes: ( 2.5.4.3 NAME 'cn' SUP name )
attributeTypes: ( 2.5.4.4 NAME 'sn' SUP name )
attributeTypes: ( 9.9.1.99 NAME 'broken' SYNTAX )
objectClasses: ( 2.5.6.0 NAME 'top' ABSTRACT MUST objectClass )
objectClasses: ( 2.5.6.6 NAME 'person' SUP top STRUCTURAL MUST ( sn $ cn ) )
nameForms: ( 9.9.3.2 NAME 'personNameForm' OC person MUST cn )
";

/// Entries to check against [`SUBSCHEMA_LDIF`]: one valid, one missing `sn`
/// and one named by an attribute its name form does not allow.
pub const PEOPLE_LDIF: &str = "\
dn: cn=Alice,dc=example,dc=com
objectClass: top
objectClass: person
cn: Alice
sn: Liddell

dn: cn=Broken,dc=example,dc=com
objectClass: top
objectClass: person
cn: Broken

dn: sn=Smith,dc=example,dc=com
objectClass: top
objectClass: person
cn:: Qm9i
sn: Smith
";
