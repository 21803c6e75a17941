//! Property tests: built definitions re-parse to themselves.

use ldap_schema::schema::{
    AttributeTypeDefinition, AttributeUsage, DitContentRuleDefinition,
    DitStructureRuleDefinition, MatchingRuleDefinition, MatchingRuleUseDefinition,
    NameFormDefinition, ObjectClassDefinition, ObjectClassType, escape_qdstring,
};
use ldap_schema::{DefinitionKind, Schema, SchemaElement, SchemaError};
use proptest::prelude::*;
use std::fmt::Debug;
use std::str::FromStr;

/// Parse, render and re-parse a definition, checking nothing is lost.
fn reparsed<T>(definition: &str) -> T
where
    T: FromStr<Err = SchemaError> + SchemaElement + PartialEq + Debug,
{
    let parsed: T = definition.parse().unwrap();
    let rendered = parsed.definition_string().to_string();
    let again: T = rendered.parse().unwrap();
    assert_eq!(again, parsed);
    assert_eq!(again.definition_string(), rendered);
    again
}

fn numeric_oid() -> impl Strategy<Value = String> {
    prop::collection::vec(0u32..100_000, 1..6).prop_map(|arcs| {
        let tail: Vec<String> = arcs.iter().map(u32::to_string).collect();
        format!("1.3.{}", tail.join("."))
    })
}

fn descriptor() -> impl Strategy<Value = String> {
    "[a-zA-Z][a-zA-Z0-9-]{0,15}"
}

fn usage() -> impl Strategy<Value = AttributeUsage> {
    prop_oneof![
        Just(AttributeUsage::UserApplications),
        Just(AttributeUsage::DirectoryOperation),
        Just(AttributeUsage::DistributedOperation),
        Just(AttributeUsage::DsaOperation),
    ]
}

fn rotated(mut values: Vec<String>, by: usize) -> Vec<String> {
    if !values.is_empty() {
        let by = by % values.len();
        values.rotate_left(by);
    }
    values
}

fn class_type() -> impl Strategy<Value = ObjectClassType> {
    prop_oneof![
        Just(ObjectClassType::Abstract),
        Just(ObjectClassType::Structural),
        Just(ObjectClassType::Auxiliary),
    ]
}

proptest! {
    #[test]
    fn escaped_values_are_printable_ascii(value in any::<String>()) {
        let mut out = String::new();
        escape_qdstring(&value, &mut out);
        prop_assert!(out.chars().all(|c| (' '..='~').contains(&c)));
        prop_assert!(!out.contains('\''));
    }

    #[test]
    fn descriptions_survive_rendering(description in "\\PC{1,40}") {
        let built = ObjectClassDefinition::builder("1.3.6.1.4.1.99999.2")
            .name("roundTrip")
            .description(description.clone())
            .build()
            .unwrap();
        let parsed = ObjectClassDefinition::parse(built.definition_string()).unwrap();
        prop_assert_eq!(parsed.description(), Some(description.as_str()));
    }

    #[test]
    fn attribute_types_round_trip(
        oid in numeric_oid(),
        names in prop::collection::vec(descriptor(), 0..4),
        single_value in any::<bool>(),
        usage in usage(),
        extension in prop::option::of(prop::collection::vec("[ -~]{1,12}", 1..3)),
    ) {
        let mut builder = AttributeTypeDefinition::builder(oid.clone())
            .syntax_oid("1.3.6.1.4.1.1466.115.121.1.15{64}")
            .equality_matching_rule("caseIgnoreMatch")
            .single_value(single_value)
            .usage(usage);
        for name in &names {
            builder = builder.name(name.clone());
        }
        if let Some(values) = extension {
            builder = builder.extension("X-ORIGIN", values);
        }
        let built = builder.build().unwrap();

        let parsed: AttributeTypeDefinition = built.definition_string().parse().unwrap();
        prop_assert_eq!(&parsed, &built);
        prop_assert_eq!(parsed.definition_string(), built.definition_string());
        prop_assert_eq!(parsed.names(), names.as_slice());
        prop_assert_eq!(parsed.usage(), usage);

        let schema = Schema::from_definitions([(DefinitionKind::AttributeType, built.to_string())]);
        prop_assert!(schema.attribute_type(&oid).is_some());
        for name in &names {
            prop_assert!(schema.attribute_type(&name.to_uppercase()).is_some());
        }
    }

    #[test]
    fn object_classes_round_trip(
        oid in numeric_oid(),
        kind in class_type(),
        required in prop::collection::vec(descriptor(), 0..4),
        optional in prop::collection::vec(descriptor(), 0..4),
    ) {
        let mut builder = ObjectClassDefinition::builder(oid)
            .name("generated")
            .superior_class("top")
            .object_class_type(kind);
        for attribute in &required {
            builder = builder.required_attribute(attribute.clone());
        }
        for attribute in &optional {
            builder = builder.optional_attribute(attribute.clone());
        }
        let built = builder.build().unwrap();

        let json = serde_json::to_string(&built).unwrap();
        let restored: ObjectClassDefinition = serde_json::from_str(&json).unwrap();
        prop_assert_eq!(&restored, &built);
        prop_assert_eq!(restored.explicit_type(), Some(kind));
        prop_assert_eq!(restored.required_attribute_names(), required.as_slice());
        prop_assert_eq!(restored.optional_attribute_names(), optional.as_slice());
    }
}

#[test]
fn test_dit_content_rule_round_trip() {
    let rule: DitContentRuleDefinition = reparsed(
        "( 2.5.6.6 NAME ( 'personRule' 'people' ) DESC 'O\\27Brien \\5C co' OBSOLETE \
         AUX ( counted $ badged ) MUST ( cn $ sn ) MAY description NOT ( telephoneNumber $ seeAlso ) \
         X-ORIGIN ( 'site' 'local' ) X-SCOPE 'people' )",
    );
    assert_eq!(rule.description(), Some("O'Brien \\ co"));
    assert!(rule.is_obsolete());
    assert_eq!(rule.auxiliary_classes(), ["counted", "badged"]);
    assert_eq!(rule.prohibited_attributes().len(), 2);
    assert_eq!(rule.extensions().get("X-ORIGIN").map(<[String]>::len), Some(2));

    let shuffled: DitContentRuleDefinition = "( 2.5.6.6 NAME ( 'PEOPLE' 'PersonRule' ) DESC 'O\\27Brien \\5C co' OBSOLETE \
         AUX ( BADGED $ counted ) MUST ( SN $ cn ) MAY DESCRIPTION NOT ( seeAlso $ telephonenumber ) \
         X-ORIGIN ( 'local' 'site' ) X-SCOPE 'people' )"
        .parse()
        .unwrap();
    assert_eq!(shuffled, rule);
}

#[test]
fn test_dit_structure_rule_round_trip() {
    let rule: DitStructureRuleDefinition = reparsed(
        "( 7 NAME ( 'unitRule' 'ouRule' ) DESC 'Units below organizations' OBSOLETE \
         FORM ouNameForm SUP ( 1 3 ) X-ORIGIN 'site' )",
    );
    assert_eq!(rule.rule_id(), 7);
    assert_eq!(rule.superior_rule_ids(), [1, 3]);
    assert!(rule.is_obsolete());

    let shuffled: DitStructureRuleDefinition =
        "( 7 NAME ( 'OURULE' 'unitrule' ) DESC 'Units below organizations' OBSOLETE FORM OUNAMEFORM SUP ( 3 1 ) X-ORIGIN 'site' )"
            .parse()
            .unwrap();
    assert_eq!(shuffled, rule);
}

#[test]
fn test_name_form_round_trip() {
    let form: NameFormDefinition = reparsed(
        "( 9.9.3.7 NAME ( 'NF' 'personForm' ) DESC 'People by name' OBSOLETE OC Person \
         MUST ( SN $ cn ) MAY ( uid $ mail ) X-ORIGIN ( 'one' 'two' ) )",
    );
    assert_eq!(form.structural_class(), "Person");
    assert_eq!(form.required_attributes(), ["SN", "cn"]);

    let shuffled: NameFormDefinition =
        "( 9.9.3.7 NAME ( 'personform' 'nf' ) DESC 'People by name' OBSOLETE OC person MUST ( cn $ sn ) MAY ( MAIL $ uid ) X-ORIGIN ( 'two' 'one' ) )"
            .parse()
            .unwrap();
    assert_eq!(shuffled, form);
    assert_ne!(
        shuffled,
        "( 9.9.3.7 NAME ( 'NF' 'personForm' ) DESC 'People by name' OC Person MUST ( SN $ cn ) MAY ( uid $ mail ) X-ORIGIN ( 'one' 'two' ) )"
            .parse::<NameFormDefinition>()
            .unwrap()
    );
}

#[test]
fn test_matching_rule_round_trip() {
    let rule: MatchingRuleDefinition = reparsed(
        "( 1.3.6.1.4.1.99999.4.1 NAME ( 'badgeMatch' 'badgeNumberMatch' ) DESC 'Badges \\27 numbers' \
         OBSOLETE SYNTAX 1.3.6.1.4.1.1466.115.121.1.27 X-ORIGIN ( 'site' 'local' ) X-NOTE 'n' )",
    );
    assert_eq!(rule.syntax_oid(), "1.3.6.1.4.1.1466.115.121.1.27");
    assert_eq!(rule.description(), Some("Badges ' numbers"));

    let shuffled: MatchingRuleDefinition = "( 1.3.6.1.4.1.99999.4.1 NAME ( 'BADGENUMBERMATCH' 'badgematch' ) \
         DESC 'Badges \\27 numbers' OBSOLETE SYNTAX 1.3.6.1.4.1.1466.115.121.1.27 \
         X-ORIGIN ( 'local' 'site' ) X-NOTE 'n' )"
        .parse()
        .unwrap();
    assert_eq!(shuffled, rule);
}

#[test]
fn test_matching_rule_use_round_trip() {
    let rule_use: MatchingRuleUseDefinition = reparsed(
        "( 2.5.13.2 NAME 'caseIgnoreUse' DESC 'Names compared without case' OBSOLETE \
         APPLIES ( cn $ sn $ 2.5.4.41 ) X-ORIGIN ( 'RFC 4512' 'site' ) )",
    );
    assert_eq!(rule_use.applicable_attribute_types(), ["cn", "sn", "2.5.4.41"]);

    let shuffled: MatchingRuleUseDefinition = "( 2.5.13.2 NAME 'CASEIGNOREUSE' DESC 'Names compared without case' OBSOLETE \
         APPLIES ( 2.5.4.41 $ SN $ CN ) X-ORIGIN ( 'site' 'RFC 4512' ) )"
        .parse()
        .unwrap();
    assert_eq!(shuffled, rule_use);
}

proptest! {
    #[test]
    fn name_forms_round_trip(
        oid in numeric_oid(),
        names in prop::collection::vec(descriptor(), 0..3),
        description in prop::option::of("\\PC{1,30}"),
        obsolete in any::<bool>(),
        required in prop::collection::vec(descriptor(), 1..4),
        optional in prop::collection::vec(descriptor(), 0..4),
        rotation in 0usize..4,
    ) {
        let build = |required: &[String], optional: &[String]| {
            let mut builder = NameFormDefinition::builder(oid.clone())
                .structural_class("person")
                .obsolete(obsolete)
                .extension("X-ORIGIN", vec!["generated".to_string(), "test".to_string()]);
            for name in &names {
                builder = builder.name(name.clone());
            }
            if let Some(description) = &description {
                builder = builder.description(description.clone());
            }
            for attribute in required {
                builder = builder.required_attribute(attribute.clone());
            }
            for attribute in optional {
                builder = builder.optional_attribute(attribute.clone());
            }
            builder.build().unwrap()
        };
        let built = build(&required, &optional);
        let parsed = NameFormDefinition::parse(built.definition_string()).unwrap();
        prop_assert_eq!(&parsed, &built);
        prop_assert_eq!(parsed.definition_string(), built.definition_string());
        prop_assert_eq!(parsed.description(), description.as_deref());

        let reordered = build(
            &rotated(required.iter().map(|a| a.to_uppercase()).collect(), rotation),
            &rotated(optional.clone(), rotation),
        );
        prop_assert_eq!(&reordered, &parsed);
    }

    #[test]
    fn dit_content_rules_round_trip(
        oid in numeric_oid(),
        auxiliary in prop::collection::vec(descriptor(), 0..3),
        required in prop::collection::vec(descriptor(), 0..3),
        prohibited in prop::collection::vec(descriptor(), 0..3),
        obsolete in any::<bool>(),
    ) {
        let mut builder = DitContentRuleDefinition::builder(oid)
            .name("generatedRule")
            .description("generated")
            .obsolete(obsolete)
            .extension("X-ORIGIN", vec!["test".to_string()]);
        for class in &auxiliary {
            builder = builder.auxiliary_class(class.clone());
        }
        for attribute in &required {
            builder = builder.required_attribute(attribute.clone());
        }
        for attribute in &prohibited {
            builder = builder.prohibited_attribute(attribute.clone());
        }
        let built = builder.build().unwrap();

        let parsed: DitContentRuleDefinition = built.definition_string().parse().unwrap();
        prop_assert_eq!(&parsed, &built);
        prop_assert_eq!(parsed.auxiliary_classes(), auxiliary.as_slice());
        prop_assert_eq!(parsed.prohibited_attributes(), prohibited.as_slice());
    }
}
