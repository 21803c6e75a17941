//! Running counters, statistics snapshots and summaries.

use crate::common::builders::PersonBuilder;
use crate::common::fixtures::people_schema;
use ldap_schema::{EntryValidator, ValidationStatistics, ViolationCategory};

fn validate_sample(validator: &EntryValidator) {
    let entries = [
        PersonBuilder::new().build(),
        PersonBuilder::new().without_surname().build(),
        PersonBuilder::new().without_surname().with_undefined_attribute().build(),
        PersonBuilder::new().with_prohibited_attribute().build(),
    ];
    for entry in &entries {
        validator.validate(entry);
    }
}

#[test]
fn test_counters_agree_with_outcomes() {
    let validator = EntryValidator::new(people_schema());
    validate_sample(&validator);

    assert_eq!(validator.entries_examined(), 4);
    assert_eq!(validator.invalid_entries(), 3);

    let statistics = validator.statistics();
    assert_eq!(statistics.entries_examined, 4);
    assert_eq!(statistics.invalid_entries, 3);
    assert_eq!(statistics.category(ViolationCategory::MissingAttribute), 2);
    assert_eq!(statistics.category(ViolationCategory::UndefinedAttribute), 1);
    assert_eq!(statistics.category(ViolationCategory::ProhibitedAttribute), 1);
    assert_eq!(statistics.category(ViolationCategory::NameForm), 0);

    let missing = statistics
        .tally(ViolationCategory::MissingAttribute)
        .cloned()
        .unwrap_or_default();
    assert_eq!(missing.get("sn"), Some(&2));
    assert_eq!(missing, validator.missing_attribute_counts());
    assert!(statistics.tally(ViolationCategory::NameForm).is_none());
}

#[test]
fn test_summary_lines() {
    let validator = EntryValidator::new(people_schema());
    validate_sample(&validator);

    let summary = validator.invalid_entry_summary(false);
    assert_eq!(
        summary,
        [
            "3 of 4 entries examined (75.00%) did not conform to the schema",
            "2 entries (50.00%) were missing required attributes",
            "1 entries (25.00%) had undefined attributes",
            "1 entries (25.00%) had prohibited attributes",
        ]
    );

    let detailed = validator.invalid_entry_summary(true);
    assert_eq!(detailed[2], "    sn: 2 entries (50.00%)");
    assert_eq!(detailed[4], "    shoesize: 1 entries (25.00%)");
    assert_eq!(detailed.len(), 7);
}

#[test]
fn test_statistics_serialize_as_json() {
    let validator = EntryValidator::new(people_schema());
    validate_sample(&validator);

    let statistics = validator.statistics();
    let json = serde_json::to_value(&statistics).unwrap();
    assert_eq!(json["invalid_entries"], 3);
    assert_eq!(json["categories"]["missing_attribute"], 2);
    assert_eq!(json["tallies"]["prohibited_attribute"]["employeecount"], 1);

    let restored: ValidationStatistics = serde_json::from_value(json).unwrap();
    assert_eq!(restored, statistics);
}

#[test]
fn test_reset_counts() {
    let validator = EntryValidator::new(people_schema());
    validate_sample(&validator);
    assert!(validator.invalid_entries() > 0);

    validator.reset_counts();
    let statistics = validator.statistics();
    assert_eq!(statistics.entries_examined, 0);
    assert_eq!(statistics.invalid_entries, 0);
    assert!(statistics.categories.values().all(|count| *count == 0));
    assert!(statistics.tallies.is_empty());
    assert!(validator.missing_attribute_counts().is_empty());
    assert_eq!(
        validator.invalid_entry_summary(true),
        ["0 of 0 entries examined (0.00%) did not conform to the schema"]
    );

    validator.validate(&PersonBuilder::new().without_surname().build());
    assert_eq!(validator.entries_examined(), 1);
    assert_eq!(validator.missing_attribute_counts().get("sn"), Some(&1));
}
