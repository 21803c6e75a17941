//! One validator shared between threads.

use crate::common::builders::PersonBuilder;
use crate::common::fixtures::people_schema;
use ldap_schema::{EntryValidator, ViolationCategory};
use std::sync::Arc;
use std::thread;

const THREADS: usize = 8;
const ENTRIES_PER_THREAD: usize = 250;

#[test]
fn test_concurrent_validation_counts_every_entry() {
    let validator = Arc::new(EntryValidator::new(people_schema()));

    let handles: Vec<_> = (0..THREADS)
        .map(|worker| {
            let validator = Arc::clone(&validator);
            thread::spawn(move || {
                let mut invalid = 0;
                for index in 0..ENTRIES_PER_THREAD {
                    let dn = format!("cn=user{worker}-{index},dc=example,dc=com");
                    let builder = PersonBuilder::named(&dn);
                    let entry = if index % 2 == 0 {
                        builder.build()
                    } else {
                        builder.without_surname().with_undefined_attribute().build()
                    };
                    if !validator.validate(&entry).is_valid() {
                        invalid += 1;
                    }
                }
                invalid
            })
        })
        .collect();

    let invalid: u64 = handles
        .into_iter()
        .map(|handle| handle.join().unwrap())
        .sum();

    let total = (THREADS * ENTRIES_PER_THREAD) as u64;
    assert_eq!(invalid, total / 2);
    assert_eq!(validator.entries_examined(), total);
    assert_eq!(validator.invalid_entries(), total / 2);

    let statistics = validator.statistics();
    assert_eq!(statistics.category(ViolationCategory::MissingAttribute), total / 2);
    assert_eq!(statistics.category(ViolationCategory::UndefinedAttribute), total / 2);
    assert_eq!(validator.missing_attribute_counts().get("sn"), Some(&(total / 2)));
    assert_eq!(validator.undefined_attribute_counts().get("shoesize"), Some(&(total / 2)));
}

#[test]
fn test_reset_while_validating_leaves_consistent_counters() {
    let validator = Arc::new(EntryValidator::new(people_schema()));
    let entry = PersonBuilder::new().without_surname().build();

    thread::scope(|scope| {
        for _ in 0..4 {
            scope.spawn(|| {
                for _ in 0..100 {
                    validator.validate(&entry);
                }
            });
        }
        scope.spawn(|| {
            for _ in 0..10 {
                validator.reset_counts();
            }
        });
    });

    // A reset racing with a validation may split that entry's two counters.
    assert!(validator.entries_examined() <= 400);
    assert!(validator.invalid_entries() <= validator.entries_examined() + 4);

    validator.reset_counts();
    validator.validate(&entry);
    assert_eq!(validator.entries_examined(), 1);
    assert_eq!(validator.invalid_entries(), 1);
    assert_eq!(validator.missing_attribute_counts().get("sn"), Some(&1));
}
