//! # LDAP Schema Validator
//!
//! A command-line utility that loads a directory schema from an LDIF export of
//! a subschema entry and checks LDIF entries against it.
//!
//! ## Usage
//!
//! ### Check a Schema
//!
//! ```bash
//! cargo run --bin schema-validator subschema.ldif
//! ```
//!
//! ### Validate Entries
//!
//! ```bash
//! cargo run --bin schema-validator subschema.ldif entries.ldif --detailed
//! cargo run --bin schema-validator subschema.ldif entries.ldif --json --config checks.json
//! ```
//!
//! `--config` names a JSON file of validator flags, for example
//! `{ "check_attribute_syntax": false }`. Set `RUST_LOG=debug` to see each
//! skipped definition and invalid entry as it is processed.
//!
//! ## Output Examples
//!
//! ```text
//! Loading schema from: subschema.ldif
//! ✓ Schema loaded from cn=schema
//!
//! Schema Summary:
//!   Attribute syntaxes: 35
//!   Matching rules: 32
//!   Attribute types: 97 (24 operational)
//!   Object classes: 19 (1 abstract, 4 auxiliary, 14 structural)
//!   DIT content rules: 0
//!   DIT structure rules: 0
//!   Name forms: 0
//!
//! Validating entries from: entries.ldif
//!
//! ❌ cn=Broken,dc=example,dc=com
//!     - The entry is missing required attribute 'sn'
//!
//! Validation Summary:
//!   1 of 12 entries examined (8.33%) did not conform to the schema
//!   1 entries (8.33%) were missing required attributes
//! ```
//!
//! ## Exit Codes
//!
//! - `0`: Every definition parsed and every entry is valid
//! - `1`: A definition failed to parse, an entry is invalid, or an error occurred

use ldap_schema::entry::Entry;
use ldap_schema::ldif;
use ldap_schema::schema::{DefinitionKind, Schema};
use ldap_schema::validation::{EntryValidator, ValidatorConfig};
use std::env;
use std::fs::{self, File};
use std::io::BufReader;
use std::path::{Path, PathBuf};
use std::process;
use std::sync::Arc;

#[derive(Debug, Default)]
struct Options {
    schema_path: PathBuf,
    entries_path: Option<PathBuf>,
    config_path: Option<PathBuf>,
    detailed: bool,
    json: bool,
}

fn main() {
    env_logger::init();

    let args: Vec<String> = env::args().collect();
    let options = match parse_args(args.get(1..).unwrap_or(&[])) {
        Ok(options) => options,
        Err(message) => {
            let program = args.first().map(String::as_str).unwrap_or("schema-validator");
            eprintln!("Error: {message}");
            eprintln!();
            eprintln!(
                "Usage: {program} <subschema.ldif> [entries.ldif] [--detailed] [--json] [--config <file.json>]"
            );
            eprintln!();
            eprintln!("Examples:");
            eprintln!("  {program} subschema.ldif");
            eprintln!("  {program} subschema.ldif people.ldif --detailed");
            process::exit(1);
        }
    };

    match run(&options) {
        Ok(true) => {}
        Ok(false) => process::exit(1),
        Err(e) => {
            eprintln!("❌ {e}");
            process::exit(1);
        }
    }
}

fn parse_args(args: &[String]) -> Result<Options, String> {
    let mut options = Options::default();
    let mut positional = Vec::new();
    let mut iter = args.iter();

    while let Some(arg) = iter.next() {
        match arg.as_str() {
            "--detailed" => options.detailed = true,
            "--json" => options.json = true,
            "--config" => {
                let path = iter.next().ok_or("--config requires a file name")?;
                options.config_path = Some(PathBuf::from(path));
            }
            flag if flag.starts_with("--") => return Err(format!("unknown option '{flag}'")),
            path => positional.push(PathBuf::from(path)),
        }
    }

    let mut positional = positional.into_iter();
    options.schema_path = positional.next().ok_or("a subschema LDIF file is required")?;
    options.entries_path = positional.next();
    if positional.next().is_some() {
        return Err("too many arguments".to_string());
    }
    Ok(options)
}

/// Returns whether everything checked was valid.
fn run(options: &Options) -> Result<bool, Box<dyn std::error::Error>> {
    println!("Loading schema from: {}", options.schema_path.display());
    let subschema = load_subschema_entry(&options.schema_path)?;

    let invalid_definitions = report_invalid_definitions(&subschema);
    let schema = Schema::new(subschema);
    if invalid_definitions == 0 {
        println!("✓ Schema loaded from {}", schema.subschema_entry().dn());
    } else {
        println!(
            "❌ Schema loaded from {} with {invalid_definitions} invalid definition(s) skipped",
            schema.subschema_entry().dn()
        );
    }
    print_schema_summary(&schema);

    let Some(entries_path) = &options.entries_path else {
        return Ok(invalid_definitions == 0);
    };

    let config = match &options.config_path {
        Some(path) => ValidatorConfig::from_json(&fs::read_to_string(path)?)?,
        None => ValidatorConfig::default(),
    };
    let validator = EntryValidator::new(Arc::new(schema)).with_config(config);

    println!("\nValidating entries from: {}", entries_path.display());
    let entries = ldif::read_entries(BufReader::new(File::open(entries_path)?))?;
    for entry in &entries {
        let outcome = validator.validate(entry);
        if !outcome.is_valid() {
            println!("\n❌ {}", entry.dn());
            for reason in outcome.reasons() {
                println!("    - {reason}");
            }
        }
    }

    println!("\nValidation Summary:");
    if options.json {
        println!("{}", serde_json::to_string_pretty(&validator.statistics())?);
    } else {
        for line in validator.invalid_entry_summary(options.detailed) {
            println!("  {line}");
        }
    }

    Ok(invalid_definitions == 0 && validator.invalid_entries() == 0)
}

/// The first record that carries schema definitions, or the first record.
fn load_subschema_entry(path: &Path) -> Result<Entry, Box<dyn std::error::Error>> {
    let mut entries = ldif::read_entries(BufReader::new(File::open(path)?))?;
    let position = entries
        .iter()
        .position(|entry| {
            DefinitionKind::ALL
                .iter()
                .any(|kind| entry.has_attribute(kind.attribute_name()))
        })
        .unwrap_or(0);
    if entries.is_empty() {
        return Err(format!("'{}' does not contain any entries", path.display()).into());
    }
    Ok(entries.swap_remove(position))
}

fn report_invalid_definitions(subschema: &Entry) -> usize {
    let mut invalid = 0;
    for kind in DefinitionKind::ALL {
        let Some(attribute) = subschema.attribute(kind.attribute_name()) else {
            continue;
        };
        for definition in attribute.string_values() {
            if let Err(e) = kind.check_definition(&definition) {
                eprintln!("  ❌ {e}");
                invalid += 1;
            }
        }
    }
    invalid
}

fn print_schema_summary(schema: &Schema) {
    println!();
    println!("Schema Summary:");
    println!("  Attribute syntaxes: {}", schema.attribute_syntaxes().len());
    println!("  Matching rules: {}", schema.matching_rules().len());
    println!(
        "  Attribute types: {} ({} operational)",
        schema.attribute_types().len(),
        schema.operational_attribute_types().len()
    );
    println!(
        "  Object classes: {} ({} abstract, {} auxiliary, {} structural)",
        schema.object_classes().len(),
        schema.abstract_object_classes().len(),
        schema.auxiliary_object_classes().len(),
        schema.structural_object_classes().len()
    );
    println!("  DIT content rules: {}", schema.dit_content_rules().len());
    println!("  DIT structure rules: {}", schema.dit_structure_rules().len());
    println!("  Name forms: {}", schema.name_forms().len());
}
