//! Registry of equality matching rules, keyed by OID, name and syntax.

use super::MatchingRule;
use super::rules::{
    BOOLEAN_MATCH, CASE_EXACT_IA5_MATCH, CASE_EXACT_MATCH, CASE_IGNORE_IA5_MATCH,
    CASE_IGNORE_MATCH, DISTINGUISHED_NAME_MATCH, GENERALIZED_TIME_MATCH, INTEGER_MATCH,
    NUMERIC_STRING_MATCH, OBJECT_IDENTIFIER_MATCH, OCTET_STRING_MATCH, TELEPHONE_NUMBER_MATCH,
};
use crate::entry::base_name;
use crate::schema::Schema;
use crate::schema::types::attribute_type::strip_upper_bound;
use std::collections::HashMap;
use std::sync::Arc;

/// Syntax OIDs from RFC 4517 and RFC 4523 and the rule used for each when an attribute type
/// names no equality rule.
const SYNTAX_RULES: &[(&str, &str)] = &[
    ("1.3.6.1.4.1.1466.115.121.1.4", "octetStringMatch"),
    ("1.3.6.1.4.1.1466.115.121.1.5", "octetStringMatch"),
    ("1.3.6.1.4.1.1466.115.121.1.7", "booleanMatch"),
    ("1.3.6.1.4.1.1466.115.121.1.8", "octetStringMatch"),
    ("1.3.6.1.4.1.1466.115.121.1.9", "octetStringMatch"),
    ("1.3.6.1.4.1.1466.115.121.1.10", "octetStringMatch"),
    ("1.3.6.1.4.1.1466.115.121.1.12", "distinguishedNameMatch"),
    ("1.3.6.1.4.1.1466.115.121.1.15", "caseIgnoreMatch"),
    ("1.3.6.1.4.1.1466.115.121.1.23", "octetStringMatch"),
    ("1.3.6.1.4.1.1466.115.121.1.24", "generalizedTimeMatch"),
    ("1.3.6.1.4.1.1466.115.121.1.26", "caseIgnoreIA5Match"),
    ("1.3.6.1.4.1.1466.115.121.1.27", "integerMatch"),
    ("1.3.6.1.4.1.1466.115.121.1.28", "octetStringMatch"),
    ("1.3.6.1.4.1.1466.115.121.1.36", "numericStringMatch"),
    ("1.3.6.1.4.1.1466.115.121.1.38", "objectIdentifierMatch"),
    ("1.3.6.1.4.1.1466.115.121.1.40", "octetStringMatch"),
    ("1.3.6.1.4.1.1466.115.121.1.44", "caseIgnoreMatch"),
    ("1.3.6.1.4.1.1466.115.121.1.49", "octetStringMatch"),
    ("1.3.6.1.4.1.1466.115.121.1.50", "telephoneNumberMatch"),
];

/// Registry of matching rules.
///
/// Built once (usually with [`MatchingRuleRegistry::standard`]) and shared
/// between validators through an `Arc`. Lookups never mutate the registry.
#[derive(Debug, Clone)]
pub struct MatchingRuleRegistry {
    rules: Vec<Arc<dyn MatchingRule>>,
    by_key: HashMap<String, usize>,
    by_syntax: HashMap<String, usize>,
    fallback: Arc<dyn MatchingRule>,
}

impl MatchingRuleRegistry {
    /// A registry with no syntax mappings that falls back to `caseIgnoreMatch`.
    pub fn empty() -> Self {
        Self {
            rules: Vec::new(),
            by_key: HashMap::new(),
            by_syntax: HashMap::new(),
            fallback: Arc::new(CASE_IGNORE_MATCH),
        }
    }

    /// The standard RFC 4517 equality rules with their default syntaxes.
    pub fn standard() -> Self {
        let mut registry = Self::empty();
        for rule in [
            CASE_IGNORE_MATCH,
            CASE_EXACT_MATCH,
            CASE_IGNORE_IA5_MATCH,
            CASE_EXACT_IA5_MATCH,
            OCTET_STRING_MATCH,
            INTEGER_MATCH,
            BOOLEAN_MATCH,
            NUMERIC_STRING_MATCH,
            DISTINGUISHED_NAME_MATCH,
            GENERALIZED_TIME_MATCH,
            OBJECT_IDENTIFIER_MATCH,
            TELEPHONE_NUMBER_MATCH,
        ] {
            registry.register(Arc::new(rule));
        }
        for (syntax, rule) in SYNTAX_RULES {
            if let Some(&index) = registry.by_key.get(&rule.to_ascii_lowercase()) {
                registry.by_syntax.insert(syntax.to_string(), index);
            }
        }
        registry
    }

    /// Register a rule under its OID and names. A later rule replaces an
    /// earlier one with the same key.
    pub fn register(&mut self, rule: Arc<dyn MatchingRule>) {
        let index = self.rules.len();
        self.by_key.insert(rule.oid().to_ascii_lowercase(), index);
        for name in rule.names() {
            self.by_key.insert(name.to_ascii_lowercase(), index);
        }
        self.rules.push(rule);
    }

    /// Use `rule_name` for values of `syntax_oid` when no equality rule is declared.
    ///
    /// Returns `false` when `rule_name` is not registered.
    pub fn map_syntax(&mut self, syntax_oid: &str, rule_name: &str) -> bool {
        match self.by_key.get(&rule_name.to_ascii_lowercase()) {
            Some(&index) => {
                self.by_syntax
                    .insert(strip_upper_bound(syntax_oid).to_ascii_lowercase(), index);
                true
            }
            None => false,
        }
    }

    /// Look up a rule by OID or name, ignoring case.
    pub fn get(&self, name_or_oid: &str) -> Option<&dyn MatchingRule> {
        self.by_key
            .get(&name_or_oid.to_ascii_lowercase())
            .map(|&index| self.rules[index].as_ref())
    }

    /// The rule used for values of a syntax, ignoring any `{n}` suffix.
    pub fn rule_for_syntax(&self, syntax_oid: &str) -> Option<&dyn MatchingRule> {
        self.by_syntax
            .get(&strip_upper_bound(syntax_oid).to_ascii_lowercase())
            .map(|&index| self.rules[index].as_ref())
    }

    pub fn len(&self) -> usize {
        self.rules.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rules.is_empty()
    }

    /// Choose the equality rule for an attribute.
    ///
    /// In order: the explicitly requested rule, the equality rule of the
    /// attribute type (inherited through superior types), the rule registered for
    /// the attribute type's syntax, and finally `caseIgnoreMatch`.
    pub fn select_equality_rule(
        &self,
        attribute: &str,
        explicit_rule: Option<&str>,
        schema: Option<&Schema>,
    ) -> &dyn MatchingRule {
        if let Some(rule) = explicit_rule.and_then(|name| self.get(name)) {
            return rule;
        }

        let attribute_type = schema.and_then(|s| s.attribute_type(base_name(attribute)));
        if let Some(attribute_type) = attribute_type {
            if let Some(rule) = attribute_type
                .equality_matching_rule(schema)
                .and_then(|name| self.get(name))
            {
                return rule;
            }
            if let Some(rule) = attribute_type
                .base_syntax_oid(schema)
                .and_then(|syntax| self.rule_for_syntax(syntax))
            {
                return rule;
            }
        }
        self.fallback.as_ref()
    }
}

impl Default for MatchingRuleRegistry {
    fn default() -> Self {
        Self::standard()
    }
}
