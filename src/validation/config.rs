//! Check toggles for the entry validator.

use serde::{Deserialize, Serialize};

/// Which checks an [`EntryValidator`](super::EntryValidator) performs.
///
/// Every check is enabled by default except
/// [`check_entry_missing_rdn_values`](Self::check_entry_missing_rdn_values).
/// Missing fields take their default when deserializing, so a JSON document
/// only needs to name the flags it changes:
///
/// ```rust
/// use ldap_schema::validation::ValidatorConfig;
///
/// let config = ValidatorConfig::from_json(r#"{ "check_attribute_syntax": false }"#).unwrap();
/// assert!(!config.check_attribute_syntax);
/// assert!(config.check_missing_attributes);
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ValidatorConfig {
    /// Report entries whose DN cannot be parsed
    pub check_malformed_dns: bool,
    /// Report object classes missing from the schema
    pub check_undefined_object_classes: bool,
    /// Report superior classes the entry does not list
    pub check_missing_superior_object_classes: bool,
    /// Report abstract classes standing alone and auxiliary classes a DIT content rule forbids
    pub check_prohibited_object_classes: bool,
    /// Report entries with zero or several structural classes
    pub check_structural_object_classes: bool,
    pub check_missing_attributes: bool,
    pub check_undefined_attributes: bool,
    pub check_prohibited_attributes: bool,
    pub check_single_valued_attributes: bool,
    /// Normalize every value with its equality matching rule
    pub check_attribute_syntax: bool,
    pub check_name_forms: bool,
    /// Require each RDN value to also appear among the entry's attribute values
    pub check_entry_missing_rdn_values: bool,
}

impl Default for ValidatorConfig {
    fn default() -> Self {
        Self {
            check_malformed_dns: true,
            check_undefined_object_classes: true,
            check_missing_superior_object_classes: true,
            check_prohibited_object_classes: true,
            check_structural_object_classes: true,
            check_missing_attributes: true,
            check_undefined_attributes: true,
            check_prohibited_attributes: true,
            check_single_valued_attributes: true,
            check_attribute_syntax: true,
            check_name_forms: true,
            check_entry_missing_rdn_values: false,
        }
    }
}

macro_rules! with_flag {
    ($($flag:ident => $setter:ident),* $(,)?) => {
        $(
            pub fn $setter(mut self, enabled: bool) -> Self {
                self.$flag = enabled;
                self
            }
        )*
    };
}

impl ValidatorConfig {
    /// A configuration with every check turned off.
    pub fn all_disabled() -> Self {
        Self {
            check_malformed_dns: false,
            check_undefined_object_classes: false,
            check_missing_superior_object_classes: false,
            check_prohibited_object_classes: false,
            check_structural_object_classes: false,
            check_missing_attributes: false,
            check_undefined_attributes: false,
            check_prohibited_attributes: false,
            check_single_valued_attributes: false,
            check_attribute_syntax: false,
            check_name_forms: false,
            check_entry_missing_rdn_values: false,
        }
    }

    /// Read a configuration from JSON; absent flags keep their defaults.
    pub fn from_json(json: &str) -> serde_json::Result<Self> {
        serde_json::from_str(json)
    }

    with_flag! {
        check_malformed_dns => with_malformed_dns,
        check_undefined_object_classes => with_undefined_object_classes,
        check_missing_superior_object_classes => with_missing_superior_object_classes,
        check_prohibited_object_classes => with_prohibited_object_classes,
        check_structural_object_classes => with_structural_object_classes,
        check_missing_attributes => with_missing_attributes,
        check_undefined_attributes => with_undefined_attributes,
        check_prohibited_attributes => with_prohibited_attributes,
        check_single_valued_attributes => with_single_valued_attributes,
        check_attribute_syntax => with_attribute_syntax,
        check_name_forms => with_name_forms,
        check_entry_missing_rdn_values => with_entry_missing_rdn_values,
    }
}
