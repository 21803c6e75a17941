//! Error types for schema parsing and entry validation.
//!
//! This module collects every error the crate produces. Schema parsing errors are
//! recoverable per definition (a failed definition is dropped from the schema),
//! while entry validation never fails: each defect becomes an [`EntryViolation`].

/// Low-level failure raised by the definition grammar.
///
/// The position is a character offset into the definition string.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("{message} at position {position}")]
pub struct DecodeError {
    pub position: usize,
    pub message: String,
}

impl DecodeError {
    pub fn new(position: usize, message: impl Into<String>) -> Self {
        Self {
            position,
            message: message.into(),
        }
    }
}

/// Errors raised while building schema definitions or a schema.
#[derive(Debug, thiserror::Error)]
pub enum SchemaError {
    /// A single definition string could not be decoded
    #[error("Unable to decode {kind} definition '{definition}': {source}")]
    Decode {
        kind: &'static str,
        definition: String,
        #[source]
        source: DecodeError,
    },

    /// An element's superior chain loops back on itself
    #[error("{kind} '{element}' has a superior chain that forms a cycle")]
    SuperiorCycle { kind: &'static str, element: String },

    /// A definition built from parts is missing a mandatory field
    #[error("Invalid {kind} definition: {message}")]
    InvalidDefinition { kind: &'static str, message: String },
}

/// Errors raised while parsing a distinguished name.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum DnError {
    #[error("DN '{dn}' is malformed: {reason}")]
    Malformed { dn: String, reason: String },
}

/// Errors raised by a matching rule that cannot normalize a value.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum MatchingRuleError {
    #[error("value is not acceptable for matching rule {rule}: {reason}")]
    InvalidValue { rule: String, reason: String },
}

/// Errors raised while reading LDIF input.
#[derive(Debug, thiserror::Error)]
pub enum LdifError {
    #[error("LDIF line {line}: {message}")]
    Malformed { line: usize, message: String },

    #[error("LDIF line {line}: invalid base64 value: {source}")]
    Base64 {
        line: usize,
        #[source]
        source: base64::DecodeError,
    },

    #[error("I/O error reading LDIF: {0}")]
    Io(#[from] std::io::Error),
}

/// Category of an entry violation, used for counters and tallies.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum ViolationCategory {
    MalformedDn,
    NoObjectClasses,
    UndefinedObjectClass,
    MissingSuperiorObjectClass,
    ProhibitedObjectClass,
    NoStructuralClass,
    MultipleStructuralClasses,
    MissingAttribute,
    UndefinedAttribute,
    ProhibitedAttribute,
    SingleValueViolation,
    AttributeSyntax,
    NameForm,
    MissingRdnValue,
}

impl ViolationCategory {
    pub const ALL: [ViolationCategory; 14] = [
        Self::MalformedDn,
        Self::NoObjectClasses,
        Self::UndefinedObjectClass,
        Self::MissingSuperiorObjectClass,
        Self::ProhibitedObjectClass,
        Self::NoStructuralClass,
        Self::MultipleStructuralClasses,
        Self::MissingAttribute,
        Self::UndefinedAttribute,
        Self::ProhibitedAttribute,
        Self::SingleValueViolation,
        Self::AttributeSyntax,
        Self::NameForm,
        Self::MissingRdnValue,
    ];

    /// Position of the category in [`ViolationCategory::ALL`].
    pub fn index(self) -> usize {
        self as usize
    }

    /// Stable snake_case name, used as a key in statistics output.
    pub fn name(self) -> &'static str {
        match self {
            Self::MalformedDn => "malformed_dn",
            Self::NoObjectClasses => "no_object_classes",
            Self::UndefinedObjectClass => "undefined_object_class",
            Self::MissingSuperiorObjectClass => "missing_superior_object_class",
            Self::ProhibitedObjectClass => "prohibited_object_class",
            Self::NoStructuralClass => "no_structural_class",
            Self::MultipleStructuralClasses => "multiple_structural_classes",
            Self::MissingAttribute => "missing_attribute",
            Self::UndefinedAttribute => "undefined_attribute",
            Self::ProhibitedAttribute => "prohibited_attribute",
            Self::SingleValueViolation => "single_value_violation",
            Self::AttributeSyntax => "attribute_syntax",
            Self::NameForm => "name_form",
            Self::MissingRdnValue => "missing_rdn_value",
        }
    }
}

/// A single reason an entry does not conform to the schema.
///
/// The `Display` text is the human-readable reason reported to callers.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum EntryViolation {
    #[error("Unable to parse the entry DN '{dn}': {reason}")]
    MalformedDn { dn: String, reason: String },

    #[error("The entry does not have any object classes")]
    NoObjectClasses,

    #[error("The entry contains object class '{object_class}' which is not defined in the schema")]
    UndefinedObjectClass { object_class: String },

    #[error(
        "The entry is missing object class '{superior}' which is a superior class of '{object_class}'"
    )]
    MissingSuperiorObjectClass {
        superior: String,
        object_class: String,
    },

    #[error("The entry contains abstract object class '{object_class}' which is not a superior of any other class")]
    AbstractObjectClass { object_class: String },

    #[error("Auxiliary object class '{object_class}' is not allowed by DIT content rule '{content_rule}'")]
    AuxiliaryClassNotAllowed {
        object_class: String,
        content_rule: String,
    },

    #[error("The entry does not have a structural object class")]
    NoStructuralClass,

    #[error("The entry has multiple structural object classes: {}", .classes.join(", "))]
    MultipleStructuralClasses { classes: Vec<String> },

    #[error("The entry is missing required attribute '{attribute}'")]
    MissingAttribute { attribute: String },

    #[error("The entry contains attribute '{attribute}' which is not defined in the schema")]
    UndefinedAttribute { attribute: String },

    #[error("The entry contains attribute '{attribute}' which is not allowed by its object classes or DIT content rule")]
    ProhibitedAttribute { attribute: String },

    #[error("The RDN contains attribute '{attribute}' which is not defined in the schema")]
    UndefinedRdnAttribute { attribute: String },

    #[error("The RDN contains attribute '{attribute}' which is not allowed by the entry's object classes or DIT content rule")]
    ProhibitedRdnAttribute { attribute: String },

    #[error("Attribute '{attribute}' is single-valued but has {count} values")]
    SingleValueViolation { attribute: String, count: usize },

    #[error("Value '{value}' of attribute '{attribute}' violates the attribute syntax: {reason}")]
    AttributeSyntax {
        attribute: String,
        value: String,
        reason: String,
    },

    #[error("RDN attribute '{attribute}' is not allowed by name form '{name_form}'")]
    NameFormProhibitedAttribute {
        attribute: String,
        name_form: String,
    },

    #[error("The RDN is missing attribute '{attribute}' required by name form '{name_form}'")]
    NameFormMissingAttribute {
        attribute: String,
        name_form: String,
    },

    #[error("The entry does not contain RDN value '{value}' for attribute '{attribute}'")]
    MissingRdnValue { attribute: String, value: String },
}

impl EntryViolation {
    /// The counter category this violation contributes to.
    pub fn category(&self) -> ViolationCategory {
        match self {
            Self::MalformedDn { .. } => ViolationCategory::MalformedDn,
            Self::NoObjectClasses => ViolationCategory::NoObjectClasses,
            Self::UndefinedObjectClass { .. } => ViolationCategory::UndefinedObjectClass,
            Self::MissingSuperiorObjectClass { .. } => {
                ViolationCategory::MissingSuperiorObjectClass
            }
            Self::AbstractObjectClass { .. } | Self::AuxiliaryClassNotAllowed { .. } => {
                ViolationCategory::ProhibitedObjectClass
            }
            Self::NoStructuralClass => ViolationCategory::NoStructuralClass,
            Self::MultipleStructuralClasses { .. } => ViolationCategory::MultipleStructuralClasses,
            Self::MissingAttribute { .. } => ViolationCategory::MissingAttribute,
            Self::UndefinedAttribute { .. } | Self::UndefinedRdnAttribute { .. } => {
                ViolationCategory::UndefinedAttribute
            }
            Self::ProhibitedAttribute { .. } | Self::ProhibitedRdnAttribute { .. } => {
                ViolationCategory::ProhibitedAttribute
            }
            Self::SingleValueViolation { .. } => ViolationCategory::SingleValueViolation,
            Self::AttributeSyntax { .. } => ViolationCategory::AttributeSyntax,
            Self::NameFormProhibitedAttribute { .. } | Self::NameFormMissingAttribute { .. } => {
                ViolationCategory::NameForm
            }
            Self::MissingRdnValue { .. } => ViolationCategory::MissingRdnValue,
        }
    }

    /// The attribute or object class this violation names, if it is tallied per name.
    pub fn subject(&self) -> Option<&str> {
        match self {
            Self::UndefinedObjectClass { object_class }
            | Self::AbstractObjectClass { object_class }
            | Self::AuxiliaryClassNotAllowed { object_class, .. } => Some(object_class),
            Self::MissingSuperiorObjectClass { superior, .. } => Some(superior),
            Self::MissingAttribute { attribute }
            | Self::UndefinedAttribute { attribute }
            | Self::UndefinedRdnAttribute { attribute }
            | Self::ProhibitedAttribute { attribute }
            | Self::ProhibitedRdnAttribute { attribute }
            | Self::SingleValueViolation { attribute, .. }
            | Self::AttributeSyntax { attribute, .. } => Some(attribute),
            _ => None,
        }
    }
}

// Result type aliases for convenience
pub type SchemaResult<T> = Result<T, SchemaError>;
pub type DecodeResult<T> = Result<T, DecodeError>;
pub type DnResult<T> = Result<T, DnError>;
pub type MatchingRuleResult<T> = Result<T, MatchingRuleError>;
pub type LdifResult<T> = Result<T, LdifError>;
