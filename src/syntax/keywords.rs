//! Contextual keyword tables.
//!
//! Klass has no reserved words: every word lexes as an identifier and the
//! parser decides by position. These tables are shared by the parser, the
//! lowering pass and the checks.

/// Words that may follow a property or association end type.
pub const PROPERTY_MODIFIERS: &[&str] = &[
    "key",
    "id",
    "private",
    "final",
    "derived",
    "owned",
    "valid",
    "system",
    "from",
    "to",
    "userId",
    "createdBy",
    "createdOn",
    "lastUpdatedBy",
    "version",
    "versioned",
    "audit",
];

/// Words that may appear in a class or interface header.
pub const CLASSIFIER_MODIFIERS: &[&str] = &[
    "transient",
    "validTemporal",
    "systemTemporal",
    "bitemporal",
    "versioned",
    "audited",
    "optimisticallyLocked",
];

pub const PRIMITIVE_TYPES: &[&str] = &[
    "Boolean",
    "Integer",
    "Long",
    "Double",
    "Float",
    "String",
    "Instant",
    "LocalDate",
    "TemporalInstant",
    "TemporalRange",
];

pub const VALIDATIONS: &[&str] = &["minLength", "maxLength", "min", "max"];

pub const VERBS: &[&str] = &["GET", "POST", "PUT", "PATCH", "DELETE"];

pub const CRITERIA_KEYWORDS: &[&str] = &["criteria", "authorize", "validate", "conflict", "version"];

/// Word-shaped criteria operators. Symbolic ones are tokens.
pub const OPERATOR_WORDS: &[&str] = &["in", "contains", "startsWith", "endsWith"];

pub const INHERITANCE_STRATEGIES: &[&str] = &[
    "table-per-class",
    "table-per-subclass",
    "table-for-all-subclasses",
];

#[inline]
pub fn is_property_modifier(word: &str) -> bool {
    PROPERTY_MODIFIERS.contains(&word)
}

#[inline]
pub fn is_classifier_modifier(word: &str) -> bool {
    CLASSIFIER_MODIFIERS.contains(&word)
}

#[inline]
pub fn is_primitive_type(word: &str) -> bool {
    PRIMITIVE_TYPES.contains(&word)
}

#[inline]
pub fn is_verb(word: &str) -> bool {
    VERBS.contains(&word)
}

#[inline]
pub fn is_criteria_keyword(word: &str) -> bool {
    CRITERIA_KEYWORDS.contains(&word)
}
