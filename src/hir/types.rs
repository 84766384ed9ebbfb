//! Small value enums shared by the scaffold and the frozen model.

use std::fmt;

// ============================================================================
// PRIMITIVES
// ============================================================================

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum PrimitiveType {
    Boolean,
    Integer,
    Long,
    Double,
    Float,
    String,
    Instant,
    LocalDate,
    TemporalInstant,
    TemporalRange,
}

impl PrimitiveType {
    pub fn from_name(name: &str) -> Option<Self> {
        let ty = match name {
            "Boolean" => PrimitiveType::Boolean,
            "Integer" => PrimitiveType::Integer,
            "Long" => PrimitiveType::Long,
            "Double" => PrimitiveType::Double,
            "Float" => PrimitiveType::Float,
            "String" => PrimitiveType::String,
            "Instant" => PrimitiveType::Instant,
            "LocalDate" => PrimitiveType::LocalDate,
            "TemporalInstant" => PrimitiveType::TemporalInstant,
            "TemporalRange" => PrimitiveType::TemporalRange,
            _ => return None,
        };
        Some(ty)
    }

    pub fn name(self) -> &'static str {
        match self {
            PrimitiveType::Boolean => "Boolean",
            PrimitiveType::Integer => "Integer",
            PrimitiveType::Long => "Long",
            PrimitiveType::Double => "Double",
            PrimitiveType::Float => "Float",
            PrimitiveType::String => "String",
            PrimitiveType::Instant => "Instant",
            PrimitiveType::LocalDate => "LocalDate",
            PrimitiveType::TemporalInstant => "TemporalInstant",
            PrimitiveType::TemporalRange => "TemporalRange",
        }
    }

    #[inline]
    pub fn is_temporal(self) -> bool {
        matches!(self, PrimitiveType::TemporalInstant | PrimitiveType::TemporalRange)
    }
}

impl fmt::Display for PrimitiveType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

// ============================================================================
// MULTIPLICITY
// ============================================================================

/// Multiplicity of a reference property or url parameter.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Multiplicity {
    ZeroToOne,
    OneToOne,
    ZeroToMany,
    OneToMany,
}

impl Multiplicity {
    pub const ALL: [Multiplicity; 4] = [
        Multiplicity::ZeroToOne,
        Multiplicity::OneToOne,
        Multiplicity::ZeroToMany,
        Multiplicity::OneToMany,
    ];

    /// Match written bounds; `None` for any other combination.
    pub fn from_bounds(lower: &str, upper: &str) -> Option<Self> {
        Self::ALL
            .into_iter()
            .find(|m| m.lower() == lower && m.upper() == upper)
    }

    pub fn lower(self) -> &'static str {
        match self {
            Multiplicity::ZeroToOne | Multiplicity::ZeroToMany => "0",
            Multiplicity::OneToOne | Multiplicity::OneToMany => "1",
        }
    }

    pub fn upper(self) -> &'static str {
        match self {
            Multiplicity::ZeroToOne | Multiplicity::OneToOne => "1",
            Multiplicity::ZeroToMany | Multiplicity::OneToMany => "*",
        }
    }

    #[inline]
    pub fn is_to_one(self) -> bool {
        matches!(self, Multiplicity::ZeroToOne | Multiplicity::OneToOne)
    }

    #[inline]
    pub fn is_to_many(self) -> bool {
        !self.is_to_one()
    }

    #[inline]
    pub fn is_required(self) -> bool {
        matches!(self, Multiplicity::OneToOne | Multiplicity::OneToMany)
    }

    /// `0..1, 1..1, 0..*, 1..*`, for messages.
    pub fn expected_list() -> String {
        Self::ALL
            .iter()
            .map(|m| m.to_string())
            .collect::<Vec<_>>()
            .join(", ")
    }
}

impl fmt::Display for Multiplicity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}..{}", self.lower(), self.upper())
    }
}

// ============================================================================
// CLASSIFIERS
// ============================================================================

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum ClassifierKind {
    Interface,
    Class,
    /// A class declared with `user`: the identity of service callers.
    User,
}

impl ClassifierKind {
    #[inline]
    pub fn is_class(self) -> bool {
        !matches!(self, ClassifierKind::Interface)
    }
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
pub enum InheritanceStrategy {
    #[default]
    None,
    TablePerClass,
    TablePerSubclass,
    TableForAllSubclasses,
}

impl InheritanceStrategy {
    pub fn from_keyword(keyword: &str) -> Option<Self> {
        let strategy = match keyword {
            "table-per-class" => InheritanceStrategy::TablePerClass,
            "table-per-subclass" => InheritanceStrategy::TablePerSubclass,
            "table-for-all-subclasses" => InheritanceStrategy::TableForAllSubclasses,
            _ => return None,
        };
        Some(strategy)
    }
}

// ============================================================================
// PROPERTIES
// ============================================================================

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum ValidationKind {
    MinLength,
    MaxLength,
    Min,
    Max,
}

impl ValidationKind {
    pub fn from_keyword(keyword: &str) -> Option<Self> {
        let kind = match keyword {
            "minLength" => ValidationKind::MinLength,
            "maxLength" => ValidationKind::MaxLength,
            "min" => ValidationKind::Min,
            "max" => ValidationKind::Max,
            _ => return None,
        };
        Some(kind)
    }

    pub fn keyword(self) -> &'static str {
        match self {
            ValidationKind::MinLength => "minLength",
            ValidationKind::MaxLength => "maxLength",
            ValidationKind::Min => "min",
            ValidationKind::Max => "max",
        }
    }
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
pub enum OrderByDirection {
    #[default]
    Ascending,
    Descending,
}

/// Which end of its association an association end is.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum EndPosition {
    Source,
    Target,
}

impl EndPosition {
    #[inline]
    pub fn index(self) -> usize {
        match self {
            EndPosition::Source => 0,
            EndPosition::Target => 1,
        }
    }

    #[inline]
    pub fn other(self) -> Self {
        match self {
            EndPosition::Source => EndPosition::Target,
            EndPosition::Target => EndPosition::Source,
        }
    }
}

// ============================================================================
// SERVICES
// ============================================================================

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Verb {
    Get,
    Post,
    Put,
    Patch,
    Delete,
}

impl Verb {
    pub fn from_keyword(keyword: &str) -> Option<Self> {
        let verb = match keyword {
            "GET" => Verb::Get,
            "POST" => Verb::Post,
            "PUT" => Verb::Put,
            "PATCH" => Verb::Patch,
            "DELETE" => Verb::Delete,
            _ => return None,
        };
        Some(verb)
    }

    pub fn keyword(self) -> &'static str {
        match self {
            Verb::Get => "GET",
            Verb::Post => "POST",
            Verb::Put => "PUT",
            Verb::Patch => "PATCH",
            Verb::Delete => "DELETE",
        }
    }

    /// Criteria keywords a service with this verb may declare.
    pub fn allowed_criteria(self) -> &'static [CriteriaKeyword] {
        use CriteriaKeyword::*;
        match self {
            Verb::Get => &[Criteria, Authorize, Validate, Version],
            Verb::Post => &[Authorize, Validate],
            Verb::Put | Verb::Patch | Verb::Delete => {
                &[Criteria, Authorize, Validate, Conflict, Version]
            }
        }
    }

    /// Verbs that modify an existing instance.
    #[inline]
    pub fn is_update(self) -> bool {
        matches!(self, Verb::Put | Verb::Patch | Verb::Delete)
    }
}

impl fmt::Display for Verb {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.keyword())
    }
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
pub enum ServiceMultiplicity {
    One,
    #[default]
    Many,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum CriteriaKeyword {
    Criteria,
    Authorize,
    Validate,
    Conflict,
    Version,
}

impl CriteriaKeyword {
    pub fn from_keyword(keyword: &str) -> Option<Self> {
        let kind = match keyword {
            "criteria" => CriteriaKeyword::Criteria,
            "authorize" => CriteriaKeyword::Authorize,
            "validate" => CriteriaKeyword::Validate,
            "conflict" => CriteriaKeyword::Conflict,
            "version" => CriteriaKeyword::Version,
            _ => return None,
        };
        Some(kind)
    }

    pub fn keyword(self) -> &'static str {
        match self {
            CriteriaKeyword::Criteria => "criteria",
            CriteriaKeyword::Authorize => "authorize",
            CriteriaKeyword::Validate => "validate",
            CriteriaKeyword::Conflict => "conflict",
            CriteriaKeyword::Version => "version",
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_multiplicity_from_bounds() {
        assert_eq!(Multiplicity::from_bounds("0", "*"), Some(Multiplicity::ZeroToMany));
        assert_eq!(Multiplicity::from_bounds("1", "1"), Some(Multiplicity::OneToOne));
        assert_eq!(Multiplicity::from_bounds("2", "5"), None);
        assert_eq!(Multiplicity::from_bounds("*", "1"), None);
    }

    #[test]
    fn test_multiplicity_shape() {
        assert!(Multiplicity::ZeroToOne.is_to_one());
        assert!(!Multiplicity::ZeroToOne.is_required());
        assert!(Multiplicity::OneToMany.is_to_many());
        assert!(Multiplicity::OneToMany.is_required());
        assert_eq!(Multiplicity::expected_list(), "0..1, 1..1, 0..*, 1..*");
    }

    #[test]
    fn test_allowed_criteria_per_verb() {
        assert!(!Verb::Post.allowed_criteria().contains(&CriteriaKeyword::Criteria));
        assert!(!Verb::Get.allowed_criteria().contains(&CriteriaKeyword::Conflict));
        assert!(Verb::Delete.allowed_criteria().contains(&CriteriaKeyword::Conflict));
    }

    #[test]
    fn test_primitive_names_roundtrip() {
        for name in crate::syntax::keywords::PRIMITIVE_TYPES {
            let ty = PrimitiveType::from_name(name).unwrap();
            assert_eq!(ty.name(), *name);
        }
    }
}
