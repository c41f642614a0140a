use std::fmt;

/// Error codes for all checker diagnostics.
///
/// Format: E2xxx for type errors, W2xxx for type warnings. The numeric form
/// is stable for searchability; the variant name is what the code matches on.
#[derive(Copy, Clone, Eq, PartialEq, Ord, PartialOrd, Hash, Debug)]
pub enum ErrorCode {
    /// A declaration's type depends on itself.
    CircularDependency,
    /// A trait refines itself, directly or transitively.
    CircularRefinement,
    /// Name lookup found nothing.
    UndefinedName,
    /// Name lookup found several non-overloadable candidates.
    AmbiguousName,
    /// A type does not satisfy a conformance obligation.
    ConformanceFailure,
    /// Wrong number of static arguments for a generic type.
    InvalidGenericArgumentCount,
    /// Static arguments applied to a non-generic type.
    ArgumentToNonGenericType,
    /// Two parameters of one signature share a name.
    DuplicateParameterName,
    /// Two explicit captures share a name.
    DuplicateCaptureName,
    /// An operator declared twice with the same notation in one scope.
    DuplicateOperator,
    /// A non-foreign callable without a body outside a trait.
    MissingBody,
    /// A where-clause constraint that is not equality, conformance, or a
    /// value predicate.
    InvalidConstraintExpr,
    /// An `inout` method variant whose output differs from the receiver.
    InoutBundleOutputMismatch,
    /// Not enough contextual information to infer a type.
    NotEnoughContext,
    /// A conformance list entry that does not denote a trait.
    NotATrait,
    /// Two types that should match do not.
    TypeMismatch,
    /// A non-void function body falls through without a return value.
    MissingReturnValue,
    /// A conformance matched several implementation candidates.
    AmbiguousRequirement,
    /// An associated type used outside a generic context.
    InvalidUseOfAssociatedType,
    /// A name used in type position refers to a value.
    NameRefersToValue,
    /// A non-type argument in a sum type expression.
    ValueInSumType,
    /// `Sum` applied to exactly one argument.
    SumTypeArity,
    /// `Self` used where no surrounding type declaration provides it.
    InvalidSelfReference,
    /// A parameter convention that is not valid in its position.
    IllegalParameterConvention,
    /// The result of a non-void expression statement is silently dropped.
    UnusedResult,
    /// `Sum<>` realizes to `Never`.
    EmptySum,
}

impl ErrorCode {
    /// The numeric code as a string.
    pub fn as_str(&self) -> &'static str {
        match self {
            ErrorCode::CircularDependency => "E2001",
            ErrorCode::CircularRefinement => "E2002",
            ErrorCode::UndefinedName => "E2003",
            ErrorCode::AmbiguousName => "E2004",
            ErrorCode::ConformanceFailure => "E2005",
            ErrorCode::InvalidGenericArgumentCount => "E2006",
            ErrorCode::ArgumentToNonGenericType => "E2007",
            ErrorCode::DuplicateParameterName => "E2008",
            ErrorCode::DuplicateCaptureName => "E2009",
            ErrorCode::DuplicateOperator => "E2010",
            ErrorCode::MissingBody => "E2011",
            ErrorCode::InvalidConstraintExpr => "E2012",
            ErrorCode::InoutBundleOutputMismatch => "E2013",
            ErrorCode::NotEnoughContext => "E2014",
            ErrorCode::NotATrait => "E2015",
            ErrorCode::TypeMismatch => "E2016",
            ErrorCode::MissingReturnValue => "E2017",
            ErrorCode::AmbiguousRequirement => "E2018",
            ErrorCode::InvalidUseOfAssociatedType => "E2019",
            ErrorCode::NameRefersToValue => "E2020",
            ErrorCode::ValueInSumType => "E2021",
            ErrorCode::SumTypeArity => "E2022",
            ErrorCode::InvalidSelfReference => "E2023",
            ErrorCode::IllegalParameterConvention => "E2024",
            ErrorCode::UnusedResult => "W2001",
            ErrorCode::EmptySum => "W2002",
        }
    }

    /// Whether this code denotes a warning (Wxxxx range).
    pub fn is_warning(&self) -> bool {
        self.as_str().starts_with('W')
    }
}

impl fmt::Display for ErrorCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn display_uses_numeric_form() {
        assert_eq!(ErrorCode::UndefinedName.to_string(), "E2003");
        assert!(ErrorCode::UnusedResult.is_warning());
        assert!(!ErrorCode::TypeMismatch.is_warning());
    }
}
