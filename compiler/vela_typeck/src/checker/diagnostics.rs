//! Diagnostic constructors for checker errors.
//!
//! Kept together so message wording stays consistent; the checker calls
//! these instead of assembling messages inline.

use vela_diagnostic::{Diagnostic, ErrorCode};
use vela_ir::Span;

pub(crate) fn circular_dependency(span: Span, name: &str) -> Diagnostic {
    Diagnostic::error(ErrorCode::CircularDependency, span)
        .with_message(format!("type of `{name}` depends on itself"))
}

pub(crate) fn circular_refinement(span: Span, name: &str) -> Diagnostic {
    Diagnostic::error(ErrorCode::CircularRefinement, span)
        .with_message(format!("trait `{name}` refines itself"))
}

pub(crate) fn undefined_name(span: Span, name: &str) -> Diagnostic {
    Diagnostic::error(ErrorCode::UndefinedName, span)
        .with_message(format!("undefined name `{name}` in this scope"))
}

pub(crate) fn ambiguous_name(span: Span, name: &str) -> Diagnostic {
    Diagnostic::error(ErrorCode::AmbiguousName, span)
        .with_message(format!("ambiguous use of `{name}`"))
}

pub(crate) fn not_a_trait(span: Span, found: &str) -> Diagnostic {
    Diagnostic::error(ErrorCode::NotATrait, span)
        .with_message(format!("`{found}` is not a trait"))
}

pub(crate) fn conformance_failure(span: Span, model: &str, trait_name: &str) -> Diagnostic {
    Diagnostic::error(ErrorCode::ConformanceFailure, span)
        .with_message(format!("`{model}` does not conform to `{trait_name}`"))
}

pub(crate) fn invalid_generic_argument_count(
    span: Span,
    name: &str,
    expected: usize,
    found: usize,
) -> Diagnostic {
    Diagnostic::error(ErrorCode::InvalidGenericArgumentCount, span).with_message(format!(
        "`{name}` takes {expected} generic arguments, found {found}"
    ))
}

pub(crate) fn argument_to_non_generic_type(span: Span, name: &str) -> Diagnostic {
    Diagnostic::error(ErrorCode::ArgumentToNonGenericType, span)
        .with_message(format!("`{name}` is not generic"))
}

pub(crate) fn duplicate_parameter(span: Span, name: &str) -> Diagnostic {
    Diagnostic::error(ErrorCode::DuplicateParameterName, span)
        .with_message(format!("duplicate parameter name `{name}`"))
}

pub(crate) fn duplicate_capture(span: Span, name: &str) -> Diagnostic {
    Diagnostic::error(ErrorCode::DuplicateCaptureName, span)
        .with_message(format!("duplicate capture name `{name}`"))
}

pub(crate) fn duplicate_operator(span: Span, name: &str) -> Diagnostic {
    Diagnostic::error(ErrorCode::DuplicateOperator, span)
        .with_message(format!("operator `{name}` is already declared"))
}

pub(crate) fn missing_body(span: Span) -> Diagnostic {
    Diagnostic::error(ErrorCode::MissingBody, span)
        .with_message("declaration requires a body")
}

pub(crate) fn not_enough_context(span: Span) -> Diagnostic {
    Diagnostic::error(ErrorCode::NotEnoughContext, span)
        .with_message("not enough context to infer a type here")
}

pub(crate) fn name_refers_to_value(span: Span) -> Diagnostic {
    Diagnostic::error(ErrorCode::NameRefersToValue, span)
        .with_message("expected a type, found a value")
}

pub(crate) fn value_in_sum_type(span: Span) -> Diagnostic {
    Diagnostic::error(ErrorCode::ValueInSumType, span)
        .with_message("sum type elements must be types")
}

pub(crate) fn sum_type_arity(span: Span) -> Diagnostic {
    Diagnostic::error(ErrorCode::SumTypeArity, span)
        .with_message("a sum type needs at least two alternatives")
}

pub(crate) fn empty_sum(span: Span) -> Diagnostic {
    Diagnostic::warning(ErrorCode::EmptySum, span)
        .with_message("empty sum type is `Never` in all but name")
}

pub(crate) fn invalid_use_of_associated_type(span: Span) -> Diagnostic {
    Diagnostic::error(ErrorCode::InvalidUseOfAssociatedType, span)
        .with_message("associated types may only appear in traits")
}

pub(crate) fn invalid_self_reference(span: Span) -> Diagnostic {
    Diagnostic::error(ErrorCode::InvalidSelfReference, span)
        .with_message("`Self` is unavailable in this context")
}

pub(crate) fn illegal_parameter_convention(span: Span) -> Diagnostic {
    Diagnostic::error(ErrorCode::IllegalParameterConvention, span)
        .with_message("passing conventions may only appear on parameters")
}

pub(crate) fn type_mismatch(span: Span, expected: &str, found: &str) -> Diagnostic {
    Diagnostic::error(ErrorCode::TypeMismatch, span)
        .with_message(format!("expected `{expected}`, found `{found}`"))
}

pub(crate) fn missing_return_value(span: Span) -> Diagnostic {
    Diagnostic::error(ErrorCode::MissingReturnValue, span)
        .with_message("non-void function should return a value")
}

pub(crate) fn inout_bundle_output_mismatch(span: Span) -> Diagnostic {
    Diagnostic::error(ErrorCode::InoutBundleOutputMismatch, span)
        .with_message("`inout` variant must return the receiver's type")
}

pub(crate) fn invalid_constraint(span: Span) -> Diagnostic {
    Diagnostic::error(ErrorCode::InvalidConstraintExpr, span)
        .with_message("invalid constraint expression")
}

pub(crate) fn unused_result(span: Span, ty: &str) -> Diagnostic {
    Diagnostic::warning(ErrorCode::UnusedResult, span)
        .with_message(format!("unused result of type `{ty}`"))
}
