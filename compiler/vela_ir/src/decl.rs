//! Declaration nodes.
//!
//! One closed enum with a payload per concrete declaration kind, so the
//! checker can match exhaustively instead of downcasting.

use bitflags::bitflags;

use crate::{DeclId, ExprId, Name, PatternId, Span, StmtId};

/// Access capability of a receiver, reference, or passing convention.
#[derive(Copy, Clone, Eq, PartialEq, Ord, PartialOrd, Hash, Debug)]
pub enum Capability {
    /// Read-only access.
    Let,
    /// Exclusive, in-place mutating access.
    Inout,
    /// Consuming, by-value access.
    Sink,
    /// Initializing assignment.
    Set,
    /// Projected access, used by subscript receivers.
    Yielded,
}

/// Operator fixity.
#[derive(Copy, Clone, Eq, PartialEq, Hash, Debug)]
pub enum OperatorNotation {
    Prefix,
    Infix,
    Postfix,
}

/// The body of a callable declaration.
#[derive(Copy, Clone, Eq, PartialEq, Hash, Debug)]
pub enum Body {
    /// A brace statement.
    Block(StmtId),
    /// A single expression.
    Expr(ExprId),
}

bitflags! {
    /// Syntactic properties of a function declaration.
    #[derive(Copy, Clone, Eq, PartialEq, Hash, Debug, Default)]
    pub struct FunctionFlags: u8 {
        /// Mutates its receiver in place.
        const INOUT = 1 << 0;
        /// Consumes its receiver.
        const SINK = 1 << 1;
        /// Static member; no implicit receiver.
        const STATIC = 1 << 2;
        /// Underlies a lambda expression; parameter annotations may be
        /// elided and the output may be inferred from the body.
        const IN_EXPR_CONTEXT = 1 << 3;
        /// Foreign function; a body is not required.
        const FOREIGN = 1 << 4;
    }
}

/// A generic parameter list with an optional where clause.
#[derive(Clone, Eq, PartialEq, Hash, Debug, Default)]
pub struct GenericClause {
    /// Generic parameter declarations.
    pub parameters: Vec<DeclId>,
    /// Constraints from the where clause.
    pub where_clause: Option<WhereClause>,
}

/// A where clause.
#[derive(Clone, Eq, PartialEq, Hash, Debug, Default)]
pub struct WhereClause {
    pub constraints: Vec<ConstraintExpr>,
}

/// A constraint expression in a where clause.
#[derive(Clone, Eq, PartialEq, Hash, Debug)]
pub struct ConstraintExpr {
    pub kind: ConstraintExprKind,
    pub span: Span,
}

/// The shape of a where-clause constraint.
#[derive(Clone, Eq, PartialEq, Hash, Debug)]
pub enum ConstraintExprKind {
    /// `L == R` between two type expressions.
    Equality { lhs: ExprId, rhs: ExprId },
    /// `L: T & U` conformance of a type expression to a trait set.
    Conformance { subject: ExprId, traits: Vec<ExprId> },
    /// An opaque value predicate; evaluation is deferred.
    Value(ExprId),
}

/// How an initializer was introduced.
#[derive(Copy, Clone, Eq, PartialEq, Hash, Debug)]
pub enum InitializerKind {
    /// Written in source.
    Init,
    /// Synthesized memberwise initializer.
    Memberwise,
}

/// The closed set of declaration kinds.
#[derive(Clone, Debug)]
pub enum DeclKind {
    Module(ModuleDecl),
    Namespace(NamespaceDecl),
    Function(FunctionDecl),
    Initializer(InitializerDecl),
    Method(MethodDecl),
    MethodImpl(MethodImplDecl),
    Subscript(SubscriptDecl),
    SubscriptImpl(SubscriptImplDecl),
    ProductType(ProductTypeDecl),
    Trait(TraitDecl),
    TypeAlias(TypeAliasDecl),
    AssociatedType(AssociatedTypeDecl),
    AssociatedValue(AssociatedValueDecl),
    GenericParameter(GenericParameterDecl),
    Parameter(ParameterDecl),
    Binding(BindingDecl),
    Var(VarDecl),
    Operator(OperatorDecl),
    Conformance(ConformanceDecl),
    Extension(ExtensionDecl),
}

impl DeclKind {
    /// Whether this kind may share its base name with sibling declarations.
    ///
    /// Only free and member functions are overloadable; finding any other
    /// kind stops an outward lookup walk.
    pub fn is_overloadable(&self) -> bool {
        matches!(self, DeclKind::Function(_))
    }

    /// Whether this kind introduces a nominal type.
    pub fn is_type_decl(&self) -> bool {
        matches!(
            self,
            DeclKind::ProductType(_)
                | DeclKind::Trait(_)
                | DeclKind::TypeAlias(_)
                | DeclKind::AssociatedType(_)
                | DeclKind::GenericParameter(_)
        )
    }
}

/// A module; the root of a declaration tree.
#[derive(Clone, Debug)]
pub struct ModuleDecl {
    pub name: Name,
}

/// A namespace grouping declarations without introducing a type.
#[derive(Clone, Debug)]
pub struct NamespaceDecl {
    pub name: Name,
    pub members: Vec<DeclId>,
}

/// A free function, member function, or lambda underlying declaration.
#[derive(Clone, Debug)]
pub struct FunctionDecl {
    /// `None` for anonymous lambdas.
    pub name: Option<Name>,
    pub flags: FunctionFlags,
    pub generic: Option<GenericClause>,
    /// Explicit capture list; binding declarations.
    pub explicit_captures: Vec<DeclId>,
    /// Parameter declarations, in order.
    pub parameters: Vec<DeclId>,
    /// Implicit receiver parameter, for non-static members.
    pub receiver: Option<DeclId>,
    /// Output type annotation; `None` defaults to `Void` (or is inferred in
    /// expression contexts).
    pub output: Option<ExprId>,
    pub body: Option<Body>,
}

/// An initializer declaration.
#[derive(Clone, Debug)]
pub struct InitializerDecl {
    pub introducer: InitializerKind,
    pub generic: Option<GenericClause>,
    pub parameters: Vec<DeclId>,
    /// The implicit receiver parameter.
    pub receiver: DeclId,
    pub body: Option<StmtId>,
}

/// A method bundle: one signature shared by capability variants.
#[derive(Clone, Debug)]
pub struct MethodDecl {
    pub name: Name,
    pub generic: Option<GenericClause>,
    pub parameters: Vec<DeclId>,
    pub output: Option<ExprId>,
    /// The capability variants; method-implementation declarations.
    pub impls: Vec<DeclId>,
}

/// One capability variant of a method bundle.
#[derive(Clone, Debug)]
pub struct MethodImplDecl {
    pub introducer: Capability,
    /// The implicit receiver parameter.
    pub receiver: DeclId,
    pub body: Option<Body>,
}

/// A subscript bundle.
#[derive(Clone, Debug)]
pub struct SubscriptDecl {
    /// `None` denotes the unnamed `[]` subscript.
    pub name: Option<Name>,
    pub generic: Option<GenericClause>,
    pub explicit_captures: Vec<DeclId>,
    /// `None` for property subscripts (no parameter list at all).
    pub parameters: Option<Vec<DeclId>>,
    pub output: ExprId,
    pub impls: Vec<DeclId>,
}

/// One capability variant of a subscript bundle.
#[derive(Clone, Debug)]
pub struct SubscriptImplDecl {
    pub introducer: Capability,
    pub receiver: Option<DeclId>,
    pub body: Option<Body>,
}

/// A nominal product type.
#[derive(Clone, Debug)]
pub struct ProductTypeDecl {
    pub name: Name,
    pub generic: Option<GenericClause>,
    /// Name expressions of the declared conformance list.
    pub conformances: Vec<ExprId>,
    pub members: Vec<DeclId>,
    /// The synthesized memberwise initializer.
    pub memberwise_init: DeclId,
}

/// A trait declaration.
#[derive(Clone, Debug)]
pub struct TraitDecl {
    pub name: Name,
    /// Name expressions of refined traits.
    pub refinements: Vec<ExprId>,
    pub members: Vec<DeclId>,
    /// The implicit `Self` generic parameter declaration.
    pub self_parameter: DeclId,
}

/// A type alias declaration.
#[derive(Clone, Debug)]
pub struct TypeAliasDecl {
    pub name: Name,
    pub generic: Option<GenericClause>,
    pub aliased: ExprId,
}

/// An associated type requirement in a trait.
#[derive(Clone, Debug)]
pub struct AssociatedTypeDecl {
    pub name: Name,
    pub conformances: Vec<ExprId>,
    pub where_clause: Option<WhereClause>,
    pub default: Option<ExprId>,
}

/// An associated value requirement in a trait.
#[derive(Clone, Debug)]
pub struct AssociatedValueDecl {
    pub name: Name,
    pub where_clause: Option<WhereClause>,
    pub default: Option<ExprId>,
}

/// A generic parameter declaration.
#[derive(Clone, Debug)]
pub struct GenericParameterDecl {
    pub name: Name,
    /// Conformance-list sugar; if the first entry is not a trait the
    /// declaration denotes a generic *value* parameter.
    pub conformances: Vec<ExprId>,
    pub default: Option<ExprId>,
}

/// A formal parameter declaration.
#[derive(Clone, Debug)]
pub struct ParameterDecl {
    /// Argument label, if distinct from the parameter name.
    pub label: Option<Name>,
    pub name: Name,
    /// Parameter type annotation; elided only for lambda parameters and
    /// synthesized receivers.
    pub annotation: Option<ExprId>,
    pub default_value: Option<ExprId>,
}

/// A binding declaration: `let`/`var` pattern with optional initializer.
#[derive(Clone, Debug)]
pub struct BindingDecl {
    pub pattern: PatternId,
    pub initializer: Option<ExprId>,
}

/// A single variable introduced by a name pattern.
#[derive(Clone, Debug)]
pub struct VarDecl {
    pub name: Name,
}

/// An operator declaration.
#[derive(Clone, Debug)]
pub struct OperatorDecl {
    pub notation: OperatorNotation,
    pub name: Name,
}

/// A conformance declaration extending a type with trait conformances.
#[derive(Clone, Debug)]
pub struct ConformanceDecl {
    /// Type expression of the extended subject.
    pub subject: ExprId,
    pub conformances: Vec<ExprId>,
    pub where_clause: Option<WhereClause>,
    pub members: Vec<DeclId>,
}

/// An extension declaration adding members to a type.
#[derive(Clone, Debug)]
pub struct ExtensionDecl {
    pub subject: ExprId,
    pub where_clause: Option<WhereClause>,
    pub members: Vec<DeclId>,
}
