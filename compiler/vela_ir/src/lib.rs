//! Program representation shared by the compiler phases.
//!
//! Nodes are stored in the flat [`Ast`] arena and addressed through opaque
//! 32-bit handles, so references between phases are cheap copies and the
//! tree itself has a single owner. Identifiers are interned to [`Name`]
//! handles by a [`StringInterner`].

mod ast;
mod decl;
mod expr;
mod ids;
mod name;
mod pattern;
mod scope;
mod span;
mod stmt;

pub use ast::{Ast, ScopeChain};
pub use decl::{
    AssociatedTypeDecl, AssociatedValueDecl, BindingDecl, Body, Capability, ConformanceDecl,
    ConstraintExpr, ConstraintExprKind, DeclKind, ExtensionDecl, FunctionDecl, FunctionFlags,
    GenericClause, GenericParameterDecl, InitializerDecl, InitializerKind, MethodDecl,
    MethodImplDecl, ModuleDecl, NamespaceDecl, OperatorDecl, OperatorNotation, ParameterDecl,
    ProductTypeDecl, SubscriptDecl, SubscriptImplDecl, TraitDecl, TypeAliasDecl, VarDecl,
    WhereClause,
};
pub use expr::{
    Argument, Expr, ExprKind, LambdaTypeParameter, NameDomain, NameExpr, NameRef, TupleElement,
};
pub use ids::{DeclId, ExprId, PatternId, ScopeId, StmtId};
pub use name::{Name, StringInterner};
pub use pattern::{BindingIntroducer, Pattern, PatternKind};
pub use scope::{Scope, ScopeKind};
pub use span::Span;
pub use stmt::{ConditionItem, Stmt, StmtKind};
