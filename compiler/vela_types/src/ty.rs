//! The type representation.
//!
//! `Ty` is a closed union compared structurally. Compound variants own
//! their parts, so types are plain values: cheap to clone for the sizes
//! the checker manipulates, and usable as hash-map keys without an
//! interner.

use bitflags::bitflags;
use vela_ir::{Capability, DeclId, Name};

use crate::TypeFlags;

/// An open inference variable.
#[derive(Copy, Clone, Eq, PartialEq, Ord, PartialOrd, Hash)]
#[repr(transparent)]
pub struct TypeVar(u32);

impl TypeVar {
    #[inline]
    pub const fn from_raw(raw: u32) -> Self {
        TypeVar(raw)
    }

    #[inline]
    pub const fn raw(self) -> u32 {
        self.0
    }
}

impl std::fmt::Debug for TypeVar {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "%{}", self.0)
    }
}

/// Built-in machine-level types.
#[derive(Clone, Eq, PartialEq, Hash, Debug)]
pub enum BuiltinType {
    /// The namespace through which built-ins are reached.
    Module,
    /// A built-in scalar.
    Type(Primitive),
    /// A built-in function, identified by name.
    Function(Name),
}

/// Built-in scalar types.
#[derive(Copy, Clone, Eq, PartialEq, Hash, Debug)]
pub enum Primitive {
    Int,
    Float,
    Bool,
}

bitflags! {
    /// A set of access capabilities.
    #[derive(Copy, Clone, Eq, PartialEq, Hash, Debug, Default)]
    pub struct CapabilitySet: u8 {
        const LET = 1 << 0;
        const INOUT = 1 << 1;
        const SINK = 1 << 2;
        const SET = 1 << 3;
        const YIELDED = 1 << 4;
    }
}

impl From<Capability> for CapabilitySet {
    fn from(capability: Capability) -> Self {
        match capability {
            Capability::Let => CapabilitySet::LET,
            Capability::Inout => CapabilitySet::INOUT,
            Capability::Sink => CapabilitySet::SINK,
            Capability::Set => CapabilitySet::SET,
            Capability::Yielded => CapabilitySet::YIELDED,
        }
    }
}

/// A labeled element of a tuple type.
#[derive(Clone, Eq, PartialEq, Hash, Debug)]
pub struct TupleField {
    pub label: Option<Name>,
    pub ty: Ty,
}

impl TupleField {
    pub fn new(label: Option<Name>, ty: Ty) -> Self {
        TupleField { label, ty }
    }

    /// An unlabeled field.
    pub fn bare(ty: Ty) -> Self {
        TupleField { label: None, ty }
    }
}

/// A labeled input of a callable type.
#[derive(Clone, Eq, PartialEq, Hash, Debug)]
pub struct CallableParam {
    pub label: Option<Name>,
    pub ty: Ty,
}

impl CallableParam {
    pub fn new(label: Option<Name>, ty: Ty) -> Self {
        CallableParam { label, ty }
    }

    /// An unlabeled input.
    pub fn bare(ty: Ty) -> Self {
        CallableParam { label: None, ty }
    }
}

/// The closed union of types.
#[derive(Clone, Eq, PartialEq, Hash, Debug)]
pub enum Ty {
    /// The unit type, an empty tuple in all but name.
    Void,
    /// The uninhabited type.
    Never,
    /// The top type.
    Any,
    /// The error type; equal to itself so checking can continue.
    Error,
    Primitive(Primitive),
    Builtin(BuiltinType),
    /// A reference to a generic parameter declaration.
    GenericParam(DeclId),
    /// An associated type viewed through its domain.
    Associated { decl: DeclId, domain: Box<Ty> },
    Trait(DeclId),
    Product(DeclId),
    /// A type alias, transparent for equivalence but kept for display.
    Alias { decl: DeclId, aliasee: Box<Ty> },
    /// A generic type applied to arguments.
    BoundGeneric { base: Box<Ty>, args: Vec<Ty> },
    Tuple(Vec<TupleField>),
    /// An anonymous union of alternatives.
    Sum(Vec<Ty>),
    /// The type of a lambda or free function.
    Lambda {
        receiver_effect: Option<Capability>,
        environment: Box<Ty>,
        inputs: Vec<CallableParam>,
        output: Box<Ty>,
    },
    /// The type of a method bundle.
    Method {
        capabilities: CapabilitySet,
        receiver: Box<Ty>,
        inputs: Vec<CallableParam>,
        output: Box<Ty>,
    },
    /// The type of a subscript bundle.
    Subscript {
        is_property: bool,
        capabilities: CapabilitySet,
        environment: Box<Ty>,
        inputs: Vec<CallableParam>,
        output: Box<Ty>,
    },
    /// The type of a parameter: convention applied to a bare type.
    Parameter { convention: Capability, bare: Box<Ty> },
    /// A projection of storage owned elsewhere.
    Remote { capability: Capability, referent: Box<Ty> },
    /// A generic parameter treated as an unknown-but-fixed concrete type.
    Skolem(Box<Ty>),
    /// A subject viewed through one of the traits it conforms to.
    ConformanceLens { subject: Box<Ty>, lens: Box<Ty> },
    /// The type of a type.
    Metatype(Box<Ty>),
    Var(TypeVar),
}

impl Ty {
    /// Shorthand for `Primitive(Int)`.
    pub const INT: Ty = Ty::Primitive(Primitive::Int);
    /// Shorthand for `Primitive(Float)`.
    pub const FLOAT: Ty = Ty::Primitive(Primitive::Float);
    /// Shorthand for `Primitive(Bool)`.
    pub const BOOL: Ty = Ty::Primitive(Primitive::Bool);

    /// A sum over `elements`, deduplicated. Zero elements collapse to
    /// `Never`; a single element is returned unwrapped.
    pub fn sum(elements: impl IntoIterator<Item = Ty>) -> Ty {
        let mut unique: Vec<Ty> = Vec::new();
        for e in elements {
            if !unique.contains(&e) {
                unique.push(e);
            }
        }
        match unique.len() {
            0 => Ty::Never,
            1 => unique.pop().unwrap_or(Ty::Never),
            _ => Ty::Sum(unique),
        }
    }

    /// A lambda with a thin (empty) environment.
    pub fn thin_lambda(inputs: Vec<CallableParam>, output: Ty) -> Ty {
        Ty::Lambda {
            receiver_effect: None,
            environment: Box::new(Ty::Void),
            inputs,
            output: Box::new(output),
        }
    }

    pub fn metatype(instance: Ty) -> Ty {
        Ty::Metatype(Box::new(instance))
    }

    pub fn parameter(convention: Capability, bare: Ty) -> Ty {
        Ty::Parameter {
            convention,
            bare: Box::new(bare),
        }
    }

    pub fn remote(capability: Capability, referent: Ty) -> Ty {
        Ty::Remote {
            capability,
            referent: Box::new(referent),
        }
    }

    pub fn skolem(base: Ty) -> Ty {
        Ty::Skolem(Box::new(base))
    }

    /// Structural property flags, computed by walking the parts.
    pub fn flags(&self) -> TypeFlags {
        match self {
            Ty::Void | Ty::Never | Ty::Any | Ty::Primitive(_) | Ty::Builtin(_) => {
                TypeFlags::empty()
            }
            Ty::Error => TypeFlags::HAS_ERROR,
            Ty::GenericParam(_) => TypeFlags::HAS_GENERIC_PARAM,
            Ty::Trait(_) | Ty::Product(_) => TypeFlags::empty(),
            Ty::Associated { domain, .. } => {
                TypeFlags::HAS_GENERIC_PARAM | domain.flags()
            }
            Ty::Alias { aliasee, .. } => aliasee.flags(),
            Ty::BoundGeneric { base, args } => {
                base.flags() | TypeFlags::merge_all(args.iter().map(Ty::flags))
            }
            Ty::Tuple(fields) => TypeFlags::merge_all(fields.iter().map(|f| f.ty.flags())),
            Ty::Sum(elements) => TypeFlags::merge_all(elements.iter().map(Ty::flags)),
            Ty::Lambda {
                environment,
                inputs,
                output,
                ..
            } => {
                environment.flags()
                    | TypeFlags::merge_all(inputs.iter().map(|p| p.ty.flags()))
                    | output.flags()
            }
            Ty::Method {
                receiver,
                inputs,
                output,
                ..
            } => {
                receiver.flags()
                    | TypeFlags::merge_all(inputs.iter().map(|p| p.ty.flags()))
                    | output.flags()
            }
            Ty::Subscript {
                environment,
                inputs,
                output,
                ..
            } => {
                environment.flags()
                    | TypeFlags::merge_all(inputs.iter().map(|p| p.ty.flags()))
                    | output.flags()
            }
            Ty::Parameter { bare, .. } => bare.flags(),
            Ty::Remote { referent, .. } => referent.flags(),
            Ty::Skolem(base) => TypeFlags::HAS_SKOLEM | (base.flags() - TypeFlags::HAS_GENERIC_PARAM),
            Ty::ConformanceLens { subject, lens } => subject.flags() | lens.flags(),
            Ty::Metatype(instance) => instance.flags(),
            Ty::Var(_) => TypeFlags::HAS_VARIABLE,
        }
    }

    /// Whether this is the error type.
    pub fn is_error(&self) -> bool {
        matches!(self, Ty::Error)
    }

    /// Whether this type contains an open inference variable.
    pub fn has_variable(&self) -> bool {
        self.flags().contains(TypeFlags::HAS_VARIABLE)
    }

    /// Whether this type contains a generic parameter.
    pub fn has_generic_param(&self) -> bool {
        self.flags().contains(TypeFlags::HAS_GENERIC_PARAM)
    }

    /// Whether this is a leaf type, one with no parts to recurse into.
    pub fn is_leaf(&self) -> bool {
        matches!(
            self,
            Ty::Void
                | Ty::Never
                | Ty::Any
                | Ty::Error
                | Ty::Primitive(_)
                | Ty::Builtin(_)
                | Ty::GenericParam(_)
                | Ty::Trait(_)
                | Ty::Product(_)
                | Ty::Var(_)
        )
    }

    /// The declaration a nominal type refers to, looking through bound
    /// generics and aliases.
    pub fn nominal_decl(&self) -> Option<DeclId> {
        match self {
            Ty::Trait(d) | Ty::Product(d) | Ty::GenericParam(d) => Some(*d),
            Ty::Associated { decl, .. } | Ty::Alias { decl, .. } => Some(*decl),
            Ty::BoundGeneric { base, .. } => base.nominal_decl(),
            Ty::Skolem(base) => base.nominal_decl(),
            _ => None,
        }
    }

    /// Strip one layer of parameter convention, if present.
    pub fn bare(&self) -> &Ty {
        match self {
            Ty::Parameter { bare, .. } => bare,
            other => other,
        }
    }

    /// The base of a bound generic type, or the type itself.
    pub fn unapplied_base(&self) -> &Ty {
        match self {
            Ty::BoundGeneric { base, .. } => base,
            other => other,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn sum_collapses_trivial_cases() {
        assert_eq!(Ty::sum([]), Ty::Never);
        assert_eq!(Ty::sum([Ty::INT]), Ty::INT);
        assert_eq!(Ty::sum([Ty::INT, Ty::INT]), Ty::INT);
        assert!(matches!(Ty::sum([Ty::INT, Ty::BOOL]), Ty::Sum(v) if v.len() == 2));
    }

    #[test]
    fn flags_propagate_from_parts() {
        let lambda = Ty::thin_lambda(
            vec![CallableParam::bare(Ty::Var(TypeVar::from_raw(0)))],
            Ty::Error,
        );
        let flags = lambda.flags();
        assert!(flags.contains(TypeFlags::HAS_VARIABLE));
        assert!(flags.contains(TypeFlags::HAS_ERROR));
        assert!(!flags.contains(TypeFlags::HAS_SKOLEM));
    }

    #[test]
    fn skolem_hides_the_underlying_parameter() {
        let param = Ty::GenericParam(DeclId::from_raw(4));
        let skolem = Ty::skolem(param);
        assert!(skolem.flags().contains(TypeFlags::HAS_SKOLEM));
        assert!(!skolem.flags().contains(TypeFlags::HAS_GENERIC_PARAM));
    }
}
