//! Human-readable type rendering.
//!
//! Types hold declaration handles, not names, so rendering needs the AST
//! and the interner. [`Ty::display`] packages the three into one value
//! implementing [`std::fmt::Display`], for diagnostics and tests.

use std::fmt;

use vela_ir::{Ast, Capability, DeclKind, Name, StringInterner};

use crate::{BuiltinType, CallableParam, Primitive, Ty};

impl Ty {
    /// Render this type against `ast` and `names`.
    pub fn display<'a>(&'a self, ast: &'a Ast, names: &'a StringInterner) -> TyDisplay<'a> {
        TyDisplay { ty: self, ast, names }
    }
}

/// A type bundled with the context needed to print it.
pub struct TyDisplay<'a> {
    ty: &'a Ty,
    ast: &'a Ast,
    names: &'a StringInterner,
}

impl TyDisplay<'_> {
    fn nested<'b>(&'b self, ty: &'b Ty) -> TyDisplay<'b> {
        TyDisplay {
            ty,
            ast: self.ast,
            names: self.names,
        }
    }

    fn name(&self, name: Name) -> &str {
        self.names.lookup(name)
    }

    fn decl_name(&self, decl: vela_ir::DeclId) -> &str {
        let name = match self.ast.decl(decl) {
            DeclKind::Module(d) => Some(d.name),
            DeclKind::Namespace(d) => Some(d.name),
            DeclKind::Function(d) => d.name,
            DeclKind::Method(d) => Some(d.name),
            DeclKind::Subscript(d) => d.name,
            DeclKind::ProductType(d) => Some(d.name),
            DeclKind::Trait(d) => Some(d.name),
            DeclKind::TypeAlias(d) => Some(d.name),
            DeclKind::AssociatedType(d) => Some(d.name),
            DeclKind::AssociatedValue(d) => Some(d.name),
            DeclKind::GenericParameter(d) => Some(d.name),
            DeclKind::Parameter(d) => Some(d.name),
            DeclKind::Var(d) => Some(d.name),
            DeclKind::Operator(d) => Some(d.name),
            _ => None,
        };
        match name {
            Some(n) => self.name(n),
            None => "<anonymous>",
        }
    }

    fn write_inputs(&self, f: &mut fmt::Formatter<'_>, inputs: &[CallableParam]) -> fmt::Result {
        for (i, p) in inputs.iter().enumerate() {
            if i > 0 {
                write!(f, ", ")?;
            }
            if let Some(label) = p.label {
                write!(f, "{}: ", self.name(label))?;
            }
            write!(f, "{}", self.nested(&p.ty))?;
        }
        Ok(())
    }
}

fn convention_keyword(c: Capability) -> &'static str {
    match c {
        Capability::Let => "let",
        Capability::Inout => "inout",
        Capability::Sink => "sink",
        Capability::Set => "set",
        Capability::Yielded => "yielded",
    }
}

impl fmt::Display for TyDisplay<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.ty {
            Ty::Void => write!(f, "Void"),
            Ty::Never => write!(f, "Never"),
            Ty::Any => write!(f, "Any"),
            Ty::Error => write!(f, "_error_"),
            Ty::Primitive(Primitive::Int) => write!(f, "Int"),
            Ty::Primitive(Primitive::Float) => write!(f, "Float"),
            Ty::Primitive(Primitive::Bool) => write!(f, "Bool"),
            Ty::Builtin(BuiltinType::Module) => write!(f, "Builtin"),
            Ty::Builtin(BuiltinType::Type(p)) => {
                write!(f, "Builtin.{}", self.nested(&Ty::Primitive(*p)))
            }
            Ty::Builtin(BuiltinType::Function(n)) => write!(f, "Builtin.{}", self.name(*n)),
            Ty::GenericParam(d) | Ty::Trait(d) | Ty::Product(d) => {
                write!(f, "{}", self.decl_name(*d))
            }
            Ty::Associated { decl, domain } => {
                write!(f, "{}.{}", self.nested(domain), self.decl_name(*decl))
            }
            Ty::Alias { decl, .. } => write!(f, "{}", self.decl_name(*decl)),
            Ty::BoundGeneric { base, args } => {
                write!(f, "{}<", self.nested(base))?;
                for (i, a) in args.iter().enumerate() {
                    if i > 0 {
                        write!(f, ", ")?;
                    }
                    write!(f, "{}", self.nested(a))?;
                }
                write!(f, ">")
            }
            Ty::Tuple(fields) => {
                write!(f, "{{")?;
                for (i, field) in fields.iter().enumerate() {
                    if i > 0 {
                        write!(f, ", ")?;
                    }
                    if let Some(label) = field.label {
                        write!(f, "{}: ", self.name(label))?;
                    }
                    write!(f, "{}", self.nested(&field.ty))?;
                }
                write!(f, "}}")
            }
            Ty::Sum(elements) => {
                for (i, e) in elements.iter().enumerate() {
                    if i > 0 {
                        write!(f, " | ")?;
                    }
                    write!(f, "{}", self.nested(e))?;
                }
                Ok(())
            }
            Ty::Lambda {
                receiver_effect,
                environment,
                inputs,
                output,
            } => {
                write!(f, "[{}](", self.nested(environment))?;
                self.write_inputs(f, inputs)?;
                write!(f, ")")?;
                if let Some(effect) = receiver_effect {
                    write!(f, " {}", convention_keyword(*effect))?;
                }
                write!(f, " -> {}", self.nested(output))
            }
            Ty::Method {
                receiver,
                inputs,
                output,
                ..
            } => {
                write!(f, "method [{}](", self.nested(receiver))?;
                self.write_inputs(f, inputs)?;
                write!(f, ") -> {}", self.nested(output))
            }
            Ty::Subscript {
                is_property,
                environment,
                inputs,
                output,
                ..
            } => {
                if *is_property {
                    write!(f, "property [{}] {}", self.nested(environment), self.nested(output))
                } else {
                    write!(f, "subscript [{}](", self.nested(environment))?;
                    self.write_inputs(f, inputs)?;
                    write!(f, "): {}", self.nested(output))
                }
            }
            Ty::Parameter { convention, bare } => {
                write!(f, "{} {}", convention_keyword(*convention), self.nested(bare))
            }
            Ty::Remote {
                capability,
                referent,
            } => write!(
                f,
                "remote {} {}",
                convention_keyword(*capability),
                self.nested(referent)
            ),
            Ty::Skolem(base) => write!(f, "${}", self.nested(base)),
            Ty::ConformanceLens { subject, lens } => {
                write!(f, "{}::{}", self.nested(subject), self.nested(lens))
            }
            Ty::Metatype(instance) => write!(f, "Metatype<{}>", self.nested(instance)),
            Ty::Var(v) => write!(f, "{v:?}"),
        }
    }
}

#[cfg(test)]
mod tests {
    use vela_ir::{Ast, ProductTypeDecl, Span, StringInterner};

    use super::*;
    use crate::TupleField;

    #[test]
    fn renders_nominal_and_structural_types() {
        let mut names = StringInterner::new();
        let mut ast = Ast::new();
        let module = ast.push_module(names.intern("test"), Span::DUMMY);
        let file = ast.push_file(module);
        let decl = ast.declare(file, Span::DUMMY);
        let init = ast.declare(file, Span::DUMMY);
        ast.define(
            decl,
            vela_ir::DeclKind::ProductType(ProductTypeDecl {
                name: names.intern("Pair"),
                generic: None,
                conformances: Vec::new(),
                members: Vec::new(),
                memberwise_init: init,
            }),
        );

        let ty = Ty::Tuple(vec![
            TupleField::new(Some(names.intern("x")), Ty::Product(decl)),
            TupleField::bare(Ty::INT),
        ]);
        assert_eq!(ty.display(&ast, &names).to_string(), "{x: Pair, Int}");
    }
}
