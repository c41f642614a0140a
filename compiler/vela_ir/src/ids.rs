//! Opaque 32-bit handles into the AST arenas.
//!
//! Every node is addressed by a small index; identity checks are integer
//! comparisons and ownership of the nodes stays with the [`crate::Ast`]
//! arena, never with referencing structures.

use std::fmt;

macro_rules! define_id {
    ($(#[$doc:meta])* $name:ident) => {
        $(#[$doc])*
        #[derive(Copy, Clone, Eq, PartialEq, Ord, PartialOrd, Hash)]
        #[repr(transparent)]
        pub struct $name(u32);

        impl $name {
            /// Create an id from a raw index.
            #[inline]
            pub const fn from_raw(raw: u32) -> Self {
                Self(raw)
            }

            /// The raw index.
            #[inline]
            pub const fn raw(self) -> u32 {
                self.0
            }

            /// The index as a usize, for arena addressing.
            #[inline]
            pub const fn index(self) -> usize {
                self.0 as usize
            }
        }

        impl fmt::Debug for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                write!(f, concat!(stringify!($name), "({})"), self.0)
            }
        }
    };
}

define_id! {
    /// A declaration in the AST arena.
    DeclId
}

define_id! {
    /// An expression in the AST arena.
    ExprId
}

define_id! {
    /// A statement in the AST arena.
    StmtId
}

define_id! {
    /// A pattern in the AST arena.
    PatternId
}

define_id! {
    /// A lexical scope.
    ScopeId
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn id_equality_is_index_equality() {
        assert_eq!(DeclId::from_raw(3), DeclId::from_raw(3));
        assert_ne!(DeclId::from_raw(3), DeclId::from_raw(4));
        assert_eq!(DeclId::from_raw(7).index(), 7);
    }
}
