//! Structural type property flags.
//!
//! Flags answer "does this type contain X?" questions without callers
//! writing their own traversal. They propagate from parts to whole by
//! bitwise OR.

use bitflags::bitflags;

bitflags! {
    /// Structural properties of a type.
    #[derive(Copy, Clone, Eq, PartialEq, Hash, Debug, Default)]
    pub struct TypeFlags: u8 {
        /// Contains an open inference variable.
        const HAS_VARIABLE = 1 << 0;
        /// Contains the error type.
        const HAS_ERROR = 1 << 1;
        /// Contains a generic parameter.
        const HAS_GENERIC_PARAM = 1 << 2;
        /// Contains a skolem.
        const HAS_SKOLEM = 1 << 3;
    }
}

impl TypeFlags {
    /// Combine flags from multiple parts.
    pub fn merge_all(parts: impl IntoIterator<Item = Self>) -> Self {
        let mut result = Self::empty();
        for p in parts {
            result |= p;
        }
        result
    }
}
