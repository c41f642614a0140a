//! Interned identifiers.
//!
//! Identifiers are interned once and compared as 32-bit handles thereafter.
//! The checker is single-threaded (one `TypeChecker` owns every cache), so
//! the interner needs no locking.

use std::fmt;

use rustc_hash::FxHashMap;

/// An interned identifier.
#[derive(Copy, Clone, Eq, PartialEq, Ord, PartialOrd, Hash)]
#[repr(transparent)]
pub struct Name(u32);

impl Name {
    /// Pre-interned empty string.
    pub const EMPTY: Name = Name(0);

    /// Get the raw u32 value.
    #[inline]
    pub const fn raw(self) -> u32 {
        self.0
    }

    /// Create from a raw u32 value.
    #[inline]
    pub const fn from_raw(raw: u32) -> Self {
        Name(raw)
    }
}

impl fmt::Debug for Name {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Name({})", self.0)
    }
}

impl Default for Name {
    fn default() -> Self {
        Self::EMPTY
    }
}

/// Interner mapping identifier text to [`Name`] handles.
#[derive(Debug, Default)]
pub struct StringInterner {
    map: FxHashMap<String, Name>,
    strings: Vec<String>,
}

impl StringInterner {
    /// Create an interner with the empty string pre-interned at index 0.
    pub fn new() -> Self {
        let mut interner = StringInterner {
            map: FxHashMap::default(),
            strings: Vec::with_capacity(64),
        };
        let empty = interner.intern("");
        debug_assert_eq!(empty, Name::EMPTY);
        interner
    }

    /// Intern `text`, returning its handle.
    pub fn intern(&mut self, text: &str) -> Name {
        if let Some(&name) = self.map.get(text) {
            return name;
        }
        let name = Name(u32::try_from(self.strings.len()).unwrap_or(u32::MAX));
        self.strings.push(text.to_owned());
        self.map.insert(text.to_owned(), name);
        name
    }

    /// Resolve a handle back to its text.
    pub fn lookup(&self, name: Name) -> &str {
        &self.strings[name.0 as usize]
    }

    /// Number of interned strings.
    pub fn len(&self) -> usize {
        self.strings.len()
    }

    /// Whether nothing beyond the empty string has been interned.
    pub fn is_empty(&self) -> bool {
        self.strings.len() <= 1
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn interning_is_idempotent() {
        let mut interner = StringInterner::new();
        let a = interner.intern("foo");
        let b = interner.intern("foo");
        assert_eq!(a, b);
        assert_eq!(interner.lookup(a), "foo");
    }

    #[test]
    fn distinct_strings_get_distinct_names() {
        let mut interner = StringInterner::new();
        let a = interner.intern("foo");
        let b = interner.intern("bar");
        assert_ne!(a, b);
    }

    #[test]
    fn empty_string_is_pre_interned() {
        let mut interner = StringInterner::new();
        assert_eq!(interner.intern(""), Name::EMPTY);
    }
}
