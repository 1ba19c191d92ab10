//! Interned names and fully-qualified name handling.

use internment::ArcIntern;
use std::fmt;

/// Interned symbol name for memory efficiency.
///
/// The same name appears many times in a large graph (every reference, every
/// declaration, every FQN segment), so names are interned and compared by
/// pointer. Record, namespace, and template declarations carry their
/// fully-qualified name here; all other nodes carry their local name.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct Name(ArcIntern<String>);

impl Name {
    pub fn new(name: impl Into<String>) -> Self {
        Self(ArcIntern::new(name.into()))
    }

    pub fn empty() -> Self {
        Self(ArcIntern::new(String::new()))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// True if the name contains at least one namespace delimiter.
    pub fn is_qualified(&self, delimiter: &str) -> bool {
        self.0.contains(delimiter)
    }

    /// The last delimiter-separated segment, or the whole name if unqualified.
    ///
    /// `"a::b::f"` with delimiter `"::"` yields `"f"`.
    pub fn local_name(&self, delimiter: &str) -> &str {
        match self.0.rfind(delimiter) {
            Some(idx) => &self.0[idx + delimiter.len()..],
            None => &self.0,
        }
    }

    /// Everything before the last delimiter, or `None` if unqualified.
    ///
    /// `"a::b::f"` with delimiter `"::"` yields `"a::b"`.
    pub fn qualifier(&self, delimiter: &str) -> Option<&str> {
        self.0.rfind(delimiter).map(|idx| &self.0[..idx])
    }

    /// Builds a fully-qualified name from a prefix and a local name.
    pub fn join(prefix: &str, delimiter: &str, local: &str) -> Self {
        if prefix.is_empty() {
            Self::new(local)
        } else {
            Self::new(format!("{prefix}{delimiter}{local}"))
        }
    }
}

impl Default for Name {
    fn default() -> Self {
        Self::empty()
    }
}

impl fmt::Display for Name {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for Name {
    fn from(name: &str) -> Self {
        Self::new(name)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_local_name_and_qualifier() {
        let name = Name::new("a::b::f");
        assert!(name.is_qualified("::"));
        assert_eq!(name.local_name("::"), "f");
        assert_eq!(name.qualifier("::"), Some("a::b"));

        let unqualified = Name::new("f");
        assert!(!unqualified.is_qualified("::"));
        assert_eq!(unqualified.local_name("::"), "f");
        assert_eq!(unqualified.qualifier("::"), None);
    }

    #[test]
    fn test_join_with_empty_prefix() {
        assert_eq!(Name::join("", "::", "N"), Name::new("N"));
        assert_eq!(Name::join("N", "::", "M"), Name::new("N::M"));
    }

    #[test]
    fn test_interning_equality() {
        assert_eq!(Name::new("x"), Name::new("x"));
        assert_ne!(Name::new("x"), Name::new("y"));
    }
}
