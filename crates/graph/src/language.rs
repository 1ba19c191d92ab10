//! Per-language configuration consumed by the semantic layer.
//!
//! Frontends describe the traits of their language that affect scoping and
//! inference; the core never type-tests on concrete frontend types.

/// Language traits relevant to scope building and declaration inference.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LanguageConfig {
    /// Human-readable language name, used in log messages only.
    pub name: &'static str,
    /// Delimiter between FQN segments (e.g. `::` for C++, `.` for Java).
    pub namespace_delimiter: &'static str,
    /// Whether the language distinguishes classes from plain aggregates.
    /// Drives the struct-to-class upgrade when a method is inferred on an
    /// inferred struct.
    pub has_classes: bool,
    /// Whether members can be referenced without an explicit receiver
    /// (e.g. a bare `field` inside a C++ or Java method body).
    pub has_implicit_receiver: bool,
}

impl LanguageConfig {
    pub fn cxx() -> Self {
        Self {
            name: "c++",
            namespace_delimiter: "::",
            has_classes: true,
            has_implicit_receiver: true,
        }
    }

    pub fn java() -> Self {
        Self {
            name: "java",
            namespace_delimiter: ".",
            has_classes: true,
            has_implicit_receiver: true,
        }
    }

    pub fn go() -> Self {
        Self {
            name: "go",
            namespace_delimiter: ".",
            has_classes: false,
            has_implicit_receiver: false,
        }
    }
}

impl Default for LanguageConfig {
    fn default() -> Self {
        Self::cxx()
    }
}
