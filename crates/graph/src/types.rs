//! The type model attached to declarations, references, and calls.
//!
//! Types are plain values: cloning is cheap because all names are interned.
//! A type may be unresolved ([`Type::Unknown`]) when the defining code is not
//! part of the analyzed input; the semantic layer tolerates this everywhere
//! and may fix such a type later through inference.

use crate::name::Name;
use crate::nodes::NodeId;

#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum Type {
    /// Not (yet) determined. Matches any type during signature comparison.
    Unknown,
    /// Language builtin such as `int` or `bool`.
    Builtin(Name),
    /// Record/class type. `record` back-links to the declaration once it is
    /// known; an inferred record declaration fills it in after the fact.
    Object {
        name: Name,
        record: Option<NodeId>,
    },
    /// Pointer to another type.
    Pointer(Box<Type>),
    /// Reference to another type.
    Reference(Box<Type>),
    /// Pointer to a function with the given signature.
    FunctionPointer {
        parameters: Vec<Type>,
        return_type: Box<Type>,
    },
    /// The computed type of a function declaration.
    Function {
        parameters: Vec<Type>,
        return_type: Box<Type>,
    },
    /// A template type parameter (`T` in `template <typename T>`).
    Parameterized(Name),
}

impl Type {
    pub fn builtin(name: &str) -> Self {
        Self::Builtin(Name::new(name))
    }

    pub fn object(name: &str) -> Self {
        Self::Object {
            name: Name::new(name),
            record: None,
        }
    }

    pub fn pointer(pointee: Type) -> Self {
        Self::Pointer(Box::new(pointee))
    }

    pub fn reference(referee: Type) -> Self {
        Self::Reference(Box::new(referee))
    }

    pub fn is_unknown(&self) -> bool {
        matches!(self, Type::Unknown)
    }

    pub fn is_object(&self) -> bool {
        matches!(self, Type::Object { .. })
    }

    /// The record declaration backing an object type, if linked.
    pub fn record(&self) -> Option<NodeId> {
        match self {
            Type::Object { record, .. } => *record,
            _ => None,
        }
    }

    /// Back-links an object type to its record declaration. No-op for other
    /// variants.
    pub fn set_record(&mut self, declaration: NodeId) {
        if let Type::Object { record, .. } = self {
            *record = Some(declaration);
        }
    }

    /// The display name of the type, used for inferred parameter names and
    /// log messages.
    pub fn type_name(&self) -> &str {
        match self {
            Type::Unknown => "unknown",
            Type::Builtin(name) => name.as_str(),
            Type::Object { name, .. } => name.as_str(),
            Type::Pointer(_) => "pointer",
            Type::Reference(_) => "reference",
            Type::FunctionPointer { .. } => "fptr",
            Type::Function { .. } => "function",
            Type::Parameterized(name) => name.as_str(),
        }
    }

    /// Structural type compatibility used by signature matching.
    ///
    /// `Unknown` on either side is a wildcard; object types compare by name
    /// only, so a type that was back-linked to an inferred record still
    /// matches its un-linked duplicates.
    pub fn matches(&self, other: &Type) -> bool {
        match (self, other) {
            (Type::Unknown, _) | (_, Type::Unknown) => true,
            (Type::Builtin(a), Type::Builtin(b)) => a == b,
            (Type::Object { name: a, .. }, Type::Object { name: b, .. }) => a == b,
            (Type::Pointer(a), Type::Pointer(b)) => a.matches(b),
            (Type::Reference(a), Type::Reference(b)) => a.matches(b),
            (
                Type::FunctionPointer {
                    parameters: pa,
                    return_type: ra,
                },
                Type::FunctionPointer {
                    parameters: pb,
                    return_type: rb,
                },
            )
            | (
                Type::Function {
                    parameters: pa,
                    return_type: ra,
                },
                Type::Function {
                    parameters: pb,
                    return_type: rb,
                },
            ) => {
                pa.len() == pb.len()
                    && ra.matches(rb)
                    && pa.iter().zip(pb.iter()).all(|(a, b)| a.matches(b))
            }
            (Type::Parameterized(a), Type::Parameterized(b)) => a == b,
            _ => false,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_unknown_is_wildcard() {
        assert!(Type::Unknown.matches(&Type::builtin("int")));
        assert!(Type::builtin("int").matches(&Type::Unknown));
    }

    #[test]
    fn test_object_matches_by_name_only() {
        let mut linked = Type::object("User");
        linked.set_record(NodeId::new(0, 7));
        assert!(linked.matches(&Type::object("User")));
        assert!(!linked.matches(&Type::object("Admin")));
    }

    #[test]
    fn test_nested_pointer_match() {
        let a = Type::pointer(Type::pointer(Type::builtin("int")));
        let b = Type::pointer(Type::pointer(Type::builtin("int")));
        let c = Type::pointer(Type::builtin("int"));
        assert!(a.matches(&b));
        assert!(!a.matches(&c));
    }
}
