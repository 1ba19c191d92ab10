use graph::{NodeId, NodeStoreMut, Type};
use tracing::debug;

/// A one-shot listener that fixes the type of an inferred declaration the
/// first time one of its uses produces a concrete type.
///
/// The declaration starts out with an unknown type; the first notification
/// sets it and every later one is ignored. No refinement or widening across
/// multiple observed types is attempted.
#[derive(Debug)]
pub struct TypeObserver {
    target: NodeId,
    fired: bool,
}

impl TypeObserver {
    pub fn new(target: NodeId) -> Self {
        Self {
            target,
            fired: false,
        }
    }

    pub fn target(&self) -> NodeId {
        self.target
    }

    /// Feeds an observed type to the declaration. Returns true when the
    /// declaration's type was fixed by this call.
    pub fn notify(&mut self, store: &mut impl NodeStoreMut, ty: &Type) -> bool {
        if self.fired {
            return false;
        }
        self.fired = true;

        if ty.is_unknown() {
            // nothing learned; stay armed for the next use
            self.fired = false;
            return false;
        }

        let node = store.node_mut(self.target);
        let name = node.name.clone();
        if let Some(slot) = node.declaration_mut().and_then(|decl| decl.ty_mut()) {
            if slot.is_unknown() {
                debug!("Inferring type of declaration {} to be {}", name, ty.type_name());
                *slot = ty.clone();
                return true;
            }
        }
        false
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use graph::{Declaration, Name, NodeKind, NodeStore, Unit};

    #[test]
    fn test_first_concrete_type_wins() {
        let mut unit = Unit::new(0, "a.cpp");
        let field = unit.add(
            Name::new("count"),
            NodeKind::Declaration(Declaration::Field { ty: Type::Unknown }),
        );

        let mut observer = TypeObserver::new(field);
        // an unknown observation keeps the observer armed
        assert!(!observer.notify(&mut unit, &Type::Unknown));
        assert!(observer.notify(&mut unit, &Type::builtin("int")));
        // later observations no longer change the type
        assert!(!observer.notify(&mut unit, &Type::builtin("bool")));

        assert_eq!(unit.node(field).ty(), Some(&Type::builtin("int")));
    }
}
