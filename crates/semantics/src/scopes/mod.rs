//! The scope tree.
//!
//! Scopes mirror the lexical structure of the source: every construct that
//! limits the visibility of declarations (block, function, loop, record,
//! namespace, ...) opens one scope. Scopes form a strict tree held in the
//! [`ScopeManager`]'s arena: a parent exclusively owns its children and a
//! child holds a non-owning [`ScopeId`] back-reference, never a shared
//! pointer.
//!
//! Name scopes are special: one logical namespace can be opened by several
//! anchor nodes across different translation units, so a name scope's
//! identity is its fully-qualified name, and the anchor is merely "the most
//! recently seen opener".

pub mod manager;

pub use manager::ScopeManager;

use graph::{Name, NodeId, Type};
use rustc_hash::FxHashMap;
use smallvec::SmallVec;

/// Handle into the scope arena of one [`ScopeManager`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ScopeId(u32);

impl ScopeId {
    pub(crate) fn new(index: usize) -> Self {
        Self(index as u32)
    }

    pub(crate) fn index(self) -> usize {
        self.0 as usize
    }
}

/// Locally visible value declarations and type aliases.
///
/// Declarations keep insertion order so resolution results are deterministic
/// and innermost-first within a scope.
#[derive(Debug, Default)]
pub struct ValueScopeData {
    pub declarations: Vec<NodeId>,
    pub typedefs: FxHashMap<Name, Type>,
}

/// The scope variants. All variants hold locally declared values; only
/// `Global` and `Name` additionally hold structure declarations (records,
/// namespaces, enums, templates).
#[derive(Debug)]
pub enum ScopeKind {
    Global {
        structure_declarations: Vec<NodeId>,
    },
    /// Namespace, record, or template scope. Identity is the FQN stored in
    /// [`Scope::scoped_name`], not the anchor node.
    Name {
        structure_declarations: Vec<NodeId>,
    },
    Block,
    Function,
    Loop {
        break_targets: SmallVec<[NodeId; 4]>,
        continue_targets: SmallVec<[NodeId; 4]>,
    },
    Switch {
        break_targets: SmallVec<[NodeId; 4]>,
    },
    Try,
    /// Generic value-declaration scope for `if` conditions, `catch` clauses,
    /// and similar single-declaration constructs.
    Value,
}

impl ScopeKind {
    /// True for scopes a `break` may target.
    pub fn is_breakable(&self) -> bool {
        matches!(self, ScopeKind::Loop { .. } | ScopeKind::Switch { .. })
    }

    /// True for scopes a `continue` may target.
    pub fn is_continuable(&self) -> bool {
        matches!(self, ScopeKind::Loop { .. })
    }

    /// True for scopes that can hold structure declarations.
    pub fn is_name_capable(&self) -> bool {
        matches!(self, ScopeKind::Global { .. } | ScopeKind::Name { .. })
    }

    pub fn structure_declarations(&self) -> Option<&Vec<NodeId>> {
        match self {
            ScopeKind::Global {
                structure_declarations,
            }
            | ScopeKind::Name {
                structure_declarations,
            } => Some(structure_declarations),
            _ => None,
        }
    }

    pub(crate) fn structure_declarations_mut(&mut self) -> Option<&mut Vec<NodeId>> {
        match self {
            ScopeKind::Global {
                structure_declarations,
            }
            | ScopeKind::Name {
                structure_declarations,
            } => Some(structure_declarations),
            _ => None,
        }
    }

    /// Records a break target. Returns false if this scope is not breakable.
    pub(crate) fn add_break_target(&mut self, statement: NodeId) -> bool {
        match self {
            ScopeKind::Loop { break_targets, .. } | ScopeKind::Switch { break_targets } => {
                break_targets.push(statement);
                true
            }
            _ => false,
        }
    }

    /// Records a continue target. Returns false if this scope is not
    /// continuable.
    pub(crate) fn add_continue_target(&mut self, statement: NodeId) -> bool {
        match self {
            ScopeKind::Loop {
                continue_targets, ..
            } => {
                continue_targets.push(statement);
                true
            }
            _ => false,
        }
    }

    pub fn break_targets(&self) -> Option<&[NodeId]> {
        match self {
            ScopeKind::Loop { break_targets, .. } | ScopeKind::Switch { break_targets } => {
                Some(break_targets)
            }
            _ => None,
        }
    }

    pub fn continue_targets(&self) -> Option<&[NodeId]> {
        match self {
            ScopeKind::Loop {
                continue_targets, ..
            } => Some(continue_targets),
            _ => None,
        }
    }

    pub fn kind_name(&self) -> &'static str {
        match self {
            ScopeKind::Global { .. } => "global",
            ScopeKind::Name { .. } => "name",
            ScopeKind::Block => "block",
            ScopeKind::Function => "function",
            ScopeKind::Loop { .. } => "loop",
            ScopeKind::Switch { .. } => "switch",
            ScopeKind::Try => "try",
            ScopeKind::Value => "value",
        }
    }
}

/// One node of the scope tree.
#[derive(Debug)]
pub struct Scope {
    id: ScopeId,
    /// The graph node that opened this scope. `None` only for a global scope
    /// before [`ScopeManager::reset_to_global`] bound it to a translation
    /// unit. Name scopes reassign this across files.
    pub anchor: Option<NodeId>,
    /// The FQN of name scopes; `None` for all other variants.
    pub scoped_name: Option<Name>,
    pub(crate) parent: Option<ScopeId>,
    pub(crate) children: Vec<ScopeId>,
    /// Label name -> label statement node, for labeled break/continue.
    labels: FxHashMap<Name, NodeId>,
    pub values: ValueScopeData,
    pub kind: ScopeKind,
}

impl Scope {
    pub(crate) fn new(id: ScopeId, anchor: Option<NodeId>, kind: ScopeKind) -> Self {
        Self {
            id,
            anchor,
            scoped_name: None,
            parent: None,
            children: Vec::new(),
            labels: FxHashMap::default(),
            values: ValueScopeData::default(),
            kind,
        }
    }

    pub fn id(&self) -> ScopeId {
        self.id
    }

    pub fn parent(&self) -> Option<ScopeId> {
        self.parent
    }

    pub fn children(&self) -> &[ScopeId] {
        &self.children
    }

    pub fn add_label(&mut self, name: Name, statement: NodeId) {
        self.labels.insert(name, statement);
    }

    pub fn label(&self, name: &Name) -> Option<NodeId> {
        self.labels.get(name).copied()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_breakable_and_continuable_predicates() {
        let loop_scope = ScopeKind::Loop {
            break_targets: SmallVec::new(),
            continue_targets: SmallVec::new(),
        };
        let switch_scope = ScopeKind::Switch {
            break_targets: SmallVec::new(),
        };
        assert!(loop_scope.is_breakable());
        assert!(loop_scope.is_continuable());
        assert!(switch_scope.is_breakable());
        assert!(!switch_scope.is_continuable());
        assert!(!ScopeKind::Block.is_breakable());
        assert!(!ScopeKind::Function.is_continuable());
    }

    #[test]
    fn test_break_target_rejected_on_unbreakable_scope() {
        let mut block = ScopeKind::Block;
        assert!(!block.add_break_target(NodeId::new(0, 0)));

        let mut switch_scope = ScopeKind::Switch {
            break_targets: SmallVec::new(),
        };
        assert!(switch_scope.add_break_target(NodeId::new(0, 1)));
        assert_eq!(switch_scope.break_targets(), Some(&[NodeId::new(0, 1)][..]));
    }

    #[test]
    fn test_label_table() {
        let mut scope = Scope::new(ScopeId::new(0), None, ScopeKind::Block);
        scope.add_label(Name::new("outer"), NodeId::new(0, 5));
        assert_eq!(scope.label(&Name::new("outer")), Some(NodeId::new(0, 5)));
        assert_eq!(scope.label(&Name::new("inner")), None);
    }
}
