//! The scope manager state machine.
//!
//! Frontends drive the manager while building a translation unit: every node
//! that begins a new scope is announced with [`ScopeManager::enter_scope`]
//! and closed with the matching [`ScopeManager::leave_scope`]; declarations
//! are registered through [`ScopeManager::add_declaration`] instead of being
//! attached to nodes directly. Later passes use the finished tree for bulk
//! resolution.
//!
//! Enter/leave calls must nest exactly like the source construct they
//! represent. Violations are logged and degrade to no-ops; the tree built so
//! far is kept, possibly incomplete, because frontends are best-effort
//! parsers of possibly malformed input.

use crate::scopes::{Scope, ScopeId, ScopeKind};
use graph::{Declaration, LanguageConfig, Name, Node, NodeKind, NodeStore, NodeId, Type};
use rustc_hash::FxHashMap;
use smallvec::SmallVec;
use tracing::{error, warn};

pub struct ScopeManager {
    /// Scope arena. The global scope is always at index 0, pushed by the
    /// constructor.
    scopes: Vec<Scope>,
    /// The currently active scope. Always valid after construction.
    current: ScopeId,
    /// Node -> scope opened by that node.
    scope_map: FxHashMap<NodeId, ScopeId>,
    /// FQN -> name scope. The identity index for cross-file namespace
    /// reconciliation; never keyed by anchor nodes.
    fqn_map: FxHashMap<Name, ScopeId>,
    language: LanguageConfig,
}

impl ScopeManager {
    pub fn new(language: LanguageConfig) -> Self {
        let global = Scope::new(
            ScopeId::new(0),
            None,
            ScopeKind::Global {
                structure_declarations: Vec::new(),
            },
        );
        Self {
            scopes: vec![global],
            current: ScopeId::new(0),
            scope_map: FxHashMap::default(),
            fqn_map: FxHashMap::default(),
            language,
        }
    }

    pub fn language(&self) -> &LanguageConfig {
        &self.language
    }

    pub fn current_scope(&self) -> ScopeId {
        self.current
    }

    pub(crate) fn set_current(&mut self, scope: ScopeId) {
        self.current = scope;
    }

    pub fn scope(&self, id: ScopeId) -> &Scope {
        &self.scopes[id.index()]
    }

    pub(crate) fn scope_mut(&mut self, id: ScopeId) -> &mut Scope {
        &mut self.scopes[id.index()]
    }

    pub fn scope_count(&self) -> usize {
        self.scopes.len()
    }

    pub fn scopes(&self) -> impl Iterator<Item = &Scope> {
        self.scopes.iter()
    }

    /// Rebinds the global scope's anchor to a new translation unit. Must be
    /// called once per unit before any other scope operation on it.
    pub fn reset_to_global(&mut self, translation_unit: NodeId) {
        let global = ScopeId::new(0);
        self.scopes[global.index()].anchor = Some(translation_unit);
        self.scope_map.insert(translation_unit, global);
        self.current = global;
    }

    /// Walks parents from `scope` until a global scope is found. `None` only
    /// for a detached chain, which indicates corrupted enter/leave discipline.
    pub fn global_scope_of(&self, scope: ScopeId) -> Option<ScopeId> {
        let mut cursor = Some(scope);
        while let Some(id) = cursor {
            if matches!(self.scopes[id.index()].kind, ScopeKind::Global { .. }) {
                return Some(id);
            }
            cursor = self.scopes[id.index()].parent;
        }
        None
    }

    pub fn global_scope(&self) -> Option<ScopeId> {
        self.global_scope_of(self.current)
    }

    /// Finds the first scope satisfying `predicate`, walking up from `start`
    /// (or the current scope).
    pub fn first_scope_matching<F>(&self, start: Option<ScopeId>, predicate: F) -> Option<ScopeId>
    where
        F: Fn(&Scope) -> bool,
    {
        let mut cursor = Some(start.unwrap_or(self.current));
        while let Some(id) = cursor {
            let scope = &self.scopes[id.index()];
            if predicate(scope) {
                return Some(id);
            }
            cursor = scope.parent;
        }
        None
    }

    pub fn is_in_block(&self) -> bool {
        self.first_scope_matching(None, |s| matches!(s.kind, ScopeKind::Block))
            .is_some()
    }

    pub fn is_in_function(&self) -> bool {
        self.first_scope_matching(None, |s| matches!(s.kind, ScopeKind::Function))
            .is_some()
    }

    pub fn is_in_record(&self, store: &impl NodeStore) -> bool {
        self.current_record(store).is_some()
    }

    /// The function whose scope is currently active, if any.
    pub fn current_function(&self) -> Option<NodeId> {
        self.first_scope_matching(None, |s| matches!(s.kind, ScopeKind::Function))
            .and_then(|id| self.scopes[id.index()].anchor)
    }

    /// The record whose scope is currently active, if any.
    pub fn current_record(&self, store: &impl NodeStore) -> Option<NodeId> {
        self.first_scope_matching(None, |s| {
            matches!(s.kind, ScopeKind::Name { .. })
                && s.anchor
                    .is_some_and(|a| matches!(store.node(a).declaration(), Some(Declaration::Record(_))))
        })
        .and_then(|id| self.scopes[id.index()].anchor)
    }

    /// The FQN prefix under which new name scopes are created: the FQN of the
    /// nearest enclosing name scope, or empty at the global level.
    pub fn current_name_prefix(&self) -> Name {
        let mut cursor = Some(self.current);
        while let Some(id) = cursor {
            let scope = &self.scopes[id.index()];
            if matches!(scope.kind, ScopeKind::Name { .. }) {
                return scope.scoped_name.clone().unwrap_or_default();
            }
            cursor = scope.parent;
        }
        Name::empty()
    }

    fn qualified_name_for(&self, name: &Name) -> Name {
        let delimiter = self.language.namespace_delimiter;
        if name.is_qualified(delimiter) {
            name.clone()
        } else {
            Name::join(self.current_name_prefix().as_str(), delimiter, name.as_str())
        }
    }

    /// Makes the scope of `node` current, creating it on the fly if the node
    /// kind opens a scope and none exists yet. Unknown node kinds are logged
    /// and leave the current scope unchanged.
    pub fn enter_scope(&mut self, store: &impl NodeStore, node_id: NodeId) {
        if let Some(&existing) = self.scope_map.get(&node_id) {
            // name scopes are shared across files; re-entering makes this
            // node the latest seen anchor
            if matches!(self.scopes[existing.index()].kind, ScopeKind::Name { .. }) {
                self.scopes[existing.index()].anchor = Some(node_id);
            }
            self.current = existing;
            return;
        }

        let node = store.node(node_id);
        let (kind, scoped_name) = match &node.kind {
            NodeKind::Block => (ScopeKind::Block, None),
            NodeKind::WhileStatement
            | NodeKind::DoStatement
            | NodeKind::AssertStatement
            | NodeKind::ForStatement
            | NodeKind::ForEachStatement => (
                ScopeKind::Loop {
                    break_targets: SmallVec::new(),
                    continue_targets: SmallVec::new(),
                },
                None,
            ),
            NodeKind::SwitchStatement => (
                ScopeKind::Switch {
                    break_targets: SmallVec::new(),
                },
                None,
            ),
            NodeKind::IfStatement | NodeKind::CatchClause => (ScopeKind::Value, None),
            NodeKind::TryStatement => (ScopeKind::Try, None),
            NodeKind::Declaration(Declaration::Function(_)) => (ScopeKind::Function, None),
            NodeKind::Declaration(Declaration::Record(_))
            | NodeKind::Declaration(Declaration::Template(_)) => (
                ScopeKind::Name {
                    structure_declarations: Vec::new(),
                },
                Some(self.qualified_name_for(&node.name)),
            ),
            NodeKind::Declaration(Declaration::Namespace) => {
                // one logical namespace can be opened by several nodes across
                // files; reuse an existing child scope with the same FQN
                let fqn = self.qualified_name_for(&node.name);
                let existing = self.scopes[self.current.index()]
                    .children
                    .iter()
                    .copied()
                    .find(|&child| {
                        let scope = &self.scopes[child.index()];
                        matches!(scope.kind, ScopeKind::Name { .. })
                            && scope.scoped_name.as_ref() == Some(&fqn)
                    });
                if let Some(existing) = existing {
                    self.scopes[existing.index()].anchor = Some(node_id);
                    self.scope_map.insert(node_id, existing);
                    self.current = existing;
                    return;
                }
                (
                    ScopeKind::Name {
                        structure_declarations: Vec::new(),
                    },
                    Some(fqn),
                )
            }
            _ => {
                error!(
                    "No known scope for node of kind {} ({:?})",
                    node.kind_name(),
                    node_id
                );
                return;
            }
        };

        self.push_scope(node_id, scoped_name, kind);
    }

    /// Read-only variant of [`enter_scope`](Self::enter_scope): never creates
    /// scopes, used by passes revisiting the finished tree. Still reassigns
    /// name-scope anchors.
    pub fn enter_scope_if_exists(&mut self, node_id: NodeId) {
        if let Some(&existing) = self.scope_map.get(&node_id) {
            if matches!(self.scopes[existing.index()].kind, ScopeKind::Name { .. }) {
                self.scopes[existing.index()].anchor = Some(node_id);
            }
            self.current = existing;
        }
    }

    fn push_scope(&mut self, anchor: NodeId, scoped_name: Option<Name>, kind: ScopeKind) {
        if self.scope_map.contains_key(&anchor) {
            error!(
                "Node cannot be scoped twice; a node has at most one associated scope apart from its parent scopes"
            );
            return;
        }

        let id = ScopeId::new(self.scopes.len());
        let mut scope = Scope::new(id, Some(anchor), kind);
        scope.scoped_name = scoped_name.clone();
        scope.parent = Some(self.current);
        self.scopes.push(scope);
        self.scopes[self.current.index()].children.push(id);
        self.scope_map.insert(anchor, id);
        if let Some(fqn) = scoped_name {
            self.fqn_map.insert(fqn, id);
        }
        self.current = id;
    }

    /// The counterpart of [`enter_scope`](Self::enter_scope). Searches from
    /// the current scope upward for the scope anchored at `node_id`; on
    /// success the parent becomes current and the left scope is returned.
    /// Inconsistencies are logged and leave the state untouched.
    pub fn leave_scope(&mut self, store: &impl NodeStore, node_id: NodeId) -> Option<ScopeId> {
        let left = self.first_scope_matching(None, |s| s.anchor == Some(node_id));
        match left {
            Some(id) => {
                match self.scopes[id.index()].parent {
                    Some(parent) => self.current = parent,
                    None => error!("Cannot leave the global scope"),
                }
                Some(id)
            }
            None => {
                let node = store.node(node_id);
                if self.scope_map.contains_key(&node_id) {
                    error!(
                        "Node of kind {} has a scope but is not active at the moment",
                        node.kind_name()
                    );
                } else {
                    error!(
                        "Node of kind {} is not associated with a scope",
                        node.kind_name()
                    );
                }
                None
            }
        }
    }

    /// Registers a declaration with the scope implied by its tag: value
    /// declarations with the nearest value-capable scope, structure
    /// declarations with the nearest name-capable scope, parse-error
    /// placeholders with the global scope.
    pub fn add_declaration(&mut self, store: &impl NodeStore, declaration: NodeId) {
        let node = store.node(declaration);
        let Some(decl) = node.declaration() else {
            warn!(
                "Node of kind {} is not a declaration; ignoring",
                node.kind_name()
            );
            return;
        };

        if matches!(decl, Declaration::Problem { .. }) {
            if let Some(global) = self.global_scope() {
                self.scopes[global.index()].values.declarations.push(declaration);
            }
        } else if decl.is_value() {
            // every scope variant is value-capable, so the nearest capable
            // scope is the current one
            self.scopes[self.current.index()]
                .values
                .declarations
                .push(declaration);
        } else if decl.is_structure() {
            let target = self.first_scope_matching(None, |s| s.kind.is_name_capable());
            if let Some(target) = target {
                if let Some(structures) = self.scopes[target.index()].kind.structure_declarations_mut()
                {
                    structures.push(declaration);
                }
            }
            // no name-capable scope means a caller bug; dropped silently
        }
    }

    /// Registers a type alias with the current scope.
    pub fn add_typedef(&mut self, store: &impl NodeStore, typedef: NodeId) {
        let node = store.node(typedef);
        match node.declaration() {
            Some(Declaration::Typedef { alias, ty }) => {
                let (alias, ty) = (alias.clone(), ty.clone());
                self.scopes[self.current.index()].values.typedefs.insert(alias, ty);
            }
            _ => error!(
                "Cannot add typedef: node of kind {} is not a typedef declaration",
                node.kind_name()
            ),
        }
    }

    /// Resolves a type alias, innermost definition wins.
    pub fn typedef_for(&self, alias: &Name) -> Option<&Type> {
        let mut cursor = Some(self.current);
        while let Some(id) = cursor {
            let scope = &self.scopes[id.index()];
            if let Some(ty) = scope.values.typedefs.get(alias) {
                return Some(ty);
            }
            cursor = scope.parent;
        }
        None
    }

    /// All typedefs visible from the current scope, innermost alias wins.
    pub fn current_typedefs(&self) -> FxHashMap<Name, Type> {
        let mut typedefs = FxHashMap::default();
        let mut cursor = Some(self.current);
        while let Some(id) = cursor {
            let scope = &self.scopes[id.index()];
            for (alias, ty) in &scope.values.typedefs {
                typedefs.entry(alias.clone()).or_insert_with(|| ty.clone());
            }
            cursor = scope.parent;
        }
        typedefs
    }

    /// Associates a break statement with the scope it will leave: the nearest
    /// breakable scope, or the scope of the labeled statement.
    pub fn add_break(&mut self, store: &impl NodeStore, statement: NodeId) {
        let node = store.node(statement);
        let label = match &node.kind {
            NodeKind::BreakStatement { label } => label.clone(),
            _ => {
                warn!("Node of kind {} is not a break statement", node.kind_name());
                return;
            }
        };
        match label {
            None => {
                let Some(target) = self.first_scope_matching(None, |s| s.kind.is_breakable())
                else {
                    error!(
                        "Break inside of unbreakable scope; the break will be ignored but may lead to an incorrect graph; the source code is not valid or incomplete"
                    );
                    return;
                };
                self.scopes[target.index()].kind.add_break_target(statement);
            }
            Some(label) => {
                if let Some(target) = self.labeled_scope(store, &label) {
                    if !self.scopes[target.index()].kind.add_break_target(statement) {
                        error!("Label '{label}' does not target a breakable scope");
                    }
                } else {
                    error!("Break references unknown label '{label}'");
                }
            }
        }
    }

    /// Associates a continue statement with the nearest continuable scope, or
    /// the scope of the labeled statement.
    pub fn add_continue(&mut self, store: &impl NodeStore, statement: NodeId) {
        let node = store.node(statement);
        let label = match &node.kind {
            NodeKind::ContinueStatement { label } => label.clone(),
            _ => {
                warn!(
                    "Node of kind {} is not a continue statement",
                    node.kind_name()
                );
                return;
            }
        };
        match label {
            None => {
                let Some(target) = self.first_scope_matching(None, |s| s.kind.is_continuable())
                else {
                    error!(
                        "Continue inside of non-continuable scope; the continue will be ignored but may lead to an incorrect graph; the source code is not valid or incomplete"
                    );
                    return;
                };
                self.scopes[target.index()].kind.add_continue_target(statement);
            }
            Some(label) => {
                if let Some(target) = self.labeled_scope(store, &label) {
                    if !self.scopes[target.index()].kind.add_continue_target(statement) {
                        error!("Label '{label}' does not target a continuable scope");
                    }
                } else {
                    error!("Continue references unknown label '{label}'");
                }
            }
        }
    }

    /// Registers a label statement with the current scope's label table.
    pub fn add_label(&mut self, store: &impl NodeStore, statement: NodeId) {
        let node = store.node(statement);
        match &node.kind {
            NodeKind::LabelStatement { .. } => {
                let name = node.name.clone();
                self.scopes[self.current.index()].add_label(name, statement);
            }
            _ => warn!("Node of kind {} is not a label statement", node.kind_name()),
        }
    }

    /// The scope of the statement a label applies to, if the label is visible
    /// from the current scope.
    fn labeled_scope(&self, store: &impl NodeStore, label: &Name) -> Option<ScopeId> {
        let mut cursor = Some(self.current);
        while let Some(id) = cursor {
            let scope = &self.scopes[id.index()];
            if let Some(statement) = scope.label(label) {
                let NodeKind::LabelStatement { target } = store.node(statement).kind else {
                    return None;
                };
                return self.lookup_scope(target);
            }
            cursor = scope.parent;
        }
        None
    }

    /// The scope associated with a node, if any.
    pub fn lookup_scope(&self, node: NodeId) -> Option<ScopeId> {
        self.scope_map.get(&node).copied()
    }

    /// Looks up a name scope by its FQN.
    pub fn lookup_scope_by_name(&self, fqn: &Name) -> Option<ScopeId> {
        self.fqn_map.get(fqn).copied()
    }

    /// The single resolution primitive: walks from `start` to the root,
    /// collecting declarations matching `predicate`. Results are ordered
    /// innermost to outermost and never deduplicated; callers apply their own
    /// overload/ambiguity policy. With `stop_if_found`, traversal ends at the
    /// first scope that produced a match, which models languages where
    /// overloading is only allowed within the same scope.
    pub fn resolve<F>(
        &self,
        store: &impl NodeStore,
        start: ScopeId,
        stop_if_found: bool,
        mut predicate: F,
    ) -> Vec<NodeId>
    where
        F: FnMut(&Node) -> bool,
    {
        let mut candidates = Vec::new();
        let mut cursor = Some(start);
        while let Some(id) = cursor {
            let scope = &self.scopes[id.index()];
            for &decl in &scope.values.declarations {
                if predicate(store.node(decl)) {
                    candidates.push(decl);
                }
            }
            if let Some(structures) = scope.kind.structure_declarations() {
                let mut structure_hits = Vec::new();
                for &decl in structures {
                    if predicate(store.node(decl)) {
                        structure_hits.push(decl);
                    }
                }
                if structure_hits.is_empty() {
                    // templates declared inside records are only consulted
                    // when the scope itself had no direct match
                    for &decl in structures {
                        if let Some(Declaration::Record(record)) = store.node(decl).declaration() {
                            for &template in &record.templates {
                                if predicate(store.node(template)) {
                                    structure_hits.push(template);
                                }
                            }
                        }
                    }
                }
                candidates.extend(structure_hits);
            }
            if stop_if_found && !candidates.is_empty() {
                return candidates;
            }
            cursor = scope.parent;
        }
        candidates
    }

    /// Resolves a reference to the innermost visible value declaration with a
    /// matching name. References typed as function pointers additionally
    /// match the entire signature against candidate functions.
    pub fn resolve_reference(
        &self,
        store: &impl NodeStore,
        reference: NodeId,
        scope: Option<ScopeId>,
    ) -> Option<NodeId> {
        let node = store.node(reference);
        let ref_ty = match &node.kind {
            NodeKind::Reference { ty } => ty,
            _ => {
                warn!("Node of kind {} is not a reference", node.kind_name());
                return None;
            }
        };
        let name = node.name.clone();
        let start = scope.unwrap_or(self.current);
        self.resolve(store, start, false, |candidate| {
            let Some(decl) = candidate.declaration() else {
                return false;
            };
            if !decl.is_value() || candidate.name != name {
                return false;
            }
            match (ref_ty, decl) {
                (
                    Type::FunctionPointer {
                        parameters,
                        return_type,
                    },
                    Declaration::Function(func),
                ) => {
                    func.return_type.matches(return_type)
                        && self.signature_matches(store, &func.parameters, parameters)
                }
                _ => true,
            }
        })
        .into_iter()
        .next()
    }

    /// Resolves a call to its candidate functions. A qualified call name
    /// jumps resolution to the named scope through the FQN index instead of
    /// starting at the current scope.
    pub fn resolve_function(
        &self,
        store: &impl NodeStore,
        call: NodeId,
        scope: Option<ScopeId>,
    ) -> Vec<NodeId> {
        let node = store.node(call);
        let NodeKind::Call(expr) = &node.kind else {
            warn!("Node of kind {} is not a call", node.kind_name());
            return Vec::new();
        };

        let delimiter = self.language.namespace_delimiter;
        let mut start = scope.unwrap_or(self.current);
        if node.name.is_qualified(delimiter) {
            if let Some(qualifier) = node.name.qualifier(delimiter) {
                match self.fqn_map.get(&Name::new(qualifier)) {
                    Some(&name_scope) => start = name_scope,
                    None => error!(
                        "Could not find the scope {} needed to resolve the call {}; falling back to the current scope",
                        qualifier, node.name
                    ),
                }
            }
        }

        let local = Name::new(node.name.local_name(delimiter));
        self.resolve(store, start, false, |candidate| {
            matches!(
                candidate.declaration(),
                Some(Declaration::Function(func))
                    if candidate.name == local
                        && self.signature_matches(store, &func.parameters, &expr.signature)
            )
        })
    }

    /// Like [`resolve_function`](Self::resolve_function) but matches by name
    /// only and stops at the first scope with a hit (same-scope-wins overload
    /// rules).
    pub fn resolve_function_stop_scope_traversal(
        &self,
        store: &impl NodeStore,
        call: NodeId,
    ) -> Vec<NodeId> {
        let node = store.node(call);
        if !matches!(node.kind, NodeKind::Call(_)) {
            warn!("Node of kind {} is not a call", node.kind_name());
            return Vec::new();
        }
        let local = Name::new(node.name.local_name(self.language.namespace_delimiter));
        self.resolve(store, self.current, true, |candidate| {
            matches!(candidate.declaration(), Some(Declaration::Function(_)))
                && candidate.name == local
        })
    }

    /// Resolves the function templates a templated call may instantiate.
    pub fn resolve_function_template(
        &self,
        store: &impl NodeStore,
        call: NodeId,
        scope: Option<ScopeId>,
    ) -> Vec<NodeId> {
        let node = store.node(call);
        if !matches!(node.kind, NodeKind::Call(_)) {
            warn!("Node of kind {} is not a call", node.kind_name());
            return Vec::new();
        }
        let local = Name::new(node.name.local_name(self.language.namespace_delimiter));
        self.resolve(store, scope.unwrap_or(self.current), true, |candidate| {
            matches!(candidate.declaration(), Some(Declaration::Template(_)))
                && candidate.name == local
        })
    }

    /// The record declaration with the given name visible from `scope`.
    pub fn record_for_name(
        &self,
        store: &impl NodeStore,
        scope: ScopeId,
        name: &Name,
    ) -> Option<NodeId> {
        self.resolve(store, scope, true, |candidate| {
            matches!(candidate.declaration(), Some(Declaration::Record(_)))
                && candidate.name == *name
        })
        .into_iter()
        .next()
    }

    fn signature_matches(
        &self,
        store: &impl NodeStore,
        parameters: &[NodeId],
        signature: &[Type],
    ) -> bool {
        if parameters.len() != signature.len() {
            return false;
        }
        parameters.iter().zip(signature.iter()).all(|(&param, ty)| {
            match store.node(param).declaration() {
                Some(Declaration::Parameter { ty: param_ty, .. }) => param_ty.matches(ty),
                _ => false,
            }
        })
    }

    /// Combines the state of several scope managers into this one. Run
    /// single-threaded after all per-unit builds have joined; the source
    /// managers' indices are cleared and must not be reused.
    ///
    /// Name scopes are unified by FQN: an existing scope absorbs the other's
    /// declarations, typedefs, and labels, adopts its anchor as the latest
    /// seen, and every node that pointed at the duplicate is redirected.
    /// After the merge, no two distinct name scopes share an FQN.
    pub fn merge_from(&mut self, others: Vec<ScopeManager>) {
        for mut other in others {
            self.merge_one(&mut other);
        }
    }

    fn merge_one(&mut self, other: &mut ScopeManager) {
        let other_global = ScopeId::new(0);
        let self_global = self.global_scope().unwrap_or(ScopeId::new(0));

        // deterministic preorder walk of the other tree; never hash-map
        // iteration order
        let order = other.preorder(other_global);
        let mut slots: Vec<Option<Scope>> = std::mem::take(&mut other.scopes)
            .into_iter()
            .map(Some)
            .collect();
        let mut remap: FxHashMap<ScopeId, ScopeId> = FxHashMap::default();
        remap.insert(other_global, self_global);

        // the other's global scope dissolves into ours
        if let Some(mut global) = slots[other_global.index()].take() {
            let sources = std::mem::take(
                global
                    .kind
                    .structure_declarations_mut()
                    .unwrap_or(&mut Vec::new()),
            );
            let target = &mut self.scopes[self_global.index()];
            target.values.declarations.append(&mut global.values.declarations);
            target.values.typedefs.extend(global.values.typedefs.drain());
            target.labels.extend(global.labels.drain());
            if let Some(structures) = target.kind.structure_declarations_mut() {
                structures.extend(sources);
            }
        }

        for old_id in order.into_iter().skip(1) {
            let Some(mut scope) = slots[old_id.index()].take() else {
                continue;
            };
            let parent = scope
                .parent
                .and_then(|p| remap.get(&p).copied())
                .unwrap_or(self_global);

            if matches!(scope.kind, ScopeKind::Name { .. }) {
                if let Some(fqn) = scope.scoped_name.clone() {
                    if let Some(&existing) = self.fqn_map.get(&fqn) {
                        // a name scope with an identical FQN already exists;
                        // transfer the declarations instead of duplicating it
                        let sources = std::mem::take(
                            scope
                                .kind
                                .structure_declarations_mut()
                                .unwrap_or(&mut Vec::new()),
                        );
                        let target = &mut self.scopes[existing.index()];
                        target.values.declarations.append(&mut scope.values.declarations);
                        target.values.typedefs.extend(scope.values.typedefs.drain());
                        target.labels.extend(scope.labels.drain());
                        if let Some(structures) = target.kind.structure_declarations_mut() {
                            structures.extend(sources);
                        }
                        // the unified scope adopts the latest anchor seen
                        target.anchor = scope.anchor;
                        remap.insert(old_id, existing);
                        continue;
                    }
                    self.fqn_map.insert(fqn, ScopeId::new(self.scopes.len()));
                }
            }

            let new_id = ScopeId::new(self.scopes.len());
            let placeholder = scope.id;
            debug_assert_eq!(placeholder, old_id);
            scope.id = new_id;
            scope.parent = Some(parent);
            scope.children.clear(); // refilled as the children are imported
            self.scopes.push(scope);
            self.scopes[parent.index()].children.push(new_id);
            remap.insert(old_id, new_id);
        }

        // redirect every node that pointed into the other manager
        for (node, old_scope) in other.scope_map.drain() {
            let target = remap.get(&old_scope).copied().unwrap_or(self_global);
            self.scope_map.insert(node, target);
        }
        other.fqn_map.clear();
    }

    fn preorder(&self, root: ScopeId) -> Vec<ScopeId> {
        let mut order = Vec::with_capacity(self.scopes.len());
        let mut stack = vec![root];
        while let Some(id) = stack.pop() {
            order.push(id);
            for &child in self.scopes[id.index()].children.iter().rev() {
                stack.push(child);
            }
        }
        order
    }
}
