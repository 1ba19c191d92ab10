//! Arena-allocated graph nodes.
//!
//! Every translation unit owns a [`Unit`] arena; a [`NodeId`] pairs the unit
//! id with the index inside that arena. Units receive distinct ids before the
//! parallel build phase, so node identities are globally unique without any
//! cross-unit coordination and survive the later merge unchanged.

use crate::location::Location;
use crate::name::Name;
use crate::types::Type;
use rustc_hash::FxHashMap;
use smallvec::SmallVec;

/// Globally unique node identity: owning unit plus arena index.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct NodeId {
    pub unit: u32,
    pub index: u32,
}

impl NodeId {
    pub fn new(unit: u32, index: u32) -> Self {
        Self { unit, index }
    }
}

/// A single node of the program graph.
#[derive(Debug, Clone)]
pub struct Node {
    pub id: NodeId,
    /// Local name, or the FQN for record/namespace/template declarations and
    /// qualified calls. Empty for unnamed nodes (blocks, statements).
    pub name: Name,
    pub location: Option<Location>,
    pub kind: NodeKind,
    /// Set exclusively by the inference engine for synthesized declarations.
    pub is_inferred: bool,
    /// Incoming dataflow edges (currently only threaded from call-site
    /// arguments to inferred template parameters).
    pub prev_dfg: SmallVec<[NodeId; 2]>,
}

impl Node {
    /// The declaration payload, if this node is a declaration.
    pub fn declaration(&self) -> Option<&Declaration> {
        match &self.kind {
            NodeKind::Declaration(decl) => Some(decl),
            _ => None,
        }
    }

    pub fn declaration_mut(&mut self) -> Option<&mut Declaration> {
        match &mut self.kind {
            NodeKind::Declaration(decl) => Some(decl),
            _ => None,
        }
    }

    /// The type carried by this node, if any: the declared type for
    /// declarations, the expression type for references and calls.
    pub fn ty(&self) -> Option<&Type> {
        match &self.kind {
            NodeKind::Declaration(decl) => decl.ty(),
            NodeKind::Reference { ty } => Some(ty),
            NodeKind::Call(call) => Some(&call.ty),
            _ => None,
        }
    }

    /// A short kind tag for log messages.
    pub fn kind_name(&self) -> &'static str {
        self.kind.kind_name()
    }
}

/// Tagged union over everything a frontend can produce.
///
/// The semantic layer picks scope variants with a match over this enum; it
/// never type-tests on frontend-specific structures.
#[derive(Debug, Clone)]
pub enum NodeKind {
    TranslationUnit,
    Block,
    IfStatement,
    WhileStatement,
    DoStatement,
    ForStatement,
    ForEachStatement,
    AssertStatement,
    SwitchStatement,
    TryStatement,
    CatchClause,
    BreakStatement { label: Option<Name> },
    ContinueStatement { label: Option<Name> },
    /// A labeled statement; `target` is the statement the label applies to.
    LabelStatement { target: NodeId },
    /// A use of a declared value (variable, field, function).
    Reference { ty: Type },
    Call(CallExpr),
    Declaration(Declaration),
}

impl NodeKind {
    pub fn kind_name(&self) -> &'static str {
        match self {
            NodeKind::TranslationUnit => "translation-unit",
            NodeKind::Block => "block",
            NodeKind::IfStatement => "if",
            NodeKind::WhileStatement => "while",
            NodeKind::DoStatement => "do",
            NodeKind::ForStatement => "for",
            NodeKind::ForEachStatement => "for-each",
            NodeKind::AssertStatement => "assert",
            NodeKind::SwitchStatement => "switch",
            NodeKind::TryStatement => "try",
            NodeKind::CatchClause => "catch",
            NodeKind::BreakStatement { .. } => "break",
            NodeKind::ContinueStatement { .. } => "continue",
            NodeKind::LabelStatement { .. } => "label",
            NodeKind::Reference { .. } => "reference",
            NodeKind::Call(_) => "call",
            NodeKind::Declaration(decl) => decl.kind_name(),
        }
    }
}

/// A call expression, possibly qualified and possibly templated.
#[derive(Debug, Clone)]
pub struct CallExpr {
    /// Argument types, in call order.
    pub signature: Vec<Type>,
    /// Argument expression nodes, in call order.
    pub arguments: Vec<NodeId>,
    /// Explicit template arguments, if any.
    pub template_arguments: Vec<TemplateArgument>,
    /// The expected result type of the call.
    pub ty: Type,
}

#[derive(Debug, Clone)]
pub enum TemplateArgument {
    Type(Type),
    Expression(NodeId),
}

/// Declaration payload, tagged as a value declaration (variable, parameter,
/// field, function) or a structure declaration (record, namespace, enum,
/// template). The scope manager dispatches on this tag.
#[derive(Debug, Clone)]
pub enum Declaration {
    Variable { ty: Type },
    Parameter { ty: Type, index: usize },
    Field { ty: Type },
    Function(FunctionDecl),
    Record(RecordDecl),
    Namespace,
    Enum,
    Template(TemplateDecl),
    TypeParameter { ty: Type },
    Typedef { alias: Name, ty: Type },
    /// Placeholder emitted by a frontend for code it could not parse.
    Problem { message: String },
}

impl Declaration {
    /// Variables, parameters, fields, functions, and type parameters are
    /// value declarations; they land in the nearest value-capable scope.
    pub fn is_value(&self) -> bool {
        matches!(
            self,
            Declaration::Variable { .. }
                | Declaration::Parameter { .. }
                | Declaration::Field { .. }
                | Declaration::Function(_)
                | Declaration::TypeParameter { .. }
        )
    }

    /// Records, namespaces, enums, and templates are structure declarations;
    /// they land in the nearest name-capable scope.
    pub fn is_structure(&self) -> bool {
        matches!(
            self,
            Declaration::Record(_)
                | Declaration::Namespace
                | Declaration::Enum
                | Declaration::Template(_)
        )
    }

    pub fn ty(&self) -> Option<&Type> {
        match self {
            Declaration::Variable { ty }
            | Declaration::Parameter { ty, .. }
            | Declaration::Field { ty }
            | Declaration::TypeParameter { ty }
            | Declaration::Typedef { ty, .. } => Some(ty),
            Declaration::Function(func) => Some(&func.ty),
            _ => None,
        }
    }

    pub fn ty_mut(&mut self) -> Option<&mut Type> {
        match self {
            Declaration::Variable { ty }
            | Declaration::Parameter { ty, .. }
            | Declaration::Field { ty }
            | Declaration::TypeParameter { ty }
            | Declaration::Typedef { ty, .. } => Some(ty),
            Declaration::Function(func) => Some(&mut func.ty),
            _ => None,
        }
    }

    pub fn kind_name(&self) -> &'static str {
        match self {
            Declaration::Variable { .. } => "variable",
            Declaration::Parameter { .. } => "parameter",
            Declaration::Field { .. } => "field",
            Declaration::Function(func) => match func.kind {
                FunctionKind::Function => "function",
                FunctionKind::Method => "method",
                FunctionKind::Constructor => "constructor",
            },
            Declaration::Record(_) => "record",
            Declaration::Namespace => "namespace",
            Declaration::Enum => "enum",
            Declaration::Template(_) => "template",
            Declaration::TypeParameter { .. } => "type-parameter",
            Declaration::Typedef { .. } => "typedef",
            Declaration::Problem { .. } => "problem",
        }
    }
}

#[derive(Debug, Clone)]
pub struct FunctionDecl {
    pub kind: FunctionKind,
    /// Parameter declaration nodes, in signature order.
    pub parameters: Vec<NodeId>,
    pub return_type: Type,
    pub is_static: bool,
    /// The computed `Type::Function` of this declaration.
    pub ty: Type,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FunctionKind {
    Function,
    Method,
    Constructor,
}

#[derive(Debug, Clone)]
pub struct RecordDecl {
    pub kind: RecordKind,
    /// Templates declared inside this record, consulted as a resolution
    /// fallback when a scope has no direct structure match.
    pub templates: Vec<NodeId>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub enum RecordKind {
    Struct,
    Class,
}

impl RecordKind {
    pub fn as_str(&self) -> &str {
        match self {
            RecordKind::Struct => "struct",
            RecordKind::Class => "class",
        }
    }
}

#[derive(Debug, Clone, Default)]
pub struct TemplateDecl {
    /// Type and non-type parameter declaration nodes, in declaration order.
    pub parameters: Vec<NodeId>,
    /// The function/method declarations realizing this template.
    pub realizations: Vec<NodeId>,
}

/// Read access to nodes, implemented by [`Unit`] and [`Graph`].
pub trait NodeStore {
    /// Looks up a node. Panics if the id does not belong to this store;
    /// ids are only ever minted by the store that owns them.
    fn node(&self, id: NodeId) -> &Node;
}

/// Write access to nodes, used by frontends and the inference engine.
pub trait NodeStoreMut: NodeStore {
    fn node_mut(&mut self, id: NodeId) -> &mut Node;

    /// Allocates a new node in the arena of `unit`.
    fn add_node(&mut self, unit: u32, name: Name, kind: NodeKind) -> NodeId;
}

/// Per-translation-unit node arena.
#[derive(Debug)]
pub struct Unit {
    id: u32,
    /// Source path of the translation unit, for diagnostics.
    pub path: String,
    nodes: Vec<Node>,
}

impl Unit {
    pub fn new(id: u32, path: impl Into<String>) -> Self {
        Self {
            id,
            path: path.into(),
            nodes: Vec::new(),
        }
    }

    pub fn id(&self) -> u32 {
        self.id
    }

    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    /// Allocates a node and returns its id.
    pub fn add(&mut self, name: Name, kind: NodeKind) -> NodeId {
        let id = NodeId::new(self.id, self.nodes.len() as u32);
        self.nodes.push(Node {
            id,
            name,
            location: None,
            kind,
            is_inferred: false,
            prev_dfg: SmallVec::new(),
        });
        id
    }

    /// Allocates a node with a source location.
    pub fn add_at(&mut self, name: Name, kind: NodeKind, location: Location) -> NodeId {
        let id = self.add(name, kind);
        self.nodes[id.index as usize].location = Some(location);
        id
    }

    pub fn iter(&self) -> impl Iterator<Item = &Node> {
        self.nodes.iter()
    }
}

impl NodeStore for Unit {
    fn node(&self, id: NodeId) -> &Node {
        assert_eq!(id.unit, self.id, "node id belongs to a different unit");
        &self.nodes[id.index as usize]
    }
}

impl NodeStoreMut for Unit {
    fn node_mut(&mut self, id: NodeId) -> &mut Node {
        assert_eq!(id.unit, self.id, "node id belongs to a different unit");
        &mut self.nodes[id.index as usize]
    }

    fn add_node(&mut self, unit: u32, name: Name, kind: NodeKind) -> NodeId {
        assert_eq!(unit, self.id, "node id belongs to a different unit");
        self.add(name, kind)
    }
}

/// The merged, multi-unit program graph.
#[derive(Debug, Default)]
pub struct Graph {
    units: Vec<Unit>,
    /// Unit id -> position in `units`.
    index: FxHashMap<u32, usize>,
}

impl Graph {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add_unit(&mut self, unit: Unit) {
        self.index.insert(unit.id(), self.units.len());
        self.units.push(unit);
    }

    pub fn unit(&self, id: u32) -> Option<&Unit> {
        self.index.get(&id).map(|&pos| &self.units[pos])
    }

    pub fn units(&self) -> impl Iterator<Item = &Unit> {
        self.units.iter()
    }

    pub fn unit_count(&self) -> usize {
        self.units.len()
    }

    pub fn total_nodes(&self) -> usize {
        self.units.iter().map(Unit::len).sum()
    }
}

impl NodeStore for Graph {
    fn node(&self, id: NodeId) -> &Node {
        let pos = self.index[&id.unit];
        self.units[pos].node(id)
    }
}

impl NodeStoreMut for Graph {
    fn node_mut(&mut self, id: NodeId) -> &mut Node {
        let pos = self.index[&id.unit];
        self.units[pos].node_mut(id)
    }

    fn add_node(&mut self, unit: u32, name: Name, kind: NodeKind) -> NodeId {
        let pos = self.index[&unit];
        self.units[pos].add(name, kind)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_unit_allocates_sequential_ids() {
        let mut unit = Unit::new(3, "a.cpp");
        let first = unit.add(Name::new("x"), NodeKind::Block);
        let second = unit.add(Name::new("y"), NodeKind::Block);
        assert_eq!(first, NodeId::new(3, 0));
        assert_eq!(second, NodeId::new(3, 1));
        assert_eq!(unit.node(second).name.as_str(), "y");
    }

    #[test]
    fn test_graph_routes_ids_to_owning_unit() {
        let mut a = Unit::new(0, "a.cpp");
        let mut b = Unit::new(1, "b.cpp");
        let in_a = a.add(Name::new("a"), NodeKind::TranslationUnit);
        let in_b = b.add(Name::new("b"), NodeKind::TranslationUnit);

        let mut graph = Graph::new();
        graph.add_unit(a);
        graph.add_unit(b);
        assert_eq!(graph.node(in_a).name.as_str(), "a");
        assert_eq!(graph.node(in_b).name.as_str(), "b");
        assert_eq!(graph.total_nodes(), 2);
    }

    #[test]
    fn test_declaration_tags() {
        let variable = Declaration::Variable { ty: Type::Unknown };
        let record = Declaration::Record(RecordDecl {
            kind: RecordKind::Class,
            templates: Vec::new(),
        });
        assert!(variable.is_value());
        assert!(!variable.is_structure());
        assert!(record.is_structure());
        assert!(!record.is_value());
    }
}
