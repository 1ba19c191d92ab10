//! Declaration inference.
//!
//! When resolution comes up empty, the passes synthesize a minimal
//! declaration for the missing symbol so that later analyses can treat it
//! like parsed code. Every inference is anchored at a `start` node (a
//! record, namespace, or translation unit) and registers its result through
//! the scope manager, exactly as a frontend would have.

pub mod observer;

pub use observer::TypeObserver;

use crate::execution::AnalysisConfig;
use crate::scopes::{ScopeId, ScopeManager};
use graph::{
    Declaration, FunctionDecl, FunctionKind, Name, NodeId, NodeKind, NodeStoreMut, RecordDecl,
    RecordKind, TemplateArgument, TemplateDecl, Type,
};
use tracing::{debug, error};

/// A single inference attempt, borrowing the node store and scope manager
/// for its duration. Every node it creates carries the inferred flag.
///
/// All entry points share the same failure semantics: when inference is
/// disabled in the config or the start node has the wrong kind, they log and
/// return `None` instead of synthesizing a fallback.
pub struct Inference<'a, S: NodeStoreMut> {
    start: NodeId,
    unit: u32,
    store: &'a mut S,
    scopes: &'a mut ScopeManager,
    config: &'a AnalysisConfig,
}

impl<'a, S: NodeStoreMut> Inference<'a, S> {
    pub fn new(
        start: NodeId,
        store: &'a mut S,
        scopes: &'a mut ScopeManager,
        config: &'a AnalysisConfig,
    ) -> Self {
        let unit = start.unit;
        Self {
            start,
            unit,
            store,
            scopes,
            config,
        }
    }

    fn start_is_record(&self) -> bool {
        matches!(
            self.store.node(self.start).declaration(),
            Some(Declaration::Record(_))
        )
    }

    fn start_is_namespace(&self) -> bool {
        matches!(
            self.store.node(self.start).declaration(),
            Some(Declaration::Namespace)
        )
    }

    fn start_is_translation_unit(&self) -> bool {
        matches!(self.store.node(self.start).kind, NodeKind::TranslationUnit)
    }

    fn scope_of_start(&self) -> Option<ScopeId> {
        let scope = self.scopes.lookup_scope(self.start);
        if scope.is_none() {
            error!(
                "Cannot infer: start node of kind {} has no associated scope",
                self.store.node(self.start).kind_name()
            );
        }
        scope
    }

    fn new_node(&mut self, name: Name, kind: NodeKind) -> NodeId {
        let id = self.store.add_node(self.unit, name, kind);
        self.store.node_mut(id).is_inferred = true;
        id
    }

    /// Synthesizes a function (or, when the start is a record, a method) for
    /// an unresolvable call. Parameters are created from the signature with
    /// names derived from their types, and the declaration's function type is
    /// computed from the synthesized signature.
    pub fn infer_function(
        &mut self,
        name: &Name,
        signature: &[Type],
        return_type: Type,
        is_static: bool,
    ) -> Option<NodeId> {
        if !self.config.infer_declarations {
            return None;
        }
        let is_record = self.start_is_record();
        if !is_record && !self.start_is_namespace() && !self.start_is_translation_unit() {
            error!(
                "Cannot infer a function starting at a node of kind {}",
                self.store.node(self.start).kind_name()
            );
            return None;
        }
        let start_scope = self.scope_of_start()?;
        let saved = self.scopes.current_scope();
        self.scopes.set_current(start_scope);

        let kind = if is_record {
            FunctionKind::Method
        } else {
            FunctionKind::Function
        };
        let function = self.new_node(
            name.clone(),
            NodeKind::Declaration(Declaration::Function(FunctionDecl {
                kind,
                parameters: Vec::new(),
                return_type: return_type.clone(),
                is_static,
                ty: Type::Unknown,
            })),
        );
        let parameters = self.synthesize_parameters(function, signature);
        let ty = Type::Function {
            parameters: signature.to_vec(),
            return_type: Box::new(return_type),
        };
        if let Some(Declaration::Function(decl)) = self.store.node_mut(function).declaration_mut()
        {
            decl.parameters = parameters;
            decl.ty = ty;
        }

        debug!(
            "Inferred a new {} declaration {} with {} parameters",
            if is_record { "method" } else { "function" },
            name,
            signature.len()
        );
        self.scopes.add_declaration(&*self.store, function);

        // a plain aggregate we invented ourselves turns into a class once
        // methods are attached to it, if the language tells them apart
        if is_record && self.scopes.language().has_classes {
            let start = self.store.node_mut(self.start);
            let was_inferred = start.is_inferred;
            if let Some(Declaration::Record(record)) = start.declaration_mut() {
                if was_inferred && matches!(record.kind, RecordKind::Struct) {
                    record.kind = RecordKind::Class;
                }
            }
        }

        self.scopes.set_current(saved);
        Some(function)
    }

    /// Synthesizes a constructor for the record the inference starts at.
    pub fn infer_constructor(&mut self, signature: &[Type]) -> Option<NodeId> {
        if !self.config.infer_declarations {
            return None;
        }
        if !self.start_is_record() {
            error!(
                "Cannot infer a constructor starting at a node of kind {}",
                self.store.node(self.start).kind_name()
            );
            return None;
        }
        let start_scope = self.scope_of_start()?;
        let saved = self.scopes.current_scope();
        self.scopes.set_current(start_scope);

        let delimiter = self.scopes.language().namespace_delimiter;
        let local = Name::new(self.store.node(self.start).name.local_name(delimiter));
        let constructor = self.new_node(
            local,
            NodeKind::Declaration(Declaration::Function(FunctionDecl {
                kind: FunctionKind::Constructor,
                parameters: Vec::new(),
                return_type: Type::Unknown,
                is_static: false,
                ty: Type::Unknown,
            })),
        );
        let parameters = self.synthesize_parameters(constructor, signature);
        let ty = Type::Function {
            parameters: signature.to_vec(),
            return_type: Box::new(Type::Unknown),
        };
        if let Some(Declaration::Function(decl)) =
            self.store.node_mut(constructor).declaration_mut()
        {
            decl.parameters = parameters;
            decl.ty = ty;
        }
        self.scopes.add_declaration(&*self.store, constructor);

        self.scopes.set_current(saved);
        Some(constructor)
    }

    /// Synthesizes a record declaration for an object type no declaration is
    /// known for, and back-links the type to it. Rejects non-object types.
    pub fn infer_record(&mut self, ty: &mut Type, kind: RecordKind) -> Option<NodeId> {
        if !self.config.infer_records {
            return None;
        }
        if !self.start_is_record() && !self.start_is_namespace() && !self.start_is_translation_unit()
        {
            error!(
                "Cannot infer a record starting at a node of kind {}",
                self.store.node(self.start).kind_name()
            );
            return None;
        }
        if !ty.is_object() {
            error!(
                "Trying to infer a record declaration of a non-object type {}",
                ty.type_name()
            );
            return None;
        }
        let start_scope = self.scope_of_start()?;
        let saved = self.scopes.current_scope();
        self.scopes.set_current(start_scope);

        let name = Name::new(ty.type_name());
        let record = self.new_node(
            name.clone(),
            NodeKind::Declaration(Declaration::Record(RecordDecl {
                kind,
                templates: Vec::new(),
            })),
        );
        debug!("Inferred a new record declaration {}", name);
        ty.set_record(record);

        // make the record known to the scope indices even though no body
        // will ever be visited
        self.scopes.enter_scope(&*self.store, record);
        self.scopes.leave_scope(&*self.store, record);
        self.scopes.add_declaration(&*self.store, record);

        self.scopes.set_current(saved);
        Some(record)
    }

    /// Synthesizes a namespace declaration, or returns the opener of an
    /// already existing namespace scope with the same FQN.
    pub fn infer_namespace(&mut self, name: &Name) -> Option<NodeId> {
        if !self.config.infer_declarations {
            return None;
        }
        if !self.start_is_namespace() && !self.start_is_translation_unit() {
            error!(
                "Cannot infer a namespace starting at a node of kind {}",
                self.store.node(self.start).kind_name()
            );
            return None;
        }
        let start_scope = self.scope_of_start()?;
        let saved = self.scopes.current_scope();
        self.scopes.set_current(start_scope);

        let delimiter = self.scopes.language().namespace_delimiter;
        let fqn = if name.is_qualified(delimiter) {
            name.clone()
        } else {
            Name::join(self.scopes.current_name_prefix().as_str(), delimiter, name.as_str())
        };
        if let Some(existing) = self.scopes.lookup_scope_by_name(&fqn) {
            let anchor = self.scopes.scope(existing).anchor;
            self.scopes.set_current(saved);
            return anchor;
        }

        debug!("Inferring a new namespace declaration {}", fqn);
        let namespace = self.new_node(name.clone(), NodeKind::Declaration(Declaration::Namespace));
        self.scopes.add_declaration(&*self.store, namespace);

        // make the namespace known to the scope indices
        self.scopes.enter_scope(&*self.store, namespace);
        self.scopes.leave_scope(&*self.store, namespace);

        self.scopes.set_current(saved);
        Some(namespace)
    }

    /// Synthesizes a field for an unresolvable member reference. The owning
    /// type must resolve to a record scope, or be unknown in a language with
    /// an implicit receiver, in which case the current record is assumed.
    /// The field starts with an unknown type; the returned observer fixes it
    /// on the first typed use.
    pub fn infer_field(
        &mut self,
        reference: NodeId,
        owning_type: &Type,
    ) -> Option<(NodeId, TypeObserver)> {
        if !self.config.infer_declarations {
            return None;
        }
        let target_scope = match owning_type {
            Type::Object { name, record } => (*record)
                .and_then(|r| self.scopes.lookup_scope(r))
                .or_else(|| self.scopes.lookup_scope_by_name(name)),
            Type::Unknown if self.scopes.language().has_implicit_receiver => self
                .scopes
                .current_record(&*self.store)
                .and_then(|r| self.scopes.lookup_scope(r)),
            _ => None,
        };
        let Some(target_scope) = target_scope else {
            error!(
                "Cannot infer a field: owning type {} does not resolve to a record scope",
                owning_type.type_name()
            );
            return None;
        };
        let saved = self.scopes.current_scope();
        self.scopes.set_current(target_scope);

        let delimiter = self.scopes.language().namespace_delimiter;
        let local = Name::new(self.store.node(reference).name.local_name(delimiter));
        let field = self.new_node(
            local,
            NodeKind::Declaration(Declaration::Field { ty: Type::Unknown }),
        );
        self.scopes.add_declaration(&*self.store, field);

        self.scopes.set_current(saved);
        Some((field, TypeObserver::new(field)))
    }

    /// Synthesizes a global variable for an unresolvable reference. Like
    /// fields, the variable's type is observed from its first typed use
    /// unless the reference already carries one.
    pub fn infer_variable(&mut self, reference: NodeId) -> Option<(NodeId, TypeObserver)> {
        if !self.config.infer_declarations {
            return None;
        }
        let start_scope = self.scope_of_start()?;
        let saved = self.scopes.current_scope();
        self.scopes.set_current(start_scope);

        let node = self.store.node(reference);
        let name = node.name.clone();
        let ty = node.ty().cloned().unwrap_or(Type::Unknown);
        debug!(
            "Inferred a new variable declaration {} with type {}",
            name,
            ty.type_name()
        );
        let variable = self.new_node(name, NodeKind::Declaration(Declaration::Variable { ty }));
        self.scopes.add_declaration(&*self.store, variable);

        self.scopes.set_current(saved);
        Some((variable, TypeObserver::new(variable)))
    }

    /// Synthesizes a function template for a templated call that could not
    /// be resolved: the template itself, a realization carrying the call's
    /// name and signature, and one parameter per template argument. Type
    /// arguments become type parameters `T0, T1, ...`; expression arguments
    /// become parameters `N0, N1, ...` with a dataflow edge from the
    /// call-site argument.
    pub fn infer_function_template(&mut self, call: NodeId) -> Option<NodeId> {
        if !self.config.infer_declarations {
            return None;
        }
        let is_record = self.start_is_record();
        if !is_record && !self.start_is_translation_unit() {
            error!(
                "Cannot infer a function template starting at a node of kind {}",
                self.store.node(self.start).kind_name()
            );
            return None;
        }
        let node = self.store.node(call);
        let NodeKind::Call(expr) = &node.kind else {
            error!("Node of kind {} is not a call", node.kind_name());
            return None;
        };

        let delimiter = self.scopes.language().namespace_delimiter;
        let local = Name::new(node.name.local_name(delimiter));
        let signature = expr.signature.clone();
        let return_type = expr.ty.clone();
        let template_arguments = expr.template_arguments.clone();

        let template = self.new_node(
            local.clone(),
            NodeKind::Declaration(Declaration::Template(TemplateDecl::default())),
        );
        let realization = self.infer_function(&local, &signature, return_type, false);

        let mut parameters = Vec::with_capacity(template_arguments.len());
        let mut type_counter = 0usize;
        let mut non_type_counter = 0usize;
        for argument in template_arguments {
            match argument {
                TemplateArgument::Type(_) => {
                    let name = Name::new(format!("T{type_counter}"));
                    type_counter += 1;
                    let parameter = self.new_node(
                        name.clone(),
                        NodeKind::Declaration(Declaration::TypeParameter {
                            ty: Type::Parameterized(name),
                        }),
                    );
                    parameters.push(parameter);
                }
                TemplateArgument::Expression(expression) => {
                    let name = Name::new(format!("N{non_type_counter}"));
                    non_type_counter += 1;
                    let ty = self
                        .store
                        .node(expression)
                        .ty()
                        .cloned()
                        .unwrap_or(Type::Unknown);
                    let index = parameters.len();
                    let parameter = self.new_node(
                        name,
                        NodeKind::Declaration(Declaration::Parameter { ty, index }),
                    );
                    self.store.node_mut(parameter).prev_dfg.push(expression);
                    parameters.push(parameter);
                }
            }
        }
        if let Some(Declaration::Template(decl)) = self.store.node_mut(template).declaration_mut()
        {
            decl.parameters = parameters;
            if let Some(realization) = realization {
                decl.realizations.push(realization);
            }
        }

        // record-level templates are only reachable through the record's
        // template list; unit-level ones are registered like any structure
        if is_record {
            if let Some(Declaration::Record(record)) =
                self.store.node_mut(self.start).declaration_mut()
            {
                record.templates.push(template);
            }
        } else if let Some(start_scope) = self.scopes.lookup_scope(self.start) {
            let saved = self.scopes.current_scope();
            self.scopes.set_current(start_scope);
            self.scopes.add_declaration(&*self.store, template);
            self.scopes.set_current(saved);
        }
        Some(template)
    }

    fn synthesize_parameters(&mut self, function: NodeId, signature: &[Type]) -> Vec<NodeId> {
        // only enter the function scope if there are parameters to create
        if signature.is_empty() {
            return Vec::new();
        }
        self.scopes.enter_scope(&*self.store, function);
        let mut parameters = Vec::with_capacity(signature.len());
        for (index, ty) in signature.iter().enumerate() {
            let name = parameter_name(index, ty);
            let parameter = self.new_node(
                name,
                NodeKind::Declaration(Declaration::Parameter {
                    ty: ty.clone(),
                    index,
                }),
            );
            self.scopes.add_declaration(&*self.store, parameter);
            parameters.push(parameter);
        }
        self.scopes.leave_scope(&*self.store, function);
        parameters
    }
}

/// Derives a parameter name from its type by spelling out the wrapper chain
/// outermost first and appending the positional index, so a pointer to a
/// pointer to an int at position 0 becomes `ptrPtrInt0`.
fn parameter_name(index: usize, ty: &Type) -> Name {
    let mut parts: Vec<&str> = Vec::new();
    let mut cursor = ty;
    loop {
        match cursor {
            Type::Pointer(inner) => {
                parts.push("ptr");
                cursor = inner;
            }
            Type::Reference(inner) => {
                parts.push("ref");
                cursor = inner;
            }
            Type::FunctionPointer { .. } => {
                parts.push("fptr");
                break;
            }
            other => {
                parts.push(other.type_name());
                break;
            }
        }
    }

    let mut name = String::new();
    for part in parts {
        if part.is_empty() {
            continue;
        }
        if name.is_empty() {
            name.push_str(&part.to_lowercase());
        } else {
            let mut chars = part.chars();
            if let Some(first) = chars.next() {
                name.extend(first.to_uppercase());
                name.push_str(chars.as_str());
            }
        }
    }
    name.push_str(&index.to_string());
    Name::new(name)
}

#[cfg(test)]
mod tests {
    use super::*;
    use graph::{CallExpr, LanguageConfig, NodeStore, Unit};

    fn setup(path: &str) -> (Unit, ScopeManager, NodeId) {
        let mut unit = Unit::new(0, path);
        let mut scopes = ScopeManager::new(LanguageConfig::cxx());
        let tu = unit.add(Name::new(path), NodeKind::TranslationUnit);
        scopes.reset_to_global(tu);
        (unit, scopes, tu)
    }

    fn record(unit: &mut Unit, scopes: &mut ScopeManager, name: &str, kind: RecordKind) -> NodeId {
        let record = unit.add(
            Name::new(name),
            NodeKind::Declaration(Declaration::Record(RecordDecl {
                kind,
                templates: Vec::new(),
            })),
        );
        scopes.add_declaration(&*unit, record);
        scopes.enter_scope(&*unit, record);
        scopes.leave_scope(&*unit, record);
        record
    }

    #[test]
    fn test_infer_function_at_translation_unit() {
        let (mut unit, mut scopes, tu) = setup("a.cpp");
        let config = AnalysisConfig::default();

        let foo = Inference::new(tu, &mut unit, &mut scopes, &config)
            .infer_function(
                &Name::new("foo"),
                &[Type::builtin("int")],
                Type::Unknown,
                false,
            )
            .expect("inference must produce a function");

        let node = unit.node(foo);
        assert!(node.is_inferred);
        let Some(Declaration::Function(decl)) = node.declaration() else {
            panic!("expected a function declaration");
        };
        assert!(matches!(decl.kind, FunctionKind::Function));
        assert_eq!(decl.parameters.len(), 1);
        assert_eq!(unit.node(decl.parameters[0]).name, Name::new("int0"));

        // the synthesized function resolves like a parsed one
        let call = unit.add(
            Name::new("foo"),
            NodeKind::Call(CallExpr {
                signature: vec![Type::builtin("int")],
                arguments: Vec::new(),
                template_arguments: Vec::new(),
                ty: Type::Unknown,
            }),
        );
        assert_eq!(scopes.resolve_function(&unit, call, None), vec![foo]);
    }

    #[test]
    fn test_parameter_names_decompose_type_wrappers() {
        let ptr_ptr_int = Type::pointer(Type::pointer(Type::builtin("int")));
        assert_eq!(parameter_name(0, &ptr_ptr_int), Name::new("ptrPtrInt0"));

        let ref_int = Type::reference(Type::builtin("int"));
        assert_eq!(parameter_name(1, &ref_int), Name::new("refInt1"));

        let fptr = Type::FunctionPointer {
            parameters: vec![Type::builtin("int")],
            return_type: Box::new(Type::builtin("void")),
        };
        assert_eq!(parameter_name(0, &fptr), Name::new("fptr0"));

        assert_eq!(parameter_name(2, &Type::builtin("int")), Name::new("int2"));
    }

    #[test]
    fn test_infer_function_is_deterministic() {
        let (mut unit, mut scopes, tu) = setup("a.cpp");
        let config = AnalysisConfig::default();
        let signature = [Type::builtin("int"), Type::builtin("int")];

        let first = Inference::new(tu, &mut unit, &mut scopes, &config)
            .infer_function(&Name::new("f"), &signature, Type::builtin("int"), false)
            .unwrap();
        let second = Inference::new(tu, &mut unit, &mut scopes, &config)
            .infer_function(&Name::new("f"), &signature, Type::builtin("int"), false)
            .unwrap();

        let names = |id: NodeId| -> Vec<Name> {
            let Some(Declaration::Function(decl)) = unit.node(id).declaration() else {
                panic!("expected a function declaration");
            };
            decl.parameters.iter().map(|&p| unit.node(p).name.clone()).collect()
        };
        assert_eq!(names(first), vec![Name::new("int0"), Name::new("int1")]);
        assert_eq!(names(first), names(second));
        assert_eq!(unit.node(first).ty(), unit.node(second).ty());
    }

    #[test]
    fn test_infer_method_upgrades_inferred_struct() {
        let (mut unit, mut scopes, _tu) = setup("a.cpp");
        let config = AnalysisConfig::default();

        let user = record(&mut unit, &mut scopes, "User", RecordKind::Struct);
        unit.node_mut(user).is_inferred = true;

        let method = Inference::new(user, &mut unit, &mut scopes, &config)
            .infer_function(&Name::new("save"), &[], Type::Unknown, false)
            .unwrap();

        let Some(Declaration::Function(decl)) = unit.node(method).declaration() else {
            panic!("expected a function declaration");
        };
        assert!(matches!(decl.kind, FunctionKind::Method));
        let Some(Declaration::Record(decl)) = unit.node(user).declaration() else {
            panic!("expected a record declaration");
        };
        assert!(matches!(decl.kind, RecordKind::Class));
    }

    #[test]
    fn test_parsed_struct_is_not_upgraded() {
        let (mut unit, mut scopes, _tu) = setup("a.cpp");
        let config = AnalysisConfig::default();

        let user = record(&mut unit, &mut scopes, "User", RecordKind::Struct);
        Inference::new(user, &mut unit, &mut scopes, &config)
            .infer_function(&Name::new("save"), &[], Type::Unknown, false)
            .unwrap();

        let Some(Declaration::Record(decl)) = unit.node(user).declaration() else {
            panic!("expected a record declaration");
        };
        assert!(matches!(decl.kind, RecordKind::Struct));
    }

    #[test]
    fn test_infer_constructor_uses_local_record_name() {
        let (mut unit, mut scopes, _tu) = setup("a.cpp");
        let config = AnalysisConfig::default();

        let user = record(&mut unit, &mut scopes, "N::User", RecordKind::Class);
        let constructor = Inference::new(user, &mut unit, &mut scopes, &config)
            .infer_constructor(&[Type::builtin("int")])
            .unwrap();

        let node = unit.node(constructor);
        assert_eq!(node.name, Name::new("User"));
        let Some(Declaration::Function(decl)) = node.declaration() else {
            panic!("expected a function declaration");
        };
        assert!(matches!(decl.kind, FunctionKind::Constructor));
        assert_eq!(decl.parameters.len(), 1);
    }

    #[test]
    fn test_infer_record_backlinks_object_type() {
        let (mut unit, mut scopes, tu) = setup("a.cpp");
        let config = AnalysisConfig::default();

        let mut ty = Type::object("User");
        let user = Inference::new(tu, &mut unit, &mut scopes, &config)
            .infer_record(&mut ty, RecordKind::Class)
            .unwrap();

        assert!(unit.node(user).is_inferred);
        assert_eq!(ty.record(), Some(user));
        // the record is registered with the scope indices
        assert!(scopes.lookup_scope(user).is_some());
        assert!(scopes.lookup_scope_by_name(&Name::new("User")).is_some());
    }

    #[test]
    fn test_infer_record_rejects_non_object_type() {
        let (mut unit, mut scopes, tu) = setup("a.cpp");
        let config = AnalysisConfig::default();

        let mut ty = Type::builtin("int");
        let result =
            Inference::new(tu, &mut unit, &mut scopes, &config).infer_record(&mut ty, RecordKind::Class);
        assert!(result.is_none());
    }

    #[test]
    fn test_infer_namespace_reuses_existing_scope() {
        let (mut unit, mut scopes, tu) = setup("a.cpp");
        let config = AnalysisConfig::default();

        let ns = unit.add(Name::new("N"), NodeKind::Declaration(Declaration::Namespace));
        scopes.add_declaration(&unit, ns);
        scopes.enter_scope(&unit, ns);
        scopes.leave_scope(&unit, ns);

        let inferred = Inference::new(tu, &mut unit, &mut scopes, &config)
            .infer_namespace(&Name::new("N"))
            .unwrap();
        assert_eq!(inferred, ns);

        let fresh = Inference::new(tu, &mut unit, &mut scopes, &config)
            .infer_namespace(&Name::new("M"))
            .unwrap();
        assert_ne!(fresh, ns);
        assert!(unit.node(fresh).is_inferred);
        assert!(scopes.lookup_scope_by_name(&Name::new("M")).is_some());
    }

    #[test]
    fn test_infer_namespace_rejects_record_start() {
        let (mut unit, mut scopes, _tu) = setup("a.cpp");
        let config = AnalysisConfig::default();

        let user = record(&mut unit, &mut scopes, "User", RecordKind::Class);
        let result =
            Inference::new(user, &mut unit, &mut scopes, &config).infer_namespace(&Name::new("N"));
        assert!(result.is_none());
        assert!(scopes.lookup_scope_by_name(&Name::new("N")).is_none());
    }

    #[test]
    fn test_infer_variable_registers_at_start_scope() {
        let (mut unit, mut scopes, tu) = setup("a.cpp");
        let config = AnalysisConfig::default();

        let use_site = unit.add(Name::new("g"), NodeKind::Reference { ty: Type::Unknown });
        let (variable, mut observer) = Inference::new(tu, &mut unit, &mut scopes, &config)
            .infer_variable(use_site)
            .unwrap();

        assert!(unit.node(variable).is_inferred);
        assert_eq!(unit.node(variable).name, Name::new("g"));
        let global = scopes.global_scope().unwrap();
        assert!(scopes.scope(global).values.declarations.contains(&variable));
        // the reference now resolves to the synthesized variable
        assert_eq!(scopes.resolve_reference(&unit, use_site, None), Some(variable));

        assert_eq!(unit.node(variable).ty(), Some(&Type::Unknown));
        observer.notify(&mut unit, &Type::builtin("int"));
        assert_eq!(unit.node(variable).ty(), Some(&Type::builtin("int")));
    }

    #[test]
    fn test_infer_field_fixes_type_on_first_use() {
        let (mut unit, mut scopes, _tu) = setup("a.cpp");
        let config = AnalysisConfig::default();

        let user = record(&mut unit, &mut scopes, "User", RecordKind::Class);
        let mut ty = Type::object("User");
        ty.set_record(user);

        let member = unit.add(Name::new("age"), NodeKind::Reference { ty: Type::Unknown });
        let (field, mut observer) = Inference::new(user, &mut unit, &mut scopes, &config)
            .infer_field(member, &ty)
            .unwrap();

        let record_scope = scopes.lookup_scope(user).unwrap();
        assert!(scopes.scope(record_scope).values.declarations.contains(&field));
        assert_eq!(unit.node(field).ty(), Some(&Type::Unknown));

        observer.notify(&mut unit, &Type::builtin("int"));
        assert_eq!(unit.node(field).ty(), Some(&Type::builtin("int")));
    }

    #[test]
    fn test_infer_function_template_synthesizes_parameters() {
        let (mut unit, mut scopes, tu) = setup("a.cpp");
        let config = AnalysisConfig::default();

        let argument = unit.add(
            Name::new("n"),
            NodeKind::Reference {
                ty: Type::builtin("int"),
            },
        );
        let call = unit.add(
            Name::new("max"),
            NodeKind::Call(CallExpr {
                signature: vec![Type::builtin("int")],
                arguments: vec![argument],
                template_arguments: vec![
                    TemplateArgument::Type(Type::builtin("int")),
                    TemplateArgument::Expression(argument),
                ],
                ty: Type::Unknown,
            }),
        );

        let template = Inference::new(tu, &mut unit, &mut scopes, &config)
            .infer_function_template(call)
            .unwrap();

        let Some(Declaration::Template(decl)) = unit.node(template).declaration() else {
            panic!("expected a template declaration");
        };
        assert_eq!(decl.realizations.len(), 1);
        assert_eq!(unit.node(decl.realizations[0]).name, Name::new("max"));
        assert_eq!(decl.parameters.len(), 2);
        assert_eq!(unit.node(decl.parameters[0]).name, Name::new("T0"));
        assert_eq!(unit.node(decl.parameters[1]).name, Name::new("N0"));
        // dataflow from the call-site argument into the non-type parameter
        assert!(unit.node(decl.parameters[1]).prev_dfg.contains(&argument));

        // a templated call finds the synthesized template
        assert_eq!(
            scopes.resolve_function_template(&unit, call, None),
            vec![template]
        );
    }

    #[test]
    fn test_disabled_inference_returns_none() {
        let (mut unit, mut scopes, tu) = setup("a.cpp");
        let config = AnalysisConfig {
            worker_threads: 1,
            infer_declarations: false,
            infer_records: false,
        };

        let mut inference = Inference::new(tu, &mut unit, &mut scopes, &config);
        assert!(inference
            .infer_function(&Name::new("foo"), &[], Type::Unknown, false)
            .is_none());
        let mut ty = Type::object("User");
        assert!(inference.infer_record(&mut ty, RecordKind::Class).is_none());
        assert!(inference.infer_namespace(&Name::new("N")).is_none());
    }

    #[test]
    fn test_wrong_start_kind_is_rejected() {
        let (mut unit, mut scopes, _tu) = setup("a.cpp");
        let config = AnalysisConfig::default();

        let stray = unit.add(Name::new("x"), NodeKind::Reference { ty: Type::Unknown });
        let result = Inference::new(stray, &mut unit, &mut scopes, &config).infer_function(
            &Name::new("foo"),
            &[],
            Type::Unknown,
            false,
        );
        assert!(result.is_none());
    }
}
