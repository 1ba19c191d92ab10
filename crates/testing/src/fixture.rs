use graph::{
    CallExpr, Declaration, FunctionDecl, FunctionKind, LanguageConfig, Name, NodeId, NodeKind,
    RecordDecl, RecordKind, TemplateArgument, Type, Unit,
};
use semantics::ScopeManager;

/// Builds one translation unit by hand, mimicking the call sequence a
/// frontend produces: declare, enter, add children, leave.
///
/// Scope-opening helpers return the opener node; pass it to [`leave`] to
/// close the scope.
///
/// [`leave`]: UnitFixture::leave
pub struct UnitFixture {
    pub unit: Unit,
    pub scopes: ScopeManager,
    pub translation_unit: NodeId,
}

impl UnitFixture {
    pub fn new(id: u32, path: &str) -> Self {
        Self::with_language(id, path, LanguageConfig::cxx())
    }

    pub fn with_language(id: u32, path: &str, language: LanguageConfig) -> Self {
        let mut unit = Unit::new(id, path);
        let mut scopes = ScopeManager::new(language);
        let translation_unit = unit.add(Name::new(path), NodeKind::TranslationUnit);
        scopes.reset_to_global(translation_unit);
        Self {
            unit,
            scopes,
            translation_unit,
        }
    }

    pub fn enter_function(&mut self, name: &str) -> NodeId {
        let function = self.unit.add(
            Name::new(name),
            NodeKind::Declaration(Declaration::Function(FunctionDecl {
                kind: FunctionKind::Function,
                parameters: Vec::new(),
                return_type: Type::Unknown,
                is_static: false,
                ty: Type::Unknown,
            })),
        );
        self.scopes.add_declaration(&self.unit, function);
        self.scopes.enter_scope(&self.unit, function);
        function
    }

    pub fn enter_namespace(&mut self, name: &str) -> NodeId {
        let namespace = self
            .unit
            .add(Name::new(name), NodeKind::Declaration(Declaration::Namespace));
        self.scopes.add_declaration(&self.unit, namespace);
        self.scopes.enter_scope(&self.unit, namespace);
        namespace
    }

    pub fn enter_record(&mut self, name: &str, kind: RecordKind) -> NodeId {
        let record = self.unit.add(
            Name::new(name),
            NodeKind::Declaration(Declaration::Record(RecordDecl {
                kind,
                templates: Vec::new(),
            })),
        );
        self.scopes.add_declaration(&self.unit, record);
        self.scopes.enter_scope(&self.unit, record);
        record
    }

    pub fn enter_block(&mut self) -> NodeId {
        let block = self.unit.add(Name::empty(), NodeKind::Block);
        self.scopes.enter_scope(&self.unit, block);
        block
    }

    pub fn enter_loop(&mut self) -> NodeId {
        let statement = self.unit.add(Name::empty(), NodeKind::WhileStatement);
        self.scopes.enter_scope(&self.unit, statement);
        statement
    }

    pub fn enter_switch(&mut self) -> NodeId {
        let statement = self.unit.add(Name::empty(), NodeKind::SwitchStatement);
        self.scopes.enter_scope(&self.unit, statement);
        statement
    }

    pub fn leave(&mut self, node: NodeId) {
        self.scopes.leave_scope(&self.unit, node);
    }

    pub fn declare_variable(&mut self, name: &str, ty: Type) -> NodeId {
        let variable = self
            .unit
            .add(Name::new(name), NodeKind::Declaration(Declaration::Variable { ty }));
        self.scopes.add_declaration(&self.unit, variable);
        variable
    }

    pub fn reference(&mut self, name: &str) -> NodeId {
        self.typed_reference(name, Type::Unknown)
    }

    pub fn typed_reference(&mut self, name: &str, ty: Type) -> NodeId {
        self.unit.add(Name::new(name), NodeKind::Reference { ty })
    }

    pub fn call(&mut self, name: &str, signature: Vec<Type>) -> NodeId {
        self.templated_call(name, signature, Vec::new())
    }

    pub fn templated_call(
        &mut self,
        name: &str,
        signature: Vec<Type>,
        template_arguments: Vec<TemplateArgument>,
    ) -> NodeId {
        self.unit.add(
            Name::new(name),
            NodeKind::Call(CallExpr {
                signature,
                arguments: Vec::new(),
                template_arguments,
                ty: Type::Unknown,
            }),
        )
    }

    pub fn break_statement(&mut self, label: Option<&str>) -> NodeId {
        let statement = self.unit.add(
            Name::empty(),
            NodeKind::BreakStatement {
                label: label.map(Name::new),
            },
        );
        self.scopes.add_break(&self.unit, statement);
        statement
    }

    pub fn continue_statement(&mut self, label: Option<&str>) -> NodeId {
        let statement = self.unit.add(
            Name::empty(),
            NodeKind::ContinueStatement {
                label: label.map(Name::new),
            },
        );
        self.scopes.add_continue(&self.unit, statement);
        statement
    }

    pub fn label_statement(&mut self, name: &str, target: NodeId) -> NodeId {
        let statement = self
            .unit
            .add(Name::new(name), NodeKind::LabelStatement { target });
        self.scopes.add_label(&self.unit, statement);
        statement
    }

    /// Tears the fixture apart for the merge phase.
    pub fn finish(self) -> (Unit, ScopeManager) {
        (self.unit, self.scopes)
    }
}
