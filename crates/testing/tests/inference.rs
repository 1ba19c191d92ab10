use graph::{Declaration, Name, NodeStore, RecordKind, Type};
use semantics::{AnalysisConfig, Inference};
use testing::UnitFixture;

#[test]
fn test_unresolved_call_infers_function_at_translation_unit() {
    let mut fixture = UnitFixture::new(0, "a.cpp");
    let config = AnalysisConfig::default();

    let call = fixture.call("foo", vec![Type::builtin("int")]);
    assert!(fixture
        .scopes
        .resolve_function(&fixture.unit, call, None)
        .is_empty());

    let start = fixture.translation_unit;
    let foo = Inference::new(start, &mut fixture.unit, &mut fixture.scopes, &config)
        .infer_function(&Name::new("foo"), &[Type::builtin("int")], Type::Unknown, false)
        .expect("inference must produce a declaration");

    let node = fixture.unit.node(foo);
    assert!(node.is_inferred);
    assert_eq!(node.name, Name::new("foo"));
    let Some(Declaration::Function(decl)) = node.declaration() else {
        panic!("expected a function declaration");
    };
    assert_eq!(decl.parameters.len(), 1);
    assert_eq!(fixture.unit.node(decl.parameters[0]).name, Name::new("int0"));

    // the same call now resolves
    assert_eq!(
        fixture.scopes.resolve_function(&fixture.unit, call, None),
        vec![foo]
    );
}

#[test]
fn test_method_call_on_unknown_record_infers_record_then_method() {
    let mut fixture = UnitFixture::new(0, "a.cpp");
    let config = AnalysisConfig::default();
    let start = fixture.translation_unit;

    let mut ty = Type::object("Database");
    let record = Inference::new(start, &mut fixture.unit, &mut fixture.scopes, &config)
        .infer_record(&mut ty, RecordKind::Struct)
        .expect("record inference must succeed");
    assert_eq!(ty.record(), Some(record));

    let method = Inference::new(record, &mut fixture.unit, &mut fixture.scopes, &config)
        .infer_function(&Name::new("connect"), &[], Type::Unknown, false)
        .expect("method inference must succeed");

    // attaching a method upgrades the inferred aggregate to a class
    let Some(Declaration::Record(decl)) = fixture.unit.node(record).declaration() else {
        panic!("expected a record declaration");
    };
    assert!(matches!(decl.kind, RecordKind::Class));

    let record_scope = fixture.scopes.lookup_scope(record).unwrap();
    assert!(fixture
        .scopes
        .scope(record_scope)
        .values
        .declarations
        .contains(&method));
}

#[test]
fn test_repeated_inference_is_deterministic() {
    let mut fixture = UnitFixture::new(0, "a.cpp");
    let config = AnalysisConfig::default();
    let start = fixture.translation_unit;
    let signature = [Type::builtin("int"), Type::builtin("int")];

    let parameter_names = |fixture: &UnitFixture, id| {
        let Some(Declaration::Function(decl)) = fixture.unit.node(id).declaration() else {
            panic!("expected a function declaration");
        };
        decl.parameters
            .iter()
            .map(|&p| fixture.unit.node(p).name.clone())
            .collect::<Vec<_>>()
    };

    let first = Inference::new(start, &mut fixture.unit, &mut fixture.scopes, &config)
        .infer_function(&Name::new("f"), &signature, Type::builtin("int"), false)
        .unwrap();
    let second = Inference::new(start, &mut fixture.unit, &mut fixture.scopes, &config)
        .infer_function(&Name::new("f"), &signature, Type::builtin("int"), false)
        .unwrap();

    assert_eq!(
        parameter_names(&fixture, first),
        vec![Name::new("int0"), Name::new("int1")]
    );
    assert_eq!(parameter_names(&fixture, first), parameter_names(&fixture, second));
    assert_eq!(fixture.unit.node(first).ty(), fixture.unit.node(second).ty());
}

#[test]
fn test_member_reference_infers_field_with_observed_type() {
    let mut fixture = UnitFixture::new(0, "a.cpp");
    let config = AnalysisConfig::default();

    let record = fixture.enter_record("User", RecordKind::Class);
    fixture.leave(record);
    let mut ty = Type::object("User");
    ty.set_record(record);

    let member = fixture.reference("age");
    let (field, mut observer) =
        Inference::new(record, &mut fixture.unit, &mut fixture.scopes, &config)
            .infer_field(member, &ty)
            .expect("field inference must succeed");

    assert_eq!(fixture.unit.node(field).ty(), Some(&Type::Unknown));
    observer.notify(&mut fixture.unit, &Type::builtin("int"));
    observer.notify(&mut fixture.unit, &Type::builtin("bool"));
    assert_eq!(fixture.unit.node(field).ty(), Some(&Type::builtin("int")));
}
