use graph::{LanguageConfig, Name, Type};
use semantics::{ScopeKind, ScopeManager};
use testing::UnitFixture;

fn namespace_with_function(id: u32, path: &str, namespace: &str, function: &str) -> UnitFixture {
    let mut fixture = UnitFixture::new(id, path);
    let ns = fixture.enter_namespace(namespace);
    let f = fixture.enter_function(function);
    fixture.leave(f);
    fixture.leave(ns);
    fixture
}

#[test]
fn test_two_files_opening_one_namespace_share_a_scope() {
    let a = namespace_with_function(0, "a.cpp", "N", "f");
    let b = namespace_with_function(1, "b.cpp", "N", "f");
    let (_, scopes_a) = a.finish();
    let (_, scopes_b) = b.finish();

    let mut merged = ScopeManager::new(LanguageConfig::cxx());
    merged.merge_from(vec![scopes_a, scopes_b]);

    let ns = merged
        .lookup_scope_by_name(&Name::new("N"))
        .expect("one namespace scope must survive");
    assert_eq!(merged.scope(ns).values.declarations.len(), 2);
}

#[test]
fn test_merge_redirects_every_node_to_the_unified_scope() {
    let mut a = UnitFixture::new(0, "a.cpp");
    let ns_a = a.enter_namespace("a");
    let inner_a = a.enter_namespace("b");
    let x = a.declare_variable("x", Type::builtin("int"));
    a.leave(inner_a);
    a.leave(ns_a);

    let mut b = UnitFixture::new(1, "b.cpp");
    let ns_b = b.enter_namespace("a");
    let inner_b = b.enter_namespace("b");
    let y = b.declare_variable("y", Type::builtin("int"));
    b.leave(inner_b);
    b.leave(ns_b);

    let (_, scopes_a) = a.finish();
    let (_, scopes_b) = b.finish();
    let mut merged = ScopeManager::new(LanguageConfig::cxx());
    merged.merge_from(vec![scopes_a, scopes_b]);

    let unified = merged
        .lookup_scope_by_name(&Name::new("a::b"))
        .expect("nested namespace must unify by FQN");
    let declarations = &merged.scope(unified).values.declarations;
    assert!(declarations.contains(&x));
    assert!(declarations.contains(&y));

    // every opener from either input resolves to the unified scope
    assert_eq!(merged.lookup_scope(inner_a), Some(unified));
    assert_eq!(merged.lookup_scope(inner_b), Some(unified));
    // the anchor is the opener of the last-merged input
    assert_eq!(merged.scope(unified).anchor, Some(inner_b));
}

#[test]
fn test_disjoint_namespaces_stay_disjoint() {
    let a = namespace_with_function(0, "a.cpp", "A", "f");
    let b = namespace_with_function(1, "b.cpp", "B", "g");
    let (_, scopes_a) = a.finish();
    let (_, scopes_b) = b.finish();
    let count_a = scopes_a.scope_count();
    let count_b = scopes_b.scope_count();

    let mut merged = ScopeManager::new(LanguageConfig::cxx());
    merged.merge_from(vec![scopes_a, scopes_b]);

    // the inputs' globals dissolve into the merged global
    assert_eq!(merged.scope_count(), 1 + (count_a - 1) + (count_b - 1));
    assert!(merged.lookup_scope_by_name(&Name::new("A")).is_some());
    assert!(merged.lookup_scope_by_name(&Name::new("B")).is_some());
}

#[test]
fn test_no_two_name_scopes_share_an_fqn_after_merge() {
    let fixtures = vec![
        namespace_with_function(0, "a.cpp", "N", "f"),
        namespace_with_function(1, "b.cpp", "N", "g"),
        namespace_with_function(2, "c.cpp", "M", "h"),
    ];
    let managers: Vec<ScopeManager> = fixtures.into_iter().map(|f| f.finish().1).collect();

    let mut merged = ScopeManager::new(LanguageConfig::cxx());
    merged.merge_from(managers);

    let mut seen = std::collections::HashSet::new();
    for scope in merged.scopes() {
        if matches!(scope.kind, ScopeKind::Name { .. }) {
            let fqn = scope.scoped_name.clone().expect("name scopes carry an FQN");
            assert!(seen.insert(fqn), "duplicate FQN after merge");
        }
    }
    assert_eq!(seen.len(), 2);
}
