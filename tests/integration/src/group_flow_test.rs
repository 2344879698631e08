//! End-to-end tests for the deferred import flow
//!
//! These exercise the complete path: group declaration -> activation
//! scope -> deferred proxies -> first use -> dependency installation ->
//! namespace merge and group unlock.

use std::sync::Arc;

use defer_core::{Engine, Error, InstallReport, Module, PackageChange, Symbol, real_module};
use defer_test_utils::manager::{CountingManager, FixedLocator};

fn pending_report() -> InstallReport {
    InstallReport {
        pending: vec![
            PackageChange::new("fuzzywuzzy", "0.18.0", "Fuzzy string matching in python"),
            PackageChange::new("msgpack", "1.0.8", "MessagePack serializer"),
        ],
    }
}

/// Set up an engine with a small module library.
fn setup(manager: Arc<CountingManager>) -> Engine {
    defer_test_utils::logging::init();

    let engine = Engine::new(manager, Arc::new(FixedLocator::new("requirements.txt")));
    engine.library().define_package("pak", |ctx| {
        ctx.export(
            "dopak",
            Symbol::func(|_args| Ok(Symbol::str("hello fuzzywuzzy"))),
        );
        Ok(())
    });
    engine.library().define("pak.bar", |ctx| {
        ctx.export(
            "dobar",
            Symbol::func(|_args| Ok(Symbol::str("hello msgpack"))),
        );
        Ok(())
    });
    engine.library().define_package("nspak", |_ctx| Ok(()));
    engine.library().define("nspak.foo", |ctx| {
        ctx.export(
            "dofoo",
            Symbol::func(|_args| Ok(Symbol::str("hello regex"))),
        );
        Ok(())
    });
    engine
}

#[test]
fn test_first_use_triggers_installation() {
    let manager = Arc::new(CountingManager::new(pending_report()));
    let engine = setup(manager.clone());
    let group = engine.group("pak:requirements.txt").unwrap();

    let scope = group.activate();
    let pak = engine.import_module("pak").unwrap();
    assert!(pak.is_deferred());
    assert_eq!(manager.dry_runs(), 0);
    drop(scope);

    let greeting = pak.call_attr("dopak", &[]).unwrap();
    assert_eq!(greeting.as_str(), Some("hello fuzzywuzzy"));
    assert_eq!(manager.dry_runs(), 1);
    assert_eq!(manager.installs(), 1);
    assert!(group.resolved());
}

#[test]
fn test_group_installs_once_across_members() {
    let manager = Arc::new(CountingManager::new(pending_report()));
    let engine = setup(manager.clone());
    let group = engine.group("pak:requirements.txt").unwrap();

    let scope = group.activate();
    let pak = engine.import_module("pak").unwrap();
    engine.import_module("pak.bar").unwrap();
    assert_eq!(group.member_names(), vec!["pak", "pak.bar"]);
    drop(scope);

    // First use of either member installs the shared requirement set.
    pak.call_attr("dopak", &[]).unwrap();
    assert_eq!(manager.installs(), 1);

    // The child proxy was bound into the parent's namespace during the
    // dotted import; using it loads the real submodule without another
    // installation.
    let symbol = pak.attr("bar").unwrap();
    let bar = symbol.as_module().unwrap();
    let greeting = bar.call_attr("dobar", &[]).unwrap();
    assert_eq!(greeting.as_str(), Some("hello msgpack"));
    assert_eq!(manager.dry_runs(), 1);
    assert_eq!(manager.installs(), 1);
}

#[test]
fn test_members_halted_until_first_use() {
    let manager = Arc::new(CountingManager::new(pending_report()));
    let engine = setup(manager.clone());
    let group = engine.group("nspak:requirements.txt").unwrap();

    let scope = group.activate();
    let foo = engine.import_module("nspak.foo").unwrap();
    drop(scope);

    // Raw import of a halted member fails while dependencies are not
    // guaranteed, even though a definition for it exists.
    let err = engine.import_module("nspak").unwrap_err();
    assert!(matches!(err, Error::Halted { name } if name == "nspak"));

    // First use of any member resolves the group and unlocks the rest.
    let greeting = foo.call_attr("dofoo", &[]).unwrap();
    assert_eq!(greeting.as_str(), Some("hello regex"));
    let nspak = engine.import_module("nspak").unwrap();
    assert!(!nspak.is_deferred());
}

#[test]
fn test_satisfied_environment_skips_installation() {
    let manager = Arc::new(CountingManager::satisfied());
    let engine = setup(manager.clone());
    let group = engine.group("pak:requirements.txt").unwrap();

    let scope = group.activate();
    let pak = engine.import_module("pak").unwrap();
    drop(scope);

    pak.call_attr("dopak", &[]).unwrap();
    assert_eq!(manager.dry_runs(), 1);
    assert_eq!(manager.installs(), 0);
    assert!(group.resolved());
}

#[test]
fn test_proxy_and_real_module_identity() {
    let manager = Arc::new(CountingManager::new(pending_report()));
    let engine = setup(manager.clone());
    let group = engine.group("pak:requirements.txt").unwrap();

    let scope = group.activate();
    let lazy = engine.import_module("pak").unwrap();
    drop(scope);

    lazy.attr("dopak").unwrap();
    let real = engine.import_module("pak").unwrap();

    // Distinct module objects sharing attribute values.
    assert!(!Module::same(&lazy, &real));
    assert_eq!(lazy.attr("dopak").unwrap(), real.attr("dopak").unwrap());
    assert!(Module::same(&real_module(&lazy), &real));
}

#[test]
fn test_loaded_module_wins_over_new_scope() {
    let manager = Arc::new(CountingManager::new(pending_report()));
    let engine = setup(manager.clone());
    let group = engine.group("pak:requirements.txt").unwrap();

    let scope = group.activate();
    let lazy = engine.import_module("pak").unwrap();
    drop(scope);
    lazy.attr("dopak").unwrap();

    // The name is genuinely loaded now; a fresh scope does not intercept
    // it again and its group never gains members.
    let second = engine.group("pak:requirements.txt").unwrap();
    let scope = second.activate();
    let pak = engine.import_module("pak").unwrap();
    drop(scope);

    assert!(!pak.is_deferred());
    pak.call_attr("dopak", &[]).unwrap();
    assert_eq!(manager.installs(), 1);
    assert!(second.member_names().is_empty());
}

#[test]
fn test_failed_installation_is_retryable() {
    let manager = Arc::new(CountingManager::new(pending_report()));
    manager.set_fail_install(true);
    let engine = setup(manager.clone());
    let group = engine.group("pak:requirements.txt").unwrap();

    let scope = group.activate();
    let pak = engine.import_module("pak").unwrap();
    drop(scope);

    let err = pak.attr("dopak").unwrap_err();
    assert!(matches!(err, Error::Install(_)));
    assert!(pak.is_deferred());
    assert!(!group.resolved());

    manager.set_fail_install(false);
    let greeting = pak.call_attr("dopak", &[]).unwrap();
    assert_eq!(greeting.as_str(), Some("hello fuzzywuzzy"));
    assert!(group.resolved());
    assert_eq!(manager.installs(), 2);
}
