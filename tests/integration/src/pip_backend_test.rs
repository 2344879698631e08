//! Tests for the pip backend against a scripted pip replacement.
//!
//! A stand-in `pip` shell script answers dry-run invocations by copying
//! a prepared report JSON to the `--report` path and records real
//! installs in a marker file, so the full engine -> manager -> locator
//! path runs without touching any package index.

#![cfg(unix)]

use std::path::{Path, PathBuf};
use std::sync::Arc;

use defer_core::{Engine, PackageManager, Symbol};
use defer_pip::{PackageDirLocator, PipConfig, PipManager};
use defer_test_utils::packages::PackageRoot;

fn write_fake_pip(dir: &Path, report_source: &Path, marker: &Path) -> PathBuf {
    use std::os::unix::fs::PermissionsExt;

    let script = dir.join("fake-pip");
    let body = format!(
        "#!/bin/sh\n\
         report=\"\"\n\
         prev=\"\"\n\
         for arg in \"$@\"; do\n\
           if [ \"$prev\" = \"--report\" ]; then report=\"$arg\"; fi\n\
           prev=\"$arg\"\n\
         done\n\
         if [ -n \"$report\" ]; then\n\
           cat '{report_source}' > \"$report\"\n\
         else\n\
           printf 'install\\n' >> '{marker}'\n\
         fi\n",
        report_source = report_source.display(),
        marker = marker.display(),
    );
    std::fs::write(&script, body).unwrap();
    let mut perms = std::fs::metadata(&script).unwrap().permissions();
    perms.set_mode(0o755);
    std::fs::set_permissions(&script, perms).unwrap();
    script
}

fn write_report(path: &Path, install: serde_json::Value) {
    let report = serde_json::json!({
        "version": "1",
        "pip_version": "24.0",
        "install": install,
        "environment": {},
    });
    std::fs::write(path, serde_json::to_string_pretty(&report).unwrap()).unwrap();
}

struct FakePip {
    _scratch: tempfile::TempDir,
    marker: PathBuf,
    manager: PipManager,
}

fn fake_pip(install: serde_json::Value) -> FakePip {
    let scratch = tempfile::tempdir().unwrap();
    let report_source = scratch.path().join("report.json");
    write_report(&report_source, install);
    let marker = scratch.path().join("installed.marker");
    let script = write_fake_pip(scratch.path(), &report_source, &marker);

    let manager = PipManager::with_config(PipConfig {
        program: script.display().to_string(),
        extra_args: vec!["--quiet".to_string()],
    });
    FakePip {
        _scratch: scratch,
        marker,
        manager,
    }
}

fn pending_entries() -> serde_json::Value {
    serde_json::json!([
        {
            "metadata": {
                "name": "fuzzywuzzy",
                "version": "0.18.0",
                "summary": "Fuzzy string matching in python"
            }
        },
        {
            "metadata": {
                "name": "msgpack",
                "version": "1.0.8",
                "summary": "MessagePack serializer"
            }
        }
    ])
}

#[test]
fn test_dry_run_parses_report() {
    let fixtures = PackageRoot::new();
    let requirements =
        fixtures.write_requirements("pak", "requirements.txt", "fuzzywuzzy==0.18.0\nmsgpack\n");
    let pip = fake_pip(pending_entries());

    let report = pip.manager.dry_run(&requirements).unwrap();
    assert_eq!(report.pending.len(), 2);
    assert_eq!(
        report.pending[0].describe(),
        "installing fuzzywuzzy==0.18.0 (Fuzzy string matching in python)"
    );
    assert!(!pip.marker.exists());
}

#[test]
fn test_engine_installs_through_pip_on_first_use() {
    let fixtures = PackageRoot::new();
    fixtures.write_requirements("pak", "requirements.txt", "fuzzywuzzy==0.18.0\nmsgpack\n");
    let pip = fake_pip(pending_entries());
    let marker = pip.marker.clone();

    let locator = PackageDirLocator::single(fixtures.root());
    let engine = Engine::new(Arc::new(pip.manager), Arc::new(locator));
    engine.library().define_package("pak", |ctx| {
        ctx.export(
            "dopak",
            Symbol::func(|_args| Ok(Symbol::str("hello fuzzywuzzy"))),
        );
        Ok(())
    });

    let group = engine.group("pak:requirements.txt").unwrap();
    let scope = group.activate();
    let pak = engine.import_module("pak").unwrap();
    drop(scope);
    assert!(!marker.exists());

    let greeting = pak.call_attr("dopak", &[]).unwrap();
    assert_eq!(greeting.as_str(), Some("hello fuzzywuzzy"));
    assert!(marker.exists());
    assert!(group.resolved());
}

#[test]
fn test_engine_skips_install_when_nothing_pending() {
    let fixtures = PackageRoot::new();
    fixtures.write_requirements("pak", "requirements.txt", "msgpack\n");
    let pip = fake_pip(serde_json::json!([]));
    let marker = pip.marker.clone();

    let locator = PackageDirLocator::single(fixtures.root());
    let engine = Engine::new(Arc::new(pip.manager), Arc::new(locator));
    engine.library().define_package("pak", |ctx| {
        ctx.export("version", Symbol::str("1.0"));
        Ok(())
    });

    let group = engine.group("pak:requirements.txt").unwrap();
    let scope = group.activate();
    let pak = engine.import_module("pak").unwrap();
    drop(scope);

    assert_eq!(pak.attr("version").unwrap().as_str(), Some("1.0"));
    assert!(!marker.exists());
    assert!(group.resolved());
}

#[test]
fn test_missing_requirement_file_fails_resolution() {
    let fixtures = PackageRoot::new();
    fixtures.add_package("pak");
    let pip = fake_pip(pending_entries());

    let locator = PackageDirLocator::single(fixtures.root());
    let engine = Engine::new(Arc::new(pip.manager), Arc::new(locator));
    engine.library().define_package("pak", |_ctx| Ok(()));

    let group = engine.group("pak:requirements.txt").unwrap();
    let scope = group.activate();
    let pak = engine.import_module("pak").unwrap();
    drop(scope);

    let err = pak.attr("anything").unwrap_err();
    assert!(matches!(err, defer_core::Error::Locate(_)));
    assert!(!group.resolved());
}
