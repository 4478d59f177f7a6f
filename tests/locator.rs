//! Integration tests for module location against directory layouts on disk.
//!
//! Runtime installations are recreated in temporary directories; the image files only
//! need to exist for the locators, and hold real JSON images where a test goes on to
//! build specs from them.

use std::{
    fs,
    path::{Path, PathBuf},
    sync::Arc,
};

use dotspec::{
    metadata::{AssemblyReference, TypeDefinition},
    prelude::*,
    version::pick_best_version,
    Result,
};

fn touch(path: &Path) -> PathBuf {
    fs::create_dir_all(path.parent().unwrap()).unwrap();
    fs::write(path, b"{}").unwrap();
    path.to_path_buf()
}

fn write_image(path: &Path, image: &ModuleImage) -> PathBuf {
    fs::create_dir_all(path.parent().unwrap()).unwrap();
    fs::write(path, serde_json::to_vec_pretty(image).unwrap()).unwrap();
    path.to_path_buf()
}

/// The runtime directory closest to the requested version is searched.
#[test]
fn test_core_locator_picks_runtime_version() {
    let dotnet = tempfile::tempdir().unwrap();
    let shared = dotnet.path().join("shared/Microsoft.NETCore.App");
    touch(&shared.join("6.0.25/System.Runtime.dll"));
    let expected = touch(&shared.join("8.0.4/System.Runtime.dll"));
    touch(&shared.join("9.0.0/System.Runtime.dll"));

    let context = LocatorContext::new(LocatorConfig::empty().with_dotnet_root(dotnet.path()));
    let locator = context.locator_for(&ResolutionScope::from_hint(".NETCoreApp,Version=v8.0"));

    let faults = Faults::new();
    assert_eq!(
        locator.locate_assembly_by_name("System.Runtime", None, &faults),
        Located::Found(expected)
    );
    assert!(locator.base_directories(&faults).iter().any(|dir| dir.ends_with("8.0.4")));
    assert!(faults.is_empty());
}

/// Several candidates without a version hint are an ambiguity: the first one is used
/// and a Warning fault is recorded.
#[test]
fn test_ambiguous_candidates_record_a_fault() {
    let root = tempfile::tempdir().unwrap();
    let first = touch(&root.path().join("a/Plugin.dll"));
    let second = touch(&root.path().join("b/Plugin.dll"));

    let context = LocatorContext::new(LocatorConfig::empty().with_search_directory(root.path()));
    let locator = context.locator_for(&ResolutionScope::Unknown);

    let faults = Faults::new();
    match locator.locate_assembly_by_name("Plugin", None, &faults) {
        Located::Ambiguous { chosen, candidates } => {
            assert_eq!(chosen, first);
            assert_eq!(candidates, vec![first.clone(), second]);
        }
        other => panic!("expected an ambiguity, got {other:?}"),
    }

    let ambiguities = faults.by_kind(FaultKind::AmbiguousResolution);
    assert_eq!(ambiguities.len(), 1);
    assert_eq!(ambiguities[0].severity, Severity::Warning);
}

/// Lookups are persisted per scope and directory set; stale entries are ignored.
#[test]
fn test_persisted_cache_across_contexts() {
    let root = tempfile::tempdir().unwrap();
    let cache = root.path().join("cache");
    let modules = root.path().join("modules");
    let library = touch(&modules.join("Vendor.Lib.dll"));

    let config = LocatorConfig::empty()
        .with_search_directory(&modules)
        .with_cache_directory(&cache);

    let first = LocatorContext::new(config.clone());
    let located = first
        .locator_for(&ResolutionScope::Unknown)
        .locate_assembly_by_name("vendor.lib", None, &Faults::new());
    assert_eq!(located, Located::Found(library.clone()));

    let files: Vec<PathBuf> = fs::read_dir(&cache)
        .unwrap()
        .map(|entry| entry.unwrap().path())
        .collect();
    assert_eq!(files.len(), 1);
    assert_eq!(files[0].extension().and_then(|e| e.to_str()), Some("json"));

    // a fresh context answers from the persisted file
    let second = LocatorContext::new(config.clone());
    assert_eq!(
        second
            .locator_for(&ResolutionScope::Unknown)
            .locate_assembly_by_name("Vendor.Lib", None, &Faults::new()),
        Located::Found(library.clone())
    );

    fs::remove_file(&library).unwrap();
    let third = LocatorContext::new(config);
    assert_eq!(
        third
            .locator_for(&ResolutionScope::Unknown)
            .locate_assembly_by_name("Vendor.Lib", None, &Faults::new()),
        Located::NotFound
    );
}

/// A whole graph built from JSON images on disk, with the runtime reference found by
/// the scope locator of the root module.
#[test]
fn test_build_from_disk_images() -> Result<()> {
    let root = tempfile::tempdir().unwrap();

    let mut runtime = ModuleImage::new("System.Runtime", AssemblyVersion::new(8, 0, 0, 0));
    runtime.types.push(TypeDefinition::new("System", "Object"));
    write_image(
        &root.path().join("dotnet/shared/Microsoft.NETCore.App/8.0.4/System.Runtime.json"),
        &runtime,
    );
    runtime.version = AssemblyVersion::new(6, 0, 0, 0);
    write_image(
        &root.path().join("dotnet/shared/Microsoft.NETCore.App/6.0.25/System.Runtime.json"),
        &runtime,
    );

    let mut app = ModuleImage::new("App", AssemblyVersion::new(1, 0, 0, 0));
    app.target_framework = Some(".NETCoreApp,Version=v8.0".into());
    app.references.push(AssemblyReference::new(
        "System.Runtime",
        Some(AssemblyVersion::new(8, 0, 0, 0)),
    ));
    let mut program = TypeDefinition::new("App", "Program");
    program.base = Some(TypeReference::external("System.Runtime", "System", "Object"));
    app.types.push(program);
    let app_path = write_image(&root.path().join("app/App.json"), &app);

    let context =
        LocatorContext::new(LocatorConfig::empty().with_dotnet_root(root.path().join("dotnet")));
    let manager = SpecManager::builder()
        .root(&app_path)
        .locators(Arc::new(context))
        .build();
    manager.load_root()?;
    manager.build_all();

    let object = manager.get_type_spec("System.Object").unwrap();
    let module = manager.spec(object).unwrap().module().unwrap();
    assert_eq!(manager.spec(module).unwrap().name(), "System.Runtime, Version=8.0.0.0");

    let program = manager.get_type_spec("App.Program").unwrap();
    assert_eq!(manager.type_relations(program).base, Some(object));
    assert!(manager.faults().is_empty(), "{}", manager.faults().summary());
    Ok(())
}

/// Two modules referencing different versions of one assembly get one module spec per
/// version, both owned by the same assembly spec.
#[test]
fn test_references_to_different_versions() -> Result<()> {
    let root = tempfile::tempdir().unwrap();
    let libs = root.path().join("libs");

    for major in [2, 4] {
        let mut lib = ModuleImage::new("Lib", AssemblyVersion::new(major, 0, 0, 0));
        lib.types.push(TypeDefinition::new("Lib", "Widget"));
        write_image(&libs.join(format!("Lib/v4.0_{major}.0.0.0__abc/Lib.json")), &lib);
    }

    let mut plugin = ModuleImage::new("Plugin", AssemblyVersion::new(1, 0, 0, 0));
    plugin
        .references
        .push(AssemblyReference::new("Lib", Some(AssemblyVersion::new(2, 0, 0, 0))));
    write_image(&libs.join("Plugin.json"), &plugin);

    let mut app = ModuleImage::new("App", AssemblyVersion::new(1, 0, 0, 0));
    app.references
        .push(AssemblyReference::new("Lib", Some(AssemblyVersion::new(4, 0, 0, 0))));
    app.references
        .push(AssemblyReference::new("Plugin", Some(AssemblyVersion::new(1, 0, 0, 0))));
    let app_path = write_image(&root.path().join("app/App.json"), &app);

    let manager = SpecManager::builder().root(&app_path).search_dir(&libs).build();
    let app_module = manager.load_root()?;
    manager.build_all();

    let version_of = |module: SpecId| manager.spec(module).unwrap().as_module().unwrap().version;
    let app_references = manager.referenced_modules(app_module);
    let plugin_references = manager.referenced_modules(app_references[1]);
    assert_eq!(version_of(app_references[0]), AssemblyVersion::new(4, 0, 0, 0));
    assert_eq!(version_of(plugin_references[0]), AssemblyVersion::new(2, 0, 0, 0));
    assert_ne!(app_references[0], plugin_references[0]);

    let lib = manager
        .assembly_specs()
        .into_iter()
        .find(|id| manager.spec(*id).unwrap().name() == "Lib")
        .unwrap();
    let versions = manager.spec(lib).unwrap().as_assembly().unwrap().versions();
    assert_eq!(versions.len(), 2);
    assert!(versions.contains(&app_references[0]));
    assert!(versions.contains(&plugin_references[0]));
    assert!(manager.faults().is_empty(), "{}", manager.faults().summary());
    Ok(())
}

/// A root file that is not a valid image degrades to a placeholder with an Error
/// fault.
#[test]
fn test_undecodable_root() -> Result<()> {
    let root = tempfile::tempdir().unwrap();
    let path = root.path().join("Broken.json");
    fs::write(&path, b"not json").unwrap();

    let manager = SpecManager::builder().root(&path).build();
    let module = manager.load_root()?;

    assert!(manager.spec(module).unwrap().as_module().unwrap().is_missing());
    assert!(manager.faults().has_errors());
    Ok(())
}

/// Directory selection follows the version picker.
#[test]
fn test_version_picker_selection() -> Result<()> {
    let available = ["1.0.0", "2.5.4", "2.5.6", "0.5.7", "13.5.4", "4.5.1", "4.6.0"];
    assert_eq!(pick_best_version(&available, "13.5.4")?, Some("13.5.4".to_string()));
    assert_eq!(pick_best_version(&available, "3.0.0")?, Some("4.5.1".to_string()));
    assert_eq!(pick_best_version(&available, "2.5.5")?, Some("2.5.6".to_string()));
    assert_eq!(pick_best_version(&available, "14.0.0")?, None);
    assert!(pick_best_version(&available, "not-a-version").is_err());
    Ok(())
}
