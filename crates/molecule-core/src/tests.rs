use std::fs;
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicU64, Ordering};

use serde_json::json;

use super::*;

static TEST_LAYOUT_COUNTER: AtomicU64 = AtomicU64::new(0);

fn build_test_layout_path(nanos: u128) -> PathBuf {
    let mut path = std::env::temp_dir();
    let sequence = TEST_LAYOUT_COUNTER.fetch_add(1, Ordering::Relaxed);
    path.push(format!(
        "molecule-core-tests-{}-{}-{}",
        std::process::id(),
        nanos,
        sequence
    ));
    path
}

fn test_layout() -> BaseLayout {
    let nanos = std::time::SystemTime::now()
        .duration_since(std::time::UNIX_EPOCH)
        .expect("system time")
        .as_nanos();
    let layout = BaseLayout::new(build_test_layout_path(nanos));
    fs::create_dir_all(layout.packages_dir()).expect("must create packages dir");
    layout
}

fn write_descriptor(layout: &BaseLayout, dir: &str, content: &str) {
    let path = layout.descriptor_path(dir);
    fs::create_dir_all(path.parent().expect("descriptor has parent")).expect("must create dir");
    fs::write(path, content).expect("must write descriptor");
}

fn scan_names(layout: &BaseLayout, disabled: Option<&DisabledPackages>) -> Vec<String> {
    let scan = scan_descriptors(&layout.packages_dir()).expect("must start scan");
    let mut names = collect_manifest(scan, disabled)
        .expect("scan should succeed")
        .into_iter()
        .map(|record| record.name)
        .collect::<Vec<_>>();
    // directory enumeration order is platform dependent
    names.sort();
    names
}

fn cleanup(layout: &BaseLayout) {
    let _ = fs::remove_dir_all(layout.base());
}

#[test]
fn build_test_layout_path_disambiguates_same_timestamp_calls() {
    assert_ne!(build_test_layout_path(42), build_test_layout_path(42));
}

#[test]
fn record_from_descriptor_requires_name_and_version() {
    assert_eq!(
        PackageRecord::from_descriptor(&json!({ "name": "minimap", "version": "4.29.0" })),
        Some(PackageRecord::new("minimap", "4.29.0", None))
    );
    assert_eq!(
        PackageRecord::from_descriptor(&json!({ "name": "minimap" })),
        None
    );
    assert_eq!(
        PackageRecord::from_descriptor(&json!({ "version": "1.0.0" })),
        None
    );
    assert_eq!(
        PackageRecord::from_descriptor(&json!({ "name": "", "version": "1.0.0" })),
        None
    );
    assert_eq!(PackageRecord::from_descriptor(&json!(["minimap"])), None);
}

#[test]
fn record_from_descriptor_normalizes_repository() {
    let string_repo = json!({
        "name": "linter",
        "version": "2.3.1",
        "repository": "https://github.com/steelbrain/linter"
    });
    let object_repo = json!({
        "name": "linter",
        "version": "2.3.1",
        "repository": { "type": "git", "url": "https://github.com/steelbrain/linter" }
    });
    let odd_repo = json!({ "name": "linter", "version": "2.3.1", "repository": 7 });

    let expected = Some("https://github.com/steelbrain/linter".to_string());
    assert_eq!(
        PackageRecord::from_descriptor(&string_repo).and_then(|record| record.repo),
        expected
    );
    assert_eq!(
        PackageRecord::from_descriptor(&object_repo).and_then(|record| record.repo),
        expected
    );
    assert_eq!(
        PackageRecord::from_descriptor(&odd_repo).map(|record| record.repo),
        Some(None)
    );
}

#[test]
fn scan_skips_incomplete_descriptors_without_aborting() {
    let layout = test_layout();
    write_descriptor(&layout, "minimap", r#"{"name":"minimap","version":"4.29.0"}"#);
    write_descriptor(&layout, "no-version", r#"{"name":"no-version"}"#);
    write_descriptor(&layout, "no-name", r#"{"version":"1.0.0"}"#);
    write_descriptor(&layout, "linter", r#"{"name":"linter","version":"2.3.1"}"#);
    fs::create_dir_all(layout.packages_dir().join("empty-dir")).expect("must create dir");
    fs::write(layout.packages_dir().join("stray-file"), "x").expect("must write stray file");

    assert_eq!(scan_names(&layout, None), vec!["linter", "minimap"]);

    cleanup(&layout);
}

#[test]
fn scan_reports_descriptor_without_record() {
    let layout = test_layout();
    write_descriptor(&layout, "no-version", r#"{"name":"no-version"}"#);

    let scanned = scan_descriptors(&layout.packages_dir())
        .expect("must start scan")
        .collect::<anyhow::Result<Vec<_>>>()
        .expect("scan should succeed");
    assert_eq!(scanned.len(), 1);
    assert_eq!(scanned[0].path, layout.descriptor_path("no-version"));
    assert!(scanned[0].record.is_none());

    cleanup(&layout);
}

#[test]
fn scan_excludes_disabled_packages() {
    let layout = test_layout();
    write_descriptor(&layout, "minimap", r#"{"name":"minimap","version":"4.29.0"}"#);
    write_descriptor(&layout, "linter", r#"{"name":"linter","version":"2.3.1"}"#);
    write_descriptor(&layout, "emmet", r#"{"name":"emmet","version":"2.4.3"}"#);

    let disabled = DisabledPackages::new(["linter", "not-installed"]);
    assert_eq!(scan_names(&layout, Some(&disabled)), vec!["emmet", "minimap"]);

    let empty = DisabledPackages::default();
    assert_eq!(
        scan_names(&layout, Some(&empty)),
        vec!["emmet", "linter", "minimap"]
    );

    cleanup(&layout);
}

#[test]
fn scan_aborts_on_corrupt_descriptor() {
    let layout = test_layout();
    write_descriptor(&layout, "minimap", r#"{"name":"minimap","version":"4.29.0"}"#);
    write_descriptor(&layout, "broken", "{ not json");
    write_descriptor(&layout, "linter", r#"{"name":"linter","version":"2.3.1"}"#);

    let scan = scan_descriptors(&layout.packages_dir()).expect("must start scan");
    let err = collect_manifest(scan, None).expect_err("corrupt descriptor must abort the scan");
    match err.downcast_ref::<MoleculeError>() {
        Some(MoleculeError::MalformedJson { path, .. }) => {
            assert_eq!(path, &layout.descriptor_path("broken"));
        }
        other => panic!("unexpected error: {other:?}"),
    }

    cleanup(&layout);
}

#[test]
fn scan_of_missing_packages_dir_is_empty() {
    let layout = test_layout();
    fs::remove_dir_all(layout.packages_dir()).expect("must remove packages dir");

    let scan = scan_descriptors(&layout.packages_dir()).expect("missing dir is not an error");
    assert!(collect_manifest(scan, None)
        .expect("empty scan should succeed")
        .is_empty());

    cleanup(&layout);
}

#[test]
fn disabled_packages_skipped_when_including_disabled() {
    let missing = Path::new("/definitely/not/here/config.toml");
    assert_eq!(load_disabled_packages(true, missing).expect("no read"), None);
}

#[test]
fn disabled_packages_missing_config_is_non_fatal_error() {
    let layout = test_layout();

    let err = load_disabled_packages(false, &layout.config_path())
        .expect_err("missing config should be reported");
    assert!(matches!(err, MoleculeError::MalformedConfig { .. }));

    cleanup(&layout);
}

#[test]
fn disabled_packages_read_from_core_scope() {
    let layout = test_layout();
    fs::write(
        layout.config_path(),
        "[\"*\".core]\ndisabledPackages = [\"linter\", \"welcome\", 3]\nthemes = [\"one-dark-ui\"]\n",
    )
    .expect("must write config");

    let disabled = load_disabled_packages(false, &layout.config_path())
        .expect("config should load")
        .expect("disabled list should be present");
    assert_eq!(disabled.names(), ["linter", "welcome"]);
    assert!(disabled.contains("welcome"));
    assert!(!disabled.contains("minimap"));

    cleanup(&layout);
}

#[test]
fn disabled_packages_absent_or_wrong_shape_means_no_filtering() {
    let path = Path::new("config.toml");
    assert_eq!(
        parse_disabled_packages("[editor]\nfontSize = 14\n", path).expect("valid toml"),
        None
    );
    assert_eq!(
        parse_disabled_packages("[\"*\".core]\ndisabledPackages = \"linter\"\n", path)
            .expect("valid toml"),
        None
    );
}

#[test]
fn disabled_packages_malformed_config_is_reported() {
    let err = parse_disabled_packages("[\"*\".core\ndisabledPackages = [", Path::new("c.toml"))
        .expect_err("malformed toml should be reported");
    assert!(matches!(err, MoleculeError::MalformedConfig { .. }));
}

#[test]
fn manifest_encoding_is_pretty_with_trailing_newline() {
    let encoded = encode_manifest(&[PackageRecord::new("minimap", "4.29.0", None)])
        .expect("must encode");
    assert_eq!(
        encoded,
        "[\n  {\n    \"name\": \"minimap\",\n    \"version\": \"4.29.0\",\n    \"repo\": null\n  }\n]\n"
    );
}

#[test]
fn manifest_round_trip_preserves_order() {
    let layout = test_layout();
    let records = vec![
        PackageRecord::new("zen", "0.16.4", None),
        PackageRecord::new(
            "atom-beautify",
            "0.33.4",
            Some("https://github.com/Glavin001/atom-beautify".to_string()),
        ),
        PackageRecord::new("emmet", "2.4.3", None),
    ];

    write_manifest(&layout.manifest_path(), &records).expect("must write manifest");
    let manifest = read_manifest(&layout.manifest_path()).expect("must read manifest");
    assert_eq!(manifest.len(), 3);
    assert_eq!(manifest.records(), records);

    cleanup(&layout);
}

#[test]
fn manifest_round_trip_keeps_string_fields_verbatim() {
    let records = vec![
        PackageRecord::new("minimap", "4.29.0", Some(String::new())),
        PackageRecord::new("local-build", "", None),
    ];

    let encoded = encode_manifest(&records).expect("must encode");
    let manifest = parse_manifest(encoded.as_bytes(), Path::new("manifest.json"))
        .expect("must parse");
    assert_eq!(manifest.records(), records);
}

#[test]
fn manifest_repo_defaults_to_null() {
    let manifest = parse_manifest(
        br#"[{"name":"minimap","version":"4.29.0"}]"#,
        Path::new("manifest.json"),
    )
    .expect("must parse");
    assert_eq!(
        manifest.records(),
        vec![PackageRecord::new("minimap", "4.29.0", None)]
    );
}

#[test]
fn manifest_keeps_malformed_entries_in_position() {
    let manifest = parse_manifest(
        br#"[null, {"version":"1.0.0"}, {"name":"linter"}, "emmet", {"name":"zen","version":"0.16.4"}]"#,
        Path::new("manifest.json"),
    )
    .expect("must parse");

    let names = manifest
        .entries()
        .iter()
        .map(ManifestEntry::name)
        .collect::<Vec<_>>();
    assert_eq!(names, vec![None, None, Some("linter"), None, Some("zen")]);
    assert_eq!(
        manifest.records(),
        vec![PackageRecord::new("zen", "0.16.4", None)]
    );
}

#[test]
fn manifest_rejects_non_array_documents() {
    for (raw, found) in [
        (&br#"{"name":"minimap"}"#[..], "object"),
        (&br#""minimap""#[..], "string"),
        (&b"null"[..], "null"),
    ] {
        let err = parse_manifest(raw, Path::new("manifest.json"))
            .expect_err("non-array manifest must fail");
        match err.downcast_ref::<MoleculeError>() {
            Some(MoleculeError::MalformedManifestShape { found: actual, .. }) => {
                assert_eq!(*actual, found);
            }
            other => panic!("unexpected error: {other:?}"),
        }
    }
}

#[test]
fn manifest_parse_failure_is_distinct_from_shape_failure() {
    let err = parse_manifest(b"[{", Path::new("manifest.json")).expect_err("must fail");
    assert!(matches!(
        err.downcast_ref::<MoleculeError>(),
        Some(MoleculeError::MalformedJson { .. })
    ));
}

#[test]
fn manifest_missing_file_is_reported() {
    let layout = test_layout();

    let err = read_manifest(&layout.manifest_path()).expect_err("missing manifest must fail");
    assert!(matches!(
        err.downcast_ref::<MoleculeError>(),
        Some(MoleculeError::MissingManifest { .. })
    ));
    assert!(layout.ensure_manifest_file().is_err());

    cleanup(&layout);
}

#[test]
fn layout_checks_base_directory() {
    let layout = test_layout();
    assert!(layout.ensure_base_dir().is_ok());

    let missing = BaseLayout::new(layout.base().join("nope"));
    let err = missing.ensure_base_dir().expect_err("missing base must fail");
    assert!(matches!(
        err.downcast_ref::<MoleculeError>(),
        Some(MoleculeError::MissingDirectory { .. })
    ));

    cleanup(&layout);
}
