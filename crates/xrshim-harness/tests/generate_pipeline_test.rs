//! Integration test: generation pipeline over the workspace registry and
//! layer configuration, including all-or-nothing writes and run logs.
//!
//! Run: cargo test -p xrshim-harness --test generate_pipeline_test

use std::path::{Path, PathBuf};

use xrshim_harness::structured_log::validate_log_file;
use xrshim_harness::{
    DECLARATIONS_FILE, DEFINITIONS_FILE, GenerateRequest, HarnessError, run_generate, write_units,
};

fn workspace_root() -> PathBuf {
    let manifest = env!("CARGO_MANIFEST_DIR");
    Path::new(manifest)
        .parent()
        .unwrap()
        .parent()
        .unwrap()
        .to_path_buf()
}

fn scratch(name: &str) -> PathBuf {
    let dir = std::env::temp_dir().join(format!("xrshim-pipeline-{name}-{}", std::process::id()));
    let _ = std::fs::remove_dir_all(&dir);
    std::fs::create_dir_all(&dir).unwrap();
    dir
}

fn request(target: &str, out_dir: &Path) -> GenerateRequest {
    let root = workspace_root();
    GenerateRequest::new(
        root.join("registry/openxr_core.json"),
        root.join("layer_apis.json"),
        target,
        out_dir,
    )
}

#[test]
fn novendor_generation_writes_both_units_and_a_valid_log() {
    let dir = scratch("novendor");
    let out = dir.join("out");
    let log = dir.join("run.jsonl");
    let index = dir.join("artifacts.json");

    let outcome = run_generate(
        &request("novendor", &out)
            .with_log(&log)
            .with_artifact_index(&index),
    )
    .unwrap();

    let decl = std::fs::read_to_string(out.join(DECLARATIONS_FILE)).unwrap();
    let defs = std::fs::read_to_string(out.join(DEFINITIONS_FILE)).unwrap();
    assert_eq!(decl, outcome.units.declarations);
    assert_eq!(defs, outcome.units.definitions);
    assert!(decl.contains(&outcome.units.fingerprint));
    assert!(defs.contains("xrEndFrame"));

    let (lines, errors) = validate_log_file(&log).unwrap();
    assert!(errors.is_empty(), "log errors: {errors:?}");
    // start, two unit_written, done
    assert_eq!(lines, 4);
    let log_text = std::fs::read_to_string(&log).unwrap();
    assert!(log_text.contains("\"event\":\"generate_done\""));
    assert!(log_text.contains("xrshim-generate::novendor::001"));

    let index: serde_json::Value =
        serde_json::from_str(&std::fs::read_to_string(&index).unwrap()).unwrap();
    assert_eq!(index["target"], "novendor");
    assert_eq!(index["input_fingerprint"], outcome.units.fingerprint.as_str());
    assert_eq!(
        index["artifacts"][0]["sha256"],
        outcome.written.declarations.sha256.as_str()
    );

    let _ = std::fs::remove_dir_all(&dir);
}

#[test]
fn configuration_error_writes_zero_files() {
    let dir = scratch("bad-target");
    let out = dir.join("out");
    let log = dir.join("run.jsonl");

    let err = run_generate(&request("no_such_target", &out).with_log(&log)).unwrap_err();
    assert!(matches!(err, HarnessError::Config { .. }));
    assert!(err.to_string().contains("no_such_target"));
    assert!(!out.exists());

    let (lines, errors) = validate_log_file(&log).unwrap();
    assert!(errors.is_empty());
    assert_eq!(lines, 2);
    assert!(
        std::fs::read_to_string(&log)
            .unwrap()
            .contains("\"event\":\"generate_failed\"")
    );

    let _ = std::fs::remove_dir_all(&dir);
}

#[test]
fn failed_definitions_write_rolls_back_declarations() {
    let dir = scratch("rollback");
    // A directory where the definitions unit should go makes its rename fail.
    std::fs::create_dir_all(dir.join(DEFINITIONS_FILE)).unwrap();

    let units = run_generate(&request("minimal", &scratch("rollback-src")))
        .unwrap()
        .units;
    let err = write_units(&dir, &units).unwrap_err();
    assert!(matches!(err, HarnessError::Io { .. }));
    assert!(!dir.join(DECLARATIONS_FILE).exists());
    assert!(dir.join(DEFINITIONS_FILE).is_dir());
    let leftovers: Vec<_> = std::fs::read_dir(&dir)
        .unwrap()
        .filter_map(Result::ok)
        .filter(|e| e.file_name().to_string_lossy().ends_with(".tmp"))
        .collect();
    assert!(leftovers.is_empty());

    let _ = std::fs::remove_dir_all(&dir);
    let _ = std::fs::remove_dir_all(scratch("rollback-src"));
}

#[test]
fn rollback_restores_previous_declarations() {
    let dir = scratch("restore");
    std::fs::write(dir.join(DECLARATIONS_FILE), "// previous run\n").unwrap();
    std::fs::create_dir_all(dir.join(DEFINITIONS_FILE)).unwrap();

    let units = run_generate(&request("minimal", &scratch("restore-src")))
        .unwrap()
        .units;
    assert!(write_units(&dir, &units).is_err());
    assert_eq!(
        std::fs::read_to_string(dir.join(DECLARATIONS_FILE)).unwrap(),
        "// previous run\n"
    );

    let _ = std::fs::remove_dir_all(&dir);
    let _ = std::fs::remove_dir_all(scratch("restore-src"));
}

#[test]
fn regeneration_is_byte_identical_and_reports_unchanged() {
    let dir = scratch("stable");
    let first = run_generate(&request("frame_timing", &dir)).unwrap();
    let second = run_generate(&request("frame_timing", &dir)).unwrap();
    assert_eq!(first.units, second.units);
    assert!(second.written.files().iter().all(|f| !f.changed));
    let _ = std::fs::remove_dir_all(&dir);
}
