//! Determinism proof gate.
//!
//! Every target is generated several times from the same inputs. Each run works
//! on a fresh deep copy of the registry and configuration, and the SHA-256 of
//! both units must match the first run exactly. Any difference is reported per
//! run and per unit.

use serde::Serialize;
use xrshim_core::{ApiProfile, LayerConfig, Registry, generate};

use crate::error::HarnessError;
use crate::structured_log::{LogEmitter, LogLevel, Outcome, now_utc};
use crate::writer::sha256_hex;

pub const DEFAULT_RUNS: u32 = 3;

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct TargetDeterminism {
    pub target: String,
    pub runs: u32,
    pub input_fingerprint: String,
    pub declarations_sha256: String,
    pub definitions_sha256: String,
    pub mismatches: Vec<String>,
}

impl TargetDeterminism {
    #[must_use]
    pub fn passed(&self) -> bool {
        self.mismatches.is_empty()
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct DeterminismSummary {
    pub targets: usize,
    pub passed: usize,
    pub failed: usize,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct DeterminismReport {
    pub schema_version: &'static str,
    pub generated_at: String,
    pub api: String,
    pub version: String,
    pub summary: DeterminismSummary,
    pub targets: Vec<TargetDeterminism>,
}

impl DeterminismReport {
    #[must_use]
    pub fn passed(&self) -> bool {
        self.summary.failed == 0
    }

    pub fn to_json(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string_pretty(self)
    }
}

fn check_target(
    registry: &Registry,
    config: &LayerConfig,
    target: &str,
    runs: u32,
    profile: &ApiProfile,
) -> Result<TargetDeterminism, HarnessError> {
    let set = config.target(target).map_err(xrshim_core::GenerateError::from)?;
    let baseline = generate(registry, set, profile)?;
    let mut result = TargetDeterminism {
        target: target.to_string(),
        runs: runs.max(1),
        input_fingerprint: baseline.fingerprint.clone(),
        declarations_sha256: sha256_hex(baseline.declarations.as_bytes()),
        definitions_sha256: sha256_hex(baseline.definitions.as_bytes()),
        mismatches: Vec::new(),
    };

    for run in 1..result.runs {
        let registry_copy = registry.clone();
        let set_copy = set.clone();
        let units = generate(&registry_copy, &set_copy, profile)?;
        for (unit, expected, actual) in [
            ("declarations", &result.declarations_sha256, &units.declarations),
            ("definitions", &result.definitions_sha256, &units.definitions),
        ] {
            let digest = sha256_hex(actual.as_bytes());
            if &digest != expected {
                result
                    .mismatches
                    .push(format!("run {run}: {unit} sha256 {digest} != {expected}"));
            }
        }
        if units.fingerprint != result.input_fingerprint {
            result.mismatches.push(format!(
                "run {run}: input fingerprint {} != {}",
                units.fingerprint, result.input_fingerprint
            ));
        }
    }
    Ok(result)
}

/// Generate each of `targets` (all targets when empty) `runs` times.
///
/// Generation errors abort the gate; they are not determinism failures.
pub fn verify_determinism(
    registry: &Registry,
    config: &LayerConfig,
    targets: &[String],
    runs: u32,
    profile: &ApiProfile,
    mut log: Option<&mut LogEmitter>,
) -> Result<DeterminismReport, HarnessError> {
    let names: Vec<String> = if targets.is_empty() {
        config.target_names().map(str::to_string).collect()
    } else {
        targets.to_vec()
    };

    let mut results = Vec::with_capacity(names.len());
    for name in &names {
        let result = check_target(registry, config, name, runs, profile)?;
        if let Some(emitter) = log.as_deref_mut() {
            let outcome = if result.passed() {
                Outcome::Pass
            } else {
                Outcome::Fail
            };
            let level = if result.passed() {
                LogLevel::Info
            } else {
                LogLevel::Error
            };
            let entry = emitter
                .entry(level, "determinism_checked")
                .with_target(name.clone())
                .with_outcome(outcome)
                .with_details(serde_json::json!({
                    "runs": result.runs,
                    "declarations_sha256": result.declarations_sha256,
                    "definitions_sha256": result.definitions_sha256,
                    "mismatches": result.mismatches,
                }));
            emitter
                .emit_entry(entry)
                .map_err(|e| HarnessError::io("<log>", e))?;
        }
        results.push(result);
    }

    let passed = results.iter().filter(|r| r.passed()).count();
    Ok(DeterminismReport {
        schema_version: "v1",
        generated_at: now_utc(),
        api: registry.api.clone(),
        version: registry.version.clone(),
        summary: DeterminismSummary {
            targets: results.len(),
            passed,
            failed: results.len() - passed,
        },
        targets: results,
    })
}
