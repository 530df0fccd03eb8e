//! One generation run: load, generate, write, record.

use std::path::{Path, PathBuf};

use xrshim_core::{ApiProfile, GeneratedUnits, generate};

use crate::error::HarnessError;
use crate::loader::{load_config, load_registry};
use crate::structured_log::{ArtifactIndex, LogEmitter, LogLevel, Outcome};
use crate::writer::{WrittenUnits, write_units};

pub const DEFAULT_RUN_ID: &str = "xrshim-generate";

#[derive(Debug, Clone)]
pub struct GenerateRequest {
    pub registry: PathBuf,
    pub config: PathBuf,
    pub target: String,
    pub out_dir: PathBuf,
    pub profile: ApiProfile,
    pub run_id: String,
    /// JSONL run log.
    pub log: Option<PathBuf>,
    /// Artifact index written after a successful run.
    pub artifact_index: Option<PathBuf>,
}

impl GenerateRequest {
    #[must_use]
    pub fn new(
        registry: impl Into<PathBuf>,
        config: impl Into<PathBuf>,
        target: impl Into<String>,
        out_dir: impl Into<PathBuf>,
    ) -> Self {
        Self {
            registry: registry.into(),
            config: config.into(),
            target: target.into(),
            out_dir: out_dir.into(),
            profile: ApiProfile::openxr(),
            run_id: DEFAULT_RUN_ID.to_string(),
            log: None,
            artifact_index: None,
        }
    }

    #[must_use]
    pub fn with_profile(mut self, profile: ApiProfile) -> Self {
        self.profile = profile;
        self
    }

    #[must_use]
    pub fn with_log(mut self, path: impl Into<PathBuf>) -> Self {
        self.log = Some(path.into());
        self
    }

    #[must_use]
    pub fn with_artifact_index(mut self, path: impl Into<PathBuf>) -> Self {
        self.artifact_index = Some(path.into());
        self
    }
}

#[derive(Debug, Clone)]
pub struct GenerateOutcome {
    pub units: GeneratedUnits,
    pub written: WrittenUnits,
}

fn generate_units(request: &GenerateRequest) -> Result<GeneratedUnits, HarnessError> {
    let registry = load_registry(&request.registry, &request.profile)?;
    let config = load_config(&request.config)?;
    let set = config
        .target(&request.target)
        .map_err(|source| HarnessError::Config {
            path: request.config.clone(),
            source,
        })?;
    Ok(generate(&registry, set, &request.profile)?)
}

fn log_io(path: &Path) -> impl FnOnce(std::io::Error) -> HarnessError + '_ {
    move |e| HarnessError::io(path, e)
}

/// Run one generation. Nothing is written unless generation succeeds.
pub fn run_generate(request: &GenerateRequest) -> Result<GenerateOutcome, HarnessError> {
    let mut emitter = match &request.log {
        Some(path) => Some(
            LogEmitter::to_file(path, &request.run_id, &request.target).map_err(log_io(path))?,
        ),
        None => None,
    };
    let log_path = request.log.as_deref().unwrap_or(Path::new("<log>"));

    if let Some(emitter) = emitter.as_mut() {
        let entry = emitter
            .entry(LogLevel::Info, "generate_start")
            .with_details(serde_json::json!({
                "registry": request.registry.display().to_string(),
                "config": request.config.display().to_string(),
                "out_dir": request.out_dir.display().to_string(),
            }));
        emitter.emit_entry(entry).map_err(log_io(log_path))?;
    }

    let result = generate_units(request)
        .and_then(|units| write_units(&request.out_dir, &units).map(|written| (units, written)));

    let (units, written) = match result {
        Ok(done) => done,
        Err(err) => {
            if let Some(emitter) = emitter.as_mut() {
                let entry = emitter
                    .entry(LogLevel::Error, "generate_failed")
                    .with_outcome(Outcome::Fail)
                    .with_details(serde_json::json!({ "error": err.to_string() }));
                emitter.emit_entry(entry).map_err(log_io(log_path))?;
                emitter.flush().map_err(log_io(log_path))?;
            }
            return Err(err);
        }
    };

    if let Some(emitter) = emitter.as_mut() {
        for file in written.files() {
            let entry = emitter
                .entry(LogLevel::Info, "unit_written")
                .with_outcome(Outcome::Pass)
                .with_artifacts(vec![file.path.display().to_string()])
                .with_details(serde_json::json!({
                    "sha256": file.sha256,
                    "size_bytes": file.size_bytes,
                    "changed": file.changed,
                }));
            emitter.emit_entry(entry).map_err(log_io(log_path))?;
        }
        let entry = emitter
            .entry(LogLevel::Info, "generate_done")
            .with_outcome(Outcome::Pass)
            .with_details(serde_json::json!({ "input_fingerprint": units.fingerprint }));
        emitter.emit_entry(entry).map_err(log_io(log_path))?;
        emitter.flush().map_err(log_io(log_path))?;
    }

    if let Some(path) = &request.artifact_index {
        let mut index = ArtifactIndex::new(&request.run_id, &request.target, &units.fingerprint);
        index.add_units(&written);
        std::fs::write(path, index.to_json()?).map_err(log_io(path))?;
    }

    Ok(GenerateOutcome { units, written })
}
