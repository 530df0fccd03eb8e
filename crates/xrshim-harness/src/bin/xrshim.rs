//! CLI entrypoint for xrshim generation tooling.

use std::path::PathBuf;

use clap::{Parser, Subcommand};
use xrshim_core::ApiProfile;
use xrshim_harness::determinism::{DEFAULT_RUNS, verify_determinism};
use xrshim_harness::structured_log::LogEmitter;
use xrshim_harness::{GenerateRequest, SelectionReport, load_config, load_registry, run_generate};

/// Interception shim generator for OpenXR API layers.
#[derive(Debug, Parser)]
#[command(name = "xrshim")]
#[command(about = "Generate OpenXR API-layer interception shims")]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Debug, Subcommand)]
enum Command {
    /// Generate the declarations and definitions units for one target.
    Generate {
        /// Registry JSON path.
        #[arg(long)]
        registry: PathBuf,
        /// Layer configuration JSON path.
        #[arg(long)]
        config: PathBuf,
        /// Target name inside the configuration.
        #[arg(long)]
        target: String,
        /// Directory receiving both generated units.
        #[arg(long)]
        out_dir: PathBuf,
        /// Structured JSONL run log.
        #[arg(long)]
        log: Option<PathBuf>,
        /// Artifact index JSON path.
        #[arg(long)]
        artifact_index: Option<PathBuf>,
    },
    /// Generate repeatedly and compare unit digests.
    VerifyDeterminism {
        /// Registry JSON path.
        #[arg(long)]
        registry: PathBuf,
        /// Layer configuration JSON path.
        #[arg(long)]
        config: PathBuf,
        /// Targets to check (repeatable; all targets if omitted).
        #[arg(long)]
        target: Vec<String>,
        /// Generations per target.
        #[arg(long, default_value_t = DEFAULT_RUNS)]
        runs: u32,
        /// Report JSON path (if omitted, prints to stdout).
        #[arg(long)]
        output: Option<PathBuf>,
        /// Structured JSONL log.
        #[arg(long)]
        log: Option<PathBuf>,
    },
    /// Show which fragments each selected command receives.
    Selection {
        /// Registry JSON path.
        #[arg(long)]
        registry: PathBuf,
        /// Layer configuration JSON path.
        #[arg(long)]
        config: PathBuf,
        /// Target name inside the configuration.
        #[arg(long)]
        target: String,
        /// Print JSON instead of a table.
        #[arg(long)]
        json: bool,
    },
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();
    let profile = ApiProfile::openxr();

    match cli.command {
        Command::Generate {
            registry,
            config,
            target,
            out_dir,
            log,
            artifact_index,
        } => {
            let mut request = GenerateRequest::new(registry, config, target, out_dir);
            if let Some(log) = log {
                request = request.with_log(log);
            }
            if let Some(index) = artifact_index {
                request = request.with_artifact_index(index);
            }
            let outcome = run_generate(&request)?;
            for file in outcome.written.files() {
                let state = if file.changed { "wrote" } else { "unchanged" };
                eprintln!("{state} {} (sha256 {})", file.path.display(), file.sha256);
            }
        }
        Command::VerifyDeterminism {
            registry,
            config,
            target,
            runs,
            output,
            log,
        } => {
            let registry = load_registry(&registry, &profile)?;
            let config = load_config(&config)?;
            let mut emitter = match &log {
                Some(path) => Some(LogEmitter::to_file(path, "xrshim-determinism", "all")?),
                None => None,
            };
            let report =
                verify_determinism(&registry, &config, &target, runs, &profile, emitter.as_mut())?;
            if let Some(emitter) = emitter.as_mut() {
                emitter.flush()?;
            }
            let json = report.to_json()?;
            match output {
                Some(path) => std::fs::write(&path, json)?,
                None => println!("{json}"),
            }
            if !report.passed() {
                return Err(format!(
                    "determinism gate failed for {} of {} targets",
                    report.summary.failed, report.summary.targets
                )
                .into());
            }
        }
        Command::Selection {
            registry,
            config,
            target,
            json,
        } => {
            let registry = load_registry(&registry, &profile)?;
            let layer_config = load_config(&config)?;
            let set = layer_config
                .target(&target)
                .map_err(|source| xrshim_harness::HarnessError::Config {
                    path: config.clone(),
                    source,
                })?;
            let report = SelectionReport::build(&registry, &target, set, &profile)?;
            if json {
                println!("{}", serde_json::to_string_pretty(&report)?);
            } else {
                print!("{}", report.render_plain());
            }
        }
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_generate() {
        let cli = Cli::try_parse_from([
            "xrshim",
            "generate",
            "--registry",
            "registry/openxr_core.json",
            "--config",
            "layer_apis.json",
            "--target",
            "novendor",
            "--out-dir",
            "out",
        ])
        .unwrap();
        match cli.command {
            Command::Generate {
                target, log, out_dir, ..
            } => {
                assert_eq!(target, "novendor");
                assert_eq!(out_dir, PathBuf::from("out"));
                assert!(log.is_none());
            }
            other => panic!("unexpected command: {other:?}"),
        }
    }

    #[test]
    fn verify_determinism_defaults_and_repeats() {
        let cli = Cli::try_parse_from([
            "xrshim",
            "verify-determinism",
            "--registry",
            "r.json",
            "--config",
            "c.json",
            "--target",
            "minimal",
            "--target",
            "novendor",
        ])
        .unwrap();
        match cli.command {
            Command::VerifyDeterminism { target, runs, .. } => {
                assert_eq!(target, ["minimal", "novendor"]);
                assert_eq!(runs, DEFAULT_RUNS);
            }
            other => panic!("unexpected command: {other:?}"),
        }
    }

    #[test]
    fn generate_requires_target_and_out_dir() {
        assert!(
            Cli::try_parse_from(["xrshim", "generate", "--registry", "r", "--config", "c"])
                .is_err()
        );
        assert!(Cli::try_parse_from(["xrshim", "frobnicate"]).is_err());
    }

    #[test]
    fn selection_json_flag() {
        let cli = Cli::try_parse_from([
            "xrshim", "selection", "--registry", "r", "--config", "c", "--target", "t", "--json",
        ])
        .unwrap();
        assert!(matches!(cli.command, Command::Selection { json: true, .. }));
    }
}
