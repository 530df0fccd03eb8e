//! Code writer: persists both generated units.
//!
//! Both files are staged next to their destination and renamed into place.
//! If the second rename fails the first destination is restored, so a layer
//! crate never sees a declarations unit from one run and a definitions unit
//! from another. Files whose content is already current are left untouched to
//! keep build-script rebuild triggers quiet.

use std::path::{Path, PathBuf};

use serde::Serialize;
use sha2::{Digest, Sha256};
use xrshim_core::GeneratedUnits;

use crate::error::HarnessError;

pub const DECLARATIONS_FILE: &str = "dispatch_decl.gen.rs";
pub const DEFINITIONS_FILE: &str = "dispatch_defs.gen.rs";

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct WrittenFile {
    pub path: PathBuf,
    pub sha256: String,
    pub size_bytes: u64,
    /// False when the destination already held identical content.
    pub changed: bool,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct WrittenUnits {
    pub declarations: WrittenFile,
    pub definitions: WrittenFile,
}

impl WrittenUnits {
    #[must_use]
    pub fn files(&self) -> [&WrittenFile; 2] {
        [&self.declarations, &self.definitions]
    }
}

/// Hex SHA-256 of `bytes`.
#[must_use]
pub fn sha256_hex(bytes: &[u8]) -> String {
    format!("{:x}", Sha256::digest(bytes))
}

struct Staged {
    dest: PathBuf,
    temp: Option<PathBuf>,
    previous: Option<Vec<u8>>,
    file: WrittenFile,
}

fn stage(dir: &Path, name: &str, content: &str) -> Result<Staged, HarnessError> {
    let dest = dir.join(name);
    let previous = std::fs::read(&dest).ok();
    let file = WrittenFile {
        path: dest.clone(),
        sha256: sha256_hex(content.as_bytes()),
        size_bytes: content.len() as u64,
        changed: previous.as_deref() != Some(content.as_bytes()),
    };
    let temp = if file.changed {
        let temp = dir.join(format!(".{name}.tmp"));
        std::fs::write(&temp, content).map_err(|e| HarnessError::io(&temp, e))?;
        Some(temp)
    } else {
        None
    };
    Ok(Staged {
        dest,
        temp,
        previous,
        file,
    })
}

fn discard(staged: &Staged) {
    if let Some(temp) = &staged.temp {
        let _ = std::fs::remove_file(temp);
    }
}

fn commit(staged: &Staged) -> Result<(), HarnessError> {
    match &staged.temp {
        Some(temp) => {
            std::fs::rename(temp, &staged.dest).map_err(|e| HarnessError::io(&staged.dest, e))
        }
        None => Ok(()),
    }
}

fn restore(staged: &Staged) {
    if staged.temp.is_none() {
        return;
    }
    let _ = match &staged.previous {
        Some(previous) => std::fs::write(&staged.dest, previous),
        None => std::fs::remove_file(&staged.dest),
    };
}

/// Write both units into `dir`, all-or-nothing.
pub fn write_units(dir: &Path, units: &GeneratedUnits) -> Result<WrittenUnits, HarnessError> {
    std::fs::create_dir_all(dir).map_err(|e| HarnessError::io(dir, e))?;

    let declarations = stage(dir, DECLARATIONS_FILE, &units.declarations)?;
    let definitions = match stage(dir, DEFINITIONS_FILE, &units.definitions) {
        Ok(staged) => staged,
        Err(err) => {
            discard(&declarations);
            return Err(err);
        }
    };

    if let Err(err) = commit(&declarations) {
        discard(&declarations);
        discard(&definitions);
        return Err(err);
    }
    if let Err(err) = commit(&definitions) {
        discard(&definitions);
        restore(&declarations);
        return Err(err);
    }

    Ok(WrittenUnits {
        declarations: declarations.file,
        definitions: definitions.file,
    })
}
