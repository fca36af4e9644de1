use std::fs;
use std::path::{Path, PathBuf};

use chrono::Utc;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::roster::{EnemyRecord, fresh_id};

pub const EXPORT_VERSION: &str = "3.0";
pub const DEFAULT_ENCOUNTER: &str = "Exported Enemies";

#[derive(Debug, Error)]
pub enum TransferError {
    #[error("failed to read {path}: {source}")]
    Read {
        path: PathBuf,
        source: std::io::Error,
    },
    #[error("failed to write {path}: {source}")]
    Write {
        path: PathBuf,
        source: std::io::Error,
    },
    #[error("not a roster document: {0}")]
    Malformed(#[from] serde_json::Error),
}

/// How a successfully parsed import is merged into the roster.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ImportMode {
    Replace,
    Append,
}

/// The versioned export document.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RosterDocument {
    pub version: String,
    pub export_date: String,
    pub encounter: String,
    pub enemies: Vec<EnemyRecord>,
}

/// Wrap the roster for export, stamping version and export date.
pub fn export_document(enemies: &[EnemyRecord]) -> RosterDocument {
    RosterDocument {
        version: EXPORT_VERSION.to_string(),
        export_date: Utc::now().to_rfc3339(),
        encounter: DEFAULT_ENCOUNTER.to_string(),
        enemies: enemies.to_vec(),
    }
}

/// Default download name: `sr-enemies-YYYY-MM-DD.json`.
pub fn default_export_filename() -> String {
    format!("sr-enemies-{}.json", Utc::now().format("%Y-%m-%d"))
}

pub fn write_export(path: &Path, enemies: &[EnemyRecord]) -> Result<(), TransferError> {
    let text = serde_json::to_string_pretty(&export_document(enemies))?;
    fs::write(path, text).map_err(|source| TransferError::Write {
        path: path.to_path_buf(),
        source,
    })
}

#[derive(Deserialize)]
#[serde(untagged)]
enum ImportShape {
    Wrapped { enemies: Vec<EnemyRecord> },
    Bare(Vec<EnemyRecord>),
}

/// Parse an uploaded document: either the export wrapper or a bare list of
/// records. Records lacking an id get a fresh one; every missing stat falls
/// back to its field default. Malformed input is an error and must leave the
/// caller's roster untouched.
pub fn parse_import(text: &str) -> Result<Vec<EnemyRecord>, TransferError> {
    let shape: ImportShape = serde_json::from_str(text)?;
    let mut enemies = match shape {
        ImportShape::Wrapped { enemies } => enemies,
        ImportShape::Bare(enemies) => enemies,
    };
    for enemy in &mut enemies {
        if enemy.id.is_empty() {
            enemy.id = fresh_id();
        }
    }
    Ok(enemies)
}

pub fn read_import(path: &Path) -> Result<Vec<EnemyRecord>, TransferError> {
    let text = fs::read_to_string(path).map_err(|source| TransferError::Read {
        path: path.to_path_buf(),
        source,
    })?;
    parse_import(&text)
}
