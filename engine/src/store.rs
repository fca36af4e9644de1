use std::fs;
use std::io::Write;
use std::path::{Path, PathBuf};
use std::time::{Duration, Instant};

use chrono::Utc;
use serde_json::{Map, Value};
use thiserror::Error;
use tracing::{debug, warn};

use crate::roster::EnemyRecord;

/// Namespace key the enemy list lives under, both in the local document name
/// and in the room metadata document.
pub const ROSTER_KEY: &str = "sr-enemies";

/// How long the host platform gets to signal readiness before the session
/// permanently falls back to local-only persistence.
pub const PROBE_WINDOW: Duration = Duration::from_secs(3);

#[derive(Debug, Error)]
pub enum StoreError {
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
    #[error("malformed roster document at {path}: {source}")]
    Malformed {
        path: PathBuf,
        source: serde_json::Error,
    },
    #[error("failed to encode roster: {0}")]
    Encode(#[from] serde_json::Error),
}

/// Notification severity, mirrored from the host platform's API.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Severity {
    Success,
    Warning,
    Info,
}

impl Severity {
    pub fn label(self) -> &'static str {
        match self {
            Severity::Success => "SUCCESS",
            Severity::Warning => "WARNING",
            Severity::Info => "INFO",
        }
    }
}

/// A key-value roster backend. `load` returning `Ok(None)` means the backend
/// is reachable but holds no roster yet.
pub trait Backend {
    fn ready(&self) -> bool;
    fn load(&self) -> Result<Option<Vec<EnemyRecord>>, StoreError>;
    fn save(&self, enemies: &[EnemyRecord]) -> Result<(), StoreError>;
}

fn write_atomic(path: &Path, text: &str) -> Result<(), StoreError> {
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent).map_err(|source| StoreError::Write {
            path: parent.to_path_buf(),
            source,
        })?;
    }
    let tmp = path.with_extension("tmp");
    let mut file = fs::File::create(&tmp).map_err(|source| StoreError::Write {
        path: tmp.clone(),
        source,
    })?;
    file.write_all(text.as_bytes())
        .and_then(|_| file.flush())
        .map_err(|source| StoreError::Write {
            path: tmp.clone(),
            source,
        })?;
    fs::rename(&tmp, path).map_err(|source| StoreError::Write {
        path: path.to_path_buf(),
        source,
    })
}

/// Per-machine fallback store: one JSON document under a fixed key in the
/// data directory. Always ready.
#[derive(Debug, Clone)]
pub struct LocalStore {
    path: PathBuf,
}

impl LocalStore {
    pub fn new(data_dir: impl AsRef<Path>) -> Self {
        Self {
            path: data_dir.as_ref().join(format!("{ROSTER_KEY}.json")),
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl Backend for LocalStore {
    fn ready(&self) -> bool {
        true
    }

    fn load(&self) -> Result<Option<Vec<EnemyRecord>>, StoreError> {
        if !self.path.exists() {
            return Ok(None);
        }
        let text = fs::read_to_string(&self.path).map_err(|source| StoreError::Read {
            path: self.path.clone(),
            source,
        })?;
        let enemies = serde_json::from_str(&text).map_err(|source| StoreError::Malformed {
            path: self.path.clone(),
            source,
        })?;
        Ok(Some(enemies))
    }

    fn save(&self, enemies: &[EnemyRecord]) -> Result<(), StoreError> {
        let text = serde_json::to_string(enemies)?;
        write_atomic(&self.path, &text)
    }
}

/// Shared room metadata on the host platform, modeled as a JSON metadata
/// document inside a host-provided room directory. The enemy list lives under
/// the fixed namespace key; foreign keys are preserved on save.
#[derive(Debug, Clone)]
pub struct RoomStore {
    dir: PathBuf,
}

impl RoomStore {
    pub fn new(room_dir: impl AsRef<Path>) -> Self {
        Self {
            dir: room_dir.as_ref().to_path_buf(),
        }
    }

    fn metadata_path(&self) -> PathBuf {
        self.dir.join("metadata.json")
    }

    fn read_metadata(&self) -> Result<Map<String, Value>, StoreError> {
        let path = self.metadata_path();
        if !path.exists() {
            return Ok(Map::new());
        }
        let text = fs::read_to_string(&path).map_err(|source| StoreError::Read {
            path: path.clone(),
            source,
        })?;
        serde_json::from_str(&text).map_err(|source| StoreError::Malformed { path, source })
    }

    /// Fire-and-forget room notification; failures are logged, never raised.
    pub fn notify(&self, message: &str, severity: Severity) {
        let line = format!("{} [{}] {}\n", Utc::now().to_rfc3339(), severity.label(), message);
        let path = self.dir.join("notifications.log");
        let result = fs::OpenOptions::new()
            .create(true)
            .append(true)
            .open(&path)
            .and_then(|mut f| f.write_all(line.as_bytes()));
        if let Err(err) = result {
            warn!(?path, %err, "room notification dropped");
        }
    }
}

impl Backend for RoomStore {
    fn ready(&self) -> bool {
        self.dir.is_dir()
    }

    fn load(&self) -> Result<Option<Vec<EnemyRecord>>, StoreError> {
        let metadata = self.read_metadata()?;
        let Some(value) = metadata.get(ROSTER_KEY) else {
            return Ok(None);
        };
        let enemies =
            serde_json::from_value(value.clone()).map_err(|source| StoreError::Malformed {
                path: self.metadata_path(),
                source,
            })?;
        Ok(Some(enemies))
    }

    fn save(&self, enemies: &[EnemyRecord]) -> Result<(), StoreError> {
        let mut metadata = self.read_metadata().unwrap_or_default();
        metadata.insert(ROSTER_KEY.to_string(), serde_json::to_value(enemies)?);
        let text = serde_json::to_string_pretty(&Value::Object(metadata))?;
        write_atomic(&self.metadata_path(), &text)
    }
}

/// Which backing store the session settled on.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Mode {
    /// Still inside the startup probe window.
    Probing,
    /// Host answered in time: loads come from the host, saves mirror to local.
    Host,
    /// Host never answered: local-only for the rest of the session.
    Local,
}

/// Storage selection policy: probe the host within a one-shot window, then
/// either sync through it (mirroring writes locally) or fall back to
/// local-only. The fallback is one-way; the host is never retried.
pub struct Persistence {
    host: Option<Box<dyn Backend>>,
    local: LocalStore,
    mode: Mode,
    deadline: Instant,
}

impl Persistence {
    pub fn new(host: Option<Box<dyn Backend>>, local: LocalStore) -> Self {
        Self::with_probe_window(host, local, PROBE_WINDOW)
    }

    pub fn with_probe_window(
        host: Option<Box<dyn Backend>>,
        local: LocalStore,
        window: Duration,
    ) -> Self {
        let mode = if host.is_some() { Mode::Probing } else { Mode::Local };
        Self {
            host,
            local,
            mode,
            deadline: Instant::now() + window,
        }
    }

    pub fn mode(&self) -> Mode {
        self.mode
    }

    pub fn is_host(&self) -> bool {
        self.mode == Mode::Host
    }

    /// Drive the one-shot probe from the event loop. Returns the settled mode
    /// on the tick where the decision lands, `None` on every other call.
    pub fn poll_probe(&mut self) -> Option<Mode> {
        if self.mode != Mode::Probing {
            return None;
        }
        if self.host.as_ref().is_some_and(|h| h.ready()) {
            debug!("host answered readiness probe");
            self.mode = Mode::Host;
            return Some(Mode::Host);
        }
        if Instant::now() >= self.deadline {
            debug!("probe window elapsed, falling back to local storage");
            self.mode = Mode::Local;
            self.host = None;
            return Some(Mode::Local);
        }
        None
    }

    /// Settle immediately: a single readiness check instead of the timed
    /// window. Used by headless entry points.
    pub fn resolve_now(&mut self) -> Mode {
        if self.mode == Mode::Probing {
            if self.host.as_ref().is_some_and(|h| h.ready()) {
                self.mode = Mode::Host;
            } else {
                self.mode = Mode::Local;
                self.host = None;
            }
        }
        self.mode
    }

    /// Load the roster from whichever store answered. Failures degrade
    /// host → local → empty; they are logged, never raised.
    pub fn load(&self) -> Vec<EnemyRecord> {
        if self.mode == Mode::Host {
            if let Some(host) = &self.host {
                match host.load() {
                    Ok(Some(enemies)) => return enemies,
                    Ok(None) => return Vec::new(),
                    Err(err) => warn!(%err, "host load failed, falling back to local"),
                }
            }
        }
        match self.local.load() {
            Ok(Some(enemies)) => enemies,
            Ok(None) => Vec::new(),
            Err(err) => {
                warn!(%err, "local load failed, starting empty");
                Vec::new()
            }
        }
    }

    /// Persist the roster. A failed host write is logged and falls through;
    /// the local mirror is always written.
    pub fn save(&self, enemies: &[EnemyRecord]) {
        if self.mode == Mode::Host {
            if let Some(host) = &self.host {
                if let Err(err) = host.save(enemies) {
                    warn!(%err, "host save failed");
                }
            }
        }
        if let Err(err) = self.local.save(enemies) {
            warn!(%err, "local save failed");
        }
    }
}
