//! Host services the view controller needs from its environment: blocking
//! dialogs and a single persisted "active section" slot.

use serde::{Deserialize, Serialize};
use std::{fs, path::PathBuf};
use tracing::{error, warn};

pub trait Prompt {
    fn alert(&mut self, message: &str);
    fn confirm(&mut self, question: &str) -> bool;
}

pub trait SectionStore {
    fn load(&self) -> Option<String>;
    fn save(&mut self, section: &str);
}

#[derive(Debug, Default, Clone)]
pub struct MemoryStore {
    section: Option<String>,
}

impl MemoryStore {
    pub fn with_section(section: impl Into<String>) -> Self {
        Self {
            section: Some(section.into()),
        }
    }
}

impl SectionStore for MemoryStore {
    fn load(&self) -> Option<String> {
        self.section.clone()
    }

    fn save(&mut self, section: &str) {
        self.section = Some(section.to_string());
    }
}

#[derive(Debug, Default, Serialize, Deserialize)]
struct StoredState {
    #[serde(rename = "activeSection", default)]
    active_section: Option<String>,
}

/// Keeps the active section in a small JSON file so it survives restarts.
#[derive(Debug, Clone)]
pub struct FileStore {
    path: PathBuf,
}

impl FileStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }
}

impl SectionStore for FileStore {
    fn load(&self) -> Option<String> {
        let bytes = match fs::read(&self.path) {
            Ok(bytes) => bytes,
            Err(err) if err.kind() == std::io::ErrorKind::NotFound => return None,
            Err(err) => {
                error!("failed to read section store: {err}");
                return None;
            }
        };
        match serde_json::from_slice::<StoredState>(&bytes) {
            Ok(state) => state.active_section,
            Err(err) => {
                warn!("ignoring corrupt section store: {err}");
                None
            }
        }
    }

    fn save(&mut self, section: &str) {
        let state = StoredState {
            active_section: Some(section.to_string()),
        };
        let result = serde_json::to_vec(&state)
            .map_err(std::io::Error::from)
            .and_then(|payload| fs::write(&self.path, payload));
        if let Err(err) = result {
            error!("failed to write section store: {err}");
        }
    }
}
