//! JSON file store.
//!
//! Layout under the data directory:
//! - `config.json` holds the reference configuration
//! - `calculations/<name>.json` holds one saved calculation each

use std::io::ErrorKind;
use std::path::{Component, Path, PathBuf};

use serde::{de::DeserializeOwned, Serialize};
use tokio::fs;
use tracing::{debug, warn};
use uuid::Uuid;

use crate::error::StoreError;
use crate::pnl::models::{ReferenceConfig, SavedCalculation};

const CONFIG_FILE: &str = "config.json";
const CALCULATIONS_DIR: &str = "calculations";
const EXTENSION: &str = "json";

#[derive(Debug, Clone)]
pub struct FileStore {
    root: PathBuf,
}

impl FileStore {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    fn config_path(&self) -> PathBuf {
        self.root.join(CONFIG_FILE)
    }

    fn calculations_dir(&self) -> PathBuf {
        self.root.join(CALCULATIONS_DIR)
    }

    /// File for a calculation name. The name must be a single plain path
    /// component so the result stays inside `calculations/`.
    fn calculation_path(&self, name: &str) -> Result<PathBuf, StoreError> {
        let mut components = Path::new(name).components();
        match (components.next(), components.next()) {
            (Some(Component::Normal(part)), None)
                if part.to_str() == Some(name) && !name.contains(['/', '\\']) =>
            {
                Ok(self.calculations_dir().join(format!("{name}.{EXTENSION}")))
            }
            _ => Err(StoreError::InvalidKey(name.to_string())),
        }
    }

    pub async fn load_reference_config(&self) -> Result<Option<ReferenceConfig>, StoreError> {
        read_json(&self.config_path()).await
    }

    pub async fn save_reference_config(&self, config: &ReferenceConfig) -> Result<(), StoreError> {
        write_json(&self.config_path(), config).await
    }

    pub async fn save_calculation(&self, calculation: &SavedCalculation) -> Result<(), StoreError> {
        write_json(&self.calculation_path(&calculation.name)?, calculation).await
    }

    pub async fn load_calculation(&self, name: &str) -> Result<Option<SavedCalculation>, StoreError> {
        read_json(&self.calculation_path(name)?).await
    }

    /// All saved calculations, sorted by name.
    ///
    /// A file that cannot be parsed is logged and skipped.
    pub async fn list_calculations(&self) -> Result<Vec<SavedCalculation>, StoreError> {
        let mut entries = match fs::read_dir(self.calculations_dir()).await {
            Ok(entries) => entries,
            Err(e) if e.kind() == ErrorKind::NotFound => return Ok(Vec::new()),
            Err(e) => return Err(e.into()),
        };

        let mut calculations = Vec::new();
        while let Some(entry) = entries.next_entry().await? {
            let path = entry.path();
            if path.extension().and_then(|e| e.to_str()) != Some(EXTENSION) {
                continue;
            }
            match read_json::<SavedCalculation>(&path).await {
                Ok(Some(calculation)) => calculations.push(calculation),
                Ok(None) => {}
                Err(e) => warn!("Skipping unreadable calculation {}: {}", path.display(), e),
            }
        }

        calculations.sort_by(|a, b| a.name.cmp(&b.name));
        Ok(calculations)
    }

    pub async fn delete_calculation(&self, name: &str) -> Result<bool, StoreError> {
        match fs::remove_file(self.calculation_path(name)?).await {
            Ok(()) => Ok(true),
            Err(e) if e.kind() == ErrorKind::NotFound => Ok(false),
            Err(e) => Err(e.into()),
        }
    }
}

async fn read_json<T: DeserializeOwned>(path: &Path) -> Result<Option<T>, StoreError> {
    let data = match fs::read(path).await {
        Ok(data) => data,
        Err(e) if e.kind() == ErrorKind::NotFound => {
            debug!("No file at {}", path.display());
            return Ok(None);
        }
        Err(e) => return Err(e.into()),
    };
    Ok(Some(serde_json::from_slice(&data)?))
}

/// Whole-file overwrite through a temporary sibling, so readers never see
/// a half-written document.
async fn write_json<T: Serialize>(path: &Path, value: &T) -> Result<(), StoreError> {
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent).await?;
    }

    let json = serde_json::to_vec_pretty(value)?;
    let tmp = path.with_extension(format!("{EXTENSION}.{}.tmp", Uuid::new_v4()));
    fs::write(&tmp, json).await?;

    if let Err(e) = fs::rename(&tmp, path).await {
        let _ = fs::remove_file(&tmp).await;
        return Err(e.into());
    }
    Ok(())
}
