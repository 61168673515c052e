// JSON file storage for the workflow engine
// Persists definitions and instances as JSON arrays on local disk

//! # JSON File Storage
//!
//! Layout of the data directory:
//!
//! ```text
//! <data_dir>/
//!   definitions.json   # JSON array of WorkflowDefinition
//!   instances.json     # JSON array of WorkflowInstance
//! ```
//!
//! Both files are loaded into memory when the store is opened. Every save
//! rewrites the affected file: the array is written to a `.tmp` sibling and
//! renamed over the original, so a crash mid-write leaves the previous file
//! intact. The in-memory map is only updated after the rename succeeds.

use std::collections::HashMap;
use std::path::{Path, PathBuf};

use anyhow::Context;
use serde::de::DeserializeOwned;
use serde::Serialize;
use tokio::sync::RwLock;
use tracing::{debug, info};

use super::storage::WorkflowStorage;
use crate::models::{WorkflowDefinition, WorkflowInstance};
use crate::Result;

const DEFINITIONS_FILE: &str = "definitions.json";
const INSTANCES_FILE: &str = "instances.json";

/// File-backed implementation of [`WorkflowStorage`]
pub struct JsonFileStorage {
    dir: PathBuf,
    definitions: RwLock<HashMap<String, WorkflowDefinition>>,
    instances: RwLock<HashMap<String, WorkflowInstance>>,
}

impl JsonFileStorage {
    /// Open (or create) a store rooted at `dir`
    pub async fn open(dir: impl AsRef<Path>) -> Result<Self> {
        let dir = dir.as_ref().to_path_buf();
        tokio::fs::create_dir_all(&dir)
            .await
            .with_context(|| format!("creating data directory {}", dir.display()))?;

        Self::load(dir).await
    }

    /// Open a store whose directory must already exist; nothing is created
    pub async fn open_existing(dir: impl AsRef<Path>) -> Result<Self> {
        let dir = dir.as_ref().to_path_buf();
        let metadata = tokio::fs::metadata(&dir)
            .await
            .with_context(|| format!("opening data directory {}", dir.display()))?;
        if !metadata.is_dir() {
            return Err(anyhow::anyhow!("{} is not a directory", dir.display()).into());
        }

        Self::load(dir).await
    }

    async fn load(dir: PathBuf) -> Result<Self> {
        let definitions: Vec<WorkflowDefinition> = load_array(&dir.join(DEFINITIONS_FILE)).await?;
        let instances: Vec<WorkflowInstance> = load_array(&dir.join(INSTANCES_FILE)).await?;

        info!(
            "📂 Opened JSON storage at {} ({} definitions, {} instances)",
            dir.display(),
            definitions.len(),
            instances.len()
        );

        Ok(Self {
            dir,
            definitions: RwLock::new(
                definitions.into_iter().map(|d| (d.id.clone(), d)).collect(),
            ),
            instances: RwLock::new(instances.into_iter().map(|i| (i.id.clone(), i)).collect()),
        })
    }

    pub fn data_dir(&self) -> &Path {
        &self.dir
    }
}

async fn load_array<T: DeserializeOwned>(path: &Path) -> Result<Vec<T>> {
    match tokio::fs::read(path).await {
        Ok(bytes) if bytes.iter().all(u8::is_ascii_whitespace) => Ok(vec![]),
        Ok(bytes) => Ok(serde_json::from_slice(&bytes)?),
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(vec![]),
        Err(e) => {
            Err(anyhow::Error::new(e).context(format!("reading {}", path.display())).into())
        }
    }
}

/// Write `items` to `path` via a temporary file and an atomic rename
async fn write_array<T: Serialize>(path: &Path, items: Vec<&T>) -> Result<()> {
    let data = serde_json::to_vec_pretty(&items)?;
    let tmp = path.with_extension("json.tmp");

    tokio::fs::write(&tmp, &data)
        .await
        .with_context(|| format!("writing {}", tmp.display()))?;
    tokio::fs::rename(&tmp, path)
        .await
        .with_context(|| format!("replacing {}", path.display()))?;

    debug!("💾 Wrote {} bytes to {}", data.len(), path.display());
    Ok(())
}

/// Values of `map` ordered by `key`
fn sorted_by<T, K: Ord>(map: &HashMap<String, T>, key: impl Fn(&T) -> K) -> Vec<&T> {
    let mut items: Vec<&T> = map.values().collect();
    items.sort_by_key(|item| key(*item));
    items
}

#[async_trait::async_trait]
impl WorkflowStorage for JsonFileStorage {
    async fn save_definition(&self, definition: WorkflowDefinition) -> Result<WorkflowDefinition> {
        let mut definitions = self.definitions.write().await;

        let mut next = definitions.clone();
        next.insert(definition.id.clone(), definition.clone());
        write_array(
            &self.dir.join(DEFINITIONS_FILE),
            sorted_by(&next, |d| (d.created_at, d.id.clone())),
        )
        .await?;

        *definitions = next;
        Ok(definition)
    }

    async fn get_definition(&self, id: &str) -> Result<Option<WorkflowDefinition>> {
        Ok(self.definitions.read().await.get(id).cloned())
    }

    async fn list_definitions(&self) -> Result<Vec<WorkflowDefinition>> {
        Ok(self.definitions.read().await.values().cloned().collect())
    }

    async fn save_instance(&self, instance: WorkflowInstance) -> Result<WorkflowInstance> {
        let mut instances = self.instances.write().await;

        let mut next = instances.clone();
        next.insert(instance.id.clone(), instance.clone());
        write_array(
            &self.dir.join(INSTANCES_FILE),
            sorted_by(&next, |i| (i.created_at, i.id.clone())),
        )
        .await?;

        *instances = next;
        Ok(instance)
    }

    async fn get_instance(&self, id: &str) -> Result<Option<WorkflowInstance>> {
        Ok(self.instances.read().await.get(id).cloned())
    }

    async fn list_instances(&self) -> Result<Vec<WorkflowInstance>> {
        Ok(self.instances.read().await.values().cloned().collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{Action, State, StateId};
    use tempfile::TempDir;

    fn definition() -> WorkflowDefinition {
        WorkflowDefinition::new(
            "Persisted",
            vec![
                State::new("open", "Open").initial(),
                State::new("closed", "Closed").final_state(),
            ],
            vec![Action::new("close", "Close", vec!["open"], "closed")],
        )
    }

    #[tokio::test]
    async fn test_data_survives_reopen() {
        let dir = TempDir::new().unwrap();
        let definition = definition();
        let instance = WorkflowInstance::new(&definition.id, StateId::from("open"));

        {
            let store = JsonFileStorage::open(dir.path()).await.unwrap();
            store.save_definition(definition.clone()).await.unwrap();
            store.save_instance(instance.clone()).await.unwrap();
        }

        let reopened = JsonFileStorage::open(dir.path()).await.unwrap();
        assert_eq!(
            reopened.get_definition(&definition.id).await.unwrap(),
            Some(definition)
        );
        assert_eq!(
            reopened.get_instance(&instance.id).await.unwrap(),
            Some(instance)
        );
    }

    #[tokio::test]
    async fn test_files_use_camel_case_arrays() {
        let dir = TempDir::new().unwrap();
        let store = JsonFileStorage::open(dir.path()).await.unwrap();
        let definition = definition();
        store.save_definition(definition.clone()).await.unwrap();
        store
            .save_instance(WorkflowInstance::new(&definition.id, StateId::from("open")))
            .await
            .unwrap();

        let raw = std::fs::read_to_string(dir.path().join(INSTANCES_FILE)).unwrap();
        let json: serde_json::Value = serde_json::from_str(&raw).unwrap();
        assert!(json.is_array());
        assert_eq!(json[0]["definitionId"], definition.id.as_str());
        assert_eq!(json[0]["currentStateId"], "open");
        assert!(!dir.path().join("instances.json.tmp").exists());
    }

    #[tokio::test]
    async fn test_open_empty_directory() {
        let dir = TempDir::new().unwrap();
        let store = JsonFileStorage::open(dir.path().join("nested")).await.unwrap();

        assert!(store.list_definitions().await.unwrap().is_empty());
        assert!(store.list_instances().await.unwrap().is_empty());
        assert!(store.data_dir().exists());
    }

    #[tokio::test]
    async fn test_open_existing_does_not_create() {
        let dir = TempDir::new().unwrap();
        let missing = dir.path().join("absent");

        assert!(JsonFileStorage::open_existing(&missing).await.is_err());
        assert!(!missing.exists());

        let file = dir.path().join("plain-file");
        std::fs::write(&file, "").unwrap();
        assert!(JsonFileStorage::open_existing(&file).await.is_err());

        let store = JsonFileStorage::open_existing(dir.path()).await.unwrap();
        assert!(store.list_definitions().await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_corrupt_file_is_an_error() {
        let dir = TempDir::new().unwrap();
        std::fs::write(dir.path().join(DEFINITIONS_FILE), "{ not json").unwrap();

        assert!(JsonFileStorage::open(dir.path()).await.is_err());
    }
}
