use std::{
    cmp::Reverse,
    fs::{self, File},
    io::Write,
    path::{Path, PathBuf},
    sync::Arc,
};

use async_trait::async_trait;
use chrono::{DateTime, NaiveDateTime, Utc};
use serde::{Deserialize, Serialize};
use tokio::sync::Mutex;
use uuid::Uuid;

use crate::core::time::{Clock, SystemClock};

use super::{sort_for_query, RecordQuery, RecordStore, Result, StoreError, StoredSale};

pub const STORE_SCHEMA_VERSION: u8 = 1;

const STORE_FILE: &str = "sales.json";
const BACKUP_DIR: &str = "backups";
const BACKUP_EXTENSION: &str = "json";
const BACKUP_PREFIX: &str = "sales";
const BACKUP_TIMESTAMP_FORMAT: &str = "%Y%m%d_%H%M%S";
const TMP_SUFFIX: &str = "tmp";
const DEFAULT_RETENTION: usize = 5;

#[derive(Debug, Clone, Serialize, Deserialize)]
struct StoreDocument {
    #[serde(default = "StoreDocument::schema_version_default")]
    schema_version: u8,
    #[serde(default)]
    sales: Vec<StoredSale>,
}

impl StoreDocument {
    fn schema_version_default() -> u8 {
        STORE_SCHEMA_VERSION
    }
}

impl Default for StoreDocument {
    fn default() -> Self {
        Self {
            schema_version: STORE_SCHEMA_VERSION,
            sales: Vec::new(),
        }
    }
}

/// Describes a rotated copy of the store file.
#[derive(Debug, Clone)]
pub struct BackupInfo {
    pub name: String,
    pub path: PathBuf,
    pub created_at: Option<DateTime<Utc>>,
}

/// Filesystem-backed JSON record store. All sales live in one document that is
/// rewritten atomically; the previous version is rotated into `backups/` first.
pub struct JsonRecordStore {
    path: PathBuf,
    backups_dir: PathBuf,
    retention: usize,
    clock: Arc<dyn Clock>,
    write_lock: Mutex<()>,
}

impl JsonRecordStore {
    pub fn new(root: PathBuf, retention: Option<usize>) -> Result<Self> {
        Self::with_clock(root, retention, Arc::new(SystemClock))
    }

    pub fn with_clock(
        root: PathBuf,
        retention: Option<usize>,
        clock: Arc<dyn Clock>,
    ) -> Result<Self> {
        fs::create_dir_all(&root)?;
        let backups_dir = root.join(BACKUP_DIR);
        fs::create_dir_all(&backups_dir)?;
        Ok(Self {
            path: root.join(STORE_FILE),
            backups_dir,
            retention: retention.unwrap_or(DEFAULT_RETENTION).max(1),
            clock,
            write_lock: Mutex::new(()),
        })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Backups ordered newest first.
    pub fn list_backups(&self) -> Result<Vec<BackupInfo>> {
        if !self.backups_dir.exists() {
            return Ok(Vec::new());
        }
        let mut entries = Vec::new();
        for entry in fs::read_dir(&self.backups_dir)? {
            let path = entry?.path();
            if path.extension().and_then(|ext| ext.to_str()) != Some(BACKUP_EXTENSION) {
                continue;
            }
            let Some(name) = path.file_name().and_then(|name| name.to_str()) else {
                continue;
            };
            entries.push(BackupInfo {
                name: name.to_string(),
                created_at: parse_backup_timestamp(name),
                path: path.clone(),
            });
        }
        entries.sort_by_key(|info| Reverse(info.created_at));
        Ok(entries)
    }

    fn read_document(&self) -> Result<StoreDocument> {
        if !self.path.exists() {
            return Ok(StoreDocument::default());
        }
        let data = fs::read_to_string(&self.path)?;
        let document: StoreDocument = serde_json::from_str(&data)?;
        if document.schema_version > STORE_SCHEMA_VERSION {
            return Err(StoreError::Corrupt(format!(
                "`{}` uses schema v{} but only v{} is supported",
                self.path.display(),
                document.schema_version,
                STORE_SCHEMA_VERSION
            )));
        }
        Ok(document)
    }

    fn write_document(&self, document: &StoreDocument) -> Result<()> {
        self.backup_existing_file()?;
        let json = serde_json::to_string_pretty(document)?;
        let tmp = tmp_path(&self.path);
        write_atomic(&tmp, &json)?;
        fs::rename(&tmp, &self.path)?;
        Ok(())
    }

    fn backup_existing_file(&self) -> Result<()> {
        if !self.path.exists() {
            return Ok(());
        }
        fs::create_dir_all(&self.backups_dir)?;
        let timestamp = self.clock.now().format(BACKUP_TIMESTAMP_FORMAT);
        let backup_path = self
            .backups_dir
            .join(format!("{BACKUP_PREFIX}_{timestamp}.{BACKUP_EXTENSION}"));
        fs::copy(&self.path, &backup_path)?;
        self.prune_backups()
    }

    fn prune_backups(&self) -> Result<()> {
        let backups = self.list_backups()?;
        for entry in backups.iter().skip(self.retention) {
            if let Err(err) = fs::remove_file(&entry.path) {
                tracing::warn!(path = %entry.path.display(), error = %err, "failed to prune backup");
            }
        }
        Ok(())
    }
}

#[async_trait]
impl RecordStore for JsonRecordStore {
    async fn find(&self, query: &RecordQuery) -> Result<Vec<StoredSale>> {
        let _guard = self.write_lock.lock().await;
        let document = self.read_document()?;
        Ok(sort_for_query(document.sales, query))
    }

    async fn get(&self, id: Uuid) -> Result<Option<StoredSale>> {
        let _guard = self.write_lock.lock().await;
        let document = self.read_document()?;
        Ok(document.sales.into_iter().find(|sale| sale.id == Some(id)))
    }

    async fn save(&self, mut sale: StoredSale) -> Result<StoredSale> {
        let _guard = self.write_lock.lock().await;
        let mut document = self.read_document()?;
        let now = self.clock.now();
        match sale.id {
            Some(id) => {
                let existing = document
                    .sales
                    .iter_mut()
                    .find(|stored| stored.id == Some(id))
                    .ok_or(StoreError::Missing(id))?;
                sale.created_at = existing.created_at.or(Some(now));
                sale.updated_at = Some(now);
                *existing = sale.clone();
            }
            None => {
                sale.id = Some(Uuid::new_v4());
                sale.created_at = Some(now);
                sale.updated_at = Some(now);
                document.sales.push(sale.clone());
            }
        }
        self.write_document(&document)?;
        Ok(sale)
    }

    async fn destroy(&self, id: Uuid) -> Result<()> {
        let _guard = self.write_lock.lock().await;
        let mut document = self.read_document()?;
        let before = document.sales.len();
        document.sales.retain(|sale| sale.id != Some(id));
        if document.sales.len() == before {
            return Err(StoreError::Missing(id));
        }
        self.write_document(&document)
    }
}

fn parse_backup_timestamp(name: &str) -> Option<DateTime<Utc>> {
    let stem = name.strip_suffix(&format!(".{BACKUP_EXTENSION}"))?;
    let raw = stem.strip_prefix(&format!("{BACKUP_PREFIX}_"))?;
    NaiveDateTime::parse_from_str(raw, BACKUP_TIMESTAMP_FORMAT)
        .ok()
        .map(|naive| DateTime::from_naive_utc_and_offset(naive, Utc))
}

fn tmp_path(path: &Path) -> PathBuf {
    let mut tmp = path.to_path_buf();
    let ext = match path.extension().and_then(|ext| ext.to_str()) {
        Some(existing) => format!("{}.{}", existing, TMP_SUFFIX),
        None => TMP_SUFFIX.to_string(),
    };
    tmp.set_extension(ext);
    tmp
}

fn write_atomic(path: &Path, data: &str) -> Result<()> {
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent)?;
    }
    let mut file = File::create(path)?;
    file.write_all(data.as_bytes())?;
    file.flush()?;
    Ok(())
}
