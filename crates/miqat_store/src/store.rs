use std::collections::HashMap;
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::mpsc::{self, Receiver};

use anyhow::{anyhow, Context, Result};
use chrono::{Datelike, NaiveDate};
use miqat_core::{DayLookup, HabitRecord};
use notify::{RecommendedWatcher, RecursiveMode, Watcher};
use parking_lot::RwLock;
use walkdir::WalkDir;

#[derive(Debug, Clone)]
struct StoredRecord {
    path: PathBuf,
    record: HabitRecord,
}

/// Daily habit records kept as one JSON object per day
/// (`YYYY-MM-DD.json`, habit name -> done) under one or more roots.
pub struct HabitStore {
    roots: Vec<PathBuf>,
    records: RwLock<HashMap<NaiveDate, StoredRecord>>,
    watcher: Option<RecommendedWatcher>,
}

pub struct HabitStoreBuilder {
    roots: Vec<PathBuf>,
}

impl HabitStoreBuilder {
    pub fn new() -> Self {
        Self { roots: Vec::new() }
    }

    /// The first root added also receives newly written records.
    pub fn add_root(mut self, path: impl AsRef<Path>) -> Self {
        let path = path.as_ref().to_path_buf();
        if !self.roots.contains(&path) {
            self.roots.push(path);
        }
        self
    }

    pub fn build(self) -> Result<HabitStore> {
        let store = HabitStore {
            roots: self.roots,
            records: RwLock::new(HashMap::new()),
            watcher: None,
        };
        store.reload_all()?;
        Ok(store)
    }
}

impl Default for HabitStoreBuilder {
    fn default() -> Self {
        Self::new()
    }
}

impl HabitStore {
    pub fn builder() -> HabitStoreBuilder {
        HabitStoreBuilder::new()
    }

    pub fn roots(&self) -> &[PathBuf] {
        &self.roots
    }

    pub fn reload_all(&self) -> Result<()> {
        let mut records = self.records.write();
        records.clear();
        for root in &self.roots {
            Self::ingest_root(&mut records, root)?;
        }
        tracing::debug!(days = records.len(), "habit records loaded");
        Ok(())
    }

    /// Re-reads the file backing `date`, dropping the cached record when no
    /// file for it exists any more.
    pub fn reload_date(&self, date: NaiveDate) -> Result<()> {
        match self.locate(date) {
            Some(path) => {
                let record = load_record(&path)?;
                self.records
                    .write()
                    .insert(date, StoredRecord { path, record });
            }
            None => {
                self.records.write().remove(&date);
            }
        }
        Ok(())
    }

    /// Re-reads one record file, wherever it sits under a root, and returns
    /// the date it belongs to.
    pub fn reload_path(&self, path: &Path) -> Result<NaiveDate> {
        let date = date_from_path(path)
            .ok_or_else(|| anyhow!("{} is not a habit record file", path.display()))?;
        let mut records = self.records.write();
        if path.is_file() {
            let record = load_record(path)?;
            records.insert(
                date,
                StoredRecord {
                    path: path.to_path_buf(),
                    record,
                },
            );
        } else if records.get(&date).is_some_and(|stored| stored.path == path) {
            records.remove(&date);
        }
        Ok(date)
    }

    pub fn dates(&self) -> Vec<NaiveDate> {
        let mut dates: Vec<NaiveDate> = self.records.read().keys().copied().collect();
        dates.sort();
        dates
    }

    pub fn record(&self, date: NaiveDate) -> Option<HabitRecord> {
        self.records
            .read()
            .get(&date)
            .map(|stored| stored.record.clone())
    }

    pub fn put_record(&self, date: NaiveDate, record: HabitRecord) -> Result<()> {
        let path = self.path_for(date)?;
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)?;
        }
        let payload = serde_json::to_string_pretty(&record)?;
        fs::write(&path, payload)
            .with_context(|| format!("writing habit record {}", path.display()))?;
        self.records
            .write()
            .insert(date, StoredRecord { path, record });
        Ok(())
    }

    /// Toggles one habit for `date`, creating the day's record if needed.
    pub fn set_habit(&self, date: NaiveDate, habit: &str, done: bool) -> Result<HabitRecord> {
        let mut record = self.record(date).unwrap_or_default();
        record.set(habit, done);
        self.put_record(date, record.clone())?;
        Ok(record)
    }

    /// Watches the roots and reports the path of every record file that
    /// changes. Callers follow up with [`HabitStore::reload_path`].
    pub fn watch(&mut self) -> Result<Receiver<PathBuf>> {
        let (tx, rx) = mpsc::channel();
        let mut watcher = notify::recommended_watcher(move |res: notify::Result<notify::Event>| {
            match res {
                Ok(event) => {
                    for path in event.paths {
                        if let Some(date) = date_from_path(&path) {
                            tracing::debug!(%date, path = %path.display(), "habit record changed on disk");
                            let _ = tx.send(path);
                        }
                    }
                }
                Err(err) => tracing::warn!(%err, "habit store watcher error"),
            }
        })?;
        for root in &self.roots {
            if root.is_dir() {
                watcher.watch(root, RecursiveMode::Recursive)?;
            }
        }
        self.watcher = Some(watcher);
        Ok(rx)
    }
}

impl DayLookup for HabitStore {
    fn record_for(&self, date: NaiveDate) -> Option<HabitRecord> {
        self.record(date)
    }
}

impl HabitStore {
    fn path_for(&self, date: NaiveDate) -> Result<PathBuf> {
        if let Some(stored) = self.records.read().get(&date) {
            return Ok(stored.path.clone());
        }
        let root = self
            .roots
            .first()
            .ok_or_else(|| anyhow!("habit store has no root to write into"))?;
        Ok(root
            .join(format!("{:04}", date.year()))
            .join(format!("{}.json", date.format("%Y-%m-%d"))))
    }

    /// Existing file for `date`: the cached path, else the year folder or the
    /// root itself of each root in order.
    fn locate(&self, date: NaiveDate) -> Option<PathBuf> {
        if let Some(stored) = self.records.read().get(&date) {
            if stored.path.is_file() {
                return Some(stored.path.clone());
            }
        }
        let name = format!("{}.json", date.format("%Y-%m-%d"));
        self.roots
            .iter()
            .flat_map(|root| {
                [
                    root.join(format!("{:04}", date.year())).join(&name),
                    root.join(&name),
                ]
            })
            .find(|path| path.is_file())
    }

    fn ingest_root(records: &mut HashMap<NaiveDate, StoredRecord>, root: &Path) -> Result<()> {
        if !root.is_dir() {
            tracing::warn!(path = %root.display(), "habit store root is not a directory");
            return Ok(());
        }
        for entry in WalkDir::new(root) {
            let entry = entry?;
            if !entry.file_type().is_file() {
                continue;
            }
            let path = entry.path();
            let Some(date) = date_from_path(path) else {
                continue;
            };
            match load_record(path) {
                Ok(record) => {
                    records.insert(
                        date,
                        StoredRecord {
                            path: path.to_path_buf(),
                            record,
                        },
                    );
                }
                Err(err) => {
                    tracing::warn!(path = %path.display(), %err, "skipping unreadable habit record");
                }
            }
        }
        Ok(())
    }
}

fn load_record(path: &Path) -> Result<HabitRecord> {
    let raw = fs::read_to_string(path)?;
    serde_json::from_str(&raw).with_context(|| format!("parsing {}", path.display()))
}

/// `.../2024-07-07.json` -> 2024-07-07.
fn date_from_path(path: &Path) -> Option<NaiveDate> {
    let is_json = path
        .extension()
        .and_then(|ext| ext.to_str())
        .map(|ext| ext.eq_ignore_ascii_case("json"))
        .unwrap_or(false);
    if !is_json {
        return None;
    }
    let stem = path.file_stem()?.to_str()?;
    NaiveDate::parse_from_str(stem, "%Y-%m-%d").ok()
}
