use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex, OnceLock, PoisonError};

use super::loader::load_file_with;
use super::model::Dataset;
use crate::error::Result;

type Slot = Arc<OnceLock<Arc<Dataset>>>;

/// Load-once store of datasets keyed by source path.
///
/// Each source owns a write-once slot. The first successful load is
/// published into it and every later lookup returns the same `Arc`; readers
/// never observe a partially built dataset. A failed load publishes nothing.
#[derive(Debug, Default)]
pub struct DatasetCache {
    slots: Mutex<HashMap<PathBuf, Slot>>,
}

impl DatasetCache {
    pub fn new() -> Self {
        Self::default()
    }

    /// Return the cached dataset for `path`, loading it on first use.
    pub fn get_or_load(&self, path: &Path, delimiter: u8) -> Result<Arc<Dataset>> {
        let slot = self.slot(path);
        if let Some(dataset) = slot.get() {
            log::debug!("cache hit for {}", path.display());
            return Ok(Arc::clone(dataset));
        }

        // The map lock is not held here, so loads of different sources
        // proceed in parallel. Two racing loads of one source both parse it,
        // and the first to finish wins.
        let loaded = Arc::new(load_file_with(path, delimiter)?);
        Ok(Arc::clone(slot.get_or_init(|| loaded)))
    }

    /// Whether `path` has a published dataset.
    pub fn contains(&self, path: &Path) -> bool {
        self.lock()
            .get(path)
            .is_some_and(|slot| slot.get().is_some())
    }

    /// Number of published datasets.
    pub fn len(&self) -> usize {
        self.lock()
            .values()
            .filter(|slot| slot.get().is_some())
            .count()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    fn slot(&self, path: &Path) -> Slot {
        Arc::clone(self.lock().entry(path.to_path_buf()).or_default())
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, HashMap<PathBuf, Slot>> {
        self.slots.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

#[cfg(test)]
mod tests {
    use std::io::Write;

    use super::*;
    use crate::data::loader::DEFAULT_DELIMITER;

    const CSV: &str = "age;job;education;month;duration;emp.var.rate;cons.conf.idx;euribor3m;y\n\
                       30;admin.;high.school;may;100;1.1;-36.4;4.857;no\n";

    #[test]
    fn second_lookup_returns_the_same_dataset() {
        let mut file = tempfile::Builder::new()
            .suffix(".csv")
            .tempfile()
            .expect("temp file");
        file.write_all(CSV.as_bytes()).expect("write csv");

        let cache = DatasetCache::new();
        assert!(cache.is_empty());

        let first = cache
            .get_or_load(file.path(), DEFAULT_DELIMITER)
            .expect("first load");
        let second = cache
            .get_or_load(file.path(), DEFAULT_DELIMITER)
            .expect("second load");

        assert!(Arc::ptr_eq(&first, &second), "second lookup must not reload");
        assert!(cache.contains(file.path()));
        assert_eq!(cache.len(), 1);
    }

    #[test]
    fn failed_load_is_not_cached() {
        let dir = tempfile::tempdir().expect("temp dir");
        let path = dir.path().join("missing.csv");

        let cache = DatasetCache::new();
        assert!(cache.get_or_load(&path, DEFAULT_DELIMITER).is_err());
        assert!(!cache.contains(&path));

        std::fs::write(&path, CSV).expect("write csv");
        let dataset = cache
            .get_or_load(&path, DEFAULT_DELIMITER)
            .expect("retry after the file appears");
        assert_eq!(dataset.len(), 1);
    }

    #[test]
    fn concurrent_readers_share_one_dataset() {
        let mut file = tempfile::Builder::new()
            .suffix(".csv")
            .tempfile()
            .expect("temp file");
        file.write_all(CSV.as_bytes()).expect("write csv");
        let path = file.path().to_path_buf();

        let cache = Arc::new(DatasetCache::new());
        let handles: Vec<_> = (0..4)
            .map(|_| {
                let cache = Arc::clone(&cache);
                let path = path.clone();
                std::thread::spawn(move || cache.get_or_load(&path, DEFAULT_DELIMITER))
            })
            .collect();

        let loaded: Vec<Arc<Dataset>> = handles
            .into_iter()
            .map(|h| h.join().expect("thread").expect("load"))
            .collect();
        let published = cache.get_or_load(&path, DEFAULT_DELIMITER).expect("load");
        assert!(loaded.iter().all(|d| Arc::ptr_eq(d, &published)));
    }
}
