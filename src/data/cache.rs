use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::SystemTime;

use super::error::LoadError;
use super::loader::load_file;
use super::model::SalesTable;
use crate::config::{DashboardConfig, SalesSchema};

/// Identity of a loaded source. A file rewritten on disk gets a new
/// modification time and therefore a new key.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
struct SourceKey {
    path: PathBuf,
    modified: Option<SystemTime>,
    sheet_name: String,
    schema: SalesSchema,
}

impl SourceKey {
    fn new(path: &Path, config: &DashboardConfig) -> Result<Self, LoadError> {
        let path = path.canonicalize().map_err(|source| {
            if source.kind() == std::io::ErrorKind::NotFound {
                LoadError::NotFound(path.to_path_buf())
            } else {
                LoadError::Io {
                    path: path.to_path_buf(),
                    source,
                }
            }
        })?;
        let modified = std::fs::metadata(&path).and_then(|m| m.modified()).ok();
        Ok(SourceKey {
            path,
            modified,
            sheet_name: config.sheet_name.clone(),
            schema: config.schema.clone(),
        })
    }

    /// Same file, sheet and schema; possibly another version on disk.
    fn same_source(&self, other: &SourceKey) -> bool {
        self.path == other.path
            && self.sheet_name == other.sheet_name
            && self.schema == other.schema
    }
}

/// Memoized [`load_file`]: each source is parsed once per session and the
/// same shared table is handed out on every later request.
#[derive(Debug, Default)]
pub struct DatasetCache {
    tables: HashMap<SourceKey, Arc<SalesTable>>,
}

impl DatasetCache {
    pub fn new() -> Self {
        Self::default()
    }

    /// Return the cached table for `path`, loading it on first use.
    /// Failed loads are not cached.
    pub fn load(
        &mut self,
        path: &Path,
        config: &DashboardConfig,
    ) -> Result<Arc<SalesTable>, LoadError> {
        let key = SourceKey::new(path, config)?;
        if let Some(table) = self.tables.get(&key) {
            log::debug!("Cache hit for {}", key.path.display());
            return Ok(Arc::clone(table));
        }

        log::debug!("Cache miss for {}", key.path.display());
        let table = Arc::new(load_file(&key.path, config)?);
        // Older versions of the same source are stale now; other sheets and
        // schemas of the file stay.
        self.tables.retain(|k, _| !key.same_source(k));
        self.tables.insert(key, Arc::clone(&table));
        log::debug!("{} tables cached", self.len());
        Ok(table)
    }

    /// Drop every cached table.
    pub fn invalidate(&mut self) {
        if !self.is_empty() {
            log::debug!("Dropping {} cached tables", self.len());
        }
        self.tables.clear();
    }

    pub fn len(&self) -> usize {
        self.tables.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tables.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const CSV: &str = "Cidade do comprador,Título,Estado do pagamento,Preço total,Unidades vendidas,Data\n\
                       A,X,Pago,10,1,2024-01-01\n";

    #[test]
    fn only_older_versions_of_a_source_are_evicted() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("vendas.csv");
        std::fs::write(&path, CSV).unwrap();

        let config = DashboardConfig::default();
        let current = SourceKey::new(&path, &config).unwrap();
        let older = SourceKey {
            modified: Some(SystemTime::UNIX_EPOCH),
            ..current.clone()
        };
        let other_sheet = SourceKey {
            sheet_name: "Outra".to_string(),
            ..current.clone()
        };

        let mut cache = DatasetCache::new();
        let stale = Arc::new(SalesTable::from_records(Vec::new()));
        cache.tables.insert(older.clone(), Arc::clone(&stale));
        cache.tables.insert(other_sheet.clone(), stale);

        cache.load(&path, &config).unwrap();
        assert_eq!(cache.len(), 2);
        assert!(cache.tables.contains_key(&current));
        assert!(cache.tables.contains_key(&other_sheet));
        assert!(!cache.tables.contains_key(&older));
    }

    #[test]
    fn second_load_returns_same_table() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("vendas.csv");
        std::fs::write(&path, CSV).unwrap();

        let config = DashboardConfig::default();
        let mut cache = DatasetCache::new();
        let first = cache.load(&path, &config).unwrap();
        let second = cache.load(&path, &config).unwrap();
        assert!(Arc::ptr_eq(&first, &second));
        assert_eq!(cache.len(), 1);
    }

    #[test]
    fn invalidate_forces_reload() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("vendas.csv");
        std::fs::write(&path, CSV).unwrap();

        let config = DashboardConfig::default();
        let mut cache = DatasetCache::new();
        let first = cache.load(&path, &config).unwrap();
        cache.invalidate();
        assert!(cache.is_empty());

        let reloaded = cache.load(&path, &config).unwrap();
        assert!(!Arc::ptr_eq(&first, &reloaded));
        assert_eq!(*first, *reloaded);
    }

    #[test]
    fn errors_are_not_cached() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("vendas.csv");
        let config = DashboardConfig::default();
        let mut cache = DatasetCache::new();

        assert!(matches!(
            cache.load(&path, &config).unwrap_err(),
            LoadError::NotFound(_)
        ));
        assert!(cache.is_empty());

        std::fs::write(&path, CSV).unwrap();
        assert_eq!(cache.load(&path, &config).unwrap().len(), 1);
    }

    #[test]
    fn different_sheet_is_a_different_source() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("vendas.csv");
        std::fs::write(&path, CSV).unwrap();

        let mut cache = DatasetCache::new();
        let a = cache.load(&path, &DashboardConfig::default()).unwrap();
        let other = DashboardConfig {
            sheet_name: "Outra".to_string(),
            ..DashboardConfig::default()
        };
        let b = cache.load(&path, &other).unwrap();
        assert!(!Arc::ptr_eq(&a, &b));
        assert_eq!(cache.len(), 2);

        // Switching back is a hit.
        let again = cache.load(&path, &DashboardConfig::default()).unwrap();
        assert!(Arc::ptr_eq(&a, &again));
    }
}
