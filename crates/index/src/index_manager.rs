//! Per-column INT index lifecycle: creation (bulk build from a scan) and
//! incremental maintenance via storage insert/delete callbacks.

use crate::btree::BTree;
use crate::index_error::IndexError;
use catalog::{Catalog, Record, TableSchema};
use file::api::FileManager;
use std::collections::HashMap;
use std::sync::{Arc, RwLock};
use storage_api::{Rid, StorageManager};

/// Default node order used by [`IndexManager::create_index`].
pub const DEFAULT_ORDER: usize = 4;

/// Owns every live B+ tree and keeps them in sync with table mutations.
#[derive(Debug)]
pub struct IndexManager<F: FileManager> {
    catalog: Arc<Catalog>,
    storage: Arc<StorageManager<F>>,
    trees: RwLock<HashMap<String, BTree>>,
}

impl<F: FileManager> IndexManager<F> {
    pub fn new(catalog: Arc<Catalog>, storage: Arc<StorageManager<F>>) -> Self {
        Self {
            catalog,
            storage,
            trees: RwLock::new(HashMap::new()),
        }
    }

    /// Registers `name` in the catalog (requiring an INT column) and builds
    /// its tree from a full scan of `table`.
    pub fn create_index(
        &self,
        name: &str,
        table: &str,
        column: &str,
    ) -> Result<(), IndexError> {
        let file_id = self.catalog.allocate_file_id();
        self.catalog.register_index(name, table, column, file_id)?;

        let table_schema = self.catalog.lookup_table(table)?;
        let col_idx = table_schema
            .column_index(column)
            .expect("register_index already validated this column exists");

        let mut rows = Vec::new();
        self.storage
            .scan(table_schema.file_id, |rid, bytes| rows.push((rid, bytes.to_vec())))?;

        let mut tree = BTree::new(DEFAULT_ORDER);
        for (rid, bytes) in rows {
            let record = catalog::record::deserialize(&bytes, &table_schema.columns)?;
            let key = record[col_idx]
                .as_int()
                .ok_or_else(|| IndexError::NonIntegerKey {
                    table: table.to_string(),
                    column: column.to_string(),
                })?;
            tree.insert(key, rid);
        }

        tracing::info!(index = name, table, column, "built index from full scan");
        self.trees.write().unwrap().insert(name.to_string(), tree);
        Ok(())
    }

    /// Point lookup, resolved to full records.
    pub fn lookup(&self, name: &str, key: i32) -> Result<Vec<Record>, IndexError> {
        let rids = self.search_rids(name, key)?;
        self.fetch_all(name, &rids)
    }

    /// Range lookup, resolved to full records.
    pub fn range_lookup(&self, name: &str, lo: i32, hi: i32) -> Result<Vec<Record>, IndexError> {
        let rids = self.range_search_rids(name, lo, hi)?;
        self.fetch_all(name, &rids)
    }

    /// Point lookup, RIDs only.
    pub fn search_rids(&self, name: &str, key: i32) -> Result<Vec<Rid>, IndexError> {
        let trees = self.trees.read().unwrap();
        let tree = trees
            .get(name)
            .ok_or_else(|| IndexError::Catalog(catalog::CatalogError::UnknownIndex(name.to_string())))?;
        Ok(tree.search(key))
    }

    /// Range lookup, RIDs only.
    pub fn range_search_rids(&self, name: &str, lo: i32, hi: i32) -> Result<Vec<Rid>, IndexError> {
        let trees = self.trees.read().unwrap();
        let tree = trees
            .get(name)
            .ok_or_else(|| IndexError::Catalog(catalog::CatalogError::UnknownIndex(name.to_string())))?;
        Ok(tree.range_search(lo, hi))
    }

    /// Looks up the table schema backing `name`.
    pub fn table_of(&self, name: &str) -> Result<Arc<TableSchema>, IndexError> {
        let index_schema = self.catalog.lookup_index(name)?;
        Ok(self.catalog.lookup_table(&index_schema.table)?)
    }

    /// Call after a successful `storage.insert` for `table`: updates every
    /// index whose table matches.
    pub fn on_insert(&self, table: &str, rid: Rid, record: &[catalog::Value]) -> Result<(), IndexError> {
        self.for_each_index_on(table, |col_idx, tree| {
            let key = record[col_idx]
                .as_int()
                .ok_or_else(|| IndexError::NonIntegerKey {
                    table: table.to_string(),
                    column: String::new(),
                })?;
            tree.insert(key, rid);
            Ok(())
        })
    }

    /// Call after a successful `storage.delete` for `table`: updates every
    /// index whose table matches.
    pub fn on_delete(&self, table: &str, rid: Rid, old_record: &[catalog::Value]) -> Result<(), IndexError> {
        self.for_each_index_on(table, |col_idx, tree| {
            let key = old_record[col_idx]
                .as_int()
                .ok_or_else(|| IndexError::NonIntegerKey {
                    table: table.to_string(),
                    column: String::new(),
                })?;
            tree.delete(key, rid);
            Ok(())
        })
    }

    fn for_each_index_on(
        &self,
        table: &str,
        mut apply: impl FnMut(usize, &mut BTree) -> Result<(), IndexError>,
    ) -> Result<(), IndexError> {
        let table_schema = self.catalog.lookup_table(table)?;
        let mut trees = self.trees.write().unwrap();
        for index_schema in self.catalog.list_indexes() {
            if index_schema.table != table {
                continue;
            }
            let Some(tree) = trees.get_mut(&index_schema.name) else {
                continue;
            };
            let col_idx = table_schema
                .column_index(&index_schema.column)
                .expect("a registered index always names an existing column");
            apply(col_idx, tree)?;
        }
        Ok(())
    }

    fn fetch_all(&self, name: &str, rids: &[Rid]) -> Result<Vec<Record>, IndexError> {
        let table_schema = self.table_of(name)?;
        rids.iter()
            .map(|&rid| {
                let bytes = self.storage.read(rid)?;
                Ok(catalog::record::deserialize(&bytes, &table_schema.columns)?)
            })
            .collect()
    }
}
