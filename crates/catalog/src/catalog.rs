//! A name-keyed registry of table and index schemas. Thread-safety is not
//! required by the core, but the teacher's components default to interior
//! mutability behind `RwLock` so the registry can be shared freely; this
//! follows that convention.

use crate::catalog_error::CatalogError;
use crate::schema::{ColumnSchema, IndexSchema, TableSchema};
use crate::value::DataType;
use page::page_id::FileId;
use std::collections::HashMap;
use std::sync::atomic::{AtomicU32, Ordering};
use std::sync::{Arc, RwLock};

/// In-memory registry of table and index schemas.
#[derive(Debug, Default)]
pub struct Catalog {
    tables: RwLock<HashMap<String, Arc<TableSchema>>>,
    indexes: RwLock<HashMap<String, Arc<IndexSchema>>>,
    next_file_id: AtomicU32,
}

impl Catalog {
    pub fn new() -> Self {
        Self::default()
    }

    /// Allocates a fresh, never-before-handed-out file id for a new table or
    /// index's backing file.
    pub fn allocate_file_id(&self) -> FileId {
        self.next_file_id.fetch_add(1, Ordering::SeqCst)
    }

    /// Registers `name` with `columns`, backed by `file_id`. Fails if a table
    /// of that name already exists.
    pub fn register_table(
        &self,
        name: impl Into<String>,
        columns: Vec<ColumnSchema>,
        file_id: FileId,
    ) -> Result<Arc<TableSchema>, CatalogError> {
        let name = name.into();
        let mut tables = self.tables.write().unwrap();
        if tables.contains_key(&name) {
            return Err(CatalogError::DuplicateTable(name));
        }
        let schema = Arc::new(TableSchema {
            name: name.clone(),
            columns,
            file_id,
        });
        tracing::info!(table = %name, file_id, "registered table");
        tables.insert(name, Arc::clone(&schema));
        Ok(schema)
    }

    /// Looks up a table's schema by name.
    pub fn lookup_table(&self, name: &str) -> Result<Arc<TableSchema>, CatalogError> {
        self.tables
            .read()
            .unwrap()
            .get(name)
            .cloned()
            .ok_or_else(|| CatalogError::UnknownTable(name.to_string()))
    }

    /// Registers a new index, requiring the indexed column to be INT. Fails
    /// if an index of that name already exists.
    pub fn register_index(
        &self,
        name: impl Into<String>,
        table: impl Into<String>,
        column: impl Into<String>,
        file_id: FileId,
    ) -> Result<Arc<IndexSchema>, CatalogError> {
        let name = name.into();
        let table = table.into();
        let column = column.into();

        let table_schema = self.lookup_table(&table)?;
        let column_schema = table_schema
            .columns
            .iter()
            .find(|c| c.name == column)
            .ok_or_else(|| CatalogError::UnknownColumn {
                table: table.clone(),
                column: column.clone(),
            })?;
        if column_schema.data_type != DataType::Int {
            return Err(CatalogError::IndexNotOnInt { column });
        }

        let mut indexes = self.indexes.write().unwrap();
        if indexes.contains_key(&name) {
            return Err(CatalogError::DuplicateIndex(name));
        }
        let schema = Arc::new(IndexSchema {
            name: name.clone(),
            table,
            column,
            file_id,
        });
        tracing::info!(index = %name, "registered index");
        indexes.insert(name, Arc::clone(&schema));
        Ok(schema)
    }

    /// Looks up an index's schema by name.
    pub fn lookup_index(&self, name: &str) -> Result<Arc<IndexSchema>, CatalogError> {
        self.indexes
            .read()
            .unwrap()
            .get(name)
            .cloned()
            .ok_or_else(|| CatalogError::UnknownIndex(name.to_string()))
    }

    /// All registered index schemas, in no particular order.
    pub fn list_indexes(&self) -> Vec<Arc<IndexSchema>> {
        self.indexes.read().unwrap().values().cloned().collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn register_then_lookup_table() {
        let catalog = Catalog::new();
        let file_id = catalog.allocate_file_id();
        catalog
            .register_table("students", vec![ColumnSchema::int("id")], file_id)
            .unwrap();
        let schema = catalog.lookup_table("students").unwrap();
        assert_eq!(schema.file_id, file_id);
    }

    #[test]
    fn duplicate_table_name_is_rejected() {
        let catalog = Catalog::new();
        let file_id = catalog.allocate_file_id();
        catalog
            .register_table("students", vec![ColumnSchema::int("id")], file_id)
            .unwrap();
        assert!(matches!(
            catalog.register_table("students", vec![ColumnSchema::int("id")], file_id + 1),
            Err(CatalogError::DuplicateTable(_))
        ));
    }

    #[test]
    fn lookup_unknown_table_fails() {
        let catalog = Catalog::new();
        assert!(matches!(
            catalog.lookup_table("ghost"),
            Err(CatalogError::UnknownTable(_))
        ));
    }

    #[test]
    fn index_on_non_int_column_is_rejected() {
        let catalog = Catalog::new();
        let file_id = catalog.allocate_file_id();
        catalog
            .register_table("students", vec![ColumnSchema::varchar("name", 10)], file_id)
            .unwrap();
        let idx_file = catalog.allocate_file_id();
        assert!(matches!(
            catalog.register_index("name_idx", "students", "name", idx_file),
            Err(CatalogError::IndexNotOnInt { .. })
        ));
    }

    #[test]
    fn register_and_list_indexes() {
        let catalog = Catalog::new();
        let file_id = catalog.allocate_file_id();
        catalog
            .register_table("students", vec![ColumnSchema::int("id")], file_id)
            .unwrap();
        let idx_file = catalog.allocate_file_id();
        catalog
            .register_index("id_idx", "students", "id", idx_file)
            .unwrap();
        assert_eq!(catalog.list_indexes().len(), 1);
    }
}
