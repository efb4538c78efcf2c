//! # trdb
//!
//! A single-node relational storage engine core: page-oriented heap files,
//! a slotted-page record format, an in-memory B+ tree secondary index, and a
//! pull-based physical execution pipeline behind a thin planner/executor.
//!
//! The crates under `/crates` layer bottom-up:
//!
//! - `page`: the slotted-page record format.
//! - `file`/`buffer`: the file manager and LRU page cache above it.
//! - `storage-api`: heap-file record storage (insert/read/delete/scan).
//! - `catalog`: table/index schemas, the record codec, and the schema registry.
//! - `index`: in-memory B+ tree secondary indexes, kept in sync with storage.
//! - `query`: logical query shapes, the planner, and the operator pipeline.
//!
//! [`Engine`] composes all of the above into a single handle: creating
//! tables and indexes, and running `SELECT`/`INSERT`/`DELETE` through the
//! real operator pipeline.

use catalog::{Catalog, CatalogError, ColumnSchema};
use file::api::FileManager;
use file::file_catalog::FileCatalog;
use index::{IndexError, IndexManager};
use page::page_id::FileId;
use query::{DeleteQuery, InsertQuery, Outcome, QueryError, QueryProcessor, RowIter, SelectQuery};
use std::sync::Arc;
use storage_api::StorageError;
use thiserror::Error;

/// Errors surfaced by [`Engine`], composing every layer's own error type.
#[derive(Debug, Error)]
pub enum EngineError {
    #[error(transparent)]
    Catalog(#[from] CatalogError),

    #[error(transparent)]
    Storage(#[from] StorageError),

    #[error(transparent)]
    Index(#[from] IndexError),

    #[error(transparent)]
    Query(#[from] QueryError),
}

/// A storage engine instance, generic over the file manager backing it
/// (typically [`file::disk_file_manager::DiskFileManager`] in production,
/// [`file::in_memory_file_manager::InMemoryFileManager`] in tests).
#[derive(Debug)]
pub struct Engine<F: FileManager> {
    catalog: Arc<Catalog>,
    storage: Arc<storage_api::StorageManager<F>>,
    index_manager: Arc<IndexManager<F>>,
    processor: QueryProcessor<F>,
}

impl<F: FileManager> Engine<F> {
    /// Builds an engine over a fresh file manager, caching up to
    /// `buffer_capacity` pages at once.
    pub fn new(file_catalog: Arc<FileCatalog>, buffer_capacity: usize) -> Self {
        let file_manager = Arc::new(F::new(file_catalog));
        Self::with_file_manager(file_manager, buffer_capacity)
    }

    /// Builds an engine over an already-constructed file manager.
    pub fn with_file_manager(file_manager: Arc<F>, buffer_capacity: usize) -> Self {
        let catalog = Arc::new(Catalog::new());
        let storage = Arc::new(storage_api::StorageManager::new(file_manager, buffer_capacity));
        let index_manager = Arc::new(IndexManager::new(Arc::clone(&catalog), Arc::clone(&storage)));
        let processor = QueryProcessor::new(Arc::clone(&catalog), Arc::clone(&storage), Arc::clone(&index_manager));
        Self {
            catalog,
            storage,
            index_manager,
            processor,
        }
    }

    /// Allocates a file id for a table or index not yet registered. The
    /// caller must arrange for the backing [`file::file_catalog::FileCatalog`]
    /// to resolve it to a path before the first read or write, when `F`
    /// needs one (it doesn't, for an in-memory file manager).
    pub fn allocate_file_id(&self) -> FileId {
        self.catalog.allocate_file_id()
    }

    /// Registers a new table under `file_id` and allocates its (empty)
    /// backing heap file. `file_id` is normally obtained from
    /// [`Engine::allocate_file_id`].
    pub fn create_table(&self, name: &str, columns: Vec<ColumnSchema>, file_id: FileId) -> Result<(), EngineError> {
        self.catalog.register_table(name, columns, file_id)?;
        self.storage.create_table(file_id)?;
        Ok(())
    }

    /// Registers a new INT-valued secondary index and builds it from a full
    /// scan of the table's existing rows.
    pub fn create_index(&self, name: &str, table: &str, column: &str) -> Result<(), EngineError> {
        self.index_manager.create_index(name, table, column)?;
        Ok(())
    }

    /// Plans and runs a `SELECT`, returning a lazy row iterator.
    pub fn select(&self, query: &SelectQuery) -> Result<RowIter, EngineError> {
        Ok(self.processor.select(query)?)
    }

    /// Validates, serializes, and appends a row, keeping every index on the
    /// table current.
    pub fn insert(&self, query: &InsertQuery) -> Result<Outcome, EngineError> {
        Ok(self.processor.insert(query)?)
    }

    /// Scans a table and deletes every row matching the (optional) WHERE
    /// clause, keeping every index on the table current.
    pub fn delete(&self, query: &DeleteQuery) -> Result<Outcome, EngineError> {
        Ok(self.processor.delete(query)?)
    }

    /// The schema registry backing this engine.
    pub fn catalog(&self) -> &Arc<Catalog> {
        &self.catalog
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use catalog::Value;
    use file::in_memory_file_manager::InMemoryFileManager;
    use query::{Condition, Connector, Literal, Op, WhereClause};

    fn engine() -> Engine<InMemoryFileManager> {
        Engine::new(Arc::new(FileCatalog::new()), 16)
    }

    #[test]
    fn create_insert_select_round_trips() {
        let engine = engine();
        let file_id = engine.allocate_file_id();
        engine
            .create_table(
                "students",
                vec![ColumnSchema::int("id"), ColumnSchema::varchar("name", 20)],
                file_id,
            )
            .unwrap();

        engine
            .insert(&InsertQuery {
                table: "students".to_string(),
                columns: vec!["id".to_string(), "name".to_string()],
                values: vec![Literal::Int(1), Literal::String("Ada".to_string())],
            })
            .unwrap();

        let rows: Vec<_> = engine
            .select(&SelectQuery {
                table: "students".to_string(),
                columns: vec![],
                where_clause: None,
                join: None,
            })
            .unwrap()
            .collect::<Result<_, _>>()
            .unwrap();

        assert_eq!(rows.len(), 1);
        assert_eq!(rows[0].record, vec![Value::Int(1), Value::Varchar("Ada".to_string())]);
    }

    #[test]
    fn index_scan_is_used_for_equality_lookup() {
        let engine = engine();
        let file_id = engine.allocate_file_id();
        engine.create_table("students", vec![ColumnSchema::int("id")], file_id).unwrap();
        for id in 0..10 {
            engine
                .insert(&InsertQuery {
                    table: "students".to_string(),
                    columns: vec!["id".to_string()],
                    values: vec![Literal::Int(id)],
                })
                .unwrap();
        }
        engine.create_index("id_idx", "students", "id").unwrap();

        let where_clause = WhereClause {
            conditions: vec![Condition {
                column: "id".to_string(),
                op: Op::Eq,
                literal: Literal::Int(7),
                negated: false,
            }],
            connectors: vec![],
        };
        let rows: Vec<_> = engine
            .select(&SelectQuery {
                table: "students".to_string(),
                columns: vec![],
                where_clause: Some(where_clause),
                join: None,
            })
            .unwrap()
            .collect::<Result<_, _>>()
            .unwrap();
        assert_eq!(rows.len(), 1);
        assert_eq!(rows[0].record, vec![Value::Int(7)]);
    }

    #[test]
    fn delete_removes_matching_rows_and_updates_index() {
        let engine = engine();
        let file_id = engine.allocate_file_id();
        engine.create_table("students", vec![ColumnSchema::int("id")], file_id).unwrap();
        for id in 0..5 {
            engine
                .insert(&InsertQuery {
                    table: "students".to_string(),
                    columns: vec!["id".to_string()],
                    values: vec![Literal::Int(id)],
                })
                .unwrap();
        }
        engine.create_index("id_idx", "students", "id").unwrap();

        let where_clause = WhereClause {
            conditions: vec![Condition {
                column: "id".to_string(),
                op: Op::Lt,
                literal: Literal::Int(3),
                negated: false,
            }],
            connectors: vec![],
        };
        let outcome = engine
            .delete(&DeleteQuery {
                table: "students".to_string(),
                where_clause: Some(where_clause),
            })
            .unwrap();
        assert_eq!(outcome, Outcome::Deleted { count: 3 });

        let remaining: Vec<_> = engine
            .select(&SelectQuery {
                table: "students".to_string(),
                columns: vec![],
                where_clause: None,
                join: None,
            })
            .unwrap()
            .collect::<Result<_, _>>()
            .unwrap();
        assert_eq!(remaining.len(), 2);
    }

    #[test]
    fn and_or_where_clauses_compile_and_filter() {
        let engine = engine();
        let file_id = engine.allocate_file_id();
        engine.create_table("students", vec![ColumnSchema::int("id")], file_id).unwrap();
        for id in 0..10 {
            engine
                .insert(&InsertQuery {
                    table: "students".to_string(),
                    columns: vec!["id".to_string()],
                    values: vec![Literal::Int(id)],
                })
                .unwrap();
        }

        let where_clause = WhereClause {
            conditions: vec![
                Condition {
                    column: "id".to_string(),
                    op: Op::Eq,
                    literal: Literal::Int(1),
                    negated: false,
                },
                Condition {
                    column: "id".to_string(),
                    op: Op::Eq,
                    literal: Literal::Int(8),
                    negated: false,
                },
            ],
            connectors: vec![Connector::Or],
        };
        let rows: Vec<_> = engine
            .select(&SelectQuery {
                table: "students".to_string(),
                columns: vec![],
                where_clause: Some(where_clause),
                join: None,
            })
            .unwrap()
            .collect::<Result<_, _>>()
            .unwrap();
        assert_eq!(rows.len(), 2);
    }
}
