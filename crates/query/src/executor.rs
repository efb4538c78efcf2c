//! Top-level entry points: `SELECT`/`INSERT`/`DELETE` over the planner and
//! operator pipeline.

use crate::logical::{DeleteQuery, InsertQuery, SelectQuery};
use crate::operator::Operator;
use crate::planner::{literal_to_value, Planner};
use crate::predicate::Predicate;
use crate::query_error::QueryError;
use crate::row::Row;
use catalog::{Catalog, Record};
use file::api::FileManager;
use index::IndexManager;
use std::sync::Arc;
use storage_api::StorageManager;

/// A lazily-opened iterator over a plan's output rows.
///
/// `open` is deferred to the first call to `next` so that building a
/// `RowIter` and never consuming it costs nothing. `close` runs exactly once,
/// either when the plan is exhausted or when this iterator is dropped before
/// that happens.
pub struct RowIter {
    operator: Box<dyn Operator>,
    opened: bool,
    exhausted: bool,
}

impl RowIter {
    fn new(operator: Box<dyn Operator>) -> Self {
        Self {
            operator,
            opened: false,
            exhausted: false,
        }
    }

    fn close(&mut self) -> Result<(), QueryError> {
        if self.opened && !self.exhausted {
            self.exhausted = true;
            self.operator.close()?;
        }
        Ok(())
    }
}

impl Iterator for RowIter {
    type Item = Result<Row, QueryError>;

    fn next(&mut self) -> Option<Self::Item> {
        if self.exhausted {
            return None;
        }
        if !self.opened {
            self.opened = true;
            if let Err(e) = self.operator.open() {
                self.exhausted = true;
                let _ = self.operator.close();
                return Some(Err(e));
            }
        }

        match self.operator.next() {
            Ok(Some(row)) => Some(Ok(row)),
            Ok(None) => {
                if let Err(e) = self.close() {
                    return Some(Err(e));
                }
                None
            }
            Err(e) => {
                self.exhausted = true;
                let _ = self.operator.close();
                Some(Err(e))
            }
        }
    }
}

impl Drop for RowIter {
    fn drop(&mut self) {
        let _ = self.close();
    }
}

/// A diagnostic row returned by `INSERT`/`DELETE` instead of a result set.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Outcome {
    Inserted { rid: String },
    Deleted { count: usize },
}

/// Executes logical queries against a catalog, storage manager, and index
/// manager.
#[derive(Debug)]
pub struct QueryProcessor<F: FileManager> {
    catalog: Arc<Catalog>,
    storage: Arc<StorageManager<F>>,
    index_manager: Arc<IndexManager<F>>,
    planner: Planner<F>,
}

impl<F: FileManager> QueryProcessor<F> {
    pub fn new(
        catalog: Arc<Catalog>,
        storage: Arc<StorageManager<F>>,
        index_manager: Arc<IndexManager<F>>,
    ) -> Self {
        let planner = Planner::new(Arc::clone(&catalog), Arc::clone(&storage), Arc::clone(&index_manager));
        Self {
            catalog,
            storage,
            index_manager,
            planner,
        }
    }

    /// Builds the physical plan for `query` and returns a lazy row iterator.
    pub fn select(&self, query: &SelectQuery) -> Result<RowIter, QueryError> {
        let operator = self.planner.plan_select(query)?;
        Ok(RowIter::new(operator))
    }

    /// Validates, serializes, and appends `query`'s values, notifying every
    /// index on the table.
    pub fn insert(&self, query: &InsertQuery) -> Result<Outcome, QueryError> {
        let table_schema = self.catalog.lookup_table(&query.table)?;

        if query.columns.len() != query.values.len() {
            return Err(QueryError::InsertArityMismatch {
                columns: query.columns.len(),
                values: query.values.len(),
            });
        }
        if query.columns.len() != table_schema.columns.len() {
            return Err(QueryError::MissingColumns {
                table: query.table.clone(),
                supplied: query.columns.len(),
                total: table_schema.columns.len(),
            });
        }

        let mut positioned: Vec<(usize, catalog::Value)> = Vec::with_capacity(table_schema.columns.len());
        let mut supplied = vec![false; table_schema.columns.len()];
        for (column, literal) in query.columns.iter().zip(&query.values) {
            let col_idx = table_schema
                .column_index(column)
                .ok_or_else(|| QueryError::UnknownColumn(column.clone()))?;
            supplied[col_idx] = true;
            positioned.push((col_idx, literal_to_value(literal, table_schema.columns[col_idx].data_type, column)?));
        }
        if supplied.iter().any(|&s| !s) {
            return Err(QueryError::MissingColumns {
                table: query.table.clone(),
                supplied: supplied.iter().filter(|&&s| s).count(),
                total: table_schema.columns.len(),
            });
        }
        positioned.sort_by_key(|(col_idx, _)| *col_idx);
        let record: Record = positioned.into_iter().map(|(_, value)| value).collect();

        catalog::record::validate(&record, &table_schema.columns)?;
        let bytes = catalog::record::serialize(&record)?;
        let rid = self.storage.insert(table_schema.file_id, &bytes)?;
        self.index_manager.on_insert(&query.table, rid, &record)?;
        tracing::debug!(table = %query.table, %rid, "inserted row");

        Ok(Outcome::Inserted { rid: rid.to_string() })
    }

    /// Scans `query`'s table, deleting every row matching its (optional)
    /// WHERE clause and notifying every index on the table.
    pub fn delete(&self, query: &DeleteQuery) -> Result<Outcome, QueryError> {
        let table_schema = self.catalog.lookup_table(&query.table)?;
        let predicate = query
            .where_clause
            .as_ref()
            .map(|w| crate::planner::compile_where(w, &table_schema.columns))
            .transpose()?;

        let mut matches = Vec::new();
        self.storage.scan(table_schema.file_id, |rid, bytes| {
            let Ok(record) = catalog::record::deserialize(bytes, &table_schema.columns) else {
                return;
            };
            if predicate.as_ref().is_none_or(|p: &Predicate| p.test(&record)) {
                matches.push((rid, record));
            }
        })?;

        let mut count = 0;
        for (rid, record) in matches {
            if self.storage.delete(rid)? {
                self.index_manager.on_delete(&query.table, rid, &record)?;
                count += 1;
            }
        }

        tracing::debug!(table = %query.table, count, "deleted rows");
        Ok(Outcome::Deleted { count })
    }
}
