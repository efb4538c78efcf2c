//! The pull-based (Volcano-style) physical operator pipeline. Every operator
//! shares an `open`/`next`/`close` lifecycle and exposes the schema of the
//! rows it produces.

use crate::predicate::Predicate;
use crate::query_error::QueryError;
use crate::row::Row;
use catalog::{ColumnSchema, TableSchema, Value};
use file::api::FileManager;
use index::IndexManager;
use std::collections::{HashMap, VecDeque};
use std::sync::Arc;
use storage_api::{Rid, StorageManager};

/// A node in the physical operator tree.
pub trait Operator {
    /// Prepares the operator to be pulled from. Must be called exactly once
    /// before `next`.
    fn open(&mut self) -> Result<(), QueryError>;

    /// Returns the next row, or `None` once exhausted.
    fn next(&mut self) -> Result<Option<Row>, QueryError>;

    /// Releases any resources acquired by `open`. Idempotent.
    fn close(&mut self) -> Result<(), QueryError>;

    /// The schema of rows this operator produces, known without opening it.
    fn schema(&self) -> Arc<Vec<ColumnSchema>>;
}

/// Full table scan, in heap insertion order (page id ascending, then slot id
/// ascending within a page).
pub struct SeqScanOperator<F: FileManager> {
    storage: Arc<StorageManager<F>>,
    table_schema: Arc<TableSchema>,
    schema: Arc<Vec<ColumnSchema>>,
    rows: VecDeque<(Rid, Vec<u8>)>,
}

impl<F: FileManager> SeqScanOperator<F> {
    pub fn new(storage: Arc<StorageManager<F>>, table_schema: Arc<TableSchema>) -> Self {
        let schema = Arc::new(table_schema.columns.clone());
        Self {
            storage,
            table_schema,
            schema,
            rows: VecDeque::new(),
        }
    }
}

impl<F: FileManager> Operator for SeqScanOperator<F> {
    fn open(&mut self) -> Result<(), QueryError> {
        let mut rows = VecDeque::new();
        self.storage
            .scan(self.table_schema.file_id, |rid, bytes| rows.push_back((rid, bytes.to_vec())))?;
        self.rows = rows;
        Ok(())
    }

    fn next(&mut self) -> Result<Option<Row>, QueryError> {
        let Some((rid, bytes)) = self.rows.pop_front() else {
            return Ok(None);
        };
        let record = catalog::record::deserialize(&bytes, &self.table_schema.columns)?;
        Ok(Some(Row {
            record,
            rid,
            schema: Arc::clone(&self.schema),
        }))
    }

    fn close(&mut self) -> Result<(), QueryError> {
        self.rows.clear();
        Ok(())
    }

    fn schema(&self) -> Arc<Vec<ColumnSchema>> {
        Arc::clone(&self.schema)
    }
}

/// Which RIDs an [`IndexScanOperator`] pulls from its tree.
#[derive(Debug, Clone, Copy)]
pub enum IndexScanMode {
    Eq(i32),
    Range(i32, i32),
}

/// Resolves matching RIDs from an index's B+ tree, then reads each record.
pub struct IndexScanOperator<F: FileManager> {
    index_manager: Arc<IndexManager<F>>,
    storage: Arc<StorageManager<F>>,
    index_name: String,
    mode: IndexScanMode,
    schema: Arc<Vec<ColumnSchema>>,
    table_schema: Option<Arc<TableSchema>>,
    rids: VecDeque<Rid>,
}

impl<F: FileManager> IndexScanOperator<F> {
    pub fn new(
        index_manager: Arc<IndexManager<F>>,
        storage: Arc<StorageManager<F>>,
        index_name: String,
        mode: IndexScanMode,
        schema: Arc<Vec<ColumnSchema>>,
    ) -> Self {
        Self {
            index_manager,
            storage,
            index_name,
            mode,
            schema,
            table_schema: None,
            rids: VecDeque::new(),
        }
    }
}

impl<F: FileManager> Operator for IndexScanOperator<F> {
    fn open(&mut self) -> Result<(), QueryError> {
        self.table_schema = Some(self.index_manager.table_of(&self.index_name)?);
        let rids = match self.mode {
            IndexScanMode::Eq(key) => self.index_manager.search_rids(&self.index_name, key)?,
            IndexScanMode::Range(lo, hi) => {
                self.index_manager.range_search_rids(&self.index_name, lo, hi)?
            }
        };
        self.rids = rids.into();
        Ok(())
    }

    fn next(&mut self) -> Result<Option<Row>, QueryError> {
        let Some(rid) = self.rids.pop_front() else {
            return Ok(None);
        };
        let table_schema = self
            .table_schema
            .as_ref()
            .expect("open must run before next");
        let bytes = self.storage.read(rid)?;
        let record = catalog::record::deserialize(&bytes, &table_schema.columns)?;
        Ok(Some(Row {
            record,
            rid,
            schema: Arc::clone(&self.schema),
        }))
    }

    fn close(&mut self) -> Result<(), QueryError> {
        self.rids.clear();
        Ok(())
    }

    fn schema(&self) -> Arc<Vec<ColumnSchema>> {
        Arc::clone(&self.schema)
    }
}

/// Emits the first row of each child pull for which the predicate holds.
pub struct FilterOperator {
    child: Box<dyn Operator>,
    predicate: Predicate,
}

impl FilterOperator {
    pub fn new(child: Box<dyn Operator>, predicate: Predicate) -> Self {
        Self { child, predicate }
    }
}

impl Operator for FilterOperator {
    fn open(&mut self) -> Result<(), QueryError> {
        self.child.open()
    }

    fn next(&mut self) -> Result<Option<Row>, QueryError> {
        loop {
            match self.child.next()? {
                None => return Ok(None),
                Some(row) if self.predicate.test(&row.record) => return Ok(Some(row)),
                Some(_) => continue,
            }
        }
    }

    fn close(&mut self) -> Result<(), QueryError> {
        self.child.close()
    }

    fn schema(&self) -> Arc<Vec<ColumnSchema>> {
        self.child.schema()
    }
}

/// Rebuilds each row to hold only the configured column indices.
pub struct ProjectionOperator {
    child: Box<dyn Operator>,
    col_indices: Vec<usize>,
    schema: Arc<Vec<ColumnSchema>>,
}

impl ProjectionOperator {
    pub fn new(child: Box<dyn Operator>, col_indices: Vec<usize>) -> Self {
        let child_schema = child.schema();
        let schema = Arc::new(
            col_indices
                .iter()
                .map(|&i| child_schema[i].clone())
                .collect(),
        );
        Self {
            child,
            col_indices,
            schema,
        }
    }
}

impl Operator for ProjectionOperator {
    fn open(&mut self) -> Result<(), QueryError> {
        self.child.open()
    }

    fn next(&mut self) -> Result<Option<Row>, QueryError> {
        let Some(row) = self.child.next()? else {
            return Ok(None);
        };
        let record = self
            .col_indices
            .iter()
            .map(|&i| row.record[i].clone())
            .collect();
        Ok(Some(Row {
            record,
            rid: row.rid,
            schema: Arc::clone(&self.schema),
        }))
    }

    fn close(&mut self) -> Result<(), QueryError> {
        self.child.close()
    }

    fn schema(&self) -> Arc<Vec<ColumnSchema>> {
        Arc::clone(&self.schema)
    }
}

/// Inner equi-join: materializes the right child into a hash map keyed by
/// its join column, then streams the left child against it. Output RID is
/// the left row's RID; joined rows must not be used to drive base-table
/// deletes.
pub struct JoinOperator {
    left: Box<dyn Operator>,
    right: Box<dyn Operator>,
    left_col: usize,
    right_col: usize,
    schema: Arc<Vec<ColumnSchema>>,
    right_buckets: HashMap<Value, Vec<catalog::Record>>,
    current_left: Option<Row>,
    current_matches: VecDeque<catalog::Record>,
}

impl JoinOperator {
    pub fn new(left: Box<dyn Operator>, right: Box<dyn Operator>, left_col: usize, right_col: usize) -> Self {
        let schema = Arc::new(
            left.schema()
                .iter()
                .chain(right.schema().iter())
                .cloned()
                .collect(),
        );
        Self {
            left,
            right,
            left_col,
            right_col,
            schema,
            right_buckets: HashMap::new(),
            current_left: None,
            current_matches: VecDeque::new(),
        }
    }
}

impl Operator for JoinOperator {
    fn open(&mut self) -> Result<(), QueryError> {
        self.left.open()?;
        if let Err(e) = self.right.open() {
            let _ = self.left.close();
            return Err(e);
        }

        let mut buckets: HashMap<Value, Vec<catalog::Record>> = HashMap::new();
        loop {
            match self.right.next() {
                Ok(Some(row)) => {
                    buckets
                        .entry(row.record[self.right_col].clone())
                        .or_default()
                        .push(row.record);
                }
                Ok(None) => break,
                Err(e) => {
                    let _ = self.right.close();
                    let _ = self.left.close();
                    return Err(e);
                }
            }
        }

        self.right.close()?;
        self.right_buckets = buckets;
        Ok(())
    }

    fn next(&mut self) -> Result<Option<Row>, QueryError> {
        loop {
            if let Some(right_record) = self.current_matches.pop_front() {
                let left_row = self
                    .current_left
                    .as_ref()
                    .expect("current_matches is only populated alongside current_left");
                let mut record = left_row.record.clone();
                record.extend(right_record);
                return Ok(Some(Row {
                    record,
                    rid: left_row.rid,
                    schema: Arc::clone(&self.schema),
                }));
            }

            match self.left.next()? {
                None => return Ok(None),
                Some(left_row) => {
                    let key = left_row.record[self.left_col].clone();
                    self.current_matches = self
                        .right_buckets
                        .get(&key)
                        .cloned()
                        .unwrap_or_default()
                        .into();
                    self.current_left = Some(left_row);
                }
            }
        }
    }

    fn close(&mut self) -> Result<(), QueryError> {
        self.left.close()
    }

    fn schema(&self) -> Arc<Vec<ColumnSchema>> {
        Arc::clone(&self.schema)
    }
}
