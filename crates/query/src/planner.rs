//! Maps a logical query into a physical operator tree, recognizing
//! equality/range index plans over a single INT-indexed column.

use crate::logical::{Condition, Connector, Literal, Op, SelectQuery, WhereClause};
use crate::operator::{
    FilterOperator, IndexScanMode, IndexScanOperator, JoinOperator, Operator, ProjectionOperator,
    SeqScanOperator,
};
use crate::predicate::{CompareOp, Predicate};
use crate::query_error::QueryError;
use catalog::{Catalog, ColumnSchema, DataType, TableSchema, Value};
use file::api::FileManager;
use index::IndexManager;
use std::sync::Arc;
use storage_api::StorageManager;

/// Builds physical plans from logical queries.
#[derive(Debug)]
pub struct Planner<F: FileManager> {
    catalog: Arc<Catalog>,
    storage: Arc<StorageManager<F>>,
    index_manager: Arc<IndexManager<F>>,
}

impl<F: FileManager> Planner<F> {
    pub fn new(
        catalog: Arc<Catalog>,
        storage: Arc<StorageManager<F>>,
        index_manager: Arc<IndexManager<F>>,
    ) -> Self {
        Self {
            catalog,
            storage,
            index_manager,
        }
    }

    pub fn plan_select(&self, query: &SelectQuery) -> Result<Box<dyn Operator>, QueryError> {
        let mut root = if let Some(join) = &query.join {
            self.plan_join(query, join)?
        } else {
            self.plan_base_table(query)?
        };

        if !query.columns.is_empty() {
            let schema = root.schema();
            let col_indices = query
                .columns
                .iter()
                .map(|name| {
                    schema
                        .iter()
                        .position(|c| &c.name == name)
                        .ok_or_else(|| QueryError::UnknownColumn(name.clone()))
                })
                .collect::<Result<Vec<_>, _>>()?;
            root = Box::new(ProjectionOperator::new(root, col_indices));
        }

        Ok(root)
    }

    fn plan_join(
        &self,
        query: &SelectQuery,
        join: &crate::logical::JoinSpec,
    ) -> Result<Box<dyn Operator>, QueryError> {
        let left_table = self.catalog.lookup_table(&query.table)?;
        let right_table = self.catalog.lookup_table(&join.right_table)?;

        let left: Box<dyn Operator> =
            Box::new(SeqScanOperator::new(Arc::clone(&self.storage), Arc::clone(&left_table)));
        let right: Box<dyn Operator> =
            Box::new(SeqScanOperator::new(Arc::clone(&self.storage), Arc::clone(&right_table)));

        let left_col = left
            .schema()
            .iter()
            .position(|c| c.name == join.left_column)
            .ok_or_else(|| QueryError::UnknownColumn(join.left_column.clone()))?;
        let right_col = right
            .schema()
            .iter()
            .position(|c| c.name == join.right_column)
            .ok_or_else(|| QueryError::UnknownColumn(join.right_column.clone()))?;

        let mut root: Box<dyn Operator> = Box::new(JoinOperator::new(left, right, left_col, right_col));

        if let Some(where_clause) = &query.where_clause {
            let schema = root.schema();
            let predicate = compile_where(where_clause, &schema)?;
            root = Box::new(FilterOperator::new(root, predicate));
        }

        Ok(root)
    }

    fn plan_base_table(&self, query: &SelectQuery) -> Result<Box<dyn Operator>, QueryError> {
        let table_schema = self.catalog.lookup_table(&query.table)?;

        if let Some(where_clause) = &query.where_clause {
            if let Some(plan) = self.try_index_plan(&table_schema, where_clause)? {
                return Ok(plan);
            }
        }

        let seq: Box<dyn Operator> =
            Box::new(SeqScanOperator::new(Arc::clone(&self.storage), Arc::clone(&table_schema)));

        match &query.where_clause {
            Some(where_clause) => {
                let predicate = compile_where(where_clause, &table_schema.columns)?;
                Ok(Box::new(FilterOperator::new(seq, predicate)))
            }
            None => Ok(seq),
        }
    }

    /// Recognizes an equality or range index plan over a single INT-indexed
    /// column, per the planner rules. Returns `None` to fall back to a
    /// sequential scan plus filter.
    fn try_index_plan(
        &self,
        table_schema: &Arc<TableSchema>,
        where_clause: &WhereClause,
    ) -> Result<Option<Box<dyn Operator>>, QueryError> {
        if let [cond] = where_clause.conditions.as_slice() {
            if !cond.negated && cond.op == Op::Eq {
                if let Literal::Int(value) = cond.literal {
                    if let Some(index_name) = self.find_index(&table_schema.name, &cond.column) {
                        tracing::debug!(table = %table_schema.name, index = %index_name, value, "chose equality index plan");
                        return Ok(Some(self.index_scan(
                            table_schema,
                            index_name,
                            IndexScanMode::Eq(value),
                        )));
                    }
                }
            }
        }

        if !where_clause.connectors.iter().all(|c| *c == Connector::And) {
            return Ok(None);
        }

        let Some((column, low, high)) = aggregate_range_bounds(&where_clause.conditions) else {
            return Ok(None);
        };

        let low = low.unwrap_or(i32::MIN);
        let high = high.unwrap_or(i32::MAX);
        if low == high {
            // A single equality-shaped range: let the equality plan above
            // handle the one-condition case, fall through otherwise.
            return Ok(None);
        }

        let Some(index_name) = self.find_index(&table_schema.name, &column) else {
            return Ok(None);
        };
        let (low, high) = if low > high { (1, 0) } else { (low, high) };
        tracing::debug!(table = %table_schema.name, index = %index_name, low, high, "chose range index plan");
        Ok(Some(self.index_scan(table_schema, index_name, IndexScanMode::Range(low, high))))
    }

    fn index_scan(
        &self,
        table_schema: &Arc<TableSchema>,
        index_name: String,
        mode: IndexScanMode,
    ) -> Box<dyn Operator> {
        Box::new(IndexScanOperator::new(
            Arc::clone(&self.index_manager),
            Arc::clone(&self.storage),
            index_name,
            mode,
            Arc::new(table_schema.columns.clone()),
        ))
    }

    fn find_index(&self, table: &str, column: &str) -> Option<String> {
        self.catalog
            .list_indexes()
            .into_iter()
            .find(|i| i.table == table && i.column == column)
            .map(|i| i.name.clone())
    }
}

/// For a flat AND-only chain, finds the single INT-indexed column all
/// conditions target and the intersected `[low, high]` bound, if the chain
/// is uniform enough to support a range plan.
fn aggregate_range_bounds(conditions: &[Condition]) -> Option<(String, Option<i32>, Option<i32>)> {
    let mut column: Option<&str> = None;
    let mut low: Option<i32> = None;
    let mut high: Option<i32> = None;

    for cond in conditions {
        if cond.negated {
            return None;
        }
        let Literal::Int(value) = cond.literal else {
            return None;
        };
        match column {
            None => column = Some(&cond.column),
            Some(c) if c == cond.column => {}
            Some(_) => return None,
        }

        let (cond_low, cond_high) = match cond.op {
            Op::Gt => (Some(value.saturating_add(1)), None),
            Op::Gte => (Some(value), None),
            Op::Lt => (None, Some(value.saturating_sub(1))),
            Op::Lte => (None, Some(value)),
            Op::Eq => (Some(value), Some(value)),
        };
        low = match (low, cond_low) {
            (Some(a), Some(b)) => Some(a.max(b)),
            (Some(a), None) => Some(a),
            (None, b) => b,
        };
        high = match (high, cond_high) {
            (Some(a), Some(b)) => Some(a.min(b)),
            (Some(a), None) => Some(a),
            (None, b) => b,
        };
    }

    let column = column?;
    if low.is_none() && high.is_none() {
        return None;
    }
    Some((column.to_string(), low, high))
}

/// Compiles a WHERE clause into a single predicate: contiguous AND runs
/// become nested AND groups, which are then OR-ed together.
pub fn compile_where(where_clause: &WhereClause, columns: &[ColumnSchema]) -> Result<Predicate, QueryError> {
    let mut groups: Vec<Vec<Predicate>> = vec![vec![compile_condition(&where_clause.conditions[0], columns)?]];
    for (i, connector) in where_clause.connectors.iter().enumerate() {
        let predicate = compile_condition(&where_clause.conditions[i + 1], columns)?;
        match connector {
            Connector::And => groups.last_mut().expect("groups is never empty").push(predicate),
            Connector::Or => groups.push(vec![predicate]),
        }
    }

    let mut or_children: Vec<Predicate> = groups
        .into_iter()
        .map(|mut group| {
            if group.len() == 1 {
                group.pop().expect("just checked length == 1")
            } else {
                Predicate::And(group)
            }
        })
        .collect();

    Ok(if or_children.len() == 1 {
        or_children.pop().expect("just checked length == 1")
    } else {
        Predicate::Or(or_children)
    })
}

fn compile_condition(cond: &Condition, columns: &[ColumnSchema]) -> Result<Predicate, QueryError> {
    let col_idx = columns
        .iter()
        .position(|c| c.name == cond.column)
        .ok_or_else(|| QueryError::UnknownColumn(cond.column.clone()))?;

    let base = if cond.op == Op::Eq {
        let expected = literal_to_value(&cond.literal, columns[col_idx].data_type, &cond.column)?;
        Predicate::equality(columns, col_idx, expected)?
    } else {
        let Literal::Int(value) = cond.literal else {
            return Err(QueryError::PredicateRequiresInt(cond.column.clone()));
        };
        Predicate::comparison(columns, col_idx, compare_op(cond.op), value)?
    };

    Ok(if cond.negated { Predicate::not(base) } else { base })
}

fn compare_op(op: Op) -> CompareOp {
    match op {
        Op::Eq => CompareOp::Eq,
        Op::Lt => CompareOp::Lt,
        Op::Lte => CompareOp::Lte,
        Op::Gt => CompareOp::Gt,
        Op::Gte => CompareOp::Gte,
    }
}

/// Converts a parser literal into a typed value, checking it against the
/// column's declared type.
pub fn literal_to_value(literal: &Literal, expected: DataType, column: &str) -> Result<Value, QueryError> {
    match (literal, expected) {
        (Literal::Int(v), DataType::Int) => Ok(Value::Int(*v)),
        (Literal::Bool(v), DataType::Bool) => Ok(Value::Bool(*v)),
        (Literal::String(v), DataType::Varchar) => Ok(Value::Varchar(v.clone())),
        (literal, expected) => Err(QueryError::LiteralTypeMismatch {
            column: column.to_string(),
            expected,
            actual: match literal {
                Literal::Int(_) => DataType::Int,
                Literal::Bool(_) => DataType::Bool,
                Literal::String(_) => DataType::Varchar,
            },
        }),
    }
}
