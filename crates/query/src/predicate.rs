//! Typed predicates evaluated against a deserialized record. Modeled as a
//! sum type with AND/OR/NOT/Compare/Eq variants rather than a class
//! hierarchy: evaluation is a straight match with short-circuit on AND/OR.

use crate::query_error::QueryError;
use catalog::{ColumnSchema, DataType, Value};

/// The ordering operator carried by a [`Predicate::Comparison`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CompareOp {
    Eq,
    Lt,
    Lte,
    Gt,
    Gte,
}

/// A pure function from a record to a boolean, composed from typed
/// comparisons and boolean connectives.
#[derive(Debug, Clone)]
pub enum Predicate {
    /// Integer ordering comparison; the referenced column must be INT.
    Comparison {
        col_idx: usize,
        op: CompareOp,
        value: i32,
    },
    /// Value equality on INT, BOOLEAN, or VARCHAR.
    Equality { col_idx: usize, expected: Value },
    And(Vec<Predicate>),
    Or(Vec<Predicate>),
    Not(Box<Predicate>),
}

impl Predicate {
    pub fn comparison(
        columns: &[ColumnSchema],
        col_idx: usize,
        op: CompareOp,
        value: i32,
    ) -> Result<Self, QueryError> {
        if columns[col_idx].data_type != DataType::Int {
            return Err(QueryError::PredicateRequiresInt(columns[col_idx].name.clone()));
        }
        Ok(Predicate::Comparison { col_idx, op, value })
    }

    pub fn equality(
        columns: &[ColumnSchema],
        col_idx: usize,
        expected: Value,
    ) -> Result<Self, QueryError> {
        let column = &columns[col_idx];
        if column.data_type != expected.data_type() {
            return Err(QueryError::LiteralTypeMismatch {
                column: column.name.clone(),
                expected: column.data_type,
                actual: expected.data_type(),
            });
        }
        Ok(Predicate::Equality { col_idx, expected })
    }

    pub fn not(inner: Predicate) -> Self {
        Predicate::Not(Box::new(inner))
    }

    /// Evaluates this predicate against `record`, short-circuiting AND/OR.
    pub fn test(&self, record: &[Value]) -> bool {
        match self {
            Predicate::Comparison { col_idx, op, value } => {
                let v = record[*col_idx]
                    .as_int()
                    .expect("comparison predicates only build over INT columns");
                match op {
                    CompareOp::Eq => v == *value,
                    CompareOp::Lt => v < *value,
                    CompareOp::Lte => v <= *value,
                    CompareOp::Gt => v > *value,
                    CompareOp::Gte => v >= *value,
                }
            }
            Predicate::Equality { col_idx, expected } => &record[*col_idx] == expected,
            Predicate::And(children) => children.iter().all(|c| c.test(record)),
            Predicate::Or(children) => children.iter().any(|c| c.test(record)),
            Predicate::Not(inner) => !inner.test(record),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn columns() -> Vec<ColumnSchema> {
        vec![ColumnSchema::int("id"), ColumnSchema::bool("active")]
    }

    #[test]
    fn comparison_rejects_non_int_column() {
        let columns = columns();
        assert!(Predicate::comparison(&columns, 1, CompareOp::Gt, 0).is_err());
    }

    #[test]
    fn equality_rejects_type_mismatch() {
        let columns = columns();
        assert!(Predicate::equality(&columns, 0, Value::Bool(true)).is_err());
    }

    #[test]
    fn and_short_circuits_on_first_false() {
        let columns = columns();
        let p = Predicate::And(vec![
            Predicate::comparison(&columns, 0, CompareOp::Gt, 100).unwrap(),
            Predicate::comparison(&columns, 0, CompareOp::Lt, 0).unwrap(),
        ]);
        assert!(!p.test(&[Value::Int(5), Value::Bool(true)]));
    }

    #[test]
    fn or_and_not_compose() {
        let columns = columns();
        let p = Predicate::Or(vec![
            Predicate::equality(&columns, 1, Value::Bool(true)).unwrap(),
            Predicate::not(Predicate::comparison(&columns, 0, CompareOp::Lt, 2).unwrap()),
        ]);
        assert!(p.test(&[Value::Int(1), Value::Bool(true)]));
        assert!(p.test(&[Value::Int(5), Value::Bool(false)]));
        assert!(!p.test(&[Value::Int(1), Value::Bool(false)]));
    }
}
