use catalog::{ColumnSchema, Record};
use std::sync::Arc;
use storage_api::Rid;

/// One unit flowing through the operator pipeline: a record, the RID it was
/// read from, and the column schema describing its layout at this stage.
#[derive(Debug, Clone)]
pub struct Row {
    pub record: Record,
    pub rid: Rid,
    pub schema: Arc<Vec<ColumnSchema>>,
}

impl Row {
    pub fn column_index(&self, name: &str) -> Option<usize> {
        self.schema.iter().position(|c| c.name == name)
    }
}
