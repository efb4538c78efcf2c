//! End-to-end tests against `DiskFileManager`: every table lives in a real
//! file under a `tempfile` scratch directory, exercising the same create/
//! insert/select/delete/join paths the unit tests cover against the
//! in-memory file manager, but through real page I/O.

use catalog::{ColumnSchema, Value};
use file::disk_file_manager::DiskFileManager;
use file::file_catalog::FileCatalog;
use query::{Condition, Connector, DeleteQuery, InsertQuery, JoinSpec, Literal, Op, Outcome, SelectQuery, WhereClause};
use std::sync::Arc;
use trdb::Engine;

#[test]
fn heap_round_trip_on_disk() {
    let dir = tempfile::tempdir().expect("failed to create temp dir");
    let file_catalog = Arc::new(FileCatalog::new());
    let engine: Engine<DiskFileManager> = Engine::new(Arc::clone(&file_catalog), 16);

    let file_id = engine.allocate_file_id();
    file_catalog.add_file(file_id, dir.path().join("students.tbl"));
    engine
        .create_table(
            "students",
            vec![
                ColumnSchema::int("id"),
                ColumnSchema::varchar("name", 50),
                ColumnSchema::bool("active"),
            ],
            file_id,
        )
        .expect("create_table failed");

    for (id, name, active) in [(1, "Alice", true), (2, "Bob", false), (2, "Bobby", true)] {
        engine
            .insert(&InsertQuery {
                table: "students".to_string(),
                columns: vec!["id".to_string(), "name".to_string(), "active".to_string()],
                values: vec![Literal::Int(id), Literal::String(name.to_string()), Literal::Bool(active)],
            })
            .expect("insert failed");
    }

    let rows: Vec<_> = engine
        .select(&SelectQuery {
            table: "students".to_string(),
            columns: vec![],
            where_clause: None,
            join: None,
        })
        .expect("select failed")
        .collect::<Result<_, _>>()
        .expect("row read failed");
    assert_eq!(rows.len(), 3);
    assert_eq!(
        rows[1].record,
        vec![Value::Int(2), Value::Varchar("Bob".to_string()), Value::Bool(false)]
    );

    let bob_rid = rows[1].rid;
    let outcome = engine
        .delete(&DeleteQuery {
            table: "students".to_string(),
            where_clause: Some(WhereClause {
                conditions: vec![Condition {
                    column: "name".to_string(),
                    op: Op::Eq,
                    literal: Literal::String("Bob".to_string()),
                    negated: false,
                }],
                connectors: vec![],
            }),
        })
        .expect("delete failed");
    assert_eq!(outcome, Outcome::Deleted { count: 1 });
    let _ = bob_rid;

    let remaining: Vec<_> = engine
        .select(&SelectQuery {
            table: "students".to_string(),
            columns: vec![],
            where_clause: None,
            join: None,
        })
        .expect("select failed")
        .collect::<Result<_, _>>()
        .expect("row read failed");
    assert_eq!(remaining.len(), 2);
    assert_eq!(remaining[0].record[1], Value::Varchar("Alice".to_string()));
    assert_eq!(remaining[1].record[1], Value::Varchar("Bobby".to_string()));
}

#[test]
fn indexed_equality_lookup_survives_a_delete_on_disk() {
    let dir = tempfile::tempdir().expect("failed to create temp dir");
    let file_catalog = Arc::new(FileCatalog::new());
    let engine: Engine<DiskFileManager> = Engine::new(Arc::clone(&file_catalog), 16);

    let file_id = engine.allocate_file_id();
    file_catalog.add_file(file_id, dir.path().join("students.tbl"));
    engine
        .create_table(
            "students",
            vec![ColumnSchema::int("id"), ColumnSchema::varchar("name", 50)],
            file_id,
        )
        .expect("create_table failed");

    for (id, name) in [(1, "Alice"), (2, "Bob"), (2, "Bobby")] {
        engine
            .insert(&InsertQuery {
                table: "students".to_string(),
                columns: vec!["id".to_string(), "name".to_string()],
                values: vec![Literal::Int(id), Literal::String(name.to_string())],
            })
            .expect("insert failed");
    }
    engine.create_index("id_idx", "students", "id").expect("create_index failed");

    let lookup = |engine: &Engine<DiskFileManager>| -> Vec<String> {
        engine
            .select(&SelectQuery {
                table: "students".to_string(),
                columns: vec![],
                where_clause: Some(WhereClause {
                    conditions: vec![Condition {
                        column: "id".to_string(),
                        op: Op::Eq,
                        literal: Literal::Int(2),
                        negated: false,
                    }],
                    connectors: vec![],
                }),
                join: None,
            })
            .expect("select failed")
            .map(|row| match &row.expect("row read failed").record[..] {
                [Value::Int(_), Value::Varchar(name)] => name.clone(),
                other => panic!("unexpected row shape: {other:?}"),
            })
            .collect()
    };

    assert_eq!(lookup(&engine), vec!["Bob".to_string(), "Bobby".to_string()]);

    engine
        .delete(&DeleteQuery {
            table: "students".to_string(),
            where_clause: Some(WhereClause {
                conditions: vec![Condition {
                    column: "name".to_string(),
                    op: Op::Eq,
                    literal: Literal::String("Bob".to_string()),
                    negated: false,
                }],
                connectors: vec![],
            }),
        })
        .expect("delete failed");

    assert_eq!(lookup(&engine), vec!["Bobby".to_string()]);
}

#[test]
fn range_plan_over_an_index_on_disk() {
    let dir = tempfile::tempdir().expect("failed to create temp dir");
    let file_catalog = Arc::new(FileCatalog::new());
    let engine: Engine<DiskFileManager> = Engine::new(Arc::clone(&file_catalog), 16);

    let file_id = engine.allocate_file_id();
    file_catalog.add_file(file_id, dir.path().join("students.tbl"));
    engine
        .create_table("students", vec![ColumnSchema::int("id")], file_id)
        .expect("create_table failed");
    for id in 0..50 {
        engine
            .insert(&InsertQuery {
                table: "students".to_string(),
                columns: vec!["id".to_string()],
                values: vec![Literal::Int(id)],
            })
            .expect("insert failed");
    }
    engine.create_index("id_idx", "students", "id").expect("create_index failed");

    let rows: Vec<i32> = engine
        .select(&SelectQuery {
            table: "students".to_string(),
            columns: vec![],
            where_clause: Some(WhereClause {
                conditions: vec![
                    Condition {
                        column: "id".to_string(),
                        op: Op::Gte,
                        literal: Literal::Int(5),
                        negated: false,
                    },
                    Condition {
                        column: "id".to_string(),
                        op: Op::Lte,
                        literal: Literal::Int(12),
                        negated: false,
                    },
                ],
                connectors: vec![Connector::And],
            }),
            join: None,
        })
        .expect("select failed")
        .map(|row| match row.expect("row read failed").record[0] {
            Value::Int(id) => id,
            _ => panic!("expected an int"),
        })
        .collect();

    assert_eq!(rows, (5..=12).collect::<Vec<_>>());
}

#[test]
fn inner_join_cardinality_and_projection_on_disk() {
    let dir = tempfile::tempdir().expect("failed to create temp dir");
    let file_catalog = Arc::new(FileCatalog::new());
    let engine: Engine<DiskFileManager> = Engine::new(Arc::clone(&file_catalog), 16);

    let students_id = engine.allocate_file_id();
    file_catalog.add_file(students_id, dir.path().join("students.tbl"));
    engine
        .create_table(
            "students",
            vec![
                ColumnSchema::int("id"),
                ColumnSchema::varchar("name", 50),
                ColumnSchema::bool("active"),
            ],
            students_id,
        )
        .expect("create_table failed");
    for (id, name, active) in [(1, "Alice", true), (2, "Bob", false), (2, "Bobby", true), (3, "Eve", true)] {
        engine
            .insert(&InsertQuery {
                table: "students".to_string(),
                columns: vec!["id".to_string(), "name".to_string(), "active".to_string()],
                values: vec![Literal::Int(id), Literal::String(name.to_string()), Literal::Bool(active)],
            })
            .expect("insert failed");
    }

    let enrollments_id = engine.allocate_file_id();
    file_catalog.add_file(enrollments_id, dir.path().join("enrollments.tbl"));
    engine
        .create_table(
            "enrollments",
            vec![
                ColumnSchema::int("eid"),
                ColumnSchema::int("student_id"),
                ColumnSchema::varchar("course", 20),
            ],
            enrollments_id,
        )
        .expect("create_table failed");
    for (eid, student_id, course) in [
        (100, 1, "Math"),
        (101, 1, "Physics"),
        (102, 2, "Chem"),
        (103, 2, "Bio"),
        (104, 3, "Math"),
    ] {
        engine
            .insert(&InsertQuery {
                table: "enrollments".to_string(),
                columns: vec!["eid".to_string(), "student_id".to_string(), "course".to_string()],
                values: vec![Literal::Int(eid), Literal::Int(student_id), Literal::String(course.to_string())],
            })
            .expect("insert failed");
    }

    let join = Some(JoinSpec {
        right_table: "enrollments".to_string(),
        left_column: "id".to_string(),
        right_column: "student_id".to_string(),
    });

    let all_rows: Vec<_> = engine
        .select(&SelectQuery {
            table: "students".to_string(),
            columns: vec![],
            where_clause: None,
            join: join.clone(),
        })
        .expect("select failed")
        .collect::<Result<Vec<_>, _>>()
        .expect("row read failed");
    assert_eq!(all_rows.len(), 7);
    assert_eq!(all_rows[0].record.len(), 6);

    let projected: Vec<_> = engine
        .select(&SelectQuery {
            table: "students".to_string(),
            columns: vec!["name".to_string(), "course".to_string()],
            where_clause: Some(WhereClause {
                conditions: vec![Condition {
                    column: "active".to_string(),
                    op: Op::Eq,
                    literal: Literal::Bool(true),
                    negated: false,
                }],
                connectors: vec![],
            }),
            join,
        })
        .expect("select failed")
        .collect::<Result<Vec<_>, _>>()
        .expect("row read failed");
    assert_eq!(projected.len(), 5);
    for row in &projected {
        assert_eq!(row.record.len(), 2);
    }
}

#[test]
fn inserts_are_flushed_to_the_table_file_on_disk() {
    let dir = tempfile::tempdir().expect("failed to create temp dir");
    let path = dir.path().join("students.tbl");
    let file_catalog = Arc::new(FileCatalog::new());
    let engine: Engine<DiskFileManager> = Engine::new(Arc::clone(&file_catalog), 16);

    let file_id = engine.allocate_file_id();
    file_catalog.add_file(file_id, path.clone());
    engine
        .create_table("students", vec![ColumnSchema::int("id")], file_id)
        .expect("create_table failed");
    assert!(path.exists(), "create_table must allocate the backing file eagerly");

    let empty_len = std::fs::metadata(&path).expect("stat failed").len();
    assert!(empty_len > 0, "a freshly allocated table file must hold at least one page");

    for id in 0..5 {
        engine
            .insert(&InsertQuery {
                table: "students".to_string(),
                columns: vec!["id".to_string()],
                values: vec![Literal::Int(id)],
            })
            .expect("insert failed");
    }

    // Writes bypass the buffer cache, so what's on disk must already reflect
    // every insert without any explicit flush/close from the test.
    let raw = std::fs::read(&path).expect("read failed");
    let mut seen = std::collections::HashSet::new();
    for chunk in raw.chunks_exact(4) {
        seen.insert(i32::from_be_bytes([chunk[0], chunk[1], chunk[2], chunk[3]]));
    }
    for id in 0..5 {
        assert!(seen.contains(&id), "expected id {id} to appear somewhere in the raw page bytes");
    }
}
