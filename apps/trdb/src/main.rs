//! # trdb demo
//!
//! A small program exercising the storage engine end to end: load config,
//! initialize logging, build an [`Engine`](trdb::Engine), create a table and
//! an index, run a few inserts and selects through the real operator
//! pipeline, and log the results.

use crate::config::EngineConfig;
use crate::engine_environment::EngineEnvironment;
use catalog::{ColumnSchema, Value};
use query::{InsertQuery, Literal, SelectQuery};
use std::error::Error;
use std::path::PathBuf;
use tracing_appender::non_blocking::WorkerGuard;
use tracing_subscriber::{
    EnvFilter, filter::LevelFilter, fmt, layer::SubscriberExt, util::SubscriberInitExt,
};

mod config;
mod engine_environment;

fn main() {
    let cfg = match EngineConfig::load_from_file("trdb.toml") {
        Ok(c) => c,
        Err(e) => {
            eprintln!("{e}");
            std::process::exit(2);
        }
    };

    let _logging_guard = init_logging(&cfg.storage.logs_dir).expect("failed to initialize logging");

    let env = EngineEnvironment::new(cfg);

    let file_id = env.engine.allocate_file_id();
    env.register_table_file(file_id, "students");
    env.engine
        .create_table(
            "students",
            vec![ColumnSchema::int("id"), ColumnSchema::varchar("name", 50)],
            file_id,
        )
        .expect("failed to create table");

    for (id, name) in [(1, "Ada"), (2, "Alan"), (3, "Grace")] {
        env.engine
            .insert(&InsertQuery {
                table: "students".to_string(),
                columns: vec!["id".to_string(), "name".to_string()],
                values: vec![Literal::Int(id), Literal::String(name.to_string())],
            })
            .expect("insert failed");
    }

    env.engine
        .create_index("id_idx", "students", "id")
        .expect("failed to build index");

    let rows = env
        .engine
        .select(&SelectQuery {
            table: "students".to_string(),
            columns: vec![],
            where_clause: None,
            join: None,
        })
        .expect("select failed");

    for row in rows {
        let row = row.expect("row read failed");
        match row.record.as_slice() {
            [Value::Int(id), Value::Varchar(name)] => {
                tracing::info!(id, name, "row");
            }
            other => tracing::warn!(?other, "unexpected row shape"),
        }
    }
}

/// Sets up the logging for the process.
pub fn init_logging(log_dir: &PathBuf) -> Result<WorkerGuard, Box<dyn Error + Send + Sync>> {
    let file_appender = tracing_appender::rolling::daily(log_dir, "trdb.log");
    let (file_writer, guard) = tracing_appender::non_blocking(file_appender);

    let filter = EnvFilter::builder()
        .with_default_directive(LevelFilter::INFO.into())
        .from_env_lossy();

    let console_layer = fmt::layer()
        .with_writer(std::io::stdout)
        .with_target(false)
        .with_level(true)
        .compact();

    let file_layer = fmt::layer()
        .with_writer(file_writer)
        .json()
        .with_current_span(true)
        .with_span_list(true);

    tracing_subscriber::registry()
        .with(filter)
        .with(console_layer)
        .with(file_layer)
        .init();

    Ok(guard)
}
