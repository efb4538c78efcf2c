use crate::config::EngineConfig;
use file::disk_file_manager::DiskFileManager;
use file::file_catalog::FileCatalog;
use std::sync::Arc;
use trdb::Engine;

/// Owner of the singleton-like instances that are needed for the entire
/// lifetime of the process: the on-disk engine plus the config it was built
/// from.
#[derive(Debug)]
pub struct EngineEnvironment {
    pub file_catalog: Arc<FileCatalog>,
    pub engine: Engine<DiskFileManager>,
    pub engine_config: EngineConfig,
}

impl EngineEnvironment {
    pub fn new(config: EngineConfig) -> Self {
        let file_catalog = Arc::new(FileCatalog::new());
        let engine = Engine::new(Arc::clone(&file_catalog), config.storage.buffer_pages.get());
        Self {
            file_catalog,
            engine,
            engine_config: config,
        }
    }

    /// Registers `file_id`'s heap file at `<data_dir>/<name>.tbl`.
    pub fn register_table_file(&self, file_id: page::page_id::FileId, name: &str) {
        let path = self.engine_config.storage.data_dir.join(format!("{name}.tbl"));
        tracing::info!(table = name, path = %path.display(), "registering table file");
        self.file_catalog.add_file(file_id, path);
    }
}
