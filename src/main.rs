mod cli;

use std::sync::Arc;
use clap::{crate_name, Parser};
use cloudnotes::app::{run, UiSettings};
use cloudnotes::backend::ProductionBackend;
use cloudnotes::config::app_config::AppConfig;
use cloudnotes::config::figment::FigmentExt;
use cloudnotes::error_exit;
use cloudnotes::logging::init_logging;
use cloudnotes::session_storage::{MemorySessionStorage, ProductionSessionStorage, SessionStorage};
use cloudnotes::terminal::Terminal;
use figment::Figment;
use log::{info, warn};
use time::UtcOffset;
use crate::cli::CliConfig;

fn main() {
    init_logging();

    info!("{} starting up", crate_name!());

    let cli_config = CliConfig::parse();
    let app_config = Figment::new()
        .setup_app_config(&cli_config.config_file)
        .extract_app_config()
        .unwrap_or_else(|e| error_exit!("invalid configuration: {e}"));

    // has to happen while the process is still single-threaded
    let local_offset = UtcOffset::current_local_offset()
        .unwrap_or_else(|e| {
            warn!("cannot determine the local time offset, using UTC: {e}");
            UtcOffset::UTC
        });

    let runtime = tokio::runtime::Builder::new_current_thread()
        .enable_all()
        .build()
        .unwrap_or_else(|e| error_exit!("failed to start the runtime: {e}"));
    runtime.block_on(async_main(app_config, local_offset));

    info!("{} terminating normally", crate_name!());
}

async fn async_main(app_config: AppConfig, local_offset: UtcOffset) {
    let storage: Box<dyn SessionStorage> = if app_config.persist_session {
        Box::new(
            ProductionSessionStorage::new(&app_config.data_directory)
                .await
                .unwrap_or_else(|e|
                    error_exit!("could not prepare the data directory: {e}")
                )
        )
    } else {
        Box::new(MemorySessionStorage::new())
    };
    let backend = ProductionBackend::new(&app_config, storage)
        .unwrap_or_else(|e| error_exit!("could not set up the backend: {e}"));

    let settings = UiSettings {
        max_note_length: app_config.max_note_length,
        local_offset,
    };
    if let Err(e) = run(Arc::new(backend), settings, &mut Terminal::new()).await {
        error_exit!("terminal i/o failed: {e}")
    }
}
