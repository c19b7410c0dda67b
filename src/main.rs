use authdns_core::cli::Cli;
use authdns_core::config::ConfigFile;
use authdns_core::logging::init_tracing;
use authdns_core::server::udp_server;
use authdns_core::store::{MemoryStore, RecordStore};
use authdns_core::zones::load_zone_file;
use clap::Parser;
use std::process::ExitCode;
use std::sync::Arc;
use tracing::{error, info};

#[tokio::main]
async fn main() -> ExitCode {
    let cli = Cli::parse();

    let config = match ConfigFile::try_from_path(cli.config.as_deref()) {
        Ok(config) => config,
        Err(error) => {
            eprintln!("Failed to load configuration: {error}");
            return ExitCode::from(2);
        }
    };

    init_tracing(&config.log_level);
    info!(listen_addr = %config.listen_addr, "starting authdns-core");

    let store = Arc::new(MemoryStore::new());
    if let Some(zone_file) = &config.zone_file {
        match load_zone_file(zone_file) {
            Ok(zone) => {
                if let Err(error) = store.load_zone_file(&zone) {
                    error!(?error, "failed to populate store from zone file");
                }
            }
            Err(error) => error!(?error, zone_file, "failed to load zone file"),
        }
    }

    let store: Arc<dyn RecordStore> = store;
    if let Err(error) = udp_server(Arc::new(config), store).await {
        error!(?error, "UDP listener exited with an error");
        return ExitCode::from(1);
    }

    ExitCode::SUCCESS
}
