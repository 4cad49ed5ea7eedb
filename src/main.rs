mod cli;
mod config;
mod logging;
mod mapper;
mod matcher;
mod model;
mod payout;
mod reconcile;
mod snapshot;
mod storage;

use std::process;

use config::Config;
use storage::Storage;

fn main() {
    let config = Config::load().unwrap_or_else(|e| {
        eprintln!("{e}");
        process::exit(1);
    });

    let _logger = logging::init(config.log_level()).unwrap_or_else(|e| {
        eprintln!("{e}");
        process::exit(1);
    });

    let root = config.data_dir.clone().or_else(Storage::default_root);
    let Some(root) = root else {
        eprintln!("Could not determine home directory.");
        process::exit(1);
    };

    let mut storage = match Storage::new(root) {
        Ok(s) => s,
        Err(e) => {
            eprintln!("Failed to initialize storage: {e}");
            process::exit(1);
        }
    };

    if let Err(e) = cli::run(&mut storage) {
        eprintln!("Error: {e}");
        process::exit(1);
    }
}
