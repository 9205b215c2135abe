//! `lww-sync` — sync a blob file against a directory-backed store.
//!
//! Usage:
//!   lww-sync <store-dir> <blob-file>
//!
//! Reads `JSON_LWW_SYNC_KEY`, `JSON_LWW_VERIFY_UPLOAD` and
//! `JSON_LWW_CHUNK_BYTES` from the environment.

use std::path::Path;

use json_lww::cli::{init_logging, sync_file};
use json_lww::sync::{SyncConfig, SyncOutcome};

fn main() {
    init_logging();

    let args: Vec<String> = std::env::args().collect();
    if args.len() < 3 {
        eprintln!("Usage: lww-sync <store-dir> <blob-file>");
        std::process::exit(1);
    }

    let config = match SyncConfig::from_env() {
        Ok(config) => config,
        Err(e) => {
            eprintln!("{e}");
            std::process::exit(1);
        }
    };

    match sync_file(Path::new(&args[1]), Path::new(&args[2]), config) {
        Ok(SyncOutcome::Uploaded) => eprintln!("remote was empty, uploaded local state"),
        Ok(SyncOutcome::Merged(outcome)) => eprintln!(
            "merged: {} adopted, {} deleted, {} shadowed",
            outcome.adopted, outcome.deleted, outcome.shadowed
        ),
        Err(e) => {
            eprintln!("{e}");
            std::process::exit(1);
        }
    }
}
