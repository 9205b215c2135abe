//! `lww-update` — record the value on stdin against an existing blob.
//!
//! Usage:
//!   lww-update <blob-file> < value.json > doc.lww

use json_lww::cli::{init_logging, update_blob};
use std::io::{self, Read};

fn main() {
    init_logging();

    let args: Vec<String> = std::env::args().collect();
    let Some(blob_file) = args.get(1) else {
        eprintln!("Usage: lww-update <blob-file>");
        std::process::exit(1);
    };

    let blob = match std::fs::read_to_string(blob_file) {
        Ok(blob) => blob,
        Err(e) => {
            eprintln!("{blob_file}: {e}");
            std::process::exit(1);
        }
    };

    let mut buf = String::new();
    if let Err(e) = io::stdin().read_to_string(&mut buf) {
        eprintln!("{e}");
        std::process::exit(1);
    }

    match update_blob(&blob, buf.trim()) {
        Ok((updated, changes)) => {
            tracing::info!(changes, "recorded update");
            println!("{updated}");
        }
        Err(e) => {
            eprintln!("{e}");
            std::process::exit(1);
        }
    }
}
