//! `lww-merge` — merge a remote blob into a local one, print the result.
//!
//! Usage:
//!   lww-merge <local-blob-file> <remote-blob-file>

use json_lww::cli::{init_logging, merge_blobs};

fn read(file: &str) -> String {
    match std::fs::read_to_string(file) {
        Ok(blob) => blob,
        Err(e) => {
            eprintln!("{file}: {e}");
            std::process::exit(1);
        }
    }
}

fn main() {
    init_logging();

    let args: Vec<String> = std::env::args().collect();
    if args.len() < 3 {
        eprintln!("Usage: lww-merge <local-blob-file> <remote-blob-file>");
        std::process::exit(1);
    }

    let local = read(&args[1]);
    let remote = read(&args[2]);

    match merge_blobs(&local, &remote) {
        Ok((merged, outcome)) => {
            tracing::info!(
                adopted = outcome.adopted,
                deleted = outcome.deleted,
                shadowed = outcome.shadowed,
                "merged"
            );
            println!("{merged}");
        }
        Err(e) => {
            eprintln!("{e}");
            std::process::exit(1);
        }
    }
}
