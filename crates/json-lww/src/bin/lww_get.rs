//! `lww-get` — print the value and timestamp entry at a path.
//!
//! Usage:
//!   lww-get <blob-file> <path>
//!
//! The path uses the canonical form, e.g. `c[1].id`; `""` is the root.

use json_lww::cli::{init_logging, lookup};

fn main() {
    init_logging();

    let args: Vec<String> = std::env::args().collect();
    if args.len() < 3 {
        eprintln!("Usage: lww-get <blob-file> <path>");
        std::process::exit(1);
    }

    let blob = match std::fs::read_to_string(&args[1]) {
        Ok(blob) => blob,
        Err(e) => {
            eprintln!("{}: {e}", args[1]);
            std::process::exit(1);
        }
    };

    match lookup(&blob, &args[2]) {
        Ok(found) => println!("{found}"),
        Err(e) => {
            eprintln!("{e}");
            std::process::exit(1);
        }
    }
}
