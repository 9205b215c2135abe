//! `lww-init` — read a JSON value from stdin, print a new recorder blob.
//!
//! Usage:
//!   lww-init < value.json > doc.lww

use json_lww::cli::{init_blob, init_logging};
use std::io::{self, Read};

fn main() {
    init_logging();

    let mut buf = String::new();
    if let Err(e) = io::stdin().read_to_string(&mut buf) {
        eprintln!("{e}");
        std::process::exit(1);
    }

    match init_blob(buf.trim()) {
        Ok(blob) => println!("{blob}"),
        Err(e) => {
            eprintln!("{e}");
            std::process::exit(1);
        }
    }
}
