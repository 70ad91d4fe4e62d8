//! mesh-export - write every organ of a VPZ model series as OBJ + MTL.

use std::env;
use std::path::Path;
use std::process;

use tracing::{error, info};
use vpz_export::cli;
use vpz_export::mesh::export_meshes;

const USAGE: &str =
    "Usage: mesh-export [-v|-vv|-q] [--serial] <document.json> <buffer_dir> <output_dir>";

fn main() {
    let inv = match cli::parse_args(env::args().skip(1)) {
        Ok(inv) => inv,
        Err(e) => {
            println!("Error: {}", e);
            println!("{}", USAGE);
            process::exit(1);
        }
    };
    if inv.help {
        println!("{}", USAGE);
        return;
    }
    if inv.positional.len() < 3 {
        println!("{}", USAGE);
        process::exit(1);
    }

    let document = Path::new(&inv.positional[0]);
    let buffer_dir = Path::new(&inv.positional[1]);
    let out_dir = Path::new(&inv.positional[2]);
    if !document.is_file() {
        println!("Error: document not found: {}", document.display());
        process::exit(1);
    }
    if !buffer_dir.is_dir() {
        println!("Error: buffer directory not found: {}", buffer_dir.display());
        process::exit(1);
    }

    cli::init_tracing(inv.verbosity);

    match export_meshes(document, buffer_dir, out_dir, &inv.options) {
        Ok(stats) => {
            let skipped: usize = stats.organs.iter().map(|o| o.cells_skipped).sum();
            info!(
                "Done: {} organs, {} faces ({} cells skipped)",
                stats.organs.len(),
                stats.faces_written(),
                skipped
            );
        }
        Err(e) => {
            error!("{}", e);
            process::exit(1);
        }
    }
}
