//! ct-export - write every scan of a VPZ document as a `.nii.gz` volume.

use std::env;
use std::path::Path;
use std::process;

use tracing::{error, info};
use vpz_export::cli;
use vpz_export::volume::export_volumes;

const USAGE: &str = "Usage: ct-export [-v|-vv|-q] [--serial] [--level <0-9>] <document.json> <output_dir>";

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
    if inv.positional.len() < 2 {
        println!("{}", USAGE);
        process::exit(1);
    }

    let document = Path::new(&inv.positional[0]);
    let out_dir = Path::new(&inv.positional[1]);
    if !document.is_file() {
        println!("Error: document not found: {}", document.display());
        process::exit(1);
    }

    cli::init_tracing(inv.verbosity);

    match export_volumes(document, out_dir, &inv.options) {
        Ok(stats) => info!(
            "Done: {} of {} images exported ({} missing buffers, {} without buffer)",
            stats.exported.len(),
            stats.total(),
            stats.skipped_missing,
            stats.skipped_unbacked
        ),
        Err(e) => {
            error!("{}", e);
            process::exit(1);
        }
    }
}
