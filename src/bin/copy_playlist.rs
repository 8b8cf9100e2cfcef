//! Append one playlist's tracks to another, skipping what is already there.
//!
//! Usage:
//!   copy_playlist <source_playlist_id> <dest_playlist_id>

use std::process;

use playmix::client::{HttpApi, Source};
use playmix::{collector, reconcile, Result};

fn main() {
    env_logger::init();

    let args: Vec<String> = std::env::args().collect();
    if args.len() > 1 && (args[1] == "-h" || args[1] == "--help") {
        print_help();
        process::exit(0);
    }
    if args.len() < 3 {
        eprintln!("Usage: copy_playlist <source_playlist_id> <dest_playlist_id>");
        process::exit(1);
    }

    if let Err(e) = run(&args[1], &args[2]) {
        eprintln!("Error: {}", e);
        process::exit(1);
    }
}

fn run(source_id: &str, dest_id: &str) -> Result<()> {
    let mut api = HttpApi::from_env()?;

    let dest_ids = collector::fetch_all_ids(&mut api, &Source::parse(dest_id))?;
    let source_ids = collector::fetch_all_ids(&mut api, &Source::parse(source_id))?;

    let missing: Vec<String> = source_ids
        .into_iter()
        .filter(|id| !dest_ids.contains(id))
        .collect();

    reconcile::add_in_batches(&mut api, dest_id, &missing)?;
    println!("Appended {} tracks to {}", missing.len(), dest_id);

    Ok(())
}

fn print_help() {
    println!("copy_playlist - append a playlist's tracks to another playlist");
    println!();
    println!("USAGE:");
    println!("    copy_playlist <source_playlist_id> <dest_playlist_id>");
    println!();
    println!("Tracks already present in the destination are skipped.");
}
