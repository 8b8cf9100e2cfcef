//! Append the saved-tracks library ("Liked Songs") to a playlist.
//!
//! Usage:
//!   copy_saved <dest_playlist_id>

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
    let Some(dest_id) = args.get(1) else {
        eprintln!("Usage: copy_saved <dest_playlist_id>");
        process::exit(1);
    };

    if let Err(e) = run(dest_id) {
        eprintln!("Error: {}", e);
        process::exit(1);
    }
}

fn run(dest_id: &str) -> Result<()> {
    let mut api = HttpApi::from_env()?;

    let dest_ids = collector::fetch_all_ids(&mut api, &Source::parse(dest_id))?;
    let saved_ids = collector::fetch_all_ids(&mut api, &Source::Saved)?;

    let missing: Vec<String> = saved_ids
        .into_iter()
        .filter(|id| !dest_ids.contains(id))
        .collect();

    reconcile::add_in_batches(&mut api, dest_id, &missing)?;
    println!("Appended {} tracks to {}", missing.len(), dest_id);

    Ok(())
}

fn print_help() {
    println!("copy_saved - append your Liked Songs to an existing playlist");
    println!();
    println!("USAGE:");
    println!("    copy_saved <dest_playlist_id>");
    println!();
    println!("Tracks already present in the destination are skipped.");
}
