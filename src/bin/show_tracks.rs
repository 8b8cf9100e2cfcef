//! Print every track of a playlist.
//!
//! Usage:
//!   show_tracks <playlist_id>

use std::process;

use playmix::client::{HttpApi, PlaylistApi, Source};
use playmix::{collector, Result};

fn main() {
    env_logger::init();

    let args: Vec<String> = std::env::args().collect();
    if args.len() > 1 && (args[1] == "-h" || args[1] == "--help") {
        print_help();
        process::exit(0);
    }
    let Some(playlist_id) = args.get(1) else {
        eprintln!("Usage: show_tracks <playlist_id>");
        process::exit(1);
    };

    if let Err(e) = run(playlist_id) {
        eprintln!("Error: {}", e);
        process::exit(1);
    }
}

fn run(playlist_id: &str) -> Result<()> {
    let mut api = HttpApi::from_env()?;

    let meta = api.playlist_meta(playlist_id)?;
    println!("{} — {} tracks\n", meta.name, meta.total);

    for track in collector::fetch_all(&mut api, &Source::parse(playlist_id))? {
        println!("{} — {}", track.artists.join(", "), track.name);
    }

    Ok(())
}

fn print_help() {
    println!("show_tracks - list a playlist's tracks as \"Artists — Title\"");
    println!();
    println!("USAGE:");
    println!("    show_tracks <playlist_id>");
}
