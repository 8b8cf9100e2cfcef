//! Feed new music from source playlists into a target playlist.
//!
//! Keeps a history playlist so a recording is delivered at most once, no
//! matter how many releases of it show up: candidates whose ISRC is already
//! in the history are skipped, admitted ones are resolved to their oldest
//! release. Every delivered batch goes to both the target and the history
//! playlist.
//!
//! Usage:
//!   fresh_music <job.json>

use std::path::Path;
use std::process;

use playmix::client::{HttpApi, PlaylistApi, Source};
use playmix::config::{self, FreshJob};
use playmix::{collector, history, reconcile, Result};

fn main() {
    env_logger::init();

    let args: Vec<String> = std::env::args().collect();
    if args.len() > 1 && (args[1] == "-h" || args[1] == "--help") {
        print_help();
        process::exit(0);
    }
    let Some(job_path) = args.get(1) else {
        eprintln!("Usage: fresh_music <job.json>");
        process::exit(1);
    };

    if let Err(e) = run(Path::new(job_path)) {
        eprintln!("Error: {}", e);
        process::exit(1);
    }
}

fn run(job_path: &Path) -> Result<()> {
    let job: FreshJob = config::load_job(job_path)?;
    let mut api = HttpApi::from_env()?;

    let mut seen = history::load_history(&mut api, &job.history_playlist_id)?;
    println!("History holds {} recordings", seen.len());

    // Scan order across sources is the delivery order
    let mut new_ids = Vec::new();
    for playlist_id in &job.source_playlist_ids {
        let tracks = collector::fetch_all(&mut api, &Source::parse(playlist_id))?;
        new_ids.extend(history::admit(&mut api, &tracks, &mut seen)?);
    }

    if new_ids.is_empty() {
        println!("Nothing new to deliver");
        return Ok(());
    }

    for chunk in new_ids.chunks(reconcile::BATCH_LIMIT) {
        api.add_items(&job.target_playlist_id, chunk, None)?;
        api.add_items(&job.history_playlist_id, chunk, None)?;
    }
    println!(
        "Delivered {} new tracks to {}",
        new_ids.len(),
        job.target_playlist_id
    );

    Ok(())
}

fn print_help() {
    println!("fresh_music - deliver not-yet-seen tracks into a target playlist");
    println!();
    println!("USAGE:");
    println!("    fresh_music <job.json>");
    println!();
    println!("JOB FILE FIELDS:");
    println!("    target_playlist_id   playlist receiving the new tracks");
    println!("    history_playlist_id  playlist recording everything ever delivered");
    println!("    source_playlist_ids  playlists scanned for candidates, in order");
}
