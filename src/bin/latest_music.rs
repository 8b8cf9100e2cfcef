//! Mirror a source's recent tracks into a playlist ordered newest-first.
//!
//! Tracks from the source younger than `max_months` whole months are kept
//! in the target playlist in descending release-date order; tracks that
//! have aged past the window are removed on the next run.
//!
//! Usage:
//!   latest_music <job.json>

use std::path::Path;
use std::process;

use playmix::client::{HttpApi, Source};
use playmix::config::{self, LatestJob};
use playmix::{collector, reconcile, Result};

fn main() {
    env_logger::init();

    let args: Vec<String> = std::env::args().collect();
    if args.len() > 1 && (args[1] == "-h" || args[1] == "--help") {
        print_help();
        process::exit(0);
    }
    let Some(job_path) = args.get(1) else {
        eprintln!("Usage: latest_music <job.json>");
        process::exit(1);
    };

    if let Err(e) = run(Path::new(job_path)) {
        eprintln!("Error: {}", e);
        process::exit(1);
    }
}

fn run(job_path: &Path) -> Result<()> {
    let job: LatestJob = config::load_job(job_path)?;
    let mut api = HttpApi::from_env()?;

    let candidates = collector::fetch_all(&mut api, &Source::parse(&job.playlist_id))?;
    println!("{} candidate tracks", candidates.len());

    reconcile::converge_ordered(
        &mut api,
        &job.update_playlist,
        &candidates,
        job.max_months,
        chrono::Local::now().date_naive(),
    )?;
    println!("Playlist {} is up to date", job.update_playlist);

    Ok(())
}

fn print_help() {
    println!("latest_music - keep a playlist holding only a source's recent tracks");
    println!();
    println!("USAGE:");
    println!("    latest_music <job.json>");
    println!();
    println!("JOB FILE FIELDS:");
    println!("    playlist_id      source to watch (\"saved\" for Liked Songs)");
    println!("    update_playlist  target playlist, kept newest-first");
    println!("    max_months       maximum track age in whole months");
}
