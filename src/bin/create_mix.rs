//! Create or refresh a playlist with random tracks from other playlists.
//!
//! Reads a JSON job file (see `config::MixJob`), draws the requested number
//! of random tracks from every listed source, removes duplicates, tops up
//! from the filler playlist if one is configured, and delivers the shuffled
//! result — either into a brand-new private playlist or by replacing an
//! existing one.
//!
//! Usage:
//!   create_mix <job.json>

use std::path::Path;
use std::process;

use playmix::client::{HttpApi, PlaylistApi, Source};
use playmix::config::{self, MixJob};
use playmix::select::{self, SourcePick};
use playmix::{reconcile, Result};

fn main() {
    env_logger::init();

    let args: Vec<String> = std::env::args().collect();
    if args.len() > 1 && (args[1] == "-h" || args[1] == "--help") {
        print_help();
        process::exit(0);
    }
    let Some(job_path) = args.get(1) else {
        eprintln!("Usage: create_mix <job.json>");
        process::exit(1);
    };

    if let Err(e) = run(Path::new(job_path)) {
        eprintln!("Error: {}", e);
        process::exit(1);
    }
}

fn run(job_path: &Path) -> Result<()> {
    let job: MixJob = config::load_job(job_path)?;
    let mut api = HttpApi::from_env()?;
    let mut rng = rand::thread_rng();

    let picks: Vec<SourcePick> = job
        .playlists
        .iter()
        .map(|entry| SourcePick {
            source: Source::parse(&entry.playlist_id),
            count: entry.count,
        })
        .collect();
    let filler = job.filler_playlist_id.as_deref().map(Source::parse);

    let ids = select::mix_sources(&mut api, &mut rng, &picks, filler.as_ref())?;
    println!("Selected {} tracks from {} sources", ids.len(), picks.len());

    match &job.update_playlist {
        Some(playlist_id) => {
            reconcile::replace_all(&mut api, playlist_id, &ids)?;
            println!("Replaced contents of playlist {}", playlist_id);
        }
        None => {
            let mut name = job.new_playlist_name.clone().unwrap_or_default();
            if job.date_in_name {
                name = config::dated_name(&name, chrono::Local::now().date_naive());
            }
            let playlist_id = api.create_playlist(&job.user, &name, false)?;
            reconcile::add_in_batches(&mut api, &playlist_id, &ids)?;
            println!("Created playlist \"{}\" ({})", name, playlist_id);
        }
    }

    Ok(())
}

fn print_help() {
    println!("create_mix - build a playlist of random tracks from other playlists");
    println!();
    println!("USAGE:");
    println!("    create_mix <job.json>");
    println!();
    println!("JOB FILE FIELDS:");
    println!("    new_playlist_name   name for a newly created playlist");
    println!("    date_in_name        append today's date to the name");
    println!("    update_playlist     replace this playlist instead of creating one");
    println!("    user                owner of a newly created playlist");
    println!("    playlists           [{{ playlist_id, count }}]; \"saved\" for Liked Songs,");
    println!("                        a negative count takes every track");
    println!("    filler_playlist_id  optional playlist used to top up after dedup");
}
