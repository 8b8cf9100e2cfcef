//! Create or refresh a playlist picking tracks by release-date age.
//!
//! Reads a JSON job file (see `config::YearMixJob`) and a release-date
//! cache file. Every track of the source is assigned to the first age
//! bucket it fits (whole years since the recording's earliest release,
//! year-only dates counted from July 1), each bucket contributes up to its
//! quota, and the combined result is shuffled before delivery.
//!
//! Usage:
//!   year_mix <job.json> <rd_cache.csv>

use std::path::Path;
use std::process;

use playmix::client::{HttpApi, PlaylistApi, Source};
use playmix::config::{self, YearMixJob};
use playmix::date_cache::ReleaseDateCache;
use playmix::{reconcile, select, Result};

fn main() {
    env_logger::init();

    let args: Vec<String> = std::env::args().collect();
    if args.len() > 1 && (args[1] == "-h" || args[1] == "--help") {
        print_help();
        process::exit(0);
    }
    if args.len() < 3 {
        eprintln!("Usage: year_mix <job.json> <rd_cache.csv>");
        process::exit(1);
    }

    if let Err(e) = run(Path::new(&args[1]), Path::new(&args[2])) {
        eprintln!("Error: {}", e);
        process::exit(1);
    }
}

fn run(job_path: &Path, cache_path: &Path) -> Result<()> {
    let job: YearMixJob = config::load_job(job_path)?;
    let mut cache = ReleaseDateCache::open(cache_path)?;
    let mut api = HttpApi::from_env()?;
    let mut rng = rand::thread_rng();

    let source = Source::parse(&job.playlist_id);
    let today = chrono::Local::now().date_naive();

    let ids = select::age_bucketed_ids(
        &mut api,
        &mut rng,
        &mut cache,
        &source,
        &job.buckets(),
        today,
    )?;
    println!(
        "Selected {} tracks ({} release dates cached)",
        ids.len(),
        cache.len()
    );

    match &job.update_playlist {
        Some(playlist_id) => {
            reconcile::replace_all(&mut api, playlist_id, &ids)?;
            println!("Replaced contents of playlist {}", playlist_id);
        }
        None => {
            let mut name = job.new_playlist_name.clone().unwrap_or_default();
            if job.date_in_name {
                name = config::dated_name(&name, today);
            }
            let playlist_id = api.create_playlist(&job.user, &name, false)?;
            reconcile::add_in_batches(&mut api, &playlist_id, &ids)?;
            println!("Created playlist \"{}\" ({})", name, playlist_id);
        }
    }

    Ok(())
}

fn print_help() {
    println!("year_mix - build a playlist with per-age-bucket track quotas");
    println!();
    println!("USAGE:");
    println!("    year_mix <job.json> <rd_cache.csv>");
    println!();
    println!("The job's selection entries must be ordered by ascending age and end");
    println!("with a null age (the catch-all bucket). The cache file accumulates");
    println!("ISRC,date rows and is created on first use.");
}
