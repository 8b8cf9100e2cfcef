//! Track selection policies.
//!
//! Two ways of picking tracks from a source: a fixed count of uniformly
//! random tracks (negative count = take everything), and age-bucketed
//! quotas driven by each recording's earliest release date. A multi-source
//! mix concatenates fixed-count picks, deduplicates and optionally tops up
//! from a filler source.
//!
//! Every entry point takes the RNG as a parameter so callers (and tests)
//! control the permutation.

use std::collections::HashSet;

use chrono::NaiveDate;
use rand::seq::SliceRandom;
use rand::Rng;

use crate::client::{PlaylistApi, Source};
use crate::collector;
use crate::date_cache::ReleaseDateCache;
use crate::dates;
use crate::error::{Error, Result};

// ── Fixed-count selection ────────────────────────────────────────────────────

/// `count` random track ids from a source. A negative count means "all",
/// resolved against the live collection total rather than the fetched list.
/// Asking for more than the source holds silently clamps to what is there.
pub fn random_ids<R: Rng>(
    api: &mut dyn PlaylistApi,
    rng: &mut R,
    source: &Source,
    count: i64,
) -> Result<Vec<String>> {
    let mut ids = collector::fetch_all_ids(api, source)?;

    let want = if count < 0 {
        api.collection_total(source)?
    } else {
        count as usize
    };

    ids.shuffle(rng);
    ids.truncate(want);
    Ok(ids)
}

/// One source's share of a mix.
#[derive(Debug, Clone)]
pub struct SourcePick {
    pub source: Source,
    pub count: i64,
}

/// Concatenate per-source random picks, dedup by id (first occurrence wins),
/// top up from `filler` while short of the summed target, then shuffle the
/// whole result so the final order reveals nothing about its origins.
///
/// The filler loop stops as soon as every filler track is already selected;
/// running short without a filler just delivers a short list.
pub fn mix_sources<R: Rng>(
    api: &mut dyn PlaylistApi,
    rng: &mut R,
    picks: &[SourcePick],
    filler: Option<&Source>,
) -> Result<Vec<String>> {
    let mut selected = Vec::new();
    let mut total = 0usize;

    for pick in picks {
        // An "all" request contributes the live total to the target
        total += if pick.count < 0 {
            api.collection_total(&pick.source)?
        } else {
            pick.count as usize
        };
        selected.extend(random_ids(api, rng, &pick.source, pick.count)?);
    }

    let mut selected = dedup_keep_first(selected);

    if let Some(filler) = filler {
        let filler_ids = collector::fetch_all_ids(api, filler)?;
        let mut have: HashSet<String> = selected.iter().cloned().collect();

        while selected.len() < total {
            let mut fresh: Vec<String> = filler_ids
                .iter()
                .filter(|id| !have.contains(*id))
                .cloned()
                .collect();
            if fresh.is_empty() {
                // Filler exhausted; deliver what we have
                break;
            }
            fresh.shuffle(rng);
            for id in fresh.into_iter().take(total - selected.len()) {
                have.insert(id.clone());
                selected.push(id);
            }
        }
    }

    selected.shuffle(rng);
    Ok(selected)
}

fn dedup_keep_first(ids: Vec<String>) -> Vec<String> {
    let mut seen = HashSet::new();
    ids.into_iter().filter(|id| seen.insert(id.clone())).collect()
}

// ── Age-bucketed selection ───────────────────────────────────────────────────

/// One quota of an age-bucketed selection: up to `count` tracks strictly
/// younger than `max_age_years` whole years. `None` is the terminal
/// catch-all for everything older.
#[derive(Debug, Clone)]
pub struct AgeBucket {
    pub max_age_years: Option<u32>,
    pub count: usize,
}

/// Thresholds must ascend strictly and end with the catch-all.
pub fn validate_buckets(buckets: &[AgeBucket]) -> Result<()> {
    let Some((last, init)) = buckets.split_last() else {
        return Err(Error::Config("age selection has no buckets".to_string()));
    };
    if last.max_age_years.is_some() {
        return Err(Error::Config(
            "the last age bucket must be the catch-all (no maximum age)".to_string(),
        ));
    }
    let mut previous: Option<u32> = None;
    for bucket in init {
        let Some(max) = bucket.max_age_years else {
            return Err(Error::Config(
                "only the last age bucket may omit the maximum age".to_string(),
            ));
        };
        if let Some(prev) = previous {
            if max <= prev {
                return Err(Error::Config(format!(
                    "age thresholds must be strictly ascending ({} after {})",
                    max, prev
                )));
            }
        }
        previous = Some(max);
    }
    Ok(())
}

/// Pick tracks from one source by age quotas.
///
/// Each track's age in whole years comes from its recording's earliest
/// release date (cached); the track lands in the first bucket whose
/// threshold it is under, buckets are shuffled and clamped to their counts,
/// and the combined result is shuffled again so bucket membership does not
/// show in the final order.
pub fn age_bucketed_ids<R: Rng>(
    api: &mut dyn PlaylistApi,
    rng: &mut R,
    cache: &mut ReleaseDateCache,
    source: &Source,
    buckets: &[AgeBucket],
    today: NaiveDate,
) -> Result<Vec<String>> {
    validate_buckets(buckets)?;

    let tracks = collector::fetch_all(api, source)?;
    let mut pools: Vec<Vec<String>> = vec![Vec::new(); buckets.len()];

    for track in &tracks {
        let date = cache.earliest_release_date(api, track)?;
        let Some(released) = dates::normalize_release_date(&date) else {
            log::warn!("track {} has unusable release date {:?}", track.id, date);
            continue;
        };
        let age = dates::whole_years(today, released);

        for (pool, bucket) in pools.iter_mut().zip(buckets) {
            let fits = match bucket.max_age_years {
                Some(max) => age < max as i32,
                None => true,
            };
            if fits {
                pool.push(track.id.clone());
                break;
            }
        }
    }

    let mut selected = Vec::new();
    for (mut pool, bucket) in pools.into_iter().zip(buckets) {
        pool.shuffle(rng);
        pool.truncate(bucket.count);
        selected.extend(pool);
    }

    selected.shuffle(rng);
    Ok(selected)
}
