//! Bounded worker pool with ordered emission
//!
//! With one job, items are processed and emitted one at a time. With more,
//! a rayon pool of `jobs` threads processes them while an indicatif bar tracks
//! progress on stderr; results are then emitted in the original item order, so
//! stdout is identical to a sequential run.

use indicatif::{ProgressBar, ProgressStyle};
use rayon::ThreadPoolBuilder;
use rayon::prelude::*;
use thiserror::Error;

/// The worker pool could not be created
#[derive(Debug, Error)]
#[error("Failed to build worker pool: {0}")]
pub struct PoolError(#[from] rayon::ThreadPoolBuildError);

/// Apply `work` to every item and hand each result to `emit` in item order
pub fn run_ordered<T, R, W, E>(
    jobs: usize,
    items: &[T],
    work: W,
    mut emit: E,
) -> Result<Vec<R>, PoolError>
where
    T: Sync,
    R: Send,
    W: Fn(&T) -> R + Sync,
    E: FnMut(&T, &R),
{
    if jobs <= 1 || items.len() <= 1 {
        let mut results = Vec::with_capacity(items.len());
        for item in items {
            let result = work(item);
            emit(item, &result);
            results.push(result);
        }
        return Ok(results);
    }

    let worker_count = jobs.min(items.len());
    let pool = ThreadPoolBuilder::new().num_threads(worker_count).build()?;

    let pb = ProgressBar::new(items.len() as u64);
    pb.set_style(
        ProgressStyle::default_bar()
            .template("{spinner:.green} [{elapsed_precise}] [{bar:40.cyan/blue}] {pos}/{len} {msg}")
            .unwrap_or_else(|_| ProgressStyle::default_bar())
            .progress_chars("#>-"),
    );
    pb.set_message(format!("{worker_count} workers"));

    let results: Vec<R> = pool.install(|| {
        items
            .par_iter()
            .map(|item| {
                let result = work(item);
                pb.inc(1);
                result
            })
            .collect()
    });
    pb.finish_and_clear();

    for (item, result) in items.iter().zip(&results) {
        emit(item, result);
    }
    Ok(results)
}
