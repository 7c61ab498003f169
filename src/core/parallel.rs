//! Parallel loop over sample indices.
//!
//! Worker threads pull fixed-size grains of iterations from a shared
//! atomic counter and report finished grains through a channel to a
//! collector which drives the progress bar. Every worker owns exactly
//! one context (RNG, film, chain state, ...), so the loop body never
//! shares mutable state.

// std
use std::sync::atomic::{AtomicU64, Ordering};
// others
use log::{log_enabled, Level};

/// Iterations handed out per grain.
pub const GRAIN_SIZE: u64 = 1000;

/// Calls `f(index, thread_id, context)` for every `index` in
/// `0..num_iterations`, using one thread per context.
pub fn parallel_for<C, F>(num_iterations: u64, contexts: &mut [C], f: F)
where
    C: Send,
    F: Fn(u64, usize, &mut C) + Sync,
{
    let num_grains: u64 = (num_iterations + GRAIN_SIZE - 1) / GRAIN_SIZE;
    let next_grain = AtomicU64::new(0);
    let f = &f;
    let next_grain = &next_grain;
    let show_progress: bool = log_enabled!(Level::Info);
    let num_workers: usize = contexts.len().max(1);
    let workers = contexts.iter_mut().enumerate();
    let result = crossbeam::scope(|scope| {
        let (grain_tx, grain_rx) = crossbeam_channel::bounded::<u64>(num_workers);
        // spawn worker threads
        for (thread_id, context) in workers {
            let grain_tx = grain_tx.clone();
            scope.spawn(move |_| loop {
                let grain: u64 = next_grain.fetch_add(1, Ordering::Relaxed);
                if grain >= num_grains {
                    break;
                }
                let start: u64 = grain * GRAIN_SIZE;
                let end: u64 = (start + GRAIN_SIZE).min(num_iterations);
                for index in start..end {
                    f(index, thread_id, context);
                }
                // the collector only goes away if the scope is unwinding
                if grain_tx.send(end - start).is_err() {
                    break;
                }
            });
        }
        drop(grain_tx);
        // collect finished grains
        scope.spawn(move |_| {
            if show_progress {
                let mut pb = pbr::ProgressBar::new(num_iterations);
                for done in grain_rx.iter() {
                    pb.add(done);
                }
                pb.finish();
            } else {
                for _ in grain_rx.iter() {}
            }
        });
    });
    if let Err(panic) = result {
        std::panic::resume_unwind(panic);
    }
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn every_index_is_visited_once() {
        let num_iterations: u64 = 2 * GRAIN_SIZE + 17;
        let mut contexts: Vec<Vec<u64>> = vec![Vec::new(); 3];
        parallel_for(num_iterations, &mut contexts, |index, _thread_id, visited| {
            visited.push(index);
        });
        let mut all: Vec<u64> = contexts.into_iter().flatten().collect();
        all.sort_unstable();
        assert_eq!(all, (0..num_iterations).collect::<Vec<u64>>());
    }

    #[test]
    fn thread_ids_match_contexts() {
        let mut contexts: Vec<(usize, bool)> = (0..4).map(|i| (i, true)).collect();
        parallel_for(5 * GRAIN_SIZE, &mut contexts, |_index, thread_id, context| {
            if context.0 != thread_id {
                context.1 = false;
            }
        });
        assert!(contexts.iter().all(|c| c.1));
    }

    #[test]
    fn zero_iterations() {
        let mut contexts: Vec<u64> = vec![0; 2];
        parallel_for(0, &mut contexts, |_index, _thread_id, count| {
            *count += 1;
        });
        assert_eq!(contexts, vec![0, 0]);
    }
}
