//! Bounded worker pool for component dispatch
//!
//! Workers are scoped OS threads pulling job indices from a shared counter.
//! The scope is the join barrier: `run_bounded` returns only after every
//! worker finished.

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Mutex, PoisonError};

/// Run `work` over `jobs` on at most `workers` threads.
///
/// Results come back in job order. Jobs that never started because `halted`
/// returned true are `None`.
pub(super) fn run_bounded<J, R, H, F>(jobs: &[J], workers: usize, halted: H, work: F) -> Vec<Option<R>>
where
    J: Sync,
    R: Send,
    H: Fn() -> bool + Sync,
    F: Fn(&J) -> R + Sync,
{
    if workers <= 1 || jobs.len() <= 1 {
        let mut results = Vec::with_capacity(jobs.len());
        for job in jobs {
            results.push(if halted() { None } else { Some(work(job)) });
        }
        return results;
    }

    let next = AtomicUsize::new(0);
    let results: Mutex<Vec<Option<R>>> = Mutex::new((0..jobs.len()).map(|_| None).collect());

    std::thread::scope(|s| {
        for _ in 0..workers.min(jobs.len()) {
            s.spawn(|| loop {
                if halted() {
                    break;
                }
                let index = next.fetch_add(1, Ordering::SeqCst);
                let Some(job) = jobs.get(index) else {
                    break;
                };
                let result = work(job);
                results.lock().unwrap_or_else(PoisonError::into_inner)[index] = Some(result);
            });
        }
    });

    results.into_inner().unwrap_or_else(PoisonError::into_inner)
}
