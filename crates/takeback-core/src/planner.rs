//! Resume planner — computes the work queue for one run
//!
//! Pure filtering: everything the export lists, minus what the blacklist
//! excludes and what a previous run already fetched, in the export's
//! original order. Recomputed fresh each run, never persisted.

use rustc_hash::FxHashSet;

use crate::blacklist::Blacklist;

/// Counts reported alongside every plan, for operator visibility.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PlanCounts {
    pub total: usize,
    pub done: usize,
    pub blacklisted: usize,
    pub remaining: usize,
}

/// The work queue for this run plus its provenance counts.
#[derive(Debug)]
pub struct Plan<T> {
    pub queue: Vec<T>,
    pub counts: PlanCounts,
}

/// Filter `items` down to the ones still needing a fetch.
///
/// Order is preserved from `items`. Items present in both stores count as
/// blacklisted (the blacklist check runs first). Mutates nothing; the same
/// inputs always produce the same plan.
pub fn plan<T>(
    items: Vec<T>,
    id: impl Fn(&T) -> &str,
    blacklist: &Blacklist,
    done: &FxHashSet<String>,
) -> Plan<T> {
    let total = items.len();
    let mut blacklisted = 0;
    let mut already_done = 0;

    let queue: Vec<T> = items
        .into_iter()
        .filter(|item| {
            let item_id = id(item);
            if blacklist.contains(item_id) {
                blacklisted += 1;
                false
            } else if done.contains(item_id) {
                already_done += 1;
                false
            } else {
                true
            }
        })
        .collect();

    let counts = PlanCounts {
        total,
        done: already_done,
        blacklisted,
        remaining: queue.len(),
    };
    log::info!(
        "plan: {} total, {} done, {} blacklisted, {} remaining",
        counts.total,
        counts.done,
        counts.blacklisted,
        counts.remaining
    );
    Plan { queue, counts }
}
