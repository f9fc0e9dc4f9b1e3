//! Rate-limited sequential fetch loop
//!
//! Items are processed strictly in work-queue order, one blocking fetch at
//! a time. Success commits the item to the progress store before the loop
//! moves on; failure is logged and the item is left for the next run. A
//! randomized pause follows every item.

use std::time::{Duration, Instant};

use indicatif::ProgressBar;

use crate::error::{FetchError, StoreError};
use crate::pacing::Pacing;

/// Outcome of one batch run.
#[derive(Debug)]
pub struct BatchReport {
    pub label: String,
    pub attempted: usize,
    pub fetched: usize,
    pub failed: usize,
    /// True when a stop request ended the batch before the queue drained.
    pub interrupted: bool,
    pub elapsed: Duration,
}

impl BatchReport {
    pub fn log(&self) {
        log::info!(
            "{}: {} fetched, {} failed of {} attempted [{:.0}s]{}",
            self.label,
            self.fetched,
            self.failed,
            self.attempted,
            self.elapsed.as_secs_f64(),
            if self.interrupted { " (interrupted)" } else { "" }
        );
    }
}

/// Drain `queue` through `fetch`, committing each success via `record`.
///
/// Per item the policy is an explicit match on the typed result:
/// `Ok(r)` → `record(item, r)` durably, then continue; `Err(e)` → log with
/// the item's identifier and continue — one bad item never aborts the
/// batch. A `record` failure DOES abort: if progress can no longer be
/// persisted, continuing would redo all of this work on the next run.
///
/// `stop` is polled before each item; the in-flight item always completes.
#[allow(clippy::too_many_arguments)]
pub fn run_batch<T, R>(
    label: &str,
    queue: &[T],
    id: impl Fn(&T) -> &str,
    pacing: &Pacing,
    pb: &ProgressBar,
    stop: impl Fn() -> bool,
    mut fetch: impl FnMut(&T) -> Result<R, FetchError>,
    mut record: impl FnMut(&T, R) -> Result<(), StoreError>,
) -> Result<BatchReport, StoreError> {
    let start = Instant::now();
    let mut report = BatchReport {
        label: label.to_string(),
        attempted: 0,
        fetched: 0,
        failed: 0,
        interrupted: false,
        elapsed: Duration::ZERO,
    };

    let total = queue.len();
    for (i, item) in queue.iter().enumerate() {
        if stop() {
            log::warn!("{label}: stop requested, {} items left", total - i);
            report.interrupted = true;
            break;
        }

        let item_id = id(item);
        pb.set_message(item_id.to_string());
        log::info!("{label}: [{}/{total}] {item_id}", i + 1);
        report.attempted += 1;

        match fetch(item) {
            Ok(result) => {
                record(item, result)?;
                report.fetched += 1;
            }
            Err(e) => {
                report.failed += 1;
                log::error!("{label}: {item_id}: {e}");
                if e.is_permanent() {
                    log::warn!("{label}: {item_id} looks permanently unavailable, consider blacklisting it");
                }
            }
        }
        pb.inc(1);

        if i + 1 < total {
            pacing.pause();
        }
    }

    pb.finish_and_clear();
    report.elapsed = start.elapsed();
    report.log();
    Ok(report)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn no_pause() -> Pacing {
        Pacing::new(0, 0).unwrap()
    }

    #[test]
    fn one_failure_does_not_abort_the_batch() {
        let queue = vec!["a", "b", "c", "d", "e"];
        let mut recorded = Vec::new();
        let report = run_batch(
            "test",
            &queue,
            |i| i,
            &no_pause(),
            &ProgressBar::hidden(),
            || false,
            |item| {
                if *item == "c" {
                    Err(FetchError::Metadata("boom".into()))
                } else {
                    Ok(())
                }
            },
            |item, ()| {
                recorded.push(item.to_string());
                Ok(())
            },
        )
        .unwrap();

        assert_eq!(report.attempted, 5);
        assert_eq!(report.fetched, 4);
        assert_eq!(report.failed, 1);
        assert!(!report.interrupted);
        assert_eq!(recorded, vec!["a", "b", "d", "e"]);
    }

    #[test]
    fn record_failure_aborts() {
        let queue = vec!["a", "b"];
        let result = run_batch(
            "test",
            &queue,
            |i| i,
            &no_pause(),
            &ProgressBar::hidden(),
            || false,
            |_| Ok(()),
            |_, ()| Err(StoreError::Io(std::io::Error::other("disk gone"))),
        );
        assert!(result.is_err());
    }

    #[test]
    fn items_processed_in_order() {
        let queue = vec!["1", "2", "3"];
        let mut seen = Vec::new();
        run_batch(
            "test",
            &queue,
            |i| i,
            &no_pause(),
            &ProgressBar::hidden(),
            || false,
            |item| {
                seen.push(item.to_string());
                Ok(())
            },
            |_, ()| Ok(()),
        )
        .unwrap();
        assert_eq!(seen, vec!["1", "2", "3"]);
    }

    #[test]
    fn stop_request_ends_batch_between_items() {
        let queue = vec!["a", "b", "c"];
        let mut fetched = 0usize;
        let report = run_batch(
            "test",
            &queue,
            |i| i,
            &no_pause(),
            &ProgressBar::hidden(),
            {
                // Stop after the first item has completed.
                let count = std::cell::Cell::new(0);
                move || {
                    let stop = count.get() >= 1;
                    count.set(count.get() + 1);
                    stop
                }
            },
            |_| {
                fetched += 1;
                Ok(())
            },
            |_, ()| Ok(()),
        )
        .unwrap();

        assert!(report.interrupted);
        assert_eq!(report.attempted, 1);
        assert_eq!(fetched, 1);
    }

    #[test]
    fn typed_result_carries_fetch_output_to_record() {
        let queue = vec![2u32, 3];
        let mut sums = Vec::new();
        run_batch(
            "test",
            &queue,
            |_| "n",
            &no_pause(),
            &ProgressBar::hidden(),
            || false,
            |n| Ok(n * 10),
            |n, r| {
                sums.push(n + r);
                Ok(())
            },
        )
        .unwrap();
        assert_eq!(sums, vec![22, 33]);
    }

    #[test]
    fn empty_queue_reports_zeroes() {
        let queue: Vec<&str> = Vec::new();
        let report = run_batch(
            "test",
            &queue,
            |i| *i,
            &no_pause(),
            &ProgressBar::hidden(),
            || false,
            |_| Ok(()),
            |_, ()| Ok(()),
        )
        .unwrap();
        assert_eq!(report.attempted, 0);
        assert!(!report.interrupted);
    }
}
