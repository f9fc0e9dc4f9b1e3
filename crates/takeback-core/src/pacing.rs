//! Randomized inter-item pauses to stay under remote rate limits

use std::time::Duration;

use rand::Rng;

/// Inclusive bounds, in whole seconds, for the pause between items.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Pacing {
    min_secs: u64,
    max_secs: u64,
}

impl Pacing {
    /// Returns `None` when the bounds are inverted.
    pub fn new(min_secs: u64, max_secs: u64) -> Option<Self> {
        if min_secs > max_secs {
            return None;
        }
        Some(Self { min_secs, max_secs })
    }

    /// Draw a pause duration uniformly from the inclusive range.
    pub fn pick(&self) -> Duration {
        Duration::from_secs(rand::rng().random_range(self.min_secs..=self.max_secs))
    }

    /// Blocking sleep for one drawn pause.
    pub fn pause(&self) {
        let d = self.pick();
        log::debug!("sleeping {}s", d.as_secs());
        std::thread::sleep(d);
    }

    /// The range in gallery-dl's `--sleep MIN-MAX` argument form.
    pub fn range_arg(&self) -> String {
        format!("{}-{}", self.min_secs, self.max_secs)
    }
}

impl Default for Pacing {
    fn default() -> Self {
        Self {
            min_secs: 10,
            max_secs: 20,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn rejects_inverted_bounds() {
        assert!(Pacing::new(20, 10).is_none());
        assert!(Pacing::new(10, 10).is_some());
    }

    #[test]
    fn pick_stays_within_bounds() {
        let pacing = Pacing::new(2, 5).unwrap();
        for _ in 0..200 {
            let d = pacing.pick().as_secs();
            assert!((2..=5).contains(&d), "picked {d}s");
        }
    }

    #[test]
    fn equal_bounds_are_exact() {
        let pacing = Pacing::new(3, 3).unwrap();
        assert_eq!(pacing.pick(), Duration::from_secs(3));
    }

    #[test]
    fn range_arg_format() {
        assert_eq!(Pacing::new(10, 20).unwrap().range_arg(), "10-20");
    }
}
