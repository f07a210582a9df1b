use crate::common::*;

/// Counts processed samples and reports the throughput once per interval.
#[derive(Debug)]
pub struct RateCounter {
    count: usize,
    total: usize,
    since: Instant,
    interval: Duration,
}

impl RateCounter {
    pub fn new(interval: Duration) -> Self {
        Self {
            count: 0,
            total: 0,
            since: Instant::now(),
            interval,
        }
    }

    pub fn with_second_interval() -> Self {
        Self::new(Duration::from_secs(1))
    }

    pub fn add(&mut self, num_samples: usize) {
        self.count += num_samples;
        self.total += num_samples;
    }

    /// The number of samples counted since creation.
    pub fn total(&self) -> usize {
        self.total
    }

    /// Returns samples per second once the interval has elapsed, then starts a new interval.
    pub fn rate(&mut self) -> Option<f64> {
        let elapsed = self.since.elapsed();
        if elapsed < self.interval {
            return None;
        }

        let rate = self.count as f64 / elapsed.as_secs_f64();
        self.count = 0;
        self.since = Instant::now();
        Some(rate)
    }
}
