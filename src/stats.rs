use std::time::Duration;

use crate::scheduler::RoundResult;

pub fn truncate_millis(d: Duration) -> Duration {
    Duration::from_millis(d.as_millis() as u64)
}

pub fn min_duration(values: &[Duration]) -> Duration {
    truncate_millis(values.iter().copied().min().unwrap_or_default())
}

pub fn max_duration(values: &[Duration]) -> Duration {
    truncate_millis(values.iter().copied().max().unwrap_or_default())
}

pub fn avg_duration(values: &[Duration]) -> Duration {
    if values.is_empty() {
        return Duration::ZERO;
    }
    let total: u128 = values.iter().map(Duration::as_nanos).sum();
    let avg = total / values.len() as u128;
    truncate_millis(Duration::from_nanos(avg as u64))
}

/// Totals accumulated over a whole run, folded in one round at a time.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct AggregateStats {
    pub rounds: u32,
    pub requests: usize,
    pub received: usize,
    pub errors: usize,
    pub timed_out: usize,
    /// Sum of error-free request durations.
    pub successful_time: Duration,
    /// Per-round sums of collected request durations; empty rounds are skipped.
    pub round_durations: Vec<Duration>,
}

impl AggregateStats {
    pub fn record(&mut self, round: &RoundResult) {
        self.rounds += 1;
        self.requests += round.len();
        self.received += round.outcomes.len();
        self.timed_out += round.timed_out.len();

        for outcome in &round.outcomes {
            if outcome.is_success() {
                self.successful_time += outcome.elapsed;
            } else {
                self.errors += 1;
            }
        }

        let total = round.total_duration();
        if !total.is_zero() {
            self.round_durations.push(total);
        }
    }

    pub fn failed(&self) -> usize {
        self.errors + self.timed_out
    }

    pub fn timeout_percent(&self) -> f64 {
        if self.requests == 0 {
            return 0.0;
        }
        (self.timed_out * 100) as f64 / self.requests as f64
    }

    pub fn min(&self) -> Duration {
        min_duration(&self.round_durations)
    }

    pub fn max(&self) -> Duration {
        max_duration(&self.round_durations)
    }

    pub fn avg(&self) -> Duration {
        avg_duration(&self.round_durations)
    }
}
