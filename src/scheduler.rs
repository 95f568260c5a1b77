use std::time::Duration;
use tokio::sync::mpsc;
use tokio::task::JoinHandle;
use tokio::time::{sleep_until, Instant};
use anyhow::{bail, Result};
use tracing::{debug, info};

use crate::prober::{self, RequestOutcome, Target};
use crate::stats::AggregateStats;

/// What one round managed to collect before its deadline.
#[derive(Debug, Default)]
pub struct RoundResult {
    /// Arrival order, not target order.
    pub outcomes: Vec<RequestOutcome>,
    /// Targets with no outcome by the deadline, in target order.
    pub timed_out: Vec<Target>,
}

impl RoundResult {
    /// Number of targets the round was started with.
    pub fn len(&self) -> usize {
        self.outcomes.len() + self.timed_out.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn total_duration(&self) -> Duration {
        self.outcomes.iter().map(|o| o.elapsed).sum()
    }
}

pub struct Scheduler {
    rounds: u32,
    timeout: Duration,
}

impl Scheduler {
    pub fn new(rounds: u32, timeout: Duration) -> Result<Self> {
        if rounds == 0 {
            bail!("round count must be at least 1");
        }
        Ok(Self { rounds, timeout })
    }

    /// Runs every round back to back, handing each result to `on_round`
    /// before folding it into the returned stats.
    pub async fn run<J>(&self, targets: &[Target], mut on_round: J) -> AggregateStats
    where
        J: FnMut(u32, &RoundResult),
    {
        let mut stats = AggregateStats::default();
        for round in 0..self.rounds {
            let result = self.run_round(targets).await;
            info!(
                "round {} finished: {} received, {} timed out",
                round + 1,
                result.outcomes.len(),
                result.timed_out.len()
            );
            on_round(round, &result);
            stats.record(&result);
        }
        stats
    }

    /// Fires one request per target and collects until all have reported or
    /// the round deadline passes, whichever comes first.
    pub async fn run_round(&self, targets: &[Target]) -> RoundResult {
        if targets.is_empty() {
            return RoundResult::default();
        }

        let deadline = Instant::now() + self.timeout;
        let (tx, mut rx) = mpsc::channel::<RequestOutcome>(1);
        let handles: Vec<JoinHandle<()>> = targets
            .iter()
            .cloned()
            .enumerate()
            .map(|(slot, target)| tokio::spawn(prober::http::probe_http(slot, target, tx.clone())))
            .collect();
        drop(tx);

        let expiry = sleep_until(deadline);
        tokio::pin!(expiry);

        let mut reported = vec![false; targets.len()];
        let mut outcomes = Vec::with_capacity(targets.len());
        for _ in 0..targets.len() {
            // once the deadline is gone every remaining slot is a timeout
            if Instant::now() >= deadline {
                break;
            }
            tokio::select! {
                biased;
                _ = &mut expiry => break,
                Some(outcome) = rx.recv() => {
                    reported[outcome.slot] = true;
                    outcomes.push(outcome);
                }
            }
        }

        let mut timed_out = Vec::new();
        for ((target, handle), done) in targets.iter().zip(handles).zip(&reported) {
            if !done {
                debug!("{} timed out, abandoning request", target);
                handle.abort();
                timed_out.push(target.clone());
            }
        }

        RoundResult { outcomes, timed_out }
    }
}
