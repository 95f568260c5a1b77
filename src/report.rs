use crate::prober::{RequestOutcome, Target};
use crate::stats::{truncate_millis, AggregateStats};

pub fn outcome_line(outcome: &RequestOutcome) -> String {
    match &outcome.error {
        None => format!("{}: {:?}", outcome.target, outcome.elapsed),
        Some(e) => format!("{}: {:?} (error: {:#})", outcome.target, outcome.elapsed, e),
    }
}

pub fn timeout_line(target: &Target) -> String {
    format!("{}: timeout", target)
}

pub fn summary(stats: &AggregateStats) -> String {
    format!(
        "Summary\nreceived: {}/{}\ntimeout: {} ({:.2}%)\nerrors: {}\ntotal time: {:?}\nmin: {:?}\nmax: {:?}\navg: {:?}",
        stats.received,
        stats.requests,
        stats.timed_out,
        stats.timeout_percent(),
        stats.errors,
        truncate_millis(stats.successful_time),
        stats.min(),
        stats.max(),
        stats.avg(),
    )
}
