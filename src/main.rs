mod config;
mod scheduler;
mod prober;
mod metrics;
mod report;
mod stats;
#[cfg(test)]
mod testutil;

use config::{Cli, Config};
use scheduler::Scheduler;

use clap::Parser;
use tracing::info;

#[tokio::main(flavor = "multi_thread", worker_threads = 4)]
async fn main() -> anyhow::Result<()> {
    // Load config first to get log level; bad urls abort here, before any request
    let config = Config::load(Cli::parse()).await?;
    let log_level = config.get_tracing_level()?;

    // Logs go to stderr, the report owns stdout
    tracing_subscriber::fmt()
        .with_writer(std::io::stderr)
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env()
                         .add_directive(format!("http_latency={}", log_level.as_str().to_lowercase()).parse()?))
        .init();

    info!(
        "measuring {} targets, {} rounds, timeout {:?}",
        config.targets.len(),
        config.count,
        config.timeout
    );

    let scheduler = Scheduler::new(config.count, config.timeout)?;
    let stats = scheduler
        .run(&config.targets, |_, round| {
            for outcome in &round.outcomes {
                println!("{}", report::outcome_line(outcome));
                metrics::observe_outcome(outcome);
            }
            for target in &round.timed_out {
                println!("{}", report::timeout_line(target));
                metrics::inc_timeout(target);
            }
        })
        .await;

    info!("{} rounds complete", stats.rounds);
    println!("{}", report::summary(&stats));

    if let Some(path) = &config.metrics_file {
        metrics::write_textfile(path).await?;
        info!("metrics written to {}", path.display());
    }

    if config.strict && stats.failed() > 0 {
        anyhow::bail!(
            "{} of {} requests failed or timed out",
            stats.failed(),
            stats.requests
        );
    }

    Ok(())
}
