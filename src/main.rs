use std::time::Duration;

use anyhow::Context;
use clap::Parser;
use log::info;

use pulse_relay::config::Args;
use pulse_relay::estimator::RatioEstimator;
use pulse_relay::pipeline::Pipeline;
use pulse_relay::reporter::{HttpCollector, Reporter};
use pulse_relay::sensor::SyntheticSource;

fn main() -> Result<(), Box<dyn std::error::Error>> {
    // Initialize logger
    env_logger::init();

    let args = Args::parse();

    let collector = HttpCollector::new(
        args.endpoint.clone(),
        args.token.clone(),
        Duration::from_millis(args.post_timeout_ms),
    );

    // An unreachable collector at boot is fatal: exit with an error and
    // let the supervisor restart us once the network is back.
    info!("checking collector reachability at {}", args.endpoint);
    collector
        .probe(Duration::from_millis(args.boot_timeout_ms))
        .context("boot-time connectivity check failed")?;

    // A hardware driver would slot in here behind the same trait; its
    // constructor failing (sensor not detected) is equally fatal.
    let source = SyntheticSource::new(args.sample_rate_hz, args.synthetic_bpm, args.synthetic_spo2);
    let estimator = RatioEstimator::new(args.sample_rate_hz);
    let reporter = Reporter::new(args.device_id, args.user_id, collector);

    let mut pipeline = Pipeline::new(
        source,
        estimator,
        reporter,
        args.window_size,
        Duration::from_millis(args.update_interval_ms),
    );

    pipeline.prime();
    pipeline.run();

    Ok(())
}
