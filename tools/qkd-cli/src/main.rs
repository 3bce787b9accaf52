//! qkd-cli: BB84 session runner
//!
//! Runs one or more key distribution sessions with a simulated channel and
//! prints the resulting keys.

mod args;

use std::sync::Arc;

use anyhow::Context;
use clap::Parser;
use qkd_bb84::domain::bits_to_string;
use qkd_bb84::{BB84Result, Bb84Service, KeyDistributionApi, Metrics};
use qkd_telemetry::{init_telemetry, log_run_event, TelemetryConfig};

use args::Args;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let args = Args::parse();

    let mut telemetry = TelemetryConfig::from_env();
    if let Some(level) = &args.log_level {
        telemetry = telemetry.with_log_level(level.clone());
    }
    init_telemetry(&telemetry).context("initializing telemetry")?;

    let config = args.protocol_config()?;
    let metrics = Arc::new(Metrics::new());
    let service = Bb84Service::with_metrics(metrics.clone());

    let mut failures = 0u32;
    for run in 0..args.runs {
        let run_config = match config.seed {
            Some(seed) => config.clone().with_seed(seed.wrapping_add(u64::from(run))),
            None => config.clone(),
        };

        match service.generate_key(&run_config).await {
            Ok(result) => {
                log_run_event!(
                    info,
                    run,
                    "Key delivered",
                    key_bits = result.key_bits.len(),
                    qber = result.qber_sample,
                    raw_transmissions = result.raw_transmissions
                );
                print_result(run, &result, args.json)?;
            }
            Err(e) => {
                failures += 1;
                log_run_event!(
                    warn,
                    run,
                    "Session failed",
                    security_violation = e.is_security_violation(),
                    error = %e
                );
                if args.runs == 1 {
                    return Err(e).context("BB84 session failed");
                }
            }
        }
    }

    if args.runs > 1 {
        let snapshot = metrics.snapshot();
        eprintln!(
            "runs: {}  accepted: {}  aborted: {}  channel failures: {}  sift yield: {:.3}  aggregate QBER: {:.4}",
            snapshot.runs_started,
            snapshot.keys_accepted,
            snapshot.security_aborts,
            snapshot.channel_failures,
            metrics.sift_yield(),
            metrics.aggregate_qber(),
        );
    }

    if failures > 0 && failures == args.runs {
        anyhow::bail!("all {failures} sessions failed");
    }
    Ok(())
}

fn print_result(run: u32, result: &BB84Result, json: bool) -> anyhow::Result<()> {
    if json {
        println!("{}", serde_json::to_string(result)?);
        return Ok(());
    }

    let qber = if result.qber_sample.is_nan() {
        "unchecked".to_string()
    } else {
        format!("{:.4}", result.qber_sample)
    };

    println!("run {run}");
    println!("  key ({} bits): {}", result.key_bits.len(), bits_to_string(&result.key_bits));
    println!("  qber:          {qber}");
    println!("  transmissions: {}", result.raw_transmissions);
    println!("  sifted:        {}", result.sifted_size_before_sample);
    Ok(())
}
