//! Logstash Probe - Zabbix probe for a Logstash node
//!
//! Polls the node's monitoring API once per invocation:
//! - Fetches `/_node/stats/` over HTTP (5 s timeout, no retry)
//! - Flattens JVM, process and pipeline event statistics into Zabbix keys
//! - Writes `zabbix_sender` input lines on stdout, logs on stderr
//! - Prints and exits with the sender's code (1 when setup or collection fails,
//!   2 when sending fails)

mod cli;
mod config;
mod error;
mod fetch;
mod metrics;
mod probe;
mod runner;
mod sender;

use anyhow::{Context, Result};
use clap::Parser;
use cli::CliArgs;
use config::ProbeConfig;
use probe::LogstashProbe;
use runner::ProbeRunner;
use sender::ZabbixSenderOutput;
use std::io::Write;
use tracing::{error, info};
use tracing_subscriber::EnvFilter;

/// Resolves configuration, builds the probe and runs it once
async fn run<W: Write>(args: &CliArgs, out: W) -> Result<i32> {
    let config = ProbeConfig::load(args.config.as_deref())
        .context("Failed to load configuration")?
        .with_overrides(args.host.clone(), args.port);
    config.validate().context("Invalid configuration")?;

    let probe = LogstashProbe::new(&config)
        .context("Failed to create HTTP client")?;
    info!("Reporting as host {}", probe.hostname());

    let mut runner = ProbeRunner::new(ZabbixSenderOutput::new(out));
    Ok(runner.run(&probe, args.mode()).await)
}

/// Exit code for a finished run; setup failures count as failed collection
fn exit_code(outcome: Result<i32>) -> i32 {
    match outcome {
        Ok(code) => code,
        Err(e) => {
            error!("Probe execution failed: {:#}", e);
            runner::EXIT_COLLECT_FAILED
        }
    }
}

#[tokio::main(flavor = "current_thread")]
async fn main() {
    let args = CliArgs::parse();

    // Initialize logging; RUST_LOG wins over -v
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(format!("logstash_probe={}", args.log_level())));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();

    let code = exit_code(run(&args, std::io::stdout()).await);

    // stdout carries sender lines only
    eprintln!("{}", code);
    std::process::exit(code);
}

#[cfg(test)]
mod tests {
    use super::*;
    use probe_devkit::{localhost_binding_permitted, TestHarness};

    fn args_for(harness: &TestHarness, extra: &[&str]) -> CliArgs {
        let host = harness.logstash.host();
        let port = harness.logstash.port().to_string();
        let mut argv = vec!["logstash-probe", "-H", host.as_str(), "-P", port.as_str()];
        argv.extend_from_slice(extra);
        CliArgs::try_parse_from(argv).unwrap()
    }

    #[tokio::test]
    async fn test_update_items_run() {
        if !localhost_binding_permitted() {
            return;
        }
        let harness = TestHarness::with_node_stats().await;
        let args = args_for(&harness, &[]);

        let code = run(&args, harness.output.clone()).await.unwrap();

        assert_eq!(code, 0);
        assert!(harness.logstash.was_polled());
        harness.assert_host(&harness.logstash.host()).unwrap();
        harness.assert_sent("logstash.zbx_version", "\"0.0.1\"").unwrap();
        harness.assert_sent("logstash.jvm.mem.heap_used_percent", "15").unwrap();
        harness.assert_sent("logstash.pipeline.events.in", "1210443").unwrap();
        harness.assert_sent("logstash.process.cpu.load_average.15m", "0.47").unwrap();
        harness.assert_sent("logstash.pipeline.events.queue_push_duration_in_millis", "81221").unwrap();
    }

    #[tokio::test]
    async fn test_discovery_run_does_not_poll() {
        if !localhost_binding_permitted() {
            return;
        }
        let harness = TestHarness::with_node_stats().await;
        let args = args_for(&harness, &["--discovery"]);

        let code = run(&args, harness.output.clone()).await.unwrap();

        assert_eq!(code, 0);
        assert!(!harness.logstash.was_polled());
        harness.assert_sent("logstash.node.discovery", r#""{\"data\":[]}""#).unwrap();
    }

    #[tokio::test]
    async fn test_http_error_exits_with_collect_failure() {
        if !localhost_binding_permitted() {
            return;
        }
        let mut harness = TestHarness::start().await;
        harness.logstash.fail_with(503).await;
        let args = args_for(&harness, &[]);

        let code = run(&args, harness.output.clone()).await.unwrap();

        assert_eq!(code, runner::EXIT_COLLECT_FAILED);
        assert!(harness.output.lines().is_empty());
    }

    #[tokio::test]
    async fn test_malformed_section_exits_with_collect_failure() {
        if !localhost_binding_permitted() {
            return;
        }
        let mut harness = TestHarness::start().await;
        harness
            .serve(&probe_devkit::StatsFixture::builder().without("pipeline.events").build())
            .await;
        let args = args_for(&harness, &[]);

        let code = run(&args, harness.output.clone()).await.unwrap();

        assert_eq!(code, runner::EXIT_COLLECT_FAILED);
        assert!(harness.output.contents().is_empty());
    }

    #[tokio::test]
    async fn test_missing_config_file_is_error() {
        let args = CliArgs::try_parse_from(["logstash-probe", "-c", "/nonexistent/logstash-probe.toml"]).unwrap();
        assert!(run(&args, Vec::new()).await.is_err());
    }

    #[tokio::test]
    async fn test_setup_failure_maps_to_collect_failure() {
        let args = CliArgs::try_parse_from(["logstash-probe", "-c", "/nonexistent/logstash-probe.toml"]).unwrap();
        assert_eq!(exit_code(run(&args, Vec::new()).await), runner::EXIT_COLLECT_FAILED);

        let args = CliArgs::try_parse_from(["logstash-probe", "-H", " "]).unwrap();
        assert_eq!(exit_code(run(&args, Vec::new()).await), runner::EXIT_COLLECT_FAILED);
    }

    #[test]
    fn test_exit_code_passes_run_result_through() {
        assert_eq!(exit_code(Ok(0)), 0);
        assert_eq!(exit_code(Ok(runner::EXIT_SEND_FAILED)), runner::EXIT_SEND_FAILED);
    }

    #[tokio::test]
    async fn test_probe_events_reach_test_logger() {
        if !localhost_binding_permitted() {
            return;
        }
        let _harness = TestHarness::start().await;

        let fetch_error = log::Metadata::builder()
            .target("logstash_probe::fetch")
            .level(log::Level::Error)
            .build();
        assert!(log::logger().enabled(&fetch_error));
    }
}
