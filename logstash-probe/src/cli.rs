use clap::{ArgAction, Parser};
use std::path::PathBuf;

use crate::runner::Mode;

/// Command-line arguments for the Logstash probe
#[derive(Parser, Debug, Clone)]
#[command(
    name = "logstash-probe",
    version = env!("CARGO_PKG_VERSION"),
    about = "Zabbix probe for Logstash node statistics",
    long_about = "Polls the Logstash monitoring API (/_node/stats/), flattens JVM, process and pipeline event statistics into Zabbix item keys and writes them as zabbix_sender input lines."
)]
pub struct CliArgs {
    /// Logstash server hostname [default: localhost]
    #[arg(short = 'H', value_name = "HOST")]
    pub host: Option<String>,

    /// Logstash server port [default: 9600]
    #[arg(short = 'P', value_name = "PORT", value_parser = clap::value_parser!(u16).range(1..))]
    pub port: Option<u16>,

    /// Send item values (default mode)
    #[arg(long = "update-items", conflicts_with = "discovery")]
    pub update_items: bool,

    /// Send low-level discovery data instead of item values
    #[arg(long = "discovery")]
    pub discovery: bool,

    /// Config file (TOML)
    #[arg(short = 'c', long = "config", value_name = "FILE")]
    pub config: Option<PathBuf>,

    /// Increase log verbosity (-v, -vv, -vvv)
    #[arg(short = 'v', action = ArgAction::Count)]
    pub verbose: u8,
}

impl CliArgs {
    pub fn mode(&self) -> Mode {
        if self.discovery {
            Mode::Discovery
        } else {
            Mode::UpdateItems
        }
    }

    /// Log filter derived from `-v`
    pub fn log_level(&self) -> &'static str {
        match self.verbose {
            0 => "warn",
            1 => "info",
            2 => "debug",
            _ => "trace",
        }
    }
}
