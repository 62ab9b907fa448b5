//! One probe run: collect in the requested mode, send, map the outcome to an exit code

use crate::probe::{Probe, ProbePayload};
use crate::sender::Sender;
use tracing::{error, info};

/// Data collection failed (transport or schema error); nothing was sent
pub const EXIT_COLLECT_FAILED: i32 = 1;
/// Data was collected but could not be delivered
pub const EXIT_SEND_FAILED: i32 = 2;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Mode {
    /// Report item values
    UpdateItems,
    /// Report low-level discovery data
    Discovery,
}

pub struct ProbeRunner<S: Sender> {
    sender: S,
}

impl<S: Sender> ProbeRunner<S> {
    pub fn new(sender: S) -> Self {
        Self { sender }
    }

    pub async fn run<P: Probe>(&mut self, probe: &P, mode: Mode) -> i32 {
        info!("Running probe in {:?} mode", mode);

        let collected = match mode {
            Mode::Discovery => probe.discovery().await.map(ProbePayload::Discovery),
            Mode::UpdateItems => probe.metrics().await.map(ProbePayload::Metrics),
        };

        let payload = match collected {
            Ok(payload) => payload,
            Err(e) => {
                error!("Failed to collect probe data: {}", e);
                return EXIT_COLLECT_FAILED;
            }
        };

        match self.sender.send(&payload) {
            Ok(code) => code,
            Err(e) => {
                error!("Failed to send probe data: {:#}", e);
                EXIT_SEND_FAILED
            }
        }
    }
}
