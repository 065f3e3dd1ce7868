//! Heartbeat emitter.
//!
//! The acceptor refuses money unless it keeps hearing `h` from the host, so a
//! crashed or restarting daemon cannot take deposits it will never credit.
//! The emitter runs for the lifetime of the process, independent of the
//! session state.

use std::time::Duration;

use tokio::task::JoinHandle;
use tokio::time::MissedTickBehavior;
use tracing::{debug, info};

use kiosk_core::constants::DEFAULT_HEARTBEAT_MS;
use kiosk_protocol::DeviceCommand;

use crate::CommandSender;

/// Periodic `h` writer.
#[derive(Debug, Clone)]
pub struct HeartbeatEmitter {
    commands: CommandSender,
    period: Duration,
}

impl HeartbeatEmitter {
    pub fn new(commands: CommandSender, period: Duration) -> Self {
        Self { commands, period }
    }

    /// Emitter with the default one second period.
    pub fn with_default_period(commands: CommandSender) -> Self {
        Self::new(commands, Duration::from_millis(DEFAULT_HEARTBEAT_MS))
    }

    pub fn period(&self) -> Duration {
        self.period
    }

    /// Send a heartbeat every period until the command link closes.
    ///
    /// A dropped heartbeat is logged by the sender and the loop carries on.
    pub async fn run(self) {
        info!(period_ms = self.period.as_millis() as u64, "Heartbeat started");

        let mut interval = tokio::time::interval(self.period);
        interval.set_missed_tick_behavior(MissedTickBehavior::Delay);

        loop {
            interval.tick().await;

            if self.commands.is_closed() {
                debug!("Command link closed, heartbeat stopping");
                break;
            }

            self.commands.send(DeviceCommand::Heartbeat);
        }
    }

    /// Spawn [`run`](Self::run) on the runtime.
    pub fn spawn(self) -> JoinHandle<()> {
        tokio::spawn(self.run())
    }
}
