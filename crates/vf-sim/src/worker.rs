//! Background runner: drives a simulation on its own thread and forwards
//! messages over a channel.
//!
//! The channel holds one message, so the run waits for its consumer after
//! each batch and a cancel lands at the next batch boundary.

use std::sync::Arc;
use std::sync::mpsc::{Receiver, sync_channel};
use std::thread::{self, JoinHandle};

use tracing::debug;

use crate::cancel::CancelToken;
use crate::config::{InitialConditions, SimulationConfig};
use crate::driver::SimulationDriver;
use crate::error::SimResult;
use crate::record::StreamMessage;
use vf_fluids::PropertyProvider;

/// Messages the run may produce ahead of its consumer.
const MESSAGE_BOUND: usize = 1;

pub struct SimulationWorker {
    pub messages: Receiver<StreamMessage>,
    cancel: CancelToken,
    handle: JoinHandle<()>,
}

impl SimulationWorker {
    /// Run an initialized driver on a new thread.
    pub fn start(driver: SimulationDriver) -> Self {
        let (tx, rx) = sync_channel(MESSAGE_BOUND);
        let cancel = driver.cancel_token();

        let handle = thread::spawn(move || {
            for message in driver {
                if tx.send(message).is_err() {
                    debug!("message receiver dropped, stopping run");
                    break;
                }
            }
        });

        Self {
            messages: rx,
            cancel,
            handle,
        }
    }

    /// Initialize on the caller's thread, then run in the background.
    ///
    /// Configuration and initial property errors are returned here, before
    /// any thread is spawned.
    pub fn spawn(
        config: SimulationConfig,
        initial: InitialConditions,
        provider: Arc<dyn PropertyProvider>,
    ) -> SimResult<Self> {
        let driver = SimulationDriver::with_provider(config, initial, provider)?;
        Ok(Self::start(driver))
    }

    /// Ask the run to stop at its next batch boundary.
    pub fn cancel(&self) {
        self.cancel.cancel();
    }

    pub fn join(self) -> thread::Result<()> {
        self.handle.join()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::VesselSpec;
    use vf_fluids::PengRobinson;

    fn vessel(pressure: f64) -> VesselSpec {
        VesselSpec {
            pressure,
            temperature: 300.0,
            volume: 0.2,
        }
    }

    #[test]
    fn messages_arrive_in_order_and_end_terminal() {
        let config = SimulationConfig {
            opening_time: Some(0.5),
            max_simulation_time: Some(100.0),
            ..SimulationConfig::new(1e-4)
        };
        let initial = InitialConditions {
            upstream: vessel(5e5),
            downstream: vessel(1e5),
        };
        let worker = SimulationWorker::spawn(config, initial, Arc::new(PengRobinson::new())).unwrap();

        let messages: Vec<StreamMessage> = worker.messages.iter().collect();
        let last = messages.last().unwrap();
        assert!(matches!(last, StreamMessage::Complete { .. }));
        assert!(messages[..messages.len() - 1].iter().all(|m| !m.is_terminal()));
        let total: usize = messages.iter().map(|m| m.rows().len()).sum();
        assert_eq!(total, last.total_rows());
        worker.join().unwrap();
    }
}
