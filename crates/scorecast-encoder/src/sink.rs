//! Bridge from encoder threads into the controller's command queue.

use crossbeam_channel::{Sender, TrySendError};
use tracing::{trace, warn};

use scorecast_ipc::ControllerCommand;

/// Posts raw encoder status signals into the controller's queue.
///
/// The encoder calls this from whatever thread it reports on. The signal is
/// only classified and applied once the controller dequeues it.
#[derive(Debug, Clone)]
pub struct StatusSink {
    tx: Sender<ControllerCommand>,
}

impl StatusSink {
    /// Create a sink that feeds the given command channel.
    pub fn new(tx: Sender<ControllerCommand>) -> Self {
        Self { tx }
    }

    /// Forward a status signal. Returns false if it was dropped.
    ///
    /// Never blocks: a full queue drops the signal, a closed queue means the
    /// controller is gone and the signal no longer matters.
    pub fn emit(&self, code: impl Into<String>, payload: impl Into<String>) -> bool {
        let command = ControllerCommand::EncoderStatus {
            code: code.into(),
            payload: payload.into(),
        };

        match self.tx.try_send(command) {
            Ok(()) => true,
            Err(TrySendError::Full(_)) => {
                warn!("Command queue full, dropping encoder status");
                false
            }
            Err(TrySendError::Disconnected(_)) => {
                trace!("Controller gone, dropping encoder status");
                false
            }
        }
    }
}
