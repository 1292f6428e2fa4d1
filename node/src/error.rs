use network::types::{MessageId, ProcessId, Timestamp};

/// Coarse classification of failures, stable across error variants.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ErrorKind {
    /// The simulation was asked to start with an unusable process count.
    InvalidConfiguration,
    /// A process index, message id or queue position names nothing that exists.
    OutOfRange,
    /// The operation needs processes and there are none.
    InvalidState,
}

impl ErrorKind {
    pub fn code(self) -> &'static str {
        match self {
            ErrorKind::InvalidConfiguration => "invalid-configuration",
            ErrorKind::OutOfRange => "out-of-range",
            ErrorKind::InvalidState => "invalid-state",
        }
    }
}

/// Every failure leaves the simulator exactly as it was before the call.
#[derive(thiserror::Error, Debug, Clone, PartialEq, Eq)]
pub enum SimulatorError {
    #[error("process count must be a positive integer that fits in u32, got {requested}")]
    InvalidConfiguration { requested: usize },
    #[error("invalid workload: {0}")]
    InvalidWorkload(String),
    #[error("process index {index} is out of range, simulation has {count} processes")]
    ProcessOutOfRange { index: usize, count: usize },
    #[error("message {id} is not queued for {recipient}")]
    MessageNotFound { id: MessageId, recipient: ProcessId },
    #[error("{recipient} has {pending} pending messages, position {position} is out of range")]
    PositionOutOfRange {
        recipient: ProcessId,
        position: usize,
        pending: usize,
    },
    #[error("clock of {process} cannot advance past {timestamp}")]
    ClockOverflow {
        process: ProcessId,
        timestamp: Timestamp,
    },
    #[error("simulation has no processes yet")]
    Uninitialized,
}

impl SimulatorError {
    pub fn kind(&self) -> ErrorKind {
        match self {
            SimulatorError::InvalidConfiguration { .. } | SimulatorError::InvalidWorkload(_) => {
                ErrorKind::InvalidConfiguration
            }
            SimulatorError::ProcessOutOfRange { .. }
            | SimulatorError::MessageNotFound { .. }
            | SimulatorError::PositionOutOfRange { .. }
            | SimulatorError::ClockOverflow { .. } => ErrorKind::OutOfRange,
            SimulatorError::Uninitialized => ErrorKind::InvalidState,
        }
    }
}
