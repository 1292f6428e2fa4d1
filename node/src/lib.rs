mod error;
mod shared;
mod simulator;
mod snapshot;
mod time;
pub mod workload;

#[cfg(test)]
mod tests;

pub use error::{ErrorKind, SimulatorError};
pub use network::message::Message;
pub use network::types::{MessageId, ParseIdError, ProcessId, Timestamp};
pub use shared::SharedSimulator;
pub use simulator::{SendOutcome, SimulationState, Simulator, MAX_PROCESSES};
pub use snapshot::{Snapshot, SnapshotHistory};
pub use time::{LamportClock, LogicalTimeProvider};
