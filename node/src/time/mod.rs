mod logic;

pub use logic::lamport_clock::LamportClock;

use network::types::{ProcessId, Timestamp};

/// The three Lamport transition rules. Every call advances the clock by at least one.
pub trait LogicalTimeProvider {
    fn new_with_id(id: ProcessId) -> Self;
    fn id(&self) -> ProcessId;
    fn now(&self) -> Timestamp;
    fn local_event(&mut self) -> Timestamp;
    /// One tick per send, however many recipients the message reaches.
    fn send_event(&mut self) -> Timestamp;
    /// `max(now, incoming) + 1`.
    fn receive_event(&mut self, incoming: Timestamp) -> Timestamp;
}
