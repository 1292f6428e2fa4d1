use crate::error::SimulatorError;
use crate::snapshot::{Snapshot, SnapshotHistory};
use crate::time::{LamportClock, LogicalTimeProvider};
use network::message::Message;
use network::queue::MessageQueue;
use network::types::{MessageId, ProcessId, Timestamp};

/// Largest process count accepted by [`Simulator::create`].
pub const MAX_PROCESSES: usize = 1 << 16;

#[derive(Debug, Clone, Copy, PartialEq, Eq, serde::Serialize)]
#[serde(rename_all = "snake_case")]
pub enum SimulationState {
    Uninitialized,
    Active,
}

/// Result of a send event routed to its recipients.
#[derive(Debug, Clone, PartialEq, Eq, serde::Serialize)]
pub struct SendOutcome {
    pub sender: ProcessId,
    /// Post-send clock of the sender, carried by every message of the batch.
    pub timestamp: Timestamp,
    pub messages: Vec<MessageId>,
}

/// Owns the processes, the pending-message queue and the snapshot history.
///
/// Processes are addressed by their zero-based creation index. All clock changes go through the
/// [`LogicalTimeProvider`] rules of the addressed process.
#[derive(Debug, Default)]
pub struct Simulator {
    processes: Vec<LamportClock>,
    queue: MessageQueue,
    snapshots: SnapshotHistory,
}

impl Simulator {
    pub fn new(num_processes: usize) -> Result<Self, SimulatorError> {
        let mut simulator = Self::default();
        simulator.create(num_processes)?;
        Ok(simulator)
    }

    /// Replaces all processes with `num_processes` fresh clocks and drops the queue and history.
    ///
    /// `num_processes` must be in `1..=MAX_PROCESSES`; otherwise the current simulation is kept.
    pub fn create(&mut self, num_processes: usize) -> Result<(), SimulatorError> {
        let invalid = SimulatorError::InvalidConfiguration {
            requested: num_processes,
        };
        if !(1..=MAX_PROCESSES).contains(&num_processes) {
            return Err(invalid);
        }

        self.processes = (0..num_processes)
            .filter_map(ProcessId::from_index)
            .map(LamportClock::new_with_id)
            .collect();
        self.queue.clear();
        self.snapshots.clear();

        tracing::info!(processes = num_processes, "simulation created");

        Ok(())
    }

    pub fn state(&self) -> SimulationState {
        if self.processes.is_empty() {
            SimulationState::Uninitialized
        } else {
            SimulationState::Active
        }
    }

    pub fn process_count(&self) -> usize {
        self.processes.len()
    }

    pub fn process_ids(&self) -> impl Iterator<Item = ProcessId> + '_ {
        self.processes.iter().map(LamportClock::id)
    }

    fn process(&self, index: usize) -> Result<&LamportClock, SimulatorError> {
        if self.processes.is_empty() {
            return Err(SimulatorError::Uninitialized);
        }

        let count = self.processes.len();
        self.processes
            .get(index)
            .ok_or(SimulatorError::ProcessOutOfRange { index, count })
    }

    fn process_mut(&mut self, index: usize) -> Result<&mut LamportClock, SimulatorError> {
        self.process(index)?;
        Ok(&mut self.processes[index])
    }

    pub fn get_clock_value(&self, process_index: usize) -> Result<Timestamp, SimulatorError> {
        self.process(process_index).map(LamportClock::now)
    }

    /// Current counter of every process, in identifier order.
    pub fn clock_values(&self) -> Vec<(ProcessId, Timestamp)> {
        self.processes
            .iter()
            .map(|clock| (clock.id(), clock.now()))
            .collect()
    }

    pub fn local_event(&mut self, process_index: usize) -> Result<Timestamp, SimulatorError> {
        let clock = self.process_mut(process_index)?;
        ensure_can_advance(clock, 0)?;

        let ts = clock.local_event();
        tracing::debug!(process = %clock.id(), timestamp = ts, "local event");

        Ok(ts)
    }

    /// Ticks the sender once. Nothing is enqueued; see [`Simulator::send_message`].
    pub fn send_event(&mut self, process_index: usize) -> Result<Timestamp, SimulatorError> {
        let clock = self.process_mut(process_index)?;
        ensure_can_advance(clock, 0)?;

        let ts = clock.send_event();
        tracing::debug!(process = %clock.id(), timestamp = ts, "send event");

        Ok(ts)
    }

    /// Appends a message without a sender to the queue tail.
    pub fn enqueue(
        &mut self,
        recipient_index: usize,
        timestamp: Timestamp,
    ) -> Result<MessageId, SimulatorError> {
        let recipient = self.process(recipient_index)?.id();
        Ok(self.queue.enqueue(None, recipient, timestamp))
    }

    /// A send event followed by one message per distinct recipient, enqueued as one batch.
    ///
    /// Recipients are validated before the sender's clock moves, so a bad index leaves both the
    /// clock and the queue untouched. Duplicate recipients receive a single message.
    pub fn send_message(
        &mut self,
        sender_index: usize,
        recipient_indices: &[usize],
    ) -> Result<SendOutcome, SimulatorError> {
        let sender = self.process(sender_index)?;
        ensure_can_advance(sender, 0)?;
        let sender = sender.id();

        let mut recipients = Vec::with_capacity(recipient_indices.len());
        for &index in recipient_indices {
            let recipient = self.process(index)?.id();
            if !recipients.contains(&recipient) {
                recipients.push(recipient);
            }
        }

        let timestamp = self.send_event(sender_index)?;
        let messages = self
            .queue
            .enqueue_batch(sender, recipients.iter().copied(), timestamp);

        tracing::debug!(
            %sender,
            timestamp,
            recipients = recipients.len(),
            "message sent"
        );

        Ok(SendOutcome {
            sender,
            timestamp,
            messages,
        })
    }

    /// Applies the receive rule directly, bypassing the queue.
    pub fn receive_event(
        &mut self,
        receiver_index: usize,
        timestamp: Timestamp,
    ) -> Result<Timestamp, SimulatorError> {
        let clock = self.process_mut(receiver_index)?;
        ensure_can_advance(clock, timestamp)?;

        let prior = clock.now();
        let ts = clock.receive_event(timestamp);
        tracing::debug!(
            process = %clock.id(),
            prior,
            incoming = timestamp,
            timestamp = ts,
            "receive event"
        );

        Ok(ts)
    }

    /// Consumes the queued message `message_id` addressed to the receiver and applies its
    /// timestamp.
    pub fn process_message(
        &mut self,
        receiver_index: usize,
        message_id: MessageId,
    ) -> Result<Timestamp, SimulatorError> {
        let receiver = self.process(receiver_index)?;
        let recipient = receiver.id();
        let not_found = SimulatorError::MessageNotFound {
            id: message_id,
            recipient,
        };

        let timestamp = match self.queue.get(message_id) {
            Some(msg) if msg.recipient() == recipient => msg.sender_timestamp(),
            _ => return Err(not_found),
        };
        ensure_can_advance(receiver, timestamp)?;

        let Some(message) = self.queue.remove(message_id) else {
            return Err(not_found);
        };
        tracing::debug!(message_id = %message.id(), %recipient, "message delivered");

        self.receive_event(receiver_index, message.sender_timestamp())
    }

    /// Delivers the `position`-th message (zero-based) of the receiver's own pending list.
    pub fn process_message_at(
        &mut self,
        receiver_index: usize,
        position: usize,
    ) -> Result<Timestamp, SimulatorError> {
        let recipient = self.process(receiver_index)?.id();

        let message_id = self
            .queue
            .pending_for(recipient)
            .nth(position)
            .map(Message::id)
            .ok_or_else(|| SimulatorError::PositionOutOfRange {
                recipient,
                position,
                pending: self.queue.pending_for(recipient).count(),
            })?;

        self.process_message(receiver_index, message_id)
    }

    /// Every undelivered message in send order.
    pub fn pending(&self) -> &MessageQueue {
        &self.queue
    }

    /// Undelivered messages addressed to one process, in send order.
    pub fn pending_for(&self, recipient_index: usize) -> Result<Vec<&Message>, SimulatorError> {
        let recipient = self.process(recipient_index)?.id();
        Ok(self.queue.pending_for(recipient).collect())
    }

    pub fn take_snapshot(&mut self) -> Result<Snapshot, SimulatorError> {
        if self.processes.is_empty() {
            return Err(SimulatorError::Uninitialized);
        }

        let snapshot = Snapshot::capture(self.snapshots.len(), &self.processes);
        self.snapshots.push(snapshot.clone());

        tracing::info!(
            sequence = snapshot.sequence(),
            processes = snapshot.len(),
            "snapshot taken"
        );

        Ok(snapshot)
    }

    pub fn snapshots(&self) -> &SnapshotHistory {
        &self.snapshots
    }
}

fn ensure_can_advance(clock: &LamportClock, incoming: Timestamp) -> Result<(), SimulatorError> {
    let base = clock.now().max(incoming);
    if base == Timestamp::MAX {
        return Err(SimulatorError::ClockOverflow {
            process: clock.id(),
            timestamp: base,
        });
    }

    Ok(())
}
