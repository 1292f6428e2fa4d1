//! Seeded random driver for a [`Simulator`].
//!
//! Picks one action per step (local event, multi-recipient send, delivery of a random pending
//! message, snapshot) and records what happened. The same seed replays the same run.

use crate::error::SimulatorError;
use crate::simulator::Simulator;
use crate::snapshot::Snapshot;
use network::discovery::{Discovery, StaticDiscovery};
use network::types::{MessageId, ProcessId, Timestamp};
use rand::distributions::{Distribution, WeightedIndex};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use std::fmt;

/// Relative weights of each action kind.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ActionWeights {
    pub local: u32,
    pub send: u32,
    pub deliver: u32,
    pub snapshot: u32,
}

impl Default for ActionWeights {
    fn default() -> Self {
        Self {
            local: 3,
            send: 3,
            deliver: 3,
            snapshot: 1,
        }
    }
}

#[derive(Debug, Clone)]
pub struct WorkloadConfig {
    pub steps: usize,
    pub seed: u64,
    /// Upper bound on recipients per send.
    pub max_fanout: usize,
    pub weights: ActionWeights,
}

impl Default for WorkloadConfig {
    fn default() -> Self {
        Self {
            steps: 100,
            seed: 12345,
            max_fanout: 2,
            weights: ActionWeights::default(),
        }
    }
}

impl WorkloadConfig {
    pub fn with_steps(mut self, steps: usize) -> Self {
        self.steps = steps;
        self
    }

    pub fn with_seed(mut self, seed: u64) -> Self {
        self.seed = seed;
        self
    }

    pub fn with_max_fanout(mut self, max_fanout: usize) -> Self {
        self.max_fanout = max_fanout;
        self
    }

    pub fn with_weights(mut self, weights: ActionWeights) -> Self {
        self.weights = weights;
        self
    }
}

#[derive(Debug, Clone, PartialEq, Eq, serde::Serialize)]
#[serde(tag = "event", rename_all = "snake_case")]
pub enum WorkloadEvent {
    Local {
        process: ProcessId,
        timestamp: Timestamp,
    },
    Send {
        process: ProcessId,
        timestamp: Timestamp,
        recipients: Vec<ProcessId>,
        messages: Vec<MessageId>,
    },
    Deliver {
        process: ProcessId,
        message: MessageId,
        timestamp: Timestamp,
    },
    Snapshot {
        sequence: usize,
    },
}

impl fmt::Display for WorkloadEvent {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            WorkloadEvent::Local { process, timestamp } => {
                write!(f, "local {process} -> {timestamp}")
            }
            WorkloadEvent::Send {
                process,
                timestamp,
                recipients,
                ..
            } => {
                write!(f, "send {process} -> {timestamp} to")?;
                if recipients.is_empty() {
                    return f.write_str(" nobody");
                }
                for recipient in recipients {
                    write!(f, " {recipient}")?;
                }
                Ok(())
            }
            WorkloadEvent::Deliver {
                process,
                message,
                timestamp,
            } => write!(f, "deliver {message} to {process} -> {timestamp}"),
            WorkloadEvent::Snapshot { sequence } => write!(f, "snapshot {sequence}"),
        }
    }
}

#[derive(Debug, Clone, serde::Serialize)]
pub struct WorkloadReport {
    pub seed: u64,
    pub events: Vec<WorkloadEvent>,
    pub final_snapshot: Snapshot,
}

#[derive(Clone, Copy)]
enum Action {
    Local,
    Send,
    Deliver,
    Snapshot,
}

const ACTIONS: [Action; 4] = [Action::Local, Action::Send, Action::Deliver, Action::Snapshot];

/// Runs `config.steps` random actions against an already created simulator, then takes a final
/// snapshot. Delivery with an empty queue falls back to a local event.
pub fn run(
    simulator: &mut Simulator,
    config: &WorkloadConfig,
) -> Result<WorkloadReport, SimulatorError> {
    let count = simulator.process_count();
    if count == 0 {
        return Err(SimulatorError::Uninitialized);
    }

    let weights = config.weights;
    let chooser = WeightedIndex::new([
        weights.local,
        weights.send,
        weights.deliver,
        weights.snapshot,
    ])
    .map_err(|e| SimulatorError::InvalidWorkload(e.to_string()))?;

    let ids = simulator.process_ids().collect::<Vec<_>>();
    let discoveries = ids
        .iter()
        .map(|id| StaticDiscovery::peers_of(*id, count))
        .collect::<Vec<_>>();

    let mut rng = StdRng::seed_from_u64(config.seed);
    let mut events = Vec::new();

    tracing::info!(
        seed = config.seed,
        steps = config.steps,
        processes = count,
        "starting workload"
    );

    for _ in 0..config.steps {
        let event = match ACTIONS[chooser.sample(&mut rng)] {
            Action::Deliver if !simulator.pending().is_empty() => {
                let pos = rng.gen_range(0..simulator.pending().len());
                let Some((message, recipient)) = simulator
                    .pending()
                    .iter()
                    .nth(pos)
                    .map(|msg| (msg.id(), msg.recipient()))
                else {
                    continue;
                };

                let timestamp = simulator.process_message(recipient.index(), message)?;
                WorkloadEvent::Deliver {
                    process: recipient,
                    message,
                    timestamp,
                }
            }
            Action::Local | Action::Deliver => {
                let process = rng.gen_range(0..count);
                let timestamp = simulator.local_event(process)?;
                WorkloadEvent::Local {
                    process: ids[process],
                    timestamp,
                }
            }
            Action::Send => {
                let process = rng.gen_range(0..count);
                let peers = &discoveries[process];
                let fanout = config.max_fanout.min(peers.len());
                let fanout = if fanout == 0 {
                    0
                } else {
                    rng.gen_range(1..=fanout)
                };

                let recipients = peers
                    .get_random_nodes(fanout, &mut rng)
                    .into_iter()
                    .collect::<Vec<_>>();
                let indices = recipients.iter().map(|id| id.index()).collect::<Vec<_>>();

                let outcome = simulator.send_message(process, &indices)?;
                WorkloadEvent::Send {
                    process: outcome.sender,
                    timestamp: outcome.timestamp,
                    recipients,
                    messages: outcome.messages,
                }
            }
            Action::Snapshot => {
                let snapshot = simulator.take_snapshot()?;
                WorkloadEvent::Snapshot {
                    sequence: snapshot.sequence(),
                }
            }
        };

        tracing::trace!(?event, "workload step");
        events.push(event);
    }

    let final_snapshot = simulator.take_snapshot()?;

    Ok(WorkloadReport {
        seed: config.seed,
        events,
        final_snapshot,
    })
}
