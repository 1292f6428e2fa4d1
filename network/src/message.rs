use crate::types::{MessageId, ProcessId, Timestamp};
use std::fmt;

/// A timestamped message waiting in the queue.
///
/// Only the [`MessageQueue`](crate::queue::MessageQueue) creates messages, so every id is unique
/// within one queue and a message never changes after it is enqueued.
#[derive(Debug, Clone, PartialEq, Eq, serde::Serialize)]
pub struct Message {
    id: MessageId,
    /// `None` for messages enqueued directly rather than produced by a send event.
    sender: Option<ProcessId>,
    recipient: ProcessId,
    sender_timestamp: Timestamp,
}

impl Message {
    pub(crate) fn new(
        id: MessageId,
        sender: Option<ProcessId>,
        recipient: ProcessId,
        sender_timestamp: Timestamp,
    ) -> Self {
        Self {
            id,
            sender,
            recipient,
            sender_timestamp,
        }
    }

    pub fn id(&self) -> MessageId {
        self.id
    }

    pub fn sender(&self) -> Option<ProcessId> {
        self.sender
    }

    pub fn recipient(&self) -> ProcessId {
        self.recipient
    }

    pub fn sender_timestamp(&self) -> Timestamp {
        self.sender_timestamp
    }
}

impl fmt::Display for Message {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.sender {
            Some(sender) => write!(
                f,
                "{} {} -> {} @ {}",
                self.id, sender, self.recipient, self.sender_timestamp
            ),
            None => write!(
                f,
                "{} -> {} @ {}",
                self.id, self.recipient, self.sender_timestamp
            ),
        }
    }
}
