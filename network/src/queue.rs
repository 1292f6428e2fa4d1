use crate::message::Message;
use crate::types::{MessageId, ProcessId, Timestamp};

/// Undelivered messages in send order.
///
/// Ids are handed out from a counter and messages are only ever appended, so the backing vector
/// stays sorted by id. Lookups and removals go through the id, never through a position.
#[derive(Debug, Default, Clone)]
pub struct MessageQueue {
    messages: Vec<Message>,
    next_id: u64,
}

impl MessageQueue {
    pub fn new() -> Self {
        Self::default()
    }

    fn allocate_id(&mut self) -> MessageId {
        let id = MessageId(self.next_id);
        self.next_id += 1;
        id
    }

    /// Appends a single message to the tail.
    pub fn enqueue(
        &mut self,
        sender: Option<ProcessId>,
        recipient: ProcessId,
        sender_timestamp: Timestamp,
    ) -> MessageId {
        let id = self.allocate_id();
        self.messages
            .push(Message::new(id, sender, recipient, sender_timestamp));

        tracing::debug!(
            message_id = %id,
            sender = ?sender,
            %recipient,
            timestamp = sender_timestamp,
            "message enqueued"
        );

        id
    }

    /// Appends one message per recipient, all carrying the same timestamp.
    pub fn enqueue_batch(
        &mut self,
        sender: ProcessId,
        recipients: impl IntoIterator<Item = ProcessId>,
        sender_timestamp: Timestamp,
    ) -> Vec<MessageId> {
        recipients
            .into_iter()
            .map(|recipient| self.enqueue(Some(sender), recipient, sender_timestamp))
            .collect()
    }

    fn position(&self, id: MessageId) -> Option<usize> {
        self.messages.binary_search_by_key(&id, Message::id).ok()
    }

    pub fn get(&self, id: MessageId) -> Option<&Message> {
        self.position(id).map(|pos| &self.messages[pos])
    }

    /// Removes and returns the message, consuming it. A second call with the same id yields `None`.
    pub fn remove(&mut self, id: MessageId) -> Option<Message> {
        let pos = self.position(id)?;
        Some(self.messages.remove(pos))
    }

    /// Messages addressed to `recipient`, oldest first.
    pub fn pending_for(&self, recipient: ProcessId) -> impl Iterator<Item = &Message> {
        self.messages
            .iter()
            .filter(move |msg| msg.recipient() == recipient)
    }

    pub fn iter(&self) -> std::slice::Iter<'_, Message> {
        self.messages.iter()
    }

    pub fn len(&self) -> usize {
        self.messages.len()
    }

    pub fn is_empty(&self) -> bool {
        self.messages.is_empty()
    }

    /// Drops every pending message and restarts id allocation.
    pub fn clear(&mut self) {
        self.messages.clear();
        self.next_id = 0;
    }
}

impl<'a> IntoIterator for &'a MessageQueue {
    type Item = &'a Message;
    type IntoIter = std::slice::Iter<'a, Message>;

    fn into_iter(self) -> Self::IntoIter {
        self.iter()
    }
}
