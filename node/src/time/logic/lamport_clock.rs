use crate::time::LogicalTimeProvider;
use network::types::{ProcessId, Timestamp};

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LamportClock {
    /// Must be unique within a simulation.
    id: ProcessId,
    counter: Timestamp,
}

impl LogicalTimeProvider for LamportClock {
    fn new_with_id(id: ProcessId) -> Self {
        Self::new(id)
    }

    fn id(&self) -> ProcessId {
        self.id
    }

    fn now(&self) -> Timestamp {
        self.counter
    }

    fn local_event(&mut self) -> Timestamp {
        self.advance_past(self.counter)
    }

    fn send_event(&mut self) -> Timestamp {
        self.advance_past(self.counter)
    }

    fn receive_event(&mut self, incoming: Timestamp) -> Timestamp {
        self.advance_past(self.counter.max(incoming))
    }
}

impl LamportClock {
    pub fn new(id: ProcessId) -> Self {
        Self { id, counter: 0 }
    }

    /// Sets the counter to `base + 1`.
    ///
    /// # Panics
    /// Panics if `base` is `Timestamp::MAX`.
    fn advance_past(&mut self, base: Timestamp) -> Timestamp {
        let previous = self.counter;
        let next = base
            .checked_add(1)
            .expect("logical time overflowed while advancing");

        debug_assert!(
            previous < next,
            "logical time reverted: last: {previous}, current: {next}",
        );

        self.counter = next;
        next
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn local_and_send_tick_by_one() {
        let mut clock = LamportClock::new(ProcessId(0));
        assert_eq!(clock.now(), 0);
        assert_eq!(clock.local_event(), 1);
        assert_eq!(clock.send_event(), 2);
        assert_eq!(clock.local_event(), 3);
        assert_eq!(clock.now(), 3);
    }

    #[test]
    fn receive_takes_max_plus_one() {
        let mut clock = LamportClock::new(ProcessId(0));
        assert_eq!(clock.receive_event(5), 6);
        // stale timestamp still advances the clock
        assert_eq!(clock.receive_event(2), 7);
        assert_eq!(clock.receive_event(7), 8);
    }

    #[test]
    #[should_panic(expected = "overflowed")]
    fn receive_of_max_timestamp_panics() {
        let mut clock = LamportClock::new_with_id(ProcessId(0));
        clock.receive_event(Timestamp::MAX);
    }
}
