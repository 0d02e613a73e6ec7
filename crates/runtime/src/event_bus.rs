use foundation::time::TimeIndex;

/// Minimal event type for traceability of time-driven updates.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Event {
    /// Monotonic sequence number, assigned at emission.
    pub seq: u64,
    /// Time index active when the event was emitted, if any.
    pub time_id: Option<TimeIndex>,
    pub kind: &'static str,
    pub message: String,
}

/// Ordered, in-memory event log.
#[derive(Debug, Default)]
pub struct EventBus {
    next_seq: u64,
    events: Vec<Event>,
}

impl EventBus {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn emit(
        &mut self,
        time_id: Option<TimeIndex>,
        kind: &'static str,
        message: impl Into<String>,
    ) {
        let seq = self.next_seq;
        self.next_seq += 1;
        self.events.push(Event {
            seq,
            time_id,
            kind,
            message: message.into(),
        });
    }

    pub fn events(&self) -> &[Event] {
        &self.events
    }

    pub fn events_of_kind<'a>(&'a self, kind: &'a str) -> impl Iterator<Item = &'a Event> + 'a {
        self.events.iter().filter(move |e| e.kind == kind)
    }
}

#[cfg(test)]
mod tests {
    use super::EventBus;
    use foundation::time::TimeIndex;

    #[test]
    fn records_events_with_time_index() {
        let mut bus = EventBus::new();
        bus.emit(Some(TimeIndex(2)), "time_id_change", "hello");
        assert_eq!(bus.events().len(), 1);
        assert_eq!(bus.events()[0].time_id, Some(TimeIndex(2)));
    }

    #[test]
    fn sequence_numbers_follow_emission_order() {
        let mut bus = EventBus::new();
        bus.emit(None, "k", "m");
        bus.emit(Some(TimeIndex(1)), "k", "m2");
        let seqs: Vec<u64> = bus.events().iter().map(|e| e.seq).collect();
        assert_eq!(seqs, vec![0, 1]);
    }

    #[test]
    fn filters_by_kind() {
        let mut bus = EventBus::new();
        bus.emit(None, "a", "1");
        bus.emit(None, "b", "2");
        bus.emit(None, "a", "3");
        let msgs: Vec<&str> = bus.events_of_kind("a").map(|e| e.message.as_str()).collect();
        assert_eq!(msgs, vec!["1", "3"]);
    }
}
