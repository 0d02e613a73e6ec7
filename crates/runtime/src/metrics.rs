use std::collections::BTreeMap;

use foundation::time::TimeIndex;

/// Time broadcasts issued by the slider.
pub const BROADCASTS: &str = "broadcasts";
/// Broadcasts that reached no layer.
pub const EMPTY_BROADCASTS: &str = "empty_broadcasts";
/// Layers visited by broadcasts, updated or not.
pub const LAYERS_NOTIFIED: &str = "layers_notified";
/// Last broadcast time index.
pub const CURRENT_TIME_ID: &str = "current_time_id";

/// Deterministic counters and gauges for time synchronization.
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct Metrics {
    counters: BTreeMap<String, u64>,
    gauges: BTreeMap<String, i64>,
}

impl Metrics {
    pub fn new() -> Self {
        Self::default()
    }

    /// Accounts for one time index pushed to `notified` layers.
    pub fn record_broadcast(&mut self, time_id: TimeIndex, notified: usize) {
        self.inc_counter(BROADCASTS, 1);
        self.inc_counter(LAYERS_NOTIFIED, notified as u64);
        if notified == 0 {
            self.inc_counter(EMPTY_BROADCASTS, 1);
        }
        self.set_gauge(CURRENT_TIME_ID, time_id.get() as i64);
    }

    pub fn counter(&self, name: &str) -> u64 {
        self.counters.get(name).copied().unwrap_or(0)
    }

    fn inc_counter(&mut self, name: impl Into<String>, by: u64) {
        *self.counters.entry(name.into()).or_insert(0) += by;
    }

    pub fn gauge(&self, name: &str) -> Option<i64> {
        self.gauges.get(name).copied()
    }

    fn set_gauge(&mut self, name: impl Into<String>, value: i64) {
        self.gauges.insert(name.into(), value);
    }
}

#[cfg(test)]
mod tests {
    use super::{BROADCASTS, CURRENT_TIME_ID, EMPTY_BROADCASTS, LAYERS_NOTIFIED, Metrics};
    use foundation::time::TimeIndex;

    #[test]
    fn broadcasts_accumulate() {
        let mut m = Metrics::new();
        m.record_broadcast(TimeIndex(1), 3);
        m.record_broadcast(TimeIndex(2), 0);

        assert_eq!(m.counter(BROADCASTS), 2);
        assert_eq!(m.counter(LAYERS_NOTIFIED), 3);
        assert_eq!(m.counter(EMPTY_BROADCASTS), 1);
        assert_eq!(m.gauge(CURRENT_TIME_ID), Some(2));
        assert_eq!(m.counter("missing"), 0);
    }

    #[test]
    fn gauges_overwrite() {
        let mut m = Metrics::new();
        assert_eq!(m.gauge(CURRENT_TIME_ID), None);
        m.record_broadcast(TimeIndex(4), 2);
        m.record_broadcast(TimeIndex(1), 2);
        assert_eq!(m.gauge(CURRENT_TIME_ID), Some(1));
        assert_eq!(m.counter(EMPTY_BROADCASTS), 0);
    }
}
