use foundation::time::{TimeIndex, TimeLabels};

use crate::layer_manager::LayerManager;

/// Receives every time index applied to a [`TimeSlider`].
pub trait TimeIdListener {
    /// Returns the number of layers notified.
    fn on_time_id_change(&mut self, time_id: TimeIndex, layers: &mut LayerManager) -> usize;
}

impl<F> TimeIdListener for F
where
    F: FnMut(TimeIndex, &mut LayerManager) -> usize,
{
    fn on_time_id_change(&mut self, time_id: TimeIndex, layers: &mut LayerManager) -> usize {
        self(time_id, layers)
    }
}

/// Control-flow model of the shared time slider.
///
/// The slider owns the current index and its labels. Every
/// [`TimeSlider::set_time_id`] call notifies the listener, including calls
/// that do not change the index.
pub struct TimeSlider {
    labels: TimeLabels,
    time_id: TimeIndex,
    listener: Box<dyn TimeIdListener>,
}

impl TimeSlider {
    pub fn new(labels: TimeLabels, listener: impl TimeIdListener + 'static) -> Self {
        Self {
            labels,
            time_id: TimeIndex::default(),
            listener: Box::new(listener),
        }
    }

    pub fn time_id(&self) -> TimeIndex {
        self.time_id
    }

    pub fn set_time_id(&mut self, time_id: TimeIndex, layers: &mut LayerManager) -> usize {
        self.time_id = time_id;
        self.listener.on_time_id_change(time_id, layers)
    }

    pub fn to_time_id(&self, label: &str) -> Option<TimeIndex> {
        self.labels.position(label)
    }

    /// Replaces the labels without notifying the listener.
    pub fn set_time_labels(&mut self, labels: TimeLabels) {
        self.labels = labels;
    }

    pub fn time_labels(&self) -> &TimeLabels {
        &self.labels
    }

    /// Label of the current index.
    pub fn label(&self) -> Option<&str> {
        self.labels.label(self.time_id)
    }
}

impl std::fmt::Debug for TimeSlider {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TimeSlider")
            .field("labels", &self.labels)
            .field("time_id", &self.time_id)
            .finish_non_exhaustive()
    }
}
