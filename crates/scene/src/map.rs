use foundation::ids::{Category, LayerId};
use foundation::time::TimeIndex;
use runtime::event_bus::EventBus;
use runtime::metrics::Metrics;
use tracing::{debug, warn};

use crate::controls::{Control, ControlRegistry, TIME_SLIDER_ID};
use crate::layer_manager::LayerManager;
use crate::time_aware::TimeAware;
use crate::time_slider::TimeSlider;

pub const EVENT_TIME_ID_CHANGE: &str = "time_id_change";

/// In-process model of the map widget host.
///
/// Owns the controls, the layers grouped by category, and a trace of time
/// broadcasts. All mutation goes through `&mut Map`, so a broadcast always
/// completes before the next time index is accepted.
#[derive(Debug, Default)]
pub struct Map {
    controls: ControlRegistry,
    layers: LayerManager,
    events: EventBus,
    metrics: Metrics,
}

impl Map {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn controls(&self) -> &ControlRegistry {
        &self.controls
    }

    pub fn layers(&self) -> &LayerManager {
        &self.layers
    }

    pub fn layers_mut(&mut self) -> &mut LayerManager {
        &mut self.layers
    }

    pub fn events(&self) -> &EventBus {
        &self.events
    }

    pub fn metrics(&self) -> &Metrics {
        &self.metrics
    }

    pub fn add_layer(
        &mut self,
        category: impl Into<Category>,
        id: impl Into<LayerId>,
        layer: Box<dyn TimeAware>,
    ) -> Option<Box<dyn TimeAware>> {
        self.layers.add_layer(category, id, layer)
    }

    pub fn add_time_slider(&mut self, slider: TimeSlider) -> Option<Control> {
        self.controls.add(TIME_SLIDER_ID, Control::TimeSlider(slider))
    }

    pub fn time_slider(&self) -> Option<&TimeSlider> {
        self.controls.time_slider()
    }

    pub fn time_slider_mut(&mut self) -> Option<&mut TimeSlider> {
        self.controls.time_slider_mut()
    }

    /// Current index of the time slider, if one is registered.
    pub fn time_id(&self) -> Option<TimeIndex> {
        self.time_slider().map(TimeSlider::time_id)
    }

    /// Applies `time_id` to the time slider, which broadcasts it to layers.
    ///
    /// Returns the number of layers notified, or `None` without a slider.
    pub fn set_time_id(&mut self, time_id: TimeIndex) -> Option<usize> {
        let Self {
            controls,
            layers,
            events,
            metrics,
        } = self;

        let Some(slider) = controls.time_slider_mut() else {
            warn!(%time_id, "no time slider registered; ignoring time index");
            return None;
        };
        let notified = slider.set_time_id(time_id, layers);
        debug!(%time_id, notified, "time index broadcast");

        events.emit(
            Some(time_id),
            EVENT_TIME_ID_CHANGE,
            format!("notified {notified} layers"),
        );
        metrics.record_broadcast(time_id, notified);
        Some(notified)
    }
}
