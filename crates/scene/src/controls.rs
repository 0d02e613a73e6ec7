use std::collections::BTreeMap;

use crate::time_slider::TimeSlider;

/// Control id under which the shared time slider is registered.
pub const TIME_SLIDER_ID: &str = "tslider";

#[derive(Debug)]
#[non_exhaustive]
pub enum Control {
    TimeSlider(TimeSlider),
}

impl Control {
    pub fn as_time_slider(&self) -> Option<&TimeSlider> {
        match self {
            Control::TimeSlider(slider) => Some(slider),
        }
    }

    pub fn as_time_slider_mut(&mut self) -> Option<&mut TimeSlider> {
        match self {
            Control::TimeSlider(slider) => Some(slider),
        }
    }
}

/// Map controls keyed by id.
#[derive(Debug, Default)]
pub struct ControlRegistry {
    by_id: BTreeMap<String, Control>,
}

impl ControlRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers `control` under `id`, returning the control it replaced.
    pub fn add(&mut self, id: impl Into<String>, control: Control) -> Option<Control> {
        self.by_id.insert(id.into(), control)
    }

    pub fn get(&self, id: &str) -> Option<&Control> {
        self.by_id.get(id)
    }

    pub fn get_mut(&mut self, id: &str) -> Option<&mut Control> {
        self.by_id.get_mut(id)
    }

    pub fn contains(&self, id: &str) -> bool {
        self.by_id.contains_key(id)
    }

    pub fn time_slider(&self) -> Option<&TimeSlider> {
        self.get(TIME_SLIDER_ID).and_then(Control::as_time_slider)
    }

    pub fn time_slider_mut(&mut self) -> Option<&mut TimeSlider> {
        self.get_mut(TIME_SLIDER_ID)
            .and_then(Control::as_time_slider_mut)
    }
}

#[cfg(test)]
mod tests {
    use super::{Control, ControlRegistry, TIME_SLIDER_ID};
    use crate::layer_manager::LayerManager;
    use crate::time_slider::TimeSlider;
    use foundation::time::{TimeIndex, TimeLabels};

    fn slider(labels: &[&str]) -> TimeSlider {
        TimeSlider::new(
            labels.iter().copied().collect::<TimeLabels>(),
            |_: TimeIndex, _: &mut LayerManager| -> usize { 0 },
        )
    }

    #[test]
    fn slider_is_found_under_its_id() {
        let mut controls = ControlRegistry::new();
        assert!(controls.time_slider().is_none());

        assert!(
            controls
                .add(TIME_SLIDER_ID, Control::TimeSlider(slider(&["a"])))
                .is_none()
        );
        let replaced = controls.add(TIME_SLIDER_ID, Control::TimeSlider(slider(&["a", "b"])));
        assert!(replaced.is_some());
        assert_eq!(
            controls.time_slider().map(|s| s.time_labels().len()),
            Some(2)
        );
        assert!(controls.contains(TIME_SLIDER_ID));
    }

    #[test]
    fn other_ids_are_not_the_slider() {
        let mut controls = ControlRegistry::new();
        controls.add("legend", Control::TimeSlider(slider(&[])));
        assert!(controls.time_slider_mut().is_none());
        assert!(controls.get("legend").is_some());
    }
}
