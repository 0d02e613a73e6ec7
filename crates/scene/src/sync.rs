use foundation::ids::Category;
use foundation::time::{TimeIndex, TimeLabels};
use serde::{Deserialize, Serialize};
use tracing::{debug, info, warn};

use crate::layer_manager::LayerManager;
use crate::map::Map;
use crate::time_slider::{TimeIdListener, TimeSlider};

/// Which layer categories follow the shared time slider.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct SyncConfig {
    pub categories: Vec<Category>,
}

impl Default for SyncConfig {
    fn default() -> Self {
        Self {
            categories: vec![
                Category::new(Category::MINICHART),
                Category::new(Category::FLOW),
            ],
        }
    }
}

impl SyncConfig {
    /// Adds `category` to the notify set. Returns `false` if it was already there.
    pub fn enable_category(&mut self, category: impl Into<Category>) -> bool {
        let category = category.into();
        if self.categories.contains(&category) {
            return false;
        }
        self.categories.push(category);
        true
    }
}

/// Slider listener forwarding every index to all layers of a fixed category set.
#[derive(Debug, Clone)]
pub struct CategoryBroadcast {
    categories: Vec<Category>,
}

impl CategoryBroadcast {
    pub fn new(categories: Vec<Category>) -> Self {
        Self { categories }
    }

    pub fn categories(&self) -> &[Category] {
        &self.categories
    }
}

impl TimeIdListener for CategoryBroadcast {
    fn on_time_id_change(&mut self, time_id: TimeIndex, layers: &mut LayerManager) -> usize {
        let mut notified = 0;
        for category in &self.categories {
            let n = layers.for_each_in_category_mut(category.as_str(), |_, layer| {
                layer.set_time_id(time_id)
            });
            debug!(%category, %time_id, layers = n, "category notified");
            notified += n;
        }
        notified
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SyncState {
    /// No time slider on the map yet.
    Uninitialized,
    Active(TimeIndex),
}

pub fn sync_state(map: &Map) -> SyncState {
    match map.time_id() {
        Some(time_id) => SyncState::Active(time_id),
        None => SyncState::Uninitialized,
    }
}

/// Keeps one time slider per map and the layers of the configured categories
/// in step with it.
#[derive(Debug, Clone, Default)]
pub struct TimeSync {
    config: SyncConfig,
}

impl TimeSync {
    pub fn new(config: SyncConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &SyncConfig {
        &self.config
    }

    /// Creates the map's time slider if needed and re-applies its time index.
    ///
    /// - Without a slider, one is registered with `time_labels` and a
    ///   [`CategoryBroadcast`] over the configured categories.
    /// - With a slider, `time_labels` (if any) replace its labels silently.
    /// - The index is `initial_time` mapped through the labels, or the
    ///   slider's current index. An unknown label keeps the current index.
    ///
    /// The resolved index is always re-applied, so every registered layer of
    /// the configured categories is visited before this returns.
    pub fn ensure_time_control(
        &self,
        map: &mut Map,
        time_labels: Option<TimeLabels>,
        initial_time: Option<&str>,
    ) -> TimeIndex {
        let time_id = match map.time_slider_mut() {
            Some(slider) => {
                if let Some(labels) = time_labels {
                    slider.set_time_labels(labels);
                }
                initial_time_id(slider, initial_time)
            }
            None => {
                let slider = TimeSlider::new(
                    time_labels.unwrap_or_default(),
                    CategoryBroadcast::new(self.config.categories.clone()),
                );
                let time_id = initial_time_id(&slider, initial_time);
                info!(
                    labels = slider.time_labels().len(),
                    categories = self.config.categories.len(),
                    "time slider created"
                );
                map.add_time_slider(slider);
                time_id
            }
        };

        map.set_time_id(time_id);
        time_id
    }
}

/// [`TimeSync::ensure_time_control`] with the default categories.
pub fn ensure_time_control(
    map: &mut Map,
    time_labels: Option<TimeLabels>,
    initial_time: Option<&str>,
) -> TimeIndex {
    TimeSync::default().ensure_time_control(map, time_labels, initial_time)
}

fn initial_time_id(slider: &TimeSlider, initial_time: Option<&str>) -> TimeIndex {
    let Some(label) = initial_time else {
        return slider.time_id();
    };
    slider.to_time_id(label).unwrap_or_else(|| {
        warn!(label, "unknown initial time label; keeping current time index");
        slider.time_id()
    })
}

#[cfg(test)]
mod tests {
    use super::{SyncConfig, SyncState, TimeSync, ensure_time_control, sync_state};
    use crate::map::{EVENT_TIME_ID_CHANGE, Map};
    use crate::time_aware::TimeAware;
    use foundation::time::{TimeIndex, TimeLabels};
    use pretty_assertions::assert_eq;
    use runtime::metrics::{BROADCASTS, LAYERS_NOTIFIED};
    use std::cell::RefCell;
    use std::rc::Rc;

    type Log = Rc<RefCell<Vec<(String, TimeIndex)>>>;

    /// Records every call, including redundant ones.
    struct Recorder {
        name: String,
        log: Log,
        time_id: Option<TimeIndex>,
    }

    impl TimeAware for Recorder {
        fn set_time_id(&mut self, time_id: TimeIndex) {
            self.log.borrow_mut().push((self.name.clone(), time_id));
            self.time_id = Some(time_id);
        }

        fn time_id(&self) -> Option<TimeIndex> {
            self.time_id
        }
    }

    fn recorder(name: &str, log: &Log) -> Box<dyn TimeAware> {
        Box::new(Recorder {
            name: name.to_string(),
            log: Rc::clone(log),
            time_id: None,
        })
    }

    fn labels(items: &[&str]) -> Option<TimeLabels> {
        Some(items.iter().copied().collect())
    }

    #[test]
    fn fresh_control_returns_its_default_index() {
        let mut map = Map::new();
        assert_eq!(sync_state(&map), SyncState::Uninitialized);

        let t = ensure_time_control(&mut map, labels(&["2020", "2021"]), None);
        assert_eq!(t, TimeIndex(0));
        assert_eq!(sync_state(&map), SyncState::Active(TimeIndex(0)));
        assert_eq!(map.metrics().counter(BROADCASTS), 1);
    }

    #[test]
    fn initial_time_is_mapped_through_labels() {
        let mut map = Map::new();
        let t = ensure_time_control(&mut map, labels(&["2020", "2021"]), Some("2021"));
        assert_eq!(t, TimeIndex(1));
        assert_eq!(map.time_id(), Some(TimeIndex(1)));
    }

    #[test]
    fn unknown_initial_time_keeps_current_index() {
        let mut map = Map::new();
        ensure_time_control(&mut map, labels(&["a", "b", "c"]), Some("c"));
        let t = ensure_time_control(&mut map, None, Some("zzz"));
        assert_eq!(t, TimeIndex(2));
    }

    #[test]
    fn existing_control_is_reused_and_relabeled() {
        let mut map = Map::new();
        ensure_time_control(&mut map, labels(&["a", "b"]), Some("b"));
        let t = ensure_time_control(&mut map, labels(&["x", "y", "z"]), None);
        assert_eq!(t, TimeIndex(1));

        let slider = map.time_slider().expect("slider registered");
        assert_eq!(slider.label(), Some("y"));
        assert!(map.controls().contains(crate::controls::TIME_SLIDER_ID));
    }

    #[test]
    fn reinitialization_rebroadcasts_unchanged_index() {
        let log: Log = Rc::default();
        let mut map = Map::new();
        ensure_time_control(&mut map, labels(&["a", "b"]), None);
        map.add_layer("minichart", "m1", recorder("m1", &log));

        ensure_time_control(&mut map, None, None);
        assert_eq!(*log.borrow(), vec![("m1".to_string(), TimeIndex(0))]);
        assert_eq!(map.events().events_of_kind(EVENT_TIME_ID_CHANGE).count(), 2);
    }

    #[test]
    fn broadcast_visits_every_category_in_registration_order() {
        let log: Log = Rc::default();
        let mut map = Map::new();
        ensure_time_control(&mut map, labels(&["2020", "2021"]), None);
        map.add_layer("minichart", "m2", recorder("m2", &log));
        map.add_layer("flow", "f1", recorder("f1", &log));
        map.add_layer("minichart", "m1", recorder("m1", &log));
        map.add_layer("legend", "ignored", recorder("ignored", &log));

        assert_eq!(map.set_time_id(TimeIndex(1)), Some(3));

        let mut calls = log.borrow().clone();
        let minicharts: Vec<&str> = calls
            .iter()
            .filter(|(name, _)| name.starts_with('m'))
            .map(|(name, _)| name.as_str())
            .collect();
        assert_eq!(minicharts, vec!["m2", "m1"]);

        calls.sort();
        assert_eq!(
            calls,
            vec![
                ("f1".to_string(), TimeIndex(1)),
                ("m1".to_string(), TimeIndex(1)),
                ("m2".to_string(), TimeIndex(1)),
            ]
        );
        assert_eq!(map.metrics().counter(LAYERS_NOTIFIED), 3);
    }

    #[test]
    fn configured_categories_drive_the_broadcast() {
        let log: Log = Rc::default();
        let mut config = SyncConfig::default();
        assert!(config.enable_category("legend"));
        assert!(!config.enable_category("legend"));
        assert!(!config.enable_category("flow"));

        let mut map = Map::new();
        TimeSync::new(config).ensure_time_control(&mut map, labels(&["a", "b"]), None);
        map.add_layer("legend", "l1", recorder("l1", &log));
        map.set_time_id(TimeIndex(1));
        assert_eq!(*log.borrow(), vec![("l1".to_string(), TimeIndex(1))]);
    }

    #[test]
    fn config_deserializes_with_defaults() {
        let config: SyncConfig = serde_json::from_str("{}").expect("parse");
        assert_eq!(config, SyncConfig::default());

        let config: SyncConfig =
            serde_json::from_str(r#"{"categories":["flow"]}"#).expect("parse");
        assert_eq!(config.categories.len(), 1);
    }

    #[test]
    fn set_time_id_without_slider_is_ignored() {
        let mut map = Map::new();
        assert_eq!(map.set_time_id(TimeIndex(3)), None);
        assert!(map.events().events().is_empty());
    }
}
