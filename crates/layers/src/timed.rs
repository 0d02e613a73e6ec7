use foundation::ids::LayerId;
use foundation::time::TimeIndex;
use scene::time_aware::TimeAware;
use tracing::debug;

use crate::layer::LayerKind;
use crate::options::{EffectiveOptions, OptionMap, resolve_options};
use crate::popup::{PopupArgs, PopupState, apply_popup, popup_content};

/// Hook called after each visual update with the effective options and popup HTML.
pub type ChangeHook = Box<dyn FnMut(&EffectiveOptions, Option<&str>)>;

/// A layer of kind `K` whose options follow the shared time index.
pub struct TimedLayer<K> {
    id: Option<LayerId>,
    /// Static `layerId`, shown as the popup title. Independent of `id`.
    title: Option<String>,
    kind: K,
    snapshots: Vec<OptionMap>,
    static_options: OptionMap,
    popup_args: PopupArgs,
    popup_options: OptionMap,
    popup: PopupState,
    time_id: Option<TimeIndex>,
    updates: usize,
    on_change: Option<ChangeHook>,
}

impl<K: LayerKind> TimedLayer<K> {
    /// The id and the popup title are read from the static `layerId` option
    /// when present.
    pub fn new(
        kind: K,
        snapshots: Vec<OptionMap>,
        static_options: OptionMap,
        popup_args: PopupArgs,
    ) -> Self {
        let title = EffectiveOptions::new(static_options.clone()).layer_id();
        Self {
            id: title.clone().map(LayerId::from),
            title,
            kind,
            snapshots,
            static_options,
            popup_args,
            popup_options: OptionMap::new(),
            popup: PopupState::new(),
            time_id: None,
            updates: 0,
            on_change: None,
        }
    }

    /// Sets the registry key. The popup title still comes from `layerId`.
    pub fn with_id(mut self, id: impl Into<LayerId>) -> Self {
        self.id = Some(id.into());
        self
    }

    pub fn with_popup_options(mut self, popup_options: OptionMap) -> Self {
        self.popup_options = popup_options;
        self
    }

    pub fn with_on_change<F>(mut self, hook: F) -> Self
    where
        F: FnMut(&EffectiveOptions, Option<&str>) + 'static,
    {
        self.on_change = Some(Box::new(hook));
        self
    }

    pub fn id(&self) -> Option<&LayerId> {
        self.id.as_ref()
    }

    pub fn kind(&self) -> &K {
        &self.kind
    }

    pub fn snapshots(&self) -> &[OptionMap] {
        &self.snapshots
    }

    pub fn static_options(&self) -> &OptionMap {
        &self.static_options
    }

    pub fn popup_args(&self) -> &PopupArgs {
        &self.popup_args
    }

    pub fn popup(&self) -> &PopupState {
        &self.popup
    }

    /// Visual updates performed so far.
    pub fn update_count(&self) -> usize {
        self.updates
    }

    /// Rebuilds the popup for the current time index and opens it.
    pub fn open_popup(&mut self) -> bool {
        if let Some(time_id) = self.time_id {
            self.refresh_popup(time_id);
        }
        self.popup.open()
    }

    pub fn close_popup(&mut self) {
        self.popup.close();
    }

    fn apply(&mut self, time_id: TimeIndex) {
        let effective = match resolve_options(&self.snapshots, &self.static_options, time_id) {
            Ok(effective) => effective,
            Err(err) => {
                debug!(layer = ?self.id, %err, "no options for time index; skipping update");
                return;
            }
        };

        self.kind.update(&effective);
        self.updates += 1;
        let popup = self.refresh_popup(time_id);
        if let Some(hook) = self.on_change.as_mut() {
            hook(&effective, popup.as_deref());
        }
    }

    /// Popup values and pre-rendered HTML come from the timestep's own
    /// options only; static options never feed the popup.
    fn refresh_popup(&mut self, time_id: TimeIndex) -> Option<String> {
        let step = EffectiveOptions::new(self.snapshots.get(time_id.get())?.clone());
        let content = popup_content(self.title.as_deref(), &step, &self.popup_args)?;
        apply_popup(&mut self.popup, content.html(), &self.popup_options);
        Some(content.into_html())
    }
}

impl<K: LayerKind> TimeAware for TimedLayer<K> {
    fn set_time_id(&mut self, time_id: TimeIndex) {
        if self.time_id == Some(time_id) {
            return;
        }
        self.apply(time_id);
        self.time_id = Some(time_id);
    }

    fn time_id(&self) -> Option<TimeIndex> {
        self.time_id
    }

    fn popup_html(&self) -> Option<&str> {
        self.popup.content()
    }
}

impl<K: std::fmt::Debug> std::fmt::Debug for TimedLayer<K> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TimedLayer")
            .field("id", &self.id)
            .field("kind", &self.kind)
            .field("time_steps", &self.snapshots.len())
            .field("time_id", &self.time_id)
            .field("updates", &self.updates)
            .finish_non_exhaustive()
    }
}
