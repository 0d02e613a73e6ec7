use foundation::ids::Category;
use foundation::time::{TimeIndex, TimeLabels};
use layers::flow::Flow;
use layers::minichart::Minichart;
use layers::{
    LayerKind, OptionMap, OptionsError, PopupArgs, add_layers, build_layers, clear_layers,
    parse_payloads, remove_layers,
};
use scene::map::Map;
use scene::sync::TimeSync;
use serde::Deserialize;
use tracing::info;

#[derive(Debug)]
pub enum WidgetError {
    Options(OptionsError),
    Json(String),
}

impl std::fmt::Display for WidgetError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            WidgetError::Options(err) => write!(f, "{err}"),
            WidgetError::Json(msg) => write!(f, "invalid JSON: {msg}"),
        }
    }
}

impl std::error::Error for WidgetError {}

impl From<OptionsError> for WidgetError {
    fn from(err: OptionsError) -> Self {
        WidgetError::Options(err)
    }
}

impl From<serde_json::Error> for WidgetError {
    fn from(err: serde_json::Error) -> Self {
        WidgetError::Json(err.to_string())
    }
}

/// Labels and ids arrive either as a list or, for a single entry, as a bare string.
#[derive(Deserialize)]
#[serde(untagged)]
enum StringList {
    One(String),
    Many(Vec<String>),
}

impl From<StringList> for Vec<String> {
    fn from(list: StringList) -> Self {
        match list {
            StringList::One(s) => vec![s],
            StringList::Many(v) => v,
        }
    }
}

fn string_list(json: &str) -> Result<Vec<String>, WidgetError> {
    Ok(serde_json::from_str::<StringList>(json)?.into())
}

fn optional_json<T>(json: Option<&str>) -> Result<T, WidgetError>
where
    T: Default + for<'de> Deserialize<'de>,
{
    match json.map(str::trim) {
        None | Some("") | Some("null") => Ok(T::default()),
        Some(json) => Ok(serde_json::from_str(json)?),
    }
}

/// Browser-independent state behind the exported widget.
#[derive(Debug, Default)]
pub struct Widget {
    map: Map,
    sync: TimeSync,
}

impl Widget {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn map(&self) -> &Map {
        &self.map
    }

    /// Creates or updates the time slider; returns the applied index.
    pub fn init_time_slider(
        &mut self,
        labels_json: Option<&str>,
        initial_time: Option<&str>,
    ) -> Result<usize, WidgetError> {
        let labels = match labels_json {
            Some(json) => Some(string_list(json)?.into_iter().collect::<TimeLabels>()),
            None => None,
        };
        let time_id = self
            .sync
            .ensure_time_control(&mut self.map, labels, initial_time);
        Ok(time_id.get())
    }

    pub fn add_minicharts(
        &mut self,
        payload_json: &str,
        popup_args_json: Option<&str>,
        popup_options_json: Option<&str>,
    ) -> Result<usize, WidgetError> {
        self.add::<Minichart>(payload_json, popup_args_json, popup_options_json)
    }

    pub fn add_flows(
        &mut self,
        payload_json: &str,
        popup_args_json: Option<&str>,
        popup_options_json: Option<&str>,
    ) -> Result<usize, WidgetError> {
        self.add::<Flow>(payload_json, popup_args_json, popup_options_json)
    }

    fn add<K: LayerKind + 'static>(
        &mut self,
        payload_json: &str,
        popup_args_json: Option<&str>,
        popup_options_json: Option<&str>,
    ) -> Result<usize, WidgetError> {
        let payloads = parse_payloads(payload_json)?;
        let popup_args: PopupArgs = optional_json(popup_args_json)?;
        let popup_options: OptionMap = optional_json(popup_options_json)?;
        let time_id = self.map.time_id().unwrap_or_default();

        let built = build_layers::<K>(&payloads, &popup_args, &popup_options, time_id)?;
        let added = add_layers(&mut self.map, built);
        info!(category = K::CATEGORY, added, %time_id, "layers added");
        Ok(added)
    }

    /// Returns the number of layers notified, or `None` without a slider.
    pub fn set_time_id(&mut self, time_id: usize) -> Option<usize> {
        self.map.set_time_id(TimeIndex::new(time_id))
    }

    pub fn time_id(&self) -> Option<usize> {
        self.map.time_id().map(TimeIndex::get)
    }

    pub fn time_labels(&self) -> Vec<String> {
        self.map
            .time_slider()
            .map(|slider| slider.time_labels().as_slice().to_vec())
            .unwrap_or_default()
    }

    pub fn popup_html(&self, category: &str, id: &str) -> Option<String> {
        self.map
            .layers()
            .layer(category, id)
            .and_then(|layer| layer.popup_html())
            .map(str::to_string)
    }

    pub fn layer_count(&self, category: &str) -> usize {
        self.map.layers().len(category)
    }

    pub fn remove_minicharts(&mut self, ids_json: &str) -> Result<usize, WidgetError> {
        Ok(remove_layers::<Minichart, _, _>(&mut self.map, string_list(ids_json)?))
    }

    pub fn remove_flows(&mut self, ids_json: &str) -> Result<usize, WidgetError> {
        Ok(remove_layers::<Flow, _, _>(&mut self.map, string_list(ids_json)?))
    }

    pub fn clear_minicharts(&mut self) -> usize {
        clear_layers::<Minichart>(&mut self.map)
    }

    pub fn clear_flows(&mut self) -> usize {
        clear_layers::<Flow>(&mut self.map)
    }

    /// Adds `category` to the set of layer categories that follow the slider.
    ///
    /// Takes effect for sliders created afterwards.
    pub fn sync_category(&mut self, category: &str) -> bool {
        let mut config = self.sync.config().clone();
        let added = config.enable_category(Category::from(category));
        self.sync = TimeSync::new(config);
        added
    }
}
