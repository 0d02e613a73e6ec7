//! Per-timestep layer options.
//!
//! Layers arrive as columnar payloads: static options shared by every
//! timestep, plus one array per time-varying key. [`expand_options`] turns
//! each payload into one snapshot per timestep and [`resolve_options`] merges
//! a snapshot back over the static options.

use foundation::time::TimeIndex;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use std::collections::BTreeMap;

use crate::popup::format_value;

pub type OptionMap = Map<String, Value>;

pub const KEY_DATA: &str = "data";
pub const KEY_POPUP_DATA: &str = "popupData";
pub const KEY_POPUP_HTML: &str = "popupHTML";
pub const KEY_LAYER_ID: &str = "layerId";

/// Options of one layer as sent by the widget host.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct LayerPayload {
    #[serde(rename = "static", default)]
    pub static_options: OptionMap,
    /// One array per time-varying key, indexed by timestep.
    #[serde(rename = "dyn", default)]
    pub dynamic: BTreeMap<String, Vec<Value>>,
    #[serde(rename = "timeSteps")]
    pub time_steps: usize,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum OptionsError {
    TimeStepMismatch {
        layer: usize,
        expected: usize,
        found: usize,
    },
    DynamicLengthMismatch {
        layer: usize,
        key: String,
        expected: usize,
        found: usize,
    },
    TimeIndexOutOfRange {
        time_id: TimeIndex,
        len: usize,
    },
    InvalidPayload(String),
}

impl std::fmt::Display for OptionsError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            OptionsError::TimeStepMismatch {
                layer,
                expected,
                found,
            } => write!(
                f,
                "layer {layer} declares {found} time steps, batch declares {expected}"
            ),
            OptionsError::DynamicLengthMismatch {
                layer,
                key,
                expected,
                found,
            } => write!(
                f,
                "layer {layer}: option '{key}' has {found} values for {expected} time steps"
            ),
            OptionsError::TimeIndexOutOfRange { time_id, len } => {
                write!(f, "time index {time_id} out of range for {len} time steps")
            }
            OptionsError::InvalidPayload(msg) => write!(f, "invalid layer payload: {msg}"),
        }
    }
}

impl std::error::Error for OptionsError {}

/// Parses a JSON array of layer payloads.
pub fn parse_payloads(json: &str) -> Result<Vec<LayerPayload>, OptionsError> {
    serde_json::from_str(json).map_err(|e| OptionsError::InvalidPayload(e.to_string()))
}

/// Expands every payload into its per-timestep snapshots.
///
/// The step count is taken from the first payload. The whole batch is
/// validated before `on_expanded` runs, so a rejected batch invokes nothing.
/// `on_expanded` receives the snapshots, the layer's position in the batch
/// and its static options, once per layer in input order.
pub fn expand_options<F>(payloads: &[LayerPayload], mut on_expanded: F) -> Result<(), OptionsError>
where
    F: FnMut(Vec<OptionMap>, usize, &OptionMap),
{
    let Some(first) = payloads.first() else {
        return Ok(());
    };
    let time_steps = first.time_steps;
    validate_batch(payloads, time_steps)?;

    for (index, payload) in payloads.iter().enumerate() {
        let snapshots = (0..time_steps)
            .map(|t| {
                payload
                    .dynamic
                    .iter()
                    .filter_map(|(key, values)| values.get(t).map(|v| (key.clone(), v.clone())))
                    .collect()
            })
            .collect();
        on_expanded(snapshots, index, &payload.static_options);
    }
    Ok(())
}

fn validate_batch(payloads: &[LayerPayload], time_steps: usize) -> Result<(), OptionsError> {
    for (layer, payload) in payloads.iter().enumerate() {
        if payload.time_steps != time_steps {
            return Err(OptionsError::TimeStepMismatch {
                layer,
                expected: time_steps,
                found: payload.time_steps,
            });
        }
        for (key, values) in &payload.dynamic {
            if values.len() != time_steps {
                return Err(OptionsError::DynamicLengthMismatch {
                    layer,
                    key: key.clone(),
                    expected: time_steps,
                    found: values.len(),
                });
            }
        }
    }
    Ok(())
}

#[derive(Debug, Clone, PartialEq)]
pub struct ExpandedLayer {
    pub index: usize,
    pub snapshots: Vec<OptionMap>,
    pub static_options: OptionMap,
}

/// Collecting form of [`expand_options`].
pub fn expand_all(payloads: &[LayerPayload]) -> Result<Vec<ExpandedLayer>, OptionsError> {
    let mut out = Vec::with_capacity(payloads.len());
    expand_options(payloads, |snapshots, index, static_options| {
        out.push(ExpandedLayer {
            index,
            snapshots,
            static_options: static_options.clone(),
        });
    })?;
    Ok(out)
}

/// Static options overlaid by the snapshot at `time_id`.
///
/// Keys of the snapshot win; static keys it lacks are kept.
pub fn resolve_options(
    snapshots: &[OptionMap],
    static_options: &OptionMap,
    time_id: TimeIndex,
) -> Result<EffectiveOptions, OptionsError> {
    let snapshot = snapshots
        .get(time_id.get())
        .ok_or(OptionsError::TimeIndexOutOfRange {
            time_id,
            len: snapshots.len(),
        })?;

    let mut merged = static_options.clone();
    for (key, value) in snapshot {
        merged.insert(key.clone(), value.clone());
    }
    Ok(EffectiveOptions(merged))
}

/// Options a layer renders with at one timestep.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct EffectiveOptions(OptionMap);

impl EffectiveOptions {
    pub fn new(options: OptionMap) -> Self {
        Self(options)
    }

    pub fn get(&self, key: &str) -> Option<&Value> {
        self.0.get(key).filter(|v| !v.is_null())
    }

    pub fn contains(&self, key: &str) -> bool {
        self.get(key).is_some()
    }

    pub fn f64(&self, key: &str) -> Option<f64> {
        self.get(key).and_then(Value::as_f64)
    }

    pub fn str(&self, key: &str) -> Option<&str> {
        self.get(key).and_then(Value::as_str)
    }

    pub fn bool(&self, key: &str) -> Option<bool> {
        self.get(key).and_then(Value::as_bool)
    }

    pub fn array(&self, key: &str) -> Option<&[Value]> {
        self.get(key).and_then(Value::as_array).map(Vec::as_slice)
    }

    /// Numbers of `key`; a scalar counts as a one-element list.
    pub fn f64_list(&self, key: &str) -> Option<Vec<f64>> {
        let value = self.get(key)?;
        match value {
            Value::Array(items) => Some(items.iter().filter_map(Value::as_f64).collect()),
            other => other.as_f64().map(|x| vec![x]),
        }
    }

    /// Strings of `key`; a scalar counts as a one-element list.
    pub fn str_list(&self, key: &str) -> Option<Vec<String>> {
        let value = self.get(key)?;
        match value {
            Value::Array(items) => Some(
                items
                    .iter()
                    .filter_map(Value::as_str)
                    .map(str::to_string)
                    .collect(),
            ),
            other => other.as_str().map(|s| vec![s.to_string()]),
        }
    }

    /// Primary popup values of the timestep.
    pub fn data(&self) -> Option<&Value> {
        self.get(KEY_DATA)
    }

    /// Extra popup values appended after [`EffectiveOptions::data`].
    pub fn popup_data(&self) -> Option<&Value> {
        self.get(KEY_POPUP_DATA)
    }

    /// Pre-rendered popup HTML, bypassing synthesis.
    pub fn popup_html(&self) -> Option<&str> {
        self.str(KEY_POPUP_HTML).filter(|s| !s.is_empty())
    }

    /// Layer identifier; numbers are accepted and rendered as text.
    pub fn layer_id(&self) -> Option<String> {
        match self.get(KEY_LAYER_ID)? {
            Value::String(s) if s.is_empty() => None,
            other => Some(format_value(other)),
        }
    }

    pub fn as_map(&self) -> &OptionMap {
        &self.0
    }

    pub fn into_map(self) -> OptionMap {
        self.0
    }
}

impl From<OptionMap> for EffectiveOptions {
    fn from(options: OptionMap) -> Self {
        Self(options)
    }
}
