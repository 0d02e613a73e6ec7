//! Report builders behind the `minicharts` command line.

use foundation::time::TimeIndex;
use layers::{
    EffectiveOptions, LayerPayload, OptionMap, OptionsError, PopupArgs, PopupContent, expand_all,
    popup_content, resolve_options,
};
use serde::Serialize;
use tracing::warn;

#[derive(Debug, Serialize)]
pub struct ExpandedReport<'a> {
    pub layer: usize,
    #[serde(rename = "static")]
    pub static_options: &'a OptionMap,
    pub snapshots: &'a [OptionMap],
}

#[derive(Debug, Serialize)]
pub struct PopupReport {
    pub layer: usize,
    pub id: String,
    /// `None` when popups are disabled or the layer has no options at this index.
    pub html: Option<String>,
}

/// Pretty JSON of every layer's per-timestep snapshots.
pub fn expand_report(payloads: &[LayerPayload]) -> Result<String, OptionsError> {
    let layers = expand_all(payloads)?;
    let reports: Vec<_> = layers
        .iter()
        .map(|layer| ExpandedReport {
            layer: layer.index,
            static_options: &layer.static_options,
            snapshots: &layer.snapshots,
        })
        .collect();
    serde_json::to_string_pretty(&reports).map_err(|e| OptionsError::InvalidPayload(e.to_string()))
}

/// Effective options of every layer at `time_id`. Layers without a snapshot
/// at that index are reported as `null`.
pub fn resolve_report(payloads: &[LayerPayload], time_id: TimeIndex) -> Result<String, OptionsError> {
    let layers = expand_all(payloads)?;
    let resolved: Vec<Option<OptionMap>> = layers
        .iter()
        .map(|layer| {
            resolve_options(&layer.snapshots, &layer.static_options, time_id)
                .map(EffectiveOptions::into_map)
                .map_err(|err| warn!(layer = layer.index, %err, "layer skipped"))
                .ok()
        })
        .collect();
    serde_json::to_string_pretty(&resolved).map_err(|e| OptionsError::InvalidPayload(e.to_string()))
}

/// The popup each layer shows at `time_id`, built from that timestep's
/// options alone.
///
/// Layers without a static `layerId` are reported under their batch position
/// and get no popup title.
pub fn popup_reports(
    payloads: &[LayerPayload],
    args: &PopupArgs,
    time_id: TimeIndex,
) -> Result<Vec<PopupReport>, OptionsError> {
    let layers = expand_all(payloads)?;
    Ok(layers
        .iter()
        .map(|layer| {
            let title = EffectiveOptions::new(layer.static_options.clone()).layer_id();
            let id = title.clone().unwrap_or_else(|| layer.index.to_string());
            let html = match layer.snapshots.get(time_id.get()) {
                Some(step) => {
                    let step = EffectiveOptions::new(step.clone());
                    popup_content(title.as_deref(), &step, args).map(PopupContent::into_html)
                }
                None => {
                    warn!(layer = layer.index, %time_id, "no options at time index; no popup");
                    None
                }
            };
            PopupReport {
                layer: layer.index,
                id,
                html,
            }
        })
        .collect())
}

#[cfg(test)]
mod tests {
    use super::{expand_report, popup_reports, resolve_report};
    use foundation::time::TimeIndex;
    use layers::{PopupArgs, parse_payloads};
    use pretty_assertions::assert_eq;
    use serde_json::{Value, json};

    const PAYLOAD: &str = r#"[
        {"static": {"layerId": "a", "lat": 1}, "dyn": {"data": [[1, 2], [3, 4]]}, "timeSteps": 2},
        {"static": {"lat": 2}, "dyn": {"data": [[5], [6]], "popupHTML": ["<b>x</b>", "<b>y</b>"]}, "timeSteps": 2}
    ]"#;

    #[test]
    fn expand_lists_snapshots_per_layer() {
        let payloads = parse_payloads(PAYLOAD).expect("parse");
        let out: Value = serde_json::from_str(&expand_report(&payloads).expect("report")).expect("json");
        assert_eq!(out[0]["snapshots"], json!([{"data": [1, 2]}, {"data": [3, 4]}]));
        assert_eq!(out[1]["static"], json!({"lat": 2}));
    }

    #[test]
    fn resolve_overlays_static_options() {
        let payloads = parse_payloads(PAYLOAD).expect("parse");
        let out: Value =
            serde_json::from_str(&resolve_report(&payloads, TimeIndex(1)).expect("report")).expect("json");
        assert_eq!(out[0], json!({"layerId": "a", "lat": 1, "data": [3, 4]}));

        let out: Value =
            serde_json::from_str(&resolve_report(&payloads, TimeIndex(7)).expect("report")).expect("json");
        assert_eq!(out, json!([null, null]));
    }

    #[test]
    fn popups_use_prerendered_html_when_present() {
        let payloads = parse_payloads(PAYLOAD).expect("parse");
        let reports = popup_reports(&payloads, &PopupArgs::default(), TimeIndex(1)).expect("popups");
        assert_eq!(reports[0].id, "a");
        assert_eq!(
            reports[0].html.as_deref(),
            Some("<div class=\"popup\"><h2>a</h2>3, 4</div>")
        );
        assert_eq!(reports[1].id, "1");
        assert_eq!(reports[1].html.as_deref(), Some("<b>y</b>"));
    }

    #[test]
    fn unnamed_layers_get_no_title() {
        let payloads = parse_payloads(
            r#"[{"static": {"lat": 1}, "dyn": {"data": [[1], [2]]}, "timeSteps": 2}]"#,
        )
        .expect("parse");
        let reports = popup_reports(&payloads, &PopupArgs::default(), TimeIndex(0)).expect("popups");
        assert_eq!(reports[0].id, "0");
        assert_eq!(reports[0].html.as_deref(), Some("<div class=\"popup\">1</div>"));
    }
}
