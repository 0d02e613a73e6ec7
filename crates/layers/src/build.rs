use foundation::ids::LayerId;
use foundation::time::TimeIndex;
use scene::map::Map;
use scene::time_aware::TimeAware;
use tracing::debug;

use crate::layer::LayerKind;
use crate::options::{
    EffectiveOptions, LayerPayload, OptionMap, OptionsError, expand_options, resolve_options,
};
use crate::popup::PopupArgs;
use crate::timed::TimedLayer;

/// Builds one layer per payload, each already showing `time_id`.
///
/// Layers without a static `layerId` are named after their batch position.
pub fn build_layers<K: LayerKind>(
    payloads: &[LayerPayload],
    popup_args: &PopupArgs,
    popup_options: &OptionMap,
    time_id: TimeIndex,
) -> Result<Vec<TimedLayer<K>>, OptionsError> {
    let mut layers = Vec::with_capacity(payloads.len());
    expand_options(payloads, |snapshots, index, static_options| {
        let initial = resolve_options(&snapshots, static_options, time_id)
            .unwrap_or_else(|_| EffectiveOptions::new(static_options.clone()));
        let id = initial.layer_id().unwrap_or_else(|| index.to_string());
        let mut layer = TimedLayer::new(
            K::from_options(&initial),
            snapshots,
            static_options.clone(),
            popup_args.clone(),
        )
        .with_id(id)
        .with_popup_options(popup_options.clone());
        layer.set_time_id(time_id);
        layers.push(layer);
    })?;
    debug!(
        category = K::CATEGORY,
        layers = layers.len(),
        %time_id,
        "layers built"
    );
    Ok(layers)
}

/// Registers `layers` on the map under their kind's category.
pub fn add_layers<K: LayerKind + 'static>(map: &mut Map, layers: Vec<TimedLayer<K>>) -> usize {
    let mut added = 0;
    for layer in layers {
        let id = layer.id().cloned().unwrap_or_else(|| LayerId::new(added.to_string()));
        map.add_layer(K::CATEGORY, id, Box::new(layer) as Box<dyn TimeAware>);
        added += 1;
    }
    added
}

/// Removes the listed layers of kind `K`, returning how many existed.
pub fn remove_layers<K, I, S>(map: &mut Map, ids: I) -> usize
where
    K: LayerKind,
    I: IntoIterator<Item = S>,
    S: AsRef<str>,
{
    map.layers_mut().remove_layers(K::CATEGORY, ids)
}

/// Removes every layer of kind `K`.
pub fn clear_layers<K: LayerKind>(map: &mut Map) -> usize {
    map.layers_mut().clear_layers(K::CATEGORY)
}

#[cfg(test)]
mod tests {
    use super::{add_layers, build_layers, clear_layers, remove_layers};
    use crate::flow::Flow;
    use crate::minichart::Minichart;
    use crate::options::{OptionMap, OptionsError, parse_payloads};
    use crate::popup::PopupArgs;
    use foundation::time::TimeIndex;
    use scene::map::Map;
    use scene::time_aware::TimeAware;

    const CHARTS: &str = r#"[
        {"static": {"layerId": "lyon", "lat": 45.7, "lng": 4.8},
         "dyn": {"data": [[1], [2]]}, "timeSteps": 2},
        {"static": {"lat": 43.3, "lng": 5.4},
         "dyn": {"data": [[10], [20]]}, "timeSteps": 2}
    ]"#;

    #[test]
    fn layers_start_at_the_given_index() {
        let payloads = parse_payloads(CHARTS).expect("parse");
        let layers: Vec<_> = build_layers::<Minichart>(
            &payloads,
            &PopupArgs::default(),
            &OptionMap::new(),
            TimeIndex(1),
        )
        .expect("build");

        assert_eq!(layers.len(), 2);
        assert_eq!(layers[0].id().map(|id| id.as_str()), Some("lyon"));
        assert_eq!(layers[1].id().map(|id| id.as_str()), Some("1"));
        assert_eq!(layers[1].kind().data, vec![20.0]);
        assert_eq!(layers[0].time_id(), Some(TimeIndex(1)));
        assert_eq!(
            layers[0].popup_html(),
            Some("<div class=\"popup\"><h2>lyon</h2>2</div>")
        );
    }

    #[test]
    fn position_ids_are_not_popup_titles() {
        let payloads = parse_payloads(
            r#"[{"static": {"lat": 1, "lng": 1}, "dyn": {"data": [[1], [2]]}, "timeSteps": 2}]"#,
        )
        .expect("parse");
        let layers = build_layers::<Minichart>(
            &payloads,
            &PopupArgs::default(),
            &OptionMap::new(),
            TimeIndex(0),
        )
        .expect("build");

        assert_eq!(layers[0].id().map(|id| id.as_str()), Some("0"));
        assert_eq!(layers[0].popup_html(), Some("<div class=\"popup\">1</div>"));
    }

    #[test]
    fn bad_batches_build_nothing() {
        let mut payloads = parse_payloads(CHARTS).expect("parse");
        payloads[1].time_steps = 3;
        let err = build_layers::<Flow>(
            &payloads,
            &PopupArgs::default(),
            &OptionMap::new(),
            TimeIndex(0),
        )
        .expect_err("mismatch");
        assert!(matches!(err, OptionsError::TimeStepMismatch { layer: 1, .. }));
    }

    #[test]
    fn add_remove_and_clear_by_kind() {
        let payloads = parse_payloads(CHARTS).expect("parse");
        let layers = build_layers::<Minichart>(
            &payloads,
            &PopupArgs::default(),
            &OptionMap::new(),
            TimeIndex(0),
        )
        .expect("build");

        let mut map = Map::new();
        assert_eq!(add_layers(&mut map, layers), 2);
        assert_eq!(map.layers().len("minichart"), 2);

        assert_eq!(remove_layers::<Minichart, _, _>(&mut map, ["lyon"]), 1);
        assert_eq!(remove_layers::<Flow, _, _>(&mut map, ["1"]), 0);
        assert_eq!(clear_layers::<Minichart>(&mut map), 1);
        assert!(map.layers().is_empty());
    }
}
