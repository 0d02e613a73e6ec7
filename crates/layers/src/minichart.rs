use foundation::ids::Category;
use serde::{Deserialize, Serialize};

use crate::layer::LayerKind;
use crate::options::EffectiveOptions;
use crate::symbology::{LayerStyle, parse_hex_color};

#[derive(Debug, Copy, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum ChartType {
    #[default]
    Bar,
    Pie,
    PolarArea,
    PolarRadius,
}

impl ChartType {
    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "bar" => Some(ChartType::Bar),
            "pie" => Some(ChartType::Pie),
            "polar-area" => Some(ChartType::PolarArea),
            "polar-radius" => Some(ChartType::PolarRadius),
            _ => None,
        }
    }
}

/// Small chart anchored at a map position.
#[derive(Debug, Clone, PartialEq)]
pub struct Minichart {
    /// `[lat, lng]`
    pub position: [f64; 2],
    pub chart_type: ChartType,
    pub data: Vec<f64>,
    /// Upper bound per series; `None` scales to the chart's own maximum.
    pub max_values: Option<Vec<f64>>,
    pub width: f64,
    pub height: f64,
    pub style: LayerStyle,
    pub colors: Vec<[f32; 4]>,
    pub show_labels: bool,
    pub label_text: Option<String>,
    pub transition_ms: f64,
}

impl Default for Minichart {
    fn default() -> Self {
        Self {
            position: [0.0, 0.0],
            chart_type: ChartType::Bar,
            data: Vec::new(),
            max_values: None,
            width: 60.0,
            height: 60.0,
            style: LayerStyle::default(),
            colors: Vec::new(),
            show_labels: false,
            label_text: None,
            transition_ms: 750.0,
        }
    }
}

impl LayerKind for Minichart {
    const CATEGORY: &'static str = Category::MINICHART;

    fn from_options(options: &EffectiveOptions) -> Self {
        let mut chart = Self::default();
        chart.update(options);
        chart
    }

    fn update(&mut self, options: &EffectiveOptions) {
        if let (Some(lat), Some(lng)) = (options.f64("lat"), options.f64("lng")) {
            self.position = [lat, lng];
        }
        if let Some(t) = options.str("type").and_then(ChartType::parse) {
            self.chart_type = t;
        }
        if let Some(data) = options.f64_list("data") {
            self.data = data;
        }
        if let Some(max) = options.f64_list("maxValues") {
            self.max_values = Some(max);
        }
        if let Some(w) = options.f64("width") {
            self.width = w;
        }
        if let Some(h) = options.f64("height") {
            self.height = h;
        }
        if let Some(o) = options.f64("opacity") {
            self.style.opacity = o.clamp(0.0, 1.0) as f32;
        }
        if let Some(colors) = options.str_list("colors") {
            self.colors = colors.iter().filter_map(|c| parse_hex_color(c)).collect();
        }
        if let Some(show) = options.bool("showLabels") {
            self.show_labels = show;
        }
        if let Some(text) = options.str("labelText") {
            self.label_text = Some(text.to_string());
        }
        if let Some(ms) = options.f64("transitionTime") {
            self.transition_ms = ms;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::{ChartType, Minichart};
    use crate::layer::LayerKind;
    use crate::options::EffectiveOptions;
    use serde_json::{Value, json};

    fn opts(v: Value) -> EffectiveOptions {
        match v {
            Value::Object(m) => EffectiveOptions::new(m),
            other => panic!("expected object, got {other}"),
        }
    }

    #[test]
    fn builds_from_options_with_defaults() {
        let chart = Minichart::from_options(&opts(json!({
            "lat": 48.8, "lng": 2.3, "type": "pie", "data": [1, 2, 3],
            "colors": ["#ff0000", "#00ff00"]
        })));
        assert_eq!(chart.position, [48.8, 2.3]);
        assert_eq!(chart.chart_type, ChartType::Pie);
        assert_eq!(chart.data, vec![1.0, 2.0, 3.0]);
        assert_eq!(chart.width, 60.0);
        assert_eq!(chart.colors.len(), 2);
    }

    #[test]
    fn update_keeps_absent_keys() {
        let mut chart = Minichart::from_options(&opts(json!({"data": [1], "width": 30})));
        chart.update(&opts(json!({"data": [5, 6]})));
        assert_eq!(chart.data, vec![5.0, 6.0]);
        assert_eq!(chart.width, 30.0);

        chart.update(&opts(json!({"type": "donut"})));
        assert_eq!(chart.chart_type, ChartType::Bar);
    }

    #[test]
    fn scalar_max_values_count_as_one_series() {
        let mut chart = Minichart::from_options(&opts(json!({"data": [5, 10]})));
        assert_eq!(chart.max_values, None);

        chart.update(&opts(json!({"maxValues": 20})));
        assert_eq!(chart.max_values, Some(vec![20.0]));
    }
}
