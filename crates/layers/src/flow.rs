use foundation::ids::Category;

use crate::layer::LayerKind;
use crate::options::EffectiveOptions;
use crate::symbology::{LayerStyle, parse_hex_color};

/// Arrow between two map positions whose thickness follows a value.
#[derive(Debug, Clone, PartialEq)]
pub struct Flow {
    /// `[lat, lng]` of the origin.
    pub from: [f64; 2],
    /// `[lat, lng]` of the destination.
    pub to: [f64; 2],
    pub value: f64,
    pub max_value: f64,
    pub min_thickness: f64,
    pub max_thickness: f64,
    pub style: LayerStyle,
    /// 1 forward, -1 backward, 0 undirected.
    pub dir: i8,
}

impl Default for Flow {
    fn default() -> Self {
        Self {
            from: [0.0, 0.0],
            to: [0.0, 0.0],
            value: 1.0,
            max_value: 1.0,
            min_thickness: 1.0,
            max_thickness: 20.0,
            style: LayerStyle::default(),
            dir: 1,
        }
    }
}

impl LayerKind for Flow {
    const CATEGORY: &'static str = Category::FLOW;

    fn from_options(options: &EffectiveOptions) -> Self {
        let mut flow = Self::default();
        flow.update(options);
        flow
    }

    fn update(&mut self, options: &EffectiveOptions) {
        if let (Some(lat), Some(lng)) = (options.f64("lat0"), options.f64("lng0")) {
            self.from = [lat, lng];
        }
        if let (Some(lat), Some(lng)) = (options.f64("lat1"), options.f64("lng1")) {
            self.to = [lat, lng];
        }
        let value = options
            .f64("value")
            .or_else(|| options.f64_list("data").and_then(|d| d.first().copied()));
        if let Some(value) = value {
            self.value = value;
        }
        if let Some(max) = options.f64("maxValue") {
            self.max_value = max;
        }
        if let Some(min) = options.f64("minThickness") {
            self.min_thickness = min;
        }
        if let Some(max) = options.f64("maxThickness") {
            self.max_thickness = max;
        }
        if let Some(color) = options.str("color").and_then(parse_hex_color) {
            self.style.color = color;
        }
        if let Some(o) = options.f64("opacity") {
            self.style.opacity = o.clamp(0.0, 1.0) as f32;
        }
        if let Some(dir) = options.f64("dir") {
            self.dir = if dir > 0.0 {
                1
            } else if dir < 0.0 {
                -1
            } else {
                0
            };
        }
    }
}
