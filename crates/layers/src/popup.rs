//! Popup content for time-driven layers.
//!
//! [`popup_content`] and [`synthesize_popup_html`] are pure: they derive the
//! HTML from one timestep's options. [`apply_popup`] pushes that HTML into a
//! live popup.

use serde::{Deserialize, Deserializer, Serialize};
use serde_json::Value;

use crate::options::{EffectiveOptions, OptionMap};

/// How a layer's popup is built. Immutable once the layer exists.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct PopupArgs {
    pub no_popup: bool,
    pub show_title: bool,
    pub show_values: bool,
    /// Keys of the primary values.
    #[serde(deserialize_with = "one_or_many")]
    pub labels: Vec<String>,
    /// Keys of the extra popup values.
    #[serde(deserialize_with = "one_or_many")]
    pub sup_labels: Vec<String>,
    pub digits: Option<u32>,
}

impl Default for PopupArgs {
    fn default() -> Self {
        Self {
            no_popup: false,
            show_title: true,
            show_values: true,
            labels: Vec::new(),
            sup_labels: Vec::new(),
            digits: None,
        }
    }
}

// Hosts unbox one-element vectors into scalars.
fn one_or_many<'de, D>(deserializer: D) -> Result<Vec<String>, D::Error>
where
    D: Deserializer<'de>,
{
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum OneOrMany {
        One(String),
        Many(Vec<String>),
        Nothing(()),
    }

    Ok(match OneOrMany::deserialize(deserializer)? {
        OneOrMany::One(s) => vec![s],
        OneOrMany::Many(v) => v,
        OneOrMany::Nothing(()) => Vec::new(),
    })
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PopupContent {
    /// HTML shipped with the timestep's options.
    PreRendered(String),
    /// HTML built from the timestep's values.
    Synthesized(String),
}

impl PopupContent {
    pub fn html(&self) -> &str {
        match self {
            PopupContent::PreRendered(html) | PopupContent::Synthesized(html) => html,
        }
    }

    pub fn into_html(self) -> String {
        match self {
            PopupContent::PreRendered(html) | PopupContent::Synthesized(html) => html,
        }
    }
}

/// Popup content of one timestep, `None` when the layer has popups disabled.
pub fn popup_content(
    layer_id: Option<&str>,
    options: &EffectiveOptions,
    args: &PopupArgs,
) -> Option<PopupContent> {
    if args.no_popup {
        return None;
    }
    if let Some(html) = options.popup_html() {
        return Some(PopupContent::PreRendered(html.to_string()));
    }
    Some(PopupContent::Synthesized(synthesize_popup_html(
        layer_id, options, args,
    )))
}

/// Builds `<div class="popup">{title}{values}</div>` from the timestep's values.
pub fn synthesize_popup_html(
    layer_id: Option<&str>,
    options: &EffectiveOptions,
    args: &PopupArgs,
) -> String {
    let title = match layer_id {
        Some(id) if args.show_title && !id.is_empty() => format!("<h2>{id}</h2>"),
        _ => String::new(),
    };
    let section = options
        .data()
        .map(|data| value_section(data, options.popup_data(), args))
        .unwrap_or_default();
    format!("<div class=\"popup\">{title}{section}</div>")
}

fn value_section(data: &Value, popup_data: Option<&Value>, args: &PopupArgs) -> String {
    let (mut values, keys): (Vec<&Value>, Vec<&str>) = if args.show_values {
        (
            as_values(data),
            args.labels
                .iter()
                .chain(&args.sup_labels)
                .map(String::as_str)
                .collect(),
        )
    } else {
        (
            Vec::new(),
            args.sup_labels.iter().map(String::as_str).collect(),
        )
    };
    if let Some(extra) = popup_data {
        values.extend(as_values(extra));
    }

    if keys.is_empty() {
        return values
            .iter()
            .map(|v| format_value(v))
            .collect::<Vec<_>>()
            .join(", ");
    }

    let rows: String = values
        .iter()
        .enumerate()
        .map(|(i, value)| {
            let key = keys.get(i).copied().unwrap_or_default();
            let value = match args.digits {
                Some(digits) if digits > 0 => round_value(value, digits),
                _ => format_value(value),
            };
            format!("<tr><td class='key'>{key}</td><td class='value'>{value}</td></tr>")
        })
        .collect();
    format!("<table><tbody>{rows}</tbody></table>")
}

fn as_values(value: &Value) -> Vec<&Value> {
    match value {
        Value::Array(items) => items.iter().collect(),
        Value::Null => Vec::new(),
        other => vec![other],
    }
}

/// Renders a value the way the browser host prints it.
///
/// Integral numbers drop their fraction (`2.0` renders as `2`), magnitudes
/// below `1e-6` or from `1e21` up use exponent notation (`1e-7`, `1e+21`),
/// nulls render empty and nested lists are comma separated.
pub fn format_value(value: &Value) -> String {
    match value {
        Value::Null => String::new(),
        Value::Bool(b) => b.to_string(),
        Value::Number(n) => {
            if let Some(i) = n.as_i64() {
                i.to_string()
            } else if let Some(u) = n.as_u64() {
                u.to_string()
            } else {
                n.as_f64().map(format_number).unwrap_or_else(|| n.to_string())
            }
        }
        Value::String(s) => s.clone(),
        Value::Array(items) => items.iter().map(format_value).collect::<Vec<_>>().join(","),
        Value::Object(_) => value.to_string(),
    }
}

fn format_number(x: f64) -> String {
    let abs = x.abs();
    if abs >= 1e21 || (abs != 0.0 && abs < 1e-6) {
        let s = format!("{x:e}");
        return match s.split_once('e') {
            Some((mantissa, exp)) if !exp.starts_with('-') => format!("{mantissa}e+{exp}"),
            _ => s,
        };
    }
    if x.fract() == 0.0 && abs < 1e15 {
        format!("{}", x as i64)
    } else {
        format!("{x}")
    }
}

fn numeric(value: &Value) -> Option<f64> {
    let x = match value {
        Value::Number(n) => n.as_f64()?,
        Value::String(s) => s.trim().parse::<f64>().ok()?,
        _ => return None,
    };
    x.is_finite().then_some(x)
}

/// Rounds numeric values (numbers or numeric strings) to `digits` decimals,
/// then drops trailing zeros. Anything else renders unchanged.
fn round_value(value: &Value, digits: u32) -> String {
    let Some(x) = numeric(value) else {
        return format_value(value);
    };
    let fixed = to_fixed(x, digits.min(MAX_DIGITS) as usize);
    fixed
        .parse::<f64>()
        .map(format_number)
        .unwrap_or(fixed)
}

const MAX_DIGITS: u32 = 100;

// Enough fractional digits to print any finite f64 exactly.
const EXACT_DIGITS: usize = 1074;

/// Fixed-point rendering of the exact binary value, ties away from zero.
fn to_fixed(x: f64, digits: usize) -> String {
    let exact = format!("{:.*}", EXACT_DIGITS, x.abs());
    let (int_part, frac) = exact.split_once('.').unwrap_or((exact.as_str(), ""));
    let mut kept: Vec<u8> = int_part
        .bytes()
        .chain(frac.bytes().take(digits))
        .collect();

    if frac.as_bytes().get(digits).is_some_and(|&b| b >= b'5') {
        let mut i = kept.len();
        loop {
            if i == 0 {
                kept.insert(0, b'1');
                break;
            }
            i -= 1;
            if kept[i] == b'9' {
                kept[i] = b'0';
            } else {
                kept[i] += 1;
                break;
            }
        }
    }

    let (int_digits, frac_digits) = kept.split_at(kept.len() - digits);
    let sign = if x.is_sign_negative() { "-" } else { "" };
    let int_digits = String::from_utf8_lossy(int_digits);
    if digits == 0 {
        format!("{sign}{int_digits}")
    } else {
        format!("{sign}{int_digits}.{}", String::from_utf8_lossy(frac_digits))
    }
}

/// A live popup a layer can bind content to.
pub trait PopupSurface {
    fn is_popup_open(&self) -> bool;
    fn bind_popup(&mut self, html: &str, options: &OptionMap);
    fn set_popup_content(&mut self, html: &str);
}

/// Updates an open popup in place, otherwise (re)binds fresh content.
pub fn apply_popup<S: PopupSurface + ?Sized>(surface: &mut S, html: &str, options: &OptionMap) {
    if surface.is_popup_open() {
        surface.set_popup_content(html);
    } else {
        surface.bind_popup(html, options);
    }
}

/// In-memory popup: bound content, open flag and popup options.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct PopupState {
    content: Option<String>,
    options: OptionMap,
    open: bool,
    binds: usize,
    content_updates: usize,
}

impl PopupState {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn content(&self) -> Option<&str> {
        self.content.as_deref()
    }

    pub fn options(&self) -> &OptionMap {
        &self.options
    }

    /// Opens the popup. Returns `false` when nothing is bound.
    pub fn open(&mut self) -> bool {
        self.open = self.content.is_some();
        self.open
    }

    pub fn close(&mut self) {
        self.open = false;
    }

    pub fn bind_count(&self) -> usize {
        self.binds
    }

    pub fn content_update_count(&self) -> usize {
        self.content_updates
    }
}

impl PopupSurface for PopupState {
    fn is_popup_open(&self) -> bool {
        self.open
    }

    fn bind_popup(&mut self, html: &str, options: &OptionMap) {
        self.content = Some(html.to_string());
        self.options = options.clone();
        self.binds += 1;
    }

    fn set_popup_content(&mut self, html: &str) {
        self.content = Some(html.to_string());
        self.content_updates += 1;
    }
}
