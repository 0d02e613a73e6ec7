use console_error_panic_hook::set_once;
use js_sys::Array;
use std::cell::RefCell;
use wasm_bindgen::prelude::*;

mod widget;
pub use widget::{Widget, WidgetError};

thread_local! {
    static WIDGET: RefCell<Widget> = RefCell::new(Widget::new());
}

fn to_js(err: WidgetError) -> JsValue {
    let msg = err.to_string();
    web_sys::console::error_1(&JsValue::from_str(&msg));
    JsValue::from_str(&msg)
}

#[wasm_bindgen(start)]
pub fn start() -> Result<(), JsValue> {
    set_once();
    Ok(())
}

/// Creates the time slider, or updates its labels, and applies the initial time.
///
/// `labels_json` is a JSON list of labels (a bare string counts as one label).
#[wasm_bindgen]
pub fn init_time_slider(
    labels_json: Option<String>,
    initial_time: Option<String>,
) -> Result<usize, JsValue> {
    WIDGET.with(|w| {
        w.borrow_mut()
            .init_time_slider(labels_json.as_deref(), initial_time.as_deref())
            .map_err(to_js)
    })
}

#[wasm_bindgen]
pub fn add_minicharts(
    payload_json: &str,
    popup_args_json: Option<String>,
    popup_options_json: Option<String>,
) -> Result<usize, JsValue> {
    WIDGET.with(|w| {
        w.borrow_mut()
            .add_minicharts(
                payload_json,
                popup_args_json.as_deref(),
                popup_options_json.as_deref(),
            )
            .map_err(to_js)
    })
}

#[wasm_bindgen]
pub fn add_flows(
    payload_json: &str,
    popup_args_json: Option<String>,
    popup_options_json: Option<String>,
) -> Result<usize, JsValue> {
    WIDGET.with(|w| {
        w.borrow_mut()
            .add_flows(
                payload_json,
                popup_args_json.as_deref(),
                popup_options_json.as_deref(),
            )
            .map_err(to_js)
    })
}

/// Moves every synchronized layer to `time_id`.
#[wasm_bindgen]
pub fn set_time_id(time_id: usize) -> Result<usize, JsValue> {
    WIDGET.with(|w| w.borrow_mut().set_time_id(time_id)).ok_or_else(|| {
        let msg = "no time slider; call init_time_slider first";
        web_sys::console::warn_1(&JsValue::from_str(msg));
        JsValue::from_str(msg)
    })
}

#[wasm_bindgen]
pub fn time_id() -> Option<usize> {
    WIDGET.with(|w| w.borrow().time_id())
}

#[wasm_bindgen]
pub fn time_labels() -> Array {
    WIDGET.with(|w| {
        w.borrow()
            .time_labels()
            .into_iter()
            .map(JsValue::from)
            .collect()
    })
}

#[wasm_bindgen]
pub fn popup_html(category: &str, id: &str) -> Option<String> {
    WIDGET.with(|w| w.borrow().popup_html(category, id))
}

#[wasm_bindgen]
pub fn remove_minicharts(ids_json: &str) -> Result<usize, JsValue> {
    WIDGET.with(|w| w.borrow_mut().remove_minicharts(ids_json).map_err(to_js))
}

#[wasm_bindgen]
pub fn remove_flows(ids_json: &str) -> Result<usize, JsValue> {
    WIDGET.with(|w| w.borrow_mut().remove_flows(ids_json).map_err(to_js))
}

#[wasm_bindgen]
pub fn clear_minicharts() -> usize {
    WIDGET.with(|w| w.borrow_mut().clear_minicharts())
}

#[wasm_bindgen]
pub fn clear_flows() -> usize {
    WIDGET.with(|w| w.borrow_mut().clear_flows())
}

#[wasm_bindgen]
pub fn sync_category(category: &str) -> bool {
    WIDGET.with(|w| w.borrow_mut().sync_category(category))
}
