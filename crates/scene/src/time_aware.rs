use foundation::time::TimeIndex;

/// Capability of a layer driven by the shared time slider.
pub trait TimeAware {
    /// Applies `time_id` to the layer.
    ///
    /// Re-applying the last applied index is a no-op.
    fn set_time_id(&mut self, time_id: TimeIndex);

    /// Last applied time index, `None` before the first application.
    fn time_id(&self) -> Option<TimeIndex>;

    /// Content of the layer's popup, if one is bound.
    fn popup_html(&self) -> Option<&str> {
        None
    }
}
