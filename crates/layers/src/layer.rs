use crate::options::EffectiveOptions;

/// Visual state of one layer type, driven by its effective options.
pub trait LayerKind {
    /// Category the layer registers under and receives broadcasts for.
    const CATEGORY: &'static str;

    fn from_options(options: &EffectiveOptions) -> Self;

    /// Applies the options of a new timestep. Keys absent from `options`
    /// keep their previous value.
    fn update(&mut self, options: &EffectiveOptions);
}
