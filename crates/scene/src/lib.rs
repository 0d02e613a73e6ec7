pub mod controls;
pub mod layer_manager;
pub mod map;
pub mod sync;
pub mod time_aware;
pub mod time_slider;

pub use controls::*;
pub use layer_manager::*;
pub use map::*;
pub use sync::*;
pub use time_aware::*;
pub use time_slider::*;
