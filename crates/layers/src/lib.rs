pub mod build;
pub mod flow;
pub mod layer;
pub mod minichart;
pub mod options;
pub mod popup;
pub mod symbology;
pub mod timed;

pub use build::*;
pub use layer::*;
pub use options::*;
pub use popup::*;
pub use timed::*;
