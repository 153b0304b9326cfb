mod iter;
mod labeled;
mod registry;

pub use iter::*;
pub use labeled::*;
use registry::LabelRegistry;
