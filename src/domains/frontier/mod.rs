pub mod contour;
pub mod frontier;
pub mod ports;

pub use contour::*;
pub use frontier::*;
pub use ports::*;
