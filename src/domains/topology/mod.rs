pub mod map;
pub mod node;
pub mod ports;
pub mod projections;

pub use map::*;
pub use node::*;
pub use ports::*;
pub use projections::*;
