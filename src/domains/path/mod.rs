pub mod cache;
pub mod path;
pub mod ports;

pub use cache::*;
pub use path::*;
pub use ports::*;
