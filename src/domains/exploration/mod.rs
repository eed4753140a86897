pub mod controller;
pub mod ports;
pub mod projections;
pub mod random_walk;
pub mod settings;

pub use controller::*;
pub use ports::*;
pub use projections::*;
pub use random_walk::*;
pub use settings::*;
