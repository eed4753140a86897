pub mod points;
pub mod projections;
pub mod settings;
pub mod strategy;
pub mod types;

pub use points::*;
pub use projections::*;
pub use settings::*;
pub use strategy::*;
pub use types::*;
