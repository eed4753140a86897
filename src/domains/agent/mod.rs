pub mod aggregate;
pub mod events;
pub mod role;
pub mod teammate;

pub use aggregate::*;
pub use events::*;
pub use role::*;
pub use teammate::*;
