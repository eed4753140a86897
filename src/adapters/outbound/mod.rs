pub mod astar;
pub mod cell_grid;
pub mod comm_model;
pub mod console_logger;
pub mod file_logger;
pub mod frontier_chooser;
pub mod memory_logger;
pub mod multi_logger;
pub mod noop_logger;
pub mod simulated_environment;
pub mod skeleton;

pub use astar::*;
pub use cell_grid::*;
pub use comm_model::*;
pub use console_logger::*;
pub use file_logger::*;
pub use frontier_chooser::*;
pub use memory_logger::*;
pub use multi_logger::*;
pub use noop_logger::*;
pub use simulated_environment::*;
pub use skeleton::*;
