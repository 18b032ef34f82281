pub mod manager;
pub mod solver;
pub mod traits;

pub use manager::{AppConfig, ConfigManager};
pub use solver::{derive_run_shape, SolverConfig};
