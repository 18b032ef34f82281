pub mod candidate;
pub mod operators;
pub mod progress;
pub mod solver_engine;

pub use candidate::Candidate;
pub use operators::OperatorCounters;
pub use progress::{ConsoleProgress, ProgressCallback};
pub use solver_engine::{
    best_candidate, ExecutionMode, GenerationStep, RunParameters, SolverEngine,
};
