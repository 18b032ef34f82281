use std::sync::atomic::{AtomicUsize, Ordering};

/// Observer for generation-level progress.
///
/// Callbacks may be invoked concurrently from generation tasks, so methods
/// take `&self` and implementations must be thread-safe.
pub trait ProgressCallback: Send + Sync {
    fn on_generation_start(&self, _generation: usize) {}

    fn on_generation_complete(&self, _generation: usize, _best_fitness: f64, _pool_size: usize) {}
}

/// No-op callback for library callers that don't track progress.
impl ProgressCallback for () {}

/// Prints a running completion count to stdout.
///
/// Generations finish in arbitrary order under parallel execution, so the
/// printed count tracks how many have completed, not which.
pub struct ConsoleProgress {
    total: usize,
    completed: AtomicUsize,
}

impl ConsoleProgress {
    pub fn new(total: usize) -> Self {
        Self {
            total,
            completed: AtomicUsize::new(0),
        }
    }
}

impl ProgressCallback for ConsoleProgress {
    fn on_generation_complete(&self, _generation: usize, _best_fitness: f64, _pool_size: usize) {
        let done = self.completed.fetch_add(1, Ordering::Relaxed) + 1;
        println!("Generations Complete: {}/{}", done, self.total);
    }
}
