use crate::engines::generation::Candidate;
use std::fmt;

/// Summary of a completed solver run.
///
/// `best` is `None` when the historical pool ended up empty (for example a
/// zero-generation run), which the front-end reports as "no solution found".
#[derive(Debug, Clone)]
pub struct RunReport {
    pub best: Option<Candidate>,
    pub target: f64,
    pub population_size: usize,
    pub generations: usize,
    /// `population_size * generations`: candidates the run budgeted for.
    pub total_candidates: usize,
    /// Candidates that made it into the historical pool.
    pub surviving_candidates: usize,
    pub mutations: usize,
    pub crossovers: usize,
    pub evaluation_failures: usize,
}

impl fmt::Display for RunReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "Total Population Size: {}", self.total_candidates)?;
        writeln!(f, "Total Living Population Size: {}", self.surviving_candidates)?;
        writeln!(f, "Generation Population Size: {}", self.population_size)?;
        writeln!(f, "Total Generations: {}", self.generations)?;
        writeln!(f, "Total Mutations: {}", self.mutations)?;
        writeln!(f, "Total Crossovers: {}", self.crossovers)?;
        if self.evaluation_failures > 0 {
            writeln!(f, "Skipped Evaluations: {}", self.evaluation_failures)?;
        }
        match &self.best {
            Some(best) => {
                writeln!(f, "Final Best Solution Found: {}", best)?;
                writeln!(f, "Best Solution's Equation Result: {}", best.result)?;
                write!(f, "Expected Result: {}", self.target)
            }
            None => write!(f, "No solutions found in the final population."),
        }
    }
}
