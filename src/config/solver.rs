use super::traits::ConfigSection;
use crate::engines::generation::{ExecutionMode, RunParameters};
use crate::error::EquigenError;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SolverConfig {
    pub population_size: usize,
    pub num_generations: usize,
    pub mutation_rate: f64,
    pub crossover_rate: f64,
    /// Uniform initialization range for candidate parameters.
    pub init_min: f64,
    pub init_max: f64,
    /// Run generations as parallel tasks (the default) or as a strict
    /// sequential lineage, which is reproducible under a fixed seed.
    pub parallel: bool,
    pub seed: Option<u64>,
}

impl Default for SolverConfig {
    fn default() -> Self {
        Self {
            population_size: 50,
            num_generations: 30,
            mutation_rate: 0.3,
            crossover_rate: 0.8,
            init_min: -10.0,
            init_max: 10.0,
            parallel: true,
            seed: None,
        }
    }
}

impl SolverConfig {
    pub fn to_run_parameters(&self) -> RunParameters {
        RunParameters {
            population_size: self.population_size,
            generations: self.num_generations,
            mutation_rate: self.mutation_rate,
            crossover_rate: self.crossover_rate,
            init_range: self.init_min..self.init_max,
            execution: if self.parallel {
                ExecutionMode::Parallel
            } else {
                ExecutionMode::Sequential
            },
            seed: self.seed,
        }
    }
}

impl ConfigSection for SolverConfig {
    fn section_name() -> &'static str {
        "solver"
    }

    fn validate(&self) -> Result<(), EquigenError> {
        if self.population_size < 1 {
            return Err(EquigenError::Configuration(
                "Population size must be at least 1".to_string(),
            ));
        }
        if self.mutation_rate < 0.0 || self.mutation_rate > 1.0 {
            return Err(EquigenError::Configuration(
                "Mutation rate must be between 0 and 1".to_string(),
            ));
        }
        if self.crossover_rate < 0.0 || self.crossover_rate > 1.0 {
            return Err(EquigenError::Configuration(
                "Crossover rate must be between 0 and 1".to_string(),
            ));
        }
        if self.init_min >= self.init_max {
            return Err(EquigenError::Configuration(
                "Initialization range must be non-empty".to_string(),
            ));
        }
        Ok(())
    }
}

/// Derives a `(population size, generation count)` pair from a total
/// candidate budget.
///
/// Walks candidate population sizes from 1 up to `⌊√total⌋` and, for each
/// divisor of `total`, overwrites the pair with `(size, total / size)`; the
/// last value computed wins, i.e. the largest divisor of `total` not
/// exceeding its square root. Primes therefore derive to `(1, total)`.
pub fn derive_run_shape(total: usize) -> (usize, usize) {
    let mut population_size = 1;
    let mut generations = total;

    let limit = (total as f64).sqrt() as usize;
    for size in 1..=limit {
        if total % size == 0 {
            population_size = size;
            generations = total / size;
        }
    }

    (population_size, generations)
}
