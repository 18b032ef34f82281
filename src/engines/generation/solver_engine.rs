use crate::engines::evaluation::{ExpressionEvaluator, FitnessEvaluator};
use crate::engines::evaluation::expression::Equation;
use crate::engines::generation::candidate::Candidate;
use crate::engines::generation::operators::{
    crossover, initialize_population, mutate, select, OperatorCounters,
};
use crate::engines::generation::progress::ProgressCallback;
use crate::error::{EquigenError, Result};
use crate::types::RunReport;
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use rayon::prelude::*;
use std::ops::Range;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};

/// How the generation loop is driven.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ExecutionMode {
    /// One task per generation index over a shared published population.
    /// Tasks race to read and replace it, so lineage across generations is
    /// best-effort and runs are not reproducible even with a fixed seed.
    Parallel,
    /// Each generation's output feeds the next. With a fixed seed, two runs
    /// produce identical results.
    Sequential,
}

#[derive(Debug, Clone)]
pub struct RunParameters {
    pub population_size: usize,
    pub generations: usize,
    pub mutation_rate: f64,
    pub crossover_rate: f64,
    pub init_range: Range<f64>,
    pub execution: ExecutionMode,
    pub seed: Option<u64>,
}

impl Default for RunParameters {
    fn default() -> Self {
        Self {
            population_size: 50,
            generations: 30,
            mutation_rate: 0.3,
            crossover_rate: 0.8,
            init_range: -10.0..10.0,
            execution: ExecutionMode::Parallel,
            seed: None,
        }
    }
}

impl RunParameters {
    fn validate(&self) -> Result<()> {
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
        if self.init_range.start >= self.init_range.end {
            return Err(EquigenError::Configuration(
                "Initialization range must be non-empty".to_string(),
            ));
        }
        Ok(())
    }
}

/// Output of one generation step.
pub struct GenerationStep {
    /// The evaluated input population, appended to the historical pool.
    pub evaluated: Vec<Candidate>,
    /// Input population for the next generation.
    pub next: Vec<Candidate>,
    /// Candidates whose expression evaluation failed this generation.
    pub failures: usize,
}

struct SharedState {
    population: Vec<Candidate>,
    pool: Vec<Candidate>,
}

/// Drives the evolutionary search: evaluate, select, crossover, mutate,
/// generation after generation, accumulating every evaluated population
/// into a historical pool that the final best-of-run scan reads.
pub struct SolverEngine {
    params: RunParameters,
    evaluator: Arc<dyn ExpressionEvaluator>,
}

impl SolverEngine {
    pub fn new(params: RunParameters, evaluator: Arc<dyn ExpressionEvaluator>) -> Result<Self> {
        params.validate()?;
        Ok(Self { params, evaluator })
    }

    pub fn params(&self) -> &RunParameters {
        &self.params
    }

    /// Runs the full search and reports the best candidate ever evaluated.
    /// `best` is `None` only when the historical pool ended up empty, e.g.
    /// for a zero-generation run.
    pub fn run<C: ProgressCallback>(&self, equation: &Equation, callback: &C) -> Result<RunReport> {
        log::info!(
            "solving {} = {} ({} generations, population {})",
            equation.expression,
            equation.target,
            self.params.generations,
            self.params.population_size
        );

        let fitness = FitnessEvaluator::new(Arc::clone(&self.evaluator), equation.clone());
        let counters = OperatorCounters::new();

        let (pool, failures) = match self.params.execution {
            ExecutionMode::Sequential => self.run_sequential(&fitness, &counters, callback),
            ExecutionMode::Parallel => self.run_parallel(&fitness, &counters, callback),
        };

        let best = best_candidate(&pool).cloned();
        if let Some(ref best) = best {
            log::info!("best of run: {}", best);
        }

        Ok(RunReport {
            best,
            target: equation.target,
            population_size: self.params.population_size,
            generations: self.params.generations,
            total_candidates: self.params.population_size * self.params.generations,
            surviving_candidates: pool.len(),
            mutations: counters.mutations(),
            crossovers: counters.crossovers(),
            evaluation_failures: failures,
        })
    }

    /// One full generation over an owned population: evaluate (reinitializing
    /// first if the population collapsed to empty), then select, crossover,
    /// and mutate into the next population.
    pub fn advance_generation<R: Rng>(
        &self,
        fitness: &FitnessEvaluator,
        mut population: Vec<Candidate>,
        counters: &OperatorCounters,
        rng: &mut R,
    ) -> GenerationStep {
        let mut failures = fitness.evaluate_population(&mut population);

        if population.is_empty() {
            log::debug!(
                "population collapsed, reinitializing {} candidates",
                self.params.population_size
            );
            population =
                initialize_population(self.params.population_size, self.params.init_range.clone(), rng);
            failures += fitness.evaluate_population(&mut population);
        }

        if let Some(best) = best_candidate(&population) {
            log::debug!("generation best: {}", best);
        }

        let selected = select(&population);
        let mut next = crossover(&selected, self.params.crossover_rate, counters, rng);
        mutate(&mut next, self.params.mutation_rate, counters, rng);

        GenerationStep {
            evaluated: population,
            next,
            failures,
        }
    }

    fn run_sequential<C: ProgressCallback>(
        &self,
        fitness: &FitnessEvaluator,
        counters: &OperatorCounters,
        callback: &C,
    ) -> (Vec<Candidate>, usize) {
        let mut rng = self.task_rng(0);
        let mut population =
            initialize_population(self.params.population_size, self.params.init_range.clone(), &mut rng);
        let mut pool = Vec::new();
        let mut failures = 0;

        for generation in 0..self.params.generations {
            callback.on_generation_start(generation);

            let step = self.advance_generation(fitness, population, counters, &mut rng);
            let best_fitness = best_candidate(&step.evaluated)
                .map(|c| c.fitness)
                .unwrap_or(0.0);

            failures += step.failures;
            pool.extend(step.evaluated);
            population = step.next;

            callback.on_generation_complete(generation, best_fitness, pool.len());
        }

        (pool, failures)
    }

    fn run_parallel<C: ProgressCallback>(
        &self,
        fitness: &FitnessEvaluator,
        counters: &OperatorCounters,
        callback: &C,
    ) -> (Vec<Candidate>, usize) {
        let mut init_rng = self.task_rng(0);
        let initial =
            initialize_population(self.params.population_size, self.params.init_range.clone(), &mut init_rng);

        let shared = Mutex::new(SharedState {
            population: initial,
            pool: Vec::new(),
        });
        let failures = AtomicUsize::new(0);

        (0..self.params.generations).into_par_iter().for_each(|generation| {
            callback.on_generation_start(generation);

            let mut rng = self.task_rng(generation as u64 + 1);

            // Read whatever population is currently published. Which task
            // published it is deliberately unspecified: generation indices
            // are bookkeeping, not a lineage.
            let snapshot = { shared.lock().unwrap().population.clone() };

            let step = self.advance_generation(fitness, snapshot, counters, &mut rng);
            let best_fitness = best_candidate(&step.evaluated)
                .map(|c| c.fitness)
                .unwrap_or(0.0);
            failures.fetch_add(step.failures, Ordering::Relaxed);

            let pool_size = {
                let mut state = shared.lock().unwrap();
                state.population = step.next;
                state.pool.extend(step.evaluated);
                state.pool.len()
            };

            callback.on_generation_complete(generation, best_fitness, pool_size);
        });

        let state = shared.into_inner().unwrap();
        (state.pool, failures.into_inner())
    }

    fn task_rng(&self, stream: u64) -> StdRng {
        match self.params.seed {
            Some(seed) => StdRng::seed_from_u64(seed.wrapping_add(stream)),
            None => StdRng::from_entropy(),
        }
    }
}

/// First maximum-fitness candidate in scan order; ties keep the earliest.
pub fn best_candidate(candidates: &[Candidate]) -> Option<&Candidate> {
    candidates.iter().fold(None, |best, candidate| match best {
        Some(current) if current.fitness >= candidate.fitness => Some(current),
        _ => Some(candidate),
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn candidate_with_fitness(parameter: f64, fitness: f64) -> Candidate {
        let mut candidate = Candidate::new(parameter);
        candidate.fitness = fitness;
        candidate
    }

    #[test]
    fn test_best_candidate_empty() {
        assert!(best_candidate(&[]).is_none());
    }

    #[test]
    fn test_best_candidate_picks_max() {
        let pool = vec![
            candidate_with_fitness(1.0, 0.2),
            candidate_with_fitness(2.0, 0.9),
            candidate_with_fitness(3.0, 0.5),
        ];

        assert_eq!(best_candidate(&pool).unwrap().parameter, 2.0);
    }

    #[test]
    fn test_best_candidate_tie_takes_first() {
        let pool = vec![
            candidate_with_fitness(1.0, 0.9),
            candidate_with_fitness(2.0, 0.9),
        ];

        assert_eq!(best_candidate(&pool).unwrap().parameter, 1.0);
    }

    #[test]
    fn test_validation_rejects_bad_rates() {
        let params = RunParameters {
            mutation_rate: 1.5,
            ..Default::default()
        };
        assert!(params.validate().is_err());

        let params = RunParameters {
            crossover_rate: -0.1,
            ..Default::default()
        };
        assert!(params.validate().is_err());
    }

    #[test]
    fn test_validation_rejects_empty_init_range() {
        let params = RunParameters {
            init_range: 3.0..3.0,
            ..Default::default()
        };
        assert!(params.validate().is_err());
    }

    #[test]
    fn test_validation_rejects_zero_population() {
        let params = RunParameters {
            population_size: 0,
            ..Default::default()
        };
        assert!(params.validate().is_err());
    }
}
