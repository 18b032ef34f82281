use crate::engines::generation::candidate::Candidate;
use rand::Rng;
use std::ops::Range;
use std::sync::atomic::{AtomicUsize, Ordering};

/// Running totals for the stochastic operators.
///
/// Shared across generation tasks, so increments are atomic; relaxed
/// ordering is enough for counters that are only read after the run.
#[derive(Debug, Default)]
pub struct OperatorCounters {
    mutations: AtomicUsize,
    crossovers: AtomicUsize,
}

impl OperatorCounters {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn record_mutation(&self) {
        self.mutations.fetch_add(1, Ordering::Relaxed);
    }

    pub fn record_crossover(&self) {
        self.crossovers.fetch_add(1, Ordering::Relaxed);
    }

    pub fn mutations(&self) -> usize {
        self.mutations.load(Ordering::Relaxed)
    }

    pub fn crossovers(&self) -> usize {
        self.crossovers.load(Ordering::Relaxed)
    }
}

/// Fresh candidates with parameters drawn uniformly from `range`.
///
/// Used at run start and whenever a generation's population has collapsed
/// to empty.
pub fn initialize_population<R: Rng>(size: usize, range: Range<f64>, rng: &mut R) -> Vec<Candidate> {
    (0..size)
        .map(|_| Candidate::new(rng.gen_range(range.clone())))
        .collect()
}

/// Truncation selection: the top `⌊n/2⌋` candidates by fitness, descending.
///
/// The sort is stable, so equally fit candidates keep their input order and
/// a given evaluated population always ranks the same way.
pub fn select(population: &[Candidate]) -> Vec<Candidate> {
    let mut ranked = population.to_vec();
    ranked.sort_by(|a, b| {
        b.fitness
            .partial_cmp(&a.fitness)
            .unwrap_or(std::cmp::Ordering::Equal)
    });
    ranked.truncate(population.len() / 2);
    ranked
}

/// Averaging crossover with pass-through.
///
/// Each selected candidate draws a partner uniformly from the whole selected
/// sequence (possibly itself), then either produces one child whose
/// parameter is the mean of both parents, or passes both parents through
/// unchanged. Output size is therefore data-dependent: `n` for an
/// all-crossover pass, `2n` for an all-pass-through pass. Population size
/// drifting through this operator, down to zero, is expected; the scheduler
/// recovers from collapse.
pub fn crossover<R: Rng>(
    selected: &[Candidate],
    rate: f64,
    counters: &OperatorCounters,
    rng: &mut R,
) -> Vec<Candidate> {
    let mut offspring = Vec::new();

    for parent1 in selected {
        let parent2 = &selected[rng.gen_range(0..selected.len())];

        if rng.gen::<f64>() < rate {
            offspring.push(Candidate::new((parent1.parameter + parent2.parameter) / 2.0));
            counters.record_crossover();
        } else {
            offspring.push(parent1.clone());
            offspring.push(parent2.clone());
        }
    }

    offspring
}

/// Perturbs each candidate's parameter by a uniform delta from [-1, 1) with
/// probability `rate`. In place; never adds or removes candidates.
pub fn mutate<R: Rng>(
    population: &mut [Candidate],
    rate: f64,
    counters: &OperatorCounters,
    rng: &mut R,
) {
    for candidate in population.iter_mut() {
        if rng.gen::<f64>() < rate {
            candidate.parameter += rng.gen::<f64>() * 2.0 - 1.0;
            counters.record_mutation();
        }
    }
}
