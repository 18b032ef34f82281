use crate::engines::evaluation::expression::{Equation, ExpressionEvaluator};
use crate::engines::generation::Candidate;
use crate::error::Result;
use rayon::prelude::*;
use std::collections::HashMap;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

/// Scores candidates against the equation's target value.
///
/// Fitness is a linear penalty on absolute error, floored at zero:
/// `max(0, 1 - |result - target|)`. Every error of 1.0 or more clamps to
/// fitness 0, so selection pressure only discriminates among candidates
/// within distance 1 of the target.
pub struct FitnessEvaluator {
    evaluator: Arc<dyn ExpressionEvaluator>,
    equation: Equation,
}

impl FitnessEvaluator {
    pub fn new(evaluator: Arc<dyn ExpressionEvaluator>, equation: Equation) -> Self {
        Self { evaluator, equation }
    }

    pub fn equation(&self) -> &Equation {
        &self.equation
    }

    /// Evaluates every candidate in place, fanning out across the thread
    /// pool. A candidate whose expression fails to evaluate keeps fitness 0
    /// for this generation; it never aborts the others. Returns the number
    /// of failed evaluations.
    pub fn evaluate_population(&self, population: &mut [Candidate]) -> usize {
        let failures = AtomicUsize::new(0);

        population.par_iter_mut().for_each(|candidate| {
            if let Err(err) = self.evaluate_candidate(candidate) {
                log::warn!(
                    "skipping candidate with parameter {:.3}: {}",
                    candidate.parameter,
                    err
                );
                failures.fetch_add(1, Ordering::Relaxed);
            }
        });

        failures.into_inner()
    }

    fn evaluate_candidate(&self, candidate: &mut Candidate) -> Result<()> {
        // Fitness from a previous generation must not survive a failed
        // re-evaluation.
        candidate.fitness = 0.0;

        let mut bindings = HashMap::new();
        bindings.insert(self.equation.variable.clone(), candidate.parameter);

        let value = self.evaluator.evaluate(&self.equation.expression, &bindings)?;
        candidate.result = value;

        let difference = (value - self.equation.target).abs();
        candidate.fitness = (1.0 - difference).max(0.0);

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::engines::evaluation::expression::MevalEvaluator;

    fn evaluator_for(raw: &str) -> FitnessEvaluator {
        FitnessEvaluator::new(Arc::new(MevalEvaluator), Equation::parse(raw).unwrap())
    }

    #[test]
    fn test_fitness_bounds() {
        let fitness = evaluator_for("2 * [x] = 10");
        let mut population: Vec<Candidate> =
            [-10.0, -1.0, 0.0, 4.9, 5.0, 5.1, 10.0].iter().map(|&p| Candidate::new(p)).collect();

        let failures = fitness.evaluate_population(&mut population);
        assert_eq!(failures, 0);

        for candidate in &population {
            assert!(candidate.fitness >= 0.0 && candidate.fitness <= 1.0);
        }
    }

    #[test]
    fn test_fitness_is_one_only_on_exact_hit() {
        let fitness = evaluator_for("2 * [x] = 10");
        let mut population = vec![Candidate::new(5.0), Candidate::new(5.01)];

        fitness.evaluate_population(&mut population);

        assert_eq!(population[0].fitness, 1.0);
        assert_eq!(population[0].result, 10.0);
        assert!(population[1].fitness < 1.0);
    }

    #[test]
    fn test_failed_candidate_is_skipped_not_fatal() {
        let fitness = evaluator_for("10 / ([x] - 5) = 2");
        let mut population = vec![
            Candidate::new(5.0),  // division by zero
            Candidate::new(10.0), // 10 / 5 = 2, exact
        ];

        let failures = fitness.evaluate_population(&mut population);

        assert_eq!(failures, 1);
        assert_eq!(population[0].fitness, 0.0);
        assert_eq!(population[1].fitness, 1.0);
    }

    #[test]
    fn test_stale_fitness_reset_on_failure() {
        let fitness = evaluator_for("10 / ([x] - 5) = 2");
        let mut candidate = Candidate::new(5.0);
        candidate.fitness = 0.9;

        let mut population = vec![candidate];
        fitness.evaluate_population(&mut population);

        assert_eq!(population[0].fitness, 0.0);
    }
}
