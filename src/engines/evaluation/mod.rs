pub mod expression;
pub mod fitness;

pub use expression::{Equation, ExpressionEvaluator, MevalEvaluator};
pub use fitness::FitnessEvaluator;
