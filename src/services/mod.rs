pub mod explanation_generator;
pub mod grading;
pub mod question_generator;
pub mod response_normalizer;

pub use explanation_generator::ExplanationGenerator;
pub use grading::grade_attempt;
pub use question_generator::{AttemptError, ModelFailure, QuestionGenerator, QuestionOutcome};
