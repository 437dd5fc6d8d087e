pub mod estimator;
pub mod evaluator;
pub mod models;
pub mod prompt;
pub mod providers;
pub mod random;

pub use estimator::{DryRunEstimate, DryRunEstimator};
pub use evaluator::{EvaluationInput, MentionVerdict, PromptEvaluator};
pub use providers::openai::OpenAiProvider;
pub use random::{RandomEstimator, RandomEvaluator};
