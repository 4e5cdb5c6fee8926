pub mod engine;
pub mod explain;
pub mod merge;
pub mod profile;
pub mod providers;
pub mod tier;

pub use engine::{Degradation, Recommender, StrategyRun};
pub use explain::{attach_explanations, FALLBACK_EXPLANATION};
pub use providers::{ExplanationGenerator, OpenAiExplainer};
pub use tier::Tier;
