/// Explanation provider abstraction
///
/// Explanations come from an external generative-text API. The trait keeps
/// the pipeline independent of any one vendor and lets tests substitute a
/// deterministic generator. Failures are the provider's to report and the
/// orchestration layer's to absorb — see `services::explain`.
use async_trait::async_trait;

use crate::{
    error::AppResult,
    models::{BehaviorProfile, Product},
};

pub mod openai;

pub use openai::OpenAiExplainer;

/// Trait for natural-language explanation generators
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait ExplanationGenerator: Send + Sync {
    /// Produces a short explanation of why `product` suits a user with the
    /// given behavior profile
    ///
    /// May fail (network, quota, vendor outage); callers substitute a fixed
    /// fallback and never propagate the error.
    async fn explain(&self, product: Product, profile: BehaviorProfile) -> AppResult<String>;
}
