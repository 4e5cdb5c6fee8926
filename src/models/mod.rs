pub mod interaction;
pub mod product;
pub mod profile;
pub mod recommendation;

pub use interaction::{ActionKind, Interaction, InteractionEvent, NewInteraction};
pub use product::Product;
pub use profile::BehaviorProfile;
pub use recommendation::{
    Algorithm, CachedRecommendationSet, RecommendationResult, RecommendedProduct,
};
