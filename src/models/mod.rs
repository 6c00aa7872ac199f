mod recommendation;

pub use recommendation::{
    NewRecommendation, Recommendation, RecommendationFilter, RecommendationStatus,
    RecommendationType,
};
