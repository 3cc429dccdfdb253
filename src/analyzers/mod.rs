pub mod growth_ranking;

pub use growth_ranking::{price_history, GrowthRanking, RankingResult};
