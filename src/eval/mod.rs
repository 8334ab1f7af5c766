//! Static evaluation for Pigs and Farmers positions

mod heuristic;
mod score;

pub use heuristic::{evaluate, evaluate_relative};
pub use score::{is_mate_score, Score};
