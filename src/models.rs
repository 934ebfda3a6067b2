mod traits;
pub use traits::NodeScorer;
mod utils;

mod graphgan;
pub use graphgan::{GraphGan, SubModel, DISCRIMINATOR, GENERATOR};
