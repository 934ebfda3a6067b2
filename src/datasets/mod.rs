mod embeddings;
pub use embeddings::*;

mod graph;
pub use graph::*;

mod resources;
pub use resources::*;

mod trees;
pub use trees::*;

mod utils;
