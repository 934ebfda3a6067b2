use candle_core::{Result, Tensor};

/// A model that scores node pairs with a node-embedding matrix.
pub trait NodeScorer {
    /// Score of every `(node_ids[i], neighbor_ids[i])` pair.
    fn score(&self, node_ids: &Tensor, neighbor_ids: &Tensor) -> Result<Tensor>;

    /// Similarity of every node with every node, `[n_node, n_node]`.
    fn all_score(&self) -> Result<Tensor>;
}
