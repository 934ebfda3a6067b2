use anyhow::Result;
use candle_core::Device;
use rand::{rngs::StdRng, SeedableRng};

use super::{
    embeddings::{init_embeddings, InitEmbedding},
    graph::{read_edges, Graph},
    trees::Trees,
};
use crate::hparams::HParams;

/// Everything a GraphGAN run reads from `data_dir`.
#[derive(Debug, Clone)]
pub struct Resources {
    pub graph: Graph,
    pub trees: Trees,
    pub init_emb_d: InitEmbedding,
    pub init_emb_g: InitEmbedding,
}

impl Resources {
    /// Load the graph, the sampling trees and both embedding seeds.
    ///
    /// `params` must already be resolved; its `n_node` is replaced by the node count
    /// of the graph. Missing edge or tree files abort; missing pretrained embeddings
    /// fall back to random initialization.
    pub fn load(params: &mut HParams, device: &Device) -> Result<Self> {
        let graph = read_edges(&params.train_edges, &params.test_edges)?;
        params.n_node = graph.n_node;

        let trees = Trees::load(&params.train_trees)?;

        let mut rng = StdRng::seed_from_u64(params.seed);
        let init_emb_d = init_embeddings(
            &params.pretrain_emb_filename_d,
            params.n_node,
            params.n_emb,
            &mut rng,
            device,
        )?;
        let init_emb_g = init_embeddings(
            &params.pretrain_emb_filename_g,
            params.n_node,
            params.n_emb,
            &mut rng,
            device,
        )?;
        Ok(Self {
            graph,
            trees,
            init_emb_d,
            init_emb_g,
        })
    }
}
