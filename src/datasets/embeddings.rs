use std::path::Path;

use anyhow::Result;
use candle_core::{Device, Tensor};
use rand::Rng;
use rand_distr::StandardNormal;
use tracing::{debug, info, warn};

use super::utils::{parse_token, read_tokens};
use crate::error::DataError;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EmbeddingSource {
    Pretrained,
    Random,
}

/// Initial value of a sub-model's embedding matrix, `[n_node, n_emb]`.
#[derive(Debug, Clone)]
pub struct InitEmbedding {
    pub source: EmbeddingSource,
    pub matrix: Tensor,
}

/// `n_node * n_emb` values drawn from `N(0, 1) / n_emb`, row-major.
pub fn random_embeddings<R: Rng + ?Sized>(n_node: usize, n_emb: usize, rng: &mut R) -> Vec<f32> {
    let scale = n_emb as f32;
    (0..n_node * n_emb)
        .map(|_| rng.sample::<f32, _>(StandardNormal) / scale)
        .collect()
}

/// Read a pretrained embedding file.
///
/// The first line is a `<count> <dim>` header and is skipped. Each further line is
/// `node_id v_1 ... v_n_emb`. Nodes without a line keep a random row; ids outside
/// `0..n_node` are ignored.
pub fn read_embeddings<P: AsRef<Path>, R: Rng + ?Sized>(
    filename: P,
    n_node: usize,
    n_emb: usize,
    rng: &mut R,
    device: &Device,
) -> Result<Tensor> {
    let path = filename.as_ref();
    let mut matrix = random_embeddings(n_node, n_emb, rng);
    for (line, tokens) in read_tokens(path)?.into_iter().skip(1) {
        if tokens.len() != n_emb + 1 {
            return Err(DataError::malformed(
                path,
                line,
                format!("expected {} values, found {}", n_emb + 1, tokens.len()),
            )
            .into());
        }
        let node: usize = parse_token(path, line, &tokens[0], "node id")?;
        if node >= n_node {
            debug!(node, n_node, "skipping embedding of unknown node");
            continue;
        }
        let row = &mut matrix[node * n_emb..(node + 1) * n_emb];
        for (x, token) in row.iter_mut().zip(&tokens[1..]) {
            *x = parse_token(path, line, token, "embedding value")?;
        }
    }
    Ok(Tensor::from_vec(matrix, (n_node, n_emb), device)?)
}

/// Pretrained embeddings if `filename` exists, small random ones otherwise.
pub fn init_embeddings<P: AsRef<Path>, R: Rng + ?Sized>(
    filename: P,
    n_node: usize,
    n_emb: usize,
    rng: &mut R,
    device: &Device,
) -> Result<InitEmbedding> {
    let path = filename.as_ref();
    if path.is_file() {
        info!("reading pretrained embeddings from {}", path.display());
        let matrix = read_embeddings(path, n_node, n_emb, rng, device)?;
        Ok(InitEmbedding {
            source: EmbeddingSource::Pretrained,
            matrix,
        })
    } else {
        warn!(
            "{} not found, initializing embeddings randomly",
            path.display()
        );
        let matrix = Tensor::from_vec(random_embeddings(n_node, n_emb, rng), (n_node, n_emb), device)?;
        Ok(InitEmbedding {
            source: EmbeddingSource::Random,
            matrix,
        })
    }
}
