use std::path::Path;

use anyhow::{bail, Context};
use candle_core::{DType, Device, Result, Tensor};
use candle_nn::{VarBuilder, VarMap};
use tracing::info;

use super::{traits::NodeScorer, utils::variable_from};
use crate::{datasets::Resources, hparams::HParams};

pub const GENERATOR: &str = "generator";
pub const DISCRIMINATOR: &str = "discriminator";

/// One side of the GraphGAN: an embedding matrix and a per-node bias.
pub struct SubModel {
    name: &'static str,
    embedding_matrix: Tensor,
    bias: Tensor,
}
impl SubModel {
    fn new(
        name: &'static str,
        init_emb: &Tensor,
        varmap: &mut VarMap,
        vs: VarBuilder,
    ) -> Result<Self> {
        let n_node = init_emb.dims2()?.0;
        let embedding_matrix = variable_from(varmap, &vs, "embedding_matrix", init_emb)?;
        let bias = variable_from(
            varmap,
            &vs,
            "bias",
            &Tensor::zeros(n_node, DType::F32, init_emb.device())?,
        )?;
        Ok(Self {
            name,
            embedding_matrix,
            bias,
        })
    }
    pub fn name(&self) -> &'static str {
        self.name
    }
    pub fn embedding_matrix(&self) -> &Tensor {
        &self.embedding_matrix
    }
    pub fn bias(&self) -> &Tensor {
        &self.bias
    }
    fn variables(&self) -> [(String, Vec<usize>); 2] {
        [
            (
                format!("{}.bias", self.name),
                self.bias.dims().to_vec(),
            ),
            (
                format!("{}.embedding_matrix", self.name),
                self.embedding_matrix.dims().to_vec(),
            ),
        ]
    }
}
impl NodeScorer for SubModel {
    fn score(&self, node_ids: &Tensor, neighbor_ids: &Tensor) -> Result<Tensor> {
        let node_emb = self.embedding_matrix.index_select(node_ids, 0)?;
        let neighbor_emb = self.embedding_matrix.index_select(neighbor_ids, 0)?;
        let bias = self.bias.index_select(neighbor_ids, 0)?;
        (node_emb * neighbor_emb)?.sum(1)?.add(&bias)
    }
    fn all_score(&self) -> Result<Tensor> {
        self.embedding_matrix.matmul(&self.embedding_matrix.t()?)
    }
}

/// Generator and discriminator sharing one variable map, so that a single
/// checkpoint holds both.
pub struct GraphGan {
    pub generator: SubModel,
    pub discriminator: SubModel,
    varmap: VarMap,
}
impl GraphGan {
    pub fn new(params: &HParams, resources: &Resources, device: &Device) -> anyhow::Result<Self> {
        let shape = (params.n_node, params.n_emb);
        for (name, init) in [
            (GENERATOR, &resources.init_emb_g),
            (DISCRIMINATOR, &resources.init_emb_d),
        ] {
            if init.matrix.dims2()? != shape {
                bail!(
                    "initial {} embeddings have shape {:?}, expected {:?}",
                    name,
                    init.matrix.dims(),
                    shape
                );
            }
        }

        let mut varmap = VarMap::new();
        let vs = VarBuilder::from_varmap(&varmap, DType::F32, device);
        let generator = SubModel::new(
            GENERATOR,
            &resources.init_emb_g.matrix.to_device(device)?,
            &mut varmap,
            vs.pp(GENERATOR),
        )?;
        let discriminator = SubModel::new(
            DISCRIMINATOR,
            &resources.init_emb_d.matrix.to_device(device)?,
            &mut varmap,
            vs.pp(DISCRIMINATOR),
        )?;
        Ok(Self {
            generator,
            discriminator,
            varmap,
        })
    }

    /// Overwrite every variable with the values stored at `path`.
    pub fn restore<P: AsRef<Path>>(&mut self, path: P) -> anyhow::Result<()> {
        let path = path.as_ref();
        self.varmap
            .load(path)
            .with_context(|| format!("cannot restore checkpoint {}", path.display()))
    }

    pub fn save<P: AsRef<Path>>(&self, path: P) -> anyhow::Result<()> {
        let path = path.as_ref();
        self.varmap
            .save(path)
            .with_context(|| format!("cannot save checkpoint {}", path.display()))
    }

    /// Trainable variables as `(name, shape)`, sorted by name.
    pub fn variables(&self) -> Vec<(String, Vec<usize>)> {
        let mut variables: Vec<_> = self
            .generator
            .variables()
            .into_iter()
            .chain(self.discriminator.variables())
            .collect();
        variables.sort();
        variables
    }

    pub fn log_variables(&self) {
        let mut total_size = 0;
        for (name, shape) in self.variables() {
            info!("{:<40}\tshape    {:?}", name, shape);
            total_size += shape.iter().product::<usize>();
        }
        info!("Total trainable variables size: {}", total_size);
    }
}
