use anyhow::Result;
use candle_core::Device;
use clap::Parser;
use indicatif::{ProgressBar, ProgressStyle};
use tracing::info;

use crate::{
    datasets::Resources,
    eval::{eval_recommend, Recommendation},
    hparams::HParams,
    models::{GraphGan, NodeScorer},
    record::Record,
};

#[derive(Debug, Clone, Parser)]
#[command(about = "Evaluate GraphGAN checkpoints", long_about = None)]
pub struct Args {
    /// Directory holding the edge lists, sampling trees and pretrained embeddings
    #[arg(long = "data_dir")]
    pub data_dir: String,

    /// Directory holding params.json, the checkpoints and the record
    #[arg(long = "log_dir")]
    pub log_dir: String,

    /// Comma separated `key=value` hyperparameter overrides
    #[arg(long = "parameters", default_value = "")]
    pub parameters: String,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct EpochScore {
    pub epoch: usize,
    pub generator: Recommendation,
    pub discriminator: Recommendation,
}

/// Defaults, then `params.json`, then the command line.
pub fn load_params(args: &Args) -> Result<HParams> {
    let params = HParams::default().import(&args.log_dir)?;
    Ok(params.override_with(&args.data_dir, &args.log_dir, &args.parameters)?)
}

/// Restore every epoch's checkpoint and append its precision/recall to the record.
pub fn eval(args: &Args, device: &Device) -> Result<Vec<EpochScore>> {
    let mut params = load_params(args)?;
    let resources = Resources::load(&mut params, device)?;
    let params = params;

    info!("Building generator and discriminator...");
    let mut model = GraphGan::new(&params, &resources, device)?;
    model.log_variables();

    let mut record = Record::open(&params.record)?;
    let pbar = ProgressBar::new(params.n_epochs as u64);
    pbar.set_style(
        ProgressStyle::default_bar()
            .template("{spinner:.green} [{elapsed_precise}] [{wide_bar:.cyan/blue}] epoch {pos}/{len} ({eta})")?
            .progress_chars("#>-"),
    );

    let mut scores = Vec::with_capacity(params.n_epochs);
    for epoch in 0..params.n_epochs {
        let model_checkpoint_path = params.checkpoint_path(epoch);
        info!("loading the checkpoint: {}", model_checkpoint_path.display());
        model.restore(&model_checkpoint_path)?;

        let gen_all_score = model.generator.all_score()?;
        let dis_all_score = model.discriminator.all_score()?;
        let generator = eval_recommend(&gen_all_score, &resources.graph, &params)?;
        let discriminator = eval_recommend(&dis_all_score, &resources.graph, &params)?;

        record.write("gen", epoch, generator.precision, generator.recall)?;
        record.write("dis", epoch, discriminator.precision, discriminator.recall)?;
        record.flush()?;
        info!(
            epoch,
            gen_precision = generator.precision,
            gen_recall = generator.recall,
            dis_precision = discriminator.precision,
            dis_recall = discriminator.recall,
            "evaluated checkpoint"
        );
        scores.push(EpochScore {
            epoch,
            generator,
            discriminator,
        });
        pbar.inc(1);
    }
    pbar.finish_and_clear();
    record.flush()?;
    Ok(scores)
}
