use std::{
    fs::File,
    io::{BufRead, BufReader},
    path::{Path, PathBuf},
};

use anyhow::Context;
use regex::Regex;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use tracing::info;

use crate::error::HParamsError;

/// Name of the persisted hyperparameter file inside `log_dir`.
pub const PARAMS_FILE: &str = "params.json";

/// Hyperparameters of a GraphGAN run.
///
/// Built from defaults, then merged with a persisted `params.json`, then with
/// the command line override string. Path-valued keys are resolved against
/// `data_dir` / `log_dir` by [`HParams::override_with`].
///
/// Training-only keys are kept so that configurations written by a trainer
/// round-trip through the scorer without losing anything.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct HParams {
    pub data_dir: String,
    pub emb_generator: String,
    pub emb_discriminator: String,
    pub record: String,
    pub log_dir: String,
    pub train_edges: String,
    pub test_edges: String,
    pub train_trees: String,
    pub n_node: usize,
    /// batch size for the generator
    pub batch_size_gen: usize,
    /// batch size for the discriminator
    pub batch_size_dis: usize,
    /// l2 loss regulation weight for the generator
    pub lambda_gen: f64,
    /// l2 loss regulation weight for the discriminator
    pub lambda_dis: f64,
    /// number of samples for the generator
    pub n_sample_gen: usize,
    pub lr_gen: f64,
    pub lr_dis: f64,
    pub window_size: usize,
    /// number of outer loops, one checkpoint each
    pub n_epochs: usize,
    pub n_epochs_gen: usize,
    pub n_epochs_dis: usize,
    /// resample generator nodes every `gen_interval` iterations
    pub gen_interval: usize,
    /// resample discriminator nodes every `dis_interval` iterations
    pub dis_interval: usize,
    /// updating ratio when choosing the trees
    pub update_ratio: f64,
    pub save_steps: usize,
    /// nodes with an id below this bound are the recommendable items
    pub n_movies: usize,
    pub n_emb: usize,
    pub top_k: usize,
    pub max_to_save: usize,
    pub pretrain_emb_filename_d: String,
    pub pretrain_emb_filename_g: String,
    /// seed of the random embedding initializer
    pub seed: u64,
}

impl Default for HParams {
    fn default() -> Self {
        Self {
            data_dir: String::new(),
            emb_generator: "gen.emb".to_owned(),
            emb_discriminator: "dis.emb".to_owned(),
            record: "record".to_owned(),
            log_dir: String::new(),
            train_edges: "train_edges.txt".to_owned(),
            test_edges: "test_edges.txt".to_owned(),
            train_trees: "train_trees.json".to_owned(),
            n_node: 1000,
            batch_size_gen: 64,
            batch_size_dis: 64,
            lambda_gen: 1e-5,
            lambda_dis: 1e-5,
            n_sample_gen: 20,
            lr_gen: 1e-3,
            lr_dis: 1e-3,
            window_size: 2,
            n_epochs: 20,
            n_epochs_gen: 30,
            n_epochs_dis: 30,
            gen_interval: 30,
            dis_interval: 30,
            update_ratio: 1.0,
            save_steps: 1,
            n_movies: 3953,
            n_emb: 50,
            top_k: 10,
            max_to_save: 100,
            pretrain_emb_filename_d: "pre_train.emb".to_owned(),
            pretrain_emb_filename_g: "pre_train.emb".to_owned(),
            seed: 0,
        }
    }
}

impl HParams {
    /// Merge `<log_dir>/params.json` over the current values, if that file exists.
    ///
    /// Only the first line of the file is read; it must hold a single json object.
    pub fn import<P: AsRef<Path>>(self, log_dir: P) -> anyhow::Result<Self> {
        let p_name = log_dir.as_ref().join(PARAMS_FILE);
        if !p_name.is_file() {
            return Ok(self);
        }
        info!("Restoring hyper parameters from {}", p_name.display());
        let mut json_str = String::new();
        BufReader::new(File::open(&p_name)?)
            .read_line(&mut json_str)
            .with_context(|| format!("reading {}", p_name.display()))?;
        let mut params = self;
        params.parse_json(&json_str)?;
        Ok(params)
    }

    /// Merge the keys of a json object over the current values.
    pub fn parse_json(&mut self, json_str: &str) -> Result<(), HParamsError> {
        match serde_json::from_str(json_str)? {
            Value::Object(updates) => self.merge(updates),
            _ => Err(HParamsError::NotAnObject),
        }
    }

    /// Apply a comma separated `key=value` override string.
    ///
    /// Values are parsed with the type of the key they replace.
    pub fn parse(&mut self, overrides: &str) -> Result<(), HParamsError> {
        let current = self.to_map()?;
        let assignment = Regex::new(r"^\s*([A-Za-z_][\w.]*)\s*=\s*(.*?)\s*$")
            .map_err(|_| HParamsError::Malformed(overrides.to_owned()))?;

        let mut updates = Map::new();
        for piece in overrides.split(',') {
            if piece.trim().is_empty() {
                continue;
            }
            let caps = assignment
                .captures(piece)
                .ok_or_else(|| HParamsError::Malformed(piece.to_owned()))?;
            let (key, raw) = (&caps[1], &caps[2]);
            let existing = current
                .get(key)
                .ok_or_else(|| HParamsError::UnknownKey(key.to_owned()))?;
            updates.insert(key.to_owned(), parse_like(existing, key, raw)?);
        }
        self.merge(updates)
    }

    /// Set the base directories, apply `overrides`, then resolve every path-valued key.
    pub fn override_with(
        mut self,
        data_dir: &str,
        log_dir: &str,
        overrides: &str,
    ) -> Result<Self, HParamsError> {
        self.data_dir = data_dir.to_owned();
        self.log_dir = log_dir.to_owned();
        self.parse(overrides)?;

        let log_dir = self.log_dir.clone();
        let data_dir = self.data_dir.clone();
        for name in [
            &mut self.emb_generator,
            &mut self.emb_discriminator,
            &mut self.record,
        ] {
            *name = format!("{}/{}", log_dir, name);
        }
        for name in [
            &mut self.train_edges,
            &mut self.test_edges,
            &mut self.train_trees,
            &mut self.pretrain_emb_filename_d,
            &mut self.pretrain_emb_filename_g,
        ] {
            *name = format!("{}/{}", data_dir, name);
        }
        Ok(self)
    }

    /// Checkpoint written after `epoch`.
    pub fn checkpoint_path(&self, epoch: usize) -> PathBuf {
        PathBuf::from(format!("{}/model-{}", self.log_dir, epoch))
    }

    /// Single-line json, the format [`HParams::import`] reads back.
    pub fn to_json(&self) -> Result<String, HParamsError> {
        Ok(serde_json::to_string(self)?)
    }

    fn to_map(&self) -> Result<Map<String, Value>, HParamsError> {
        match serde_json::to_value(self)? {
            Value::Object(map) => Ok(map),
            _ => Err(HParamsError::NotAnObject),
        }
    }

    fn merge(&mut self, updates: Map<String, Value>) -> Result<(), HParamsError> {
        let mut current = self.to_map()?;
        for (key, value) in updates {
            match current.get_mut(&key) {
                Some(slot) => *slot = value,
                None => return Err(HParamsError::UnknownKey(key)),
            }
        }
        *self = serde_json::from_value(Value::Object(current))?;
        Ok(())
    }
}

fn parse_like(existing: &Value, key: &str, raw: &str) -> Result<Value, HParamsError> {
    let invalid = || HParamsError::InvalidValue(key.to_owned(), raw.to_owned());
    match existing {
        Value::String(_) => Ok(Value::String(raw.to_owned())),
        Value::Bool(_) => raw.parse::<bool>().map(Value::Bool).map_err(|_| invalid()),
        Value::Number(n) if n.is_f64() => {
            let x = raw.parse::<f64>().map_err(|_| invalid())?;
            serde_json::Number::from_f64(x)
                .map(Value::Number)
                .ok_or_else(invalid)
        }
        Value::Number(_) => raw
            .parse::<u64>()
            .map(Value::from)
            .map_err(|_| invalid()),
        _ => Err(invalid()),
    }
}
