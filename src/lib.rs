pub mod datasets;
pub mod error;
pub mod eval;
pub mod hparams;
pub mod models;
pub mod record;
pub mod scorer;
