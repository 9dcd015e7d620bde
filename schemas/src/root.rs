use serde::Serialize;

use crate::{
    Flavor, Schema,
    dataset::DatasetConfig,
    descriptor::{FieldSpec, TypeDescriptor},
    model::ModelConfig,
};

pub const DEFAULT_SEED: i64 = 42;
pub const DEFAULT_DATA_PCNT: f64 = 1.0;

/// The root configuration of a run.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Config {
    pub model: ModelConfig,
    pub dataset: DatasetConfig,
    pub seed: i64,
    pub data_pcnt: f64,
    pub use_wandb: bool,
    /// Derived after composition, never read from a config source.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub use_cuda: Option<bool>,
}

impl Schema for Config {
    const TYPE_NAME: &'static str = "Config";

    fn descriptor(flavor: Flavor) -> TypeDescriptor {
        let desc = TypeDescriptor::new(Self::TYPE_NAME)
            .field(FieldSpec::node("model"))
            .field(FieldSpec::node("dataset"))
            .field(FieldSpec::int("seed", DEFAULT_SEED))
            .field(FieldSpec::float("data_pcnt", DEFAULT_DATA_PCNT))
            .field(FieldSpec::bool("use_wandb", false));

        match flavor {
            Flavor::Basic => desc,
            Flavor::Strict => desc.field(FieldSpec::bool("use_cuda", false).derived()),
        }
    }
}
