use std::path::PathBuf;

use serde::{Deserialize, Serialize};

use crate::{
    Flavor, Schema,
    descriptor::{FieldSpec, TypeDescriptor},
};

/// The `dir` field every dataset shares.
fn dir_field(flavor: Flavor) -> FieldSpec {
    match flavor {
        Flavor::Basic => FieldSpec::optional_path("dir"),
        Flavor::Strict => FieldSpec::required_path("dir"),
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct CmnistConfig {
    pub dir: Option<PathBuf>,
    pub padding: usize,
    pub color_background: bool,
}

impl Default for CmnistConfig {
    fn default() -> Self {
        Self {
            dir: None,
            padding: 2,
            color_background: false,
        }
    }
}

impl Schema for CmnistConfig {
    const TYPE_NAME: &'static str = "CmnistConfig";

    fn descriptor(flavor: Flavor) -> TypeDescriptor {
        let defaults = Self::default();
        TypeDescriptor::new(Self::TYPE_NAME)
            .field(dir_field(flavor))
            .field(FieldSpec::int("padding", defaults.padding as i64))
            .field(FieldSpec::bool("color_background", defaults.color_background))
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct AdultConfig {
    pub dir: Option<PathBuf>,
    pub drop_native: bool,
    pub drop_discrete: bool,
}

impl Schema for AdultConfig {
    const TYPE_NAME: &'static str = "AdultConfig";

    fn descriptor(flavor: Flavor) -> TypeDescriptor {
        let defaults = Self::default();
        TypeDescriptor::new(Self::TYPE_NAME)
            .field(dir_field(flavor))
            .field(FieldSpec::bool("drop_native", defaults.drop_native))
            .field(FieldSpec::bool("drop_discrete", defaults.drop_discrete))
    }
}

/// The dataset selected for a run. Exactly one variant is active.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum DatasetConfig {
    Cmnist(CmnistConfig),
    Adult(AdultConfig),
}

impl DatasetConfig {
    /// The data directory, whichever dataset is active.
    pub fn dir(&self) -> Option<&PathBuf> {
        match self {
            Self::Cmnist(cfg) => cfg.dir.as_ref(),
            Self::Adult(cfg) => cfg.dir.as_ref(),
        }
    }
}
