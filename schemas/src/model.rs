use std::fmt;

use serde::{Deserialize, Serialize};

use crate::{
    Flavor, Schema,
    descriptor::{FieldSpec, TypeDescriptor},
};

/// The kernel used by the `SvmConfig` model.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum Kernel {
    Linear,
    #[default]
    #[serde(rename = "RBF")]
    Rbf,
    Poly,
}

impl Kernel {
    /// Every kernel name as it appears in config sources.
    pub const NAMES: &'static [&'static str] = &["Linear", "RBF", "Poly"];

    pub fn name(self) -> &'static str {
        match self {
            Self::Linear => "Linear",
            Self::Rbf => "RBF",
            Self::Poly => "Poly",
        }
    }
}

impl fmt::Display for Kernel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct MlpConfig {
    pub layers: usize,
    pub hidden_units: usize,
}

impl Default for MlpConfig {
    fn default() -> Self {
        Self {
            layers: 3,
            hidden_units: 10,
        }
    }
}

impl Schema for MlpConfig {
    const TYPE_NAME: &'static str = "MlpConfig";

    fn descriptor(_: Flavor) -> TypeDescriptor {
        let defaults = Self::default();
        TypeDescriptor::new(Self::TYPE_NAME)
            .field(FieldSpec::int("layers", defaults.layers as i64))
            .field(FieldSpec::int("hidden_units", defaults.hidden_units as i64))
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct SvmConfig {
    pub kernel: Kernel,
    #[serde(rename = "C")]
    pub c: f64,
}

impl Default for SvmConfig {
    fn default() -> Self {
        Self {
            kernel: Kernel::default(),
            c: 1.0,
        }
    }
}

impl Schema for SvmConfig {
    const TYPE_NAME: &'static str = "SvmConfig";

    fn descriptor(_: Flavor) -> TypeDescriptor {
        let defaults = Self::default();
        TypeDescriptor::new(Self::TYPE_NAME)
            .field(FieldSpec::enumeration(
                "kernel",
                Kernel::NAMES,
                defaults.kernel.name(),
            ))
            .field(FieldSpec::float("C", defaults.c))
    }
}

/// The model selected for a run. Exactly one variant is active.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum ModelConfig {
    Mlp(MlpConfig),
    Svm(SvmConfig),
}
