pub mod dataset;
pub mod descriptor;
pub mod model;
pub mod root;

pub use dataset::{AdultConfig, CmnistConfig, DatasetConfig};
pub use descriptor::{FieldDefault, FieldKind, FieldSpec, MISSING, TypeDescriptor, is_missing};
pub use model::{Kernel, MlpConfig, ModelConfig, SvmConfig};
pub use root::Config;

/// The two variations of the schema set.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Flavor {
    /// Dataset directories are optional and nothing is derived.
    Basic,
    /// Dataset directories are required and `use_cuda` is derived after composition.
    Strict,
}

/// A typed configuration schema with a runtime description.
pub trait Schema {
    /// The name the registry records for this schema.
    const TYPE_NAME: &'static str;

    /// Describes this schema's fields for the given flavor.
    fn descriptor(flavor: Flavor) -> TypeDescriptor;
}
