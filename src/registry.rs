use config_store::{ConfigStore, Result};
use log::info;
use schemas::{AdultConfig, CmnistConfig, Config, Flavor, MlpConfig, Schema, SvmConfig};

pub const ROOT_NAME: &str = "primary";
pub const MODEL_GROUP: &str = "model/schema";
pub const DATASET_GROUP: &str = "dataset/schema";

/// Builds the registry of every schema the program can resolve.
///
/// # Arguments
/// * `flavor` - Which variation of the schemas to register.
///
/// # Errors
/// `DuplicateRegistration` if two schemas share a group and name.
pub fn build_registry(flavor: Flavor) -> Result<ConfigStore> {
    info!("building schema registry ({flavor:?})");

    let mut builder = ConfigStore::builder();
    builder
        .register_root(ROOT_NAME, Config::descriptor(flavor))?
        .register(MODEL_GROUP, "mlp", MlpConfig::descriptor(flavor), Some("model"))?
        .register(MODEL_GROUP, "svm", SvmConfig::descriptor(flavor), Some("model"))?
        .register(
            DATASET_GROUP,
            "cmnist",
            CmnistConfig::descriptor(flavor),
            Some("dataset"),
        )?
        .register(
            DATASET_GROUP,
            "adult",
            AdultConfig::descriptor(flavor),
            Some("dataset"),
        )?;

    builder.build()
}
