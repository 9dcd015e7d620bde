use std::{env, path::Path};

use config_store::{Composer, Composition, ConfigError, ConfigStore, Override, Result, Selection};
use log::{debug, info};
use schemas::{
    AdultConfig, CmnistConfig, Config, DatasetConfig, Flavor, MlpConfig, ModelConfig, Schema,
    SvmConfig,
};
use serde::{Deserialize, de::DeserializeOwned};
use serde_json::Value;

use crate::registry::ROOT_NAME;

const CUDA_DEVICES_VAR: &str = "CUDA_VISIBLE_DEVICES";

/// The scalar fields of the root config.
#[derive(Deserialize)]
struct RootScalars {
    seed: i64,
    data_pcnt: f64,
    use_wandb: bool,
}

/// Composes, decodes and derives the configuration of a run.
///
/// # Arguments
/// * `store` - The registry to validate against.
/// * `config_dir` - Where the primary config and option files live, if anywhere.
/// * `overrides` - Command line overrides.
/// * `flavor` - The variation `store` was built for.
///
/// # Errors
/// Any `ConfigError` raised while composing or decoding.
pub fn resolve(
    store: &ConfigStore,
    config_dir: Option<&Path>,
    overrides: &[Override],
    flavor: Flavor,
) -> Result<Config> {
    let mut composer = Composer::new(store);
    if let Some(dir) = config_dir {
        composer = composer.with_config_dir(dir);
    }

    info!("composing configuration from {} override(s)", overrides.len());
    let composition = composer.compose(overrides)?;
    let config = decode(&composition)?;
    Ok(derive(config, flavor, cuda_available()))
}

/// Turns a validated composition into the typed `Config`.
///
/// # Errors
/// `InternalDispatch` if a selected schema is not one of the known variants.
pub fn decode(composition: &Composition) -> Result<Config> {
    let (selection, node) = selected_node(composition, "model")?;
    let model = match selection.type_name {
        t if t == MlpConfig::TYPE_NAME => ModelConfig::Mlp(typed(&selection.package, node)?),
        t if t == SvmConfig::TYPE_NAME => ModelConfig::Svm(typed(&selection.package, node)?),
        other => return Err(dispatch_error(selection, other)),
    };

    let (selection, node) = selected_node(composition, "dataset")?;
    let dataset = match selection.type_name {
        t if t == CmnistConfig::TYPE_NAME => {
            DatasetConfig::Cmnist(typed(&selection.package, node)?)
        }
        t if t == AdultConfig::TYPE_NAME => DatasetConfig::Adult(typed(&selection.package, node)?),
        other => return Err(dispatch_error(selection, other)),
    };

    let scalars: RootScalars = typed(ROOT_NAME, &Value::Object(composition.tree.clone()))?;

    Ok(Config {
        model,
        dataset,
        seed: scalars.seed,
        data_pcnt: scalars.data_pcnt,
        use_wandb: scalars.use_wandb,
        use_cuda: None,
    })
}

/// Fills the fields computed by the program rather than read from sources.
pub fn derive(mut config: Config, flavor: Flavor, cuda: bool) -> Config {
    config.use_cuda = match flavor {
        Flavor::Basic => None,
        Flavor::Strict => Some(cuda),
    };
    config
}

/// Whether a CUDA device is visible to this process.
pub fn cuda_available() -> bool {
    let available = env::var(CUDA_DEVICES_VAR).is_ok_and(|devices| {
        let devices = devices.trim();
        !devices.is_empty() && devices != "-1"
    });
    debug!("cuda available: {available}");
    available
}

fn selected_node<'c>(
    composition: &'c Composition,
    package: &str,
) -> Result<(&'c Selection, &'c Value)> {
    let missing = || ConfigError::MissingRequiredValue {
        path: package.to_string(),
    };
    let selection = composition.selection(package).ok_or_else(missing)?;
    let node = composition.tree.get(package).ok_or_else(missing)?;
    Ok((selection, node))
}

fn typed<T: DeserializeOwned>(path: &str, value: &Value) -> Result<T> {
    serde_json::from_value(value.clone()).map_err(|source| ConfigError::Decode {
        path: path.to_string(),
        source,
    })
}

fn dispatch_error(selection: &Selection, type_name: &str) -> ConfigError {
    ConfigError::InternalDispatch {
        package: selection.package.clone(),
        type_name: type_name.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use std::path::PathBuf;

    use schemas::Kernel;

    use super::*;
    use crate::registry::build_registry;

    fn compose(flavor: Flavor, args: &[&str]) -> Composition {
        let store = build_registry(flavor).unwrap();
        Composer::new(&store)
            .compose(&Override::parse_all(args).unwrap())
            .unwrap()
    }

    #[test]
    fn test_decode_svm_and_adult() {
        let composition = compose(
            Flavor::Basic,
            &["model=svm", "model.kernel=poly", "dataset=adult", "seed=1"],
        );
        let config = decode(&composition).unwrap();

        assert_eq!(
            config.model,
            ModelConfig::Svm(SvmConfig {
                kernel: Kernel::Poly,
                c: 1.0,
            })
        );
        assert_eq!(config.dataset, DatasetConfig::Adult(AdultConfig::default()));
        assert_eq!(config.seed, 1);
        assert_eq!(config.use_cuda, None);
    }

    #[test]
    fn test_decode_keeps_dataset_dir() {
        let composition = compose(
            Flavor::Strict,
            &["model=mlp", "dataset=cmnist", "dataset.dir=/data/cmnist"],
        );
        let config = decode(&composition).unwrap();
        assert_eq!(config.dataset.dir(), Some(&PathBuf::from("/data/cmnist")));
    }

    #[test]
    fn test_decode_rejects_unknown_type_name() {
        let mut composition = compose(Flavor::Basic, &["model=mlp", "dataset=adult"]);
        composition.selections[0].type_name = "ResNetConfig";

        let res = decode(&composition);
        assert!(matches!(
            res,
            Err(ConfigError::InternalDispatch { package, type_name })
                if package == "model" && type_name == "ResNetConfig"
        ));
    }

    #[test]
    fn test_decode_rejects_negative_sizes() {
        let composition = compose(Flavor::Basic, &["model=mlp", "model.layers=-1", "dataset=adult"]);
        let res = decode(&composition);
        assert!(matches!(res, Err(ConfigError::Decode { path, .. }) if path == "model"));
    }

    #[test]
    fn test_derive_depends_on_flavor() {
        let composition = compose(Flavor::Strict, &["model=mlp", "dataset=adult", "dataset.dir=x"]);
        let config = decode(&composition).unwrap();

        assert_eq!(derive(config.clone(), Flavor::Strict, true).use_cuda, Some(true));
        assert_eq!(derive(config.clone(), Flavor::Strict, false).use_cuda, Some(false));
        assert_eq!(derive(config, Flavor::Basic, true).use_cuda, None);
    }
}
