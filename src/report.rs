use std::{
    io::{self, Write},
    path::PathBuf,
};

use schemas::{Config, DatasetConfig, ModelConfig};
use serde_json::Value;

use crate::flatten::flatten;

/// Writes the human readable report of a resolved configuration.
///
/// The active model and dataset are printed with their fields, followed by
/// the root scalars and the whole configuration as a flat dictionary.
///
/// # Errors
/// Any I/O error raised by `out`.
pub fn write_report<W: Write>(out: &mut W, config: &Config) -> io::Result<()> {
    write_model(out, &config.model)?;
    writeln!(out)?;

    write_dataset(out, &config.dataset)?;
    writeln!(out)?;

    writeln!(out, "seed={}", config.seed)?;
    writeln!(out, "use_wandb={}", config.use_wandb)?;
    writeln!(out, "data_pcnt={:?}", config.data_pcnt)?;
    if let Some(use_cuda) = config.use_cuda {
        writeln!(out, "use_cuda={use_cuda}")?;
    }
    writeln!(out)?;

    writeln!(out, "Config as flat dictionary:")?;
    let tree = match serde_json::to_value(config)? {
        Value::Object(tree) => tree,
        other => {
            return Err(io::Error::new(
                io::ErrorKind::InvalidData,
                format!("config serialized to a non mapping: {other}"),
            ));
        }
    };
    writeln!(out, "{}", Value::Object(flatten(&tree)))
}

/// Renders the report into a string.
pub fn render(config: &Config) -> io::Result<String> {
    let mut buf = Vec::new();
    write_report(&mut buf, config)?;
    String::from_utf8(buf).map_err(|e| io::Error::new(io::ErrorKind::InvalidData, e))
}

fn write_model<W: Write>(out: &mut W, model: &ModelConfig) -> io::Result<()> {
    match model {
        ModelConfig::Mlp(mlp) => {
            writeln!(out, "using MLP")?;
            writeln!(out, "layers={}", mlp.layers)?;
            writeln!(out, "hidden_units={}", mlp.hidden_units)
        }
        ModelConfig::Svm(svm) => {
            writeln!(out, "using SVM")?;
            writeln!(out, "kernel={}", svm.kernel)?;
            writeln!(out, "C={:?}", svm.c)
        }
    }
}

fn write_dataset<W: Write>(out: &mut W, dataset: &DatasetConfig) -> io::Result<()> {
    match dataset {
        DatasetConfig::Cmnist(cmnist) => {
            writeln!(out, "using CMNIST dataset")?;
            writeln!(out, "dir={}", display_dir(cmnist.dir.as_ref()))?;
            writeln!(out, "padding={}", cmnist.padding)?;
            writeln!(out, "color_background={}", cmnist.color_background)
        }
        DatasetConfig::Adult(adult) => {
            writeln!(out, "using Adult dataset")?;
            writeln!(out, "dir={}", display_dir(adult.dir.as_ref()))?;
            writeln!(out, "drop_native={}", adult.drop_native)?;
            writeln!(out, "drop_discrete={}", adult.drop_discrete)
        }
    }
}

fn display_dir(dir: Option<&PathBuf>) -> String {
    dir.map_or_else(|| "None".to_string(), |d| d.display().to_string())
}

#[cfg(test)]
mod tests {
    use schemas::{AdultConfig, CmnistConfig, Kernel, MlpConfig, SvmConfig};

    use super::*;

    fn config(model: ModelConfig, dataset: DatasetConfig) -> Config {
        Config {
            model,
            dataset,
            seed: 42,
            data_pcnt: 1.0,
            use_wandb: false,
            use_cuda: None,
        }
    }

    #[test]
    fn test_report_layout() {
        let cfg = config(
            ModelConfig::Mlp(MlpConfig::default()),
            DatasetConfig::Cmnist(CmnistConfig::default()),
        );

        let expected = "\
using MLP
layers=3
hidden_units=10

using CMNIST dataset
dir=None
padding=2
color_background=false

seed=42
use_wandb=false
data_pcnt=1.0

Config as flat dictionary:
{\"model.layers\":3,\"model.hidden_units\":10,\"dataset.dir\":null,\"dataset.padding\":2,\
\"dataset.color_background\":false,\"seed\":42,\"data_pcnt\":1.0,\"use_wandb\":false}
";
        assert_eq!(render(&cfg).unwrap(), expected);
    }

    #[test]
    fn test_report_prints_use_cuda_when_derived() {
        let mut cfg = config(
            ModelConfig::Svm(SvmConfig {
                kernel: Kernel::Linear,
                c: 0.5,
            }),
            DatasetConfig::Adult(AdultConfig {
                dir: Some("/data/adult".into()),
                ..Default::default()
            }),
        );
        cfg.use_cuda = Some(false);

        let report = render(&cfg).unwrap();
        assert!(report.contains("using SVM\nkernel=Linear\nC=0.5\n"));
        assert!(report.contains("using Adult dataset\ndir=/data/adult\n"));
        assert!(report.contains("use_cuda=false\n"));
        assert!(report.contains("\"use_cuda\":false"));
    }
}
