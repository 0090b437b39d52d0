use std::path::PathBuf;

use anyhow::Context;
use lapseq_dataset::dataset::{DatasetPreparer, PrepareConfig};
use lapseq_session::Session;

use crate::{
    schema::DatasetExport,
    util::{self, Output},
};

#[derive(Debug, Clone, clap::Args)]
pub(crate) struct PrepareArg {
    /// Cleaned session collection written by the `clean` command
    cleaned_file: PathBuf,
    #[clap(flatten)]
    config: ConfigArg,
    /// Output file path
    #[arg(long)]
    output: Option<PathBuf>,
}

/// Dataset parameters: an optional JSON base config overridden by flags.
#[derive(Default, Debug, Clone, clap::Args)]
pub(crate) struct ConfigArg {
    /// JSON file with base dataset parameters
    #[arg(long)]
    config: Option<PathBuf>,
    /// Length of every driver's feature window [default: 40]
    #[arg(long)]
    max_laps: Option<usize>,
    /// Share of sessions held out for testing [default: 0.2]
    #[arg(long)]
    test_ratio: Option<f64>,
    /// Shuffle seed [default: 42]
    #[arg(long)]
    seed: Option<u64>,
    /// Drivers a session must yield to be accepted [default: 20]
    #[arg(long)]
    required_drivers: Option<usize>,
}

impl ConfigArg {
    pub(crate) fn resolve(&self) -> anyhow::Result<PrepareConfig> {
        let mut config = match &self.config {
            Some(path) => util::read_config_file(path)?,
            None => PrepareConfig::default(),
        };
        if let Some(max_laps) = self.max_laps {
            config.max_laps = max_laps;
        }
        if let Some(test_ratio) = self.test_ratio {
            config.test_ratio = test_ratio;
        }
        if let Some(seed) = self.seed {
            config.seed = seed;
        }
        if let Some(required_drivers) = self.required_drivers {
            config.required_drivers = required_drivers;
        }
        config.validate().context("Invalid dataset configuration")?;
        Ok(config)
    }
}

pub(crate) fn run(arg: &PrepareArg) -> anyhow::Result<()> {
    let PrepareArg {
        cleaned_file,
        config,
        output,
    } = arg;

    let config = config.resolve()?;
    let collection = util::read_cleaned_sessions_file(cleaned_file)?;
    eprintln!(
        "Loaded {} cleaned sessions from {}",
        collection.sessions.len(),
        cleaned_file.display()
    );

    let export = prepare_dataset(config, collection.sessions)?;
    Output::save_json(&export, output.clone())?;
    Ok(())
}

/// Splits, scales and assembles cleaned sessions into an exportable dataset.
pub(crate) fn prepare_dataset(
    config: PrepareConfig,
    sessions: Vec<Session>,
) -> anyhow::Result<DatasetExport> {
    let preparer =
        DatasetPreparer::new(config.clone()).context("Invalid dataset configuration")?;

    eprintln!("Preparing dataset from {} sessions...", sessions.len());
    let dataset = preparer.prepare(sessions);

    for (name, partition) in [("train", &dataset.train), ("test", &dataset.test)] {
        let rejected = partition.outcomes.len() - partition.len();
        eprintln!(
            "{name}: X {:?}, Y {:?} ({rejected} sessions rejected)",
            partition.x_shape(),
            partition.y_shape()
        );
    }

    Ok(DatasetExport::new(config, &dataset))
}
