use std::path::PathBuf;

use lapseq_cleaning::validity::ValidityRules;

use super::{clean::clean_directory, prepare::ConfigArg, prepare::prepare_dataset};
use crate::util::Output;

#[derive(Debug, Clone, clap::Args)]
pub(crate) struct PipelineArg {
    /// Directory containing one JSON file per raw session
    dir: PathBuf,
    #[clap(flatten)]
    config: ConfigArg,
    /// Output file path
    #[arg(long)]
    output: Option<PathBuf>,
}

pub(crate) fn run(arg: &PipelineArg) -> anyhow::Result<()> {
    let PipelineArg {
        dir,
        config,
        output,
    } = arg;

    let config = config.resolve()?;
    let rules = ValidityRules {
        required_drivers: config.required_drivers,
    };
    let sessions = clean_directory(dir, &rules)?
        .into_iter()
        .map(|cleaned| cleaned.session)
        .collect();

    let export = prepare_dataset(config, sessions)?;
    Output::save_json(&export, output.clone())?;
    Ok(())
}
