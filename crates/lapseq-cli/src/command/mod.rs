use clap::{Parser, Subcommand};

use self::{clean::CleanArg, pipeline::PipelineArg, prepare::PrepareArg};

mod clean;
mod pipeline;
mod prepare;

#[derive(Debug, Clone, Parser)]
#[command(author, version, about, long_about = None)]
pub struct CommandArgs {
    /// Log progress details (overridden by RUST_LOG)
    #[arg(short, long, global = true)]
    verbose: bool,
    #[command(subcommand)]
    mode: Mode,
}

#[derive(Debug, Clone, Subcommand)]
enum Mode {
    /// Validate and clean every session file of a directory
    Clean(#[clap(flatten)] CleanArg),
    /// Build train/test tensors from a cleaned session collection
    Prepare(#[clap(flatten)] PrepareArg),
    /// Clean a directory and build tensors in one run
    Pipeline(#[clap(flatten)] PipelineArg),
}

pub fn run() -> anyhow::Result<()> {
    let args = CommandArgs::parse();

    let log_level = if args.verbose { "debug" } else { "warn" };
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(log_level))
        .format_timestamp(None)
        .init();

    match args.mode {
        Mode::Clean(arg) => clean::run(&arg)?,
        Mode::Prepare(arg) => prepare::run(&arg)?,
        Mode::Pipeline(arg) => pipeline::run(&arg)?,
    }
    Ok(())
}
