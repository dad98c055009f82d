use clap::Parser as _;
use tracing::info;

use crate::{
    models::{
        args::AppArgs,
        config::{EnvSettings, RunConfig, Verbosity},
    },
    run::Run,
    utils::{errors::EmptyResult, logger::LoggerUtils},
};

mod models;
mod pipeline;
mod remote;
mod run;
mod utils;

fn main() -> EmptyResult {
    let args = AppArgs::parse();

    let config = RunConfig::new(EnvSettings::from_env(), &args)?;

    LoggerUtils::init(config.verbosity);
    if config.verbosity == Verbosity::Debug {
        info!("--debug setting detected - Debug level logs enabled");
    }

    let version = env!("CARGO_PKG_VERSION");
    info!("tfe-state-info, Version: {version}");
    config.log_resolved();

    let run = Run::new(args, config);
    run.execute()?;

    Ok(())
}
