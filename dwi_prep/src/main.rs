use std::path::PathBuf;
use clap::Parser;
use tracing::{error, info};
use dwi_prep::args::PreprocessArgs;
use dwi_prep::config::{AnimaConfig, ConfigFile, DEFAULT_CONFIG};
use dwi_prep::pipeline;
use dwi_prep::tools::ProcessRunner;
use dwi_prep::PipelineError;

fn main() {
    let args = PreprocessArgs::parse();

    dwi_prep::init_logging(args.verbose);

    run(&args).unwrap_or_else(|e| {
        error!("{}", e);
        std::process::exit(1);
    });
}

fn run(args:&PreprocessArgs) -> Result<(),PipelineError> {
    let config_file = match args.config.clone().or_else(AnimaConfig::default_path) {
        Some(f) => f,
        None => return Err(PipelineError::ConfigurationMissing(PathBuf::from("~").join(DEFAULT_CONFIG))),
    };
    let config = AnimaConfig::from_file(&config_file)?;
    let published = pipeline::run(args, &config, &mut ProcessRunner)?;
    info!("preprocessed DWI written to {}", published.image.display());
    info!("tensors written to {}", published.tensors.display());
    Ok(())
}
