use std::io;
use std::path::PathBuf;
use clap::Parser;
use tracing::{error, info};
use dwi_prep::config::{AnimaConfig, DEFAULT_CONFIG};
use dwi_prep::PipelineError;

/// write a configuration template to fill in with the Anima locations
#[derive(clap::Parser,Debug)]
pub struct TemplateConfigArgs {
    /// where to write the configuration (defaults to ~/.anima/config.toml)
    output_config:Option<PathBuf>,
    /// overwrite an existing configuration
    #[clap(long)]
    force:bool,
}

fn main() {
    let args = TemplateConfigArgs::parse();
    dwi_prep::init_logging(false);

    run(&args).unwrap_or_else(|e| {
        error!("{}", e);
        std::process::exit(1);
    });
}

fn run(args:&TemplateConfigArgs) -> Result<(),PipelineError> {
    let output = match args.output_config.clone().or_else(AnimaConfig::default_path) {
        Some(o) => o,
        None => return Err(PipelineError::Io {
            path: PathBuf::from("~").join(DEFAULT_CONFIG),
            source: io::Error::new(io::ErrorKind::NotFound, "no home directory, give the configuration path explicitly"),
        }),
    };
    AnimaConfig::write_template(&output, args.force)?;
    info!("configuration template written to {}", output.display());
    Ok(())
}
