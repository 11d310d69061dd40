use std::path::PathBuf;
use gradients::GradientError;
use thiserror::Error;
use crate::stage::Stage;

#[derive(Error, Debug)]
pub enum PipelineError {
    #[error("configuration file {} not found. Create one with dwi-prep-config and fill in the Anima paths", .0.display())]
    ConfigurationMissing(PathBuf),
    #[error("configuration file {} is invalid: {message}", file.display())]
    ConfigurationInvalid { file: PathBuf, message: String },
    #[error("{0}")]
    GradientSourceMissing(String),
    #[error("{what} {} does not exist", path.display())]
    InputMissing { what: &'static str, path: PathBuf },
    #[error("{gradients} gradient vectors do not match {b_values} b-values")]
    GradientCountMismatch { gradients: usize, b_values: usize },
    #[error(transparent)]
    Gradient(#[from] GradientError),
    #[error("{stage} failed: {tool} exited with {status}\n{stderr}")]
    ExternalProcess { stage: Stage, tool: String, status: String, stderr: String },
    #[error("{stage} failed: {tool} did not write {}", path.display())]
    MissingOutput { stage: Stage, tool: String, path: PathBuf },
    #[error("{stage} failed: cannot launch {tool}: {source}")]
    ToolLaunch { stage: Stage, tool: String, source: std::io::Error },
    #[error("{}: {source}", path.display())]
    Io { path: PathBuf, source: std::io::Error },
}

impl PipelineError {

    /// the stage whose tool failed, if this is a tool failure
    pub fn failed_stage(&self) -> Option<Stage> {
        match self {
            PipelineError::ExternalProcess { stage, .. }
            | PipelineError::MissingOutput { stage, .. }
            | PipelineError::ToolLaunch { stage, .. } => Some(*stage),
            _ => None,
        }
    }

    pub fn is_process_failure(&self) -> bool {
        self.failed_stage().is_some()
    }
}
