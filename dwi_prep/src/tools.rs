use std::ffi::{OsStr, OsString};
use std::fmt;
use std::path::{Path, PathBuf};
use std::process::Command;
use tracing::{debug, info};
use crate::config::AnimaConfig;
use crate::error::PipelineError;
use crate::stage::Stage;

pub const EDDY_CURRENT_CORRECTION:&str = "animaEddyCurrentCorrection";
pub const CROP_IMAGE:&str = "animaCropImage";
pub const TRANSFORM_SERIE_XML_GENERATOR:&str = "animaTransformSerieXmlGenerator";
pub const APPLY_TRANSFORM_SERIE:&str = "animaApplyTransformSerie";
pub const DISTORTION_CORRECTION:&str = "animaDistortionCorrection";
pub const BM_DISTORTION_CORRECTION:&str = "animaBMDistortionCorrection";
pub const APPLY_DISTORTION_CORRECTION:&str = "animaApplyDistortionCorrection";
pub const PYRAMIDAL_BM_REGISTRATION:&str = "animaPyramidalBMRegistration";
pub const DENSE_SVF_BM_REGISTRATION:&str = "animaDenseSVFBMRegistration";
pub const CONVERT_IMAGE:&str = "animaConvertImage";
pub const NL_MEANS_TEMPORAL:&str = "animaNLMeansTemporal";
pub const MASK_IMAGE:&str = "animaMaskImage";
pub const DTI_ESTIMATOR:&str = "animaDTIEstimator";
pub const BRAIN_EXTRACTION:&str = "animaAtlasBasedBrainExtraction.py";

/// One external invocation: program, arguments, the stage it belongs to and the files
/// it is expected to write.
#[derive(Clone, Debug, PartialEq)]
pub struct ToolCommand {
    stage:Stage,
    name:String,
    program:PathBuf,
    args:Vec<OsString>,
    outputs:Vec<PathBuf>,
}

impl ToolCommand {

    pub fn new(stage:Stage,name:&str,program:&Path) -> Self {
        Self {
            stage,
            name:name.to_string(),
            program:program.to_owned(),
            args:vec![],
            outputs:vec![],
        }
    }

    /// an executable from the Anima binary directory
    pub fn anima(config:&AnimaConfig,stage:Stage,tool:&str) -> Self {
        Self::new(stage, tool, &config.tool(tool))
    }

    /// the atlas based brain extraction script, run with the configured interpreter
    pub fn brain_extraction(config:&AnimaConfig,stage:Stage) -> Self {
        Self::new(stage, BRAIN_EXTRACTION, config.python())
            .arg(config.brain_extraction_script())
    }

    pub fn arg<S:AsRef<OsStr>>(mut self,arg:S) -> Self {
        self.args.push(arg.as_ref().to_owned());
        self
    }

    pub fn flag<S:AsRef<OsStr>>(self,flag:&str,value:S) -> Self {
        self.arg(flag).arg(value)
    }

    /// flag followed by a file the tool writes
    pub fn output(mut self,flag:&str,path:&Path) -> Self {
        self.outputs.push(path.to_owned());
        self.flag(flag, path)
    }

    /// a file the tool writes without being told its name
    pub fn produces(mut self,path:&Path) -> Self {
        self.outputs.push(path.to_owned());
        self
    }

    pub fn stage(&self) -> Stage {
        self.stage
    }

    pub fn tool_name(&self) -> &str {
        &self.name
    }

    pub fn program(&self) -> &Path {
        &self.program
    }

    pub fn args(&self) -> &[OsString] {
        &self.args
    }

    pub fn outputs(&self) -> &[PathBuf] {
        &self.outputs
    }

    pub fn has_flag(&self,flag:&str) -> bool {
        self.args.iter().any(|a| a == flag)
    }

    /// the argument following the first occurrence of flag
    pub fn value_of(&self,flag:&str) -> Option<&OsStr> {
        let i = self.args.iter().position(|a| a == flag)?;
        self.args.get(i + 1).map(|a| a.as_os_str())
    }

    /// every declared output must exist once the tool returned
    pub fn check_outputs(&self) -> Result<(),PipelineError> {
        match self.outputs.iter().find(|o| !o.exists()) {
            Some(missing) => Err(PipelineError::MissingOutput {
                stage: self.stage,
                tool: self.name.clone(),
                path: missing.clone(),
            }),
            None => Ok(()),
        }
    }

    pub fn to_command(&self) -> Command {
        let mut cmd = Command::new(&self.program);
        cmd.args(&self.args);
        cmd
    }
}

impl fmt::Display for ToolCommand {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.program.display())?;
        for a in self.args.iter() {
            write!(f, " {}", a.to_string_lossy())?;
        }
        Ok(())
    }
}

/// Runs tool invocations to completion, one at a time.
pub trait ToolRunner {
    fn run(&mut self,cmd:&ToolCommand) -> Result<(),PipelineError>;
}

/// Launches the real executables and waits on them
#[derive(Debug, Default)]
pub struct ProcessRunner;

impl ToolRunner for ProcessRunner {
    fn run(&mut self,cmd:&ToolCommand) -> Result<(),PipelineError> {
        info!("{}",cmd);
        let result = cmd.to_command().output().map_err(|source| PipelineError::ToolLaunch {
            stage: cmd.stage(),
            tool: cmd.tool_name().to_string(),
            source,
        })?;
        let stdout = String::from_utf8_lossy(&result.stdout);
        if !stdout.trim().is_empty() {
            debug!("{} output:\n{}", cmd.tool_name(), stdout.trim_end());
        }
        if !result.status.success() {
            return Err(PipelineError::ExternalProcess {
                stage: cmd.stage(),
                tool: cmd.tool_name().to_string(),
                status: result.status.to_string(),
                stderr: String::from_utf8_lossy(&result.stderr).trim_end().to_string(),
            });
        }
        cmd.check_outputs()
    }
}
