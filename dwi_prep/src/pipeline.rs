use std::path::{Path, PathBuf};
use tracing::{debug, info, warn};
use gradients::{read_b_values, GradientError, GradientSource};
use crate::args::PreprocessArgs;
use crate::config::AnimaConfig;
use crate::error::PipelineError;
use crate::stage::Stage;
use crate::state::{FileNames, PipelineState};
use crate::tools::*;
use crate::workspace::Workspace;

/// Files written beside the input by a successful run
#[derive(Clone, Debug, PartialEq)]
pub struct PublishedOutputs {
    pub image:PathBuf,
    pub gradients:PathBuf,
    pub brain_mask:Option<PathBuf>,
    pub tensors:PathBuf,
    pub tensors_b0:PathBuf,
    pub noise_variance:PathBuf,
    /// scratch directory, when it was kept
    pub workspace:Option<PathBuf>,
}

/// tensor estimation results, still in scratch
#[derive(Clone, Debug, PartialEq)]
pub struct TensorOutputs {
    pub tensors:PathBuf,
    pub tensors_b0:PathBuf,
    pub noise_variance:PathBuf,
}

/// Stage sequencing for one run. Every stage takes the current state and returns the next.
pub struct Pipeline<'a,R:ToolRunner> {
    args:&'a PreprocessArgs,
    config:&'a AnimaConfig,
    runner:&'a mut R,
    names:FileNames,
}

impl<'a,R:ToolRunner> Pipeline<'a,R> {

    pub fn new(args:&'a PreprocessArgs,config:&'a AnimaConfig,runner:&'a mut R,names:FileNames) -> Self {
        Self { args, config, runner, names }
    }

    fn run_tool(&mut self,cmd:ToolCommand) -> Result<(),PipelineError> {
        self.runner.run(&cmd)?;
        cmd.check_outputs()
    }

    fn anima(&self,stage:Stage,tool:&str) -> ToolCommand {
        ToolCommand::anima(self.config, stage, tool)
    }

    fn direction(&self) -> String {
        self.args.direction.to_string()
    }

    /// run every stage after gradient reconstruction, up to and including tensor estimation
    pub fn execute(&mut self,state:PipelineState) -> Result<(PipelineState,TensorOutputs),PipelineError> {
        let state = self.eddy_correction(state)?;
        self.t1_brain_extraction()?;
        let state = self.distortion_correction(state)?;
        let state = self.reorientation(state)?;
        let state = self.denoising(state)?;
        let state = self.brain_masking(state)?;
        let tensors = self.tensor_estimation(&state)?;
        Ok((state, tensors))
    }

    pub fn eddy_correction(&mut self,state:PipelineState) -> Result<PipelineState,PipelineError> {
        if self.args.no_eddy_correction {
            info!("skipping {}", Stage::EddyCorrection);
            return Ok(state);
        }
        info!("{}", Stage::EddyCorrection);
        let image = self.names.tmp("_eddy_corrected.nrrd");
        let gradients = self.names.tmp("_eddy_corrected.bvec");
        let cmd = self.anima(Stage::EddyCorrection, EDDY_CURRENT_CORRECTION)
            .flag("-i", &state.image)
            .flag("-I", &state.gradients)
            .output("-o", &image)
            .output("-O", &gradients)
            .flag("-d", self.direction());
        self.run_tool(cmd)?;
        Ok(state.with_image(image).with_gradients(gradients))
    }

    /// masked T1 and T1 brain mask, written beside the T1
    pub fn t1_brain_extraction(&mut self) -> Result<(),PipelineError> {
        let t1 = match (self.args.needs_t1_brain(), self.names.t1()) {
            (true, Some(t1)) => t1.clone(),
            _ => return Ok(()),
        };
        info!("{} of {}", Stage::T1BrainExtraction, t1.image().display());
        let cmd = ToolCommand::brain_extraction(self.config, Stage::T1BrainExtraction)
            .arg(t1.image())
            .produces(&t1.masked())
            .produces(&t1.brain_mask());
        self.run_tool(cmd)
    }

    fn crop_b0(&mut self,stage:Stage,image:&Path,output:&Path) -> Result<(),PipelineError> {
        let cmd = self.anima(stage, CROP_IMAGE)
            .flag("-i", image)
            .flag("-t", "0")
            .flag("-T", "0")
            .output("-o", output);
        self.run_tool(cmd)
    }

    /// Reverse phase encoding B0 when given, T1 registration otherwise, nothing with neither.
    pub fn distortion_correction(&mut self,state:PipelineState) -> Result<PipelineState,PipelineError> {
        let stage = Stage::DistortionCorrection;
        if self.args.no_disto_correction {
            info!("skipping {}", stage);
            return Ok(state);
        }
        let b0 = self.names.tmp("_B0.nrrd");
        let correction_tr = self.names.tmp("_B0_correction_tr.nrrd");
        let b0_corrected = self.names.tmp("_B0_corrected.nrrd");
        let dir = self.direction();
        let args = self.args;

        if let Some(reverse) = args.reverse.as_ref() {
            info!("{} with reversed phase encoding image {}", stage, reverse.display());
            self.crop_b0(stage, &state.image, &b0)?;

            let id_xml = self.names.scratch_file("id.xml");
            let cmd = self.anima(stage, TRANSFORM_SERIE_XML_GENERATOR)
                .flag("-i", self.config.identity_transform())
                .output("-o", &id_xml);
            self.run_tool(cmd)?;

            let b0_reverse = self.names.tmp("_B0_Reverse.nrrd");
            let cmd = self.anima(stage, APPLY_TRANSFORM_SERIE)
                .flag("-i", reverse)
                .flag("-t", &id_xml)
                .output("-o", &b0_reverse)
                .flag("-g", &b0);
            self.run_tool(cmd)?;

            let init_tr = self.names.tmp("_init_correction_tr.nrrd");
            let cmd = self.anima(stage, DISTORTION_CORRECTION)
                .flag("-s", "2")
                .flag("-d", &dir)
                .flag("-f", &b0)
                .flag("-b", &b0_reverse)
                .output("-o", &init_tr);
            self.run_tool(cmd)?;

            let cmd = self.anima(stage, BM_DISTORTION_CORRECTION)
                .flag("-f", &b0)
                .flag("-b", &b0_reverse)
                .output("-o", &b0_corrected)
                .flag("-i", &init_tr)
                .flag("--bs", "3")
                .flag("-s", "10")
                .flag("-d", &dir)
                .output("-O", &correction_tr);
            self.run_tool(cmd)?;
        } else if let Some(t1) = self.names.t1().cloned() {
            info!("{} with T1 image {}", stage, t1.image().display());
            self.crop_b0(stage, &state.image, &b0)?;

            let cmd = self.anima(stage, PYRAMIDAL_BM_REGISTRATION)
                .flag("-r", &b0)
                .flag("-m", t1.masked())
                .output("-o", &t1.rig());
            self.run_tool(cmd)?;

            let cmd = self.anima(stage, DENSE_SVF_BM_REGISTRATION)
                .flag("-r", t1.rig())
                .flag("-m", &b0)
                .output("-o", &b0_corrected)
                .flag("-d", &dir)
                .output("-O", &correction_tr)
                .flag("-t", "3");
            self.run_tool(cmd)?;
        } else {
            info!("no reversed phase encoding or T1 image, no {}", stage);
            return Ok(state);
        }

        let corrected = self.names.tmp("_corrected.nrrd");
        let cmd = self.anima(stage, APPLY_DISTORTION_CORRECTION)
            .flag("-f", &state.image)
            .flag("-t", &correction_tr)
            .output("-o", &corrected);
        self.run_tool(cmd)?;
        Ok(state.with_image(corrected))
    }

    pub fn reorientation(&mut self,state:PipelineState) -> Result<PipelineState,PipelineError> {
        info!("{}", Stage::Reorientation);
        let reoriented = self.names.tmp("_or.nrrd");
        let cmd = self.anima(Stage::Reorientation, CONVERT_IMAGE)
            .flag("-i", &state.image)
            .output("-o", &reoriented)
            .flag("-R", "AXIAL");
        self.run_tool(cmd)?;
        Ok(state.with_image(reoriented))
    }

    pub fn denoising(&mut self,state:PipelineState) -> Result<PipelineState,PipelineError> {
        if self.args.no_denoising {
            info!("skipping {}", Stage::Denoising);
            return Ok(state);
        }
        info!("{}", Stage::Denoising);
        let denoised = self.names.tmp("_nlm.nrrd");
        let cmd = self.anima(Stage::Denoising, NL_MEANS_TEMPORAL)
            .flag("-i", &state.image)
            .flag("-b", "0.5")
            .output("-o", &denoised);
        self.run_tool(cmd)?;
        Ok(state.with_image(denoised))
    }

    /// Mask from the T1 brain mask registered onto the B0 when a T1 is given, from atlas
    /// based extraction of the B0 otherwise.
    pub fn brain_masking(&mut self,state:PipelineState) -> Result<PipelineState,PipelineError> {
        let stage = Stage::BrainMasking;
        if self.args.no_brain_masking {
            info!("skipping {}", stage);
            return Ok(state);
        }
        info!("{}", stage);
        let for_extract = self.names.tmp("_forBrainExtract.nrrd");
        self.crop_b0(stage, &state.image, &for_extract)?;

        let mask = match self.names.t1().cloned() {
            None => {
                let mask = self.names.tmp("_forBrainExtract_brainMask.nrrd");
                let cmd = ToolCommand::brain_extraction(self.config, stage)
                    .arg(&for_extract)
                    .produces(&mask);
                self.run_tool(cmd)?;
                mask
            }
            Some(t1) => {
                let cmd = self.anima(stage, PYRAMIDAL_BM_REGISTRATION)
                    .flag("-r", &for_extract)
                    .flag("-m", t1.masked())
                    .output("-o", &t1.rig())
                    .output("-O", &t1.rig_tr_txt())
                    .flag("-p", "4")
                    .flag("-l", "1")
                    .flag("--sp", "2")
                    .flag("-I", "0");
                self.run_tool(cmd)?;

                let cmd = self.anima(stage, TRANSFORM_SERIE_XML_GENERATOR)
                    .flag("-i", t1.rig_tr_txt())
                    .output("-o", &t1.rig_tr_xml());
                self.run_tool(cmd)?;

                let mask = self.names.tmp("_brainMask.nrrd");
                let cmd = self.anima(stage, APPLY_TRANSFORM_SERIE)
                    .flag("-i", t1.brain_mask())
                    .flag("-t", t1.rig_tr_xml())
                    .output("-o", &mask)
                    .flag("-g", &for_extract)
                    .flag("-n", "nearest");
                self.run_tool(cmd)?;
                mask
            }
        };
        debug!("brain mask {}", mask.display());

        let masked = self.names.tmp("_masked.nrrd");
        let cmd = self.anima(stage, MASK_IMAGE)
            .flag("-i", &state.image)
            .flag("-m", &mask)
            .output("-o", &masked);
        self.run_tool(cmd)?;
        Ok(state.with_image(masked).with_brain_mask(mask))
    }

    pub fn tensor_estimation(&mut self,state:&PipelineState) -> Result<TensorOutputs,PipelineError> {
        info!("{}", Stage::TensorEstimation);
        let outputs = TensorOutputs {
            tensors:self.names.tmp("_Tensors.nrrd"),
            tensors_b0:self.names.tmp("_Tensors_B0.nrrd"),
            noise_variance:self.names.tmp("_Tensors_NoiseVariance.nrrd"),
        };
        let mut cmd = self.anima(Stage::TensorEstimation, DTI_ESTIMATOR)
            .flag("-i", &state.image)
            .output("-o", &outputs.tensors)
            .output("-O", &outputs.tensors_b0)
            .output("-N", &outputs.noise_variance)
            .flag("-g", &state.gradients)
            .flag("-b", self.args.bval.as_path());
        if let Some(mask) = state.brain_mask.as_ref() {
            cmd = cmd.flag("-m", mask);
        }
        self.run_tool(cmd)?;
        Ok(outputs)
    }
}

fn check_input(what:&'static str,path:&Path) -> Result<(),PipelineError> {
    match path.is_file() {
        true => Ok(()),
        false => Err(PipelineError::InputMissing { what, path:path.to_owned() }),
    }
}

/// Copy every file to its destination, or none of them. Sources are checked before the
/// first copy and destinations already written are removed when a copy fails.
fn publish(files:&[(PathBuf,PathBuf)]) -> Result<(),PipelineError> {
    if let Some((missing, _)) = files.iter().find(|(from, _)| !from.is_file()) {
        return Err(PipelineError::Io {
            path:missing.clone(),
            source:std::io::Error::new(std::io::ErrorKind::NotFound, "nothing to publish"),
        });
    }
    for (i, (from, to)) in files.iter().enumerate() {
        debug!("{} -> {}", from.display(), to.display());
        if let Err(source) = std::fs::copy(from, to) {
            for (_, written) in files[..i].iter() {
                if let Err(e) = std::fs::remove_file(written) {
                    warn!("cannot remove {}: {}", written.display(), e);
                }
            }
            return Err(PipelineError::Io { path:to.clone(), source });
        }
    }
    Ok(())
}

/// Preprocess one DWI. Nothing is launched unless the inputs and gradients check out, and
/// nothing is published unless every stage succeeded.
pub fn run<R:ToolRunner>(args:&PreprocessArgs,config:&AnimaConfig,runner:&mut R) -> Result<PublishedOutputs,PipelineError> {
    let source = GradientSource::resolve(args.grad.as_deref(), &args.dicom).map_err(|e| match e {
        GradientError::SourceMissing(message) => PipelineError::GradientSourceMissing(message),
        e => PipelineError::from(e),
    })?;
    check_input("DWI image", &args.input)?;
    check_input("b-value file", &args.bval)?;
    if let Some(reverse) = args.reverse.as_ref() {
        check_input("reversed phase encoding image", reverse)?;
    }
    if let Some(t1) = args.t1.as_ref() {
        check_input("T1 image", t1)?;
    }
    let b_values = read_b_values(&args.bval)?;

    let workspace = Workspace::create()?;
    let names = FileNames::new(&args.input, args.t1.as_deref(), workspace.path());
    let (bvec, table) = source.reconstruct(names.tmp_prefix())?;
    if table.len() != b_values.len() {
        return Err(PipelineError::GradientCountMismatch { gradients:table.len(), b_values:b_values.len() });
    }

    let state = PipelineState::new(&args.input, &bvec);
    let mut pipeline = Pipeline::new(args, config, runner, names.clone());
    let (state, tensors) = match pipeline.execute(state) {
        Ok(r) => r,
        Err(e) if e.is_process_failure() => {
            let kept = workspace.preserve();
            warn!("intermediate files kept in {}", kept.display());
            return Err(e);
        }
        Err(e) => return Err(e),
    };

    info!("publishing results beside {}", args.input.display());
    let mut published = PublishedOutputs {
        image:names.output("_preprocessed.nrrd"),
        gradients:names.output("_preprocessed.bvec"),
        brain_mask:state.brain_mask.as_ref().map(|_| names.output("_brainMask.nrrd")),
        tensors:names.output("_Tensors.nrrd"),
        tensors_b0:names.output("_Tensors_B0.nrrd"),
        noise_variance:names.output("_Tensors_NoiseVariance.nrrd"),
        workspace:None,
    };
    let mut files = vec![
        (state.image.clone(), published.image.clone()),
        (state.gradients.clone(), published.gradients.clone()),
        (tensors.tensors.clone(), published.tensors.clone()),
        (tensors.tensors_b0.clone(), published.tensors_b0.clone()),
        (tensors.noise_variance.clone(), published.noise_variance.clone()),
    ];
    if let (Some(mask), Some(to)) = (state.brain_mask.as_ref(), published.brain_mask.as_ref()) {
        files.push((mask.clone(), to.clone()));
    }
    if let Err(e) = publish(&files) {
        let kept = workspace.preserve();
        warn!("nothing published, intermediate files kept in {}", kept.display());
        return Err(e);
    }

    if args.keep_workspace {
        let kept = workspace.preserve();
        info!("intermediate files kept in {}", kept.display());
        published.workspace = Some(kept);
    }
    Ok(published)
}
