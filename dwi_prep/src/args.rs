use std::path::PathBuf;

/// Prepares DWI for model estimation: gradients reworking on Siemens based on DICOMs,
/// eddy current and susceptibility distortion correction, denoising, brain masking and
/// tensor estimation
#[derive(clap::Parser,Debug,Clone)]
#[command(version)]
pub struct PreprocessArgs {
    /// DWI file to process
    #[clap(short, long)]
    pub input:PathBuf,
    /// DWI b-values file
    #[clap(short, long)]
    pub bval:PathBuf,
    /// DWI gradients file (3 lines of device-space components, as written by dcm2nii)
    #[clap(short, long)]
    pub grad:Option<PathBuf>,
    /// DICOM files, directories or patterns. With --grad, the first one puts the gradient
    /// file into real coordinates. Without it, gradients are read from the DICOM headers
    #[clap(short = 'D', long, num_args = 1..)]
    pub dicom:Vec<PathBuf>,
    /// reversed phase encoding B0 image
    #[clap(short, long)]
    pub reverse:Option<PathBuf>,
    /// T1 image for distortion correction and brain masking (B0 used if not provided)
    #[clap(short, long)]
    pub t1:Option<PathBuf>,
    /// phase encoding direction (0: x, 1: y, 2: z)
    #[clap(short, long, default_value_t = 1, value_parser = clap::value_parser!(u8).range(0..=2))]
    pub direction:u8,
    /// do not perform susceptibility distortion correction
    #[clap(long)]
    pub no_disto_correction:bool,
    /// do not perform NL-means denoising
    #[clap(long)]
    pub no_denoising:bool,
    /// do not perform any brain masking
    #[clap(long)]
    pub no_brain_masking:bool,
    /// do not perform eddy current distortion correction
    #[clap(long)]
    pub no_eddy_correction:bool,
    /// configuration file with the Anima locations (defaults to ~/.anima/config.toml)
    #[clap(short, long)]
    pub config:Option<PathBuf>,
    /// keep the scratch directory after a successful run
    #[clap(long)]
    pub keep_workspace:bool,
    /// enable debug logging
    #[clap(short, long)]
    pub verbose:bool,
}

impl PreprocessArgs {
    /// the T1 brain extraction is only needed by the stages using the T1
    pub fn needs_t1_brain(&self) -> bool {
        self.t1.is_some() && (!self.no_disto_correction || !self.no_brain_masking)
    }
}

#[cfg(test)]
mod tests {
    use clap::Parser;
    use super::*;

    #[test]
    fn defaults() {
        let a = PreprocessArgs::parse_from(["dwi_prep", "-i", "dwi.nii.gz", "-b", "dwi.bval", "-g", "dwi.bvec"]);
        assert_eq!(a.direction, 1);
        assert!(a.dicom.is_empty());
        assert!(!a.no_eddy_correction && !a.no_denoising && !a.no_brain_masking && !a.no_disto_correction);
        assert!(!a.needs_t1_brain());
    }

    #[test]
    fn several_dicoms_and_switches() {
        let a = PreprocessArgs::parse_from([
            "dwi_prep", "-i", "dwi.nrrd", "-b", "dwi.bval", "-D", "a.dcm", "b.dcm", "c.dcm",
            "-t", "t1.nrrd", "--no-disto-correction", "-d", "0",
        ]);
        assert_eq!(a.dicom.len(), 3);
        assert_eq!(a.direction, 0);
        assert!(a.needs_t1_brain());
    }

    #[test]
    fn direction_is_an_axis() {
        assert!(PreprocessArgs::try_parse_from(["dwi_prep", "-i", "x", "-b", "y", "-d", "3"]).is_err());
        assert!(PreprocessArgs::try_parse_from(["dwi_prep", "-b", "y"]).is_err());
    }
}
