use std::fmt;

/// Pipeline stages in execution order
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Stage {
    EddyCorrection,
    T1BrainExtraction,
    DistortionCorrection,
    Reorientation,
    Denoising,
    BrainMasking,
    TensorEstimation,
}

impl Stage {
    pub fn print(&self) -> &'static str {
        match self {
            Stage::EddyCorrection => "eddy current correction",
            Stage::T1BrainExtraction => "T1 brain extraction",
            Stage::DistortionCorrection => "susceptibility distortion correction",
            Stage::Reorientation => "axial reorientation",
            Stage::Denoising => "NL-means denoising",
            Stage::BrainMasking => "brain masking",
            Stage::TensorEstimation => "tensor estimation",
        }
    }
}

impl fmt::Display for Stage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.print())
    }
}
