use std::path::{Path, PathBuf};

/// The files the next stage works from
#[derive(Clone, Debug, PartialEq)]
pub struct PipelineState {
    pub image:PathBuf,
    pub gradients:PathBuf,
    pub brain_mask:Option<PathBuf>,
}

impl PipelineState {

    pub fn new(image:&Path,gradients:&Path) -> Self {
        Self {
            image:image.to_owned(),
            gradients:gradients.to_owned(),
            brain_mask:None,
        }
    }

    pub fn with_image(self,image:PathBuf) -> Self {
        Self { image, ..self }
    }

    pub fn with_gradients(self,gradients:PathBuf) -> Self {
        Self { gradients, ..self }
    }

    pub fn with_brain_mask(self,brain_mask:PathBuf) -> Self {
        Self { brain_mask:Some(brain_mask), ..self }
    }
}

/// Naming of intermediates and published outputs for one run
#[derive(Clone, Debug, PartialEq)]
pub struct FileNames {
    scratch:PathBuf,
    /// input prefix relocated to the scratch directory
    tmp_prefix:PathBuf,
    /// input prefix, where the results are published
    out_prefix:PathBuf,
    t1:Option<T1Names>,
}

impl FileNames {

    pub fn new(input:&Path,t1:Option<&Path>,scratch:&Path) -> Self {
        Self {
            scratch:scratch.to_owned(),
            tmp_prefix:utils::relocated_prefix(input, scratch),
            out_prefix:utils::image_prefix(input),
            t1:t1.map(|t| T1Names::new(t, scratch)),
        }
    }

    pub fn tmp_prefix(&self) -> &Path {
        &self.tmp_prefix
    }

    /// <scratch>/<input basename><suffix>
    pub fn tmp(&self,suffix:&str) -> PathBuf {
        utils::with_suffix(&self.tmp_prefix, suffix)
    }

    pub fn scratch_file(&self,name:&str) -> PathBuf {
        self.scratch.join(name)
    }

    /// <input prefix><suffix>, beside the input
    pub fn output(&self,suffix:&str) -> PathBuf {
        utils::with_suffix(&self.out_prefix, suffix)
    }

    pub fn t1(&self) -> Option<&T1Names> {
        self.t1.as_ref()
    }
}

/// T1 files: brain extraction results live beside the T1, registrations in scratch
#[derive(Clone, Debug, PartialEq)]
pub struct T1Names {
    image:PathBuf,
    prefix:PathBuf,
    tmp_prefix:PathBuf,
}

impl T1Names {

    pub fn new(t1:&Path,scratch:&Path) -> Self {
        Self {
            image:t1.to_owned(),
            prefix:utils::image_prefix(t1),
            tmp_prefix:utils::relocated_prefix(t1, scratch),
        }
    }

    pub fn image(&self) -> &Path {
        &self.image
    }

    pub fn masked(&self) -> PathBuf {
        utils::with_suffix(&self.prefix, "_masked.nrrd")
    }

    pub fn brain_mask(&self) -> PathBuf {
        utils::with_suffix(&self.prefix, "_brainMask.nrrd")
    }

    pub fn rig(&self) -> PathBuf {
        utils::with_suffix(&self.tmp_prefix, "_rig.nrrd")
    }

    pub fn rig_tr_txt(&self) -> PathBuf {
        utils::with_suffix(&self.tmp_prefix, "_rig_tr.txt")
    }

    pub fn rig_tr_xml(&self) -> PathBuf {
        utils::with_suffix(&self.tmp_prefix, "_rig_tr.xml")
    }
}
