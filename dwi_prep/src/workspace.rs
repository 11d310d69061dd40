use std::path::{Path, PathBuf};
use tempfile::TempDir;
use tracing::debug;
use crate::error::PipelineError;

/// Scratch directory of one run. Removed when dropped unless preserved.
#[derive(Debug)]
pub struct Workspace {
    dir:TempDir,
}

impl Workspace {

    pub fn create() -> Result<Self,PipelineError> {
        let tmp = std::env::temp_dir();
        let dir = tempfile::Builder::new()
            .prefix("dwi_prep.")
            .tempdir_in(&tmp)
            .map_err(|source| PipelineError::Io { path: tmp, source })?;
        debug!("scratch workspace at {}", dir.path().display());
        Ok(Self { dir })
    }

    pub fn path(&self) -> &Path {
        self.dir.path()
    }

    /// keep the directory on disk and return where it is
    pub fn preserve(self) -> PathBuf {
        self.dir.keep()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn removed_on_drop() {
        let w = Workspace::create().unwrap();
        let p = w.path().to_owned();
        assert!(p.is_dir());
        assert!(p.file_name().unwrap().to_string_lossy().starts_with("dwi_prep."));
        drop(w);
        assert!(!p.exists());
    }

    #[test]
    fn preserved_directory_stays() {
        let w = Workspace::create().unwrap();
        utils::write_to_file(&w.path().join("x.bvec"), "0\n0\n0\n").unwrap();
        let p = w.preserve();
        assert!(p.join("x.bvec").is_file());
        std::fs::remove_dir_all(&p).unwrap();
    }
}
