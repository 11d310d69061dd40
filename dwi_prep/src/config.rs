use std::path::{Path, PathBuf};
use serde::{Deserialize, Serialize};
use toml;
use crate::error::PipelineError;

/// relative to the user's home directory
pub const DEFAULT_CONFIG:&str = ".anima/config.toml";

/// Locations of the Anima binaries, data and scripts.
///
/// Read once at start-up and handed to the pipeline by reference.
#[derive(Clone,Debug,Serialize,Deserialize,PartialEq)]
pub struct AnimaConfig {
    #[serde(rename = "anima-scripts")]
    pub scripts:AnimaScripts,
}

#[derive(Clone,Debug,Serialize,Deserialize,PartialEq)]
#[serde(rename_all = "kebab-case")]
pub struct AnimaScripts {
    /// directory holding the Anima executables
    pub anima:PathBuf,
    /// Anima-Scripts-Data, holds the identity transform and the brain atlases
    pub extra_data_root:PathBuf,
    /// Anima-Scripts checkout
    pub anima_scripts_root:PathBuf,
    /// interpreter used to run the brain extraction script
    #[serde(default = "default_python")]
    pub python:PathBuf,
}

fn default_python() -> PathBuf {
    PathBuf::from("python")
}

impl Config for AnimaConfig {
    fn default() -> Self {
        Self {
            scripts: AnimaScripts {
                anima: PathBuf::from("/opt/Anima/bin"),
                extra_data_root: PathBuf::from("/opt/Anima-Scripts-Data"),
                anima_scripts_root: PathBuf::from("/opt/Anima-Scripts"),
                python: default_python(),
            }
        }
    }
}

impl ConfigFile for AnimaConfig {

    fn to_file(&self, filename:&Path) -> Result<(),PipelineError> {
        let t = toml::to_string_pretty(&self).map_err(|e| PipelineError::ConfigurationInvalid {
            file: filename.to_owned(),
            message: e.to_string(),
        })?;
        utils::write_to_file(filename,&t).map_err(|source| PipelineError::Io { path: filename.to_owned(), source })
    }

    fn from_file(filename:&Path) -> Result<Self,PipelineError> {
        if !filename.is_file() {
            return Err(PipelineError::ConfigurationMissing(filename.to_owned()));
        }
        let t = utils::read_to_string(filename).map_err(|source| PipelineError::Io { path: filename.to_owned(), source })?;
        toml::from_str(&t).map_err(|e| PipelineError::ConfigurationInvalid {
            file: filename.to_owned(),
            message: e.to_string(),
        })
    }
}

impl AnimaConfig {

    /// $HOME/.anima/config.toml (USERPROFILE on windows)
    pub fn default_path() -> Option<PathBuf> {
        std::env::var_os("HOME")
            .or_else(|| std::env::var_os("USERPROFILE"))
            .map(|home| PathBuf::from(home).join(DEFAULT_CONFIG))
    }

    /// Write the default configuration for the user to fill in. An existing file is
    /// only replaced with force.
    pub fn write_template(output:&Path,force:bool) -> Result<(),PipelineError> {
        if output.exists() && !force {
            return Err(PipelineError::Io {
                path: output.to_owned(),
                source: std::io::Error::new(std::io::ErrorKind::AlreadyExists, "already exists, use --force to overwrite it"),
            });
        }
        if let Some(parent) = output.parent() {
            std::fs::create_dir_all(parent).map_err(|source| PipelineError::Io { path: parent.to_owned(), source })?;
        }
        <AnimaConfig as Config>::default().to_file(output)
    }

    pub fn tool(&self,name:&str) -> PathBuf {
        self.scripts.anima.join(name)
    }

    pub fn python(&self) -> &Path {
        &self.scripts.python
    }

    pub fn brain_extraction_script(&self) -> PathBuf {
        self.scripts.anima_scripts_root.join("brain_extraction").join("animaAtlasBasedBrainExtraction.py")
    }

    pub fn identity_transform(&self) -> PathBuf {
        self.scripts.extra_data_root.join("id.txt")
    }
}

pub trait Config {
    fn default() -> Self;
}

pub trait ConfigFile: Sized {
    fn to_file(&self, filename:&Path) -> Result<(),PipelineError>;
    fn from_file(filename:&Path) -> Result<Self,PipelineError>;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn template_round_trips() {
        let dir = tempfile::tempdir().unwrap();
        let f = dir.path().join("config.toml");
        let d = <AnimaConfig as Config>::default();
        d.to_file(&f).unwrap();
        assert_eq!(AnimaConfig::from_file(&f).unwrap(), d);
    }

    #[test]
    fn template_is_not_overwritten_without_force() {
        let dir = tempfile::tempdir().unwrap();
        let f = dir.path().join(DEFAULT_CONFIG);
        AnimaConfig::write_template(&f, false).unwrap();
        assert_eq!(AnimaConfig::from_file(&f).unwrap(), <AnimaConfig as Config>::default());

        utils::write_to_file(&f, "[anima-scripts]\nanima = \"/mine\"\n").unwrap();
        match AnimaConfig::write_template(&f, false) {
            Err(PipelineError::Io { path, source }) => {
                assert_eq!(path, f);
                assert_eq!(source.kind(), std::io::ErrorKind::AlreadyExists);
            }
            other => panic!("unexpected {:?}", other),
        }
        assert!(utils::read_to_string(&f).unwrap().contains("/mine"));

        AnimaConfig::write_template(&f, true).unwrap();
        assert_eq!(AnimaConfig::from_file(&f).unwrap(), <AnimaConfig as Config>::default());
    }

    #[test]
    fn python_is_optional() {
        let dir = tempfile::tempdir().unwrap();
        let f = dir.path().join("config.toml");
        utils::write_to_file(&f, r#"
[anima-scripts]
anima = "/a/bin"
extra-data-root = "/a/data"
anima-scripts-root = "/a/scripts"
"#).unwrap();
        let c = AnimaConfig::from_file(&f).unwrap();
        assert_eq!(c.python(), Path::new("python"));
        assert_eq!(c.tool("animaCropImage"), PathBuf::from("/a/bin/animaCropImage"));
        assert_eq!(c.identity_transform(), PathBuf::from("/a/data/id.txt"));
        assert_eq!(
            c.brain_extraction_script(),
            PathBuf::from("/a/scripts/brain_extraction/animaAtlasBasedBrainExtraction.py")
        );
    }

    #[test]
    fn missing_and_malformed() {
        let dir = tempfile::tempdir().unwrap();
        let f = dir.path().join("config.toml");
        assert!(matches!(AnimaConfig::from_file(&f), Err(PipelineError::ConfigurationMissing(_))));
        utils::write_to_file(&f, "[anima-scripts]\nanima = /unquoted\n").unwrap();
        assert!(matches!(AnimaConfig::from_file(&f), Err(PipelineError::ConfigurationInvalid { .. })));
    }
}
