//! Where a pipeline run keeps its assembly and executable.
use anyhow::{Context, Result};
use std::path::{Path, PathBuf};

pub const ASM_FILE_NAME: &str = "tmp.s";
pub const EXE_FILE_NAME: &str = "tmp";

/// Like `Cow<'_, Path>` for directories - you might or might not own the
/// underlying directory. An owned one is removed when dropped.
pub trait ArtifactDir: 'static {
    fn path(&self) -> &Path;

    fn asm_path(&self) -> PathBuf {
        self.path().join(ASM_FILE_NAME)
    }

    fn exe_path(&self) -> PathBuf {
        self.path().join(EXE_FILE_NAME)
    }
}

impl ArtifactDir for PathBuf {
    fn path(&self) -> &Path {
        self
    }
}

impl ArtifactDir for tempfile::TempDir {
    fn path(&self) -> &Path {
        tempfile::TempDir::path(self)
    }
}

/// How artifact directories are handed out to pipeline runs.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Placement {
    /// A fresh directory per run, deleted afterwards.
    Scoped,
    /// One shared directory. Every run overwrites the previous run's
    /// artifacts and nothing is cleaned up, so runs must not overlap.
    Fixed(PathBuf),
}

impl Placement {
    pub fn acquire(&self) -> Result<Box<dyn ArtifactDir>> {
        match self {
            Placement::Scoped => {
                let dir = tempfile::Builder::new()
                    .prefix("exitcheck.")
                    .tempdir()
                    .context("Could not create a temporary directory")?;
                log::trace!("Created scoped artifact directory {:?}", dir.path());
                Ok(Box::new(dir))
            }
            Placement::Fixed(path) => {
                std::fs::create_dir_all(path)
                    .with_context(|| format!("Could not create directory {:?}", path))?;
                Ok(Box::new(path.clone()))
            }
        }
    }
}
