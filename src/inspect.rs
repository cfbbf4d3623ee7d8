//! Looks at a linked executable so a failure to launch it can say why.
use anyhow::{Context, Result};
use std::{fmt, path::Path};

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Artifact {
    Missing,
    Empty,
    Elf { entry: u64 },
    Pe { entry: u64 },
    MachO { entry: u64 },
    /// Parsed, but not something we expect a C toolchain to emit (an archive,
    /// a fat binary, ...).
    Other,
    /// Not an object format at all. A shell script lands here too.
    Unrecognized,
}

impl fmt::Display for Artifact {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Artifact::Missing => f.write_str("the linked executable is missing"),
            Artifact::Empty => f.write_str("the linked executable is empty"),
            Artifact::Elf { entry } => write!(f, "ELF executable, entry point {:#x}", entry),
            Artifact::Pe { entry } => write!(f, "PE executable, entry point {:#x}", entry),
            Artifact::MachO { entry } => write!(f, "Mach-O executable, entry point {:#x}", entry),
            Artifact::Other => f.write_str("an object file that is not a plain executable"),
            Artifact::Unrecognized => f.write_str("not a recognized executable format"),
        }
    }
}

pub fn inspect(path: &Path) -> Result<Artifact> {
    let file = match std::fs::File::open(path) {
        Ok(file) => file,
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(Artifact::Missing),
        Err(e) => return Err(e).with_context(|| format!("Failed to open {:?}", path)),
    };

    let len = file
        .metadata()
        .with_context(|| format!("Failed to stat {:?}", path))?
        .len();
    if len == 0 {
        return Ok(Artifact::Empty);
    }

    // Safety: read-only mapping of a file nobody else is writing while the
    // pipeline is between steps
    let mmap = unsafe {
        memmap2::Mmap::map(&file).with_context(|| format!("Failed to mmap {:?}", path))?
    };

    let artifact = match goblin::Object::parse(&mmap) {
        Ok(goblin::Object::Elf(elf)) => Artifact::Elf { entry: elf.entry },
        Ok(goblin::Object::PE(pe)) => Artifact::Pe {
            entry: pe.entry as u64,
        },
        Ok(goblin::Object::Mach(goblin::mach::Mach::Binary(macho))) => {
            Artifact::MachO { entry: macho.entry }
        }
        Ok(goblin::Object::Unknown(magic)) => {
            log::trace!("Unknown magic {:#x} in {:?}", magic, path);
            Artifact::Unrecognized
        }
        Ok(_) => Artifact::Other,
        Err(e) => {
            log::trace!("goblin could not parse {:?}: {}", path, e);
            Artifact::Unrecognized
        }
    };
    Ok(artifact)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn missing_and_empty() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("tmp");
        assert_eq!(inspect(&path).unwrap(), Artifact::Missing);

        std::fs::write(&path, b"").unwrap();
        assert_eq!(inspect(&path).unwrap(), Artifact::Empty);
    }

    #[test]
    fn script_is_not_an_object() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("tmp");
        std::fs::write(&path, b"#!/bin/sh\nexit 3\n").unwrap();
        assert_eq!(inspect(&path).unwrap(), Artifact::Unrecognized);
    }
}
