//! Drives one case through compile → assemble/link → execute → compare.
use crate::{
    case::TestCase,
    inspect,
    workdir::Placement,
};
use anyhow::{Context, Result};
use std::{
    ffi::OsString,
    path::{Path, PathBuf},
    process::{Command, ExitStatus, Stdio},
};

/// The result of running one case to completion.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TestOutcome {
    pub case: TestCase,
    pub actual: u8,
    pub passed: bool,
}

impl TestOutcome {
    pub fn new(case: TestCase, actual: u8) -> Self {
        let passed = actual == case.expected;
        Self {
            case,
            actual,
            passed,
        }
    }
}

/// Anything that can turn a case into an outcome. An `Err` is a fault in
/// some stage; a mismatch is an `Ok` outcome with `passed == false`.
pub trait Pipeline {
    fn run(&mut self, case: &TestCase) -> Result<TestOutcome>;
}

impl<P: Pipeline + ?Sized> Pipeline for &mut P {
    fn run(&mut self, case: &TestCase) -> Result<TestOutcome> {
        (**self).run(case)
    }
}

/// External programs the pipeline invokes.
#[derive(Debug, Clone)]
pub struct Toolchain {
    /// The compiler under test.
    pub compiler: PathBuf,
    /// The C compiler driver used to assemble and link.
    pub cc: OsString,
    /// Fail on a non-zero exit status from the compiler or `cc` instead of
    /// waiting for the execution step to trip over the result.
    pub check_status: bool,
}

impl Toolchain {
    /// `cc` is taken from the `CC` environment variable, defaulting to `cc`.
    pub fn new(compiler: PathBuf) -> Self {
        let cc = std::env::var_os("CC").unwrap_or_else(|| "cc".into());
        Self {
            compiler,
            cc,
            check_status: false,
        }
    }
}

/// Runs real child processes. Each step blocks until its child exits.
pub struct ProcessPipeline {
    toolchain: Toolchain,
    placement: Placement,
}

impl ProcessPipeline {
    pub fn new(toolchain: Toolchain, placement: Placement) -> Self {
        Self {
            toolchain,
            placement,
        }
    }

    fn compile(&self, source: &str) -> Result<Vec<u8>> {
        log::debug!("Compiling {:?} with {:?}", source, self.toolchain.compiler);
        let output = Command::new(&self.toolchain.compiler)
            .arg(source)
            .stdin(Stdio::null())
            .stdout(Stdio::piped())
            .stderr(Stdio::inherit())
            .output()
            .with_context(|| {
                format!(
                    "Could not execute the compiler under test {:?}",
                    self.toolchain.compiler
                )
            })?;
        log::trace!(
            "Compiler exited with {}, {} bytes of assembly",
            output.status,
            output.stdout.len()
        );

        if self.toolchain.check_status {
            exit_ok(output.status).context("The compiler under test failed")?;
        }
        Ok(output.stdout)
    }

    fn assemble_and_link(&self, asm_path: &Path, exe_path: &Path) -> Result<()> {
        log::debug!("Assembling and linking {:?} into {:?}", asm_path, exe_path);

        // A shared work directory still holds the previous case's binary; if
        // the toolchain rejects this assembly, execution must not find it
        match std::fs::remove_file(exe_path) {
            Ok(()) => log::trace!("Removed stale {:?}", exe_path),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {}
            Err(e) => {
                return Err(e).with_context(|| format!("Could not remove stale {:?}", exe_path))
            }
        }

        let status = Command::new(&self.toolchain.cc)
            .arg("-o")
            .arg(exe_path)
            .arg(asm_path)
            .stdin(Stdio::null())
            .status()
            .with_context(|| format!("Could not execute the toolchain {:?}", self.toolchain.cc))?;
        log::trace!("Toolchain exited with {}", status);

        if self.toolchain.check_status {
            exit_ok(status).context("Could not assemble and link the compiler output")?;
        }
        Ok(())
    }

    fn execute(&self, exe_path: &Path) -> Result<u8> {
        log::debug!("Executing {:?}", exe_path);
        let status = Command::new(exe_path)
            .stdin(Stdio::null())
            .status()
            .with_context(|| {
                // A toolchain failure usually shows up here, so say what the
                // toolchain actually left behind
                match inspect::inspect(exe_path) {
                    Ok(artifact) => format!("Could not execute {:?} ({})", exe_path, artifact),
                    Err(e) => format!("Could not execute {:?} (inspection failed: {:#})", exe_path, e),
                }
            })?;
        log::trace!("Program exited with {}", status);

        let code = status
            .code()
            .with_context(|| format!("{:?} did not return an exit status ({})", exe_path, status))?;

        // Exit statuses are 8-bit on the platforms we care about; Windows can
        // report wider codes, which we truncate the same way a POSIX wait would
        Ok(code as u8)
    }
}

impl Pipeline for ProcessPipeline {
    fn run(&mut self, case: &TestCase) -> Result<TestOutcome> {
        let dir = self.placement.acquire()?;
        let asm_path = dir.asm_path();
        let exe_path = dir.exe_path();

        let asm = self.compile(&case.source)?;

        std::fs::write(&asm_path, &asm)
            .with_context(|| format!("Could not write the assembly to {:?}", asm_path))?;

        self.assemble_and_link(&asm_path, &exe_path)?;

        if log::log_enabled!(log::Level::Debug) {
            match inspect::inspect(&exe_path) {
                Ok(artifact) => log::debug!("Linked {:?}: {}", exe_path, artifact),
                Err(e) => log::debug!("Could not inspect {:?}: {:#}", exe_path, e),
            }
        }

        let actual = self.execute(&exe_path)?;
        Ok(TestOutcome::new(case.clone(), actual))
    }
}

fn exit_ok(status: ExitStatus) -> Result<()> {
    if status.success() {
        Ok(())
    } else {
        anyhow::bail!("process exited unsuccessfully: {}", status)
    }
}
