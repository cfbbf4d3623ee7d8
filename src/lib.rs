//! Acceptance harness for a compiler that emits assembly: compile a snippet,
//! link it with the host C toolchain, run it, and compare its exit status.
pub mod case;
pub mod inspect;
pub mod pipeline;
pub mod suite;
pub mod workdir;

pub use case::TestCase;
pub use pipeline::{Pipeline, ProcessPipeline, TestOutcome, Toolchain};
pub use suite::{report, run_all, SuiteOutcome};
