use anyhow::Result;
use clap::Parser;
use exitcheck::{case, suite, workdir::Placement, ProcessPipeline, Toolchain};
use std::path::PathBuf;

#[derive(Parser)]
#[clap(about = "Compile, link and run snippets, then check their exit statuses")]
struct Opts {
    /// Be more verbose; can be used multiple times
    ///
    /// Alternatively, you can pass a log level by an `EXITCHECK_LOG`
    /// environment variable.
    #[clap(short, long, parse(from_occurrences))]
    verbose: usize,
    /// The C compiler driver used to assemble and link (default: `$CC`, then
    /// `cc`)
    #[clap(long)]
    cc: Option<PathBuf>,
    /// Keep `tmp.s` and `tmp` in this directory, overwriting them for every
    /// case, instead of a fresh temporary directory per case
    #[clap(long)]
    work_dir: Option<PathBuf>,
    /// Treat a non-zero exit status from the compiler or the toolchain as a
    /// failure of the case
    #[clap(long)]
    check_status: bool,
    /// Read cases from a file (`-` for stdin) instead of the built-in suite.
    /// One case per line: `<expected status><TAB><source>`
    #[clap(long)]
    cases: Option<PathBuf>,
    /// The compiler under test
    compiler: PathBuf,
}

fn main() -> Result<()> {
    let opts = Opts::parse();

    let default_log_level = [log::Level::Info, log::Level::Debug, log::Level::Trace]
        .get(opts.verbose)
        .ok_or_else(|| anyhow::anyhow!("too many `--verbose`s"))?;
    env_logger::Builder::from_env(
        env_logger::Env::new().filter_or(
            "EXITCHECK_LOG",
            format!("exitcheck={}", default_log_level),
        ),
    )
    .init();

    let cases = match &opts.cases {
        Some(path) => case::load(path)?,
        None => case::builtin(),
    };
    log::debug!("Loaded {} case(s)", cases.len());

    let mut toolchain = Toolchain::new(opts.compiler);
    if let Some(cc) = opts.cc {
        toolchain.cc = cc.into_os_string();
    }
    toolchain.check_status = opts.check_status;

    let placement = match opts.work_dir {
        Some(dir) => Placement::Fixed(dir),
        None => Placement::Scoped,
    };

    let pipeline = ProcessPipeline::new(toolchain, placement);

    let stdout = std::io::stdout();
    let mut out = stdout.lock();
    let outcome = suite::run_all(pipeline, &cases, &mut out)?;
    suite::report(&mut out, outcome)
}
