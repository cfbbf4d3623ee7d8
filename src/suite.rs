//! Runs cases in order and stops at the first one that doesn't pass.
use crate::{
    case::TestCase,
    pipeline::{Pipeline, TestOutcome},
};
use anyhow::{Context, Result};
use std::io::prelude::*;

pub const SUCCESS_BANNER: &str = "******** All tests passed! ********";

#[derive(Debug)]
pub enum Verdict {
    Passed(TestOutcome),
    Failed(Failure),
}

#[derive(Debug)]
pub enum Failure {
    /// The program ran but returned the wrong status.
    Mismatch(TestOutcome),
    /// Some stage could not produce a status at all.
    Fault { case: TestCase, error: anyhow::Error },
}

impl Failure {
    pub fn case(&self) -> &TestCase {
        match self {
            Failure::Mismatch(outcome) => &outcome.case,
            Failure::Fault { case, .. } => case,
        }
    }

    /// Turn the failure into an error suitable for ending the process.
    pub fn into_error(self, index: usize) -> anyhow::Error {
        match self {
            Failure::Mismatch(outcome) => anyhow::anyhow!(
                "case #{} {:?} returned {}, expected {}",
                index + 1,
                outcome.case.source,
                outcome.actual,
                outcome.case.expected
            ),
            Failure::Fault { case, error } => {
                error.context(format!("case #{} {:?} could not be run", index + 1, case.source))
            }
        }
    }
}

#[derive(Debug)]
pub enum SuiteOutcome {
    Passed { count: usize },
    Aborted { index: usize, failure: Failure },
}

/// Lazily run `cases` through `pipeline`, one verdict per case. Nothing runs
/// until the iterator is advanced.
pub fn verdicts<'a, P: Pipeline + 'a>(
    mut pipeline: P,
    cases: &'a [TestCase],
) -> impl Iterator<Item = Verdict> + 'a {
    cases.iter().map(move |case| match pipeline.run(case) {
        Ok(outcome) if outcome.passed => Verdict::Passed(outcome),
        Ok(outcome) => Verdict::Failed(Failure::Mismatch(outcome)),
        Err(error) => Verdict::Failed(Failure::Fault {
            case: case.clone(),
            error,
        }),
    })
}

/// Run every case in declaration order, writing one diagnostic line per
/// case to `out`. Returns at the first failure; later cases are not run.
///
/// The `Err` case is reserved for failures to write to `out`.
pub fn run_all<'a, P: Pipeline + 'a>(
    pipeline: P,
    cases: &'a [TestCase],
    out: &mut impl Write,
) -> Result<SuiteOutcome> {
    let mut count = 0;
    for (index, verdict) in verdicts(pipeline, cases).enumerate() {
        log::debug!("Case #{}: {:?}", index + 1, verdict);
        match verdict {
            Verdict::Passed(outcome) => {
                print_outcome(out, &outcome)?;
                count += 1;
            }
            Verdict::Failed(failure) => {
                match &failure {
                    Failure::Mismatch(outcome) => print_outcome(out, outcome)?,
                    Failure::Fault { case, .. } => writeln!(
                        out,
                        "input: {}, expected: {}, actual: (none)",
                        case.source, case.expected
                    )
                    .context("Could not write the report")?,
                }
                return Ok(SuiteOutcome::Aborted { index, failure });
            }
        }
    }
    Ok(SuiteOutcome::Passed { count })
}

fn print_outcome(out: &mut impl Write, outcome: &TestOutcome) -> Result<()> {
    writeln!(
        out,
        "input: {}, expected: {}, actual: {}",
        outcome.case.source, outcome.case.expected, outcome.actual
    )
    .context("Could not write the report")
}

/// Print the success banner if, and only if, the suite passed. A failed
/// suite is handed back as an error.
pub fn report(out: &mut impl Write, outcome: SuiteOutcome) -> Result<()> {
    match outcome {
        SuiteOutcome::Passed { count } => {
            log::info!("{} case(s) passed", count);
            writeln!(out, "{}", SUCCESS_BANNER).context("Could not write the report")?;
            Ok(())
        }
        SuiteOutcome::Aborted { index, failure } => Err(failure.into_error(index)),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    /// Answers from a table and remembers what it was asked.
    struct Scripted {
        answers: Vec<Result<u8, &'static str>>,
        calls: Vec<String>,
    }

    impl Scripted {
        fn new(answers: Vec<Result<u8, &'static str>>) -> Self {
            Self {
                answers,
                calls: Vec::new(),
            }
        }
    }

    impl Pipeline for Scripted {
        fn run(&mut self, case: &TestCase) -> Result<TestOutcome> {
            let answer = self.answers[self.calls.len()];
            self.calls.push(case.source.clone());
            match answer {
                Ok(actual) => Ok(TestOutcome::new(case.clone(), actual)),
                Err(msg) => Err(anyhow::anyhow!(msg)),
            }
        }
    }

    fn cases() -> Vec<TestCase> {
        vec![
            TestCase::new("1;", 1),
            TestCase::new("42+3;", 45),
            TestCase::new("12 == 8 + 4;", 1),
        ]
    }

    #[test]
    fn all_pass_prints_banner() {
        let mut pipeline = Scripted::new(vec![Ok(1), Ok(45), Ok(1)]);
        let mut out = Vec::new();
        let outcome = run_all(&mut pipeline, &cases(), &mut out).unwrap();
        assert!(matches!(outcome, SuiteOutcome::Passed { count: 3 }));
        report(&mut out, outcome).unwrap();

        let out = String::from_utf8(out).unwrap();
        assert_eq!(
            out,
            "input: 1;, expected: 1, actual: 1\n\
             input: 42+3;, expected: 45, actual: 45\n\
             input: 12 == 8 + 4;, expected: 1, actual: 1\n\
             ******** All tests passed! ********\n"
        );
    }

    #[test]
    fn mismatch_stops_the_suite() {
        let mut pipeline = Scripted::new(vec![Ok(1), Ok(44), Ok(1)]);
        let mut out = Vec::new();
        let outcome = run_all(&mut pipeline, &cases(), &mut out).unwrap();

        assert_eq!(pipeline.calls, vec!["1;", "42+3;"]);
        match &outcome {
            SuiteOutcome::Aborted {
                index: 1,
                failure: Failure::Mismatch(o),
            } => assert_eq!(o.actual, 44),
            other => panic!("unexpected outcome: {:?}", other),
        }

        let err = report(&mut out, outcome).unwrap_err();
        assert!(format!("{}", err).contains("returned 44, expected 45"));

        let out = String::from_utf8(out).unwrap();
        assert!(out.ends_with("input: 42+3;, expected: 45, actual: 44\n"));
        assert!(!out.contains(SUCCESS_BANNER));
    }

    #[test]
    fn fault_stops_the_suite() {
        let mut pipeline = Scripted::new(vec![Err("no executable"), Ok(45), Ok(1)]);
        let mut out = Vec::new();
        let outcome = run_all(&mut pipeline, &cases(), &mut out).unwrap();

        assert_eq!(pipeline.calls, vec!["1;"]);
        assert!(matches!(
            outcome,
            SuiteOutcome::Aborted {
                index: 0,
                failure: Failure::Fault { .. }
            }
        ));

        let err = report(&mut out, outcome).unwrap_err();
        let msg = format!("{:#}", err);
        assert!(msg.contains("case #1"), "{}", msg);
        assert!(msg.contains("no executable"), "{}", msg);
    }

    #[test]
    fn verdicts_are_lazy() {
        let mut pipeline = Scripted::new(vec![Ok(1), Ok(45), Ok(1)]);
        let cases = cases();
        let first = verdicts(&mut pipeline, &cases).next();
        assert!(matches!(first, Some(Verdict::Passed(_))));
        assert_eq!(pipeline.calls.len(), 1);
    }

    #[test]
    fn empty_suite_passes() {
        let mut pipeline = Scripted::new(vec![]);
        let outcome = run_all(&mut pipeline, &[], &mut std::io::sink()).unwrap();
        assert!(matches!(outcome, SuiteOutcome::Passed { count: 0 }));
    }
}
