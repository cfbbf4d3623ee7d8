//! Test cases: a source snippet and the exit status its program must return.
use anyhow::{Context, Result};
use std::{convert::TryFrom, io::prelude::*, path::Path};

/// One acceptance case.
///
/// `expected` is a `u8` because a process exit status only carries 8 bits;
/// a program computing 256 is indistinguishable from one computing 0.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TestCase {
    pub source: String,
    pub expected: u8,
}

impl TestCase {
    pub fn new(source: impl Into<String>, expected: u8) -> Self {
        Self {
            source: source.into(),
            expected,
        }
    }
}

#[rustfmt::skip]
const BUILTIN: &[(&str, u8)] = &[
    ("1;", 1),
    ("0;", 0),
    ("42;", 42),
    ("42+3;", 45),
    ("13+192-2;", 203),
    (" 13 + 192 - 2  ;", 203),
    ("(1 + 2) * 4 / (20 - 18);", 6),
    ("+12;", 12),
    ("- ((1 + 2) * 4 / (20 - 18)) + 10;", 4),
    ("+ ((1 + 2) * 4 / (20 - 18)) + 10;", 16),
    ("12 == 8 + 4;", 1),
    ("12 < 8 + 4;", 0),
    ("3 * 4 > 8 + 4;", 0),
    ("3 * 4 >= 8 + 4;", 1),
    ("3 + 4 <= 8 + 4 != 0;", 1),
    ("a = 1;", 1),
    ("a = 102; b = 2; a;", 102),
    ("aiko = 1; becky = 2; aiko + becky == 3;", 1),
];

/// The built-in suite, in declaration order.
pub fn builtin() -> Vec<TestCase> {
    BUILTIN
        .iter()
        .map(|&(source, expected)| TestCase::new(source, expected))
        .collect()
}

/// Parse a case list.
///
/// Each non-blank line that doesn't start with `#` is
/// `<expected><TAB><source>`. The source is taken verbatim up to the end of
/// the line, so surrounding whitespace survives.
pub fn parse(text: &str) -> Result<Vec<TestCase>> {
    let mut cases = Vec::new();
    for (i, line) in text.lines().enumerate() {
        let line_no = i + 1;
        let line = line.strip_suffix('\r').unwrap_or(line);
        if line.trim().is_empty() || line.starts_with('#') {
            continue;
        }

        let (expected, source) = line
            .split_once('\t')
            .with_context(|| format!("line {}: expected `<status>\\t<source>`", line_no))?;
        let expected = expected.trim();
        let expected: i64 = expected
            .parse()
            .with_context(|| format!("line {}: {:?} is not an integer", line_no, expected))?;
        let expected = u8::try_from(expected).map_err(|_| {
            anyhow::anyhow!(
                "line {}: {} cannot be observed as an exit status (must be in 0..=255)",
                line_no,
                expected
            )
        })?;

        cases.push(TestCase::new(source, expected));
    }
    Ok(cases)
}

/// Load a case list from `path`. `"-"` reads stdin.
pub fn load(path: &Path) -> Result<Vec<TestCase>> {
    let text = if path == Path::new("-") {
        let mut s = String::new();
        std::io::stdin()
            .lock()
            .read_to_string(&mut s)
            .context("Could not read from stdin")?;
        s
    } else {
        std::fs::read_to_string(path)
            .with_context(|| format!("Could not open {:?} for reading", path))?
    };
    parse(&text).with_context(|| format!("Malformed case list {:?}", path))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn builtin_keeps_declaration_order() {
        let cases = builtin();
        assert_eq!(cases.len(), BUILTIN.len());
        assert_eq!(cases[0], TestCase::new("1;", 1));
        assert_eq!(
            cases.last().unwrap(),
            &TestCase::new("aiko = 1; becky = 2; aiko + becky == 3;", 1)
        );
    }

    #[test]
    fn parse_preserves_source_whitespace() {
        let cases = parse("# comment\n\n203\t 13 + 192 - 2  ;\n6\t(1 + 2) * 4 / (20 - 18);\r\n")
            .unwrap();
        assert_eq!(
            cases,
            vec![
                TestCase::new(" 13 + 192 - 2  ;", 203),
                TestCase::new("(1 + 2) * 4 / (20 - 18);", 6),
            ]
        );
    }

    #[test]
    fn parse_rejects_unobservable_status() {
        let err = parse("1\t1;\n256\t256;\n").unwrap_err();
        assert!(format!("{}", err).contains("line 2"), "{:#}", err);

        assert!(parse("-1\t-1;").is_err());
    }

    #[test]
    fn parse_rejects_missing_separator() {
        assert!(parse("42 42;").is_err());
        assert!(parse("forty-two\t42;").is_err());
    }
}
