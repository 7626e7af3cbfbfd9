//! Provide the property path syntax.

use alloc::borrow::Cow;
use alloc::boxed::Box;
use alloc::string::{String, ToString};
use alloc::vec::Vec;
use core::fmt;
use core::str::FromStr;

use thiserror::Error;

// -----------------------------------------------------------------------------
// ParseError

/// An error returned when a path string is malformed.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
#[error("Encountered an error at offset {offset} while parsing `{path}`: {error}")]
pub struct ParseError {
    /// Byte position in `path`.
    pub offset: usize,
    /// The path that the error occurred in.
    pub path: String,
    /// The underlying error.
    pub error: Cow<'static, str>,
}

// -----------------------------------------------------------------------------
// Step

/// A **singular** access within a property path.
///
/// # Syntax
///
/// - Simple: `name`
/// - Indexed: `name[index]`, where `index` is a non-negative integer.
/// - Mapped: `name(key)`, where `key` is any text without `)`.
///
/// Names are non-empty and contain none of `.[]()`.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum Step<'a> {
    Simple { name: Cow<'a, str> },
    Indexed { name: Cow<'a, str>, index: usize },
    Mapped { name: Cow<'a, str>, key: Cow<'a, str> },
}

impl<'a> Step<'a> {
    #[inline]
    pub fn simple(name: impl Into<Cow<'a, str>>) -> Self {
        Self::Simple { name: name.into() }
    }

    #[inline]
    pub fn indexed(name: impl Into<Cow<'a, str>>, index: usize) -> Self {
        Self::Indexed {
            name: name.into(),
            index,
        }
    }

    #[inline]
    pub fn mapped(name: impl Into<Cow<'a, str>>, key: impl Into<Cow<'a, str>>) -> Self {
        Self::Mapped {
            name: name.into(),
            key: key.into(),
        }
    }

    /// The property name of this step, without index or key.
    #[inline]
    pub fn name(&self) -> &str {
        match self {
            Self::Simple { name } | Self::Indexed { name, .. } | Self::Mapped { name, .. } => name,
        }
    }

    /// Converts this into an "owned" value.
    pub fn into_owned(self) -> Step<'static> {
        match self {
            Self::Simple { name } => Step::Simple {
                name: Cow::Owned(name.into_owned()),
            },
            Self::Indexed { name, index } => Step::Indexed {
                name: Cow::Owned(name.into_owned()),
                index,
            },
            Self::Mapped { name, key } => Step::Mapped {
                name: Cow::Owned(name.into_owned()),
                key: Cow::Owned(key.into_owned()),
            },
        }
    }
}

impl fmt::Display for Step<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Simple { name } => f.write_str(name),
            Self::Indexed { name, index } => write!(f, "{name}[{index}]"),
            Self::Mapped { name, key } => write!(f, "{name}({key})"),
        }
    }
}

/// A [`Step`] combined with its `offset` in the parsed path.
///
/// `offset` is only used to display error messages, unrelated to access.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct OffsetStep<'a> {
    pub step: Step<'a>,
    /// only used to display error messages
    pub offset: Option<usize>,
}

impl<'a> From<Step<'a>> for OffsetStep<'a> {
    #[inline]
    fn from(step: Step<'a>) -> Self {
        Self { step, offset: None }
    }
}

impl OffsetStep<'_> {
    /// Converts this into an "owned" value.
    #[inline]
    pub fn into_owned(self) -> OffsetStep<'static> {
        OffsetStep {
            step: self.step.into_owned(),
            offset: self.offset,
        }
    }
}

// -----------------------------------------------------------------------------
// PropertyPath

/// A parsed, reusable property path: one or more [`Step`]s joined by `.`.
///
/// # Examples
///
/// ```
/// use vc_property::access::{PropertyPath, Step};
///
/// let path = PropertyPath::parse("orders[2].lines(first.sku).qty").unwrap();
///
/// assert_eq!(path.len(), 3);
/// assert_eq!(path.steps()[1].step, Step::mapped("lines", "first.sku"));
/// assert_eq!(path.to_string(), "orders[2].lines(first.sku).qty");
///
/// let err = PropertyPath::parse("orders[two]").unwrap_err();
/// assert_eq!(err.offset, 6);
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct PropertyPath(Box<[OffsetStep<'static>]>);

impl PropertyPath {
    /// Parses the path string.
    pub fn parse(path: &str) -> Result<Self, ParseError> {
        Parser::new(path).parse().map(Self)
    }

    /// Creates a path from programmatically built steps.
    ///
    /// Returns `None` if `steps` is empty.
    pub fn from_steps(steps: impl IntoIterator<Item = Step<'static>>) -> Option<Self> {
        let steps: Box<[OffsetStep<'static>]> = steps.into_iter().map(OffsetStep::from).collect();
        if steps.is_empty() {
            None
        } else {
            Some(Self(steps))
        }
    }

    /// Creates a path of a single step.
    #[inline]
    pub fn single(step: Step<'static>) -> Self {
        Self(Box::new([OffsetStep::from(step)]))
    }

    #[inline]
    pub fn steps(&self) -> &[OffsetStep<'static>] {
        &self.0
    }

    /// Returns the number of steps, at least 1.
    #[inline]
    pub fn len(&self) -> usize {
        self.0.len()
    }

    /// Renders the first `count` steps.
    pub fn prefix(&self, count: usize) -> String {
        let mut out = String::new();
        for (i, step) in self.0.iter().take(count).enumerate() {
            if i > 0 {
                out.push('.');
            }
            out.push_str(&step.step.to_string());
        }
        out
    }
}

impl fmt::Display for PropertyPath {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (i, step) in self.0.iter().enumerate() {
            if i > 0 {
                f.write_str(".")?;
            }
            fmt::Display::fmt(&step.step, f)?;
        }
        Ok(())
    }
}

impl FromStr for PropertyPath {
    type Err = ParseError;

    #[inline]
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}

// -----------------------------------------------------------------------------
// Parser

struct Parser<'a> {
    path: &'a str,
    pos: usize,
}

impl<'a> Parser<'a> {
    #[inline]
    fn new(path: &'a str) -> Self {
        Self { path, pos: 0 }
    }

    fn err(&self, offset: usize, error: &'static str) -> ParseError {
        ParseError {
            offset,
            path: self.path.to_string(),
            error: Cow::Borrowed(error),
        }
    }

    #[inline]
    fn peek(&self) -> Option<u8> {
        self.path.as_bytes().get(self.pos).copied()
    }

    fn parse(mut self) -> Result<Box<[OffsetStep<'static>]>, ParseError> {
        let mut steps: Vec<OffsetStep<'static>> = Vec::new();
        loop {
            let offset = self.pos;
            let step = self.step()?;
            steps.push(OffsetStep {
                step,
                offset: Some(offset),
            });
            match self.peek() {
                None => return Ok(steps.into_boxed_slice()),
                Some(b'.') => self.pos += 1,
                Some(_) => return Err(self.err(self.pos, "expected `.` after a step")),
            }
        }
    }

    fn step(&mut self) -> Result<Step<'static>, ParseError> {
        let start = self.pos;
        let rest = &self.path[start..];
        let len = rest.find(['.', '[', ']', '(', ')']).unwrap_or(rest.len());
        if len == 0 {
            return Err(match self.peek() {
                Some(b']' | b')') => self.err(start, "unbalanced closing delimiter"),
                _ => self.err(start, "empty property name"),
            });
        }
        let name = String::from(&rest[..len]);
        self.pos += len;

        match self.peek() {
            Some(b'[') => {
                let digits = self.delimited(b']', "unterminated index, expected `]`")?;
                let index = self.index(digits)?;
                Ok(Step::indexed(name, index))
            }
            Some(b'(') => {
                let key = String::from(self.delimited(b')', "unterminated key, expected `)`")?);
                Ok(Step::mapped(name, key))
            }
            Some(b']' | b')') => Err(self.err(self.pos, "unbalanced closing delimiter")),
            _ => Ok(Step::simple(name)),
        }
    }

    /// Consumes `open inner close`, returning `inner`.
    fn delimited(&mut self, close: u8, error: &'static str) -> Result<&'a str, ParseError> {
        let open = self.pos;
        let path: &'a str = self.path;
        let inner_start = open + 1;
        let Some(len) = path.as_bytes()[inner_start..].iter().position(|&b| b == close) else {
            return Err(self.err(open, error));
        };
        self.pos = inner_start + len + 1;
        Ok(&path[inner_start..inner_start + len])
    }

    fn index(&self, digits: &str) -> Result<usize, ParseError> {
        // `[` and `]` surround the digits.
        let offset = self.pos - digits.len() - 2;
        if digits.is_empty() || !digits.bytes().all(|b| b.is_ascii_digit()) {
            return Err(self.err(offset, "index must be a non-negative integer"));
        }
        digits
            .parse::<usize>()
            .map_err(|_| self.err(offset, "index overflows"))
    }
}

#[cfg(test)]
mod tests {
    use alloc::string::ToString;
    use alloc::vec::Vec;

    use super::{PropertyPath, Step};

    fn steps(path: &str) -> Vec<Step<'static>> {
        PropertyPath::parse(path)
            .unwrap()
            .steps()
            .iter()
            .map(|s| s.step.clone())
            .collect()
    }

    fn error_offset(path: &str) -> usize {
        PropertyPath::parse(path).unwrap_err().offset
    }

    #[test]
    fn parse_simple_paths() {
        assert_eq!(steps("name"), [Step::simple("name")]);
        assert_eq!(
            steps("address.city"),
            [Step::simple("address"), Step::simple("city")]
        );
    }

    #[test]
    fn parse_indexed_and_mapped() {
        assert_eq!(
            steps("items[10].attrs(a.b).x"),
            [
                Step::indexed("items", 10),
                Step::mapped("attrs", "a.b"),
                Step::simple("x"),
            ]
        );
        assert_eq!(steps("m()"), [Step::mapped("m", "")]);
        assert_eq!(steps("m((x)"), [Step::mapped("m", "(x")]);
    }

    #[test]
    fn offsets_are_recorded() {
        let path = PropertyPath::parse("a.bb[1].c").unwrap();
        let offsets: Vec<_> = path.steps().iter().map(|s| s.offset).collect();
        assert_eq!(offsets, [Some(0), Some(2), Some(8)]);
    }

    #[test]
    fn malformed_paths() {
        assert_eq!(error_offset(""), 0);
        assert_eq!(error_offset("a..b"), 2);
        assert_eq!(error_offset("a."), 2);
        assert_eq!(error_offset(".a"), 0);
        assert_eq!(error_offset("a[1"), 1);
        assert_eq!(error_offset("a[]"), 1);
        assert_eq!(error_offset("a[-1]"), 1);
        assert_eq!(error_offset("a[x]"), 1);
        assert_eq!(error_offset("a[99999999999999999999999]"), 1);
        assert_eq!(error_offset("a(key"), 1);
        assert_eq!(error_offset("a]"), 1);
        assert_eq!(error_offset("a[1]b"), 4);
        assert_eq!(error_offset("a(k)[1]"), 4);
    }

    #[test]
    fn display_round_trips() {
        for text in ["a", "a.b[3].c(key)", "a(x.y)", "m()"] {
            let path: PropertyPath = text.parse().unwrap();
            assert_eq!(path.to_string(), text);
        }
    }

    #[test]
    fn prefix_and_programmatic_steps() {
        let path = PropertyPath::from_steps([
            Step::simple("a"),
            Step::indexed("b", 2),
            Step::mapped("c", "k"),
        ])
        .unwrap();
        assert_eq!(path.prefix(2), "a.b[2]");
        assert_eq!(path.prefix(0), "");
        assert!(PropertyPath::from_steps([]).is_none());
    }

    #[test]
    fn error_message() {
        let err = PropertyPath::parse("a[x]").unwrap_err();
        assert_eq!(
            err.to_string(),
            "Encountered an error at offset 1 while parsing `a[x]`: index must be a non-negative integer"
        );
    }
}
