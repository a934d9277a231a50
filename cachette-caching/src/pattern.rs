//! Key patterns used by pattern flushes
//!
//! A [`PatternSpec`] is compiled into a regular expression fragment that a
//! backend can hand to its native query language. Prefixes are escaped and
//! anchored; regular expressions pass through untouched, so a malformed
//! expression only surfaces when the backend evaluates it.

use std::fmt;
use std::str::FromStr;

use crate::{CacheError, CacheResult};

/// How a pattern string is interpreted
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PatternKind {
    /// Keys starting with the literal pattern
    Prefix,

    /// Keys matched by the pattern as a regular expression
    Regex,
}

impl fmt::Display for PatternKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PatternKind::Prefix => write!(f, "prefix"),
            PatternKind::Regex => write!(f, "regular expression"),
        }
    }
}

impl FromStr for PatternKind {
    type Err = CacheError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "prefix" => Ok(PatternKind::Prefix),
            "regex" | "regexp" => Ok(PatternKind::Regex),
            other => Err(CacheError::unsupported(format!(
                "Unsupported pattern type \"{}\"",
                other
            ))),
        }
    }
}

/// A pattern selecting the keys a flush removes
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PatternSpec {
    pub pattern: String,
    pub kind: PatternKind,
}

impl PatternSpec {
    pub fn new(pattern: impl Into<String>, kind: PatternKind) -> Self {
        Self {
            pattern: pattern.into(),
            kind,
        }
    }

    /// Match keys starting with `literal`
    pub fn prefix(literal: impl Into<String>) -> Self {
        Self::new(literal, PatternKind::Prefix)
    }

    /// Match keys with the regular expression `expr`
    pub fn regex(expr: impl Into<String>) -> Self {
        Self::new(expr, PatternKind::Regex)
    }

    /// Build a spec from a pattern and a textual kind such as `"prefix"`
    pub fn parse(pattern: impl Into<String>, kind: &str) -> CacheResult<Self> {
        Ok(Self::new(pattern, kind.parse()?))
    }

    /// Compile into a backend-native regular expression
    pub fn compile(&self) -> CompiledPattern {
        match self.kind {
            PatternKind::Prefix => compile_prefix(&self.pattern),
            PatternKind::Regex => compile_regex(&self.pattern),
        }
    }
}

impl fmt::Display for PatternSpec {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} \"{}\"", self.kind, self.pattern)
    }
}

/// A regular expression ready to be embedded in a backend query
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CompiledPattern {
    expr: String,
}

impl CompiledPattern {
    pub fn as_str(&self) -> &str {
        &self.expr
    }

    pub fn into_string(self) -> String {
        self.expr
    }
}

/// Escape every metacharacter in `literal` and anchor it at the start of the key
pub fn compile_prefix(literal: &str) -> CompiledPattern {
    CompiledPattern {
        expr: format!("^{}", regex::escape(literal)),
    }
}

/// Use `expr` verbatim
pub fn compile_regex(expr: &str) -> CompiledPattern {
    CompiledPattern {
        expr: expr.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ErrorKind;
    use regex::Regex;

    #[test]
    fn test_prefix_is_escaped_and_anchored() {
        let compiled = compile_prefix("user.1:(a)");
        assert_eq!(compiled.as_str(), r"^user\.1:\(a\)");

        let re = Regex::new(compiled.as_str()).unwrap();
        assert!(re.is_match("user.1:(a):profile"));
        assert!(!re.is_match("userX1:(a)"));
        assert!(!re.is_match("post:user.1:(a)"));
    }

    #[test]
    fn test_regex_is_verbatim() {
        assert_eq!(compile_regex("^user:[0-9]+$").as_str(), "^user:[0-9]+$");
        // Not validated here
        assert_eq!(compile_regex("(unclosed").into_string(), "(unclosed");
    }

    #[test]
    fn test_spec_compile_and_display() {
        let spec = PatternSpec::prefix("user:");
        assert_eq!(spec.compile().as_str(), "^user:");
        assert_eq!(spec.to_string(), "prefix \"user:\"");

        let spec = PatternSpec::regex("^post:");
        assert_eq!(spec.compile().as_str(), "^post:");
        assert_eq!(spec.to_string(), "regular expression \"^post:\"");
    }

    #[test]
    fn test_unknown_kind_is_unsupported() {
        let err = PatternSpec::parse("user:", "glob").unwrap_err();
        assert_eq!(err.kind(), ErrorKind::UnsupportedOperation);

        let spec = PatternSpec::parse("user:", "Prefix").unwrap();
        assert_eq!(spec.kind, PatternKind::Prefix);
    }
}
