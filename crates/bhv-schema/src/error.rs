//! Decode errors with breadcrumb paths.
//!
//! A failure deep inside a nested structure must name the exact offending
//! field.  Every composite codec prefixes the error's path on the way out,
//! so by the time it reaches the definition loader it reads like
//! `conditions[3].attribute`.

use std::fmt;

use thiserror::Error;

/// Which codec operation was running when the error occurred.
#[derive(Copy, Clone, PartialEq, Eq, Debug)]
pub enum CodecPhase {
    /// Decoding the textual tree format.
    Reading,
    /// Encoding (text or binary).
    Writing,
    /// Decoding the binary wire format.
    Receiving,
}

impl fmt::Display for CodecPhase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            CodecPhase::Reading   => "read",
            CodecPhase::Writing   => "write",
            CodecPhase::Receiving => "receive",
        })
    }
}

/// What went wrong.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum DecodeErrorKind {
    #[error("missing field `{0}`")]
    MissingField(String),

    #[error("expected {expected}, found {found}")]
    WrongType {
        expected: &'static str,
        found:    String,
    },

    #[error("unknown name `{0}`")]
    UnknownName(String),

    #[error("unexpected end of input")]
    Eof,

    #[error("invalid UTF-8 in string")]
    Utf8,

    #[error("{0}")]
    Message(String),
}

/// A codec failure carrying the dotted/bracketed path to the value that
/// caused it and the phase it occurred in.
#[derive(Debug, PartialEq, Eq)]
pub struct DecodeError {
    path:  String,
    phase: CodecPhase,
    kind:  DecodeErrorKind,
}

impl DecodeError {
    pub fn new(phase: CodecPhase, kind: DecodeErrorKind) -> Self {
        Self { path: String::new(), phase, kind }
    }

    pub fn reading(kind: DecodeErrorKind) -> Self {
        Self::new(CodecPhase::Reading, kind)
    }

    pub fn writing(kind: DecodeErrorKind) -> Self {
        Self::new(CodecPhase::Writing, kind)
    }

    pub fn receiving(kind: DecodeErrorKind) -> Self {
        Self::new(CodecPhase::Receiving, kind)
    }

    /// Shorthand for the most common failure: a required field was absent.
    pub fn missing_field(name: impl Into<String>) -> Self {
        Self::reading(DecodeErrorKind::MissingField(name.into()))
    }

    /// Prefix the path with a named segment: `attribute` + `x.y` → `attribute.x.y`.
    pub fn at(mut self, segment: &str) -> Self {
        if self.path.is_empty() {
            self.path = segment.to_owned();
        } else if self.path.starts_with('[') {
            self.path = format!("{segment}{}", self.path);
        } else {
            self.path = format!("{segment}.{}", self.path);
        }
        self
    }

    /// Prefix the path with a list index: `3` + `attribute` → `[3].attribute`.
    pub fn at_index(mut self, index: usize) -> Self {
        if self.path.is_empty() {
            self.path = format!("[{index}]");
        } else if self.path.starts_with('[') {
            self.path = format!("[{index}]{}", self.path);
        } else {
            self.path = format!("[{index}].{}", self.path);
        }
        self
    }

    pub fn path(&self) -> &str {
        &self.path
    }

    pub fn phase(&self) -> CodecPhase {
        self.phase
    }

    pub fn kind(&self) -> &DecodeErrorKind {
        &self.kind
    }
}

impl fmt::Display for DecodeError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.path.is_empty() {
            write!(f, "{} error: {}", self.phase, self.kind)
        } else {
            write!(f, "{} error at `{}`: {}", self.phase, self.path, self.kind)
        }
    }
}

impl std::error::Error for DecodeError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        Some(&self.kind)
    }
}

/// Shorthand result type for all codec operations.
pub type DecodeResult<T> = Result<T, DecodeError>;
