//! Error types for building, emitting, and reading KDL document trees.

use thiserror::Error;

/// Errors that can occur while building, emitting, or reading a KDL tree.
#[derive(Error, Debug)]
pub enum KdlError {
    /// An argument index, property, or child name does not exist on the node.
    #[error("{what}: no such key")]
    NotFound { what: String },

    /// The value's variant does not match the requested extraction.
    #[error("value is not {expected} (found {found})")]
    KindMismatch {
        expected: &'static str,
        found: &'static str,
    },

    /// An integer does not fit the requested host width.
    #[error("{value} cannot be represented as {target}")]
    Range { value: String, target: &'static str },

    /// A big float was narrowed to `f64` inexactly. `value` is the closest
    /// `f64`, still usable by callers that accept the rounding.
    #[error("{literal} cannot be represented exactly as f64 (closest is {value})")]
    PrecisionLoss { value: f64, literal: String },

    /// A negative positional key was used to set an argument.
    #[error("invalid argument index {0}")]
    InvalidIndex(i64),

    /// The event stream violated the document grammar.
    #[error("expected {expected}, got {found}")]
    Structural {
        expected: &'static str,
        found: &'static str,
    },

    /// A start-node event carried a value other than an (annotated) null.
    #[error("invalid type annotation: start of node carried a {found} value")]
    UnexpectedNodeValue { found: &'static str },

    /// The event source reported a lexical or syntax failure.
    #[error("parse error: {0}")]
    Parse(String),

    /// A numeric literal could not be classified.
    #[error("invalid number literal {0:?}")]
    InvalidNumber(String),

    /// The underlying writer or reader failed.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// A JSON event stream could not be read or written.
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// Another error, wrapped with the operation that produced it.
    #[error("{context}: {source}")]
    Context {
        context: String,
        #[source]
        source: Box<KdlError>,
    },

    /// A user-defined marshalling failure.
    #[error("{0}")]
    Custom(String),
}

impl KdlError {
    pub(crate) fn not_found(what: impl Into<String>) -> Self {
        KdlError::NotFound { what: what.into() }
    }

    /// Build a user-facing error, typically from a `Marshal`/`Unmarshal` impl.
    pub fn custom(message: impl Into<String>) -> Self {
        KdlError::Custom(message.into())
    }

    /// Wrap this error with a description of what was being done.
    pub fn context(self, context: impl Into<String>) -> Self {
        KdlError::Context {
            context: context.into(),
            source: Box::new(self),
        }
    }

    /// The innermost error, with any `Context` layers removed.
    pub fn root_cause(&self) -> &KdlError {
        match self {
            KdlError::Context { source, .. } => source.root_cause(),
            other => other,
        }
    }

    /// True when the error reports a missing argument, property, or child.
    pub fn is_not_found(&self) -> bool {
        matches!(self.root_cause(), KdlError::NotFound { .. })
    }

    /// True when the event stream violated the document grammar.
    pub fn is_structural(&self) -> bool {
        matches!(
            self.root_cause(),
            KdlError::Structural { .. } | KdlError::UnexpectedNodeValue { .. }
        )
    }

    /// The rounded value carried by a `PrecisionLoss` error.
    pub fn best_effort_f64(&self) -> Option<f64> {
        match self.root_cause() {
            KdlError::PrecisionLoss { value, .. } => Some(*value),
            _ => None,
        }
    }
}

/// Convenience alias used throughout kdl-tree.
pub type Result<T> = std::result::Result<T, KdlError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn not_found_is_seen_through_context() {
        let err = KdlError::not_found("property port").context("unmarshalling host");
        assert!(err.is_not_found());
        assert_eq!(err.to_string(), "unmarshalling host: property port: no such key");
    }

    #[test]
    fn kind_mismatch_is_not_not_found() {
        let err = KdlError::KindMismatch {
            expected: "a string",
            found: "integer",
        };
        assert!(!err.is_not_found());
        assert!(!err.is_structural());
    }

    #[test]
    fn precision_loss_keeps_value() {
        let err = KdlError::PrecisionLoss {
            value: 0.5,
            literal: "0.5000000000000000000001".into(),
        };
        assert_eq!(err.best_effort_f64(), Some(0.5));
    }
}
