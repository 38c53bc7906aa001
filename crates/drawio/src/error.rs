//! Error types for mxfile encoding and decoding.

use thiserror::Error;

/// Pipeline step a [`DecodeError`] originated from.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DecodeStage {
    /// Outer or inner XML structure.
    Xml,
    /// Base64 layer of a packed page body.
    Base64,
    /// Raw deflate layer of a packed page body.
    Inflate,
    /// Percent-escape layer of a packed page body.
    Unescape,
    /// Attribute values and model-level constraints.
    Model,
}

impl DecodeStage {
    /// Returns a short lowercase name for the stage (e.g., "inflate").
    pub fn name(&self) -> &'static str {
        match self {
            DecodeStage::Xml => "xml",
            DecodeStage::Base64 => "base64",
            DecodeStage::Inflate => "inflate",
            DecodeStage::Unescape => "unescape",
            DecodeStage::Model => "model",
        }
    }
}

/// Error while reading an mxfile document.
///
/// Every variant is fatal: a document either decodes completely or not at all.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum DecodeError {
    // === XML structure ===
    #[error("malformed XML: {0}")]
    Xml(String),

    #[error("missing <{element}> element")]
    MissingElement { element: &'static str },

    #[error("unexpected <{found}> element, expected <{expected}>")]
    UnexpectedElement {
        expected: &'static str,
        found: String,
    },

    // === Packed body ===
    #[error("invalid base64 in page body: {0}")]
    Base64(String),

    #[error("corrupt deflate stream: {0}")]
    Inflate(String),

    #[error("deflate stream truncated after {consumed} of {len} bytes")]
    TruncatedStream { consumed: usize, len: usize },

    #[error("invalid percent escape at byte {position}")]
    InvalidEscape { position: usize },

    #[error("invalid UTF-8 in {context}")]
    InvalidUtf8 { context: &'static str },

    // === Model ===
    #[error("<{element}> is missing required attribute {attribute:?}")]
    MissingAttribute {
        element: &'static str,
        attribute: &'static str,
    },

    #[error("invalid integer {value:?} for attribute {attribute:?}")]
    InvalidNumber {
        attribute: &'static str,
        value: String,
    },

    #[error("{field} length {len} exceeds maximum {max}")]
    LengthExceedsLimit {
        field: &'static str,
        len: usize,
        max: usize,
    },
}

impl DecodeError {
    /// Returns the pipeline stage this error belongs to.
    pub fn stage(&self) -> DecodeStage {
        match self {
            DecodeError::Xml(_)
            | DecodeError::MissingElement { .. }
            | DecodeError::UnexpectedElement { .. } => DecodeStage::Xml,
            DecodeError::Base64(_) => DecodeStage::Base64,
            DecodeError::Inflate(_) | DecodeError::TruncatedStream { .. } => DecodeStage::Inflate,
            DecodeError::InvalidEscape { .. } | DecodeError::InvalidUtf8 { .. } => {
                DecodeStage::Unescape
            }
            DecodeError::MissingAttribute { .. }
            | DecodeError::InvalidNumber { .. }
            | DecodeError::LengthExceedsLimit { .. } => DecodeStage::Model,
        }
    }
}

/// Error while writing an mxfile document.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum EncodeError {
    #[error("XML writer failed: {0}")]
    Xml(String),

    #[error("deflate compression failed: {0}")]
    Deflate(String),

    #[error("unsupported indent {indent:?}: expected one repeated space or tab")]
    UnsupportedIndent { indent: String },
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_stage_mapping() {
        assert_eq!(DecodeError::Base64("x".into()).stage(), DecodeStage::Base64);
        assert_eq!(
            DecodeError::TruncatedStream { consumed: 3, len: 3 }.stage(),
            DecodeStage::Inflate
        );
        assert_eq!(DecodeError::InvalidEscape { position: 0 }.stage(), DecodeStage::Unescape);
        assert_eq!(
            DecodeError::MissingElement { element: "diagram" }.stage(),
            DecodeStage::Xml
        );
        assert_eq!(
            DecodeError::InvalidNumber { attribute: "x", value: "1.5".into() }.stage(),
            DecodeStage::Model
        );
    }

    #[test]
    fn test_messages() {
        let err = DecodeError::MissingAttribute { element: "mxCell", attribute: "id" };
        assert_eq!(err.to_string(), "<mxCell> is missing required attribute \"id\"");
        assert_eq!(DecodeStage::Inflate.name(), "inflate");
    }
}
