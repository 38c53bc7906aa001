//! Encoding and decoding of mxfile documents.
//!
//! - [`pack`]: the escape / deflate / base64 pipeline for page bodies
//! - [`attr`]: attribute value codecs and per-element field tables
//! - [`xml`]: the element tree

pub mod attr;
pub mod pack;
pub mod xml;

pub use attr::{decode_flag, decode_style, encode_flag, encode_style};
pub use pack::{pack, unpack};
pub use xml::{decode_file, decode_model, encode_file, encode_model};

/// Wire form of a page body.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum BodyForm {
    /// Serialized model packed into character data.
    #[default]
    Packed,
    /// Nested `mxGraphModel` element.
    Raw,
}

/// Options for encoding a document.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct EncodeOptions {
    /// Page body form.
    pub body: BodyForm,
    /// Indentation unit for pretty-printing: one whitespace character,
    /// repeated. `None` writes everything on one line.
    pub indent: Option<String>,
}

impl EncodeOptions {
    /// Creates default options: packed body, no indentation.
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates options for a raw (uncompressed) page body.
    pub fn raw() -> Self {
        Self {
            body: BodyForm::Raw,
            indent: None,
        }
    }

    /// Sets the indentation unit.
    pub fn with_indent(mut self, indent: impl Into<String>) -> Self {
        self.indent = Some(indent.into());
        self
    }
}
