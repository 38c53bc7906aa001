//! drawio: read and write draw.io (diagrams.net) documents.
//!
//! This crate models the single-page subset of the `mxfile` format: file
//! metadata, one page, and its graph of styled vertices and edges. Documents
//! are built with [`Document`], encoded to bytes and loaded back.
//!
//! # Quick Start
//!
//! ```rust
//! use drawio::{DiagramOption, Document, EncodeOptions};
//!
//! let mut doc = Document::new(
//!     400,
//!     300,
//!     "Page-1",
//!     [DiagramOption::GridSize(20), DiagramOption::Shadow(true)],
//! );
//! let a = doc.add_circle(40, 40, 80);
//! let b = doc.add_square(200, 40, 120, 80);
//! let edge = doc.add_edge(&a, &b);
//!
//! // Packed page body (the default), as the editor saves it
//! let bytes = doc.encode(&EncodeOptions::new()).unwrap();
//!
//! let loaded = Document::load(&bytes).unwrap();
//! assert_eq!(loaded.model(), doc.model());
//! assert!(loaded.cell(&edge).is_some_and(|c| c.is_edge()));
//! ```
//!
//! # Modules
//!
//! - [`model`]: document, graph and style types, plus the builder
//! - [`codec`]: the page body pipeline, attribute codecs and XML tree
//! - [`error`]: error types
//! - [`limits`]: limits applied while decoding
//! - [`util`]: timestamps and the injectable clock
//!
//! # Wire Format
//!
//! A page body is either a nested `mxGraphModel` element (raw) or that
//! element serialized, percent-escaped, raw-deflated and base64-encoded into
//! the text of the `diagram` element (packed). Both forms are read
//! transparently; the form written is chosen per call with
//! [`EncodeOptions`].
//!
//! # Security
//!
//! Input size, inflated body size and cell count are bounded by [`limits`].
//! Any failure rejects the whole document; there is no partial decode.

pub mod codec;
pub mod error;
pub mod limits;
pub mod model;
pub mod util;

// Re-export commonly used types at crate root
pub use codec::{BodyForm, EncodeOptions, decode_file, encode_file, pack, unpack};
pub use error::{DecodeError, DecodeStage, EncodeError};
pub use model::{
    Appearance, Cell, CellId, CellRole, DiagramOption, DiagramOptions, Document, DocumentBuilder,
    File, Geometry, GraphModel, IdSource, Page, PageBody, RandomIds, SeededIds, StyleMap,
};
pub use util::{Clock, FixedClock, SystemClock};

/// Crate version.
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
