//! Data model types for mxfile documents.
//!
//! - [`file`]: the outer `mxfile` document and its page
//! - [`graph`]: the graph model, cells and geometry
//! - [`style`]: cell style maps
//! - [`options`]: diagram configuration
//! - [`id`]: identifier and fingerprint generation
//! - [`builder`]: [`Document`], for creating and editing documents

pub mod builder;
pub mod file;
pub mod graph;
pub mod id;
pub mod options;
pub mod style;

pub use builder::{CIRCLE_STYLE, Document, DocumentBuilder, EDGE_STYLE, SQUARE_STYLE};
pub use file::{File, Page, PageBody};
pub use graph::{Cell, CellId, CellRole, Geometry, GraphModel, LAYER_CELL_ID, ROOT_CELL_ID};
pub use id::{IdSource, RandomIds, SeededIds, content_fingerprint};
pub use options::{Appearance, DiagramOption, DiagramOptions};
pub use style::StyleMap;
