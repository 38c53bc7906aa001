//! Document construction and editing.
//!
//! [`Document`] wraps a [`File`] with the state needed to grow it: a
//! document id that prefixes every generated cell id, a shape counter, and
//! the injected clock. Ids come from an [`IdSource`] drawn once at creation.
//!
//! # Example
//!
//! ```rust
//! use drawio::{DiagramOption, Document, EncodeOptions};
//!
//! let mut doc = Document::new(800, 600, "Page-1", [DiagramOption::GridSize(20)]);
//! let a = doc.add_circle(40, 40, 80);
//! let b = doc.add_square(240, 40, 120, 60);
//! doc.add_edge(&a, &b);
//!
//! let bytes = doc.encode(&EncodeOptions::raw()).unwrap();
//! let text = String::from_utf8(bytes).unwrap();
//! assert!(text.contains(&a));
//! ```

use std::fmt;

use chrono::{DateTime, Utc};
use lazy_static::lazy_static;
use log::debug;

use crate::codec::{EncodeOptions, decode_file, encode_file, encode_model};
use crate::error::{DecodeError, EncodeError};
use crate::model::id::{IdSource, RandomIds, content_fingerprint};
use crate::model::{
    Appearance, Cell, CellId, CellRole, DiagramOption, File, Geometry, GraphModel, LAYER_CELL_ID,
    StyleMap,
};
use crate::util::datetime::{Clock, SystemClock, format_timestamp, parse_timestamp};

lazy_static! {
    /// Style of [`Document::add_circle`] shapes.
    pub static ref CIRCLE_STYLE: StyleMap =
        [("ellipse", ""), ("aspect", "fixed"), ("html", "1")].into_iter().collect();

    /// Style of [`Document::add_square`] shapes.
    pub static ref SQUARE_STYLE: StyleMap = [("html", "1"), ("rounded", "0")].into_iter().collect();

    /// Style of [`Document::add_edge`] connectors.
    pub static ref EDGE_STYLE: StyleMap = [
        ("edgeStyle", "orthogonalEdgeStyle"),
        ("html", "1"),
        ("rounded", "0"),
    ]
    .into_iter()
    .collect();
}

/// A single-page diagram document.
pub struct Document {
    id: String,
    shape_count: u64,
    width: i32,
    height: i32,
    appearance: Appearance,
    file: File,
    clock: Box<dyn Clock + Send>,
}

impl Document {
    /// Creates a document with random ids and the system clock.
    pub fn new(
        width: i32,
        height: i32,
        name: impl Into<String>,
        options: impl IntoIterator<Item = DiagramOption>,
    ) -> Self {
        Self::builder(width, height, name).options(options).build()
    }

    /// Starts building a document.
    pub fn builder(width: i32, height: i32, name: impl Into<String>) -> DocumentBuilder {
        DocumentBuilder::new(width, height, name)
    }

    /// Loads a document with random ids and the system clock.
    pub fn load(bytes: &[u8]) -> Result<Self, DecodeError> {
        Self::load_with(bytes, RandomIds, SystemClock)
    }

    /// Loads a document.
    ///
    /// Width and height come from the page size, the name from the page.
    /// The loaded document gets a fresh id from `ids`, so cells added later
    /// cannot collide with cells already in the file.
    pub fn load_with(
        bytes: &[u8],
        mut ids: impl IdSource,
        clock: impl Clock + Send + 'static,
    ) -> Result<Self, DecodeError> {
        let file = decode_file(bytes)?;
        let id = ids.next_id();
        let width = file.page.model.page_width;
        let height = file.page.model.page_height;
        debug!(
            id = id.as_str(),
            page = file.page.name.as_str(),
            cells = file.page.model.cells.len(),
            len = bytes.len();
            "Loaded document"
        );

        Ok(Self {
            id,
            shape_count: 0,
            width,
            height,
            appearance: Appearance::default(),
            file,
            clock: Box::new(clock),
        })
    }

    // =========================================================================
    // Accessors
    // =========================================================================

    /// Prefix of the cell ids this document generates.
    pub fn id(&self) -> &str {
        &self.id
    }

    pub fn width(&self) -> i32 {
        self.width
    }

    pub fn height(&self) -> i32 {
        self.height
    }

    pub fn page_name(&self) -> &str {
        &self.file.page.name
    }

    pub fn file(&self) -> &File {
        &self.file
    }

    pub fn model(&self) -> &GraphModel {
        &self.file.page.model
    }

    /// Mutable access to the graph model for edits the shape methods do not
    /// cover.
    pub fn model_mut(&mut self) -> &mut GraphModel {
        &mut self.file.page.model
    }

    pub fn cell(&self, id: &str) -> Option<&Cell> {
        self.model().cell(id)
    }

    /// Settings that are accepted but not written to the file.
    pub fn appearance(&self) -> &Appearance {
        &self.appearance
    }

    /// The `modified` timestamp, if it parses.
    pub fn modified_at(&self) -> Option<DateTime<Utc>> {
        parse_timestamp(&self.file.modified).ok()
    }

    // =========================================================================
    // Shapes
    // =========================================================================

    /// Adds a circle of diameter `size` with its top-left corner at `(x, y)`.
    pub fn add_circle(&mut self, x: i32, y: i32, size: i32) -> CellId {
        self.add_vertex(CIRCLE_STYLE.clone(), Geometry::bounds(x, y, size, size))
    }

    /// Adds a rectangle.
    pub fn add_square(&mut self, x: i32, y: i32, width: i32, height: i32) -> CellId {
        self.add_vertex(SQUARE_STYLE.clone(), Geometry::bounds(x, y, width, height))
    }

    /// Adds a connector between two cells.
    ///
    /// The endpoints are not checked against the model.
    pub fn add_edge(&mut self, source: &str, target: &str) -> CellId {
        let id = self.next_cell_id();
        self.model_mut().cells.push(Cell {
            id: id.clone(),
            parent: Some(LAYER_CELL_ID.to_string()),
            style: EDGE_STYLE.clone(),
            source: Some(source.to_string()),
            target: Some(target.to_string()),
            role: Some(CellRole::Edge),
            geometry: Some(Geometry::relative()),
            ..Cell::default()
        });
        id
    }

    fn add_vertex(&mut self, style: StyleMap, geometry: Geometry) -> CellId {
        let id = self.next_cell_id();
        self.model_mut().cells.push(Cell {
            id: id.clone(),
            parent: Some(LAYER_CELL_ID.to_string()),
            style,
            role: Some(CellRole::Vertex),
            geometry: Some(geometry),
            ..Cell::default()
        });
        id
    }

    fn next_cell_id(&mut self) -> CellId {
        let id = format!("{}-{}", self.id, self.shape_count);
        self.shape_count += 1;
        id
    }

    // =========================================================================
    // Output
    // =========================================================================

    /// Encodes the document. The document itself is not modified.
    pub fn encode(&self, options: &EncodeOptions) -> Result<Vec<u8>, EncodeError> {
        let bytes = encode_file(&self.file, options)?;
        debug!(
            id = self.id.as_str(),
            body:? = options.body,
            cells = self.model().cells.len(),
            len = bytes.len();
            "Encoded document"
        );
        Ok(bytes)
    }

    /// Recomputes the etag from the current model and stamps a new
    /// `modified` time.
    pub fn refresh_fingerprint(&mut self) -> Result<(), EncodeError> {
        let text = encode_model(self.model())?;
        self.file.etag = content_fingerprint(text.as_bytes());
        self.file.modified = format_timestamp(self.clock.now());
        Ok(())
    }
}

impl fmt::Debug for Document {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Document")
            .field("id", &self.id)
            .field("shape_count", &self.shape_count)
            .field("width", &self.width)
            .field("height", &self.height)
            .field("appearance", &self.appearance)
            .field("file", &self.file)
            .finish_non_exhaustive()
    }
}

/// Builder for a new [`Document`].
pub struct DocumentBuilder {
    width: i32,
    height: i32,
    name: String,
    options: Vec<DiagramOption>,
    ids: Box<dyn IdSource + Send>,
    clock: Box<dyn Clock + Send>,
}

impl DocumentBuilder {
    pub fn new(width: i32, height: i32, name: impl Into<String>) -> Self {
        Self {
            width,
            height,
            name: name.into(),
            options: Vec::new(),
            ids: Box::new(RandomIds),
            clock: Box::new(SystemClock),
        }
    }

    /// Adds one configuration setting.
    pub fn option(mut self, option: DiagramOption) -> Self {
        self.options.push(option);
        self
    }

    /// Adds several configuration settings, applied in order.
    pub fn options(mut self, options: impl IntoIterator<Item = DiagramOption>) -> Self {
        self.options.extend(options);
        self
    }

    /// Sets where the etag, page id and document id come from.
    pub fn id_source(mut self, ids: impl IdSource + Send + 'static) -> Self {
        self.ids = Box::new(ids);
        self
    }

    pub fn clock(mut self, clock: impl Clock + Send + 'static) -> Self {
        self.clock = Box::new(clock);
        self
    }

    /// Builds the document. Ids are drawn in the order etag, page id,
    /// document id.
    pub fn build(self) -> Document {
        let DocumentBuilder {
            width,
            height,
            name,
            options,
            mut ids,
            clock,
        } = self;

        let mut file = File::with_defaults();
        file.modified = format_timestamp(clock.now());
        file.etag = ids.next_id();
        file.page.id = ids.next_id();
        file.page.name = name;
        let id = ids.next_id();

        let mut appearance = Appearance::default();
        for option in options {
            option.apply(&mut file.page.model, &mut appearance);
        }
        debug!(id = id.as_str(), page = file.page.name.as_str(); "Created document");

        Document {
            id,
            shape_count: 0,
            width,
            height,
            appearance,
            file,
            clock,
        }
    }
}

impl fmt::Debug for DocumentBuilder {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("DocumentBuilder")
            .field("width", &self.width)
            .field("height", &self.height)
            .field("name", &self.name)
            .field("options", &self.options)
            .finish_non_exhaustive()
    }
}
