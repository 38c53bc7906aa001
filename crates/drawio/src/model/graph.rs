//! Graph model types: the body of a page.

use crate::model::StyleMap;

/// Id of the root sentinel cell.
pub const ROOT_CELL_ID: &str = "0";

/// Id of the default layer sentinel cell.
pub const LAYER_CELL_ID: &str = "1";

/// Identifier of a cell within a graph model.
pub type CellId = String;

/// The `mxGraphModel` element: canvas settings plus the ordered cell list.
///
/// Tri-state flags are `None` when the attribute is absent. `Default` is the
/// all-absent state a decoder starts from; see
/// [`GraphModel::with_defaults`] for the settings of a new document.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct GraphModel {
    pub dx: i32,
    pub dy: i32,
    pub grid: Option<bool>,
    pub grid_size: i32,
    pub guides: Option<bool>,
    pub tooltips: Option<bool>,
    pub connect: Option<bool>,
    pub arrows: Option<bool>,
    pub fold: Option<bool>,
    pub page: Option<bool>,
    pub page_scale: i32,
    pub page_width: i32,
    pub page_height: i32,
    pub math: bool,
    pub shadow: Option<bool>,
    /// Cells in z-order.
    pub cells: Vec<Cell>,
}

impl GraphModel {
    /// Default grid spacing.
    pub const DEFAULT_GRID_SIZE: i32 = 10;
    /// A4 portrait.
    pub const DEFAULT_PAGE_WIDTH: i32 = 827;
    pub const DEFAULT_PAGE_HEIGHT: i32 = 1169;

    /// Returns the settings of a freshly created document, with both
    /// sentinel cells in place.
    pub fn with_defaults() -> Self {
        Self {
            dx: 0,
            dy: 0,
            grid: Some(true),
            grid_size: Self::DEFAULT_GRID_SIZE,
            guides: Some(true),
            tooltips: Some(true),
            connect: Some(true),
            arrows: Some(true),
            fold: Some(true),
            page: Some(true),
            page_scale: 1,
            page_width: Self::DEFAULT_PAGE_WIDTH,
            page_height: Self::DEFAULT_PAGE_HEIGHT,
            math: false,
            shadow: Some(false),
            cells: vec![Cell::root(), Cell::layer()],
        }
    }

    /// Looks up a cell by id.
    pub fn cell(&self, id: &str) -> Option<&Cell> {
        self.cells.iter().find(|c| c.id == id)
    }

    /// Returns true if both sentinel cells are present and the layer is
    /// parented to the root.
    pub fn has_sentinels(&self) -> bool {
        let root = self.cell(ROOT_CELL_ID).is_some();
        let layer = self
            .cell(LAYER_CELL_ID)
            .is_some_and(|c| c.parent.as_deref() == Some(ROOT_CELL_ID));
        root && layer
    }

    /// Iterates vertex cells.
    pub fn vertices(&self) -> impl Iterator<Item = &Cell> {
        self.cells.iter().filter(|c| c.role == Some(CellRole::Vertex))
    }

    /// Iterates edge cells.
    pub fn edges(&self) -> impl Iterator<Item = &Cell> {
        self.cells.iter().filter(|c| c.role == Some(CellRole::Edge))
    }
}

/// Whether a cell is drawn as a shape or a connector.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CellRole {
    Vertex,
    Edge,
}

/// The `mxCell` element.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Cell {
    pub id: CellId,
    pub parent: Option<CellId>,
    pub value: Option<String>,
    pub style: StyleMap,
    pub source: Option<CellId>,
    pub target: Option<CellId>,
    /// `None` for the sentinel cells.
    pub role: Option<CellRole>,
    pub geometry: Option<Geometry>,
}

impl Cell {
    /// The root sentinel cell.
    pub fn root() -> Self {
        Self {
            id: ROOT_CELL_ID.to_string(),
            ..Self::default()
        }
    }

    /// The default layer sentinel cell.
    pub fn layer() -> Self {
        Self {
            id: LAYER_CELL_ID.to_string(),
            parent: Some(ROOT_CELL_ID.to_string()),
            ..Self::default()
        }
    }

    pub fn is_vertex(&self) -> bool {
        self.role == Some(CellRole::Vertex)
    }

    pub fn is_edge(&self) -> bool {
        self.role == Some(CellRole::Edge)
    }
}

/// The `mxGeometry` element.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Geometry {
    /// Wire attribute `as`; always `"geometry"` for cell geometry.
    pub purpose: String,
    pub relative: Option<bool>,
    pub x: i32,
    pub y: i32,
    pub width: i32,
    pub height: i32,
}

impl Geometry {
    pub const PURPOSE: &'static str = "geometry";

    /// Absolute bounds.
    pub fn bounds(x: i32, y: i32, width: i32, height: i32) -> Self {
        Self {
            purpose: Self::PURPOSE.to_string(),
            relative: None,
            x,
            y,
            width,
            height,
        }
    }

    /// Relative geometry used by edges.
    pub fn relative() -> Self {
        Self {
            relative: Some(true),
            ..Self::bounds(0, 0, 0, 0)
        }
    }
}

impl Default for Geometry {
    fn default() -> Self {
        Self::bounds(0, 0, 0, 0)
    }
}
