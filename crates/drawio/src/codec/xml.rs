//! The mxfile element tree.
//!
//! ```text
//! mxfile
//! └── diagram                  (exactly one page is read; extras are skipped)
//!     ├── mxGraphModel         raw body
//!     │   └── root
//!     │       └── mxCell*
//!     │           └── mxGeometry?
//!     └── "<blob>"             packed body (character data)
//! ```
//!
//! Attributes are driven by the field tables below, in wire order. Elements
//! and attributes outside the modeled subset are skipped on read.

use std::borrow::Cow;
use std::io::Write;

use log::{debug, trace};
use quick_xml::events::{BytesEnd, BytesStart, BytesText, Event};
use quick_xml::{Reader, Writer};

use crate::codec::EncodeOptions;
use crate::codec::attr::{Field, read_attrs, write_attrs};
use crate::error::{DecodeError, EncodeError};
use crate::limits::{MAX_CELLS, MAX_DOCUMENT_SIZE};
use crate::model::{Cell, CellRole, File, Geometry, GraphModel, Page, PageBody};

pub const FILE_TAG: &str = "mxfile";
pub const PAGE_TAG: &str = "diagram";
pub const MODEL_TAG: &str = "mxGraphModel";
pub const ROOT_TAG: &str = "root";
pub const CELL_TAG: &str = "mxCell";
pub const GEOMETRY_TAG: &str = "mxGeometry";

/// Names the close of a page in errors about surplus page content.
const PAGE_END: &str = "/diagram";

// =============================================================================
// FIELD TABLES
// =============================================================================

pub const FILE_FIELDS: &[Field<File>] = &[
    Field::text("host", |f: &File| f.host.as_str(), |f, v| f.host = v),
    Field::text("modified", |f: &File| f.modified.as_str(), |f, v| f.modified = v),
    Field::text("agent", |f: &File| f.agent.as_str(), |f, v| f.agent = v),
    Field::text("etag", |f: &File| f.etag.as_str(), |f, v| f.etag = v),
    Field::text("version", |f: &File| f.version.as_str(), |f, v| f.version = v),
    Field::text("type", |f: &File| f.file_type.as_str(), |f, v| f.file_type = v),
];

pub const PAGE_FIELDS: &[Field<Page>] = &[
    Field::text("id", |p: &Page| p.id.as_str(), |p, v| p.id = v),
    Field::text("name", |p: &Page| p.name.as_str(), |p, v| p.name = v),
];

pub const GRAPH_MODEL_FIELDS: &[Field<GraphModel>] = &[
    Field::int("dx", |m: &GraphModel| m.dx, |m, v| m.dx = v),
    Field::int("dy", |m: &GraphModel| m.dy, |m, v| m.dy = v),
    Field::flag("grid", |m: &GraphModel| m.grid, |m, v| m.grid = Some(v)),
    Field::int("gridSize", |m: &GraphModel| m.grid_size, |m, v| m.grid_size = v),
    Field::flag("guides", |m: &GraphModel| m.guides, |m, v| m.guides = Some(v)),
    Field::flag("tooltips", |m: &GraphModel| m.tooltips, |m, v| m.tooltips = Some(v)),
    Field::flag("connect", |m: &GraphModel| m.connect, |m, v| m.connect = Some(v)),
    Field::flag("arrows", |m: &GraphModel| m.arrows, |m, v| m.arrows = Some(v)),
    Field::flag("fold", |m: &GraphModel| m.fold, |m, v| m.fold = Some(v)),
    Field::flag("page", |m: &GraphModel| m.page, |m, v| m.page = Some(v)),
    Field::int("pageScale", |m: &GraphModel| m.page_scale, |m, v| m.page_scale = v),
    Field::int("pageWidth", |m: &GraphModel| m.page_width, |m, v| m.page_width = v),
    Field::int("pageHeight", |m: &GraphModel| m.page_height, |m, v| m.page_height = v),
    Field::bool("math", |m: &GraphModel| m.math, |m, v| m.math = v),
    Field::flag("shadow", |m: &GraphModel| m.shadow, |m, v| m.shadow = Some(v)),
];

pub const CELL_FIELDS: &[Field<Cell>] = &[
    Field::text("id", |c: &Cell| c.id.as_str(), |c, v| c.id = v),
    Field::opt_text("parent", |c: &Cell| c.parent.as_deref(), |c, v| c.parent = Some(v)),
    Field::opt_text("value", |c: &Cell| c.value.as_deref(), |c, v| c.value = Some(v)),
    Field::style("style", |c: &Cell| &c.style, |c, v| c.style = v),
    Field::opt_text("source", |c: &Cell| c.source.as_deref(), |c, v| c.source = Some(v)),
    Field::opt_text("target", |c: &Cell| c.target.as_deref(), |c, v| c.target = Some(v)),
    Field::flag("vertex", |c: &Cell| c.is_vertex().then_some(true), set_vertex),
    Field::flag("edge", |c: &Cell| c.is_edge().then_some(true), set_edge),
];

pub const GEOMETRY_FIELDS: &[Field<Geometry>] = &[
    Field::text("as", |g: &Geometry| g.purpose.as_str(), |g, v| g.purpose = v),
    Field::flag("relative", |g: &Geometry| g.relative, |g, v| g.relative = Some(v)),
    Field::int_omit_zero("x", |g: &Geometry| g.x, |g, v| g.x = v),
    Field::int_omit_zero("y", |g: &Geometry| g.y, |g, v| g.y = v),
    Field::int_omit_zero("width", |g: &Geometry| g.width, |g, v| g.width = v),
    Field::int_omit_zero("height", |g: &Geometry| g.height, |g, v| g.height = v),
];

fn set_vertex(cell: &mut Cell, value: bool) {
    if value {
        cell.role = Some(CellRole::Vertex);
    }
}

fn set_edge(cell: &mut Cell, value: bool) {
    if value {
        cell.role = Some(CellRole::Edge);
    }
}

// =============================================================================
// ENCODING
// =============================================================================

/// Encodes a document.
///
/// The page body form and indentation come from `options`; an empty indent
/// writes compact output. No XML declaration is written.
pub fn encode_file(file: &File, options: &EncodeOptions) -> Result<Vec<u8>, EncodeError> {
    let body = file.page.body(options.body)?;
    let mut writer = match options.indent.as_deref().filter(|indent| !indent.is_empty()) {
        None => Writer::new(Vec::new()),
        Some(indent) => {
            let (ch, size) = indent_unit(indent)?;
            Writer::new_with_indent(Vec::new(), ch, size)
        }
    };

    let mut start = BytesStart::new(FILE_TAG);
    write_attrs(&mut start, file, FILE_FIELDS);
    emit(&mut writer, Event::Start(start))?;

    let mut start = BytesStart::new(PAGE_TAG);
    write_attrs(&mut start, &file.page, PAGE_FIELDS);
    emit(&mut writer, Event::Start(start))?;
    match &body {
        PageBody::Raw(model) => write_model(&mut writer, model)?,
        PageBody::Packed(blob) => emit(&mut writer, Event::Text(BytesText::new(blob)))?,
    }
    emit(&mut writer, Event::End(BytesEnd::new(PAGE_TAG)))?;

    emit(&mut writer, Event::End(BytesEnd::new(FILE_TAG)))?;
    Ok(writer.into_inner())
}

/// Serializes a graph model on one line, as packed into a page body.
pub fn encode_model(model: &GraphModel) -> Result<String, EncodeError> {
    let mut writer = Writer::new(Vec::new());
    write_model(&mut writer, model)?;
    String::from_utf8(writer.into_inner()).map_err(|e| EncodeError::Xml(e.to_string()))
}

/// Splits an indent string into its character and repeat count.
fn indent_unit(indent: &str) -> Result<(u8, usize), EncodeError> {
    let unsupported = || EncodeError::UnsupportedIndent {
        indent: indent.to_string(),
    };
    let bytes = indent.as_bytes();
    let &first = bytes.first().ok_or_else(unsupported)?;
    if !matches!(first, b' ' | b'\t') || bytes.iter().any(|&b| b != first) {
        return Err(unsupported());
    }
    Ok((first, bytes.len()))
}

fn write_model<W: Write>(writer: &mut Writer<W>, model: &GraphModel) -> Result<(), EncodeError> {
    let mut start = BytesStart::new(MODEL_TAG);
    write_attrs(&mut start, model, GRAPH_MODEL_FIELDS);
    emit(writer, Event::Start(start))?;
    emit(writer, Event::Start(BytesStart::new(ROOT_TAG)))?;

    for cell in &model.cells {
        let mut start = BytesStart::new(CELL_TAG);
        write_attrs(&mut start, cell, CELL_FIELDS);
        match &cell.geometry {
            None => emit(writer, Event::Empty(start))?,
            Some(geometry) => {
                emit(writer, Event::Start(start))?;
                let mut geo = BytesStart::new(GEOMETRY_TAG);
                write_attrs(&mut geo, geometry, GEOMETRY_FIELDS);
                emit(writer, Event::Empty(geo))?;
                emit(writer, Event::End(BytesEnd::new(CELL_TAG)))?;
            }
        }
    }

    emit(writer, Event::End(BytesEnd::new(ROOT_TAG)))?;
    emit(writer, Event::End(BytesEnd::new(MODEL_TAG)))
}

fn emit<W: Write>(writer: &mut Writer<W>, event: Event<'_>) -> Result<(), EncodeError> {
    writer
        .write_event(event)
        .map_err(|e| EncodeError::Xml(e.to_string()))
}

// =============================================================================
// DECODING
// =============================================================================

/// Decodes a document. Packed page bodies are unpacked and parsed.
///
/// Only the first page is read.
pub fn decode_file(input: &[u8]) -> Result<File, DecodeError> {
    if input.len() > MAX_DOCUMENT_SIZE {
        return Err(DecodeError::LengthExceedsLimit {
            field: "document",
            len: input.len(),
            max: MAX_DOCUMENT_SIZE,
        });
    }

    let mut reader = Reader::from_reader(input);
    let (start, empty) = first_element(&mut reader, FILE_TAG)?;

    let mut file = File::default();
    read_attrs(&start, &mut file, FILE_FIELDS)?;
    if empty {
        return Err(DecodeError::MissingElement { element: PAGE_TAG });
    }

    let mut page = None;
    loop {
        match next_event(&mut reader)? {
            Event::Start(start) if is(&start, PAGE_TAG) => {
                if page.is_some() {
                    debug!("Skipping additional page");
                    skip(&mut reader, &start)?;
                } else {
                    page = Some(read_page(&mut reader, &start)?);
                }
            }
            Event::Empty(start) if is(&start, PAGE_TAG) && page.is_none() => {
                return Err(DecodeError::MissingElement { element: MODEL_TAG });
            }
            Event::Start(start) => skip_unknown(&mut reader, &start)?,
            Event::End(_) => break,
            Event::Eof => return Err(unexpected_eof(FILE_TAG)),
            _ => {}
        }
    }

    file.page = page.ok_or(DecodeError::MissingElement { element: PAGE_TAG })?;
    Ok(file)
}

/// Parses a serialized graph model (the text inside a packed body).
pub fn decode_model(text: &str) -> Result<GraphModel, DecodeError> {
    let mut reader = Reader::from_str(text);
    let (start, empty) = first_element(&mut reader, MODEL_TAG)?;
    read_model(&mut reader, &start, empty)
}

fn read_page(reader: &mut Reader<&[u8]>, start: &BytesStart<'_>) -> Result<Page, DecodeError> {
    let mut page = Page::default();
    read_attrs(start, &mut page, PAGE_FIELDS)?;

    let mut raw = None;
    let mut text = String::new();
    loop {
        match next_event(reader)? {
            Event::Start(start) | Event::Empty(start)
                if is(&start, MODEL_TAG) && raw.is_some() =>
            {
                return Err(DecodeError::UnexpectedElement {
                    expected: PAGE_END,
                    found: element_name(&start),
                });
            }
            Event::Start(start) if is(&start, MODEL_TAG) => {
                raw = Some(read_model(reader, &start, false)?);
            }
            Event::Empty(start) if is(&start, MODEL_TAG) => {
                raw = Some(read_model(reader, &start, true)?);
            }
            Event::Start(start) | Event::Empty(start) => {
                return Err(DecodeError::UnexpectedElement {
                    expected: MODEL_TAG,
                    found: element_name(&start),
                });
            }
            Event::Text(chunk) => {
                let chunk = chunk.unescape().map_err(xml_error)?;
                text.push_str(&chunk);
            }
            Event::CData(chunk) => {
                let chunk = std::str::from_utf8(&chunk)
                    .map_err(|_| DecodeError::InvalidUtf8 { context: "page body" })?;
                text.push_str(chunk);
            }
            Event::End(_) => break,
            Event::Eof => return Err(unexpected_eof(PAGE_TAG)),
            _ => {}
        }
    }

    let blank = text.trim().is_empty();
    let body = match raw {
        Some(model) if blank => PageBody::Raw(Cow::Owned(model)),
        // A raw model and a packed blob in the same page.
        Some(_) => {
            return Err(DecodeError::UnexpectedElement {
                expected: PAGE_END,
                found: "text".to_string(),
            });
        }
        None if !blank => PageBody::Packed(Cow::Owned(text)),
        None => return Err(DecodeError::MissingElement { element: MODEL_TAG }),
    };
    trace!(page = page.id.as_str(), form:? = body.form(); "Read page body");
    page.model = body.resolve()?;
    Ok(page)
}

fn read_model(
    reader: &mut Reader<&[u8]>,
    start: &BytesStart<'_>,
    empty: bool,
) -> Result<GraphModel, DecodeError> {
    let mut model = GraphModel::default();
    read_attrs(start, &mut model, GRAPH_MODEL_FIELDS)?;
    if empty {
        return Ok(model);
    }

    loop {
        match next_event(reader)? {
            Event::Start(start) if is(&start, ROOT_TAG) => read_cells(reader, &mut model.cells)?,
            Event::Start(start) => skip_unknown(reader, &start)?,
            Event::End(_) => break,
            Event::Eof => return Err(unexpected_eof(MODEL_TAG)),
            _ => {}
        }
    }
    Ok(model)
}

fn read_cells(reader: &mut Reader<&[u8]>, cells: &mut Vec<Cell>) -> Result<(), DecodeError> {
    loop {
        let (start, empty) = match next_event(reader)? {
            Event::Start(start) if is(&start, CELL_TAG) => (start, false),
            Event::Empty(start) if is(&start, CELL_TAG) => (start, true),
            Event::Start(start) => {
                skip_unknown(reader, &start)?;
                continue;
            }
            Event::End(_) => return Ok(()),
            Event::Eof => return Err(unexpected_eof(ROOT_TAG)),
            _ => continue,
        };

        if cells.len() >= MAX_CELLS {
            return Err(DecodeError::LengthExceedsLimit {
                field: "cells",
                len: cells.len() + 1,
                max: MAX_CELLS,
            });
        }
        cells.push(read_cell(reader, &start, empty)?);
    }
}

fn read_cell(
    reader: &mut Reader<&[u8]>,
    start: &BytesStart<'_>,
    empty: bool,
) -> Result<Cell, DecodeError> {
    let mut cell = Cell::default();
    read_attrs(start, &mut cell, CELL_FIELDS)?;
    if cell.id.is_empty() {
        return Err(DecodeError::MissingAttribute {
            element: CELL_TAG,
            attribute: "id",
        });
    }
    if empty {
        return Ok(cell);
    }

    loop {
        match next_event(reader)? {
            Event::Start(start) if is(&start, GEOMETRY_TAG) => {
                cell.geometry = Some(read_geometry(&start)?);
                // Points and waypoints are not modeled.
                skip(reader, &start)?;
            }
            Event::Empty(start) if is(&start, GEOMETRY_TAG) => {
                cell.geometry = Some(read_geometry(&start)?);
            }
            Event::Start(start) => skip_unknown(reader, &start)?,
            Event::End(_) => return Ok(cell),
            Event::Eof => return Err(unexpected_eof(CELL_TAG)),
            _ => {}
        }
    }
}

fn read_geometry(start: &BytesStart<'_>) -> Result<Geometry, DecodeError> {
    let mut geometry = Geometry {
        purpose: String::new(),
        ..Geometry::default()
    };
    read_attrs(start, &mut geometry, GEOMETRY_FIELDS)?;
    Ok(geometry)
}

// =============================================================================
// READER HELPERS
// =============================================================================

/// Reads up to the document element and checks its name. Returns the start
/// tag and whether it was self-closing.
fn first_element<'i>(
    reader: &mut Reader<&'i [u8]>,
    expected: &'static str,
) -> Result<(BytesStart<'i>, bool), DecodeError> {
    loop {
        let (start, empty) = match next_event(reader)? {
            Event::Start(start) => (start, false),
            Event::Empty(start) => (start, true),
            Event::Eof => return Err(DecodeError::MissingElement { element: expected }),
            _ => continue,
        };
        if !is(&start, expected) {
            return Err(DecodeError::UnexpectedElement {
                expected,
                found: element_name(&start),
            });
        }
        return Ok((start, empty));
    }
}

fn next_event<'i>(reader: &mut Reader<&'i [u8]>) -> Result<Event<'i>, DecodeError> {
    reader.read_event().map_err(xml_error)
}

fn skip(reader: &mut Reader<&[u8]>, start: &BytesStart<'_>) -> Result<(), DecodeError> {
    reader.read_to_end(start.name()).map_err(xml_error)?;
    Ok(())
}

fn skip_unknown(reader: &mut Reader<&[u8]>, start: &BytesStart<'_>) -> Result<(), DecodeError> {
    trace!(element = element_name(start).as_str(); "Skipping unknown element");
    skip(reader, start)
}

fn is(start: &BytesStart<'_>, tag: &str) -> bool {
    start.name().as_ref() == tag.as_bytes()
}

fn element_name(start: &BytesStart<'_>) -> String {
    String::from_utf8_lossy(start.name().as_ref()).into_owned()
}

fn unexpected_eof(element: &str) -> DecodeError {
    DecodeError::Xml(format!("unexpected end of input inside <{element}>"))
}

fn xml_error(err: impl std::fmt::Display) -> DecodeError {
    DecodeError::Xml(err.to_string())
}
