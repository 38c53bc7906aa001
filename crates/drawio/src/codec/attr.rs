//! Attribute codecs and field tables.
//!
//! Each element type declares a static table of [`Field`]s: the wire name,
//! how to read and write the value, and when to omit it. [`write_attrs`] and
//! [`read_attrs`] walk a table to (de)serialize every attribute of one
//! element.
//!
//! Value encodings:
//! - integers: decimal text, optionally omitted when zero
//! - booleans: `"1"` / `"0"`; anything other than `"1"` reads as false
//! - tri-state flags: like booleans, but `None` is omitted
//! - style maps: `key` or `key=value` fragments joined with `;`

use std::borrow::Cow;

use log::trace;
use quick_xml::escape::escape;
use quick_xml::events::BytesStart;
use quick_xml::events::attributes::Attribute;
use quick_xml::name::QName;

use crate::error::DecodeError;
use crate::model::StyleMap;

// =============================================================================
// VALUE CODECS
// =============================================================================

/// Encodes a boolean as `"1"` or `"0"`.
pub fn encode_flag(value: bool) -> &'static str {
    if value { "1" } else { "0" }
}

/// Decodes a boolean attribute: exactly `"1"` is true, everything else false.
pub fn decode_flag(raw: &str) -> bool {
    raw == "1"
}

/// Encodes a style map, keys sorted.
pub fn encode_style(style: &StyleMap) -> String {
    let mut entries: Vec<(&str, &str)> = style.iter().collect();
    entries.sort_unstable_by(|a, b| a.0.cmp(b.0));

    let fragments: Vec<Cow<'_, str>> = entries
        .into_iter()
        .map(|(key, value)| {
            if value.is_empty() {
                Cow::Borrowed(key)
            } else {
                Cow::Owned(format!("{key}={value}"))
            }
        })
        .collect();
    fragments.join(";")
}

/// Decodes a style string.
///
/// Fragments split on the first `=`; a fragment without one is a bare flag.
/// Empty fragments (such as the one after a trailing `;`) are skipped.
pub fn decode_style(raw: &str) -> StyleMap {
    raw.split(';')
        .filter(|fragment| !fragment.is_empty())
        .map(|fragment| fragment.split_once('=').unwrap_or((fragment, "")))
        .collect()
}

fn decode_int(attribute: &'static str, raw: &str) -> Result<i32, DecodeError> {
    let trimmed = raw.trim();
    if trimmed.is_empty() {
        return Ok(0);
    }
    trimmed.parse().map_err(|_| DecodeError::InvalidNumber {
        attribute,
        value: raw.to_string(),
    })
}

// =============================================================================
// FIELD TABLES
// =============================================================================

/// How a field reads and writes its value on `T`.
pub enum Accessor<T> {
    /// Integer; omitted when zero if `omit_zero` is set.
    Int {
        get: fn(&T) -> i32,
        set: fn(&mut T, i32),
        omit_zero: bool,
    },
    /// Boolean, always written.
    Bool {
        get: fn(&T) -> bool,
        set: fn(&mut T, bool),
    },
    /// Tri-state boolean, omitted when `None`.
    Flag {
        get: fn(&T) -> Option<bool>,
        set: fn(&mut T, bool),
    },
    /// Text, always written.
    Text {
        get: fn(&T) -> &str,
        set: fn(&mut T, String),
    },
    /// Optional text, omitted when `None` or empty.
    OptText {
        get: fn(&T) -> Option<&str>,
        set: fn(&mut T, String),
    },
    /// Style map, omitted when empty.
    Style {
        get: fn(&T) -> &StyleMap,
        set: fn(&mut T, StyleMap),
    },
}

/// One attribute of an element.
pub struct Field<T> {
    /// Attribute name on the wire.
    pub name: &'static str,
    pub accessor: Accessor<T>,
}

impl<T> Field<T> {
    pub const fn int(name: &'static str, get: fn(&T) -> i32, set: fn(&mut T, i32)) -> Self {
        Self {
            name,
            accessor: Accessor::Int { get, set, omit_zero: false },
        }
    }

    pub const fn int_omit_zero(
        name: &'static str,
        get: fn(&T) -> i32,
        set: fn(&mut T, i32),
    ) -> Self {
        Self {
            name,
            accessor: Accessor::Int { get, set, omit_zero: true },
        }
    }

    pub const fn bool(name: &'static str, get: fn(&T) -> bool, set: fn(&mut T, bool)) -> Self {
        Self {
            name,
            accessor: Accessor::Bool { get, set },
        }
    }

    pub const fn flag(
        name: &'static str,
        get: fn(&T) -> Option<bool>,
        set: fn(&mut T, bool),
    ) -> Self {
        Self {
            name,
            accessor: Accessor::Flag { get, set },
        }
    }

    pub const fn text(name: &'static str, get: fn(&T) -> &str, set: fn(&mut T, String)) -> Self {
        Self {
            name,
            accessor: Accessor::Text { get, set },
        }
    }

    pub const fn opt_text(
        name: &'static str,
        get: fn(&T) -> Option<&str>,
        set: fn(&mut T, String),
    ) -> Self {
        Self {
            name,
            accessor: Accessor::OptText { get, set },
        }
    }

    pub const fn style(
        name: &'static str,
        get: fn(&T) -> &StyleMap,
        set: fn(&mut T, StyleMap),
    ) -> Self {
        Self {
            name,
            accessor: Accessor::Style { get, set },
        }
    }
}

/// Returns the wire text of one field, or `None` if it is omitted.
pub fn encode_attr<'a, T>(field: &Field<T>, value: &'a T) -> Option<Cow<'a, str>> {
    match field.accessor {
        Accessor::Int { get, omit_zero, .. } => {
            let n = get(value);
            if omit_zero && n == 0 {
                None
            } else {
                Some(Cow::Owned(n.to_string()))
            }
        }
        Accessor::Bool { get, .. } => Some(Cow::Borrowed(encode_flag(get(value)))),
        Accessor::Flag { get, .. } => get(value).map(|b| Cow::Borrowed(encode_flag(b))),
        Accessor::Text { get, .. } => Some(Cow::Borrowed(get(value))),
        Accessor::OptText { get, .. } => get(value).filter(|s| !s.is_empty()).map(Cow::Borrowed),
        Accessor::Style { get, .. } => {
            let style = get(value);
            if style.is_empty() {
                None
            } else {
                Some(Cow::Owned(encode_style(style)))
            }
        }
    }
}

/// Applies the wire text of one field to `target`.
pub fn decode_attr<T>(field: &Field<T>, target: &mut T, raw: &str) -> Result<(), DecodeError> {
    match field.accessor {
        Accessor::Int { set, .. } => set(target, decode_int(field.name, raw)?),
        Accessor::Bool { set, .. } | Accessor::Flag { set, .. } => set(target, decode_flag(raw)),
        Accessor::Text { set, .. } => set(target, raw.to_string()),
        Accessor::OptText { set, .. } => {
            if !raw.is_empty() {
                set(target, raw.to_string());
            }
        }
        Accessor::Style { set, .. } => set(target, decode_style(raw)),
    }
    Ok(())
}

/// Escapes text for a quoted attribute value.
///
/// Line feeds, carriage returns and tabs become character references, since
/// XML readers normalize literal ones to spaces.
pub fn escape_attr(text: &str) -> Cow<'_, str> {
    let escaped = escape(text);
    if !escaped.contains(['\n', '\r', '\t']) {
        return escaped;
    }
    let mut out = String::with_capacity(escaped.len() + 8);
    for ch in escaped.chars() {
        match ch {
            '\n' => out.push_str("&#xA;"),
            '\r' => out.push_str("&#xD;"),
            '\t' => out.push_str("&#x9;"),
            ch => out.push(ch),
        }
    }
    Cow::Owned(out)
}

/// Writes every non-omitted field of `value` as an attribute of `start`.
pub fn write_attrs<T>(start: &mut BytesStart<'_>, value: &T, fields: &[Field<T>]) {
    for field in fields {
        if let Some(text) = encode_attr(field, value) {
            let escaped = escape_attr(&text).into_owned();
            start.push_attribute(Attribute {
                key: QName(field.name.as_bytes()),
                value: Cow::Owned(escaped.into_bytes()),
            });
        }
    }
}

/// Reads the attributes of `start` into `target`.
///
/// Attributes without a field in the table are ignored.
pub fn read_attrs<T>(
    start: &BytesStart<'_>,
    target: &mut T,
    fields: &[Field<T>],
) -> Result<(), DecodeError> {
    for attr in start.attributes() {
        let attr = attr.map_err(|e| DecodeError::Xml(e.to_string()))?;
        let key = attr.key.as_ref();
        let Some(field) = fields.iter().find(|f| f.name.as_bytes() == key) else {
            let name = String::from_utf8_lossy(key);
            trace!(attribute = &*name; "Ignoring unknown attribute");
            continue;
        };
        let raw = attr
            .unescape_value()
            .map_err(|e| DecodeError::Xml(e.to_string()))?;
        decode_attr(field, target, &raw)?;
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use proptest::prelude::*;

    use super::*;

    #[derive(Debug, Default, PartialEq)]
    struct Widget {
        size: i32,
        offset: i32,
        enabled: bool,
        visible: Option<bool>,
        label: String,
        note: Option<String>,
        style: StyleMap,
    }

    const WIDGET_FIELDS: &[Field<Widget>] = &[
        Field::int("size", |p: &Widget| p.size, |p, v| p.size = v),
        Field::int_omit_zero("offset", |p: &Widget| p.offset, |p, v| p.offset = v),
        Field::bool("enabled", |p: &Widget| p.enabled, |p, v| p.enabled = v),
        Field::flag("visible", |p: &Widget| p.visible, |p, v| p.visible = Some(v)),
        Field::text("label", |p: &Widget| p.label.as_str(), |p, v| p.label = v),
        Field::opt_text("note", |p: &Widget| p.note.as_deref(), |p, v| p.note = Some(v)),
        Field::style("style", |p: &Widget| &p.style, |p, v| p.style = v),
    ];

    fn encoded(widget: &Widget) -> Vec<(&'static str, String)> {
        WIDGET_FIELDS
            .iter()
            .filter_map(|f| encode_attr(f, widget).map(|v| (f.name, v.into_owned())))
            .collect()
    }

    fn split_set(style: &str) -> Vec<String> {
        let mut fragments: Vec<String> = style.split(';').map(str::to_string).collect();
        fragments.sort();
        fragments
    }

    #[test]
    fn test_flag_codec() {
        assert_eq!(encode_flag(true), "1");
        assert_eq!(encode_flag(false), "0");
        assert!(decode_flag("1"));
        for raw in ["0", "", "true", "yes", " 1", "2"] {
            assert!(!decode_flag(raw), "{raw:?} should read as false");
        }
    }

    #[test]
    fn test_style_encode_fragments() {
        let style: StyleMap = [("ellipse", ""), ("aspect", "fixed"), ("html", "1")]
            .into_iter()
            .collect();
        let encoded = encode_style(&style);
        assert_eq!(split_set(&encoded), vec!["aspect=fixed", "ellipse", "html=1"]);
        assert_eq!(encoded, "aspect=fixed;ellipse;html=1");
    }

    #[test]
    fn test_style_decode() {
        let style = decode_style("ellipse;whiteSpace=wrap;html=1;");
        assert_eq!(style.len(), 3);
        assert_eq!(style.get("ellipse"), Some(""));
        assert_eq!(style.get("whiteSpace"), Some("wrap"));
        assert_eq!(style.get("html"), Some("1"));
    }

    #[test]
    fn test_style_splits_on_first_equals() {
        let style = decode_style("image=data:image/png,abc=;shape=image");
        assert_eq!(style.get("image"), Some("data:image/png,abc="));
        assert_eq!(style.get("shape"), Some("image"));
    }

    #[test]
    fn test_style_empty() {
        assert!(decode_style("").is_empty());
        assert!(decode_style(";;").is_empty());
        assert_eq!(encode_style(&StyleMap::new()), "");
    }

    #[test]
    fn test_omission_rules() {
        let widget = Widget::default();
        assert_eq!(
            encoded(&widget),
            vec![("size", "0".to_string()), ("enabled", "0".to_string()), ("label", String::new())]
        );

        let widget = Widget {
            size: 3,
            offset: -2,
            enabled: true,
            visible: Some(false),
            label: "x".into(),
            note: Some("n".into()),
            style: StyleMap::parse("rounded=0"),
        };
        assert_eq!(
            encoded(&widget),
            vec![
                ("size", "3".to_string()),
                ("offset", "-2".to_string()),
                ("enabled", "1".to_string()),
                ("visible", "0".to_string()),
                ("label", "x".to_string()),
                ("note", "n".to_string()),
                ("style", "rounded=0".to_string()),
            ]
        );
    }

    #[test]
    fn test_empty_opt_text_omitted() {
        let widget = Widget { note: Some(String::new()), ..Widget::default() };
        assert!(encoded(&widget).iter().all(|(name, _)| *name != "note"));
    }

    #[test]
    fn test_decode_attrs() {
        let mut widget = Widget::default();
        let field = |name: &str| WIDGET_FIELDS.iter().find(|f| f.name == name).unwrap();

        decode_attr(field("size"), &mut widget, " 42 ").unwrap();
        decode_attr(field("offset"), &mut widget, "").unwrap();
        decode_attr(field("enabled"), &mut widget, "1").unwrap();
        decode_attr(field("visible"), &mut widget, "false").unwrap();
        decode_attr(field("note"), &mut widget, "").unwrap();
        decode_attr(field("style"), &mut widget, "html=1").unwrap();

        assert_eq!(widget.size, 42);
        assert_eq!(widget.offset, 0);
        assert!(widget.enabled);
        assert_eq!(widget.visible, Some(false));
        assert_eq!(widget.note, None);
        assert_eq!(widget.style.get("html"), Some("1"));
    }

    #[test]
    fn test_invalid_number() {
        let mut widget = Widget::default();
        let err = decode_attr(&WIDGET_FIELDS[0], &mut widget, "10.5").unwrap_err();
        assert_eq!(
            err,
            DecodeError::InvalidNumber { attribute: "size", value: "10.5".into() }
        );
    }

    #[test]
    fn test_write_and_read_attrs() {
        let widget = Widget {
            size: 7,
            visible: Some(true),
            label: "a \"quoted\" <label> & more".into(),
            style: StyleMap::parse("ellipse;aspect=fixed"),
            ..Widget::default()
        };
        let mut start = BytesStart::new("widget");
        write_attrs(&mut start, &widget, WIDGET_FIELDS);
        start.push_attribute(("unknown", "ignored"));

        let mut decoded = Widget::default();
        read_attrs(&start, &mut decoded, WIDGET_FIELDS).unwrap();
        assert_eq!(decoded, widget);
    }

    #[test]
    fn test_escape_attr_whitespace() {
        assert_eq!(escape_attr("plain"), "plain");
        assert_eq!(escape_attr("a\nb\r\tc"), "a&#xA;b&#xD;&#x9;c");
        assert_eq!(escape_attr("<x> & \"y\"\n"), "&lt;x&gt; &amp; &quot;y&quot;&#xA;");
    }

    #[test]
    fn test_multiline_attr_written_as_references() {
        let widget = Widget { label: "first\nsecond\tthird\r".into(), ..Widget::default() };
        let mut start = BytesStart::new("widget");
        write_attrs(&mut start, &widget, WIDGET_FIELDS);

        let raw = String::from_utf8(start.to_vec()).unwrap();
        assert!(raw.contains(r#"label="first&#xA;second&#x9;third&#xD;""#), "{raw}");
        assert!(!raw.contains(['\n', '\r', '\t']));

        let mut decoded = Widget::default();
        read_attrs(&start, &mut decoded, WIDGET_FIELDS).unwrap();
        assert_eq!(decoded, widget);
    }

    fn style_key() -> impl Strategy<Value = String> {
        "[a-zA-Z][a-zA-Z0-9.]{0,12}"
    }

    proptest! {
        #[test]
        fn style_roundtrip(
            entries in proptest::collection::hash_map(style_key(), "[a-zA-Z0-9#,. ]{0,10}", 0..8)
        ) {
            let style: StyleMap = entries.into_iter().collect();
            prop_assert_eq!(decode_style(&encode_style(&style)), style);
        }

        #[test]
        fn style_encoding_is_sorted(
            entries in proptest::collection::hash_map(style_key(), "[a-z0-9]{0,4}", 1..8)
        ) {
            let style: StyleMap = entries.into_iter().collect();
            let encoded = encode_style(&style);
            let keys: Vec<&str> = encoded.split(';').map(|f| f.split('=').next().unwrap_or(f)).collect();
            let mut sorted = keys.clone();
            sorted.sort_unstable();
            prop_assert_eq!(keys, sorted);
        }
    }
}
