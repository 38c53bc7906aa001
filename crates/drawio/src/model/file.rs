//! The outer `mxfile` document and its page.

use std::borrow::Cow;

use crate::codec::BodyForm;
use crate::codec::pack::{pack, unpack};
use crate::codec::xml::{decode_model, encode_model};
use crate::error::{DecodeError, EncodeError};
use crate::model::GraphModel;

/// Host written by new documents.
pub const DEFAULT_HOST: &str = "app.diagrams.net";
/// Agent written by new documents.
pub const DEFAULT_AGENT: &str = "5.0 (X11)";
/// Editor version written by new documents.
pub const DEFAULT_VERSION: &str = "17.4.2";
/// File type written by new documents.
pub const DEFAULT_FILE_TYPE: &str = "device";

/// The `mxfile` element: transport metadata plus a single page.
///
/// `Default` is the blank state a decoder starts from; see
/// [`File::with_defaults`] for the metadata of a new document.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct File {
    pub host: String,
    /// Last-modified timestamp as written on the wire.
    pub modified: String,
    pub agent: String,
    /// Opaque content fingerprint.
    pub etag: String,
    pub version: String,
    /// Wire attribute `type`.
    pub file_type: String,
    pub page: Page,
}

impl File {
    /// Returns the metadata of a new document, with a default page model.
    /// `modified`, `etag` and the page identity are left blank.
    pub fn with_defaults() -> Self {
        Self {
            host: DEFAULT_HOST.to_string(),
            agent: DEFAULT_AGENT.to_string(),
            version: DEFAULT_VERSION.to_string(),
            file_type: DEFAULT_FILE_TYPE.to_string(),
            page: Page {
                model: GraphModel::with_defaults(),
                ..Page::default()
            },
            ..Self::default()
        }
    }
}

/// The `diagram` element.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Page {
    pub id: String,
    pub name: String,
    pub model: GraphModel,
}

impl Page {
    /// Returns the page body in the requested wire form.
    pub fn body(&self, form: BodyForm) -> Result<PageBody<'_>, EncodeError> {
        match form {
            BodyForm::Raw => Ok(PageBody::Raw(Cow::Borrowed(&self.model))),
            BodyForm::Packed => {
                let text = encode_model(&self.model)?;
                Ok(PageBody::Packed(Cow::Owned(pack(&text)?)))
            }
        }
    }
}

/// Body of a `diagram` element as it appears on the wire.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PageBody<'a> {
    /// A literal nested `mxGraphModel` element.
    Raw(Cow<'a, GraphModel>),
    /// The serialized model run through [`pack`].
    Packed(Cow<'a, str>),
}

impl PageBody<'_> {
    pub fn form(&self) -> BodyForm {
        match self {
            PageBody::Raw(_) => BodyForm::Raw,
            PageBody::Packed(_) => BodyForm::Packed,
        }
    }

    /// Resolves the body to a graph model, unpacking if necessary.
    pub fn resolve(self) -> Result<GraphModel, DecodeError> {
        match self {
            PageBody::Raw(model) => Ok(model.into_owned()),
            PageBody::Packed(blob) => {
                let text = unpack(&blob)?;
                decode_model(&text)
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::DecodeStage;

    fn sample_page() -> Page {
        Page {
            id: "page-1".into(),
            name: "Page-1".into(),
            model: GraphModel::with_defaults(),
        }
    }

    #[test]
    fn test_file_defaults() {
        assert_eq!(File::default().host, "");

        let file = File::with_defaults();
        assert_eq!(file.host, "app.diagrams.net");
        assert_eq!(file.agent, "5.0 (X11)");
        assert_eq!(file.version, "17.4.2");
        assert_eq!(file.file_type, "device");
        assert!(file.page.model.has_sentinels());
    }

    #[test]
    fn test_raw_body_borrows_model() {
        let page = sample_page();
        let body = page.body(BodyForm::Raw).unwrap();
        assert!(matches!(body, PageBody::Raw(Cow::Borrowed(_))));
        assert_eq!(body.resolve().unwrap(), page.model);
    }

    #[test]
    fn test_packed_body_resolves() {
        let page = sample_page();
        let body = page.body(BodyForm::Packed).unwrap();
        assert_eq!(body.form(), BodyForm::Packed);
        let PageBody::Packed(blob) = &body else {
            panic!("expected packed body");
        };
        assert!(!blob.contains('<'));
        assert_eq!(body.resolve().unwrap(), page.model);
    }

    #[test]
    fn test_packed_body_errors_carry_stage() {
        let body = PageBody::Packed(Cow::Borrowed("@@@"));
        assert_eq!(body.resolve().unwrap_err().stage(), DecodeStage::Base64);
    }
}
