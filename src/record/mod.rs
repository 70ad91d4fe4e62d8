//! Record model for VPZ scene-graph documents.
//!
//! A document is a tree of typed wrappers (`object`, `sequence`, `string`,
//! `numeric`, `blob`). Parsing maps it onto the closed [`Record`] variant set;
//! records are read-only once built and live for one conversion run.

mod parse;
mod walk;

pub use parse::{load_document, parse_document};
pub use walk::{locate, Locate};

use crate::util::{Error, Result};

/// Discriminator carried by image records.
pub const IMAGE_TAG: &str = "::fwData::Image";

/// Discriminator carried by model-series records.
pub const MODEL_SERIES_TAG: &str = "::fwMedData::ModelSeries";

/// One node of a parsed document.
#[derive(Clone, Debug, PartialEq)]
pub enum Record {
    /// Polymorphic object with an optional class discriminator.
    Object(ObjectRecord),
    /// Ordered collection, entries sorted by ascending numeric key.
    Sequence(Vec<(usize, Record)>),
    /// String leaf.
    String(String),
    /// Numeric leaf.
    Numeric(f64),
    /// Reference to an external raw buffer file.
    BlobRef(BlobRef),
}

/// Attribute-bearing record.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct ObjectRecord {
    /// Class tag, e.g. [`IMAGE_TAG`]; `None` for untagged maps.
    pub discriminator: Option<String>,
    /// Attributes in document order.
    pub attributes: Vec<(String, Record)>,
}

impl ObjectRecord {
    /// Look up an attribute by name.
    pub fn attribute(&self, name: &str) -> Option<&Record> {
        self.attributes
            .iter()
            .find(|(k, _)| k == name)
            .map(|(_, v)| v)
    }
}

/// Pointer to a side-car buffer, as written in the document.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct BlobRef {
    /// Path relative to the document directory, `/` or `\` separated.
    pub path: String,
}

impl BlobRef {
    /// Path components, with both separator styles normalised away.
    pub fn components(&self) -> impl Iterator<Item = &str> {
        self.path
            .split(['/', '\\'])
            .filter(|c| !c.is_empty() && *c != ".")
    }

    /// Final path component.
    pub fn file_name(&self) -> &str {
        self.components().last().unwrap_or("")
    }

    /// File name without its last extension.
    pub fn file_stem(&self) -> &str {
        let name = self.file_name();
        match name.rfind('.') {
            Some(0) | None => name,
            Some(pos) => &name[..pos],
        }
    }
}

impl Record {
    /// Discriminator of an object record.
    pub fn discriminator(&self) -> Option<&str> {
        match self {
            Record::Object(obj) => obj.discriminator.as_deref(),
            _ => None,
        }
    }

    /// Object payload, if this is an object.
    pub fn as_object(&self) -> Option<&ObjectRecord> {
        match self {
            Record::Object(obj) => Some(obj),
            _ => None,
        }
    }

    /// Attribute of an object record.
    pub fn attribute(&self, name: &str) -> Option<&Record> {
        self.as_object()?.attribute(name)
    }

    /// Sequence entries, if this is a sequence.
    pub fn entries(&self) -> Option<&[(usize, Record)]> {
        match self {
            Record::Sequence(entries) => Some(entries),
            _ => None,
        }
    }

    /// Sequence entry by numeric key.
    pub fn entry(&self, key: usize) -> Option<&Record> {
        self.entries()?
            .iter()
            .find(|(k, _)| *k == key)
            .map(|(_, v)| v)
    }

    /// Dotted path query: each segment is an attribute name, or a numeric
    /// key when the current record is a sequence.
    pub fn get(&self, path: &str) -> Option<&Record> {
        let mut current = self;
        for segment in path.split('.').filter(|s| !s.is_empty()) {
            current = match current {
                Record::Object(obj) => obj.attribute(segment)?,
                Record::Sequence(_) => current.entry(segment.parse().ok()?)?,
                _ => return None,
            };
        }
        Some(current)
    }

    /// Like [`Record::get`], but an absent path is an error.
    pub fn require(&self, path: &str) -> Result<&Record> {
        self.get(path).ok_or_else(|| Error::missing(path))
    }

    /// String value of a string leaf.
    pub fn as_str(&self) -> Option<&str> {
        match self {
            Record::String(s) => Some(s),
            _ => None,
        }
    }

    /// Numeric value; string leaves holding a number are accepted.
    pub fn as_f64(&self) -> Option<f64> {
        match self {
            Record::Numeric(v) => Some(*v),
            Record::String(s) => s.trim().parse().ok(),
            _ => None,
        }
    }

    /// Integer value; string leaves holding an integer are accepted.
    pub fn as_i64(&self) -> Option<i64> {
        match self {
            Record::Numeric(v) if v.fract() == 0.0 => Some(*v as i64),
            Record::String(s) => {
                let s = s.trim();
                s.parse().ok().or_else(|| {
                    let v: f64 = s.parse().ok()?;
                    (v.fract() == 0.0).then_some(v as i64)
                })
            }
            _ => None,
        }
    }

    /// Blob reference of a blob leaf.
    pub fn as_blob(&self) -> Option<&BlobRef> {
        match self {
            Record::BlobRef(blob) => Some(blob),
            _ => None,
        }
    }

    /// Integers of a sequence of integer leaves, in key order.
    pub fn int_sequence(&self) -> Option<Vec<i64>> {
        self.entries()?.iter().map(|(_, v)| v.as_i64()).collect()
    }

    /// Floats of a sequence of numeric leaves, in key order.
    pub fn float_sequence(&self) -> Option<Vec<f64>> {
        self.entries()?.iter().map(|(_, v)| v.as_f64()).collect()
    }

    /// True for records that carry nothing: an object without attributes,
    /// an empty sequence or an empty string.
    pub fn is_blank(&self) -> bool {
        match self {
            Record::Object(obj) => obj.attributes.is_empty(),
            Record::Sequence(entries) => entries.is_empty(),
            Record::String(s) => s.is_empty(),
            Record::Numeric(_) | Record::BlobRef(_) => false,
        }
    }

    /// Short variant name for diagnostics.
    pub fn kind(&self) -> &'static str {
        match self {
            Record::Object(_) => "object",
            Record::Sequence(_) => "sequence",
            Record::String(_) => "string",
            Record::Numeric(_) => "numeric",
            Record::BlobRef(_) => "blob",
        }
    }
}
