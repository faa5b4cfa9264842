//! KMZ archives: a zipped KML document plus the files it references.

use std::collections::HashMap;
use std::io::{Cursor, Read};

use zip::ZipArchive;

use crate::error::{Error, Result};
use crate::xml::Element;

/// Every file entry of a KMZ, held in memory.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct KmzArchive {
    entries: HashMap<String, Vec<u8>>,
    kml_entry: String,
}

impl KmzArchive {
    /// Read a KMZ. The document is `doc.kml` when present, otherwise the
    /// first `.kml` entry in archive order.
    pub fn from_bytes(data: &[u8]) -> Result<Self> {
        let mut archive = ZipArchive::new(Cursor::new(data))?;
        let mut entries = HashMap::new();
        let mut first_kml = None;

        for i in 0..archive.len() {
            let mut file = archive.by_index(i)?;
            if file.is_dir() {
                continue;
            }
            let name = file.name().to_string();
            let mut contents = Vec::new();
            file.read_to_end(&mut contents)?;
            if first_kml.is_none() && name.to_ascii_lowercase().ends_with(".kml") {
                first_kml = Some(name.clone());
            }
            entries.insert(name, contents);
        }

        let kml_entry = if entries.contains_key("doc.kml") {
            "doc.kml".to_string()
        } else {
            first_kml.ok_or(Error::MissingKmlEntry)?
        };
        tracing::debug!(entry = %kml_entry, files = entries.len(), "opened KMZ");

        Ok(Self { entries, kml_entry })
    }

    /// Name of the entry holding the document.
    pub fn kml_entry(&self) -> &str {
        &self.kml_entry
    }

    /// Parse the document entry.
    pub fn document(&self) -> Result<Element> {
        let bytes = self
            .entries
            .get(&self.kml_entry)
            .ok_or(Error::MissingKmlEntry)?;
        Element::from_bytes(bytes)
    }

    /// Look up an entry by the relative path a document used for it.
    ///
    /// Paths are matched as written, without a leading `./`, and finally
    /// percent-decoded.
    pub fn entry(&self, path: &str) -> Option<&[u8]> {
        let path = path.trim();
        let stripped = path.trim_start_matches("./");
        if let Some(data) = self.entries.get(path).or_else(|| self.entries.get(stripped)) {
            return Some(data.as_slice());
        }
        let decoded = percent_encoding::percent_decode_str(stripped)
            .decode_utf8()
            .ok()?;
        self.entries.get(decoded.as_ref()).map(Vec::as_slice)
    }

    pub fn entry_names(&self) -> impl Iterator<Item = &str> {
        self.entries.keys().map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}
