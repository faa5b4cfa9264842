//! Fetching external resources.
//!
//! The converter never talks to the network itself; everything outside the
//! input document comes through a [`ResourceLoader`].

use std::collections::HashMap;
use std::path::PathBuf;

use async_trait::async_trait;
use url::Url;

use crate::error::{Error, Result};

/// Source of the bytes behind a URL or path.
#[async_trait]
pub trait ResourceLoader: Send + Sync {
    async fn fetch_bytes(&self, url: &str) -> Result<Vec<u8>>;
}

/// Reads `file:` URLs and plain paths from disk. Other schemes are refused.
#[derive(Debug, Clone, Default)]
pub struct FileLoader {
    root: Option<PathBuf>,
}

impl FileLoader {
    pub fn new() -> Self {
        Self::default()
    }

    /// Resolve relative paths against `root` instead of the working directory.
    pub fn with_root(root: impl Into<PathBuf>) -> Self {
        Self {
            root: Some(root.into()),
        }
    }

    fn path_for(&self, url: &str) -> Result<PathBuf> {
        if let Ok(parsed) = Url::parse(url)
            && parsed.scheme().len() > 1
        {
            if parsed.scheme() != "file" {
                return Err(Error::UnsupportedScheme(parsed.scheme().to_string()));
            }
            return parsed
                .to_file_path()
                .map_err(|()| Error::fetch(url, "not a local file path"));
        }
        let decoded = percent_encoding::percent_decode_str(url).decode_utf8_lossy();
        Ok(match &self.root {
            Some(root) => root.join(decoded.as_ref()),
            None => PathBuf::from(decoded.as_ref()),
        })
    }
}

#[async_trait]
impl ResourceLoader for FileLoader {
    async fn fetch_bytes(&self, url: &str) -> Result<Vec<u8>> {
        let path = self.path_for(url)?;
        tracing::debug!(path = %path.display(), "reading resource");
        std::fs::read(&path).map_err(|e| Error::fetch(url, e))
    }
}

/// Serves a fixed set of resources from memory.
#[derive(Debug, Clone, Default)]
pub struct MemoryLoader {
    resources: HashMap<String, Vec<u8>>,
}

impl MemoryLoader {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, url: impl Into<String>, data: impl Into<Vec<u8>>) {
        self.resources.insert(url.into(), data.into());
    }

    pub fn with(mut self, url: impl Into<String>, data: impl Into<Vec<u8>>) -> Self {
        self.insert(url, data);
        self
    }
}

#[async_trait]
impl ResourceLoader for MemoryLoader {
    async fn fetch_bytes(&self, url: &str) -> Result<Vec<u8>> {
        self.resources
            .get(url)
            .cloned()
            .ok_or_else(|| Error::fetch(url, "not found"))
    }
}
