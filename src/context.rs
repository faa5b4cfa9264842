//! Per-load state: the documents involved and their shared styles.
//!
//! A load runs in two phases. [`DocumentContext::prefetch`] follows every
//! external reference (styleUrl documents, NetworkLinks) and caches the
//! parsed results, one wave of concurrent fetches per level of indirection.
//! After that, building features is synchronous and only reads the cache.

use std::collections::{HashMap, HashSet};
use std::sync::Arc;

use futures::future::join_all;

use crate::config::{LoadOptions, Proxy};
use crate::error::Result;
use crate::kmz::KmzArchive;
use crate::loader::ResourceLoader;
use crate::style::{self, StyleTable};
use crate::uri;
use crate::util::{data_uri, is_zip};
use crate::xml::Element;

/// A parsed KML document plus what is needed to resolve references in it.
#[derive(Debug)]
pub struct LoadedDocument {
    url: Option<String>,
    root: Element,
    archive: Option<KmzArchive>,
    proxy: Option<Arc<dyn Proxy>>,
    styles: StyleTable,
}

impl LoadedDocument {
    /// Wrap a parsed document. `url` is the base for its relative references.
    pub fn new(
        root: Element,
        url: Option<String>,
        archive: Option<KmzArchive>,
        proxy: Option<Arc<dyn Proxy>>,
    ) -> Self {
        let mut doc = Self {
            url,
            root,
            archive,
            proxy,
            styles: StyleTable::default(),
        };
        doc.styles = StyleTable::build(&doc.root, &|href| doc.resource_url(href));
        doc
    }

    /// Parse KML or KMZ bytes, told apart by their leading magic.
    pub fn from_bytes(
        bytes: &[u8],
        url: Option<String>,
        proxy: Option<Arc<dyn Proxy>>,
    ) -> Result<Self> {
        if is_zip(bytes) {
            let archive = KmzArchive::from_bytes(bytes)?;
            let root = archive.document()?;
            Ok(Self::new(root, url, Some(archive), proxy))
        } else {
            Ok(Self::new(Element::from_bytes(bytes)?, url, None, proxy))
        }
    }

    pub fn url(&self) -> Option<&str> {
        self.url.as_deref()
    }

    pub fn root(&self) -> &Element {
        &self.root
    }

    pub fn archive(&self) -> Option<&KmzArchive> {
        self.archive.as_ref()
    }

    pub fn styles(&self) -> &StyleTable {
        &self.styles
    }

    /// The URL an image or other resource reference should be emitted as.
    ///
    /// Files bundled in this document's KMZ become `data:` URIs. Everything
    /// else is resolved against the document URL and proxied if absolute.
    pub fn resource_url(&self, href: &str) -> String {
        let href = href.trim();
        if !uri::is_absolute(href)
            && let Some(data) = self.archive.as_ref().and_then(|a| a.entry(href))
        {
            return data_uri(href, data);
        }
        let resolved = uri::resolve(href, self.url.as_deref());
        uri::apply_proxy(&resolved, self.proxy.as_deref())
    }

    /// Cache key of a document referenced from this one.
    pub fn document_key(&self, href: &str) -> String {
        uri::resolve(href, self.url.as_deref())
    }

    /// Document paths this one refers to: the non-local part of every
    /// `styleUrl`, and every NetworkLink target.
    fn external_references(&self) -> Vec<String> {
        let mut references: Vec<String> = style::style_urls(&self.root)
            .into_iter()
            .filter_map(|url| {
                let (path, _) = uri::split_fragment(&url);
                (!path.is_empty() && url.contains('#')).then(|| path.to_string())
            })
            .collect();
        references.extend(
            self.root
                .descendants_named("NetworkLink")
                .into_iter()
                .filter_map(network_link_href),
        );
        references
    }
}

/// `Link/href`, or the older `Url/href`.
pub fn network_link_href(link: &Element) -> Option<String> {
    link.child("Link")
        .or_else(|| link.child("Url"))
        .and_then(|l| l.child_text("href"))
}

/// Everything one load reads from: the root document, the external documents
/// it reaches, and the load options.
pub struct DocumentContext {
    root: LoadedDocument,
    /// Keyed by resolved URL; `None` marks a fetch that failed.
    documents: HashMap<String, Option<Arc<LoadedDocument>>>,
    options: LoadOptions,
    loader: Arc<dyn ResourceLoader>,
}

impl DocumentContext {
    pub fn new(root: LoadedDocument, options: LoadOptions, loader: Arc<dyn ResourceLoader>) -> Self {
        Self {
            root,
            documents: HashMap::new(),
            options,
            loader,
        }
    }

    pub fn root(&self) -> &LoadedDocument {
        &self.root
    }

    pub fn options(&self) -> &LoadOptions {
        &self.options
    }

    /// A prefetched external document.
    pub fn document(&self, key: &str) -> Option<&LoadedDocument> {
        self.documents.get(key)?.as_deref()
    }

    /// Fetch every document reachable from the root, breadth first.
    ///
    /// Each URL is fetched at most once. Failures are logged and remembered;
    /// they never abort the load.
    pub async fn prefetch(&mut self) {
        let mut seen: HashSet<String> = HashSet::new();
        if let Some(url) = self.root.url() {
            seen.insert(url.to_string());
        }

        let mut wave = self.requests_from(&self.root, &mut seen);
        let mut depth = 0;
        while !wave.is_empty() {
            if depth >= self.options.max_network_link_depth {
                tracing::warn!(pending = wave.len(), "reference depth limit reached");
                break;
            }
            tracing::debug!(depth, count = wave.len(), "fetching external documents");

            let fetches = wave.into_iter().map(|request| {
                let loader = Arc::clone(&self.loader);
                let proxy = self.options.proxy.clone();
                async move {
                    let bytes = match request.bundled {
                        Some(bytes) => Ok(bytes),
                        None => loader.fetch_bytes(&request.target).await,
                    };
                    let result = bytes.and_then(|bytes| {
                        LoadedDocument::from_bytes(&bytes, Some(request.key.clone()), proxy)
                    });
                    (request.key, result)
                }
            });

            let mut next = Vec::new();
            for (key, result) in join_all(fetches).await {
                match result {
                    Ok(doc) => {
                        next.extend(self.requests_from(&doc, &mut seen));
                        self.documents.insert(key, Some(Arc::new(doc)));
                    }
                    Err(e) => {
                        tracing::warn!(url = %key, error = %e, "failed to load external document");
                        self.documents.insert(key, None);
                    }
                }
            }
            wave = next;
            depth += 1;
        }
    }

    fn requests_from(&self, doc: &LoadedDocument, seen: &mut HashSet<String>) -> Vec<FetchRequest> {
        doc.external_references()
            .into_iter()
            .filter_map(|href| {
                let key = doc.document_key(&href);
                if !seen.insert(key.clone()) {
                    return None;
                }
                let bundled = (!uri::is_absolute(&href))
                    .then(|| doc.archive().and_then(|a| a.entry(&href)))
                    .flatten()
                    .map(<[u8]>::to_vec);
                let target = uri::apply_proxy(&key, self.options.proxy.as_deref());
                Some(FetchRequest {
                    key,
                    target,
                    bundled,
                })
            })
            .collect()
    }
}

struct FetchRequest {
    key: String,
    /// What the loader is asked for (the key, proxied).
    target: String,
    /// Bytes found in the referencing document's KMZ.
    bundled: Option<Vec<u8>>,
}
