//! The data source: load entry points, results and notifications.

use std::future::Future;
use std::sync::Arc;

use crate::builder;
use crate::config::LoadOptions;
use crate::context::{DocumentContext, LoadedDocument};
use crate::error::{Error, Result};
use crate::event::Event;
use crate::loader::{FileLoader, ResourceLoader};
use crate::model::FeatureCollection;
use crate::uri;
use crate::xml::Element;

/// Converts KML and KMZ documents into a [`FeatureCollection`].
///
/// Each load replaces the previous content. Loads take `&mut self`, so one
/// source runs at most one load at a time; independent sources share nothing.
///
/// ```
/// use futures::executor::block_on;
/// use placemark::KmlDataSource;
///
/// let mut source = KmlDataSource::new();
/// block_on(source.load_str(
///     "<kml><Document><name>Pins</name><Placemark id='p'/></Document></kml>",
///     None,
/// ))?;
/// assert_eq!(source.name(), Some("Pins"));
/// assert!(source.features().get_by_id("p").is_some());
/// # Ok::<(), placemark::Error>(())
/// ```
pub struct KmlDataSource {
    name: Option<String>,
    features: FeatureCollection,
    is_loading: bool,
    options: LoadOptions,
    loader: Arc<dyn ResourceLoader>,
    changed: Event<()>,
    error: Event<Error>,
    loading: Event<bool>,
}

impl Default for KmlDataSource {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Debug for KmlDataSource {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("KmlDataSource")
            .field("name", &self.name)
            .field("features", &self.features.len())
            .field("is_loading", &self.is_loading)
            .field("options", &self.options)
            .finish()
    }
}

impl KmlDataSource {
    /// A source that reads external files from disk.
    pub fn new() -> Self {
        Self::with_loader(Arc::new(FileLoader::new()))
    }

    pub fn with_loader(loader: Arc<dyn ResourceLoader>) -> Self {
        Self {
            name: None,
            features: FeatureCollection::new(),
            is_loading: false,
            options: LoadOptions::default(),
            loader,
            changed: Event::new(),
            error: Event::new(),
            loading: Event::new(),
        }
    }

    pub fn with_options(mut self, options: LoadOptions) -> Self {
        self.options = options;
        self
    }

    /// Fetch `url` through `loader` and load it into a new source.
    pub async fn from_url(url: &str, loader: Arc<dyn ResourceLoader>) -> Result<Self> {
        let mut source = Self::with_loader(loader);
        source.load_url(url)?.await?;
        Ok(source)
    }

    /// Name of the loaded document, or the source URI it was loaded from.
    pub fn name(&self) -> Option<&str> {
        self.name.as_deref()
    }

    pub fn features(&self) -> &FeatureCollection {
        &self.features
    }

    pub fn is_loading(&self) -> bool {
        self.is_loading
    }

    pub fn options(&self) -> &LoadOptions {
        &self.options
    }

    /// Raised after a load replaced the content.
    pub fn changed_event(&mut self) -> &mut Event<()> {
        &mut self.changed
    }

    /// Raised with the cause of a failed load.
    pub fn error_event(&mut self) -> &mut Event<Error> {
        &mut self.error
    }

    /// Raised with the new value whenever the loading flag flips.
    pub fn loading_event(&mut self) -> &mut Event<bool> {
        &mut self.loading
    }

    /// Load an already-parsed document. `source_uri` is the base for relative
    /// references and the fallback name.
    pub async fn load(
        &mut self,
        document: &Element,
        source_uri: Option<&str>,
    ) -> Result<&FeatureCollection> {
        let url = source_uri.map(str::to_string);
        let proxy = self.options.proxy.clone();
        let document = document.clone();
        self.run(
            async move { Ok(LoadedDocument::new(document, url, None, proxy)) },
            source_uri.map(str::to_string),
        )
        .await
    }

    /// Parse and load KML text.
    pub async fn load_str(
        &mut self,
        kml: &str,
        source_uri: Option<&str>,
    ) -> Result<&FeatureCollection> {
        let url = source_uri.map(str::to_string);
        let proxy = self.options.proxy.clone();
        let parsed = Element::parse(kml);
        self.run(
            async move { Ok(LoadedDocument::new(parsed?, url, None, proxy)) },
            source_uri.map(str::to_string),
        )
        .await
    }

    /// Load a KMZ archive. Empty input is refused before anything starts.
    pub fn load_kmz(
        &mut self,
        data: Vec<u8>,
        source_uri: Option<&str>,
    ) -> Result<impl Future<Output = Result<&FeatureCollection>> + '_> {
        if data.is_empty() {
            return Err(Error::MissingArgument("kmz data"));
        }
        let url = source_uri.map(str::to_string);
        let proxy = self.options.proxy.clone();
        let name = url.clone();
        let source = async move {
            let archive = crate::kmz::KmzArchive::from_bytes(&data)?;
            let root = archive.document()?;
            Ok(LoadedDocument::new(root, url, Some(archive), proxy))
        };
        Ok(self.run(source, name))
    }

    /// Fetch and load a KML or KMZ document through the loader. A blank URL
    /// is refused before anything starts.
    pub fn load_url(
        &mut self,
        url: &str,
    ) -> Result<impl Future<Output = Result<&FeatureCollection>> + '_> {
        let url = url.trim();
        if url.is_empty() {
            return Err(Error::MissingArgument("url"));
        }
        let url = url.to_string();
        let proxy = self.options.proxy.clone();
        let loader = Arc::clone(&self.loader);
        let target = uri::apply_proxy(&url, proxy.as_deref());
        let name = Some(url.clone());
        let source = async move {
            let bytes = loader.fetch_bytes(&target).await?;
            LoadedDocument::from_bytes(&bytes, Some(url), proxy)
        };
        Ok(self.run(source, name))
    }

    async fn run(
        &mut self,
        source: impl Future<Output = Result<LoadedDocument>>,
        source_uri: Option<String>,
    ) -> Result<&FeatureCollection> {
        self.set_loading(true);

        let options = self.options.clone();
        let loader = Arc::clone(&self.loader);
        let outcome = async {
            let document = source.await?;
            let mut ctx = DocumentContext::new(document, options, loader);
            ctx.prefetch().await;
            builder::build(&ctx, source_uri.as_deref())
        }
        .await;

        self.set_loading(false);
        match outcome {
            Ok(output) => {
                tracing::info!(
                    name = output.name.as_deref().unwrap_or_default(),
                    features = output.features.len(),
                    "loaded KML"
                );
                self.name = output.name;
                self.features = output.features;
                self.changed.raise(&());
                Ok(&self.features)
            }
            Err(e) => {
                tracing::error!(error = %e, "KML load failed");
                self.error.raise(&e);
                Err(e)
            }
        }
    }

    fn set_loading(&mut self, loading: bool) {
        if self.is_loading != loading {
            self.is_loading = loading;
            self.loading.raise(&loading);
        }
    }
}
