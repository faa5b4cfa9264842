//! Load configuration.

use std::fmt;
use std::sync::Arc;

use percent_encoding::{AsciiSet, NON_ALPHANUMERIC, utf8_percent_encode};

/// Characters `encodeURIComponent` leaves alone.
const URI_COMPONENT: &AsciiSet = &NON_ALPHANUMERIC
    .remove(b'-')
    .remove(b'_')
    .remove(b'.')
    .remove(b'!')
    .remove(b'~')
    .remove(b'*')
    .remove(b'\'')
    .remove(b'(')
    .remove(b')');

/// Rewrites absolute resource URLs before they are used or fetched.
pub trait Proxy: Send + Sync {
    fn get_url(&self, resource: &str) -> String;
}

impl<F> Proxy for F
where
    F: Fn(&str) -> String + Send + Sync,
{
    fn get_url(&self, resource: &str) -> String {
        self(resource)
    }
}

impl fmt::Debug for dyn Proxy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("Proxy")
    }
}

/// Routes every resource through `prefix?<encoded url>`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DefaultProxy {
    prefix: String,
}

impl DefaultProxy {
    pub fn new(prefix: impl Into<String>) -> Self {
        Self {
            prefix: prefix.into(),
        }
    }
}

impl Proxy for DefaultProxy {
    fn get_url(&self, resource: &str) -> String {
        format!(
            "{}?{}",
            self.prefix,
            utf8_percent_encode(resource, URI_COMPONENT)
        )
    }
}

/// Options shared by every load of a data source.
#[derive(Clone)]
pub struct LoadOptions {
    pub proxy: Option<Arc<dyn Proxy>>,
    /// How many NetworkLinks deep linked documents are followed.
    pub max_network_link_depth: usize,
    /// Edge length in pixels of the billboard used for hot-spot offsets.
    pub icon_size: f64,
}

impl Default for LoadOptions {
    fn default() -> Self {
        Self {
            proxy: None,
            max_network_link_depth: 8,
            icon_size: 32.0,
        }
    }
}

impl fmt::Debug for LoadOptions {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("LoadOptions")
            .field("proxy", &self.proxy.is_some())
            .field("max_network_link_depth", &self.max_network_link_depth)
            .field("icon_size", &self.icon_size)
            .finish()
    }
}

impl LoadOptions {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_proxy(mut self, proxy: impl Proxy + 'static) -> Self {
        self.proxy = Some(Arc::new(proxy));
        self
    }

    pub fn with_max_network_link_depth(mut self, depth: usize) -> Self {
        self.max_network_link_depth = depth;
        self
    }

    pub fn with_icon_size(mut self, size: f64) -> Self {
        self.icon_size = size;
        self
    }
}
