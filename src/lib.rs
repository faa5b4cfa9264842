//! # placemark
//!
//! Converts KML and KMZ documents into styled, time-aware geographic
//! features ready for a 3D globe renderer.
//!
//! ## Features
//!
//! - Read KML text, parsed XML, KMZ archives, or documents behind a URL
//! - Resolve shared styles, StyleMaps and external style documents
//! - Convert points, lines, polygons, tracks and ground overlays
//! - Follow NetworkLinks and embed KMZ resources as data URIs
//! - Render feature balloons from templates and extended data
//!
//! ## Quick Start
//!
//! ```
//! use futures::executor::block_on;
//! use placemark::KmlDataSource;
//!
//! let kml = r#"<kml xmlns="http://www.opengis.net/kml/2.2">
//!   <Document>
//!     <Placemark id="hq">
//!       <name>Headquarters</name>
//!       <Point><coordinates>-122.08,37.42,0</coordinates></Point>
//!     </Placemark>
//!   </Document>
//! </kml>"#;
//!
//! let mut source = KmlDataSource::new();
//! let features = block_on(source.load_str(kml, Some("http://example.com/doc.kml")))?;
//! let hq = features.get_by_id("hq").unwrap();
//! assert_eq!(hq.name.as_deref(), Some("Headquarters"));
//! assert!(hq.position().is_some());
//! # Ok::<(), placemark::Error>(())
//! ```
//!
//! ## External Resources
//!
//! Linked documents are fetched through a [`ResourceLoader`]. [`FileLoader`]
//! reads from disk; [`MemoryLoader`] serves a fixed set of resources, and any
//! HTTP client can be plugged in by implementing the trait. Absolute URLs
//! can be routed through a [`Proxy`] set on [`LoadOptions`].

pub mod builder;
pub mod config;
pub mod context;
pub mod description;
pub mod error;
pub mod event;
pub mod geometry;
pub mod kmz;
pub mod loader;
pub mod model;
pub mod source;
pub mod style;
pub mod temporal;
pub mod uri;
pub(crate) mod util;
pub mod xml;

pub use config::{DefaultProxy, LoadOptions, Proxy};
pub use error::{Error, Result};
pub use event::{Event, ListenerId};
pub use kmz::KmzArchive;
pub use loader::{FileLoader, MemoryLoader, ResourceLoader};
pub use model::{
    Availability, Billboard, Color, FeatureCollection, FeatureId, FeatureKind, FeatureMetadata,
    FeatureRecord, GeometryPrimitive, Label, StyleBag, TimeInterval,
};
pub use source::KmlDataSource;
pub use util::{decode_text, is_zip};
pub use xml::Element;
