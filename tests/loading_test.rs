//! Load entry points: KML text, KMZ archives, URLs and linked documents.
//!
//! Everything runs against in-memory resources; KMZ archives are assembled
//! with `ZipWriter` for each test.

use std::io::{Cursor, Write};
use std::sync::Arc;

use futures::executor::block_on;
use tempfile::TempDir;
use zip::ZipWriter;
use zip::write::SimpleFileOptions;

use placemark::{
    DefaultProxy, Error, FeatureKind, FileLoader, KmlDataSource, LoadOptions, MemoryLoader,
};

const PNG_MAGIC: &[u8] = &[0x89, 0x50, 0x4E, 0x47, 0x0D, 0x0A, 0x1A, 0x0A];

fn kmz(entries: &[(&str, &[u8])]) -> Vec<u8> {
    let mut zip = ZipWriter::new(Cursor::new(Vec::new()));
    let options = SimpleFileOptions::default();
    for (name, data) in entries {
        zip.start_file(*name, options).unwrap();
        zip.write_all(data).unwrap();
    }
    zip.finish().unwrap().into_inner()
}

fn source_with(loader: MemoryLoader) -> KmlDataSource {
    KmlDataSource::with_loader(Arc::new(loader))
}

#[test]
fn test_load_str_names_source_after_document() {
    let mut source = KmlDataSource::new();
    block_on(source.load_str(
        r#"<kml xmlns="http://www.opengis.net/kml/2.2">
             <Document><name>Field Trip</name>
               <Folder id="day1"><Placemark id="camp"/></Folder>
             </Document>
           </kml>"#,
        Some("trip.kml"),
    ))
    .unwrap();

    assert_eq!(source.name(), Some("Field Trip"));
    let camp = source.features().get_by_id("camp").unwrap();
    let parent = source.features().parent_of(camp).unwrap();
    assert_eq!(parent.id.as_str(), "day1");
    assert_eq!(parent.kind, FeatureKind::Folder);
}

#[test]
fn test_unnamed_document_falls_back_to_source_uri() {
    let mut source = KmlDataSource::new();
    block_on(source.load_str("<kml><Placemark/></kml>", Some("http://test.invalid/a.kml")))
        .unwrap();
    assert_eq!(source.name(), Some("http://test.invalid/a.kml"));
}

#[test]
fn test_loading_twice_gives_equal_collections() {
    let kml = r#"<kml><Document>
        <Style id="s"><IconStyle><scale>2</scale></IconStyle></Style>
        <Placemark><styleUrl>#s</styleUrl><Point><coordinates>1,2,3</coordinates></Point></Placemark>
        <Placemark><name>b</name></Placemark>
        <Folder><Placemark id="dup"/><Placemark id="dup"/></Folder>
      </Document></kml>"#;

    let mut first = KmlDataSource::new();
    let mut second = KmlDataSource::new();
    block_on(first.load_str(kml, None)).unwrap();
    block_on(second.load_str(kml, None)).unwrap();
    assert_eq!(first.features(), second.features());

    block_on(first.load_str(kml, None)).unwrap();
    assert_eq!(first.features(), second.features());
}

#[test]
fn test_invalid_root_is_an_error() {
    let mut source = KmlDataSource::new();
    let result = block_on(source.load_str("<html><body/></html>", None));
    assert!(matches!(result, Err(Error::InvalidKml(_))));
}

#[test]
fn test_kmz_images_become_data_uris() {
    let doc = br#"<kml><Document>
        <Style id="pin"><IconStyle><Icon><href>files/pin.png</href></Icon></IconStyle></Style>
        <Placemark id="p"><styleUrl>#pin</styleUrl><Point><coordinates>0,0</coordinates></Point></Placemark>
        <GroundOverlay id="g">
          <Icon><href>files/overlay.png</href></Icon>
          <LatLonBox><north>1</north><south>0</south><east>1</east><west>0</west></LatLonBox>
        </GroundOverlay>
      </Document></kml>"#;
    let data = kmz(&[
        ("doc.kml", doc.as_slice()),
        ("files/pin.png", PNG_MAGIC),
        ("files/overlay.png", PNG_MAGIC),
    ]);

    let mut source = KmlDataSource::new();
    block_on(source.load_kmz(data, Some("http://test.invalid/a.kmz")).unwrap()).unwrap();

    let pin = source.features().get_by_id("p").unwrap();
    let image = pin.billboard.as_ref().unwrap().image.as_deref().unwrap();
    assert!(image.starts_with("data:image/png;base64,"));

    let overlay = source.features().get_by_id("g").unwrap();
    let rectangle = overlay.rectangle().unwrap();
    assert!(matches!(
        &rectangle.material,
        Some(placemark::model::Material::Image(url)) if url.starts_with("data:image/png;base64,")
    ));
}

#[test]
fn test_kmz_without_doc_kml_uses_first_kml_entry() {
    let data = kmz(&[
        ("readme.txt", b"hello".as_slice()),
        ("places.KML", b"<kml><Placemark id='only'/></kml>".as_slice()),
    ]);
    let mut source = KmlDataSource::new();
    block_on(source.load_kmz(data, None).unwrap()).unwrap();
    assert!(source.features().contains_id("only"));
}

#[test]
fn test_kmz_without_kml_is_an_error() {
    let data = kmz(&[("image.png", PNG_MAGIC)]);
    let mut source = KmlDataSource::new();
    let result = block_on(source.load_kmz(data, None).unwrap());
    assert!(matches!(result, Err(Error::MissingKmlEntry)));
}

#[test]
fn test_load_url_reads_kml_and_kmz() {
    let loader = MemoryLoader::new()
        .with("http://test.invalid/a.kml", "<kml><Placemark id='k'/></kml>")
        .with(
            "http://test.invalid/b.kmz",
            kmz(&[("doc.kml", b"<kml><Placemark id='z'/></kml>".as_slice())]),
        );
    let mut source = source_with(loader);

    block_on(source.load_url("http://test.invalid/a.kml").unwrap()).unwrap();
    assert!(source.features().contains_id("k"));
    assert_eq!(source.name(), Some("http://test.invalid/a.kml"));

    block_on(source.load_url("http://test.invalid/b.kmz").unwrap()).unwrap();
    assert!(source.features().contains_id("z"));
    assert!(!source.features().contains_id("k"));
}

#[test]
fn test_load_url_fetch_failure() {
    let mut source = source_with(MemoryLoader::new());
    let result = block_on(source.load_url("http://test.invalid/missing.kml").unwrap());
    assert!(matches!(result, Err(Error::Fetch { .. })));
    assert!(!source.is_loading());
}

#[test]
fn test_from_url() {
    let loader = MemoryLoader::new().with("http://test.invalid/a.kml", "<kml><Placemark/></kml>");
    let source = block_on(KmlDataSource::from_url("http://test.invalid/a.kml", Arc::new(loader)))
        .unwrap();
    assert_eq!(source.features().len(), 1);
}

#[test]
fn test_file_loader_reads_relative_documents() {
    let dir = TempDir::new().unwrap();
    std::fs::write(
        dir.path().join("main.kml"),
        "<kml><NetworkLink id='link'><Link><href>linked.kml</href></Link></NetworkLink></kml>",
    )
    .unwrap();
    std::fs::write(dir.path().join("linked.kml"), "<kml><Placemark id='far'/></kml>").unwrap();

    let loader = FileLoader::with_root(dir.path());
    let mut source = KmlDataSource::with_loader(Arc::new(loader));
    block_on(source.load_url("main.kml").unwrap()).unwrap();

    let far = source.features().get_by_id("far").unwrap();
    assert_eq!(far.parent.as_ref().map(|p| p.as_str()), Some("link"));
}

#[test]
fn test_network_link_expands_beneath_link() {
    let loader = MemoryLoader::new().with(
        "http://test.invalid/dir/linked.kml",
        "<kml><Document><name>Linked</name><Placemark id='inner'/></Document></kml>",
    );
    let mut source = source_with(loader);
    block_on(source.load_str(
        r#"<kml><Document>
             <NetworkLink id="nl"><Link><href>dir/linked.kml</href></Link></NetworkLink>
             <Placemark id="after"/>
           </Document></kml>"#,
        Some("http://test.invalid/root.kml"),
    ))
    .unwrap();

    let ids: Vec<&str> = source.features().iter().map(|r| r.id.as_str()).collect();
    assert_eq!(ids, ["nl", "inner", "after"]);
    assert_eq!(source.name(), Some("http://test.invalid/root.kml"));
}

#[test]
fn test_network_link_cycle_terminates() {
    let loader = MemoryLoader::new()
        .with(
            "http://test.invalid/a.kml",
            "<kml><NetworkLink id='to-b'><Link><href>b.kml</href></Link></NetworkLink></kml>",
        )
        .with(
            "http://test.invalid/b.kml",
            "<kml><NetworkLink id='to-a'><Link><href>a.kml</href></Link></NetworkLink></kml>",
        );
    let mut source = source_with(loader);
    block_on(source.load_url("http://test.invalid/a.kml").unwrap()).unwrap();

    let ids: Vec<&str> = source.features().iter().map(|r| r.id.as_str()).collect();
    assert_eq!(ids, ["to-b", "to-a"]);
}

#[test]
fn test_unavailable_network_link_is_left_empty() {
    let mut source = source_with(MemoryLoader::new());
    block_on(source.load_str(
        "<kml><NetworkLink id='nl'><Link><href>gone.kml</href></Link></NetworkLink></kml>",
        Some("http://test.invalid/root.kml"),
    ))
    .unwrap();
    assert_eq!(source.features().len(), 1);
    assert_eq!(source.features().children_of("nl").count(), 0);
}

#[test]
fn test_proxy_applies_to_fetches_and_images() {
    let proxied = "/proxy/?http%3A%2F%2Ftest.invalid%2Flinked.kml";
    let loader = MemoryLoader::new().with(proxied, "<kml><Placemark id='inner'/></kml>");
    let options = LoadOptions::new().with_proxy(DefaultProxy::new("/proxy/"));
    let mut source = source_with(loader).with_options(options);

    block_on(source.load_str(
        r#"<kml><Document>
             <NetworkLink><Link><href>linked.kml</href></Link></NetworkLink>
             <Placemark id="p">
               <Style><IconStyle><Icon><href>icon.png</href></Icon></IconStyle></Style>
             </Placemark>
           </Document></kml>"#,
        Some("http://test.invalid/root.kml"),
    ))
    .unwrap();

    assert!(source.features().contains_id("inner"));
    let icon = source.features().get_by_id("p").unwrap();
    assert_eq!(
        icon.billboard.as_ref().unwrap().image.as_deref(),
        Some("/proxy/?http%3A%2F%2Ftest.invalid%2Ficon.png")
    );
}

#[test]
fn test_relative_images_without_base_are_kept() {
    let mut source = KmlDataSource::new();
    block_on(source.load_str(
        r#"<kml><Placemark id="p">
             <Style><IconStyle><Icon><href>icons/pin.png</href></Icon></IconStyle></Style>
           </Placemark></kml>"#,
        None,
    ))
    .unwrap();
    let p = source.features().get_by_id("p").unwrap();
    assert_eq!(
        p.billboard.as_ref().unwrap().image.as_deref(),
        Some("icons/pin.png")
    );
}
